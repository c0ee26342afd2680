use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a [`ChatMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry in a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Monotonic, unique within the owning session.
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    /// Set on bot messages that report a failed request.
    #[serde(default)]
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Local clock time in `HH:MM` form, as shown next to each bubble.
    pub fn time_label(&self) -> String {
        self.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}
