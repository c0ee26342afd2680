//! Wire types for the krishi chat API.
//!
//! These structures are the JSON contract between `krishi-server` and its
//! clients. Field names follow the wire format (camelCase where the browser
//! front end expects it), not Rust conventions.
//!
//! Enable the `openapi` feature to derive `utoipa` schemas for the server's
//! OpenAPI document.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Status string reported by every health endpoint.
pub const STATUS_OK: &str = "OK";

// ── Chat message ─────────────────────────────────────────────────────────────

/// Request body for `POST /api/chat/message`.
///
/// `message` is optional at the serde level so that a missing field reaches
/// the handler and is rejected with the same error as an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatMessageRequest {
    /// The farmer's question, forwarded verbatim to the provider.
    #[serde(default)]
    pub message: Option<String>,
}

impl ChatMessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    /// The message text, if present and not blank.
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Successful response body for `POST /api/chat/message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChatMessageResponse {
    /// Always `true`.
    pub success: bool,
    /// Text generated by the provider.
    pub response: String,
    /// RFC 3339 time at which the reply was produced.
    pub timestamp: String,
}

/// Error body shared by every non-2xx JSON response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorBody {
    /// Short, stable error label.
    pub error: String,
    /// Human-readable hint for the end user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ── Health ───────────────────────────────────────────────────────────────────

/// Response body for `GET /api/chat/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChatHealth {
    pub status: String,
    /// Whether a provider credential is present. No network call is made.
    #[serde(alias = "geminiConfigured")]
    pub provider_configured: bool,
    pub message: String,
}

/// Response body for the process-level `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ServerHealth {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub version: String,
}
