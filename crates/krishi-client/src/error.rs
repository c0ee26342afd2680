use krishi_types::ErrorBody;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure talking to the server or a third-party service.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}")]
    Rejected {
        status: StatusCode,
        body: Option<ErrorBody>,
    },

    /// A 2xx body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// The human-readable hint the server attached to a rejection, if any.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected {
                body: Some(body), ..
            } => body.message.as_deref(),
            _ => None,
        }
    }
}
