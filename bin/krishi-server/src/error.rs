//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are converted to a JSON
//! [`ErrorBody`] with an appropriate status code.
//!
//! Provider failures are logged with full detail but clients only ever see
//! the fixed bodies below. Internal errors attach their detail as an
//! [`InternalErrorDetail`] response extension; the
//! [`crate::middleware::error_detail`] layer decides whether it reaches the body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use krishi_provider::{ErrorKind, ProviderError, classify_provider_error};
use krishi_types::ErrorBody;
use thiserror::Error;
use tracing::{error, warn};

pub const MESSAGE_REQUIRED: &str = "Message is required";
pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const INTERNAL_ERROR: &str = "Something went wrong!";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const BODY_TOO_LARGE: &str = "Request body too large";
pub const BODY_UNREADABLE: &str = "Failed to read request body";

/// Detail of an internal error, carried on the response for the
/// development-mode middleware.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// All errors that can occur in the krishi-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or missing message.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No provider credential is configured.
    #[error("provider not configured")]
    NotConfigured,

    /// The provider rejected the configured credential.
    #[error("invalid provider credential: {0}")]
    InvalidCredential(#[source] ProviderError),

    /// The provider is temporarily overloaded.
    #[error("provider overloaded: {0}")]
    ProviderOverloaded(#[source] ProviderError),

    /// Any other provider failure.
    #[error("provider error: {0}")]
    Provider(#[source] ProviderError),

    /// The caller referenced a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ProviderError> for ServerError {
    fn from(e: ProviderError) -> Self {
        match classify_provider_error(&e.to_string()) {
            ErrorKind::InvalidCredential => ServerError::InvalidCredential(e),
            ErrorKind::Overloaded => ServerError::ProviderOverloaded(e),
            ErrorKind::Other => ServerError::Provider(e),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::Validation(m) => (StatusCode::BAD_REQUEST, ErrorBody::new(m.as_str())),
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, ErrorBody::new(m.as_str())),
            ServerError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody::new("Gemini API not configured").with_message(
                    "Please set up your Gemini API key in the environment variables",
                ),
            ),

            // Provider failures: log the raw text, return a fixed body.
            ServerError::InvalidCredential(e) => {
                error!(error = %e, "provider rejected the API key");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody::new("Invalid Gemini API key")
                        .with_message("Please check your API key configuration"),
                )
            }
            ServerError::ProviderOverloaded(e) => {
                warn!(error = %e, "provider overloaded");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody::new("AI service overloaded").with_message(
                        "The AI is currently overloaded. Please wait a moment and try again.",
                    ),
                )
            }
            ServerError::Provider(e) => {
                error!(error = %e, "provider call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Failed to generate response")
                        .with_message("Please try again later"),
                )
            }

            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                let mut response = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new(INTERNAL_ERROR).with_message(INTERNAL_ERROR_MESSAGE)),
                )
                    .into_response();
                response
                    .extensions_mut()
                    .insert(InternalErrorDetail(m.clone()));
                return response;
            }
        };
        (status, Json(body)).into_response()
    }
}
