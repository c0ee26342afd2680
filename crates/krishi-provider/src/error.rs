use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by a [`crate::GenerativeProvider`].
///
/// The `Display` output is what [`crate::classify_provider_error`] inspects, so
/// `Api` keeps both the HTTP status line and the raw response body.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Init(#[source] reqwest::Error),

    /// Network failure or undecodable response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("provider returned [{status}] {body}")]
    Api { status: StatusCode, body: String },

    /// The prompt was refused by the provider's safety filters.
    #[error("prompt blocked by provider: {reason}")]
    Blocked { reason: String },

    /// The provider answered 2xx but produced no candidate text.
    #[error("provider returned no candidates")]
    EmptyResponse,
}
