//! Generative-language provider access for krishi.
//!
//! - [`GenerativeProvider`] is the seam the server depends on; it is built once
//!   at startup and shared read-only between requests.
//! - [`GeminiProvider`] talks to the Google Generative Language REST API.
//! - [`classify_provider_error`] maps provider failure text onto the small set
//!   of outcomes the HTTP layer reports.
//! - [`AdvisorPrompt`] renders the fixed instructional prompt.

pub mod classify;
pub mod error;
pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

pub use classify::{ErrorKind, classify_provider_error};
pub use error::ProviderError;
pub use gemini::{GeminiConfig, GeminiProvider};
pub use prompt::AdvisorPrompt;

/// A single prompt → text completion service.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Short identifier used in logs (e.g. the model name).
    fn name(&self) -> &str;

    /// Submit `prompt` and wait for the generated text.
    ///
    /// Implementations must not retry; failures are surfaced immediately.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
