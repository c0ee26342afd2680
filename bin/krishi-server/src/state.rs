//! Shared application state injected into every Axum handler.

use std::fmt;
use std::sync::Arc;

use krishi_provider::{
    AdvisorPrompt, GeminiConfig, GeminiProvider, GenerativeProvider, ProviderError,
};
use tracing::{info, warn};

use crate::config::Config;

/// Built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// `None` when no credential is configured.
    pub provider: Option<Arc<dyn GenerativeProvider>>,
    pub prompt: AdvisorPrompt,
}

impl AppState {
    pub fn new(config: Config, provider: Option<Arc<dyn GenerativeProvider>>) -> Self {
        let prompt = AdvisorPrompt::new(
            krishi_provider::prompt::DEFAULT_ASSISTANT_NAME,
            config.region.clone(),
        );
        Self {
            config: Arc::new(config),
            provider,
            prompt,
        }
    }

    /// Build the Gemini provider from `config` when a key is present.
    pub fn from_config(config: Config) -> Result<Self, ProviderError> {
        let provider: Option<Arc<dyn GenerativeProvider>> = match &config.gemini_api_key {
            Some(key) => {
                info!(
                    model = %config.gemini_model,
                    "GEMINI_API_KEY found, initialising Gemini provider"
                );
                let gemini = GeminiProvider::new(
                    GeminiConfig::new(key.expose())
                        .with_model(config.gemini_model.clone())
                        .with_base_url(config.gemini_base_url.clone()),
                )?;
                Some(Arc::new(gemini))
            }
            None => {
                warn!("no GEMINI_API_KEY found in environment; chat requests will be refused");
                None
            }
        };
        Ok(Self::new(config, provider))
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_owned()))
            .field("prompt", &self.prompt)
            .finish()
    }
}
