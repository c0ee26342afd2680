//! Server configuration, loaded from environment variables at startup.

use std::fmt;

use krishi_provider::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use krishi_provider::prompt::DEFAULT_REGION;

/// Deployment mode. Controls how much error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("development") {
            RuntimeMode::Development
        } else {
            RuntimeMode::Production
        }
    }
}

/// Provider credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Runtime configuration for krishi-server.
///
/// Every field has a default so the server starts without any environment
/// variables; without `GEMINI_API_KEY` the chat endpoint answers 503.
#[derive(Debug, Clone)]
pub struct Config {
    /// Interface to bind (default: `"0.0.0.0"`).
    pub host: String,

    /// TCP port (default: `5000`).
    pub port: u16,

    /// Gemini credential; blank values count as absent.
    pub gemini_api_key: Option<ApiKey>,

    pub gemini_model: String,

    pub gemini_base_url: String,

    /// Comma-separated list of allowed browser origins.
    pub cors_allowed_origins: String,

    pub mode: RuntimeMode,

    /// Region named in the advisor prompt.
    pub region: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Mount Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| {
            get(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        Self {
            host: env_or("KRISHI_HOST", "0.0.0.0"),
            port: parse_or(get("PORT"), 5000),
            gemini_api_key: get("GEMINI_API_KEY")
                .map(|k| k.trim().to_owned())
                .filter(|k| !k.is_empty())
                .map(ApiKey),
            gemini_model: env_or("KRISHI_GEMINI_MODEL", DEFAULT_MODEL),
            gemini_base_url: env_or("KRISHI_GEMINI_BASE_URL", DEFAULT_BASE_URL),
            cors_allowed_origins: env_or("KRISHI_CORS_ORIGINS", "http://localhost:3000"),
            mode: RuntimeMode::parse(&env_or("KRISHI_ENV", "production")),
            region: env_or("KRISHI_REGION", DEFAULT_REGION),
            log_level: env_or("KRISHI_LOG", "info"),
            log_json: flag("KRISHI_LOG_JSON", false),
            enable_swagger: flag("KRISHI_ENABLE_SWAGGER", true),
            max_body_bytes: parse_or(get("KRISHI_MAX_BODY_BYTES"), 10 * 1024 * 1024),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.mode == RuntimeMode::Development
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
