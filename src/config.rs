use std::time::Duration;

use secrecy::Secret;

use crate::error::{ClientError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

pub const BASE_URL_ENV_VAR: &str = "LLAMA_SERVER_URL";
pub const TIMEOUT_ENV_VAR: &str = "LLAMA_SERVER_TIMEOUT_SECS";
pub const API_KEY_ENV_VAR: &str = "LLAMA_SERVER_API_KEY";

/// Connection settings for a llama.cpp server.
///
/// A `timeout` of `None` (or zero) disables the per-request deadline.
#[derive(Clone, Debug)]
pub struct LlamaServerConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub api_key: Option<Secret<String>>,
}

impl Default for LlamaServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            api_key: None,
        }
    }
}

impl LlamaServerConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// Defaults overridden by `LLAMA_SERVER_URL`, `LLAMA_SERVER_TIMEOUT_SECS` and
    /// `LLAMA_SERVER_API_KEY`, read from the process environment or a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();

        if let Ok(base_url) = dotenvy::var(BASE_URL_ENV_VAR) {
            tracing::trace!("Using base_url from {BASE_URL_ENV_VAR}");
            config.base_url = base_url;
        }
        if let Ok(timeout) = dotenvy::var(TIMEOUT_ENV_VAR) {
            let secs: u64 = timeout.trim().parse().map_err(|e| ClientError::InvalidConfig {
                field: TIMEOUT_ENV_VAR,
                reason: format!("{timeout:?} is not a whole number of seconds: {e}"),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Ok(api_key) = dotenvy::var(API_KEY_ENV_VAR) {
            tracing::trace!("Successfully loaded api_key from {API_KEY_ENV_VAR}");
            config.api_key = Some(Secret::new(api_key));
        }
        Ok(config)
    }

    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    /// The deadline to hand to the http client; zero means none.
    pub(crate) fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }
}
