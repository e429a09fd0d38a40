//! Predictor client configuration with builder pattern and environment
//! variable support.
//!
//! Configuration is resolved in order: explicit values → environment
//! variables → defaults.

use std::time::Duration;

/// Default base URL of the predictor service.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default maximum retry attempts per request.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the predictor HTTP client.
///
/// The sliding context window (the `k` in `top_k`) is not part of this
/// config: it's a rank-encoder/decoder concern carried by
/// [`crate::pipeline::CompressOptions`] for compression, and recovered from
/// the stream itself for decompression. The predictor client never reads it.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Base URL of the predictor service (e.g. `http://127.0.0.1:8000`).
    pub base_url: String,
    /// Optional bearer token for authenticating with the predictor service.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts per request.
    pub max_retries: u32,
}

impl PredictorConfig {
    /// Creates a new builder for `PredictorConfig`.
    #[must_use]
    pub fn builder() -> PredictorConfigBuilder {
        PredictorConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder().from_env().build()
    }
}

/// Builder for [`PredictorConfig`].
#[derive(Debug, Clone, Default)]
pub struct PredictorConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl PredictorConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.base_url.is_none() {
            self.base_url = std::env::var("LLMPRESS_PREDICTOR_URL").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("LLMPRESS_API_KEY").ok();
        }
        if self.timeout.is_none() {
            self.timeout = std::env::var("LLMPRESS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.max_retries.is_none() {
            self.max_retries = std::env::var("LLMPRESS_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the predictor service base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the bearer token used to authenticate with the predictor service.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum retry attempts.
    #[must_use]
    pub const fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Builds the [`PredictorConfig`].
    #[must_use]
    pub fn build(self) -> PredictorConfig {
        PredictorConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: self.api_key,
            timeout: self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }
}
