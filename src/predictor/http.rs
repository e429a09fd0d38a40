//! HTTP transport for the [`Predictor`] trait, backed by `reqwest` with
//! bounded exponential-backoff retry on transport-class failures.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::PredictorError;

use super::{Predictor, PredictorConfig};

/// HTTP client for a remote predictor service exposing `/tokenize`,
/// `/detokenize`, and `/top_k` endpoints.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    http_client: reqwest::Client,
    config: PredictorConfig,
    backoff: backoff::ExponentialBackoff,
}

impl HttpPredictor {
    /// Builds an `HttpPredictor` from `config`, with a default exponential
    /// backoff policy bounded by `config.max_retries`.
    #[must_use]
    pub fn new(config: PredictorConfig) -> Self {
        let backoff = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(config.timeout * config.max_retries.max(1)))
            .build();
        Self {
            http_client: reqwest::Client::new(),
            config,
            backoff,
        }
    }

    /// Supplies a pre-configured `reqwest::Client` (useful for tests that
    /// need custom TLS or proxy settings).
    #[must_use]
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post<I, O>(&self, path: &str, operation: &'static str, body: &I) -> Result<O, PredictorError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        let url = self.url(path);
        let bytes = backoff::future::retry(self.backoff.clone(), || async {
            let mut request = self.http_client.post(&url).timeout(self.config.timeout).json(body);
            if let Some(key) = &self.config.api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().await.map_err(|e| to_backoff_error(classify_transport_error(&e)))?;

            let status = response.status();
            let bytes = response
                .bytes()
                .await
                .map_err(|err| to_backoff_error(PredictorError::Transport(err.to_string())))?;

            if status.as_u16() == 503 {
                tracing::warn!(%operation, "predictor service unavailable");
                return Err(to_backoff_error(PredictorError::Unavailable(
                    String::from_utf8_lossy(&bytes).into_owned(),
                )));
            }
            if !status.is_success() {
                return Err(to_backoff_error(PredictorError::Protocol(format!(
                    "{operation} returned HTTP {status}: {}",
                    String::from_utf8_lossy(&bytes)
                ))));
            }

            Ok(bytes)
        })
        .await?;

        serde_json::from_slice(&bytes)
            .map_err(|err| PredictorError::Protocol(format!("malformed {operation} response: {err}")))
    }
}

/// Classifies a `reqwest::Error` into the [`PredictorError`] category it
/// represents; retry eligibility is then decided solely by
/// [`PredictorError::is_retryable`], not by where the error originated.
fn classify_transport_error(err: &reqwest::Error) -> PredictorError {
    if err.is_timeout() {
        PredictorError::Timeout(Duration::default())
    } else if err.is_connect() {
        PredictorError::Transport(err.to_string())
    } else {
        PredictorError::Protocol(err.to_string())
    }
}

/// Wraps `err` for `backoff::future::retry`, deferring to
/// [`PredictorError::is_retryable`] as the single source of truth for which
/// failure categories are retried.
const fn to_backoff_error(err: PredictorError) -> backoff::Error<PredictorError> {
    if err.is_retryable() {
        backoff::Error::Transient { err, retry_after: None }
    } else {
        backoff::Error::Permanent(err)
    }
}

#[derive(Debug, Serialize)]
struct TokenizeRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenizeResponse {
    tokens: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct DetokenizeRequest<'a> {
    tokens: &'a [u32],
}

#[derive(Debug, Deserialize)]
struct DetokenizeResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct TopKRequest<'a> {
    context: &'a [u32],
    k: u32,
}

#[derive(Debug, Deserialize)]
struct TopKResponse {
    tokens: Vec<u32>,
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn tokenize(&self, text: &str) -> Result<Vec<u32>, PredictorError> {
        let response: TokenizeResponse = self
            .post("/tokenize", "tokenize", &TokenizeRequest { text })
            .await?;
        Ok(response.tokens)
    }

    async fn detokenize(&self, tokens: &[u32]) -> Result<String, PredictorError> {
        let response: DetokenizeResponse = self
            .post("/detokenize", "detokenize", &DetokenizeRequest { tokens })
            .await?;
        Ok(response.text)
    }

    async fn top_k(&self, context: &[u32], k: u32) -> Result<Vec<u32>, PredictorError> {
        let response: TopKResponse = self
            .post("/top_k", "top_k", &TopKRequest { context, k })
            .await?;
        validate_top_k_response(response.tokens, k)
    }
}

/// Validates that a `/top_k` response carries exactly `k` candidates.
///
/// `rank::encode_chunk` relies on every returned rank being strictly below
/// `window` (the `k` passed here), so a response with more than `k`
/// candidates is just as much a protocol violation as one with fewer.
fn validate_top_k_response(tokens: Vec<u32>, k: u32) -> Result<Vec<u32>, PredictorError> {
    if tokens.len() == k as usize {
        Ok(tokens)
    } else {
        Err(PredictorError::Protocol(format!(
            "top_k requested {k} candidates but received {}",
            tokens.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path_without_double_slash() {
        let config = PredictorConfig::builder().base_url("http://host:9000/").build();
        let predictor = HttpPredictor::new(config);
        assert_eq!(predictor.url("/tokenize"), "http://host:9000/tokenize");
    }

    #[test]
    fn unavailable_is_classified_permanent_not_retried() {
        // A 503 must not be retried: SPEC_FULL.md §6.2/§7 treat it as fatal
        // for the current operation, unlike transport/timeout failures.
        let err = to_backoff_error(PredictorError::Unavailable("maintenance".to_string()));
        assert!(matches!(err, backoff::Error::Permanent(PredictorError::Unavailable(_))));
    }

    #[test]
    fn protocol_errors_are_classified_permanent() {
        let err = to_backoff_error(PredictorError::Protocol("malformed body".to_string()));
        assert!(matches!(err, backoff::Error::Permanent(PredictorError::Protocol(_))));
    }

    #[test]
    fn transport_and_timeout_are_classified_transient() {
        let transport = to_backoff_error(PredictorError::Transport("connection reset".to_string()));
        assert!(matches!(
            transport,
            backoff::Error::Transient {
                err: PredictorError::Transport(_),
                ..
            }
        ));

        let timeout = to_backoff_error(PredictorError::Timeout(Duration::default()));
        assert!(matches!(
            timeout,
            backoff::Error::Transient {
                err: PredictorError::Timeout(_),
                ..
            }
        ));
    }

    #[test]
    fn top_k_response_with_too_few_candidates_is_rejected() {
        let result = validate_top_k_response(vec![1, 2, 3], 5);
        assert!(matches!(result, Err(PredictorError::Protocol(_))));
    }

    #[test]
    fn top_k_response_with_too_many_candidates_is_rejected() {
        let result = validate_top_k_response(vec![1, 2, 3, 4, 5, 6], 5);
        assert!(matches!(result, Err(PredictorError::Protocol(_))));
    }

    #[test]
    fn top_k_response_with_exactly_k_candidates_is_accepted() {
        let tokens = validate_top_k_response(vec![1, 2, 3], 3).unwrap_or_else(|_| unreachable!());
        assert_eq!(tokens, vec![1, 2, 3]);
    }

    #[test]
    fn classification_agrees_with_is_retryable() {
        for err in [
            PredictorError::Timeout(Duration::default()),
            PredictorError::Transport("x".to_string()),
            PredictorError::Protocol("x".to_string()),
            PredictorError::Unavailable("x".to_string()),
        ] {
            let retryable = err.is_retryable();
            let is_transient = matches!(to_backoff_error(err), backoff::Error::Transient { .. });
            assert_eq!(retryable, is_transient);
        }
    }
}
