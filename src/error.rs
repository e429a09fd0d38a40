//! Error types for the `LLMPress` codec and predictor client.
//!
//! Every fallible public operation returns one of the variants below rather
//! than a generic boxed error, so callers can match on the failure kind.
//! Each variant carries the operation name and any relevant index (chunk
//! index, byte offset) so the CLI can report a precise diagnostic.

use std::path::PathBuf;

/// The single outermost error kind surfaced by the codec and pipeline.
#[derive(Debug, thiserror::Error)]
pub enum LlmPressError {
    /// An input path was missing or unreadable, or an output path was unwritable.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path that could not be read or written.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The chunker could not guarantee reconstructive concatenation, even
    /// after falling back to fixed-size slicing.
    #[error("chunking failed: {reason}")]
    Chunking {
        /// Human-readable description of why chunking failed.
        reason: String,
    },

    /// A predictor-client operation failed.
    #[error("tokenization error during {operation} (chunk {chunk_index:?}): {source}")]
    Tokenization {
        /// Which predictor operation failed (`"tokenize"`, `"detokenize"`, `"top_k"`).
        operation: &'static str,
        /// The chunk being processed when the failure occurred, if known.
        chunk_index: Option<usize>,
        /// The underlying predictor error.
        #[source]
        source: PredictorError,
    },

    /// A symbol was outside the representable range (e.g. a rank `>= 64`,
    /// or a literal value `>= 2^26`).
    #[error("encoding error at chunk {chunk_index}, token {token_index}: {reason}")]
    Encoding {
        /// Index of the chunk being encoded.
        chunk_index: usize,
        /// Index of the token within the chunk.
        token_index: usize,
        /// Human-readable description of the constraint that was violated.
        reason: String,
    },

    /// The byte stream violated the wire format.
    #[error("decoding error at byte offset {byte_offset}: {reason}")]
    Decoding {
        /// Offset into the byte stream where the violation was detected.
        byte_offset: usize,
        /// Human-readable description of the violation.
        reason: String,
    },

    /// Decoded output did not round-trip to the original input.
    ///
    /// The algorithm is deterministic by construction, so production code
    /// should never raise this; it exists so tests can surface a mismatch
    /// as a typed error rather than a bare assertion failure.
    #[error("decompression mismatch: {reason}")]
    Mismatch {
        /// Human-readable description of where the mismatch was found.
        reason: String,
    },
}

/// Result alias used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, LlmPressError>;

/// Builds [`LlmPressError::Mismatch`] if `recovered` differs from `expected`.
///
/// Round-trip tests call this instead of a bare `assert_eq!` so a mismatch
/// is reported as the same typed error a caller would see if the
/// deterministic round-trip guarantee were ever violated outside tests.
#[cfg(test)]
pub(crate) fn check_round_trip<T: PartialEq + std::fmt::Debug>(expected: &T, recovered: &T) -> Result<()> {
    if expected == recovered {
        Ok(())
    } else {
        Err(LlmPressError::Mismatch {
            reason: format!("expected {expected:?}, got {recovered:?}"),
        })
    }
}

/// Error categories surfaced by a [`crate::predictor::Predictor`] implementation.
///
/// The core treats all categories as fatal for the current operation,
/// except that [`PredictorError::Timeout`] and [`PredictorError::Transport`]
/// may be retried a bounded number of times by the predictor client itself.
#[derive(Debug, thiserror::Error)]
pub enum PredictorError {
    /// The request did not complete before its deadline.
    #[error("predictor request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A connection-level failure (refused, reset, DNS, etc).
    #[error("predictor transport error: {0}")]
    Transport(String),

    /// The response was received but was malformed or violated the contract
    /// (e.g. `top_k` returned fewer than `k` ids).
    #[error("predictor protocol error: {0}")]
    Protocol(String),

    /// The service reported that it is not ready to serve requests.
    #[error("predictor unavailable: {0}")]
    Unavailable(String),
}

impl PredictorError {
    /// Whether this category of failure is eligible for retry.
    ///
    /// Only transport-level failures are retried; a malformed response or
    /// an explicit "not ready" signal is treated as fatal immediately.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_))
    }
}
