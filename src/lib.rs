//! `LLMPress`: a lossless text compressor that uses a language model's
//! next-token predictions as a shared predictor between encoder and
//! decoder.
//!
//! The encoder replaces each predictable token with its rank in the
//! model's top-`W` prediction list; unpredictable tokens are emitted
//! verbatim. The decoder runs the same model over the same recovered
//! prefix and reconstructs each token from its rank, so the output is
//! bit-exact.
//!
//! The public entry points are [`pipeline::compress_text`] /
//! [`pipeline::compress_bytes`] / [`pipeline::compress_path`] and their
//! `decompress_*` counterparts, parameterized by a [`predictor::Predictor`]
//! implementation.

pub mod chunking;
pub mod cli;
pub mod codec;
pub mod error;
pub mod pipeline;
pub mod predictor;
pub mod rank;
pub mod symbol;

pub use error::{LlmPressError, PredictorError, Result};
pub use predictor::{HttpPredictor, Predictor, PredictorConfig};
pub use symbol::Symbol;
