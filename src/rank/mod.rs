//! Rank encoder and decoder.
//!
//! Implements the sliding-context discipline described in `SPEC_FULL.md`
//! §4.3/§4.4: these convert between a chunk's token sequence and its
//! [`Symbol`] sequence by querying a [`Predictor`] for the top-`W`
//! candidates at each position.

mod decode;
mod encode;

pub use decode::decode_chunk;
pub use encode::encode_chunk;
