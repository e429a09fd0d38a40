//! The compressor/decompressor facade: wires the chunker, predictor client,
//! rank encoder/decoder, and byte packer/unpacker into the two public
//! operations described in `SPEC_FULL.md` §4.7/§6.3.

mod compress;
mod decompress;

pub use compress::{compress_bytes, compress_path, compress_text, CompressOptions, CompressionReport};
pub use decompress::{decompress_bytes, decompress_path};

/// A pipeline stage, reported to an optional [`Observer`] as work proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Partitioning the input into chunks.
    Chunking,
    /// Tokenizing a chunk via the predictor client.
    Tokenizing,
    /// Rank-encoding a chunk's token sequence into symbols.
    Encoding,
    /// Byte-packing the full symbol sequence.
    Packing,
    /// Byte-unpacking the stream into a window size and symbol sequence.
    Unpacking,
    /// Rank-decoding a chunk's symbol run into tokens.
    Decoding,
    /// Detokenizing a chunk's token sequence back into text.
    Detokenizing,
}

/// Progress callback invoked as `(stage, index, total)`. Entirely optional;
/// every pipeline function is fully usable without one.
pub type Observer<'a> = dyn Fn(Stage, usize, usize) + Send + Sync + 'a;

pub(crate) const DEFAULT_WINDOW: u32 = 64;
pub(crate) const DEFAULT_MIN_CHUNK: usize = 100;
pub(crate) const DEFAULT_MAX_CHUNK: usize = 500;
/// Default cap on concurrent in-flight chunks, per `SPEC_FULL.md` §5's
/// "semaphore sized from configuration" requirement.
pub(crate) const DEFAULT_MAX_CONCURRENCY: usize = 8;
