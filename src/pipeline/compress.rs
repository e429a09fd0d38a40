use std::path::Path;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tokio::sync::Semaphore;

use crate::chunking::chunk_bytes;
use crate::codec::pack;
use crate::error::{LlmPressError, Result};
use crate::predictor::Predictor;
use crate::rank::encode_chunk;
use crate::symbol::Symbol;

use super::{Observer, Stage, DEFAULT_MAX_CHUNK, DEFAULT_MAX_CONCURRENCY, DEFAULT_MIN_CHUNK, DEFAULT_WINDOW};

/// Tuning parameters for [`compress_bytes`] and friends.
#[derive(Debug, Clone, Copy)]
pub struct CompressOptions {
    /// Sliding context window size, in tokens. Also the `k` passed to
    /// `top_k` at every prediction.
    pub window: u32,
    /// Minimum chunk size in UTF-8 bytes.
    pub min_chunk: usize,
    /// Maximum chunk size in UTF-8 bytes.
    pub max_chunk: usize,
    /// Maximum number of chunks tokenized/encoded concurrently.
    pub max_concurrency: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            min_chunk: DEFAULT_MIN_CHUNK,
            max_chunk: DEFAULT_MAX_CHUNK,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Result of a successful compression.
#[derive(Debug, Clone)]
pub struct CompressionReport {
    /// The packed byte stream.
    pub bytes: Vec<u8>,
    /// Size of the original input, in bytes.
    pub original_size: usize,
    /// Size of the packed output, in bytes.
    pub compressed_size: usize,
}

/// Compresses `text` against `predictor` per `options`.
///
/// Chunks are tokenized and rank-encoded concurrently, bounded by
/// `options.max_concurrency` in-flight chunks at a time (each chunk's own
/// `top_k` calls remain strictly sequential); independent chunks have no
/// ordering requirement between each other per `SPEC_FULL.md` §5.
///
/// # Errors
///
/// Returns [`LlmPressError::Chunking`] if the chunker cannot guarantee
/// reconstructive concatenation, or the propagated error from any
/// predictor call.
pub async fn compress_text(
    text: &str,
    predictor: &dyn Predictor,
    options: CompressOptions,
    observer: Option<&Observer<'_>>,
) -> Result<CompressionReport> {
    let original_size = text.len();

    let chunks = chunk_bytes(text.as_bytes(), options.min_chunk, options.max_chunk)?;
    if let Some(observer) = observer {
        observer(Stage::Chunking, chunks.len(), chunks.len());
    }

    let total = chunks.len();
    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.max(1)));
    let encoded: Vec<Vec<Symbol>> = try_join_all(chunks.iter().enumerate().map(|(index, chunk)| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire().await.map_err(|e| LlmPressError::Encoding {
                chunk_index: index,
                token_index: 0,
                reason: format!("concurrency semaphore closed: {e}"),
            })?;
            encode_one_chunk(predictor, chunk, options.window, index, total, observer).await
        }
    }))
    .await?;

    let mut symbols = Vec::new();
    for (index, mut chunk_symbols) in encoded.into_iter().enumerate() {
        if index > 0 {
            symbols.push(Symbol::Break);
        }
        symbols.append(&mut chunk_symbols);
    }

    if let Some(observer) = observer {
        observer(Stage::Packing, 1, 1);
    }
    let bytes = pack(options.window, &symbols)?;
    let compressed_size = bytes.len();

    Ok(CompressionReport {
        bytes,
        original_size,
        compressed_size,
    })
}

/// Compresses raw `bytes` (must be valid UTF-8 text).
///
/// # Errors
///
/// Same as [`compress_text`], plus [`LlmPressError::Chunking`] if `bytes`
/// is not valid UTF-8.
pub async fn compress_bytes(
    bytes: &[u8],
    predictor: &dyn Predictor,
    options: CompressOptions,
    observer: Option<&Observer<'_>>,
) -> Result<CompressionReport> {
    let text = std::str::from_utf8(bytes).map_err(|e| LlmPressError::Chunking {
        reason: format!("input is not valid UTF-8 text: {e}"),
    })?;
    compress_text(text, predictor, options, observer).await
}

/// Reads `input_path`, compresses it, and optionally writes the result to
/// `output_path`.
///
/// # Errors
///
/// Returns [`LlmPressError::Io`] if `input_path` cannot be read or
/// `output_path` cannot be written. A failed compression leaves no output
/// file behind.
pub async fn compress_path(
    input_path: &Path,
    output_path: Option<&Path>,
    predictor: &dyn Predictor,
    options: CompressOptions,
    observer: Option<&Observer<'_>>,
) -> Result<CompressionReport> {
    let bytes = std::fs::read(input_path).map_err(|source| LlmPressError::Io {
        path: input_path.to_path_buf(),
        source,
    })?;

    let report = compress_bytes(&bytes, predictor, options, observer).await?;

    if let Some(output_path) = output_path {
        std::fs::write(output_path, &report.bytes).map_err(|source| LlmPressError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;
    }

    Ok(report)
}

async fn encode_one_chunk(
    predictor: &dyn Predictor,
    chunk: &str,
    window: u32,
    index: usize,
    total: usize,
    observer: Option<&Observer<'_>>,
) -> Result<Vec<Symbol>> {
    if let Some(observer) = observer {
        observer(Stage::Tokenizing, index, total);
    }
    let tokens = predictor
        .tokenize(chunk)
        .await
        .map_err(|source| LlmPressError::Tokenization {
            operation: "tokenize",
            chunk_index: Some(index),
            source,
        })?;

    if let Some(observer) = observer {
        observer(Stage::Encoding, index, total);
    }
    encode_chunk(predictor, &tokens, window, index).await
}
