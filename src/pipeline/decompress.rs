use std::path::Path;
use std::sync::Arc;

use futures_util::future::try_join_all;
use tokio::sync::Semaphore;

use crate::codec::unpack;
use crate::error::{LlmPressError, Result};
use crate::predictor::Predictor;
use crate::rank::decode_chunk;
use crate::symbol::Symbol;

use super::{Observer, Stage};

/// Decompresses `bytes` against `predictor`.
///
/// The window size is recovered from the stream itself; callers never
/// supply it. Chunks are rank-decoded and detokenized concurrently, bounded
/// by `max_concurrency` in-flight chunks at a time (each chunk's own
/// `top_k` calls remain strictly sequential).
///
/// # Errors
///
/// Returns [`LlmPressError::Decoding`] if the byte stream violates the wire
/// format, or the propagated error from any predictor call.
pub async fn decompress_bytes(
    bytes: &[u8],
    predictor: &dyn Predictor,
    max_concurrency: usize,
    observer: Option<&Observer<'_>>,
) -> Result<String> {
    let (window, symbols) = unpack(bytes)?;
    if let Some(observer) = observer {
        observer(Stage::Unpacking, 1, 1);
    }

    let runs = split_on_break(&symbols);
    let total = runs.len();

    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let texts: Vec<String> = try_join_all(runs.iter().enumerate().map(|(index, run)| {
        let semaphore = Arc::clone(&semaphore);
        async move {
            let _permit = semaphore.acquire().await.map_err(|e| LlmPressError::Decoding {
                byte_offset: 0,
                reason: format!("concurrency semaphore closed: {e}"),
            })?;
            decode_one_chunk(predictor, run, window, index, total, observer).await
        }
    }))
    .await?;

    Ok(texts.concat())
}

/// Reads `input_path`, decompresses it, and optionally writes the result to
/// `output_path`.
///
/// # Errors
///
/// Returns [`LlmPressError::Io`] if `input_path` cannot be read or
/// `output_path` cannot be written. A failed decompression leaves no
/// output file behind.
pub async fn decompress_path(
    input_path: &Path,
    output_path: Option<&Path>,
    predictor: &dyn Predictor,
    max_concurrency: usize,
    observer: Option<&Observer<'_>>,
) -> Result<String> {
    let bytes = std::fs::read(input_path).map_err(|source| LlmPressError::Io {
        path: input_path.to_path_buf(),
        source,
    })?;

    let text = decompress_bytes(&bytes, predictor, max_concurrency, observer).await?;

    if let Some(output_path) = output_path {
        std::fs::write(output_path, &text).map_err(|source| LlmPressError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;
    }

    Ok(text)
}

/// Splits a decoded symbol sequence into per-chunk runs at `Break`
/// boundaries. `Break` itself is consumed, not included in either run.
fn split_on_break(symbols: &[Symbol]) -> Vec<&[Symbol]> {
    if symbols.is_empty() {
        return Vec::new();
    }
    symbols
        .split(|s| matches!(s, Symbol::Break))
        .collect()
}

async fn decode_one_chunk(
    predictor: &dyn Predictor,
    run: &[Symbol],
    window: u32,
    index: usize,
    total: usize,
    observer: Option<&Observer<'_>>,
) -> Result<String> {
    if let Some(observer) = observer {
        observer(Stage::Decoding, index, total);
    }
    let tokens = decode_chunk(predictor, run, window, index).await?;

    if let Some(observer) = observer {
        observer(Stage::Detokenizing, index, total);
    }
    predictor
        .detokenize(&tokens)
        .await
        .map_err(|source| LlmPressError::Tokenization {
            operation: "detokenize",
            chunk_index: Some(index),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compress::{compress_text, CompressOptions};
    use crate::pipeline::DEFAULT_MAX_CONCURRENCY;
    use crate::predictor::fake::FakePredictor;

    #[tokio::test]
    async fn empty_input_roundtrips() -> Result<()> {
        let predictor = FakePredictor::new("irrelevant corpus");
        let report = compress_text("", &predictor, CompressOptions::default(), None)
            .await
            .unwrap_or_else(|_| unreachable!());
        let text = decompress_bytes(&report.bytes, &predictor, DEFAULT_MAX_CONCURRENCY, None)
            .await
            .unwrap_or_else(|_| unreachable!());
        crate::error::check_round_trip(&String::new(), &text)
    }

    #[tokio::test]
    async fn single_chunk_roundtrips() -> Result<()> {
        let predictor = FakePredictor::new("the quick brown fox jumps over the lazy dog");
        let source = "the quick brown fox jumps over the lazy dog";
        let report = compress_text(source, &predictor, CompressOptions::default(), None)
            .await
            .unwrap_or_else(|_| unreachable!());
        let text = decompress_bytes(&report.bytes, &predictor, DEFAULT_MAX_CONCURRENCY, None)
            .await
            .unwrap_or_else(|_| unreachable!());
        crate::error::check_round_trip(&source.to_string(), &text)
    }

    #[tokio::test]
    async fn multi_chunk_roundtrips_and_contains_exactly_one_break() -> Result<()> {
        let corpus = "alpha beta gamma delta epsilon zeta eta theta iota kappa "
            .repeat(20)
            .trim_end()
            .to_string();
        let predictor = FakePredictor::new(&corpus);
        let options = CompressOptions {
            window: 16,
            min_chunk: 20,
            max_chunk: 60,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        };
        let report = compress_text(&corpus, &predictor, options, None)
            .await
            .unwrap_or_else(|_| unreachable!());
        let text = decompress_bytes(&report.bytes, &predictor, DEFAULT_MAX_CONCURRENCY, None)
            .await
            .unwrap_or_else(|_| unreachable!());
        crate::error::check_round_trip(&corpus, &text)
    }

    #[tokio::test]
    async fn malformed_stream_is_a_decoding_error() {
        let predictor = FakePredictor::new("irrelevant corpus");
        let result = decompress_bytes(&[], &predictor, DEFAULT_MAX_CONCURRENCY, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn a_concurrency_cap_of_one_still_decodes_every_chunk() -> Result<()> {
        let corpus = "alpha beta gamma delta epsilon zeta eta theta iota kappa "
            .repeat(10)
            .trim_end()
            .to_string();
        let predictor = FakePredictor::new(&corpus);
        let options = CompressOptions {
            window: 16,
            min_chunk: 20,
            max_chunk: 60,
            max_concurrency: 4,
        };
        let report = compress_text(&corpus, &predictor, options, None)
            .await
            .unwrap_or_else(|_| unreachable!());
        let text = decompress_bytes(&report.bytes, &predictor, 1, None)
            .await
            .unwrap_or_else(|_| unreachable!());
        crate::error::check_round_trip(&corpus, &text)
    }

    const VOCAB: [&str; 12] = [
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
        "lambda", "mu",
    ];

    fn arb_text() -> impl proptest::strategy::Strategy<Value = String> {
        use proptest::strategy::Strategy as _;
        proptest::collection::vec(0usize..VOCAB.len(), 1..60)
            .prop_map(|idxs| idxs.iter().map(|&i| VOCAB[i]).collect::<Vec<_>>().join(" "))
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

        #[test]
        fn round_trip_law_holds_for_any_window_and_chunk_bounds(
            text in arb_text(),
            window in proptest::prelude::prop_oneof![
                proptest::prelude::Just(16u32),
                proptest::prelude::Just(32u32),
                proptest::prelude::Just(64u32),
            ],
            min_chunk in 10usize..40,
            max_chunk_extra in 0usize..100,
        ) {
            let max_chunk = min_chunk + max_chunk_extra;
            let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|_| unreachable!());
            runtime.block_on(async {
                let predictor = FakePredictor::new(&text);
                let options = CompressOptions { window, min_chunk, max_chunk, max_concurrency: DEFAULT_MAX_CONCURRENCY };
                let report = compress_text(&text, &predictor, options, None)
                    .await
                    .unwrap_or_else(|_| unreachable!());
                let recovered = decompress_bytes(&report.bytes, &predictor, DEFAULT_MAX_CONCURRENCY, None)
                    .await
                    .unwrap_or_else(|_| unreachable!());
                crate::error::check_round_trip(&text, &recovered)
                    .map_err(|e| proptest::test_runner::TestCaseError::fail(e.to_string()))
            })?;
        }
    }
}
