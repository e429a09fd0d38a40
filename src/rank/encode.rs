//! Converts one chunk's token sequence into a [`Symbol`] sequence.

use crate::error::{LlmPressError, Result};
use crate::predictor::Predictor;
use crate::symbol::Symbol;

/// Rank-encodes `tokens` against `predictor`, using a sliding context of at
/// most `window` trailing tokens.
///
/// The first token is always emitted as `Literal`, since it has no context.
/// Every subsequent token is emitted as `Rank(r)` if it appears in the
/// predictor's top-`window` candidates for the tokens seen so far (bounded
/// to the last `window`), otherwise as `Literal`.
///
/// # Errors
///
/// Returns [`LlmPressError::Tokenization`] if any `top_k` call fails.
pub async fn encode_chunk(
    predictor: &dyn Predictor,
    tokens: &[u32],
    window: u32,
    chunk_index: usize,
) -> Result<Vec<Symbol>> {
    let Some((&first, rest)) = tokens.split_first() else {
        return Ok(Vec::new());
    };

    let mut symbols = Vec::with_capacity(tokens.len());
    symbols.push(Symbol::Literal(first));

    let mut context = vec![first];
    for &token in rest {
        let start = context.len().saturating_sub(window as usize);
        let ranks = predictor
            .top_k(&context[start..], window)
            .await
            .map_err(|source| LlmPressError::Tokenization {
                operation: "top_k",
                chunk_index: Some(chunk_index),
                source,
            })?;

        match ranks.iter().position(|&candidate| candidate == token) {
            // `r < ranks.len() <= window`, well within u32 range.
            #[allow(clippy::cast_possible_truncation)]
            Some(r) => symbols.push(Symbol::Rank(r as u32)),
            None => symbols.push(Symbol::Literal(token)),
        }
        context.push(token);
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::fake::FakePredictor;

    #[tokio::test]
    async fn first_token_is_always_a_literal() {
        let predictor = FakePredictor::new("the quick brown fox");
        let tokens = predictor.tokenize("the quick brown fox").await.unwrap_or_else(|_| unreachable!());
        let symbols = encode_chunk(&predictor, &tokens, 4, 0).await.unwrap_or_else(|_| unreachable!());
        assert_eq!(symbols.first(), Some(&Symbol::Literal(tokens[0])));
    }

    #[tokio::test]
    async fn predictable_continuation_encodes_as_rank() {
        let predictor = FakePredictor::new("the quick brown fox jumps");
        let tokens = predictor
            .tokenize("the quick brown fox jumps")
            .await
            .unwrap_or_else(|_| unreachable!());
        let symbols = encode_chunk(&predictor, &tokens, 4, 0).await.unwrap_or_else(|_| unreachable!());
        assert!(symbols.iter().skip(1).any(|s| matches!(s, Symbol::Rank(_))));
    }

    #[tokio::test]
    async fn empty_token_sequence_encodes_to_no_symbols() {
        let predictor = FakePredictor::new("irrelevant corpus");
        let symbols = encode_chunk(&predictor, &[], 4, 0).await.unwrap_or_else(|_| unreachable!());
        assert!(symbols.is_empty());
    }

    const VOCAB: [&str; 10] = [
        "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta", "iota", "kappa",
    ];

    fn arb_text() -> impl proptest::strategy::Strategy<Value = String> {
        use proptest::strategy::Strategy as _;
        proptest::collection::vec(0usize..VOCAB.len(), 1..40)
            .prop_map(|idxs| idxs.iter().map(|&i| VOCAB[i]).collect::<Vec<_>>().join(" "))
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(32))]

        #[test]
        fn every_rank_symbol_stays_below_window(
            text in arb_text(),
            window in 1u32..16,
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|_| unreachable!());
            runtime.block_on(async {
                let predictor = FakePredictor::new(&text);
                let tokens = predictor.tokenize(&text).await.unwrap_or_else(|_| unreachable!());
                let symbols = encode_chunk(&predictor, &tokens, window, 0)
                    .await
                    .unwrap_or_else(|_| unreachable!());
                for symbol in &symbols {
                    if let Some(r) = symbol.as_rank() {
                        proptest::prop_assert!(r < window);
                    }
                }
                Ok(())
            })?;
        }
    }
}
