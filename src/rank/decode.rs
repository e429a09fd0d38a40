//! Converts one chunk's [`Symbol`] sequence back into a token sequence.

use crate::error::{LlmPressError, Result};
use crate::predictor::Predictor;
use crate::symbol::Symbol;

/// Rank-decodes `symbols` against `predictor`, using a sliding context of at
/// most `window` trailing tokens — the inverse of [`super::encode_chunk`].
///
/// # Errors
///
/// Returns [`LlmPressError::Decoding`] if the run is empty, if its first
/// symbol is a `Rank` (no context exists yet), or if any `Rank(r)` has
/// `r >= window`. Returns [`LlmPressError::Tokenization`] if a `top_k` call
/// fails.
pub async fn decode_chunk(
    predictor: &dyn Predictor,
    symbols: &[Symbol],
    window: u32,
    chunk_index: usize,
) -> Result<Vec<u32>> {
    let Some((first, rest)) = symbols.split_first() else {
        return Ok(Vec::new());
    };

    let Symbol::Literal(first_token) = *first else {
        return Err(LlmPressError::Decoding {
            byte_offset: 0,
            reason: format!("chunk {chunk_index}: first symbol of a chunk must be Literal"),
        });
    };

    let mut tokens = vec![first_token];
    for (i, symbol) in rest.iter().enumerate() {
        match *symbol {
            Symbol::Literal(id) => tokens.push(id),
            Symbol::Rank(r) => {
                if r >= window {
                    return Err(LlmPressError::Decoding {
                        byte_offset: i + 1,
                        reason: format!("chunk {chunk_index}: rank {r} is out of range [0, {window})"),
                    });
                }
                let start = tokens.len().saturating_sub(window as usize);
                let ranks = predictor
                    .top_k(&tokens[start..], window)
                    .await
                    .map_err(|source| LlmPressError::Tokenization {
                        operation: "top_k",
                        chunk_index: Some(chunk_index),
                        source,
                    })?;
                let token = *ranks.get(r as usize).ok_or_else(|| LlmPressError::Decoding {
                    byte_offset: i + 1,
                    reason: format!(
                        "chunk {chunk_index}: predictor returned {} candidates, rank {r} unavailable",
                        ranks.len()
                    ),
                })?;
                tokens.push(token);
            }
            Symbol::Break => {
                return Err(LlmPressError::Decoding {
                    byte_offset: i + 1,
                    reason: format!("chunk {chunk_index}: Break symbol inside a chunk run"),
                });
            }
        }
    }

    Ok(tokens)
}
