//! Serializes `(window, symbols)` to the wire format described in
//! `SPEC_FULL.md` §6.1.
//!
//! | Bits 7-6 | Meaning            | Payload                                  |
//! |----------|--------------------|-------------------------------------------|
//! | `00`     | single rank        | 6-bit rank                                |
//! | `01`     | double rank        | two 3-bit ranks                           |
//! | `10`     | literal start      | see [`super::literal`]                    |
//! | `11`     | continuous zeros   | 6-bit count (`0x3F`/`0xFF` = `Break`)     |

use crate::error::{LlmPressError, Result};
use crate::symbol::Symbol;

use super::literal::encode_literal;

/// Single-byte sentinel marking a chunk boundary.
pub const BREAK_BYTE: u8 = 0xFF;
/// Maximum payload of a continuous-zero-run byte (0x3F is reserved for `Break`).
const MAX_ZERO_RUN: usize = 62;
/// Ranks below this value can be packed two-to-a-byte.
const DOUBLE_RANK_LIMIT: u32 = 8;
/// Ranks below this value fit a single-rank byte.
const SINGLE_RANK_LIMIT: u32 = 64;

/// Packs `symbols` into bytes, prefixed by `window` encoded as a literal.
///
/// Emission follows a greedy precedence at each position: `Break`, then a
/// zero-run byte (if the next two or more symbols are `Rank(0)`), then a
/// double-rank byte (if the next two symbols are both `Rank(<8)`), then a
/// single-rank byte, and finally a multi-byte literal.
///
/// # Errors
///
/// Returns [`LlmPressError::Encoding`] if a `Rank` is `>= 64` or a `Literal`
/// is `>= 2^26`.
pub fn pack(window: u32, symbols: &[Symbol]) -> Result<Vec<u8>> {
    let mut out = encode_literal(window, 0, 0)?;
    let mut i = 0;
    while i < symbols.len() {
        match symbols[i] {
            Symbol::Break => {
                out.push(BREAK_BYTE);
                i += 1;
            }
            Symbol::Rank(0) if zero_run_len(&symbols[i..]) >= 2 => {
                let run = zero_run_len(&symbols[i..]).min(MAX_ZERO_RUN);
                #[allow(clippy::cast_possible_truncation)] // run <= MAX_ZERO_RUN (62)
                out.push(0b1100_0000 | run as u8);
                i += run;
            }
            Symbol::Rank(r1) if r1 < DOUBLE_RANK_LIMIT && matches!(symbols.get(i + 1), Some(&Symbol::Rank(r2)) if r2 < DOUBLE_RANK_LIMIT) => {
                let Some(&Symbol::Rank(r2)) = symbols.get(i + 1) else {
                    unreachable!("guarded by the match arm above")
                };
                #[allow(clippy::cast_possible_truncation)] // r1, r2 < 8 per the match guard
                out.push(0b0100_0000 | ((r1 as u8) << 3) | r2 as u8);
                i += 2;
            }
            Symbol::Rank(r) if r < SINGLE_RANK_LIMIT => {
                #[allow(clippy::cast_possible_truncation)] // r < 64 per the match guard
                out.push(r as u8);
                i += 1;
            }
            Symbol::Rank(r) => {
                return Err(LlmPressError::Encoding {
                    chunk_index: 0,
                    token_index: i,
                    reason: format!("rank {r} is out of range 0..64"),
                });
            }
            Symbol::Literal(value) => {
                out.extend(encode_literal(value, 0, i)?);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Counts the run of consecutive `Rank(0)` symbols at the start of `tail`.
fn zero_run_len(tail: &[Symbol]) -> usize {
    tail.iter().take_while(|s| s.is_zero_rank()).count()
}
