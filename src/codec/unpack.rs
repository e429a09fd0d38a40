//! Inverse of [`super::pack`]: reads one symbol-group at a time by
//! dispatching on the two high bits of the lead byte (and the `0xFF`
//! sentinel for `Break`).

use crate::error::{LlmPressError, Result};
use crate::symbol::Symbol;

use super::literal::{decode_literal, LEAD_TAG_MASK, LITERAL_START_TAG};
use super::pack::BREAK_BYTE;

const RANK_TAG: u8 = 0b0000_0000;
const DOUBLE_TAG: u8 = 0b0100_0000;
const ZERO_RUN_TAG: u8 = 0b1100_0000;

/// Unpacks a byte stream into its window size and symbol sequence.
///
/// # Errors
///
/// Returns [`LlmPressError::Decoding`] if `bytes` is empty, if the leading
/// window literal is malformed, or if any symbol group is truncated or
/// uses an invalid lead byte.
pub fn unpack(bytes: &[u8]) -> Result<(u32, Vec<Symbol>)> {
    if bytes.is_empty() {
        return Err(LlmPressError::Decoding {
            byte_offset: 0,
            reason: "empty input has no window-size prefix".to_string(),
        });
    }

    let (window, consumed) = decode_literal(bytes, 0)?;
    let mut symbols = Vec::new();
    let mut idx = consumed;

    while idx < bytes.len() {
        let b = bytes[idx];
        if b == BREAK_BYTE {
            symbols.push(Symbol::Break);
            idx += 1;
            continue;
        }
        match b & LEAD_TAG_MASK {
            RANK_TAG => {
                symbols.push(Symbol::Rank(u32::from(b & 0x3F)));
                idx += 1;
            }
            DOUBLE_TAG => {
                let r1 = (b >> 3) & 0x07;
                let r2 = b & 0x07;
                symbols.push(Symbol::Rank(u32::from(r1)));
                symbols.push(Symbol::Rank(u32::from(r2)));
                idx += 1;
            }
            LITERAL_START_TAG => {
                let (value, len) = decode_literal(bytes, idx)?;
                symbols.push(Symbol::Literal(value));
                idx += len;
            }
            ZERO_RUN_TAG => {
                let count = usize::from(b & 0x3F);
                symbols.extend(std::iter::repeat_n(Symbol::Rank(0), count));
                idx += 1;
            }
            _ => unreachable!("all four 2-bit tags are covered above"),
        }
    }

    Ok((window, symbols))
}
