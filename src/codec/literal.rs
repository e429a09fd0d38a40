//! Variable-length literal encoding shared by the byte packer and unpacker.
//!
//! A literal encodes an unsigned integer across 2, 3, or 4 bytes. The start
//! byte always begins `10` (bits 7-6) and carries the top 6 bits of the
//! value. A byte in continuation position is the *stop* byte exactly when
//! its bit 7 is set; middle bytes (bit 7 clear) carry 7 payload bits, but the
//! stop byte carries only 6, so it can never reach `0xFF` — this is the rule
//! that keeps the `Break` sentinel unambiguous (see the format's resolved
//! open question in `SPEC_FULL.md` §9).

// Every `as u8` below is an intentional bit-slice (each value is masked to
// 6 or 7 payload bits immediately before or after truncation), not a bug.
#![allow(clippy::cast_possible_truncation)]

use crate::error::LlmPressError;

/// Lead-byte tag for the start of a multi-byte literal (`10xxxxxx`).
pub(crate) const LITERAL_START_TAG: u8 = 0b1000_0000;
/// Mask isolating the two high dispatch bits of a lead byte.
pub(crate) const LEAD_TAG_MASK: u8 = 0b1100_0000;

/// The stop byte carries only 6 payload bits (bit 6 fixed at 0), not 7: this
/// is what keeps `0xFF` (`11 111111`) unreachable by any literal, since the
/// widest a stop byte can be is `0xBF`.
const STOP_PAYLOAD_BITS: u32 = 6;
const MID_PAYLOAD_BITS: u32 = 7;

const MAX_2_BYTE: u32 = 1 << (6 + STOP_PAYLOAD_BITS);
const MAX_3_BYTE: u32 = 1 << (6 + MID_PAYLOAD_BITS + STOP_PAYLOAD_BITS);
const MAX_4_BYTE: u32 = 1 << (6 + 2 * MID_PAYLOAD_BITS + STOP_PAYLOAD_BITS);

/// Encodes `value` as the narrowest literal width that fits it.
///
/// # Errors
///
/// Returns [`LlmPressError::Encoding`] if `value` does not fit in 26 bits.
pub fn encode_literal(value: u32, chunk_index: usize, token_index: usize) -> crate::error::Result<Vec<u8>> {
    if value < MAX_2_BYTE {
        let start = LITERAL_START_TAG | ((value >> STOP_PAYLOAD_BITS) as u8 & 0x3F);
        let stop = 0x80 | (value as u8 & 0x3F);
        Ok(vec![start, stop])
    } else if value < MAX_3_BYTE {
        let start = LITERAL_START_TAG | ((value >> (MID_PAYLOAD_BITS + STOP_PAYLOAD_BITS)) as u8 & 0x3F);
        let mid = (value >> STOP_PAYLOAD_BITS) as u8 & 0x7F;
        let stop = 0x80 | (value as u8 & 0x3F);
        Ok(vec![start, mid, stop])
    } else if value < MAX_4_BYTE {
        let start = LITERAL_START_TAG | ((value >> (2 * MID_PAYLOAD_BITS + STOP_PAYLOAD_BITS)) as u8 & 0x3F);
        let mid1 = (value >> (MID_PAYLOAD_BITS + STOP_PAYLOAD_BITS)) as u8 & 0x7F;
        let mid2 = (value >> STOP_PAYLOAD_BITS) as u8 & 0x7F;
        let stop = 0x80 | (value as u8 & 0x3F);
        Ok(vec![start, mid1, mid2, stop])
    } else {
        Err(LlmPressError::Encoding {
            chunk_index,
            token_index,
            reason: format!("literal value {value} does not fit in 26 bits"),
        })
    }
}

/// Decodes the literal starting at `bytes[idx]`, returning the value and the
/// number of bytes consumed.
///
/// # Errors
///
/// Returns [`LlmPressError::Decoding`] if `bytes[idx]` is not a valid
/// literal start byte, or if the literal is truncated (no stop byte found
/// within the maximum 4-byte width).
pub fn decode_literal(bytes: &[u8], idx: usize) -> crate::error::Result<(u32, usize)> {
    let start = *bytes.get(idx).ok_or_else(|| LlmPressError::Decoding {
        byte_offset: idx,
        reason: "literal start byte missing".to_string(),
    })?;
    if start & LEAD_TAG_MASK != LITERAL_START_TAG {
        return Err(LlmPressError::Decoding {
            byte_offset: idx,
            reason: format!("byte 0x{start:02X} is not a valid literal start"),
        });
    }
    let mut acc = u32::from(start & 0x3F);

    // Up to two middle bytes (bit 7 clear, 7-bit payload), then a stop byte
    // (bit 7 set, 6-bit payload).
    let mut mid_count = 0;
    let mut cursor = idx + 1;
    loop {
        let b = *bytes.get(cursor).ok_or_else(|| LlmPressError::Decoding {
            byte_offset: idx,
            reason: "truncated literal: no stop byte before end of stream".to_string(),
        })?;
        cursor += 1;
        if b & 0x80 != 0 {
            acc = (acc << STOP_PAYLOAD_BITS) | u32::from(b & 0x3F);
            break;
        }
        if mid_count >= 2 {
            return Err(LlmPressError::Decoding {
                byte_offset: idx,
                reason: "literal exceeds the maximum supported width of 4 bytes".to_string(),
            });
        }
        acc = (acc << MID_PAYLOAD_BITS) | u32::from(b & 0x7F);
        mid_count += 1;
    }

    Ok((acc, cursor - idx))
}
