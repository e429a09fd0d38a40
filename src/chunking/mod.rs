//! Splits input text into size-bounded chunks at semantic break points.
//!
//! The chunker never loses or reorders bytes: concatenating its output
//! always reproduces the input exactly (verified at the end of
//! [`chunk_text`], with a fixed-size fallback if the semantic split ever
//! fails to round-trip).

use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{LlmPressError, Result};

/// Default minimum chunk size in bytes.
pub const DEFAULT_MIN_CHUNK: usize = 100;
/// Default maximum chunk size in bytes.
pub const DEFAULT_MAX_CHUNK: usize = 500;

/// Computes `1.5 * max_chunk` as the oversize threshold: a chunk past this
/// size triggers the secondary re-split pass, and it is the same bound used
/// to decide whether a short trailing chunk may merge with its predecessor.
const fn oversize_threshold(max_chunk: usize) -> usize {
    max_chunk + max_chunk / 2
}

fn primary_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\n\n|\n(?:-{3,}|\*{3,}|_{3,})\n").unwrap()
    })
}

fn secondary_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\n|[.!?]+\s+").unwrap()
    })
}

/// Splits `text` on every match of `re`, attaching each delimiter to the
/// segment that precedes it. The final segment (if any text remains after
/// the last match) carries no trailing delimiter.
fn split_with_delimiters(text: &str, re: &Regex) -> Vec<(String, bool)> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        segments.push((text[last..m.end()].to_string(), true));
        last = m.end();
    }
    if last < text.len() {
        segments.push((text[last..].to_string(), false));
    }
    segments
}

/// Greedily accumulates delimiter-attached segments into chunks within
/// `[min_chunk, max_chunk]`, emitting a chunk either when the accumulator
/// has reached `min_chunk` at a delimiter, or when the next segment would
/// overflow `max_chunk` and the accumulator is already big enough.
fn accumulate(segments: Vec<(String, bool)>, min_chunk: usize, max_chunk: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut acc = String::new();

    for (seg, has_delim) in segments {
        if !acc.is_empty() && acc.len() + seg.len() > max_chunk && acc.len() >= min_chunk {
            chunks.push(std::mem::take(&mut acc));
        }
        acc.push_str(&seg);
        if has_delim && acc.len() >= min_chunk {
            chunks.push(std::mem::take(&mut acc));
        }
    }
    if !acc.is_empty() {
        chunks.push(acc);
    }
    chunks
}

/// Re-splits any chunk exceeding `1.5 * max_chunk` at secondary breakpoints
/// (line breaks, sentence terminators followed by whitespace).
fn resplit_oversized(chunks: Vec<String>, min_chunk: usize, max_chunk: usize) -> Vec<String> {
    let threshold = oversize_threshold(max_chunk);
    let mut out = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        if chunk.len() > threshold {
            let segments = split_with_delimiters(&chunk, secondary_separator());
            out.extend(accumulate(segments, min_chunk, max_chunk));
        } else {
            out.push(chunk);
        }
    }
    out
}

/// Merges a final chunk shorter than `min_chunk` into its predecessor when
/// the combined size does not exceed `1.5 * max_chunk`.
fn merge_trailing(mut chunks: Vec<String>, min_chunk: usize, max_chunk: usize) -> Vec<String> {
    let threshold = oversize_threshold(max_chunk);
    if chunks.len() >= 2 {
        let last_len = chunks[chunks.len() - 1].len();
        if last_len < min_chunk {
            let last = chunks.pop().unwrap_or_default();
            let prev_len = chunks[chunks.len() - 1].len();
            if prev_len + last.len() <= threshold {
                #[allow(clippy::unwrap_used)]
                let prev = chunks.last_mut().unwrap();
                prev.push_str(&last);
            } else {
                chunks.push(last);
            }
        }
    }
    chunks
}

/// Splits `text` at approximately `max_chunk` bytes per chunk, rounded down
/// to the nearest grapheme cluster boundary so a chunk never splits a
/// multi-codepoint character (e.g. an accent built from combining marks).
/// Used only when the semantic split fails to round-trip.
fn fixed_size_fallback(text: &str, max_chunk: usize) -> Vec<String> {
    let max_chunk = max_chunk.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let boundaries: Vec<usize> = UnicodeSegmentation::grapheme_indices(text, true)
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    while start < text.len() {
        let target = start + max_chunk;
        let mut end = boundaries
            .iter()
            .copied()
            .take_while(|&b| b <= target)
            .last()
            .unwrap_or(start);
        if end <= start {
            // A single grapheme is wider than max_chunk; take it whole.
            end = boundaries
                .iter()
                .copied()
                .find(|&b| b > start)
                .unwrap_or(text.len());
        }
        chunks.push(text[start..end].to_string());
        start = end;
    }
    chunks
}

/// Splits `text` into chunks within `[min_chunk, max_chunk]` bytes,
/// preferring semantic delimiters, per the two-pass greedy algorithm:
///
/// 1. Split at primary separators (paragraph breaks, horizontal rules).
/// 2. Re-split any chunk over `1.5 * max_chunk` at secondary breakpoints.
/// 3. Merge a short trailing chunk into its predecessor when it fits.
/// 4. Verify the result reconstructs `text` exactly; fall back to
///    fixed-size slicing if it does not.
///
/// # Errors
///
/// Returns [`LlmPressError::Chunking`] if `min_chunk > max_chunk`.
pub fn chunk_text(text: &str, min_chunk: usize, max_chunk: usize) -> Result<Vec<String>> {
    if min_chunk > max_chunk {
        return Err(LlmPressError::Chunking {
            reason: format!("min_chunk ({min_chunk}) exceeds max_chunk ({max_chunk})"),
        });
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let segments = split_with_delimiters(text, primary_separator());
    let chunks = accumulate(segments, min_chunk, max_chunk);
    let chunks = resplit_oversized(chunks, min_chunk, max_chunk);
    let chunks = merge_trailing(chunks, min_chunk, max_chunk);

    if chunks.concat() == text {
        return Ok(chunks);
    }

    let fallback = fixed_size_fallback(text, max_chunk);
    if fallback.concat() == text {
        Ok(fallback)
    } else {
        Err(LlmPressError::Chunking {
            reason: "chunker could not guarantee reconstructive concatenation".to_string(),
        })
    }
}

/// Validates that `bytes` is UTF-8 text, then chunks it per [`chunk_text`].
///
/// # Errors
///
/// Returns [`LlmPressError::Chunking`] if `bytes` is not valid UTF-8, or if
/// `min_chunk > max_chunk`.
pub fn chunk_bytes(bytes: &[u8], min_chunk: usize, max_chunk: usize) -> Result<Vec<String>> {
    let text = std::str::from_utf8(bytes).map_err(|e| LlmPressError::Chunking {
        reason: format!("input is not valid UTF-8 text: {e}"),
    })?;
    chunk_text(text, min_chunk, max_chunk)
}
