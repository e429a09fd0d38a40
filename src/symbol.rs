//! The tagged symbol vocabulary shared by the rank encoder/decoder and the
//! byte packer/unpacker.
//!
//! The original implementation represented these as stringly-tagged tuples
//! (`("r", n)`, `("e", n)`, `("<BREAK>", 0)`); this is the typed replacement.

/// A single tagged token in the encoded symbol stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// The next token is the rank-`r` entry of the predictor's top-`W` list
    /// given the current context. Always satisfies `r < W`.
    Rank(u32),
    /// The next token is the vocabulary entry with this id, emitted verbatim
    /// because it fell outside the top-`W` list (or started a chunk).
    Literal(u32),
    /// A chunk boundary marker. Carries no payload.
    Break,
}

impl Symbol {
    /// Returns the rank value if this is a [`Symbol::Rank`].
    #[must_use]
    pub const fn as_rank(&self) -> Option<u32> {
        match self {
            Self::Rank(r) => Some(*r),
            _ => None,
        }
    }

    /// `true` for `Rank(0)`, used by the packer's zero-run optimization.
    #[must_use]
    pub const fn is_zero_rank(&self) -> bool {
        matches!(self, Self::Rank(0))
    }
}
