//! The predictor client: an abstraction over the remote language-model
//! service that backs `tokenize`, `detokenize`, and `top_k`.
//!
//! The core codec never depends on the transport directly — it programs
//! against the [`Predictor`] trait, so tests can substitute an in-memory
//! fake that answers deterministically from a small synthetic vocabulary.

pub mod config;
pub mod http;

pub use config::PredictorConfig;
pub use http::HttpPredictor;

use async_trait::async_trait;

use crate::error::PredictorError;

/// Interface to a remote language-model service.
///
/// Implementations must be deterministic: two calls to `top_k` with the
/// same context and `k` must return the same list, since both the encoder
/// and decoder rely on it to stay in sync.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Tokenizes `text` into the model's vocabulary ids. Deterministic and
    /// round-trippable with [`Predictor::detokenize`].
    async fn tokenize(&self, text: &str) -> Result<Vec<u32>, PredictorError>;

    /// Detokenizes a sequence of vocabulary ids back into text.
    async fn detokenize(&self, tokens: &[u32]) -> Result<String, PredictorError>;

    /// Returns the `k` highest-probability next-token ids for `context`, in
    /// descending probability order.
    async fn top_k(&self, context: &[u32], k: u32) -> Result<Vec<u32>, PredictorError>;
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)] // vocab sizes in tests never approach u32::MAX
#[allow(clippy::significant_drop_tightening)]
pub(crate) mod fake {
    //! A small deterministic in-memory [`Predictor`] used by the codec's
    //! own tests, so they don't depend on a live model service.
    //!
    //! The fake tokenizes by splitting on whitespace (each distinct word
    //! gets a stable id in first-seen order) and predicts the *next* word
    //! in a fixed reference corpus as the top rank-0 candidate, with the
    //! rest of the top-k filled by other corpus words in a fixed order.
    //! This is enough to exercise rank/literal selection and the sliding
    //! window without needing a real model.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Deterministic fake predictor over a fixed vocabulary built from a
    /// reference corpus supplied at construction time.
    pub struct FakePredictor {
        vocab: Mutex<Vec<String>>,
        ids: Mutex<HashMap<String, u32>>,
        /// For each word, the word that most often follows it in the
        /// reference corpus (used as the rank-0 prediction).
        bigram_next: HashMap<String, String>,
    }

    impl FakePredictor {
        /// Builds a fake predictor whose `top_k` favors the bigram
        /// continuations observed in `corpus`.
        #[must_use]
        pub fn new(corpus: &str) -> Self {
            let words: Vec<&str> = corpus.split_whitespace().collect();
            let mut bigram_next = HashMap::new();
            for pair in words.windows(2) {
                bigram_next
                    .entry(pair[0].to_string())
                    .or_insert_with(|| pair[1].to_string());
            }
            Self {
                vocab: Mutex::new(Vec::new()),
                ids: Mutex::new(HashMap::new()),
                bigram_next,
            }
        }

        fn id_for(&self, word: &str) -> u32 {
            let mut ids = self.ids.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(&id) = ids.get(word) {
                return id;
            }
            let mut vocab = self.vocab.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let id = vocab.len() as u32;
            vocab.push(word.to_string());
            ids.insert(word.to_string(), id);
            id
        }

        fn word_for(&self, id: u32) -> Option<String> {
            let vocab = self.vocab.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            vocab.get(id as usize).cloned()
        }
    }

    #[async_trait]
    impl Predictor for FakePredictor {
        async fn tokenize(&self, text: &str) -> Result<Vec<u32>, PredictorError> {
            Ok(text.split_whitespace().map(|w| self.id_for(w)).collect())
        }

        async fn detokenize(&self, tokens: &[u32]) -> Result<String, PredictorError> {
            let words: Result<Vec<String>, PredictorError> = tokens
                .iter()
                .map(|&id| {
                    self.word_for(id)
                        .ok_or_else(|| PredictorError::Protocol(format!("unknown token id {id}")))
                })
                .collect();
            Ok(words?.join(" "))
        }

        async fn top_k(&self, context: &[u32], k: u32) -> Result<Vec<u32>, PredictorError> {
            let last_word = context
                .last()
                .and_then(|&id| self.word_for(id))
                .unwrap_or_default();
            let mut ranked = Vec::new();
            if let Some(next) = self.bigram_next.get(&last_word) {
                ranked.push(self.id_for(next));
            }
            let vocab_len = self.vocab.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len() as u32;
            let mut filler = 0;
            while ranked.len() < k as usize && filler < vocab_len {
                if !ranked.contains(&filler) {
                    ranked.push(filler);
                }
                filler += 1;
            }
            // Beyond the known vocabulary, pad with fresh out-of-band ids so
            // `top_k` always returns exactly `k` distinct candidates.
            let mut next_padding_id = vocab_len + 1000;
            while ranked.len() < k as usize {
                ranked.push(next_padding_id);
                next_padding_id += 1;
            }
            Ok(ranked)
        }
    }
}
