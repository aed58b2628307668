use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState;
use dashmap::DashMap;

use crate::vectorizer::token::TokenFrequency;

/// Corpus-wide token statistics gathered during `fit`.
/// Thread-safe so documents can be added from a rayon pool.
#[derive(Debug, Default)]
pub struct Corpus {
    /// number of documents added
    pub doc_num: AtomicU64,
    /// number of documents each token appears in
    pub doc_freq: DashMap<Box<str>, u64, RandomState>,
    /// total occurrences of each token across the corpus
    pub term_counts: DashMap<Box<str>, u64, RandomState>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            doc_num: AtomicU64::new(0),
            doc_freq: DashMap::with_hasher(RandomState::new()),
            term_counts: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Add one document's tokens to the statistics.
    pub fn add_doc(&self, doc: &TokenFrequency) {
        self.doc_num.fetch_add(1, Ordering::Relaxed);
        for (token, count) in doc.iter() {
            self.doc_freq
                .entry(token.into())
                .and_modify(|n| *n += 1)
                .or_insert(1);
            self.term_counts
                .entry(token.into())
                .and_modify(|n| *n += count as u64)
                .or_insert(count as u64);
        }
    }

    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num.load(Ordering::Relaxed)
    }

    /// Documents containing `token`.
    #[inline]
    pub fn get_doc_freq(&self, token: &str) -> u64 {
        self.doc_freq.get(token).map_or(0, |n| *n)
    }

    /// The `max` most frequent tokens; ties go to the lexicographically
    /// smaller token so the pick does not depend on hash order.
    pub fn top_terms(&self, max: usize) -> Vec<Box<str>> {
        let mut terms: Vec<(Box<str>, u64)> = self
            .term_counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        terms.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        terms.truncate(max);
        terms.into_iter().map(|(term, _)| term).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(tokens: &[&str]) -> TokenFrequency {
        let mut f = TokenFrequency::new();
        f.add_tokens(tokens);
        f
    }

    #[test]
    fn tracks_document_and_term_counts() {
        let corpus = Corpus::new();
        corpus.add_doc(&freq(&["hoax", "hoax", "cure"]));
        corpus.add_doc(&freq(&["hoax", "study"]));

        assert_eq!(corpus.get_doc_num(), 2);
        assert_eq!(corpus.get_doc_freq("hoax"), 2);
        assert_eq!(corpus.get_doc_freq("missing"), 0);
        // ranked by total occurrences, not document frequency
        assert_eq!(
            corpus.top_terms(3),
            vec![Box::<str>::from("hoax"), Box::<str>::from("cure"), Box::<str>::from("study")]
        );
    }

    #[test]
    fn top_terms_is_deterministic() {
        let corpus = Corpus::new();
        corpus.add_doc(&freq(&["zeta", "alpha", "mid", "mid"]));
        assert_eq!(
            corpus.top_terms(2),
            vec![Box::<str>::from("mid"), Box::<str>::from("alpha")]
        );
        assert_eq!(corpus.top_terms(10).len(), 3);
    }
}
