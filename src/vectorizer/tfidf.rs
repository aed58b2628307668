use indexmap::IndexSet;

use crate::{utils::math::vector::ZeroSpVec, vectorizer::{corpus::Corpus, token::TokenFrequency}};

/// Pluggable TF-IDF weighting.
pub trait TFIDFEngine<N>
where
    N: num::Num + Copy,
{
    /// IDF for every vocabulary entry, in vocabulary order.
    /// # Arguments
    /// * `corpus` - statistics collected during fit
    /// * `vocabulary` - frozen token dimensions
    fn idf_vec(corpus: &Corpus, vocabulary: &IndexSet<Box<str>>) -> Vec<f64>;

    /// Weighted vector of one document.
    /// Tokens outside `vocabulary` contribute nothing.
    fn tf_idf_vec(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>, idf: &[f64]) -> ZeroSpVec<N>;
}

/// Default engine.
/// Raw counts as TF, smoothed IDF `ln((1 + n) / (1 + df)) + 1`,
/// and an L2-normalised result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultTFIDFEngine;

impl DefaultTFIDFEngine {
    #[inline]
    pub fn idf_calc(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }

    fn weighted_pairs(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>, idf: &[f64]) -> Vec<(u32, f64)> {
        freq.iter()
            .filter_map(|(token, count)| {
                vocabulary
                    .get_index_of(token)
                    .map(|idx| (idx as u32, count as f64 * idf[idx]))
            })
            .collect()
    }

    fn idf_vec_impl(corpus: &Corpus, vocabulary: &IndexSet<Box<str>>) -> Vec<f64> {
        let doc_num = corpus.get_doc_num();
        vocabulary
            .iter()
            .map(|token| Self::idf_calc(doc_num, corpus.get_doc_freq(token)))
            .collect()
    }
}

impl TFIDFEngine<f32> for DefaultTFIDFEngine {
    fn idf_vec(corpus: &Corpus, vocabulary: &IndexSet<Box<str>>) -> Vec<f64> {
        Self::idf_vec_impl(corpus, vocabulary)
    }

    fn tf_idf_vec(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>, idf: &[f64]) -> ZeroSpVec<f32> {
        let pairs = Self::weighted_pairs(freq, vocabulary, idf)
            .into_iter()
            .map(|(idx, w)| (idx, w as f32))
            .collect();
        let mut vec = ZeroSpVec::from_pairs(vocabulary.len(), pairs);
        vec.l2_normalize();
        vec
    }
}

impl TFIDFEngine<f64> for DefaultTFIDFEngine {
    fn idf_vec(corpus: &Corpus, vocabulary: &IndexSet<Box<str>>) -> Vec<f64> {
        Self::idf_vec_impl(corpus, vocabulary)
    }

    fn tf_idf_vec(freq: &TokenFrequency, vocabulary: &IndexSet<Box<str>>, idf: &[f64]) -> ZeroSpVec<f64> {
        let pairs = Self::weighted_pairs(freq, vocabulary, idf);
        let mut vec = ZeroSpVec::from_pairs(vocabulary.len(), pairs);
        vec.l2_normalize();
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothed_idf_favours_rare_tokens() {
        let everywhere = DefaultTFIDFEngine::idf_calc(10, 10);
        let rare = DefaultTFIDFEngine::idf_calc(10, 1);
        assert!((everywhere - 1.0).abs() < 1e-12);
        assert!(rare > everywhere);
    }

    #[test]
    fn out_of_vocabulary_tokens_are_dropped() {
        let vocabulary: IndexSet<Box<str>> = ["cure", "hoax"].into_iter().map(Box::from).collect();
        let idf = vec![1.0, 2.0];
        let mut freq = TokenFrequency::new();
        freq.add_tokens(&["hoax", "unseen", "unseen"]);

        let vec = <DefaultTFIDFEngine as TFIDFEngine<f32>>::tf_idf_vec(&freq, &vocabulary, &idf);
        assert_eq!(vec.len(), 2);
        assert_eq!(vec.indices(), &[1]);
        assert!((vec.get(1) - 1.0).abs() < 1e-6);
    }
}
