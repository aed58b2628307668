pub mod corpus;
pub mod tfidf;
pub mod token;

use std::marker::PhantomData;

use indexmap::IndexSet;
use num::Num;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    text::NormalizedDocument,
    utils::math::vector::ZeroSpVec,
    vectorizer::{
        corpus::Corpus,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
        token::TokenFrequency,
    },
};

/// Sparse TF-IDF vector over a frozen vocabulary.
pub type FeatureVector = ZeroSpVec<f32>;

/// IDF weights learned at fit time, index-aligned with the vocabulary.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct IDFVector {
    pub idf_vec: Vec<f64>,
    /// documents seen by fit
    pub doc_num: u64,
}

/// TF-IDF vectorizer with a capped, frozen vocabulary.
///
/// `fit` is the only operation that creates the vocabulary. `transform`
/// borrows `self` immutably, so any number of threads can vectorize
/// against the same fitted instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TFIDFVectorizer<N = f32, E = DefaultTFIDFEngine>
where
    N: Num + Copy,
    E: TFIDFEngine<N>,
{
    /// cap on vocabulary size
    pub max_features: usize,
    /// token -> feature index (position in the set)
    vocabulary: IndexSet<Box<str>>,
    idf: IDFVector,
    #[serde(skip)]
    _marker: PhantomData<(N, E)>,
}

impl<N, E> TFIDFVectorizer<N, E>
where
    N: Num + Copy + Send + Sync,
    E: TFIDFEngine<N> + Send + Sync,
{
    /// Unfitted vectorizer. Transforms yield empty vectors until `fit`.
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            vocabulary: IndexSet::new(),
            idf: IDFVector::default(),
            _marker: PhantomData,
        }
    }

    /// Learn vocabulary and IDF weights from normalized documents.
    ///
    /// Keeps the `max_features` most frequent tokens of the corpus, then
    /// assigns feature indices in dictionary order.
    pub fn fit(&mut self, docs: &[NormalizedDocument]) -> &mut Self {
        let corpus = Corpus::new();
        docs.par_iter()
            .map(TokenFrequency::from_document)
            .for_each(|freq| corpus.add_doc(&freq));

        let mut top = corpus.top_terms(self.max_features);
        top.sort_unstable();
        self.vocabulary = top.into_iter().collect();
        self.idf = IDFVector {
            idf_vec: E::idf_vec(&corpus, &self.vocabulary),
            doc_num: corpus.get_doc_num(),
        };
        self
    }

    /// Vectorize one document. Tokens outside the vocabulary are ignored.
    pub fn transform(&self, doc: &NormalizedDocument) -> ZeroSpVec<N> {
        let freq = TokenFrequency::from_document(doc);
        E::tf_idf_vec(&freq, &self.vocabulary, &self.idf.idf_vec)
    }

    /// Vectorize many documents in parallel, preserving order.
    pub fn transform_batch(&self, docs: &[NormalizedDocument]) -> Vec<ZeroSpVec<N>> {
        docs.par_iter().map(|doc| self.transform(doc)).collect()
    }

    /// `fit` then `transform_batch` on the same documents.
    pub fn fit_transform(&mut self, docs: &[NormalizedDocument]) -> Vec<ZeroSpVec<N>> {
        self.fit(docs);
        self.transform_batch(docs)
    }
}

impl<N, E> TFIDFVectorizer<N, E>
where
    N: Num + Copy,
    E: TFIDFEngine<N>,
{
    /// Feature names in index order.
    pub fn feature_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.vocabulary.iter().map(|tok| tok.as_ref())
    }

    #[inline]
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.vocabulary.get_index_of(token)
    }

    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    #[inline]
    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    /// Stable fingerprint of vocabulary and weights.
    ///
    /// Stored next to both persisted artifacts so a vectorizer is never
    /// paired with a model trained on a different vocabulary.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Sha256::new();
        for token in &self.vocabulary {
            hasher.update(token.as_bytes());
            hasher.update([0xffu8]);
        }
        for w in &self.idf.idf_vec {
            hasher.update(w.to_bits().to_le_bytes());
        }
        hasher.update(self.idf.doc_num.to_le_bytes());
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(head)
    }
}
