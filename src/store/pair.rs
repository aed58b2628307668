use rayon::prelude::*;
use tracing::info;

use crate::{
    config::TrainingParams,
    dataset::Sample,
    error::{DetectorError, Result},
    forest::{RandomForest, FAKE, REAL},
    prediction::PredictionResult,
    text::{normalize, NormalizedDocument},
    vectorizer::{FeatureVector, TFIDFVectorizer},
};

/// Hardcoded sentences for the synthetic fallback model.
pub const FALLBACK_FAKE: [&str; 5] = [
    "shocking news that the media won't tell you",
    "government conspiracy revealed",
    "miracle cure they don't want you to know about",
    "they don't want you to know this secret",
    "this will change everything you believe about",
];

pub const FALLBACK_REAL: [&str; 5] = [
    "according to recent scientific studies",
    "experts have confirmed that",
    "multiple sources have verified",
    "researchers at the university found that",
    "evidence suggests that",
];

/// A vectorizer and the forest trained on its features.
///
/// The two halves are only ever built, stored and loaded together.
/// `pair_id` is the vectorizer fingerprint at training time.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPair {
    vectorizer: TFIDFVectorizer,
    forest: RandomForest,
    pair_id: u64,
}

impl ModelPair {
    /// Fit a vectorizer on `docs`, then a forest on its output.
    pub fn train(docs: &[NormalizedDocument], labels: &[u8], params: &TrainingParams) -> Result<Self> {
        let mut vectorizer: TFIDFVectorizer = TFIDFVectorizer::new(params.max_features);
        let features = vectorizer.fit_transform(docs);
        if !vectorizer.is_fitted() {
            return Err(DetectorError::unavailable("training corpus", "no usable tokens"));
        }
        let forest = RandomForest::fit(
            &features,
            labels,
            vectorizer.vocab_size(),
            params.n_estimators,
            params.seed,
        )?;
        info!(
            docs = docs.len(),
            vocab = vectorizer.vocab_size(),
            trees = forest.n_estimators(),
            "model pair trained"
        );
        let pair_id = vectorizer.fingerprint();
        Ok(Self { vectorizer, forest, pair_id })
    }

    /// Normalize raw samples in parallel and train on them.
    pub fn train_on_samples(samples: &[Sample], params: &TrainingParams) -> Result<Self> {
        let docs: Vec<NormalizedDocument> = samples.par_iter().map(|s| normalize(&s.text)).collect();
        let labels: Vec<u8> = samples.iter().map(|s| s.label).collect();
        Self::train(&docs, &labels, params)
    }

    /// The tiny model built from [`FALLBACK_FAKE`] and [`FALLBACK_REAL`].
    pub fn fallback(params: &TrainingParams) -> Result<Self> {
        let samples: Vec<Sample> = FALLBACK_FAKE
            .iter()
            .map(|t| (t, FAKE))
            .chain(FALLBACK_REAL.iter().map(|t| (t, REAL)))
            .map(|(text, label)| Sample { text: text.to_string(), label })
            .collect();
        Self::train_on_samples(&samples, params)
    }

    /// Reassemble a pair from its two persisted halves.
    pub(crate) fn from_parts(vectorizer: TFIDFVectorizer, forest: RandomForest, pair_id: u64) -> Result<Self> {
        let pair = Self { vectorizer, forest, pair_id };
        if !pair.is_consistent() {
            return Err(DetectorError::unavailable("persisted model", "vectorizer and model do not match"));
        }
        Ok(pair)
    }

    pub fn is_consistent(&self) -> bool {
        self.vectorizer.fingerprint() == self.pair_id
            && self.forest.n_features() == self.vectorizer.vocab_size()
            && self.forest.is_consistent()
    }

    pub fn vectorize(&self, doc: &NormalizedDocument) -> FeatureVector {
        self.vectorizer.transform(doc)
    }

    /// `[p_real, p_fake]` for a normalized document.
    /// An empty document maps to the all-zero vector and still gets a verdict.
    pub fn predict_proba(&self, doc: &NormalizedDocument) -> [f64; 2] {
        self.forest.predict_proba(&self.vectorize(doc))
    }

    pub fn predict(&self, doc: &NormalizedDocument) -> PredictionResult {
        PredictionResult::from_proba(self.predict_proba(doc))
    }

    #[inline]
    pub fn vectorizer(&self) -> &TFIDFVectorizer {
        &self.vectorizer
    }

    #[inline]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    #[inline]
    pub fn pair_id(&self) -> u64 {
        self.pair_id
    }
}
