//! Bagged decision-tree ensemble over TF-IDF features.

pub mod tree;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{DetectorError, Result},
    forest::tree::{DecisionTree, TrainingSet},
    vectorizer::FeatureVector,
};

/// Label for fake news.
pub const FAKE: u8 = 1;
/// Label for real news.
pub const REAL: u8 = 0;

/// Random forest classifier.
///
/// Each tree sees a bootstrap sample of the training rows and `sqrt(F)`
/// candidate features per split. Tree `i` draws from its own generator
/// seeded with `(seed, i)`, so the fitted forest is identical whatever
/// the rayon thread count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    seed: u64,
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Fit `n_estimators` trees on `rows` labelled 1 = fake, 0 = real.
    pub fn fit(
        rows: &[FeatureVector],
        labels: &[u8],
        n_features: usize,
        n_estimators: usize,
        seed: u64,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(DetectorError::unavailable("training set", "no rows"));
        }
        if rows.len() != labels.len() {
            return Err(DetectorError::unavailable(
                "training set",
                format!("{} rows but {} labels", rows.len(), labels.len()),
            ));
        }
        if let Some(bad) = labels.iter().find(|&&l| l != FAKE && l != REAL) {
            return Err(DetectorError::unavailable("training set", format!("label {bad} is not 0 or 1")));
        }
        if n_estimators == 0 {
            return Err(DetectorError::Configuration("n_estimators must be positive".to_string()));
        }

        let data = TrainingSet { rows, labels, n_features };
        let max_features = ((n_features as f64).sqrt() as usize).max(1);
        let n = rows.len();

        let trees: Vec<DecisionTree> = (0..n_estimators)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(i as u64);
                let mut weights = vec![0u32; n];
                for _ in 0..n {
                    weights[rng.gen_range(0..n)] += 1;
                }
                DecisionTree::fit(&data, &weights, max_features, &mut rng)
            })
            .collect();

        let importances = average_importances(&trees, n_features);
        debug!(
            trees = trees.len(),
            nodes = trees.iter().map(DecisionTree::node_count).sum::<usize>(),
            "random forest fitted"
        );
        Ok(Self { n_features, seed, trees, importances })
    }

    /// `[p_real, p_fake]`, the mean of the trees' leaf probabilities.
    pub fn predict_proba(&self, x: &FeatureVector) -> [f64; 2] {
        if self.trees.is_empty() {
            return [0.5, 0.5];
        }
        let mut sum = [0.0f64; 2];
        for tree in &self.trees {
            let p = tree.predict_proba(x);
            sum[0] += p[0];
            sum[1] += p[1];
        }
        let k = self.trees.len() as f64;
        let (real, fake) = (sum[0] / k, sum[1] / k);
        // renormalise away float drift
        let total = real + fake;
        [real / total, fake / total]
    }

    /// Mean-decrease-in-impurity per feature, summing to one
    /// (all zero if no tree ever split).
    #[inline]
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Structural sanity check for a deserialized forest.
    pub fn is_consistent(&self) -> bool {
        !self.trees.is_empty()
            && self.importances.len() == self.n_features
            && self.trees.iter().all(|t| t.is_consistent(self.n_features))
    }
}

fn average_importances(trees: &[DecisionTree], n_features: usize) -> Vec<f64> {
    let mut acc = vec![0.0f64; n_features];
    for tree in trees {
        for (a, v) in acc.iter_mut().zip(tree.feature_importances()) {
            *a += v;
        }
    }
    let total: f64 = acc.iter().sum();
    if total > 0.0 {
        for a in acc.iter_mut() {
            *a /= total;
        }
    }
    acc
}
