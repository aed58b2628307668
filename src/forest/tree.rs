use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::vectorizer::FeatureVector;

/// Weighted class totals, `[real, fake]`.
type ClassWeights = [f64; 2];

#[inline]
fn gini(w: &ClassWeights) -> f64 {
    let total = w[0] + w[1];
    if total <= 0.0 {
        return 0.0;
    }
    let p0 = w[0] / total;
    let p1 = w[1] / total;
    1.0 - p0 * p0 - p1 * p1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// class probabilities `[p_real, p_fake]`
    Leaf { proba: [f64; 2] },
    /// `x[feature] <= threshold` goes left
    Split {
        feature: u32,
        threshold: f32,
        left: u32,
        right: u32,
    },
}

/// One CART tree grown to purity on a bootstrap sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    /// importances normalised to sum to one (all zero for a stump)
    importances: Vec<f64>,
}

/// Borrowed training set shared by all trees of a forest.
pub struct TrainingSet<'a> {
    pub rows: &'a [FeatureVector],
    pub labels: &'a [u8],
    pub n_features: usize,
}

struct Candidate {
    feature: usize,
    threshold: f32,
    /// weighted impurity decrease, unnormalised
    gain: f64,
    left: Vec<(usize, f64)>,
    right: Vec<(usize, f64)>,
}

struct Pending {
    node: usize,
    samples: Vec<(usize, f64)>,
}

impl DecisionTree {
    /// Grow a tree.
    ///
    /// `weights[i]` is how many times row `i` was drawn into the bootstrap
    /// sample; rows with weight zero are out of bag. At each node up to
    /// `max_features` non-constant features are examined in random order.
    pub fn fit<R: Rng>(data: &TrainingSet<'_>, weights: &[u32], max_features: usize, rng: &mut R) -> Self {
        let mut tree = DecisionTree {
            nodes: Vec::new(),
            importances: vec![0.0; data.n_features],
        };
        // unnormalised impurity decrease per feature
        let mut raw_importances = vec![0.0f64; data.n_features];
        let root: Vec<(usize, f64)> = weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w > 0)
            .map(|(i, &w)| (i, w as f64))
            .collect();

        let mut feature_order: Vec<usize> = (0..data.n_features).collect();
        tree.nodes.push(Node::Leaf { proba: [0.5, 0.5] });
        let mut stack = vec![Pending { node: 0, samples: root }];

        while let Some(Pending { node, samples }) = stack.pop() {
            let totals = class_weights(data.labels, &samples);
            let proba = leaf_proba(&totals);
            let pure = totals[0] == 0.0 || totals[1] == 0.0;
            if pure || samples.len() < 2 {
                tree.nodes[node] = Node::Leaf { proba };
                continue;
            }
            match best_split(data, &samples, &totals, max_features, &mut feature_order, rng) {
                Some(split) => {
                    raw_importances[split.feature] += split.gain;
                    let left = tree.nodes.len();
                    tree.nodes.push(Node::Leaf { proba });
                    let right = tree.nodes.len();
                    tree.nodes.push(Node::Leaf { proba });
                    tree.nodes[node] = Node::Split {
                        feature: split.feature as u32,
                        threshold: split.threshold,
                        left: left as u32,
                        right: right as u32,
                    };
                    stack.push(Pending { node: right, samples: split.right });
                    stack.push(Pending { node: left, samples: split.left });
                }
                None => tree.nodes[node] = Node::Leaf { proba },
            }
        }

        let total: f64 = raw_importances.iter().sum();
        if total > 0.0 {
            tree.importances = raw_importances.iter().map(|v| v / total).collect();
        }
        tree
    }

    /// `[p_real, p_fake]` of the leaf `x` lands in.
    pub fn predict_proba(&self, x: &FeatureVector) -> [f64; 2] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { proba } => return *proba,
                Node::Split { feature, threshold, left, right } => {
                    idx = if x.get(*feature as usize) <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }
    }

    #[inline]
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Split features must address a real column and children must sit
    /// after their parent, so every walk from the root ends at a leaf.
    pub(crate) fn is_consistent(&self, n_features: usize) -> bool {
        let len = self.nodes.len();
        let child_ok = |idx: usize, child: u32| (child as usize) > idx && (child as usize) < len;
        len > 0
            && self.importances.len() == n_features
            && self.nodes.iter().enumerate().all(|(idx, node)| match node {
                Node::Leaf { proba } => proba.iter().all(|p| p.is_finite()),
                Node::Split { feature, left, right, .. } => {
                    (*feature as usize) < n_features && child_ok(idx, *left) && child_ok(idx, *right)
                }
            })
    }
}

fn class_weights(labels: &[u8], samples: &[(usize, f64)]) -> ClassWeights {
    let mut w = [0.0; 2];
    for &(i, weight) in samples {
        w[(labels[i] == 1) as usize] += weight;
    }
    w
}

fn leaf_proba(totals: &ClassWeights) -> [f64; 2] {
    let sum = totals[0] + totals[1];
    if sum <= 0.0 {
        return [0.5, 0.5];
    }
    [totals[0] / sum, totals[1] / sum]
}

/// Features with at least one non-zero value among `samples`.
fn present_features(data: &TrainingSet<'_>, samples: &[(usize, f64)]) -> Vec<bool> {
    let mut present = vec![false; data.n_features];
    for &(i, _) in samples {
        for &f in data.rows[i].indices() {
            present[f as usize] = true;
        }
    }
    present
}

fn best_split<R: Rng>(
    data: &TrainingSet<'_>,
    samples: &[(usize, f64)],
    totals: &ClassWeights,
    max_features: usize,
    feature_order: &mut [usize],
    rng: &mut R,
) -> Option<Candidate> {
    let present = present_features(data, samples);
    let parent = gini(totals);
    let node_weight = totals[0] + totals[1];

    let mut best: Option<(usize, f32, f64)> = None;
    let mut visited = 0usize;
    let n = feature_order.len();
    for i in 0..n {
        if visited >= max_features {
            break;
        }
        let j = rng.gen_range(i..n);
        feature_order.swap(i, j);
        let feature = feature_order[i];
        // all zero in this node: constant, does not count toward the quota
        if !present[feature] {
            continue;
        }
        let Some((threshold, child_impurity)) = scan_feature(data, samples, totals, feature) else {
            continue;
        };
        visited += 1;
        let gain = node_weight * parent - child_impurity;
        if best.map_or(true, |(_, _, g)| gain > g) {
            best = Some((feature, threshold, gain));
        }
    }

    let (feature, threshold, gain) = best?;
    if gain <= 0.0 {
        return None;
    }
    let (left, right): (Vec<_>, Vec<_>) = samples
        .iter()
        .copied()
        .partition(|&(i, _)| data.rows[i].get(feature) <= threshold);
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some(Candidate { feature, threshold, gain, left, right })
}

/// Best threshold on one feature.
///
/// Returns the threshold and the weighted child impurity
/// `w_left * gini_left + w_right * gini_right`, or `None` when the feature
/// is constant over `samples`.
fn scan_feature(
    data: &TrainingSet<'_>,
    samples: &[(usize, f64)],
    totals: &ClassWeights,
    feature: usize,
) -> Option<(f32, f64)> {
    let mut values: Vec<(f32, usize, f64)> = samples
        .iter()
        .map(|&(i, w)| (data.rows[i].get(feature), i, w))
        .collect();
    values.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    if values.first()?.0 == values.last()?.0 {
        return None;
    }

    let mut left = [0.0f64; 2];
    let mut best: Option<(f32, f64)> = None;
    for k in 0..values.len() - 1 {
        let (value, i, w) = values[k];
        left[(data.labels[i] == 1) as usize] += w;
        let next = values[k + 1].0;
        if next <= value {
            continue;
        }
        let right = [totals[0] - left[0], totals[1] - left[1]];
        let impurity = (left[0] + left[1]) * gini(&left) + (right[0] + right[1]) * gini(&right);
        if best.map_or(true, |(_, b)| impurity < b) {
            let mut threshold = value / 2.0 + next / 2.0;
            // midpoint can round up onto `next` in f32
            if threshold >= next {
                threshold = value;
            }
            best = Some((threshold, impurity));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rows() -> (Vec<FeatureVector>, Vec<u8>) {
        // feature 0 marks fake rows, feature 1 marks real rows, feature 2 is noise
        let rows = vec![
            FeatureVector::from_dense(&[0.9, 0.0, 0.1]),
            FeatureVector::from_dense(&[0.7, 0.0, 0.0]),
            FeatureVector::from_dense(&[0.8, 0.0, 0.3]),
            FeatureVector::from_dense(&[0.0, 0.6, 0.1]),
            FeatureVector::from_dense(&[0.0, 0.9, 0.0]),
            FeatureVector::from_dense(&[0.0, 0.5, 0.3]),
        ];
        (rows, vec![1, 1, 1, 0, 0, 0])
    }

    #[test]
    fn separable_data_is_fit_exactly() {
        let (rows, labels) = rows();
        let data = TrainingSet { rows: &rows, labels: &labels, n_features: 3 };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let tree = DecisionTree::fit(&data, &[1; 6], 3, &mut rng);

        for (row, &label) in rows.iter().zip(labels.iter()) {
            let proba = tree.predict_proba(row);
            assert_eq!(proba[label as usize], 1.0);
        }
        assert!(tree.is_consistent(3));
        assert_eq!(tree.node_count(), 3);
        let imp = tree.feature_importances();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert_eq!(imp[2], 0.0);
    }

    #[test]
    fn single_class_sample_is_a_stump() {
        let (rows, labels) = rows();
        let data = TrainingSet { rows: &rows, labels: &labels, n_features: 3 };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let tree = DecisionTree::fit(&data, &[2, 1, 1, 0, 0, 0], 3, &mut rng);

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba(&rows[4]), [0.0, 1.0]);
        assert!(tree.feature_importances().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn all_zero_input_reaches_a_leaf() {
        let (rows, labels) = rows();
        let data = TrainingSet { rows: &rows, labels: &labels, n_features: 3 };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let tree = DecisionTree::fit(&data, &[1; 6], 1, &mut rng);

        let proba = tree.predict_proba(&FeatureVector::new(3));
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn backward_child_links_are_inconsistent() {
        let leaf = Node::Leaf { proba: [0.5, 0.5] };
        let self_loop = DecisionTree {
            nodes: vec![Node::Split { feature: 0, threshold: 0.5, left: 0, right: 1 }, leaf.clone()],
            importances: vec![0.0],
        };
        assert!(!self_loop.is_consistent(1));

        let to_ancestor = DecisionTree {
            nodes: vec![
                Node::Split { feature: 0, threshold: 0.5, left: 1, right: 2 },
                Node::Split { feature: 0, threshold: 0.2, left: 0, right: 2 },
                leaf.clone(),
            ],
            importances: vec![0.0],
        };
        assert!(!to_ancestor.is_consistent(1));

        let forward = DecisionTree {
            nodes: vec![Node::Split { feature: 0, threshold: 0.5, left: 1, right: 2 }, leaf.clone(), leaf],
            importances: vec![0.0],
        };
        assert!(forward.is_consistent(1));
    }
}
