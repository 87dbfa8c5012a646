//! Deterministic gradient-boosted regression trees.
//!
//! Least-squares boosting: start from the mean label, then repeatedly fit a
//! shallow regression tree to the residuals and add it back with shrinkage.
//! Splits are found by exact greedy variance reduction; ordering uses
//! `f64::total_cmp` with an index tie-break, so fitting the same data always
//! produces the same model, bit for bit. No randomness anywhere in here.
//!
//! The whole model is serde-serializable — a serialized [`GbdtRegressor`]
//! *is* the persisted model artifact.

use serde::{Deserialize, Serialize};

/// Minimum SSE improvement for a split to be worth taking.
const MIN_GAIN: f64 = 1e-12;

/// Hyperparameters for [`GbdtRegressor::fit`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GbdtParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Nodes with fewer samples than this become leaves.
    pub min_samples_split: usize,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 6,
            learning_rate: 0.1,
            min_samples_split: 2,
        }
    }
}

/// One node of a fitted regression tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    /// Route a feature vector to its leaf value.
    ///
    /// A NaN (or missing) feature fails the `<=` test and routes right, so
    /// even malformed vectors produce a finite leaf value.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = x.get(*feature).copied().unwrap_or(f64::NAN);
                    node = if v <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// A fitted boosted ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbdtRegressor {
    params: GbdtParams,
    base: f64,
    trees: Vec<Node>,
}

impl GbdtRegressor {
    /// Fit on `xs` (rows of equal length) against `ys`.
    ///
    /// Training always completes; with empty or degenerate data the model
    /// degrades to predicting the base value.
    pub fn fit(params: GbdtParams, xs: &[Vec<f64>], ys: &[f64]) -> Self {
        debug_assert_eq!(xs.len(), ys.len());
        if xs.is_empty() {
            return Self {
                params,
                base: 0.0,
                trees: Vec::new(),
            };
        }

        let base = ys.iter().sum::<f64>() / ys.len() as f64;
        let mut preds = vec![base; ys.len()];
        let all: Vec<usize> = (0..xs.len()).collect();

        let mut trees = Vec::with_capacity(params.n_estimators);
        for _ in 0..params.n_estimators {
            let residuals: Vec<f64> = ys.iter().zip(&preds).map(|(y, p)| y - p).collect();
            let tree = grow(xs, &residuals, &all, 0, &params);
            for (p, x) in preds.iter_mut().zip(xs) {
                *p += params.learning_rate * tree.predict(x);
            }
            trees.push(tree);
        }

        Self {
            params,
            base,
            trees,
        }
    }

    /// Predict a single feature vector.
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut acc = self.base;
        for tree in &self.trees {
            acc += self.params.learning_rate * tree.predict(x);
        }
        acc
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn params(&self) -> GbdtParams {
        self.params
    }
}

fn grow(
    xs: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    depth: usize,
    params: &GbdtParams,
) -> Node {
    let node_mean = mean_at(targets, indices);
    if depth >= params.max_depth || indices.len() < params.min_samples_split {
        return Node::Leaf { value: node_mean };
    }
    let Some(split) = best_split(xs, targets, indices) else {
        return Node::Leaf { value: node_mean };
    };

    let mut left_idx = Vec::new();
    let mut right_idx = Vec::new();
    for &i in indices {
        if xs[i][split.feature] <= split.threshold {
            left_idx.push(i);
        } else {
            right_idx.push(i);
        }
    }
    if left_idx.is_empty() || right_idx.is_empty() {
        return Node::Leaf { value: node_mean };
    }

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(xs, targets, &left_idx, depth + 1, params)),
        right: Box::new(grow(xs, targets, &right_idx, depth + 1, params)),
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Exact greedy search: for each feature, scan the sorted sample order with
/// running sums and keep the split with the largest SSE reduction. Ties go
/// to the lowest feature index / smallest threshold (strict `>` below).
fn best_split(xs: &[Vec<f64>], targets: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
    let n = indices.len();
    if n < 2 {
        return None;
    }
    let n_features = xs[indices[0]].len();

    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n as f64;

    let mut best: Option<SplitCandidate> = None;
    let mut order = indices.to_vec();

    for feature in 0..n_features {
        order.copy_from_slice(indices);
        order.sort_by(|&a, &b| xs[a][feature].total_cmp(&xs[b][feature]).then(a.cmp(&b)));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..n {
            let prev = order[k - 1];
            left_sum += targets[prev];
            left_sq += targets[prev] * targets[prev];

            let lo = xs[prev][feature];
            let hi = xs[order[k]][feature];
            if lo == hi {
                continue;
            }

            let left_n = k as f64;
            let right_n = (n - k) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);
            let gain = parent_sse - sse;

            if gain > best.as_ref().map_or(MIN_GAIN, |b| b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: lo + (hi - lo) / 2.0,
                    gain,
                });
            }
        }
    }
    best
}

fn mean_at(values: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| values[i]).sum::<f64>() / indices.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        // y = 10 for x0 < 0.5, y = 50 otherwise; x1 is pure noise-free filler.
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..200 {
            let x0 = i as f64 / 200.0;
            xs.push(vec![x0, (i % 7) as f64]);
            ys.push(if x0 < 0.5 { 10.0 } else { 50.0 });
        }
        (xs, ys)
    }

    #[test]
    fn fits_a_constant_exactly() {
        let xs: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let ys = vec![42.0; 20];
        let model = GbdtRegressor::fit(GbdtParams::default(), &xs, &ys);
        assert!((model.predict(&[3.0]) - 42.0).abs() < 1e-9);
        assert!((model.predict(&[1e9]) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn learns_a_step_function() {
        let (xs, ys) = step_data();
        let model = GbdtRegressor::fit(GbdtParams::default(), &xs, &ys);
        assert!((model.predict(&[0.1, 0.0]) - 10.0).abs() < 1.0);
        assert!((model.predict(&[0.9, 0.0]) - 50.0).abs() < 1.0);
    }

    #[test]
    fn fitting_is_deterministic() {
        let (xs, ys) = step_data();
        let a = GbdtRegressor::fit(GbdtParams::default(), &xs, &ys);
        let b = GbdtRegressor::fit(GbdtParams::default(), &xs, &ys);
        for probe in [[0.05, 1.0], [0.49, 2.0], [0.51, 3.0], [0.99, 4.0]] {
            assert_eq!(a.predict(&probe), b.predict(&probe));
        }
    }

    #[test]
    fn serde_round_trip_preserves_predictions() {
        let (xs, ys) = step_data();
        let model = GbdtRegressor::fit(
            GbdtParams {
                n_estimators: 20,
                ..GbdtParams::default()
            },
            &xs,
            &ys,
        );
        let json = serde_json::to_string(&model).unwrap();
        let restored: GbdtRegressor = serde_json::from_str(&json).unwrap();
        for probe in [[0.1, 0.0], [0.5, 1.0], [0.8, 2.0]] {
            assert_eq!(model.predict(&probe), restored.predict(&probe));
        }
    }

    #[test]
    fn nan_features_route_to_a_finite_leaf() {
        let (xs, ys) = step_data();
        let model = GbdtRegressor::fit(GbdtParams::default(), &xs, &ys);
        assert!(model.predict(&[f64::NAN, f64::NAN]).is_finite());
        assert!(model.predict(&[]).is_finite());
    }

    #[test]
    fn empty_training_set_predicts_base_zero() {
        let model = GbdtRegressor::fit(GbdtParams::default(), &[], &[]);
        assert_eq!(model.predict(&[1.0]), 0.0);
        assert_eq!(model.n_trees(), 0);
    }
}
