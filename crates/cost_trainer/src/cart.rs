//! CART (Classification and Regression Tree) builder
//!
//! Exact-greedy regression trees on squared error. For every node each
//! feature is sorted once and swept left to right, so candidate splits cost
//! O(n log n) per feature instead of O(n) per threshold.

use insurance_core::{Node, Tree};
use std::cmp::Ordering;

use crate::errors::{Result, TrainerError};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_samples_leaf: 5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Build a regression tree using exact-greedy CART
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [Vec<f64>], targets: &'a [f64], config: TreeConfig) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(TrainerError::Training(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if features.is_empty() {
            return Err(TrainerError::Training("cannot grow a tree on zero rows".to_string()));
        }
        if config.min_samples_leaf == 0 {
            return Err(TrainerError::Training("min_samples_leaf must be at least 1".to_string()));
        }

        let feature_count = features[0].len();
        if features.iter().any(|row| row.len() != feature_count) {
            return Err(TrainerError::Training("ragged feature matrix".to_string()));
        }

        Ok(Self {
            config,
            features,
            targets,
            feature_count,
        })
    }

    /// Build tree and return nodes
    pub fn build(&self) -> Tree {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..self.targets.len()).collect();
        self.build_node(&indices, 0, &mut nodes);
        Tree { nodes }
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> u32 {
        let current_idx = nodes.len() as u32;
        let leaf_value = self.mean_target(indices);

        if depth >= self.config.max_depth || indices.len() < 2 * self.config.min_samples_leaf {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        let Some(split) = self.find_best_split(indices) else {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&idx| self.features[idx][split.feature_idx] <= split.threshold);

        // reserve the slot; children are patched in once built
        nodes.push(Node::split(split.feature_idx, split.threshold));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    /// Best variance-reducing split; earlier features and lower thresholds win ties
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf;
        let total: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let parent_score = total * total / n as f64;

        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature_idx in 0..self.feature_count {
            let value = |i: usize| self.features[i][feature_idx];
            sorted.sort_by(|&a, &b| value(a).partial_cmp(&value(b)).unwrap_or(Ordering::Equal));

            let mut left_sum = 0.0;
            for pos in 0..n - 1 {
                left_sum += self.targets[sorted[pos]];

                let here = value(sorted[pos]);
                let next = value(sorted[pos + 1]);
                if here == next {
                    continue;
                }

                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let gain = left_sum * left_sum / left_n as f64 + right_sum * right_sum / right_n as f64
                    - parent_score;

                if gain > 0.0 && best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: midpoint(here, next),
                        gain,
                    });
                }
            }
        }

        best
    }

    fn mean_target(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        indices.iter().map(|&i| self.targets[i]).sum::<f64>() / indices.len() as f64
    }
}

// threshold must satisfy low <= t < high so `x <= t` reproduces the sweep
fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low + (high - low) / 2.0;
    if mid >= high {
        low
    } else {
        mid
    }
}
