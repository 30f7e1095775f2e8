//! Gradient Boosted Decision Tree (GBDT) trainer
//!
//! Squared-error boosting: start from the mean target, then repeatedly fit a
//! CART tree to the current residuals and add it with shrinkage.

use insurance_core::{BoostedTrees, Tree};

use crate::cart::{CartBuilder, TreeConfig};
use crate::errors::{Result, TrainerError};

/// GBDT training configuration
#[derive(Clone, Debug)]
pub struct BoostingConfig {
    pub n_trees: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 5,
        }
    }
}

/// GBDT trainer
pub struct GradientBooster {
    config: BoostingConfig,
}

impl GradientBooster {
    pub fn new(config: BoostingConfig) -> Self {
        Self { config }
    }

    /// Train a boosted ensemble on `features` → `targets`
    pub fn fit(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<BoostedTrees> {
        if targets.is_empty() {
            return Err(TrainerError::Training("cannot boost on zero rows".to_string()));
        }
        if !(self.config.learning_rate > 0.0 && self.config.learning_rate <= 1.0) {
            return Err(TrainerError::Training(format!(
                "learning rate must be in (0, 1], got {}",
                self.config.learning_rate
            )));
        }

        let bias = targets.iter().sum::<f64>() / targets.len() as f64;
        let mut predictions = vec![bias; targets.len()];

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_leaf: self.config.min_samples_leaf,
        };

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for tree_idx in 0..self.config.n_trees {
            // negative gradient of ½(y - ŷ)²
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(y, p)| y - p)
                .collect();

            let tree = CartBuilder::new(features, &residuals, tree_config.clone())?.build();
            self.update_predictions(&tree, features, &mut predictions);

            tracing::trace!(
                "tree {}/{}: {} nodes",
                tree_idx + 1,
                self.config.n_trees,
                tree.nodes.len()
            );
            trees.push(tree);
        }

        Ok(BoostedTrees {
            bias,
            learning_rate: self.config.learning_rate,
            trees,
        })
    }

    fn update_predictions(&self, tree: &Tree, features: &[Vec<f64>], predictions: &mut [f64]) {
        for (pred, row) in predictions.iter_mut().zip(features) {
            *pred += self.config.learning_rate * tree.evaluate(row);
        }
    }
}
