//! Regressors that map a scaled feature vector to a predicted cost
//!
//! Three families are supported: ridge-penalised linear models, single CART
//! regression trees, and gradient-boosted ensembles of such trees. Models are
//! plain data so they serialize into the model artifact as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{CoreError, Result};

/// Regressor family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Ridge,
    Tree,
    Boosting,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 3] = [ModelFamily::Ridge, ModelFamily::Tree, ModelFamily::Boosting];

    pub fn name(self) -> &'static str {
        match self {
            ModelFamily::Ridge => "ridge",
            ModelFamily::Tree => "tree",
            ModelFamily::Boosting => "boosting",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelFamily {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ridge" | "linear" => Ok(ModelFamily::Ridge),
            "tree" | "cart" => Ok(ModelFamily::Tree),
            "boosting" | "gbdt" => Ok(ModelFamily::Boosting),
            other => Err(CoreError::UnknownFamily(other.to_string())),
        }
    }
}

/// One grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Hyperparams {
    Ridge {
        alpha: f64,
    },
    Tree {
        max_depth: usize,
        min_samples_leaf: usize,
    },
    Boosting {
        n_trees: usize,
        learning_rate: f64,
        max_depth: usize,
        min_samples_leaf: usize,
    },
}

impl Hyperparams {
    pub fn family(&self) -> ModelFamily {
        match self {
            Hyperparams::Ridge { .. } => ModelFamily::Ridge,
            Hyperparams::Tree { .. } => ModelFamily::Tree,
            Hyperparams::Boosting { .. } => ModelFamily::Boosting,
        }
    }
}

impl fmt::Display for Hyperparams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hyperparams::Ridge { alpha } => write!(f, "ridge(alpha={alpha})"),
            Hyperparams::Tree {
                max_depth,
                min_samples_leaf,
            } => write!(f, "tree(max_depth={max_depth}, min_samples_leaf={min_samples_leaf})"),
            Hyperparams::Boosting {
                n_trees,
                learning_rate,
                max_depth,
                min_samples_leaf,
            } => write!(
                f,
                "boosting(n_trees={n_trees}, learning_rate={learning_rate}, max_depth={max_depth}, min_samples_leaf={min_samples_leaf})"
            ),
        }
    }
}

/// `intercept + coefficients · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

/// A decision tree node; leaves carry `value`, internal nodes carry a split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub feature_index: usize,
    pub threshold: f64,
    pub left: u32,
    pub right: u32,
    pub value: Option<f64>,
}

impl Node {
    pub fn leaf(value: f64) -> Self {
        Self {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }

    pub fn split(feature_index: usize, threshold: f64) -> Self {
        Self {
            feature_index,
            threshold,
            left: 0,
            right: 0,
            value: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.value.is_some()
    }
}

/// Regression tree; node 0 is the root, samples go left when `x <= threshold`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0.0;
            };

            if let Some(value) = node.value {
                return value;
            }

            let Some(&x) = features.get(node.feature_index) else {
                return 0.0;
            };

            idx = if x <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    1 + walk(nodes, node.left as usize).max(walk(nodes, node.right as usize))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Structural checks: children in range and pointing forward, features in range
    pub fn validate(&self, feature_count: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(CoreError::Model("tree has no nodes".to_string()));
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node.value {
                Some(value) if !value.is_finite() => {
                    return Err(CoreError::Model(format!("node {idx} has non-finite leaf value")));
                }
                Some(_) => {}
                None => {
                    for child in [node.left as usize, node.right as usize] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(CoreError::Model(format!(
                                "node {idx} has invalid child {child}"
                            )));
                        }
                    }
                    if node.feature_index >= feature_count {
                        return Err(CoreError::Model(format!(
                            "node {idx} splits on feature {} but only {feature_count} exist",
                            node.feature_index
                        )));
                    }
                    if !node.threshold.is_finite() {
                        return Err(CoreError::Model(format!("node {idx} has non-finite threshold")));
                    }
                }
            }
        }

        Ok(())
    }
}

/// `bias + learning_rate * Σ tree(x)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostedTrees {
    pub bias: f64,
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

impl BoostedTrees {
    pub fn predict(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.bias, |acc, tree| acc + self.learning_rate * tree.evaluate(features))
    }
}

/// A fitted regressor of any family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Ridge(LinearModel),
    Tree(Tree),
    Boosting(BoostedTrees),
}

impl Regressor {
    pub fn family(&self) -> ModelFamily {
        match self {
            Regressor::Ridge(_) => ModelFamily::Ridge,
            Regressor::Tree(_) => ModelFamily::Tree,
            Regressor::Boosting(_) => ModelFamily::Boosting,
        }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        match self {
            Regressor::Ridge(model) => model.predict(features),
            Regressor::Tree(tree) => tree.evaluate(features),
            Regressor::Boosting(model) => model.predict(features),
        }
    }

    pub fn predict_rows(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Check that the regressor can consume vectors of `feature_count` values
    pub fn validate(&self, feature_count: usize) -> Result<()> {
        match self {
            Regressor::Ridge(model) => {
                if model.coefficients.len() != feature_count {
                    return Err(CoreError::Model(format!(
                        "linear model has {} coefficients for {feature_count} features",
                        model.coefficients.len()
                    )));
                }
                if !model.intercept.is_finite() || model.coefficients.iter().any(|w| !w.is_finite()) {
                    return Err(CoreError::Model("linear model has non-finite weights".to_string()));
                }
                Ok(())
            }
            Regressor::Tree(tree) => tree.validate(feature_count),
            Regressor::Boosting(model) => {
                if !model.bias.is_finite() || !model.learning_rate.is_finite() {
                    return Err(CoreError::Model("boosted model has non-finite bias or learning rate".to_string()));
                }
                for (idx, tree) in model.trees.iter().enumerate() {
                    tree.validate(feature_count)
                        .map_err(|e| CoreError::Model(format!("tree {idx}: {e}")))?;
                }
                Ok(())
            }
        }
    }
}
