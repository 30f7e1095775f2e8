//! Hyperparameter grids and per-family grid search

use insurance_core::{Hyperparams, ModelFamily};
use tracing::{debug, info};

use crate::cv::cross_val_mse;
use crate::errors::{Result, TrainerError};

const RIDGE_ALPHAS: [f64; 4] = [0.0, 0.1, 1.0, 10.0];
const TREE_DEPTHS: [usize; 3] = [3, 5, 8];
const TREE_MIN_LEAF: [usize; 2] = [5, 20];
const BOOSTING_TREES: [usize; 2] = [50, 100];
const BOOSTING_RATES: [f64; 2] = [0.05, 0.1];
const BOOSTING_DEPTHS: [usize; 2] = [2, 3];
const BOOSTING_MIN_LEAF: usize = 1;

/// Configurations searched for `family`, in evaluation order
pub fn default_grid(family: ModelFamily) -> Vec<Hyperparams> {
    match family {
        ModelFamily::Ridge => RIDGE_ALPHAS
            .iter()
            .map(|&alpha| Hyperparams::Ridge { alpha })
            .collect(),
        ModelFamily::Tree => TREE_DEPTHS
            .iter()
            .flat_map(|&max_depth| {
                TREE_MIN_LEAF.iter().map(move |&min_samples_leaf| Hyperparams::Tree {
                    max_depth,
                    min_samples_leaf,
                })
            })
            .collect(),
        ModelFamily::Boosting => {
            let mut grid = Vec::new();
            for &n_trees in &BOOSTING_TREES {
                for &learning_rate in &BOOSTING_RATES {
                    for &max_depth in &BOOSTING_DEPTHS {
                        grid.push(Hyperparams::Boosting {
                            n_trees,
                            learning_rate,
                            max_depth,
                            min_samples_leaf: BOOSTING_MIN_LEAF,
                        });
                    }
                }
            }
            grid
        }
    }
}

/// A configuration and its cross-validated score
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub hyperparams: Hyperparams,
    pub cv_mse: f64,
}

/// Outcome of searching one family's grid
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyResult {
    pub family: ModelFamily,
    pub best: GridPoint,
    pub evaluated: Vec<GridPoint>,
}

/// Exhaustive search over a fixed list of configurations
pub struct GridSearch {
    folds: usize,
}

impl GridSearch {
    pub fn new(folds: usize) -> Self {
        Self { folds }
    }

    pub fn search_family(&self, family: ModelFamily, x: &[Vec<f64>], y: &[f64]) -> Result<FamilyResult> {
        self.search(family, default_grid(family), x, y)
    }

    /// Score every configuration; the lowest CV MSE wins, earlier configs win ties
    pub fn search(
        &self,
        family: ModelFamily,
        grid: Vec<Hyperparams>,
        x: &[Vec<f64>],
        y: &[f64],
    ) -> Result<FamilyResult> {
        if let Some(stray) = grid.iter().find(|p| p.family() != family) {
            return Err(TrainerError::Training(format!("{stray} is not a {family} configuration")));
        }

        let mut evaluated = Vec::with_capacity(grid.len());
        for hyperparams in grid {
            let cv_mse = cross_val_mse(&hyperparams, x, y, self.folds)?;
            debug!("{hyperparams}: cv_mse={cv_mse:.4}");
            evaluated.push(GridPoint { hyperparams, cv_mse });
        }

        let best = evaluated
            .iter()
            .fold(None::<&GridPoint>, |best, point| match best {
                Some(b) if b.cv_mse <= point.cv_mse => Some(b),
                _ => Some(point),
            })
            .cloned()
            .ok_or_else(|| TrainerError::Training(format!("empty grid for {family}")))?;

        info!(
            "best {family}: {} (cv neg_mse={:.4})",
            best.hyperparams, -best.cv_mse
        );

        Ok(FamilyResult {
            family,
            best,
            evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_sizes() {
        assert_eq!(default_grid(ModelFamily::Ridge).len(), 4);
        assert_eq!(default_grid(ModelFamily::Tree).len(), 6);
        assert_eq!(default_grid(ModelFamily::Boosting).len(), 8);
        for family in ModelFamily::ALL {
            assert!(default_grid(family).iter().all(|p| p.family() == family));
        }
    }

    #[test]
    fn tree_grid_declaration_order() {
        let grid = default_grid(ModelFamily::Tree);
        assert_eq!(
            grid[1],
            Hyperparams::Tree {
                max_depth: 3,
                min_samples_leaf: 20
            }
        );
        assert_eq!(
            grid[2],
            Hyperparams::Tree {
                max_depth: 5,
                min_samples_leaf: 5
            }
        );
    }

    #[test]
    fn ties_keep_earlier_configuration() {
        // identical configurations score identically
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 4.0 * r[0]).collect();

        let grid = vec![Hyperparams::Ridge { alpha: 0.0 }, Hyperparams::Ridge { alpha: 0.0 }];
        let result = GridSearch::new(5).search(ModelFamily::Ridge, grid, &x, &y).unwrap();
        assert_eq!(result.evaluated.len(), 2);
        assert_eq!(result.best, result.evaluated[0]);
    }

    #[test]
    fn picks_lowest_cv_error() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 3.0 * r[0] + 2.0).collect();
        let result = GridSearch::new(4).search_family(ModelFamily::Ridge, &x, &y).unwrap();
        assert_eq!(result.best.hyperparams, Hyperparams::Ridge { alpha: 0.0 });
    }

    #[test]
    fn rejects_foreign_configuration() {
        let x = vec![vec![0.0]; 4];
        let y = vec![0.0; 4];
        let grid = vec![Hyperparams::Ridge { alpha: 1.0 }];
        assert!(GridSearch::new(2).search(ModelFamily::Tree, grid, &x, &y).is_err());
    }
}
