//! End-to-end training run
//!
//! Shuffle → split → fit schema and scaler on the training split → grid search
//! each family → refit each family's best on the full training split → score
//! on the test split → keep the family with the best test R².

use insurance_core::{ArtifactPair, EvaluationMetrics, FeatureSchema, Hyperparams, ModelFamily, Regressor};
use tracing::{debug, info};

use crate::boosting::{BoostingConfig, GradientBooster};
use crate::cart::{CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::errors::{Result, TrainerError};
use crate::grid::GridSearch;
use crate::linear::fit_ridge;
use crate::metrics::{mae, r2, rmse};
use crate::scaling::fit_scaler;

/// Knobs for a training run
#[derive(Clone, Debug)]
pub struct TrainingParams {
    /// Fraction of rows held out for the final evaluation
    pub test_ratio: f64,
    /// Cross-validation folds used by the grid search
    pub folds: usize,
    pub seed: u64,
    pub shuffle: bool,
    /// Families to search, in order; duplicates are ignored
    pub families: Vec<ModelFamily>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            test_ratio: 0.2,
            folds: 5,
            seed: 42,
            shuffle: true,
            families: ModelFamily::ALL.to_vec(),
        }
    }
}

/// Fit a single regressor for `params`
pub fn fit_regressor(params: &Hyperparams, x: &[Vec<f64>], y: &[f64]) -> Result<Regressor> {
    match *params {
        Hyperparams::Ridge { alpha } => fit_ridge(x, y, alpha).map(Regressor::Ridge),
        Hyperparams::Tree {
            max_depth,
            min_samples_leaf,
        } => {
            let config = TreeConfig {
                max_depth,
                min_samples_leaf,
            };
            Ok(Regressor::Tree(CartBuilder::new(x, y, config)?.build()))
        }
        Hyperparams::Boosting {
            n_trees,
            learning_rate,
            max_depth,
            min_samples_leaf,
        } => {
            let config = BoostingConfig {
                n_trees,
                learning_rate,
                max_depth,
                min_samples_leaf,
            };
            GradientBooster::new(config).fit(x, y).map(Regressor::Boosting)
        }
    }
}

/// Best configuration of one family, refit and scored on the test split
#[derive(Clone, Debug)]
pub struct FamilyReport {
    pub hyperparams: Hyperparams,
    pub regressor: Regressor,
    pub metrics: EvaluationMetrics,
}

impl FamilyReport {
    pub fn family(&self) -> ModelFamily {
        self.hyperparams.family()
    }
}

/// Result of [`Trainer::train`]
#[derive(Clone, Debug)]
pub struct TrainingOutcome {
    pub artifacts: ArtifactPair,
    /// One entry per searched family, in search order
    pub leaderboard: Vec<FamilyReport>,
}

impl TrainingOutcome {
    pub fn winner(&self) -> ModelFamily {
        self.artifacts.regressor().family()
    }
}

/// Model selection trainer
pub struct Trainer {
    params: TrainingParams,
}

impl Trainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &TrainingParams {
        &self.params
    }

    pub fn train(&self, mut dataset: Dataset) -> Result<TrainingOutcome> {
        let families = self.families()?;

        if self.params.shuffle {
            debug!("shuffling {} rows with seed {}", dataset.len(), self.params.seed);
            dataset.shuffle(self.params.seed);
        }

        let (train, test) = dataset
            .split(self.params.test_ratio)
            .map_err(|e| TrainerError::Dataset(format!("{e:#}")))?;
        info!("split: {} train rows, {} test rows", train.len(), test.len());

        let schema = FeatureSchema::fit(&train.records)?;
        info!("feature columns: {}", schema.columns().join(","));

        let layout = schema.columns();
        let train_raw = schema.encode_batch(&train.records);
        let test_raw = schema.encode_batch(&test.records);

        let scaler = fit_scaler(layout, &schema.numeric_columns(), &train_raw)?;
        let x_train = scaler.transform_rows(layout, &train_raw)?;
        let x_test = scaler.transform_rows(layout, &test_raw)?;

        let search = GridSearch::new(self.params.folds);
        let mut leaderboard = Vec::with_capacity(families.len());

        for family in families {
            let result = search.search_family(family, &x_train, &train.targets)?;
            let hyperparams = result.best.hyperparams;
            let regressor = fit_regressor(&hyperparams, &x_train, &train.targets)?;

            let preds = regressor.predict_rows(&x_test);
            let metrics = EvaluationMetrics {
                cv_mse: result.best.cv_mse,
                test_rmse: rmse(&test.targets, &preds),
                test_mae: mae(&test.targets, &preds),
                test_r2: r2(&test.targets, &preds),
                train_rows: train.len(),
                test_rows: test.len(),
            };
            info!(
                "{family}: test r2={:.4} rmse={:.2} mae={:.2}",
                metrics.test_r2, metrics.test_rmse, metrics.test_mae
            );

            leaderboard.push(FamilyReport {
                hyperparams,
                regressor,
                metrics,
            });
        }

        let winner = select_winner(&leaderboard)
            .cloned()
            .ok_or_else(|| TrainerError::Training("no family was trained".to_string()))?;
        info!("selected {} ({})", winner.family(), winner.hyperparams);

        let artifacts = ArtifactPair::new(
            schema,
            winner.hyperparams,
            winner.regressor,
            winner.metrics,
            scaler,
        )?;

        Ok(TrainingOutcome {
            artifacts,
            leaderboard,
        })
    }

    fn families(&self) -> Result<Vec<ModelFamily>> {
        let mut families = Vec::new();
        for &family in &self.params.families {
            if !families.contains(&family) {
                families.push(family);
            }
        }
        if families.is_empty() {
            return Err(TrainerError::Training("no model family selected".to_string()));
        }
        Ok(families)
    }
}

/// Highest test R²; lower RMSE breaks ties, then search order
pub fn select_winner(reports: &[FamilyReport]) -> Option<&FamilyReport> {
    reports.iter().fold(None, |best: Option<&FamilyReport>, report| match best {
        Some(b) if !beats(&report.metrics, &b.metrics) => Some(b),
        _ => Some(report),
    })
}

fn beats(candidate: &EvaluationMetrics, incumbent: &EvaluationMetrics) -> bool {
    candidate.test_r2 > incumbent.test_r2
        || (candidate.test_r2 == incumbent.test_r2 && candidate.test_rmse < incumbent.test_rmse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insurance_core::LinearModel;

    fn report(alpha: f64, r2: f64, rmse: f64) -> FamilyReport {
        FamilyReport {
            hyperparams: Hyperparams::Ridge { alpha },
            regressor: Regressor::Ridge(LinearModel {
                intercept: 0.0,
                coefficients: vec![],
            }),
            metrics: EvaluationMetrics {
                test_r2: r2,
                test_rmse: rmse,
                ..EvaluationMetrics::default()
            },
        }
    }

    #[test]
    fn winner_has_highest_r2() {
        let reports = vec![report(0.0, 0.7, 10.0), report(1.0, 0.9, 50.0), report(2.0, 0.8, 1.0)];
        assert_eq!(select_winner(&reports).unwrap().hyperparams, Hyperparams::Ridge { alpha: 1.0 });
    }

    #[test]
    fn r2_tie_broken_by_rmse() {
        let reports = vec![report(0.0, 0.9, 10.0), report(1.0, 0.9, 5.0)];
        assert_eq!(select_winner(&reports).unwrap().hyperparams, Hyperparams::Ridge { alpha: 1.0 });

        let reports = vec![report(0.0, 0.9, 5.0), report(1.0, 0.9, 5.0)];
        assert_eq!(select_winner(&reports).unwrap().hyperparams, Hyperparams::Ridge { alpha: 0.0 });
    }

    #[test]
    fn empty_leaderboard_has_no_winner() {
        assert!(select_winner(&[]).is_none());
    }

    #[test]
    fn fit_regressor_dispatches_by_family() {
        let x: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..12).map(|i| i as f64).collect();

        let grid = [
            Hyperparams::Ridge { alpha: 0.0 },
            Hyperparams::Tree {
                max_depth: 2,
                min_samples_leaf: 2,
            },
            Hyperparams::Boosting {
                n_trees: 3,
                learning_rate: 0.1,
                max_depth: 2,
                min_samples_leaf: 1,
            },
        ];
        for params in grid {
            let regressor = fit_regressor(&params, &x, &y).unwrap();
            assert_eq!(regressor.family(), params.family());
        }
    }

    #[test]
    fn empty_family_list_rejected() {
        let trainer = Trainer::new(TrainingParams {
            families: vec![],
            ..TrainingParams::default()
        });
        let dataset = Dataset::new(vec![], vec![]).unwrap();
        assert!(trainer.train(dataset).is_err());
    }
}
