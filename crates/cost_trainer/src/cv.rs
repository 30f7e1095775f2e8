//! K-fold cross-validation
//!
//! Folds are contiguous blocks of the (already shuffled) training rows. The
//! first `n % k` folds hold one extra row.

use insurance_core::Hyperparams;

use crate::errors::{Result, TrainerError};
use crate::metrics::mse;
use crate::trainer::fit_regressor;

/// Contiguous K-fold partition of `0..n`
#[derive(Debug, Clone, PartialEq)]
pub struct KFold {
    folds: Vec<std::ops::Range<usize>>,
    n: usize,
}

impl KFold {
    pub fn new(n: usize, k: usize) -> Result<Self> {
        if k < 2 {
            return Err(TrainerError::Training(format!("need at least 2 folds, got {k}")));
        }
        if k > n {
            return Err(TrainerError::Training(format!(
                "cannot make {k} folds from {n} rows"
            )));
        }

        let base = n / k;
        let extra = n % k;
        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for fold in 0..k {
            let len = base + usize::from(fold < extra);
            folds.push(start..start + len);
            start += len;
        }

        Ok(Self { folds, n })
    }

    pub fn len(&self) -> usize {
        self.folds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    /// `(train_indices, validation_indices)` for each fold
    pub fn splits(&self) -> impl Iterator<Item = (Vec<usize>, Vec<usize>)> + '_ {
        self.folds.iter().map(move |held_out| {
            let train = (0..self.n).filter(|i| !held_out.contains(i)).collect();
            (train, held_out.clone().collect())
        })
    }
}

/// Mean validation MSE of `params` across `folds` folds
pub fn cross_val_mse(params: &Hyperparams, x: &[Vec<f64>], y: &[f64], folds: usize) -> Result<f64> {
    let kfold = KFold::new(x.len(), folds)?;

    let mut total = 0.0;
    for (train_idx, valid_idx) in kfold.splits() {
        let train_x: Vec<Vec<f64>> = train_idx.iter().map(|&i| x[i].clone()).collect();
        let train_y: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();

        let model = fit_regressor(params, &train_x, &train_y)?;

        let valid_y: Vec<f64> = valid_idx.iter().map(|&i| y[i]).collect();
        let preds: Vec<f64> = valid_idx.iter().map(|&i| model.predict(&x[i])).collect();
        total += mse(&valid_y, &preds);
    }

    let score = total / kfold.len() as f64;
    if !score.is_finite() {
        return Err(TrainerError::Training(format!("{params} produced a non-finite CV score")));
    }
    Ok(score)
}
