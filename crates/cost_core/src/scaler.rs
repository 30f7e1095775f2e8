//! Standard scaling of numeric columns
//!
//! Statistics are learned once, from the training split, by the trainer and
//! are immutable afterwards. This crate offers no fitting constructor: a
//! scaler only comes from stored statistics via [`StandardScaler::from_statistics`].

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Per-column mean and standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Rebuild a scaler from previously learned statistics
    pub fn from_statistics(columns: Vec<String>, means: Vec<f64>, scales: Vec<f64>) -> Result<Self> {
        let scaler = Self {
            columns,
            means,
            scales,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn validate(&self) -> Result<()> {
        if self.columns.len() != self.means.len() || self.columns.len() != self.scales.len() {
            return Err(CoreError::Scaler(format!(
                "{} columns but {} means and {} scales",
                self.columns.len(),
                self.means.len(),
                self.scales.len()
            )));
        }
        if let Some(mean) = self.means.iter().find(|m| !m.is_finite()) {
            return Err(CoreError::Scaler(format!("non-finite mean {mean}")));
        }
        if let Some(scale) = self.scales.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(CoreError::Scaler(format!("scale must be positive, got {scale}")));
        }
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Positions of the scaled columns inside `layout`
    pub fn indices_in(&self, layout: &[String]) -> Result<Vec<usize>> {
        column_indices(layout, &self.columns)
    }

    /// Scale one row laid out as `layout`; columns the scaler does not own pass through
    pub fn transform_row(&self, layout: &[String], row: &[f64]) -> Result<Vec<f64>> {
        let indices = self.indices_in(layout)?;
        self.apply(&indices, row)
    }

    /// Scale every row of a matrix laid out as `layout`
    pub fn transform_rows(&self, layout: &[String], rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let indices = self.indices_in(layout)?;
        rows.iter().map(|row| self.apply(&indices, row)).collect()
    }

    fn apply(&self, indices: &[usize], row: &[f64]) -> Result<Vec<f64>> {
        let mut out = row.to_vec();
        for (k, &idx) in indices.iter().enumerate() {
            let value = cell(row, idx)?;
            out[idx] = (value - self.means[k]) / self.scales[k];
        }
        Ok(out)
    }
}

fn column_indices(layout: &[String], columns: &[String]) -> Result<Vec<usize>> {
    columns
        .iter()
        .map(|column| {
            layout.iter().position(|c| c == column).ok_or_else(|| {
                CoreError::Scaler(format!("column {column:?} is not part of the feature layout"))
            })
        })
        .collect()
}

fn cell(row: &[f64], idx: usize) -> Result<f64> {
    row.get(idx).copied().ok_or_else(|| {
        CoreError::Scaler(format!("row has {} values, expected index {idx}", row.len()))
    })
}
