//! Fitting the standard scaler on the training split
//!
//! The core crate only knows how to rebuild a scaler from stored statistics;
//! learning those statistics lives here, in the training job.

use insurance_core::StandardScaler;

use crate::errors::{Result, TrainerError};

/// Learn per-column mean and population std for `columns` from `rows` laid out as `layout`.
///
/// A constant column gets a scale of 1.
pub fn fit_scaler(layout: &[String], columns: &[String], rows: &[Vec<f64>]) -> Result<StandardScaler> {
    if rows.is_empty() {
        return Err(TrainerError::Training("cannot fit a scaler on zero rows".to_string()));
    }

    let n = rows.len() as f64;
    let mut means = Vec::with_capacity(columns.len());
    let mut scales = Vec::with_capacity(columns.len());

    for column in columns {
        let idx = layout.iter().position(|c| c == column).ok_or_else(|| {
            TrainerError::Training(format!("column {column:?} is not part of the feature layout"))
        })?;
        let values = rows
            .iter()
            .map(|row| {
                row.get(idx).copied().ok_or_else(|| {
                    TrainerError::Training(format!("row has {} values, expected index {idx}", row.len()))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let std = variance.sqrt();

        means.push(mean);
        scales.push(if std.is_finite() && std > 0.0 { std } else { 1.0 });
    }

    tracing::debug!(?columns, ?means, ?scales, "fitted standard scaler");

    Ok(StandardScaler::from_statistics(columns.to_vec(), means, scales)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Vec<String> {
        ["age", "bmi", "smoker_yes"].iter().map(|s| s.to_string()).collect()
    }

    fn numeric() -> Vec<String> {
        ["age", "bmi"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fit_uses_population_std() {
        let rows = vec![vec![20.0, 30.0, 0.0], vec![40.0, 30.0, 1.0]];
        let scaler = fit_scaler(&layout(), &numeric(), &rows).unwrap();
        assert_eq!(scaler.means(), [30.0, 30.0]);
        assert_eq!(scaler.scales(), [10.0, 1.0]);
    }

    #[test]
    fn statistics_unchanged_by_later_transforms() {
        let train = vec![vec![19.0, 27.9, 1.0], vec![33.0, 22.7, 0.0], vec![60.0, 35.1, 0.0]];
        let scaler = fit_scaler(&layout(), &numeric(), &train).unwrap();
        let means = scaler.means().to_vec();
        let scales = scaler.scales().to_vec();

        let test = vec![vec![90.0, 50.0, 1.0], vec![18.0, 16.0, 0.0]];
        let first = scaler.transform_rows(&layout(), &test).unwrap();
        scaler.transform_rows(&layout(), &train).unwrap();
        let second = scaler.transform_rows(&layout(), &test).unwrap();

        assert_eq!(scaler.means(), means.as_slice());
        assert_eq!(scaler.scales(), scales.as_slice());
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_empty_or_unknown_columns() {
        assert!(fit_scaler(&layout(), &numeric(), &[]).is_err());
        let rows = vec![vec![1.0, 2.0, 0.0]];
        assert!(fit_scaler(&layout(), &["children".to_string()], &rows).is_err());
        assert!(fit_scaler(&layout(), &numeric(), &[vec![1.0]]).is_err());
    }
}
