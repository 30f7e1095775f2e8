//! Ridge regression by normal equations
//!
//! Features and target are centered so the intercept is never penalised.
//! The system `(XᵀX + αI) w = Xᵀy` is solved with Gauss–Jordan elimination;
//! a column with no pivot (constant or collinear, possible inside a small
//! fold when `α = 0`) gets a zero weight instead of failing the fit.

use insurance_core::LinearModel;

use crate::errors::{Result, TrainerError};

const PIVOT_TOLERANCE: f64 = 1e-10;

/// Fit `y ≈ intercept + w · x` with L2 penalty `alpha` on `w`
pub fn fit_ridge(x: &[Vec<f64>], y: &[f64], alpha: f64) -> Result<LinearModel> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return Err(TrainerError::Training(format!(
            "ridge needs matching non-empty inputs, got {n} rows and {} targets",
            y.len()
        )));
    }
    if !(alpha >= 0.0 && alpha.is_finite()) {
        return Err(TrainerError::Training(format!("alpha must be >= 0, got {alpha}")));
    }

    let p = x[0].len();
    if x.iter().any(|row| row.len() != p) {
        return Err(TrainerError::Training("ragged feature matrix".to_string()));
    }

    let x_mean: Vec<f64> = (0..p)
        .map(|j| x.iter().map(|row| row[j]).sum::<f64>() / n as f64)
        .collect();
    let y_mean = y.iter().sum::<f64>() / n as f64;

    // augmented [XᵀX + αI | Xᵀy] on centered data
    let mut system = vec![vec![0.0; p + 1]; p];
    for (row, &target) in x.iter().zip(y) {
        let centered: Vec<f64> = row.iter().zip(&x_mean).map(|(v, m)| v - m).collect();
        let yc = target - y_mean;
        for i in 0..p {
            for j in i..p {
                system[i][j] += centered[i] * centered[j];
            }
            system[i][p] += centered[i] * yc;
        }
    }
    for i in 0..p {
        for j in 0..i {
            system[i][j] = system[j][i];
        }
        system[i][i] += alpha;
    }

    let coefficients = solve(system, p)?;
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_mean)
            .map(|(w, m)| w * m)
            .sum::<f64>();

    if !intercept.is_finite() {
        return Err(TrainerError::Training("ridge solution is not finite".to_string()));
    }

    Ok(LinearModel {
        intercept,
        coefficients,
    })
}

/// Gauss–Jordan with partial pivoting; free variables are set to zero
fn solve(mut a: Vec<Vec<f64>>, p: usize) -> Result<Vec<f64>> {
    let scale = (0..p).map(|i| a[i][i].abs()).fold(1.0, f64::max);
    let tolerance = PIVOT_TOLERANCE * scale;

    let mut pivot_row_of = vec![None; p];
    let mut row = 0;

    for col in 0..p {
        if row == p {
            break;
        }

        let (best, best_abs) = (row..p)
            .map(|r| (r, a[r][col].abs()))
            .fold((row, -1.0), |acc, cand| if cand.1 > acc.1 { cand } else { acc });
        if best_abs <= tolerance {
            continue;
        }
        a.swap(row, best);

        let pivot = a[row][col];
        for v in a[row].iter_mut() {
            *v /= pivot;
        }

        let pivot_values = a[row].clone();
        for (r, other) in a.iter_mut().enumerate() {
            if r == row {
                continue;
            }
            let factor = other[col];
            if factor != 0.0 {
                for (v, pv) in other.iter_mut().zip(&pivot_values) {
                    *v -= factor * pv;
                }
            }
        }

        pivot_row_of[col] = Some(row);
        row += 1;
    }

    let solution: Vec<f64> = pivot_row_of
        .iter()
        .map(|r| r.map(|r| a[r][p]).unwrap_or(0.0))
        .collect();

    if solution.iter().any(|w| !w.is_finite()) {
        return Err(TrainerError::Training("linear system produced non-finite weights".to_string()));
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-8
    }

    #[test]
    fn recovers_exact_linear_relation() {
        // y = 3 + 2a - b
        let x = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![2.0, 3.0],
            vec![4.0, 1.0],
        ];
        let y: Vec<f64> = x.iter().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();
        let model = fit_ridge(&x, &y, 0.0).unwrap();

        assert!(close(model.intercept, 3.0), "{}", model.intercept);
        assert!(close(model.coefficients[0], 2.0));
        assert!(close(model.coefficients[1], -1.0));
    }

    #[test]
    fn penalty_shrinks_weights() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| 5.0 * i as f64).collect();
        let plain = fit_ridge(&x, &y, 0.0).unwrap();
        let shrunk = fit_ridge(&x, &y, 100.0).unwrap();
        assert!(shrunk.coefficients[0].abs() < plain.coefficients[0].abs());
    }

    #[test]
    fn constant_column_gets_zero_weight() {
        let x = vec![vec![1.0, 7.0], vec![2.0, 7.0], vec![3.0, 7.0]];
        let y = vec![2.0, 4.0, 6.0];
        let model = fit_ridge(&x, &y, 0.0).unwrap();
        assert!(close(model.coefficients[0], 2.0));
        assert_eq!(model.coefficients[1], 0.0);
        assert!(close(model.intercept, 0.0));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(fit_ridge(&[], &[], 0.0).is_err());
        assert!(fit_ridge(&[vec![1.0]], &[1.0, 2.0], 0.0).is_err());
        assert!(fit_ridge(&[vec![1.0]], &[1.0], -1.0).is_err());
    }
}
