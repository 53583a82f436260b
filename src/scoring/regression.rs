//! Ordinary least squares with an intercept.
//!
//! Columns are centred, then the normal equations are solved by Gauss-Jordan
//! elimination with partial pivoting. A column whose pivot vanishes (constant
//! in the training rows, or a linear combination of earlier columns) is
//! given coefficient zero, so one-hot columns absent from a fold do not make
//! the system unsolvable.

use crate::scoring::utility::{column_means, dot, mean};

/// Relative size below which a pivot is treated as zero.
const PIVOT_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Fits `y ≈ intercept + x · coefficients`. All rows of `x` must have the
    /// same width.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Self {
        let width = x.first().map_or(0, Vec::len);
        let x_mean = column_means(x, width);
        let y_mean = mean(y);

        let mut gram = vec![vec![0.0; width]; width];
        let mut moment = vec![0.0; width];
        let mut centred = vec![0.0; width];
        for (row, &target) in x.iter().zip(y) {
            for (c, (v, m)) in centred.iter_mut().zip(row.iter().zip(&x_mean)) {
                *c = v - m;
            }
            let yc = target - y_mean;
            for i in 0..width {
                moment[i] += centred[i] * yc;
                for j in i..width {
                    gram[i][j] += centred[i] * centred[j];
                }
            }
        }
        for i in 0..width {
            for j in 0..i {
                gram[i][j] = gram[j][i];
            }
        }

        let coefficients = solve(gram, moment);
        let intercept = y_mean - dot(&coefficients, &x_mean);
        Self {
            intercept,
            coefficients,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept + dot(&self.coefficients, row)
    }
}

/// Solves the symmetric system `a · β = b`, zeroing free variables.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    let scale = (0..n).map(|i| a[i][i].abs()).fold(0.0, f64::max);
    let tolerance = scale * PIVOT_EPSILON;

    let mut pivot_row_of: Vec<Option<usize>> = vec![None; n];
    let mut row = 0;

    for col in 0..n {
        let Some((best, best_abs)) = (row..n)
            .map(|r| (r, a[r][col].abs()))
            .max_by(|x, y| x.1.total_cmp(&y.1))
        else {
            break;
        };
        if best_abs <= tolerance {
            continue;
        }

        a.swap(row, best);
        b.swap(row, best);

        let pivot = a[row][col];
        for v in &mut a[row][col..] {
            *v /= pivot;
        }
        b[row] /= pivot;

        let pivot_vals = a[row].clone();
        let pivot_rhs = b[row];
        for r in (0..n).filter(|&r| r != row) {
            let factor = a[r][col];
            if factor == 0.0 {
                continue;
            }
            for (v, p) in a[r][col..].iter_mut().zip(&pivot_vals[col..]) {
                *v -= factor * p;
            }
            b[r] -= factor * pivot_rhs;
        }

        pivot_row_of[col] = Some(row);
        row += 1;
    }

    pivot_row_of
        .into_iter()
        .map(|r| r.map_or(0.0, |r| b[r]))
        .collect()
}
