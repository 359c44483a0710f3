//! Ordinary least-squares fit of speed against armature current.
//!
//! For samples `(x_i, y_i)` the model `y = a·x + b` is fitted by solving the
//! normal equations of the design matrix `[x_i - x̄, 1]`. Centering keeps the
//! system well conditioned when the currents sit far from zero; the slope is
//! unchanged and the intercept is shifted back afterwards.

use crate::error::{ArmatureError, Result};

/// Relative pivot size below which the normal matrix is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// A fitted line `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = a·x + b` by least squares.
///
/// Fails with [`ArmatureError::Fit`] when the slices differ in length, when
/// fewer than two distinct `x` values are present, or when the normal
/// equations are numerically singular.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LinearFit> {
    if xs.len() != ys.len() {
        return Err(ArmatureError::Fit(format!(
            "length mismatch: {} x values, {} y values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(ArmatureError::Fit("samples contain NaN/Inf".into()));
    }
    if distinct_count(xs) < 2 {
        return Err(ArmatureError::Fit(format!(
            "need at least 2 distinct currents, got {} sample(s)",
            xs.len()
        )));
    }

    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;

    // AᵀA and Aᵀy for A = [x - x̄, 1]
    let mut sxx = 0.0;
    let mut sx = 0.0;
    let mut sxy = 0.0;
    let mut sy = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - x_mean;
        sxx += dx * dx;
        sx += dx;
        sxy += dx * y;
        sy += y;
    }

    let solution = solve_dense(vec![vec![sxx, sx, sxy], vec![sx, n, sy]])?;
    let slope = solution[0];
    let intercept = solution[1] - slope * x_mean;

    Ok(LinearFit { slope, intercept })
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Solve the square system held in the augmented matrix `[A | b]` by
/// Gaussian elimination with partial pivoting.
fn solve_dense(mut aug: Vec<Vec<f64>>) -> Result<Vec<f64>> {
    let n = aug.len();
    let scale = aug
        .iter()
        .flat_map(|row| row[..n].iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 {
        return Err(ArmatureError::Fit("singular normal matrix".into()));
    }

    // Forward elimination with partial pivoting
    for k in 0..n {
        let mut max_val = aug[k][k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = aug[i][k].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }

        if max_val < SINGULAR_TOLERANCE * scale {
            return Err(ArmatureError::Fit("singular normal matrix".into()));
        }

        if max_row != k {
            aug.swap(k, max_row);
        }

        let pivot = aug[k][k];
        for i in (k + 1)..n {
            let factor = aug[i][k] / pivot;
            aug[i][k] = 0.0;
            for j in (k + 1)..=n {
                aug[i][j] -= factor * aug[k][j];
            }
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = aug[i][n];
        for j in (i + 1)..n {
            sum -= aug[i][j] * x[j];
        }
        x[i] = sum / aug[i][i];
    }

    Ok(x)
}
