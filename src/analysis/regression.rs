use serde::Serialize;

use super::error::AnalysisError;

/// Ordinary least squares fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination; `None` when every `y` is the same.
    pub r_squared: Option<f64>,
    pub observations: usize,
    /// Fitted `y` for each input point, in input order.
    pub fitted: Vec<f64>,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a straight line through `(x, y)` points.
///
/// Uses centred sums, which stay accurate for large CO₂ magnitudes. Needs at
/// least two distinct `x` values; anything less is reported as
/// [`AnalysisError::InsufficientDataForFit`] rather than a degenerate line.
pub fn fit_linear(points: &[(f64, f64)]) -> Result<LinearFit, AnalysisError> {
    let n = points.len();
    let distinct_x = count_distinct_x(points);
    if n < 2 || distinct_x < 2 {
        return Err(AnalysisError::InsufficientDataForFit {
            observations: n,
            distinct_x,
        });
    }

    let nf = n as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / nf;

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let fitted: Vec<f64> = points.iter().map(|p| slope * p.0 + intercept).collect();

    let r_squared = (syy > 0.0).then(|| {
        let ss_res: f64 = points
            .iter()
            .zip(&fitted)
            .map(|(p, f)| (p.1 - f).powi(2))
            .sum();
        1.0 - ss_res / syy
    });

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        observations: n,
        fitted,
    })
}

fn count_distinct_x(points: &[(f64, f64)]) -> usize {
    let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    xs.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-6;

    #[test]
    fn test_exact_line() {
        let fit = fit_linear(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]).unwrap();
        assert!((fit.slope - 2.0).abs() < TOL);
        assert!(fit.intercept.abs() < TOL);
        assert_eq!(fit.observations, 3);
        assert!((fit.r_squared.unwrap() - 1.0).abs() < TOL);
        for (f, expected) in fit.fitted.iter().zip([2.0, 4.0, 6.0]) {
            assert!((f - expected).abs() < TOL);
        }
    }

    #[test]
    fn test_noisy_line() {
        // y = 0.5x + 1 with symmetric noise
        let fit = fit_linear(&[(0.0, 1.1), (2.0, 1.9), (4.0, 3.1), (6.0, 3.9)]).unwrap();
        assert!((fit.slope - 0.48).abs() < TOL);
        assert!((fit.intercept - 1.06).abs() < TOL);
        assert!((fit.predict(10.0) - 5.86).abs() < TOL);
    }

    #[test]
    fn test_large_x_magnitudes() {
        let points: Vec<(f64, f64)> = (0..10)
            .map(|i| {
                let x = 1.0e9 + i as f64;
                (x, 3.0 * (x - 1.0e9) + 7.0)
            })
            .collect();
        let fit = fit_linear(&points).unwrap();
        assert!((fit.slope - 3.0).abs() < TOL);
        assert!((fit.predict(1.0e9) - 7.0).abs() < 1e-3);
    }

    #[test]
    fn test_flat_y_has_no_r_squared() {
        let fit = fit_linear(&[(1.0, 5.0), (2.0, 5.0)]).unwrap();
        assert!(fit.slope.abs() < TOL);
        assert_eq!(fit.r_squared, None);
    }

    #[test]
    fn test_empty_and_single_point_are_insufficient() {
        assert_eq!(
            fit_linear(&[]),
            Err(AnalysisError::InsufficientDataForFit {
                observations: 0,
                distinct_x: 0
            })
        );
        assert_eq!(
            fit_linear(&[(1.0, 2.0)]),
            Err(AnalysisError::InsufficientDataForFit {
                observations: 1,
                distinct_x: 1
            })
        );
    }

    #[test]
    fn test_repeated_x_is_insufficient() {
        let err = fit_linear(&[(3.0, 1.0), (3.0, 2.0), (3.0, 4.0)]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientDataForFit {
                observations: 3,
                distinct_x: 1
            }
        );
    }
}
