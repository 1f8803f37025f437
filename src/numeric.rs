//! Fixed-point iteration shared by the spectral centrality measures

use ndarray::{Array1, Array2};

use crate::error::{EngineError, EngineResult};

/// Iteration cap and convergence tolerance for an iterative solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationBudget {
    pub max_iter: usize,
    pub tolerance: f64,
}

/// Converged iterate together with the number of steps it took
#[derive(Debug, Clone)]
pub struct FixedPoint {
    pub vector: Array1<f64>,
    pub iterations: usize,
}

/// Iterate `x <- step(x)` until the L1 change drops below `n * tolerance`.
///
/// Non-finite iterates and an exhausted budget are both reported as
/// [`EngineError::Convergence`] for `algorithm`.
pub fn fixed_point<F>(
    start: Array1<f64>,
    budget: IterationBudget,
    algorithm: &'static str,
    mut step: F,
) -> EngineResult<FixedPoint>
where
    F: FnMut(&Array1<f64>) -> Array1<f64>,
{
    let n = start.len();
    let threshold = n as f64 * budget.tolerance;
    let mut current = start;

    for iteration in 1..=budget.max_iter {
        let next = step(&current);
        if next.iter().any(|v| !v.is_finite()) {
            log::debug!("{} diverged at iteration {}", algorithm, iteration);
            return Err(EngineError::Convergence {
                algorithm,
                iterations: iteration,
            });
        }

        let change: f64 = next
            .iter()
            .zip(current.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        current = next;

        if change < threshold {
            log::debug!("{} converged after {} iterations", algorithm, iteration);
            return Ok(FixedPoint {
                vector: current,
                iterations: iteration,
            });
        }
    }

    Err(EngineError::Convergence {
        algorithm,
        iterations: budget.max_iter,
    })
}

/// Scale to unit L2 norm; a zero vector is returned unchanged
pub fn l2_normalize(vector: Array1<f64>) -> Array1<f64> {
    let norm = vector.dot(&vector).sqrt();
    if norm > 0.0 {
        vector / norm
    } else {
        vector
    }
}

/// Power iteration on `(I + m)`, normalising each step.
///
/// Starts from the uniform vector `1/n`. Adding the identity shifts the
/// spectrum so that periodic graphs still converge.
pub fn power_iteration(
    matrix: &Array2<f64>,
    budget: IterationBudget,
    algorithm: &'static str,
) -> EngineResult<FixedPoint> {
    let n = matrix.nrows();
    let start = Array1::from_elem(n, 1.0 / n as f64);

    fixed_point(start, budget, algorithm, |x| l2_normalize(x + &matrix.dot(x)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const BUDGET: IterationBudget = IterationBudget {
        max_iter: 100,
        tolerance: 1e-9,
    };

    #[test]
    fn power_iteration_finds_dominant_eigenvector() {
        // eigenvalues 3 and 1; dominant eigenvector (1, 1)/sqrt(2)
        let m = array![[2.0, 1.0], [1.0, 2.0]];
        let result = power_iteration(&m, BUDGET, "test").unwrap();
        let expected = 1.0 / 2f64.sqrt();
        assert!((result.vector[0] - expected).abs() < 1e-6);
        assert!((result.vector[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn fixed_point_reports_exhausted_budget() {
        let start = array![1.0];
        let budget = IterationBudget {
            max_iter: 5,
            tolerance: 1e-12,
        };
        let err = fixed_point(start, budget, "doubling", |x| x * 2.0).unwrap_err();
        assert_eq!(
            err,
            EngineError::Convergence {
                algorithm: "doubling",
                iterations: 5
            }
        );
    }

    #[test]
    fn fixed_point_reports_divergence_to_infinity() {
        let start = array![f64::MAX];
        let err = fixed_point(start, BUDGET, "overflow", |x| x * 10.0).unwrap_err();
        assert!(matches!(err, EngineError::Convergence { iterations: 1, .. }));
    }

    #[test]
    fn zero_vector_survives_normalisation() {
        let v = l2_normalize(array![0.0, 0.0]);
        assert_eq!(v, array![0.0, 0.0]);
    }
}
