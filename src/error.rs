//! Error taxonomy for the analytics engine

use thiserror::Error;

/// Errors raised by engine operations.
///
/// Every engine operation either returns a complete result map or one of
/// these errors; results are never partially populated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed input matrix: not square, duplicated labels, or row labels
    /// that differ from column labels.
    #[error("shape error: {0}")]
    Shape(String),

    /// A matrix cell that is not a number.
    #[error("type error: cell [{row}, {column}] is not numeric ({value:?})")]
    Type {
        row: String,
        column: String,
        value: String,
    },

    /// Unrecognized centrality or clustering method selector.
    #[error("unknown method: {0:?}")]
    UnknownMethod(String),

    /// An iterative method exhausted its budget without converging.
    #[error("{algorithm} did not converge within {iterations} iterations")]
    Convergence {
        algorithm: &'static str,
        iterations: usize,
    },

    /// Degenerate input for the requested computation.
    #[error("computation error: {0}")]
    Computation(String),

    /// A recognized method that the engine deliberately does not implement.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Result alias for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;
