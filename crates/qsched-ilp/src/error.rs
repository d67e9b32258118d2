//! Error types for the integer-program crate.

use qsched_catalog::CatalogError;
use thiserror::Error;

/// Errors produced while assembling, solving or decoding an integer program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IlpError {
    /// Instance data cannot be formulated.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A solution does not carry one value per variable.
    #[error("solution has {got} values but the model has {expected} variables")]
    ValueCount {
        /// Variables in the model.
        expected: usize,
        /// Values supplied.
        got: usize,
    },

    /// The reference solver cannot handle this constraint structure.
    #[error("unsupported model structure: {0}")]
    UnsupportedStructure(String),

    /// A rounded solution breaks a hard constraint.
    #[error("solution violates constraint {0}")]
    InvalidSolution(String),

    /// Recomputed objective disagrees with the solver-reported value.
    #[error("reported objective {reported} differs from recomputed {recomputed} (tolerance {tolerance})")]
    NumericDrift {
        /// Solver-reported value.
        reported: f64,
        /// Value recomputed from the objective coefficients.
        recomputed: f64,
        /// Allowed absolute difference.
        tolerance: f64,
    },

    /// The solver backend failed or returned an unusable status.
    #[error("solver backend failed: {0}")]
    Backend(String),

    /// Catalog validation error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for integer-program operations.
pub type IlpResult<T> = Result<T, IlpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_converts() {
        let err: IlpError = CatalogError::InvalidGrid("no teaching days".into()).into();
        assert_eq!(
            err.to_string(),
            "catalog error: invalid time grid: no teaching days"
        );
    }
}
