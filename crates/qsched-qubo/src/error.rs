//! Error types for the QUBO crate.

use qsched_catalog::CatalogError;
use thiserror::Error;

/// Errors produced while building, transforming or decoding a QUBO.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuboError {
    /// The course list cannot be formulated (empty required course, name collision).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A bit assignment does not match the variable count.
    #[error("assignment has {got} bits but the model has {expected} variables")]
    BitstringLength {
        /// Variables in the model.
        expected: usize,
        /// Bits supplied.
        got: usize,
    },

    /// The exhaustive sampler was asked to enumerate too many variables.
    #[error("{n} variables exceed the exhaustive sampler limit of {max}")]
    TooManyVariables {
        /// Variables in the model.
        n: usize,
        /// Largest enumerable size.
        max: usize,
    },

    /// Soft costs could outweigh a hard-constraint penalty.
    #[error(
        "soft costs total {soft_total} but the smallest hard penalty is {hard_min}; \
         hard constraints would no longer dominate"
    )]
    PenaltyDominance {
        /// Sum of absolute soft contributions.
        soft_total: f64,
        /// `min(course_penalty, conflict_penalty)`.
        hard_min: f64,
    },

    /// A recomputed energy disagrees with the value a backend reported.
    #[error("reported energy {reported} differs from recomputed {recomputed} (tolerance {tolerance})")]
    NumericDrift {
        /// Backend-reported value.
        reported: f64,
        /// Value recomputed from the coefficient maps.
        recomputed: f64,
        /// Allowed absolute difference.
        tolerance: f64,
    },

    /// Decoding was given an empty sample set.
    #[error("no samples to decode")]
    NoSamples,

    /// A sampler backend failed.
    #[error("sampler backend failed: {0}")]
    Backend(String),

    /// Catalog validation error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for QUBO operations.
pub type QuboResult<T> = Result<T, QuboError>;
