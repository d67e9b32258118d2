//! Error types for the catalog crate.

use thiserror::Error;

/// Errors produced while loading or validating catalog data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// A begin/end field could not be parsed as a wall-clock time.
    #[error("malformed time '{value}' in {context}")]
    MalformedTime {
        /// The raw field value.
        value: String,
        /// Where the value was found (course/section id).
        context: String,
    },

    /// A day token was not one of M/T/W/R/F or a weekday name.
    #[error("unknown day '{0}'")]
    UnknownDay(String),

    /// The meeting ends at or before it begins.
    #[error("meeting {context} ends at {end} before it begins at {begin}")]
    InvertedInterval {
        /// Course/section id.
        context: String,
        /// Begin time as written.
        begin: String,
        /// End time as written.
        end: String,
    },

    /// Two course records share an identifier.
    #[error("duplicate course id: {0}")]
    DuplicateCourse(String),

    /// Slot grid configuration cannot produce any slot.
    #[error("invalid time grid: {0}")]
    InvalidGrid(String),

    /// A synthetic-data range has `min > max`.
    #[error("invalid synthetic range: {0}")]
    InvalidRange(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::MalformedTime {
            value: "25:99".into(),
            context: "18100-A".into(),
        };
        assert_eq!(err.to_string(), "malformed time '25:99' in 18100-A");

        let err = CatalogError::UnknownDay("S".into());
        assert_eq!(err.to_string(), "unknown day 'S'");
    }
}
