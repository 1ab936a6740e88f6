//! Error types for the term-expectations library.
//!
//! All errors in the library are represented by the `TermError` enum, built with
//! `thiserror`. The result formatter and the unexpected-value aggregator only ever
//! produce [`TermError::InvariantViolation`] and [`TermError::Normalization`]; the
//! remaining variants come from dataset access, expectation construction and
//! report rendering.

use thiserror::Error;

/// The main error type for the term-expectations library.
#[derive(Error, Debug)]
pub enum TermError {
    /// The caller supplied counts or lists that break the formatter's contract.
    ///
    /// Examples are an unexpected-index list whose length differs from the
    /// unexpected count, or a nonnull count larger than the element count.
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Human-readable description of the broken invariant
        message: String,
    },

    /// An unexpected value cannot be turned into a deterministic histogram key.
    #[error("Normalization error: {message}")]
    Normalization {
        /// Description of the offending value
        message: String,
    },

    /// Error related to configuration (result formats, expectation parameters).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error when a required column is not found in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error when data types don't match expected types.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Error when an operation is not supported.
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from serialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
///
/// # Examples
///
/// ```rust
/// use term_expectations::error::Result;
///
/// fn validate_data() -> Result<()> {
///     Ok(())
/// }
/// # validate_data().unwrap();
/// ```
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates a new invariant violation error.
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Creates a new normalization error.
    pub fn normalization(message: impl Into<String>) -> Self {
        Self::Normalization {
            message: message.into(),
        }
    }

    /// Creates a new column-not-found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a new type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Returns true for errors that signal a broken caller contract rather than
    /// a problem with the data or configuration.
    pub fn is_contract_error(&self) -> bool {
        matches!(
            self,
            TermError::InvariantViolation { .. } | TermError::Normalization { .. }
        )
    }
}

impl From<serde_json::Error> for TermError {
    fn from(err: serde_json::Error) -> Self {
        TermError::Serialization(err.to_string())
    }
}

impl From<std::fmt::Error> for TermError {
    fn from(_: std::fmt::Error) -> Self {
        TermError::Internal("failed to write formatted output".to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<TermError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| attach_context(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| attach_context(&f(), e.into()))
    }
}

// Contract errors keep their kind so callers can still match on them.
fn attach_context(msg: &str, err: TermError) -> TermError {
    match err {
        TermError::InvariantViolation { message } => {
            TermError::invariant_violation(format!("{msg}: {message}"))
        }
        TermError::Normalization { message } => {
            TermError::normalization(format!("{msg}: {message}"))
        }
        TermError::Internal(inner) => TermError::Internal(format!("{msg}: {inner}")),
        other => TermError::Internal(format!("{msg}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_violation_message() {
        let err = TermError::invariant_violation("unexpected_count 3 != 2 indices");
        assert_eq!(
            err.to_string(),
            "Invariant violation: unexpected_count 3 != 2 indices"
        );
        assert!(err.is_contract_error());
    }

    #[test]
    fn test_normalization_message() {
        let err = TermError::normalization("list value is not hashable");
        assert_eq!(
            err.to_string(),
            "Normalization error: list value is not hashable"
        );
        assert!(err.is_contract_error());
    }

    #[test]
    fn test_column_not_found() {
        let err = TermError::column_not_found("user_id");
        assert_eq!(err.to_string(), "Column 'user_id' not found in dataset");
        assert!(!err.is_contract_error());
    }

    #[test]
    fn test_type_mismatch() {
        let err = TermError::type_mismatch("Int64", "Utf8");
        assert_eq!(err.to_string(), "Type mismatch: expected Int64, found Utf8");
    }

    #[test]
    fn test_error_context_keeps_contract_kind() {
        fn failing_operation() -> Result<()> {
            Err(TermError::invariant_violation("lengths differ"))
        }

        let err = failing_operation()
            .context("While formatting map output")
            .unwrap_err();
        assert!(matches!(err, TermError::InvariantViolation { .. }));
        assert!(err.to_string().contains("While formatting map output"));
    }

    #[test]
    fn test_error_with_context_wraps_other_errors() {
        let result: std::result::Result<(), TermError> =
            Err(TermError::Configuration("bad level".to_string()));
        let err = result
            .with_context(|| "Loading result format".to_string())
            .unwrap_err();
        assert!(matches!(err, TermError::Internal(_)));
        assert!(err.to_string().contains("Loading result format"));
    }
}
