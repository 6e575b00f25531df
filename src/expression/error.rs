//! Expression error types
//!
//! Construction-time validation errors raised by the expression builder.

use thiserror::Error;

/// Errors that can occur while building expressions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// An argument violates a structural rule of the expression grammar
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Filter name outside the closed set of filter kinds
    #[error("Unknown filter kind: {0}")]
    UnknownFilterKind(String),
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::UnknownFilterKind("like".to_string());
        assert_eq!(err.to_string(), "Unknown filter kind: like");

        let err = ExpressionError::InvalidArgument("too many properties".to_string());
        assert_eq!(err.to_string(), "Invalid argument: too many properties");
    }
}
