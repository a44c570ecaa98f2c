//! Errors raised while forcing lazy values.

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while forcing a lazy value or running a function.
///
/// Errors are `Clone` because a thunk whose computation failed keeps the
/// error and hands it out again on every later force.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// An explicit error was raised by the program.
    #[error("error: {0}")]
    UserError(Arc<str>),

    /// A case expression had no alternative for the scrutinee.
    #[error("pattern match failure in {0}")]
    PatternMatchFailure(&'static str),

    /// A value did not have the shape its consumer expected.
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        /// The expected shape.
        expected: &'static str,
        /// The shape actually found.
        got: &'static str,
    },

    /// A thunk was forced while its own computation was still running.
    #[error("infinite loop detected (black hole)")]
    BlackHole,

    /// An I/O operation performed by a program action failed.
    #[error("i/o error: {0}")]
    Io(Arc<str>),
}

impl EvalError {
    /// Creates a user error from a message.
    #[must_use]
    pub fn user(message: impl AsRef<str>) -> Self {
        Self::UserError(Arc::from(message.as_ref()))
    }
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::from(err.to_string()))
    }
}

/// Result type for forcing and running.
pub type Eval<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(EvalError::user("boom").to_string(), "error: boom");
        assert_eq!(
            EvalError::TypeError {
                expected: "Int",
                got: "Bool"
            }
            .to_string(),
            "type error: expected Int, got Bool"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        assert_eq!(EvalError::from(err), EvalError::Io(Arc::from("pipe closed")));
    }
}
