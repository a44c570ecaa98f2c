//! Runtime error types.

use std::fmt;
use std::io;

use lrt_core::EvalError;
use thiserror::Error;

/// Result type for driver operations.
pub type RuntimeResult<T> = Result<T, RuntimeFailure>;

/// A failure that escaped the program.
///
/// There is no recovery: the driver flushes output and reports it to the
/// caller.
#[derive(Debug, Error)]
pub enum RuntimeFailure {
    /// Forcing failed.
    #[error("uncaught failure: {0}")]
    Eval(#[from] EvalError),

    /// A value could not be duplicated.
    #[error(transparent)]
    Duplication(#[from] DuplicationError),

    /// Buffered output could not be written out.
    #[error("cannot flush {handle}: {source}")]
    Flush {
        /// Name of the handle.
        handle: &'static str,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// The step of a duplication round trip that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicationStage {
    /// Converting the value to its serialized form.
    Serialize,
    /// Rebuilding a value from the serialized form.
    Deserialize,
}

impl fmt::Display for DuplicationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize => write!(f, "serialization"),
            Self::Deserialize => write!(f, "deserialization"),
        }
    }
}

/// A value could not be duplicated.
#[derive(Debug, Error)]
#[error("error in {stage} of {type_name}")]
pub struct DuplicationError {
    /// The failed step.
    pub stage: DuplicationStage,
    /// The type being duplicated.
    pub type_name: &'static str,
    /// The underlying cause.
    #[source]
    pub source: serde_json::Error,
}

/// An invalid runtime configuration setting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A boolean setting was not one of the accepted spellings.
    #[error("{var}: expected a boolean, got {value:?}")]
    InvalidBool {
        /// Environment variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A buffer capacity was not a positive integer.
    #[error("{var}: expected a positive buffer size, got {value:?}")]
    InvalidCapacity {
        /// Environment variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A log level was not recognized.
    #[error("{var}: unknown log level {value:?}")]
    InvalidLevel {
        /// Environment variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_failure_display() {
        let failure = RuntimeFailure::from(EvalError::user("Prelude.undefined"));
        assert_eq!(failure.to_string(), "uncaught failure: error: Prelude.undefined");
    }

    #[test]
    fn test_flush_failure_keeps_source() {
        let failure = RuntimeFailure::Flush {
            handle: "stdout",
            source: io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        };
        assert_eq!(failure.to_string(), "cannot flush stdout: pipe closed");
        assert!(std::error::Error::source(&failure).is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidCapacity {
            var: "LRT_BUFFER_CAPACITY",
            value: "lots".into(),
        };
        assert_eq!(
            err.to_string(),
            "LRT_BUFFER_CAPACITY: expected a positive buffer size, got \"lots\""
        );
    }
}
