use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for argument scanning operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Host exception classes the shim can ask the embedder to raise.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>` implementations.
/// The string representation matches the host class name exactly (e.g., `ArgumentError` -> "ArgumentError").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ExcType {
    /// Raised for malformed format strings and wrong argument counts.
    ArgumentError,
    /// Raised when a system call wrapper fails with an errno.
    SystemCallError,
}

/// Error produced while parsing a format string or binding arguments against it.
///
/// Both variants are programming-contract violations: they are surfaced to the caller
/// unchanged and never retried or silently corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanError {
    /// The format string does not match `\d?\d?\*?\d?:?&?`.
    InvalidFormat {
        /// The rejected format string.
        format: String,
    },
    /// Too few or too many arguments were passed.
    Arity {
        /// Number of arguments counted against the shape (after removing a consumed keyword hash).
        actual: usize,
        /// Minimum accepted, `required_leading + required_trailing`.
        min: usize,
        /// Maximum accepted, `None` when a rest slot makes it unlimited.
        max: Option<usize>,
    },
}

impl ScanError {
    #[must_use]
    pub(crate) fn invalid_format(format: &str) -> Self {
        Self::InvalidFormat {
            format: format.to_owned(),
        }
    }

    #[must_use]
    pub(crate) fn arity(actual: usize, min: usize, max: Option<usize>) -> Self {
        Self::Arity { actual, min, max }
    }

    /// The host exception class the embedder should raise for this error.
    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        match self {
            Self::InvalidFormat { .. } | Self::Arity { .. } => ExcType::ArgumentError,
        }
    }

    /// The message the embedder should attach to the raised exception.
    ///
    /// Arity messages follow CRuby's wording:
    /// `wrong number of arguments (given 1, expected 2)`, `(given 0, expected 1+)`
    /// and `(given 4, expected 1..3)`.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InvalidFormat { format } => format!("bad scan_args format: {format:?}"),
            Self::Arity { actual, min, max } => match max {
                None => format!("wrong number of arguments (given {actual}, expected {min}+)"),
                Some(max) if max == min => format!("wrong number of arguments (given {actual}, expected {min})"),
                Some(max) => format!("wrong number of arguments (given {actual}, expected {min}..{max})"),
            },
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.exc_type(), self.message())
    }
}

impl std::error::Error for ScanError {}
