//! Error types for the rendering core
//!
//! Two kinds of failure are kept apart. A [`Rejection`] is the expected
//! outcome of merging a candidate that cannot be inserted; it is an ordinary
//! return value. A [`RenderError`] is everything else: printer defects,
//! caller contract violations, configuration problems and timeouts.

use tabstop_parsers::ParserError;
use thiserror::Error;

/// Errors that can occur while rendering a completion
#[derive(Debug, Error)]
pub enum RenderError {
    /// The printer queued two whitespace writes it has no rule to reconcile
    #[error("Unexpected pending write: pending={pending:?}, incoming={incoming:?}")]
    UnexpectedPending { pending: String, incoming: String },

    #[error("Invalid replace range {begin}..{end} for buffer of length {len}")]
    InvalidReplaceRange { begin: usize, end: usize, len: usize },

    #[error("Inconsistent indentation: {line_indent:?} is not a multiple of {unit:?}")]
    InconsistentIndentation { line_indent: String, unit: String },

    #[error("Render deadline of {millis}ms exceeded")]
    DeadlineExceeded { millis: u64 },

    #[error("Render task failed: {0}")]
    TaskFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),

    #[error("Write error: {0}")]
    Write(#[from] std::fmt::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Whether this error signals a bug in the printer rule set rather than
    /// bad input
    pub fn is_defect(&self) -> bool {
        matches!(self, RenderError::UnexpectedPending { .. })
    }
}

/// Result type for rendering operations
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Why a candidate was refused by the token merger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("prediction is empty")]
    EmptyPrediction,

    #[error("prediction is a lone literal without a prefix")]
    LoneLiteral,

    #[error("first predicted token would merge into text preceded by a space")]
    ForcedMerge,

    #[error("closing delimiter without an opener")]
    UnopenedCloser,

    #[error("closing delimiter does not match the innermost opener")]
    MismatchedCloser,

    #[error("prediction ends inside an open delimiter on a separator")]
    DanglingSeparator,

    #[error("prediction has an odd number of quote delimiters")]
    UnbalancedQuotes,

    #[error("prediction contains '>' outside of a closed JSX tag")]
    StrayAngleBracket,

    #[error("prediction dedents below column zero")]
    DedentUnderflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::InvalidReplaceRange {
            begin: 4,
            end: 2,
            len: 10,
        };
        assert_eq!(
            err.to_string(),
            "Invalid replace range 4..2 for buffer of length 10"
        );

        let err = RenderError::UnexpectedPending {
            pending: "\n".to_string(),
            incoming: "\t".to_string(),
        };
        assert!(err.is_defect());
        assert!(err.to_string().contains("\\n"));
    }

    #[test]
    fn test_parser_error_converts() {
        let err: RenderError = ParserError::ParseError {
            message: "no tree".to_string(),
        }
        .into();
        assert!(!err.is_defect());
        assert_eq!(err.to_string(), "Parser error: Parse error: no tree");
    }

    #[test]
    fn test_rejection_is_copy_and_displays() {
        let r = Rejection::UnbalancedQuotes;
        let copy = r;
        assert_eq!(r, copy);
        assert_eq!(r.to_string(), "prediction has an odd number of quote delimiters");
    }
}
