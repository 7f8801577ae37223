//! # Parse Errors
//!
//! Error types for the expression parser.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::{ParseError, ParseErrorKind, Span};
//!
//! let error = ParseError::new(ParseErrorKind::UnbalancedDelimiter, Span::at(4));
//! assert_eq!(error.offset, 4);
//! println!("{}", error);
//! ```

use crate::span::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// PARSE ERROR
// =============================================================================

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind} at offset {offset}")]
pub struct ParseError {
    /// Error kind with details.
    pub kind: ParseErrorKind,
    /// Character offset of the offending token.
    pub offset: usize,
    /// Source location of the offending token.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error located at `span`.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            offset: span.start(),
            span,
        }
    }

    /// Create an unexpected token error.
    ///
    /// ## Parameters
    ///
    /// - `found`: Description of the token that was found
    /// - `expected`: Description of the expected token
    /// - `span`: Location of the found token
    pub fn unexpected_token(found: impl Into<String>, expected: impl Into<String>, span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                found: found.into(),
                expected: expected.into(),
            },
            span,
        )
    }
}

// =============================================================================
// PARSE ERROR KIND
// =============================================================================

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum ParseErrorKind {
    /// A `(` without its `)` or a stray `)`.
    #[error("unbalanced delimiter")]
    UnbalancedDelimiter,

    /// Found unexpected token.
    #[error("unexpected token {found}, expected {expected}")]
    UnexpectedToken {
        /// Description of the token that was found.
        found: String,
        /// Description of what was expected.
        expected: String,
    },

    /// Call to a function outside `min`, `max`, `round`, `abs`.
    #[error("unknown function '{name}'")]
    UnknownFunction {
        /// Function name as written.
        name: String,
    },

    /// Call with the wrong number of arguments.
    #[error("{function} expects {expected} argument(s), got {found}")]
    WrongArity {
        /// Function name.
        function: String,
        /// Declared arity.
        expected: usize,
        /// Arguments supplied.
        found: usize,
    },

    /// Number literal that does not fit an f64.
    #[error("invalid number '{text}'")]
    InvalidNumber {
        /// The invalid text.
        text: String,
    },

    /// Source longer than the configured limit.
    #[error("expression is {length} characters long, limit is {max}")]
    ExpressionTooLong {
        /// Characters in the source.
        length: usize,
        /// Configured limit.
        max: usize,
    },

    /// Nesting deeper than the configured limit.
    #[error("expression nests deeper than {max} levels")]
    NestingTooDeep {
        /// Configured limit.
        max: usize,
    },
}

impl ParseErrorKind {
    /// True for errors raised by the configured size limits.
    pub fn is_limit(&self) -> bool {
        matches!(
            self,
            ParseErrorKind::ExpressionTooLong { .. } | ParseErrorKind::NestingTooDeep { .. }
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_display() {
        let error = ParseError::unexpected_token("')'", "expression", Span::new(3, 4));
        let msg = error.to_string();
        assert!(msg.contains("unexpected token ')'"));
        assert!(msg.contains("expression"));
        assert!(msg.ends_with("at offset 3"));
    }

    #[test]
    fn test_offset_follows_span() {
        let error = ParseError::new(
            ParseErrorKind::UnknownFunction { name: "sqrt".into() },
            Span::new(7, 11),
        );
        assert_eq!(error.offset, 7);
    }

    #[test]
    fn test_reason_serializes_as_tag() {
        let json = serde_json::to_value(ParseErrorKind::UnbalancedDelimiter).unwrap();
        assert_eq!(json["reason"], "unbalancedDelimiter");
    }
}
