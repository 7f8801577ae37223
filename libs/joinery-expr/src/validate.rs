//! # Static Validation
//!
//! Fast lexical check run while an expression is being edited. It needs no
//! parse and no concrete values:
//!
//! 1. the number of `(` equals the number of `)`;
//! 2. every identifier that is not a keyword or function name is allowed.
//!
//! [`crate::Expression::compile`] runs this check and then re-validates the
//! parsed AST, so nothing malformed reaches evaluation.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::validate::{validate, Violation};
//! use joinery_expr::IdentifierSet;
//!
//! let allowed: IdentifierSet = ["product_length".to_string()].into();
//! assert!(validate("max(PRODUCT_LENGTH / 2, 300)", &allowed).is_ok());
//!
//! let violations = validate("product_lenght + x + X", &allowed).unwrap_err();
//! assert_eq!(
//!     violations,
//!     vec![Violation::UnknownIdentifiers(vec![
//!         "product_lenght".to_string(),
//!         "x".to_string()
//!     ])]
//! );
//! ```

use crate::ast::Function;
use crate::lexer::{Lexer, TokenKind};
use crate::scope::{normalize_identifier, IdentifierSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "violation", content = "details", rename_all = "camelCase")]
pub enum Violation {
    /// Parenthesis counts differ.
    #[error("unbalanced delimiters: {open} '(' and {close} ')'")]
    UnbalancedDelimiter { open: usize, close: usize },

    /// Identifiers outside the allowed set, lower-cased, in first-appearance order.
    #[error("unknown identifier(s): {}", .0.join(", "))]
    UnknownIdentifiers(Vec<String>),
}

/// Outcome of [`validate`].
pub type ValidationResult = Result<(), Vec<Violation>>;

/// Checks `source` against the identifiers allowed in its scope.
pub fn validate(source: &str, allowed: &IdentifierSet) -> ValidationResult {
    let mut open = 0;
    let mut close = 0;
    let mut unknown: Vec<String> = Vec::new();

    for token in Lexer::new(source).tokenize() {
        match token.kind {
            TokenKind::LParen => open += 1,
            TokenKind::RParen => close += 1,
            TokenKind::Identifier => {
                if Function::from_name(&token.text).is_some() {
                    continue;
                }
                let name = normalize_identifier(&token.text);
                if !allowed.contains(&name) && !unknown.contains(&name) {
                    unknown.push(name);
                }
            }
            _ => {}
        }
    }

    let mut violations = Vec::new();
    if open != close {
        violations.push(Violation::UnbalancedDelimiter { open, close });
    }
    if !unknown.is_empty() {
        violations.push(Violation::UnknownIdentifiers(unknown));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(names: &[&str]) -> IdentifierSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keywords_and_functions_are_skipped() {
        let set = allowed(&["l"]);
        assert!(validate("not (L > 3) and TRUE or round(l, 1) == abs(l)", &set).is_ok());
    }

    #[test]
    fn test_numbers_are_not_identifiers() {
        assert!(validate("1.5e3 + .25", &allowed(&[])).is_ok());
    }

    #[test]
    fn test_blank_source_is_valid() {
        assert!(validate("   ", &allowed(&[])).is_ok());
    }

    #[test]
    fn test_both_violations_reported() {
        let violations = validate("(a + b", &allowed(&["a"])).unwrap_err();
        assert_eq!(
            violations,
            vec![
                Violation::UnbalancedDelimiter { open: 1, close: 0 },
                Violation::UnknownIdentifiers(vec!["b".into()]),
            ]
        );
    }

    #[test]
    fn test_violation_message() {
        let violation = Violation::UnknownIdentifiers(vec!["x".into(), "y".into()]);
        assert_eq!(violation.to_string(), "unknown identifier(s): x, y");
    }
}
