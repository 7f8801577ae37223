//! # Joinery Expression Language
//!
//! The restricted expression language used by parametric furniture
//! definitions: numeric and boolean expressions over a declared set of
//! identifiers, with `min`, `max`, `round` and `abs` as the only functions.
//!
//! ## Architecture
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → AST
//!                  ↘ Static Validator (lexical, scope-aware)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::{parse, Scope};
//!
//! let ast = parse("min(product_width - 36, 564)", Scope::Global).unwrap();
//! assert_eq!(ast.identifiers(), vec!["product_width".to_string()]);
//! ```
//!
//! ## Pipeline Integration
//!
//! ```text
//! joinery-expr → joinery-eval → joinery-resolve
//! ```

pub mod ast;
pub mod error;
pub mod expression;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod span;
pub mod validate;

// Re-export public API
pub use ast::{Ast, BinaryOp, Expr, Function, UnaryOp};
pub use config::constants::EngineConfig;
pub use error::{ParseError, ParseErrorKind};
pub use expression::{CompileError, Expression};
pub use scope::{allowed_identifiers, IdentifierSet, Scope, ScopeSource};
pub use span::Span;
pub use validate::{validate, ValidationResult, Violation};

use config::constants::{MAX_AST_DEPTH, MAX_EXPRESSION_LENGTH};

// =============================================================================
// PUBLIC API
// =============================================================================

/// Parse an expression under the hard limits.
///
/// Blank input is rejected with an unexpected end of input at offset 0;
/// callers treat blank sources as "no constraint" before parsing.
///
/// ## Example
///
/// ```rust
/// use joinery_expr::{parse, ParseErrorKind, Scope};
///
/// let err = parse("max(1, 2", Scope::Part).unwrap_err();
/// assert_eq!(err.kind, ParseErrorKind::UnbalancedDelimiter);
/// assert_eq!(err.offset, 3);
/// ```
pub fn parse(source: &str, scope: Scope) -> Result<Ast, ParseError> {
    parse_bounded(source, scope, MAX_EXPRESSION_LENGTH, MAX_AST_DEPTH)
}

/// Parse an expression under the limits of `config`.
pub fn parse_with_limits(
    source: &str,
    scope: Scope,
    config: &EngineConfig,
) -> Result<Ast, ParseError> {
    parse_bounded(
        source,
        scope,
        config.max_expression_length.min(MAX_EXPRESSION_LENGTH),
        config.max_ast_depth.min(MAX_AST_DEPTH),
    )
}

fn parse_bounded(
    source: &str,
    scope: Scope,
    max_length: usize,
    max_depth: usize,
) -> Result<Ast, ParseError> {
    let length = source.chars().count();
    if length > max_length {
        return Err(ParseError::new(
            ParseErrorKind::ExpressionTooLong {
                length,
                max: max_length,
            },
            Span::new(max_length, length),
        ));
    }

    let tokens = lexer::Lexer::new(source).tokenize();
    parser::Parser::new(tokens, max_depth).parse(scope)
}

// =============================================================================
// TESTS
// =============================================================================
