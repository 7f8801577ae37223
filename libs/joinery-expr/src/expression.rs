//! # Expression Value Object
//!
//! An [`Expression`] is the raw source text plus the scope it was declared
//! in. The parsed [`Ast`] is computed on first use and cached, so an
//! expression can be shared across threads and parsed at most once.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::{EngineConfig, Expression, IdentifierSet};
//!
//! let expr = Expression::part("L - 2 * T");
//! let allowed: IdentifierSet = ["l".to_string(), "t".to_string()].into();
//! let ast = expr.compile(&allowed, &EngineConfig::default()).unwrap();
//! assert_eq!(ast.identifiers().len(), 2);
//! ```

use crate::ast::Ast;
use crate::error::{ParseError, ParseErrorKind};
use crate::scope::{IdentifierSet, Scope};
use crate::span::Span;
use crate::validate::{validate, ValidationResult, Violation};
use config::constants::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

// =============================================================================
// COMPILE ERROR
// =============================================================================

/// Why an expression cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Malformed source.
    #[error("parse error: {0}")]
    Parse(ParseError),

    /// Failed static validation.
    #[error("{}", join_violations(.0))]
    Violations(Vec<Violation>),

    /// Source exceeds the configured size limits.
    #[error("limit exceeded: {0}")]
    Limit(ParseError),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ParseError> for CompileError {
    fn from(error: ParseError) -> Self {
        if error.kind.is_limit() {
            CompileError::Limit(error)
        } else {
            CompileError::Parse(error)
        }
    }
}

// =============================================================================
// EXPRESSION
// =============================================================================

/// Immutable expression source with its declared scope.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "ExpressionRepr", into = "ExpressionRepr")]
pub struct Expression {
    source: String,
    scope: Scope,
    ast: OnceLock<Result<Ast, ParseError>>,
}

#[derive(Clone, Serialize, Deserialize)]
struct ExpressionRepr {
    source: String,
    #[serde(default)]
    scope: Scope,
}

impl From<ExpressionRepr> for Expression {
    fn from(repr: ExpressionRepr) -> Self {
        Expression::new(repr.source, repr.scope)
    }
}

impl From<Expression> for ExpressionRepr {
    fn from(expr: Expression) -> Self {
        ExpressionRepr {
            source: expr.source,
            scope: expr.scope,
        }
    }
}

impl Expression {
    /// Create an expression declared in `scope`.
    pub fn new(source: impl Into<String>, scope: Scope) -> Self {
        Self {
            source: source.into(),
            scope,
            ast: OnceLock::new(),
        }
    }

    /// Create a GLOBAL-scope expression.
    pub fn global(source: impl Into<String>) -> Self {
        Self::new(source, Scope::Global)
    }

    /// Create a PART-scope expression.
    pub fn part(source: impl Into<String>) -> Self {
        Self::new(source, Scope::Part)
    }

    /// Raw source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared scope.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// True when the source is blank, meaning "no constraint".
    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }

    /// Parsed AST, computed once under the hard limits.
    pub fn ast(&self) -> Result<&Ast, &ParseError> {
        self.ast
            .get_or_init(|| crate::parse(&self.source, self.scope))
            .as_ref()
    }

    /// Lexical validation against an allowed identifier set.
    pub fn validate(&self, allowed: &IdentifierSet) -> ValidationResult {
        validate(&self.source, allowed)
    }

    /// Full check before evaluation.
    ///
    /// Runs, in order: the length limit, lexical validation, parsing, the
    /// depth limit, and a closure check of the AST identifiers.
    pub fn compile(
        &self,
        allowed: &IdentifierSet,
        config: &EngineConfig,
    ) -> Result<&Ast, CompileError> {
        let length = self.source.chars().count();
        if length > config.max_expression_length {
            return Err(CompileError::Limit(ParseError::new(
                ParseErrorKind::ExpressionTooLong {
                    length,
                    max: config.max_expression_length,
                },
                Span::new(config.max_expression_length, length),
            )));
        }

        self.validate(allowed).map_err(CompileError::Violations)?;

        let ast = self.ast().map_err(|e| CompileError::from(e.clone()))?;

        if ast.depth > config.max_ast_depth {
            return Err(CompileError::Limit(ParseError::new(
                ParseErrorKind::NestingTooDeep {
                    max: config.max_ast_depth,
                },
                ast.span,
            )));
        }

        let unknown: Vec<String> = ast
            .identifiers()
            .into_iter()
            .filter(|name| !allowed.contains(name))
            .collect();
        if !unknown.is_empty() {
            return Err(CompileError::Violations(vec![
                Violation::UnknownIdentifiers(unknown),
            ]));
        }

        Ok(ast)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.scope == other.scope
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("scope", &self.scope)
            .finish()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// =============================================================================
// TESTS
// =============================================================================
