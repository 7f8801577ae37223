//! # Abstract Syntax Tree
//!
//! Typed tree produced by the parser. Identifiers are stored lower-cased so
//! that every later stage compares names the same way.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::{parse, Expr, Scope};
//!
//! let ast = parse("product_length / 2", Scope::Global).unwrap();
//! assert!(matches!(ast.root, Expr::Binary { .. }));
//! assert_eq!(ast.identifiers(), vec!["product_length".to_string()]);
//! ```

use crate::scope::Scope;
use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// AST ROOT
// =============================================================================

/// A parsed expression together with the scope it was declared in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    /// Root expression node.
    pub root: Expr,
    /// Scope the source was declared in.
    pub scope: Scope,
    /// Deepest nesting of groups, unary operators and call arguments.
    pub depth: usize,
    /// Span of the whole expression.
    pub span: Span,
}

impl Ast {
    /// Identifiers referenced by the expression, lower-cased, deduplicated,
    /// in order of first appearance.
    pub fn identifiers(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.root.collect_identifiers(&mut names);
        names
    }
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// Expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum Expr {
    /// Numeric literal.
    Number { value: f64, span: Span },
    /// `true` / `false`.
    Boolean { value: bool, span: Span },
    /// Reference to a bound identifier (lower-cased).
    Identifier { name: String, span: Span },
    /// `-x`, `not x`.
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `a op b`.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// Call to one of the built-in functions.
    Call {
        function: Function,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    /// Source span of this node.
    pub fn span(&self) -> Span {
        match self {
            Expr::Number { span, .. }
            | Expr::Boolean { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Call { span, .. } => *span,
        }
    }

    fn collect_identifiers(&self, names: &mut Vec<String>) {
        match self {
            Expr::Number { .. } | Expr::Boolean { .. } => {}
            Expr::Identifier { name, .. } => {
                if !names.iter().any(|n| n == name) {
                    names.push(name.clone());
                }
            }
            Expr::Unary { operand, .. } => operand.collect_identifiers(names),
            Expr::Binary { left, right, .. } => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_identifiers(names);
                }
            }
        }
    }
}

// =============================================================================
// OPERATORS
// =============================================================================

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnaryOp {
    /// Arithmetic negation `-`.
    Negate,
    /// Logical `not`.
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    /// Operator as written in source.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessEqual => "<=",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// =============================================================================
// FUNCTIONS
// =============================================================================

/// The closed set of callable functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Function {
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
    /// `round(value, precision)`
    Round,
    /// `abs(x)`
    Abs,
}

impl Function {
    /// Every function, in documentation order.
    pub const ALL: [Function; 4] = [Function::Min, Function::Max, Function::Round, Function::Abs];

    /// Looks a function up by name, case-insensitively.
    ///
    /// ```rust
    /// use joinery_expr::Function;
    ///
    /// assert_eq!(Function::from_name("MAX"), Some(Function::Max));
    /// assert_eq!(Function::from_name("sqrt"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Canonical lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Min => "min",
            Function::Max => "max",
            Function::Round => "round",
            Function::Abs => "abs",
        }
    }

    /// Fixed number of arguments.
    pub fn arity(&self) -> usize {
        match self {
            Function::Min | Function::Max | Function::Round => 2,
            Function::Abs => 1,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_arity() {
        assert_eq!(Function::Round.arity(), 2);
        assert_eq!(Function::Abs.arity(), 1);
    }
}
