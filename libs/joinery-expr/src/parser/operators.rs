//! # Operator Parsing
//!
//! Parses binary and unary operators using precedence climbing.
//!
//! ## Operator Precedence
//!
//! | Precedence | Operators | Associativity |
//! |------------|-----------|---------------|
//! | 1 | or | Left |
//! | 2 | and | Left |
//! | 3 | == != < > <= >= | Left |
//! | 4 | + - | Left |
//! | 5 | * / | Left |
//! | 6 | - not (unary) | Right |

use super::Parser;
use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::ParseError;
use crate::lexer::TokenKind;

// =============================================================================
// PRECEDENCE
// =============================================================================

/// Operator precedence levels.
///
/// Higher values bind tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Precedence {
    /// Logical or: `or`
    Or = 1,
    /// Logical and: `and`
    And = 2,
    /// Comparison: `== != < > <= >=`
    Comparison = 3,
    /// Addition/subtraction: `+ -`
    Term = 4,
    /// Multiplication/division: `* /`
    Factor = 5,
    /// Unary: `- not`
    Unary = 6,
}

impl Precedence {
    /// Get precedence and operator for a binary operator token.
    pub(super) fn of_binary(kind: TokenKind) -> Option<(Self, BinaryOp)> {
        let entry = match kind {
            TokenKind::Or => (Self::Or, BinaryOp::Or),
            TokenKind::And => (Self::And, BinaryOp::And),
            TokenKind::EqEq => (Self::Comparison, BinaryOp::Equal),
            TokenKind::BangEq => (Self::Comparison, BinaryOp::NotEqual),
            TokenKind::Lt => (Self::Comparison, BinaryOp::Less),
            TokenKind::Gt => (Self::Comparison, BinaryOp::Greater),
            TokenKind::LtEq => (Self::Comparison, BinaryOp::LessEqual),
            TokenKind::GtEq => (Self::Comparison, BinaryOp::GreaterEqual),
            TokenKind::Plus => (Self::Term, BinaryOp::Add),
            TokenKind::Minus => (Self::Term, BinaryOp::Subtract),
            TokenKind::Star => (Self::Factor, BinaryOp::Multiply),
            TokenKind::Slash => (Self::Factor, BinaryOp::Divide),
            _ => return None,
        };
        Some(entry)
    }

    /// Get next higher precedence level.
    ///
    /// Used for left-associative operators.
    pub(super) fn next(&self) -> Self {
        match self {
            Self::Or => Self::And,
            Self::And => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor | Self::Unary => Self::Unary,
        }
    }
}

// =============================================================================
// OPERATOR PARSING
// =============================================================================

impl Parser {
    /// Parse a full expression.
    pub(super) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_precedence(Precedence::Or)
    }

    /// Parse expression with minimum precedence.
    ///
    /// Uses precedence climbing algorithm for efficient parsing.
    pub(super) fn parse_precedence(&mut self, min_prec: Precedence) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some((prec, op)) = Precedence::of_binary(self.peek_kind()) {
            if prec < min_prec {
                break;
            }
            self.advance();

            let right = self.parse_precedence(prec.next())?;
            let span = left.span().merge(&right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Parse unary expression.
    ///
    /// ## Grammar
    ///
    /// ```text
    /// unary = ("-" | "not") unary | primary
    /// ```
    pub(super) fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_primary(),
        };

        let token = self.advance();
        self.nested(token.span, |parser| {
            let operand = parser.parse_unary()?;
            Ok(Expr::Unary {
                op,
                span: token.span.merge(&operand.span()),
                operand: Box::new(operand),
            })
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::ast::{BinaryOp, Expr, UnaryOp};
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::scope::Scope;

    fn parse_expr(source: &str) -> Expr {
        let tokens = Lexer::new(source).tokenize();
        Parser::new(tokens, 32)
            .parse(Scope::Global)
            .unwrap_or_else(|e| panic!("{source}: {e}"))
            .root
    }

    fn op_of(expr: &Expr) -> BinaryOp {
        match expr {
            Expr::Binary { op, .. } => *op,
            other => panic!("expected binary, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_binary_precedence() {
        // 1 + 2 * 3 = 1 + (2 * 3)
        let expr = parse_expr("1 + 2 * 3");
        assert_eq!(op_of(&expr), BinaryOp::Add);
        if let Expr::Binary { right, .. } = &expr {
            assert_eq!(op_of(right), BinaryOp::Multiply);
        }
    }

    #[test]
    fn test_parse_left_associative() {
        // 10 - 4 - 3 = (10 - 4) - 3
        let expr = parse_expr("10 - 4 - 3");
        if let Expr::Binary { left, right, .. } = &expr {
            assert_eq!(op_of(left), BinaryOp::Subtract);
            assert!(matches!(**right, Expr::Number { value, .. } if value == 3.0));
        } else {
            panic!("expected binary");
        }
    }

    #[test]
    fn test_parse_logical_precedence() {
        // a or b and c = a or (b and c)
        let expr = parse_expr("a or b and c");
        assert_eq!(op_of(&expr), BinaryOp::Or);

        // a < b and c > d = (a < b) and (c > d)
        let expr = parse_expr("a < b and c > d");
        assert_eq!(op_of(&expr), BinaryOp::And);
    }

    #[test]
    fn test_parse_unary_binds_tightest() {
        let expr = parse_expr("-a * b");
        if let Expr::Binary { left, .. } = &expr {
            assert!(matches!(**left, Expr::Unary { op: UnaryOp::Negate, .. }));
        } else {
            panic!("expected binary");
        }

        let expr = parse_expr("not not true");
        assert!(matches!(expr, Expr::Unary { op: UnaryOp::Not, .. }));
    }

    #[test]
    fn test_binary_span_covers_operands() {
        let expr = parse_expr("L - 2 * T");
        assert_eq!(expr.span().start(), 0);
        assert_eq!(expr.span().end(), 9);
    }
}
