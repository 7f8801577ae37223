//! # Primary Expression Parsing
//!
//! Parses primary expressions: literals, identifiers, parenthesized
//! expressions and function calls.
//!
//! ## Responsibilities
//!
//! - Number literals: `42`, `3.14`, `.5`, `2e3`
//! - Boolean literals: `true`, `false`
//! - Identifiers: `L`, `side_panel_length`
//! - Parenthesized expressions: `(1 + 2)`
//! - Calls: `min(a, b)`, `max(a, b)`, `round(v, p)`, `abs(x)`

use super::Parser;
use crate::ast::{Expr, Function};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::TokenKind;

impl Parser {
    /// Parse primary expression.
    ///
    /// ## Grammar
    ///
    /// ```text
    /// primary = number | "true" | "false" | identifier
    ///         | identifier "(" arguments ")" | "(" expression ")"
    /// ```
    pub(super) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = token
                    .text
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        ParseError::new(
                            ParseErrorKind::InvalidNumber {
                                text: token.text.clone(),
                            },
                            token.span,
                        )
                    })?;
                Ok(Expr::Number {
                    value,
                    span: token.span,
                })
            }

            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::Boolean {
                    value: token.kind == TokenKind::True,
                    span: token.span,
                })
            }

            TokenKind::Identifier if self.peek_next_kind() == TokenKind::LParen => {
                self.parse_call()
            }

            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Identifier {
                    name: token.text.to_ascii_lowercase(),
                    span: token.span,
                })
            }

            TokenKind::LParen => self.parse_group(),

            _ => Err(ParseError::unexpected_token(
                token.describe(),
                "expression",
                token.span,
            )),
        }
    }

    /// Parse parenthesized expression.
    fn parse_group(&mut self) -> Result<Expr, ParseError> {
        let open = self.advance();
        self.nested(open.span, |parser| {
            let inner = parser.parse_expression()?;
            parser.expect(TokenKind::RParen)?;
            Ok(inner)
        })
    }

    /// Parse a call to one of the built-in functions.
    ///
    /// ## Grammar
    ///
    /// ```text
    /// call      = identifier "(" arguments ")"
    /// arguments = [ expression { "," expression } ]
    /// ```
    fn parse_call(&mut self) -> Result<Expr, ParseError> {
        let name = self.advance();
        let function = Function::from_name(&name.text).ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::UnknownFunction {
                    name: name.text.clone(),
                },
                name.span,
            )
        })?;

        let open = self.expect(TokenKind::LParen)?;
        let args = self.nested(open.span, |parser| {
            let mut args = Vec::new();
            if parser.check(TokenKind::RParen) {
                return Ok(args);
            }
            loop {
                args.push(parser.parse_expression()?);
                if !parser.match_token(TokenKind::Comma) {
                    break;
                }
            }
            Ok(args)
        })?;
        let close = self.expect(TokenKind::RParen)?;
        let span = name.span.merge(&close.span);

        if args.len() != function.arity() {
            return Err(ParseError::new(
                ParseErrorKind::WrongArity {
                    function: function.name().to_string(),
                    expected: function.arity(),
                    found: args.len(),
                },
                span,
            ));
        }

        Ok(Expr::Call {
            function,
            args,
            span,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::ast::{Expr, Function};
    use crate::error::{ParseError, ParseErrorKind};
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::scope::Scope;

    fn parse(source: &str) -> Result<Expr, ParseError> {
        let tokens = Lexer::new(source).tokenize();
        Parser::new(tokens, 32).parse(Scope::Part).map(|ast| ast.root)
    }

    #[test]
    fn test_parse_literals() {
        assert!(matches!(parse("42").unwrap(), Expr::Number { value, .. } if value == 42.0));
        assert!(matches!(parse(".5").unwrap(), Expr::Number { value, .. } if value == 0.5));
        assert!(matches!(parse("TRUE").unwrap(), Expr::Boolean { value: true, .. }));
    }

    #[test]
    fn test_identifiers_are_lowercased() {
        match parse("Side_Panel_Length").unwrap() {
            Expr::Identifier { name, .. } => assert_eq!(name, "side_panel_length"),
            other => panic!("expected identifier, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_call_case_insensitive() {
        match parse("MAX(1, W)").unwrap() {
            Expr::Call { function, args, .. } => {
                assert_eq!(function, Function::Max);
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_function() {
        let err = parse("1 + sqrt(4)").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnknownFunction {
                name: "sqrt".into()
            }
        );
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse("abs(1, 2)").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::WrongArity {
                function: "abs".into(),
                expected: 1,
                found: 2
            }
        );

        let err = parse("min()").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::WrongArity { found: 0, .. }));
    }

    #[test]
    fn test_number_overflow_is_invalid() {
        let err = parse("1e999").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber { text: "1e999".into() });
    }

    #[test]
    fn test_missing_operand() {
        let err = parse("L +").unwrap_err();
        assert_eq!(err.offset, 3);
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_error_token_is_unexpected() {
        let err = parse("L = 2").unwrap_err();
        assert_eq!(err.offset, 2);
    }
}
