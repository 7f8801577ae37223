//! # Expression Parser
//!
//! Recursive descent parser producing the typed [`Ast`].
//!
//! ## Module Structure
//!
//! - `operators` - Binary and unary operators with precedence climbing
//! - `primaries` - Literals, identifiers, groups and function calls
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::lexer::Lexer;
//! use joinery_expr::parser::Parser;
//! use joinery_expr::Scope;
//!
//! let tokens = Lexer::new("L - 2 * T").tokenize();
//! let ast = Parser::new(tokens, 16).parse(Scope::Part).unwrap();
//! assert_eq!(ast.identifiers(), vec!["l".to_string(), "t".to_string()]);
//! ```

mod operators;
mod primaries;

use crate::ast::Ast;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Token, TokenKind};
use crate::scope::Scope;
use crate::span::Span;
use config::constants::{STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES};

// =============================================================================
// PARSER
// =============================================================================

/// Recursive descent parser for one expression.
pub struct Parser {
    /// Token stream, always terminated by EOF.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Current nesting depth.
    depth: usize,
    /// Deepest nesting seen so far.
    max_seen: usize,
    /// Nesting limit.
    max_depth: usize,
}

impl Parser {
    /// Create a new parser.
    ///
    /// ## Parameters
    ///
    /// - `tokens`: Tokens from the lexer
    /// - `max_depth`: Nesting limit for groups, unary operators and calls
    pub fn new(mut tokens: Vec<Token>, max_depth: usize) -> Self {
        if tokens.last().map_or(true, |t| !t.is_eof()) {
            let end = tokens.last().map_or(0, |t| t.span.end());
            tokens.push(Token::new(TokenKind::Eof, Span::at(end), String::new()));
        }
        Self {
            tokens,
            current: 0,
            depth: 0,
            max_seen: 0,
            max_depth,
        }
    }

    /// Parse the whole token stream as a single expression.
    ///
    /// Delimiter balance is checked first so that a missing or stray
    /// parenthesis is always reported as [`ParseErrorKind::UnbalancedDelimiter`].
    pub fn parse(&mut self, scope: Scope) -> Result<Ast, ParseError> {
        self.check_delimiters()?;

        let root = self.parse_expression()?;

        if !self.is_at_end() {
            let token = self.peek();
            return Err(ParseError::unexpected_token(
                token.describe(),
                "operator or end of input",
                token.span,
            ));
        }

        Ok(Ast {
            span: root.span(),
            root,
            scope,
            depth: self.max_seen,
        })
    }

    /// Reports the first stray `)` or the innermost unclosed `(`.
    fn check_delimiters(&self) -> Result<(), ParseError> {
        let mut open: Vec<Span> = Vec::new();
        for token in &self.tokens {
            match token.kind {
                TokenKind::LParen => open.push(token.span),
                TokenKind::RParen => {
                    if open.pop().is_none() {
                        return Err(ParseError::new(ParseErrorKind::UnbalancedDelimiter, token.span));
                    }
                }
                _ => {}
            }
        }
        match open.pop() {
            Some(span) => Err(ParseError::new(ParseErrorKind::UnbalancedDelimiter, span)),
            None => Ok(()),
        }
    }

    // =========================================================================
    // TOKEN ACCESS
    // =========================================================================

    /// Get current token.
    fn peek(&self) -> &Token {
        // `new` guarantees a trailing EOF token.
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    /// Get current token kind.
    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Get the kind of the token after the current one.
    fn peek_next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.current + 1)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    /// Check if current token matches kind.
    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Check if at end of input.
    fn is_at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// Advance to next token, returning the consumed one.
    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Consume token if it matches expected kind.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(ParseError::unexpected_token(
                token.describe(),
                kind.display(),
                token.span,
            ))
        }
    }

    /// Try to consume token if it matches.
    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // =========================================================================
    // NESTING
    // =========================================================================

    /// Runs `f` one nesting level deeper, failing past the limit.
    fn nested<T>(
        &mut self,
        span: Span,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::NestingTooDeep {
                    max: self.max_depth,
                },
                span,
            ));
        }
        self.max_seen = self.max_seen.max(self.depth);
        let result = stacker::maybe_grow(STACKER_RED_ZONE_BYTES, STACKER_STACK_SIZE_BYTES, || f(self));
        self.depth -= 1;
        result
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(source: &str) -> Result<Ast, ParseError> {
        Parser::new(Lexer::new(source).tokenize(), 32).parse(Scope::Global)
    }

    #[test]
    fn test_parse_empty_is_unexpected_end() {
        let err = parse("").unwrap_err();
        assert_eq!(err.offset, 0);
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_missing_close_paren() {
        let err = parse("max(1, (2 + 3)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedDelimiter);
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn test_stray_close_paren() {
        let err = parse("1 + 2)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedDelimiter);
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse("1 2").unwrap_err();
        assert_eq!(err.offset, 2);
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_depth_is_recorded() {
        assert_eq!(parse("1 + 2").unwrap().depth, 0);
        assert_eq!(parse("((1))").unwrap().depth, 2);
        assert_eq!(parse("abs(-(1))").unwrap().depth, 3);
    }

    #[test]
    fn test_binary_chains_do_not_nest() {
        let source = vec!["1"; 200].join(" + ");
        assert_eq!(parse(&source).unwrap().depth, 0);
        assert_eq!(parse("1 + (2 * -3) < 4 and true").unwrap().depth, 2);
    }

    #[test]
    fn test_nesting_limit() {
        let source = format!("{}1{}", "(".repeat(40), ")".repeat(40));
        let err = parse(&source).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { max: 32 });
        assert_eq!(err.offset, 32);
    }
}
