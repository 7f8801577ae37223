//! # Expression Lexer
//!
//! Tokenizes expression sources into tokens.
//!
//! The lexer never fails: characters outside the grammar become
//! [`TokenKind::Error`] tokens so that both the parser and the lexical
//! validator can report them at their own pace.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::lexer::{Lexer, TokenKind};
//!
//! let tokens = Lexer::new("min(L, 600)").tokenize();
//! assert_eq!(tokens[0].kind, TokenKind::Identifier);
//! ```

mod cursor;
mod token;

pub use cursor::Cursor;
pub use token::{Token, TokenKind, KEYWORDS};

use crate::span::Span;

// =============================================================================
// LEXER
// =============================================================================

/// Expression lexer.
///
/// Converts source text into a stream of tokens terminated by
/// [`TokenKind::Eof`].
pub struct Lexer<'a> {
    /// Character cursor.
    cursor: Cursor<'a>,
    /// Collected tokens.
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source.
    ///
    /// ## Returns
    ///
    /// Vector of tokens including the EOF token.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_expr::lexer::{Lexer, TokenKind};
    ///
    /// let tokens = Lexer::new("W - 2 * T").tokenize();
    /// assert!(tokens.last().map(|t| t.kind == TokenKind::Eof).unwrap_or(false));
    /// ```
    pub fn tokenize(mut self) -> Vec<Token> {
        loop {
            self.cursor.advance_while(char::is_whitespace);
            if self.cursor.is_eof() {
                break;
            }
            self.scan_token();
        }

        let eof = self.cursor.offset();
        self.tokens
            .push(Token::new(TokenKind::Eof, Span::at(eof), String::new()));
        self.tokens
    }

    /// Scan a single token.
    fn scan_token(&mut self) {
        let start = self.cursor.offset();
        let start_byte = self.cursor.byte();
        let c = match self.cursor.advance() {
            Some(c) => c,
            None => return,
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,

            // Two-character tokens
            '=' => self.follow_with('=', TokenKind::EqEq, TokenKind::Error),
            '!' => self.follow_with('=', TokenKind::BangEq, TokenKind::Error),
            '<' => self.follow_with('=', TokenKind::LtEq, TokenKind::Lt),
            '>' => self.follow_with('=', TokenKind::GtEq, TokenKind::Gt),

            '0'..='9' => return self.scan_number(start, start_byte),
            '.' if self.cursor.peek().is_some_and(|n| n.is_ascii_digit()) => {
                return self.scan_number(start, start_byte)
            }

            'a'..='z' | 'A'..='Z' | '_' => return self.scan_identifier(start, start_byte),

            _ => TokenKind::Error,
        };

        self.push(kind, start, start_byte);
    }

    /// Consume `next` if present and return `matched`, else `single`.
    fn follow_with(&mut self, next: char, matched: TokenKind, single: TokenKind) -> TokenKind {
        if self.cursor.peek() == Some(next) {
            self.cursor.advance();
            matched
        } else {
            single
        }
    }

    /// Scan a number literal. The first character is already consumed.
    fn scan_number(&mut self, start: usize, start_byte: usize) {
        let mut has_dot = self.cursor.slice_from(start_byte) == ".";

        while let Some(c) = self.cursor.peek() {
            match c {
                '0'..='9' => {
                    self.cursor.advance();
                }
                '.' if !has_dot => {
                    has_dot = true;
                    self.cursor.advance();
                }
                'e' | 'E' if self.exponent_follows() => {
                    self.cursor.advance();
                    if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                        self.cursor.advance();
                    }
                    self.cursor.advance_while(|d| d.is_ascii_digit());
                    break;
                }
                _ => break,
            }
        }

        self.push(TokenKind::Number, start, start_byte);
    }

    /// True when the cursor sits on `e`/`E` followed by an exponent.
    fn exponent_follows(&self) -> bool {
        let mut probe = self.cursor.rest().chars();
        probe.next(); // e
        match probe.next() {
            Some(d) if d.is_ascii_digit() => true,
            Some('+') | Some('-') => probe.next().is_some_and(|d| d.is_ascii_digit()),
            _ => false,
        }
    }

    /// Scan an identifier or keyword. The first character is already consumed.
    fn scan_identifier(&mut self, start: usize, start_byte: usize) {
        self.cursor
            .advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = self.cursor.slice_from(start_byte);
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.push(kind, start, start_byte);
    }

    fn push(&mut self, kind: TokenKind, start: usize, start_byte: usize) {
        let text = self.cursor.slice_from(start_byte).to_string();
        let span = Span::new(start, self.cursor.offset());
        self.tokens.push(Token::new(kind, span, text));
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_call() {
        let tokens = Lexer::new("min(L, 600)").tokenize();

        // min, (, L, ',', 600, ), EOF = 7 tokens
        assert_eq!(tokens.len(), 7);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "min");
        assert_eq!(tokens[1].kind, TokenKind::LParen);
        assert_eq!(tokens[2].text, "L");
        assert_eq!(tokens[3].kind, TokenKind::Comma);
        assert_eq!(tokens[4].kind, TokenKind::Number);
        assert_eq!(tokens[4].text, "600");
        assert_eq!(tokens[5].kind, TokenKind::RParen);
        assert_eq!(tokens[6].kind, TokenKind::Eof);
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            kinds("true False and OR not"),
            vec![
                TokenKind::True,
                TokenKind::False,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("== != <= >= < > + - * /"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_numbers() {
        let tokens = Lexer::new("3.14 .5 2e3 1.5E-2").tokenize();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["3.14", ".5", "2e3", "1.5E-2", ""]);
        assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_number_followed_by_identifier() {
        // "2e" is not an exponent: the number stops and an identifier follows.
        let tokens = Lexer::new("2e").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "2");
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].text, "e");
    }

    #[test]
    fn test_single_equals_and_bang_are_errors() {
        assert_eq!(kinds("= !"), vec![TokenKind::Error, TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn test_spans_use_character_offsets() {
        let tokens = Lexer::new("é + W").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[2].span, Span::new(4, 5));
    }
}
