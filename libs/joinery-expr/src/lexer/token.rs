//! # Tokens
//!
//! Token types for the expression lexer.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::lexer::{Token, TokenKind};
//! use joinery_expr::Span;
//!
//! let token = Token::new(TokenKind::Number, Span::new(0, 2), "10".to_string());
//! assert_eq!(token.kind, TokenKind::Number);
//! ```

use crate::span::Span;

// =============================================================================
// TOKEN
// =============================================================================

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token type.
    pub kind: TokenKind,
    /// Source span (character offsets).
    pub span: Span,
    /// Token text exactly as written.
    pub text: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, text: String) -> Self {
        Self { kind, span, text }
    }

    /// Check if token is the end-of-input marker.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Text to show in an error message for this token.
    pub fn describe(&self) -> String {
        if self.is_eof() {
            "end of input".to_string()
        } else {
            format!("'{}'", self.text)
        }
    }
}

// =============================================================================
// TOKEN KIND
// =============================================================================

/// Types of tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    /// Number literal like `10` or `2.5e3`
    Number,
    /// `true`
    True,
    /// `false`
    False,

    /// Identifier like `product_length` or `L`
    Identifier,

    // Keywords
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `==`
    EqEq,
    /// `!=`
    BangEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    LtEq,
    /// `>=`
    GtEq,

    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,

    /// Character the grammar does not accept.
    Error,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Human-readable name used in "expected ..." messages.
    pub fn display(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::True => "'true'",
            Self::False => "'false'",
            Self::Identifier => "identifier",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::Not => "'not'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::EqEq => "'=='",
            Self::BangEq => "'!='",
            Self::Lt => "'<'",
            Self::Gt => "'>'",
            Self::LtEq => "'<='",
            Self::GtEq => "'>='",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::Comma => "','",
            Self::Error => "invalid character",
            Self::Eof => "end of input",
        }
    }

    /// Keyword for an identifier-shaped word, compared case-insensitively.
    pub fn keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            _ => None,
        }
    }
}

/// Reserved words that are never identifiers.
pub const KEYWORDS: [&str; 5] = ["and", "or", "not", "true", "false"];
