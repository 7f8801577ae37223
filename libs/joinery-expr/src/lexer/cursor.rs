//! # Character Cursor
//!
//! Peekable character cursor for the lexer.
//! Tracks both the byte offset (for slicing) and the character offset
//! (for spans) as it advances.
//!
//! ## Example
//!
//! ```rust
//! use joinery_expr::lexer::Cursor;
//!
//! let mut cursor = Cursor::new("min");
//! assert_eq!(cursor.peek(), Some('m'));
//! cursor.advance();
//! assert_eq!(cursor.peek(), Some('i'));
//! ```

// =============================================================================
// CURSOR
// =============================================================================

/// Character cursor with position tracking.
pub struct Cursor<'a> {
    /// Source text.
    source: &'a str,
    /// Current byte offset.
    byte: usize,
    /// Current character offset.
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor for source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            byte: 0,
            offset: 0,
        }
    }

    /// Current character offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current byte offset.
    pub fn byte(&self) -> usize {
        self.byte
    }

    /// Check if at end of input.
    pub fn is_eof(&self) -> bool {
        self.byte >= self.source.len()
    }

    /// Peek at current character without consuming it.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_expr::lexer::Cursor;
    ///
    /// let cursor = Cursor::new("abc");
    /// assert_eq!(cursor.peek(), Some('a'));
    /// assert_eq!(cursor.peek(), Some('a')); // Still 'a'
    /// ```
    pub fn peek(&self) -> Option<char> {
        self.source[self.byte..].chars().next()
    }

    /// Advance to next character.
    ///
    /// ## Returns
    ///
    /// Character that was consumed, or None if at end of input
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.byte += c.len_utf8();
        self.offset += 1;
        Some(c)
    }

    /// Advance while predicate is true.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use joinery_expr::lexer::Cursor;
    ///
    /// let mut cursor = Cursor::new("abc123");
    /// cursor.advance_while(|c| c.is_ascii_alphabetic());
    /// assert_eq!(cursor.peek(), Some('1'));
    /// ```
    pub fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }

    /// Unconsumed source text.
    pub fn rest(&self) -> &'a str {
        &self.source[self.byte..]
    }

    /// Slice of the source between a byte offset and the cursor.
    pub fn slice_from(&self, start_byte: usize) -> &'a str {
        &self.source[start_byte..self.byte]
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_empty() {
        let cursor = Cursor::new("");
        assert!(cursor.is_eof());
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn test_cursor_advance() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.offset(), 1);
        assert_eq!(cursor.advance(), Some('b'));
        assert_eq!(cursor.advance(), None);
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_cursor_utf8_offsets_differ() {
        let mut cursor = Cursor::new("é+");
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.byte(), 2); // é is 2 bytes in UTF-8
        assert_eq!(cursor.offset(), 1);
    }

    #[test]
    fn test_cursor_slice_from() {
        let mut cursor = Cursor::new("width + 1");
        cursor.advance_while(|c| c.is_ascii_alphabetic());
        assert_eq!(cursor.slice_from(0), "width");
    }
}
