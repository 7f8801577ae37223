//! # Source Span
//!
//! Represents a range in an expression source for error reporting.
//! Offsets count characters, not bytes, so they can be shown to the person
//! editing the expression without further conversion.
//!
//! ## Usage
//!
//! ```rust
//! use joinery_expr::Span;
//!
//! let span = Span::new(0, 10);
//! assert_eq!(span.start(), 0);
//! assert_eq!(span.end(), 10);
//! assert_eq!(span.len(), 10);
//! ```

use serde::{Deserialize, Serialize};

/// A range in the source, represented as character offsets.
///
/// # Fields
///
/// - `start`: Starting character offset (inclusive)
/// - `end`: Ending character offset (exclusive)
///
/// # Example
///
/// ```rust
/// use joinery_expr::Span;
///
/// // For source "min(L, W)" the span of "min" would be:
/// let span = Span::new(0, 3);
/// assert_eq!(span.len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Starting character offset (inclusive)
    start: usize,
    /// Ending character offset (exclusive)
    end: usize,
}

impl Span {
    /// Creates a new span from start and end character offsets.
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-length span at `offset`.
    #[inline]
    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns the starting character offset.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the ending character offset.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns the length of the span in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Creates a span that encompasses both this span and another.
    ///
    /// # Example
    ///
    /// ```rust
    /// use joinery_expr::Span;
    ///
    /// let merged = Span::new(0, 5).merge(&Span::new(10, 15));
    /// assert_eq!(merged.start(), 0);
    /// assert_eq!(merged.end(), 15);
    /// ```
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Checks if this span contains a character offset.
    #[inline]
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_len() {
        let span = Span::new(5, 15);
        assert_eq!(span.len(), 10);
    }

    #[test]
    fn test_span_is_empty() {
        assert!(Span::at(5).is_empty());
        assert!(Span::new(10, 5).is_empty()); // Invalid span is empty
        assert!(!Span::new(0, 1).is_empty());
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(0, 10).merge(&Span::new(5, 20));
        assert_eq!(merged.start(), 0);
        assert_eq!(merged.end(), 20);
    }

    #[test]
    fn test_span_contains() {
        let span = Span::new(5, 10);
        assert!(!span.contains(4));
        assert!(span.contains(5));
        assert!(span.contains(9));
        assert!(!span.contains(10)); // end is exclusive
    }
}
