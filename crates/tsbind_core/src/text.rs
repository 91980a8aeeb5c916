//! Text span and range types for source location tracking.
//!
//! Node ranges come from the parser; diagnostics carry spans derived from
//! them. `LineMap` turns offsets into line/column pairs for reporting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// A position in source text, measured as a byte offset from the start.
pub type TextPos = u32;

/// A span in source text, defined by a start position and a length.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TextSpan {
    /// The byte offset where this span starts.
    pub start: TextPos,
    /// The length of this span in bytes.
    pub length: TextPos,
}

impl TextSpan {
    #[inline]
    pub fn new(start: TextPos, length: TextPos) -> Self {
        Self { start, length }
    }

    /// Create a span from start and end positions.
    #[inline]
    pub fn from_bounds(start: TextPos, end: TextPos) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// The end position of this span (exclusive).
    #[inline]
    pub fn end(&self) -> TextPos {
        self.start + self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether this span contains the given position.
    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.start && pos < self.end()
    }

    /// Convert to a byte range.
    #[inline]
    pub fn to_range(&self) -> Range<usize> {
        self.start as usize..self.end() as usize
    }
}

impl fmt::Debug for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end())
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end())
    }
}

/// A text range with start and end positions, as stored on AST nodes.
#[derive(Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// The byte offset where this range starts (inclusive).
    pub pos: TextPos,
    /// The byte offset where this range ends (exclusive).
    pub end: TextPos,
}

impl TextRange {
    #[inline]
    pub fn new(pos: TextPos, end: TextPos) -> Self {
        Self { pos, end }
    }

    /// Create an empty range at a position.
    #[inline]
    pub fn empty(pos: TextPos) -> Self {
        Self { pos, end: pos }
    }

    /// The length of this range in bytes.
    #[inline]
    pub fn len(&self) -> TextPos {
        self.end.saturating_sub(self.pos)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    #[inline]
    pub fn to_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.pos, self.end.max(self.pos))
    }

    /// Whether this range contains a position.
    #[inline]
    pub fn contains(&self, pos: TextPos) -> bool {
        pos >= self.pos && pos < self.end
    }

    /// Smallest range covering both ranges.
    pub fn cover(&self, other: TextRange) -> TextRange {
        TextRange::new(self.pos.min(other.pos), self.end.max(other.end))
    }
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.pos, self.end)
    }
}

impl From<TextRange> for TextSpan {
    fn from(range: TextRange) -> Self {
        range.to_span()
    }
}

impl From<TextSpan> for TextRange {
    fn from(span: TextSpan) -> Self {
        TextRange::new(span.start, span.end())
    }
}

/// Line and column information derived from source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LineAndColumn {
    /// 0-based line number.
    pub line: u32,
    /// 0-based column in bytes.
    pub character: u32,
}

/// A map from byte offsets to line numbers, built from source text.
#[derive(Debug, Clone)]
pub struct LineMap {
    line_starts: Vec<TextPos>,
}

impl LineMap {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Get the line number (0-based) for a byte offset.
    pub fn line_of(&self, pos: TextPos) -> u32 {
        match self.line_starts.binary_search(&pos) {
            Ok(line) => line as u32,
            Err(line) => line.saturating_sub(1) as u32,
        }
    }

    pub fn line_and_column_of(&self, pos: TextPos) -> LineAndColumn {
        let line = self.line_of(pos);
        let line_start = self.line_starts.get(line as usize).copied().unwrap_or(0);
        LineAndColumn {
            line,
            character: pos - line_start,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_span() {
        let span = TextSpan::new(5, 10);
        assert_eq!(span.end(), 15);
        assert!(span.contains(5));
        assert!(span.contains(14));
        assert!(!span.contains(15));
    }

    #[test]
    fn test_range_cover() {
        let a = TextRange::new(4, 9);
        let b = TextRange::new(12, 20);
        assert_eq!(a.cover(b), TextRange::new(4, 20));
        assert_eq!(b.cover(a), TextRange::new(4, 20));
        assert_eq!(a.to_span(), TextSpan::new(4, 5));
    }

    #[test]
    fn test_line_map() {
        let text = "line1\nline2\nline3";
        let map = LineMap::new(text);
        assert_eq!(map.line_count(), 3);
        assert_eq!(map.line_of(0), 0);
        assert_eq!(map.line_of(5), 0);
        assert_eq!(map.line_of(6), 1);
        assert_eq!(map.line_of(12), 2);

        let lc = map.line_and_column_of(8);
        assert_eq!(lc.line, 1);
        assert_eq!(lc.character, 2);
    }
}
