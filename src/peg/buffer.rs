//! Immutable input buffer with O(log n) line/column lookup
//!
//! The buffer owns the input text and a line index built in one pass at
//! construction: a sorted map from the byte offset of each line start to its
//! 1-based line number. Position lookup is a floor search on that map.
//!
//! Indices are byte offsets into the UTF-8 text. "Char" accessors work on
//! single bytes, "code point" accessors decode the scalar value starting at
//! an index.

use super::error::BufferError;
use super::source_location::{SourcePosition, Span};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable view over the text being parsed
#[derive(Debug, Clone)]
pub struct InputBuffer {
    /// The input text
    text: Arc<str>,

    /// Line start offset -> 1-based line number
    line_starts: BTreeMap<usize, usize>,
}

impl InputBuffer {
    /// Wrap `text` and index its line starts
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let mut line_starts = BTreeMap::new();
        line_starts.insert(0, 1);

        let mut line = 1;
        for newline in memchr::memchr_iter(b'\n', text.as_bytes()) {
            line += 1;
            line_starts.insert(newline + 1, line);
        }

        Self { text, line_starts }
    }

    /// Length of the input in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the input is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The whole input text
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The whole input as bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Number of lines (a trailing newline opens a final empty line)
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The byte at `index`
    pub fn byte_at(&self, index: usize) -> Result<u8, BufferError> {
        self.as_bytes()
            .get(index)
            .copied()
            .ok_or(BufferError::OutOfRange {
                index,
                len: self.len(),
            })
    }

    /// The code point starting at `index`
    pub fn code_point_at(&self, index: usize) -> Result<char, BufferError> {
        self.check_index(index)?;
        self.peek_code_point(index)
            .ok_or(BufferError::NotCharBoundary { index })
    }

    /// Decode the code point at `index`, or `None` at end of input or inside
    /// a multi-byte sequence
    #[inline]
    pub(crate) fn peek_code_point(&self, index: usize) -> Option<char> {
        self.text.get(index..)?.chars().next()
    }

    /// The text in `start..end`
    pub fn extract(&self, start: usize, end: usize) -> Result<&str, BufferError> {
        self.check_range(start, end)?;
        if !self.text.is_char_boundary(start) {
            return Err(BufferError::NotCharBoundary { index: start });
        }
        if !self.text.is_char_boundary(end) {
            return Err(BufferError::NotCharBoundary { index: end });
        }
        Ok(&self.text[start..end])
    }

    /// The text covered by `span`
    #[inline]
    pub fn extract_span(&self, span: Span) -> Result<&str, BufferError> {
        self.extract(span.start, span.end)
    }

    /// The bytes in `start..end`
    pub fn slice(&self, start: usize, end: usize) -> Result<&[u8], BufferError> {
        self.check_range(start, end)?;
        Ok(&self.as_bytes()[start..end])
    }

    /// Line and column of the byte at `index`
    pub fn position(&self, index: usize) -> Result<SourcePosition, BufferError> {
        self.check_index(index)?;
        Ok(self.locate(index))
    }

    /// Like [`position`](Self::position) but also accepts the end-of-input
    /// index, which is reported just past the last character
    pub fn position_or_end(&self, index: usize) -> Result<SourcePosition, BufferError> {
        if index > self.len() {
            return Err(BufferError::OutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(self.locate(index))
    }

    /// Text of the 1-based line `line`, without its line terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.iter().nth(line.checked_sub(1)?)?.0;
        let rest = &self.text[start..];
        let end = memchr::memchr(b'\n', rest.as_bytes()).unwrap_or(rest.len());
        Some(rest[..end].trim_end_matches('\r'))
    }

    fn locate(&self, index: usize) -> SourcePosition {
        let (start, line) = self
            .line_starts
            .range(..=index)
            .next_back()
            .map(|(start, line)| (*start, *line))
            .unwrap_or((0, 1));
        SourcePosition::new(index, line, index - start + 1)
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), BufferError> {
        if index >= self.len() {
            return Err(BufferError::OutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    #[inline]
    fn check_range(&self, start: usize, end: usize) -> Result<(), BufferError> {
        if start > end || end > self.len() {
            return Err(BufferError::InvalidRange {
                start,
                end,
                len: self.len(),
            });
        }
        Ok(())
    }
}

impl From<&str> for InputBuffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for InputBuffer {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_lookup() {
        let buffer = InputBuffer::new("foo\nbar");

        assert_eq!(buffer.position(0).unwrap(), SourcePosition::new(0, 1, 1));
        assert_eq!(buffer.position(3).unwrap(), SourcePosition::new(3, 1, 4));
        assert_eq!(buffer.position(4).unwrap(), SourcePosition::new(4, 2, 1));
        assert_eq!(buffer.position(6).unwrap(), SourcePosition::new(6, 2, 3));
    }

    #[test]
    fn test_position_out_of_range() {
        let buffer = InputBuffer::new("foo");
        assert_eq!(
            buffer.position(3),
            Err(BufferError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(buffer.position_or_end(3).unwrap().column, 4);
        assert!(InputBuffer::new("").position(0).is_err());
    }

    #[test]
    fn test_consecutive_newlines() {
        let buffer = InputBuffer::new("a\n\n\nb");
        assert_eq!(buffer.line_count(), 4);
        assert_eq!(buffer.position(2).unwrap().line, 2);
        assert_eq!(buffer.position(3).unwrap().line, 3);
        assert_eq!(buffer.position(4).unwrap(), SourcePosition::new(4, 4, 1));
    }

    #[test]
    fn test_extract_bounds() {
        let buffer = InputBuffer::new("hello");
        assert_eq!(buffer.extract(1, 4).unwrap(), "ell");
        assert_eq!(buffer.extract(5, 5).unwrap(), "");
        assert!(matches!(
            buffer.extract(3, 6),
            Err(BufferError::InvalidRange { .. })
        ));
        assert!(buffer.extract(4, 2).is_err());
    }

    #[test]
    fn test_code_points() {
        let buffer = InputBuffer::new("aé!");
        assert_eq!(buffer.code_point_at(1).unwrap(), 'é');
        assert_eq!(
            buffer.code_point_at(2),
            Err(BufferError::NotCharBoundary { index: 2 })
        );
        assert_eq!(buffer.byte_at(3).unwrap(), b'!');
        assert!(buffer.byte_at(4).is_err());
        assert!(buffer.extract(0, 2).is_err());
    }

    #[test]
    fn test_line_text() {
        let buffer = InputBuffer::new("one\r\ntwo\nthree");
        assert_eq!(buffer.line(1), Some("one"));
        assert_eq!(buffer.line(2), Some("two"));
        assert_eq!(buffer.line(3), Some("three"));
        assert_eq!(buffer.line(0), None);
        assert_eq!(buffer.line(4), None);
    }
}
