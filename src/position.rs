//! Pluggable position tracking for tokens.
//!
//! A [`PositionTracker`] decides what a position is (nothing at all, an offset, a line and column...) and how matched
//! text advances it. The tokenizer uses one to annotate every token it produces with a [`Positioned`] wrapper.

use super::*;

use unicode_segmentation::UnicodeSegmentation;

/// Computes positions as text is consumed.
pub trait PositionTracker: Send + Sync {
    /// The type of position this tracker produces.
    type Position: Clone;

    /// The position at the start of the input.
    fn start(&self) -> Self::Position;

    /// The position after `text`, which starts at `position`.
    fn next(&self, position: &Self::Position, text: &str) -> Self::Position;
}

/// A tracker that records no position at all.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoPosition;

impl PositionTracker for NoPosition {
    type Position = ();

    fn start(&self) {}

    fn next(&self, _: &(), _: &str) {}
}

/// A tracker that counts characters (`char`s) from the start of the input.
#[derive(Copy, Clone, Debug, Default)]
pub struct CharOffset;

impl PositionTracker for CharOffset {
    type Position = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, position: &usize, text: &str) -> usize {
        position + text.chars().count()
    }
}

/// A tracker that counts bytes from the start of the input.
#[derive(Copy, Clone, Debug, Default)]
pub struct ByteOffset;

impl PositionTracker for ByteOffset {
    type Position = usize;

    fn start(&self) -> usize {
        0
    }

    fn next(&self, position: &usize, text: &str) -> usize {
        position + text.len()
    }
}

/// A 1-based line and column.
///
/// Columns count extended grapheme clusters, so `"é"` is one column however it is encoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineColumn {
    /// The line, starting at 1.
    pub line: usize,
    /// The column, starting at 1.
    pub column: usize,
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A tracker that produces [`LineColumn`]s. Both `"\n"` and `"\r\n"` end a line.
#[derive(Copy, Clone, Debug, Default)]
pub struct LineCol;

impl PositionTracker for LineCol {
    type Position = LineColumn;

    fn start(&self) -> LineColumn {
        LineColumn { line: 1, column: 1 }
    }

    fn next(&self, position: &LineColumn, text: &str) -> LineColumn {
        text.graphemes(true).fold(*position, |position, grapheme| match grapheme {
            "\n" | "\r\n" => LineColumn {
                line: position.line + 1,
                column: 1,
            },
            _ => LineColumn {
                column: position.column + 1,
                ..position
            },
        })
    }
}

/// A value annotated with the positions at which it starts and ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Positioned<P, T> {
    /// The position of the start of the value.
    pub start: P,
    /// The value.
    pub value: T,
    /// The position just after the end of the value.
    pub end: P,
}

impl<P, T> Positioned<P, T> {
    /// Transform the value, keeping its positions.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Positioned<P, U> {
        Positioned {
            start: self.start,
            value: f(self.value),
            end: self.end,
        }
    }

    /// Discard the positions.
    pub fn into_value(self) -> T {
        self.value
    }

    /// The start and end positions as a range.
    pub fn span(&self) -> Range<P>
    where
        P: Clone,
    {
        self.start.clone()..self.end.clone()
    }
}

impl<P, T: fmt::Display> fmt::Display for Positioned<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.value, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance<K: PositionTracker>(tracker: &K, chunks: &[&str]) -> K::Position {
        chunks
            .iter()
            .fold(tracker.start(), |position, text| tracker.next(&position, text))
    }

    #[test]
    fn offsets() {
        assert_eq!(advance(&CharOffset, &["héllo", " ", "wörld"]), 11);
        assert_eq!(advance(&ByteOffset, &["héllo", " ", "wörld"]), 13);
        advance(&NoPosition, &["anything"]);
    }

    #[test]
    fn line_and_column() {
        assert_eq!(advance(&LineCol, &["ab", "c"]), LineColumn { line: 1, column: 4 });
        assert_eq!(advance(&LineCol, &["ab\n", "c"]), LineColumn { line: 2, column: 2 });
        assert_eq!(advance(&LineCol, &["a\r\n\r\n", "e\u{301}x"]), LineColumn { line: 3, column: 3 });
        assert_eq!(LineCol.start().to_string(), "1:1");
    }

    #[test]
    fn positioned_helpers() {
        let token = Positioned { start: 2, value: "42", end: 4 };
        assert_eq!(token.span(), 2..4);
        assert_eq!(token.to_string(), "42");
        assert_eq!(token.map(str::len).into_value(), 2);
    }
}
