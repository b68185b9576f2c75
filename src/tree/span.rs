use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Span covering whole lines, without byte offsets. Handy for trees built
    /// by hand.
    pub fn lines(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            start_col: 1,
            end_line,
            end_col: 1,
            ..Self::default()
        }
    }

    /// Single-line span between two columns.
    pub fn at(line: usize, start_col: usize, end_col: usize) -> Self {
        Self {
            start_line: line,
            start_col,
            end_line: line,
            end_col,
            ..Self::default()
        }
    }

    /// Create a span from a tree-sitter node.
    #[cfg(feature = "tree-sitter")]
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    pub fn line_range(&self) -> RangeInclusive<usize> {
        self.start_line..=self.end_line
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.line_range().contains(&line)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Span {
        let (start, end) = if (self.start_line, self.start_col) <= (other.start_line, other.start_col) {
            (self, other)
        } else {
            (other, self)
        };
        let end = if (end.end_line, end.end_col) >= (start.end_line, start.end_col) {
            end
        } else {
            start
        };
        Span {
            start_byte: start.start_byte,
            end_byte: end.end_byte,
            start_line: start.start_line,
            start_col: start.start_col,
            end_line: end.end_line,
            end_col: end.end_col,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}
