//! Attribute queries for rendering and cursor reporting.

use crate::theme::{Color, TokenCategory};
use std::cmp::Ordering;
use std::ops::Range;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column in characters within the line.
    pub column: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Attributes of a run of characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAttributes {
    /// Absolute char range over which these attributes are constant (never crosses a line end).
    pub range: Range<usize>,
    /// Highlighting category.
    pub category: TokenCategory,
    /// Foreground color resolved through the current theme.
    pub foreground: Color,
    /// Whether the characters are part of a comment.
    pub is_comment: bool,
}

/// Read-only queries a renderer issues against a settled document.
pub trait TextAttributeSource {
    /// Attributes of the character at `offset`, with the range they extend over.
    ///
    /// Returns `None` at or past the end of the document.
    fn attributes_at(&self, offset: usize) -> Option<TextAttributes>;

    /// Line and column of `offset`; `None` past the end of the document.
    fn position_of(&self, offset: usize) -> Option<Position>;

    /// Offset of `position`; `None` if the line does not exist or the column lies beyond it.
    fn offset_of(&self, position: Position) -> Option<usize>;
}
