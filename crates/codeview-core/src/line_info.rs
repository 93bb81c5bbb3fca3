//! Per-line payload of the line map.

use crate::messages::MessageBundle;
use crate::theme::TokenCategory;
use std::ops::Range;

/// A highlighted span of a line. Ranges are chars relative to the line start; characters not
/// covered by any run are plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRun {
    /// Char range within the line.
    pub range: Range<usize>,
    /// Highlighting category.
    pub category: TokenCategory,
}

impl StyleRun {
    /// Create a run.
    pub fn new(range: Range<usize>, category: TokenCategory) -> Self {
        Self { range, category }
    }

    /// Whether the run paints a comment.
    pub fn is_comment(&self) -> bool {
        self.category == TokenCategory::Comment
    }
}

/// Lexical bookkeeping and annotations of one line.
///
/// Once tokenization has converged, `comment_depth_start` of a line equals
/// `comment_depth_end` of the line before it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInfo {
    /// Nested comment depth at the start of the line.
    pub comment_depth_start: usize,
    /// Nested comment depth at the end of the line.
    pub comment_depth_end: usize,
    /// Net change of `(`/`)` nesting contributed by the line.
    pub round_bracket_diff: i32,
    /// Net change of `[`/`]` nesting contributed by the line.
    pub square_bracket_diff: i32,
    /// Net change of `{`/`}` nesting contributed by the line.
    pub curly_bracket_diff: i32,
    /// Diagnostics anchored to the line.
    pub message_bundle: Option<MessageBundle>,
    /// Highlighting derived from the line's tokens, sorted and non-overlapping.
    pub highlights: Vec<StyleRun>,
}

impl LineInfo {
    /// The run covering the line-relative char `column`, if any.
    pub fn run_at(&self, column: usize) -> Option<&StyleRun> {
        let index = self
            .highlights
            .partition_point(|run| run.range.end <= column);
        self.highlights
            .get(index)
            .filter(|run| run.range.contains(&column))
    }

    /// Whether the line-relative char `column` is inside a comment.
    pub fn is_comment_at(&self, column: usize) -> bool {
        self.run_at(column).is_some_and(StyleRun::is_comment)
    }
}
