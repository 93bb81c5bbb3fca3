//! Comment and bracket tracking.
//!
//! Consumes the tokens of one line plus the inbound nested comment depth and derives what the
//! line map persists: outbound depth, bracket nesting deltas, comment spans and style runs.

use crate::line_info::{LineInfo, StyleRun};
use crate::theme::TokenCategory;
use crate::tokenizer::{BracketFamily, Token, TokenKind};
use std::ops::Range;

/// Result of tracking one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSummary {
    /// Nested comment depth at the start of the line.
    pub comment_depth_start: usize,
    /// Nested comment depth at the end of the line.
    pub comment_depth_end: usize,
    /// Net `(`/`)` nesting change.
    pub round_bracket_diff: i32,
    /// Net `[`/`]` nesting change.
    pub square_bracket_diff: i32,
    /// Net `{`/`}` nesting change.
    pub curly_bracket_diff: i32,
    /// Line-relative char ranges to paint as comment, in order.
    pub comment_spans: Vec<Range<usize>>,
}

/// Track comment nesting and bracket balance over the tokens of one line.
///
/// A comment span runs from the outermost nested comment opening to the end of the close that
/// returns the depth to zero. A comment still open at the end of the line is painted up to
/// `line_length` and stays open for the next line. A single-line comment is painted up to
/// `line_length` and ends processing of the line: brackets behind it are not counted.
pub fn track_line(tokens: &[Token], line_length: usize, inbound_depth: usize) -> LineSummary {
    let mut summary = LineSummary {
        comment_depth_start: inbound_depth,
        ..LineSummary::default()
    };
    let mut depth = inbound_depth;
    let mut outermost_open = (depth > 0).then_some(0);

    for token in tokens {
        match token.kind {
            TokenKind::NestedCommentOpen => {
                if depth == 0 {
                    outermost_open = Some(token.range.start);
                }
                depth += 1;
            }
            TokenKind::NestedCommentClose => {
                if depth == 0 {
                    continue;
                }
                depth -= 1;
                if depth == 0
                    && let Some(start) = outermost_open.take()
                {
                    summary.comment_spans.push(start..token.range.end);
                }
            }
            TokenKind::SingleLineComment => {
                summary.comment_spans.push(token.range.start..line_length);
                break;
            }
            kind => {
                if let Some((family, opening)) = kind.bracket() {
                    let delta = if opening { 1 } else { -1 };
                    match family {
                        BracketFamily::Round => summary.round_bracket_diff += delta,
                        BracketFamily::Square => summary.square_bracket_diff += delta,
                        BracketFamily::Curly => summary.curly_bracket_diff += delta,
                    }
                }
            }
        }
    }

    if depth > 0
        && let Some(start) = outermost_open
    {
        summary.comment_spans.push(start..line_length);
    }

    summary.comment_depth_end = depth;
    summary
}

/// Style runs of a line: one per non-plain token outside comments, plus the comment spans.
pub fn highlight_runs(tokens: &[Token], comment_spans: &[Range<usize>]) -> Vec<StyleRun> {
    let mut runs: Vec<StyleRun> = tokens
        .iter()
        .filter(|token| {
            !comment_spans
                .iter()
                .any(|span| span.start <= token.range.start && token.range.start < span.end)
        })
        .filter_map(|token| {
            let category = TokenCategory::from(token.kind);
            (category != TokenCategory::Text).then(|| StyleRun::new(token.range.clone(), category))
        })
        .collect();

    runs.extend(
        comment_spans
            .iter()
            .filter(|span| !span.is_empty())
            .map(|span| StyleRun::new(span.clone(), TokenCategory::Comment)),
    );
    runs.sort_by_key(|run| run.range.start);
    runs
}

impl LineInfo {
    /// Replace the lexical bookkeeping of the line, keeping its message bundle.
    pub fn apply(&mut self, summary: LineSummary, highlights: Vec<StyleRun>) {
        self.comment_depth_start = summary.comment_depth_start;
        self.comment_depth_end = summary.comment_depth_end;
        self.round_bracket_diff = summary.round_bracket_diff;
        self.square_bracket_diff = summary.square_bracket_diff;
        self.curly_bracket_diff = summary.curly_bracket_diff;
        self.highlights = highlights;
    }
}
