//! Incremental re-tokenization.
//!
//! After an edit only the lines it touched are re-split and re-tokenized. Tokenization then
//! continues line by line past them for as long as the nested comment depth flowing into a line
//! differs from the depth recorded for it. As soon as the two agree, every later line is
//! known to be consistent already (tokenization is a pure function of line text and inbound
//! depth), so the cascade stops.

use crate::bracket::LineTokens;
use crate::line_info::LineInfo;
use crate::line_map::LineMap;
use crate::messages::BundleId;
use crate::tokenizer::{Token, TokenizerState, tokenize};
use crate::tracker::{highlight_runs, track_line};
use codeview_lang::Grammar;
use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::Arc;

/// What a re-tokenization pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReprocessReport {
    /// Lines that were re-tokenized (the requested lines plus the cascade).
    pub lines: Range<usize>,
    /// Bundles whose lines were removed by the edit.
    pub evicted_bundles: Vec<BundleId>,
}

/// Drives tokenization of a line map for one grammar.
#[derive(Debug, Clone)]
pub struct Reprocessor {
    grammar: Arc<Grammar>,
}

impl Reprocessor {
    /// Create a driver for `grammar`.
    pub fn new(grammar: Arc<Grammar>) -> Self {
        Self { grammar }
    }

    /// The grammar used for tokenization.
    pub fn grammar(&self) -> &Arc<Grammar> {
        &self.grammar
    }

    /// Tokenize every line, e.g. after loading a document.
    pub fn tokenize_all(&self, text: &Rope, lines: &mut LineMap<LineInfo>) -> ReprocessReport {
        let all = 0..lines.line_count();
        self.reprocess(text, lines, all)
    }

    /// Patch `lines` after `text` was edited and re-tokenize what the edit affected.
    ///
    /// `edited` is the range of the replacement text in the updated document, and
    /// `change_in_length` the change of the document length in chars.
    pub fn process_edit(
        &self,
        text: &Rope,
        lines: &mut LineMap<LineInfo>,
        edited: Range<usize>,
        change_in_length: isize,
    ) -> ReprocessReport {
        let update = lines.update_after_editing(text, edited, change_in_length);
        let evicted_bundles: Vec<BundleId> = update
            .removed
            .into_iter()
            .filter_map(|info| info.message_bundle.map(|bundle| bundle.id()))
            .collect();
        if !evicted_bundles.is_empty() {
            tracing::debug!(count = evicted_bundles.len(), "evicting message bundles");
        }

        let mut report = self.reprocess(text, lines, update.lines);
        report.evicted_bundles = evicted_bundles;
        report
    }

    /// Re-tokenize `range`, then cascade forward until the fixpoint.
    #[tracing::instrument(level = "debug", skip_all, fields(lines = ?range))]
    pub fn reprocess(
        &self,
        text: &Rope,
        lines: &mut LineMap<LineInfo>,
        range: Range<usize>,
    ) -> ReprocessReport {
        let line_count = lines.line_count();
        let start = range.start.min(line_count);
        let end = range.end.clamp(start, line_count);

        let mut depth = match start {
            0 => 0,
            _ => lines
                .info(start - 1)
                .map_or(0, |info| info.comment_depth_end),
        };

        let mut line = start;
        while line < line_count {
            if line >= end
                && lines
                    .info(line)
                    .is_some_and(|info| info.comment_depth_start == depth)
            {
                break;
            }
            depth = self.tokenize_line(text, lines, line, depth);
            line += 1;
        }

        tracing::debug!(
            requested = end - start,
            cascaded = line - end,
            fixpoint = line,
            "re-tokenized lines"
        );

        ReprocessReport {
            lines: start..line,
            evicted_bundles: Vec::new(),
        }
    }

    /// Tokenize one line starting at `depth` and record the result; returns the outbound depth.
    fn tokenize_line(
        &self,
        text: &Rope,
        lines: &mut LineMap<LineInfo>,
        line: usize,
        depth: usize,
    ) -> usize {
        let Some(record) = lines.lookup(line) else {
            return depth;
        };
        let length = record.length;
        let content: Cow<'_, str> = text.slice(record.content_range()).into();

        let (state, tokens) = tokenize(&content, TokenizerState::from_depth(depth), &self.grammar);
        let summary = track_line(&tokens, length, depth);
        debug_assert_eq!(summary.comment_depth_end, state.depth());
        let highlights = highlight_runs(&tokens, &summary.comment_spans);
        let depth_end = summary.comment_depth_end;

        tracing::trace!(line, depth_start = depth, depth_end, tokens = tokens.len(), "line");

        if let Some(info) = lines.info_mut(line) {
            info.apply(summary, highlights);
        }
        depth_end
    }

    /// A read-only token view of a settled document.
    pub fn tokens<'a>(&'a self, text: &'a Rope, lines: &'a LineMap<LineInfo>) -> DocumentTokens<'a> {
        DocumentTokens {
            text,
            lines,
            grammar: &self.grammar,
        }
    }
}

/// Tokens of a settled document, recomputed per line from the recorded inbound comment depth.
#[derive(Debug, Clone, Copy)]
pub struct DocumentTokens<'a> {
    text: &'a Rope,
    lines: &'a LineMap<LineInfo>,
    grammar: &'a Grammar,
}

impl LineTokens for DocumentTokens<'_> {
    fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    fn line_range(&self, line: usize) -> Option<Range<usize>> {
        self.lines.lookup(line).map(|record| record.range())
    }

    fn line_of(&self, offset: usize) -> Option<usize> {
        self.lines.line_of(offset)
    }

    fn tokens_of_line(&self, line: usize) -> Vec<Token> {
        let Some(record) = self.lines.lookup(line) else {
            return Vec::new();
        };
        let content: Cow<'_, str> = self.text.slice(record.content_range()).into();
        let state = TokenizerState::from_depth(record.info.comment_depth_start);
        let (_, tokens) = tokenize(&content, state, self.grammar);
        tokens
            .iter()
            .map(|token| token.offset_by(record.start))
            .collect()
    }
}
