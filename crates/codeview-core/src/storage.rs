//! Code storage session
//!
//! [`CodeStorage`] owns the text of one document together with everything derived from it: the
//! line map, per-line comment and bracket bookkeeping, highlighting and diagnostics. Every edit
//! goes through [`CodeStorage::replace`], which patches the line map, re-tokenizes what the edit
//! affected and applies token completion before returning. Readers therefore only ever observe
//! settled state.

use crate::attributes::{Position, TextAttributeSource, TextAttributes};
use crate::bracket::{self, LineTokens};
use crate::completion::{CompletionEdit, TokenCompletion};
use crate::driver::{DocumentTokens, ReprocessReport, Reprocessor};
use crate::line_info::LineInfo;
use crate::line_map::LineMap;
use crate::messages::{BundleId, Message, MessageBundle, MessageEvent, MessageIndex};
use crate::theme::{Theme, TokenCategory};
use crate::tokenizer::Token;
use codeview_lang::Grammar;
use ropey::Rope;
use std::ops::Range;
use std::sync::Arc;
use thiserror::Error;

/// Edit errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The edited range does not lie within the document.
    #[error("invalid range {start}..{end} (document length {len})")]
    InvalidRange {
        /// Start char offset.
        start: usize,
        /// End char offset.
        end: usize,
        /// Document length in chars.
        len: usize,
    },
}

/// Session options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeStorageOptions {
    /// Complete brackets and nested comment delimiters while typing.
    pub token_completion: bool,
}

impl Default for CodeStorageOptions {
    fn default() -> Self {
        Self {
            token_completion: true,
        }
    }
}

/// Result of [`CodeStorage::replace`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Cursor offset after the edit (and after the completion, if any).
    pub cursor: usize,
    /// The completion that was applied on top of the edit.
    pub completion: Option<CompletionEdit>,
    /// Lines that were re-tokenized.
    pub lines: Range<usize>,
}

/// Net bracket nesting over a range of lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BracketBalance {
    /// `(` minus `)`.
    pub round: i32,
    /// `[` minus `]`.
    pub square: i32,
    /// `{` minus `}`.
    pub curly: i32,
}

/// Syntax-aware storage of one document.
#[derive(Debug)]
pub struct CodeStorage {
    text: Rope,
    lines: LineMap<LineInfo>,
    reprocessor: Reprocessor,
    theme: Arc<Theme>,
    messages: MessageIndex,
    completion: TokenCompletion,
    options: CodeStorageOptions,
    events: Vec<MessageEvent>,
}

impl CodeStorage {
    /// Create a session for `text` with default options.
    pub fn new(text: &str, grammar: Arc<Grammar>, theme: Arc<Theme>) -> Self {
        Self::with_options(text, grammar, theme, CodeStorageOptions::default())
    }

    /// Create a session for `text`.
    pub fn with_options(
        text: &str,
        grammar: Arc<Grammar>,
        theme: Arc<Theme>,
        options: CodeStorageOptions,
    ) -> Self {
        let text = Rope::from_str(text);
        let mut lines = LineMap::new(&text);
        let reprocessor = Reprocessor::new(grammar);
        reprocessor.tokenize_all(&text, &mut lines);
        tracing::debug!(
            grammar = reprocessor.grammar().name(),
            lines = lines.line_count(),
            "loaded document"
        );

        Self {
            text,
            lines,
            reprocessor,
            theme,
            messages: MessageIndex::new(),
            completion: TokenCompletion::new(),
            options,
            events: Vec::new(),
        }
    }

    /// Replace `range` by `text`.
    ///
    /// The line map, comment state and highlighting are brought up to date before this returns.
    /// Single-character edits may additionally trigger token completion, which is applied as
    /// part of the same step.
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<EditOutcome, EditError> {
        let len = self.text.len_chars();
        if range.start > range.end || range.end > len {
            return Err(EditError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }

        let deleted = (range.len() == 1).then(|| self.text.char(range.start));
        let mut lines = self.apply_edit(range.clone(), text).lines;
        let mut cursor = range.start + text.chars().count();

        let completion = if self.options.token_completion {
            self.complete(range.clone(), text, deleted)
        } else {
            None
        };
        if let Some(edit) = &completion {
            let report = self.apply_edit(edit.range.clone(), &edit.text);
            lines = lines.start.min(report.lines.start)..lines.end.max(report.lines.end);
            cursor = edit.cursor;
        }

        Ok(EditOutcome {
            cursor,
            completion,
            lines,
        })
    }

    /// Replace the whole document, dropping all diagnostics.
    pub fn set_text(&mut self, text: &str) {
        self.events.extend(
            self.lines
                .iter()
                .filter_map(|record| record.info.message_bundle.as_ref())
                .map(|bundle| MessageEvent::Removed { id: bundle.id() }),
        );
        self.text = Rope::from_str(text);
        self.lines = LineMap::new(&self.text);
        self.reprocessor.tokenize_all(&self.text, &mut self.lines);
        self.completion.reset();
    }

    /// Switch to another grammar and re-tokenize the whole document.
    pub fn set_grammar(&mut self, grammar: Arc<Grammar>) {
        self.reprocessor = Reprocessor::new(grammar);
        self.reprocessor.tokenize_all(&self.text, &mut self.lines);
        self.completion.reset();
    }

    /// Switch to another theme. Colors are resolved at query time, nothing is re-tokenized.
    pub fn set_theme(&mut self, theme: Arc<Theme>) {
        self.theme = theme;
    }

    /// The grammar in use.
    pub fn grammar(&self) -> &Arc<Grammar> {
        self.reprocessor.grammar()
    }

    /// The theme in use.
    pub fn theme(&self) -> &Arc<Theme> {
        &self.theme
    }

    /// The session options.
    pub fn options(&self) -> CodeStorageOptions {
        self.options
    }

    /// The document text.
    pub fn text(&self) -> &Rope {
        &self.text
    }

    /// Document length in chars.
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// The line map.
    pub fn line_map(&self) -> &LineMap<LineInfo> {
        &self.lines
    }

    /// Bookkeeping of `line`.
    pub fn line_info(&self, line: usize) -> Option<&LineInfo> {
        self.lines.info(line)
    }

    /// Tokens of `line`, with absolute offsets.
    pub fn tokens_of_line(&self, line: usize) -> Vec<Token> {
        self.document_tokens().tokens_of_line(line)
    }

    /// The token covering `offset`, if any.
    pub fn token_at(&self, offset: usize) -> Option<Token> {
        let line = self.lines.line_of(offset)?;
        self.tokens_of_line(line)
            .into_iter()
            .find(|token| token.range.contains(&offset))
    }

    // Messages

    /// Attach `message` to `line`. Returns `None` if the line does not exist.
    pub fn add_message(&mut self, message: Message, line: usize) -> Option<BundleId> {
        let id = self.messages.add(&mut self.lines, message, line)?;
        self.events.push(MessageEvent::Changed { id, line });
        Some(id)
    }

    /// Retract `message`. Returns the bundle it was removed from.
    pub fn remove_message(&mut self, message: &Message) -> Option<BundleId> {
        let (id, line) = MessageIndex::remove(&mut self.lines, message)?;
        let event = if MessageIndex::messages(&self.lines, line).is_some() {
            MessageEvent::Changed { id, line }
        } else {
            MessageEvent::Removed { id }
        };
        self.events.push(event);
        Some(id)
    }

    /// Messages of `line`.
    pub fn messages(&self, line: usize) -> Option<&MessageBundle> {
        MessageIndex::messages(&self.lines, line)
    }

    /// Drop all messages of `line`.
    pub fn remove_messages(&mut self, line: usize) -> Option<BundleId> {
        let id = MessageIndex::remove_messages(&mut self.lines, line)?;
        self.events.push(MessageEvent::Removed { id });
        Some(id)
    }

    /// The line a bundle is currently attached to.
    pub fn line_of_bundle(&self, id: BundleId) -> Option<usize> {
        MessageIndex::line_of_bundle(&self.lines, id)
    }

    /// Take the bundle notifications queued since the last call.
    pub fn take_message_events(&mut self) -> Vec<MessageEvent> {
        std::mem::take(&mut self.events)
    }

    // Brackets

    /// The bracket matching the bracket token at `location`, searching within `search_range`.
    pub fn matching_bracket(
        &self,
        location: usize,
        search_range: Range<usize>,
    ) -> Option<Range<usize>> {
        bracket::matching_bracket(&self.document_tokens(), location, search_range)
    }

    /// The bracket directly before or after `cursor` and its match, preferring the one before.
    pub fn bracket_pair_at(&self, cursor: usize) -> Option<(Range<usize>, Range<usize>)> {
        let whole = 0..self.len_chars();
        let before = cursor
            .checked_sub(1)
            .and_then(|offset| self.token_at(offset))
            .filter(|token| token.range.end == cursor);
        let after = self
            .token_at(cursor)
            .filter(|token| token.range.start == cursor);

        [before, after]
            .into_iter()
            .flatten()
            .filter(|token| token.kind.bracket().is_some())
            .find_map(|token| {
                let matching = self.matching_bracket(token.range.start, whole.clone())?;
                Some((token.range, matching))
            })
    }

    /// Net bracket nesting contributed by `lines`.
    pub fn bracket_balance(&self, lines: Range<usize>) -> BracketBalance {
        lines
            .filter_map(|line| self.lines.info(line))
            .fold(BracketBalance::default(), |balance, info| BracketBalance {
                round: balance.round + info.round_bracket_diff,
                square: balance.square + info.square_bracket_diff,
                curly: balance.curly + info.curly_bracket_diff,
            })
    }

    fn document_tokens(&self) -> DocumentTokens<'_> {
        self.reprocessor.tokens(&self.text, &self.lines)
    }

    /// Apply an edit to the buffer and bring the derived state up to date.
    fn apply_edit(&mut self, range: Range<usize>, text: &str) -> ReprocessReport {
        let removed = range.len();
        self.text.remove(range.clone());
        self.text.insert(range.start, text);
        let inserted = text.chars().count();

        let report = self.reprocessor.process_edit(
            &self.text,
            &mut self.lines,
            range.start..range.start + inserted,
            inserted as isize - removed as isize,
        );
        self.events.extend(
            report
                .evicted_bundles
                .iter()
                .map(|&id| MessageEvent::Removed { id }),
        );
        report
    }

    fn complete(
        &mut self,
        range: Range<usize>,
        text: &str,
        deleted: Option<char>,
    ) -> Option<CompletionEdit> {
        let at = range.start;
        match (range.is_empty(), text.is_empty(), deleted) {
            (true, false, _) => {
                let line = self.lines.line_of(at)?;
                let tokens = self.tokens_of_line(line);
                let following = self.following_text(at + 1);
                let grammar = Arc::clone(self.reprocessor.grammar());
                self.completion
                    .after_insertion(text, at, &tokens, &following, &grammar)
            }
            (false, true, Some(ch)) => {
                let token_at = self.token_at(at);
                let mut buffer = [0; 4];
                self.completion
                    .after_deletion(ch.encode_utf8(&mut buffer), at, token_at.as_ref())
            }
            _ => {
                self.completion.reset();
                None
            }
        }
    }

    /// Text from `offset` to the end of its line content.
    fn following_text(&self, offset: usize) -> String {
        let end = self
            .lines
            .line_of(offset)
            .and_then(|line| self.lines.lookup(line))
            .map_or(offset, |record| record.content_range().end.max(offset));
        self.text.slice(offset..end).to_string()
    }
}

impl TextAttributeSource for CodeStorage {
    fn attributes_at(&self, offset: usize) -> Option<TextAttributes> {
        if offset >= self.len_chars() {
            return None;
        }
        let line = self.lines.line_of(offset)?;
        let record = self.lines.lookup(line)?;
        let column = offset - record.start;
        let runs = &record.info.highlights;

        let (range, category) = match record.info.run_at(column) {
            Some(run) => (run.range.clone(), run.category),
            None => {
                let index = runs.partition_point(|run| run.range.end <= column);
                let start = index
                    .checked_sub(1)
                    .map_or(0, |previous| runs[previous].range.end);
                let end = runs.get(index).map_or(record.length, |run| run.range.start);
                (start..end, TokenCategory::Text)
            }
        };

        Some(TextAttributes {
            range: record.start + range.start..record.start + range.end,
            category,
            foreground: self.theme.color(category),
            is_comment: category == TokenCategory::Comment,
        })
    }

    fn position_of(&self, offset: usize) -> Option<Position> {
        let line = self.lines.line_of(offset)?;
        let record = self.lines.lookup(line)?;
        Some(Position::new(line, offset - record.start))
    }

    fn offset_of(&self, position: Position) -> Option<usize> {
        let record = self.lines.lookup(position.line)?;
        (position.column <= record.content_length || position.column < record.length)
            .then_some(record.start + position.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageCategory;
    use codeview_lang::LanguageConfiguration;
    use pretty_assertions::assert_eq;

    fn storage(text: &str) -> CodeStorage {
        let grammar = Arc::new(Grammar::new(&LanguageConfiguration::swift()).unwrap());
        CodeStorage::new(text, grammar, Arc::new(Theme::default_light()))
    }

    #[test]
    fn test_invalid_range() {
        let mut storage = storage("abc");
        assert_eq!(
            storage.replace(2..5, "x"),
            Err(EditError::InvalidRange {
                start: 2,
                end: 5,
                len: 3
            })
        );
        assert_eq!(storage.text().to_string(), "abc");
    }

    #[test]
    fn test_completion_can_be_disabled() {
        let grammar = Arc::new(Grammar::new(&LanguageConfiguration::swift()).unwrap());
        let mut storage = CodeStorage::with_options(
            "",
            grammar,
            Arc::new(Theme::default_light()),
            CodeStorageOptions {
                token_completion: false,
            },
        );
        let outcome = storage.replace(0..0, "(").unwrap();
        assert_eq!(outcome.completion, None);
        assert_eq!(outcome.cursor, 1);
        assert_eq!(storage.text().to_string(), "(");
    }

    #[test]
    fn test_newline_between_braces_opens_a_line() {
        let mut storage = storage("func f() ");
        storage.replace(9..9, "{").unwrap();
        assert_eq!(storage.text().to_string(), "func f() {}");

        let outcome = storage.replace(10..10, "\n").unwrap();
        assert_eq!(storage.text().to_string(), "func f() {\n\n}");
        assert_eq!(outcome.cursor, 11);
        assert_eq!(storage.line_count(), 3);
    }

    #[test]
    fn test_remove_message_events() {
        let mut storage = storage("a\nb");
        let first = Message::new(MessageCategory::Error, 1, "first");
        let second = Message::new(MessageCategory::Warning, 1, "second");
        let id = storage.add_message(first.clone(), 1).unwrap();
        storage.add_message(second.clone(), 1);

        assert_eq!(storage.remove_message(&first), Some(id));
        assert_eq!(storage.remove_message(&second), Some(id));
        assert_eq!(
            storage.take_message_events(),
            vec![
                MessageEvent::Changed { id, line: 1 },
                MessageEvent::Changed { id, line: 1 },
                MessageEvent::Changed { id, line: 1 },
                MessageEvent::Removed { id },
            ]
        );
        assert!(storage.take_message_events().is_empty());
    }

    #[test]
    fn test_deleting_a_line_evicts_its_bundle() {
        let mut storage = storage("a\nb\nc");
        let id = storage
            .add_message(Message::new(MessageCategory::Error, 1, "b"), 1)
            .unwrap();
        storage.take_message_events();

        storage.replace(1..3, "").unwrap();
        assert_eq!(storage.text().to_string(), "a\nc");
        assert_eq!(storage.take_message_events(), vec![MessageEvent::Removed { id }]);
        assert_eq!(storage.line_of_bundle(id), None);
    }

    #[test]
    fn test_bracket_pair_and_balance() {
        let storage = storage("f(x) {\n  g[0]\n");
        assert_eq!(storage.bracket_pair_at(4), Some((3..4, 1..2)));
        assert_eq!(storage.bracket_pair_at(1), Some((1..2, 3..4)));
        assert_eq!(storage.bracket_pair_at(5), None);
        assert_eq!(
            storage.bracket_balance(0..storage.line_count()),
            BracketBalance {
                round: 0,
                square: 0,
                curly: 1
            }
        );
    }

    #[test]
    fn test_position_round_trip() {
        let storage = storage("ab\r\ncd\n\nx");
        for offset in 0..=storage.len_chars() {
            let position = storage.position_of(offset).unwrap();
            assert_eq!(storage.offset_of(position), Some(offset), "{position:?}");
        }
        assert_eq!(storage.position_of(5), Some(Position::new(1, 1)));
        assert_eq!(storage.position_of(99), None);
        assert_eq!(storage.offset_of(Position::new(0, 5)), None);
        assert_eq!(storage.offset_of(Position::new(9, 0)), None);
    }
}
