//! Automatic completion of bracket and comment pairs while typing.
//!
//! The assistant looks at single-character edits only. Pastes, replacements and deletions of more
//! than one character never trigger it.

use crate::tokenizer::{BracketFamily, Token, TokenKind};
use codeview_lang::Grammar;
use std::ops::Range;

/// A follow-up edit produced by the assistant, to be applied right after the user's edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEdit {
    /// Range to replace, in the document as it is after the user's edit.
    pub range: Range<usize>,
    /// Replacement text.
    pub text: String,
    /// Where the cursor goes once the edit is applied.
    pub cursor: usize,
}

/// Remembers the opener it completed last, so that typing the second character of a
/// multi-character opener (e.g. `-` after `{` in `{-`) does not complete a second time.
#[derive(Debug, Clone, Default)]
pub struct TokenCompletion {
    last_completed: Option<Token>,
}

impl TokenCompletion {
    /// Create an assistant with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last completed opener.
    pub fn reset(&mut self) {
        self.last_completed = None;
    }

    /// React to `inserted` having been inserted at `at`.
    ///
    /// `tokens` are the tokens (absolute offsets) of the line containing `at`, after the
    /// insertion; `following` is the text behind the inserted character up to the end of its line.
    pub fn after_insertion(
        &mut self,
        inserted: &str,
        at: usize,
        tokens: &[Token],
        following: &str,
        grammar: &Grammar,
    ) -> Option<CompletionEdit> {
        let mut chars = inserted.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            self.reset();
            return None;
        };
        let previous = self.last_completed.take();

        if ch == '\n' {
            let opener = previous.filter(|token| token.range.end == at)?;
            let closer = match opener.kind {
                TokenKind::CurlyBracketOpen => BracketFamily::Curly.lexemes().1,
                TokenKind::NestedCommentOpen => grammar.nested_comment()?.1,
                _ => return None,
            };
            return following.starts_with(closer).then(|| CompletionEdit {
                range: at + 1..at + 1,
                text: "\n".to_string(),
                cursor: at + 1,
            });
        }

        let opener = tokens
            .iter()
            .find(|token| token.range.end == at + 1 && token.kind.is_opening())?;
        if previous.is_some_and(|previous| previous.overlaps(opener)) {
            return None;
        }
        let closer = closing_lexeme(opener.kind, grammar)?;

        tracing::trace!(?opener, closer, "completing opener");
        self.last_completed = Some(opener.clone());
        Some(CompletionEdit {
            range: at + 1..at + 1,
            text: closer.to_string(),
            cursor: at + 1,
        })
    }

    /// React to `deleted` having been removed at `at`.
    ///
    /// `token_at` is the token starting at `at` after the deletion. Deleting an opening bracket
    /// that was directly followed by its closing bracket removes the closing bracket as well.
    pub fn after_deletion(
        &mut self,
        deleted: &str,
        at: usize,
        token_at: Option<&Token>,
    ) -> Option<CompletionEdit> {
        self.reset();
        let closing = match deleted {
            "(" => TokenKind::RoundBracketClose,
            "[" => TokenKind::SquareBracketClose,
            "{" => TokenKind::CurlyBracketClose,
            _ => return None,
        };
        let token = token_at?;
        (token.kind == closing && token.range == (at..at + 1)).then(|| CompletionEdit {
            range: at..at + 1,
            text: String::new(),
            cursor: at,
        })
    }
}

fn closing_lexeme(kind: TokenKind, grammar: &Grammar) -> Option<&str> {
    match kind {
        TokenKind::NestedCommentOpen => grammar.nested_comment().map(|(_, close)| close),
        kind => kind
            .bracket()
            .filter(|(_, opening)| *opening)
            .map(|(family, _)| family.lexemes().1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeview_lang::LanguageConfiguration;

    fn haskell() -> Grammar {
        Grammar::new(&LanguageConfiguration::haskell()).unwrap()
    }

    #[test]
    fn test_opening_bracket_gets_closed() {
        let grammar = haskell();
        let mut completion = TokenCompletion::new();
        let tokens = [
            Token::new(TokenKind::Identifier, 0..1),
            Token::new(TokenKind::SquareBracketOpen, 1..2),
        ];

        let edit = completion.after_insertion("[", 1, &tokens, "", &grammar);
        assert_eq!(
            edit,
            Some(CompletionEdit {
                range: 2..2,
                text: "]".to_string(),
                cursor: 2,
            })
        );
    }

    #[test]
    fn test_second_character_of_opener_does_not_complete_again() {
        let grammar = haskell();
        let mut completion = TokenCompletion::new();

        let curly = [Token::new(TokenKind::CurlyBracketOpen, 0..1)];
        assert!(
            completion
                .after_insertion("{", 0, &curly, "", &grammar)
                .is_some()
        );

        let comment = [Token::new(TokenKind::NestedCommentOpen, 0..2)];
        assert_eq!(completion.after_insertion("-", 1, &comment, "}", &grammar), None);
    }

    #[test]
    fn test_nested_comment_open_gets_closed() {
        let grammar = haskell();
        let mut completion = TokenCompletion::new();
        let tokens = [Token::new(TokenKind::NestedCommentOpen, 4..6)];

        let edit = completion
            .after_insertion("-", 5, &tokens, "", &grammar)
            .unwrap();
        assert_eq!(edit.text, "-}");
        assert_eq!(edit.range, 6..6);
    }

    #[test]
    fn test_newline_between_completed_braces() {
        let grammar = haskell();
        let mut completion = TokenCompletion::new();
        let tokens = [Token::new(TokenKind::CurlyBracketOpen, 0..1)];
        completion.after_insertion("{", 0, &tokens, "", &grammar);

        let edit = completion.after_insertion("\n", 1, &[], "}", &grammar);
        assert_eq!(
            edit,
            Some(CompletionEdit {
                range: 2..2,
                text: "\n".to_string(),
                cursor: 2,
            })
        );

        // The opener is consumed by the first newline.
        assert_eq!(completion.after_insertion("\n", 2, &[], "}", &grammar), None);
    }

    #[test]
    fn test_multi_character_insertions_are_ignored() {
        let grammar = haskell();
        let mut completion = TokenCompletion::new();
        let tokens = [Token::new(TokenKind::RoundBracketOpen, 1..2)];
        assert_eq!(completion.after_insertion("x(", 0, &tokens, "", &grammar), None);
        assert_eq!(completion.after_insertion("", 0, &tokens, "", &grammar), None);
    }

    #[test]
    fn test_paired_deletion() {
        let mut completion = TokenCompletion::new();
        let close = Token::new(TokenKind::RoundBracketClose, 3..4);

        assert_eq!(
            completion.after_deletion("(", 3, Some(&close)),
            Some(CompletionEdit {
                range: 3..4,
                text: String::new(),
                cursor: 3,
            })
        );
        assert_eq!(completion.after_deletion("[", 3, Some(&close)), None);
        assert_eq!(completion.after_deletion("((", 3, Some(&close)), None);
        assert_eq!(completion.after_deletion("(", 3, None), None);
    }
}
