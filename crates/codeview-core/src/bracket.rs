//! Bracket matching over the token stream.

use crate::tokenizer::{Token, TokenKind};
use std::ops::Range;

/// Line-by-line access to the tokens of a document, with absolute char offsets.
pub trait LineTokens {
    /// Number of lines.
    fn line_count(&self) -> usize;

    /// Char range of `line`, including its terminator.
    fn line_range(&self, line: usize) -> Option<Range<usize>>;

    /// Line containing `offset`.
    fn line_of(&self, offset: usize) -> Option<usize>;

    /// Tokens of `line`, in order.
    fn tokens_of_line(&self, line: usize) -> Vec<Token>;
}

/// Find the bracket matching the bracket token starting at `location`.
///
/// Scans forward from an opening bracket and backward from a closing one, without leaving
/// `search_range`. Brackets inside strings and comments are not tokens and are therefore never
/// matched. Returns `None` if `location` is not a bracket or no match lies within the range.
pub fn matching_bracket<S: LineTokens + ?Sized>(
    source: &S,
    location: usize,
    search_range: Range<usize>,
) -> Option<Range<usize>> {
    let mut line = source.line_of(location)?;
    let mut tokens = source.tokens_of_line(line);
    let index = tokens
        .iter()
        .position(|token| token.range.start == location)?;
    let kind = tokens[index].kind;
    let (_, opening) = kind.bracket()?;
    let counterpart = kind.matching()?;
    let mut nesting = Nesting {
        kind,
        counterpart,
        depth: 1,
    };

    if opening {
        let mut current = tokens.split_off(index + 1);
        loop {
            for token in &current {
                if token.range.end > search_range.end {
                    return None;
                }
                if nesting.step(token) {
                    return Some(token.range.clone());
                }
            }
            line += 1;
            let range = source.line_range(line)?;
            if range.start >= search_range.end {
                return None;
            }
            current = source.tokens_of_line(line);
        }
    } else {
        tokens.truncate(index);
        let mut current = tokens;
        loop {
            for token in current.iter().rev() {
                if token.range.start < search_range.start {
                    return None;
                }
                if nesting.step(token) {
                    return Some(token.range.clone());
                }
            }
            if line == 0 {
                return None;
            }
            line -= 1;
            let range = source.line_range(line)?;
            if range.end <= search_range.start {
                return None;
            }
            current = source.tokens_of_line(line);
        }
    }
}

struct Nesting {
    kind: TokenKind,
    counterpart: TokenKind,
    depth: usize,
}

impl Nesting {
    /// Account for `token`; returns `true` when it closes the bracket being matched.
    fn step(&mut self, token: &Token) -> bool {
        if token.kind == self.kind {
            self.depth += 1;
        } else if token.kind == self.counterpart {
            self.depth -= 1;
            return self.depth == 0;
        }
        false
    }
}
