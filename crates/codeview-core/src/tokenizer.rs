//! Line-oriented, rule-based tokenizer.
//!
//! [`tokenize`] converts the text of one line into an ordered list of [`Token`]s, given the
//! state the previous line ended in. It is a pure function of its inputs, which is what allows
//! the driver to re-run it on any single line and rely on the result matching a full scan.

use codeview_lang::Grammar;
use std::ops::Range;

/// Bracket families tracked by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BracketFamily {
    /// `(` and `)`.
    Round,
    /// `[` and `]`.
    Square,
    /// `{` and `}`.
    Curly,
}

impl BracketFamily {
    /// Opening and closing lexemes.
    pub fn lexemes(self) -> (&'static str, &'static str) {
        match self {
            BracketFamily::Round => ("(", ")"),
            BracketFamily::Square => ("[", "]"),
            BracketFamily::Curly => ("{", "}"),
        }
    }
}

/// Token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `(`
    RoundBracketOpen,
    /// `)`
    RoundBracketClose,
    /// `[`
    SquareBracketOpen,
    /// `]`
    SquareBracketClose,
    /// `{`
    CurlyBracketOpen,
    /// `}`
    CurlyBracketClose,
    /// String literal.
    String,
    /// Character literal.
    Character,
    /// Numeric literal.
    Number,
    /// Single-line comment, from its marker to the end of the line.
    SingleLineComment,
    /// Nested comment opening delimiter.
    NestedCommentOpen,
    /// Nested comment closing delimiter.
    NestedCommentClose,
    /// Identifier.
    Identifier,
    /// Reserved word.
    Keyword,
    /// Anything else (operators, punctuation).
    Plain,
}

impl TokenKind {
    /// Bracket family and whether this is the opening side.
    pub fn bracket(self) -> Option<(BracketFamily, bool)> {
        match self {
            TokenKind::RoundBracketOpen => Some((BracketFamily::Round, true)),
            TokenKind::RoundBracketClose => Some((BracketFamily::Round, false)),
            TokenKind::SquareBracketOpen => Some((BracketFamily::Square, true)),
            TokenKind::SquareBracketClose => Some((BracketFamily::Square, false)),
            TokenKind::CurlyBracketOpen => Some((BracketFamily::Curly, true)),
            TokenKind::CurlyBracketClose => Some((BracketFamily::Curly, false)),
            _ => None,
        }
    }

    /// The counterpart of a bracket or nested comment delimiter.
    pub fn matching(self) -> Option<TokenKind> {
        match self {
            TokenKind::RoundBracketOpen => Some(TokenKind::RoundBracketClose),
            TokenKind::RoundBracketClose => Some(TokenKind::RoundBracketOpen),
            TokenKind::SquareBracketOpen => Some(TokenKind::SquareBracketClose),
            TokenKind::SquareBracketClose => Some(TokenKind::SquareBracketOpen),
            TokenKind::CurlyBracketOpen => Some(TokenKind::CurlyBracketClose),
            TokenKind::CurlyBracketClose => Some(TokenKind::CurlyBracketOpen),
            TokenKind::NestedCommentOpen => Some(TokenKind::NestedCommentClose),
            TokenKind::NestedCommentClose => Some(TokenKind::NestedCommentOpen),
            _ => None,
        }
    }

    /// Whether this token opens a bracketed region or a nested comment.
    pub fn is_opening(self) -> bool {
        matches!(
            self,
            TokenKind::RoundBracketOpen
                | TokenKind::SquareBracketOpen
                | TokenKind::CurlyBracketOpen
                | TokenKind::NestedCommentOpen
        )
    }
}

/// A classified span of a line. `range` is in chars, relative to the start of the line (or to
/// the start of the document once placed by the caller, see [`Token::offset_by`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Classification.
    pub kind: TokenKind,
    /// Char range.
    pub range: Range<usize>,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, range: Range<usize>) -> Self {
        Self { kind, range }
    }

    /// The same token, shifted by `offset` chars.
    pub fn offset_by(&self, offset: usize) -> Self {
        Self {
            kind: self.kind,
            range: self.range.start + offset..self.range.end + offset,
        }
    }

    /// Whether two tokens share at least one character.
    pub fn overlaps(&self, other: &Token) -> bool {
        self.range.start < other.range.end && other.range.start < self.range.end
    }
}

/// State threaded from one line to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenizerState {
    /// Scanning code.
    #[default]
    Code,
    /// Inside `depth` (> 0) levels of nested comments.
    NestedComment {
        /// Nesting depth.
        depth: usize,
    },
}

impl TokenizerState {
    /// State for a given comment nesting depth.
    pub fn from_depth(depth: usize) -> Self {
        if depth == 0 {
            TokenizerState::Code
        } else {
            TokenizerState::NestedComment { depth }
        }
    }

    /// Comment nesting depth (0 when scanning code).
    pub fn depth(self) -> usize {
        match self {
            TokenizerState::Code => 0,
            TokenizerState::NestedComment { depth } => depth,
        }
    }
}

/// Tokenize one line (without its terminator).
///
/// At each position the first matching rule wins, in this order: nested comment open,
/// single-line comment, string, character, number, non-identifier reserved word, identifier or
/// keyword, bracket. Inside a nested comment only the comment delimiters are recognised; the
/// other characters are consumed without producing tokens. Characters no rule accepts are
/// collected into [`TokenKind::Plain`] tokens; whitespace yields no token at all.
pub fn tokenize(
    line: &str,
    state: TokenizerState,
    grammar: &Grammar,
) -> (TokenizerState, Vec<Token>) {
    let mut scanner = Scanner {
        line,
        byte: 0,
        char: 0,
        tokens: Vec::new(),
        plain_start: None,
    };
    let mut depth = state.depth();
    let nested = grammar.nested_comment();

    while scanner.byte < line.len() {
        let rest = &line[scanner.byte..];

        if depth > 0 {
            match nested {
                Some((_, close)) if rest.starts_with(close) => {
                    scanner.emit(TokenKind::NestedCommentClose, close.len());
                    depth -= 1;
                }
                Some((open, _)) if rest.starts_with(open) => {
                    scanner.emit(TokenKind::NestedCommentOpen, open.len());
                    depth += 1;
                }
                _ => scanner.skip_char(),
            }
            continue;
        }

        if let Some((open, _)) = nested
            && rest.starts_with(open)
        {
            scanner.emit(TokenKind::NestedCommentOpen, open.len());
            depth += 1;
            continue;
        }

        if let Some(marker) = grammar.single_line_comment()
            && rest.starts_with(marker)
        {
            scanner.emit(TokenKind::SingleLineComment, rest.len());
            break;
        }

        if let Some((kind, len)) = match_code(line, scanner.byte, grammar) {
            scanner.emit(kind, len);
            continue;
        }

        if rest.starts_with(char::is_whitespace) {
            scanner.skip_char();
        } else {
            scanner.plain_char();
        }
    }

    (TokenizerState::from_depth(depth), scanner.finish())
}

/// Match a code token starting at byte `at`. Patterns see the whole line, so assertions like
/// `\b` take the preceding text into account.
fn match_code(line: &str, at: usize, grammar: &Grammar) -> Option<(TokenKind, usize)> {
    if let Some(len) = grammar.match_string(line, at) {
        return Some((TokenKind::String, len));
    }
    if let Some(len) = grammar.match_character(line, at) {
        return Some((TokenKind::Character, len));
    }
    if let Some(len) = grammar.match_number(line, at) {
        return Some((TokenKind::Number, len));
    }
    if let Some(len) = grammar.match_reserved_literal(line, at) {
        return Some((TokenKind::Keyword, len));
    }
    if let Some(len) = grammar.match_identifier(line, at) {
        let kind = if grammar.is_reserved(&line[at..at + len]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        return Some((kind, len));
    }

    let kind = match line.as_bytes().get(at)? {
        b'(' => TokenKind::RoundBracketOpen,
        b')' => TokenKind::RoundBracketClose,
        b'[' => TokenKind::SquareBracketOpen,
        b']' => TokenKind::SquareBracketClose,
        b'{' => TokenKind::CurlyBracketOpen,
        b'}' => TokenKind::CurlyBracketClose,
        _ => return None,
    };
    Some((kind, 1))
}

struct Scanner<'a> {
    line: &'a str,
    byte: usize,
    char: usize,
    tokens: Vec<Token>,
    plain_start: Option<usize>,
}

impl Scanner<'_> {
    /// Emit a token covering the next `len` bytes.
    fn emit(&mut self, kind: TokenKind, len: usize) {
        self.flush_plain();
        let end_byte = self.byte + len;
        let chars = self.line[self.byte..end_byte].chars().count();
        self.tokens
            .push(Token::new(kind, self.char..self.char + chars));
        self.byte = end_byte;
        self.char += chars;
    }

    fn skip_char(&mut self) {
        self.flush_plain();
        self.advance_char();
    }

    fn plain_char(&mut self) {
        if self.plain_start.is_none() {
            self.plain_start = Some(self.char);
        }
        self.advance_char();
    }

    fn advance_char(&mut self) {
        let width = self.line[self.byte..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.byte += width;
        self.char += 1;
    }

    fn flush_plain(&mut self) {
        if let Some(start) = self.plain_start.take() {
            self.tokens.push(Token::new(TokenKind::Plain, start..self.char));
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_plain();
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeview_lang::{LanguageConfiguration, NestedComment};
    use pretty_assertions::assert_eq;

    fn c_like() -> Grammar {
        Grammar::new(&LanguageConfiguration {
            name: "C-like".to_string(),
            string_regexp: Some(r#""(?:\\.|[^"\\])*""#.to_string()),
            character_regexp: Some(r"'(?:\\.|[^'\\])'".to_string()),
            number_regexp: Some(r"[0-9]+(?:\.[0-9]+)?".to_string()),
            single_line_comment: Some("//".to_string()),
            nested_comment: Some(NestedComment::new("/*", "*/")),
            identifier_regexp: Some(r"[A-Za-z_][A-Za-z0-9_]*".to_string()),
            reserved_identifiers: vec!["let".to_string(), "fn".to_string()],
        })
        .unwrap()
    }

    fn kinds(tokens: &[Token]) -> Vec<(TokenKind, Range<usize>)> {
        tokens.iter().map(|t| (t.kind, t.range.clone())).collect()
    }

    #[test]
    fn test_basic_line() {
        let (state, tokens) = tokenize("let x = f(42, \"a)\");", TokenizerState::Code, &c_like());

        assert_eq!(state, TokenizerState::Code);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Keyword, 0..3),
                (TokenKind::Identifier, 4..5),
                (TokenKind::Plain, 6..7),
                (TokenKind::Identifier, 8..9),
                (TokenKind::RoundBracketOpen, 9..10),
                (TokenKind::Number, 10..12),
                (TokenKind::Plain, 12..13),
                (TokenKind::String, 14..18),
                (TokenKind::RoundBracketClose, 18..19),
                (TokenKind::Plain, 19..20),
            ]
        );
    }

    #[test]
    fn test_single_line_comment_stops_scanning() {
        let (state, tokens) = tokenize("foo() // bar(", TokenizerState::Code, &c_like());

        assert_eq!(state, TokenizerState::Code);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Identifier, 0..3),
                (TokenKind::RoundBracketOpen, 3..4),
                (TokenKind::RoundBracketClose, 4..5),
                (TokenKind::SingleLineComment, 6..13),
            ]
        );
    }

    #[test]
    fn test_nested_comment_depth() {
        let (state, tokens) = tokenize("a /* b /* c */ d */ e", TokenizerState::Code, &c_like());

        assert_eq!(state, TokenizerState::Code);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Identifier, 0..1),
                (TokenKind::NestedCommentOpen, 2..4),
                (TokenKind::NestedCommentOpen, 7..9),
                (TokenKind::NestedCommentClose, 12..14),
                (TokenKind::NestedCommentClose, 17..19),
                (TokenKind::Identifier, 20..21),
            ]
        );
    }

    #[test]
    fn test_unclosed_comment_carries_state() {
        let grammar = c_like();
        let (state, _) = tokenize("x /* (", TokenizerState::Code, &grammar);
        assert_eq!(state, TokenizerState::NestedComment { depth: 1 });

        // Inside the comment brackets and comment markers are opaque.
        let (state, tokens) = tokenize("[ // ] */ (", state, &grammar);
        assert_eq!(state, TokenizerState::Code);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::NestedCommentClose, 7..9),
                (TokenKind::RoundBracketOpen, 10..11),
            ]
        );
    }

    #[test]
    fn test_stray_close_is_plain_in_code() {
        let (state, tokens) = tokenize("*/", TokenizerState::Code, &c_like());
        assert_eq!(state, TokenizerState::Code);
        assert_eq!(kinds(&tokens), vec![(TokenKind::Plain, 0..2)]);
    }

    #[test]
    fn test_offsets_are_chars() {
        let (_, tokens) = tokenize("\"héllo\" (ü)", TokenizerState::Code, &c_like());
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::String, 0..7),
                (TokenKind::RoundBracketOpen, 8..9),
                (TokenKind::Plain, 9..10),
                (TokenKind::RoundBracketClose, 10..11),
            ]
        );
    }

    #[test]
    fn test_none_grammar_only_brackets() {
        let (_, tokens) = tokenize("f(x) // y", TokenizerState::Code, &Grammar::none());
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Plain, 0..1),
                (TokenKind::RoundBracketOpen, 1..2),
                (TokenKind::Plain, 2..3),
                (TokenKind::RoundBracketClose, 3..4),
                (TokenKind::Plain, 5..7),
                (TokenKind::Plain, 8..9),
            ]
        );
    }

    #[test]
    fn test_word_boundary_inside_a_word() {
        let grammar = Grammar::new(&LanguageConfiguration {
            identifier_regexp: Some("[a-z]+".to_string()),
            number_regexp: Some(r"\b[0-9]+".to_string()),
            ..LanguageConfiguration::none()
        })
        .unwrap();

        let (_, tokens) = tokenize("ab12 ab 12", TokenizerState::Code, &grammar);
        assert_eq!(
            kinds(&tokens),
            vec![
                (TokenKind::Identifier, 0..2),
                (TokenKind::Plain, 2..4),
                (TokenKind::Identifier, 5..7),
                (TokenKind::Number, 8..10),
            ]
        );
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let grammar = c_like();
        let line = "fn f() { /* x */ 'c' }";
        assert_eq!(
            tokenize(line, TokenizerState::Code, &grammar),
            tokenize(line, TokenizerState::Code, &grammar)
        );
    }
}
