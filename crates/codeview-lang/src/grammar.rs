//! Compiled lexical grammar.

use crate::config::{LanguageConfiguration, NestedComment};
use crate::error::GrammarError;
use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};
use std::collections::HashSet;

/// The compiled, immutable form of a [`LanguageConfiguration`].
///
/// All patterns are validated and compiled up front, so matching against a grammar can only
/// succeed or miss. Patterns are anchored: a match must start exactly at the scan position, but
/// assertions such as `\b` and `^` still see the text before it.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    string: Option<Regex>,
    character: Option<Regex>,
    number: Option<Regex>,
    identifier: Option<Regex>,
    single_line_comment: Option<String>,
    nested_comment: Option<NestedComment>,
    reserved: HashSet<String>,
    /// Reserved words the identifier pattern cannot produce, longest first.
    reserved_literals: Vec<String>,
}

impl Grammar {
    /// Compile a configuration.
    pub fn new(config: &LanguageConfiguration) -> Result<Self, GrammarError> {
        let string = compile("stringRegexp", config.string_regexp.as_deref())?;
        let character = compile("characterRegexp", config.character_regexp.as_deref())?;
        let number = compile("numberRegexp", config.number_regexp.as_deref())?;
        let identifier = compile("identifierRegexp", config.identifier_regexp.as_deref())?;

        let single_line_comment = config
            .single_line_comment
            .clone()
            .filter(|marker| !marker.is_empty());

        let nested_comment = match &config.nested_comment {
            Some(pair) if pair.open.is_empty() && pair.close.is_empty() => None,
            Some(pair) if pair.open.is_empty() || pair.close.is_empty() => {
                return Err(GrammarError::InvalidLexeme {
                    field: "nestedComment",
                    reason: "both delimiters must be given",
                });
            }
            Some(pair) if pair.open == pair.close => {
                return Err(GrammarError::InvalidLexeme {
                    field: "nestedComment",
                    reason: "open and close delimiters must differ",
                });
            }
            Some(pair) => Some(pair.clone()),
            None => None,
        };

        let mut reserved = HashSet::new();
        let mut reserved_literals = Vec::new();
        for word in &config.reserved_identifiers {
            if word.is_empty() {
                continue;
            }
            if word.chars().any(char::is_whitespace) {
                return Err(GrammarError::InvalidLexeme {
                    field: "reservedIdentifiers",
                    reason: "reserved words must not contain whitespace",
                });
            }
            let is_identifier = anchored(identifier.as_ref(), word, 0) == Some(word.len());
            if !is_identifier {
                reserved_literals.push(word.clone());
            }
            reserved.insert(word.clone());
        }
        reserved_literals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        reserved_literals.dedup();

        tracing::debug!(
            language = %config.name,
            reserved = reserved.len(),
            literal_reserved = reserved_literals.len(),
            "compiled grammar"
        );

        Ok(Self {
            name: config.name.clone(),
            string,
            character,
            number,
            identifier,
            single_line_comment,
            nested_comment,
            reserved,
            reserved_literals,
        })
    }

    /// A grammar that recognises nothing.
    pub fn none() -> Self {
        Self {
            name: "Text".to_string(),
            string: None,
            character: None,
            number: None,
            identifier: None,
            single_line_comment: None,
            nested_comment: None,
            reserved: HashSet::new(),
            reserved_literals: Vec::new(),
        }
    }

    /// Language name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if this grammar produces no tokens other than brackets and plain text.
    pub fn is_none(&self) -> bool {
        self.string.is_none()
            && self.character.is_none()
            && self.number.is_none()
            && self.identifier.is_none()
            && self.single_line_comment.is_none()
            && self.nested_comment.is_none()
            && self.reserved.is_empty()
    }

    /// Single-line comment marker.
    pub fn single_line_comment(&self) -> Option<&str> {
        self.single_line_comment.as_deref()
    }

    /// Nested comment delimiters as `(open, close)`.
    pub fn nested_comment(&self) -> Option<(&str, &str)> {
        self.nested_comment
            .as_ref()
            .map(|pair| (pair.open.as_str(), pair.close.as_str()))
    }

    /// Byte length of the string literal starting at byte `at` of `line`.
    pub fn match_string(&self, line: &str, at: usize) -> Option<usize> {
        anchored(self.string.as_ref(), line, at)
    }

    /// Byte length of the character literal starting at byte `at` of `line`.
    pub fn match_character(&self, line: &str, at: usize) -> Option<usize> {
        anchored(self.character.as_ref(), line, at)
    }

    /// Byte length of the number starting at byte `at` of `line`.
    pub fn match_number(&self, line: &str, at: usize) -> Option<usize> {
        anchored(self.number.as_ref(), line, at)
    }

    /// Byte length of the identifier starting at byte `at` of `line`.
    pub fn match_identifier(&self, line: &str, at: usize) -> Option<usize> {
        anchored(self.identifier.as_ref(), line, at)
    }

    /// Byte length of a reserved word starting at byte `at` of `line` that the identifier
    /// pattern would not produce on its own (e.g. `#if`).
    ///
    /// The word must not run on into an identifier character.
    pub fn match_reserved_literal(&self, line: &str, at: usize) -> Option<usize> {
        let rest = line.get(at..)?;
        self.reserved_literals
            .iter()
            .find(|word| {
                rest.starts_with(word.as_str())
                    && !rest[word.len()..]
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_alphanumeric() || c == '_')
            })
            .map(|word| word.len())
    }

    /// Whether `word` is reserved.
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(word)
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::none()
    }
}

impl TryFrom<&LanguageConfiguration> for Grammar {
    type Error = GrammarError;

    fn try_from(config: &LanguageConfiguration) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

fn compile(field: &'static str, pattern: Option<&str>) -> Result<Option<Regex>, GrammarError> {
    let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let regex = Regex::new(pattern).map_err(|source| GrammarError::InvalidRegex {
        field,
        pattern: pattern.to_string(),
        source,
    })?;

    if regex.is_match(Input::new("").anchored(Anchored::Yes)) {
        return Err(GrammarError::EmptyMatch {
            field,
            pattern: pattern.to_string(),
        });
    }

    Ok(Some(regex))
}

fn anchored(regex: Option<&Regex>, line: &str, at: usize) -> Option<usize> {
    let regex = regex?;
    if at > line.len() {
        return None;
    }
    // Zero-width matches (e.g. a lone `\b`) are treated as misses.
    regex
        .find(Input::new(line).range(at..).anchored(Anchored::Yes))
        .map(|m| m.len())
        .filter(|&len| len > 0)
}
