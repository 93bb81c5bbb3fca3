//! Data-driven language configuration.
//!
//! A [`LanguageConfiguration`] is plain data: regex sources and literal lexemes. Hosts typically
//! ship them as JSON next to their themes, or use one of the presets below. It is compiled into a
//! [`Grammar`](crate::Grammar) once per opened language.

use crate::error::GrammarError;
use serde::{Deserialize, Serialize};

/// Nested (block) comment delimiters, e.g. `/*` and `*/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedComment {
    /// Opening lexeme.
    pub open: String,
    /// Closing lexeme.
    pub close: String,
}

impl NestedComment {
    /// Create a delimiter pair.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Lexical rules of a language.
///
/// Every field is optional. A configuration with all fields empty (see [`Self::none`]) is valid
/// and disables highlighting altogether.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageConfiguration {
    /// Human-readable language name.
    pub name: String,
    /// String literal pattern.
    pub string_regexp: Option<String>,
    /// Character literal pattern.
    pub character_regexp: Option<String>,
    /// Numeric literal pattern.
    pub number_regexp: Option<String>,
    /// Single-line comment marker (e.g. `//`).
    pub single_line_comment: Option<String>,
    /// Nested comment delimiters.
    pub nested_comment: Option<NestedComment>,
    /// Identifier pattern.
    pub identifier_regexp: Option<String>,
    /// Reserved words, highlighted as keywords.
    pub reserved_identifiers: Vec<String>,
}

impl LanguageConfiguration {
    /// The empty configuration: no highlighting.
    pub fn none() -> Self {
        Self {
            name: "Text".to_string(),
            ..Self::default()
        }
    }

    /// Load a configuration from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self, GrammarError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Swift.
    pub fn swift() -> Self {
        Self {
            name: "Swift".to_string(),
            string_regexp: Some(r#""(?:\\.|[^"\\])*""#.to_string()),
            character_regexp: None,
            number_regexp: Some(
                r"(?:0b[01][01_]*|0o[0-7][0-7_]*|0x[0-9a-fA-F][0-9a-fA-F_]*|[0-9][0-9_]*(?:\.[0-9][0-9_]*)?(?:[eE][+-]?[0-9][0-9_]*)?)"
                    .to_string(),
            ),
            single_line_comment: Some("//".to_string()),
            nested_comment: Some(NestedComment::new("/*", "*/")),
            identifier_regexp: Some(r"[\p{L}_][\p{L}\p{N}_]*".to_string()),
            reserved_identifiers: words(&[
                "actor", "associatedtype", "async", "await", "break", "case", "catch", "class",
                "continue", "default", "defer", "deinit", "do", "else", "enum", "extension",
                "fallthrough", "false", "fileprivate", "for", "func", "guard", "if", "import",
                "in", "init", "inout", "internal", "is", "let", "nil", "open", "operator",
                "private", "protocol", "public", "repeat", "rethrows", "return", "self", "Self",
                "static", "struct", "subscript", "super", "switch", "throw", "throws", "true",
                "try", "typealias", "var", "where", "while", "#if", "#else", "#elseif",
                "#endif", "#available", "#selector",
            ]),
        }
    }

    /// Haskell.
    pub fn haskell() -> Self {
        Self {
            name: "Haskell".to_string(),
            string_regexp: Some(r#""(?:\\.|[^"\\])*""#.to_string()),
            character_regexp: Some(r"'(?:\\.|[^'\\])'".to_string()),
            number_regexp: Some(
                r"(?:0[xX][0-9a-fA-F]+|0[oO][0-7]+|[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?)"
                    .to_string(),
            ),
            single_line_comment: Some("--".to_string()),
            nested_comment: Some(NestedComment::new("{-", "-}")),
            identifier_regexp: Some(r"[\p{L}_][\p{L}\p{N}_']*".to_string()),
            reserved_identifiers: words(&[
                "case", "class", "data", "default", "deriving", "do", "else", "foreign", "if",
                "import", "in", "infix", "infixl", "infixr", "instance", "let", "module",
                "newtype", "of", "then", "type", "where",
            ]),
        }
    }
}

fn words(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}
