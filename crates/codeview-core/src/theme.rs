//! Themes: token categories to colors.
//!
//! Colors are looked up through an exhaustive `match` on [`TokenCategory`]; there is no
//! string-keyed access and therefore no "unknown color" failure at runtime.

use crate::tokenizer::TokenKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading a [`Theme`].
pub enum ThemeError {
    #[error("invalid color '{0}' (expected #rrggbb or #rrggbbaa)")]
    /// A color string could not be parsed.
    InvalidColor(String),

    #[error("JSON parse error: {0}")]
    /// The theme document could not be deserialized.
    Json(#[from] serde_json::Error),
}

/// Highlighting category of a character, derived from its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    /// Default text (including brackets and punctuation).
    Text,
    /// Reserved words.
    Keyword,
    /// Identifiers.
    Identifier,
    /// String literals.
    String,
    /// Character literals.
    Character,
    /// Numeric literals.
    Number,
    /// Comments.
    Comment,
}

impl From<TokenKind> for TokenCategory {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Keyword => TokenCategory::Keyword,
            TokenKind::Identifier => TokenCategory::Identifier,
            TokenKind::String => TokenCategory::String,
            TokenKind::Character => TokenCategory::Character,
            TokenKind::Number => TokenCategory::Number,
            TokenKind::SingleLineComment
            | TokenKind::NestedCommentOpen
            | TokenKind::NestedCommentClose => TokenCategory::Comment,
            TokenKind::RoundBracketOpen
            | TokenKind::RoundBracketClose
            | TokenKind::SquareBracketOpen
            | TokenKind::SquareBracketClose
            | TokenKind::CurlyBracketOpen
            | TokenKind::CurlyBracketClose
            | TokenKind::Plain => TokenCategory::Text,
        }
    }
}

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// An opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }
}

impl FromStr for Color {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ThemeError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 0xff },
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ThemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Colors used to render highlighted code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Theme name.
    pub name: String,
    /// Editor background.
    pub background: Color,
    /// Default text.
    pub text: Color,
    /// Comments.
    pub comment: Color,
    /// String literals.
    pub string: Color,
    /// Character literals.
    pub character: Color,
    /// Numeric literals.
    pub number: Color,
    /// Identifiers.
    pub identifier: Color,
    /// Reserved words.
    pub keyword: Color,
}

impl Theme {
    /// Foreground color of a category.
    pub fn color(&self, category: TokenCategory) -> Color {
        match category {
            TokenCategory::Text => self.text,
            TokenCategory::Keyword => self.keyword,
            TokenCategory::Identifier => self.identifier,
            TokenCategory::String => self.string,
            TokenCategory::Character => self.character,
            TokenCategory::Number => self.number,
            TokenCategory::Comment => self.comment,
        }
    }

    /// Load a theme from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ThemeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Light default theme.
    pub fn default_light() -> Self {
        Self {
            name: "Default (Light)".to_string(),
            background: Color::rgb(0xff, 0xff, 0xff),
            text: Color::rgb(0x00, 0x00, 0x00),
            comment: Color::rgb(0x5d, 0x6c, 0x79),
            string: Color::rgb(0xc4, 0x1a, 0x16),
            character: Color::rgb(0x1c, 0x00, 0xcf),
            number: Color::rgb(0x1c, 0x00, 0xcf),
            identifier: Color::rgb(0x32, 0x6d, 0x74),
            keyword: Color::rgb(0x9b, 0x23, 0x93),
        }
    }

    /// Dark default theme.
    pub fn default_dark() -> Self {
        Self {
            name: "Default (Dark)".to_string(),
            background: Color::rgb(0x1f, 0x1f, 0x24),
            text: Color::rgb(0xff, 0xff, 0xff),
            comment: Color::rgb(0x6c, 0x79, 0x86),
            string: Color::rgb(0xfc, 0x6a, 0x5d),
            character: Color::rgb(0xd0, 0xbf, 0x69),
            number: Color::rgb(0xd0, 0xbf, 0x69),
            identifier: Color::rgb(0x67, 0xb7, 0xa4),
            keyword: Color::rgb(0xfc, 0x5f, 0xa3),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_light()
    }
}
