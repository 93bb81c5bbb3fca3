#![warn(missing_docs)]
//! Codeview Core - Syntax-Aware Text Storage
//!
//! # Overview
//!
//! `codeview-core` keeps the text of a code document in sync with its lexical structure: line
//! boundaries, tokens, nested comment state, bracket nesting and the diagnostics attached to
//! lines. It is updated incrementally on every edit; a keystroke costs the lines it touched plus
//! however many following lines change their comment state, never a full re-scan.
//!
//! Rendering is not part of this crate. A view asks a [`CodeStorage`] for the attributes of a
//! character (category, color, comment flag) and for line/column conversions through
//! [`TextAttributeSource`].
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  CodeStorage (edits, queries, completion)   │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Messages & Bracket Matching                │  ← Annotations
//! ├─────────────────────────────────────────────┤
//! │  Reprocessor (fixpoint cascade)             │  ← Incremental Driver
//! ├─────────────────────────────────────────────┤
//! │  Tokenizer + Comment/Bracket Tracker        │  ← Lexical Layer
//! ├─────────────────────────────────────────────┤
//! │  LineMap<LineInfo>                          │  ← Line Access
//! ├─────────────────────────────────────────────┤
//! │  Rope                                       │  ← Text Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use codeview_core::{CodeStorage, TextAttributeSource, Theme, TokenCategory};
//! use codeview_lang::{Grammar, LanguageConfiguration};
//!
//! let grammar = Arc::new(Grammar::new(&LanguageConfiguration::swift()).unwrap());
//! let mut storage = CodeStorage::new("let x = 1", grammar, Arc::new(Theme::default_light()));
//!
//! // Typing an opening bracket completes it; the cursor stays between the pair.
//! let outcome = storage.replace(9..9, " (").unwrap();
//! assert_eq!(outcome.completion, None);
//! let outcome = storage.replace(11..11, "(").unwrap();
//! assert_eq!(storage.text().to_string(), "let x = 1 (()");
//! assert_eq!(outcome.cursor, 12);
//!
//! let attributes = storage.attributes_at(0).unwrap();
//! assert_eq!(attributes.category, TokenCategory::Keyword);
//! assert_eq!(attributes.range, 0..3);
//! ```
//!
//! # Module Description
//!
//! - [`line_map`] - line boundaries with a per-line payload, patched after each edit
//! - [`tokenizer`] - pure, line-oriented tokenizer
//! - [`tracker`] - nested comment and bracket bookkeeping per line
//! - [`driver`] - incremental re-tokenization up to the comment-state fixpoint
//! - [`bracket`] - bracket matching over the token stream
//! - [`messages`] - diagnostics anchored to lines with stable bundle ids
//! - [`completion`] - bracket and comment pair completion
//! - [`theme`] - token categories and colors
//! - [`storage`] - the [`CodeStorage`] session
//! - [`rescan`] - debounced rescan bookkeeping

pub mod attributes;
pub mod bracket;
pub mod completion;
pub mod driver;
pub mod line_info;
pub mod line_map;
pub mod messages;
pub mod rescan;
pub mod storage;
pub mod theme;
pub mod tokenizer;
pub mod tracker;
mod text;

pub use attributes::{Position, TextAttributeSource, TextAttributes};
pub use bracket::{LineTokens, matching_bracket};
pub use completion::{CompletionEdit, TokenCompletion};
pub use driver::{DocumentTokens, ReprocessReport, Reprocessor};
pub use line_info::{LineInfo, StyleRun};
pub use line_map::{LineMap, LineMapUpdate, LineRecord};
pub use messages::{BundleId, Message, MessageBundle, MessageCategory, MessageEvent, MessageIndex};
pub use rescan::RescanScheduler;
pub use storage::{BracketBalance, CodeStorage, CodeStorageOptions, EditError, EditOutcome};
pub use theme::{Color, Theme, ThemeError, TokenCategory};
pub use tokenizer::{BracketFamily, Token, TokenKind, TokenizerState, tokenize};
pub use tracker::{LineSummary, highlight_runs, track_line};
