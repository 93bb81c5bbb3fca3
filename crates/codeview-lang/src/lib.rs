#![warn(missing_docs)]
//! `codeview-lang` - data-driven language configuration for `codeview-core`.
//!
//! A [`LanguageConfiguration`] describes the lexical structure of a language with a handful of
//! regexes and literal lexemes. It is compiled into a [`Grammar`] once per opened language; the
//! compiled grammar is immutable and meant to be shared (`Arc<Grammar>`) by every editor session
//! using that language. Malformed patterns are reported as [`GrammarError`] at compile time, never
//! while tokenizing.

mod config;
mod error;
mod grammar;

pub use config::{LanguageConfiguration, NestedComment};
pub use error::GrammarError;
pub use grammar::Grammar;
