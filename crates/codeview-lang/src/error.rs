use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or compiling a [`LanguageConfiguration`](crate::LanguageConfiguration).
///
/// All of these are configuration errors: they surface once, when a grammar is built, and never
/// from a tokenization pass.
pub enum GrammarError {
    #[error("JSON parse error: {0}")]
    /// The configuration document could not be deserialized.
    Json(#[from] serde_json::Error),

    #[error("regex compile error in '{field}' for pattern '{pattern}': {source}")]
    /// A regex field failed to compile.
    InvalidRegex {
        /// Name of the configuration field.
        field: &'static str,
        /// The offending pattern.
        pattern: String,
        /// The compiler error.
        #[source]
        source: regex_automata::meta::BuildError,
    },

    #[error("pattern in '{field}' can match the empty string: '{pattern}'")]
    /// A regex field accepts the empty string, which would produce zero-width tokens.
    EmptyMatch {
        /// Name of the configuration field.
        field: &'static str,
        /// The offending pattern.
        pattern: String,
    },

    #[error("invalid lexeme in '{field}': {reason}")]
    /// A literal lexeme (comment delimiter, reserved word) is unusable.
    InvalidLexeme {
        /// Name of the configuration field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
