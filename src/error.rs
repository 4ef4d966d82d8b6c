//! Structured error types for the Maquette engine.
//!
//! User input never panics the core: parse failures carry a hint for the
//! message shown to the user, validation problems are collected as
//! [`ValidationIssue`](crate::model::ValidationIssue) lists at the edge, and
//! everything else degrades to a logged fallback.

use thiserror::Error;

/// The unified error type returned by Maquette's public API functions.
#[derive(Debug, Error)]
pub enum MaquetteError {
    /// JSON input failed to parse as a layout document, style bundle, or
    /// variables object. The hint is safe to show to the user verbatim.
    #[error("failed to parse input: {source}\n  hint: {hint}")]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// A custom font blob could not be validated or registered.
    #[error("font error: {0}")]
    Font(String),

    /// The renderer was asked for an element id that does not exist.
    #[error("unknown element: {0}")]
    UnknownElement(String),
}

impl From<serde_json::Error> for MaquetteError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "check for trailing commas, missing quotes, or unescaped characters".to_string()
            }
            serde_json::error::Category::Data => {
                "the JSON is valid but doesn't match the expected shape; check field names and types"
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => "I/O failure while reading the input".to_string(),
        };
        MaquetteError::Parse { source: e, hint }
    }
}
