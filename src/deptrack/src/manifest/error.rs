//! Manifest parsing error types.

use thiserror::Error;

/// Errors that can occur while parsing a dependency manifest.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The vendor-lock document is not valid JSON for the expected shape.
    #[error("Invalid vendor.json: {0}")]
    Json(#[from] serde_json::Error),

    /// The go.mod document is not valid UTF-8.
    #[error("go.mod is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The go.mod document violates the module file grammar.
    #[error("go.mod:{line}: {message}")]
    GoMod { line: usize, message: String },
}

impl ParseError {
    pub(crate) fn go_mod(line: usize, message: impl Into<String>) -> Self {
        Self::GoMod {
            line,
            message: message.into(),
        }
    }
}
