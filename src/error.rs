//! Structured error types for the folio engine.
//!
//! Three variants cover the real failure sources: JSON parsing of a
//! document request, an image source that cannot be resolved or decoded,
//! and rendering failures. Image errors are recoverable inside layout
//! (the image is skipped); the other two are terminal for the document.

use thiserror::Error;

/// The unified error type returned by all public folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input failed to parse as a valid document request.
    #[error("failed to parse document request: {source}\n  hint: {hint}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// An image source could not be resolved or decoded.
    #[error("image error: {0}")]
    Image(String),

    /// Layout or PDF generation failed. The whole document is discarded.
    #[error("render error: {0}")]
    Render(String),
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "check for trailing commas, missing quotes, or unescaped characters".to_string()
            }
            serde_json::error::Category::Data => {
                "the JSON is valid but doesn't match the request schema; check field names and types"
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => "input could not be read".to_string(),
        };
        FolioError::Parse { source: e, hint }
    }
}
