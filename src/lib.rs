//! # folio
//!
//! A page-native layout engine for lab record documents.
//!
//! Most ad hoc document generators thread a global cursor through their
//! drawing code and bolt an overflow check onto every call site. folio
//! does the opposite: **the page is the fundamental unit of layout.**
//! Every placement — every wrapped text line, every screenshot, every
//! table cell — is made with the bottom content margin as a hard
//! constraint. Content flows *into* pages; nothing is sliced after the
//! fact.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]    — Document request: record meta, sections, config
//!       ↓
//!   [layout]   — Page-aware layout engine → draw instructions
//!       ↓
//!   [pdf]      — Serialize instructions to PDF bytes
//! ```
//!
//! The engine is stateless across requests. Its only injected collaborator
//! is the text measurement capability ([`text::TextMeasurer`]); the
//! built-in implementation measures with standard Helvetica metrics, the
//! same fonts the PDF serializer embeds.

pub mod config;
pub mod error;
pub mod geometry;
pub mod image_probe;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod text;

pub use error::FolioError;

use layout::{LayoutEngine, LayoutResult};
use model::DocumentRequest;
use pdf::PdfWriter;

/// Lay out a document request into pages of draw instructions.
pub fn layout(request: &DocumentRequest) -> LayoutResult {
    LayoutEngine::new().layout(request)
}

/// Render a document request to PDF bytes.
///
/// This is the primary entry point: layout plus serialization in one
/// uninterrupted pass.
pub fn render(request: &DocumentRequest) -> Vec<u8> {
    let result = layout(request);
    PdfWriter::new().write(&result, &request.meta)
}

/// Render a document request described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, FolioError> {
    let request: DocumentRequest = serde_json::from_str(json)?;
    Ok(render(&request))
}
