//! # Document Request Model
//!
//! The input representation for the layout engine. A request is a flat,
//! ordered list of sections — text blocks and image groups — plus the
//! record metadata the decorations draw from. This is designed to be
//! easily produced by a form collector or direct JSON construction.
//!
//! A request is constructed once from validated form state, consumed
//! exactly once by the engine, and discarded. The engine holds no state
//! across requests.

use crate::config::LayoutConfig;
use serde::{Deserialize, Serialize};

/// A complete document request ready for layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    /// Record identity: drives the header box, footer, and file name.
    pub meta: RecordMeta,

    /// Page, image, and decoration configuration.
    #[serde(default)]
    pub config: LayoutConfig,

    /// The ordered content sections.
    pub sections: Vec<Section>,
}

/// Identity of one lab record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Student category (e.g. a year tag); selects the marks table variant.
    #[serde(default)]
    pub category: String,

    /// Experiment number shown in the header box.
    pub exp_no: String,

    /// Experiment title, word-wrapped and centered in the header box.
    pub title: String,

    /// Date printed next to the date label. Left blank when absent.
    #[serde(default)]
    pub date: Option<String>,

    /// Roll number shown left-aligned in the footer.
    #[serde(default)]
    pub roll_no: String,
}

impl RecordMeta {
    /// Deterministic artifact name derived from request identifiers.
    pub fn file_name(&self) -> String {
        format!("{}_{}_{}", self.category, self.roll_no, self.exp_no)
    }
}

/// One logical content block of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Bold heading emitted before the section content.
    pub heading: String,

    /// How this section relates to the page boundary.
    #[serde(default)]
    pub page_break: PageBreakRule,

    /// Text body or image group.
    pub content: SectionContent,
}

/// The two kinds of section content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SectionContent {
    /// A text block, word-wrapped to the content width.
    Text { body: String },

    /// An ordered group of images, placed top to bottom.
    Images { images: Vec<ImageRef> },
}

/// Page-break policy for a section.
///
/// `AlwaysFresh` is the late-variant behavior (Program, Output, Result each
/// unconditionally start a page); `FitTest` is the earlier "only break when
/// space is tight" rule. Both remain valid configurations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageBreakRule {
    /// Continue on the current page wherever the cursor is.
    #[default]
    None,
    /// Break only if the remaining space is below the fit threshold.
    FitTest,
    /// Always start on a fresh page, regardless of remaining space.
    AlwaysFresh,
}

/// Opaque handle to raster image data.
///
/// The source string is a data URI (`data:image/png;base64,...`), raw
/// base64, or a file path. Natural pixel dimensions are resolved during
/// layout, strictly in section order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef {
    pub src: String,
}

impl ImageRef {
    pub fn new(src: impl Into<String>) -> Self {
        Self { src: src.into() }
    }

    /// Short display form for log messages: data URIs and base64 blobs are
    /// truncated, file paths pass through.
    pub fn describe(&self) -> String {
        if self.src.len() <= 48 {
            self.src.clone()
        } else {
            format!("{}…", &self.src[..48])
        }
    }
}

impl Section {
    /// Create a text section.
    pub fn text(heading: &str, body: &str) -> Self {
        Self {
            heading: heading.to_string(),
            page_break: PageBreakRule::None,
            content: SectionContent::Text {
                body: body.to_string(),
            },
        }
    }

    /// Create an image section.
    pub fn images(heading: &str, images: Vec<ImageRef>) -> Self {
        Self {
            heading: heading.to_string(),
            page_break: PageBreakRule::None,
            content: SectionContent::Images { images },
        }
    }

    /// Set the page-break rule.
    pub fn with_break(mut self, rule: PageBreakRule) -> Self {
        self.page_break = rule;
        self
    }
}
