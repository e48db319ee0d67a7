//! # Layout Configuration
//!
//! Everything that used to be four diverging copies of the same generator
//! is expressed here as one configuration object: margin profile, image
//! placement policy, and the decoration set. A `LayoutConfig` travels
//! inside the `DocumentRequest` and is read-only during layout.
//!
//! All lengths are millimetres unless a name says otherwise.

use crate::model::ImageRef;
use serde::{Deserialize, Serialize};

// ── Unit conversion ────────────────────────────────────────────

/// CSS reference pixel at 96 dpi, in millimetres. Image natural dimensions
/// arrive in pixels and are converted with this single factor.
pub const MM_PER_PX: f64 = 0.264583;

/// One PostScript point in millimetres. Font sizes are specified in points;
/// the PDF serializer converts the whole mm coordinate space with the inverse.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

// ── Vertical rhythm ────────────────────────────────────────────

/// Fixed baseline-to-baseline advance for body text.
pub const LINE_HEIGHT: f64 = 7.0;

/// Gap inserted after a text block, before the next section heading.
pub const SECTION_GAP: f64 = 10.0;

/// Gap between consecutive images in an image section.
pub const IMAGE_GAP: f64 = 5.0;

/// Vertical space consumed by an `Image i/N` caption line.
pub const CAPTION_ADVANCE: f64 = 10.0;

/// Minimum space a `fit-test` section demands before it accepts the
/// current page instead of breaking to a fresh one.
pub const FIT_TEST_MIN_SPACE: f64 = 60.0;

// ── Font sizes (points) ────────────────────────────────────────

pub const BODY_FONT_SIZE: f64 = 12.0;
pub const CAPTION_FONT_SIZE: f64 = 10.0;
pub const HEADER_LABEL_FONT_SIZE: f64 = 8.0;
pub const FOOTER_FONT_SIZE: f64 = 9.0;

// ── Header box geometry ────────────────────────────────────────

/// Top of the header box, measured from the border rectangle.
pub const HEADER_BOX_TOP_OFFSET: f64 = 14.0;
/// Header box height.
pub const HEADER_BOX_HEIGHT: f64 = 20.0;
/// Header box width as a fraction of the inside-border width.
pub const HEADER_BOX_WIDTH_RATIO: f64 = 0.9;
/// Left strip (Exp.No / Date cells) as a fraction of the header box width.
pub const HEADER_LEFT_STRIP_RATIO: f64 = 0.15;
/// Gap between the header box and the first flowing section.
pub const HEADER_BOX_BOTTOM_GAP: f64 = 10.0;

// ── Footer geometry ────────────────────────────────────────────

/// Footer baseline, measured up from the bottom border line.
pub const FOOTER_BASELINE_OFFSET: f64 = 4.0;
/// Horizontal inset of the footer texts from the border rectangle.
pub const FOOTER_SIDE_INSET: f64 = 4.0;

// ── Marks table geometry ───────────────────────────────────────

/// Height of every marks table row, header row included.
pub const MARKS_ROW_HEIGHT: f64 = 10.0;
/// Column split of the marks grid: criteria / maximum / awarded.
pub const MARKS_COLUMN_RATIOS: [f64; 3] = [0.6, 0.2, 0.2];
/// Text inset inside a left-aligned marks cell.
pub const MARKS_CELL_INSET: f64 = 2.0;

/// Stroke width for borders, boxes and table rules.
pub const RULE_WIDTH: f64 = 0.5;

// ── Page setup ─────────────────────────────────────────────────

/// Standard page sizes in millimetres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in millimetres.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// The two nested margins: an outer border margin (where the page border
/// is drawn) and an inner content margin measured from the border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarginProfile {
    /// 10 mm border, 20 mm content.
    #[default]
    Wide,
    /// 5 mm border, 20 mm content.
    Narrow,
    #[serde(rename_all = "camelCase")]
    Custom {
        border_margin: f64,
        content_margin: f64,
    },
}

impl MarginProfile {
    pub fn border_margin(&self) -> f64 {
        match self {
            MarginProfile::Wide => 10.0,
            MarginProfile::Narrow => 5.0,
            MarginProfile::Custom { border_margin, .. } => *border_margin,
        }
    }

    pub fn content_margin(&self) -> f64 {
        match self {
            MarginProfile::Wide | MarginProfile::Narrow => 20.0,
            MarginProfile::Custom { content_margin, .. } => *content_margin,
        }
    }
}

// ── Image placement policy ─────────────────────────────────────

/// Variant-dependent image placement knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    /// Cap image height to this fraction of the content height, rescaling
    /// width to match when the cap binds. `None` disables the cap.
    #[serde(default)]
    pub height_cap: Option<f64>,

    /// Emit a centered `Image i/N` caption under each image of a
    /// multi-image section.
    #[serde(default = "default_true")]
    pub captions: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            height_cap: None,
            captions: true,
        }
    }
}

// ── Decorations ────────────────────────────────────────────────

/// Which fixed decorations a document carries. Content for the header box
/// and footer comes from `RecordMeta`; this only selects and configures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationSet {
    /// Rectangle inset by the border margin, drawn on every page.
    #[serde(default = "default_true")]
    pub page_border: bool,

    /// First-page header box (experiment number, date cell, centered title).
    #[serde(default = "default_true")]
    pub header_box: bool,

    /// Per-page footer. `None` suppresses the footer entirely.
    #[serde(default)]
    pub footer: Option<FooterConfig>,

    /// Marks table, placed on its own page after the last section.
    #[serde(default)]
    pub marks_table: Option<MarksTableConfig>,
}

impl Default for DecorationSet {
    fn default() -> Self {
        Self {
            page_border: true,
            header_box: true,
            footer: None,
            marks_table: None,
        }
    }
}

/// Footer contents: the roll number comes from `RecordMeta`; the page
/// indicator and attribution are configured here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterConfig {
    /// Right-aligned `Page N` indicator.
    #[serde(default = "default_true")]
    pub page_numbers: bool,

    /// Optional centered attribution text.
    #[serde(default)]
    pub attribution: Option<String>,
}

impl Default for FooterConfig {
    fn default() -> Self {
        Self {
            page_numbers: true,
            attribution: None,
        }
    }
}

/// Marks table configuration: a static grid plus an optional pre-rendered
/// image substituted for the grid when the record's category matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksTableConfig {
    #[serde(default)]
    pub grid: MarksGrid,

    /// Pre-rendered table image used instead of the grid for the
    /// categories listed in `image_categories`.
    #[serde(default)]
    pub image: Option<ImageRef>,

    /// Categories that receive the image variant.
    #[serde(default)]
    pub image_categories: Vec<String>,
}

/// The resolved variant the drawing pass sees. The grid-or-image choice is
/// made exactly once per request, not re-tested at every draw call.
#[derive(Debug, Clone)]
pub enum MarksTable<'a> {
    Grid(&'a MarksGrid),
    Image(&'a ImageRef),
}

impl MarksTableConfig {
    /// Resolve the table variant for a record category.
    pub fn resolve(&self, category: &str) -> MarksTable<'_> {
        match &self.image {
            Some(image) if self.image_categories.iter().any(|c| c == category) => {
                MarksTable::Image(image)
            }
            _ => MarksTable::Grid(&self.grid),
        }
    }
}

/// Static row set and point values for the marks grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksGrid {
    pub columns: [String; 3],
    pub rows: Vec<MarksRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksRow {
    pub label: String,
    pub max_points: u32,
}

impl Default for MarksGrid {
    fn default() -> Self {
        Self {
            columns: [
                "Criteria".to_string(),
                "Max. Marks".to_string(),
                "Awarded".to_string(),
            ],
            rows: vec![
                MarksRow {
                    label: "Preparation".to_string(),
                    max_points: 20,
                },
                MarksRow {
                    label: "Conduct of Experiment".to_string(),
                    max_points: 30,
                },
                MarksRow {
                    label: "Observation and Results".to_string(),
                    max_points: 30,
                },
                MarksRow {
                    label: "Record".to_string(),
                    max_points: 20,
                },
                MarksRow {
                    label: "Total".to_string(),
                    max_points: 100,
                },
            ],
        }
    }
}

// ── Top-level layout config ────────────────────────────────────

/// Complete layout configuration for one document request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    #[serde(default)]
    pub page_size: PageSize,

    #[serde(default)]
    pub margins: MarginProfile,

    #[serde(default)]
    pub images: ImageOptions,

    #[serde(default)]
    pub decorations: DecorationSet,
}

fn default_true() -> bool {
    true
}
