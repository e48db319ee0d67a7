//! Page geometry: the usable content rectangle derived from the page size
//! and the two nested margins. Pure functions of configuration.

use crate::config::{LayoutConfig, MarginProfile, PageSize};

/// The resolved geometry of one page. Everything in millimetres, origin at
/// the top-left page corner, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f64,
    pub page_height: f64,
    pub border_margin: f64,
    pub content_margin: f64,
}

impl PageGeometry {
    pub fn new(size: PageSize, margins: MarginProfile) -> Self {
        let (page_width, page_height) = size.dimensions();
        Self {
            page_width,
            page_height,
            border_margin: margins.border_margin(),
            content_margin: margins.content_margin(),
        }
    }

    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.page_size, config.margins)
    }

    /// Left edge of the content area.
    pub fn left_margin(&self) -> f64 {
        self.border_margin + self.content_margin
    }

    /// Width available to flowing content.
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * (self.border_margin + self.content_margin)
    }

    /// First usable y for flowing content on a plain page.
    pub fn content_top(&self) -> f64 {
        self.border_margin + self.content_margin
    }

    /// Last usable y for flowing content.
    pub fn content_bottom(&self) -> f64 {
        self.page_height - self.border_margin - self.content_margin
    }

    /// Height of the content area on a plain page.
    pub fn content_height(&self) -> f64 {
        self.content_bottom() - self.content_top()
    }

    /// Horizontal center of the content area (and of the page).
    pub fn center_x(&self) -> f64 {
        self.page_width / 2.0
    }
}
