//! # Page-Aware Layout Engine
//!
//! This is the heart of folio.
//!
//! The page is the unit of layout: every placement asks "does this fit
//! above the bottom content margin?" before drawing, and a page break is
//! a single, explicit operation — close the current page (attaching its
//! footer), open the next (drawing its border), reset the cursor to the
//! content top.
//!
//! The cursor is an explicit [`PageState`] value threaded through every
//! placement function, never ambient captured state. One document request
//! is one uninterrupted pass; the engine keeps nothing across requests.
//!
//! Coordinates are millimetres from the top-left page corner, y growing
//! downward. Text instructions anchor at the first line's baseline; image
//! instructions anchor at the top-left corner.

pub mod decor;
pub mod images;

use log::debug;

use crate::config::{
    LayoutConfig, BODY_FONT_SIZE, FIT_TEST_MIN_SPACE, LINE_HEIGHT, SECTION_GAP,
};
use crate::geometry::PageGeometry;
use crate::image_probe::ResolvedImage;
use crate::model::{DocumentRequest, PageBreakRule, RecordMeta, Section, SectionContent};
use crate::text::{FontSpec, HelveticaMeasurer, TextMeasurer};

/// One drawing primitive for the rendering sink.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    /// Lines of text sharing one left edge. `y` is the first line's
    /// baseline; each following line advances by [`LINE_HEIGHT`].
    Text {
        lines: Vec<String>,
        x: f64,
        y: f64,
        font: FontSpec,
    },
    /// A placed raster image. `(x, y)` is the top-left corner.
    Image {
        image: ResolvedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// A stroked rectangle (border, header box, table cell).
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// A stroked line segment (header dividers).
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
}

/// One finished page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number, strictly increasing with no gaps.
    pub number: u32,
    pub instructions: Vec<DrawInstruction>,
}

/// The complete layout of one document request.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// Page dimensions in millimetres, shared by every page.
    pub page_width: f64,
    pub page_height: f64,
    pub pages: Vec<Page>,
}

impl LayoutResult {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// The cursor during layout: where we are on the current page.
#[derive(Debug, Clone)]
pub struct PageState {
    /// 1-based number of the page being filled.
    pub number: u32,
    /// Current vertical write position within the content area.
    pub y: f64,
    /// Where flowing content starts on this page (below the header box on
    /// page one, the content top elsewhere).
    top: f64,
    /// Whether any section content has landed on this page. Decorations
    /// don't count.
    content_placed: bool,
    instructions: Vec<DrawInstruction>,
}

impl PageState {
    fn new(number: u32, top: f64) -> Self {
        Self {
            number,
            y: top,
            top,
            content_placed: false,
            instructions: Vec::new(),
        }
    }

    /// Record a flowing content instruction.
    pub(crate) fn push_content(&mut self, instruction: DrawInstruction) {
        self.content_placed = true;
        self.instructions.push(instruction);
    }

    /// Record a fixed decoration (border, header, footer, table rules).
    pub(crate) fn push_decoration(&mut self, instruction: DrawInstruction) {
        self.instructions.push(instruction);
    }

    /// True once section content occupies this page.
    pub(crate) fn has_content(&self) -> bool {
        self.content_placed
    }

    /// True while the cursor still sits at this page's content start.
    pub(crate) fn at_top(&self) -> bool {
        self.y <= self.top
    }
}

/// Everything a placement function needs besides the cursor itself.
pub(crate) struct LayoutCtx<'a> {
    pub geo: PageGeometry,
    pub measurer: &'a dyn TextMeasurer,
    pub config: &'a LayoutConfig,
    pub meta: &'a RecordMeta,
}

impl LayoutCtx<'_> {
    /// Open a page: draw its border, put the cursor at the content top.
    fn open_page(&self, number: u32) -> PageState {
        let mut state = PageState::new(number, self.geo.content_top());
        if self.config.decorations.page_border {
            decor::place_border(&self.geo, &mut state);
        }
        state
    }

    /// Close a page: attach the footer and move it into `pages`.
    fn close_page(&self, mut state: PageState, pages: &mut Vec<Page>) {
        if let Some(footer) = &self.config.decorations.footer {
            decor::place_footer(self, footer, &mut state);
        }
        pages.push(Page {
            number: state.number,
            instructions: state.instructions,
        });
    }

    /// Close the current page and continue on a fresh one.
    pub(crate) fn break_page(&self, state: &mut PageState, pages: &mut Vec<Page>) {
        debug!(
            "page {} closed at y = {:.1} mm, starting page {}",
            state.number,
            state.y,
            state.number + 1
        );
        let next = self.open_page(state.number + 1);
        let finished = std::mem::replace(state, next);
        self.close_page(finished, pages);
    }

    /// How many more baselines fit at and below `y`.
    fn lines_that_fit(&self, y: f64) -> usize {
        let bottom = self.geo.content_bottom();
        if y > bottom {
            0
        } else {
            ((bottom - y) / LINE_HEIGHT).floor() as usize + 1
        }
    }

    fn apply_break_rule(&self, rule: PageBreakRule, state: &mut PageState, pages: &mut Vec<Page>) {
        match rule {
            PageBreakRule::None => {}
            PageBreakRule::AlwaysFresh => {
                if state.has_content() {
                    self.break_page(state, pages);
                }
            }
            PageBreakRule::FitTest => {
                if self.geo.content_bottom() - state.y < FIT_TEST_MIN_SPACE {
                    self.break_page(state, pages);
                }
            }
        }
    }

    /// Emit a bold section heading and advance one line.
    fn place_heading(&self, heading: &str, state: &mut PageState, pages: &mut Vec<Page>) {
        if heading.is_empty() {
            return;
        }
        if state.y > self.geo.content_bottom() && !state.at_top() {
            self.break_page(state, pages);
        }
        state.push_content(DrawInstruction::Text {
            lines: vec![heading.to_string()],
            x: self.geo.left_margin(),
            y: state.y,
            font: FontSpec::bold(BODY_FONT_SIZE),
        });
        state.y += LINE_HEIGHT;
    }

    /// Wrap a text body and flow it line by line, breaking pages as needed.
    fn place_text_body(&self, body: &str, state: &mut PageState, pages: &mut Vec<Page>) {
        let font = FontSpec::regular(BODY_FONT_SIZE);
        let lines = self
            .measurer
            .wrap(body, self.geo.content_width(), &font);

        let mut rest: &[String] = &lines;
        while !rest.is_empty() {
            let fit = self.lines_that_fit(state.y);
            if fit == 0 {
                self.break_page(state, pages);
                continue;
            }
            let take = fit.min(rest.len());
            state.push_content(DrawInstruction::Text {
                lines: rest[..take].to_vec(),
                x: self.geo.left_margin(),
                y: state.y,
                font,
            });
            state.y += take as f64 * LINE_HEIGHT;
            rest = &rest[take..];
            if !rest.is_empty() {
                self.break_page(state, pages);
            }
        }

        state.y += SECTION_GAP;
    }
}

/// The layout engine. Stateless across requests; the measurement
/// capability is the only injected collaborator.
pub struct LayoutEngine {
    measurer: Box<dyn TextMeasurer>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine {
    /// Engine with the built-in Helvetica measurer.
    pub fn new() -> Self {
        Self {
            measurer: Box::new(HelveticaMeasurer),
        }
    }

    /// Engine with a caller-supplied measurement capability.
    pub fn with_measurer(measurer: Box<dyn TextMeasurer>) -> Self {
        Self { measurer }
    }

    /// Lay out one document request into pages of draw instructions.
    pub fn layout(&self, request: &DocumentRequest) -> LayoutResult {
        let ctx = LayoutCtx {
            geo: PageGeometry::from_config(&request.config),
            measurer: self.measurer.as_ref(),
            config: &request.config,
            meta: &request.meta,
        };

        let mut pages: Vec<Page> = Vec::new();
        let mut state = ctx.open_page(1);

        if ctx.config.decorations.header_box {
            let content_start = decor::place_header_box(&ctx, &mut state);
            state.y = content_start;
            state.top = content_start;
        }

        for section in &request.sections {
            self.place_section(&ctx, section, &mut state, &mut pages);
        }

        if let Some(marks) = &ctx.config.decorations.marks_table {
            let table = marks.resolve(&ctx.meta.category);
            if state.has_content() {
                ctx.break_page(&mut state, &mut pages);
            }
            decor::place_marks_table(&ctx, &table, &mut state, &mut pages);
        }

        ctx.close_page(state, &mut pages);
        LayoutResult {
            page_width: ctx.geo.page_width,
            page_height: ctx.geo.page_height,
            pages,
        }
    }

    fn place_section(
        &self,
        ctx: &LayoutCtx<'_>,
        section: &Section,
        state: &mut PageState,
        pages: &mut Vec<Page>,
    ) {
        ctx.apply_break_rule(section.page_break, state, pages);
        ctx.place_heading(&section.heading, state, pages);
        match &section.content {
            SectionContent::Text { body } => ctx.place_text_body(body, state, pages),
            SectionContent::Images { images: refs } => {
                images::place_image_group(ctx, refs, state, pages)
            }
        }
    }
}
