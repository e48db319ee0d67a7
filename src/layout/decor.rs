//! # Fixed Decorations
//!
//! Drawing that is positioned independently of the flowing cursor: the
//! page border, the first-page header box, the per-page footer, and the
//! marks table. Decorations may sit inside the border margin band; only
//! flowing content is confined to the content area.

use crate::config::{
    FooterConfig, MarksGrid, MarksTable, BODY_FONT_SIZE, CAPTION_FONT_SIZE, FOOTER_BASELINE_OFFSET,
    FOOTER_FONT_SIZE, FOOTER_SIDE_INSET, HEADER_BOX_BOTTOM_GAP, HEADER_BOX_HEIGHT,
    HEADER_BOX_TOP_OFFSET, HEADER_BOX_WIDTH_RATIO, HEADER_LABEL_FONT_SIZE,
    HEADER_LEFT_STRIP_RATIO, LINE_HEIGHT, MARKS_CELL_INSET, MARKS_COLUMN_RATIOS, MARKS_ROW_HEIGHT,
};
use crate::geometry::PageGeometry;
use crate::text::FontSpec;

use super::{images, DrawInstruction, LayoutCtx, Page, PageState};

/// Full-page border: a rectangle inset by the border margin.
pub(crate) fn place_border(geo: &PageGeometry, state: &mut PageState) {
    state.push_decoration(DrawInstruction::Rect {
        x: geo.border_margin,
        y: geo.border_margin,
        width: geo.page_width - 2.0 * geo.border_margin,
        height: geo.page_height - 2.0 * geo.border_margin,
    });
}

/// First-page header box: a bordered box with a left strip holding the
/// experiment number and date cells, and a centered, word-wrapped title in
/// the right region. Returns the y where flowing content starts.
pub(crate) fn place_header_box(ctx: &LayoutCtx<'_>, state: &mut PageState) -> f64 {
    let geo = &ctx.geo;
    let box_y = geo.border_margin + HEADER_BOX_TOP_OFFSET;
    let box_width = (geo.page_width - 2.0 * geo.border_margin) * HEADER_BOX_WIDTH_RATIO;
    let box_x = (geo.page_width - box_width) / 2.0;

    state.push_decoration(DrawInstruction::Rect {
        x: box_x,
        y: box_y,
        width: box_width,
        height: HEADER_BOX_HEIGHT,
    });

    // Vertical divider between the left strip and the title region, and a
    // horizontal divider splitting the strip into Exp.No / Date cells.
    let strip_width = box_width * HEADER_LEFT_STRIP_RATIO;
    let divider_x = box_x + strip_width;
    let strip_mid_y = box_y + HEADER_BOX_HEIGHT / 2.0;
    state.push_decoration(DrawInstruction::Line {
        x1: divider_x,
        y1: box_y,
        x2: divider_x,
        y2: box_y + HEADER_BOX_HEIGHT,
    });
    state.push_decoration(DrawInstruction::Line {
        x1: box_x,
        y1: strip_mid_y,
        x2: divider_x,
        y2: strip_mid_y,
    });

    let label_font = FontSpec::regular(HEADER_LABEL_FONT_SIZE);
    state.push_decoration(DrawInstruction::Text {
        lines: vec![format!("Exp.No: {}", ctx.meta.exp_no)],
        x: box_x + 2.0,
        y: box_y + 6.0,
        font: label_font,
    });
    let date = ctx.meta.date.as_deref().unwrap_or("");
    state.push_decoration(DrawInstruction::Text {
        lines: vec![format!("Date: {}", date).trim_end().to_string()],
        x: box_x + 2.0,
        y: strip_mid_y + 6.0,
        font: label_font,
    });

    // Title: bold, word-wrapped to the right region, each line centered.
    let title_font = FontSpec::bold(BODY_FONT_SIZE);
    let right_x = divider_x;
    let right_width = box_width - strip_width;
    let title_lines = ctx
        .measurer
        .wrap(&ctx.meta.title, right_width - 4.0, &title_font);
    let title_y = box_y + HEADER_BOX_HEIGHT / 2.0 + 2.0;
    for (i, line) in title_lines.iter().enumerate() {
        let line_width = ctx.measurer.text_width(line, &title_font);
        state.push_decoration(DrawInstruction::Text {
            lines: vec![line.clone()],
            x: right_x + (right_width - line_width) / 2.0,
            y: title_y + i as f64 * LINE_HEIGHT,
            font: title_font,
        });
    }

    box_y + HEADER_BOX_HEIGHT + HEADER_BOX_BOTTOM_GAP
}

/// Per-page footer: roll number on the left, `Page N` on the right,
/// optional centered attribution. Fixed offsets above the bottom border.
pub(crate) fn place_footer(ctx: &LayoutCtx<'_>, footer: &FooterConfig, state: &mut PageState) {
    let geo = &ctx.geo;
    let font = FontSpec::regular(FOOTER_FONT_SIZE);
    let baseline = geo.page_height - geo.border_margin - FOOTER_BASELINE_OFFSET;

    if !ctx.meta.roll_no.is_empty() {
        state.push_decoration(DrawInstruction::Text {
            lines: vec![ctx.meta.roll_no.clone()],
            x: geo.border_margin + FOOTER_SIDE_INSET,
            y: baseline,
            font,
        });
    }

    if let Some(attribution) = &footer.attribution {
        let width = ctx.measurer.text_width(attribution, &font);
        state.push_decoration(DrawInstruction::Text {
            lines: vec![attribution.clone()],
            x: geo.center_x() - width / 2.0,
            y: baseline,
            font,
        });
    }

    if footer.page_numbers {
        let label = format!("Page {}", state.number);
        let width = ctx.measurer.text_width(&label, &font);
        state.push_decoration(DrawInstruction::Text {
            lines: vec![label],
            x: geo.page_width - geo.border_margin - FOOTER_SIDE_INSET - width,
            y: baseline,
            font,
        });
    }
}

/// Marks table on its own page: either the fixed-geometry grid or the
/// pre-rendered image the category resolved to.
pub(crate) fn place_marks_table(
    ctx: &LayoutCtx<'_>,
    table: &MarksTable<'_>,
    state: &mut PageState,
    pages: &mut Vec<Page>,
) {
    match table {
        MarksTable::Grid(grid) => place_marks_grid(ctx, grid, state),
        MarksTable::Image(image_ref) => {
            images::place_single(ctx, image_ref, state, pages);
        }
    }
}

/// The grid: bordered cells, centered header labels, left-aligned row
/// labels, centered point values, an empty awarded column.
fn place_marks_grid(ctx: &LayoutCtx<'_>, grid: &MarksGrid, state: &mut PageState) {
    let geo = &ctx.geo;
    let table_x = geo.left_margin();
    let table_width = geo.content_width();
    let column_widths: Vec<f64> = MARKS_COLUMN_RATIOS
        .iter()
        .map(|ratio| table_width * ratio)
        .collect();

    let header_font = FontSpec::bold(CAPTION_FONT_SIZE);
    let cell_font = FontSpec::regular(CAPTION_FONT_SIZE);

    let mut row_y = state.y;
    place_marks_row(
        ctx,
        state,
        table_x,
        row_y,
        &column_widths,
        [
            grid.columns[0].as_str(),
            grid.columns[1].as_str(),
            grid.columns[2].as_str(),
        ],
        header_font,
        true,
    );
    row_y += MARKS_ROW_HEIGHT;

    for row in &grid.rows {
        let points = row.max_points.to_string();
        place_marks_row(
            ctx,
            state,
            table_x,
            row_y,
            &column_widths,
            [row.label.as_str(), points.as_str(), ""],
            cell_font,
            false,
        );
        row_y += MARKS_ROW_HEIGHT;
    }

    state.y = row_y;
}

/// One row of the grid: three bordered cells with their texts. Header rows
/// center every cell; body rows left-align the first and center the rest.
#[allow(clippy::too_many_arguments)]
fn place_marks_row(
    ctx: &LayoutCtx<'_>,
    state: &mut PageState,
    table_x: f64,
    row_y: f64,
    column_widths: &[f64],
    texts: [&str; 3],
    font: FontSpec,
    center_all: bool,
) {
    let baseline = row_y + MARKS_ROW_HEIGHT / 2.0 + 2.0;
    let mut cell_x = table_x;

    for (column, text) in texts.iter().enumerate() {
        let width = column_widths[column];
        state.push_content(DrawInstruction::Rect {
            x: cell_x,
            y: row_y,
            width,
            height: MARKS_ROW_HEIGHT,
        });
        if !text.is_empty() {
            let x = if center_all || column > 0 {
                cell_x + (width - ctx.measurer.text_width(text, &font)) / 2.0
            } else {
                cell_x + MARKS_CELL_INSET
            };
            state.push_content(DrawInstruction::Text {
                lines: vec![text.to_string()],
                x,
                y: baseline,
                font,
            });
        }
        cell_x += width;
    }
}
