//! # Image Flow
//!
//! Decides final draw dimensions and page placement for each image of a
//! section, in order. Natural pixel sizes convert to millimetres through
//! [`MM_PER_PX`]; an image wider than the content area scales down with
//! its aspect ratio intact, and an optional height cap can shrink it
//! further. An image never splits across pages: if it doesn't fit below
//! the cursor it moves whole to a fresh page. One taller than an entire
//! empty page is still placed — it may run past the bottom content margin.
//!
//! An image whose source cannot be resolved is skipped with a warning and
//! layout continues; a bad screenshot must not sink the whole record.

use log::warn;

use crate::config::{CAPTION_ADVANCE, CAPTION_FONT_SIZE, IMAGE_GAP, MM_PER_PX};
use crate::image_probe::{self, ResolvedImage};
use crate::model::ImageRef;
use crate::text::FontSpec;

use super::{DrawInstruction, LayoutCtx, Page, PageState};

/// Place an ordered group of images, with `Image i/N` captions when the
/// group has several and the caption policy is on.
pub(crate) fn place_image_group(
    ctx: &LayoutCtx<'_>,
    refs: &[ImageRef],
    state: &mut PageState,
    pages: &mut Vec<Page>,
) {
    let total = refs.len();
    let captioned = ctx.config.images.captions && total > 1;

    for (index, image_ref) in refs.iter().enumerate() {
        let resolved = match image_probe::resolve(image_ref) {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("skipping unmeasurable image: {}", e);
                continue;
            }
        };

        place_resolved(ctx, resolved, state, pages, captioned);

        if captioned {
            let caption = format!("Image {}/{}", index + 1, total);
            let font = FontSpec::italic(CAPTION_FONT_SIZE);
            let width = ctx.measurer.text_width(&caption, &font);
            state.push_content(DrawInstruction::Text {
                lines: vec![caption],
                x: ctx.geo.center_x() - width / 2.0,
                y: state.y,
                font,
            });
            state.y += CAPTION_ADVANCE;
        }
    }
}

/// Place a single image with the fit/break/center rules, no caption.
/// Returns false when the source cannot be resolved.
pub(crate) fn place_single(
    ctx: &LayoutCtx<'_>,
    image_ref: &ImageRef,
    state: &mut PageState,
    pages: &mut Vec<Page>,
) -> bool {
    match image_probe::resolve(image_ref) {
        Ok(resolved) => {
            place_resolved(ctx, resolved, state, pages, false);
            true
        }
        Err(e) => {
            warn!("skipping unmeasurable image: {}", e);
            false
        }
    }
}

fn place_resolved(
    ctx: &LayoutCtx<'_>,
    resolved: ResolvedImage,
    state: &mut PageState,
    pages: &mut Vec<Page>,
    captioned: bool,
) {
    let (width, height) = fitted_dimensions(ctx, &resolved);

    // The caption baseline sits one gap below the image; reserve for it so
    // the caption stays inside the content area too.
    let needed = if captioned { height + IMAGE_GAP } else { height };
    if state.y + needed > ctx.geo.content_bottom() && !state.at_top() {
        ctx.break_page(state, pages);
    }

    let x_offset = (ctx.geo.content_width() - width) / 2.0;
    state.push_content(DrawInstruction::Image {
        image: resolved,
        x: ctx.geo.left_margin() + x_offset,
        y: state.y,
        width,
        height,
    });
    state.y += height + IMAGE_GAP;
}

/// Final draw dimensions: natural size in mm, shrunk to the content width
/// and then to the optional height cap, aspect ratio preserved throughout.
fn fitted_dimensions(ctx: &LayoutCtx<'_>, resolved: &ResolvedImage) -> (f64, f64) {
    let mut width = resolved.width_px as f64 * MM_PER_PX;
    let mut height = resolved.height_px as f64 * MM_PER_PX;

    let content_width = ctx.geo.content_width();
    if width > content_width {
        height *= content_width / width;
        width = content_width;
    }

    if let Some(cap) = ctx.config.images.height_cap {
        let max_height = ctx.geo.content_height() * cap;
        if height > max_height {
            width *= max_height / height;
            height = max_height;
        }
    }

    (width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::image_probe::PixelData;
    use crate::model::RecordMeta;
    use crate::text::HelveticaMeasurer;

    fn resolved(width_px: u32, height_px: u32) -> ResolvedImage {
        ResolvedImage {
            pixels: PixelData::Jpeg {
                data: vec![0xFF, 0xD8],
                grayscale: false,
            },
            width_px,
            height_px,
        }
    }

    fn with_ctx(config: &LayoutConfig, check: impl FnOnce(&LayoutCtx<'_>)) {
        let meta = RecordMeta::default();
        let measurer = HelveticaMeasurer;
        let ctx = LayoutCtx {
            geo: crate::geometry::PageGeometry::from_config(config),
            measurer: &measurer,
            config,
            meta: &meta,
        };
        check(&ctx);
    }

    #[test]
    fn small_image_keeps_natural_size() {
        with_ctx(&LayoutConfig::default(), |ctx| {
            let (width, height) = fitted_dimensions(ctx, &resolved(200, 100));
            assert!((width - 200.0 * MM_PER_PX).abs() < 1e-9);
            assert!((height - 100.0 * MM_PER_PX).abs() < 1e-9);
        });
    }

    #[test]
    fn wide_image_fits_the_content_width() {
        with_ctx(&LayoutConfig::default(), |ctx| {
            let (width, height) = fitted_dimensions(ctx, &resolved(1000, 500));
            assert!((width - 150.0).abs() < 1e-9);
            assert!((height - 75.0).abs() < 1e-6);
        });
    }

    #[test]
    fn height_cap_rescales_both_axes() {
        let mut config = LayoutConfig::default();
        config.images.height_cap = Some(0.8);
        with_ctx(&config, |ctx| {
            let (width, height) = fitted_dimensions(ctx, &resolved(1000, 4000));
            let max_height = ctx.geo.content_height() * 0.8;
            assert!((height - max_height).abs() < 1e-9);
            assert!((width / height - 0.25).abs() < 1e-6);
        });
    }
}
