//! Integration tests for the folio rendering pipeline.
//!
//! These tests exercise the full path from a document request to PDF
//! output. They verify:
//! - JSON deserialization works correctly
//! - The layout engine produces the right number of pages
//! - Page breaks happen at the right places, per policy
//! - Image scaling preserves aspect ratios
//! - Decorations land on the right pages
//! - PDF output is structurally valid

use base64::Engine as _;

use folio::config::{
    DecorationSet, FooterConfig, ImageOptions, LayoutConfig, MarksTableConfig,
};
use folio::layout::{DrawInstruction, LayoutEngine, LayoutResult};
use folio::model::{DocumentRequest, ImageRef, PageBreakRule, RecordMeta, Section};

// ─── Helpers ────────────────────────────────────────────────────

/// A solid-color PNG of the given pixel size, as a raw-base64 image ref.
fn png_image(width: u32, height: u32) -> ImageRef {
    let img = image::RgbaImage::from_fn(width, height, |_, _| image::Rgba([30, 60, 120, 255]));
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(encoder, img.as_raw(), width, height, image::ColorType::Rgba8)
        .unwrap();
    ImageRef::new(base64::engine::general_purpose::STANDARD.encode(&buf))
}

fn meta() -> RecordMeta {
    RecordMeta {
        category: "cse".to_string(),
        exp_no: "7".to_string(),
        title: "Shortest Paths".to_string(),
        date: Some("2026-02-14".to_string()),
        roll_no: "21CS042".to_string(),
    }
}

/// Config with every decoration off: pure flow behavior.
fn bare_config() -> LayoutConfig {
    LayoutConfig {
        decorations: DecorationSet {
            page_border: false,
            header_box: false,
            footer: None,
            marks_table: None,
        },
        images: ImageOptions {
            height_cap: None,
            captions: false,
        },
        ..Default::default()
    }
}

fn request(config: LayoutConfig, sections: Vec<Section>) -> DocumentRequest {
    DocumentRequest {
        meta: meta(),
        config,
        sections,
    }
}

fn layout(request: &DocumentRequest) -> LayoutResult {
    LayoutEngine::new().layout(request)
}

/// Page number of the first Text instruction containing `needle`.
fn page_of_text(result: &LayoutResult, needle: &str) -> Option<u32> {
    result.pages.iter().find_map(|page| {
        page.instructions.iter().any(|instruction| {
            matches!(instruction, DrawInstruction::Text { lines, .. }
                if lines.iter().any(|l| l.contains(needle)))
        })
        .then_some(page.number)
    })
}

/// All Image instructions across the layout, with their page numbers.
fn placed_images(result: &LayoutResult) -> Vec<(u32, f64, f64, f64, f64)> {
    let mut found = Vec::new();
    for page in &result.pages {
        for instruction in &page.instructions {
            if let DrawInstruction::Image {
                x, y, width, height, ..
            } = instruction
            {
                found.push((page.number, *x, *y, *width, *height));
            }
        }
    }
    found
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(bytes.windows(7).any(|w| w == b"trailer"), "Missing trailer");
}

// ─── Basic flow ─────────────────────────────────────────────────

#[test]
fn empty_request_still_produces_page_one() {
    let result = layout(&request(bare_config(), vec![]));
    assert_eq!(result.page_count(), 1);
    assert_eq!(result.pages[0].number, 1);
}

#[test]
fn short_text_sections_fit_one_page() {
    let result = layout(&request(
        bare_config(),
        vec![
            Section::text("Aim:", "Sort an array with quicksort."),
            Section::text("Result:", "The array was sorted."),
        ],
    ));
    assert_eq!(result.page_count(), 1);
}

#[test]
fn long_text_flows_across_pages_within_bounds() {
    // A4 wide profile: content area spans y = 30..=267, 7mm per line.
    let body = (0..200)
        .map(|i| format!("Step {} of the procedure.", i))
        .collect::<Vec<_>>()
        .join("\n");
    let result = layout(&request(bare_config(), vec![Section::text("Procedure:", &body)]));
    assert!(
        result.page_count() >= 2,
        "200 lines must overflow one page, got {}",
        result.page_count()
    );
    for page in &result.pages {
        for instruction in &page.instructions {
            if let DrawInstruction::Text { lines, y, .. } = instruction {
                let last_baseline = y + (lines.len() as f64 - 1.0) * 7.0;
                assert!(*y >= 30.0, "baseline above content top: {}", y);
                assert!(
                    last_baseline <= 267.0 + 1e-9,
                    "baseline below content bottom: {}",
                    last_baseline
                );
            }
        }
    }
}

#[test]
fn page_numbers_are_contiguous_from_one() {
    let body = "line\n".repeat(150);
    let result = layout(&request(
        bare_config(),
        vec![
            Section::text("Aim:", &body),
            Section::text("Result:", &body),
        ],
    ));
    assert!(result.page_count() > 1);
    for (i, page) in result.pages.iter().enumerate() {
        assert_eq!(page.number, i as u32 + 1, "page numbers must have no gaps");
    }
}

#[test]
fn layout_is_idempotent() {
    let req = request(
        LayoutConfig::default(),
        vec![
            Section::text("Aim:", "Measure the resonance frequency."),
            Section::images("Output:", vec![png_image(400, 300), png_image(640, 480)]),
            Section::text("Result:", "Verified.").with_break(PageBreakRule::AlwaysFresh),
        ],
    );
    let first = layout(&req);
    let second = layout(&req);
    assert_eq!(first, second, "same request must lay out identically");
}

// ─── Image scaling ──────────────────────────────────────────────

#[test]
fn wide_image_scales_down_to_content_width() {
    // 1000x500 px at 0.264583 mm/px is 264.58mm wide — wider than the
    // 150mm content area, so it scales to 150 x 75.
    let result = layout(&request(
        bare_config(),
        vec![Section::images("Program:", vec![png_image(1000, 500)])],
    ));
    let images = placed_images(&result);
    assert_eq!(images.len(), 1);
    let (_, x, _, width, height) = images[0];
    assert!((width - 150.0).abs() < 1e-6, "width was {}", width);
    assert!((height - 75.0).abs() < 1e-6, "height was {}", height);
    assert!((x - 30.0).abs() < 1e-6, "full-width image sits at the left margin");
}

#[test]
fn image_scaling_preserves_aspect_ratio() {
    for (w, h) in [(1000, 500), (640, 480), (123, 457), (2000, 3011)] {
        let result = layout(&request(
            bare_config(),
            vec![Section::images("Program:", vec![png_image(w, h)])],
        ));
        let images = placed_images(&result);
        assert_eq!(images.len(), 1);
        let (_, _, _, width, height) = images[0];
        let natural = w as f64 / h as f64;
        assert!(
            (width / height - natural).abs() < 1e-6,
            "aspect drifted for {}x{}: {} vs {}",
            w,
            h,
            width / height,
            natural
        );
    }
}

#[test]
fn narrow_image_is_centered_not_stretched() {
    // 200x100 px is 52.9 x 26.5 mm — narrower than the content area.
    let result = layout(&request(
        bare_config(),
        vec![Section::images("Output:", vec![png_image(200, 100)])],
    ));
    let images = placed_images(&result);
    let (_, x, _, width, _) = images[0];
    assert!(width < 150.0, "narrow image must keep its natural width");
    let expected_x = 30.0 + (150.0 - width) / 2.0;
    assert!((x - expected_x).abs() < 1e-6, "image must be centered");
}

#[test]
fn height_cap_binds_and_rescales_width() {
    let mut config = bare_config();
    config.images.height_cap = Some(0.5);
    // 800x1600 px is 211.7 x 423.3 mm natural; width-fit makes it
    // 150 x 300, then the 50% cap (118.5mm) shrinks it further.
    let result = layout(&request(
        config,
        vec![Section::images("Output:", vec![png_image(800, 1600)])],
    ));
    let (_, _, _, width, height) = placed_images(&result)[0];
    assert!((height - 118.5).abs() < 1e-6, "height was {}", height);
    assert!((width / height - 0.5).abs() < 1e-6, "ratio must survive the cap");
    assert!(width < 150.0);
}

// ─── Page-break behavior ────────────────────────────────────────

#[test]
fn tall_images_get_one_page_each() {
    // 800px tall at 0.2646 mm/px is ~211.7mm — more than half the 237mm
    // content height, so no two fit together.
    let images = vec![png_image(400, 800), png_image(400, 800), png_image(400, 800)];
    let result = layout(&request(bare_config(), vec![Section::images("", images)]));
    let placed = placed_images(&result);
    assert_eq!(placed.len(), 3);
    assert_eq!(result.page_count(), 3);
    for (i, (page, _, y, _, _)) in placed.iter().enumerate() {
        assert_eq!(*page, i as u32 + 1);
        assert!((y - 30.0).abs() < 1e-6, "each image starts at the content top");
    }
}

#[test]
fn oversized_image_is_placed_alone_without_splitting() {
    // ~529mm natural height: taller than a whole empty page. Accepted
    // limitation: it is placed at the content top and may overrun.
    let result = layout(&request(
        bare_config(),
        vec![
            Section::text("Aim:", "Fill some space first."),
            Section::images("Output:", vec![png_image(300, 2000)]),
            Section::text("Result:", "Done."),
        ],
    ));
    let placed = placed_images(&result);
    assert_eq!(placed.len(), 1);
    let (page, _, y, _, height) = placed[0];
    assert_eq!(page, 2, "the oversized image moves off the occupied first page");
    assert!((y - 30.0).abs() < 1e-6);
    assert!(height > 237.0, "no splitting or shrinking without a cap");
    assert_eq!(
        page_of_text(&result, "Result:"),
        Some(3),
        "content after the oversized image starts on the next page"
    );
}

#[test]
fn always_fresh_section_never_shares_a_page() {
    // An image section ends mid-page; the forced text section that
    // follows must start on the next page.
    let result = layout(&request(
        bare_config(),
        vec![
            Section::images("Output:", vec![png_image(200, 100)]),
            Section::text("Result:", "As expected.").with_break(PageBreakRule::AlwaysFresh),
        ],
    ));
    let image_page = placed_images(&result)[0].0;
    let result_page = page_of_text(&result, "Result:").unwrap();
    assert_eq!(result_page, image_page + 1);
}

#[test]
fn always_fresh_on_an_empty_page_stays_put() {
    let result = layout(&request(
        bare_config(),
        vec![Section::text("Aim:", "Start fresh.").with_break(PageBreakRule::AlwaysFresh)],
    ));
    assert_eq!(result.page_count(), 1, "no blank leading page");
    assert_eq!(page_of_text(&result, "Aim:"), Some(1));
}

#[test]
fn fit_test_breaks_only_when_space_is_tight() {
    // Plenty of room: the fit-test section stays on page 1.
    let roomy = layout(&request(
        bare_config(),
        vec![
            Section::text("Aim:", "Short."),
            Section::text("Output:", "Fits here.").with_break(PageBreakRule::FitTest),
        ],
    ));
    assert_eq!(page_of_text(&roomy, "Output:"), Some(1));

    // ~25 lines of text leave less than 60mm below the cursor.
    let filler = "line\n".repeat(25);
    let tight = layout(&request(
        bare_config(),
        vec![
            Section::text("Aim:", &filler),
            Section::text("Output:", "Needs room.").with_break(PageBreakRule::FitTest),
        ],
    ));
    assert_eq!(page_of_text(&tight, "Output:"), Some(2));
}

// ─── Error recovery ─────────────────────────────────────────────

#[test]
fn corrupt_image_is_skipped_and_layout_continues() {
    let bad = ImageRef::new("bm90IGFuIGltYWdl"); // "not an image"
    let result = layout(&request(
        bare_config(),
        vec![
            Section::images("Program:", vec![bad, png_image(400, 300)]),
            Section::text("Result:", "Still rendered."),
        ],
    ));
    assert_eq!(placed_images(&result).len(), 1, "only the good image lands");
    assert!(page_of_text(&result, "Result:").is_some());
}

// ─── Decorations ────────────────────────────────────────────────

#[test]
fn header_box_is_first_page_only_and_shifts_content() {
    let mut config = LayoutConfig::default();
    config.decorations.footer = None;
    let body = "line\n".repeat(100);
    let result = layout(&request(config, vec![Section::text("Aim:", &body)]));
    assert!(result.page_count() >= 2);

    // Page 1: border + header box rects; the heading starts below the
    // header box (10 + 14 + 20 + 10 = 54mm from the page top).
    let first = &result.pages[0];
    let rects: Vec<_> = first
        .instructions
        .iter()
        .filter(|i| matches!(i, DrawInstruction::Rect { .. }))
        .collect();
    assert_eq!(rects.len(), 2, "page border and header box");
    assert!(first.instructions.iter().any(
        |i| matches!(i, DrawInstruction::Text { lines, y, .. }
            if lines[0] == "Aim:" && (*y - 54.0).abs() < 1e-9)
    ));
    assert!(
        page_of_text(&result, "Exp.No: 7") == Some(1),
        "experiment number in the header box"
    );

    // Later pages: only the page border remains.
    let second = &result.pages[1];
    let rects: Vec<_> = second
        .instructions
        .iter()
        .filter(|i| matches!(i, DrawInstruction::Rect { .. }))
        .collect();
    assert_eq!(rects.len(), 1, "continuation pages carry only the border");
}

#[test]
fn footer_carries_roll_number_and_page_indicator() {
    let mut config = bare_config();
    config.decorations.footer = Some(FooterConfig {
        page_numbers: true,
        attribution: Some("Department of CSE".to_string()),
    });
    let body = "line\n".repeat(80);
    let result = layout(&request(config, vec![Section::text("Aim:", &body)]));
    assert!(result.page_count() >= 2);

    for page in &result.pages {
        let label = format!("Page {}", page.number);
        assert!(
            page.instructions.iter().any(|i| matches!(i, DrawInstruction::Text { lines, .. }
                if lines[0] == label)),
            "page {} misses its indicator",
            page.number
        );
        assert!(
            page.instructions.iter().any(|i| matches!(i, DrawInstruction::Text { lines, .. }
                if lines[0] == "21CS042")),
            "page {} misses the roll number",
            page.number
        );
    }
}

#[test]
fn marks_grid_lands_on_its_own_final_page() {
    let mut config = bare_config();
    config.decorations.marks_table = Some(MarksTableConfig {
        grid: Default::default(),
        image: None,
        image_categories: vec![],
    });
    let result = layout(&request(
        config,
        vec![Section::text("Result:", "All readings agree.")],
    ));
    assert_eq!(result.page_count(), 2);
    let last = result.pages.last().unwrap();
    let cells = last
        .instructions
        .iter()
        .filter(|i| matches!(i, DrawInstruction::Rect { .. }))
        .count();
    // Header row + five default rows, three cells each.
    assert_eq!(cells, 18);
    assert_eq!(page_of_text(&result, "Conduct of Experiment"), Some(2));
}

#[test]
fn marks_table_image_variant_substitutes_for_matching_category() {
    let mut config = bare_config();
    config.decorations.marks_table = Some(MarksTableConfig {
        grid: Default::default(),
        image: Some(png_image(600, 300)),
        image_categories: vec!["cse".to_string()],
    });
    let result = layout(&request(
        config,
        vec![Section::text("Result:", "Done.")],
    ));
    let last = result.pages.last().unwrap();
    assert!(
        last.instructions
            .iter()
            .any(|i| matches!(i, DrawInstruction::Image { .. })),
        "matching category gets the pre-rendered table image"
    );
    assert!(page_of_text(&result, "Conduct of Experiment").is_none());
}

// ─── Captions ───────────────────────────────────────────────────

#[test]
fn captions_number_the_images_of_a_group() {
    let mut config = bare_config();
    config.images.captions = true;
    let result = layout(&request(
        config,
        vec![Section::images(
            "Program:",
            vec![png_image(400, 300), png_image(400, 300)],
        )],
    ));
    assert!(page_of_text(&result, "Image 1/2").is_some());
    assert!(page_of_text(&result, "Image 2/2").is_some());
}

#[test]
fn single_image_gets_no_caption() {
    let mut config = bare_config();
    config.images.captions = true;
    let result = layout(&request(
        config,
        vec![Section::images("Program:", vec![png_image(400, 300)])],
    ));
    assert!(page_of_text(&result, "Image 1/1").is_none());
}

// ─── Full pipeline ──────────────────────────────────────────────

#[test]
fn render_json_produces_a_valid_pdf() {
    let json = format!(
        r#"{{
            "meta": {{ "category": "cse", "expNo": "2", "title": "Linked Lists", "rollNo": "21CS007" }},
            "config": {{ "decorations": {{ "footer": {{ "pageNumbers": true }} }} }},
            "sections": [
                {{ "heading": "Aim:", "content": {{ "type": "Text", "body": "Build a singly linked list." }} }},
                {{ "heading": "Program:", "pageBreak": "always-fresh",
                   "content": {{ "type": "Images", "images": ["{}"] }} }},
                {{ "heading": "Result:", "pageBreak": "always-fresh",
                   "content": {{ "type": "Text", "body": "List operations verified." }} }}
            ]
        }}"#,
        png_image(640, 400).src
    );
    let bytes = folio::render_json(&json).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn render_json_rejects_malformed_input() {
    let err = folio::render_json("{ not json").unwrap_err();
    assert!(matches!(err, folio::FolioError::Parse { .. }));
}

#[test]
fn full_record_renders_with_all_decorations() {
    let mut config = LayoutConfig::default();
    config.decorations.footer = Some(FooterConfig::default());
    config.decorations.marks_table = Some(MarksTableConfig {
        grid: Default::default(),
        image: None,
        image_categories: vec![],
    });
    let req = request(
        config,
        vec![
            Section::text("Aim:", "To study the behavior of an RC circuit."),
            Section::text(
                "Procedure:",
                "Assemble the circuit.\nApply the step input.\nRecord the response.",
            ),
            Section::images("Program:", vec![png_image(800, 600)])
                .with_break(PageBreakRule::AlwaysFresh),
            Section::images("Output:", vec![png_image(800, 600), png_image(640, 480)])
                .with_break(PageBreakRule::AlwaysFresh),
            Section::text("Result:", "The time constant matched theory.")
                .with_break(PageBreakRule::AlwaysFresh),
        ],
    );
    let bytes = folio::render(&req);
    assert_valid_pdf(&bytes);

    let result = layout(&req);
    // Program, Output, Result each open a fresh page after page 1.
    let program = page_of_text(&result, "Program:").unwrap();
    let output = page_of_text(&result, "Output:").unwrap();
    let final_section = page_of_text(&result, "Result:").unwrap();
    assert!(program > 1);
    assert!(output > program);
    assert!(final_section > output);
}
