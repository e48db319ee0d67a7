//! # PDF Serializer
//!
//! The rendering sink: takes a [`LayoutResult`] and writes a valid PDF 1.7
//! file from scratch. Writing the raw bytes ourselves keeps the tool
//! self-contained; the subset of the PDF spec a record document needs is
//! manageable.
//!
//! The layout works in millimetres with y growing downward from the top
//! of the page; PDF works in points with y growing upward. This module
//! owns that conversion.
//!
//! ## PDF structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, fonts, pages, streams, images)
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the root object
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::config::{LINE_HEIGHT, RULE_WIDTH};
use crate::image_probe::{PixelData, ResolvedImage};
use crate::layout::{DrawInstruction, LayoutResult, Page};
use crate::model::RecordMeta;
use crate::text::FontSpec;

/// Points per millimetre.
const PT_PER_MM: f64 = 72.0 / 25.4;

/// The four standard Helvetica variants, registered unconditionally as
/// /F0../F3 in the order (regular, bold, oblique, bold-oblique).
const FONT_NAMES: [&str; 4] = [
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
];

fn font_index(font: &FontSpec) -> usize {
    match (font.bold, font.italic) {
        (false, false) => 0,
        (true, false) => 1,
        (false, true) => 2,
        (true, true) => 3,
    }
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize a layout result to PDF bytes.
    pub fn write(&self, layout: &LayoutResult, meta: &RecordMeta) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
        };

        // Object IDs: 0 is the PDF free-list placeholder, 1 the Catalog,
        // 2 the page tree root, 3..=6 the four fonts. Everything after is
        // images, content streams, and page objects.
        builder.push(vec![]);
        builder.push(vec![]);
        builder.push(vec![]);
        let font_object_ids: Vec<usize> = FONT_NAMES
            .iter()
            .map(|name| {
                builder.push(
                    format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        name
                    )
                    .into_bytes(),
                )
            })
            .collect();

        let page_width_pt = layout.page_width * PT_PER_MM;
        let page_height_pt = layout.page_height * PT_PER_MM;

        let mut page_object_ids: Vec<usize> = Vec::new();
        let mut next_image_index = 0usize;

        for page in &layout.pages {
            // Register this page's images first so the content stream can
            // reference them by /Im index.
            let mut page_images: Vec<(usize, usize)> = Vec::new();
            for instruction in &page.instructions {
                if let DrawInstruction::Image { image, .. } = instruction {
                    let obj_id = write_image_xobject(&mut builder, image);
                    page_images.push((next_image_index, obj_id));
                    next_image_index += 1;
                }
            }

            let content = self.build_content_stream(page, layout.page_height, &page_images);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let font_resources: String = font_object_ids
                .iter()
                .enumerate()
                .map(|(i, obj_id)| format!("/F{} {} 0 R", i, obj_id))
                .collect::<Vec<_>>()
                .join(" ");
            let xobject_resources: String = page_images
                .iter()
                .map(|(index, obj_id)| format!("/Im{} {} 0 R", index, obj_id))
                .collect::<Vec<_>>()
                .join(" ");
            let mut resources = format!("/Font << {} >>", font_resources);
            if !xobject_resources.is_empty() {
                let _ = write!(resources, " /XObject << {} >>", xobject_resources);
            }

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page_width_pt, page_height_pt, content_obj_id, resources
            );
            page_object_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_object_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_object_ids.len()
        )
        .into_bytes();

        let mut info = String::from("<< ");
        let _ = write!(
            info,
            "/Title ({}) ",
            escape_pdf_string(&format!("Experiment {}: {}", meta.exp_no, meta.title))
        );
        if !meta.roll_no.is_empty() {
            let _ = write!(info, "/Author ({}) ", escape_pdf_string(&meta.roll_no));
        }
        let _ = write!(info, "/Producer (folio 0.3) /Creator (folio) >>");
        let info_obj_id = builder.push(info.into_bytes());

        serialize(&builder, info_obj_id)
    }

    /// Build the content stream for one page.
    fn build_content_stream(
        &self,
        page: &Page,
        page_height_mm: f64,
        page_images: &[(usize, usize)],
    ) -> String {
        let mut stream = String::new();
        let mut image_cursor = 0usize;

        for instruction in &page.instructions {
            match instruction {
                DrawInstruction::Text { lines, x, y, font } => {
                    let font_name = format!("F{}", font_index(font));
                    for (i, line) in lines.iter().enumerate() {
                        if line.is_empty() {
                            continue;
                        }
                        let baseline_mm = y + i as f64 * LINE_HEIGHT;
                        let _ = write!(
                            stream,
                            "BT\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                            font_name,
                            font.size,
                            x * PT_PER_MM,
                            (page_height_mm - baseline_mm) * PT_PER_MM,
                            escape_pdf_string(line)
                        );
                    }
                }

                DrawInstruction::Image {
                    x, y, width, height, ..
                } => {
                    let (index, _) = page_images[image_cursor];
                    image_cursor += 1;
                    // cm scales the unit image square, then translates it
                    // to its bottom-left corner.
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        width * PT_PER_MM,
                        height * PT_PER_MM,
                        x * PT_PER_MM,
                        (page_height_mm - y - height) * PT_PER_MM,
                        index
                    );
                }

                DrawInstruction::Rect {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let _ = write!(
                        stream,
                        "q\n{:.2} w\n{:.2} {:.2} {:.2} {:.2} re\nS\nQ\n",
                        RULE_WIDTH * PT_PER_MM,
                        x * PT_PER_MM,
                        (page_height_mm - y - height) * PT_PER_MM,
                        width * PT_PER_MM,
                        height * PT_PER_MM
                    );
                }

                DrawInstruction::Line { x1, y1, x2, y2 } => {
                    let _ = write!(
                        stream,
                        "q\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        RULE_WIDTH * PT_PER_MM,
                        x1 * PT_PER_MM,
                        (page_height_mm - y1) * PT_PER_MM,
                        x2 * PT_PER_MM,
                        (page_height_mm - y2) * PT_PER_MM
                    );
                }
            }
        }

        stream
    }
}

/// Write an image as one or two XObjects (SMask for PNG alpha).
/// Returns the main XObject ID.
fn write_image_xobject(builder: &mut PdfBuilder, image: &ResolvedImage) -> usize {
    match &image.pixels {
        PixelData::Jpeg { data, grayscale } => {
            let color_space = if *grayscale {
                "/DeviceGray"
            } else {
                "/DeviceRGB"
            };
            let mut obj_data: Vec<u8> = Vec::new();
            let _ = write!(
                obj_data,
                "<< /Type /XObject /Subtype /Image \
                 /Width {} /Height {} \
                 /ColorSpace {} \
                 /BitsPerComponent 8 \
                 /Filter /DCTDecode \
                 /Length {} >>\nstream\n",
                image.width_px,
                image.height_px,
                color_space,
                data.len()
            );
            obj_data.extend_from_slice(data);
            obj_data.extend_from_slice(b"\nendstream");
            builder.push(obj_data)
        }

        PixelData::Rgb { rgb, alpha } => {
            let smask_id = alpha.as_ref().map(|alpha_data| {
                let compressed = compress_to_vec_zlib(alpha_data, 6);
                let mut smask_data: Vec<u8> = Vec::new();
                let _ = write!(
                    smask_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceGray \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed.len()
                );
                smask_data.extend_from_slice(&compressed);
                smask_data.extend_from_slice(b"\nendstream");
                builder.push(smask_data)
            });

            let compressed = compress_to_vec_zlib(rgb, 6);
            let smask_ref = smask_id
                .map(|id| format!(" /SMask {} 0 R", id))
                .unwrap_or_default();
            let mut obj_data: Vec<u8> = Vec::new();
            let _ = write!(
                obj_data,
                "<< /Type /XObject /Subtype /Image \
                 /Width {} /Height {} \
                 /ColorSpace /DeviceRGB \
                 /BitsPerComponent 8 \
                 /Filter /FlateDecode \
                 /Length {}{} >>\nstream\n",
                image.width_px,
                image.height_px,
                compressed.len(),
                smask_ref
            );
            obj_data.extend_from_slice(&compressed);
            obj_data.extend_from_slice(b"\nendstream");
            builder.push(obj_data)
        }
    }
}

/// Escape special characters in a PDF literal string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Serialize all objects into the final PDF byte stream.
fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

    output.extend_from_slice(b"%PDF-1.7\n");
    output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

    for (i, obj) in builder.objects.iter().enumerate().skip(1) {
        offsets[i] = output.len();
        let header = format!("{} 0 obj\n", i);
        output.extend_from_slice(header.as_bytes());
        output.extend_from_slice(&obj.data);
        output.extend_from_slice(b"\nendobj\n\n");
    }

    let xref_offset = output.len();
    let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
    let _ = write!(output, "0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        let _ = write!(output, "{:010} 00000 n \n", offset);
    }

    let _ = write!(
        output,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        builder.objects.len(),
        info_obj_id,
        xref_offset
    );

    output
}
