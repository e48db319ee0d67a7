//! # Image Resolution
//!
//! Turns an [`ImageRef`](crate::model::ImageRef) source into decoded raster
//! data the layout engine can measure and the PDF serializer can embed.
//! JPEG bytes pass through untouched (the PDF `DCTDecode` filter consumes
//! them natively); PNG is decoded to RGB with a separate alpha channel.
//!
//! Resolution happens during layout, one image at a time, in section
//! order. Nothing is cached across requests.

use std::io::Cursor;

use crate::error::FolioError;
use crate::model::ImageRef;

/// A resolved image: raster payload plus natural pixel dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub pixels: PixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// Raster payload in a form the PDF serializer consumes directly.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// Raw JPEG bytes for DCTDecode pass-through.
    Jpeg { data: Vec<u8>, grayscale: bool },
    /// Decoded RGB triples, with a grayscale alpha channel when the
    /// source carries transparency.
    Rgb {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

/// Resolve an image reference to decoded raster data.
///
/// Supported sources: `data:image/...;base64,...` URIs, raw base64, and
/// file paths starting with `/`, `./` or `../`.
pub fn resolve(image: &ImageRef) -> Result<ResolvedImage, FolioError> {
    let bytes = source_bytes(&image.src)?;
    decode(&bytes).map_err(|msg| FolioError::Image(format!("{}: {}", image.describe(), msg)))
}

fn source_bytes(src: &str) -> Result<Vec<u8>, FolioError> {
    if src.starts_with("data:image/") {
        let comma = src
            .find(',')
            .ok_or_else(|| FolioError::Image("invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma + 1..]);
    }

    // Only explicit path prefixes are treated as files; base64 payloads
    // contain '/' and must not be mistaken for paths.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src)
            .map_err(|e| FolioError::Image(format!("cannot read image file '{}': {}", src, e)));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, FolioError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| FolioError::Image(format!("base64 decode error: {}", e)))
}

fn decode(data: &[u8]) -> Result<ResolvedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }
    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// JPEG: read dimensions without decoding pixels; the raw bytes are kept.
fn decode_jpeg(data: &[u8]) -> Result<ResolvedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("JPEG format detection error: {}", e))?;
    let (width_px, height_px) = reader
        .into_dimensions()
        .map_err(|e| format!("failed to read JPEG dimensions: {}", e))?;

    Ok(ResolvedImage {
        pixels: PixelData::Jpeg {
            data: data.to_vec(),
            grayscale: jpeg_is_grayscale(data),
        },
        width_px,
        height_px,
    })
}

/// Scan JPEG markers for the SOF segment; one component means grayscale.
fn jpeg_is_grayscale(data: &[u8]) -> bool {
    let mut i = 2; // skip SOI
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof {
            if i + 9 < data.len() {
                return data[i + 9] == 1;
            }
            break;
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    false
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<ResolvedImage, String> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("PNG format detection error: {}", e))?;
    let img = reader
        .decode()
        .map_err(|e| format!("failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let (width_px, height_px) = (rgba.width(), rgba.height());

    let pixel_count = (width_px * height_px) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(ResolvedImage {
        pixels: PixelData::Rgb {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px,
        height_px,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |_, _| image::Rgba([40, 90, 200, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            width,
            height,
            image::ColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn magic_byte_sniffing() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0xFF, 0xD8]));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode(&[0x00, 0x01]).is_err());
        assert!(decode(&[0x00, 0x01, 0x02, 0x03, 0x04]).is_err());
    }

    #[test]
    fn png_resolves_with_dimensions() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2));
        let resolved = resolve(&ImageRef::new(b64)).unwrap();
        assert_eq!((resolved.width_px, resolved.height_px), (3, 2));
        match resolved.pixels {
            PixelData::Rgb { ref rgb, ref alpha } => {
                assert_eq!(rgb.len(), 3 * 2 * 3);
                assert!(alpha.is_none(), "opaque PNG should carry no alpha");
            }
            _ => panic!("PNG should resolve to Rgb"),
        }
    }

    #[test]
    fn png_alpha_is_preserved() {
        let img = image::RgbaImage::from_fn(2, 2, |_, _| image::Rgba([255, 0, 0, 128]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgba8)
            .unwrap();

        let resolved = decode(&buf).unwrap();
        match resolved.pixels {
            PixelData::Rgb { alpha, .. } => assert_eq!(alpha.unwrap(), vec![128; 4]),
            _ => panic!("PNG should resolve to Rgb"),
        }
    }

    #[test]
    fn jpeg_passes_through() {
        let img = image::RgbImage::from_fn(4, 4, |_, _| image::Rgb([10, 20, 30]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 4, 4, image::ColorType::Rgb8)
            .unwrap();

        let resolved = decode(&buf).unwrap();
        assert_eq!((resolved.width_px, resolved.height_px), (4, 4));
        match resolved.pixels {
            PixelData::Jpeg { data, grayscale } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert!(!grayscale);
            }
            _ => panic!("JPEG should stay as Jpeg"),
        }
    }

    #[test]
    fn data_uri_resolves() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(1, 1));
        let uri = format!("data:image/png;base64,{}", b64);
        let resolved = resolve(&ImageRef::new(uri)).unwrap();
        assert_eq!((resolved.width_px, resolved.height_px), (1, 1));
    }

    #[test]
    fn malformed_data_uri_is_an_error() {
        assert!(resolve(&ImageRef::new("data:image/png;base64")).is_err());
    }
}
