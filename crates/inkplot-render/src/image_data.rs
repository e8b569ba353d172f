//! Decoding of base64 image payloads carried by image commands.

use crate::error::{RenderResult, RendererError};
use base64::{Engine, engine::general_purpose::STANDARD};

/// Decode a payload into raw file bytes. A `data:<mime>;base64,` prefix and
/// embedded whitespace are accepted.
pub fn decode_payload(data: &str) -> RenderResult<Vec<u8>> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| RendererError::InvalidImage(e.to_string()))
}

/// Decode a payload into an RGBA bitmap.
pub fn decode_rgba(data: &str) -> RenderResult<image::RgbaImage> {
    let bytes = decode_payload(data)?;
    let img = image::load_from_memory(&bytes).map_err(|e| RendererError::InvalidImage(e.to_string()))?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// A 2x1 PNG: one opaque red pixel, one half transparent blue pixel.
    pub(crate) fn sample_png_base64() -> String {
        let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 128]).unwrap();
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_decode_plain_and_data_url() {
        let encoded = STANDARD.encode(b"hello");
        assert_eq!(decode_payload(&encoded).unwrap(), b"hello");
        let url = format!("data:image/png;base64,{encoded}");
        assert_eq!(decode_payload(&url).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_invalid() {
        assert!(matches!(decode_payload("%%%"), Err(RendererError::InvalidImage(_))));
        let not_an_image = STANDARD.encode(b"hello");
        assert!(matches!(decode_rgba(&not_an_image), Err(RendererError::InvalidImage(_))));
    }

    #[test]
    fn test_decode_png() {
        let img = decode_rgba(&sample_png_base64()).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 128]);
    }
}
