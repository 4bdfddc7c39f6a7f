use image::{ExtendedColorType, RgbaImage, codecs::jpeg::JpegEncoder};

use crate::error::{StatcardError, StatcardResult};

/// Fixed encoder quality. Changing it (or anything else about the encode
/// parameters) breaks byte-identical reproduction of the golden fixtures.
const JPEG_QUALITY: u8 = 90;

/// Flatten the finished canvas over opaque black and encode it as a
/// baseline JPEG with fixed parameters. All-or-nothing: an encoder failure
/// yields no bytes at all.
pub fn encode_jpeg(canvas: &RgbaImage) -> StatcardResult<Vec<u8>> {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return Err(StatcardError::encode("cannot encode an empty canvas"));
    }

    let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
    for px in canvas.pixels() {
        let a = u16::from(px.0[3]);
        for c in 0..3 {
            rgb.push(((u16::from(px.0[c]) * a + 127) / 255) as u8);
        }
    }

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
        .encode(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| StatcardError::encode(format!("jpeg encode failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn identical_canvases_encode_identically() {
        let img = RgbaImage::from_fn(64, 48, |x, y| {
            Rgba([(x * 4) as u8, (y * 5) as u8, 128, 255])
        });
        let a = encode_jpeg(&img).unwrap();
        let b = encode_jpeg(&img).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn alpha_flattens_over_black() {
        let img = RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 0]));
        let bytes = encode_jpeg(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        // fully transparent white flattens to black
        assert!(decoded.get_pixel(8, 8).0.iter().all(|&c| c < 8));
    }

    #[test]
    fn empty_canvas_is_an_encode_error() {
        let img = RgbaImage::new(0, 0);
        let err = encode_jpeg(&img).unwrap_err();
        assert!(err.to_string().contains("encode"));
    }
}
