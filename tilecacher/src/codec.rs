//! Storable tile encoding.
//!
//! Fetched tile bytes arrive in whatever format the origin serves (JPEG,
//! PNG, WebP, …). Before persisting, they are decoded and re-encoded as
//! PNG so every stored tile has one transportable, lossless form and a
//! corrupt origin response is caught before it pollutes the store.

use std::io::Cursor;

use image::ImageFormat;
use tracing::trace;

use crate::origin::FetchError;

/// Decode fetched image bytes and re-encode them for storage.
///
/// # Errors
///
/// [`FetchError::Decode`] when the bytes do not decode as a supported
/// raster format or the re-encode fails; a tile that fails here is treated
/// exactly like a failed fetch (skipped, not stored).
pub fn encode_for_store(raw: &[u8]) -> Result<Vec<u8>, FetchError> {
    let decoded = image::load_from_memory(raw)
        .map_err(|e| FetchError::Decode(format!("unsupported tile image: {}", e)))?;

    let mut encoded = Cursor::new(Vec::with_capacity(raw.len()));
    decoded
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|e| FetchError::Decode(format!("PNG re-encode failed: {}", e)))?;

    trace!(
        raw_bytes = raw.len(),
        encoded_bytes = encoded.get_ref().len(),
        "tile re-encoded for storage"
    );

    Ok(encoded.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    /// Build a tiny valid image in the given format.
    pub(crate) fn sample_image_bytes(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([10, 200, 30])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_png_input_roundtrips() {
        let raw = sample_image_bytes(ImageFormat::Png);
        let encoded = encode_for_store(&raw).unwrap();

        let decoded = image::load_from_memory(&encoded).unwrap();
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }

    #[test]
    fn test_jpeg_input_becomes_png() {
        let raw = sample_image_bytes(ImageFormat::Jpeg);
        let encoded = encode_for_store(&raw).unwrap();

        assert_eq!(
            image::guess_format(&encoded).unwrap(),
            ImageFormat::Png,
            "stored form must be PNG regardless of origin format"
        );
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let result = encode_for_store(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        let result = encode_for_store(&[]);
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }
}
