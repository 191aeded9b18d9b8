//! Resize and re-encode operations for upload variants.
//!
//! Two fixed derivations are produced from every accepted upload:
//!
//! | Variant | Geometry | Encoding |
//! |---|---|---|
//! | full | fit within 2048x2048, never upscaled | JPEG quality 85 |
//! | thumbnail | fill-resize + center-crop to exactly 512x512 | JPEG quality 80 |
//!
//! Raster metadata (width/height/format) is read from the *source* bytes,
//! not from the derived output.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::constants::{
    FULL_JPEG_QUALITY, FULL_MAX_DIMENSION, THUMBNAIL_JPEG_QUALITY, THUMBNAIL_SIZE,
};

/// Errors from the image pipeline. All of them surface as a server-side
/// failure at the request boundary; none are recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum ImagingError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Raster properties of the source upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// Decode the raw upload into pixels.
///
/// # Errors
///
/// Returns [`ImagingError::Decode`] when the payload is not a decodable
/// image (truncated file, unsupported container).
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    image::load_from_memory(bytes).map_err(|e| ImagingError::Decode(e.to_string()))
}

/// Sniff the container format and read source dimensions.
pub fn inspect(bytes: &[u8], decoded: &DynamicImage) -> Result<RasterInfo, ImagingError> {
    let format = image::guess_format(bytes).map_err(|e| ImagingError::Decode(e.to_string()))?;
    Ok(RasterInfo {
        width: decoded.width(),
        height: decoded.height(),
        format: format_name(format),
    })
}

/// The full-size variant: proportionally resized so neither dimension
/// exceeds [`FULL_MAX_DIMENSION`]; sources already within the cap pass
/// through ungeometried (they are still re-encoded).
pub fn derive_full(source: &DynamicImage) -> DynamicImage {
    if source.width() <= FULL_MAX_DIMENSION && source.height() <= FULL_MAX_DIMENSION {
        return source.clone();
    }
    source.resize(FULL_MAX_DIMENSION, FULL_MAX_DIMENSION, FilterType::Lanczos3)
}

/// The thumbnail variant: fill-resized then center-cropped to an exact
/// [`THUMBNAIL_SIZE`] square, whatever the source aspect ratio.
pub fn derive_thumbnail(source: &DynamicImage) -> DynamicImage {
    source.resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3)
}

/// Encode as JPEG at the given quality.
///
/// Sources with alpha are flattened to RGB first; JPEG has no alpha
/// channel and the encoder rejects RGBA input.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImagingError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Encode the full-size variant.
pub fn encode_full(source: &DynamicImage) -> Result<Vec<u8>, ImagingError> {
    encode_jpeg(&derive_full(source), FULL_JPEG_QUALITY)
}

/// Encode the thumbnail variant.
pub fn encode_thumbnail(source: &DynamicImage) -> Result<Vec<u8>, ImagingError> {
    encode_jpeg(&derive_thumbnail(source), THUMBNAIL_JPEG_QUALITY)
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        other => other
            .extensions_str()
            .first()
            .map_or_else(|| "unknown".to_string(), |ext| (*ext).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    /// Encode a flat-color JPEG in memory with the given dimensions.
    fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 90, 60]),
        ));
        encode_jpeg(&img, 90).unwrap()
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(ImagingError::Decode(_))
        ));
    }

    #[test]
    fn inspect_reads_source_dimensions_and_format() {
        let bytes = test_jpeg(321, 123);
        let img = decode(&bytes).unwrap();
        let info = inspect(&bytes, &img).unwrap();
        assert_eq!(
            info,
            RasterInfo {
                width: 321,
                height: 123,
                format: "jpeg".into(),
            }
        );
    }

    #[test]
    fn inspect_names_png_sources() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        let bytes = buf.into_inner();

        let decoded = decode(&bytes).unwrap();
        let info = inspect(&bytes, &decoded).unwrap();
        assert_eq!(info.format, "png");
    }

    #[test]
    fn full_variant_caps_longest_side() {
        let bytes = test_jpeg(4000, 3000);
        let source = decode(&bytes).unwrap();

        let full = decode(&encode_full(&source).unwrap()).unwrap();
        assert_eq!(full.width().max(full.height()), 2048);
        assert!(full.width() <= source.width());
        assert!(full.height() <= source.height());
        // Aspect ratio preserved: 4:3 at the cap.
        assert_eq!((full.width(), full.height()), (2048, 1536));
    }

    #[test]
    fn full_variant_never_upscales() {
        let bytes = test_jpeg(800, 600);
        let source = decode(&bytes).unwrap();

        let full = decode(&encode_full(&source).unwrap()).unwrap();
        assert_eq!((full.width(), full.height()), (800, 600));
    }

    #[test]
    fn thumbnail_is_exact_square_for_any_aspect() {
        for (w, h) in [(4000, 3000), (300, 900), (512, 512), (513, 200)] {
            let source = decode(&test_jpeg(w, h)).unwrap();
            let thumb = decode(&encode_thumbnail(&source).unwrap()).unwrap();
            assert_eq!(
                (thumb.width(), thumb.height()),
                (512, 512),
                "source {w}x{h}"
            );
        }
    }

    #[test]
    fn jpeg_encoding_flattens_alpha() {
        let rgba = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
            16,
            16,
            image::Rgba([10, 20, 30, 128]),
        ));
        let bytes = encode_jpeg(&rgba, 85).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }
}
