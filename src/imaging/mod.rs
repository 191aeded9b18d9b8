//! Upload processing: form-field parsing, variant derivation, file layout.
//!
//! The processor receives one raw image buffer plus optional text fields
//! and produces two derived encodings (full + thumbnail) on disk before the
//! caller creates any metadata record. Failure anywhere in this module
//! leaves no record behind; a stray file at worst.

mod naming;
mod pipeline;

pub use naming::{sanitize_stem, variant_filenames};
pub use pipeline::{
    ImagingError, RasterInfo, decode, derive_full, derive_thumbnail, encode_full, encode_jpeg,
    encode_thumbnail, inspect,
};

use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::constants::UPLOADS_PREFIX;
use crate::model::Position3;

/// Split a comma-separated tag field into trimmed, non-empty tags.
/// An absent field yields an empty set.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Parse the `position3D` form field.
///
/// Malformed JSON degrades to the origin with a logged warning rather than
/// failing the upload.
pub fn parse_position(raw: Option<&str>) -> Position3 {
    let Some(raw) = raw else {
        return Position3::ORIGIN;
    };
    match serde_json::from_str::<Position3>(raw) {
        Ok(pos) => pos,
        Err(e) => {
            warn!(error = %e, "Invalid position3D field, falling back to origin");
            Position3::ORIGIN
        },
    }
}

/// The on-disk result of processing one upload: relative URLs for both
/// variants plus the source raster properties.
#[derive(Debug, Clone)]
pub struct StoredVariants {
    pub image_url: String,
    pub thumbnail_url: String,
    pub info: RasterInfo,
}

/// Derives and writes upload variants under a fixed uploads directory.
///
/// All methods are blocking (decode + two Lanczos resizes are CPU-bound);
/// callers on the async runtime wrap them in `spawn_blocking`.
#[derive(Debug, Clone)]
pub struct UploadProcessor {
    uploads_dir: PathBuf,
}

impl UploadProcessor {
    pub fn new<P: Into<PathBuf>>(uploads_dir: P) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    /// Run the full pipeline for one upload: decode, derive both variants,
    /// and write them to the uploads directory.
    ///
    /// Both files are on disk when this returns `Ok`, so the caller can
    /// safely create the metadata record afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not decode, a variant fails to
    /// encode, or the directory/file writes fail. No metadata is created in
    /// any of these cases.
    pub fn process(
        &self,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<StoredVariants, ImagingError> {
        let source = decode(bytes)?;
        let info = inspect(bytes, &source)?;

        let full = encode_full(&source)?;
        let thumbnail = encode_thumbnail(&source)?;

        let (full_name, thumb_name) =
            variant_filenames(Utc::now().timestamp_millis(), original_filename);

        fs::create_dir_all(&self.uploads_dir)?;
        fs::write(self.uploads_dir.join(&full_name), full)?;
        fs::write(self.uploads_dir.join(&thumb_name), thumbnail)?;

        Ok(StoredVariants {
            image_url: format!("{UPLOADS_PREFIX}/{full_name}"),
            thumbnail_url: format!("{UPLOADS_PREFIX}/{thumb_name}"),
            info,
        })
    }

    /// Best-effort removal of both derived files for a deleted record.
    ///
    /// A failed unlink logs a warning and never propagates: file cleanup
    /// must not block metadata deletion.
    pub fn remove_variants(&self, image_url: &str, thumbnail_url: &str) {
        for url in [image_url, thumbnail_url] {
            let Some(name) = variant_file_name(url) else {
                warn!(%url, "Refusing to delete derived file outside the uploads directory");
                continue;
            };
            let path = self.uploads_dir.join(name);
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to delete derived file");
            }
        }
    }
}

/// Extract the bare file name from a stored `/uploads/...` URL, rejecting
/// anything that could escape the uploads directory.
fn variant_file_name(url: &str) -> Option<&str> {
    let name = url.strip_prefix(UPLOADS_PREFIX)?.strip_prefix('/')?;
    if name.is_empty() || name.contains('/') || name.contains("..") {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 100, 50]),
        ));
        encode_jpeg(&img, 90).unwrap()
    }

    #[test]
    fn tags_split_trim_and_drop_empties() {
        assert_eq!(parse_tags(Some("x, y")), vec!["x", "y"]);
        assert_eq!(parse_tags(Some(" a ,, b ,")), vec!["a", "b"]);
        assert_eq!(parse_tags(Some("")), Vec::<String>::new());
        assert_eq!(parse_tags(None), Vec::<String>::new());
    }

    #[test]
    fn position_parses_valid_json() {
        let pos = parse_position(Some(r#"{"x": 1.5, "y": -2.0, "z": 3.0}"#));
        assert_eq!(pos, Position3::new(1.5, -2.0, 3.0));
    }

    #[test]
    fn malformed_position_falls_back_to_origin() {
        assert_eq!(parse_position(Some("{not json}")), Position3::ORIGIN);
        assert_eq!(parse_position(Some("null")), Position3::ORIGIN);
        assert_eq!(parse_position(Some(r#"{"x": 1.0}"#)), Position3::ORIGIN);
        assert_eq!(parse_position(None), Position3::ORIGIN);
    }

    #[test]
    fn process_writes_both_variants() {
        let dir = tempfile::TempDir::new().unwrap();
        let processor = UploadProcessor::new(dir.path());

        let stored = processor.process(&test_jpeg(1200, 900), "shot.png").unwrap();

        assert!(stored.image_url.starts_with("/uploads/full-"));
        assert!(stored.thumbnail_url.starts_with("/uploads/thumb-"));
        assert_ne!(stored.image_url, stored.thumbnail_url);
        assert_eq!(stored.info.width, 1200);
        assert_eq!(stored.info.height, 900);

        for url in [&stored.image_url, &stored.thumbnail_url] {
            let name = url.strip_prefix("/uploads/").unwrap();
            let on_disk = dir.path().join(name);
            assert!(on_disk.exists(), "missing {}", on_disk.display());
            assert!(std::fs::metadata(&on_disk).unwrap().len() > 0);
        }
    }

    #[test]
    fn process_creates_uploads_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("uploads");
        let processor = UploadProcessor::new(&nested);

        processor.process(&test_jpeg(64, 64), "a.jpg").unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn process_rejects_undecodable_payload() {
        let dir = tempfile::TempDir::new().unwrap();
        let processor = UploadProcessor::new(dir.path());
        assert!(processor.process(b"not an image", "a.jpg").is_err());
        // Nothing written for a rejected payload.
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn remove_variants_is_best_effort() {
        let dir = tempfile::TempDir::new().unwrap();
        let processor = UploadProcessor::new(dir.path());
        let stored = processor.process(&test_jpeg(64, 64), "a.jpg").unwrap();

        // One real file, one already missing, one traversal attempt: none
        // of these may panic or error.
        processor.remove_variants(&stored.image_url, "/uploads/thumb-0-gone.jpg");
        processor.remove_variants("/uploads/../etc/passwd", &stored.thumbnail_url);

        let remaining: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(remaining.is_empty());
    }

    #[test]
    fn variant_file_name_guards_traversal() {
        assert_eq!(
            variant_file_name("/uploads/full-1-a.jpg"),
            Some("full-1-a.jpg")
        );
        assert_eq!(variant_file_name("/uploads/../secrets"), None);
        assert_eq!(variant_file_name("/uploads/a/b.jpg"), None);
        assert_eq!(variant_file_name("/elsewhere/a.jpg"), None);
        assert_eq!(variant_file_name("/uploads/"), None);
    }
}
