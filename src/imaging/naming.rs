//! Derived-file naming.
//!
//! Both variants of an upload share a timestamp + sanitized stem so they
//! sort together on disk; the `full-`/`thumb-` prefix tells them apart.

use std::path::Path;

/// Fallback stem when sanitizing leaves nothing usable.
const DEFAULT_STEM: &str = "image";

/// Reduce an uploaded filename to a safe stem: the extension is dropped and
/// anything outside `[A-Za-z0-9._-]` becomes a dash.
pub fn sanitize_stem(original_filename: &str) -> String {
    let stem = Path::new(original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let sanitized: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if sanitized.chars().all(|c| c == '-' || c == '.') {
        DEFAULT_STEM.to_string()
    } else {
        sanitized
    }
}

/// Filenames for the two derived encodings of one upload.
pub fn variant_filenames(timestamp_millis: i64, original_filename: &str) -> (String, String) {
    let stem = sanitize_stem(original_filename);
    (
        format!("full-{timestamp_millis}-{stem}.jpg"),
        format!("thumb-{timestamp_millis}-{stem}.jpg"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_extension_and_path() {
        assert_eq!(sanitize_stem("holiday.png"), "holiday");
        assert_eq!(sanitize_stem("trip/2026 summer.jpeg"), "2026-summer");
    }

    #[test]
    fn unsafe_characters_become_dashes() {
        assert_eq!(sanitize_stem("caf\u{e9} & bar!.jpg"), "caf----bar-");
    }

    #[test]
    fn empty_or_degenerate_stems_fall_back() {
        assert_eq!(sanitize_stem(""), "image");
        assert_eq!(sanitize_stem("???.jpg"), "image");
    }

    #[test]
    fn variants_share_timestamp_and_stem() {
        let (full, thumb) = variant_filenames(1700000000000, "sunset.webp");
        assert_eq!(full, "full-1700000000000-sunset.jpg");
        assert_eq!(thumb, "thumb-1700000000000-sunset.jpg");
    }
}
