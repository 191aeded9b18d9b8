//! Domain types for gallery records.
//!
//! All types serialize with the camelCase field names the HTTP API exposes
//! (`imageUrl`, `position3D`, ...). The store persists the same shapes, so
//! a record round-trips unchanged from upload response to list response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A 3D coordinate assigned to an image for spatial placement.
///
/// Positions carry no cross-record invariant: two records may coincide and
/// no collision avoidance is performed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position3 {
    /// The fallback position used when an upload supplies no (or malformed)
    /// `position3D` field.
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Position as an `[x, y, z]` array, the form the layout engine uses.
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Raster properties extracted from the *source* upload, not from the
/// derived variants. Set once at upload and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    /// Container format sniffed from the source bytes ("jpeg", "png", ...).
    pub format: String,
    /// Source payload size in bytes.
    pub size: u64,
    pub uploaded_by: String,
}

/// The persisted gallery entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Unique identifier, assigned at creation, immutable.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Relative path of the full-size variant, always under `/uploads/`.
    /// Set once at upload; a re-upload creates a new record.
    pub image_url: String,
    /// Relative path of the thumbnail variant. Always present together
    /// with `image_url`: no record exists with only one derived file.
    pub thumbnail_url: String,
    pub metadata: ImageMetadata,
    /// Ordered tag list; querying treats it as a set.
    pub tags: Vec<String>,
    #[serde(rename = "position3D")]
    pub position3d: Position3,
    /// Incremented on every single-record read.
    pub views: i64,
    /// Adjusted up or down by the like toggle.
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

/// Partial update applied to a record's mutable fields.
///
/// `None` fields are left untouched; immutable fields (urls, metadata,
/// counters, timestamps) have no representation here by design of the API.
#[derive(Debug, Clone, Default)]
pub struct ImagePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub position3d: Option<Position3>,
}

impl ImagePatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.position3d.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_round_trips_through_array() {
        let pos = Position3::new(1.5, -2.0, 0.25);
        assert_eq!(Position3::from_array(pos.to_array()), pos);
    }

    #[test]
    fn record_serializes_with_camel_case_wire_names() {
        let record = ImageRecord {
            id: "abc".into(),
            title: "t".into(),
            description: String::new(),
            image_url: "/uploads/full-1-a.jpg".into(),
            thumbnail_url: "/uploads/thumb-1-a.jpg".into(),
            metadata: ImageMetadata {
                width: 10,
                height: 20,
                format: "jpeg".into(),
                size: 123,
                uploaded_by: "Anonymous".into(),
            },
            tags: vec!["x".into()],
            position3d: Position3::ORIGIN,
            views: 0,
            likes: 0,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("thumbnailUrl").is_some());
        assert!(json.get("position3D").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["metadata"]["uploadedBy"], "Anonymous");
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ImagePatch::default().is_empty());
        let patch = ImagePatch {
            title: Some("new".into()),
            ..ImagePatch::default()
        };
        assert!(!patch.is_empty());
    }
}
