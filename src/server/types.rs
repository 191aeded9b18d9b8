//! Request and response types for the HTTP API.
//!
//! Responses use the envelope the gallery client consumes: `success` plus
//! `data`, with `pagination` on listings and `message` on mutations.
//! Request query types recognize a fixed key set; unrecognized keys are
//! ignored, invalid values are rejected with a 400.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::constants;
use crate::imaging::parse_tags;
use crate::model::{ImageRecord, Position3};
use crate::store::{ListFilter, SortDir, SortKey};

// =============================================================================
// Requests
// =============================================================================

/// Query parameters for listing endpoints: `page`, `limit`, `sortBy`,
/// `sort`, `tags`, `search`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort: Option<String>,
    pub tags: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    /// Validate into a store filter plus the resolved page/limit pair.
    ///
    /// Defaults: page 1, limit [`constants::DEFAULT_PAGE_SIZE`] (capped at
    /// [`constants::MAX_PAGE_SIZE`]), newest first.
    pub fn to_filter(&self) -> Result<(ListFilter, u32, u32), ApiError> {
        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(ApiError::BadRequest("page must be at least 1".to_string()));
        }

        let limit = self.limit.unwrap_or(constants::DEFAULT_PAGE_SIZE);
        if limit == 0 {
            return Err(ApiError::BadRequest("limit must be at least 1".to_string()));
        }
        let limit = limit.min(constants::MAX_PAGE_SIZE);

        let sort_by = match self.sort_by.as_deref() {
            None => SortKey::default(),
            Some(key) => SortKey::parse(key).ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "Unknown sortBy '{key}'. Valid keys: createdAt, title, views, likes"
                ))
            })?,
        };

        let sort_dir = match self.sort.as_deref() {
            None => SortDir::default(),
            Some(dir) => SortDir::parse(dir).ok_or_else(|| {
                ApiError::BadRequest(format!("Unknown sort '{dir}'. Valid values: asc, desc"))
            })?,
        };

        let filter = ListFilter {
            search: self.search.clone().filter(|s| !s.is_empty()),
            tags: parse_tags(self.tags.as_deref()),
            sort_by,
            sort_dir,
            limit,
            offset: (page - 1).saturating_mul(limit),
        };

        Ok((filter, page, limit))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingParams {
    pub limit: Option<u32>,
}

/// Layout selection, read alongside [`ListParams`] on the layout endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct LayoutSelect {
    /// Layout mode name; unrecognized values fall back to `web`.
    pub mode: Option<String>,
    /// Seed for reproducible placements. Omit for a fresh scatter.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateImageRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Comma-separated, like the upload form field.
    pub tags: Option<String>,
    #[serde(rename = "position3D")]
    pub position3d: Option<Position3>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LikeRequest {
    /// `true` likes, `false` removes a like. Defaults to `true` when the
    /// request carries no body.
    #[serde(default = "default_increment")]
    pub increment: bool,
}

fn default_increment() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkPositionsRequest {
    pub positions: Vec<PositionUpdate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PositionUpdate {
    pub id: String,
    #[serde(rename = "position3D")]
    pub position3d: Position3,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct Pagination {
    pub total: u64,
    pub page: u32,
    pub pages: u64,
    pub limit: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListImagesResponse {
    pub success: bool,
    pub data: Vec<ImageRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImagesResponse {
    pub success: bool,
    pub data: Vec<ImageRecord>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageResponse {
    pub success: bool,
    pub data: ImageRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LikeResponse {
    pub success: bool,
    pub data: LikeData,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LikeData {
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkPositionsResponse {
    pub success: bool,
    pub data: ModifiedData,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModifiedData {
    pub modified: usize,
}

/// A record enriched with a computed placement. The persisted
/// `position3D` field is untouched; `position`/`rotation` are this call's
/// layout output.
#[derive(Debug, Serialize)]
pub(crate) struct PositionedImage {
    #[serde(flatten)]
    pub record: ImageRecord,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

#[derive(Debug, Serialize)]
pub(crate) struct LayoutResponse {
    pub success: bool,
    pub mode: &'static str,
    pub data: Vec<PositionedImage>,
    /// Canonical `[lower, higher]` index pairs; only present in web mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<[usize; 2]>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: &'static str,
}
