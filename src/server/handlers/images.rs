//! Image resource handlers.
//!
//! Handlers for the gallery's record lifecycle: listing with filters,
//! single-record reads (which count a view), multipart upload, partial
//! updates, deletion with best-effort file cleanup, the like toggle,
//! trending, and the transactional bulk position update.

use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::super::AppState;
use super::super::error::ApiError;
use super::super::types::{
    BulkPositionsRequest, BulkPositionsResponse, ImageResponse, ImagesResponse, LikeData,
    LikeRequest, LikeResponse, ListImagesResponse, ListParams, MessageResponse, ModifiedData,
    Pagination, TrendingParams, UpdateImageRequest,
};
use crate::constants;
use crate::imaging::{parse_position, parse_tags};
use crate::model::{ImageMetadata, ImagePatch, ImageRecord, Position3};
use crate::store::BulkUpdate;

/// GET /api/images - List images with pagination and filtering.
pub(crate) async fn list_images(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListImagesResponse>, ApiError> {
    let (filter, page, limit) = params.to_filter()?;
    let (records, total) = state.store.list(filter).await?;

    Ok(Json(ListImagesResponse {
        success: true,
        data: records,
        pagination: Pagination {
            total,
            page,
            pages: total.div_ceil(u64::from(limit)),
            limit,
        },
    }))
}

/// GET /api/images/trending - Most viewed images, ties broken by likes.
pub(crate) async fn trending_images(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<ImagesResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(constants::DEFAULT_TRENDING_LIMIT)
        .min(constants::MAX_PAGE_SIZE);
    let records = state.store.trending(limit).await?;
    Ok(Json(ImagesResponse {
        success: true,
        data: records,
    }))
}

/// GET /api/images/{id} - Fetch one image, counting the read as a view.
pub(crate) async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ImageResponse>, ApiError> {
    let record = state
        .store
        .get_and_increment_views(&id)
        .await?
        .ok_or_else(image_not_found)?;

    Ok(Json(ImageResponse {
        success: true,
        data: record,
        message: None,
    }))
}

/// POST /api/images - Multipart upload.
///
/// The `image` part is required and must carry an `image/*` content type;
/// `title`, `description`, `tags`, `position3D`, and `uploadedBy` are
/// optional text parts. Both derived files are on disk before the record
/// is inserted, so a pipeline failure leaves no orphan record.
pub(crate) async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ImageResponse>), ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut title = None;
    let mut description = None;
    let mut tags = None;
    let mut position3d = None;
    let mut uploaded_by = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !content_type.starts_with("image/") {
                    return Err(ApiError::UnsupportedMedia(
                        "Only image files are allowed".to_string(),
                    ));
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, bytes));
            },
            "title" => title = Some(field.text().await.map_err(multipart_error)?),
            "description" => description = Some(field.text().await.map_err(multipart_error)?),
            "tags" => tags = Some(field.text().await.map_err(multipart_error)?),
            "position3D" => position3d = Some(field.text().await.map_err(multipart_error)?),
            "uploadedBy" => uploaded_by = Some(field.text().await.map_err(multipart_error)?),
            // Unrecognized parts are ignored rather than rejected.
            _ => {},
        }
    }

    let Some((filename, bytes)) = file else {
        return Err(ApiError::BadRequest("No image file provided".to_string()));
    };

    let size = bytes.len() as u64;
    let processor = state.processor.clone();
    let stored = tokio::task::spawn_blocking(move || processor.process(&bytes, &filename))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Upload worker failed: {e}")))??;

    let record = ImageRecord {
        id: Uuid::new_v4().to_string(),
        title: title.unwrap_or_default(),
        description: description.unwrap_or_default(),
        image_url: stored.image_url,
        thumbnail_url: stored.thumbnail_url,
        metadata: ImageMetadata {
            width: stored.info.width,
            height: stored.info.height,
            format: stored.info.format,
            size,
            uploaded_by: uploaded_by
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| constants::ANONYMOUS_UPLOADER.to_string()),
        },
        tags: parse_tags(tags.as_deref()),
        position3d: parse_position(position3d.as_deref()),
        views: 0,
        likes: 0,
        created_at: Utc::now(),
    };

    state.store.insert(record.clone()).await?;
    info!(id = %record.id, size, "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(ImageResponse {
            success: true,
            data: record,
            message: Some("Image uploaded successfully".to_string()),
        }),
    ))
}

/// PUT /api/images/{id} - Partial metadata update.
pub(crate) async fn update_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateImageRequest>,
) -> Result<Json<ImageResponse>, ApiError> {
    let patch = ImagePatch {
        title: req.title,
        description: req.description,
        tags: req.tags.map(|t| parse_tags(Some(&t))),
        position3d: req.position3d,
    };

    let record = state
        .store
        .update(&id, patch)
        .await?
        .ok_or_else(image_not_found)?;

    Ok(Json(ImageResponse {
        success: true,
        data: record,
        message: Some("Image updated successfully".to_string()),
    }))
}

/// DELETE /api/images/{id} - Delete the record and both derived files.
///
/// File removal is best-effort: a failed unlink is logged and never blocks
/// the metadata deletion.
pub(crate) async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let record = state.store.delete(&id).await?.ok_or_else(image_not_found)?;

    let processor = state.processor.clone();
    let _ = tokio::task::spawn_blocking(move || {
        processor.remove_variants(&record.image_url, &record.thumbnail_url);
    })
    .await;

    info!(%id, "Image deleted");
    Ok(Json(MessageResponse {
        success: true,
        message: "Image deleted successfully".to_string(),
    }))
}

/// POST /api/images/{id}/like - Adjust the like counter.
///
/// An absent body counts as a like; `{"increment": false}` removes one.
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<LikeRequest>>,
) -> Result<Json<LikeResponse>, ApiError> {
    let increment = body.map_or(true, |Json(req)| req.increment);

    let likes = state
        .store
        .toggle_like(&id, increment)
        .await?
        .ok_or_else(image_not_found)?;

    Ok(Json(LikeResponse {
        success: true,
        data: LikeData { likes },
        message: if increment {
            "Image liked".to_string()
        } else {
            "Like removed".to_string()
        },
    }))
}

/// PUT /api/images/positions/bulk - Transactional bulk position update.
///
/// Either every listed record gets its new `position3D` or, when any id is
/// unknown, none do.
pub(crate) async fn bulk_update_positions(
    State(state): State<AppState>,
    Json(req): Json<BulkPositionsRequest>,
) -> Result<Json<BulkPositionsResponse>, ApiError> {
    let updates: Vec<(String, Position3)> = req
        .positions
        .into_iter()
        .map(|p| (p.id, p.position3d))
        .collect();

    match state.store.update_positions(updates).await? {
        BulkUpdate::Applied(modified) => Ok(Json(BulkPositionsResponse {
            success: true,
            data: ModifiedData { modified },
            message: "Positions updated successfully".to_string(),
        })),
        BulkUpdate::MissingId(id) => Err(ApiError::NotFound(format!("Image '{id}' not found"))),
    }
}

fn image_not_found() -> ApiError {
    ApiError::NotFound("Image not found".to_string())
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!(
            "File size too large. Maximum {}MB allowed",
            constants::MAX_UPLOAD_BYTES / (1024 * 1024)
        ))
    } else {
        ApiError::BadRequest(format!("Invalid multipart payload: {e}"))
    }
}
