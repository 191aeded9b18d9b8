//! Layout handler.
//!
//! Computes placements server-side for the current (filtered) gallery.
//! Nothing is persisted: every call is a fresh arrangement, and clients
//! that want to keep one use the bulk position update afterwards.

use axum::Json;
use axum::extract::{Query, State};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::super::AppState;
use super::super::error::ApiError;
use super::super::types::{LayoutResponse, LayoutSelect, ListParams, PositionedImage};
use crate::constants;
use crate::layout::{self, LayoutMode};

/// GET /api/images/layout - Arrange the gallery in a layout mode.
///
/// Accepts the listing filters plus `mode` (unrecognized values fall back
/// to `web`) and an optional `seed` for reproducible output. Web mode also
/// returns the nearest-neighbor connection edges.
pub(crate) async fn layout_images(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(select): Query<LayoutSelect>,
) -> Result<Json<LayoutResponse>, ApiError> {
    let (mut filter, _, _) = params.to_filter()?;
    // A layout spans the whole view, not a listing page: default to the
    // cap unless the caller narrowed it explicitly.
    if params.limit.is_none() {
        filter.limit = constants::MAX_PAGE_SIZE;
    }

    let (records, _) = state.store.list(filter).await?;

    let mode = select
        .mode
        .as_deref()
        .map(LayoutMode::parse)
        .unwrap_or_default();
    let mut rng = match select.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let arranged = layout::arrange(records, mode, &mut rng);

    let connections = (mode == LayoutMode::Web).then(|| {
        let positions: Vec<[f64; 3]> = arranged.iter().map(|(_, p)| p.position).collect();
        layout::connections(&positions)
            .into_iter()
            .map(|(a, b)| [a, b])
            .collect()
    });

    let data = arranged
        .into_iter()
        .map(|(record, placement)| PositionedImage {
            record,
            position: placement.position,
            rotation: placement.rotation,
        })
        .collect();

    Ok(Json(LayoutResponse {
        success: true,
        mode: mode.as_str(),
        data,
        connections,
    }))
}
