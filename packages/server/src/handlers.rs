//! HTTP handler functions for the event map API.

use actix_web::{HttpResponse, web};
use event_map_cluster::ClusterError;
use event_map_database_models::EventFilters;
use event_map_server_models::{
    ApiClusterMarker, ApiEvent, ApiEventPage, ApiHealth, ClusterQueryParams, FilterParams,
    RegionQueryParams,
};
use event_map_tiles::BoundingBox;

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/clusters`
///
/// Clusters the events inside a viewport bounding box for map rendering.
pub async fn clusters(
    state: web::Data<AppState>,
    params: web::Query<ClusterQueryParams>,
) -> HttpResponse {
    let Some(bbox) = parse_bbox(&params.bbox) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "bbox must be west,south,east,north"
        }));
    };

    let filters = build_filters(&params.filter_params());

    match event_map_cluster::cluster::cluster_events(
        state.db.as_ref(),
        &bbox,
        params.zoom,
        &filters,
    )
    .await
    {
        Ok(markers) => {
            let api_markers: Vec<ApiClusterMarker> =
                markers.into_iter().map(ApiClusterMarker::from).collect();
            HttpResponse::Ok().json(api_markers)
        }
        Err(e) => {
            log::error!("Failed to cluster events: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to cluster events"
            }))
        }
    }
}

/// `GET /api/region-intents`
///
/// Pages through the events behind one cluster's region token.
pub async fn region_intents(
    state: web::Data<AppState>,
    params: web::Query<RegionQueryParams>,
) -> HttpResponse {
    let filters = build_filters(&params.filter_params());

    match event_map_cluster::region::region_intents(
        state.db.as_ref(),
        &params.region,
        params.page,
        params.per_page,
        &filters,
    )
    .await
    {
        Ok(page) => HttpResponse::Ok().json(ApiEventPage {
            data: page.data.into_iter().map(ApiEvent::from).collect(),
            meta: page.meta.into(),
        }),
        Err(ClusterError::Region(e)) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        })),
        Err(e) => {
            log::error!("Failed to query region: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to query region"
            }))
        }
    }
}

/// Parses a bounding box string `"west,south,east,north"` into a
/// [`BoundingBox`].
fn parse_bbox(s: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = s.split(',').filter_map(|p| p.trim().parse().ok()).collect();
    if parts.len() == 4 {
        Some(BoundingBox::new(parts[0], parts[1], parts[2], parts[3]))
    } else {
        None
    }
}

/// Builds an [`EventFilters`] from the raw query parameters.
///
/// Unknown enum values are dropped rather than rejected; the compiled
/// predicate simply carries fewer constraints.
fn build_filters(params: &FilterParams) -> EventFilters {
    EventFilters {
        status: params
            .status
            .as_deref()
            .and_then(|s| s.trim().parse().ok()),
        starts_after: params.from,
        starts_before: params.to,
        verified_only: params.verified_only.unwrap_or(false),
        category_slugs: split_list(params.categories.as_deref()),
        tag_slugs: split_list(params.tags.as_deref()),
        levels: parse_list(params.levels.as_deref()),
        kinds: parse_list(params.kinds.as_deref()),
        join_modes: parse_list(params.join_modes.as_deref()),
    }
}

fn split_list(s: Option<&str>) -> Vec<String> {
    s.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn parse_list<T: std::str::FromStr>(s: Option<&str>) -> Vec<T> {
    s.map(|s| s.split(',').filter_map(|p| p.trim().parse().ok()).collect())
        .unwrap_or_default()
}
