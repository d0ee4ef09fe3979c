#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API request and response types for the event map server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the database row and cluster types so the API contract
//! can evolve independently.

use chrono::{DateTime, Utc};
use event_map_cluster_models::{ClusterMarker, PageMeta};
use event_map_database_models::EventRow;
use event_map_event_models::{EventLevel, JoinMode, MeetingKind};
use serde::{Deserialize, Serialize};

/// Health-check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` when the server can respond.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
}

/// A cluster marker as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClusterMarker {
    /// Response-local marker id.
    pub id: String,
    /// Marker latitude.
    pub latitude: f64,
    /// Marker longitude.
    pub longitude: f64,
    /// Number of events behind the marker.
    pub count: usize,
    /// Opaque region token for drilling into the marker's tile.
    pub region: String,
    /// `GeoJSON` outline of the marker's tile.
    pub geo_json: geojson::Geometry,
}

impl From<ClusterMarker> for ApiClusterMarker {
    fn from(marker: ClusterMarker) -> Self {
        Self {
            id: marker.id,
            latitude: marker.latitude,
            longitude: marker.longitude,
            count: marker.count,
            region: marker.region,
            geo_json: marker.outline,
        }
    }
}

/// A fully hydrated event as returned by the region drill-down.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    /// Event id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Start time (ISO 8601).
    pub start_at: DateTime<Utc>,
    /// End time (ISO 8601).
    pub end_at: DateTime<Utc>,
    /// Cancellation time, if canceled.
    pub canceled_at: Option<DateTime<Utc>>,
    /// Last boost time, if any.
    pub boosted_at: Option<DateTime<Utc>>,
    /// Skill level.
    pub level: EventLevel,
    /// Meeting kind.
    pub kind: MeetingKind,
    /// Join mode.
    pub join_mode: JoinMode,
    /// Owning user id.
    pub owner_id: i64,
    /// Whether the owner is verified.
    pub owner_verified: bool,
    /// Category slugs.
    pub categories: Vec<String>,
    /// Tag slugs.
    pub tags: Vec<String>,
}

impl From<EventRow> for ApiEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            latitude: row.latitude,
            longitude: row.longitude,
            start_at: row.start_at,
            end_at: row.end_at,
            canceled_at: row.canceled_at,
            boosted_at: row.boosted_at,
            level: row.level,
            kind: row.kind,
            join_mode: row.join_mode,
            owner_id: row.owner_id,
            owner_verified: row.owner_verified,
            categories: row.categories,
            tags: row.tags,
        }
    }
}

/// Pagination metadata as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPageMeta {
    /// 1-based page number served.
    pub page: u32,
    /// Page size applied.
    pub per_page: u32,
    /// Total matching items.
    pub total_items: u64,
    /// Total pages.
    pub total_pages: u32,
    /// Previous page, `null` on the first.
    pub prev_page: Option<u32>,
    /// Next page, `null` on the last.
    pub next_page: Option<u32>,
}

impl From<PageMeta> for ApiPageMeta {
    fn from(meta: PageMeta) -> Self {
        Self {
            page: meta.page,
            per_page: meta.per_page,
            total_items: meta.total_items,
            total_pages: meta.total_pages,
            prev_page: meta.prev_page,
            next_page: meta.next_page,
        }
    }
}

/// One page of events plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEventPage {
    /// The page contents, in serving order.
    pub data: Vec<ApiEvent>,
    /// Pagination metadata.
    pub meta: ApiPageMeta,
}

/// The filter portion of a clusters or region request, as raw strings.
///
/// List-valued filters arrive as comma-separated strings; unknown enum
/// values are dropped during parsing. Extracted by value from the two
/// query parameter structs (`serde_urlencoded` cannot flatten a shared
/// struct, so the fields are declared inline on each).
#[derive(Debug, Clone, Default)]
pub struct FilterParams {
    /// Time-status filter (`UPCOMING`, `ONGOING`, ...).
    pub status: Option<String>,
    /// Earliest start time (ISO 8601).
    pub from: Option<DateTime<Utc>>,
    /// Latest start time (ISO 8601).
    pub to: Option<DateTime<Utc>>,
    /// Only events with verified owners.
    pub verified_only: Option<bool>,
    /// Comma-separated category slugs.
    pub categories: Option<String>,
    /// Comma-separated tag slugs.
    pub tags: Option<String>,
    /// Comma-separated skill levels.
    pub levels: Option<String>,
    /// Comma-separated meeting kinds.
    pub kinds: Option<String>,
    /// Comma-separated join modes.
    pub join_modes: Option<String>,
}

/// Query parameters for the clusters endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterQueryParams {
    /// Bounding box as `west,south,east,north`.
    pub bbox: String,
    /// Viewport zoom level.
    pub zoom: i32,
    /// Time-status filter.
    pub status: Option<String>,
    /// Earliest start time (ISO 8601).
    pub from: Option<DateTime<Utc>>,
    /// Latest start time (ISO 8601).
    pub to: Option<DateTime<Utc>>,
    /// Only events with verified owners.
    pub verified_only: Option<bool>,
    /// Comma-separated category slugs.
    pub categories: Option<String>,
    /// Comma-separated tag slugs.
    pub tags: Option<String>,
    /// Comma-separated skill levels.
    pub levels: Option<String>,
    /// Comma-separated meeting kinds.
    pub kinds: Option<String>,
    /// Comma-separated join modes.
    pub join_modes: Option<String>,
}

impl ClusterQueryParams {
    /// Extracts the shared filter fields.
    #[must_use]
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            status: self.status.clone(),
            from: self.from,
            to: self.to,
            verified_only: self.verified_only,
            categories: self.categories.clone(),
            tags: self.tags.clone(),
            levels: self.levels.clone(),
            kinds: self.kinds.clone(),
            join_modes: self.join_modes.clone(),
        }
    }
}

/// Query parameters for the region drill-down endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionQueryParams {
    /// Opaque region token from a cluster response.
    pub region: String,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page size, clamped server-side.
    pub per_page: Option<u32>,
    /// Time-status filter.
    pub status: Option<String>,
    /// Earliest start time (ISO 8601).
    pub from: Option<DateTime<Utc>>,
    /// Latest start time (ISO 8601).
    pub to: Option<DateTime<Utc>>,
    /// Only events with verified owners.
    pub verified_only: Option<bool>,
    /// Comma-separated category slugs.
    pub categories: Option<String>,
    /// Comma-separated tag slugs.
    pub tags: Option<String>,
    /// Comma-separated skill levels.
    pub levels: Option<String>,
    /// Comma-separated meeting kinds.
    pub kinds: Option<String>,
    /// Comma-separated join modes.
    pub join_modes: Option<String>,
}

impl RegionQueryParams {
    /// Extracts the shared filter fields.
    #[must_use]
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            status: self.status.clone(),
            from: self.from,
            to: self.to,
            verified_only: self.verified_only,
            categories: self.categories.clone(),
            tags: self.tags.clone(),
            levels: self.levels.clone(),
            kinds: self.kinds.clone(),
            join_modes: self.join_modes.clone(),
        }
    }
}
