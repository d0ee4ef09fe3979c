#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Cluster marker and pagination result types.

use serde::{Deserialize, Serialize};

/// One marker in a clustering response.
///
/// `count > 1` means a true cluster positioned at the centroid of its
/// member points; `count == 1` means an individual (possibly jittered)
/// event. Either way `region` is the token for the tile the marker
/// belongs to and `outline` is that tile's `GeoJSON` rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMarker {
    /// Response-local sequential id; carries no meaning across requests.
    pub id: String,
    /// Marker latitude (centroid or jittered point).
    pub latitude: f64,
    /// Marker longitude (centroid or jittered point).
    pub longitude: f64,
    /// Number of events behind this marker.
    pub count: usize,
    /// Opaque region token for the marker's tile.
    pub region: String,
    /// Tile outline for the client to draw.
    pub outline: geojson::Geometry,
}

/// Pagination metadata for a region drill-down page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// 1-based page number actually served.
    pub page: u32,
    /// Page size actually applied.
    pub per_page: u32,
    /// Total matching items across all pages.
    pub total_items: u64,
    /// Total pages; zero iff `total_items` is zero.
    pub total_pages: u32,
    /// Previous page number, `None` on the first page.
    pub prev_page: Option<u32>,
    /// Next page number, `None` on the last page.
    pub next_page: Option<u32>,
}

/// One page of results plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The page contents, in serving order.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}
