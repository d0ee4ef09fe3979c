#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! WebMercator tile math and region token handling for map clustering.
//!
//! Everything here is pure and synchronous: geographic point to tile
//! address conversion, tile to bounding box / `GeoJSON` outline, the
//! opaque region token codec used by the API to let clients drill into a
//! tile, and the deterministic jitter applied to co-located markers.

mod jitter;
mod mercator;
mod region;

pub use jitter::jitter;
pub use mercator::{
    BoundingBox, MAX_MERCATOR_LATITUDE, TileCoordinate, point_to_tile, tile_to_bbox,
    tile_to_polygon,
};
pub use region::{Region, RegionTokenError, decode_region, encode_region};
