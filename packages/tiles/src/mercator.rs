//! Spherical WebMercator projection between geographic coordinates and
//! integer tile addresses.
//!
//! Tile `(0,0)` at zoom 0 covers the whole world; each zoom level splits
//! every tile into four. Latitude is clamped to the Mercator-valid range
//! at this boundary so callers can never smuggle a pole latitude into the
//! logarithm and get a `NaN` tile index back.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Highest latitude the WebMercator projection can represent.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_78;

/// An integer tile address at an implicit zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoordinate {
    /// Column, west to east, `0..2^zoom`.
    pub x: u32,
    /// Row, north to south, `0..2^zoom`.
    pub y: u32,
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

/// Converts a geographic point to its tile address at `zoom`.
///
/// Latitude is clamped to ±[`MAX_MERCATOR_LATITUDE`] and the resulting
/// indices to `[0, 2^zoom - 1]`, so every finite input maps to a valid
/// tile.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn point_to_tile(lng: f64, lat: f64, zoom: u8) -> TileCoordinate {
    let n = zoom_scale(zoom);
    let lat = lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let lat_rad = lat.to_radians();

    let x = ((lng + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

    TileCoordinate {
        x: x.clamp(0.0, n - 1.0) as u32,
        y: y.clamp(0.0, n - 1.0) as u32,
    }
}

/// Computes the bounding box covered by tile `(x, y)` at `zoom`.
///
/// The box of `point_to_tile(lng, lat, zoom)` always contains
/// `(lng, lat)`; the mapping is containment, not inversion, since every
/// point in a tile maps to the same address.
#[must_use]
pub fn tile_to_bbox(x: u32, y: u32, zoom: u8) -> BoundingBox {
    let n = zoom_scale(zoom);
    let x = f64::from(x);
    let y = f64::from(y);
    BoundingBox {
        west: tile_x_to_longitude(x, n),
        south: tile_y_to_latitude(y + 1.0, n),
        east: tile_x_to_longitude(x + 1.0, n),
        north: tile_y_to_latitude(y, n),
    }
}

/// Builds the closed `GeoJSON` outline ring for a tile.
///
/// Vertex order is `SW, NW, NE, SE, SW` (first and last identical), an
/// axis-aligned rectangle in geographic coordinates. Attached to cluster
/// responses so the client can draw the tile a cluster covers.
#[must_use]
pub fn tile_to_polygon(x: u32, y: u32, zoom: u8) -> geojson::Geometry {
    let bbox = tile_to_bbox(x, y, zoom);
    let ring = vec![
        vec![bbox.west, bbox.south],
        vec![bbox.west, bbox.north],
        vec![bbox.east, bbox.north],
        vec![bbox.east, bbox.south],
        vec![bbox.west, bbox.south],
    ];
    geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))
}

/// Number of tiles per axis at `zoom`, as a float.
///
/// Computed in floating point so that an absurd zoom from a decoded
/// region token degrades to a degenerate bounding box instead of an
/// integer shift overflow.
fn zoom_scale(zoom: u8) -> f64 {
    2f64.powi(i32::from(zoom))
}

fn tile_x_to_longitude(x: f64, n: f64) -> f64 {
    x / n * 360.0 - 180.0
}

fn tile_y_to_latitude(y: f64, n: f64) -> f64 {
    let y = PI * (1.0 - 2.0 * y / n);
    y.sinh().atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(bbox: &BoundingBox, lng: f64, lat: f64) -> bool {
        lng >= bbox.west && lng <= bbox.east && lat >= bbox.south && lat <= bbox.north
    }

    #[test]
    fn zoom_zero_is_the_whole_world() {
        let tile = point_to_tile(21.0122, 52.2297, 0);
        assert_eq!(tile, TileCoordinate { x: 0, y: 0 });

        let bbox = tile_to_bbox(0, 0, 0);
        assert!((bbox.west - -180.0).abs() < 1e-9);
        assert!((bbox.east - 180.0).abs() < 1e-9);
        assert!((bbox.north - MAX_MERCATOR_LATITUDE).abs() < 1e-6);
        assert!((bbox.south - -MAX_MERCATOR_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn round_trip_containment() {
        let lngs = [-180.0, -179.9, -87.6298, 0.0, 21.0122, 139.6917, 179.9];
        let lats = [-85.0, -33.8688, 0.0, 41.8781, 52.2297, 85.0];
        for zoom in [0u8, 3, 8, 12, 16, 20] {
            for &lng in &lngs {
                for &lat in &lats {
                    let tile = point_to_tile(lng, lat, zoom);
                    let bbox = tile_to_bbox(tile.x, tile.y, zoom);
                    assert!(
                        contains(&bbox, lng, lat),
                        "({lng}, {lat}) at zoom {zoom} escaped its tile bbox {bbox:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn nearby_points_share_a_tile() {
        // Three points within ~50m of each other in central Warsaw.
        let a = point_to_tile(21.0122, 52.2297, 12);
        let b = point_to_tile(21.015, 52.23, 12);
        let c = point_to_tile(21.01, 52.229, 12);
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn distant_cities_map_to_different_tiles() {
        let warsaw = point_to_tile(21.0122, 52.2297, 8);
        let krakow = point_to_tile(19.945, 50.0647, 8);
        assert_ne!(warsaw, krakow);
    }

    #[test]
    fn pole_latitude_is_clamped_not_nan() {
        let tile = point_to_tile(0.0, 90.0, 10);
        assert_eq!(tile.y, 0);
        let tile = point_to_tile(0.0, -90.0, 10);
        assert_eq!(tile.y, (1 << 10) - 1);
    }

    #[test]
    fn indices_stay_in_range_at_the_antimeridian() {
        let tile = point_to_tile(180.0, 0.0, 4);
        assert_eq!(tile.x, 15);
    }

    #[test]
    fn polygon_ring_is_closed_and_ordered() {
        let geometry = tile_to_polygon(5, 7, 6);
        let geojson::Value::Polygon(rings) = geometry.value else {
            panic!("expected a polygon");
        };
        let ring = &rings[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        // SW and NW share the west longitude; NW and NE share the north
        // latitude.
        assert!((ring[0][0] - ring[1][0]).abs() < f64::EPSILON);
        assert!((ring[1][1] - ring[2][1]).abs() < f64::EPSILON);
        assert!(ring[1][1] > ring[0][1]);
        assert!(ring[2][0] > ring[1][0]);
    }

    #[test]
    fn absurd_zoom_from_a_token_degrades_instead_of_panicking() {
        let bbox = tile_to_bbox(u32::MAX, u32::MAX, 255);
        assert!(bbox.west.is_finite());
        assert!(bbox.north.is_finite());
    }

    #[test]
    fn clamp_boundaries() {
        assert_eq!(5i32.clamp(0, 10), 5);
        assert_eq!((-5i32).clamp(0, 10), 0);
        assert_eq!(15i32.clamp(0, 10), 10);
        assert_eq!(5i32.clamp(5, 5), 5);
    }
}
