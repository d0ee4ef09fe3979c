//! The cluster aggregator: viewport in, markers out.

use std::collections::BTreeMap;

use chrono::Utc;
use event_map_cluster_models::ClusterMarker;
use event_map_database::queries;
use event_map_database_models::{EventFilters, EventPoint};
use event_map_tiles::{BoundingBox, encode_region, jitter, point_to_tile, tile_to_polygon};
use switchy_database::Database;

use crate::ClusterError;

/// Viewport zoom bounds accepted by the aggregator.
const MIN_VIEWPORT_ZOOM: i32 = 2;
const MAX_VIEWPORT_ZOOM: i32 = 16;

/// Clustering happens this many zoom levels finer than the viewport, so
/// clusters subdivide visibly as the user zooms in.
const CLUSTER_ZOOM_OFFSET: i32 = 2;
const MIN_CLUSTER_ZOOM: i32 = 3;
const MAX_CLUSTER_ZOOM: i32 = 16;

/// Tiles with at least this many points collapse into one centroid
/// marker; below it each point is emitted individually with jitter.
///
/// Shipped at 1, which makes every occupied tile a cluster. The
/// individual-marker branch stays parameterized and tested so raising
/// this later is a one-line tuning change.
const MIN_CLUSTER_SIZE: usize = 1;

/// Per-tile running aggregate, built while scanning the point fetch and
/// discarded once the response is assembled.
struct TileAggregate {
    x: u32,
    y: u32,
    sum_lat: f64,
    sum_lng: f64,
    points: Vec<EventPoint>,
}

/// Clusters the publicly visible events inside `bbox` for a viewport at
/// `zoom`.
///
/// Marker order follows tile order, and marker ids are sequential within
/// this one response only. Two calls with the same inputs at the same
/// store state produce the same clustering, though jittered coordinates
/// depend on response-local salts.
///
/// # Errors
///
/// Returns [`ClusterError`] if the point fetch fails.
pub async fn cluster_events(
    db: &dyn Database,
    bbox: &BoundingBox,
    zoom: i32,
    filters: &EventFilters,
) -> Result<Vec<ClusterMarker>, ClusterError> {
    let zc = cluster_zoom(zoom);
    let points = queries::query_event_points(db, bbox, filters, Utc::now()).await?;

    log::debug!(
        "Clustering {} points at cluster zoom {zc} (viewport zoom {zoom})",
        points.len()
    );

    Ok(build_clusters(&points, zc, MIN_CLUSTER_SIZE))
}

/// Computes the cluster zoom for a viewport zoom.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cluster_zoom(viewport_zoom: i32) -> u8 {
    let base = viewport_zoom.clamp(MIN_VIEWPORT_ZOOM, MAX_VIEWPORT_ZOOM);
    (base + CLUSTER_ZOOM_OFFSET).clamp(MIN_CLUSTER_ZOOM, MAX_CLUSTER_ZOOM) as u8
}

/// Groups points into tiles at `zc` and emits one marker per tile (the
/// centroid) or one jittered marker per point, depending on
/// `min_cluster_size`.
#[allow(clippy::cast_precision_loss)]
fn build_clusters(points: &[EventPoint], zc: u8, min_cluster_size: usize) -> Vec<ClusterMarker> {
    let mut tiles: BTreeMap<(u32, u32), TileAggregate> = BTreeMap::new();

    for point in points {
        let tile = point_to_tile(point.longitude, point.latitude, zc);
        let aggregate = tiles.entry((tile.x, tile.y)).or_insert(TileAggregate {
            x: tile.x,
            y: tile.y,
            sum_lat: 0.0,
            sum_lng: 0.0,
            points: Vec::new(),
        });
        aggregate.sum_lat += point.latitude;
        aggregate.sum_lng += point.longitude;
        aggregate.points.push(*point);
    }

    let mut markers = Vec::new();
    let mut next_id = 0u32;
    let mut next_salt = 0u32;

    for aggregate in tiles.values() {
        let count = aggregate.points.len();
        let region = encode_region(zc, aggregate.x, aggregate.y);
        let outline = tile_to_polygon(aggregate.x, aggregate.y, zc);

        if count >= min_cluster_size {
            markers.push(ClusterMarker {
                id: next_id.to_string(),
                latitude: aggregate.sum_lat / count as f64,
                longitude: aggregate.sum_lng / count as f64,
                count,
                region,
                outline,
            });
            next_id += 1;
        } else {
            for point in &aggregate.points {
                let (lat, lng) = jitter(point.latitude, point.longitude, next_salt);
                next_salt += 1;
                markers.push(ClusterMarker {
                    id: next_id.to_string(),
                    latitude: lat,
                    longitude: lng,
                    count: 1,
                    region: region.clone(),
                    outline: outline.clone(),
                });
                next_id += 1;
            }
        }
    }

    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: i64, latitude: f64, longitude: f64) -> EventPoint {
        EventPoint {
            id,
            latitude,
            longitude,
        }
    }

    #[test]
    fn cluster_zoom_is_offset_and_clamped() {
        assert_eq!(cluster_zoom(10), 12);
        assert_eq!(cluster_zoom(0), 4);
        assert_eq!(cluster_zoom(-3), 4);
        assert_eq!(cluster_zoom(16), 16);
        assert_eq!(cluster_zoom(22), 16);
    }

    #[test]
    fn co_located_points_collapse_into_a_centroid() {
        let points = vec![
            point(1, 52.2297, 21.0122),
            point(2, 52.23, 21.015),
            point(3, 52.229, 21.01),
        ];

        let markers = build_clusters(&points, 12, 1);

        assert_eq!(markers.len(), 1);
        let marker = &markers[0];
        assert_eq!(marker.count, 3);
        let mean_lat = (52.2297 + 52.23 + 52.229) / 3.0;
        let mean_lng = (21.0122 + 21.015 + 21.01) / 3.0;
        assert!((marker.latitude - mean_lat).abs() < 1e-12);
        assert!((marker.longitude - mean_lng).abs() < 1e-12);
    }

    #[test]
    fn distant_points_produce_separate_markers() {
        let points = vec![
            point(1, 52.2297, 21.0122), // Warsaw
            point(2, 50.0647, 19.945),  // Krakow
        ];

        let markers = build_clusters(&points, 10, 1);

        assert_eq!(markers.len(), 2);
        assert_ne!(markers[0].region, markers[1].region);
    }

    #[test]
    fn below_threshold_tiles_emit_jittered_individuals() {
        let points = vec![point(1, 52.2297, 21.0122), point(2, 52.2297, 21.0122)];

        let markers = build_clusters(&points, 12, 3);

        assert_eq!(markers.len(), 2);
        for marker in &markers {
            assert_eq!(marker.count, 1);
        }
        // Same source coordinates, different salts: the two markers must
        // not coincide.
        assert!(
            (markers[0].latitude - markers[1].latitude).abs() > 0.0
                || (markers[0].longitude - markers[1].longitude).abs() > 0.0
        );
        // Both stay in the same tile's region.
        assert_eq!(markers[0].region, markers[1].region);
    }

    #[test]
    fn marker_ids_are_unique_within_a_response() {
        let points = vec![
            point(1, 52.2297, 21.0122),
            point(2, 50.0647, 19.945),
            point(3, 48.8566, 2.3522),
        ];

        let markers = build_clusters(&points, 10, 1);

        let mut ids: Vec<&str> = markers.iter().map(|m| m.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), markers.len());
    }

    #[test]
    fn region_token_matches_the_tile() {
        let points = vec![point(1, 52.2297, 21.0122)];
        let markers = build_clusters(&points, 12, 1);

        let region = event_map_tiles::decode_region(&markers[0].region).unwrap();
        let tile = point_to_tile(21.0122, 52.2297, 12);
        assert_eq!(region.z, 12);
        assert_eq!(region.x, tile.x);
        assert_eq!(region.y, tile.y);
    }

    #[test]
    fn empty_input_yields_no_markers() {
        assert!(build_clusters(&[], 12, 1).is_empty());
    }
}
