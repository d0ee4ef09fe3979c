#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Tile-based event clustering and region pagination.
//!
//! The two read operations of the map engine: [`cluster::cluster_events`]
//! turns a viewport into centroid clusters or jittered markers, and
//! [`region::region_intents`] pages through the events behind one tile's
//! region token. Each call is stateless and recomputes from scratch;
//! nothing is cached between requests.

pub mod cluster;
pub mod region;

use event_map_database::DbError;
use event_map_tiles::RegionTokenError;

/// Errors produced by the clustering and region operations.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// A malformed region token supplied by the client.
    #[error(transparent)]
    Region(#[from] RegionTokenError),

    /// An upstream database failure.
    #[error(transparent)]
    Db(#[from] DbError),
}
