#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and query parameter definitions.
//!
//! These types represent the shapes of data flowing in and out of the
//! `PostGIS` events store. They are distinct from the API response types
//! in `event_map_server_models`.

use chrono::{DateTime, Utc};
use event_map_event_models::{EventLevel, EventStatus, JoinMode, MeetingKind};
use serde::{Deserialize, Serialize};

/// Structured filters shared by the clustering and region queries.
///
/// All set fields are ANDed together. The same struct compiles to the
/// same predicate fragment in both code paths, so a cluster and the
/// region drill-down behind it always agree on which events qualify.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilters {
    /// Time-status constraint. `None` and `Some(Any)` are equivalent.
    pub status: Option<EventStatus>,
    /// Earliest start time; only honored when `status` is unset or `Any`.
    pub starts_after: Option<DateTime<Utc>>,
    /// Latest start time; only honored when `status` is unset or `Any`.
    pub starts_before: Option<DateTime<Utc>>,
    /// Only events whose owner has a verification timestamp.
    pub verified_only: bool,
    /// Any-of category slug membership.
    pub category_slugs: Vec<String>,
    /// Any-of tag slug membership.
    pub tag_slugs: Vec<String>,
    /// Any-of skill level membership.
    pub levels: Vec<EventLevel>,
    /// Any-of meeting kind membership.
    pub kinds: Vec<MeetingKind>,
    /// Any-of join mode membership.
    pub join_modes: Vec<JoinMode>,
}

/// A lightweight geolocated event row used by the cluster aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventPoint {
    /// Primary key.
    pub id: i64,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// A fully hydrated event row as returned by the region drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    /// Primary key.
    pub id: i64,
    /// Event title.
    pub title: String,
    /// Longer description, if any.
    pub description: Option<String>,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// When the event starts.
    pub start_at: DateTime<Utc>,
    /// When the event ends.
    pub end_at: DateTime<Utc>,
    /// When the event was canceled, if it was.
    pub canceled_at: Option<DateTime<Utc>>,
    /// When the event was last boosted, if ever.
    pub boosted_at: Option<DateTime<Utc>>,
    /// Skill level.
    pub level: EventLevel,
    /// Meeting kind.
    pub kind: MeetingKind,
    /// Join mode.
    pub join_mode: JoinMode,
    /// Owning user.
    pub owner_id: i64,
    /// Whether the owner is verified.
    pub owner_verified: bool,
    /// Category slugs attached to the event.
    pub categories: Vec<String>,
    /// Tag slugs attached to the event.
    pub tags: Vec<String>,
}
