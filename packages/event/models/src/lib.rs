#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Event domain enums shared across the event map system.
//!
//! These are the canonical wire and database representations of event
//! attributes. The string form is `SCREAMING_SNAKE_CASE` on both the JSON
//! API and the enum columns, so the same `strum` round-trip is used for
//! request parsing and for query parameter values.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Time-status of an event relative to the query instant.
///
/// `Canceled` and `Deleted` are override statuses: selecting them surfaces
/// records the base visibility rule would otherwise hide.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Starts after the query instant.
    Upcoming,
    /// Started but not yet ended.
    Ongoing,
    /// Already ended.
    Past,
    /// Explicitly canceled by the organizer.
    Canceled,
    /// Soft-deleted.
    Deleted,
    /// No time-status constraint.
    Any,
}

/// Skill level an event is aimed at.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventLevel {
    Beginner,
    Intermediate,
    Advanced,
    AllLevels,
}

/// How attendees meet.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingKind {
    InPerson,
    Online,
    Hybrid,
}

/// How an attendee joins an event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinMode {
    Open,
    ApprovalRequired,
    InviteOnly,
}
