//! Query functions for the clustering and region read paths.
//!
//! All spatial queries go through `query_raw_params()` with `PostGIS`
//! functions and positional parameters; the filter fragment is always
//! produced by [`crate::filters::compile_filters`] so the two paths
//! never disagree on visibility.

use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use event_map_database_models::{EventFilters, EventPoint, EventRow};
use event_map_event_models::{EventLevel, JoinMode, MeetingKind};
use event_map_tiles::BoundingBox;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::DbError;
use crate::filters::compile_filters;

/// Hard cap on rows scanned by one clustering point fetch.
///
/// A world-spanning viewport at low zoom would otherwise scan the entire
/// events table. Hitting the cap truncates the result (and therefore the
/// cluster counts) and logs a warning.
pub const MAX_CLUSTER_POINTS: usize = 50_000;

/// How long a boost keeps its ranking effect.
const BOOST_WINDOW_HOURS: i64 = 24;

/// Fetches the lightweight points inside `bbox` that pass `filters`.
///
/// Returns at most [`MAX_CLUSTER_POINTS`] rows; a truncated fetch is
/// logged but not an error.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
#[allow(clippy::cast_possible_wrap)]
pub async fn query_event_points(
    db: &dyn Database,
    bbox: &BoundingBox,
    filters: &EventFilters,
    now: DateTime<Utc>,
) -> Result<Vec<EventPoint>, DbError> {
    let mut sql = String::from(
        "SELECT e.id,
                ST_X(e.location::geometry) as longitude,
                ST_Y(e.location::geometry) as latitude
         FROM events e
         WHERE e.location && ST_MakeEnvelope($1, $2, $3, $4, 4326)::geography",
    );
    let mut params = bbox_params(bbox);

    let compiled = compile_filters(filters, now, 5);
    sql.push_str(&compiled.sql);
    let param_idx = compiled.next_param;
    params.extend(compiled.params);

    write!(sql, " LIMIT ${param_idx}").unwrap();
    params.push(DatabaseValue::Int64(MAX_CLUSTER_POINTS as i64));

    let rows = db.query_raw_params(&sql, &params).await?;

    if rows.len() >= MAX_CLUSTER_POINTS {
        log::warn!(
            "Viewport point fetch hit the {MAX_CLUSTER_POINTS} row cap; cluster counts are truncated"
        );
    }

    let points = rows
        .iter()
        .map(|row| EventPoint {
            id: row.to_value("id").unwrap_or(0),
            latitude: row.to_value("latitude").unwrap_or(0.0),
            longitude: row.to_value("longitude").unwrap_or(0.0),
        })
        .collect();

    Ok(points)
}

/// Fetches one page of event ids inside `bbox`, ordered for the region
/// drill-down: boosted-within-24h first, then start time ascending.
///
/// A `boosted_at` older than the boost window sorts as if absent.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn query_region_event_ids(
    db: &dyn Database,
    bbox: &BoundingBox,
    filters: &EventFilters,
    now: DateTime<Utc>,
    limit: u32,
    offset: u32,
) -> Result<Vec<i64>, DbError> {
    let mut sql = String::from(
        "SELECT e.id
         FROM events e
         WHERE e.location && ST_MakeEnvelope($1, $2, $3, $4, 4326)::geography",
    );
    let mut params = bbox_params(bbox);

    let compiled = compile_filters(filters, now, 5);
    sql.push_str(&compiled.sql);
    let mut param_idx = compiled.next_param;
    params.extend(compiled.params);

    write!(
        sql,
        " ORDER BY CASE WHEN e.boosted_at IS NOT NULL AND e.boosted_at > ${param_idx} \
         THEN 0 ELSE 1 END, e.start_at ASC",
    )
    .unwrap();
    params.push(DatabaseValue::DateTime(
        (now - Duration::hours(BOOST_WINDOW_HOURS)).naive_utc(),
    ));
    param_idx += 1;

    write!(sql, " LIMIT ${param_idx}").unwrap();
    params.push(DatabaseValue::Int64(i64::from(limit)));
    param_idx += 1;

    write!(sql, " OFFSET ${param_idx}").unwrap();
    params.push(DatabaseValue::Int64(i64::from(offset)));

    let rows = db.query_raw_params(&sql, &params).await?;

    Ok(rows
        .iter()
        .map(|row| row.to_value("id").unwrap_or(0))
        .collect())
}

/// Counts the events inside `bbox` that pass `filters`.
///
/// Uses the identical predicate as [`query_region_event_ids`] so the
/// pagination metadata always matches the page contents.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn count_region_events(
    db: &dyn Database,
    bbox: &BoundingBox,
    filters: &EventFilters,
    now: DateTime<Utc>,
) -> Result<i64, DbError> {
    let mut sql = String::from(
        "SELECT COUNT(*) as total
         FROM events e
         WHERE e.location && ST_MakeEnvelope($1, $2, $3, $4, 4326)::geography",
    );
    let mut params = bbox_params(bbox);

    let compiled = compile_filters(filters, now, 5);
    sql.push_str(&compiled.sql);
    params.extend(compiled.params);

    let rows = db.query_raw_params(&sql, &params).await?;

    let row = rows.first().ok_or_else(|| DbError::Conversion {
        message: "Count query returned no rows".to_string(),
    })?;

    Ok(row.to_value("total").unwrap_or(0))
}

/// Hydrates a list of event ids into full rows with their category and
/// tag slugs.
///
/// The store does not guarantee `IN (..)` result order, so the caller
/// must re-sort the rows against the id sequence it asked for.
///
/// # Errors
///
/// Returns [`DbError`] if any database operation fails.
pub async fn query_events_by_ids(
    db: &dyn Database,
    ids: &[i64],
) -> Result<Vec<EventRow>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut sql = String::from(
        "SELECT e.id, e.title, e.description,
                e.start_at, e.end_at, e.canceled_at, e.boosted_at,
                e.level, e.kind, e.join_mode, e.owner_id,
                (o.verified_at IS NOT NULL) as owner_verified,
                ST_X(e.location::geometry) as longitude,
                ST_Y(e.location::geometry) as latitude
         FROM events e
         JOIN event_owners o ON o.id = e.owner_id
         WHERE e.id IN (",
    );
    let params = push_id_list(&mut sql, ids);
    sql.push(')');

    let rows = db.query_raw_params(&sql, &params).await?;

    let mut categories =
        query_slugs_by_event(db, "event_categories", "event_categories_def", "category_id", ids)
            .await?;
    let mut tags =
        query_slugs_by_event(db, "event_tags", "event_tags_def", "tag_id", ids).await?;

    let mut events = Vec::with_capacity(rows.len());

    for row in &rows {
        let id: i64 = row.to_value("id").unwrap_or(0);

        let level: String = row.to_value("level").unwrap_or_default();
        let kind: String = row.to_value("kind").unwrap_or_default();
        let join_mode: String = row.to_value("join_mode").unwrap_or_default();

        let start_at_naive: chrono::NaiveDateTime = row.to_value("start_at").unwrap_or_default();
        let end_at_naive: chrono::NaiveDateTime = row.to_value("end_at").unwrap_or_default();
        let canceled_at_naive: Option<chrono::NaiveDateTime> =
            row.to_value("canceled_at").unwrap_or(None);
        let boosted_at_naive: Option<chrono::NaiveDateTime> =
            row.to_value("boosted_at").unwrap_or(None);

        events.push(EventRow {
            id,
            title: row.to_value("title").unwrap_or_default(),
            description: row.to_value("description").unwrap_or(None),
            latitude: row.to_value("latitude").unwrap_or(0.0),
            longitude: row.to_value("longitude").unwrap_or(0.0),
            start_at: utc(start_at_naive),
            end_at: utc(end_at_naive),
            canceled_at: canceled_at_naive.map(utc),
            boosted_at: boosted_at_naive.map(utc),
            level: level.parse().unwrap_or(EventLevel::AllLevels),
            kind: kind.parse().unwrap_or(MeetingKind::InPerson),
            join_mode: join_mode.parse().unwrap_or(JoinMode::Open),
            owner_id: row.to_value("owner_id").unwrap_or(0),
            owner_verified: row.to_value("owner_verified").unwrap_or(false),
            categories: categories.remove(&id).unwrap_or_default(),
            tags: tags.remove(&id).unwrap_or_default(),
        });
    }

    Ok(events)
}

/// Fetches the slugs attached to each of the given events through a
/// many-to-many join table.
async fn query_slugs_by_event(
    db: &dyn Database,
    join_table: &str,
    def_table: &str,
    fk_column: &str,
    ids: &[i64],
) -> Result<std::collections::BTreeMap<i64, Vec<String>>, DbError> {
    let mut sql = format!(
        "SELECT j.event_id, d.slug
         FROM {join_table} j
         JOIN {def_table} d ON d.id = j.{fk_column}
         WHERE j.event_id IN (",
    );
    let params = push_id_list(&mut sql, ids);
    sql.push(')');

    let rows = db.query_raw_params(&sql, &params).await?;

    let mut map: std::collections::BTreeMap<i64, Vec<String>> = std::collections::BTreeMap::new();
    for row in &rows {
        let event_id: i64 = row.to_value("event_id").unwrap_or(0);
        let slug: String = row.to_value("slug").unwrap_or_default();
        map.entry(event_id).or_default().push(slug);
    }

    Ok(map)
}

/// Writes `$1, $2, ..` placeholders for `ids` and returns the matching
/// parameter values.
fn push_id_list(sql: &mut String, ids: &[i64]) -> Vec<DatabaseValue> {
    let mut params = Vec::with_capacity(ids.len());
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        write!(sql, "${}", i + 1).unwrap();
        params.push(DatabaseValue::Int64(*id));
    }
    params
}

fn bbox_params(bbox: &BoundingBox) -> Vec<DatabaseValue> {
    vec![
        DatabaseValue::Real64(bbox.west),
        DatabaseValue::Real64(bbox.south),
        DatabaseValue::Real64(bbox.east),
        DatabaseValue::Real64(bbox.north),
    ]
}

fn utc(naive: chrono::NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
}
