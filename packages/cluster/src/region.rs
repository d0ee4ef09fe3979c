//! The region paginator: drill into one tile's events, page by page.

use std::collections::BTreeMap;

use chrono::Utc;
use event_map_cluster_models::{Page, PageMeta};
use event_map_database::queries;
use event_map_database_models::{EventFilters, EventRow};
use event_map_tiles::{decode_region, tile_to_bbox};
use switchy_database::Database;

use crate::ClusterError;

/// Page size applied when the caller does not supply one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Hard cap on the page size.
pub const MAX_PER_PAGE: u32 = 50;

/// Returns one page of the events behind a region token, ordered by
/// boost-recency then start time.
///
/// `page` is 1-based; zero or negative-looking values are clamped to 1
/// and the clamped value is echoed in the metadata, so `meta.page`
/// always describes the page actually served. `per_page` is clamped to
/// `[1, MAX_PER_PAGE]` the same way.
///
/// # Errors
///
/// Returns [`ClusterError::Region`] for a malformed token (before any
/// data access) and [`ClusterError::Db`] for upstream store failures.
pub async fn region_intents(
    db: &dyn Database,
    token: &str,
    page: Option<u32>,
    per_page: Option<u32>,
    filters: &EventFilters,
) -> Result<Page<EventRow>, ClusterError> {
    let region = decode_region(token)?;
    let bbox = tile_to_bbox(region.x, region.y, region.z);

    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    let skip = (page - 1).saturating_mul(per_page);

    let now = Utc::now();

    let ids = queries::query_region_event_ids(db, &bbox, filters, now, per_page, skip).await?;

    let total_items = queries::count_region_events(db, &bbox, filters, now).await?;
    let total_items = u64::try_from(total_items).unwrap_or(0);

    // A page past the end still reports the region's real totals; only
    // the hydration round-trip is skipped.
    if ids.is_empty() {
        return Ok(Page {
            data: Vec::new(),
            meta: page_meta(page, per_page, total_items, 0),
        });
    }

    let rows = queries::query_events_by_ids(db, &ids).await?;
    let data = order_by_ids(&ids, rows);

    let meta = page_meta(page, per_page, total_items, data.len());

    Ok(Page { data, meta })
}

/// Computes pagination metadata for one served page.
fn page_meta(page: u32, per_page: u32, total_items: u64, returned: usize) -> PageMeta {
    let total_pages = if total_items == 0 {
        0
    } else {
        u32::try_from(total_items.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX).max(1)
    };

    let skip = u64::from(page - 1) * u64::from(per_page);
    let next_page = (skip + (returned as u64) < total_items).then(|| page + 1);

    PageMeta {
        page,
        per_page,
        total_items,
        total_pages,
        prev_page: (page > 1).then(|| page - 1),
        next_page,
    }
}

/// Re-sorts hydrated rows to match the ordered id list.
///
/// Hydration by primary key does not preserve the order the ids were
/// fetched in, so the boost/start-time ordering has to be re-imposed via
/// an id lookup. Ids with no matching row are skipped.
fn order_by_ids(ids: &[i64], rows: Vec<EventRow>) -> Vec<EventRow> {
    let mut by_id: BTreeMap<i64, EventRow> = rows.into_iter().map(|row| (row.id, row)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
