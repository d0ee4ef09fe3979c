//! Compiles an [`EventFilters`] into a parameterized SQL fragment.
//!
//! The clustering query and the region drill-down query must agree
//! exactly on which events qualify, so both feed the same struct through
//! [`compile_filters`] and splice the resulting fragment into their own
//! base query. Fragments reference positional parameters starting at a
//! caller-chosen index and consume slots contiguously, which lets a
//! caller compile independent fragments (items query, count query) for
//! different base queries without index collisions.
//!
//! Base visibility lives here too: events are `PUBLIC` and neither
//! canceled nor deleted unless the status filter explicitly selects
//! canceled or deleted records. Keeping that rule inside the compiled
//! fragment means no caller carries its own copy of the conditional.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use event_map_database_models::EventFilters;
use event_map_event_models::EventStatus;
use switchy_database::DatabaseValue;

/// A compiled conjunctive predicate fragment.
///
/// `sql` is a sequence of ` AND ...` clauses (possibly empty aside from
/// the base visibility rule) suitable for appending to a `WHERE` clause;
/// `params` are the values for the positional parameters it references,
/// in order; `next_param` is the first unused parameter index.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    /// SQL fragment of ` AND ...` clauses.
    pub sql: String,
    /// Ordered parameter values referenced by the fragment.
    pub params: Vec<DatabaseValue>,
    /// First parameter index not consumed by this fragment.
    pub next_param: u32,
}

/// Compiles `filters` into a predicate fragment whose positional
/// parameters start at `start_param`.
///
/// `now` is passed in rather than read here so that the compilation is
/// pure and the items query, the count query, and any test all evaluate
/// time-status predicates against the same instant.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn compile_filters(
    filters: &EventFilters,
    now: DateTime<Utc>,
    start_param: u32,
) -> CompiledFilter {
    let mut sql = String::from(" AND e.visibility = 'PUBLIC'");
    let mut params: Vec<DatabaseValue> = Vec::new();
    let mut param_idx = start_param;

    // Base visibility: canceled/deleted records are hidden unless the
    // status filter explicitly selects exactly those.
    match filters.status {
        Some(EventStatus::Canceled) => {
            sql.push_str(" AND e.canceled_at IS NOT NULL AND e.deleted_at IS NULL");
        }
        Some(EventStatus::Deleted) => {
            sql.push_str(" AND e.deleted_at IS NOT NULL");
        }
        _ => {
            sql.push_str(" AND e.canceled_at IS NULL AND e.deleted_at IS NULL");
        }
    }

    match filters.status {
        Some(EventStatus::Upcoming) => {
            write!(sql, " AND e.start_at > ${param_idx}").unwrap();
            params.push(DatabaseValue::DateTime(now.naive_utc()));
            param_idx += 1;
        }
        Some(EventStatus::Ongoing) => {
            write!(
                sql,
                " AND e.start_at <= ${} AND e.end_at > ${}",
                param_idx,
                param_idx + 1,
            )
            .unwrap();
            params.push(DatabaseValue::DateTime(now.naive_utc()));
            params.push(DatabaseValue::DateTime(now.naive_utc()));
            param_idx += 2;
        }
        Some(EventStatus::Past) => {
            write!(sql, " AND e.end_at < ${param_idx}").unwrap();
            params.push(DatabaseValue::DateTime(now.naive_utc()));
            param_idx += 1;
        }
        _ => {}
    }

    // An explicit date range only applies without a time-status filter;
    // the two are mutually exclusive by convention.
    if matches!(filters.status, None | Some(EventStatus::Any)) {
        if let Some(from) = &filters.starts_after {
            write!(sql, " AND e.start_at >= ${param_idx}").unwrap();
            params.push(DatabaseValue::DateTime(from.naive_utc()));
            param_idx += 1;
        }

        if let Some(to) = &filters.starts_before {
            write!(sql, " AND e.start_at <= ${param_idx}").unwrap();
            params.push(DatabaseValue::DateTime(to.naive_utc()));
            param_idx += 1;
        }
    }

    if filters.verified_only {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM event_owners o \
             WHERE o.id = e.owner_id AND o.verified_at IS NOT NULL)",
        );
    }

    push_slug_membership(
        &mut sql,
        &mut params,
        &mut param_idx,
        "event_categories",
        "event_categories_def",
        "category_id",
        &filters.category_slugs,
    );

    push_slug_membership(
        &mut sql,
        &mut params,
        &mut param_idx,
        "event_tags",
        "event_tags_def",
        "tag_id",
        &filters.tag_slugs,
    );

    push_enum_membership(&mut sql, &mut params, &mut param_idx, "e.level", &filters.levels);
    push_enum_membership(&mut sql, &mut params, &mut param_idx, "e.kind", &filters.kinds);
    push_enum_membership(
        &mut sql,
        &mut params,
        &mut param_idx,
        "e.join_mode",
        &filters.join_modes,
    );

    CompiledFilter {
        sql,
        params,
        next_param: param_idx,
    }
}

/// Appends an `IN (..)` membership clause over an enum column, one
/// parameter slot per value.
fn push_enum_membership<T: AsRef<str>>(
    sql: &mut String,
    params: &mut Vec<DatabaseValue>,
    param_idx: &mut u32,
    column: &str,
    values: &[T],
) {
    if values.is_empty() {
        return;
    }

    write!(sql, " AND {column} IN (").unwrap();
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        write!(sql, "${param_idx}").unwrap();
        params.push(DatabaseValue::String(value.as_ref().to_string()));
        *param_idx += 1;
    }
    sql.push(')');
}

/// Appends an `EXISTS` clause matching any of the given slugs through a
/// many-to-many join table.
fn push_slug_membership(
    sql: &mut String,
    params: &mut Vec<DatabaseValue>,
    param_idx: &mut u32,
    join_table: &str,
    def_table: &str,
    fk_column: &str,
    slugs: &[String],
) {
    if slugs.is_empty() {
        return;
    }

    write!(
        sql,
        " AND EXISTS (SELECT 1 FROM {join_table} j \
         JOIN {def_table} d ON d.id = j.{fk_column} \
         WHERE j.event_id = e.id AND d.slug IN (",
    )
    .unwrap();
    for (i, slug) in slugs.iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        write!(sql, "${param_idx}").unwrap();
        params.push(DatabaseValue::String(slug.clone()));
        *param_idx += 1;
    }
    sql.push_str("))");
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_map_event_models::{EventLevel, MeetingKind};

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    /// Extracts the `$n` parameter references from a fragment, in order
    /// of appearance.
    fn param_refs(sql: &str) -> Vec<u32> {
        let mut refs = Vec::new();
        let mut chars = sql.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '$' {
                continue;
            }
            let mut digits = String::new();
            while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                digits.push(*d);
                chars.next();
            }
            refs.push(digits.parse().unwrap());
        }
        refs
    }

    #[test]
    fn empty_filters_still_carry_base_visibility() {
        let compiled = compile_filters(&EventFilters::default(), now(), 1);
        assert!(compiled.sql.contains("e.visibility = 'PUBLIC'"));
        assert!(compiled.sql.contains("e.canceled_at IS NULL"));
        assert!(compiled.sql.contains("e.deleted_at IS NULL"));
        assert!(compiled.params.is_empty());
        assert_eq!(compiled.next_param, 1);
    }

    #[test]
    fn parameter_slots_are_contiguous() {
        let filters = EventFilters {
            category_slugs: vec!["music".into(), "sports".into()],
            tag_slugs: vec!["outdoor".into()],
            levels: vec![EventLevel::Beginner, EventLevel::Advanced],
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 5);

        assert_eq!(param_refs(&compiled.sql), vec![5, 6, 7, 8, 9]);
        assert_eq!(compiled.params.len(), 5);
        assert_eq!(compiled.next_param, 10);
    }

    #[test]
    fn two_fragments_compose_without_collisions() {
        let filters = EventFilters {
            status: Some(EventStatus::Upcoming),
            kinds: vec![MeetingKind::InPerson],
            ..EventFilters::default()
        };

        let first = compile_filters(&filters, now(), 5);
        let second = compile_filters(&filters, now(), first.next_param);

        assert_eq!(param_refs(&first.sql), vec![5, 6]);
        assert_eq!(param_refs(&second.sql), vec![7, 8]);
    }

    #[test]
    fn canceled_status_overrides_base_visibility() {
        let filters = EventFilters {
            status: Some(EventStatus::Canceled),
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 1);

        assert!(compiled.sql.contains("e.canceled_at IS NOT NULL"));
        assert!(!compiled.sql.contains("e.canceled_at IS NULL"));
        // Deleted records stay hidden even when surfacing canceled ones.
        assert!(compiled.sql.contains("e.deleted_at IS NULL"));
    }

    #[test]
    fn deleted_status_overrides_base_visibility() {
        let filters = EventFilters {
            status: Some(EventStatus::Deleted),
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 1);

        assert!(compiled.sql.contains("e.deleted_at IS NOT NULL"));
        assert!(!compiled.sql.contains("e.deleted_at IS NULL"));
    }

    #[test]
    fn ongoing_consumes_two_slots() {
        let filters = EventFilters {
            status: Some(EventStatus::Ongoing),
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 3);

        assert_eq!(param_refs(&compiled.sql), vec![3, 4]);
        assert_eq!(compiled.params.len(), 2);
        assert_eq!(compiled.next_param, 5);
    }

    #[test]
    fn date_range_is_ignored_when_status_is_set() {
        let filters = EventFilters {
            status: Some(EventStatus::Past),
            starts_after: Some(now()),
            starts_before: Some(now()),
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 1);

        assert!(!compiled.sql.contains("e.start_at >="));
        assert!(!compiled.sql.contains("e.start_at <="));
        assert_eq!(compiled.params.len(), 1);
    }

    #[test]
    fn date_range_applies_with_any_status() {
        let filters = EventFilters {
            status: Some(EventStatus::Any),
            starts_after: Some(now()),
            starts_before: Some(now()),
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 1);

        assert!(compiled.sql.contains("e.start_at >= $1"));
        assert!(compiled.sql.contains("e.start_at <= $2"));
        assert_eq!(compiled.next_param, 3);
    }

    #[test]
    fn verified_only_adds_owner_existence_predicate() {
        let filters = EventFilters {
            verified_only: true,
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 1);

        assert!(compiled.sql.contains("o.verified_at IS NOT NULL"));
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn slug_membership_uses_exists_subquery() {
        let filters = EventFilters {
            tag_slugs: vec!["outdoor".into(), "free".into()],
            ..EventFilters::default()
        };

        let compiled = compile_filters(&filters, now(), 1);

        assert!(compiled.sql.contains("EXISTS (SELECT 1 FROM event_tags j"));
        assert!(compiled.sql.contains("d.slug IN ($1, $2)"));
        assert_eq!(compiled.params.len(), 2);
    }
}
