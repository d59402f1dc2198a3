use std::collections::BTreeMap;

use chrono::{Duration, Months, NaiveDateTime};
use serde::Serialize;

use crate::models::{Booking, BookingStatus};

/// Status tab filter; `All` leaves rows untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

impl StatusFilter {
    /// `"all"` (or anything unparseable) is the no-op filter.
    pub fn parse(s: &str) -> Self {
        match BookingStatus::parse(s) {
            Some(status) => StatusFilter::Only(status),
            None => StatusFilter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl DateRange {
    pub fn parse(s: &str) -> Self {
        match s {
            "today" => DateRange::Today,
            "week" => DateRange::Week,
            "month" => DateRange::Month,
            _ => DateRange::All,
        }
    }
}

impl DateRange {
    /// Inclusive lower bound on `created_at` relative to `now`; `None` means
    /// unbounded. Kept separate from the query so it can be tested on its own.
    pub fn lower_bound(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            DateRange::Today => now.date().and_hms_opt(0, 0, 0),
            DateRange::Week => Some(now - Duration::days(7)),
            DateRange::Month => now.checked_sub_months(Months::new(1)),
            DateRange::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Newest first.
    #[default]
    CreatedAt,
    /// Highest amount first.
    Amount,
    /// Lexicographic ascending on the status name.
    Status,
}

impl SortBy {
    pub fn parse(s: &str) -> Self {
        match s {
            "amount" => SortBy::Amount,
            "status" => SortBy::Status,
            _ => SortBy::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    pub status: StatusFilter,
    pub date_range: DateRange,
    pub sort: SortBy,
    /// Free-text match on service name, counterpart name, or id substring.
    pub search: Option<String>,
}

/// Per-status counts over the unfiltered input, so tab badges stay stable
/// while the user flips filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryStats {
    pub total: usize,
    pub by_status: BTreeMap<String, usize>,
    /// Summed over COMPLETED bookings only.
    pub total_revenue: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Booking>,
    pub stats: QueryStats,
}

fn matches_search(booking: &Booking, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    booking.service_name.to_lowercase().contains(&needle)
        || booking.customer_name.to_lowercase().contains(&needle)
        || booking
            .worker_name
            .as_deref()
            .map(|name| name.to_lowercase().contains(&needle))
            .unwrap_or(false)
        || booking.id.to_lowercase().contains(&needle)
}

pub fn compute_stats(bookings: &[Booking]) -> QueryStats {
    let mut stats = QueryStats {
        total: bookings.len(),
        ..Default::default()
    };
    for booking in bookings {
        *stats
            .by_status
            .entry(booking.status.as_str().to_string())
            .or_default() += 1;
        if booking.status == BookingStatus::Completed {
            stats.total_revenue += booking.total_amount;
        }
    }
    stats
}

/// Derives the filtered, sorted view plus summary stats from a raw booking
/// collection. Stats always reflect the full input.
pub fn run_query(bookings: &[Booking], query: &BookingQuery, now: NaiveDateTime) -> QueryResult {
    let stats = compute_stats(bookings);

    let lower_bound = query.date_range.lower_bound(now);

    let mut rows: Vec<Booking> = bookings
        .iter()
        .filter(|b| match &query.search {
            Some(needle) if !needle.trim().is_empty() => matches_search(b, needle.trim()),
            _ => true,
        })
        .filter(|b| match query.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => b.status == status,
        })
        .filter(|b| match lower_bound {
            Some(bound) => b.created_at >= bound,
            None => true,
        })
        .cloned()
        .collect();

    match query.sort {
        SortBy::CreatedAt => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::Amount => rows.sort_by(|a, b| b.total_amount.cmp(&a.total_amount)),
        SortBy::Status => rows.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str())),
    }

    QueryResult { rows, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn booking(id: &str, status: BookingStatus, amount: i64, created: &str) -> Booking {
        Booking {
            id: id.to_string(),
            customer_id: "c1".to_string(),
            customer_name: "Asha".to_string(),
            worker_id: Some("w1".to_string()),
            worker_name: Some("Ravi".to_string()),
            service_id: "s1".to_string(),
            service_name: "AC Repair".to_string(),
            scheduled_at: dt("2025-07-01 10:00"),
            address: "12 MG Road".to_string(),
            total_amount: amount,
            status,
            refunded: false,
            notes: None,
            created_at: dt(created),
            updated_at: dt(created),
            completed_at: if status == BookingStatus::Completed {
                Some(dt(created))
            } else {
                None
            },
        }
    }

    fn fixture() -> Vec<Booking> {
        vec![
            booking("b1", BookingStatus::Pending, 300, "2025-06-28 09:00"),
            booking("b2", BookingStatus::Completed, 500, "2025-06-20 09:00"),
            booking("b3", BookingStatus::Completed, 700, "2025-06-01 09:00"),
            booking("b4", BookingStatus::Cancelled, 200, "2025-06-27 09:00"),
        ]
    }

    #[test]
    fn test_date_range_lower_bounds() {
        let now = dt("2025-06-28 15:30");
        assert_eq!(
            DateRange::Today.lower_bound(now),
            Some(dt("2025-06-28 00:00"))
        );
        assert_eq!(DateRange::Week.lower_bound(now), Some(dt("2025-06-21 15:30")));
        assert_eq!(
            DateRange::Month.lower_bound(now),
            Some(dt("2025-05-28 15:30"))
        );
        assert_eq!(DateRange::All.lower_bound(now), None);
    }

    #[test]
    fn test_status_all_is_noop() {
        let now = dt("2025-06-28 15:30");
        let result = run_query(&fixture(), &BookingQuery::default(), now);
        assert_eq!(result.rows.len(), 4);
    }

    #[test]
    fn test_status_filter_exact_match() {
        let now = dt("2025-06-28 15:30");
        let query = BookingQuery {
            status: StatusFilter::Only(BookingStatus::Completed),
            ..Default::default()
        };
        let result = run_query(&fixture(), &query, now);
        assert_eq!(result.rows.len(), 2);
        assert!(result
            .rows
            .iter()
            .all(|b| b.status == BookingStatus::Completed));
    }

    #[test]
    fn test_stats_invariant_under_status_filter() {
        let now = dt("2025-06-28 15:30");
        let all = run_query(&fixture(), &BookingQuery::default(), now);
        let filtered = run_query(
            &fixture(),
            &BookingQuery {
                status: StatusFilter::Only(BookingStatus::Pending),
                ..Default::default()
            },
            now,
        );
        assert_eq!(all.stats, filtered.stats);
        assert_eq!(filtered.rows.len(), 1);
        assert_eq!(all.stats.total, 4);
        assert_eq!(all.stats.by_status.get("COMPLETED"), Some(&2));
    }

    #[test]
    fn test_revenue_counts_completed_only() {
        let stats = compute_stats(&fixture());
        assert_eq!(stats.total_revenue, 1200);
    }

    #[test]
    fn test_week_range_inclusive_lower_bound() {
        let now = dt("2025-06-28 15:30");
        let mut bookings = fixture();
        // Exactly on the boundary: 7 days before now.
        bookings.push(booking(
            "b5",
            BookingStatus::Pending,
            100,
            "2025-06-21 15:30",
        ));
        let query = BookingQuery {
            date_range: DateRange::Week,
            ..Default::default()
        };
        let result = run_query(&bookings, &query, now);
        let ids: Vec<&str> = result.rows.iter().map(|b| b.id.as_str()).collect();
        assert!(ids.contains(&"b5"));
        assert!(ids.contains(&"b1"));
        assert!(ids.contains(&"b4"));
        assert!(!ids.contains(&"b2"));
        assert!(!ids.contains(&"b3"));
    }

    #[test]
    fn test_default_sort_newest_first() {
        let now = dt("2025-06-28 15:30");
        let result = run_query(&fixture(), &BookingQuery::default(), now);
        let ids: Vec<&str> = result.rows.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b4", "b2", "b3"]);
    }

    #[test]
    fn test_sort_by_amount_descending() {
        let now = dt("2025-06-28 15:30");
        let query = BookingQuery {
            sort: SortBy::Amount,
            ..Default::default()
        };
        let result = run_query(&fixture(), &query, now);
        let amounts: Vec<i64> = result.rows.iter().map(|b| b.total_amount).collect();
        assert_eq!(amounts, vec![700, 500, 300, 200]);
    }

    #[test]
    fn test_sort_by_status_lexicographic() {
        let now = dt("2025-06-28 15:30");
        let query = BookingQuery {
            sort: SortBy::Status,
            ..Default::default()
        };
        let result = run_query(&fixture(), &query, now);
        let statuses: Vec<&str> = result.rows.iter().map(|b| b.status.as_str()).collect();
        let mut sorted = statuses.clone();
        sorted.sort();
        assert_eq!(statuses, sorted);
    }

    #[test]
    fn test_search_composes_with_filters() {
        let now = dt("2025-06-28 15:30");
        let mut bookings = fixture();
        bookings[0].service_name = "Plumbing".to_string();

        let query = BookingQuery {
            search: Some("ac repair".to_string()),
            status: StatusFilter::Only(BookingStatus::Completed),
            ..Default::default()
        };
        let result = run_query(&bookings, &query, now);
        // b1 matches status filter chain but not the search; b2/b3 match both.
        assert_eq!(result.rows.len(), 2);

        // Id substring search.
        let query = BookingQuery {
            search: Some("b4".to_string()),
            ..Default::default()
        };
        let result = run_query(&bookings, &query, now);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].id, "b4");
    }

    #[test]
    fn test_query_is_idempotent() {
        let now = dt("2025-06-28 15:30");
        let bookings = fixture();
        let first = run_query(&bookings, &BookingQuery::default(), now);
        let second = run_query(&bookings, &BookingQuery::default(), now);
        assert_eq!(first.stats, second.stats);
        assert_eq!(
            first.rows.iter().map(|b| &b.id).collect::<Vec<_>>(),
            second.rows.iter().map(|b| &b.id).collect::<Vec<_>>()
        );
    }
}
