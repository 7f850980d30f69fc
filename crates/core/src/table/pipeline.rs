//! Row processing: search, column filters, stable sort, pagination.
//!
//! The pipeline is pure and synchronous. It borrows the row set and returns
//! references in display order; rows are never cloned or mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::column::ColumnSet;
use crate::table::sort::SortState;

/// Everything besides the rows and columns that shapes the processed view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableQuery {
    /// Free-text search across every column.
    pub search: String,
    /// Filter value per column key.
    pub filters: BTreeMap<String, String>,
    pub sort: SortState,
}

/// Apply search, filters and sort to `rows`.
///
/// - Search keeps a row when any column's text contains the trimmed,
///   lower-cased search text. Null cells never match.
/// - Filters compose by AND. Blank filter values and unknown column keys are
///   ignored.
/// - Sorting is stable, so ties keep their input order.
pub fn process<'a, R>(rows: &'a [R], columns: &ColumnSet<R>, query: &TableQuery) -> Vec<&'a R> {
    let needle = query.search.trim().to_lowercase();

    let active_filters: Vec<_> = query
        .filters
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .filter_map(|(key, value)| columns.get(key).map(|column| (column, value.as_str())))
        .collect();

    let mut out: Vec<&R> = rows
        .iter()
        .filter(|row| {
            needle.is_empty()
                || columns.iter().any(|column| {
                    column
                        .value(row)
                        .search_text()
                        .is_some_and(|text| text.contains(&needle))
                })
        })
        .filter(|row| {
            active_filters
                .iter()
                .all(|(column, value)| column.matches_filter(row, value))
        })
        .collect();

    if let SortState::Sorted { column, direction } = &query.sort {
        if let Some(column) = columns.get(column) {
            out.sort_by(|a, b| column.compare(a, b, *direction));
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of processed rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    /// 1-based page index that was requested (after clamping).
    pub page_index: usize,
    pub page_size: usize,
    pub total_rows: usize,
    pub total_pages: usize,
}

/// Number of pages for `row_count` rows; `0` when there are no rows.
pub fn total_pages(row_count: usize, page_size: usize) -> usize {
    row_count.div_ceil(page_size.max(1))
}

/// Slice out the 1-based `page_index`.
///
/// A page index past the end yields an empty slice. `page_index` 0 is
/// treated as 1 and `page_size` 0 as 1.
pub fn paginate<T>(rows: &[T], page_index: usize, page_size: usize) -> Page<'_, T> {
    let page_index = page_index.max(1);
    let page_size = page_size.max(1);
    let start = (page_index - 1).saturating_mul(page_size).min(rows.len());
    let end = start.saturating_add(page_size).min(rows.len());

    Page {
        rows: &rows[start..end],
        page_index,
        page_size,
        total_rows: rows.len(),
        total_pages: total_pages(rows.len(), page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::column::Column;

    #[derive(Debug, PartialEq)]
    struct Staff {
        id: u32,
        name: &'static str,
        station: Option<&'static str>,
        shift: i64,
    }

    fn staff(id: u32, name: &'static str, station: Option<&'static str>, shift: i64) -> Staff {
        Staff { id, name, station, shift }
    }

    fn columns() -> ColumnSet<Staff> {
        ColumnSet::new(vec![
            Column::new("name", "Name", |s: &Staff| s.name.into()).sortable(),
            Column::new("station", "Station", |s: &Staff| s.station.into()).filterable(),
            Column::new("shift", "Shift", |s: &Staff| s.shift.into()).sortable(),
        ])
        .unwrap()
    }

    fn sample() -> Vec<Staff> {
        vec![
            staff(1, "Minh", Some("HN-01"), 2),
            staff(2, "Lan", None, 1),
            staff(3, "Hoa", Some("HCM-02"), 2),
            staff(4, "Tuan", Some("HN-03"), 1),
        ]
    }

    fn ids(rows: &[&Staff]) -> Vec<u32> {
        rows.iter().map(|s| s.id).collect()
    }

    // -- search --------------------------------------------------------------

    #[test]
    fn empty_search_returns_rows_unchanged() {
        let rows = sample();
        let query = TableQuery {
            search: "   ".into(),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn search_matches_any_column_case_insensitively() {
        let rows = sample();
        let query = TableQuery {
            search: " hn ".into(),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![1, 4]);
    }

    #[test]
    fn search_skips_null_cells_without_failing() {
        let rows = sample();
        let query = TableQuery {
            search: "lan".into(),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![2]);
    }

    #[test]
    fn every_search_result_contains_the_needle() {
        let rows = sample();
        let cols = columns();
        for needle in ["a", "h", "0", "2", "zz"] {
            let query = TableQuery {
                search: needle.into(),
                ..Default::default()
            };
            for row in process(&rows, &cols, &query) {
                assert!(cols.iter().any(|c| c.value(row).to_string().to_lowercase().contains(needle)));
            }
        }
    }

    // -- filters -------------------------------------------------------------

    #[test]
    fn filters_compose_with_and() {
        let rows = sample();
        let mut filters = BTreeMap::new();
        filters.insert("station".to_string(), "hn".to_string());
        filters.insert("name".to_string(), "tu".to_string());
        let query = TableQuery {
            filters,
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![4]);
    }

    #[test]
    fn blank_and_unknown_filters_are_ignored() {
        let rows = sample();
        let mut filters = BTreeMap::new();
        filters.insert("station".to_string(), " ".to_string());
        filters.insert("nope".to_string(), "x".to_string());
        let query = TableQuery {
            filters,
            ..Default::default()
        };
        assert_eq!(process(&rows, &columns(), &query).len(), 4);
    }

    #[test]
    fn custom_filter_fn_is_used() {
        let rows = sample();
        let cols = ColumnSet::new(vec![Column::new("shift", "Shift", |s: &Staff| {
            s.shift.into()
        })
        .with_filter(|cell, value| cell.to_string() == value)])
        .unwrap();
        let mut filters = BTreeMap::new();
        filters.insert("shift".to_string(), "1".to_string());
        let query = TableQuery {
            filters,
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &cols, &query)), vec![2, 4]);
    }

    // -- sort ----------------------------------------------------------------

    #[test]
    fn default_sort_is_stable_for_ties() {
        let rows = sample();
        let query = TableQuery {
            sort: SortState::ascending("shift"),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![2, 4, 1, 3]);

        let query = TableQuery {
            sort: SortState::descending("shift"),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![1, 3, 2, 4]);
    }

    #[test]
    fn custom_sort_is_stable_for_ties() {
        let rows = sample();
        let cols = ColumnSet::new(vec![Column::new("name", "Name", |s: &Staff| {
            s.name.into()
        })
        .with_sort(|a: &Staff, b: &Staff| a.name.len().cmp(&b.name.len()))])
        .unwrap();
        let query = TableQuery {
            sort: SortState::ascending("name"),
            ..Default::default()
        };
        // "Lan" and "Hoa" tie at 3; "Minh" and "Tuan" tie at 4.
        assert_eq!(ids(&process(&rows, &cols, &query)), vec![2, 3, 1, 4]);

        let query = TableQuery {
            sort: SortState::descending("name"),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &cols, &query)), vec![1, 4, 2, 3]);
    }

    #[test]
    fn sort_by_text_orders_lexicographically() {
        let rows = sample();
        let query = TableQuery {
            sort: SortState::ascending("name"),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![3, 2, 1, 4]);
    }

    #[test]
    fn nulls_sort_last_ascending() {
        let rows = sample();
        let query = TableQuery {
            sort: SortState::ascending("station"),
            ..Default::default()
        };
        assert_eq!(ids(&process(&rows, &columns(), &query)), vec![3, 1, 4, 2]);
    }

    // -- pagination ----------------------------------------------------------

    #[test]
    fn second_page_of_twenty_five() {
        let rows: Vec<u32> = (1..=25).collect();
        let page = paginate(&rows, 2, 10);
        assert_eq!(page.rows, &(11..=20).collect::<Vec<_>>()[..]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_rows, 25);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let rows: Vec<u32> = (1..=25).collect();
        let page = paginate(&rows, 9, 10);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn no_rows_means_zero_pages() {
        let rows: Vec<u32> = Vec::new();
        let page = paginate(&rows, 1, 10);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn zero_inputs_are_clamped() {
        let rows: Vec<u32> = (1..=3).collect();
        let page = paginate(&rows, 0, 0);
        assert_eq!(page.rows, &[1]);
        assert_eq!(page.page_index, 1);
        assert_eq!(page.total_pages, 3);
    }
}
