//! Owned state of one table view.
//!
//! [`TableState`] is created by the view that fetched the rows and is passed
//! by reference to whatever renders it. Row sets are replaced wholesale;
//! rows are never mutated in place.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::CoreError;
use crate::table::column::{Column, ColumnSet};
use crate::table::export::{export_csv, CsvExport};
use crate::table::pipeline::{paginate, process, TableQuery};
use crate::table::selection::SelectionSet;
use crate::table::sort::SortState;
use crate::table::value::{row_key, RowKey, TableRow};

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50, 100];

type SelectionListener<R> = Box<dyn FnMut(&[&R]) + Send>;

/// The visible page of a table.
#[derive(Debug)]
pub struct TableView<'a, R> {
    pub rows: Vec<(RowKey, &'a R)>,
    pub page_index: usize,
    pub page_size: usize,
    /// Rows left after search and filters, before pagination.
    pub total_rows: usize,
    pub total_pages: usize,
}

pub struct TableState<R> {
    rows: Vec<R>,
    columns: ColumnSet<R>,
    query: TableQuery,
    page_index: usize,
    page_size: usize,
    selection: SelectionSet,
    hidden_columns: BTreeSet<String>,
    selection_listener: Option<SelectionListener<R>>,
}

impl<R: TableRow> TableState<R> {
    pub fn new(columns: ColumnSet<R>) -> Self {
        Self::with_page_size(columns, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(columns: ColumnSet<R>, page_size: usize) -> Self {
        Self {
            rows: Vec::new(),
            columns,
            query: TableQuery::default(),
            page_index: 1,
            page_size: page_size.max(1),
            selection: SelectionSet::new(),
            hidden_columns: BTreeSet::new(),
            selection_listener: None,
        }
    }

    // ---- rows ----

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Replace the row set. Clears the selection and returns to page 1.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.page_index = 1;
        self.selection.clear();
        self.notify_selection();
    }

    pub fn columns(&self) -> &ColumnSet<R> {
        &self.columns
    }

    // ---- query ----

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
        self.page_index = 1;
    }

    /// Set a column filter. A blank value removes the filter.
    pub fn set_filter(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.query.filters.remove(column);
        } else {
            self.query.filters.insert(column.to_string(), value);
        }
        self.page_index = 1;
    }

    pub fn clear_filters(&mut self) {
        self.query.filters.clear();
        self.page_index = 1;
    }

    pub fn sort(&self) -> &SortState {
        &self.query.sort
    }

    /// Header click on `column`. Returns `false` for unknown or unsortable
    /// columns, which leave the sort untouched.
    pub fn toggle_sort(&mut self, column: &str) -> bool {
        match self.columns.get(column) {
            Some(c) if c.is_sortable() => {
                self.query.sort.cycle(column);
                true
            }
            _ => false,
        }
    }

    // ---- pagination ----

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page(&mut self, page_index: usize) {
        self.page_index = page_index.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 1;
    }

    // ---- processing ----

    /// Search, filter and sort the full row set.
    pub fn processed(&self) -> Vec<&R> {
        process(&self.rows, &self.columns, &self.query)
    }

    /// The current page of processed rows with their keys.
    pub fn view(&self) -> TableView<'_, R> {
        let processed = self.processed();
        let page = paginate(&processed, self.page_index, self.page_size);
        let rows = page
            .rows
            .iter()
            .map(|row| (self.key_of(row), *row))
            .collect();

        TableView {
            rows,
            page_index: page.page_index,
            page_size: page.page_size,
            total_rows: page.total_rows,
            total_pages: page.total_pages,
        }
    }

    fn key_of(&self, row: &R) -> RowKey {
        let position = self
            .rows
            .iter()
            .position(|candidate| std::ptr::eq(candidate, row))
            .unwrap_or_default();
        row_key(row, position)
    }

    // ---- selection ----

    /// Register a callback that receives the selected rows whenever the
    /// selection or the row set changes.
    pub fn on_selection_change(&mut self, listener: impl FnMut(&[&R]) + Send + 'static) {
        self.selection_listener = Some(Box::new(listener));
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn toggle_row(&mut self, key: RowKey) -> bool {
        let selected = self.selection.toggle(key);
        self.notify_selection();
        selected
    }

    /// Header checkbox: select every row on the current page, or deselect
    /// them all when they are already selected.
    pub fn toggle_page(&mut self) {
        let keys: Vec<RowKey> = self.view().rows.into_iter().map(|(key, _)| key).collect();
        if keys.iter().all(|k| self.selection.contains(k)) {
            keys.iter().for_each(|k| self.selection.remove(k));
        } else {
            keys.into_iter().for_each(|k| self.selection.insert(k));
        }
        self.notify_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.notify_selection();
    }

    /// Selected rows drawn from the full row set.
    pub fn selected_rows(&self) -> Vec<&R> {
        self.selection.resolve(&self.rows)
    }

    fn notify_selection(&mut self) {
        let Some(listener) = self.selection_listener.as_mut() else {
            return;
        };
        let selected = self.selection.resolve(&self.rows);
        listener(&selected);
    }

    // ---- column visibility ----

    /// Show or hide a column. Returns `true` when the column is now visible.
    pub fn toggle_column_visibility(&mut self, column: &str) -> bool {
        if self.hidden_columns.remove(column) {
            true
        } else {
            self.hidden_columns.insert(column.to_string());
            false
        }
    }

    pub fn visible_columns(&self) -> Vec<&Column<R>> {
        self.columns
            .iter()
            .filter(|c| !self.hidden_columns.contains(c.key()))
            .collect()
    }

    // ---- export ----

    /// Export the filtered and sorted rows (all pages) over the visible columns.
    pub fn export_csv(&self, title: Option<&str>, today: NaiveDate) -> Result<CsvExport, CoreError> {
        export_csv(&self.processed(), &self.visible_columns(), title, today)
    }
}
