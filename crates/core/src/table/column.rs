//! Column definitions.
//!
//! A [`Column`] pairs a typed accessor with optional render, sort and filter
//! capabilities. Each capability falls back to a default when absent:
//!
//! | Capability  | Default                                                  |
//! |-------------|----------------------------------------------------------|
//! | `render`    | the accessor value's display text                        |
//! | `sort_fn`   | [`CellValue::natural_cmp`] on accessor values            |
//! | `filter_fn` | case-insensitive substring match on the display text     |

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use crate::error::CoreError;
use crate::table::sort::SortDirection;
use crate::table::value::{CellValue, Record};

type Accessor<R> = Box<dyn Fn(&R) -> CellValue + Send + Sync>;
type Renderer<R> = Box<dyn Fn(&R) -> String + Send + Sync>;
type Comparator<R> = Box<dyn Fn(&R, &R) -> Ordering + Send + Sync>;
type FilterPredicate = Box<dyn Fn(&CellValue, &str) -> bool + Send + Sync>;

/// One displayed field of a table.
pub struct Column<R> {
    key: String,
    header: String,
    sortable: bool,
    filterable: bool,
    accessor: Accessor<R>,
    render: Option<Renderer<R>>,
    sort_fn: Option<Comparator<R>>,
    filter_fn: Option<FilterPredicate>,
}

impl<R> Column<R> {
    pub fn new(
        key: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&R) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            filterable: false,
            accessor: Box::new(accessor),
            render: None,
            sort_fn: None,
            filter_fn: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Custom display text. May contain markup; exports strip it.
    pub fn with_render(mut self, render: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    /// Custom ascending comparator. Implies `sortable`.
    pub fn with_sort(
        mut self,
        sort_fn: impl Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.sort_fn = Some(Box::new(sort_fn));
        self.sortable = true;
        self
    }

    /// Custom filter predicate over `(cell value, filter value)`. Implies `filterable`.
    pub fn with_filter(
        mut self,
        filter_fn: impl Fn(&CellValue, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter_fn = Some(Box::new(filter_fn));
        self.filterable = true;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_filterable(&self) -> bool {
        self.filterable
    }

    pub fn has_renderer(&self) -> bool {
        self.render.is_some()
    }

    pub fn value(&self, row: &R) -> CellValue {
        (self.accessor)(row)
    }

    /// Rendered text if a renderer exists, else the value's display text.
    pub fn display_text(&self, row: &R) -> String {
        match &self.render {
            Some(render) => render(row),
            None => self.value(row).to_string(),
        }
    }

    /// Compare two rows for the given direction.
    ///
    /// Descending order swaps the arguments rather than reversing the
    /// result, so custom comparators see `(b, a)`.
    pub fn compare(&self, a: &R, b: &R, direction: SortDirection) -> Ordering {
        let (first, second) = match direction {
            SortDirection::Asc => (a, b),
            SortDirection::Desc => (b, a),
        };
        match &self.sort_fn {
            Some(sort_fn) => sort_fn(first, second),
            None => self.value(first).natural_cmp(&self.value(second)),
        }
    }

    /// Whether `row` passes a filter value on this column.
    pub fn matches_filter(&self, row: &R, filter_value: &str) -> bool {
        let cell = self.value(row);
        match &self.filter_fn {
            Some(filter_fn) => filter_fn(&cell, filter_value),
            None => cell
                .search_text()
                .is_some_and(|text| text.contains(&filter_value.to_lowercase())),
        }
    }
}

impl Column<Record> {
    /// Column reading a dotted path out of a [`Record`].
    pub fn field(key: impl Into<String>, header: impl Into<String>) -> Self {
        let key = key.into();
        let path = key.clone();
        Column::new(key, header, move |row: &Record| row.cell(&path))
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("render", &self.render.is_some())
            .field("sort_fn", &self.sort_fn.is_some())
            .field("filter_fn", &self.filter_fn.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// ColumnSet
// ---------------------------------------------------------------------------

/// An ordered set of columns with unique keys.
#[derive(Debug)]
pub struct ColumnSet<R> {
    columns: Vec<Column<R>>,
}

impl<R> ColumnSet<R> {
    pub fn new(columns: Vec<Column<R>>) -> Result<Self, CoreError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.key.as_str()) {
                return Err(CoreError::Validation(format!(
                    "Duplicate column key '{}'",
                    column.key
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn get(&self, key: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column<R>> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a, R> IntoIterator for &'a ColumnSet<R> {
    type Item = &'a Column<R>;
    type IntoIter = std::slice::Iter<'a, Column<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug)]
    struct Item {
        name: &'static str,
        qty: i64,
    }

    fn name_col() -> Column<Item> {
        Column::new("name", "Name", |i: &Item| i.name.into())
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let result = ColumnSet::new(vec![name_col(), name_col()]);
        assert_matches!(result, Err(CoreError::Validation(msg)) if msg.contains("name"));
    }

    #[test]
    fn default_filter_is_case_insensitive_substring() {
        let col = name_col();
        let item = Item { name: "Central Depot", qty: 1 };
        assert!(col.matches_filter(&item, "DEPOT"));
        assert!(!col.matches_filter(&item, "north"));
    }

    #[test]
    fn custom_filter_receives_cell_and_filter_value() {
        let col = Column::new("qty", "Qty", |i: &Item| i.qty.into()).with_filter(|cell, value| {
            matches!(cell, CellValue::Int(q) if value.parse::<i64>().is_ok_and(|min| *q >= min))
        });
        assert!(col.is_filterable());
        assert!(col.matches_filter(&Item { name: "a", qty: 5 }, "3"));
        assert!(!col.matches_filter(&Item { name: "a", qty: 2 }, "3"));
    }

    #[test]
    fn descending_swaps_arguments_for_custom_comparator() {
        let col = Column::new("name", "Name", |i: &Item| i.name.into())
            .with_sort(|a: &Item, b: &Item| a.name.len().cmp(&b.name.len()));
        let short = Item { name: "ab", qty: 0 };
        let long = Item { name: "abcd", qty: 0 };
        assert_eq!(col.compare(&short, &long, SortDirection::Asc), Ordering::Less);
        assert_eq!(col.compare(&short, &long, SortDirection::Desc), Ordering::Greater);
    }

    #[test]
    fn display_text_uses_renderer_when_present() {
        let col = name_col().with_render(|i: &Item| format!("<b>{}</b>", i.name));
        let item = Item { name: "x", qty: 0 };
        assert_eq!(col.display_text(&item), "<b>x</b>");
        assert!(col.has_renderer());
    }

    #[test]
    fn record_field_column_reads_path() {
        let row = Record::try_from(serde_json::json!({"user": {"email": "a@b.vn"}})).unwrap();
        let col = Column::field("user.email", "Email");
        assert_eq!(col.display_text(&row), "a@b.vn");
    }
}
