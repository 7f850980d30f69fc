//! Cell values, row identity and the dynamic [`Record`] row type.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{id_from_value, Timestamp};

// ---------------------------------------------------------------------------
// CellValue
// ---------------------------------------------------------------------------

/// A typed value produced by a column accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(Timestamp),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Natural ordering used when a column has no custom comparator.
    ///
    /// Numbers compare across `Int`/`Float`. Values of different kinds are
    /// grouped by kind with nulls last, which keeps the order total so a
    /// stable sort leaves equal values in input order.
    pub fn natural_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64).total_cmp(b),
            (CellValue::Float(a), CellValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Timestamp(a), CellValue::Timestamp(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            CellValue::Bool(_) => 0,
            CellValue::Int(_) | CellValue::Float(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::Timestamp(_) => 3,
            CellValue::Null => 4,
        }
    }

    /// Lower-cased display text, or `None` for null cells.
    pub(crate) fn search_text(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string().to_lowercase())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => {
                // Integral floats print without a fraction ("2", not "2.0").
                if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{v}")
                }
            }
            CellValue::Text(s) => f.write_str(s),
            CellValue::Timestamp(ts) => f.write_str(&ts.to_rfc3339()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<Timestamp> for CellValue {
    fn from(value: Timestamp) -> Self {
        CellValue::Timestamp(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            // Nested structures are shown as their JSON text.
            other => CellValue::Text(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Row identity
// ---------------------------------------------------------------------------

/// Identity of a row within a loaded row set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKey {
    /// The row's own `id` / `_id`.
    Id(String),
    /// Fallback for rows without an identifier: index in the row set.
    Position(usize),
}

/// Rows that can be displayed in a table.
pub trait TableRow {
    /// The row's backend identifier, if it has one.
    fn row_id(&self) -> Option<String>;
}

/// Resolve the key of the row at `position`.
pub fn row_key<R: TableRow>(row: &R, position: usize) -> RowKey {
    row.row_id()
        .map(RowKey::Id)
        .unwrap_or(RowKey::Position(position))
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A schemaless row backed by a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub serde_json::Map<String, serde_json::Value>);

impl Record {
    /// Resolve a dotted lookup path such as `user.full_name`.
    pub fn lookup(&self, path: &str) -> Option<&serde_json::Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Cell value at `path`, [`CellValue::Null`] when absent.
    pub fn cell(&self, path: &str) -> CellValue {
        self.lookup(path).map(CellValue::from).unwrap_or(CellValue::Null)
    }
}

impl TableRow for Record {
    fn row_id(&self) -> Option<String> {
        ["id", "_id"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(id_from_value))
    }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = crate::error::CoreError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Record(map)),
            other => Err(crate::error::CoreError::Validation(format!(
                "Expected a JSON object row, got {other}"
            ))),
        }
    }
}
