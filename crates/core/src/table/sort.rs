//! Sort state and the per-column tri-state header cycle.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Current table sort. A direction exists exactly when a column is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SortState {
    #[default]
    Unsorted,
    Sorted {
        column: String,
        direction: SortDirection,
    },
}

impl SortState {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self::Sorted {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self::Sorted {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Unsorted => None,
            Self::Sorted { column, .. } => Some(column),
        }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            Self::Unsorted => None,
            Self::Sorted { direction, .. } => Some(*direction),
        }
    }

    /// Advance the header-click cycle for `column`:
    /// `none -> asc -> desc -> none`. Clicking a different column starts it
    /// at `asc` and drops the previous column's state.
    pub fn cycle(&mut self, column: &str) {
        *self = match std::mem::take(self) {
            Self::Sorted {
                column: current,
                direction,
            } if current == column => match direction {
                SortDirection::Asc => Self::descending(current),
                SortDirection::Desc => Self::Unsorted,
            },
            _ => Self::ascending(column),
        };
    }
}
