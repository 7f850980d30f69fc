//! Row selection scoped to the loaded row set.

use std::collections::BTreeSet;

use crate::table::value::{row_key, RowKey, TableRow};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    keys: BTreeSet<RowKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `key`. Returns `true` when the key is now selected.
    pub fn toggle(&mut self, key: RowKey) -> bool {
        if self.keys.remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    pub fn insert(&mut self, key: RowKey) {
        self.keys.insert(key);
    }

    pub fn remove(&mut self, key: &RowKey) {
        self.keys.remove(key);
    }

    pub fn contains(&self, key: &RowKey) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RowKey> {
        self.keys.iter()
    }

    /// Selected rows, in row-set order, taken from the full row set rather
    /// than any filtered or paginated view.
    pub fn resolve<'a, R: TableRow>(&self, rows: &'a [R]) -> Vec<&'a R> {
        rows.iter()
            .enumerate()
            .filter(|(position, row)| self.keys.contains(&row_key(*row, *position)))
            .map(|(_, row)| row)
            .collect()
    }
}
