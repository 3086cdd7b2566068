//! Lazily populated tabular action-value store.

use std::collections::BTreeMap;

use crate::codec::StateKey;

/// Mapping from discrete state to one Q-value per action.
///
/// Entries are created on first access; the `first_visit` flag returned by
/// [`QTable::get_or_init`] is what drives the curiosity bonus.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    table: BTreeMap<StateKey, Vec<f64>>,
    action_size: usize,
}

impl QTable {
    pub fn new(action_size: usize) -> Self {
        Self {
            table: BTreeMap::new(),
            action_size,
        }
    }

    /// Rebuilds a table from stored rows.
    ///
    /// Rows whose length differs from `action_size` are zero-padded or
    /// truncated so every row indexes the full action set.
    pub fn from_rows(rows: BTreeMap<StateKey, Vec<f64>>, action_size: usize) -> Self {
        let table = rows
            .into_iter()
            .map(|(key, mut values)| {
                values.resize(action_size, 0.0);
                (key, values)
            })
            .collect();
        Self { table, action_size }
    }

    pub fn action_size(&self) -> usize {
        self.action_size
    }

    /// Returns the row for `key`, inserting a zero row if it is unseen.
    ///
    /// The boolean is `true` exactly when this call created the row.
    pub fn get_or_init(&mut self, key: &StateKey) -> (&mut Vec<f64>, bool) {
        let action_size = self.action_size;
        let mut first_visit = false;
        let row = self.table.entry(key.clone()).or_insert_with(|| {
            first_visit = true;
            vec![0.0; action_size]
        });
        (row, first_visit)
    }

    /// Read-only lookup; never inserts.
    pub fn get(&self, key: &StateKey) -> Option<&[f64]> {
        self.table.get(key).map(Vec::as_slice)
    }

    /// Values for `key`, or a zero row if unseen, without inserting.
    pub fn values_or_zero(&self, key: &StateKey) -> Vec<f64> {
        self.get(key)
            .map(<[f64]>::to_vec)
            .unwrap_or_else(|| vec![0.0; self.action_size])
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.table.contains_key(key)
    }

    /// Number of distinct states visited.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn rows(&self) -> &BTreeMap<StateKey, Vec<f64>> {
        &self.table
    }

    pub fn into_rows(self) -> BTreeMap<StateKey, Vec<f64>> {
        self.table
    }
}

/// Largest finite value in a row (0 for an empty or all-NaN row).
pub fn max_value(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(0.0)
}
