//! Per-instrument strategy counters

use std::collections::{BTreeMap, HashMap};

/// String-keyed integer counters
///
/// Each strategy namespaces its keys with its own id (`"<id>_COUNT"`).
/// Missing keys read as zero.
#[derive(Debug, Clone, Default)]
pub struct CounterTable {
    values: HashMap<String, i64>,
}

impl CounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> i64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    pub fn set(&mut self, key: &str, value: i64) {
        match self.values.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(key.to_string(), value);
            }
        }
    }

    /// Add one and return the new value
    pub fn increment(&mut self, key: &str) -> i64 {
        let next = self.get(key) + 1;
        self.set(key, next);
        next
    }

    pub fn reset(&mut self, key: &str) {
        if let Some(slot) = self.values.get_mut(key) {
            *slot = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ordered copy for diagnostics
    pub fn to_sorted(&self) -> BTreeMap<String, i64> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), *value))
            .collect()
    }
}
