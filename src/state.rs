use std::collections::BTreeMap;

use crate::diff::{diff_maps, Change};
use crate::vocabulary::{to_canonical, to_local};
use crate::{Error, Result};

/// Last observed device state, keyed by local name with canonical
/// duplicates. Entries are only ever added or overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    values: BTreeMap<String, String>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks a field up by local or canonical name.
    pub fn get(&self, name: &str) -> Result<&str> {
        self.values
            .get(to_local(name))
            .map(String::as_str)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(to_local(name))
    }

    /// Overwrites one field under both of its names.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let local = to_local(name);
        let canonical = to_canonical(local);
        if canonical != local {
            self.values.insert(canonical.to_string(), value.clone());
        }
        self.values.insert(local.to_string(), value);
    }

    /// Merge-on-update: every incoming key is stored under both its local
    /// and canonical name. Keys absent from `incoming` are left untouched.
    pub fn merge(&mut self, incoming: &BTreeMap<String, String>) -> Vec<Change> {
        let before = self.clone();
        for (key, value) in incoming {
            self.insert(key, value.as_str());
        }
        self.changes_since(&before)
    }

    /// Device fields whose value differs from `earlier`.
    pub fn changes_since(&self, earlier: &DeviceState) -> Vec<Change> {
        diff_maps(&earlier.values, &self.values)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[cfg(test)]
    fn as_map(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}
