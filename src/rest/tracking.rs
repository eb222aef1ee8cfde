//! Attribute storage with change tracking.
//!
//! [`Attributes`] is the mutable attribute map behind every
//! [`Resource`](crate::rest::Resource). It records which keys were changed
//! since the resource was last synced with the server, so that models with
//! `send_only_modified_attributes` only send what the caller touched.
//!
//! # How It Works
//!
//! - [`Attributes::set`] writes a value and marks the key changed when the
//!   new value differs from the stored one.
//! - [`Attributes::load`] writes a value without marking it. Server payloads
//!   are loaded this way.
//! - [`Attributes::mark_clean`] forgets all recorded changes, typically after
//!   a successful save.
//!
//! Keys are never removed. A value can only be overwritten.
//!
//! # Example
//!
//! ```rust
//! use rest_model::rest::{AttrValue, Attributes};
//! use serde_json::json;
//!
//! let mut attributes = Attributes::new();
//! attributes.load("id", json!(1));
//! attributes.load("first_name", json!("Gooby"));
//! assert!(!attributes.is_dirty());
//!
//! attributes.set("first_name", json!("Someone"));
//! assert!(attributes.is_changed("first_name"));
//! assert!(!attributes.is_changed("id"));
//!
//! attributes.mark_clean();
//! assert!(!attributes.is_dirty());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::rest::value::AttrValue;

/// An ordered attribute map with a changed-key set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, AttrValue>,
    changed: BTreeSet<String>,
}

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.values.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// Mutating through this reference does not mark the key changed.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttrValue> {
        self.values.get_mut(key)
    }

    /// Writes `value` under `key`, marking the key changed if the value differs.
    ///
    /// Returns `true` when the key was marked.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> bool {
        let key = key.into();
        let value = value.into();

        if self.values.get(&key) == Some(&value) {
            return false;
        }

        self.values.insert(key.clone(), value);
        self.changed.insert(key);
        true
    }

    /// Writes `value` under `key` without recording a change.
    pub fn load(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns `true` if `key` is present, even when its value is null.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns `true` if no attribute has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of stored attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterates over attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the keys changed since the last sync.
    #[must_use]
    pub const fn changed(&self) -> &BTreeSet<String> {
        &self.changed
    }

    /// Returns `true` if `key` was changed since the last sync.
    #[must_use]
    pub fn is_changed(&self, key: &str) -> bool {
        self.changed.contains(key)
    }

    /// Returns `true` if any key was changed since the last sync.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Forgets every recorded change.
    pub fn mark_clean(&mut self) {
        self.changed.clear();
    }

    /// Returns the changed attributes as plain JSON.
    #[must_use]
    pub fn changed_values(&self) -> Map<String, Value> {
        self.changed
            .iter()
            .filter_map(|key| {
                self.values
                    .get(key)
                    .map(|value| (key.clone(), value.to_json_value()))
            })
            .collect()
    }

    /// Returns every attribute as plain JSON.
    #[must_use]
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json_value()))
            .collect()
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttrValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_marks_changed_only_when_value_differs() {
        let mut attributes = Attributes::new();
        attributes.load("name", json!("Tobias"));

        assert!(!attributes.set("name", json!("Tobias")));
        assert!(!attributes.is_dirty());

        assert!(attributes.set("name", json!("Lindsay")));
        assert!(attributes.is_changed("name"));
    }

    #[test]
    fn test_load_does_not_mark_changed() {
        let mut attributes = Attributes::new();
        attributes.load("id", json!(1));
        attributes.load("tags", json!([]));

        assert_eq!(attributes.len(), 2);
        assert!(attributes.changed().is_empty());
    }

    #[test]
    fn test_contains_key_sees_null_values() {
        let mut attributes = Attributes::new();
        attributes.load("comments", Value::Null);

        assert!(attributes.contains_key("comments"));
        assert!(!attributes.is_empty());
    }

    #[test]
    fn test_changed_values_returns_only_changed_keys() {
        let mut attributes = Attributes::new();
        attributes.load("id", json!(1));
        attributes.load("first_name", json!("Gooby"));
        attributes.load("last_name", json!("Pls"));
        attributes.set("first_name", json!("Someone"));

        let changed = attributes.changed_values();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed["first_name"], json!("Someone"));
    }

    #[test]
    fn test_mark_clean_resets_dirty_state() {
        let mut attributes = Attributes::new();
        attributes.set("title", json!("Draft"));
        assert!(attributes.is_dirty());

        attributes.mark_clean();
        assert!(!attributes.is_dirty());
        assert_eq!(attributes.get("title"), Some(&AttrValue::from(json!("Draft"))));
    }
}
