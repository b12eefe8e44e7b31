//! Key-ordered map type for generic values.
//!
//! [`ValueMap`] is the keyed-mapping form of [`Value`](crate::Value). Its keys
//! are always kept in ascending order, whatever order they were inserted in, so
//! a map encodes the same way no matter which `HashMap` produced it.
//!
//! ## Examples
//!
//! ```rust
//! use serde_blocks::{ValueMap, Value};
//!
//! let mut map = ValueMap::new();
//! map.insert("os".to_string(), Value::from("linux"));
//! map.insert("arch".to_string(), Value::from("amd64"));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["arch", "os"]);
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// A map of string keys to generic values, iterated in ascending key order.
///
/// This is a thin wrapper around [`IndexMap`] that re-sorts when a key arrives
/// out of order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMap(IndexMap<String, crate::Value>);

impl ValueMap {
    /// Creates an empty `ValueMap`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::ValueMap;
    ///
    /// let map = ValueMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    /// Creates an empty `ValueMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map at its ordered position.
    ///
    /// If the map already contained this key, the old value is returned.
    /// An out-of-order key re-sorts the map; build from an iterator with
    /// `collect` to sort a batch of unordered entries once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_blocks::{ValueMap, Value};
    ///
    /// let mut map = ValueMap::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        let out_of_order = self
            .0
            .last()
            .map_or(false, |(last, _)| last.as_str() > key.as_str())
            && !self.0.contains_key(&key);
        let old = self.0.insert(key, value);
        if out_of_order {
            self.0.sort_keys();
        }
        old
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in ascending order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in key order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in key order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl Default for ValueMap {
    fn default() -> Self {
        Self::new()
    }
}

impl From<HashMap<String, crate::Value>> for ValueMap {
    fn from(map: HashMap<String, crate::Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<ValueMap> for HashMap<String, crate::Value> {
    fn from(map: ValueMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sorts the collected entries once, after all of them are in.
impl FromIterator<(String, crate::Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        let mut map = IndexMap::from_iter(iter);
        map.sort_keys();
        ValueMap(map)
    }
}
