//! The mutable property set assembled during a load cycle.
//!
//! Responsibilities:
//! - Hold the ordered key/value entries being enriched.
//! - Offer a first-wins merge (`insert_if_absent`) and an in-place value
//!   transform (`replace_existing`) as the only mutation paths.
//! - Load base entries from textual sources (see `source`).
//!
//! Does NOT handle:
//! - Placeholder resolution (see `placeholder`).
//! - Enrichment policies (see `enricher`).
//!
//! Invariants:
//! - A merge never overwrites a key that is already present.
//! - Iteration order is insertion order; it carries no precedence meaning.

mod parser;
mod source;

pub use source::{PropertiesFile, PropertiesSource};

use indexmap::IndexMap;

/// Ordered mapping from property key to raw (unresolved) value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: IndexMap<String, String>,
}

impl PropertySet {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Insert `value` under `key` only if the key is not present yet.
    ///
    /// Returns `true` when the entry was inserted, `false` when an existing
    /// value was kept and `value` discarded.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        match self.entries.entry(key.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Replace the value of an existing key, returning the previous value.
    ///
    /// Absent keys are left absent and `None` is returned. This is a value
    /// transform (e.g. decryption), not a merge.
    pub fn replace_existing(&mut self, key: &str, value: String) -> Option<String> {
        self.entries
            .get_mut(key)
            .map(|slot| std::mem::replace(slot, value))
    }

    /// Assign a key unconditionally. Only base sources may do this.
    pub(crate) fn assign(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertySet {
    /// Later pairs replace earlier ones, the way a properties file assigns keys.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = PropertySet::new();
        for (key, value) in iter {
            set.assign(key.into(), value.into());
        }
        set
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
