//! Immutable, fully-resolved view of one load cycle.
//!
//! Responsibilities:
//! - Resolve every key of the enriched property set once.
//! - Also expose environment-only keys through the same lookup.
//!
//! Does NOT handle:
//! - Refreshing; a new load cycle builds a new snapshot.
//!
//! Invariants:
//! - Built exactly once per load cycle and never mutated afterwards.
//! - `get_property` on an unknown key returns `None`, never a default.
//! - Property keys fail hard on unresolvable or circular placeholders;
//!   environment-only keys never fail the build and keep such values verbatim.

use indexmap::IndexMap;
use serde::Serialize;

use crate::environment::Environment;
use crate::error::Result;
use crate::placeholder::PlaceholderResolver;
use crate::properties::PropertySet;

/// Read-only map from key to resolved value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedSnapshot {
    values: IndexMap<String, String>,
}

impl ResolvedSnapshot {
    /// Resolve `properties` and `environment` into a snapshot.
    ///
    /// # Errors
    ///
    /// Any `UnresolvedReference` or `CircularReference` raised while resolving
    /// a property key aborts the build.
    pub fn build(
        properties: &PropertySet,
        environment: &Environment,
        resolver: &PlaceholderResolver,
    ) -> Result<Self> {
        let mut values = IndexMap::with_capacity(properties.len() + environment.len());

        for key in properties.keys() {
            let Some(raw) = resolver.lookup(key, properties, environment) else {
                continue;
            };
            let resolved = resolver.resolve(raw, properties, environment)?;
            values.insert(key.to_string(), resolved);
        }

        for (key, raw) in environment.iter() {
            if values.contains_key(key) {
                continue;
            }
            let resolved = resolver.resolve_lenient(raw, properties, environment);
            values.insert(key.to_string(), resolved);
        }

        tracing::debug!(
            properties = properties.len(),
            total = values.len(),
            "Resolved property snapshot"
        );
        Ok(Self { values })
    }

    /// The resolved value of `name`, or `None` if the key is unknown.
    pub fn get_property(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
