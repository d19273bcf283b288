//! Pluggable enrichment steps applied to the property set during loading.
//!
//! Responsibilities:
//! - Define the `PropertiesEnricher` capability.
//! - Host the concrete enrichers: node-scoped database overrides and
//!   `ENC(...)` decryption.
//!
//! Does NOT handle:
//! - Ordering enrichers (the loader runs them in list order).
//! - Placeholder resolution (runs after every enricher, see `snapshot`).
//!
//! Invariants:
//! - Enrichers add keys only through `PropertySet::insert_if_absent`, so an
//!   existing value is never overwritten by a merge.
//! - A failing enricher returns an error; it never swallows structural failures.

mod connection;
mod database;
mod encryption;

pub use connection::{ConnectionKeys, ConnectionParams, Connector, SqliteConnector, StoreError};
pub use database::{DataSource, DatabaseEnricher, DatabaseEnricherBuilder, NodeScope};
pub use encryption::EncryptionEnricher;

use crate::error::Result;
use crate::properties::PropertySet;

/// A step that adds entries to, or transforms entries of, a property set.
pub trait PropertiesEnricher {
    /// Short name used in log lines and error messages.
    fn name(&self) -> &str;

    /// Enrich `properties` in place.
    fn enrich(&self, properties: &mut PropertySet) -> Result<()>;
}

impl<E: PropertiesEnricher + ?Sized> PropertiesEnricher for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn enrich(&self, properties: &mut PropertySet) -> Result<()> {
        (**self).enrich(properties)
    }
}
