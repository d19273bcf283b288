//! Load cycle: base properties, enricher chain, resolved snapshot.
//!
//! Responsibilities:
//! - Load the base property set from a `PropertiesSource`.
//! - Run every configured enricher, in list order, over the same mutable set.
//! - Optionally finish the cycle by building a `ResolvedSnapshot`.
//! - Build loaders from JSON pipeline files (see `pipeline.rs`).
//!
//! Does NOT handle:
//! - Retrying failed enrichers.
//! - Sharing state between load cycles; each call owns its own set.
//!
//! Invariants / Assumptions:
//! - Enrichers run strictly in sequence; the first failure aborts the load.
//! - Placeholders are resolved only after the whole chain has run, so keys
//!   added by any enricher are resolvable.

mod pipeline;

#[cfg(test)]
mod tests;

pub use pipeline::{
    DatabaseEnricherConfig, EncryptionEnricherConfig, EnricherConfig, MasterKeyConfig,
    PipelineConfig,
};

use crate::enricher::PropertiesEnricher;
use crate::environment::Environment;
use crate::error::Result;
use crate::placeholder::PlaceholderResolver;
use crate::properties::{PropertiesSource, PropertySet};
use crate::snapshot::ResolvedSnapshot;

/// Loads base properties and applies an ordered chain of enrichers.
#[derive(Default)]
pub struct EnrichingLoader {
    enrichers: Vec<Box<dyn PropertiesEnricher>>,
    resolver: PlaceholderResolver,
}

impl std::fmt::Debug for EnrichingLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichingLoader")
            .field("enrichers", &self.enricher_names())
            .field("resolver", &self.resolver)
            .finish()
    }
}

impl EnrichingLoader {
    /// Create a loader with no enrichers and default placeholder settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an enricher to the end of the chain.
    pub fn with_enricher(mut self, enricher: impl PropertiesEnricher + 'static) -> Self {
        self.enrichers.push(Box::new(enricher));
        self
    }

    /// Append several boxed enrichers, keeping their order.
    pub fn with_enrichers(
        mut self,
        enrichers: impl IntoIterator<Item = Box<dyn PropertiesEnricher>>,
    ) -> Self {
        self.enrichers.extend(enrichers);
        self
    }

    /// Replace the resolver used by `load_snapshot`.
    pub fn with_resolver(mut self, resolver: PlaceholderResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn resolver(&self) -> &PlaceholderResolver {
        &self.resolver
    }

    /// Names of the configured enrichers, in execution order.
    pub fn enricher_names(&self) -> Vec<&str> {
        self.enrichers.iter().map(|e| e.name()).collect()
    }

    /// Load the base set and run the enricher chain over it.
    ///
    /// The returned set is enriched but not placeholder-resolved.
    pub fn load(&self, source: &dyn PropertiesSource) -> Result<PropertySet> {
        tracing::debug!(source = %source.describe(), "Loading base properties");
        let mut properties = source.load()?;

        for enricher in &self.enrichers {
            tracing::info!(enricher = %enricher.name(), "Enriching properties using enricher");
            enricher.enrich(&mut properties)?;
        }

        tracing::debug!(count = properties.len(), "Properties loaded and enriched");
        Ok(properties)
    }

    /// Run a complete load cycle and resolve the result into a snapshot.
    pub fn load_snapshot(
        &self,
        source: &dyn PropertiesSource,
        environment: &Environment,
    ) -> Result<ResolvedSnapshot> {
        let properties = self.load(source)?;
        ResolvedSnapshot::build(&properties, environment, &self.resolver)
    }
}

/// Run one load cycle with default placeholder settings.
pub fn load(
    source: &dyn PropertiesSource,
    enrichers: Vec<Box<dyn PropertiesEnricher>>,
    environment: &Environment,
) -> Result<ResolvedSnapshot> {
    EnrichingLoader::new()
        .with_enrichers(enrichers)
        .load_snapshot(source, environment)
}
