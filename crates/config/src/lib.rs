//! Property loading, enrichment and placeholder resolution.
//!
//! This crate loads a base property set, runs an ordered chain of enrichers
//! over it (node-scoped database overrides, `ENC(...)` decryption), and
//! resolves `${key}` placeholders into an immutable snapshot, with the process
//! environment as fallback source.

pub mod cache_key;
pub mod constants;
pub mod encryption;
pub mod enricher;
pub mod environment;
mod error;
mod loader;
pub mod placeholder;
pub mod properties;
mod snapshot;

pub use cache_key::generate_key;
pub use encryption::{AesGcmCipher, Decrypt, EncryptionError, MasterKeySource};
pub use enricher::{
    ConnectionKeys, ConnectionParams, Connector, DataSource, DatabaseEnricher, EncryptionEnricher,
    NodeScope, PropertiesEnricher, SqliteConnector, StoreError,
};
pub use environment::{Environment, load_dotenv, parse_define};
pub use error::ConfigError;
pub use loader::{
    DatabaseEnricherConfig, EncryptionEnricherConfig, EnricherConfig, EnrichingLoader,
    MasterKeyConfig, PipelineConfig, load,
};
pub use placeholder::{PlaceholderResolver, PlaceholderSettings, SystemPropertiesMode};
pub use properties::{PropertiesFile, PropertiesSource, PropertySet};
pub use snapshot::ResolvedSnapshot;
