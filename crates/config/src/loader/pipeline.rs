//! JSON pipeline files describing a loader.
//!
//! Responsibilities:
//! - Deserialize placeholder settings and the ordered enricher list.
//! - Turn that description into a ready `EnrichingLoader`.
//!
//! Does NOT handle:
//! - Holding secrets: passwords and keys are referenced by environment
//!   variable name, never stored in the file.
//!
//! Example:
//!
//! ```json
//! {
//!   "placeholder": { "system_properties_mode": "fallback" },
//!   "enrichers": [
//!     { "type": "encryption", "master_key": { "source": "env", "var": "PROPCHAIN_MASTER_KEY" } },
//!     {
//!       "type": "database",
//!       "table": "app_properties",
//!       "key_column": "prop_key",
//!       "value_column": "prop_value",
//!       "node_scope": { "column": "node_id", "id_key": "node.id" },
//!       "connection": {
//!         "driver_key": "db.driver", "url_key": "db.url",
//!         "user_key": "db.user", "password_key": "db.password"
//!       }
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use super::EnrichingLoader;
use crate::encryption::{AesGcmCipher, MasterKeySource};
use crate::enricher::{
    ConnectionKeys, DatabaseEnricher, EncryptionEnricher, NodeScope, PropertiesEnricher,
};
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::placeholder::{PlaceholderResolver, PlaceholderSettings};

/// Top-level pipeline file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub placeholder: PlaceholderSettings,
    pub enrichers: Vec<EnricherConfig>,
}

/// One enricher in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnricherConfig {
    Database(DatabaseEnricherConfig),
    Encryption(EncryptionEnricherConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseEnricherConfig {
    pub table: String,
    pub key_column: String,
    pub value_column: String,
    #[serde(default)]
    pub node_scope: Option<NodeScope>,
    pub connection: ConnectionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionEnricherConfig {
    pub master_key: MasterKeyConfig,
}

/// Where the master key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MasterKeyConfig {
    /// Hex-encoded 32-byte key in an environment variable.
    Env { var: String },
    /// Password in an environment variable, stretched with Argon2id.
    Password { password_var: String, salt_hex: String },
}

impl PipelineConfig {
    /// Read a pipeline from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::ConfigFileRead {
            path: path.to_path_buf(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ConfigFileParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Build the loader described by this pipeline.
    ///
    /// Master keys are resolved from `environment` now, so a missing key
    /// fails before any property is loaded.
    pub fn into_loader(self, environment: &Environment) -> Result<EnrichingLoader> {
        let resolver = PlaceholderResolver::new(self.placeholder)?;
        let enrichers = self
            .enrichers
            .into_iter()
            .map(|config| config.build(environment))
            .collect::<Result<Vec<_>>>()?;

        Ok(EnrichingLoader::new()
            .with_resolver(resolver)
            .with_enrichers(enrichers))
    }
}

impl EnricherConfig {
    fn build(self, environment: &Environment) -> Result<Box<dyn PropertiesEnricher>> {
        match self {
            EnricherConfig::Database(db) => {
                let mut builder =
                    DatabaseEnricher::builder(db.table, db.key_column, db.value_column)
                        .connection_keys(db.connection);
                if let Some(scope) = db.node_scope {
                    builder = builder.node_scope(scope.column, scope.id_key);
                }
                Ok(Box::new(builder.build()?))
            }
            EnricherConfig::Encryption(enc) => {
                let cipher = enc.master_key.cipher(environment)?;
                Ok(Box::new(EncryptionEnricher::new(cipher)))
            }
        }
    }
}

impl MasterKeyConfig {
    fn cipher(&self, environment: &Environment) -> Result<AesGcmCipher> {
        let (source, salt) = match self {
            MasterKeyConfig::Env { var } => {
                if environment.get(var).is_none() {
                    return Err(ConfigError::MissingConfig(var.clone()));
                }
                (MasterKeySource::Env(var.clone()), None)
            }
            MasterKeyConfig::Password {
                password_var,
                salt_hex,
            } => {
                let password = environment
                    .get(password_var)
                    .ok_or_else(|| ConfigError::MissingConfig(password_var.clone()))?;
                let salt = hex::decode(salt_hex).map_err(|e| ConfigError::InvalidValue {
                    key: "master_key.salt_hex".to_string(),
                    message: e.to_string(),
                })?;
                (
                    MasterKeySource::Password(SecretString::new(password.to_string().into())),
                    Some(salt),
                )
            }
        };

        AesGcmCipher::from_source(&source, salt.as_deref(), environment).map_err(|e| {
            ConfigError::InvalidValue {
                key: "master_key".to_string(),
                message: e.to_string(),
            }
        })
    }
}
