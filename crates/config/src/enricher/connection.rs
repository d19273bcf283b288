//! Connection parameters and connectors for the database enricher.
//!
//! Responsibilities:
//! - Resolve driver / url / user / password from named property keys.
//! - Open connections through the `Connector` seam (SQLite by default).
//!
//! Does NOT handle:
//! - Querying or merging rows (see `database.rs`).
//! - Pooling; every enrichment call opens and closes its own connection.

use rusqlite::{Connection, OpenFlags};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ConfigError;
use crate::properties::PropertySet;

/// Failures raised while talking to the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported driver '{0}'")]
    UnsupportedDriver(String),

    #[error("Failed to open connection to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Shared connection lock poisoned")]
    LockPoisoned,
}

/// Names of the property keys holding the connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionKeys {
    pub driver_key: String,
    pub url_key: String,
    pub user_key: String,
    pub password_key: String,
}

impl ConnectionKeys {
    pub fn new(
        driver_key: impl Into<String>,
        url_key: impl Into<String>,
        user_key: impl Into<String>,
        password_key: impl Into<String>,
    ) -> Self {
        Self {
            driver_key: driver_key.into(),
            url_key: url_key.into(),
            user_key: user_key.into(),
            password_key: password_key.into(),
        }
    }

    /// Read the connection parameters from the live property set.
    ///
    /// # Errors
    ///
    /// `ConfigError::MissingConfig` naming the first absent key.
    pub fn resolve(&self, properties: &PropertySet) -> Result<ConnectionParams, ConfigError> {
        let value = |key: &str| {
            properties
                .get(key)
                .map(str::to_string)
                .ok_or_else(|| ConfigError::MissingConfig(key.to_string()))
        };

        Ok(ConnectionParams {
            driver: value(&self.driver_key)?,
            url: value(&self.url_key)?,
            user: value(&self.user_key)?,
            password: SecretString::new(value(&self.password_key)?.into()),
        })
    }
}

/// Resolved connection parameters. The password is never printed.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub driver: String,
    pub url: String,
    pub user: String,
    pub password: SecretString,
}

/// Opens connections to the relational store.
pub trait Connector: Send + Sync {
    fn connect(&self, params: &ConnectionParams) -> Result<Connection, StoreError>;
}

impl<F> Connector for F
where
    F: Fn(&ConnectionParams) -> Result<Connection, StoreError> + Send + Sync,
{
    fn connect(&self, params: &ConnectionParams) -> Result<Connection, StoreError> {
        self(params)
    }
}

/// Connector for SQLite databases.
///
/// Accepts drivers whose name contains `sqlite` and urls of the form
/// `jdbc:sqlite:<path>`, `sqlite:<path>`, `:memory:` or a bare path.
/// File databases are opened read-only; user and password are not used.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteConnector;

impl SqliteConnector {
    fn target(url: &str) -> &str {
        let url = url.strip_prefix("jdbc:").unwrap_or(url);
        url.strip_prefix("sqlite:").unwrap_or(url)
    }
}

impl Connector for SqliteConnector {
    fn connect(&self, params: &ConnectionParams) -> Result<Connection, StoreError> {
        if !params.driver.to_ascii_lowercase().contains("sqlite") {
            return Err(StoreError::UnsupportedDriver(params.driver.clone()));
        }

        let target = Self::target(&params.url);
        tracing::debug!(url = %params.url, user = %params.user, "Opening SQLite connection");

        let opened = if target == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open_with_flags(
                target,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
        };
        opened.map_err(|source| StoreError::Connect {
            url: params.url.clone(),
            source,
        })
    }
}
