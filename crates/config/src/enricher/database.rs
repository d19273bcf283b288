//! Database-backed enricher with optional node scoping.
//!
//! Responsibilities:
//! - Load key/value rows from a relational table and merge them first-wins.
//! - When a node scope is configured, merge the current node's rows before
//!   the global (null node id) rows.
//! - Acquire the connection per call (or reuse a shared one) and release it
//!   on every exit path.
//!
//! Does NOT handle:
//! - Schema creation or migration.
//! - Retrying failed queries.
//!
//! Invariants:
//! - Existing keys are never overwritten; discarded rows are logged at info.
//! - Rows with a null key or null value are skipped.
//! - Rows of other nodes are never queried.
//! - Table and column names are validated identifiers; the node id is a bound parameter.
//! - Close failures are ignored.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

use super::PropertiesEnricher;
use super::connection::{ConnectionKeys, Connector, SqliteConnector, StoreError};
use crate::error::{ConfigError, Result};
use crate::properties::PropertySet;

const ENRICHER_NAME: &str = "DatabaseEnricher";

/// Column holding the node id, and the property key naming the current node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeScope {
    pub column: String,
    pub id_key: String,
}

/// Where the enricher gets its connection from.
pub enum DataSource {
    /// A pre-built connection, reused across calls and never closed here.
    Shared(Arc<Mutex<Connection>>),
    /// A connection opened per call from parameters found in the property set.
    FromProperties {
        keys: ConnectionKeys,
        connector: Arc<dyn Connector>,
    },
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared(_) => f.write_str("Shared(..)"),
            Self::FromProperties { keys, .. } => f
                .debug_struct("FromProperties")
                .field("keys", keys)
                .finish_non_exhaustive(),
        }
    }
}

/// Merges rows of a property table into the property set.
#[derive(Debug)]
pub struct DatabaseEnricher {
    table: String,
    key_column: String,
    value_column: String,
    node_scope: Option<NodeScope>,
    data_source: DataSource,
}

/// Builder for [`DatabaseEnricher`].
pub struct DatabaseEnricherBuilder {
    table: String,
    key_column: String,
    value_column: String,
    node_scope: Option<NodeScope>,
    connection_keys: Option<ConnectionKeys>,
    shared: Option<Arc<Mutex<Connection>>>,
    connector: Option<Arc<dyn Connector>>,
}

impl DatabaseEnricherBuilder {
    /// Select rows by node id. An empty column name disables node scoping.
    pub fn node_scope(mut self, column: impl Into<String>, id_key: impl Into<String>) -> Self {
        let column = column.into();
        self.node_scope = (!column.is_empty()).then(|| NodeScope {
            column,
            id_key: id_key.into(),
        });
        self
    }

    /// Build connections from these property keys on each call.
    pub fn connection_keys(mut self, keys: ConnectionKeys) -> Self {
        self.connection_keys = Some(keys);
        self
    }

    /// Use a pre-built connection. Takes precedence over `connection_keys`.
    pub fn shared_connection(mut self, connection: Arc<Mutex<Connection>>) -> Self {
        self.shared = Some(connection);
        self
    }

    /// Override the connector used with `connection_keys` (default: SQLite).
    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Validate the configuration and build the enricher.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidValue` if a table or column name is not a plain
    ///   SQL identifier.
    /// - `ConfigError::MissingConfig` if a table, column or node id key name is
    ///   empty, or if no connection source was configured.
    pub fn build(self) -> Result<DatabaseEnricher> {
        validate_identifier("table", &self.table)?;
        validate_identifier("key_column", &self.key_column)?;
        validate_identifier("value_column", &self.value_column)?;
        if let Some(scope) = &self.node_scope {
            validate_identifier("node_id_column", &scope.column)?;
            if scope.id_key.trim().is_empty() {
                return Err(ConfigError::MissingConfig("node_id_key".to_string()));
            }
        }

        let data_source = match (self.shared, self.connection_keys) {
            (Some(shared), _) => DataSource::Shared(shared),
            (None, Some(keys)) => DataSource::FromProperties {
                keys,
                connector: self.connector.unwrap_or_else(|| Arc::new(SqliteConnector)),
            },
            (None, None) => {
                return Err(ConfigError::MissingConfig(
                    "connection (shared connection or connection keys)".to_string(),
                ));
            }
        };

        Ok(DatabaseEnricher {
            table: self.table,
            key_column: self.key_column,
            value_column: self.value_column,
            node_scope: self.node_scope,
            data_source,
        })
    }
}

impl DatabaseEnricher {
    /// Start building an enricher reading `key_column`/`value_column` from `table`.
    pub fn builder(
        table: impl Into<String>,
        key_column: impl Into<String>,
        value_column: impl Into<String>,
    ) -> DatabaseEnricherBuilder {
        DatabaseEnricherBuilder {
            table: table.into(),
            key_column: key_column.into(),
            value_column: value_column.into(),
            node_scope: None,
            connection_keys: None,
            shared: None,
            connector: None,
        }
    }

    pub fn node_scope(&self) -> Option<&NodeScope> {
        self.node_scope.as_ref()
    }

    fn base_select(&self) -> String {
        format!(
            "SELECT {}, {} FROM {}",
            self.key_column, self.value_column, self.table
        )
    }

    fn enrich_with(&self, conn: &Connection, properties: &mut PropertySet) -> Result<()> {
        let base_select = self.base_select();

        let Some(scope) = &self.node_scope else {
            return merge_rows(conn, &base_select, None, properties);
        };

        if let Some(node_id) = properties.get(&scope.id_key).map(str::to_string) {
            tracing::info!(node_id = %node_id, "Enriching properties with node specific values");
            let sql = format!("{base_select} WHERE {} = ?1", scope.column);
            merge_rows(conn, &sql, Some(&node_id), properties)?;
        }

        let sql = format!("{base_select} WHERE {} IS NULL", scope.column);
        merge_rows(conn, &sql, None, properties)
    }
}

impl PropertiesEnricher for DatabaseEnricher {
    fn name(&self) -> &str {
        ENRICHER_NAME
    }

    fn enrich(&self, properties: &mut PropertySet) -> Result<()> {
        match &self.data_source {
            DataSource::Shared(shared) => {
                let conn = shared
                    .lock()
                    .map_err(|_| failed(StoreError::LockPoisoned))?;
                self.enrich_with(&conn, properties)
            }
            DataSource::FromProperties { keys, connector } => {
                let params = keys.resolve(properties)?;
                let conn = connector.connect(&params).map_err(failed)?;
                let result = self.enrich_with(&conn, properties);
                if let Err((_, e)) = conn.close() {
                    tracing::debug!(error = %e, "Ignoring failure while closing connection");
                }
                result
            }
        }
    }
}

fn failed(error: StoreError) -> ConfigError {
    ConfigError::enrichment_failed(ENRICHER_NAME, error)
}

fn query_failed(error: rusqlite::Error) -> ConfigError {
    failed(StoreError::Query(error))
}

/// Run `sql` and merge its (key, value) rows first-wins.
fn merge_rows(
    conn: &Connection,
    sql: &str,
    node_id: Option<&str>,
    properties: &mut PropertySet,
) -> Result<()> {
    let mut stmt = conn.prepare(sql).map_err(query_failed)?;
    let mut rows = match node_id {
        Some(id) => stmt.query([id]),
        None => stmt.query([]),
    }
    .map_err(query_failed)?;

    let mut inserted = 0usize;
    while let Some(row) = rows.next().map_err(query_failed)? {
        let key = row.get_ref(0).map(column_text).map_err(query_failed)?;
        let value = row.get_ref(1).map(column_text).map_err(query_failed)?;
        let (Some(key), Some(value)) = (key, value) else {
            continue;
        };

        if properties.insert_if_absent(key.as_str(), value) {
            inserted += 1;
        } else {
            tracing::info!(key = %key, "Property exists in current properties and is not overridden");
        }
    }

    tracing::debug!(sql = %sql, inserted, "Merged database properties");
    Ok(())
}

/// String rendering of a column value; `None` for SQL NULL.
fn column_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Accept `name` or `schema.name` made of `[A-Za-z_][A-Za-z0-9_]*` parts.
/// An empty name is missing configuration; anything else must be a plain
/// (optionally dot-qualified) SQL identifier.
fn validate_identifier(field: &str, ident: &str) -> Result<()> {
    if ident.trim().is_empty() {
        return Err(ConfigError::MissingConfig(field.to_string()));
    }

    let valid_part = |part: &str| {
        let mut chars = part.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    if ident.split('.').all(valid_part) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: field.to_string(),
            message: format!("'{ident}' is not a valid SQL identifier"),
        })
    }
}
