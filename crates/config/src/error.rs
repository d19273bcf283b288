//! Error types for property loading, enrichment and resolution.
//!
//! Responsibilities:
//! - Define error variants for every failure that aborts a load cycle.
//! - Carry enough context (keys, enricher names, paths) for debugging.
//!
//! Does NOT handle:
//! - Cipher-level failures (see `encryption::EncryptionError`).
//! - Database driver failures (see `enricher::StoreError`).
//!
//! Invariants:
//! - Every variant is fatal to the load cycle; there is no "skip" variant.
//! - Errors never include decrypted plaintext or raw `.env` line contents.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::encryption::EncryptionError;

/// Errors that can occur while loading, enriching or resolving properties.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration key is absent.
    #[error("No value found for required configuration key '{0}'")]
    MissingConfig(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// An enricher failed while talking to its backing store.
    #[error("{enricher} could not load the properties: {source}")]
    EnrichmentFailed {
        enricher: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Could not resolve placeholder '{key}' in value \"{value}\"")]
    UnresolvedReference { key: String, value: String },

    #[error("Circular placeholder reference '{key}' in property definitions")]
    CircularReference { key: String },

    /// Decryption of an `ENC(...)` value failed. The ciphertext is not echoed.
    #[error("Failed to decrypt value of property '{key}': {source}")]
    Decryption {
        key: String,
        #[source]
        source: EncryptionError,
    },

    #[error("Failed to read properties from {path}")]
    BaseSourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed properties in {path} at line {line}: {message}")]
    BaseSourceParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to read config file at {path}")]
    ConfigFileRead { path: PathBuf },

    #[error("Failed to parse config file at {path}: {message}")]
    ConfigFileParse { path: PathBuf, message: String },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    /// Wrap a store-level failure raised by the named enricher.
    pub fn enrichment_failed(
        enricher: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::EnrichmentFailed {
            enricher: enricher.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
