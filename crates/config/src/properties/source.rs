//! Base property sources.
//!
//! Responsibilities:
//! - Define the `PropertiesSource` seam the loader reads its base set from.
//! - Read `.properties` files from disk, optionally tolerating absence.
//!
//! Does NOT handle:
//! - Enrichment or placeholder resolution of the loaded values.
//!
//! Invariants:
//! - Within one file, a later assignment of a key replaces an earlier one.
//! - A missing optional file yields an empty set and a warning, never an error.

use std::path::{Path, PathBuf};

use super::PropertySet;
use super::parser::parse_properties;
use crate::error::{ConfigError, Result};

/// Something that can produce the base property set of a load cycle.
pub trait PropertiesSource {
    /// Human-readable description used in log lines.
    fn describe(&self) -> String;

    /// Load the complete base property set.
    fn load(&self) -> Result<PropertySet>;
}

/// A `.properties` text file on disk.
#[derive(Debug, Clone)]
pub struct PropertiesFile {
    path: PathBuf,
    optional: bool,
}

impl PropertiesFile {
    /// A file that must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
        }
    }

    /// A file that may be missing; absence yields an empty set.
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PropertiesSource for PropertiesFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<PropertySet> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if self.optional && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Optional properties file not found, continuing with empty set"
                );
                return Ok(PropertySet::new());
            }
            Err(source) => {
                return Err(ConfigError::BaseSourceRead {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let pairs = parse_properties(&text).map_err(|e| ConfigError::BaseSourceParse {
            path: self.path.clone(),
            line: e.line,
            message: e.message,
        })?;
        Ok(pairs.into_iter().collect())
    }
}

/// An in-memory set is its own source.
impl PropertiesSource for PropertySet {
    fn describe(&self) -> String {
        format!("in-memory ({} entries)", self.len())
    }

    fn load(&self) -> Result<PropertySet> {
        Ok(self.clone())
    }
}
