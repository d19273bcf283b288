//! Read-only view of the hosting process's environment.
//!
//! Responsibilities:
//! - Capture process environment variables plus explicit `key=value` defines
//!   into an immutable map used as the placeholder fallback source.
//! - Parse `key=value` defines and load `.env` files.
//!
//! Does NOT handle:
//! - Placeholder resolution (see `placeholder`).
//! - Writing back to the process environment.
//!
//! Invariants:
//! - An `Environment` never changes after construction; resolution threads it
//!   explicitly so tests can substitute a fake one.
//! - Defines take precedence over process variables with the same name.
//! - Non-UTF-8 process variables are skipped.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use indexmap::IndexMap;

use crate::constants::DOTENV_DISABLED_VAR;
use crate::error::ConfigError;

/// Immutable snapshot of environment variables and defines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: IndexMap<String, String>,
}

impl Environment {
    /// An environment with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the current process environment.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Add an explicit define, shadowing any process variable of the same name.
    pub fn with_define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse a `key=value` define. The value may itself contain `=`.
pub fn parse_define(define: &str) -> Result<(String, String), ConfigError> {
    match define.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(ConfigError::InvalidValue {
            key: define.to_string(),
            message: "define must have the form key=value".to_string(),
        }),
    }
}

fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Load environment variables from a `.env` file if present.
///
/// If `DOTENV_DISABLED` is set to "true" or "1" nothing is loaded.
/// Missing `.env` files are silently ignored.
///
/// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => Err(ConfigError::DotenvParse { error_index: idx }),
        Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}
