//! `${name}` placeholder resolution.
//!
//! Responsibilities:
//! - Substitute placeholders in a raw value using the property set first and
//!   the environment as fallback (configurable via `SystemPropertiesMode`).
//! - Resolve recursively: substituted values, inline defaults
//!   (`${name:default}`) and nested names (`${a.${b}}`).
//! - Detect circular references.
//!
//! Does NOT handle:
//! - Mutating the property set; resolution is read-only.
//! - Deciding which keys to resolve (see `snapshot`).
//!
//! Invariants:
//! - A value with no placeholder is returned unchanged.
//! - A missing reference is an error unless `ignore_unresolvable` is set.
//! - An unterminated placeholder (`${abc`) is left as literal text.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_PLACEHOLDER_PREFIX, DEFAULT_PLACEHOLDER_SUFFIX, DEFAULT_VALUE_SEPARATOR,
};
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::properties::PropertySet;

/// Where placeholder names are looked up, and in which order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemPropertiesMode {
    /// Property set only; the environment is never consulted.
    Never,
    /// Property set first, environment when the key is absent.
    #[default]
    Fallback,
    /// Environment first, property set when the key is absent.
    Override,
}

/// Placeholder syntax and lookup policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderSettings {
    pub prefix: String,
    pub suffix: String,
    /// Separator for inline defaults; `None` disables defaults.
    pub value_separator: Option<String>,
    /// Leave unresolvable placeholders verbatim instead of failing.
    pub ignore_unresolvable: bool,
    pub system_properties_mode: SystemPropertiesMode,
}

impl Default for PlaceholderSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
            suffix: DEFAULT_PLACEHOLDER_SUFFIX.to_string(),
            value_separator: Some(DEFAULT_VALUE_SEPARATOR.to_string()),
            ignore_unresolvable: false,
            system_properties_mode: SystemPropertiesMode::Fallback,
        }
    }
}

type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

struct Pass<'a> {
    lookup: &'a Lookup<'a>,
    ignore_unresolvable: bool,
    visiting: Vec<String>,
}

/// Resolves placeholders against a property set and an environment.
#[derive(Debug, Clone)]
pub struct PlaceholderResolver {
    settings: PlaceholderSettings,
    /// Opening token counted for nesting, e.g. `{` for `${`.
    simple_prefix: String,
}

impl Default for PlaceholderResolver {
    fn default() -> Self {
        Self {
            settings: PlaceholderSettings::default(),
            simple_prefix: "{".to_string(),
        }
    }
}

impl PlaceholderResolver {
    /// Create a resolver, rejecting empty delimiters.
    pub fn new(settings: PlaceholderSettings) -> Result<Self> {
        if settings.prefix.is_empty() || settings.suffix.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "placeholder".to_string(),
                message: "prefix and suffix must not be empty".to_string(),
            });
        }
        if settings.value_separator.as_deref() == Some("") {
            return Err(ConfigError::InvalidValue {
                key: "placeholder.value_separator".to_string(),
                message: "must not be empty; omit it to disable defaults".to_string(),
            });
        }

        let simple_prefix = if settings.suffix == "}" && settings.prefix.ends_with('{') {
            "{".to_string()
        } else {
            settings.prefix.clone()
        };
        Ok(Self {
            settings,
            simple_prefix,
        })
    }

    pub fn settings(&self) -> &PlaceholderSettings {
        &self.settings
    }

    /// Look up a single key according to the configured `SystemPropertiesMode`.
    pub fn lookup<'a>(
        &self,
        name: &str,
        properties: &'a PropertySet,
        environment: &'a Environment,
    ) -> Option<&'a str> {
        match self.settings.system_properties_mode {
            SystemPropertiesMode::Never => properties.get(name),
            SystemPropertiesMode::Fallback => {
                properties.get(name).or_else(|| environment.get(name))
            }
            SystemPropertiesMode::Override => {
                environment.get(name).or_else(|| properties.get(name))
            }
        }
    }

    /// Resolve every placeholder in `raw`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::UnresolvedReference` if a referenced key has no value
    ///   and no inline default (unless `ignore_unresolvable` is set).
    /// - `ConfigError::CircularReference` if a reference re-enters itself.
    pub fn resolve(
        &self,
        raw: &str,
        properties: &PropertySet,
        environment: &Environment,
    ) -> Result<String> {
        self.resolve_inner(
            raw,
            properties,
            environment,
            self.settings.ignore_unresolvable,
        )
    }

    /// Like `resolve`, but never fails: unresolvable placeholders are kept
    /// verbatim, and a value with a circular reference is returned unchanged.
    pub(crate) fn resolve_lenient(
        &self,
        raw: &str,
        properties: &PropertySet,
        environment: &Environment,
    ) -> String {
        match self.resolve_inner(raw, properties, environment, true) {
            Ok(resolved) => resolved,
            Err(error) => {
                tracing::debug!(error = %error, "Keeping unresolved value verbatim");
                raw.to_string()
            }
        }
    }

    fn resolve_inner(
        &self,
        raw: &str,
        properties: &PropertySet,
        environment: &Environment,
        ignore_unresolvable: bool,
    ) -> Result<String> {
        let lookup = |name: &str| {
            self.lookup(name, properties, environment)
                .map(str::to_string)
        };
        let mut pass = Pass {
            lookup: &lookup,
            ignore_unresolvable,
            visiting: Vec::new(),
        };
        self.parse_value(raw, &mut pass)
    }

    fn parse_value(&self, value: &str, pass: &mut Pass<'_>) -> Result<String> {
        let prefix = self.settings.prefix.as_str();
        let suffix_len = self.settings.suffix.len();
        let mut result = value.to_string();
        let mut search_from = 0;

        while let Some(offset) = result[search_from..].find(prefix) {
            let start = search_from + offset;
            let Some(end) = self.find_placeholder_end(&result, start) else {
                break;
            };

            let original = result[start + prefix.len()..end].to_string();
            if pass.visiting.contains(&original) {
                return Err(ConfigError::CircularReference { key: original });
            }
            pass.visiting.push(original.clone());

            let name = self.parse_value(&original, pass)?;
            let resolved = match (pass.lookup)(&name) {
                Some(found) => Some(found),
                None => self.inline_default(&name, pass),
            };

            match resolved {
                Some(found) => {
                    let found = self.parse_value(&found, pass)?;
                    result.replace_range(start..end + suffix_len, &found);
                    search_from = start + found.len();
                }
                None if pass.ignore_unresolvable => {
                    search_from = end + suffix_len;
                }
                None => {
                    return Err(ConfigError::UnresolvedReference {
                        key: name,
                        value: value.to_string(),
                    });
                }
            }

            pass.visiting.pop();
        }

        Ok(result)
    }

    /// `name:default` falls back to `default` when `name` is absent.
    fn inline_default(&self, name: &str, pass: &Pass<'_>) -> Option<String> {
        let separator = self.settings.value_separator.as_deref()?;
        let (actual, default) = name.split_once(separator)?;
        (pass.lookup)(actual).or_else(|| Some(default.to_string()))
    }

    /// Index of the suffix closing the placeholder opened at `start`,
    /// skipping over nested `{...}` pairs.
    fn find_placeholder_end(&self, buf: &str, start: usize) -> Option<usize> {
        let suffix = self.settings.suffix.as_str();
        let mut index = start + self.settings.prefix.len();
        let mut nested = 0usize;

        while index < buf.len() {
            let rest = &buf[index..];
            if rest.starts_with(suffix) {
                if nested == 0 {
                    return Some(index);
                }
                nested -= 1;
                index += suffix.len();
            } else if rest.starts_with(self.simple_prefix.as_str()) {
                nested += 1;
                index += self.simple_prefix.len();
            } else {
                index += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
        None
    }
}
