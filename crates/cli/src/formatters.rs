//! Output formatters for CLI commands.
//!
//! Provides two output formats: plain text and JSON.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Formatter trait for different output types.
pub trait Formatter {
    /// Format a single resolved property.
    fn format_property(&self, key: &str, value: &str) -> Result<String>;

    /// Format a list of resolved properties, in load order.
    fn format_properties(&self, properties: &[(&str, &str)]) -> Result<String>;

    /// Format an `ENC(...)` value, with the salt it was derived with if any.
    fn format_encrypted(&self, value: &str, salt_hex: Option<&str>) -> Result<String>;
}

#[derive(Serialize)]
struct PropertyOutput<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct EncryptedOutput<'a> {
    value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    salt_hex: Option<&'a str>,
}

pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format_property(&self, _key: &str, value: &str) -> Result<String> {
        Ok(value.to_string())
    }

    fn format_properties(&self, properties: &[(&str, &str)]) -> Result<String> {
        Ok(properties
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn format_encrypted(&self, value: &str, salt_hex: Option<&str>) -> Result<String> {
        Ok(match salt_hex {
            Some(salt) => format!("{value}\nsalt_hex={salt}"),
            None => value.to_string(),
        })
    }
}

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_property(&self, key: &str, value: &str) -> Result<String> {
        Ok(serde_json::to_string_pretty(&PropertyOutput { key, value })?)
    }

    fn format_properties(&self, properties: &[(&str, &str)]) -> Result<String> {
        let map: serde_json::Map<String, serde_json::Value> = properties
            .iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::from(*value)))
            .collect();
        Ok(serde_json::to_string_pretty(&map)?)
    }

    fn format_encrypted(&self, value: &str, salt_hex: Option<&str>) -> Result<String> {
        Ok(serde_json::to_string_pretty(&EncryptedOutput { value, salt_hex })?)
    }
}

/// Get a formatter for the specified output format.
pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
