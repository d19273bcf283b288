//! Command execution.
//!
//! Responsibilities:
//! - Build the placeholder environment (process env plus `-D` defines).
//! - Run one load cycle for `get` and `dump`.
//! - Encrypt values for `encrypt`, from a hex master key or a password
//!   (printing the salt a pipeline file needs to derive the key again).
//!
//! Does NOT handle:
//! - Argument parsing (see `args`) or exit code mapping (see `error`).
//!
//! Invariants:
//! - Results go to stdout; diagnostics go to stderr through tracing.
//! - Defines shadow process environment variables of the same name.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use propchain_config::{
    AesGcmCipher, ConfigError, Environment, MasterKeySource, PipelineConfig, PropertiesFile,
    PropertySet, ResolvedSnapshot, parse_define,
};
use secrecy::SecretString;

use crate::args::{Cli, Commands};
use crate::formatters::get_formatter;

pub fn run_command(cli: Cli) -> Result<()> {
    let environment = build_environment(&cli.defines)?;
    let formatter = get_formatter(cli.output);

    match cli.command {
        Commands::Get { key } => {
            let (_, snapshot) =
                load_properties(cli.base.as_deref(), cli.pipeline.as_deref(), &environment)?;
            let value = snapshot
                .get_property(&key)
                .ok_or_else(|| anyhow!("Property '{}' not found", key))?;
            println!("{}", formatter.format_property(&key, value)?);
        }
        Commands::Dump { include_env } => {
            let (properties, snapshot) =
                load_properties(cli.base.as_deref(), cli.pipeline.as_deref(), &environment)?;
            let entries: Vec<(&str, &str)> = snapshot
                .iter()
                .filter(|(key, _)| include_env || properties.contains_key(key))
                .collect();
            let output = formatter.format_properties(&entries)?;
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Commands::Encrypt {
            plaintext,
            master_key_var,
            password_var,
            salt_hex,
        } => {
            let (cipher, salt_hex) = match password_var {
                Some(password_var) => password_cipher(&environment, password_var, salt_hex)?,
                None => (master_key_cipher(&environment, master_key_var)?, None),
            };
            let encrypted = cipher
                .encrypt_value(&plaintext)
                .context("Failed to encrypt value")?;
            println!(
                "{}",
                formatter.format_encrypted(&encrypted, salt_hex.as_deref())?
            );
        }
    }

    Ok(())
}

fn master_key_cipher(environment: &Environment, master_key_var: String) -> Result<AesGcmCipher> {
    if environment.get(&master_key_var).is_none() {
        return Err(ConfigError::MissingConfig(master_key_var).into());
    }
    AesGcmCipher::from_source(&MasterKeySource::Env(master_key_var), None, environment)
        .context("Failed to read master key")
}

/// Password-derived cipher plus the hex salt it was derived with.
fn password_cipher(
    environment: &Environment,
    password_var: String,
    salt_hex: Option<String>,
) -> Result<(AesGcmCipher, Option<String>)> {
    let password = environment
        .get(&password_var)
        .map(|password| SecretString::new(password.to_string().into()))
        .ok_or_else(|| ConfigError::MissingConfig(password_var))?;

    let (cipher, salt) = match salt_hex {
        Some(salt_hex) => {
            let salt = hex::decode(salt_hex.trim()).map_err(|e| ConfigError::InvalidValue {
                key: "--salt-hex".to_string(),
                message: e.to_string(),
            })?;
            let cipher = AesGcmCipher::from_source(
                &MasterKeySource::Password(password),
                Some(&salt),
                environment,
            )
            .context("Failed to derive key from password")?;
            (cipher, salt)
        }
        None => {
            let (cipher, salt) = AesGcmCipher::with_new_salt(&password)
                .context("Failed to derive key from password")?;
            (cipher, salt.to_vec())
        }
    };

    Ok((cipher, Some(hex::encode(salt))))
}

fn build_environment(defines: &[String]) -> Result<Environment> {
    let mut environment = Environment::from_process();
    for define in defines {
        let (key, value) = parse_define(define)?;
        environment = environment.with_define(key, value);
    }
    Ok(environment)
}

fn load_properties(
    base: Option<&Path>,
    pipeline: Option<&Path>,
    environment: &Environment,
) -> Result<(PropertySet, ResolvedSnapshot)> {
    let base = base.ok_or_else(|| ConfigError::MissingConfig("--base (PROPCHAIN_BASE)".to_string()))?;

    let pipeline = match pipeline {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    let loader = pipeline.into_loader(environment)?;
    tracing::debug!(enrichers = ?loader.enricher_names(), "Pipeline ready");

    let properties = loader.load(&PropertiesFile::new(base))?;
    let snapshot = ResolvedSnapshot::build(&properties, environment, loader.resolver())?;
    Ok((properties, snapshot))
}
