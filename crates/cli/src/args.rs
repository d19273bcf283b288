//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and `PROPCHAIN_*` environment fallbacks.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `commands` module).

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use propchain_config::constants::DEFAULT_MASTER_KEY_VAR;

use crate::formatters::OutputFormat;

#[derive(Parser)]
#[command(name = "propchain")]
#[command(about = "Load, enrich and resolve property files", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  propchain --base app.properties get db.url\n  propchain --base app.properties --pipeline pipeline.json dump --output json\n  propchain -D node.id=edge-1 --base app.properties dump --include-env\n  propchain encrypt 's3cret' --master-key-var APP_MASTER_KEY\n  propchain encrypt 's3cret' --password-var APP_PASSWORD\n"
)]
pub struct Cli {
    /// Base properties file
    #[arg(short, long, global = true, env = "PROPCHAIN_BASE", value_name = "FILE")]
    pub base: Option<PathBuf>,

    /// Pipeline file (JSON) describing placeholder settings and enrichers
    #[arg(long, global = true, env = "PROPCHAIN_PIPELINE", value_name = "FILE")]
    pub pipeline: Option<PathBuf>,

    /// Define a value visible to placeholders, as key=value (repeatable)
    #[arg(short = 'D', long = "define", global = true, value_name = "KEY=VALUE")]
    pub defines: Vec<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Log line format written to stderr (filter with RUST_LOG)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the resolved value of one property
    Get {
        /// Property key
        key: String,
    },

    /// Print every resolved property
    Dump {
        /// Also print environment-only keys
        #[arg(long)]
        include_env: bool,
    },

    /// Encrypt a value into ENC(...) form for use in a properties file
    Encrypt {
        /// Value to encrypt
        plaintext: String,

        /// Environment variable holding the hex-encoded 32-byte master key
        #[arg(long, default_value = DEFAULT_MASTER_KEY_VAR)]
        master_key_var: String,

        /// Derive the key from the password in this environment variable instead
        #[arg(long, value_name = "VAR")]
        password_var: Option<String>,

        /// Hex salt for password derivation (generated and printed when omitted)
        #[arg(long, requires = "password_var", value_name = "HEX")]
        salt_hex: Option<String>,
    },
}
