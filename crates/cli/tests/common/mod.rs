//! Shared test utilities for propchain integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Write throwaway properties and pipeline files.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper are hermetic by default.

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// Returns a hermetic `propchain` command for integration testing.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - `PROPCHAIN_*` variables from the host are cleared.
pub fn propchain_cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("propchain");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");

    cmd.env_remove("PROPCHAIN_BASE")
        .env_remove("PROPCHAIN_PIPELINE")
        .env_remove("PROPCHAIN_MASTER_KEY")
        .env_remove("RUST_LOG");

    cmd
}

/// Write `content` to `name` inside `dir` and return the path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}
