//! Centralized constants for the propchain workspace.
//!
//! This module contains default values used across crates to avoid
//! magic string duplication.

// =============================================================================
// Placeholder Syntax
// =============================================================================

/// Default placeholder prefix (`${name}`).
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "${";

/// Default placeholder suffix (`${name}`).
pub const DEFAULT_PLACEHOLDER_SUFFIX: &str = "}";

/// Default separator between a placeholder name and its inline default
/// value (`${name:default}`).
pub const DEFAULT_VALUE_SEPARATOR: &str = ":";

// =============================================================================
// Encrypted Value Marker
// =============================================================================

/// Prefix that marks a property value as encrypted.
pub const ENCRYPTED_VALUE_PREFIX: &str = "ENC(";

/// Suffix that closes an encrypted property value.
pub const ENCRYPTED_VALUE_SUFFIX: &str = ")";

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Salt length used when deriving keys from passwords.
pub const SALT_LEN: usize = 16;

// =============================================================================
// Environment Variables
// =============================================================================

/// Environment variable that disables `.env` loading when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

/// Default environment variable holding the hex-encoded master key.
pub const DEFAULT_MASTER_KEY_VAR: &str = "PROPCHAIN_MASTER_KEY";
