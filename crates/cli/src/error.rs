//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map ConfigError variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-5 are reserved for specific error categories.

use propchain_config::{ConfigError, EncryptionError};

/// Structured exit codes for propchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure, including unknown keys.
    GeneralError = 1,

    /// A required key, file or environment variable is missing or invalid.
    ///
    /// Scripts should fix the configuration and not retry.
    MissingConfig = 2,

    /// An enricher failed (store unreachable, query failed).
    ///
    /// Scripts may retry once the store is reachable.
    EnrichmentFailed = 3,

    /// A placeholder could not be resolved or refers to itself.
    UnresolvedReference = 4,

    /// An `ENC(...)` value could not be decrypted or a value could not be encrypted.
    ///
    /// Usually a wrong master key.
    Decryption = 5,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ConfigError> for ExitCode {
    fn from(err: &ConfigError) -> Self {
        match err {
            ConfigError::MissingConfig(_)
            | ConfigError::InvalidValue { .. }
            | ConfigError::BaseSourceRead { .. }
            | ConfigError::BaseSourceParse { .. }
            | ConfigError::ConfigFileRead { .. }
            | ConfigError::ConfigFileParse { .. } => ExitCode::MissingConfig,

            ConfigError::EnrichmentFailed { .. } => ExitCode::EnrichmentFailed,

            ConfigError::UnresolvedReference { .. } | ConfigError::CircularReference { .. } => {
                ExitCode::UnresolvedReference
            }

            ConfigError::Decryption { .. } => ExitCode::Decryption,

            ConfigError::DotenvParse { .. }
            | ConfigError::DotenvIo { .. }
            | ConfigError::DotenvUnknown => ExitCode::GeneralError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Extract the appropriate exit code from this error.
    ///
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
                return ExitCode::from(config_err);
            }
            if cause.downcast_ref::<EncryptionError>().is_some() {
                return ExitCode::Decryption;
            }
        }

        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::MissingConfig.as_i32(), 2);
        assert_eq!(ExitCode::Decryption.as_i32(), 5);
    }

    #[test]
    fn test_from_config_error() {
        assert_eq!(
            ExitCode::from(&ConfigError::MissingConfig("db.url".to_string())),
            ExitCode::MissingConfig
        );
        assert_eq!(
            ExitCode::from(&ConfigError::CircularReference {
                key: "a".to_string()
            }),
            ExitCode::UnresolvedReference
        );
        assert_eq!(
            ExitCode::from(&ConfigError::enrichment_failed(
                "DatabaseEnricher",
                std::io::Error::other("down")
            )),
            ExitCode::EnrichmentFailed
        );
        assert_eq!(
            ExitCode::from(&ConfigError::Decryption {
                key: "db.password".to_string(),
                source: EncryptionError::DecryptionFailed("tag".to_string()),
            }),
            ExitCode::Decryption
        );
    }

    #[test]
    fn test_exit_code_found_through_context() {
        let err = Err::<(), _>(ConfigError::UnresolvedReference {
            key: "x".to_string(),
            value: "${x}".to_string(),
        })
        .context("Failed to resolve properties")
        .unwrap_err();
        assert_eq!(err.exit_code(), ExitCode::UnresolvedReference);
    }

    #[test]
    fn test_unknown_error_is_general() {
        let err = anyhow::anyhow!("Property 'x' not found");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }
}
