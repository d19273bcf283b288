//! Enricher that decrypts `ENC(...)` values in place.
//!
//! Every key present when the step runs is inspected once; values carrying
//! the marker are replaced by their plaintext, all others are left alone.
//! No keys are added. The first failing decrypt aborts the step.

use std::sync::Arc;

use super::PropertiesEnricher;
use crate::encryption::{Decrypt, encrypted_payload};
use crate::error::{ConfigError, Result};
use crate::properties::PropertySet;

/// Replaces encrypted values with plaintext using one bound decrypt capability.
#[derive(Clone)]
pub struct EncryptionEnricher {
    decryptor: Arc<dyn Decrypt>,
}

impl std::fmt::Debug for EncryptionEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionEnricher").finish_non_exhaustive()
    }
}

impl EncryptionEnricher {
    pub fn new(decryptor: impl Decrypt + 'static) -> Self {
        Self {
            decryptor: Arc::new(decryptor),
        }
    }
}

impl PropertiesEnricher for EncryptionEnricher {
    fn name(&self) -> &str {
        "EncryptionEnricher"
    }

    fn enrich(&self, properties: &mut PropertySet) -> Result<()> {
        let encrypted: Vec<(String, String)> = properties
            .iter()
            .filter_map(|(key, value)| {
                encrypted_payload(value).map(|payload| (key.to_string(), payload.to_string()))
            })
            .collect();

        for (key, payload) in encrypted {
            let plaintext = self
                .decryptor
                .decrypt(&payload)
                .map_err(|source| ConfigError::Decryption {
                    key: key.clone(),
                    source,
                })?;
            properties.replace_existing(&key, plaintext);
            tracing::debug!(key = %key, "Decrypted property value");
        }
        Ok(())
    }
}
