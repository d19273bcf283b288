//! Tests for the enriching loader.
//!
//! Responsibilities:
//! - Test enricher ordering and failure propagation.
//! - Test pipeline file parsing and loader construction.
//!
//! Invariants:
//! - Tests never touch the process environment; environments are built explicitly.
//! - Temporary directories are cleaned up automatically via `tempfile`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::enricher::PropertiesEnricher;
use crate::error::Result;
use crate::properties::PropertySet;

pub mod chain_tests;
pub mod pipeline_tests;

/// Enricher that records its name into a shared journal and inserts one key.
pub struct RecordingEnricher {
    pub name: &'static str,
    pub insert: (&'static str, &'static str),
    pub journal: Rc<RefCell<Vec<&'static str>>>,
}

impl PropertiesEnricher for RecordingEnricher {
    fn name(&self) -> &str {
        self.name
    }

    fn enrich(&self, properties: &mut PropertySet) -> Result<()> {
        self.journal.borrow_mut().push(self.name);
        properties.insert_if_absent(self.insert.0, self.insert.1);
        Ok(())
    }
}
