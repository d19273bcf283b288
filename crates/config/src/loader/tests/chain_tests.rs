//! Enricher chain tests for the loader.
//!
//! Responsibilities:
//! - Test that enrichers run in list order over one shared set.
//! - Test that a failing enricher aborts the load.
//! - Test that placeholders see keys added by any enricher.

use std::cell::RefCell;
use std::rc::Rc;

use super::RecordingEnricher;
use crate::enricher::{EncryptionEnricher, PropertiesEnricher};
use crate::encryption::EncryptionError;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};
use crate::loader::{EnrichingLoader, load};
use crate::properties::PropertySet;

struct FailingEnricher;

impl PropertiesEnricher for FailingEnricher {
    fn name(&self) -> &str {
        "FailingEnricher"
    }

    fn enrich(&self, _properties: &mut PropertySet) -> Result<()> {
        Err(ConfigError::enrichment_failed(
            "FailingEnricher",
            std::io::Error::other("connection refused"),
        ))
    }
}

fn recording(
    name: &'static str,
    insert: (&'static str, &'static str),
    journal: &Rc<RefCell<Vec<&'static str>>>,
) -> RecordingEnricher {
    RecordingEnricher {
        name,
        insert,
        journal: Rc::clone(journal),
    }
}

#[test]
fn test_enrichers_run_in_list_order() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    let loader = EnrichingLoader::new()
        .with_enricher(recording("first", ("shared", "from-first"), &journal))
        .with_enricher(recording("second", ("shared", "from-second"), &journal));

    let base = PropertySet::new();
    let props = loader.load(&base).unwrap();

    assert_eq!(*journal.borrow(), vec!["first", "second"]);
    assert_eq!(props.get("shared"), Some("from-first"));
    assert_eq!(loader.enricher_names(), vec!["first", "second"]);
}

#[test]
fn test_base_values_win_over_enrichers() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    let loader = EnrichingLoader::new().with_enricher(recording("db", ("k", "enriched"), &journal));

    let base: PropertySet = [("k", "base")].into_iter().collect();
    let props = loader.load(&base).unwrap();
    assert_eq!(props.get("k"), Some("base"));
}

#[test]
fn test_failure_aborts_remaining_enrichers() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    let loader = EnrichingLoader::new()
        .with_enricher(recording("before", ("a", "1"), &journal))
        .with_enricher(FailingEnricher)
        .with_enricher(recording("after", ("b", "2"), &journal));

    let err = loader.load(&PropertySet::new()).unwrap_err();

    assert!(matches!(err, ConfigError::EnrichmentFailed { .. }));
    assert!(err.to_string().contains("connection refused"));
    assert_eq!(*journal.borrow(), vec!["before"]);
}

#[test]
fn test_placeholders_resolve_keys_added_by_enrichers() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    let loader = EnrichingLoader::new()
        .with_enricher(recording("db", ("db.host", "db.internal"), &journal));

    let base: PropertySet = [("db.url", "jdbc:sqlite://${db.host}/app")].into_iter().collect();
    let snapshot = loader.load_snapshot(&base, &Environment::empty()).unwrap();

    assert_eq!(
        snapshot.get_property("db.url"),
        Some("jdbc:sqlite://db.internal/app")
    );
}

#[test]
fn test_decryption_failure_aborts_load() {
    let loader = EnrichingLoader::new().with_enricher(EncryptionEnricher::new(
        |_: &str| -> crate::encryption::Result<String> {
            Err(EncryptionError::DecryptionFailed("bad tag".to_string()))
        },
    ));

    let base: PropertySet = [("secret", "ENC(00)")].into_iter().collect();
    let err = loader.load(&base).unwrap_err();
    assert!(matches!(err, ConfigError::Decryption { .. }));
}

#[test]
fn test_load_function_builds_snapshot() {
    let base: PropertySet = [("greeting", "hello ${NAME}")].into_iter().collect();
    let env: Environment = [("NAME", "world")].into_iter().collect();

    let snapshot = load(&base, Vec::new(), &env).unwrap();
    assert_eq!(snapshot.get_property("greeting"), Some("hello world"));
    assert_eq!(snapshot.get_property("NAME"), Some("world"));
}

#[test]
fn test_debug_lists_enricher_names() {
    let journal = Rc::new(RefCell::new(Vec::new()));
    let loader = EnrichingLoader::new()
        .with_enricher(recording("db", ("k", "v"), &journal))
        .with_enricher(FailingEnricher);

    let rendered = format!("{loader:?}");
    assert!(rendered.contains("EnrichingLoader"));
    assert!(rendered.contains(r#"["db", "FailingEnricher"]"#));
}
