//! Pipeline file tests.
//!
//! Responsibilities:
//! - Test JSON parsing, defaults and error mapping of pipeline files.
//! - Test that a parsed pipeline builds a working loader.

use std::io::Write;

use rusqlite::Connection;
use tempfile::{NamedTempFile, TempDir};

use crate::encryption::AesGcmCipher;
use crate::enricher::NodeScope;
use crate::environment::Environment;
use crate::error::ConfigError;
use crate::loader::{EnricherConfig, MasterKeyConfig, PipelineConfig};
use crate::placeholder::SystemPropertiesMode;
use crate::properties::PropertySet;

fn write_pipeline(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file
}

const FULL_PIPELINE: &str = r#"{
  "placeholder": { "system_properties_mode": "override", "ignore_unresolvable": true },
  "enrichers": [
    { "type": "encryption", "master_key": { "source": "env", "var": "MASTER" } },
    {
      "type": "database",
      "table": "app_properties",
      "key_column": "prop_key",
      "value_column": "prop_value",
      "node_scope": { "column": "node_id", "id_key": "node.id" },
      "connection": {
        "driver_key": "db.driver", "url_key": "db.url",
        "user_key": "db.user", "password_key": "db.password"
      }
    }
  ]
}"#;

#[test]
fn test_parse_full_pipeline() {
    let file = write_pipeline(FULL_PIPELINE);
    let pipeline = PipelineConfig::from_path(file.path()).unwrap();

    assert_eq!(
        pipeline.placeholder.system_properties_mode,
        SystemPropertiesMode::Override
    );
    assert!(pipeline.placeholder.ignore_unresolvable);
    assert_eq!(pipeline.placeholder.prefix, "${");
    assert_eq!(pipeline.enrichers.len(), 2);

    assert!(matches!(
        &pipeline.enrichers[0],
        EnricherConfig::Encryption(enc) if enc.master_key == MasterKeyConfig::Env { var: "MASTER".to_string() }
    ));
    match &pipeline.enrichers[1] {
        EnricherConfig::Database(db) => {
            assert_eq!(db.table, "app_properties");
            assert_eq!(
                db.node_scope,
                Some(NodeScope {
                    column: "node_id".to_string(),
                    id_key: "node.id".to_string(),
                })
            );
            assert_eq!(db.connection.password_key, "db.password");
        }
        other => panic!("expected database enricher, got {other:?}"),
    }
}

#[test]
fn test_empty_pipeline_uses_defaults() {
    let file = write_pipeline("{}");
    let pipeline = PipelineConfig::from_path(file.path()).unwrap();
    assert_eq!(pipeline, PipelineConfig::default());
    assert_eq!(
        pipeline.placeholder.system_properties_mode,
        SystemPropertiesMode::Fallback
    );
}

#[test]
fn test_unknown_enricher_type_is_parse_error() {
    let file = write_pipeline(r#"{ "enrichers": [ { "type": "ldap" } ] }"#);
    let err = PipelineConfig::from_path(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigFileParse { .. }));
}

#[test]
fn test_missing_pipeline_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = PipelineConfig::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigFileRead { .. }));
}

#[test]
fn test_into_loader_keeps_enricher_order() {
    let file = write_pipeline(FULL_PIPELINE);
    let pipeline = PipelineConfig::from_path(file.path()).unwrap();
    let env: Environment = [("MASTER", "ab".repeat(32))].into_iter().collect();

    let loader = pipeline.into_loader(&env).unwrap();
    assert_eq!(
        loader.enricher_names(),
        vec!["EncryptionEnricher", "DatabaseEnricher"]
    );
}

#[test]
fn test_missing_master_key_fails_before_loading() {
    let file = write_pipeline(FULL_PIPELINE);
    let pipeline = PipelineConfig::from_path(file.path()).unwrap();

    let err = pipeline.into_loader(&Environment::empty()).unwrap_err();
    assert!(matches!(err, ConfigError::MissingConfig(var) if var == "MASTER"));
}

#[test]
fn test_short_master_key_is_invalid_value() {
    let file = write_pipeline(FULL_PIPELINE);
    let pipeline = PipelineConfig::from_path(file.path()).unwrap();
    let env: Environment = [("MASTER", "abcd")].into_iter().collect();

    let err = pipeline.into_loader(&env).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "master_key"));
}

#[test]
fn test_password_master_key_decrypts_values() {
    let salt_hex = "73616c7473616c7473616c74";
    let file = write_pipeline(&format!(
        r#"{{ "enrichers": [ {{ "type": "encryption",
              "master_key": {{ "source": "password", "password_var": "PW", "salt_hex": "{salt_hex}" }} }} ] }}"#
    ));
    let env: Environment = [("PW", "correct horse")].into_iter().collect();

    let source = crate::encryption::MasterKeySource::Password(secrecy::SecretString::new(
        "correct horse".to_string().into(),
    ));
    let salt = hex::decode(salt_hex).unwrap();
    let cipher = AesGcmCipher::from_source(&source, Some(&salt), &env).unwrap();
    let encrypted = cipher.encrypt_value("hunter2").unwrap();

    let loader = PipelineConfig::from_path(file.path())
        .unwrap()
        .into_loader(&env)
        .unwrap();
    let base: PropertySet = [("db.password", encrypted)].into_iter().collect();
    let props = loader.load(&base).unwrap();

    assert_eq!(props.get("db.password"), Some("hunter2"));
}

#[test]
fn test_bad_salt_is_invalid_value() {
    let file = write_pipeline(
        r#"{ "enrichers": [ { "type": "encryption",
             "master_key": { "source": "password", "password_var": "PW", "salt_hex": "zz" } } ] }"#,
    );
    let env: Environment = [("PW", "pw")].into_iter().collect();

    let err = PipelineConfig::from_path(file.path())
        .unwrap()
        .into_loader(&env)
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "master_key.salt_hex"));
}

#[test]
fn test_database_pipeline_against_sqlite_file() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("props.db");
    {
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE app_properties (node_id TEXT, prop_key TEXT, prop_value TEXT);
             INSERT INTO app_properties VALUES ('edge-1', 'cache.size', '512');
             INSERT INTO app_properties VALUES (NULL, 'cache.size', '128');
             INSERT INTO app_properties VALUES (NULL, 'cache.ttl', '60');",
        )
        .unwrap();
    }

    let file = write_pipeline(
        r#"{ "enrichers": [ {
              "type": "database",
              "table": "app_properties",
              "key_column": "prop_key",
              "value_column": "prop_value",
              "node_scope": { "column": "node_id", "id_key": "node.id" },
              "connection": {
                "driver_key": "db.driver", "url_key": "db.url",
                "user_key": "db.user", "password_key": "db.password"
              } } ] }"#,
    );
    let loader = PipelineConfig::from_path(file.path())
        .unwrap()
        .into_loader(&Environment::empty())
        .unwrap();

    let base: PropertySet = [
        ("db.driver", "org.sqlite.JDBC".to_string()),
        ("db.url", format!("jdbc:sqlite:{}", db_path.display())),
        ("db.user", "app".to_string()),
        ("db.password", "unused".to_string()),
        ("node.id", "edge-1".to_string()),
        ("summary", "${cache.size}/${cache.ttl}".to_string()),
    ]
    .into_iter()
    .collect();

    let snapshot = loader.load_snapshot(&base, &Environment::empty()).unwrap();
    assert_eq!(snapshot.get_property("cache.size"), Some("512"));
    assert_eq!(snapshot.get_property("cache.ttl"), Some("60"));
    assert_eq!(snapshot.get_property("summary"), Some("512/60"));
}
