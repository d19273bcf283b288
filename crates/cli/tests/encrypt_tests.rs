//! Integration tests for the `encrypt` command.

mod common;

use common::{propchain_cmd, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_encrypt_then_get_round_trip() {
    let key = "ab".repeat(32);

    let output = propchain_cmd()
        .env("APP_MASTER_KEY", &key)
        .args(["encrypt", "hunter2", "--master-key-var", "APP_MASTER_KEY"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let encrypted = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert!(encrypted.starts_with("ENC(") && encrypted.ends_with(')'));
    assert!(!encrypted.contains("hunter2"));

    let dir = TempDir::new().unwrap();
    let base = write_file(
        &dir,
        "app.properties",
        &format!("db.password = {encrypted}\ndb.dsn = app:${{db.password}}@db\n"),
    );
    let pipeline = write_file(
        &dir,
        "pipeline.json",
        r#"{ "enrichers": [ { "type": "encryption",
              "master_key": { "source": "env", "var": "APP_MASTER_KEY" } } ] }"#,
    );

    propchain_cmd()
        .env("APP_MASTER_KEY", &key)
        .arg("--base")
        .arg(&base)
        .arg("--pipeline")
        .arg(&pipeline)
        .args(["get", "db.dsn"])
        .assert()
        .success()
        .stdout("app:hunter2@db\n");
}

#[test]
fn test_encrypt_without_master_key_returns_exit_code_2() {
    propchain_cmd()
        .args(["encrypt", "x"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("PROPCHAIN_MASTER_KEY"));
}

#[test]
fn test_encrypt_with_short_master_key_returns_exit_code_5() {
    propchain_cmd()
        .env("PROPCHAIN_MASTER_KEY", "abcd")
        .args(["encrypt", "x"])
        .assert()
        .code(5);
}

#[test]
fn test_password_encrypt_prints_salt_for_pipeline() {
    let output = propchain_cmd()
        .env("APP_PASSWORD", "correct horse")
        .args(["encrypt", "hunter2", "--password-var", "APP_PASSWORD"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    let encrypted = lines.next().unwrap().to_string();
    let salt_hex = lines
        .next()
        .and_then(|line| line.strip_prefix("salt_hex="))
        .unwrap()
        .to_string();
    assert!(encrypted.starts_with("ENC("));
    assert_eq!(salt_hex.len(), 32);

    let dir = TempDir::new().unwrap();
    let base = write_file(&dir, "app.properties", &format!("db.password = {encrypted}\n"));
    let pipeline = write_file(
        &dir,
        "pipeline.json",
        &format!(
            r#"{{ "enrichers": [ {{ "type": "encryption",
                  "master_key": {{ "source": "password", "password_var": "APP_PASSWORD",
                                   "salt_hex": "{salt_hex}" }} }} ] }}"#
        ),
    );

    propchain_cmd()
        .env("APP_PASSWORD", "correct horse")
        .arg("--base")
        .arg(&base)
        .arg("--pipeline")
        .arg(&pipeline)
        .args(["get", "db.password"])
        .assert()
        .success()
        .stdout("hunter2\n");
}

#[test]
fn test_password_encrypt_with_given_salt_is_reproducible_json() {
    let salt_hex = "73616c7473616c7473616c74";
    let output = propchain_cmd()
        .env("APP_PASSWORD", "pw")
        .args([
            "--output",
            "json",
            "encrypt",
            "x",
            "--password-var",
            "APP_PASSWORD",
            "--salt-hex",
            salt_hex,
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["salt_hex"], salt_hex);
    assert!(parsed["value"].as_str().unwrap().starts_with("ENC("));
}

#[test]
fn test_password_encrypt_without_password_returns_exit_code_2() {
    propchain_cmd()
        .env_remove("APP_PASSWORD")
        .args(["encrypt", "x", "--password-var", "APP_PASSWORD"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("APP_PASSWORD"));
}
