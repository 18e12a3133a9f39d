#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the geo-server binary.

use std::process::{Command, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::time::timeout;

fn run_geo_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_geo-server"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute geo-server")
}

fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("geo-server.yaml");
    std::fs::write(&path, body).expect("Failed to write config");
    path.to_str().unwrap().to_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_geo_server(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    for needle in ["run", "check", "import", "--config", "--mock"] {
        assert!(stdout.contains(needle), "help should mention {needle}");
    }
}

#[test]
fn test_cli_version_command() {
    let output = run_geo_server(&["--version"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("geo-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_geo_server(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "unexpected stderr: {stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_geo_server(&["--config", "/nonexistent/geo.yaml", "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "stderr: {stderr}");
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "server: [unclosed");

    let output = run_geo_server(&["--config", &path, "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_config_validation_unknown_key() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "catalog:\n  page: 3\n");

    let output = run_geo_server(&["--config", &path, "check"]);
    assert!(!output.status.success(), "unknown keys must be rejected");
}

#[test]
fn test_cli_config_validation_inconsistent_page_sizes() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "catalog:\n  default_page_size: 50\n  max_page_size: 20\n",
    );

    let output = run_geo_server(&["--config", &path, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_page_size"), "stderr: {stderr}");
}

#[test]
fn test_cli_config_validation_valid_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "server:\n  bind_addr: \"127.0.0.1:0\"\ndatabase:\n  dsn: \"sqlite::memory:\"\ncatalog:\n  default_page_size: 20\n",
    );

    let output = run_geo_server(&["--config", &path, "check"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let output = run_geo_server(&["--mock", "--port", "18087", "-vv", "--print-config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let yaml = stdout
        .strip_prefix("Effective configuration:\n")
        .expect("print-config header");
    let parsed: serde_json::Value = serde_saphyr::from_str(yaml).expect("valid YAML");
    assert_eq!(parsed["server"]["bind_addr"], "127.0.0.1:18087");
    assert_eq!(parsed["database"]["dsn"], "sqlite::memory:");
    assert_eq!(parsed["logging"]["level"], "debug");
}

#[test]
fn test_cli_import_into_memory_database() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("countries.json");
    std::fs::write(
        &file,
        r#"[{"title":"Uzbekistan","code":"UZ"},{"title":"Kazakhstan","code":"KZ"}]"#,
    )
    .unwrap();

    let output = run_geo_server(&[
        "--mock",
        "import",
        "--table",
        "countries",
        file.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Imported 2 record(s)"));
}

#[test]
fn test_cli_import_rejects_unknown_table() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("x.json");
    std::fs::write(&file, "[]").unwrap();

    let output = run_geo_server(&[
        "--mock",
        "import",
        "--table",
        "rivers",
        file.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown table"));
}

#[tokio::test]
async fn test_cli_run_keeps_serving_until_killed() {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_geo-server"));
    cmd.args(["--mock", "--port", "0", "run"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let child = cmd.spawn().expect("spawn geo-server");

    let res = timeout(Duration::from_secs(3), child.wait_with_output()).await;
    assert!(res.is_err(), "server exited early: {res:?}");
}
