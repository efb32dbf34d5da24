//! CLI integration tests
//!
//! Tests for the command-line interface using assert_cmd.
//!
//! These tests verify:
//! - Help and version flags
//! - Configuration validation and output formats
//! - Single-cycle mode
//! - Error handling for invalid configuration

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Get a command for the rsolr-exporter binary
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin("rsolr-exporter").expect("Failed to find rsolr-exporter binary")
}

/// Helper to create a temporary config file with given content
fn create_temp_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file.flush().expect("Failed to flush");
    file
}

/// A port nothing listens on
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    listener.local_addr().expect("No local address").port()
}

#[test]
fn test_help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--instance"))
        .stdout(predicate::str::contains("--stats"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that a valid configuration is accepted via --validate flag
#[test]
fn test_validate_valid_config() {
    let config = r#"
solr:
  context: "solr"
  instances:
    - "web1@solr1:8983"
    - "solr2"
  stats: [response, cache, jvm]
  timeout_ms: 2000

collector:
  interval_secs: 30

server:
  port: 19231
  path: "/metrics"
"#;

    let file = create_temp_config(config);

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("instance: web1@solr1:8983"))
        .stdout(predicate::str::contains("stats: response, cache, jvm"));
}

#[test]
fn test_validate_json_output() {
    let config = r#"
solr:
  host: "search.internal"
  core: "products"
"#;

    let file = create_temp_config(config);

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .arg("--output-format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"host\": \"search.internal\""))
        .stdout(predicate::str::contains("\"core\": \"products\""));
}

#[test]
fn test_validate_missing_file_fails() {
    cmd()
        .arg("-c")
        .arg("/nonexistent/path/config.yaml")
        .arg("--validate")
        .assert()
        .failure();
}

#[test]
fn test_invalid_yaml_rejected() {
    let config = r#"
solr:
  instances: [not valid yaml
"#;

    let file = create_temp_config(config);

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .failure();
}

#[test]
fn test_invalid_instance_descriptor_rejected() {
    let config = r#"
solr:
  instances:
    - "web1@solr1:notaport"
"#;

    let file = create_temp_config(config);

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("notaport"));
}

#[test]
fn test_invalid_port_zero() {
    let config = r#"
server:
  port: 0
"#;

    let file = create_temp_config(config);

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--validate")
        .assert()
        .failure();
}

#[test]
fn test_unknown_stat_category_rejected() {
    cmd()
        .arg("--stats")
        .arg("response,disk")
        .arg("--validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("disk"));
}

/// CLI flags override the config file
#[test]
fn test_cli_overrides_config() {
    let config = r#"
solr:
  host: "from-file"
"#;

    let file = create_temp_config(config);

    cmd()
        .arg("-c")
        .arg(file.path())
        .arg("--solr-host")
        .arg("from-cli")
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("instance: from-cli:8983"));
}

/// One cycle against an unreachable instance prints nothing and exits cleanly
#[test]
fn test_once_unreachable_instance() {
    cmd()
        .arg("-c")
        .arg("/nonexistent/path/config.yaml")
        .arg("--instance")
        .arg(format!("down@127.0.0.1:{}", closed_port()))
        .arg("--timeout")
        .arg("500")
        .arg("--once")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_once_conflicts_with_validate() {
    cmd().arg("--once").arg("--validate").assert().failure();
}
