//! CLI smoke tests for the hackmatch-server binary.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_hackmatch_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_hackmatch-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute hackmatch-server")
}

/// Write `body` below a `server` section whose home_dir lives in `dir`.
fn write_config(dir: &Path, name: &str, body: &str) -> String {
    let home = dir.join("home").to_string_lossy().replace('\\', "/");
    let content = format!(
        r#"
server:
  home_dir: "{home}"
  host: "127.0.0.1"
  port: 8087
{body}
"#
    );
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_hackmatch_server(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hackmatch-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_hackmatch_server(&["--version"]);
    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hackmatch-server"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_hackmatch_server(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report the bad subcommand: {stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    for flag in ["--config", "-c"] {
        let output = run_hackmatch_server(&[flag, "/nonexistent/config.yaml", "check"]);
        assert!(!output.status.success(), "Should fail with missing config");

        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("Config file not found"),
            "Should mention config file issue: {stderr}"
        );
    }
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_hackmatch_server(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to parse config file"),
        "Should mention YAML parsing issue: {stderr}"
    );
}

#[test]
fn test_cli_check_accepts_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "valid.yaml",
        r#"
logging:
  default:
    console_level: info
    file: "logs/hackmatch.log"
    file_level: info
    max_age_days: 28
    max_backups: 3
    max_size_mb: 100

modules:
  matching:
    min_photos: 2
    max_photos: 9
    candidate_order: "boosted_first"
"#,
    );

    let output = run_hackmatch_server(&["--config", &config_path, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "STDOUT: {stdout}\nSTDERR: {stderr}");
    assert!(stdout.contains("Configuration check passed"));
}

#[test]
fn test_cli_check_rejects_invalid_matching_section() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "matching.yaml",
        r#"
modules:
  matching:
    min_photos: 5
    max_photos: 3
"#,
    );

    let output = run_hackmatch_server(&["--config", &config_path, "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("matching"), "Should name the module: {stderr}");
}

#[test]
fn test_cli_check_rejects_bad_bind_address() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "ingress.yaml",
        r#"
modules:
  api_ingress:
    bind_addr: "not-an-address"
"#,
    );

    let output = run_hackmatch_server(&["--config", &config_path, "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid bind address"), "{stderr}");
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "print.yaml", "");

    let output = run_hackmatch_server(&[
        "--config",
        &config_path,
        "--port",
        "9191",
        "--print-config",
    ]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"), "{stdout}");
    assert!(stdout.contains("127.0.0.1:9191"), "ingress bind_addr follows --port: {stdout}");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_hackmatch_server(&["run", "--help"]);
    assert!(output.status.success(), "Run subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Start the server"));

    let output = run_hackmatch_server(&["check", "--help"]);
    assert!(output.status.success(), "Check subcommand help should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Check configuration"));
}

#[tokio::test]
async fn test_cli_run_keeps_serving_until_stopped() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "run.yaml",
        r#"
modules:
  api_ingress:
    bind_addr: "127.0.0.1:0"
"#,
    );

    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_hackmatch-server"));
    cmd.args(["--config", &config_path, "run"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // The server only exits on a signal, so a timeout means it came up
    match timeout(Duration::from_secs(3), cmd.output()).await {
        Err(_elapsed) => {}
        Ok(result) => {
            let output = result.expect("Failed to execute hackmatch-server");
            panic!(
                "server exited early: {}\nSTDERR: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
}
