//! CLI smoke tests for the sailbow-server binary.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_sailbow_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_sailbow-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute sailbow-server")
}

/// Writes a config whose home dir (logs, sqlite files) lives inside `dir`.
fn write_config(dir: &Path, name: &str, body: &str) -> String {
    let home = dir.join("home");
    let content = format!(
        "server:\n  home_dir: \"{}\"\n  port: 0\n{body}",
        home.to_string_lossy().replace('\\', "/")
    );
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

const LOGGING: &str = r#"
logging:
  default:
    console_level: error
    file: "logs/sailbow.log"
    file_level: info
"#;

#[test]
fn test_cli_help_command() {
    let output = run_sailbow_server(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--mock"));
}

#[test]
fn test_cli_version_command() {
    let output = run_sailbow_server(&["--version"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sailbow-server"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_sailbow_server(&["invalid-command"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "stderr: {stderr}");
}

#[test]
fn test_cli_missing_config_file() {
    let output = run_sailbow_server(&["-c", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "stderr: {stderr}");
}

#[test]
fn test_cli_invalid_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed").unwrap();

    let output = run_sailbow_server(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Failed to extract config"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_cli_check_valid_config() {
    let temp_dir = TempDir::new().unwrap();
    let body = format!(
        "database:\n  url: \"sqlite://db/sailbow.db?mode=rwc\"\n{LOGGING}\nmodules:\n  boats:\n    max_name_length: 80\n    app_base_url: \"https://sailbow.example\"\n"
    );
    let config = write_config(temp_dir.path(), "valid.yaml", &body);

    let output = run_sailbow_server(&["--config", &config, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stdout: {stdout}\nstderr: {stderr}");
    assert!(stdout.contains("Configuration check passed"));
}

#[test]
fn test_cli_check_rejects_unknown_boats_setting() {
    let temp_dir = TempDir::new().unwrap();
    let body = format!("{LOGGING}\nmodules:\n  boats:\n    max_trip_count: 3\n");
    let config = write_config(temp_dir.path(), "unknown.yaml", &body);

    let output = run_sailbow_server(&["--config", &config, "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("boats"), "stderr: {stderr}");
}

#[test]
fn test_cli_check_rejects_unsupported_database() {
    let temp_dir = TempDir::new().unwrap();
    let body = format!("database:\n  url: \"mysql://localhost/sailbow\"\n{LOGGING}");
    let config = write_config(temp_dir.path(), "mysql.yaml", &body);

    let output = run_sailbow_server(&["--config", &config, "check"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported database type"), "stderr: {stderr}");
}

#[test]
fn test_cli_print_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path(), "print.yaml", LOGGING);

    let output = run_sailbow_server(&["--config", &config, "--port", "9191", "--print-config"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9191"), "stdout: {stdout}");
}

#[tokio::test]
async fn test_cli_run_with_mock_database() {
    let temp_dir = TempDir::new().unwrap();
    let body = format!("database:\n  url: \"postgresql://localhost/nonexistent\"\n{LOGGING}");
    let config = write_config(temp_dir.path(), "run.yaml", &body);

    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_sailbow-server"));
    cmd.args(["--config", &config, "--mock", "run"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Still running when the timeout fires means startup succeeded.
    match timeout(Duration::from_secs(5), cmd.output()).await {
        Err(_elapsed) => {}
        Ok(Ok(output)) => panic!(
            "server exited early: {}\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        ),
        Ok(Err(e)) => panic!("failed to spawn server: {e}"),
    }
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_sailbow_server(&["run", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Start the server"));

    let output = run_sailbow_server(&["check", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Check configuration"));
}
