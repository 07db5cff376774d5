//! CLI Integration Tests
//!
//! Run the `conlog` binary with scripted stdin and check what reaches stdout.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Create a CLI command isolated from the user's config and environment
fn cli_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("conlog").expect("Failed to find conlog binary");
    cmd.env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("CONLOG_LEVEL")
        .env_remove("CONLOG_PROMPT")
        .env_remove("CONLOG_TITLE")
        .env_remove("CONLOG_COLOR")
        .env_remove("CONLOG_RESOURCE_DIR")
        .env_remove("CONLOG_CLOSE_ON_SIGNAL");
    cmd
}

/// A console session with a short drain tick
fn session(home: &TempDir) -> Command {
    let mut cmd = cli_cmd(home);
    cmd.args(["--tick-ms", "5"]);
    cmd
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_echo_then_quit() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .write_stdin("echo hello world\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ Debug ]"))
        .stdout(predicate::str::contains("Shell"))
        .stdout(predicate::str::contains("(conlog)"))
        .stdout(predicate::str::contains("]: hello world\n"))
        .stdout(predicate::str::contains("]: Closing console"));
}

#[test]
fn test_exits_at_end_of_input() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .write_stdin("echo last words\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("last words"));
}

#[test]
fn test_console_title_written_once() {
    let home = TempDir::new().unwrap();

    session(&home)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\x1b]0;Debug Console\x07"));
}

#[test]
fn test_unknown_commands_ignored() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .write_stdin("frobnicate now\n\n   \necho still here\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("frobnicate").not())
        .stdout(predicate::str::contains("still here"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .write_stdin("help\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Commands: b64, bytes, cat, echo, help, level, ls, quit, spawn",
        ));
}

// ============================================================================
// Level Tests
// ============================================================================

#[test]
fn test_level_flag_filters_records() {
    let home = TempDir::new().unwrap();

    session(&home)
        .args(["--no-title", "--level", "warning"])
        .write_stdin("echo hidden text\nbytes\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden text").not())
        .stdout(predicate::str::contains("[Warning]"))
        .stdout(predicate::str::contains("Usage: bytes <count>"));
}

#[test]
fn test_level_command_changes_filter() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .write_stdin("level error\necho hidden text\nlevel\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ Error ]"))
        .stdout(predicate::str::contains("Minimum level set to error"))
        .stdout(predicate::str::contains("hidden text").not());
}

#[test]
fn test_level_from_environment() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .env("CONLOG_LEVEL", "error")
        .write_stdin("echo hidden text\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden text").not());
}

#[test]
fn test_invalid_level_environment() {
    let home = TempDir::new().unwrap();

    session(&home)
        .env("CONLOG_LEVEL", "shouty")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid CONLOG_* environment variable"))
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_invalid_level_flag() {
    let home = TempDir::new().unwrap();

    cli_cmd(&home)
        .args(["--level", "shouty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level"));
}

#[test]
fn test_zero_tick_rejected() {
    let home = TempDir::new().unwrap();

    cli_cmd(&home)
        .args(["--tick-ms", "0"])
        .assert()
        .failure();
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_file_prompt() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("custom.json");
    std::fs::write(&config, r#"{ "prompt": "dbg$ ", "console_title": null }"#).unwrap();

    session(&home)
        .arg("--config")
        .arg(&config)
        .write_stdin("echo hi\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("]: hi\ndbg$ "));
}

#[test]
fn test_default_config_in_home() {
    let home = TempDir::new().unwrap();
    std::fs::create_dir_all(home.path().join(".conlog")).unwrap();
    std::fs::write(
        home.path().join(".conlog").join("config.json"),
        r#"{ "min_level": "error", "console_title": null }"#,
    )
    .unwrap();

    session(&home)
        .write_stdin("echo hidden text\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("hidden text").not());
}

#[test]
fn test_malformed_config_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("broken.json");
    std::fs::write(&config, "{ not json").unwrap();

    session(&home)
        .arg("-c")
        .arg(&config)
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

// ============================================================================
// Command Tests
// ============================================================================

#[test]
fn test_cat_and_ls_resources() {
    let home = TempDir::new().unwrap();
    let assets = TempDir::new().unwrap();
    std::fs::write(assets.path().join("motd.txt"), "Welcome aboard\n").unwrap();

    session(&home)
        .arg("--no-title")
        .arg("--resource-dir")
        .arg(assets.path())
        .write_stdin("cat motd.txt\nls\ncat missing.txt\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("]: Welcome aboard"))
        .stdout(predicate::str::contains("]: motd.txt"))
        .stdout(predicate::str::contains("missing.txt not found"));
}

#[test]
fn test_spawn_widens_column() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .write_stdin("spawn PhysicsWorldStepper solver\necho aligned\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("PhysicsWorldStepper (solver)"))
        // "Shell" padded to the 19-character column
        .stdout(predicate::str::contains("Shell               (conlog)"));
}

#[test]
fn test_b64_and_bytes() {
    let home = TempDir::new().unwrap();

    session(&home)
        .arg("--no-title")
        .write_stdin("b64 aGVsbG8=\nbytes 1536\nb64 @@@\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("]: hello"))
        .stdout(predicate::str::contains("1536 bytes is 1.50 KB"))
        .stdout(predicate::str::contains("Base64 decode error"));
}
