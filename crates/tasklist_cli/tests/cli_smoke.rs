use std::process::Command;
use tempfile::TempDir;

fn tasklist(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tasklist"));
    command
        .env("TASKLIST_STORE_PATH", dir.path().join("storage.json"))
        .env("TASKLIST_CONFIG_PATH", dir.path().join("config.json"))
        .env("TASKLIST_DISABLE_NOTIFICATIONS", "1");
    command
}

#[test]
fn help_lists_both_boards() {
    let dir = TempDir::new().unwrap();
    let output = tasklist(&dir)
        .arg("--help")
        .output()
        .expect("failed to run tasklist --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("board"));
    assert!(stdout.contains("planner"));
    assert!(stdout.contains("theme"));
}

#[test]
fn unknown_command_reports_invalid_input() {
    let dir = TempDir::new().unwrap();
    let output = tasklist(&dir)
        .arg("frobnicate")
        .output()
        .expect("failed to run tasklist");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: invalid_input - "));
}

#[test]
fn bad_config_override_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = tasklist(&dir)
        .args(["--config-override", "colour=red", "board", "list"])
        .output()
        .expect("failed to run tasklist");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - unknown config field 'colour'"));
}

#[test]
fn config_override_can_redirect_storage() {
    let dir = TempDir::new().unwrap();
    let other = dir.path().join("other.json");
    let output = Command::new(env!("CARGO_BIN_EXE_tasklist"))
        .env_remove("TASKLIST_STORE_PATH")
        .env("TASKLIST_CONFIG_PATH", dir.path().join("config.json"))
        .env("TASKLIST_DISABLE_NOTIFICATIONS", "1")
        .arg("--config-override")
        .arg(format!("store_path={}", other.display()))
        .args(["board", "add", "Buy milk"])
        .output()
        .expect("failed to run tasklist");

    assert!(output.status.success());
    assert!(other.exists());
}

#[test]
fn unreadable_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

    let output = tasklist(&dir)
        .args(["board", "list"])
        .output()
        .expect("failed to run tasklist");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No tasks found."));
}

#[test]
fn config_default_filter_applies_to_lists() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "default_filter": "completed" }"#,
    )
    .unwrap();

    let add = tasklist(&dir)
        .args(["--json", "board", "add", "Buy milk"])
        .output()
        .expect("failed to add");
    assert!(add.status.success());

    let output = tasklist(&dir)
        .args(["--json", "board", "list"])
        .output()
        .expect("failed to list");

    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed["tasks"].as_array().unwrap().len(), 0);
    assert_eq!(listed["stats"]["total"], 1);
}
