use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn tasklist(dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tasklist"));
    command
        .env("TASKLIST_STORE_PATH", dir.path().join("storage.json"))
        .env("TASKLIST_CONFIG_PATH", dir.path().join("config.json"))
        .env("TASKLIST_DISABLE_NOTIFICATIONS", "1");
    command
}

fn run_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = tasklist(dir)
        .arg("--json")
        .args(args)
        .output()
        .expect("failed to run tasklist");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn stored_tasks(dir: &TempDir) -> serde_json::Value {
    let content = std::fs::read_to_string(dir.path().join("storage.json")).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&content).unwrap();
    serde_json::from_str(entries["tasks"].as_str().unwrap()).unwrap()
}

#[test]
fn add_persists_task_under_board_key() {
    let dir = TempDir::new().unwrap();

    let task = run_json(
        &dir,
        &["board", "add", "  Buy milk  ", "--priority", "HIGH", "--deadline", "2024-02-01"],
    );

    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["completed"], false);
    assert_eq!(task["deadline"], "2024-02-01");

    let stored = stored_tasks(&dir);
    assert_eq!(stored.as_array().unwrap().len(), 1);
    assert_eq!(stored[0]["id"], task["id"]);
}

#[test]
fn add_without_title_fails_and_writes_nothing() {
    let dir = TempDir::new().unwrap();

    let output = tasklist(&dir)
        .args(["board", "add", "   "])
        .output()
        .expect("failed to run add");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - title is required"));
    assert!(!dir.path().join("storage.json").exists());
}

#[test]
fn add_rejects_unknown_priority() {
    let dir = TempDir::new().unwrap();

    let output = tasklist(&dir)
        .args(["board", "add", "Buy milk", "--priority", "urgent"])
        .output()
        .expect("failed to run add");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("priority must be"));
}

#[test]
fn toggle_flips_completion_and_updates_stats() {
    let dir = TempDir::new().unwrap();
    let first = run_json(&dir, &["board", "add", "Buy milk"]);
    run_json(&dir, &["board", "add", "Walk dog"]);

    let toggled = run_json(&dir, &["board", "toggle", first["id"].as_str().unwrap()]);
    assert_eq!(toggled["completed"], true);

    let stats = run_json(&dir, &["board", "stats"]);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["active"], 1);

    let undone = run_json(&dir, &["board", "toggle", first["id"].as_str().unwrap()]);
    assert_eq!(undone["completed"], false);
}

#[test]
fn list_filters_and_searches_in_insertion_order() {
    let dir = TempDir::new().unwrap();
    let milk = run_json(&dir, &["board", "add", "Buy milk"]);
    run_json(&dir, &["board", "add", "Buy bread"]);
    run_json(&dir, &["board", "add", "Walk dog"]);
    run_json(&dir, &["board", "toggle", milk["id"].as_str().unwrap()]);

    let active = run_json(&dir, &["board", "list", "--filter", "active"]);
    let titles: Vec<&str> = active["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Buy bread", "Walk dog"]);

    let searched = run_json(&dir, &["board", "list", "--search", "BUY"]);
    let titles: Vec<&str> = searched["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Buy milk", "Buy bread"]);
    assert_eq!(searched["stats"]["total"], 3);
}

#[test]
fn plain_list_renders_table_and_counts() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["board", "add", "Buy milk", "--priority", "low"]);

    let output = tasklist(&dir)
        .args(["board", "list"])
        .output()
        .expect("failed to list");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Buy milk"));
    assert!(stdout.contains("low"));
    assert!(stdout.contains("Total: 1 | Active: 1 | Completed: 0"));
}

#[test]
fn edit_can_drop_the_deadline() {
    let dir = TempDir::new().unwrap();
    let task = run_json(&dir, &["board", "add", "Buy milk", "--deadline", "2024-02-01"]);
    let id = task["id"].as_str().unwrap();

    let edited = run_json(
        &dir,
        &["board", "edit", id, "--title", "Buy oat milk", "--no-deadline"],
    );

    assert_eq!(edited["title"], "Buy oat milk");
    assert_eq!(edited["deadline"], serde_json::Value::Null);
    assert_eq!(edited["id"], task["id"]);
}

#[test]
fn edit_unknown_task_reports_not_found() {
    let dir = TempDir::new().unwrap();

    let output = tasklist(&dir)
        .args(["board", "edit", "task-missing", "--title", "x"])
        .output()
        .expect("failed to edit");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found - task task-missing not found"));
}

#[test]
fn deleting_missing_task_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["board", "add", "Buy milk"]);

    let output = tasklist(&dir)
        .args(["board", "delete", "task-missing"])
        .output()
        .expect("failed to delete");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("nothing deleted"));
    assert_eq!(stored_tasks(&dir).as_array().unwrap().len(), 1);
}

#[test]
fn delete_removes_task() {
    let dir = TempDir::new().unwrap();
    let task = run_json(&dir, &["board", "add", "Buy milk"]);

    let deleted = run_json(&dir, &["board", "delete", task["id"].as_str().unwrap()]);

    assert_eq!(deleted["deleted"]["id"], task["id"]);
    assert!(stored_tasks(&dir).as_array().unwrap().is_empty());
}

#[test]
fn clear_asks_for_confirmation() {
    let dir = TempDir::new().unwrap();
    run_json(&dir, &["board", "add", "Buy milk"]);

    let mut child = tasklist(&dir)
        .args(["board", "clear"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn clear");
    child
        .stdin
        .as_mut()
        .expect("stdin")
        .write_all(b"n\n")
        .expect("failed to answer prompt");
    let output: Output = child.wait_with_output().expect("failed to wait");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Clear cancelled."));
    assert_eq!(stored_tasks(&dir).as_array().unwrap().len(), 1);

    let cleared = run_json(&dir, &["board", "clear", "--yes"]);
    assert_eq!(cleared["cleared"], 1);
    assert!(stored_tasks(&dir).as_array().unwrap().is_empty());
}

#[test]
fn json_clear_requires_yes() {
    let dir = TempDir::new().unwrap();

    let output = tasklist(&dir)
        .args(["--json", "board", "clear"])
        .output()
        .expect("failed to clear");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("needs --yes"));
}

#[test]
fn malformed_board_data_loads_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("storage.json"),
        r#"{ "tasks": "[{\"id\": 1}]" }"#,
    )
    .unwrap();

    let listed = run_json(&dir, &["board", "list"]);

    assert!(listed["tasks"].as_array().unwrap().is_empty());
    assert_eq!(listed["stats"]["total"], 0);
}
