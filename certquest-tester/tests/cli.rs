use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "certquest-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_certquest-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("persistence-roundtrip"));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_certquest-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--scenarios",
            "all",
            "--iterations",
            "1",
            "--seeds",
            "1,2",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CertQuest Automated Tester"));

    let report = std::fs::read_to_string(&output_path).expect("read report");
    let value: serde_json::Value = serde_json::from_str(&report).expect("json report");
    let results = value.as_array().expect("array of results");
    assert_eq!(results.len(), 10);
    assert!(results.iter().all(|r| r["passed"] == true));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_persists_runs_under_save_dir() {
    let exe = env!("CARGO_BIN_EXE_certquest-tester");
    let save_dir = temp_path("saves");
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "persistence-roundtrip",
            "--iterations",
            "1",
            "--seeds",
            "7",
            "--report",
            "markdown",
            "--save-dir",
        ])
        .arg(&save_dir)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("# CertQuest Logic Test Results"));
    let player = save_dir
        .join("persistence-roundtrip")
        .join("seed-7")
        .join("player.json");
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(player).expect("player doc")).expect("json");
    assert_eq!(doc["player_name"], "Persistence Runner");
    let _ = std::fs::remove_dir_all(save_dir);
}

#[test]
fn cli_rejects_unparseable_seeds() {
    let exe = env!("CARGO_BIN_EXE_certquest-tester");
    let output = Command::new(exe)
        .args(["--seeds", "abc", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid seed 'abc'"));
}
