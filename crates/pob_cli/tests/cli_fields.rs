use std::fs;
use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn code_path() -> PathBuf {
    workspace_root().join("tests/fixtures/build_code.txt")
}

fn fixture_code() -> String {
    fs::read_to_string(code_path())
        .expect("fixture code should be readable")
        .trim()
        .to_string()
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pob-decode"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run pob-decode CLI")
}

#[test]
fn json_output_has_canonical_sections() {
    let code = fixture_code();
    let output = run_cli(&["--json", &code]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");

    assert_eq!(json["class"], "Witch");
    assert_eq!(json["main_skill"], "Raise Zombie");
    assert_eq!(json["item_errors"][0]["id"], 3);
    assert_eq!(json["config"]["enemy_level"], 84);
}

#[test]
fn file_source_matches_positional_code() {
    let path = code_path();
    let path = path.to_string_lossy().to_string();
    let from_file = run_cli(&["--json", "--file", &path]);
    let from_code = run_cli(&["--json", &fixture_code()]);

    assert!(from_file.status.success());
    assert_eq!(from_file.stdout, from_code.stdout);
}

#[test]
fn selected_fields_print_key_value_pairs() {
    let code = fixture_code();
    let output = run_cli(&["--build", "--main-skill", &code]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "class=Witch",
            "ascendancy=Necromancer",
            "level=92",
            "bandit=Alira",
            "main_skill=Raise Zombie",
        ]
    );
}

#[test]
fn selected_json_only_contains_requested_sections() {
    let code = fixture_code();
    let output = run_cli(&["--json", "--tree", "--stats", &code]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    let keys: Vec<&str> = json
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys, vec!["stats", "trees"]);
}

#[test]
fn default_output_is_the_summary() {
    let output = run_cli(&[&fixture_code()]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Witch (Necromancer), level 92"));
    assert!(stdout.contains("::: Passive Tree :::"));
}

#[test]
fn reencode_round_trips() {
    let first = run_cli(&["--reencode", &fixture_code()]);
    assert!(first.status.success());
    let reencoded = String::from_utf8_lossy(&first.stdout).trim().to_string();

    let a = run_cli(&["--json", &fixture_code()]);
    let b = run_cli(&["--json", &reencoded]);
    assert!(b.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn strict_config_fails_on_unknown_option() {
    let output = run_cli(&["--strict-config", &fixture_code()]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("someRetiredOption"));
}

#[test]
fn invalid_code_exits_with_one() {
    let output = run_cli(&["definitely not a build code"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error decoding build code"));
}

#[test]
fn missing_source_is_a_usage_error() {
    let output = run_cli(&["--json"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn conflicting_sources_are_a_usage_error() {
    let path = code_path();
    let path = path.to_string_lossy().to_string();
    let output = run_cli(&["--file", &path, &fixture_code()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn unsupported_paste_url_exits_with_one() {
    let output = run_cli(&["--url", "ftp://example.com/abc", "--timeout", "1"]);
    assert_eq!(output.status.code(), Some(1));
}
