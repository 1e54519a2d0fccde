//! End-to-end runs of the shardfold binary

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn shardfold(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shardfold"))
        .args(args)
        .current_dir(cwd)
        .env_remove("SHARDFOLD_LOG")
        .env_remove("SHARDFOLD_WORKER_ID")
        .output()
        .unwrap()
}

fn write_fixture(root: &Path, relative: &str, tests: &[(&str, &str)]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let body: serde_json::Map<String, serde_json::Value> = tests
        .iter()
        .map(|(id, hash)| (id.to_string(), serde_json::json!({"_info": {"hash": hash}})))
        .collect();
    fs::write(path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_hash_root_only_prints_single_line() {
    let temp_dir = TempDir::new().unwrap();
    let fixtures = temp_dir.path().join("fixtures");
    write_fixture(&fixtures, "state_tests/a.json", &[("t1", "0x01")]);

    let output = shardfold(&["hash", "fixtures", "--root"], temp_dir.path());
    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("0x"));
    assert_eq!(lines[0].len(), 66);
}

#[test]
fn test_bare_folder_runs_hash() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(&temp_dir.path().join("fixtures"), "a.json", &[("t1", "0x01")]);

    let explicit = shardfold(&["hash", "fixtures", "--root"], temp_dir.path());
    let implicit = shardfold(&["fixtures", "--root"], temp_dir.path());
    assert!(implicit.status.success());
    assert_eq!(stdout(&implicit), stdout(&explicit));
}

#[test]
fn test_empty_collect_then_merge_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("empty.jsonl"), "").unwrap();

    let collected = shardfold(&["collect", "out", "--worker", "gw0", "-i", "empty.jsonl"], root);
    assert!(collected.status.success());
    let merged = shardfold(&["merge", "out"], root);
    assert_eq!(merged.status.code(), Some(0));
    assert!(stdout(&merged).contains("Indexed 0 tests"));
}

#[test]
fn test_hash_file_granularity_omits_tests() {
    let temp_dir = TempDir::new().unwrap();
    let fixtures = temp_dir.path().join("fixtures");
    write_fixture(&fixtures, "state_tests/a.json", &[("t1", "0x01"), ("t2", "0x02")]);

    let output = shardfold(&["hash", "fixtures", "-g", "file"], temp_dir.path());
    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("fixtures: 0x"));
    assert!(lines[1].starts_with(" state_tests: 0x"));
    assert!(lines[2].starts_with("  a.json: 0x"));
}

#[test]
fn test_compare_exit_codes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fixture(&root.join("left"), "s/a.json", &[("t1", "0x01"), ("t2", "0x02")]);
    write_fixture(&root.join("same"), "s/a.json", &[("t1", "0x01"), ("t2", "0x02")]);
    write_fixture(&root.join("right"), "s/a.json", &[("t1", "0x01"), ("t2", "0x03")]);

    let equal = shardfold(&["compare", "left", "same"], root);
    assert_eq!(equal.status.code(), Some(0));
    assert!(stdout(&equal).is_empty());

    let differ = shardfold(&["compare", "left", "right", "--tests"], root);
    assert_eq!(differ.status.code(), Some(1));
    let text = stdout(&differ);
    assert!(text.contains("── Hash Differences ──"));
    assert!(text.contains("s/a.json/t2"));
    assert!(text.contains("- 0x02"));
    assert!(text.contains("+ 0x03"));
    assert!(!text.contains("t1"));

    let root_only = shardfold(&["compare", "left", "right", "-r"], root);
    assert_eq!(root_only.status.code(), Some(1));
    assert!(stdout(&root_only).contains("\n  /\n"));
}

#[test]
fn test_malformed_fixture_exits_2() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_fixture(&root.join("left"), "a.json", &[("t1", "0x01")]);
    fs::create_dir_all(root.join("bad")).unwrap();
    fs::write(root.join("bad/a.json"), r#"{"t1": {"_info": {"hash": "0xnothex"}}}"#).unwrap();

    let output = shardfold(&["compare", "left", "bad"], root);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("t1"));
}

#[test]
fn test_merge_without_partials_exits_4() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("out")).unwrap();
    let output = shardfold(&["merge", "out"], temp_dir.path());
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_collect_merge_hash_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (worker, lines) in [
        ("gw0", vec![r#"{"id": "t2", "path": "st/a.json", "document": {"_info": {"hash": "0x02"}}, "hash": "0x02"}"#]),
        ("gw1", vec![r#"{"id": "t1", "path": "st/a.json", "document": {"_info": {"hash": "0x01"}}, "hash": "0x01"}"#]),
    ] {
        let mut child = Command::new(env!("CARGO_BIN_EXE_shardfold"))
            .args(["collect", "out", "--worker", worker])
            .current_dir(root)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let mut stdin = child.stdin.take().unwrap();
        for line in lines {
            writeln!(stdin, "{}", line).unwrap();
        }
        drop(stdin);
        assert!(child.wait().unwrap().success());
    }

    let merged = shardfold(&["merge", "out"], root);
    assert!(merged.status.success(), "{}", String::from_utf8_lossy(&merged.stderr));
    assert_eq!(
        fs::read_to_string(root.join("out/st/a.json")).unwrap(),
        "{\n    \"t1\": {\n        \"_info\": {\n            \"hash\": \"0x01\"\n        }\n    },\n    \"t2\": {\n        \"_info\": {\n            \"hash\": \"0x02\"\n        }\n    }\n}"
    );

    let hashed = shardfold(&["hash", "out", "--root"], root);
    let index: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(root.join("out/.meta/index.json")).unwrap()).unwrap();
    assert_eq!(stdout(&hashed).trim(), index["root_hash"].as_str().unwrap());
}
