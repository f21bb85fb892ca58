//! End-to-end tests for the bumpdeps CLI
//!
//! These tests verify:
//! - Exit codes for configuration and manifest errors
//! - Runs that need no index lookups leave files unchanged
//! - JSON output schema
//! - An unreachable index aborts without touching the manifest
//!
//! Nothing here talks to the real PyPI; lookups go to a closed local port.

use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DEAD_INDEX: &str = "http://127.0.0.1:9";

fn bumpdeps() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("bumpdeps"))
}

/// Create a temporary project containing `pyproject.toml`
fn create_project(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("pyproject.toml");
    fs::write(&path, content).expect("Failed to write pyproject.toml");
    (temp_dir, path)
}

/// Every entry is skipped before any lookup happens
const OFFLINE_MANIFEST: &str = r#"[project]
name = "demo"
dependencies = [
    "requests==2.0.0",  # bumpdeps: ignore
    "click",
    "local @ file:///tmp/local",
]
"#;

mod cli_surface {
    use super::*;

    #[test]
    fn test_help() {
        bumpdeps()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--replace-upper"))
            .stdout(predicate::str::contains("--dry-run"));
    }

    #[test]
    fn test_version() {
        bumpdeps()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_base_and_no_base_conflict() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        bumpdeps()
            .args(["--base", "--no-base", "-f"])
            .arg(&path)
            .assert()
            .failure()
            .code(2);
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn test_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        bumpdeps()
            .current_dir(temp_dir.path())
            .args(["--index-url", DEAD_INDEX])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("manifest file not found"));
    }

    #[test]
    fn test_missing_project_table() {
        let (_dir, path) = create_project("[tool.black]\nline-length = 88\n");
        bumpdeps()
            .arg("-f")
            .arg(&path)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("no [project] table"));
    }

    #[test]
    fn test_invalid_include_pattern() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        bumpdeps()
            .args(["-i", "foo("])
            .arg("-f")
            .arg(&path)
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("invalid include pattern"));
    }

    #[test]
    fn test_unknown_extra() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        bumpdeps()
            .arg("docs")
            .arg("-f")
            .arg(&path)
            .args(["--index-url", DEAD_INDEX])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("'docs' not found"));
        assert_eq!(fs::read_to_string(&path).unwrap(), OFFLINE_MANIFEST);
    }

    #[test]
    fn test_invalid_tool_settings() {
        let content = format!("{}\n[tool.bumpdeps]\nbogus = true\n", OFFLINE_MANIFEST);
        let (_dir, path) = create_project(&content);
        bumpdeps()
            .arg("-f")
            .arg(&path)
            .args(["--index-url", DEAD_INDEX])
            .assert()
            .failure()
            .code(2)
            .stderr(predicate::str::contains("[tool.bumpdeps]"));
    }

    #[test]
    fn test_invalid_index_url() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        bumpdeps()
            .arg("-f")
            .arg(&path)
            .args(["--index-url", "ftp://example.com/pypi"])
            .assert()
            .failure()
            .code(2);
    }
}

mod offline_runs {
    use super::*;

    #[test]
    fn test_nothing_to_update() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        bumpdeps()
            .arg("-f")
            .arg(&path)
            .args(["--index-url", DEAD_INDEX])
            .assert()
            .success()
            .stdout(predicate::str::contains("No updates required"));
        assert_eq!(fs::read_to_string(&path).unwrap(), OFFLINE_MANIFEST);
    }

    #[test]
    fn test_json_output_schema() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        let output = bumpdeps()
            .arg("-f")
            .arg(&path)
            .args(["--json", "--index-url", DEAD_INDEX])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("stdout is not valid JSON");
        assert_eq!(json["written"], false);
        assert_eq!(json["summary"]["updates"], 0);
        assert_eq!(json["summary"]["skips"], 3);
        assert_eq!(json["groups"][0]["group"], "dependencies");
        assert_eq!(json["groups"][0]["skips"][0]["reason"], "ignored");
    }

    #[test]
    fn test_quiet_json_omits_skips() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        let output = bumpdeps()
            .arg("-f")
            .arg(&path)
            .args(["--json", "-q", "--index-url", DEAD_INDEX])
            .output()
            .unwrap();
        assert!(output.status.success());

        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert!(json["groups"][0].get("skips").is_none());
    }

    #[test]
    fn test_no_base_with_no_groups() {
        let (_dir, path) = create_project(OFFLINE_MANIFEST);
        bumpdeps()
            .arg("-n")
            .arg("-f")
            .arg(&path)
            .args(["--index-url", DEAD_INDEX])
            .assert()
            .success()
            .stdout(predicate::str::contains("No updates required"));
    }
}

mod unreachable_index {
    use super::*;

    #[test]
    fn test_unreachable_index_is_fatal() {
        let content = "[project]\ndependencies = [\"foo==1.0\"]\n";
        let (_dir, path) = create_project(content);
        bumpdeps()
            .arg("-f")
            .arg(&path)
            .args(["--index-url", DEAD_INDEX])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("unreachable"));
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }
}
