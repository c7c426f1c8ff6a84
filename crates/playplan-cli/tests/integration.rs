#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE: &str = r#"{
  "suiteName": "Sample plan",
  "source": {"repo": "r", "path": "p"},
  "tests": [{
    "name": "navigates to settings from home",
    "startUrl": "/",
    "steps": [
      {"action": "click", "target": "nav.link.settings"},
      {"action": "expectUrl", "value": "/settings"},
      {"action": "expectText", "target": "header.text.page-heading", "value": "Settings"}
    ]
  }]
}"#;

fn workspace() -> TempDir {
    tempfile::Builder::new().prefix("playplan").tempdir().unwrap()
}

fn generate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("generate-tests").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PLAYPLAN_TESTS_DIR")
        .env_remove("PLAYPLAN_SUMMARY_DIR");
    cmd
}

fn write(dir: &TempDir, rel: &str, content: &str) {
    let path = dir.path().join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn summary_files(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path().join("summaries"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// success path
// ---------------------------------------------------------------------------

#[test]
fn generates_spec_and_summary() {
    let dir = workspace();
    write(&dir, "plans/sample.json", SAMPLE);

    generate(&dir)
        .args(["plans/sample.json", "--tests-dir", "tests", "--summary-dir", "summaries"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Generated tests/sample-plan.spec.ts from plans/sample.json",
        ));

    let spec = std::fs::read_to_string(dir.path().join("tests/sample-plan.spec.ts")).unwrap();
    assert!(spec.contains("test.describe(\"Sample plan\""));
    assert!(spec.contains("await expect(page).toHaveURL(/\\/settings/);"));

    let names = summary_files(&dir);
    assert_eq!(names.len(), 2);
    assert!(names[0].ends_with("Z-summary.json"));
    assert!(names[1].ends_with("Z-summary.md"));
    assert!(!names[0].contains(':'));

    let md = std::fs::read_to_string(dir.path().join("summaries").join(&names[1])).unwrap();
    assert!(md.contains("## Required test hooks"));
    assert!(md.contains("- `header.text.page-heading`"));
}

#[test]
fn glob_input_expands() {
    let dir = workspace();
    write(&dir, "plans/a.json", &SAMPLE.replace("Sample plan", "Alpha"));
    write(&dir, "plans/b.json", &SAMPLE.replace("Sample plan", "Beta"));
    write(&dir, "plans/.draft.json", SAMPLE);

    generate(&dir)
        .args(["plans/*.json", "--tests-dir", "tests", "--summary-dir", "summaries"])
        .assert()
        .success();

    assert!(dir.path().join("tests/alpha.spec.ts").exists());
    assert!(dir.path().join("tests/beta.spec.ts").exists());
    assert!(!dir.path().join("tests/sample-plan.spec.ts").exists());
}

#[test]
fn json_flag_prints_only_summary_on_stdout() {
    let dir = workspace();
    write(&dir, "plans/sample.json", SAMPLE);

    let assert = generate(&dir)
        .args([
            "plans/sample.json",
            "--tests-dir",
            "tests",
            "--summary-dir",
            "summaries",
            "--json",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("Generated tests/sample-plan.spec.ts"));

    let stdout = &assert.get_output().stdout;
    let summary: serde_json::Value = serde_json::from_slice(stdout).unwrap();
    assert!(summary["runDate"].is_string());
    assert_eq!(summary["entries"][0]["input"], "r/p");
    assert_eq!(
        summary["entries"][0]["tests"][0]["requiredTestHooks"][0],
        "nav.link.settings"
    );
}

#[test]
fn env_and_config_supply_dirs() {
    let dir = workspace();
    write(&dir, "plans/sample.json", SAMPLE);
    write(&dir, "playplan.yaml", "summary_dir: from-config\nextension: test.ts\n");

    generate(&dir)
        .env("PLAYPLAN_TESTS_DIR", "from-env")
        .arg("plans/sample.json")
        .assert()
        .success();

    assert!(dir.path().join("from-env/sample-plan.test.ts").exists());
    assert!(dir.path().join("from-config").is_dir());
}

#[test]
fn help_exits_zero() {
    let dir = workspace();
    generate(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--tests-dir"));
    generate(&dir).arg("-h").assert().success();
}

// ---------------------------------------------------------------------------
// usage errors
// ---------------------------------------------------------------------------

#[test]
fn missing_flag_exits_one() {
    let dir = workspace();
    write(&dir, "plans/sample.json", SAMPLE);
    generate(&dir)
        .args(["plans/sample.json", "--tests-dir", "tests"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--summary-dir"))
        .stderr(predicate::str::contains("Usage"));
    assert!(!dir.path().join("tests").exists());
}

#[test]
fn unknown_flag_exits_one() {
    let dir = workspace();
    generate(&dir)
        .args(["a.json", "--bogus"])
        .assert()
        .code(1);
}

#[test]
fn no_inputs_exits_one() {
    let dir = workspace();
    generate(&dir)
        .args(["--tests-dir", "t", "--summary-dir", "s"])
        .assert()
        .code(1);
}

#[test]
fn glob_matching_nothing_warns_then_usage_error() {
    let dir = workspace();
    generate(&dir)
        .args(["plans/*.json", "--tests-dir", "t", "--summary-dir", "s"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("matched no files").count(1))
        .stderr(predicate::str::contains("no input files resolved"));
}

// ---------------------------------------------------------------------------
// input and content errors
// ---------------------------------------------------------------------------

#[test]
fn recursive_glob_rejected() {
    let dir = workspace();
    generate(&dir)
        .args(["plans/**/*.json", "--tests-dir", "t", "--summary-dir", "s"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("recursive"));
}

#[test]
fn missing_files_listed_together() {
    let dir = workspace();
    generate(&dir)
        .args(["one.json", "two.json", "--tests-dir", "t", "--summary-dir", "s"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("one.json"))
        .stderr(predicate::str::contains("two.json"));
}

#[test]
fn hidden_input_rejected() {
    let dir = workspace();
    write(&dir, ".plans/a.json", SAMPLE);
    generate(&dir)
        .args([".plans/a.json", "--tests-dir", "t", "--summary-dir", "s"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hidden paths are not allowed"));
}

#[test]
fn unsupported_action_fails() {
    let dir = workspace();
    write(
        &dir,
        "plans/bad.json",
        &SAMPLE.replace("\"action\": \"click\"", "\"action\": \"nope\""),
    );
    generate(&dir)
        .args(["plans/bad.json", "--tests-dir", "t", "--summary-dir", "s"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported step action: nope"))
        .stderr(predicate::str::contains("plans/bad.json"));
}

#[test]
fn malformed_json_fails() {
    let dir = workspace();
    write(&dir, "plans/bad.json", "{");
    generate(&dir)
        .args(["plans/bad.json", "--tests-dir", "t", "--summary-dir", "s"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid JSON in plans/bad.json"));
}
