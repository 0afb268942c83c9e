use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"apiVersion: v1
kind: LoomConfig
global:
  vars:
    REGISTRY: ghcr.io/acme
"#;

const PIPELINE: &str = r#"apiVersion: v1
kind: LoomPipeline
pipeline:
  name: ci
  stages:
    - name: build
      job: build
    - name: test
      job: test
  jobs:
    build:
      path: ${REGISTRY}/rust:1.79
      command: build
    test:
      path: ${REGISTRY}/rust:1.79
      command: test
"#;

const BROKEN_PIPELINE: &str = r#"apiVersion: v1
kind: LoomPipeline
pipeline:
  stages:
    - name: deploy
      job: ship
  jobs:
    build:
      path: alpine:3
      command: build
"#;

fn loom_actions(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("loom-actions"));
    cmd.current_dir(dir)
        .env_remove("LOOM_ACTIONS_DEFAULT_RUNNER")
        .env_remove("LOOM_ACTIONS_TRIGGER_BRANCHES")
        .env_remove("LOOM_ACTIONS_SORT_KEYS")
        .env_remove("LOOM_ACTIONS_FETCH_TIMEOUT")
        .env_remove("LOOM_ACTIONS_TOKEN")
        .env_remove("RUST_LOG")
        .env_remove("LOG_LEVEL");
    cmd
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.yaml"), CONFIG).unwrap();
    fs::write(dir.path().join("pipeline.yaml"), PIPELINE).unwrap();
    fs::write(dir.path().join("broken.yaml"), BROKEN_PIPELINE).unwrap();
    dir
}

fn parse(text: &[u8]) -> serde_yaml::Value {
    serde_yaml::from_slice(text).expect("output should be YAML")
}

#[test]
fn test_generate_writes_workflow_to_stdout() {
    let dir = workspace();
    let output = loom_actions(dir.path())
        .args(["generate", "config.yaml", "pipeline.yaml"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let workflow = parse(&output.stdout);
    assert_eq!(workflow["name"].as_str(), Some("ci"));
    assert_eq!(workflow["env"]["REGISTRY"].as_str(), Some("ghcr.io/acme"));
    assert_eq!(
        workflow["jobs"]["test"]["container"]["image"].as_str(),
        Some("ghcr.io/acme/rust:1.79")
    );
    assert_eq!(workflow["jobs"]["test"]["needs"][0].as_str(), Some("build"));
}

#[test]
fn test_generate_to_output_file_creates_parents() {
    let dir = workspace();
    loom_actions(dir.path())
        .args([
            "generate",
            "config.yaml",
            "pipeline.yaml",
            "-o",
            ".github/workflows/ci.yaml",
            "--default-runner",
            "self-hosted",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read(dir.path().join(".github/workflows/ci.yaml")).unwrap();
    let workflow = parse(&written);
    assert_eq!(
        workflow["jobs"]["build"]["runs-on"].as_str(),
        Some("self-hosted")
    );
}

#[test]
fn test_generate_refuses_invalid_pipeline_without_force() {
    let dir = workspace();
    loom_actions(dir.path())
        .args(["generate", "broken.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Validation failed. Use --force to generate anyway.",
        ));

    let output = loom_actions(dir.path())
        .args(["generate", "broken.yaml", "--force"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let workflow = parse(&output.stdout);
    assert!(workflow["jobs"]["build"].is_mapping());
}

#[test]
fn test_validate_reports_result() {
    let dir = workspace();
    loom_actions(dir.path())
        .args(["validate", "config.yaml", "pipeline.yaml"])
        .assert()
        .success();

    loom_actions(dir.path())
        .args(["validate", "broken.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Stage 'deploy' references undefined job 'ship'. Available jobs: build",
        ));
}

#[test]
fn test_missing_input_file_fails() {
    let dir = workspace();
    loom_actions(dir.path())
        .args(["generate", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found: nope.yaml"));
}

#[test]
fn test_unknown_resource_type_fails() {
    let dir = workspace();
    fs::write(
        dir.path().join("odd.yaml"),
        "apiVersion: v9\nkind: LoomPipeline\n",
    )
    .unwrap();
    loom_actions(dir.path())
        .args(["validate", "odd.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "unrecognized resource type v9/LoomPipeline",
        ));
}

#[test]
fn test_list_types_prints_registered_pairs() {
    let dir = workspace();
    loom_actions(dir.path())
        .arg("list-types")
        .assert()
        .success()
        .stdout("v1/LoomConfig\nv1/LoomPipeline\n");
}

#[test]
fn test_generate_matrix_from_local_sources() {
    let dir = workspace();
    let output = loom_actions(dir.path())
        .args([
            "generate-matrix",
            "--sources",
            "config.yaml, pipeline.yaml",
            "--pipeline-vars",
            "STAGE=ci",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let matrix: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let include = matrix["include"].as_array().unwrap();
    assert_eq!(include.len(), 2);
    assert_eq!(include[0]["job_name"], "build");
    assert_eq!(include[0]["command"], "loom build");
    let env: serde_json::Value =
        serde_json::from_str(include[0]["env_json"].as_str().unwrap()).unwrap();
    assert_eq!(env["STAGE"], "ci");
    assert_eq!(env["REGISTRY"], "ghcr.io/acme");
}

#[test]
fn test_run_with_local_sources_and_config_file() {
    let dir = workspace();
    fs::write(
        dir.path().join("loom-actions.toml"),
        "[generator]\ntrigger_branches = [\"trunk\"]\n",
    )
    .unwrap();

    let output = loom_actions(dir.path())
        .args(["run", "--sources", "config.yaml pipeline.yaml"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let workflow = parse(&output.stdout);
    assert_eq!(workflow["jobs"].as_mapping().unwrap().len(), 2);
    let trigger = workflow
        .as_mapping()
        .unwrap()
        .iter()
        .find(|(key, _)| key.as_str() == Some("on") || key.as_bool() == Some(true))
        .map(|(_, value)| value.clone())
        .expect("trigger key present");
    assert_eq!(trigger["push"]["branches"][0].as_str(), Some("trunk"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let dir = workspace();
    loom_actions(dir.path())
        .args(["--config", "absent.toml", "list-types"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_long_help_lists_environment_overrides() {
    let dir = workspace();
    loom_actions(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ENVIRONMENT:"))
        .stdout(predicate::str::contains("LOOM_ACTIONS_DEFAULT_RUNNER"))
        .stdout(predicate::str::contains("LOOM_ACTIONS_FETCH_TIMEOUT"));
}
