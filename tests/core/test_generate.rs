use indexmap::IndexMap;
use loom_actions::core::config::{EmitStyle, GeneratorConfig};
use loom_actions::core::generator::{CHECKOUT_ACTION, UPLOAD_ARTIFACT_ACTION};
use loom_actions::core::resources::Resource;
use loom_actions::core::{Decoder, EmitError, GenerationError, Scheme, WorkflowGenerator};

fn decode(text: &str) -> Vec<Resource> {
    let scheme = Scheme::with_v1_types();
    Decoder::new(&scheme).decode_all(text).unwrap()
}

fn generator_with(text: &str) -> WorkflowGenerator {
    let mut generator = WorkflowGenerator::default();
    generator.add_resources(decode(text));
    generator
}

fn env(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const TWO_STAGES: &str = r#"
apiVersion: v1
kind: LoomPipeline
pipeline:
  name: ci
  stages:
    - name: s1
      job: jobX
    - name: s2
      job: jobY
  jobs:
    jobY:
      path: alpine:3
      command: deploy
    jobX:
      path: rust:1.79
      command: build
    extra:
      path: alpine:3
      command: lint
"#;

#[test]
fn test_config_env_merges_last_wins() {
    let generator = generator_with(
        r#"
apiVersion: v1
kind: LoomConfig
global:
  vars:
    A: "1"
---
apiVersion: v1
kind: LoomConfig
global:
  vars:
    A: "2"
    B: "3"
"#,
    );
    let document = generator.generate().unwrap();
    assert_eq!(document.env, env(&[("A", "2"), ("B", "3")]));
}

#[test]
fn test_stage_order_drives_needs_and_unstaged_jobs_follow() {
    let document = generator_with(TWO_STAGES).generate().unwrap();

    let keys: Vec<&str> = document.jobs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["jobX", "jobY", "extra"]);
    assert!(document.jobs["jobX"].needs.is_empty());
    assert_eq!(document.jobs["jobY"].needs, vec!["jobX"]);
    assert!(document.jobs["extra"].needs.is_empty());
    assert_eq!(document.name.as_deref(), Some("ci"));
}

#[test]
fn test_job_lowering_shape() {
    let document = generator_with(
        r#"
apiVersion: v1
kind: LoomPipeline
pipeline:
  jobs:
    package:
      path: rust:1.79
      command: package --release
      variables:
        PROFILE: release
      input:
        params:
          db.host: localhost
          api.key: plain
        secure_params:
          api.key: secret
      output:
        files:
          binary: target/release/app
          checksum: target/release/app.sha256
"#,
    )
    .generate()
    .unwrap();

    let job = &document.jobs["package"];
    assert_eq!(job.runs_on, "ubuntu-latest");
    assert_eq!(job.container.image, "rust:1.79");
    assert_eq!(
        job.env,
        env(&[
            ("PROFILE", "release"),
            ("DB_HOST", "localhost"),
            ("API_KEY", "secret"),
        ])
    );

    assert_eq!(job.steps.len(), 3);
    assert_eq!(job.steps[0].uses.as_deref(), Some(CHECKOUT_ACTION));
    assert_eq!(job.steps[1].name.as_deref(), Some("Run package --release"));
    assert_eq!(job.steps[1].run.as_deref(), Some("loom package --release"));

    let upload = &job.steps[2];
    assert_eq!(upload.uses.as_deref(), Some(UPLOAD_ARTIFACT_ACTION));
    assert_eq!(upload.condition.as_deref(), Some("always()"));
    assert_eq!(upload.with["name"], "package-artifacts");
    assert_eq!(
        upload.with["path"],
        "target/release/app\ntarget/release/app.sha256"
    );
    assert!(job.condition.is_none());
}

#[test]
fn test_condition_and_status_are_joined() {
    let document = generator_with(
        r#"
apiVersion: v1
kind: LoomPipeline
pipeline:
  jobs:
    deploy:
      path: alpine:3
      command: deploy
      when:
        statuses: SUCCESS
        condition: STATUS == ok
    cleanup:
      path: alpine:3
      command: cleanup
      when:
        statuses: always
"#,
    )
    .generate()
    .unwrap();

    assert_eq!(
        document.jobs["deploy"].condition.as_deref(),
        Some("${{ env.STATUS }} == 'ok' && success()")
    );
    assert_eq!(document.jobs["cleanup"].condition.as_deref(), Some("always()"));
}

#[test]
fn test_malformed_condition_aborts_generation() {
    let err = generator_with(
        r#"
apiVersion: v1
kind: LoomPipeline
pipeline:
  jobs:
    deploy:
      path: alpine:3
      command: deploy
      when:
        condition: bad condition
"#,
    )
    .generate()
    .unwrap_err();

    assert!(matches!(err, GenerationError::InvalidCondition { .. }));
    assert!(err.to_string().contains("bad condition"));
}

#[test]
fn test_substitution_prefers_job_env_and_keeps_unknowns() {
    let document = generator_with(
        r#"
apiVersion: v1
kind: LoomConfig
global:
  vars:
    TARGET: global-target
    REGION: eu-west-1
---
apiVersion: v1
kind: LoomPipeline
pipeline:
  jobs:
    local:
      path: alpine:3
      command: deploy ${TARGET} ${REGION} ${MISSING}
      variables:
        TARGET: job-target
    shared:
      path: registry/${REGION}/tool:1
      command: deploy ${TARGET}
"#,
    )
    .generate()
    .unwrap();

    assert_eq!(
        document.jobs["local"].steps[1].run.as_deref(),
        Some("loom deploy job-target eu-west-1 ${MISSING}")
    );
    assert_eq!(
        document.jobs["shared"].steps[1].run.as_deref(),
        Some("loom deploy global-target")
    );
    assert_eq!(
        document.jobs["shared"].container.image,
        "registry/eu-west-1/tool:1"
    );
}

#[test]
fn test_runner_override_applies_to_every_job() {
    let mut generator = WorkflowGenerator::new(GeneratorConfig {
        default_runner: "self-hosted".to_string(),
        ..GeneratorConfig::default()
    });
    generator.add_resources(decode(TWO_STAGES));
    generator.add_resources(decode(
        "apiVersion: v1\nkind: LoomPipeline\npipeline:\n  jobs:\n    other:\n      path: a\n      command: b\n",
    ));

    let document = generator.generate().unwrap();
    assert_eq!(document.jobs.len(), 4);
    assert!(document.jobs.values().all(|job| job.runs_on == "self-hosted"));
}

#[test]
fn test_later_pipeline_replaces_job_with_its_own_needs() {
    let document = generator_with(
        r#"
apiVersion: v1
kind: LoomPipeline
pipeline:
  stages:
    - name: one
      job: build
    - name: two
      job: test
  jobs:
    build: {path: a, command: build}
    test: {path: a, command: test}
---
apiVersion: v1
kind: LoomPipeline
pipeline:
  name: release
  jobs:
    test: {path: b, command: test --all}
"#,
    )
    .generate()
    .unwrap();

    let keys: Vec<&str> = document.jobs.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["build", "test"]);
    assert_eq!(document.jobs["test"].container.image, "b");
    assert!(document.jobs["test"].needs.is_empty());
    // The first pipeline declared no name, so the second one supplies it.
    assert_eq!(document.name.as_deref(), Some("release"));
}

#[test]
fn test_pipeline_vars_and_extra_vars_reach_global_env() {
    let mut generator = generator_with(
        r#"
apiVersion: v1
kind: LoomConfig
global:
  vars:
    ENV: dev
---
apiVersion: v1
kind: LoomPipeline
pipeline:
  vars:
    CHANNEL: beta
  jobs: {}
"#,
    );
    generator.add_extra_vars(env(&[("ENV", "prod")]));

    let document = generator.generate().unwrap();
    assert_eq!(document.env, env(&[("ENV", "prod"), ("CHANNEL", "beta")]));
}

#[test]
fn test_default_trigger_and_clear() {
    let mut generator = generator_with(TWO_STAGES);
    let document = generator.generate().unwrap();
    let branches = document.trigger["push"]["branches"].as_sequence().unwrap();
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].as_str(), Some("main"));

    generator.clear();
    let document = generator.generate().unwrap();
    assert!(document.jobs.is_empty());
    assert!(document.env.is_empty());
    assert_eq!(generator.config().default_runner, "ubuntu-latest");
}

#[test]
fn test_generated_text_round_trips_through_yaml() {
    let mut generator = WorkflowGenerator::new(GeneratorConfig {
        emit: EmitStyle {
            default_flow_style: false,
            sort_keys: true,
        },
        ..GeneratorConfig::default()
    });
    generator.add_resources(decode(TWO_STAGES));

    let text = generator.generate_text().unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(parsed["jobs"]["jobY"]["needs"][0].as_str(), Some("jobX"));
    assert_eq!(parsed["jobs"]["jobX"]["container"]["image"].as_str(), Some("rust:1.79"));

    let jobs: Vec<&str> = parsed["jobs"]
        .as_mapping()
        .unwrap()
        .keys()
        .filter_map(|key| key.as_str())
        .collect();
    assert_eq!(jobs, vec!["extra", "jobX", "jobY"]);
}

#[test]
fn test_matrix_has_one_entry_per_job() {
    let mut generator = generator_with(TWO_STAGES);
    generator.add_extra_vars(env(&[("ENV", "prod")]));
    let matrix = generator.generate().unwrap().matrix().unwrap();

    assert_eq!(matrix.include.len(), 3);
    let first = &matrix.include[0];
    assert_eq!(first.job_name, "jobX");
    assert_eq!(first.image, "rust:1.79");
    assert_eq!(first.command, "loom build");
    assert_eq!(first.env_json, r#"{"ENV":"prod"}"#);
}

#[test]
fn test_hyphenated_variable_names_resolve() {
    let document = generator_with(
        r#"
apiVersion: v1
kind: LoomConfig
global:
  vars:
    APP-NAME: shop
---
apiVersion: v1
kind: LoomPipeline
pipeline:
  jobs:
    release:
      path: alpine:3
      command: ship ${APP-NAME}
"#,
    )
    .generate()
    .unwrap();

    assert_eq!(
        document.jobs["release"].steps[1].run.as_deref(),
        Some("loom ship shop")
    );
}

#[test]
fn test_generate_text_wraps_condition_errors() {
    let generator = generator_with(
        "apiVersion: v1\nkind: LoomPipeline\npipeline:\n  jobs:\n    deploy:\n      path: a\n      command: b\n      when:\n        condition: nope\n",
    );
    let err = generator.generate_text().unwrap_err();
    assert!(matches!(
        err,
        EmitError::Generation(GenerationError::InvalidCondition { .. })
    ));
    assert!(err.to_string().contains("invalid condition 'nope'"));
}
