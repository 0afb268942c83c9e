use super::fields::{self, FieldChecker, FieldViolation};
use super::Resource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// `v1/LoomPipeline`: ordered stages referencing a set of jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoomPipeline {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub pipeline: PipelineSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "fields::scalar_map",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub vars: IndexMap<String, String>,
    /// Trigger block copied verbatim into the workflow `on:` key.
    #[serde(rename = "on", default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Value>,
    #[serde(default, deserialize_with = "fields::null_as_default")]
    pub stages: Vec<Stage>,
    #[serde(default, deserialize_with = "fields::null_as_default")]
    pub jobs: IndexMap<String, Job>,
}

/// Named reference to one job; stage order defines job ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub job: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Container image the job runs in.
    pub path: String,
    pub command: String,
    #[serde(
        default,
        deserialize_with = "fields::scalar_map",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub variables: IndexMap<String, String>,
    #[serde(default, deserialize_with = "fields::null_as_default")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<JobInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<JobOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<JobWhen>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInput {
    #[serde(default, deserialize_with = "fields::scalar_map")]
    pub params: IndexMap<String, String>,
    #[serde(default, deserialize_with = "fields::scalar_map")]
    pub secure_params: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobOutput {
    #[serde(default, deserialize_with = "fields::scalar_map")]
    pub files: IndexMap<String, String>,
}

/// Conditional-execution descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobWhen {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl LoomPipeline {
    pub const API_VERSION: &'static str = "v1";
    pub const KIND: &'static str = "LoomPipeline";

    /// Build a pipeline resource from one parsed document.
    pub fn decode(value: &Value) -> Result<Resource, Vec<FieldViolation>> {
        check_fields(value)?;
        serde_yaml::from_value::<LoomPipeline>(value.clone())
            .map(Resource::Pipeline)
            .map_err(|err| vec![FieldViolation::new("", err.to_string())])
    }
}

fn check_fields(value: &Value) -> Result<(), Vec<FieldViolation>> {
    let mut checker = FieldChecker::new();
    let Some(root) = checker.root(value) else {
        return checker.finish();
    };
    checker.deny_unknown(root, "", &["apiVersion", "kind", "pipeline"]);
    let Some(spec) = checker.required_mapping(root, "", "pipeline") else {
        return checker.finish();
    };

    checker.optional_string(spec, "pipeline", "id");
    checker.optional_string(spec, "pipeline", "name");
    checker.scalar_map(spec, "pipeline", "vars");

    if let Some(stages) = checker.optional_sequence(spec, "pipeline", "stages") {
        for (index, stage) in stages.iter().enumerate() {
            let path = format!("pipeline.stages[{}]", index);
            let Some(stage) = checker.expect_mapping(stage, &path) else {
                continue;
            };
            checker.required_string(stage, &path, "name");
            checker.required_string(stage, &path, "job");
        }
    }

    if let Some(jobs) = checker.optional_mapping(spec, "pipeline", "jobs") {
        for (key, job) in jobs {
            let Some(key) = key.as_str() else {
                checker.violation("pipeline.jobs", "job keys must be strings");
                continue;
            };
            let path = fields::join("pipeline.jobs", key);
            let Some(job) = checker.expect_mapping(job, &path) else {
                continue;
            };
            check_job(&mut checker, job, &path);
        }
    }

    checker.finish()
}

fn check_job(checker: &mut FieldChecker, job: &serde_yaml::Mapping, path: &str) {
    checker.required_string(job, path, "path");
    checker.required_string(job, path, "command");
    checker.scalar_map(job, path, "variables");
    checker.string_list(job, path, "services");

    if let Some(input) = checker.optional_mapping(job, path, "input") {
        let input_path = fields::join(path, "input");
        checker.scalar_map(input, &input_path, "params");
        checker.scalar_map(input, &input_path, "secure_params");
    }
    if let Some(output) = checker.optional_mapping(job, path, "output") {
        checker.scalar_map(output, &fields::join(path, "output"), "files");
    }
    if let Some(when) = checker.optional_mapping(job, path, "when") {
        let when_path = fields::join(path, "when");
        checker.optional_string(when, &when_path, "statuses");
        checker.optional_string(when, &when_path, "condition");
    }
}
