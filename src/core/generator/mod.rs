//! Merges decoded resources into a single GitHub Actions workflow.

mod document;
mod emit;
mod lowering;
mod substitution;

pub use document::{
    Container, Matrix, MatrixEntry, Step, WorkflowDocument, WorkflowFragment, WorkflowJob,
};
pub use emit::EmitError;
pub use lowering::{CHECKOUT_ACTION, UPLOAD_ARTIFACT_ACTION};

use crate::core::config::{GeneratorConfig, DEFAULT_RUNNER};
use crate::core::resources::{LoomConfig, LoomPipeline, Resource, ResourceObject};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Failure while lowering resources. Only the condition grammar can fail.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("job '{job}': invalid condition '{condition}' (expected VAR == VALUE or VAR != VALUE)")]
    InvalidCondition { job: String, condition: String },
}

/// Accumulates resources and produces one workflow from them.
///
/// Configs and pipelines are kept in separate buckets, each in insertion order.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGenerator {
    config: GeneratorConfig,
    configs: Vec<LoomConfig>,
    pipelines: Vec<LoomPipeline>,
    extra_vars: IndexMap<String, String>,
}

impl WorkflowGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn add_resource(&mut self, resource: Resource) {
        match resource {
            Resource::Config(config) => self.configs.push(config),
            Resource::Pipeline(pipeline) => self.pipelines.push(pipeline),
        }
    }

    pub fn add_resources(&mut self, resources: impl IntoIterator<Item = Resource>) {
        for resource in resources {
            self.add_resource(resource);
        }
    }

    /// Variables merged into the global env after every config and pipeline.
    pub fn add_extra_vars(&mut self, vars: IndexMap<String, String>) {
        self.extra_vars.extend(vars);
    }

    /// Drop accumulated resources and extra variables. Configuration is kept.
    pub fn clear(&mut self) {
        self.configs.clear();
        self.pipelines.clear();
        self.extra_vars.clear();
    }

    pub fn generate(&self) -> Result<WorkflowDocument, GenerationError> {
        let mut env = IndexMap::new();
        for config in &self.configs {
            env.extend(config.lower()?.env);
        }

        let mut name = None;
        let mut trigger = None;
        let mut jobs = IndexMap::new();
        for pipeline in &self.pipelines {
            let fragment = pipeline.lower()?;
            if name.is_none() {
                name = fragment.name;
            }
            if trigger.is_none() {
                trigger = fragment.trigger;
            }
            env.extend(fragment.env);
            // An existing key keeps its position; the later definition replaces the job.
            jobs.extend(fragment.jobs);
        }
        env.extend(self.extra_vars.clone());

        let trigger = trigger.unwrap_or_else(|| push_trigger(&self.config.trigger_branches));

        for job in jobs.values_mut() {
            substitution::substitute_job(job, &env);
        }

        if self.config.default_runner != DEFAULT_RUNNER {
            for job in jobs.values_mut() {
                job.runs_on = self.config.default_runner.clone();
            }
        }

        tracing::debug!(
            "generated workflow with {} job(s) from {} config(s) and {} pipeline(s)",
            jobs.len(),
            self.configs.len(),
            self.pipelines.len()
        );

        Ok(WorkflowDocument {
            name,
            trigger,
            env,
            jobs,
        })
    }

    pub fn generate_text(&self) -> Result<String, EmitError> {
        emit::render(&self.generate()?, self.config.emit)
    }
}

/// `{push: {branches: [...]}}`
fn push_trigger(branches: &[String]) -> Value {
    let branches = branches.iter().cloned().map(Value::String).collect();
    let mut push = Mapping::new();
    push.insert(Value::from("branches"), Value::Sequence(branches));
    let mut trigger = Mapping::new();
    trigger.insert(Value::from("push"), Value::Mapping(push));
    Value::Mapping(trigger)
}
