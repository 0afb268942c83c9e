//! Typed GitHub Actions workflow output.

use super::EmitError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// Complete generated workflow. Field order matches the emitted key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "on")]
    pub trigger: Value,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    #[serde(default)]
    pub jobs: IndexMap<String, WorkflowJob>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowJob {
    #[serde(rename = "runs-on")]
    pub runs_on: String,
    pub container: Container,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
    pub steps: Vec<Step>,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub with: IndexMap<String, String>,
}

impl Step {
    /// Step that invokes a published action.
    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            uses: Some(action.into()),
            ..Self::default()
        }
    }

    /// Named shell step.
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            run: Some(command.into()),
            ..Self::default()
        }
    }
}

impl WorkflowJob {
    /// Apply `f` to every string the job carries.
    pub(crate) fn visit_strings_mut(&mut self, f: &mut dyn FnMut(&mut String)) {
        f(&mut self.runs_on);
        f(&mut self.container.image);
        self.needs.iter_mut().for_each(&mut *f);
        self.env.values_mut().for_each(&mut *f);
        for step in &mut self.steps {
            for field in [
                &mut step.name,
                &mut step.condition,
                &mut step.uses,
                &mut step.run,
            ]
            .into_iter()
            .flatten()
            {
                f(field);
            }
            step.with.values_mut().for_each(&mut *f);
        }
        if let Some(condition) = self.condition.as_mut() {
            f(condition);
        }
    }
}

/// Slice of a workflow contributed by one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowFragment {
    pub name: Option<String>,
    pub trigger: Option<Value>,
    pub env: IndexMap<String, String>,
    pub jobs: IndexMap<String, WorkflowJob>,
}

/// Dynamic-job matrix consumed by `strategy.matrix` in a calling workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub include: Vec<MatrixEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub job_name: String,
    pub image: String,
    pub command: String,
    /// JSON object of the global env overlaid with the job env.
    pub env_json: String,
}

impl WorkflowDocument {
    pub fn matrix(&self) -> Result<Matrix, EmitError> {
        let mut include = Vec::with_capacity(self.jobs.len());
        for (job_name, job) in &self.jobs {
            let mut env = self.env.clone();
            env.extend(job.env.iter().map(|(k, v)| (k.clone(), v.clone())));

            let command = job
                .steps
                .iter()
                .find(|step| {
                    step.run.is_some()
                        && step
                            .name
                            .as_deref()
                            .is_some_and(|name| name.starts_with("Run "))
                })
                .and_then(|step| step.run.clone())
                .unwrap_or_default();

            include.push(MatrixEntry {
                job_name: job_name.clone(),
                image: job.container.image.clone(),
                command,
                env_json: serde_json::to_string(&env)?,
            });
        }
        Ok(Matrix { include })
    }
}
