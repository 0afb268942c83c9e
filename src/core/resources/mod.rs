//! Typed resource model for the `v1` Loom document kinds.

mod config;
pub(crate) mod fields;
mod pipeline;

pub use config::{Credentials, GlobalConfig, LoomConfig};
pub use fields::FieldViolation;
pub use pipeline::{Job, JobInput, JobOutput, JobWhen, LoomPipeline, PipelineSpec, Stage};

use crate::core::generator::{GenerationError, WorkflowFragment};
use crate::core::scheme::{ResourceDescriptor, Scheme};

/// Capability shared by every resource variant.
///
/// `lower` turns the resource into the slice of the output workflow it contributes;
/// the generator merges fragments without inspecting the variant.
pub trait ResourceObject {
    fn api_version(&self) -> &str;
    fn kind(&self) -> &str;
    fn lower(&self) -> Result<WorkflowFragment, GenerationError>;
}

/// One decoded document.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Config(LoomConfig),
    Pipeline(LoomPipeline),
}

impl Resource {
    pub fn as_config(&self) -> Option<&LoomConfig> {
        match self {
            Resource::Config(config) => Some(config),
            Resource::Pipeline(_) => None,
        }
    }

    pub fn as_pipeline(&self) -> Option<&LoomPipeline> {
        match self {
            Resource::Pipeline(pipeline) => Some(pipeline),
            Resource::Config(_) => None,
        }
    }

    fn object(&self) -> &dyn ResourceObject {
        match self {
            Resource::Config(config) => config,
            Resource::Pipeline(pipeline) => pipeline,
        }
    }
}

impl ResourceObject for Resource {
    fn api_version(&self) -> &str {
        self.object().api_version()
    }

    fn kind(&self) -> &str {
        self.object().kind()
    }

    fn lower(&self) -> Result<WorkflowFragment, GenerationError> {
        self.object().lower()
    }
}

/// Register `v1/LoomConfig` and `v1/LoomPipeline`.
pub fn register_v1_types(scheme: &mut Scheme) {
    scheme.register(
        LoomConfig::API_VERSION,
        LoomConfig::KIND,
        ResourceDescriptor::new("LoomConfig", LoomConfig::decode),
    );
    scheme.register(
        LoomPipeline::API_VERSION,
        LoomPipeline::KIND,
        ResourceDescriptor::new("LoomPipeline", LoomPipeline::decode),
    );
}
