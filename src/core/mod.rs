pub mod config;
pub mod decoder;
pub mod error;
pub mod generator;
pub mod resources;
pub mod scheme;
pub mod types;
pub mod validator;

pub use config::{ActionsConfig, ConfigLoader, ConfigValidator, GeneratorConfig};
pub use decoder::{DecodeError, Decoder};
pub use error::AppError;
pub use generator::{EmitError, GenerationError, WorkflowDocument, WorkflowGenerator};
pub use resources::{LoomConfig, LoomPipeline, Resource, ResourceObject};
pub use scheme::{Scheme, VersionKind};
pub use types::*;
pub use validator::{default_chain, ValidationResult, Validator, ValidatorChain};
