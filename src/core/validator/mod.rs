use crate::core::resources::Resource;
use serde::Serialize;

pub mod rules;
pub use rules::*;

/// Outcome of running one or more validators against a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let mut result = Self::success();
        result.add_error(error);
        result
    }

    /// Record an error; the result becomes invalid.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.errors.push(error.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Fold `other` into `self`, keeping message order.
    pub fn merge(&mut self, other: ValidationResult) {
        self.valid &= other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}

/// A single independent check.
pub trait Validator {
    /// Identifier used to remove the check from a chain.
    fn name(&self) -> &'static str;

    fn handles(&self, _resource: &Resource) -> bool {
        true
    }

    fn validate(&self, resource: &Resource) -> ValidationResult;
}

/// Ordered list of validators. Every applicable validator runs; results are merged in order.
#[derive(Default)]
pub struct ValidatorChain {
    validators: Vec<Box<dyn Validator>>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, validator: Box<dyn Validator>) -> &mut Self {
        self.validators.push(validator);
        self
    }

    /// Drop every validator registered under `name`. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.validators.len();
        self.validators.retain(|validator| validator.name() != name);
        self.validators.len() != before
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|validator| validator.name()).collect()
    }

    pub fn validate(&self, resource: &Resource) -> ValidationResult {
        let mut result = ValidationResult::success();
        for validator in &self.validators {
            if validator.handles(resource) {
                result.merge(validator.validate(resource));
            }
        }
        result
    }

    /// Validate each resource and merge everything into one result.
    pub fn validate_all(&self, resources: &[Resource]) -> ValidationResult {
        let mut result = ValidationResult::success();
        for resource in resources {
            result.merge(self.validate(resource));
        }
        result
    }
}

/// Chain holding the built-in checks in their standard order.
pub fn default_chain() -> ValidatorChain {
    let mut chain = ValidatorChain::new();
    for validator in built_in_validators() {
        chain.add(validator);
    }
    chain
}
