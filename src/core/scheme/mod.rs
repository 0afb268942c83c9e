//! Type registry mapping `(apiVersion, kind)` pairs to resource decoders.

use crate::core::resources::{self, FieldViolation, Resource};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::fmt;

/// Identity key used for registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionKind {
    pub api_version: String,
    pub kind: String,
}

impl VersionKind {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.kind)
    }
}

/// Function that builds a typed resource from one parsed document.
pub type DecodeFn = fn(&Value) -> Result<Resource, Vec<FieldViolation>>;

/// Descriptor stored for each registered type.
#[derive(Clone, Copy)]
pub struct ResourceDescriptor {
    pub type_name: &'static str,
    pub decode: DecodeFn,
}

impl ResourceDescriptor {
    pub fn new(type_name: &'static str, decode: DecodeFn) -> Self {
        Self { type_name, decode }
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Registry of known resource types.
///
/// Constructed explicitly and passed by reference; there is no process-wide instance.
#[derive(Debug, Default, Clone)]
pub struct Scheme {
    registry: IndexMap<VersionKind, ResourceDescriptor>,
}

impl Scheme {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in `v1` type registered.
    pub fn with_v1_types() -> Self {
        let mut scheme = Self::new();
        resources::register_v1_types(&mut scheme);
        scheme
    }

    /// Store `descriptor` under `(api_version, kind)`. A later registration for the same key wins.
    pub fn register(
        &mut self,
        api_version: impl Into<String>,
        kind: impl Into<String>,
        descriptor: ResourceDescriptor,
    ) {
        let key = VersionKind::new(api_version, kind);
        if self.registry.insert(key.clone(), descriptor).is_some() {
            tracing::debug!("replaced registered type {}", key);
        }
    }

    pub fn lookup(&self, api_version: &str, kind: &str) -> Option<&ResourceDescriptor> {
        self.registry.get(&VersionKind::new(api_version, kind))
    }

    pub fn is_registered(&self, api_version: &str, kind: &str) -> bool {
        self.lookup(api_version, kind).is_some()
    }

    /// All registered keys. Callers must not rely on the order.
    pub fn known_types(&self) -> Vec<VersionKind> {
        self.registry.keys().cloned().collect()
    }
}
