//! Multi-document YAML decoding into typed resources.

use crate::core::resources::fields::scalar_to_string;
use crate::core::resources::{FieldViolation, Resource};
use crate::core::scheme::Scheme;
use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

/// Failure while turning document text into resources. Positions are 1-based document indexes.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("document {document}: invalid YAML: {message}")]
    Yaml { document: usize, message: String },

    #[error("document {document}: expected a mapping at the top level")]
    NotAMapping { document: usize },

    #[error("document {document}: missing required field '{field}'")]
    MissingField {
        document: usize,
        field: &'static str,
    },

    #[error("document {document}: unrecognized resource type {api_version}/{kind}")]
    UnknownType {
        document: usize,
        api_version: String,
        kind: String,
    },

    #[error("document {document}: invalid {type_name}: {}", join_violations(.violations))]
    InvalidFields {
        document: usize,
        type_name: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("expected exactly one resource, found none")]
    NoResource,

    #[error("document {document}: expected exactly one resource, found another")]
    UnexpectedResource { document: usize },
}

impl DecodeError {
    /// Index of the offending document, when the failure is tied to one.
    pub fn document(&self) -> Option<usize> {
        match self {
            DecodeError::Yaml { document, .. }
            | DecodeError::NotAMapping { document }
            | DecodeError::MissingField { document, .. }
            | DecodeError::UnknownType { document, .. }
            | DecodeError::InvalidFields { document, .. }
            | DecodeError::UnexpectedResource { document } => Some(*document),
            DecodeError::NoResource => None,
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Dispatches each document to the decoder registered for its `(apiVersion, kind)`.
pub struct Decoder<'a> {
    scheme: &'a Scheme,
}

impl<'a> Decoder<'a> {
    pub fn new(scheme: &'a Scheme) -> Self {
        Self { scheme }
    }

    /// Decode every non-empty document in `text`. Any failure aborts the whole batch.
    pub fn decode_all(&self, text: &str) -> Result<Vec<Resource>, DecodeError> {
        Ok(self
            .decode_indexed(text)?
            .into_iter()
            .map(|(_, resource)| resource)
            .collect())
    }

    /// Decode text that must hold exactly one resource.
    pub fn decode(&self, text: &str) -> Result<Resource, DecodeError> {
        let mut resources = self.decode_indexed(text)?.into_iter();
        let (_, resource) = resources.next().ok_or(DecodeError::NoResource)?;
        if let Some((document, _)) = resources.next() {
            return Err(DecodeError::UnexpectedResource { document });
        }
        Ok(resource)
    }

    pub fn can_decode(&self, api_version: &str, kind: &str) -> bool {
        self.scheme.is_registered(api_version, kind)
    }

    fn decode_indexed(&self, text: &str) -> Result<Vec<(usize, Resource)>, DecodeError> {
        let mut resources = Vec::new();
        for (position, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
            let index = position + 1;
            let yaml_error = |err: serde_yaml::Error| DecodeError::Yaml {
                document: index,
                message: err.to_string(),
            };
            let mut value = Value::deserialize(document).map_err(yaml_error)?;
            value.apply_merge().map_err(yaml_error)?;
            if value.is_null() {
                tracing::debug!("skipping empty document {}", index);
                continue;
            }
            resources.push((index, self.decode_value(index, &value)?));
        }
        tracing::debug!("decoded {} resource(s)", resources.len());
        Ok(resources)
    }

    fn decode_value(&self, document: usize, value: &Value) -> Result<Resource, DecodeError> {
        if !value.is_mapping() {
            return Err(DecodeError::NotAMapping { document });
        }
        let api_version = identity_field(value, "apiVersion")
            .ok_or(DecodeError::MissingField {
                document,
                field: "apiVersion",
            })?;
        let kind = identity_field(value, "kind").ok_or(DecodeError::MissingField {
            document,
            field: "kind",
        })?;

        let descriptor =
            self.scheme
                .lookup(&api_version, &kind)
                .ok_or_else(|| DecodeError::UnknownType {
                    document,
                    api_version: api_version.clone(),
                    kind: kind.clone(),
                })?;

        (descriptor.decode)(value).map_err(|violations| DecodeError::InvalidFields {
            document,
            type_name: descriptor.type_name,
            violations,
        })
    }
}

/// Numbers and booleans are rendered as text. Absent, empty, null and nested values count as missing.
fn identity_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(scalar_to_string)
        .filter(|text| !text.is_empty())
}
