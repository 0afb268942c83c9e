use super::fields::{self, FieldChecker, FieldViolation};
use super::Resource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// `v1/LoomConfig`: global variables shared by every generated job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoomConfig {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub global: GlobalConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(
        default,
        deserialize_with = "fields::scalar_map",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub vars: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Credentials>,
}

/// Credential pair carried verbatim on the config resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl LoomConfig {
    pub const API_VERSION: &'static str = "v1";
    pub const KIND: &'static str = "LoomConfig";

    /// Build a config resource from one parsed document.
    pub fn decode(value: &Value) -> Result<Resource, Vec<FieldViolation>> {
        check_fields(value)?;
        serde_yaml::from_value::<LoomConfig>(value.clone())
            .map(Resource::Config)
            .map_err(|err| vec![FieldViolation::new("", err.to_string())])
    }
}

fn check_fields(value: &Value) -> Result<(), Vec<FieldViolation>> {
    let mut checker = FieldChecker::new();
    if let Some(root) = checker.root(value) {
        checker.deny_unknown(root, "", &["apiVersion", "kind", "global"]);
        if let Some(global) = checker.required_mapping(root, "", "global") {
            checker.scalar_map(global, "global", "vars");
            if let Some(email) = checker.optional_mapping(global, "global", "email") {
                checker.optional_string(email, "global.email", "username");
                checker.optional_string(email, "global.email", "password");
            }
        }
    }
    checker.finish()
}
