use super::document::WorkflowDocument;
use super::GenerationError;
use crate::core::config::EmitStyle;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Failure while producing output text from a workflow.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("failed to render workflow as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to render workflow as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize `document` to text according to `style`.
///
/// Flow style is emitted as JSON, which every YAML 1.2 reader accepts.
pub fn render(document: &WorkflowDocument, style: EmitStyle) -> Result<String, EmitError> {
    let mut value = serde_yaml::to_value(document)?;
    if style.sort_keys {
        sort_mappings(&mut value);
    }
    if style.default_flow_style {
        let mut text = serde_json::to_string(&value)?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(serde_yaml::to_string(&value)?)
    }
}

fn sort_mappings(value: &mut Value) {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by_cached_key(|(key, _)| key_text(key));
            let mut sorted = Mapping::with_capacity(entries.len());
            for (key, mut item) in entries {
                sort_mappings(&mut item);
                sorted.insert(key, item);
            }
            *map = sorted;
        }
        Value::Sequence(items) => items.iter_mut().for_each(sort_mappings),
        Value::Tagged(tagged) => sort_mappings(&mut tagged.value),
        _ => {}
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        other => serde_yaml::to_string(other).unwrap_or_default(),
    }
}
