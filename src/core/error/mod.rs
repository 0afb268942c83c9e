use crate::core::decoder::DecodeError;
use crate::core::generator::{EmitError, GenerationError};
use crate::core::types::ErrorCategory;
use crate::fetcher::FetchError;
use indexmap::IndexMap;

/// Structured error surfaced at the edges of the crate (configuration, CLI).
///
/// Domain failures keep their own `thiserror` enums; they convert into `AppError` when
/// a caller needs a uniform category and code for reporting.
#[derive(Debug)]
pub struct AppError {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub context: IndexMap<String, String>,
    pub source: Option<anyhow::Error>,
}

impl AppError {
    pub fn new<T: Into<String>>(category: ErrorCategory, message: T) -> Self {
        AppError {
            category,
            code: default_code(category).to_string(),
            message: message.into(),
            context: IndexMap::new(),
            source: None,
        }
    }

    pub fn with_source<T: Into<String>>(
        category: ErrorCategory,
        message: T,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        let mut error = AppError::new(category, message);
        error.source = Some(anyhow::anyhow!(source));
        error
    }

    pub fn with_context<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_code<T: Into<String>>(mut self, code: T) -> Self {
        self.code = code.into();
        self
    }
}

fn default_code(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::ValidationError => "LOOM-CFG-001",
        ErrorCategory::DecodeError => "LOOM-DEC-001",
        ErrorCategory::GenerationError => "LOOM-GEN-001",
        ErrorCategory::FetchError => "LOOM-FETCH-001",
        ErrorCategory::IoError => "LOOM-IO-001",
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.category, self.message)?;
        if !self.context.is_empty() {
            let pairs: Vec<String> = self
                .context
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect();
            write!(f, " ({})", pairs.join(", "))?;
        }
        if let Some(ref source) = self.source {
            write!(f, "\nCaused by: {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::with_source(ErrorCategory::IoError, e.to_string(), Box::new(e))
    }
}

impl From<DecodeError> for AppError {
    fn from(e: DecodeError) -> Self {
        let document = e.document();
        let error = AppError::with_source(ErrorCategory::DecodeError, e.to_string(), Box::new(e));
        match document {
            Some(document) => error.with_context("document", document.to_string()),
            None => error,
        }
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::with_source(ErrorCategory::GenerationError, e.to_string(), Box::new(e))
            .with_code("LOOM-GEN-002")
    }
}

impl From<EmitError> for AppError {
    fn from(e: EmitError) -> Self {
        match e {
            EmitError::Generation(inner) => inner.into(),
            other => AppError::with_source(
                ErrorCategory::GenerationError,
                other.to_string(),
                Box::new(other),
            )
            .with_code("LOOM-GEN-003"),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        let location = e.location().to_string();
        AppError::with_source(ErrorCategory::FetchError, e.to_string(), Box::new(e))
            .with_context("source", location)
    }
}
