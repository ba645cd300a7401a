use std::path::{Path, PathBuf};

use persona_core::ProfileError;
use serde_json::{Map, Value};

/// The application's JSON settings file, held in memory as a top-level
/// object. Key order is preserved on save.
#[derive(Debug, Clone)]
pub struct SettingsDocument {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl SettingsDocument {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        if !path.is_file() {
            return Err(ProfileError::LiveStateMissing {
                path: path.display().to_string(),
            });
        }

        let content =
            std::fs::read_to_string(path).map_err(|error| ProfileError::io_at("read", path, error))?;

        let value: Value = serde_json::from_str(&content).map_err(|error| document_error(path, error))?;

        match value {
            Value::Object(fields) => Ok(Self {
                path: path.to_path_buf(),
                fields,
            }),
            other => Err(ProfileError::Document {
                path: path.display().to_string(),
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn set_str(&mut self, field: &str, value: &str) {
        self.fields
            .insert(field.to_string(), Value::String(value.to_string()));
    }

    /// Writes the document back with two-space indentation.
    pub fn save(&self) -> Result<(), ProfileError> {
        let content = serde_json::to_string_pretty(&self.fields)
            .map_err(|error| document_error(&self.path, error))?;

        std::fs::write(&self.path, content)
            .map_err(|error| ProfileError::io_at("write", &self.path, error))
    }
}

fn document_error(path: &Path, error: serde_json::Error) -> ProfileError {
    ProfileError::Document {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
