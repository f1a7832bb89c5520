//! Spec file loading — JSON or YAML, trusted input

use std::path::{Path, PathBuf};

use apipact_core::document::{DocumentError, SpecDocument};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("invalid YAML: {0}")]
    Yaml(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Read and parse a specification file.
///
/// # Errors
///
/// Returns error if the file cannot be read, parsed, or typed.
pub fn load_spec(path: &Path) -> Result<SpecDocument, LoadError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| LoadError::Io(path.to_path_buf(), e.to_string()))?;
    let value = parse_document(path, &content)?;
    Ok(SpecDocument::parse(value)?)
}

/// Parse spec content as JSON or YAML.
///
/// Detection strategy: try extension first (`.yaml`/`.yml`/`.json`), then
/// fall back to content sniffing (leading `{` → JSON, otherwise YAML).
///
/// # Errors
///
/// Returns error if the content does not parse in the detected format.
pub fn parse_document(path: &Path, content: &str) -> Result<serde_json::Value, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| LoadError::Yaml(e.to_string())),
        "json" => serde_json::from_str(content).map_err(|e| LoadError::Json(e.to_string())),
        _ => {
            if content.trim_start().starts_with('{') {
                serde_json::from_str(content).map_err(|e| LoadError::Json(e.to_string()))
            } else {
                serde_yml::from_str(content).map_err(|e| LoadError::Yaml(e.to_string()))
            }
        }
    }
}
