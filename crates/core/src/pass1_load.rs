//! Pass 1: read a JSON flow declaration into the node tree.

use std::path::Path;

use crate::ast::FlowDeclaration;
use crate::error::DeclError;

/// Parse a declaration from JSON text. `source_name` is only used in errors.
pub fn load_str(text: &str, source_name: &str) -> Result<FlowDeclaration, DeclError> {
    serde_json::from_str(text).map_err(|e| DeclError::Load {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Parse a declaration from an already-decoded JSON value.
pub fn load_value(value: serde_json::Value, source_name: &str) -> Result<FlowDeclaration, DeclError> {
    serde_json::from_value(value).map_err(|e| DeclError::Load {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

/// Read and parse a declaration file.
pub fn load_file(path: &Path) -> Result<FlowDeclaration, DeclError> {
    let source_name = path.to_string_lossy().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| DeclError::Load {
        source_name: source_name.clone(),
        message: format!("cannot open file: {}", e),
    })?;
    load_str(&text, &source_name)
}
