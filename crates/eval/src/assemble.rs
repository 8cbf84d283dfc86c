//! MemoryFactGraph assembly from a JSON fact snapshot.
//!
//! ```json
//! {
//!   "dictionary": ["/flowKnockout", "/formW2s/*/hasBox2"],
//!   "facts": {
//!     "/formW2s": ["w2-A"],
//!     "/formW2s/#w2-A/hasBox2": null
//!   }
//! }
//! ```
//!
//! `dictionary` lists abstract paths that exist but may be unanswered.
//! `facts` maps concrete paths to values; see [`decode_fact`] for the
//! accepted value shapes.

use std::path::Path as FsPath;

use screenflow_core::{ConcretePath, Path};

use crate::fact_graph::MemoryFactGraph;
use crate::types::values::decode_fact;
use crate::types::{FactError, FactState};

/// Assemble a fact graph from a snapshot JSON value.
pub fn assemble_snapshot(snapshot: &serde_json::Value) -> Result<MemoryFactGraph, FactError> {
    let obj = snapshot.as_object().ok_or_else(|| FactError::Snapshot {
        path: "<root>".to_string(),
        message: "snapshot must be a JSON object".to_string(),
    })?;

    let mut graph = MemoryFactGraph::new();

    if let Some(dictionary) = obj.get("dictionary") {
        let entries = dictionary.as_array().ok_or_else(|| FactError::Snapshot {
            path: "dictionary".to_string(),
            message: "dictionary must be an array of paths".to_string(),
        })?;
        for entry in entries {
            let raw = entry.as_str().ok_or_else(|| FactError::Snapshot {
                path: "dictionary".to_string(),
                message: format!("dictionary entries must be strings, got {}", entry),
            })?;
            let path = Path::parse(raw)?;
            graph.declare(path.as_str());
        }
    }

    if let Some(facts) = obj.get("facts") {
        let facts = facts.as_object().ok_or_else(|| FactError::Snapshot {
            path: "facts".to_string(),
            message: "facts must be an object keyed by concrete path".to_string(),
        })?;
        for (key, value) in facts {
            let path = ConcretePath::parse(key)?;
            let decoded = decode_fact(value).map_err(|message| FactError::Snapshot {
                path: key.clone(),
                message,
            })?;
            graph.insert(
                path,
                FactState {
                    value: decoded.value,
                    complete: decoded.complete,
                },
            );
        }
    }

    tracing::debug!(facts = graph.len(), "assembled fact snapshot");
    Ok(graph)
}

/// Read and assemble a snapshot file.
pub fn load_snapshot(path: &FsPath) -> Result<MemoryFactGraph, FactError> {
    let source = path.to_string_lossy().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| FactError::Snapshot {
        path: source.clone(),
        message: format!("cannot open file: {}", e),
    })?;
    let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| FactError::Snapshot {
        path: source,
        message: e.to_string(),
    })?;
    assemble_snapshot(&json)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
