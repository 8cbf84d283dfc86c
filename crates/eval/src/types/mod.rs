//! Runtime value types and error types for the navigator.
//!
//! These types are distinct from screenflow-core's declaration types: the
//! core crate knows paths and conditions, this crate knows what the fact
//! graph says about them.

pub mod fact;
pub mod values;

use screenflow_core::PathError;

pub use fact::FactState;
pub use values::Value;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors reading from a fact graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactError {
    /// The path is not known to the fact graph.
    #[error("unknown fact: {path}")]
    UnknownFact { path: String },

    /// A collection listing was requested for a non-collection fact.
    #[error("fact '{path}' is a {found}, not a collection")]
    NotACollection { path: String, found: &'static str },

    /// A declared path could not be concretized.
    #[error(transparent)]
    Path(#[from] PathError),

    /// A fact snapshot could not be decoded.
    #[error("invalid fact snapshot entry '{path}': {message}")]
    Snapshot { path: String, message: String },
}

/// Errors answering a navigation query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// No screen has this route.
    #[error("unknown route: {route}")]
    UnknownRoute { route: String },

    /// The position carries fewer item ids than the screen's scopes need.
    #[error("'{route}' needs {expected} collection item id(s), got {got}")]
    MissingItemBinding {
        route: String,
        expected: usize,
        got: usize,
    },

    /// The position carries more item ids than the screen's scopes need.
    #[error("'{route}' takes {expected} collection item id(s), got {got}")]
    UnexpectedItemBinding {
        route: String,
        expected: usize,
        got: usize,
    },

    /// A bound item is not (or no longer) listed in its collection.
    #[error("item '{item}' is not in collection '{collection}'")]
    UnknownItem { item: String, collection: String },

    /// No section has this route.
    #[error("unknown section: {section}")]
    UnknownSection { section: String },

    /// A walk did not settle within the configured number of steps.
    #[error("walk exceeded {limit} steps")]
    WalkLimitExceeded { limit: usize },

    #[error(transparent)]
    Fact(#[from] FactError),
}

impl NavError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            NavError::UnknownRoute { .. } => "unknown_route",
            NavError::MissingItemBinding { .. } => "missing_item_binding",
            NavError::UnexpectedItemBinding { .. } => "unexpected_item_binding",
            NavError::UnknownItem { .. } => "unknown_item",
            NavError::UnknownSection { .. } => "unknown_section",
            NavError::WalkLimitExceeded { .. } => "walk_limit_exceeded",
            NavError::Fact(FactError::UnknownFact { .. }) => "unknown_fact",
            NavError::Fact(_) => "fact_error",
        }
    }

    /// Serialize for JSON error output.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":    self.kind(),
            "message": self.to_string(),
        })
    }
}
