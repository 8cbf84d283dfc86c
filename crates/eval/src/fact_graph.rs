//! Fact graph interface and an in-memory implementation.
//!
//! The navigator only ever reads facts. A `FactGraph` answers two
//! questions about a concrete path: what is its state, and (for
//! collections) which items does it list.

use std::collections::{BTreeMap, BTreeSet};

use screenflow_core::{ConcretePath, ItemId};

use crate::types::{FactError, FactState, Value};

// ──────────────────────────────────────────────
// Trait
// ──────────────────────────────────────────────

/// Read-only access to path-addressable facts.
pub trait FactGraph {
    /// State of the fact at `path`. Unknown paths are an error, never a
    /// default.
    fn get(&self, path: &ConcretePath) -> Result<FactState, FactError>;

    /// Ordered member ids of the collection at `path`.
    ///
    /// The default reads the fact and expects a collection value; an
    /// unanswered collection lists nothing.
    fn collection_items(&self, path: &ConcretePath) -> Result<Vec<ItemId>, FactError> {
        match self.get(path)?.value {
            None => Ok(Vec::new()),
            Some(Value::Collection(items)) => Ok(items),
            Some(other) => Err(FactError::NotACollection {
                path: path.to_string(),
                found: other.type_name(),
            }),
        }
    }
}

// ──────────────────────────────────────────────
// MemoryFactGraph
// ──────────────────────────────────────────────

/// A fact graph backed by a fixed snapshot.
///
/// Knows a fact if the snapshot has an entry for its concrete path, or if
/// its abstract form (item segments replaced by `*`) is in the dictionary;
/// the latter read as unanswered.
#[derive(Debug, Clone, Default)]
pub struct MemoryFactGraph {
    dictionary: BTreeSet<String>,
    facts: BTreeMap<ConcretePath, FactState>,
}

impl MemoryFactGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an abstract path (e.g. `/formW2s/*/hasBox2`) as known.
    pub fn declare(&mut self, abstract_path: &str) {
        self.dictionary.insert(abstract_path.to_string());
    }

    pub fn insert(&mut self, path: ConcretePath, state: FactState) {
        self.dictionary.insert(path.abstract_form());
        self.facts.insert(path, state);
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FactGraph for MemoryFactGraph {
    fn get(&self, path: &ConcretePath) -> Result<FactState, FactError> {
        if let Some(state) = self.facts.get(path) {
            return Ok(state.clone());
        }
        if self.dictionary.contains(&path.abstract_form()) {
            return Ok(FactState::unanswered());
        }
        Err(FactError::UnknownFact {
            path: path.to_string(),
        })
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn cp(raw: &str) -> ConcretePath {
        ConcretePath::parse(raw).unwrap()
    }

    #[test]
    fn known_facts_and_dictionary_defaults() {
        let mut graph = MemoryFactGraph::new();
        graph.declare("/formW2s/*/hasBox2");
        graph.insert(cp("/flowKnockout"), FactState::complete(Value::Bool(true)));

        let ko = graph.get(&cp("/flowKnockout")).unwrap();
        assert!(ko.complete && ko.is_truthy());

        let unanswered = graph.get(&cp("/formW2s/#w2-A/hasBox2")).unwrap();
        assert!(!unanswered.has_value());
        assert!(!unanswered.complete);
    }

    #[test]
    fn unknown_fact_is_an_error() {
        let graph = MemoryFactGraph::new();
        let err = graph.get(&cp("/nope")).unwrap_err();
        assert_eq!(
            err,
            FactError::UnknownFact {
                path: "/nope".to_string()
            }
        );
    }

    #[test]
    fn collection_listing() {
        let mut graph = MemoryFactGraph::new();
        graph.insert(
            cp("/formW2s"),
            FactState::complete(Value::Collection(vec!["a".into(), "b".into()])),
        );
        graph.insert(cp("/name"), FactState::complete(Value::Text("x".into())));
        graph.declare("/dependents");

        let items = graph.collection_items(&cp("/formW2s")).unwrap();
        assert_eq!(items, vec![ItemId::new("a"), ItemId::new("b")]);
        assert!(graph.collection_items(&cp("/dependents")).unwrap().is_empty());
        assert!(matches!(
            graph.collection_items(&cp("/name")),
            Err(FactError::NotACollection { .. })
        ));
    }

    #[test]
    fn inserting_declares_abstract_form() {
        let mut graph = MemoryFactGraph::new();
        graph.insert(
            cp("/formW2s/#a/wages"),
            FactState::complete(Value::Int(1)),
        );
        assert!(!graph.get(&cp("/formW2s/#b/wages")).unwrap().has_value());
    }
}
