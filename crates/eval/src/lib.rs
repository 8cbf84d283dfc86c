//! Screenflow navigator: answers next/previous/section queries against a
//! compiled Screen Index and a fact graph.
//!
//! The navigator consumes a compiled [`ScreenIndex`] (not the raw flow
//! declaration), reads facts through the [`FactGraph`] trait, and keeps
//! no state of its own between queries.

pub mod assemble;
pub mod config;
pub mod fact_graph;
pub mod navigator;
pub mod predicate;
pub mod provenance;
pub mod types;

pub use assemble::{assemble_snapshot, load_snapshot};
pub use config::{NavigatorConfig, DEFAULT_MAX_WALK_STEPS};
pub use fact_graph::{FactGraph, MemoryFactGraph};
pub use navigator::{
    ActiveAssertion, BackOutcome, ChecklistEntry, Destination, Explanation, LinkReport, NavOutcome,
    Navigator, Position, Walk, WalkEnd,
};
pub use provenance::{ConditionOutcome, ConsultedFact, ProvenanceCollector};
pub use types::{FactError, FactState, NavError, Value};

use screenflow_core::ScreenIndex;

/// Answer `next` for one position against a JSON fact snapshot.
///
/// Convenience for callers that hold a snapshot document rather than a
/// fact graph of their own.
pub fn next_from_snapshot(
    index: &ScreenIndex,
    config: &NavigatorConfig,
    snapshot: &serde_json::Value,
    position: &Position,
) -> Result<NavOutcome, NavError> {
    let facts = assemble_snapshot(snapshot)?;
    Navigator::new(index, config).next(position, &facts)
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use super::*;
    use screenflow_core::{compile_str, ItemBinding};

    const FLOW: &str = r#"{
      "children": [{
        "kind": "category", "route": "you",
        "children": [{
          "kind": "subcategory", "route": "filing-status",
          "children": [
            { "kind": "screen", "route": "status" },
            { "kind": "screen", "route": "mfs-ko", "isKnockout": true,
              "condition": { "operator": "isTrueAndComplete", "condition": "/filingStatusIsMfs" } },
            { "kind": "screen", "route": "dependents" }
          ]
        }]
      }]
    }"#;

    #[test]
    fn next_from_snapshot_end_to_end() {
        let index = compile_str(FLOW, "status.json").unwrap();
        let config = NavigatorConfig::default();
        let snapshot = serde_json::json!({
            "facts": {
                "/filingStatusIsMfs": {
                    "$type": "gov.irs.factgraph.persisters.BooleanWrapper",
                    "item": true
                }
            }
        });
        let outcome = next_from_snapshot(
            &index,
            &config,
            &snapshot,
            &Position::top("/flow/you/filing-status/status"),
        )
        .unwrap();
        let dest = outcome.destination().unwrap();
        assert_eq!(dest.position.route, "/flow/you/filing-status/mfs-ko");
        assert!(dest.terminal);
    }

    #[test]
    fn placeholder_does_not_trigger_complete_knockout() {
        let index = compile_str(FLOW, "status.json").unwrap();
        let config = NavigatorConfig::default();
        let snapshot = serde_json::json!({
            "facts": {
                "/filingStatusIsMfs": {
                    "$type": "gov.irs.factgraph.persisters.BooleanWrapper",
                    "item": true,
                    "complete": false
                }
            }
        });
        let outcome = next_from_snapshot(
            &index,
            &config,
            &snapshot,
            &Position::new("/flow/you/filing-status/status", ItemBinding::none()),
        )
        .unwrap();
        assert_eq!(
            outcome.destination().unwrap().position.route,
            "/flow/you/filing-status/dependents"
        );
    }

    #[test]
    fn bad_snapshot_is_a_fact_error() {
        let index = compile_str(FLOW, "status.json").unwrap();
        let config = NavigatorConfig::default();
        let err = next_from_snapshot(
            &index,
            &config,
            &serde_json::json!([]),
            &Position::top("/flow/you/filing-status/status"),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "fact_error");
    }
}
