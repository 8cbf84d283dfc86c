//! Records which facts a condition evaluation consulted.
//!
//! Navigation queries run with a disabled collector; explanations run with
//! an enabled one and report every concrete fact read and every condition
//! outcome.

use serde::Serialize;

use screenflow_core::{ConcretePath, Condition};

use crate::types::FactState;

/// One concrete fact read during evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultedFact {
    pub path: ConcretePath,
    pub has_value: bool,
    pub complete: bool,
    pub value: Option<serde_json::Value>,
}

/// Result of one condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionOutcome {
    pub condition: Condition,
    pub path: ConcretePath,
    pub result: bool,
}

/// Collector that tracks fact reads and condition outcomes.
#[derive(Debug, Clone)]
pub struct ProvenanceCollector {
    enabled: bool,
    pub facts_used: Vec<ConsultedFact>,
    pub outcomes: Vec<ConditionOutcome>,
}

impl Default for ProvenanceCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvenanceCollector {
    pub fn new() -> Self {
        ProvenanceCollector {
            enabled: true,
            facts_used: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    /// A collector that records nothing.
    pub fn disabled() -> Self {
        ProvenanceCollector {
            enabled: false,
            ..Self::new()
        }
    }

    /// Record a fact read. Repeat reads of one path are kept once.
    pub fn record_fact(&mut self, path: &ConcretePath, state: &FactState) {
        if !self.enabled || self.facts_used.iter().any(|f| &f.path == path) {
            return;
        }
        self.facts_used.push(ConsultedFact {
            path: path.clone(),
            has_value: state.has_value(),
            complete: state.complete,
            value: state.value.as_ref().map(|v| v.to_json()),
        });
    }

    pub fn record_outcome(&mut self, condition: &Condition, path: &ConcretePath, result: bool) {
        if !self.enabled {
            return;
        }
        self.outcomes.push(ConditionOutcome {
            condition: condition.clone(),
            path: path.clone(),
            result,
        });
    }

    /// Take everything recorded so far, leaving the collector empty.
    pub fn drain(&mut self) -> (Vec<ConsultedFact>, Vec<ConditionOutcome>) {
        (
            std::mem::take(&mut self.facts_used),
            std::mem::take(&mut self.outcomes),
        )
    }
}
