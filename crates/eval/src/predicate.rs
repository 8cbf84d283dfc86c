//! Condition evaluator.
//!
//! Concretizes each condition's path against the item binding of the
//! query, reads the fact and applies the operator. Evaluation never writes
//! to the fact graph and never substitutes a default for an unknown fact.

use screenflow_core::{ChainLink, Condition, ItemBinding};

use crate::fact_graph::FactGraph;
use crate::provenance::ProvenanceCollector;
use crate::types::FactError;

/// Evaluate one condition under `binding`.
pub fn eval_condition(
    condition: &Condition,
    facts: &dyn FactGraph,
    binding: &ItemBinding,
    collector: &mut ProvenanceCollector,
) -> Result<bool, FactError> {
    let path = condition.path.concretize(binding)?;
    let state = facts.get(&path)?;
    collector.record_fact(&path, &state);
    let result = condition
        .operator
        .apply(state.has_value(), state.complete, state.is_truthy());
    collector.record_outcome(condition, &path, result);
    Ok(result)
}

/// AND over a list, short-circuiting on the first false. Empty is true.
pub fn eval_all(
    conditions: &[Condition],
    facts: &dyn FactGraph,
    binding: &ItemBinding,
    collector: &mut ProvenanceCollector,
) -> Result<bool, FactError> {
    for condition in conditions {
        if !eval_condition(condition, facts, binding, collector)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// OR over a list, short-circuiting on the first true. Empty is false.
pub fn eval_any(
    conditions: &[Condition],
    facts: &dyn FactGraph,
    binding: &ItemBinding,
    collector: &mut ProvenanceCollector,
) -> Result<bool, FactError> {
    for condition in conditions {
        if eval_condition(condition, facts, binding, collector)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Evaluate an ancestor-chain link. The link sees only the items bound at
/// its own declaration depth.
pub fn eval_link(
    link: &ChainLink,
    facts: &dyn FactGraph,
    binding: &ItemBinding,
    collector: &mut ProvenanceCollector,
) -> Result<bool, FactError> {
    eval_condition(
        &link.condition,
        facts,
        &binding.truncated(link.depth),
        collector,
    )
}

/// AND over a chain of links, short-circuiting.
pub fn eval_chain(
    chain: &[ChainLink],
    facts: &dyn FactGraph,
    binding: &ItemBinding,
    collector: &mut ProvenanceCollector,
) -> Result<bool, FactError> {
    for link in chain {
        if !eval_link(link, facts, binding, collector)? {
            return Ok(false);
        }
    }
    Ok(true)
}
