//! Visibility explanations: why a screen is, or is not, navigable.

use serde::Serialize;

use screenflow_core::Condition;

use super::{Navigator, Position};
use crate::fact_graph::FactGraph;
use crate::predicate::eval_link;
use crate::provenance::{ConditionOutcome, ConsultedFact, ProvenanceCollector};
use crate::types::NavError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkReport {
    pub condition: Condition,
    /// Binding depth the link was declared at.
    pub depth: usize,
    pub site: String,
    pub result: bool,
    pub facts: Vec<ConsultedFact>,
    /// Each condition evaluated for the link, against its concrete path.
    pub outcomes: Vec<ConditionOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub position: Position,
    pub site: String,
    pub wildcard_depth: usize,
    pub is_knockout: bool,
    pub route_automatically: bool,
    pub hub_for: Option<String>,
    pub links: Vec<LinkReport>,
    /// Whether next/previous can land here.
    pub visible: bool,
    pub live_knockout: bool,
}

impl<'a> Navigator<'a> {
    /// Evaluate every link of the positioned screen's ancestor chain.
    ///
    /// Unlike navigation this does not short-circuit: each link is
    /// reported with the facts it read.
    pub fn explain(&self, position: &Position, facts: &dyn FactGraph) -> Result<Explanation, NavError> {
        let entry = self.resolve(position)?;
        let mut links = Vec::with_capacity(entry.chain.len());
        let mut collector = ProvenanceCollector::new();
        for link in &entry.chain {
            let result = eval_link(link, facts, &position.binding, &mut collector)?;
            let (consulted, outcomes) = collector.drain();
            links.push(LinkReport {
                condition: link.condition.clone(),
                depth: link.depth,
                site: link.site.to_string(),
                result,
                facts: consulted,
                outcomes,
            });
        }

        let holds = links.iter().all(|l| l.result);
        let routed = entry.route_automatically || !self.config().honor_route_automatically;
        Ok(Explanation {
            position: position.clone(),
            site: entry.site.to_string(),
            wildcard_depth: entry.wildcard_depth(),
            is_knockout: entry.is_knockout,
            route_automatically: entry.route_automatically,
            hub_for: entry.hub_for.clone(),
            links,
            visible: holds && routed,
            live_knockout: holds && entry.is_knockout,
        })
    }
}
