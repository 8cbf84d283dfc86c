//! Per-query expansion of the layout into screen instances.
//!
//! Every scope body is repeated once per item in play. The expansion is
//! rebuilt from live facts on every query, so the navigator keeps no loop
//! cursor of its own: the item after the anchored one is simply the next
//! unfinished item the expansion places after it.

use screenflow_core::{
    ItemBinding, ItemId, LayoutNode, Scope, ScopeId, ScopeKind, ScreenEntry, ScreenId, ScreenIndex,
};

use crate::fact_graph::FactGraph;
use crate::predicate::eval_condition;
use crate::provenance::ProvenanceCollector;
use crate::types::{FactError, NavError};

/// One element of the expanded sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Screen { id: ScreenId, binding: ItemBinding },
    /// Emitted after the last item of a loop, under the loop's outer
    /// binding.
    LeaveLoop { scope: ScopeId, outer: ItemBinding },
}

/// Which items of each scope the expansion visits, and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sweep {
    /// Items in play, in listing order.
    Listing,
    /// Items in play, with the anchored item's loop continuing after it
    /// and wrapping round to unfinished items listed before it.
    FromAnchor,
    /// Every listed item of every scope, finished or not.
    Exhaustive,
}

/// The screen instance a query is positioned on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Anchor<'a> {
    pub entry: &'a ScreenEntry,
    pub binding: &'a ItemBinding,
}

impl<'a> Anchor<'a> {
    /// Item the anchor is bound to in `scope`, if the anchor sits inside
    /// `scope` under `outer`.
    pub fn item_in(&self, scope: &Scope, outer: &ItemBinding) -> Option<&'a ItemId> {
        if self.entry.scopes.get(scope.depth) != Some(&scope.id) {
            return None;
        }
        if self.binding.truncated(scope.depth) != *outer {
            return None;
        }
        self.binding.at(scope.depth)
    }

    /// True if the anchor sits inside loop `scope` bound under `outer`.
    pub fn is_inside(&self, scope: ScopeId, outer: &ItemBinding) -> bool {
        self.entry.scopes.contains(&scope) && outer.is_prefix_of(self.binding)
    }

    pub fn matches(&self, step: &Step) -> bool {
        matches!(step, Step::Screen { id, binding }
            if *id == self.entry.id && binding == self.binding)
    }
}

pub(crate) struct Expander<'a> {
    index: &'a ScreenIndex,
    facts: &'a dyn FactGraph,
    anchor: Option<Anchor<'a>>,
    sweep: Sweep,
    collector: ProvenanceCollector,
}

impl<'a> Expander<'a> {
    pub fn new(
        index: &'a ScreenIndex,
        facts: &'a dyn FactGraph,
        anchor: Option<Anchor<'a>>,
        sweep: Sweep,
    ) -> Self {
        Expander {
            index,
            facts,
            anchor,
            sweep,
            collector: ProvenanceCollector::disabled(),
        }
    }

    /// Expand the whole flow.
    pub fn expand(mut self) -> Result<Vec<Step>, NavError> {
        let mut out = Vec::new();
        let index = self.index;
        self.nodes(index.layout(), &ItemBinding::none(), &mut out)?;
        Ok(out)
    }

    fn nodes(
        &mut self,
        nodes: &[LayoutNode],
        binding: &ItemBinding,
        out: &mut Vec<Step>,
    ) -> Result<(), NavError> {
        for node in nodes {
            match node {
                LayoutNode::Screen { id } => out.push(Step::Screen {
                    id: *id,
                    binding: binding.clone(),
                }),
                LayoutNode::Scope { id, body } => {
                    let scope = self.index.scope(*id);
                    for item in self.in_play(scope, binding)? {
                        self.nodes(body, &binding.pushed(item), out)?;
                    }
                    if scope.as_loop().is_some() {
                        out.push(Step::LeaveLoop {
                            scope: *id,
                            outer: binding.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Items of `scope` the expansion visits under `outer`.
    ///
    /// Loops visit every listed item that has not satisfied the loop's
    /// completion condition, plus the anchored item. Collection contexts
    /// visit the anchored item, or the first listed item when the anchor
    /// is elsewhere. An exhaustive sweep visits every listed item.
    pub fn in_play(&mut self, scope: &Scope, outer: &ItemBinding) -> Result<Vec<ItemId>, NavError> {
        let collection = scope.collection.concretize(outer).map_err(FactError::from)?;
        let listing = self.facts.collection_items(&collection)?;
        let anchored = self.anchor.and_then(|a| a.item_in(scope, outer));

        if let Some(item) = anchored {
            if !listing.contains(item) {
                return Err(NavError::UnknownItem {
                    item: item.to_string(),
                    collection: collection.to_string(),
                });
            }
        }
        if self.sweep == Sweep::Exhaustive {
            return Ok(listing);
        }

        let lp = match &scope.kind {
            ScopeKind::Context { .. } => {
                return Ok(anchored
                    .cloned()
                    .or_else(|| listing.first().cloned())
                    .into_iter()
                    .collect())
            }
            ScopeKind::Loop(lp) => lp,
        };
        let Some(condition) = &lp.completed else {
            return Ok(listing);
        };

        let mut items = Vec::with_capacity(listing.len());
        for item in &listing {
            if anchored == Some(item) {
                items.push(item.clone());
                continue;
            }
            let finished = eval_condition(
                condition,
                self.facts,
                &outer.pushed(item.clone()),
                &mut self.collector,
            )?;
            if finished {
                tracing::trace!(loop_name = %lp.loop_name, item = %item, "item finished");
            } else {
                items.push(item.clone());
            }
        }

        if let (Sweep::FromAnchor, Some(item)) = (self.sweep, anchored) {
            if let Some(at) = items.iter().position(|i| i == item) {
                items.rotate_left(at);
            }
        }
        Ok(items)
    }
}
