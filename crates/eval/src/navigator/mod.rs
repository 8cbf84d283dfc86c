//! Navigator: the runtime query surface over a compiled Screen Index.
//!
//! Every query is answered from the index and the fact graph it is given;
//! nothing is cached between queries, so the same facts always produce the
//! same answer and a changed fact is seen by the very next query.
//!
//! Forward navigation expands the layout into screen instances (see
//! [`expand`]) and scans for the first instance after the current one
//! whose whole ancestor chain holds. Within the current loop the scan
//! moves on to the next unfinished item, wrapping round to unfinished
//! items listed earlier. Knockout screens stop forward progress while
//! their condition holds. Leaving a loop the query started inside
//! re-offers the loop's hub screen until the loop's `donePath` is true.

mod expand;
mod explain;
mod sections;

use std::collections::HashSet;

use serde::Serialize;

use screenflow_core::{ItemBinding, ScopeId, ScreenEntry, ScreenIndex};

use crate::config::NavigatorConfig;
use crate::fact_graph::FactGraph;
use crate::predicate::{eval_chain, eval_condition};
use crate::provenance::ProvenanceCollector;
use crate::types::NavError;

use expand::{Anchor, Expander, Step, Sweep};

pub use explain::{Explanation, LinkReport};
pub use sections::{ActiveAssertion, ChecklistEntry};

// ──────────────────────────────────────────────
// Query and result types
// ──────────────────────────────────────────────

/// A screen instance: canonical route plus the collection items it is
/// bound to, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub route: String,
    #[serde(rename = "items")]
    pub binding: ItemBinding,
}

impl Position {
    pub fn new(route: impl Into<String>, binding: ItemBinding) -> Self {
        Position {
            route: route.into(),
            binding,
        }
    }

    /// A position on a screen outside every collection scope.
    pub fn top(route: impl Into<String>) -> Self {
        Position::new(route, ItemBinding::none())
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.binding.is_empty() {
            f.write_str(&self.route)
        } else {
            write!(f, "{} [{}]", self.route, self.binding)
        }
    }
}

/// A screen returned by forward navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    #[serde(flatten)]
    pub position: Position,
    /// A live knockout: forward navigation goes no further.
    pub terminal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum NavOutcome {
    Screen(Destination),
    End,
}

impl NavOutcome {
    pub fn destination(&self) -> Option<&Destination> {
        match self {
            NavOutcome::Screen(d) => Some(d),
            NavOutcome::End => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum BackOutcome {
    Screen(Position),
    Start,
}

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkEnd {
    /// Nothing follows the last screen.
    End,
    /// The last screen is a live knockout.
    Knockout,
    /// The next screen was already visited (a hub re-offer).
    Revisit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Walk {
    pub steps: Vec<Destination>,
    pub end: WalkEnd,
}

// ──────────────────────────────────────────────
// Navigator
// ──────────────────────────────────────────────

/// Stateless query surface over a compiled flow.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    index: &'a ScreenIndex,
    config: &'a NavigatorConfig,
}

impl<'a> Navigator<'a> {
    pub fn new(index: &'a ScreenIndex, config: &'a NavigatorConfig) -> Self {
        Navigator { index, config }
    }

    pub fn index(&self) -> &'a ScreenIndex {
        self.index
    }

    pub fn config(&self) -> &'a NavigatorConfig {
        self.config
    }

    /// Look up the position's screen and check its binding depth.
    pub fn resolve(&self, position: &Position) -> Result<&'a ScreenEntry, NavError> {
        let entry = self
            .index
            .lookup(&position.route)
            .ok_or_else(|| NavError::UnknownRoute {
                route: position.route.clone(),
            })?;
        let expected = entry.wildcard_depth();
        let got = position.binding.depth();
        if got < expected {
            return Err(NavError::MissingItemBinding {
                route: position.route.clone(),
                expected,
                got,
            });
        }
        if got > expected {
            return Err(NavError::UnexpectedItemBinding {
                route: position.route.clone(),
                expected,
                got,
            });
        }
        Ok(entry)
    }

    /// Does the screen's whole ancestor chain hold under `binding`?
    fn chain_holds(
        &self,
        entry: &ScreenEntry,
        binding: &ItemBinding,
        facts: &dyn FactGraph,
    ) -> Result<bool, NavError> {
        let mut collector = ProvenanceCollector::disabled();
        Ok(eval_chain(&entry.chain, facts, binding, &mut collector)?)
    }

    /// Can next/previous land on this instance?
    fn is_candidate(
        &self,
        entry: &ScreenEntry,
        binding: &ItemBinding,
        facts: &dyn FactGraph,
    ) -> Result<bool, NavError> {
        if self.config.honor_route_automatically && !entry.route_automatically {
            return Ok(false);
        }
        self.chain_holds(entry, binding, facts)
    }

    fn destination(&self, entry: &ScreenEntry, binding: &ItemBinding) -> Destination {
        Destination {
            position: Position::new(entry.route.clone(), binding.clone()),
            terminal: entry.is_knockout,
        }
    }

    /// Is the positioned screen a knockout whose condition holds?
    pub fn is_live_knockout(
        &self,
        position: &Position,
        facts: &dyn FactGraph,
    ) -> Result<bool, NavError> {
        let entry = self.resolve(position)?;
        Ok(entry.is_knockout && self.chain_holds(entry, &position.binding, facts)?)
    }

    /// First navigable screen of the flow.
    pub fn start(&self, facts: &dyn FactGraph) -> Result<NavOutcome, NavError> {
        let steps = Expander::new(self.index, facts, None, Sweep::Listing).expand()?;
        self.scan_forward(&steps, 0, None, facts)
    }

    /// Next navigable screen after `position`.
    pub fn next(&self, position: &Position, facts: &dyn FactGraph) -> Result<NavOutcome, NavError> {
        let entry = self.resolve(position)?;

        if entry.is_knockout && self.chain_holds(entry, &position.binding, facts)? {
            tracing::debug!(%position, "knockout holds; staying put");
            return Ok(NavOutcome::Screen(self.destination(entry, &position.binding)));
        }

        let anchor = Anchor {
            entry,
            binding: &position.binding,
        };
        let steps = Expander::new(self.index, facts, Some(anchor), Sweep::FromAnchor).expand()?;
        let at = locate(&steps, &anchor, position)?;
        let outcome = self.scan_forward(&steps, at + 1, Some(anchor), facts)?;
        tracing::debug!(%position, ?outcome, "next");
        Ok(outcome)
    }

    /// Previous navigable screen before `position`. Never knockout
    /// terminal.
    pub fn previous(
        &self,
        position: &Position,
        facts: &dyn FactGraph,
    ) -> Result<BackOutcome, NavError> {
        let entry = self.resolve(position)?;
        let anchor = Anchor {
            entry,
            binding: &position.binding,
        };
        let steps = Expander::new(self.index, facts, Some(anchor), Sweep::Listing).expand()?;
        let at = locate(&steps, &anchor, position)?;

        for step in steps[..at].iter().rev() {
            if let Step::Screen { id, binding } = step {
                let candidate = self.index.entry(*id);
                if self.is_candidate(candidate, binding, facts)? {
                    let found = Position::new(candidate.route.clone(), binding.clone());
                    tracing::debug!(%position, previous = %found, "previous");
                    return Ok(BackOutcome::Screen(found));
                }
                tracing::trace!(route = %candidate.route, items = %binding, "skip");
            }
        }
        tracing::debug!(%position, "previous: at start");
        Ok(BackOutcome::Start)
    }

    fn scan_forward(
        &self,
        steps: &[Step],
        from: usize,
        anchor: Option<Anchor<'_>>,
        facts: &dyn FactGraph,
    ) -> Result<NavOutcome, NavError> {
        for step in steps.iter().skip(from) {
            match step {
                Step::Screen { id, binding } => {
                    let candidate = self.index.entry(*id);
                    if self.is_candidate(candidate, binding, facts)? {
                        return Ok(NavOutcome::Screen(self.destination(candidate, binding)));
                    }
                    tracing::trace!(route = %candidate.route, items = %binding, "skip");
                }
                Step::LeaveLoop { scope, outer } => {
                    let started_inside = anchor.is_some_and(|a| a.is_inside(*scope, outer));
                    if !started_inside {
                        continue;
                    }
                    if let Some(hub) = self.hub_to_reoffer(*scope, outer, facts)? {
                        tracing::debug!(route = %hub.route, "re-offering hub");
                        return Ok(NavOutcome::Screen(self.destination(hub, outer)));
                    }
                }
            }
        }
        Ok(NavOutcome::End)
    }

    /// The hub of a loop being left, if the loop is not done with yet.
    ///
    /// Auto-iterating loops and loops without a `donePath` never re-offer.
    fn hub_to_reoffer(
        &self,
        scope: ScopeId,
        outer: &ItemBinding,
        facts: &dyn FactGraph,
    ) -> Result<Option<&'a ScreenEntry>, NavError> {
        let Some(lp) = self.index.scope(scope).as_loop() else {
            return Ok(None);
        };
        if lp.auto_iterate {
            return Ok(None);
        }
        let (Some(done_path), Some(hub)) = (&lp.done_path, lp.hub) else {
            return Ok(None);
        };
        let done = eval_condition(
            &screenflow_core::Condition::is_true(done_path.clone()),
            facts,
            outer,
            &mut ProvenanceCollector::disabled(),
        )?;
        if done {
            return Ok(None);
        }
        let hub = self.index.entry(hub);
        if self.chain_holds(hub, outer, facts)? {
            Ok(Some(hub))
        } else {
            Ok(None)
        }
    }

    /// Screens reached from `start` by repeated `next`.
    ///
    /// Stops at the end of the flow, at a live knockout, or when a screen
    /// would be visited twice. Fails with `WalkLimitExceeded` past the
    /// configured step limit.
    pub fn walk(&self, facts: &dyn FactGraph) -> Result<Walk, NavError> {
        let mut steps: Vec<Destination> = Vec::new();
        let mut seen: HashSet<Position> = HashSet::new();
        let mut outcome = self.start(facts)?;

        loop {
            let dest = match outcome {
                NavOutcome::End => {
                    return Ok(Walk {
                        steps,
                        end: WalkEnd::End,
                    })
                }
                NavOutcome::Screen(dest) => dest,
            };
            if !seen.insert(dest.position.clone()) {
                return Ok(Walk {
                    steps,
                    end: WalkEnd::Revisit,
                });
            }
            if steps.len() >= self.config.max_walk_steps {
                return Err(NavError::WalkLimitExceeded {
                    limit: self.config.max_walk_steps,
                });
            }
            if dest.terminal {
                steps.push(dest);
                return Ok(Walk {
                    steps,
                    end: WalkEnd::Knockout,
                });
            }
            outcome = self.next(&dest.position, facts)?;
            steps.push(dest);
        }
    }

    /// Has the user been knocked out?
    ///
    /// Scans every screen instance in document order, over every listed
    /// item of every collection whether finished or not, up to and
    /// including `reached` (the whole flow when `reached` is `None`).
    /// True at the first knockout whose ancestor chain holds.
    pub fn is_knocked_out(
        &self,
        facts: &dyn FactGraph,
        reached: Option<&Position>,
    ) -> Result<bool, NavError> {
        let anchor = match reached {
            Some(position) => Some(Anchor {
                entry: self.resolve(position)?,
                binding: &position.binding,
            }),
            None => None,
        };
        let steps = Expander::new(self.index, facts, anchor, Sweep::Exhaustive).expand()?;
        let end = match (&anchor, reached) {
            (Some(anchor), Some(position)) => locate(&steps, anchor, position)? + 1,
            _ => steps.len(),
        };

        for step in &steps[..end] {
            let Step::Screen { id, binding } = step else {
                continue;
            };
            let entry = self.index.entry(*id);
            if entry.is_knockout && self.chain_holds(entry, binding, facts)? {
                tracing::debug!(route = %entry.route, items = %binding, "live knockout");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Index of the anchored instance in the expansion.
fn locate(steps: &[Step], anchor: &Anchor<'_>, position: &Position) -> Result<usize, NavError> {
    steps
        .iter()
        .position(|s| anchor.matches(s))
        .ok_or_else(|| NavError::UnknownItem {
            item: position.binding.to_string(),
            collection: position.route.clone(),
        })
}
