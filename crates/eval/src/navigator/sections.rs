//! Section queries for summary views: completion, display and assertions.

use serde::Serialize;

use screenflow_core::{AssertionKind, ItemBinding, Scope, Section, SectionLevel};

use super::expand::{Expander, Sweep};
use super::Navigator;
use crate::fact_graph::FactGraph;
use crate::predicate::{eval_all, eval_any, eval_chain, eval_condition};
use crate::provenance::ProvenanceCollector;
use crate::types::NavError;

/// An assertion whose conditions hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAssertion {
    #[serde(rename = "type")]
    pub kind: AssertionKind,
    pub i18n_key: String,
    pub edit_route: Option<String>,
}

/// One row of the flow checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistEntry {
    pub route: String,
    pub level: SectionLevel,
    pub displayed: bool,
    pub complete: bool,
}

impl<'a> Navigator<'a> {
    /// Look up a section by route and check the binding fits it.
    pub fn resolve_section(
        &self,
        route: &str,
        binding: &ItemBinding,
    ) -> Result<&'a Section, NavError> {
        let section = self
            .index()
            .section_by_route(route)
            .ok_or_else(|| NavError::UnknownSection {
                section: route.to_string(),
            })?;
        let got = binding.depth();
        if got < section.depth {
            return Err(NavError::MissingItemBinding {
                route: route.to_string(),
                expected: section.depth,
                got,
            });
        }
        if got > section.depth {
            return Err(NavError::UnexpectedItemBinding {
                route: route.to_string(),
                expected: section.depth,
                got,
            });
        }
        Ok(section)
    }

    /// Is the section complete?
    ///
    /// Uses `completeIf` when declared. Otherwise the section is complete
    /// when every loop declared directly in it is finished.
    pub fn section_complete(
        &self,
        route: &str,
        facts: &dyn FactGraph,
        binding: &ItemBinding,
    ) -> Result<bool, NavError> {
        let section = self.resolve_section(route, binding)?;
        let mut collector = ProvenanceCollector::disabled();
        if !section.complete_if.is_empty() {
            return Ok(eval_all(&section.complete_if, facts, binding, &mut collector)?);
        }
        for scope in &section.loops {
            let scope = self.index().scope(*scope);
            if scope.depth != section.depth {
                continue;
            }
            if !self.loop_finished(scope, binding, facts)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// A loop is finished when no item is in play and its `donePath`, if
    /// declared, is true.
    fn loop_finished(
        &self,
        scope: &Scope,
        outer: &ItemBinding,
        facts: &dyn FactGraph,
    ) -> Result<bool, NavError> {
        let in_play = Expander::new(self.index(), facts, None, Sweep::Listing).in_play(scope, outer)?;
        if !in_play.is_empty() {
            return Ok(false);
        }
        match scope.as_loop().and_then(|lp| lp.done_path.as_ref()) {
            Some(done) => Ok(eval_condition(
                &screenflow_core::Condition::is_true(done.clone()),
                facts,
                outer,
                &mut ProvenanceCollector::disabled(),
            )?),
            None => Ok(true),
        }
    }

    /// Should a summary view show the section? `displayOnlyIf` holds when
    /// any of its conditions holds; no `displayOnlyIf` means always.
    pub fn section_displayed(
        &self,
        route: &str,
        facts: &dyn FactGraph,
        binding: &ItemBinding,
    ) -> Result<bool, NavError> {
        let section = self.resolve_section(route, binding)?;
        if section.display_only_if.is_empty() {
            return Ok(true);
        }
        let mut collector = ProvenanceCollector::disabled();
        Ok(eval_any(
            &section.display_only_if,
            facts,
            binding,
            &mut collector,
        )?)
    }

    /// Assertions declared in the section (outside its loops) whose
    /// conditions all hold.
    pub fn assertions(
        &self,
        route: &str,
        facts: &dyn FactGraph,
        binding: &ItemBinding,
    ) -> Result<Vec<ActiveAssertion>, NavError> {
        let section = self.resolve_section(route, binding)?;
        let mut collector = ProvenanceCollector::disabled();
        let mut active = Vec::new();
        for assertion in self.index().assertions() {
            if assertion.section != section.id || assertion.depth != section.depth {
                continue;
            }
            if eval_chain(&assertion.chain, facts, binding, &mut collector)? {
                active.push(ActiveAssertion {
                    kind: assertion.kind,
                    i18n_key: assertion.i18n_key.clone(),
                    edit_route: assertion.edit_route.clone(),
                });
            }
        }
        Ok(active)
    }

    /// Categories and subcategories in document order, skipping those that
    /// need an item binding.
    pub fn checklist(&self, facts: &dyn FactGraph) -> Result<Vec<ChecklistEntry>, NavError> {
        let none = ItemBinding::none();
        let mut rows = Vec::new();
        for section in self.index().sections() {
            if section.level == SectionLevel::SubSubcategory || section.depth != 0 {
                continue;
            }
            rows.push(ChecklistEntry {
                route: section.route.clone(),
                level: section.level,
                displayed: self.section_displayed(&section.route, facts, &none)?,
                complete: self.section_complete(&section.route, facts, &none)?,
            });
        }
        Ok(rows)
    }
}
