//! The compiled Screen Index.
//!
//! Built once from a [`FlowDeclaration`](crate::ast::FlowDeclaration) and
//! shared read-only afterwards. Every screen appears exactly once, in
//! document order, with the conditions of every ancestor that gates it.
//! Collection loops and collection-context sections become [`Scope`]s; the
//! [`LayoutNode`] tree records where each scope's body sits so a navigator
//! can expand it once per collection item.

use std::collections::HashMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ast::AssertionKind;
use crate::condition::Condition;
use crate::error::DeclSite;
use crate::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScreenId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SectionId(pub usize);

// ──────────────────────────────────────────────
// Entries
// ──────────────────────────────────────────────

/// One visibility condition inherited by a screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainLink {
    pub condition: Condition,
    /// Binding depth at the link's declaration site.
    pub depth: usize,
    pub site: DeclSite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenEntry {
    pub id: ScreenId,
    /// `/flow/<category>/<subcategory>[/<subsubcategory>]/<screen>`
    pub route: String,
    pub local_route: String,
    pub category: String,
    pub subcategory: String,
    pub subsubcategory: Option<String>,
    /// Gate conditions outermost first, then the screen's own.
    pub chain: Vec<ChainLink>,
    pub is_knockout: bool,
    pub route_automatically: bool,
    /// Loop name from `hubFor`, as declared.
    pub hub_for: Option<String>,
    /// Enclosing scopes, outermost first.
    pub scopes: Vec<ScopeId>,
    /// Innermost enclosing section.
    pub section: SectionId,
    pub site: DeclSite,
}

impl ScreenEntry {
    /// Number of item ids a position on this screen must carry.
    pub fn wildcard_depth(&self) -> usize {
        self.scopes.len()
    }
}

// ──────────────────────────────────────────────
// Scopes
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopScope {
    pub loop_name: String,
    pub completed: Option<Condition>,
    pub done_path: Option<Path>,
    pub auto_iterate: bool,
    pub is_inner: bool,
    /// Screen declaring `hubFor` this loop, once linked.
    pub hub: Option<ScreenId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScopeKind {
    Loop(LoopScope),
    Context { section: SectionId },
}

/// A binding level: a collection loop or a collection-context section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub collection: Path,
    /// Number of scopes enclosing this one.
    pub depth: usize,
    pub parent: Option<ScopeId>,
    pub site: DeclSite,
}

impl Scope {
    pub fn as_loop(&self) -> Option<&LoopScope> {
        match &self.kind {
            ScopeKind::Loop(l) => Some(l),
            ScopeKind::Context { .. } => None,
        }
    }

    /// Binding depth inside the scope's body.
    pub fn body_depth(&self) -> usize {
        self.depth + 1
    }
}

// ──────────────────────────────────────────────
// Sections and assertions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLevel {
    Category,
    Subcategory,
    SubSubcategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub level: SectionLevel,
    /// `/flow/<category>[/<subcategory>[/<subsubcategory>]]`
    pub route: String,
    pub local_route: String,
    pub complete_if: Vec<Condition>,
    pub display_only_if: Vec<Condition>,
    /// Scope introduced by `collectionContext`.
    pub context: Option<ScopeId>,
    /// Binding depth inside the section.
    pub depth: usize,
    pub parent: Option<SectionId>,
    /// Loops whose nearest enclosing section is this one.
    pub loops: Vec<ScopeId>,
    pub site: DeclSite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionEntry {
    pub section: SectionId,
    pub kind: AssertionKind,
    pub i18n_key: String,
    pub edit_route: Option<String>,
    /// Enclosing gate conditions followed by the assertion's own.
    pub chain: Vec<ChainLink>,
    pub depth: usize,
    pub site: DeclSite,
}

// ──────────────────────────────────────────────
// Layout
// ──────────────────────────────────────────────

/// Traversal skeleton: screens in document order, scope bodies nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutNode {
    Screen { id: ScreenId },
    Scope { id: ScopeId, body: Vec<LayoutNode> },
}

// ──────────────────────────────────────────────
// Index
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenIndex {
    pub(crate) entries: Vec<ScreenEntry>,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) sections: Vec<Section>,
    pub(crate) assertions: Vec<AssertionEntry>,
    pub(crate) layout: Vec<LayoutNode>,
    #[serde(skip)]
    pub(crate) by_route: HashMap<String, ScreenId>,
    #[serde(skip)]
    pub(crate) loops_by_name: HashMap<String, ScopeId>,
    #[serde(skip)]
    pub(crate) sections_by_route: HashMap<String, SectionId>,
}

impl ScreenIndex {
    pub fn entries(&self) -> &[ScreenEntry] {
        &self.entries
    }

    pub fn entry(&self, id: ScreenId) -> &ScreenEntry {
        &self.entries[id.0]
    }

    pub fn lookup(&self, route: &str) -> Option<&ScreenEntry> {
        self.by_route.get(route).map(|id| self.entry(*id))
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn loop_named(&self, name: &str) -> Option<&Scope> {
        self.loops_by_name.get(name).map(|id| self.scope(*id))
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    pub fn section_by_route(&self, route: &str) -> Option<&Section> {
        self.sections_by_route.get(route).map(|id| self.section(*id))
    }

    pub fn assertions(&self) -> &[AssertionEntry] {
        &self.assertions
    }

    pub fn layout(&self) -> &[LayoutNode] {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scopes enclosing `scope`, outermost first, `scope` included.
    pub fn scope_chain(&self, scope: ScopeId) -> Vec<ScopeId> {
        let mut chain = vec![scope];
        let mut cur = self.scope(scope).parent;
        while let Some(id) = cur {
            chain.push(id);
            cur = self.scope(id).parent;
        }
        chain.reverse();
        chain
    }

    /// SHA-256 over the canonical entry listing, hex encoded.
    ///
    /// Two compilations of the same declaration produce the same
    /// fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            hasher.update(entry.route.as_bytes());
            hasher.update(b"|");
            hasher.update(entry.wildcard_depth().to_string().as_bytes());
            hasher.update(if entry.is_knockout { b"|ko" } else { b"|--" });
            hasher.update(if entry.route_automatically {
                b"|auto"
            } else {
                b"|link"
            });
            if let Some(hub) = &entry.hub_for {
                hasher.update(b"|hub:");
                hasher.update(hub.as_bytes());
            }
            for link in &entry.chain {
                hasher.update(format!("|{}@{}", link.condition, link.depth).as_bytes());
            }
            for scope in &entry.scopes {
                let scope = self.scope(*scope);
                hasher.update(format!("|in:{}", scope.collection).as_bytes());
            }
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}
