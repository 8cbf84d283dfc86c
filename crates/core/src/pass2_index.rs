//! Pass 2: walk the declaration tree depth-first and build the Screen Index.
//!
//! Emits one entry per screen in document order, one scope per collection
//! loop or collection-context section, the section table, the assertion
//! table and the traversal layout. Structural placement and duplicate
//! routes and loop names are rejected here, while the walk still knows
//! each node's ancestry.

use std::collections::HashMap;

use crate::ast::*;
use crate::error::{DeclError, DeclSite};
use crate::index::*;
use crate::pass3_validate::check_depth;
use crate::path::Path;

pub fn build_index(decl: &FlowDeclaration) -> Result<ScreenIndex, DeclError> {
    let mut builder = Builder {
        index: ScreenIndex::default(),
        loop_sites: HashMap::new(),
    };
    let layout = builder.walk(&decl.children, &Ctx::default())?;
    builder.index.layout = layout;
    builder.link_hubs();
    Ok(builder.index)
}

/// Ancestry of the node being visited.
#[derive(Debug, Clone, Default)]
struct Ctx {
    site: DeclSite,
    category: Option<String>,
    subcategory: Option<String>,
    subsubcategory: Option<String>,
    level: Option<SectionLevel>,
    section: Option<SectionId>,
    chain: Vec<ChainLink>,
    scopes: Vec<ScopeId>,
}

impl Ctx {
    fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn section_route(&self) -> String {
        let mut route = String::from("/flow");
        for part in [&self.category, &self.subcategory, &self.subsubcategory]
            .into_iter()
            .flatten()
        {
            route.push('/');
            route.push_str(part);
        }
        route
    }

    fn screen_route(&self, local: &str) -> String {
        format!("{}/{}", self.section_route(), local)
    }

    /// True when the nearest enclosing section is a Subcategory or a
    /// SubSubcategory.
    fn in_subcategory(&self) -> bool {
        matches!(
            self.level,
            Some(SectionLevel::Subcategory) | Some(SectionLevel::SubSubcategory)
        )
    }
}

struct Builder {
    index: ScreenIndex,
    loop_sites: HashMap<String, DeclSite>,
}

fn misplaced(kind: &'static str, site: &DeclSite, message: &str) -> DeclError {
    DeclError::Misplaced {
        kind,
        site: site.clone(),
        message: message.to_string(),
    }
}

impl Builder {
    fn walk(&mut self, nodes: &[FlowNode], ctx: &Ctx) -> Result<Vec<LayoutNode>, DeclError> {
        let mut out = Vec::new();
        for node in nodes {
            let site = ctx.site.child(node.kind_name(), &node.label());
            match node {
                FlowNode::Category(section) => {
                    if ctx.level.is_some() || !ctx.scopes.is_empty() {
                        return Err(misplaced(
                            "category",
                            &site,
                            "categories must be declared at the top level of the flow",
                        ));
                    }
                    self.section(section, SectionLevel::Category, ctx, site, &mut out)?;
                }
                FlowNode::Subcategory(section) => {
                    if ctx.level != Some(SectionLevel::Category) {
                        return Err(misplaced(
                            "subcategory",
                            &site,
                            "subcategories must be declared inside a category",
                        ));
                    }
                    self.section(section, SectionLevel::Subcategory, ctx, site, &mut out)?;
                }
                FlowNode::SubSubcategory(section) => {
                    if ctx.level != Some(SectionLevel::Subcategory) {
                        return Err(misplaced(
                            "subsubcategory",
                            &site,
                            "subsubcategories must be declared inside a subcategory",
                        ));
                    }
                    self.section(section, SectionLevel::SubSubcategory, ctx, site, &mut out)?;
                }
                FlowNode::Screen(screen) => {
                    if !ctx.in_subcategory() {
                        return Err(misplaced(
                            "screen",
                            &site,
                            "screens must be declared inside a subcategory",
                        ));
                    }
                    let id = self.screen(screen, ctx, site)?;
                    out.push(LayoutNode::Screen { id });
                }
                FlowNode::Gate(gate) => {
                    check_depth(&gate.condition.path, "condition", &site, ctx.depth())?;
                    let mut inner = ctx.clone();
                    inner.chain.push(ChainLink {
                        condition: gate.condition.clone(),
                        depth: ctx.depth(),
                        site: site.clone(),
                    });
                    inner.site = site;
                    out.extend(self.walk(&gate.children, &inner)?);
                }
                FlowNode::CollectionLoop(lp) => {
                    if !ctx.in_subcategory() {
                        return Err(misplaced(
                            "loop",
                            &site,
                            "collection loops must be declared inside a subcategory",
                        ));
                    }
                    if lp.is_inner && ctx.level != Some(SectionLevel::SubSubcategory) {
                        return Err(misplaced(
                            "loop",
                            &site,
                            "inner loops must be declared inside a subsubcategory",
                        ));
                    }
                    out.push(self.collection_loop(lp, ctx, site)?);
                }
                FlowNode::Assertion(assertion) => {
                    if !ctx.in_subcategory() {
                        return Err(misplaced(
                            "assertion",
                            &site,
                            "assertions must be declared inside a subcategory",
                        ));
                    }
                    self.assertion(assertion, ctx, site);
                }
            }
        }
        Ok(out)
    }

    fn section(
        &mut self,
        node: &SectionNode,
        level: SectionLevel,
        ctx: &Ctx,
        site: DeclSite,
        out: &mut Vec<LayoutNode>,
    ) -> Result<(), DeclError> {
        let mut inner = ctx.clone();
        match level {
            SectionLevel::Category => {
                inner.category = Some(node.route.clone());
                inner.subcategory = None;
                inner.subsubcategory = None;
            }
            SectionLevel::Subcategory => {
                inner.subcategory = Some(node.route.clone());
                inner.subsubcategory = None;
            }
            SectionLevel::SubSubcategory => {
                inner.subsubcategory = Some(node.route.clone());
            }
        }
        inner.level = Some(level);
        inner.site = site.clone();

        let id = SectionId(self.index.sections.len());
        let context = node.collection_context.as_ref().map(|collection| {
            self.push_scope(
                ScopeKind::Context { section: id },
                collection.clone(),
                ctx,
                site.clone(),
            )
        });
        if let Some(scope) = context {
            inner.scopes.push(scope);
        }

        let route = inner.section_route();
        self.index.sections.push(Section {
            id,
            level,
            route: route.clone(),
            local_route: node.route.clone(),
            complete_if: node
                .complete_if
                .clone()
                .map(|c| c.into_vec())
                .unwrap_or_default(),
            display_only_if: node
                .display_only_if
                .clone()
                .map(|c| c.into_vec())
                .unwrap_or_default(),
            context,
            depth: inner.depth(),
            parent: ctx.section,
            loops: Vec::new(),
            site,
        });
        self.index.sections_by_route.entry(route).or_insert(id);
        inner.section = Some(id);

        let body = self.walk(&node.children, &inner)?;
        match context {
            Some(scope) => out.push(LayoutNode::Scope { id: scope, body }),
            None => out.extend(body),
        }
        Ok(())
    }

    fn screen(&mut self, node: &ScreenNode, ctx: &Ctx, site: DeclSite) -> Result<ScreenId, DeclError> {
        let route = ctx.screen_route(&node.route);
        if let Some(first) = self.index.by_route.get(&route) {
            return Err(DeclError::DuplicateRoute {
                route,
                first: self.index.entry(*first).site.clone(),
                second: site,
            });
        }

        let mut chain = ctx.chain.clone();
        for condition in node.all_conditions() {
            chain.push(ChainLink {
                condition: condition.clone(),
                depth: ctx.depth(),
                site: site.clone(),
            });
        }

        let id = ScreenId(self.index.entries.len());
        self.index.entries.push(ScreenEntry {
            id,
            route: route.clone(),
            local_route: node.route.clone(),
            category: ctx.category.clone().unwrap_or_default(),
            subcategory: ctx.subcategory.clone().unwrap_or_default(),
            subsubcategory: ctx.subsubcategory.clone(),
            chain,
            is_knockout: node.is_knockout,
            route_automatically: node.route_automatically,
            hub_for: node.hub_for.clone(),
            scopes: ctx.scopes.clone(),
            section: ctx.section.unwrap_or(SectionId(0)),
            site,
        });
        self.index.by_route.insert(route, id);
        Ok(id)
    }

    fn collection_loop(
        &mut self,
        node: &LoopNode,
        ctx: &Ctx,
        site: DeclSite,
    ) -> Result<LayoutNode, DeclError> {
        if let Some(first) = self.loop_sites.get(&node.loop_name) {
            return Err(DeclError::DuplicateLoop {
                loop_name: node.loop_name.clone(),
                first: first.clone(),
                second: site,
            });
        }
        self.loop_sites.insert(node.loop_name.clone(), site.clone());

        let scope = self.push_scope(
            ScopeKind::Loop(LoopScope {
                loop_name: node.loop_name.clone(),
                completed: node.collection_item_completed_condition.clone(),
                done_path: node.done_path.clone(),
                auto_iterate: node.auto_iterate,
                is_inner: node.is_inner,
                hub: None,
            }),
            node.collection.clone(),
            ctx,
            site.clone(),
        );
        self.index
            .loops_by_name
            .insert(node.loop_name.clone(), scope);
        if let Some(section) = ctx.section {
            self.index.sections[section.0].loops.push(scope);
        }

        let mut inner = ctx.clone();
        inner.scopes.push(scope);
        inner.site = site;
        let body = self.walk(&node.children, &inner)?;
        Ok(LayoutNode::Scope { id: scope, body })
    }

    fn assertion(&mut self, node: &AssertionNode, ctx: &Ctx, site: DeclSite) {
        let mut chain = ctx.chain.clone();
        for condition in node.all_conditions() {
            chain.push(ChainLink {
                condition: condition.clone(),
                depth: ctx.depth(),
                site: site.clone(),
            });
        }
        self.index.assertions.push(AssertionEntry {
            section: ctx.section.unwrap_or(SectionId(0)),
            kind: node.assertion_type,
            i18n_key: node.i18n_key.clone(),
            edit_route: node.edit_route.clone(),
            chain,
            depth: ctx.depth(),
            site,
        });
    }

    fn push_scope(&mut self, kind: ScopeKind, collection: Path, ctx: &Ctx, site: DeclSite) -> ScopeId {
        let id = ScopeId(self.index.scopes.len());
        self.index.scopes.push(Scope {
            id,
            kind,
            collection,
            depth: ctx.depth(),
            parent: ctx.scopes.last().copied(),
            site,
        });
        id
    }

    /// Point each loop at the first screen naming it in `hubFor`.
    fn link_hubs(&mut self) {
        for entry in &self.index.entries {
            let Some(name) = &entry.hub_for else {
                continue;
            };
            let Some(scope) = self.index.loops_by_name.get(name) else {
                continue;
            };
            if let ScopeKind::Loop(lp) = &mut self.index.scopes[scope.0].kind {
                if lp.hub.is_none() {
                    lp.hub = Some(entry.id);
                }
            }
        }
    }
}
