//! Flow declaration tree.
//!
//! A flow is an ordered forest of tagged nodes. The tree is read from JSON
//! (tagged by `kind`) or built with the helpers below, and is consumed once
//! by the compiler. Nothing here evaluates facts.

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, OneOrMany};
use crate::path::Path;

// ──────────────────────────────────────────────
// Declaration root
// ──────────────────────────────────────────────

/// A whole flow declaration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowDeclaration {
    #[serde(default)]
    pub children: Vec<FlowNode>,
}

impl FlowDeclaration {
    pub fn new(children: Vec<FlowNode>) -> Self {
        FlowDeclaration { children }
    }
}

// ──────────────────────────────────────────────
// Nodes
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FlowNode {
    Category(SectionNode),
    Subcategory(SectionNode),
    SubSubcategory(SectionNode),
    Screen(ScreenNode),
    Gate(GateNode),
    CollectionLoop(LoopNode),
    Assertion(AssertionNode),
}

impl FlowNode {
    /// Name used in declaration-site breadcrumbs and placement errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowNode::Category(_) => "category",
            FlowNode::Subcategory(_) => "subcategory",
            FlowNode::SubSubcategory(_) => "subsubcategory",
            FlowNode::Screen(_) => "screen",
            FlowNode::Gate(_) => "gate",
            FlowNode::CollectionLoop(_) => "loop",
            FlowNode::Assertion(_) => "assertion",
        }
    }

    /// Short label identifying the node among its siblings.
    pub fn label(&self) -> String {
        match self {
            FlowNode::Category(s) | FlowNode::Subcategory(s) | FlowNode::SubSubcategory(s) => {
                s.route.clone()
            }
            FlowNode::Screen(s) => s.route.clone(),
            FlowNode::Gate(g) => g.condition.to_string(),
            FlowNode::CollectionLoop(l) => l.loop_name.clone(),
            FlowNode::Assertion(a) => a.i18n_key.clone(),
        }
    }

    pub fn children(&self) -> &[FlowNode] {
        match self {
            FlowNode::Category(s) | FlowNode::Subcategory(s) | FlowNode::SubSubcategory(s) => {
                &s.children
            }
            FlowNode::Gate(g) => &g.children,
            FlowNode::CollectionLoop(l) => &l.children,
            FlowNode::Screen(_) | FlowNode::Assertion(_) => &[],
        }
    }

    pub fn category(route: &str, children: Vec<FlowNode>) -> FlowNode {
        FlowNode::Category(SectionNode::new(route, children))
    }

    pub fn subcategory(route: &str, children: Vec<FlowNode>) -> FlowNode {
        FlowNode::Subcategory(SectionNode::new(route, children))
    }

    pub fn sub_subcategory(route: &str, children: Vec<FlowNode>) -> FlowNode {
        FlowNode::SubSubcategory(SectionNode::new(route, children))
    }

    pub fn gate(condition: Condition, children: Vec<FlowNode>) -> FlowNode {
        FlowNode::Gate(GateNode {
            condition,
            children,
        })
    }
}

/// Category, Subcategory or SubSubcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionNode {
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_if: Option<OneOrMany>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_context: Option<Path>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_only_if: Option<OneOrMany>,
    #[serde(default)]
    pub children: Vec<FlowNode>,
}

impl SectionNode {
    pub fn new(route: &str, children: Vec<FlowNode>) -> Self {
        SectionNode {
            route: route.to_string(),
            complete_if: None,
            collection_context: None,
            display_only_if: None,
            children,
        }
    }

    pub fn complete_if(mut self, conditions: impl Into<OneOrMany>) -> Self {
        self.complete_if = Some(conditions.into());
        self
    }

    pub fn display_only_if(mut self, conditions: impl Into<OneOrMany>) -> Self {
        self.display_only_if = Some(conditions.into());
        self
    }

    pub fn in_context(mut self, collection: Path) -> Self {
        self.collection_context = Some(collection);
        self
    }
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenNode {
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_knockout: bool,
    /// When false the screen is only reachable through an explicit link.
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub route_automatically: bool,
    /// Loop whose collection this screen manages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_for: Option<String>,
    /// Rendering payload; carried through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub content: serde_json::Value,
}

impl ScreenNode {
    pub fn new(route: &str) -> Self {
        ScreenNode {
            route: route.to_string(),
            condition: None,
            conditions: Vec::new(),
            is_knockout: false,
            route_automatically: true,
            hub_for: None,
            content: serde_json::Value::Null,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        if self.condition.is_none() {
            self.condition = Some(condition);
        } else {
            self.conditions.push(condition);
        }
        self
    }

    pub fn knockout(mut self) -> Self {
        self.is_knockout = true;
        self
    }

    pub fn manual(mut self) -> Self {
        self.route_automatically = false;
        self
    }

    pub fn hub_for(mut self, loop_name: &str) -> Self {
        self.hub_for = Some(loop_name.to_string());
        self
    }

    /// `condition` followed by `conditions`, in declaration order.
    pub fn all_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.condition.iter().chain(self.conditions.iter())
    }
}

impl From<ScreenNode> for FlowNode {
    fn from(s: ScreenNode) -> Self {
        FlowNode::Screen(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateNode {
    pub condition: Condition,
    #[serde(default)]
    pub children: Vec<FlowNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopNode {
    pub loop_name: String,
    pub collection: Path,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_item_completed_condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_path: Option<Path>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_inner: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_iterate: bool,
    #[serde(default)]
    pub children: Vec<FlowNode>,
}

impl LoopNode {
    pub fn new(loop_name: &str, collection: Path, children: Vec<FlowNode>) -> Self {
        LoopNode {
            loop_name: loop_name.to_string(),
            collection,
            collection_item_completed_condition: None,
            done_path: None,
            is_inner: false,
            auto_iterate: false,
            children,
        }
    }

    pub fn completed_when(mut self, condition: Condition) -> Self {
        self.collection_item_completed_condition = Some(condition);
        self
    }

    pub fn done_path(mut self, path: Path) -> Self {
        self.done_path = Some(path);
        self
    }

    pub fn auto_iterate(mut self) -> Self {
        self.auto_iterate = true;
        self
    }

    pub fn inner(mut self) -> Self {
        self.is_inner = true;
        self
    }
}

impl From<LoopNode> for FlowNode {
    fn from(l: LoopNode) -> Self {
        FlowNode::CollectionLoop(l)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertionKind {
    Success,
    Warning,
    Inactive,
    Info,
}

/// Summary-view annotation. Not part of navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionNode {
    #[serde(rename = "type")]
    pub assertion_type: AssertionKind,
    pub i18n_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_route: Option<String>,
}

impl AssertionNode {
    pub fn all_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.condition.iter().chain(self.conditions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Operator;

    #[test]
    fn parses_tagged_tree() {
        let decl: FlowDeclaration = serde_json::from_value(serde_json::json!({
            "children": [{
                "kind": "category",
                "route": "income",
                "children": [{
                    "kind": "subcategory",
                    "route": "jobs",
                    "children": [
                        { "kind": "screen", "route": "w2-intro", "hubFor": "w2s" },
                        {
                            "kind": "collectionLoop",
                            "loopName": "w2s",
                            "collection": "/formW2s",
                            "collectionItemCompletedCondition": "/formW2s/*/isComplete",
                            "donePath": "/formW2sIsDone",
                            "children": [
                                { "kind": "screen", "route": "box-1" },
                                {
                                    "kind": "screen",
                                    "route": "box-2",
                                    "condition": { "operator": "isTrue", "condition": "/formW2s/*/hasBox2" }
                                }
                            ]
                        },
                        { "kind": "assertion", "type": "success", "i18nKey": "w2.done", "condition": "/formW2sIsDone" }
                    ]
                }]
            }]
        }))
        .unwrap();

        let cat = &decl.children[0];
        assert_eq!(cat.kind_name(), "category");
        let sub = &cat.children()[0];
        let kids = sub.children();
        assert_eq!(kids.len(), 3);
        match &kids[0] {
            FlowNode::Screen(s) => {
                assert_eq!(s.hub_for.as_deref(), Some("w2s"));
                assert!(s.route_automatically);
                assert!(!s.is_knockout);
            }
            other => panic!("expected screen, got {:?}", other),
        }
        match &kids[1] {
            FlowNode::CollectionLoop(l) => {
                assert_eq!(l.loop_name, "w2s");
                assert_eq!(l.children.len(), 2);
                assert!(!l.auto_iterate);
            }
            other => panic!("expected loop, got {:?}", other),
        }
        match &kids[2] {
            FlowNode::Assertion(a) => assert_eq!(a.assertion_type, AssertionKind::Success),
            other => panic!("expected assertion, got {:?}", other),
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let r: Result<FlowDeclaration, _> = serde_json::from_value(serde_json::json!({
            "children": [{ "kind": "page", "route": "x" }]
        }));
        assert!(r.is_err());
    }

    #[test]
    fn screen_builder_collects_conditions() {
        let a = Condition::is_true(Path::parse("/a").unwrap());
        let b = Condition::new(Operator::IsFalse, Path::parse("/b").unwrap());
        let s = ScreenNode::new("q").when(a.clone()).when(b.clone()).knockout();
        let all: Vec<&Condition> = s.all_conditions().collect();
        assert_eq!(all, vec![&a, &b]);
        assert!(s.is_knockout);
    }

    #[test]
    fn builder_round_trips_through_json() {
        let decl = FlowDeclaration::new(vec![FlowNode::category(
            "you",
            vec![FlowNode::subcategory(
                "about",
                vec![ScreenNode::new("intro").manual().into()],
            )],
        )]);
        let json = serde_json::to_value(&decl).unwrap();
        assert_eq!(
            json["children"][0]["children"][0]["children"][0]["routeAutomatically"],
            false
        );
        let back: FlowDeclaration = serde_json::from_value(json).unwrap();
        assert_eq!(back, decl);
    }
}
