//! Pass 3: cross-reference validation over the built index.
//!
//! Checks that every path fits the binding depth of its declaration site
//! and that every `hubFor` names a loop the hub can actually manage.

use crate::condition::Condition;
use crate::error::{DeclError, DeclSite};
use crate::index::*;
use crate::path::Path;

pub fn validate(index: &ScreenIndex) -> Result<(), DeclError> {
    validate_wildcards(index)?;
    validate_hubs(index)?;
    Ok(())
}

pub(crate) fn check_depth(path: &Path, field: &'static str, site: &DeclSite, depth: usize) -> Result<(), DeclError> {
    let wildcards = path.wildcard_count();
    if wildcards > depth {
        return Err(DeclError::WildcardDepth {
            path: path.to_string(),
            field,
            site: site.clone(),
            wildcards,
            depth,
        });
    }
    Ok(())
}

fn check_conditions<'a>(
    conditions: impl IntoIterator<Item = &'a Condition>,
    field: &'static str,
    site: &DeclSite,
    depth: usize,
) -> Result<(), DeclError> {
    for c in conditions {
        check_depth(&c.path, field, site, depth)?;
    }
    Ok(())
}

fn validate_wildcards(index: &ScreenIndex) -> Result<(), DeclError> {
    for section in index.sections() {
        check_conditions(&section.complete_if, "completeIf", &section.site, section.depth)?;
        check_conditions(
            &section.display_only_if,
            "displayOnlyIf",
            &section.site,
            section.depth,
        )?;
    }

    for scope in index.scopes() {
        match &scope.kind {
            ScopeKind::Context { .. } => {
                check_depth(&scope.collection, "collectionContext", &scope.site, scope.depth)?;
            }
            ScopeKind::Loop(lp) => {
                check_depth(&scope.collection, "collection", &scope.site, scope.depth)?;
                if let Some(completed) = &lp.completed {
                    check_depth(
                        &completed.path,
                        "collectionItemCompletedCondition",
                        &scope.site,
                        scope.body_depth(),
                    )?;
                }
                if let Some(done) = &lp.done_path {
                    check_depth(done, "donePath", &scope.site, scope.depth)?;
                }
            }
        }
    }

    // Gate links are checked where the gate is declared, in pass 2.
    for entry in index.entries() {
        for link in &entry.chain {
            check_depth(&link.condition.path, "condition", &link.site, link.depth)?;
        }
    }
    for assertion in index.assertions() {
        for link in &assertion.chain {
            check_depth(&link.condition.path, "condition", &link.site, link.depth)?;
        }
    }
    Ok(())
}

fn validate_hubs(index: &ScreenIndex) -> Result<(), DeclError> {
    for entry in index.entries() {
        let Some(name) = &entry.hub_for else {
            continue;
        };
        let dangling = |message: String| DeclError::DanglingLoop {
            loop_name: name.clone(),
            field: "hubFor",
            site: entry.site.clone(),
            message,
        };

        let Some(scope) = index.loop_named(name) else {
            return Err(dangling("no collection loop has this name".to_string()));
        };
        if entry.scopes.contains(&scope.id) {
            return Err(dangling(
                "a hub screen cannot be inside the loop it manages".to_string(),
            ));
        }
        let mut outer = index.scope_chain(scope.id);
        outer.pop();
        if entry.scopes != outer {
            return Err(dangling(format!(
                "the hub must be declared at the loop's binding depth ({}), but is at depth {}",
                scope.depth,
                entry.wildcard_depth()
            )));
        }
        if let Some(lp) = scope.as_loop() {
            if let Some(hub) = lp.hub {
                if hub != entry.id {
                    return Err(dangling(format!(
                        "the loop already has a hub at {}",
                        index.entry(hub).site
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::pass2_index::build_index;

    fn path(raw: &str) -> Path {
        Path::parse(raw).unwrap()
    }

    fn in_subcategory(children: Vec<FlowNode>) -> FlowDeclaration {
        FlowDeclaration::new(vec![FlowNode::category(
            "cat",
            vec![FlowNode::subcategory("sub", children)],
        )])
    }

    fn check(decl: &FlowDeclaration) -> Result<(), DeclError> {
        validate(&build_index(decl)?)
    }

    #[test]
    fn wildcard_outside_loop_is_rejected() {
        let decl = in_subcategory(vec![ScreenNode::new("q")
            .when(Condition::is_true(path("/formW2s/*/hasBox2")))
            .into()]);
        match check(&decl).unwrap_err() {
            DeclError::WildcardDepth {
                field,
                wildcards,
                depth,
                ..
            } => {
                assert_eq!(field, "condition");
                assert_eq!(wildcards, 1);
                assert_eq!(depth, 0);
            }
            other => panic!("expected wildcard depth error, got {:?}", other),
        }
    }

    #[test]
    fn wildcard_inside_loop_is_fine() {
        let decl = in_subcategory(vec![LoopNode::new(
            "w2s",
            path("/formW2s"),
            vec![ScreenNode::new("box-2")
                .when(Condition::is_true(path("/formW2s/*/hasBox2")))
                .into()],
        )
        .completed_when(Condition::is_true(path("/formW2s/*/isComplete")))
        .into()]);
        assert!(check(&decl).is_ok());
    }

    #[test]
    fn done_path_is_checked_at_outer_depth() {
        let decl = in_subcategory(vec![LoopNode::new("w2s", path("/formW2s"), vec![])
            .done_path(path("/formW2s/*/done"))
            .into()]);
        match check(&decl).unwrap_err() {
            DeclError::WildcardDepth { field, .. } => assert_eq!(field, "donePath"),
            other => panic!("expected wildcard depth error, got {:?}", other),
        }
    }

    #[test]
    fn gate_conditions_are_checked() {
        let decl = in_subcategory(vec![FlowNode::gate(
            Condition::is_true(path("/a/*/b")),
            vec![ScreenNode::new("q").into()],
        )]);
        let err = check(&decl).unwrap_err();
        assert!(err.to_string().contains("gate:isTrue:/a/*/b"), "{}", err);
    }

    #[test]
    fn gate_without_screens_is_checked() {
        let decl = in_subcategory(vec![FlowNode::gate(
            Condition::is_true(path("/a/*/b")),
            vec![FlowNode::Assertion(AssertionNode {
                assertion_type: AssertionKind::Success,
                i18n_key: "a.done".to_string(),
                condition: Some(Condition::is_true(path("/done"))),
                conditions: Vec::new(),
                edit_route: None,
            })],
        )]);
        assert_eq!(check(&decl).unwrap_err().kind(), "wildcard_depth");

        let decl = in_subcategory(vec![FlowNode::gate(
            Condition::is_true(path("/a/*/b")),
            vec![],
        )]);
        assert_eq!(check(&decl).unwrap_err().kind(), "wildcard_depth");
    }

    #[test]
    fn hub_for_unknown_loop() {
        let decl = in_subcategory(vec![ScreenNode::new("hub").hub_for("nope").into()]);
        assert_eq!(check(&decl).unwrap_err().kind(), "dangling_loop");
    }

    #[test]
    fn hub_inside_its_loop_is_rejected() {
        let decl = in_subcategory(vec![LoopNode::new(
            "w2s",
            path("/formW2s"),
            vec![ScreenNode::new("hub").hub_for("w2s").into()],
        )
        .into()]);
        let err = check(&decl).unwrap_err();
        assert!(err.to_string().contains("inside the loop"));
    }

    #[test]
    fn second_hub_is_rejected() {
        let decl = in_subcategory(vec![
            ScreenNode::new("hub-a").hub_for("w2s").into(),
            ScreenNode::new("hub-b").hub_for("w2s").into(),
            LoopNode::new("w2s", path("/formW2s"), vec![]).into(),
        ]);
        let err = check(&decl).unwrap_err();
        assert!(err.to_string().contains("already has a hub"));
    }

    #[test]
    fn section_complete_if_depth() {
        let decl = FlowDeclaration::new(vec![FlowNode::category(
            "cat",
            vec![FlowNode::Subcategory(
                SectionNode::new("sub", vec![])
                    .complete_if(Condition::is_true(path("/filers/*/done"))),
            )],
        )]);
        assert_eq!(check(&decl).unwrap_err().kind(), "wildcard_depth");

        let decl = FlowDeclaration::new(vec![FlowNode::category(
            "cat",
            vec![FlowNode::Subcategory(
                SectionNode::new("sub", vec![])
                    .in_context(path("/filers"))
                    .complete_if(Condition::is_true(path("/filers/*/done"))),
            )],
        )]);
        assert!(check(&decl).is_ok());
    }
}
