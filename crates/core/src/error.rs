//! Error types for path handling and flow compilation.

use serde::Serialize;

/// Errors from parsing or concretizing a fact path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path text is not a well-formed path.
    #[error("malformed path '{path}': {reason}")]
    Malformed { path: String, reason: String },

    /// The path has more wildcards than the binding supplies items.
    #[error("path '{path}' has {wildcards} wildcard(s) but only {bound} item(s) are bound")]
    MissingItem {
        path: String,
        wildcards: usize,
        bound: usize,
    },

    /// An item id was supplied for a path with no wildcard.
    #[error("path '{path}' has no wildcard but item '{item}' was supplied")]
    UnexpectedItem { path: String, item: String },
}

/// Where in the flow declaration a node was declared.
///
/// Rendered as a breadcrumb, e.g.
/// `category:income > subcategory:jobs > loop:w2s > screen:box-2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeclSite(Vec<String>);

impl DeclSite {
    pub fn root() -> Self {
        DeclSite(Vec::new())
    }

    /// Site of a child node of this one.
    pub fn child(&self, kind: &str, name: &str) -> DeclSite {
        let mut crumbs = self.0.clone();
        crumbs.push(format!("{}:{}", kind, name));
        DeclSite(crumbs)
    }

    pub fn crumbs(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for DeclSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<flow>");
        }
        f.write_str(&self.0.join(" > "))
    }
}

/// Fatal errors in a flow declaration, detected at compile time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclError {
    /// The declaration document could not be read or parsed.
    #[error("cannot load flow declaration '{source_name}': {message}")]
    Load {
        source_name: String,
        message: String,
    },

    /// Two screens resolve to the same scoped route.
    #[error("duplicate screen route '{route}': declared at {first} and again at {second}")]
    DuplicateRoute {
        route: String,
        first: DeclSite,
        second: DeclSite,
    },

    /// Two collection loops share a loop name.
    #[error("duplicate loop name '{loop_name}': declared at {first} and again at {second}")]
    DuplicateLoop {
        loop_name: String,
        first: DeclSite,
        second: DeclSite,
    },

    /// A node appears somewhere the flow structure does not allow.
    #[error("{kind} at {site} is misplaced: {message}")]
    Misplaced {
        kind: &'static str,
        site: DeclSite,
        message: String,
    },

    /// A path carries more wildcards than there are enclosing scopes.
    #[error(
        "path '{path}' in {field} at {site} has {wildcards} wildcard(s) but only {depth} enclosing collection scope(s)"
    )]
    WildcardDepth {
        path: String,
        field: &'static str,
        site: DeclSite,
        wildcards: usize,
        depth: usize,
    },

    /// A reference to a collection loop that is not declared, or is
    /// unusable from the referencing site.
    #[error("{field} at {site} references loop '{loop_name}': {message}")]
    DanglingLoop {
        loop_name: String,
        field: &'static str,
        site: DeclSite,
        message: String,
    },
}

impl DeclError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DeclError::Load { .. } => "load",
            DeclError::DuplicateRoute { .. } => "duplicate_route",
            DeclError::DuplicateLoop { .. } => "duplicate_loop",
            DeclError::Misplaced { .. } => "misplaced",
            DeclError::WildcardDepth { .. } => "wildcard_depth",
            DeclError::DanglingLoop { .. } => "dangling_loop",
        }
    }

    /// Serialize for JSON error output.
    pub fn to_json_value(&self) -> serde_json::Value {
        let sites: Vec<String> = match self {
            DeclError::Load { .. } => vec![],
            DeclError::DuplicateRoute { first, second, .. }
            | DeclError::DuplicateLoop { first, second, .. } => {
                vec![first.to_string(), second.to_string()]
            }
            DeclError::Misplaced { site, .. }
            | DeclError::WildcardDepth { site, .. }
            | DeclError::DanglingLoop { site, .. } => vec![site.to_string()],
        };
        serde_json::json!({
            "kind":    self.kind(),
            "message": self.to_string(),
            "sites":   sites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decl_site_breadcrumb() {
        let site = DeclSite::root()
            .child("category", "income")
            .child("subcategory", "jobs")
            .child("screen", "box-1");
        assert_eq!(
            site.to_string(),
            "category:income > subcategory:jobs > screen:box-1"
        );
        assert_eq!(DeclSite::root().to_string(), "<flow>");
    }

    #[test]
    fn duplicate_route_names_both_sites() {
        let first = DeclSite::root().child("screen", "intro");
        let second = DeclSite::root().child("gate", "/x").child("screen", "intro");
        let err = DeclError::DuplicateRoute {
            route: "/flow/a/b/intro".to_string(),
            first,
            second,
        };
        let msg = err.to_string();
        assert!(msg.contains("screen:intro and again at gate:/x > screen:intro"));
        let json = err.to_json_value();
        assert_eq!(json["kind"], "duplicate_route");
        assert_eq!(json["sites"].as_array().unwrap().len(), 2);
    }
}
