//! Fact paths: declared (possibly wildcard) paths and concrete paths.
//!
//! A declared [`Path`] is what flow declarations carry, e.g.
//! `/formW2s/*/hasBox2`. The fact store only understands [`ConcretePath`]s,
//! where every `*` has been replaced by a collection item segment
//! (`/formW2s/#w2-A/hasBox2`). Keeping the two apart in the type system means
//! an un-concretized path can never reach the fact store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

const WILDCARD: &str = "*";
const ITEM_PREFIX: char = '#';

// ──────────────────────────────────────────────
// Item identifiers and bindings
// ──────────────────────────────────────────────

/// Identifier of one member of a fact collection (usually a UUID).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId(s)
    }
}

/// Stack of collection items a query is positioned in, outermost first.
///
/// A screen nested in two collection loops is addressed with a binding of
/// depth 2: `[outer_item, inner_item]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemBinding(Vec<ItemId>);

impl ItemBinding {
    pub fn none() -> Self {
        ItemBinding(Vec::new())
    }

    pub fn single(item: impl Into<ItemId>) -> Self {
        ItemBinding(vec![item.into()])
    }

    pub fn from_items(items: Vec<ItemId>) -> Self {
        ItemBinding(items)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }

    /// Item bound at `depth` (0 = outermost).
    pub fn at(&self, depth: usize) -> Option<&ItemId> {
        self.0.get(depth)
    }

    /// Binding truncated to its outermost `depth` items.
    pub fn truncated(&self, depth: usize) -> ItemBinding {
        ItemBinding(self.0.iter().take(depth).cloned().collect())
    }

    /// Binding extended by one inner item.
    pub fn pushed(&self, item: ItemId) -> ItemBinding {
        let mut items = self.0.clone();
        items.push(item);
        ItemBinding(items)
    }

    /// True if `self` is the outermost prefix of `other`.
    pub fn is_prefix_of(&self, other: &ItemBinding) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(other.0.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for ItemBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("-");
        }
        let parts: Vec<&str> = self.0.iter().map(ItemId::as_str).collect();
        f.write_str(&parts.join(","))
    }
}

// ──────────────────────────────────────────────
// Declared paths
// ──────────────────────────────────────────────

/// A declared fact path, possibly containing `*` wildcard segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path(String);

impl Path {
    /// Parse a declared path.
    ///
    /// Paths are absolute (`/` prefixed), have no empty segments, and may not
    /// contain concrete item segments (`#id`); those only appear in
    /// [`ConcretePath`].
    pub fn parse(raw: &str) -> Result<Path, PathError> {
        let rest = raw.strip_prefix('/').ok_or_else(|| PathError::Malformed {
            path: raw.to_string(),
            reason: "path must start with '/'".to_string(),
        })?;
        if rest.is_empty() {
            return Err(PathError::Malformed {
                path: raw.to_string(),
                reason: "path has no segments".to_string(),
            });
        }
        for segment in rest.split('/') {
            if segment.is_empty() {
                return Err(PathError::Malformed {
                    path: raw.to_string(),
                    reason: "empty path segment".to_string(),
                });
            }
            if segment.starts_with(ITEM_PREFIX) {
                return Err(PathError::Malformed {
                    path: raw.to_string(),
                    reason: format!("concrete item segment '{}' in a declared path", segment),
                });
            }
            if segment != WILDCARD && segment.contains('*') {
                return Err(PathError::Malformed {
                    path: raw.to_string(),
                    reason: format!("'*' must be a whole segment, found '{}'", segment),
                });
            }
        }
        Ok(Path(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0[1..].split('/')
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard_count() > 0
    }

    pub fn wildcard_count(&self) -> usize {
        self.segments().filter(|s| *s == WILDCARD).count()
    }

    /// Substitute the path's single wildcard with `item`.
    ///
    /// Fails if the path has a wildcard and no item was given, if an item was
    /// given for a path without wildcards, or if the path has more than one
    /// wildcard (use [`Path::concretize`] for those).
    pub fn concrete_path(&self, item: Option<&ItemId>) -> Result<ConcretePath, PathError> {
        match (self.wildcard_count(), item) {
            (0, None) => Ok(ConcretePath(self.0.clone())),
            (0, Some(item)) => Err(PathError::UnexpectedItem {
                path: self.0.clone(),
                item: item.to_string(),
            }),
            (1, Some(item)) => Ok(self.substitute(std::slice::from_ref(item))),
            (1, None) => Err(PathError::MissingItem {
                path: self.0.clone(),
                wildcards: 1,
                bound: 0,
            }),
            (n, _) => Err(PathError::MissingItem {
                path: self.0.clone(),
                wildcards: n,
                bound: usize::from(item.is_some()),
            }),
        }
    }

    /// Concretize against an item binding.
    ///
    /// A path with `k` wildcards binds them, left to right, to the innermost
    /// `k` items of `binding`. Extra outer items are ignored, so absolute
    /// paths concretize under any binding.
    pub fn concretize(&self, binding: &ItemBinding) -> Result<ConcretePath, PathError> {
        let k = self.wildcard_count();
        if k > binding.depth() {
            return Err(PathError::MissingItem {
                path: self.0.clone(),
                wildcards: k,
                bound: binding.depth(),
            });
        }
        let items = &binding.items()[binding.depth() - k..];
        Ok(self.substitute(items))
    }

    fn substitute(&self, items: &[ItemId]) -> ConcretePath {
        let mut next = items.iter();
        let mut out = String::with_capacity(self.0.len() + items.len() * 8);
        for segment in self.segments() {
            out.push('/');
            if segment == WILDCARD {
                // Callers guarantee one item per wildcard.
                if let Some(item) = next.next() {
                    out.push(ITEM_PREFIX);
                    out.push_str(item.as_str());
                    continue;
                }
            }
            out.push_str(segment);
        }
        ConcretePath(out)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Path {
    type Error = PathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Path::parse(&raw)
    }
}

impl From<Path> for String {
    fn from(p: Path) -> String {
        p.0
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

// ──────────────────────────────────────────────
// Concrete paths
// ──────────────────────────────────────────────

/// A fact path with every wildcard resolved to an item segment.
///
/// Only produced by concretizing a [`Path`], or by [`ConcretePath::parse`]
/// for paths read back from a fact snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct ConcretePath(String);

impl ConcretePath {
    /// Parse a concrete path, rejecting wildcards.
    pub fn parse(raw: &str) -> Result<ConcretePath, PathError> {
        let rest = raw.strip_prefix('/').ok_or_else(|| PathError::Malformed {
            path: raw.to_string(),
            reason: "path must start with '/'".to_string(),
        })?;
        if rest.is_empty() || rest.split('/').any(str::is_empty) {
            return Err(PathError::Malformed {
                path: raw.to_string(),
                reason: "empty path segment".to_string(),
            });
        }
        if rest.split('/').any(|s| s.contains('*')) {
            return Err(PathError::Malformed {
                path: raw.to_string(),
                reason: "concrete paths may not contain wildcards".to_string(),
            });
        }
        Ok(ConcretePath(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The declared form of this path: item segments replaced by `*`.
    pub fn abstract_form(&self) -> String {
        let segments: Vec<&str> = self.0[1..]
            .split('/')
            .map(|s| if s.starts_with(ITEM_PREFIX) { WILDCARD } else { s })
            .collect();
        format!("/{}", segments.join("/"))
    }
}

impl fmt::Display for ConcretePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ConcretePath> for String {
    fn from(p: ConcretePath) -> String {
        p.0
    }
}
