//! Condition model shared by flow declarations and the evaluator.
//!
//! In declarations a condition is written either as a bare path string
//! (shorthand for `isTrue`) or as `{ "operator": ..., "condition": path }`.
//! Places that accept several conditions take either one condition or a
//! list of them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::Path;

/// How a fact's state is tested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    #[default]
    IsTrue,
    IsTrueAndComplete,
    IsTrueOrIncomplete,
    IsFalse,
    IsFalseAndComplete,
    IsFalseOrIncomplete,
    IsComplete,
    IsIncomplete,
}

impl Operator {
    pub fn name(self) -> &'static str {
        match self {
            Operator::IsTrue => "isTrue",
            Operator::IsTrueAndComplete => "isTrueAndComplete",
            Operator::IsTrueOrIncomplete => "isTrueOrIncomplete",
            Operator::IsFalse => "isFalse",
            Operator::IsFalseAndComplete => "isFalseAndComplete",
            Operator::IsFalseOrIncomplete => "isFalseOrIncomplete",
            Operator::IsComplete => "isComplete",
            Operator::IsIncomplete => "isIncomplete",
        }
    }

    /// Apply the operator to a fact's state.
    ///
    /// `truthy` is the truthiness of the fact's value, and is ignored when
    /// the fact has no value.
    pub fn apply(self, has_value: bool, complete: bool, truthy: bool) -> bool {
        let truthy = has_value && truthy;
        match self {
            Operator::IsTrue => has_value && truthy,
            Operator::IsTrueAndComplete => complete && truthy,
            Operator::IsTrueOrIncomplete => !complete || truthy,
            Operator::IsFalse => has_value && !truthy,
            Operator::IsFalseAndComplete => complete && !truthy,
            Operator::IsFalseOrIncomplete => !complete || !truthy,
            Operator::IsComplete => complete,
            Operator::IsIncomplete => !complete,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single fact test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCondition", into = "RawCondition")]
pub struct Condition {
    pub operator: Operator,
    pub path: Path,
}

impl Condition {
    pub fn new(operator: Operator, path: Path) -> Self {
        Condition { operator, path }
    }

    /// `isTrue` on `path`.
    pub fn is_true(path: Path) -> Self {
        Condition::new(Operator::IsTrue, path)
    }

    pub fn wildcard_count(&self) -> usize {
        self.path.wildcard_count()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operator, self.path)
    }
}

/// Wire form of a condition.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawCondition {
    Bare(Path),
    Full {
        #[serde(default)]
        operator: Operator,
        condition: Path,
    },
}

impl From<RawCondition> for Condition {
    fn from(raw: RawCondition) -> Self {
        match raw {
            RawCondition::Bare(path) => Condition::is_true(path),
            RawCondition::Full {
                operator,
                condition,
            } => Condition::new(operator, condition),
        }
    }
}

impl From<Condition> for RawCondition {
    fn from(c: Condition) -> Self {
        if c.operator == Operator::IsTrue {
            RawCondition::Bare(c.path)
        } else {
            RawCondition::Full {
                operator: c.operator,
                condition: c.path,
            }
        }
    }
}

/// One condition or a list of them, as accepted by `completeIf` and
/// `displayOnlyIf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(Condition),
    Many(Vec<Condition>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<Condition> {
        match self {
            OneOrMany::One(c) => vec![c],
            OneOrMany::Many(v) => v,
        }
    }

    pub fn as_slice(&self) -> &[Condition] {
        match self {
            OneOrMany::One(c) => std::slice::from_ref(c),
            OneOrMany::Many(v) => v,
        }
    }
}

impl From<Condition> for OneOrMany {
    fn from(c: Condition) -> Self {
        OneOrMany::One(c)
    }
}

impl From<Vec<Condition>> for OneOrMany {
    fn from(v: Vec<Condition>) -> Self {
        OneOrMany::Many(v)
    }
}
