//! Fact state as reported by a fact graph.

use super::values::Value;

/// State of one concrete fact.
///
/// `value` present means the fact has a value; `complete` is tracked
/// separately because a placeholder value can exist before the fact is
/// complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactState {
    pub value: Option<Value>,
    pub complete: bool,
}

impl FactState {
    /// A known fact nobody has answered yet.
    pub fn unanswered() -> Self {
        FactState {
            value: None,
            complete: false,
        }
    }

    pub fn complete(value: Value) -> Self {
        FactState {
            value: Some(value),
            complete: true,
        }
    }

    /// A value that is present but not yet complete.
    pub fn placeholder(value: Value) -> Self {
        FactState {
            value: Some(value),
            complete: false,
        }
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_truthy(&self) -> bool {
        self.value.as_ref().is_some_and(Value::is_truthy)
    }
}
