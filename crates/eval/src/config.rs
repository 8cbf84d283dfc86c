//! Navigator tuning knobs.

use serde::{Deserialize, Serialize};

/// Default bound on the number of screens a walk may visit.
pub const DEFAULT_MAX_WALK_STEPS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    /// A walk visiting more screens than this fails with
    /// `WalkLimitExceeded`.
    pub max_walk_steps: usize,
    /// When false, screens declared with `routeAutomatically: false` are
    /// treated like any other screen.
    pub honor_route_automatically: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        NavigatorConfig {
            max_walk_steps: DEFAULT_MAX_WALK_STEPS,
            honor_route_automatically: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: NavigatorConfig = serde_json::from_str(r#"{ "max_walk_steps": 5 }"#).unwrap();
        assert_eq!(cfg.max_walk_steps, 5);
        assert!(cfg.honor_route_automatically);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<NavigatorConfig>(r#"{ "max_steps": 5 }"#).is_err());
    }
}
