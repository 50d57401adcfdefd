//! Access decisions and their provenance

use crate::rules::Effect;
use serde::{Deserialize, Serialize};

/// Why a decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionReason {
    /// A rule without assertion matched; its static effect applies
    RuleMatch { effect: Effect },

    /// A rule's assertion produced the verdict
    Assertion { effect: Effect },

    /// No rule matched; the configured default applies
    Default,
}

/// Outcome of resolving a (role, resource) query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether access is granted
    pub allowed: bool,

    /// Insertion index of the deciding rule, `None` for the default
    pub rule: Option<usize>,

    /// How the decision was reached
    pub reason: DecisionReason,

    /// Number of rules inspected, matching or not
    pub rules_scanned: usize,

    /// Number of matching rules whose assertion deferred
    pub deferrals: usize,
}

impl Decision {
    pub(crate) fn from_rule(index: usize, effect: Effect) -> Self {
        Self {
            allowed: effect.is_allow(),
            rule: Some(index),
            reason: DecisionReason::RuleMatch { effect },
            rules_scanned: 0,
            deferrals: 0,
        }
    }

    pub(crate) fn from_assertion(index: usize, allowed: bool) -> Self {
        let effect = if allowed { Effect::Allow } else { Effect::Deny };
        Self {
            allowed,
            rule: Some(index),
            reason: DecisionReason::Assertion { effect },
            rules_scanned: 0,
            deferrals: 0,
        }
    }

    pub(crate) fn from_default(effect: Effect) -> Self {
        Self {
            allowed: effect.is_allow(),
            rule: None,
            reason: DecisionReason::Default,
            rules_scanned: 0,
            deferrals: 0,
        }
    }

    pub(crate) fn with_walk_stats(mut self, rules_scanned: usize, deferrals: usize) -> Self {
        self.rules_scanned = rules_scanned;
        self.deferrals = deferrals;
        self
    }

    /// Whether no rule decided and the default applied
    pub fn is_default(&self) -> bool {
        matches!(self.reason, DecisionReason::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_decision() {
        let decision = Decision::from_rule(4, Effect::Deny).with_walk_stats(2, 0);

        assert!(!decision.allowed);
        assert_eq!(decision.rule, Some(4));
        assert_eq!(decision.rules_scanned, 2);
        assert!(!decision.is_default());
    }

    #[test]
    fn test_assertion_decision_records_verdict() {
        let decision = Decision::from_assertion(0, false);
        assert_eq!(
            decision.reason,
            DecisionReason::Assertion {
                effect: Effect::Deny
            }
        );
    }

    #[test]
    fn test_default_decision_serializes() {
        let decision = Decision::from_default(Effect::Deny);
        assert!(decision.is_default());

        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["allowed"], serde_json::json!(false));
        assert_eq!(json["reason"]["type"], serde_json::json!("default"));
        assert!(json["rule"].is_null());
    }
}
