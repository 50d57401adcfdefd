//! Engine configuration

use crate::rules::Effect;
use serde::{Deserialize, Serialize};

/// Access-control engine configuration
///
/// Deserializable so hosts can embed it in their own config files; every
/// field falls back to its default when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Decision when no rule matches
    pub default_decision: Effect,

    /// Enable metrics collection
    pub enable_metrics: bool,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            default_decision: Effect::Deny,
            enable_metrics: true,
        }
    }
}
