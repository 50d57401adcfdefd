//! Decision counters for engine observability

use crate::decision::Decision;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Engine counters snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclMetrics {
    /// Total number of completed checks
    pub total_checks: u64,

    /// Number of allowed decisions
    pub allowed_decisions: u64,

    /// Number of denied decisions
    pub denied_decisions: u64,

    /// Decisions that fell back to the default
    pub default_decisions: u64,

    /// Assertions that deferred to older rules
    pub deferrals: u64,

    /// Checks that ended with an assertion error
    pub assertion_errors: u64,

    /// Rules inspected across all checks
    pub rules_scanned: u64,
}

impl AclMetrics {
    /// Fraction of decisions that allowed access
    pub fn allow_rate(&self) -> f64 {
        let total = self.allowed_decisions + self.denied_decisions;
        if total == 0 {
            0.0
        } else {
            self.allowed_decisions as f64 / total as f64
        }
    }

    /// Average number of rules inspected per check
    pub fn avg_rules_scanned(&self) -> f64 {
        if self.total_checks == 0 {
            0.0
        } else {
            self.rules_scanned as f64 / self.total_checks as f64
        }
    }
}

/// Metrics collector
#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: RwLock<AclMetrics>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed decision
    pub fn record_decision(&self, decision: &Decision) {
        let mut metrics = self.metrics.write();
        metrics.total_checks += 1;
        metrics.rules_scanned += decision.rules_scanned as u64;
        metrics.deferrals += decision.deferrals as u64;

        if decision.allowed {
            metrics.allowed_decisions += 1;
        } else {
            metrics.denied_decisions += 1;
        }

        if decision.is_default() {
            metrics.default_decisions += 1;
        }
    }

    /// Record a check that failed in an assertion
    pub fn record_assertion_error(&self, rules_scanned: usize, deferrals: usize) {
        let mut metrics = self.metrics.write();
        metrics.total_checks += 1;
        metrics.assertion_errors += 1;
        metrics.rules_scanned += rules_scanned as u64;
        metrics.deferrals += deferrals as u64;
    }

    /// Current counters
    pub fn get_metrics(&self) -> AclMetrics {
        self.metrics.read().clone()
    }

    /// Reset all counters
    pub fn reset(&self) {
        *self.metrics.write() = AclMetrics::default();
    }
}
