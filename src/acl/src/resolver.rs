//! Rule resolution: ancestor-chain matching and the assertion protocol
//!
//! # Algorithm
//!
//! 1. Build the ancestor chain of the queried role in the role graph and of
//!    the queried resource in the resource graph. A wildcard query argument
//!    has an empty chain, so only wildcard rule fields can match it.
//! 2. Walk the rule store from the most recent rule to the oldest. A rule
//!    matches when each of its fields is the wildcard or appears in the
//!    corresponding chain.
//! 3. The first matching rule decides. Rules without an assertion decide by
//!    their effect. Rules with an assertion defer to it: a verdict finalizes
//!    the query, `Defer` resumes the walk at the next older rule, and an
//!    error is returned as is, without consulting older rules.
//! 4. If the walk runs out of rules, the configured default applies.
//!
//! Recency wins absolutely: a later global rule shadows an earlier specific
//! one. There is no specificity ordering.

use crate::assertion::AssertionOutcome;
use crate::decision::Decision;
use crate::error::{AclError, Result};
use crate::graph::InheritanceGraph;
use crate::metrics::MetricsCollector;
use crate::rules::{Effect, RuleStore};
use parking_lot::RwLock;
use tracing::{debug, warn};

/// Borrowed view over engine state used to answer one query
pub struct Resolver<'a> {
    roles: &'a RwLock<InheritanceGraph>,
    resources: &'a RwLock<InheritanceGraph>,
    rules: &'a RuleStore,
    default_decision: Effect,
    metrics: Option<&'a MetricsCollector>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given graphs and rule store
    pub fn new(
        roles: &'a RwLock<InheritanceGraph>,
        resources: &'a RwLock<InheritanceGraph>,
        rules: &'a RuleStore,
        default_decision: Effect,
    ) -> Self {
        Self {
            roles,
            resources,
            rules,
            default_decision,
            metrics: None,
        }
    }

    /// Record outcomes into `metrics`
    pub fn with_metrics(mut self, metrics: Option<&'a MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Resolve a query
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Assertion`] if the first matching rule that does
    /// not defer has an assertion that fails.
    pub async fn resolve(&self, role: Option<&str>, resource: Option<&str>) -> Result<Decision> {
        let (role_chain, resource_chain) = self.chains(role, resource);
        debug!(
            "Resolving role={:?} resource={:?}: role chain {:?}, resource chain {:?}",
            role, resource, role_chain, resource_chain
        );

        let mut scanned = 0;
        let mut deferrals = 0;

        for (index, rule) in self.rules.iter_from_most_recent() {
            scanned += 1;

            if !rule.matches(&role_chain, &resource_chain) {
                continue;
            }

            let Some(assertion) = &rule.assertion else {
                debug!("Rule #{} matched: {}", index, rule.effect);
                let decision = Decision::from_rule(index, rule.effect);
                return Ok(self.finish(decision.with_walk_stats(scanned, deferrals)));
            };

            match assertion.evaluate(role, resource).await {
                Ok(AssertionOutcome::Decision(allowed)) => {
                    debug!("Rule #{} assertion decided: allowed={}", index, allowed);
                    let decision = Decision::from_assertion(index, allowed);
                    return Ok(self.finish(decision.with_walk_stats(scanned, deferrals)));
                }
                Ok(AssertionOutcome::Defer) => {
                    debug!("Rule #{} assertion deferred to older rules", index);
                    deferrals += 1;
                }
                Err(source) => {
                    warn!("Rule #{} assertion failed: {}", index, source);
                    if let Some(metrics) = self.metrics {
                        metrics.record_assertion_error(scanned, deferrals);
                    }
                    return Err(AclError::Assertion {
                        rule: index,
                        source,
                    });
                }
            }
        }

        debug!("No rule matched, default {}", self.default_decision);
        let decision = Decision::from_default(self.default_decision);
        Ok(self.finish(decision.with_walk_stats(scanned, deferrals)))
    }

    /// Ancestor chains for both query arguments
    ///
    /// Graph locks are released before returning; they must never be held
    /// across an assertion.
    fn chains(&self, role: Option<&str>, resource: Option<&str>) -> (Vec<String>, Vec<String>) {
        let role_chain = role
            .map(|r| self.roles.read().ancestors_of(r))
            .unwrap_or_default();
        let resource_chain = resource
            .map(|r| self.resources.read().ancestors_of(r))
            .unwrap_or_default();
        (role_chain, resource_chain)
    }

    fn finish(&self, decision: Decision) -> Decision {
        if let Some(metrics) = self.metrics {
            metrics.record_decision(&decision);
        }
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion;
    use crate::decision::DecisionReason;
    use crate::rules::Rule;

    struct Fixture {
        roles: RwLock<InheritanceGraph>,
        resources: RwLock<InheritanceGraph>,
        rules: RuleStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                roles: RwLock::new(InheritanceGraph::new()),
                resources: RwLock::new(InheritanceGraph::new()),
                rules: RuleStore::new(),
            }
        }

        fn resolver(&self) -> Resolver<'_> {
            Resolver::new(&self.roles, &self.resources, &self.rules, Effect::Deny)
        }
    }

    #[tokio::test]
    async fn test_empty_store_uses_default() {
        let fx = Fixture::new();
        let decision = fx.resolver().resolve(Some("a"), Some("b")).await.unwrap();

        assert!(!decision.allowed);
        assert!(decision.is_default());
        assert_eq!(decision.rules_scanned, 0);
    }

    #[tokio::test]
    async fn test_first_match_from_newest_wins() {
        let fx = Fixture::new();
        fx.rules.append(Rule::new(Some("foo"), Some("bar"), Effect::Allow));
        fx.rules.append(Rule::new(Some("other"), None, Effect::Deny));

        let decision = fx.resolver().resolve(Some("foo"), Some("bar")).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.rule, Some(0));
        assert_eq!(decision.rules_scanned, 2);
    }

    #[tokio::test]
    async fn test_inherited_role_and_resource() {
        let fx = Fixture::new();
        fx.roles.write().add_node("editor", Some("member")).unwrap();
        fx.resources.write().add_node("post", Some("blog")).unwrap();
        fx.rules.append(Rule::new(Some("member"), Some("blog"), Effect::Allow));

        let resolver = fx.resolver();
        assert!(resolver.resolve(Some("editor"), Some("post")).await.unwrap().allowed);
        assert!(!resolver.resolve(Some("guest"), Some("post")).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_defer_falls_through_to_older_rule() {
        let fx = Fixture::new();
        fx.rules.append(Rule::new(Some("foo"), Some("bar"), Effect::Allow));
        fx.rules.append(
            Rule::new(Some("foo"), Some("bar"), Effect::Deny)
                .with_assertion(assertion::from_fn(|_, _| Ok(AssertionOutcome::Defer))),
        );

        let decision = fx.resolver().resolve(Some("foo"), Some("bar")).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.rule, Some(0));
        assert_eq!(decision.deferrals, 1);
        assert_eq!(
            decision.reason,
            DecisionReason::RuleMatch {
                effect: Effect::Allow
            }
        );
    }

    #[tokio::test]
    async fn test_assertion_error_is_not_masked() {
        let fx = Fixture::new();
        let metrics = MetricsCollector::new();
        fx.rules.append(Rule::new(None, None, Effect::Allow));
        fx.rules.append(
            Rule::new(Some("foo"), None, Effect::Allow)
                .with_assertion(assertion::from_fn(|_, _| Err("boom".into()))),
        );

        let err = fx
            .resolver()
            .with_metrics(Some(&metrics))
            .resolve(Some("foo"), Some("bar"))
            .await
            .unwrap_err();

        assert!(matches!(err, AclError::Assertion { rule: 1, .. }));
        assert_eq!(metrics.get_metrics().assertion_errors, 1);
    }

    #[tokio::test]
    async fn test_wildcard_query_matches_only_wildcard_fields() {
        let fx = Fixture::new();
        fx.rules.append(Rule::new(None, Some("blog"), Effect::Allow));
        fx.rules.append(Rule::new(Some("admin"), None, Effect::Deny));

        let resolver = fx.resolver();
        assert!(resolver.resolve(None, Some("blog")).await.unwrap().allowed);
        assert!(!resolver.resolve(None, Some("page")).await.unwrap().allowed);
    }
}
