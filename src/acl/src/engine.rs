//! The access-control engine
//!
//! Ties the role graph, resource graph and rule store together behind the
//! host-facing API.
//!
//! ```text
//! allow/deny ──► ensure nodes ──► RuleStore::append
//! add_role/add_resource ──► InheritanceGraph::add_node
//! is_allowed/check ──► Resolver ──► Decision ──► [Metrics]
//! ```

use crate::assertion::Assertion;
use crate::config::AclConfig;
use crate::decision::Decision;
use crate::error::Result;
use crate::graph::InheritanceGraph;
use crate::metrics::{AclMetrics, MetricsCollector};
use crate::resolver::Resolver;
use crate::rules::{Effect, Rule, RuleStore};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// In-memory access-control list with LIFO rule precedence
///
/// Every `Acl` owns its own state; independent instances never interact.
/// `Acl` is `Send + Sync` and can be shared behind an `Arc`. Queries take
/// read locks only while building ancestor chains and fetching rules, and
/// never across an assertion, so an assertion may mutate the same engine.
pub struct Acl {
    /// Role inheritance
    roles: RwLock<InheritanceGraph>,

    /// Resource inheritance
    resources: RwLock<InheritanceGraph>,

    /// Rules in insertion order
    rules: RuleStore,

    /// Decision counters
    metrics: Option<MetricsCollector>,

    /// Engine configuration
    config: AclConfig,
}

impl Acl {
    /// Create an engine with the default configuration (fail-closed)
    pub fn new() -> Self {
        Self::with_config(AclConfig::default())
    }

    /// Create an engine with the given configuration
    pub fn with_config(config: AclConfig) -> Self {
        let metrics = config.enable_metrics.then(MetricsCollector::new);

        info!(
            "Acl initialized with default_decision={}, metrics={}",
            config.default_decision, config.enable_metrics
        );

        Self {
            roles: RwLock::new(InheritanceGraph::new()),
            resources: RwLock::new(InheritanceGraph::new()),
            rules: RuleStore::new(),
            metrics,
            config,
        }
    }

    /// Register a role, optionally inheriting from `parent`
    ///
    /// An unknown parent is created as a root. Re-registering a role
    /// replaces its parent.
    ///
    /// # Errors
    ///
    /// Fails only if the new parent link would create a cycle.
    pub fn add_role(&self, name: &str, parent: Option<&str>) -> Result<()> {
        Self::add_node(&self.roles, "role", name, parent)
    }

    /// Register a resource, optionally inheriting from `parent`
    ///
    /// Same semantics as [`Acl::add_role`].
    pub fn add_resource(&self, name: &str, parent: Option<&str>) -> Result<()> {
        Self::add_node(&self.resources, "resource", name, parent)
    }

    /// Append an allow rule; `None` is the wildcard
    pub fn allow(&self, role: Option<&str>, resource: Option<&str>) -> usize {
        self.push_rule(Rule::new(role, resource, Effect::Allow))
    }

    /// Append a deny rule; `None` is the wildcard
    pub fn deny(&self, role: Option<&str>, resource: Option<&str>) -> usize {
        self.push_rule(Rule::new(role, resource, Effect::Deny))
    }

    /// Append an allow rule guarded by an assertion
    pub fn allow_with(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        assertion: Arc<dyn Assertion>,
    ) -> usize {
        self.push_rule(Rule::new(role, resource, Effect::Allow).with_assertion(assertion))
    }

    /// Append a deny rule guarded by an assertion
    pub fn deny_with(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
        assertion: Arc<dyn Assertion>,
    ) -> usize {
        self.push_rule(Rule::new(role, resource, Effect::Deny).with_assertion(assertion))
    }

    /// Whether `role` may act on `resource`
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Assertion`](crate::AclError::Assertion) if the
    /// deciding rule's assertion fails. The decision is then indeterminate.
    pub async fn is_allowed(&self, role: Option<&str>, resource: Option<&str>) -> Result<bool> {
        self.check(role, resource).await.map(|d| d.allowed)
    }

    /// Resolve a query and report which rule decided it
    pub async fn check(&self, role: Option<&str>, resource: Option<&str>) -> Result<Decision> {
        let decision = self.resolver().resolve(role, resource).await?;

        debug!(
            "Decision: {} for role={:?} resource={:?} (rule {:?})",
            if decision.allowed { "ALLOW" } else { "DENY" },
            role,
            resource,
            decision.rule
        );

        Ok(decision)
    }

    /// Number of rules appended so far
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Whether `name` is registered in the role graph
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.read().contains(name)
    }

    /// Whether `name` is registered in the resource graph
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.read().contains(name)
    }

    /// Ancestor chain of a role, starting with the role itself
    pub fn role_ancestors(&self, name: &str) -> Vec<String> {
        self.roles.read().ancestors_of(name)
    }

    /// Ancestor chain of a resource, starting with the resource itself
    pub fn resource_ancestors(&self, name: &str) -> Vec<String> {
        self.resources.read().ancestors_of(name)
    }

    /// Current decision counters, if metrics are enabled
    pub fn metrics(&self) -> Option<AclMetrics> {
        self.metrics.as_ref().map(MetricsCollector::get_metrics)
    }

    /// Engine configuration
    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(
            &self.roles,
            &self.resources,
            &self.rules,
            self.config.default_decision,
        )
        .with_metrics(self.metrics.as_ref())
    }

    fn add_node(
        graph: &RwLock<InheritanceGraph>,
        kind: &str,
        name: &str,
        parent: Option<&str>,
    ) -> Result<()> {
        graph.write().add_node(name, parent).map_err(|e| {
            warn!("Rejected {} registration: {}", kind, e);
            e
        })?;
        debug!("Registered {} '{}' (parent {:?})", kind, name, parent);
        Ok(())
    }

    fn push_rule(&self, rule: Rule) -> usize {
        // Step 1: referenced nodes must exist before the rule does.
        if let Some(role) = rule.role.as_deref() {
            self.roles.write().ensure_node(role);
        }
        if let Some(resource) = rule.resource.as_deref() {
            self.resources.write().ensure_node(resource);
        }

        // Step 2: append.
        let effect = rule.effect;
        let guarded = rule.assertion.is_some();
        let role = rule.role.clone();
        let resource = rule.resource.clone();
        let index = self.rules.append(rule);

        debug!(
            "Rule #{}: {} role={:?} resource={:?} assertion={}",
            index, effect, role, resource, guarded
        );

        index
    }
}

impl Default for Acl {
    fn default() -> Self {
        Self::new()
    }
}
