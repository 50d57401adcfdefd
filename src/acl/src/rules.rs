//! Permission rules and the append-only rule store

use crate::assertion::Assertion;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rule effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Allow the role on the resource
    Allow,
    /// Deny the role on the resource
    Deny,
}

impl Effect {
    /// Whether this effect grants access
    pub fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// A single permission rule
///
/// `None` for `role` or `resource` is the wildcard: it matches every role
/// (resp. resource) regardless of inheritance.
#[derive(Clone)]
pub struct Rule {
    /// Role this rule applies to, `None` for any role
    pub role: Option<String>,

    /// Resource this rule applies to, `None` for any resource
    pub resource: Option<String>,

    /// Static effect when the rule matches
    pub effect: Effect,

    /// Optional runtime assertion that can override or defer the effect
    pub assertion: Option<Arc<dyn Assertion>>,
}

impl Rule {
    /// Create a rule without an assertion
    pub fn new(role: Option<&str>, resource: Option<&str>, effect: Effect) -> Self {
        Self {
            role: role.map(str::to_string),
            resource: resource.map(str::to_string),
            effect,
            assertion: None,
        }
    }

    /// Attach an assertion
    pub fn with_assertion(mut self, assertion: Arc<dyn Assertion>) -> Self {
        self.assertion = Some(assertion);
        self
    }

    /// Check the rule against the ancestor chains of a query
    pub fn matches(&self, role_chain: &[String], resource_chain: &[String]) -> bool {
        Self::field_matches(self.role.as_deref(), role_chain)
            && Self::field_matches(self.resource.as_deref(), resource_chain)
    }

    fn field_matches(field: Option<&str>, chain: &[String]) -> bool {
        match field {
            None => true,
            Some(name) => chain.iter().any(|n| n == name),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("role", &self.role)
            .field("resource", &self.resource)
            .field("effect", &self.effect)
            .field("assertion", &self.assertion.is_some())
            .finish()
    }
}

/// Append-only, order-preserving rule sequence
///
/// Rules are never reordered or removed. A rule's identity is its
/// insertion index.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: RwLock<Vec<Arc<Rule>>>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
        }
    }

    /// Append a rule, returning its index
    pub fn append(&self, rule: Rule) -> usize {
        let mut rules = self.rules.write();
        rules.push(Arc::new(rule));
        rules.len() - 1
    }

    /// Rule at `index`
    pub fn get(&self, index: usize) -> Option<Arc<Rule>> {
        self.rules.read().get(index).cloned()
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    /// Whether the store has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Iterate from the most recently appended rule to the oldest
    ///
    /// The iterator is bounded by the store length at the time of this
    /// call: rules appended while it is in use are not yielded.
    pub fn iter_from_most_recent(&self) -> RuleIter<'_> {
        RuleIter {
            store: self,
            next: self.len(),
        }
    }
}

/// Lazy reverse-order iterator over a [`RuleStore`]
///
/// Yields `(index, rule)` pairs. No lock is held between calls to `next`.
#[derive(Debug)]
pub struct RuleIter<'a> {
    store: &'a RuleStore,
    /// One past the index of the next rule to yield
    next: usize,
}

impl Iterator for RuleIter<'_> {
    type Item = (usize, Arc<Rule>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == 0 {
            return None;
        }
        self.next -= 1;
        self.store.get(self.next).map(|rule| (self.next, rule))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.next, Some(self.next))
    }
}
