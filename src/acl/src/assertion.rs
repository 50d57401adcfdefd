//! Custom runtime assertions attached to rules
//!
//! When the resolver reaches a matching rule that carries an assertion, the
//! assertion decides what happens next:
//!
//! - [`AssertionOutcome::Decision`] finalizes the whole query with its value,
//!   regardless of the rule's static effect.
//! - [`AssertionOutcome::Defer`] treats the rule as non-matching, and the
//!   walk resumes at the next older rule.
//! - An `Err` finalizes the query with [`AclError::Assertion`](crate::AclError)
//!   and older rules are never consulted.
//!
//! An assertion future that never completes leaves the query pending forever.
//! The engine imposes no timeout; wrap the call if bounded latency matters.

use crate::error::BoxError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// What a rule's assertion wants the resolver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssertionOutcome {
    /// Finalize the query with this verdict
    Decision(bool),
    /// Fall through to the next older matching rule
    Defer,
}

impl AssertionOutcome {
    /// Finalize as allowed
    pub fn allow() -> Self {
        Self::Decision(true)
    }

    /// Finalize as denied
    pub fn deny() -> Self {
        Self::Decision(false)
    }
}

/// Runtime predicate evaluated when its rule matches
///
/// Receives the role and resource from the query (not the rule's own
/// fields). `None` means the query itself used the wildcard.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use cretoai_acl::{Acl, Assertion, AssertionOutcome, BoxError};
/// use std::sync::Arc;
///
/// struct OfficeHours {
///     open: bool,
/// }
///
/// #[async_trait]
/// impl Assertion for OfficeHours {
///     async fn evaluate(
///         &self,
///         _role: Option<&str>,
///         _resource: Option<&str>,
///     ) -> Result<AssertionOutcome, BoxError> {
///         Ok(AssertionOutcome::Decision(self.open))
///     }
/// }
///
/// let acl = Acl::new();
/// acl.allow_with(Some("clerk"), Some("till"), Arc::new(OfficeHours { open: false }));
///
/// let allowed = tokio_test::block_on(acl.is_allowed(Some("clerk"), Some("till"))).unwrap();
/// assert!(!allowed);
/// ```
#[async_trait]
pub trait Assertion: Send + Sync {
    /// Evaluate the assertion for the queried role and resource
    async fn evaluate(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
    ) -> Result<AssertionOutcome, BoxError>;
}

/// Adapter turning a synchronous closure into an [`Assertion`]
pub struct FnAssertion<F> {
    f: F,
}

impl<F> FnAssertion<F>
where
    F: Fn(Option<&str>, Option<&str>) -> Result<AssertionOutcome, BoxError> + Send + Sync,
{
    /// Wrap a closure
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for FnAssertion<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAssertion").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Assertion for FnAssertion<F>
where
    F: Fn(Option<&str>, Option<&str>) -> Result<AssertionOutcome, BoxError> + Send + Sync,
{
    async fn evaluate(
        &self,
        role: Option<&str>,
        resource: Option<&str>,
    ) -> Result<AssertionOutcome, BoxError> {
        (self.f)(role, resource)
    }
}

/// Build a shareable assertion from a synchronous closure
///
/// ```
/// use cretoai_acl::{assertion, AssertionOutcome};
///
/// let only_drafts = assertion::from_fn(|_role, resource| {
///     Ok(match resource {
///         Some(name) if name.starts_with("draft-") => AssertionOutcome::allow(),
///         _ => AssertionOutcome::Defer,
///     })
/// });
/// # let _ = only_drafts;
/// ```
pub fn from_fn<F>(f: F) -> Arc<dyn Assertion>
where
    F: Fn(Option<&str>, Option<&str>) -> Result<AssertionOutcome, BoxError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnAssertion::new(f))
}
