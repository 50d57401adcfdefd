//! # CretoAI ACL
//!
//! In-process access-control engine with role and resource inheritance.
//!
//! ## Features
//!
//! - **LIFO rule precedence**: the most recently added matching rule wins
//! - **Wildcards**: `None` as role or resource matches everything
//! - **Inheritance**: single-parent role and resource forests
//! - **Custom assertions**: async predicates that confirm, override or defer
//!   a rule's static effect
//! - **Fail-closed**: no matching rule means deny
//!
//! ## Example
//!
//! ```rust
//! use cretoai_acl::Acl;
//!
//! # tokio_test::block_on(async {
//! let acl = Acl::new();
//!
//! acl.add_role("member", Some("guest"))?;
//! acl.allow(Some("guest"), Some("blog"));
//! acl.deny(Some("guest"), Some("admin"));
//! acl.allow(Some("member"), Some("page"));
//!
//! assert!(acl.is_allowed(Some("member"), Some("blog")).await?);
//! assert!(!acl.is_allowed(Some("guest"), Some("page")).await?);
//! # Ok::<(), cretoai_acl::AclError>(())
//! # }).unwrap();
//! ```

pub mod assertion;
pub mod config;
pub mod decision;
pub mod engine;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod resolver;
pub mod rules;

// Re-export commonly used types
pub use assertion::{Assertion, AssertionOutcome, FnAssertion};
pub use config::AclConfig;
pub use decision::{Decision, DecisionReason};
pub use engine::Acl;
pub use error::{AclError, BoxError, Result};
pub use graph::{GraphError, InheritanceGraph};
pub use metrics::{AclMetrics, MetricsCollector};
pub use resolver::Resolver;
pub use rules::{Effect, Rule, RuleStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
