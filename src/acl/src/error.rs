//! Error types for the access-control engine

use crate::graph::GraphError;
use thiserror::Error;

/// Boxed error produced by a custom assertion
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Access-control engine errors
#[derive(Debug, Error)]
pub enum AclError {
    /// A rule's assertion failed; the decision is indeterminate
    #[error("Assertion on rule #{rule} failed: {source}")]
    Assertion {
        /// Insertion index of the rule whose assertion failed
        rule: usize,
        /// Error returned by the assertion, untouched
        #[source]
        source: BoxError,
    },

    /// Inheritance graph mutation was rejected
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl AclError {
    /// Returns the assertion's own error, if this is an assertion failure
    pub fn assertion_source(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Assertion { source, .. } => Some(source.as_ref()),
            Self::Graph(_) => None,
        }
    }
}

/// Result type for access-control operations
pub type Result<T> = std::result::Result<T, AclError>;
