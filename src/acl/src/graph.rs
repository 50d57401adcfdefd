//! Single-parent inheritance graph for roles and resources
//!
//! The graph is a forest: every node has at most one parent, and following
//! parent links always terminates at a root. The engine keeps two of them,
//! one for roles and one for resources.

use std::collections::HashMap;
use thiserror::Error;

/// Graph-related errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// Linking `node` under `parent` would make `node` its own ancestor
    #[error("Cycle detected: '{node}' cannot inherit from '{parent}'")]
    Cycle {
        /// Node being registered
        node: String,
        /// Requested parent
        parent: String,
    },
}

/// Graph node
#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    /// Parent node name, `None` for roots
    parent: Option<String>,
}

impl Node {
    fn root() -> Self {
        Self { parent: None }
    }

    fn child_of(parent: &str) -> Self {
        Self {
            parent: Some(parent.to_string()),
        }
    }
}

/// Named inheritance forest
///
/// # Example
///
/// ```
/// use cretoai_acl::graph::InheritanceGraph;
///
/// let mut roles = InheritanceGraph::new();
/// roles.add_node("editor", Some("member")).unwrap();
/// roles.add_node("member", Some("guest")).unwrap();
///
/// assert_eq!(roles.ancestors_of("editor"), vec!["editor", "member", "guest"]);
/// assert_eq!(roles.ancestors_of("stranger"), vec!["stranger"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    /// Node name -> node
    nodes: HashMap<String, Node>,
}

impl InheritanceGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Register `name` under `parent`
    ///
    /// An unknown `parent` is created as a root first. Registering a name
    /// that already exists overwrites its parent, so `None` turns it back
    /// into a root.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Cycle`] if `name` would become its own
    /// ancestor. The graph is left as it was, apart from an auto-created
    /// parent root.
    pub fn add_node(&mut self, name: &str, parent: Option<&str>) -> Result<(), GraphError> {
        let Some(parent) = parent else {
            self.nodes.insert(name.to_string(), Node::root());
            return Ok(());
        };

        if parent == name {
            return Err(GraphError::Cycle {
                node: name.to_string(),
                parent: parent.to_string(),
            });
        }

        self.ensure_node(parent);

        // Only an existing node can already sit above its new parent.
        if self.nodes.contains_key(name) && self.ancestors_of(parent).iter().any(|a| a == name) {
            return Err(GraphError::Cycle {
                node: name.to_string(),
                parent: parent.to_string(),
            });
        }

        self.nodes.insert(name.to_string(), Node::child_of(parent));
        Ok(())
    }

    /// Register `name` as a root if it is unknown; existing nodes are untouched
    ///
    /// Returns `true` if the node was created.
    pub fn ensure_node(&mut self, name: &str) -> bool {
        if self.nodes.contains_key(name) {
            return false;
        }
        self.nodes.insert(name.to_string(), Node::root());
        true
    }

    /// Ancestor chain of `name`, starting with `name` itself and ending at its root
    ///
    /// Unknown names are treated as isolated roots.
    pub fn ancestors_of(&self, name: &str) -> Vec<String> {
        let mut chain = vec![name.to_string()];
        let mut current = self.nodes.get(name).and_then(|n| n.parent.as_deref());

        while let Some(parent) = current {
            chain.push(parent.to_string());
            current = self.nodes.get(parent).and_then(|n| n.parent.as_deref());
        }

        chain
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Direct parent of `name`, if it is registered and not a root
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.nodes.get(name).and_then(|n| n.parent.as_deref())
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let graph = InheritanceGraph::new();
        assert!(graph.is_empty());
        assert_eq!(graph.ancestors_of("anyone"), vec!["anyone"]);
    }

    #[test]
    fn test_unknown_parent_is_created_as_root() {
        let mut graph = InheritanceGraph::new();
        graph.add_node("child", Some("parent")).unwrap();

        assert!(graph.contains("parent"));
        assert_eq!(graph.parent_of("parent"), None);
        assert_eq!(graph.parent_of("child"), Some("parent"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_linear_chain() {
        // guest <- member <- editor <- admin
        let mut graph = InheritanceGraph::new();
        graph.add_node("guest", None).unwrap();
        graph.add_node("member", Some("guest")).unwrap();
        graph.add_node("editor", Some("member")).unwrap();
        graph.add_node("admin", Some("editor")).unwrap();

        assert_eq!(
            graph.ancestors_of("admin"),
            vec!["admin", "editor", "member", "guest"]
        );
        assert_eq!(graph.ancestors_of("member"), vec!["member", "guest"]);
        assert_eq!(graph.ancestors_of("guest"), vec!["guest"]);
    }

    #[test]
    fn test_siblings_do_not_see_each_other() {
        let mut graph = InheritanceGraph::new();
        graph.add_node("blog", Some("site")).unwrap();
        graph.add_node("page", Some("site")).unwrap();

        let chain = graph.ancestors_of("blog");
        assert!(chain.contains(&"site".to_string()));
        assert!(!chain.contains(&"page".to_string()));
    }

    #[test]
    fn test_self_parent_rejected() {
        let mut graph = InheritanceGraph::new();
        let result = graph.add_node("loop", Some("loop"));

        assert_eq!(
            result,
            Err(GraphError::Cycle {
                node: "loop".to_string(),
                parent: "loop".to_string(),
            })
        );
        assert!(graph.is_empty());
    }

    #[test]
    fn test_two_node_cycle_rejected() {
        let mut graph = InheritanceGraph::new();
        graph.add_node("a", Some("b")).unwrap();

        let result = graph.add_node("b", Some("a"));
        assert!(matches!(result, Err(GraphError::Cycle { .. })));

        // Graph unchanged
        assert_eq!(graph.parent_of("b"), None);
        assert_eq!(graph.ancestors_of("a"), vec!["a", "b"]);
    }

    #[test]
    fn test_multi_node_cycle_rejected() {
        // c -> b -> a, then try a -> c
        let mut graph = InheritanceGraph::new();
        graph.add_node("b", Some("a")).unwrap();
        graph.add_node("c", Some("b")).unwrap();

        let result = graph.add_node("a", Some("c"));
        assert!(matches!(result, Err(GraphError::Cycle { .. })));
        assert_eq!(graph.ancestors_of("c"), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_reregistration_overwrites_parent() {
        let mut graph = InheritanceGraph::new();
        graph.add_node("writer", Some("member")).unwrap();
        graph.add_node("writer", Some("staff")).unwrap();

        assert_eq!(graph.ancestors_of("writer"), vec!["writer", "staff"]);
        // Old parent stays registered
        assert!(graph.contains("member"));

        graph.add_node("writer", None).unwrap();
        assert_eq!(graph.ancestors_of("writer"), vec!["writer"]);
    }

    #[test]
    fn test_ensure_node_keeps_existing_parent() {
        let mut graph = InheritanceGraph::new();
        graph.add_node("child", Some("parent")).unwrap();

        assert!(!graph.ensure_node("child"));
        assert_eq!(graph.parent_of("child"), Some("parent"));

        assert!(graph.ensure_node("orphan"));
        assert_eq!(graph.parent_of("orphan"), None);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut graph = InheritanceGraph::new();
        graph.add_node("Admin", Some("Staff")).unwrap();

        assert_eq!(graph.ancestors_of("admin"), vec!["admin"]);
        assert_eq!(graph.ancestors_of("Admin"), vec!["Admin", "Staff"]);
    }
}
