//! Role output type.

use crate::message::SystemMessage;
use crate::node::Node;

/// Nodes and diagnostics produced by a role handler.
///
/// Plain handlers may return nodes together with warnings. A composite role
/// only ever returns one of three states: a single node, a non-empty list of
/// messages, or nothing at all.
///
/// # Example
///
/// ```
/// use combo_roles::{Element, RoleOutput};
///
/// let output = RoleOutput::node(Element::inline_text("strong", "foo"));
/// assert_eq!(output.nodes.len(), 1);
/// assert!(output.messages.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleOutput {
    /// Produced nodes.
    pub nodes: Vec<Node>,
    /// Diagnostics.
    pub messages: Vec<SystemMessage>,
}

impl RoleOutput {
    /// Create an output from nodes and messages.
    #[must_use]
    pub fn new(nodes: Vec<Node>, messages: Vec<SystemMessage>) -> Self {
        Self { nodes, messages }
    }

    /// A single node, no messages.
    #[must_use]
    pub fn node(node: impl Into<Node>) -> Self {
        Self::new(vec![node.into()], Vec::new())
    }

    /// Several nodes, no messages.
    #[must_use]
    pub fn nodes(nodes: Vec<Node>) -> Self {
        Self::new(nodes, Vec::new())
    }

    /// A single error message, no nodes.
    #[must_use]
    pub fn error(message: SystemMessage) -> Self {
        Self::new(Vec::new(), vec![message])
    }

    /// Messages only, no nodes.
    #[must_use]
    pub fn messages(messages: Vec<SystemMessage>) -> Self {
        Self::new(Vec::new(), messages)
    }

    /// Neither nodes nor messages.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether nothing was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Reporter;
    use crate::node::Element;

    #[test]
    fn test_node() {
        let output = RoleOutput::node(Element::inline_text("literal", "x"));
        assert_eq!(output.nodes.len(), 1);
        assert!(output.messages.is_empty());
        assert!(!output.is_empty());
    }

    #[test]
    fn test_error() {
        let msg = Reporter::default().error("boom", 1);
        let output = RoleOutput::error(msg.clone());
        assert!(output.nodes.is_empty());
        assert_eq!(output.messages, vec![msg]);
    }

    #[test]
    fn test_empty() {
        assert!(RoleOutput::empty().is_empty());
        assert_eq!(RoleOutput::empty(), RoleOutput::default());
    }
}
