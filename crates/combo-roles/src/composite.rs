//! Composite roles.
//!
//! A composite role applies several registered roles to the same text and
//! nests their output. With components `[strong, literal]`:
//!
//! ```text
//! before:              after:
//!
//!   <strong>             <strong>
//!       foo                  <literal>
//!   <literal>                    foo
//!       foo
//! ```
//!
//! Components are invoked in declared order. The last one produces the
//! innermost node; every earlier one produces a wrapper that must hold exactly
//! one text child, which is replaced by the next node inwards.

use combo_config::CompositeRoleSpec;

use crate::call::RoleCall;
use crate::context::{InlinerState, NestingContext};
use crate::message::SystemMessage;
use crate::node::{Element, Node};
use crate::output::RoleOutput;
use crate::resolver::{ResolvedRole, resolve};
use crate::role::RoleFn;

/// Maximum number of composite roles and nested parses enclosing a composite role.
pub const MAX_NESTING_DEPTH: usize = 10;

/// A component output that cannot be composed.
///
/// The `Display` text is what the author sees in the reported message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CompositionError {
    /// A component role name did not resolve.
    #[error("no such role: {0}")]
    NoSuchRole(String),
    /// A component returned zero or several nodes.
    #[error("role should return exactly 1 node, but {count} found: [{nodes}]")]
    NodeCount {
        /// Number of returned nodes.
        count: usize,
        /// Returned nodes, comma separated.
        nodes: String,
    },
    /// A component returned a node of the wrong class for its position.
    #[error("node {node} is not one of ({expected})")]
    NodeClass {
        /// Offending node.
        node: String,
        /// Accepted classes.
        expected: &'static str,
    },
    /// A wrapper node does not have exactly one child.
    #[error("node {node} should have exactly 1 child, but {count} found")]
    ChildCount {
        /// Offending node.
        node: String,
        /// Number of children.
        count: usize,
    },
    /// A wrapper node's child is not a text leaf.
    #[error("child of node {node} should be Text, but {kind} found")]
    ChildKind {
        /// Offending node.
        node: String,
        /// Kind of the child.
        kind: String,
    },
    /// The innermost node cannot receive a nested parse result.
    #[error("nested parse requires a TextElement with a single Text child, but {node} found")]
    NestedParseTarget {
        /// Offending node.
        node: String,
    },
    /// Composite roles or nested parses are stacked too deep.
    #[error("maximum nesting depth ({0}) exceeded")]
    DepthExceeded(usize),
}

/// Why composition stopped.
enum Failure {
    /// Messages reported by a component or the nested parser, relayed as-is.
    Reported(Vec<SystemMessage>),
    /// Output that violates the composition contract.
    Violation(CompositionError),
}

impl From<CompositionError> for Failure {
    fn from(e: CompositionError) -> Self {
        Self::Violation(e)
    }
}

/// Role composed of other roles.
///
/// # Example
///
/// ```
/// use combo_roles::{CompositeRole, Inliner, InlinerState, Registry, Reporter, RoleCall};
///
/// let registry = Registry::with_standard_roles();
/// let reporter = Reporter::default();
/// let state = InlinerState::new(&registry, &Inliner, &reporter);
///
/// let role = CompositeRole::new(["strong", "literal"], false);
/// let output = role.run(&RoleCall::new("strong-literal", "foo", 1), &state);
///
/// assert_eq!(output.nodes[0].to_string(), "<strong><literal>foo</literal></strong>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRole {
    rolenames: Vec<String>,
    nested_parse: bool,
}

impl CompositeRole {
    /// Create a composite role from component role names, outermost first.
    #[must_use]
    pub fn new<I, S>(rolenames: I, nested_parse: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rolenames: rolenames.into_iter().map(Into::into).collect(),
            nested_parse,
        }
    }

    /// Component role names, outermost first.
    #[must_use]
    pub fn rolenames(&self) -> &[String] {
        &self.rolenames
    }

    /// Whether the innermost text is parsed again as inline markup.
    #[must_use]
    pub fn nested_parse(&self) -> bool {
        self.nested_parse
    }

    /// Run all components on `call` and nest their output.
    ///
    /// Returns a single node, or the messages explaining why no node was
    /// produced. An empty component list produces neither.
    #[must_use]
    pub fn run(&self, call: &RoleCall, state: &InlinerState<'_>) -> RoleOutput {
        tracing::debug!(
            role = %call.name,
            components = ?self.rolenames,
            line = call.line,
            "Composing role"
        );

        match self.compose(call, state) {
            Ok(Some(node)) => RoleOutput::node(node),
            Ok(None) => RoleOutput::empty(),
            Err(Failure::Reported(messages)) => RoleOutput::messages(messages),
            Err(Failure::Violation(e)) => {
                RoleOutput::error(state.reporter.error(e.to_string(), call.line))
            }
        }
    }

    fn compose(&self, call: &RoleCall, state: &InlinerState<'_>) -> Result<Option<Node>, Failure> {
        if state.depth > MAX_NESTING_DEPTH {
            return Err(CompositionError::DepthExceeded(MAX_NESTING_DEPTH).into());
        }

        // Resolved on every call: component roles may be registered after
        // this composite role.
        let components = self.resolve_components(state)?;
        let inner = state.nested();

        let Some((last, outer)) = components.split_last() else {
            return Ok(None);
        };

        let mut wrappers = Vec::with_capacity(outer.len());
        for component in outer {
            let node = single_node(component.handler.call(call, &inner))?;
            wrappers.push(check_wrapper(node)?);
        }
        let mut innermost = check_innermost(single_node(last.handler.call(call, &inner))?)?;

        if self.nested_parse {
            parse_nested(&mut innermost, &wrappers, call, state)?;
        }

        Ok(Some(nest(wrappers, innermost)))
    }

    fn resolve_components(&self, state: &InlinerState<'_>) -> Result<Vec<ResolvedRole>, Failure> {
        self.rolenames
            .iter()
            .map(|name| {
                resolve(state.registry, name)
                    .ok_or_else(|| Failure::from(CompositionError::NoSuchRole(name.clone())))
            })
            .collect()
    }
}

impl From<&CompositeRoleSpec> for CompositeRole {
    fn from(spec: &CompositeRoleSpec) -> Self {
        Self::new(spec.rolenames.iter().cloned(), spec.nested_parse)
    }
}

impl RoleFn for CompositeRole {
    fn call(&self, call: &RoleCall, state: &InlinerState<'_>) -> RoleOutput {
        self.run(call, state)
    }
}

/// Take the only node of a component output.
fn single_node(output: RoleOutput) -> Result<Node, Failure> {
    let RoleOutput {
        mut nodes,
        messages,
    } = output;

    if !messages.is_empty() {
        return Err(Failure::Reported(messages));
    }

    match nodes.pop() {
        Some(node) if nodes.is_empty() => Ok(node),
        last => {
            nodes.extend(last);
            Err(CompositionError::NodeCount {
                count: nodes.len(),
                nodes: join_nodes(&nodes),
            }
            .into())
        }
    }
}

/// The innermost node may be any inline or text-bearing element.
fn check_innermost(node: Node) -> Result<Element, CompositionError> {
    match node {
        Node::Element(element) if element.class.is_inline() || element.class.is_text_element() => {
            Ok(element)
        }
        other => Err(CompositionError::NodeClass {
            node: other.to_string(),
            expected: "Inline, TextElement",
        }),
    }
}

/// A wrapper must be a text-bearing element holding a single text leaf.
fn check_wrapper(node: Node) -> Result<Element, CompositionError> {
    let element = match node {
        Node::Element(element) if element.class.is_text_element() => element,
        other => {
            return Err(CompositionError::NodeClass {
                node: other.to_string(),
                expected: "TextElement",
            });
        }
    };

    let violation = match element.children.as_slice() {
        [Node::Text(_)] => None,
        [child] => Some(CompositionError::ChildKind {
            node: element.to_string(),
            kind: child.kind().to_owned(),
        }),
        children => Some(CompositionError::ChildCount {
            node: element.to_string(),
            count: children.len(),
        }),
    };
    violation.map_or(Ok(element), Err)
}

/// Replace the innermost text with the inline markup it contains.
fn parse_nested(
    innermost: &mut Element,
    wrappers: &[Element],
    call: &RoleCall,
    state: &InlinerState<'_>,
) -> Result<(), Failure> {
    if !innermost.class.is_text_element()
        || !matches!(innermost.children.as_slice(), [Node::Text(_)])
    {
        return Err(CompositionError::NestedParseTarget {
            node: innermost.to_string(),
        }
        .into());
    }

    let memo = state.memo();
    let context = NestingContext {
        parent: &*innermost,
        wrappers,
    };
    let output = state.parser.parse(&call.text, call.line, &memo, &context);
    if !output.messages.is_empty() {
        return Err(Failure::Reported(output.messages));
    }

    innermost.replace_child_with(0, output.nodes);
    Ok(())
}

/// Nest each wrapper around the next one, ending with the innermost node.
fn nest(wrappers: Vec<Element>, innermost: Element) -> Node {
    wrappers
        .into_iter()
        .rev()
        .fold(Node::from(innermost), |inner, mut outer| {
            let replaced = outer.replace_sole_child(inner);
            debug_assert!(replaced.is_ok(), "wrappers hold exactly one child");
            outer.into()
        })
}

fn join_nodes(nodes: &[Node]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
