//! Role handler trait.

use std::sync::Arc;

use crate::call::RoleCall;
use crate::context::InlinerState;
use crate::output::RoleOutput;

/// Handler for an inline role: `` :name:`text` ``.
///
/// Handlers are shared between documents that may be parsed in parallel, so
/// they must be `Send + Sync` and keep no per-document state. Closures with
/// the matching signature implement this trait.
///
/// # Example
///
/// ```
/// use combo_roles::{Element, InlinerState, RoleCall, RoleFn, RoleOutput};
///
/// struct Kbd;
///
/// impl RoleFn for Kbd {
///     fn call(&self, call: &RoleCall, _state: &InlinerState<'_>) -> RoleOutput {
///         RoleOutput::node(Element::inline_text("kbd", call.text.as_str()))
///     }
/// }
/// ```
pub trait RoleFn: Send + Sync {
    /// Process one role occurrence.
    fn call(&self, call: &RoleCall, state: &InlinerState<'_>) -> RoleOutput;
}

impl<F> RoleFn for F
where
    F: Fn(&RoleCall, &InlinerState<'_>) -> RoleOutput + Send + Sync,
{
    fn call(&self, call: &RoleCall, state: &InlinerState<'_>) -> RoleOutput {
        self(call, state)
    }
}

/// Shared handle to a role handler.
pub type RoleHandler = Arc<dyn RoleFn>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{NestedParser, NestingContext, ParseMemo};
    use crate::message::Reporter;
    use crate::node::{Element, Node};
    use crate::registry::Registry;

    struct NoParse;

    impl NestedParser for NoParse {
        fn parse(
            &self,
            _text: &str,
            _line: usize,
            _memo: &ParseMemo<'_>,
            _context: &NestingContext<'_>,
        ) -> RoleOutput {
            RoleOutput::empty()
        }
    }

    struct TestKbd;

    impl RoleFn for TestKbd {
        fn call(&self, call: &RoleCall, _state: &InlinerState<'_>) -> RoleOutput {
            RoleOutput::node(Element::inline_text("kbd", call.text.as_str()))
        }
    }

    #[test]
    fn test_struct_handler() {
        let registry = Registry::new();
        let reporter = Reporter::default();
        let state = InlinerState::new(&registry, &NoParse, &reporter);

        let output = TestKbd.call(&RoleCall::new("kbd", "Ctrl+C", 1), &state);
        assert_eq!(
            output.nodes,
            vec![Node::from(Element::inline_text("kbd", "Ctrl+C"))]
        );
    }

    #[test]
    fn test_closure_handler() {
        let registry = Registry::new();
        let reporter = Reporter::default();
        let state = InlinerState::new(&registry, &NoParse, &reporter);

        let handler: RoleHandler = Arc::new(|call: &RoleCall, state: &InlinerState<'_>| {
            RoleOutput::error(state.reporter.error(format!("bad: {}", call.text), call.line))
        });

        let output = handler.call(&RoleCall::new("bad", "x", 4), &state);
        assert!(output.nodes.is_empty());
        assert_eq!(output.messages[0].text, "bad: x");
        assert_eq!(output.messages[0].line, 4);
    }
}
