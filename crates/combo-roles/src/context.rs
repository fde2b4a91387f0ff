//! Inline parser state handed to role handlers.
//!
//! Provides the reporter, the role registry and the recursive-parse service
//! to role handlers.

use crate::message::Reporter;
use crate::node::Element;
use crate::output::RoleOutput;
use crate::registry::RoleRegistry;

/// Default document language.
const DEFAULT_LANGUAGE: &str = "en";

/// State of the inline parser at the point a role occurrence is processed.
///
/// # Example
///
/// ```
/// use combo_roles::{InlinerState, Inliner, Registry, Reporter};
///
/// let registry = Registry::with_standard_roles();
/// let reporter = Reporter::new("guide.rst");
/// let state = InlinerState::new(&registry, &Inliner, &reporter);
///
/// assert_eq!(state.document, "guide.rst");
/// assert_eq!(state.depth, 0);
/// ```
#[derive(Clone, Copy)]
pub struct InlinerState<'a> {
    /// Name of the document being parsed.
    pub document: &'a str,
    /// Reporter for diagnostics.
    pub reporter: &'a Reporter,
    /// Document language code.
    pub language: &'a str,
    /// Registry role names are resolved against.
    pub registry: &'a dyn RoleRegistry,
    /// Recursive inline parser.
    pub parser: &'a dyn NestedParser,
    /// Number of nested parses and composite roles enclosing this state.
    pub depth: usize,
}

impl<'a> InlinerState<'a> {
    /// Create a top-level state.
    ///
    /// The document name is taken from the reporter source.
    #[must_use]
    pub fn new(
        registry: &'a dyn RoleRegistry,
        parser: &'a dyn NestedParser,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            document: reporter.source().unwrap_or("<string>"),
            reporter,
            language: DEFAULT_LANGUAGE,
            registry,
            parser,
            depth: 0,
        }
    }

    /// Set the document language.
    #[must_use]
    pub fn with_language(mut self, language: &'a str) -> Self {
        self.language = language;
        self
    }

    /// Copy of this state one level deeper, for the components of a
    /// composite role.
    #[must_use]
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    /// Context bundle for a nested parse one level below this state.
    #[must_use]
    pub fn memo(&self) -> ParseMemo<'a> {
        ParseMemo {
            document: self.document,
            reporter: self.reporter,
            language: self.language,
            registry: self.registry,
            depth: self.depth + 1,
        }
    }
}

/// Context bundle passed to a nested parse, inherited from the enclosing state.
#[derive(Clone, Copy)]
pub struct ParseMemo<'a> {
    /// Name of the document being parsed.
    pub document: &'a str,
    /// Reporter for diagnostics.
    pub reporter: &'a Reporter,
    /// Document language code.
    pub language: &'a str,
    /// Registry role names are resolved against.
    pub registry: &'a dyn RoleRegistry,
    /// Nesting depth of the parse this memo is for.
    pub depth: usize,
}

impl<'a> ParseMemo<'a> {
    /// Rebuild an inliner state driven by `parser`.
    #[must_use]
    pub fn state(&self, parser: &'a dyn NestedParser) -> InlinerState<'a> {
        InlinerState {
            document: self.document,
            reporter: self.reporter,
            language: self.language,
            registry: self.registry,
            parser,
            depth: self.depth,
        }
    }
}

/// Where a nested parse result is going to be spliced.
#[derive(Debug, Clone, Copy)]
pub struct NestingContext<'a> {
    /// Element whose text child is replaced by the parse result.
    pub parent: &'a Element,
    /// Elements that will wrap `parent`, outermost first.
    pub wrappers: &'a [Element],
}

/// Recursive inline markup parser.
pub trait NestedParser: Send + Sync {
    /// Parse `text` as inline markup.
    ///
    /// Returns the nodes replacing the parent's text child, or messages when
    /// parsing failed.
    fn parse(
        &self,
        text: &str,
        line: usize,
        memo: &ParseMemo<'_>,
        context: &NestingContext<'_>,
    ) -> RoleOutput;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::registry::Registry;

    struct EchoParser;

    impl NestedParser for EchoParser {
        fn parse(
            &self,
            text: &str,
            _line: usize,
            _memo: &ParseMemo<'_>,
            _context: &NestingContext<'_>,
        ) -> RoleOutput {
            RoleOutput::nodes(vec![Node::text(text)])
        }
    }

    #[test]
    fn test_new_defaults() {
        let registry = Registry::new();
        let reporter = Reporter::default();
        let state = InlinerState::new(&registry, &EchoParser, &reporter);

        assert_eq!(state.document, "<string>");
        assert_eq!(state.language, "en");
        assert_eq!(state.depth, 0);
    }

    #[test]
    fn test_memo_increments_depth() {
        let registry = Registry::new();
        let reporter = Reporter::new("index.rst");
        let state = InlinerState::new(&registry, &EchoParser, &reporter).with_language("de");

        let memo = state.memo();
        assert_eq!(memo.document, "index.rst");
        assert_eq!(memo.language, "de");
        assert_eq!(memo.depth, 1);

        let nested = memo.state(&EchoParser);
        assert_eq!(nested.depth, 1);
        assert_eq!(nested.memo().depth, 2);
    }

    #[test]
    fn test_nested_keeps_context() {
        let registry = Registry::new();
        let reporter = Reporter::new("index.rst");
        let state = InlinerState::new(&registry, &EchoParser, &reporter).with_language("de");

        let nested = state.nested();
        assert_eq!(nested.document, "index.rst");
        assert_eq!(nested.language, "de");
        assert_eq!(nested.depth, 1);
        assert_eq!(state.depth, 0);
    }
}
