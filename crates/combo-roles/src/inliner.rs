//! Inline markup parser.
//!
//! Recognizes interpreted text roles and the basic inline markup:
//!
//! - `` :name:`text` `` and `` :domain:name:`text` `` - dispatched to the registry
//! - `**text**` - strong
//! - `*text*` - emphasis
//! - ``` ``text`` ``` - literal
//!
//! Markup without a matching end-string is kept as text.

use crate::call::RoleCall;
use crate::context::{InlinerState, NestedParser, NestingContext, ParseMemo};
use crate::node::{Element, Node};
use crate::output::RoleOutput;
use crate::resolver::resolve;

/// Inline markup found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Markup<'a> {
    /// `` :name:`text` ``
    Role { name: &'a str, text: &'a str },
    /// `**text**`
    Strong(&'a str),
    /// `*text*`
    Emphasis(&'a str),
    /// ``` ``text`` ```
    Literal(&'a str),
}

/// Reference inline parser.
///
/// Used as the recursive-parse service for composite roles with nested
/// parsing enabled, and to parse whole lines of text.
///
/// # Example
///
/// ```
/// use combo_roles::{Inliner, InlinerState, Registry, Reporter};
///
/// let registry = Registry::with_standard_roles();
/// let reporter = Reporter::default();
/// let state = InlinerState::new(&registry, &Inliner, &reporter);
///
/// let output = Inliner.parse_text("Call :literal:`main` **now**", 1, &state);
/// let html: Vec<String> = output.nodes.iter().map(ToString::to_string).collect();
/// assert_eq!(html, ["Call ", "<literal>main</literal>", " ", "<strong>now</strong>"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Inliner;

impl Inliner {
    /// Parse one run of inline text.
    #[must_use]
    pub fn parse_text(&self, text: &str, line: usize, state: &InlinerState<'_>) -> RoleOutput {
        let mut output = RoleOutput::empty();
        let mut pending = String::new();
        let mut remaining = text;

        while let Some((markup, start, end)) = next_markup(remaining) {
            pending.push_str(&remaining[..start]);
            flush_text(&mut pending, &mut output.nodes);

            match markup {
                Markup::Role { name, text } => {
                    let call =
                        RoleCall::new(name, text, line).with_rawtext(&remaining[start..end]);
                    let produced = self.interpret(&call, state);
                    output.nodes.extend(produced.nodes);
                    output.messages.extend(produced.messages);
                }
                Markup::Strong(text) => {
                    output.nodes.push(Element::inline_text("strong", text).into());
                }
                Markup::Emphasis(text) => {
                    output.nodes.push(Element::inline_text("emphasis", text).into());
                }
                Markup::Literal(text) => {
                    output.nodes.push(Element::inline_text("literal", text).into());
                }
            }

            remaining = &remaining[end..];
        }

        pending.push_str(remaining);
        flush_text(&mut pending, &mut output.nodes);
        output
    }

    /// Dispatch an interpreted text role.
    fn interpret(&self, call: &RoleCall, state: &InlinerState<'_>) -> RoleOutput {
        if let Some(role) = resolve(state.registry, &call.name) {
            return role.handler.call(call, state);
        }

        let message = state.reporter.error(
            format!("Unknown interpreted text role \"{}\".", call.name),
            call.line,
        );
        let problematic = Element::inline_text("problematic", call.rawtext.as_str());
        RoleOutput::new(vec![problematic.into()], vec![message])
    }
}

impl NestedParser for Inliner {
    fn parse(
        &self,
        text: &str,
        line: usize,
        memo: &ParseMemo<'_>,
        _context: &NestingContext<'_>,
    ) -> RoleOutput {
        self.parse_text(text, line, &memo.state(self))
    }
}

fn flush_text(pending: &mut String, nodes: &mut Vec<Node>) {
    if !pending.is_empty() {
        nodes.push(Node::Text(std::mem::take(pending)));
    }
}

/// Find the first complete markup in `s`.
///
/// Returns the markup with its start and end byte offsets.
fn next_markup(s: &str) -> Option<(Markup<'_>, usize, usize)> {
    let mut prev: Option<char> = None;

    for (idx, c) in s.char_indices() {
        // Start-strings must not follow a word character
        let at_boundary = prev.is_none_or(|p| !p.is_alphanumeric());
        prev = Some(c);

        if !at_boundary {
            continue;
        }

        let found = match c {
            ':' => parse_role(s, idx),
            '*' if s[idx..].starts_with("**") => {
                parse_delimited(s, idx, "**").map(|(text, end)| (Markup::Strong(text), end))
            }
            '*' => {
                parse_delimited(s, idx, "*").map(|(text, end)| (Markup::Emphasis(text), end))
            }
            '`' if s[idx..].starts_with("``") => {
                parse_delimited(s, idx, "``").map(|(text, end)| (Markup::Literal(text), end))
            }
            _ => None,
        };

        if let Some((markup, end)) = found {
            return Some((markup, idx, end));
        }
    }

    None
}

/// Parse `text` enclosed by `delim` starting at `start`.
fn parse_delimited<'a>(s: &'a str, start: usize, delim: &str) -> Option<(&'a str, usize)> {
    let content_start = start + delim.len();
    let after = &s[content_start..];

    // Start-string must be followed by non-whitespace
    if after.starts_with(char::is_whitespace) {
        return None;
    }

    let close = after.find(delim)?;
    let text = &after[..close];
    if text.is_empty() || text.ends_with(char::is_whitespace) {
        return None;
    }

    Some((text, content_start + close + delim.len()))
}

/// Parse `` :name:`text` `` starting at the colon at `start`.
fn parse_role(s: &str, start: usize) -> Option<(Markup<'_>, usize)> {
    let after = &s[start + 1..];
    let name_end = after.find(":`")?;
    let name = &after[..name_end];
    if !is_valid_role_name(name) {
        return None;
    }

    let text_start = start + 1 + name_end + 2;
    let close = s[text_start..].find('`')?;
    let text = &s[text_start..text_start + close];
    if text.is_empty() {
        return None;
    }

    Some((Markup::Role { name, text }, text_start + close + 1))
}

/// Role names: alphanumerics and `-_.+`, optionally qualified as `domain:name`.
fn is_valid_role_name(name: &str) -> bool {
    !name.is_empty()
        && name.split(':').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '+'))
        })
}
