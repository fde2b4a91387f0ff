//! Standard roles.
//!
//! Builtin formatting roles, the `std` domain cross-reference roles and the
//! `py` domain object roles. Installed by [`Registry::with_standard_roles`].

use std::sync::Arc;

use crate::call::RoleCall;
use crate::context::InlinerState;
use crate::node::{Element, ElementClass, Node};
use crate::output::RoleOutput;
use crate::registry::Registry;
use crate::role::RoleFn;

/// Builtin formatting roles: role name and element tag.
const GENERIC_ROLES: &[(&str, &str)] = &[
    ("strong", "strong"),
    ("emphasis", "emphasis"),
    ("literal", "literal"),
    ("subscript", "subscript"),
    ("sub", "subscript"),
    ("superscript", "superscript"),
    ("sup", "superscript"),
    ("title-reference", "title_reference"),
    ("title", "title_reference"),
    ("t", "title_reference"),
];

/// Cross-reference roles of the `std` domain.
const STD_ROLES: &[&str] = &["ref", "doc", "term", "keyword", "option"];

/// Object roles of the `py` domain.
const PY_ROLES: &[&str] = &["func", "class", "meth", "mod", "attr", "data", "exc", "obj"];

/// Register the standard roles and domains.
pub(crate) fn install(registry: &mut Registry) {
    for &(name, tag) in GENERIC_ROLES {
        registry.add_builtin_role(name, Arc::new(GenericRole { tag }));
    }
    registry.add_builtin_role("code", Arc::new(code_role));
    registry.add_builtin_role("abbreviation", Arc::new(abbreviation_role));
    registry.add_builtin_role("abbr", Arc::new(abbreviation_role));

    for &reftype in STD_ROLES {
        registry.add_domain_role(
            "std",
            reftype,
            Arc::new(XRefRole {
                domain: "std",
                reftype,
                literal: false,
            }),
        );
    }
    for &reftype in PY_ROLES {
        registry.add_domain_role(
            "py",
            reftype,
            Arc::new(XRefRole {
                domain: "py",
                reftype,
                literal: true,
            }),
        );
    }
}

/// Wraps the text in an element: `<tag>text</tag>`.
///
/// A `class` option is copied to the `classes` attribute.
struct GenericRole {
    tag: &'static str,
}

impl RoleFn for GenericRole {
    fn call(&self, call: &RoleCall, _state: &InlinerState<'_>) -> RoleOutput {
        let mut element = Element::inline_text(self.tag, call.text.as_str());
        if let Some(class) = call.option("class") {
            element = element.with_attribute("classes", class);
        }
        RoleOutput::node(element)
    }
}

/// `` :code:`text` ``, with an optional `language` option.
fn code_role(call: &RoleCall, _state: &InlinerState<'_>) -> RoleOutput {
    let classes = match call.option("language") {
        Some(language) => format!("code {language}"),
        None => "code".to_owned(),
    };
    let literal =
        Element::inline_text("literal", call.text.as_str()).with_attribute("classes", classes);
    RoleOutput::node(literal)
}

/// `` :abbr:`LIFO (last-in, first-out)` ``
fn abbreviation_role(call: &RoleCall, _state: &InlinerState<'_>) -> RoleOutput {
    let text = call.text.trim();
    let split = text
        .strip_suffix(')')
        .and_then(|rest| rest.split_once('('))
        .map(|(abbr, explanation)| (abbr.trim_end(), explanation));

    let element = match split {
        Some((abbr, explanation)) if !abbr.is_empty() => {
            Element::inline_text("abbreviation", abbr).with_attribute("explanation", explanation)
        }
        _ => Element::inline_text("abbreviation", text),
    };
    RoleOutput::node(element)
}

/// Cross-reference to a target in a domain: `` :ref:`Title <target>` ``.
struct XRefRole {
    domain: &'static str,
    reftype: &'static str,
    /// Whether the title is rendered as a literal (object references).
    literal: bool,
}

impl RoleFn for XRefRole {
    fn call(&self, call: &RoleCall, _state: &InlinerState<'_>) -> RoleOutput {
        let (title, target, explicit) = split_explicit_title(&call.text);

        let reference = Element::new("reference", ElementClass::InlineText)
            .with_attribute("refdomain", self.domain)
            .with_attribute("reftype", self.reftype)
            .with_attribute("reftarget", target)
            .with_attribute("refexplicit", explicit.to_string());

        let reference = if self.literal {
            reference.with_child(Element::inline_text("literal", title))
        } else {
            reference.with_child(Node::text(title))
        };
        RoleOutput::node(reference)
    }
}

/// Split `Title <target>` into title and target.
///
/// Returns the text as both title and target when no explicit title is given.
fn split_explicit_title(text: &str) -> (&str, &str, bool) {
    text.strip_suffix('>')
        .and_then(|rest| rest.rfind('<').map(|idx| (&rest[..idx], &rest[idx + 1..])))
        .filter(|(title, target)| title.ends_with(char::is_whitespace) && !target.is_empty())
        .map_or((text, text, false), |(title, target)| (title.trim_end(), target, true))
}
