//! Role name resolution.
//!
//! Maps a role name to a handler, in order:
//!
//! 1. the flat tables, by exact name;
//! 2. for `domain:name`, the role table of that one domain;
//! 3. for an unqualified name, the primary domain (if any), then `std`.

use std::fmt;

use crate::registry::{DomainError, RoleRegistry};
use crate::role::RoleHandler;

/// Separator between domain and role name in qualified names.
pub const DOMAIN_SEPARATOR: char = ':';

/// Domain searched last for unqualified names.
pub const FALLBACK_DOMAIN: &str = "std";

/// A role name resolved to its handler.
#[derive(Clone)]
pub struct ResolvedRole {
    /// Canonical name: the bare name for flat roles, `domain:name` otherwise.
    pub name: String,
    /// Handler to invoke.
    pub handler: RoleHandler,
}

impl fmt::Debug for ResolvedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRole")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Resolve a role name against `registry`.
///
/// Returns `None` when no handler is found. A domain that cannot be obtained
/// is logged as a warning and ends the resolution with `None`.
///
/// # Example
///
/// ```
/// use combo_roles::{resolve, Registry};
///
/// let registry = Registry::with_standard_roles();
///
/// assert_eq!(resolve(&registry, "strong").unwrap().name, "strong");
/// assert_eq!(resolve(&registry, "ref").unwrap().name, "std:ref");
/// assert!(resolve(&registry, "py:nonexistent").is_none());
/// ```
pub fn resolve(registry: &dyn RoleRegistry, name: &str) -> Option<ResolvedRole> {
    if let Some(handler) = registry.lookup_flat(name) {
        return Some(ResolvedRole {
            name: name.to_owned(),
            handler,
        });
    }

    let found = match name.split_once(DOMAIN_SEPARATOR) {
        Some((domain, local)) => lookup_in_domain(registry, domain, local),
        None => lookup_unqualified(registry, name),
    };

    found.unwrap_or_else(|e| {
        tracing::warn!(role = name, error = %e, "Failed to look up role domain");
        None
    })
}

/// Look up an unqualified name in the primary domain, then in `std`.
///
/// Stops at the first domain that cannot be obtained.
fn lookup_unqualified(
    registry: &dyn RoleRegistry,
    name: &str,
) -> Result<Option<ResolvedRole>, DomainError> {
    let primary = registry
        .primary_domain()
        .filter(|d| !d.is_empty() && *d != FALLBACK_DOMAIN);

    for domain in primary.into_iter().chain([FALLBACK_DOMAIN]) {
        if let Some(resolved) = lookup_in_domain(registry, domain, name)? {
            return Ok(Some(resolved));
        }
    }
    Ok(None)
}

/// Look up `name` in one domain.
fn lookup_in_domain(
    registry: &dyn RoleRegistry,
    domain: &str,
    name: &str,
) -> Result<Option<ResolvedRole>, DomainError> {
    let handler = registry.lookup_in_domain(domain, name)?;
    Ok(handler.map(|handler| ResolvedRole {
        name: format!("{domain}{DOMAIN_SEPARATOR}{name}"),
        handler,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::call::RoleCall;
    use crate::context::{InlinerState, NestedParser, NestingContext, ParseMemo};
    use crate::message::Reporter;
    use crate::node::Element;
    use crate::output::RoleOutput;
    use crate::registry::Registry;
    use crate::role::RoleFn;
    use pretty_assertions::assert_eq;

    fn tag_role(tag: &'static str) -> impl RoleFn {
        move |call: &RoleCall, _: &InlinerState<'_>| {
            RoleOutput::node(Element::inline_text(tag, call.text.as_str()))
        }
    }

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

    fn invoke(resolved: &ResolvedRole, registry: &Registry) -> RoleOutput {
        let reporter = Reporter::default();
        let state = InlinerState::new(registry, &NoParse, &reporter);
        resolved.handler.call(&RoleCall::new("x", "foo", 1), &state)
    }

    /// Registry whose domain lookups always fail, counting attempts.
    struct BrokenDomains {
        attempts: AtomicUsize,
    }

    impl RoleRegistry for BrokenDomains {
        fn lookup_flat(&self, _name: &str) -> Option<RoleHandler> {
            None
        }

        fn lookup_in_domain(
            &self,
            domain: &str,
            _name: &str,
        ) -> Result<Option<RoleHandler>, DomainError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(DomainError::UnknownDomain(domain.to_owned()))
        }

        fn primary_domain(&self) -> Option<&str> {
            Some("py")
        }
    }

    #[test]
    fn test_flat_name_kept_bare() {
        let registry = Registry::new().with_role("strong", tag_role("strong"));
        let resolved = resolve(&registry, "strong").unwrap();
        assert_eq!(resolved.name, "strong");
    }

    #[test]
    fn test_flat_lookup_wins_over_domains() {
        let registry = Registry::new()
            .with_role("term", tag_role("flat"))
            .with_domain_role("std", "term", tag_role("domain"));

        let resolved = resolve(&registry, "term").unwrap();
        assert_eq!(resolved.name, "term");
        assert_eq!(invoke(&resolved, &registry).nodes[0].kind(), "flat");
    }

    #[test]
    fn test_qualified_name_with_colon_in_flat_table() {
        let registry = Registry::new().with_role("py:func", tag_role("flat"));
        assert_eq!(resolve(&registry, "py:func").unwrap().name, "py:func");
    }

    #[test]
    fn test_qualified_lookup() {
        let registry = Registry::new().with_domain_role("py", "func", tag_role("literal"));
        let resolved = resolve(&registry, "py:func").unwrap();
        assert_eq!(resolved.name, "py:func");
    }

    #[test]
    fn test_qualified_lookup_never_falls_back_to_std() {
        let registry = Registry::new()
            .with_domain("py")
            .with_domain_role("std", "func", tag_role("literal"));

        assert!(resolve(&registry, "py:func").is_none());
    }

    #[test]
    fn test_qualified_lookup_unknown_domain() {
        let registry = Registry::new().with_domain_role("std", "func", tag_role("literal"));
        assert!(resolve(&registry, "py:func").is_none());
    }

    #[test]
    fn test_unqualified_without_primary_uses_std() {
        let registry = Registry::new()
            .with_domain_role("py", "ref", tag_role("py"))
            .with_domain_role("std", "ref", tag_role("std"));

        let resolved = resolve(&registry, "ref").unwrap();
        assert_eq!(resolved.name, "std:ref");
    }

    #[test]
    fn test_unqualified_prefers_primary_domain() {
        let registry = Registry::new()
            .with_primary_domain("py")
            .with_domain_role("py", "ref", tag_role("py"))
            .with_domain_role("std", "ref", tag_role("std"));

        let resolved = resolve(&registry, "ref").unwrap();
        assert_eq!(resolved.name, "py:ref");
    }

    #[test]
    fn test_unqualified_primary_miss_falls_back_to_std() {
        let registry = Registry::new()
            .with_primary_domain("py")
            .with_domain("py")
            .with_domain_role("std", "doc", tag_role("std"));

        let resolved = resolve(&registry, "doc").unwrap();
        assert_eq!(resolved.name, "std:doc");
    }

    #[test]
    fn test_not_found() {
        let registry = Registry::with_standard_roles();
        assert!(resolve(&registry, "nonexistent").is_none());
    }

    #[test]
    fn test_domain_error_is_not_found() {
        let registry = BrokenDomains {
            attempts: AtomicUsize::new(0),
        };

        assert!(resolve(&registry, "func").is_none());
        // Resolution stops at the first domain that cannot be obtained
        assert_eq!(registry.attempts.load(Ordering::SeqCst), 1);

        assert!(resolve(&registry, "c:func").is_none());
        assert_eq!(registry.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_domain_error_propagates_from_lookup() {
        let registry = BrokenDomains {
            attempts: AtomicUsize::new(0),
        };

        let err = lookup_unqualified(&registry, "func").unwrap_err();
        assert!(matches!(err, DomainError::UnknownDomain(ref d) if d == "py"));

        let err = lookup_in_domain(&registry, "c", "func").unwrap_err();
        assert_eq!(err.to_string(), r#"domain "c" is not registered"#);
    }

    #[test]
    fn test_unknown_primary_domain_stops_resolution() {
        let registry = Registry::new()
            .with_primary_domain("js")
            .with_domain_role("std", "ref", tag_role("reference"));

        assert!(matches!(
            lookup_unqualified(&registry, "ref"),
            Err(DomainError::UnknownDomain(ref d)) if d == "js"
        ));
        assert!(resolve(&registry, "ref").is_none());
        assert!(resolve(&registry, "std:ref").is_some());
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let registry = Registry::new().with_domain_role("std", "ref", tag_role("reference"));

        let first = resolve(&registry, "ref").unwrap();
        let second = resolve(&registry, "ref").unwrap();

        assert_eq!(first.name, second.name);
        assert!(Arc::ptr_eq(&first.handler, &second.handler));
        assert_eq!(invoke(&first, &registry), invoke(&second, &registry));
    }

    #[test]
    fn test_late_registration_is_visible() {
        let mut registry = Registry::new();
        assert!(resolve(&registry, "kbd").is_none());

        registry.add_role("kbd", Arc::new(tag_role("kbd")));
        assert!(resolve(&registry, "kbd").is_some());
    }
}
