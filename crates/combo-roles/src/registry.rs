//! Role registry.
//!
//! Roles are registered either in flat tables keyed by name, or in domain
//! tables where they are looked up as `domain:name`.
//!
//! # Architecture
//!
//! [`RoleRegistry`] is the read-only interface the resolver works against.
//! [`Registry`] is the in-memory implementation: two flat tables checked in
//! order (roles added at runtime first, then builtin roles) plus one
//! [`RoleTable`] per domain.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use combo_config::Config;

use crate::composite::CompositeRole;
use crate::role::{RoleFn, RoleHandler};

/// Error raised while obtaining a domain.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DomainError {
    /// No domain is registered under this name.
    #[error("domain {0:?} is not registered")]
    UnknownDomain(String),
}

/// Read-only access to registered roles.
pub trait RoleRegistry: Send + Sync {
    /// Look up a role by its exact name in the flat tables.
    fn lookup_flat(&self, name: &str) -> Option<RoleHandler>;

    /// Look up `name` in the role table of `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError`] if the domain itself cannot be obtained.
    fn lookup_in_domain(
        &self,
        domain: &str,
        name: &str,
    ) -> Result<Option<RoleHandler>, DomainError>;

    /// Domain searched first for unqualified role names.
    fn primary_domain(&self) -> Option<&str>;
}

/// Table of role handlers keyed by name.
#[derive(Clone, Default)]
pub struct RoleTable {
    roles: HashMap<String, RoleHandler>,
}

impl RoleTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, handler: RoleHandler) {
        self.roles.insert(name.into(), handler);
    }

    /// Get a handler by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RoleHandler> {
        self.roles.get(name).map(Arc::clone)
    }

    /// Whether a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.roles.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl fmt::Debug for RoleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// In-memory role registry.
///
/// # Example
///
/// ```
/// use combo_roles::{Element, Registry, RoleCall, RoleOutput, RoleRegistry};
/// use combo_roles::InlinerState;
///
/// let registry = Registry::new()
///     .with_role("kbd", |call: &RoleCall, _: &InlinerState<'_>| {
///         RoleOutput::node(Element::inline_text("kbd", call.text.as_str()))
///     })
///     .with_primary_domain("py");
///
/// assert!(registry.lookup_flat("kbd").is_some());
/// assert_eq!(registry.primary_domain(), Some("py"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Roles added at runtime (extensions, configuration).
    roles: RoleTable,
    /// Builtin roles, consulted after `roles`.
    builtin: RoleTable,
    domains: HashMap<String, RoleTable>,
    primary_domain: Option<String>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard roles and domains installed.
    #[must_use]
    pub fn with_standard_roles() -> Self {
        let mut registry = Self::new();
        crate::standard::install(&mut registry);
        registry
    }

    /// Register a runtime role.
    #[must_use]
    pub fn with_role<R: RoleFn + 'static>(mut self, name: impl Into<String>, role: R) -> Self {
        self.add_role(name, Arc::new(role));
        self
    }

    /// Register a builtin role.
    #[must_use]
    pub fn with_builtin_role<R: RoleFn + 'static>(
        mut self,
        name: impl Into<String>,
        role: R,
    ) -> Self {
        self.add_builtin_role(name, Arc::new(role));
        self
    }

    /// Register a role inside a domain, creating the domain if needed.
    #[must_use]
    pub fn with_domain_role<R: RoleFn + 'static>(
        mut self,
        domain: &str,
        name: impl Into<String>,
        role: R,
    ) -> Self {
        self.add_domain_role(domain, name, Arc::new(role));
        self
    }

    /// Register an empty domain.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domains.entry(domain.into()).or_default();
        self
    }

    /// Set the domain searched first for unqualified names.
    #[must_use]
    pub fn with_primary_domain(mut self, domain: impl Into<String>) -> Self {
        self.set_primary_domain(Some(domain.into()));
        self
    }

    /// Register a runtime role, replacing any previous one with the same name.
    pub fn add_role(&mut self, name: impl Into<String>, handler: RoleHandler) {
        let name = name.into();
        if self.roles.contains(&name) {
            tracing::debug!(role = %name, "Overriding registered role");
        }
        self.roles.insert(name, handler);
    }

    /// Register a builtin role.
    pub fn add_builtin_role(&mut self, name: impl Into<String>, handler: RoleHandler) {
        self.builtin.insert(name, handler);
    }

    /// Register a role inside a domain, creating the domain if needed.
    pub fn add_domain_role(&mut self, domain: &str, name: impl Into<String>, handler: RoleHandler) {
        self.domains
            .entry(domain.to_owned())
            .or_default()
            .insert(name, handler);
    }

    /// Set or clear the primary domain.
    pub fn set_primary_domain(&mut self, domain: Option<String>) {
        self.primary_domain = domain.filter(|d| !d.is_empty());
    }

    /// Register every composite role declared in `config`.
    ///
    /// Component roles are not looked up here: they are resolved each time a
    /// composite role is used, so they may be registered later.
    pub fn add_composite_roles(&mut self, config: &Config) {
        if let Some(domain) = config.primary_domain() {
            self.set_primary_domain(Some(domain.to_owned()));
        }

        for spec in config.roles() {
            tracing::debug!(
                role = %spec.name,
                components = ?spec.rolenames,
                nested_parse = spec.nested_parse,
                "Registering composite role"
            );
            self.add_role(spec.name.clone(), Arc::new(CompositeRole::from(spec)));
        }
    }

    /// Names of all registered domains, sorted.
    #[must_use]
    pub fn domains(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.domains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl RoleRegistry for Registry {
    fn lookup_flat(&self, name: &str) -> Option<RoleHandler> {
        [&self.roles, &self.builtin]
            .into_iter()
            .find_map(|table| table.get(name))
    }

    fn lookup_in_domain(
        &self,
        domain: &str,
        name: &str,
    ) -> Result<Option<RoleHandler>, DomainError> {
        self.domains
            .get(domain)
            .map(|table| table.get(name))
            .ok_or_else(|| DomainError::UnknownDomain(domain.to_owned()))
    }

    fn primary_domain(&self) -> Option<&str> {
        self.primary_domain.as_deref()
    }
}

#[cfg(test)]
mod tests {
    // Registries are shared read-only between parallel document builds
    static_assertions::assert_impl_all!(super::Registry: Send, Sync);

    use super::*;
    use crate::call::RoleCall;
    use crate::context::InlinerState;
    use crate::node::Element;
    use crate::output::RoleOutput;
    use pretty_assertions::assert_eq;

    fn tag_role(tag: &'static str) -> impl RoleFn {
        move |call: &RoleCall, _: &InlinerState<'_>| {
            RoleOutput::node(Element::inline_text(tag, call.text.as_str()))
        }
    }

    fn same_handler(a: &RoleHandler, b: &RoleHandler) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
    }

    #[test]
    fn test_flat_lookup_prefers_runtime_roles() {
        let registry = Registry::new()
            .with_builtin_role("strong", tag_role("builtin"))
            .with_role("strong", tag_role("runtime"));

        let runtime = registry.roles.get("strong").unwrap();
        let found = registry.lookup_flat("strong").unwrap();
        assert!(same_handler(&found, &runtime));
    }

    #[test]
    fn test_flat_lookup_falls_back_to_builtin() {
        let registry = Registry::new().with_builtin_role("emphasis", tag_role("emphasis"));
        assert!(registry.lookup_flat("emphasis").is_some());
        assert!(registry.lookup_flat("strong").is_none());
    }

    #[test]
    fn test_domain_lookup() {
        let registry = Registry::new().with_domain_role("py", "func", tag_role("literal"));

        assert!(registry.lookup_in_domain("py", "func").unwrap().is_some());
        assert!(registry.lookup_in_domain("py", "class").unwrap().is_none());
    }

    #[test]
    fn test_unknown_domain_is_error() {
        let registry = Registry::new();
        let err = registry.lookup_in_domain("c", "func").err().unwrap();
        assert!(matches!(err, DomainError::UnknownDomain(ref d) if d == "c"));
        assert_eq!(err.to_string(), r#"domain "c" is not registered"#);
    }

    #[test]
    fn test_empty_domain_registered() {
        let registry = Registry::new().with_domain("js");
        assert!(registry.lookup_in_domain("js", "func").unwrap().is_none());
        assert_eq!(registry.domains(), vec!["js"]);
    }

    #[test]
    fn test_empty_primary_domain_is_unset() {
        let registry = Registry::new().with_primary_domain("");
        assert_eq!(registry.primary_domain(), None);
    }

    #[test]
    fn test_add_composite_roles() {
        let config = Config::parse(
            r#"
primary_domain = "py"

[roles]
strong-literal = ["strong", "literal"]
parsed-em = { roles = ["emphasis"], nested_parse = true }
"#,
        )
        .unwrap();

        let mut registry = Registry::new();
        registry.add_composite_roles(&config);

        assert_eq!(registry.roles.names(), vec!["parsed-em", "strong-literal"]);
        assert_eq!(registry.primary_domain(), Some("py"));
    }

    #[test]
    fn test_add_composite_roles_keeps_primary_domain() {
        let config = Config::parse("[roles]\nx = [\"strong\"]\n").unwrap();
        let mut registry = Registry::new().with_primary_domain("js");
        registry.add_composite_roles(&config);
        assert_eq!(registry.primary_domain(), Some("js"));
    }

    #[test]
    fn test_role_table_debug_lists_names() {
        let mut table = RoleTable::new();
        table.insert("b", Arc::new(tag_role("b")));
        table.insert("a", Arc::new(tag_role("a")));
        assert_eq!(format!("{table:?}"), r#"{"a", "b"}"#);
        assert_eq!(table.len(), 2);
    }
}
