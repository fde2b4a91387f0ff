//! Configuration for composite inline roles.
//!
//! Parses `comboroles.toml` with serde and provides auto-discovery of the
//! config file in parent directories.
//!
//! ## Role Entries
//!
//! Each key of the `[roles]` table declares one composite role. Three entry
//! forms are accepted:
//!
//! ```toml
//! [roles]
//! strong-literal = ["strong", "literal"]
//! strongref = [["strong", "ref"], false]
//! parsed-em = { roles = ["emphasis"], nested_parse = true }
//! ```
//!
//! The plain sequence form never enables nested parsing.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "comboroles.toml";

/// A composite role declared in the configuration.
///
/// Component role names are kept unresolved: the roles they refer to may be
/// registered after the configuration is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeRoleSpec {
    /// Name the composite role is registered under.
    pub name: String,
    /// Component role names, outermost first.
    pub rolenames: Vec<String>,
    /// Whether the innermost text is parsed again as inline markup.
    pub nested_parse: bool,
}

/// Raw role entry as parsed from TOML.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoleEntryRaw {
    /// `name = ["a", "b"]`
    Sequence(Vec<String>),
    /// `name = [["a", "b"], true]`
    Pair(Vec<String>, bool),
    /// `name = { roles = ["a", "b"], nested_parse = true }`
    Table {
        roles: Vec<String>,
        #[serde(default)]
        nested_parse: bool,
    },
}

impl RoleEntryRaw {
    fn into_spec(self, name: String) -> CompositeRoleSpec {
        let (rolenames, nested_parse) = match self {
            Self::Sequence(rolenames) => (rolenames, false),
            Self::Pair(rolenames, nested_parse) | Self::Table {
                roles: rolenames,
                nested_parse,
            } => (rolenames, nested_parse),
        };
        CompositeRoleSpec {
            name,
            rolenames,
            nested_parse,
        }
    }
}

/// Composite roles configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Domain searched first for unqualified role names.
    ///
    /// An empty string behaves like an unset value.
    pub primary_domain: Option<String>,
    /// Role entries as parsed from TOML.
    roles: BTreeMap<String, RoleEntryRaw>,

    /// Resolved composite roles, sorted by name (set after parsing).
    #[serde(skip)]
    roles_resolved: Vec<CompositeRoleSpec>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `comboroles.toml` in current directory and parents.
    /// Without any file, an empty configuration is returned.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if parsing
    /// or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)
        } else if let Ok(cwd) = std::env::current_dir() {
            Self::load_discovered(&cwd)
        } else {
            Ok(Self::default())
        }
    }

    /// Load the config file found in `start` or its parents.
    ///
    /// Returns the default configuration when no file is found.
    fn load_discovered(start: &Path) -> Result<Self, ConfigError> {
        match Self::discover_config(start) {
            Some(discovered) => Self::load_from_file(&discovered),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unsupported entry
    /// shapes, and `ConfigError::Validation` for invalid role declarations.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve_roles();
        config.validate()?;
        Ok(config)
    }

    /// Declared composite roles, sorted by name.
    #[must_use]
    pub fn roles(&self) -> &[CompositeRoleSpec] {
        &self.roles_resolved
    }

    /// Primary domain, treating an empty value as unset.
    #[must_use]
    pub fn primary_domain(&self) -> Option<&str> {
        self.primary_domain.as_deref().filter(|d| !d.is_empty())
    }

    /// Validate role declarations.
    ///
    /// Called automatically by [`Config::parse`] and [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any declaration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for spec in &self.roles_resolved {
            Self::validate_role(spec)?;
        }
        self.validate_cycles()
    }

    /// Reject composite roles that reach themselves through other composites.
    fn validate_cycles(&self) -> Result<(), ConfigError> {
        let graph: BTreeMap<&str, &[String]> = self
            .roles_resolved
            .iter()
            .map(|spec| (spec.name.as_str(), spec.rolenames.as_slice()))
            .collect();

        let mut visited = BTreeSet::new();
        for spec in &self.roles_resolved {
            let mut path = Vec::new();
            Self::visit_role(&graph, &spec.name, &mut path, &mut visited)?;
        }
        Ok(())
    }

    /// Depth-first walk from `name`, with `path` holding the roles being expanded.
    fn visit_role<'a>(
        graph: &BTreeMap<&'a str, &'a [String]>,
        name: &'a str,
        path: &mut Vec<&'a str>,
        visited: &mut BTreeSet<&'a str>,
    ) -> Result<(), ConfigError> {
        if visited.contains(name) {
            return Ok(());
        }
        if let Some(start) = path.iter().position(|n| *n == name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(name);
            return Err(ConfigError::Validation(format!(
                "roles.{name} forms a cycle: {}",
                cycle.join(" -> ")
            )));
        }
        // Components that are not declared here are plain roles
        let Some(&components) = graph.get(name) else {
            return Ok(());
        };

        path.push(name);
        for component in components {
            Self::visit_role(graph, component, path, visited)?;
        }
        path.pop();
        visited.insert(name);
        Ok(())
    }

    fn validate_role(spec: &CompositeRoleSpec) -> Result<(), ConfigError> {
        require_non_empty(&spec.name, "roles key")?;
        if spec.name.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "roles.{} must not contain whitespace",
                spec.name
            )));
        }

        let field = format!("roles.{}", spec.name);
        if spec.rolenames.is_empty() {
            return Err(ConfigError::Validation(format!(
                "{field} must list at least one role"
            )));
        }
        for rolename in &spec.rolenames {
            require_non_empty(rolename, &field)?;
            if *rolename == spec.name {
                return Err(ConfigError::Validation(format!(
                    "{field} cannot contain itself"
                )));
            }
        }

        Ok(())
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Convert raw role entries into [`CompositeRoleSpec`]s.
    fn resolve_roles(&mut self) {
        self.roles_resolved = std::mem::take(&mut self.roles)
            .into_iter()
            .map(|(name, entry)| entry.into_spec(name))
            .collect();
    }
}
