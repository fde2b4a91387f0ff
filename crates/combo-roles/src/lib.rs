//! Composite inline roles.
//!
//! This crate composes independently registered inline role handlers into a
//! new role, so that `` :strong-literal:`text` `` behaves like `:strong:`
//! applied around `:literal:` applied around `text`.
//!
//! # Architecture
//!
//! - [`Registry`] ([`RoleRegistry`]): role handlers keyed by name, in flat
//!   tables and per-domain tables
//! - [`resolve`]: maps a role name to a handler (`name`, `domain:name`, or an
//!   unqualified name searched in the primary domain, then `std`)
//! - [`CompositeRole`]: invokes every component on the same text, validates
//!   their output and nests it into a single node
//! - [`Inliner`]: inline markup parser used for nested parsing
//!
//! Diagnostics are returned as [`SystemMessage`]s, never as panics.
//!
//! # Example
//!
//! ```
//! use combo_config::Config;
//! use combo_roles::{Inliner, InlinerState, Registry, Reporter};
//!
//! let config = Config::parse(r#"
//! [roles]
//! strongref = [["strong", "ref"], false]
//! "#).unwrap();
//!
//! let mut registry = Registry::with_standard_roles();
//! registry.add_composite_roles(&config);
//!
//! let reporter = Reporter::new("index.rst");
//! let state = InlinerState::new(&registry, &Inliner, &reporter);
//! let output = Inliner.parse_text(":strongref:`install`", 1, &state);
//!
//! assert!(output.messages.is_empty());
//! assert_eq!(output.nodes[0].pformat(), concat!(
//!     "<strong>\n",
//!     "    <reference refdomain=\"std\" refexplicit=\"false\" reftarget=\"install\" reftype=\"ref\">\n",
//!     "        install\n",
//! ));
//! ```

mod call;
mod composite;
mod context;
mod inliner;
mod message;
mod node;
mod output;
mod registry;
mod resolver;
mod role;
mod standard;

pub use call::RoleCall;
pub use composite::{CompositeRole, CompositionError, MAX_NESTING_DEPTH};
pub use context::{InlinerState, NestedParser, NestingContext, ParseMemo};
pub use inliner::Inliner;
pub use message::{Level, Reporter, SystemMessage};
pub use node::{Element, ElementClass, Node};
pub use output::RoleOutput;
pub use registry::{DomainError, Registry, RoleRegistry, RoleTable};
pub use resolver::{DOMAIN_SEPARATOR, FALLBACK_DOMAIN, ResolvedRole, resolve};
pub use role::{RoleFn, RoleHandler};
