//! Role invocation arguments.

use std::collections::BTreeMap;

/// One occurrence of a role in a document: `` :name:`text` ``.
///
/// # Example
///
/// ```
/// use combo_roles::RoleCall;
///
/// let call = RoleCall::new("strong-literal", "foo", 3).with_option("class", "kw");
/// assert_eq!(call.rawtext, ":strong-literal:`foo`");
/// assert_eq!(call.option("class"), Some("kw"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleCall {
    /// Role name as written in the document.
    pub name: String,
    /// Complete source text of the occurrence, including the role marker.
    pub rawtext: String,
    /// Text between the backquotes.
    pub text: String,
    /// Line number where the occurrence appears (1-indexed).
    pub line: usize,
    /// Role options (from a `role` directive customization).
    pub options: BTreeMap<String, String>,
    /// Role content lines (from a `role` directive customization).
    pub content: Vec<String>,
}

impl RoleCall {
    /// Create a call with the raw text reconstructed from name and text.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>, line: usize) -> Self {
        let name = name.into();
        let text = text.into();
        Self {
            rawtext: format!(":{name}:`{text}`"),
            name,
            text,
            line,
            ..Default::default()
        }
    }

    /// Override the raw source text.
    #[must_use]
    pub fn with_rawtext(mut self, rawtext: impl Into<String>) -> Self {
        self.rawtext = rawtext.into();
        self
    }

    /// Set a role option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Set the role content lines.
    #[must_use]
    pub fn with_content(mut self, content: Vec<String>) -> Self {
        self.content = content;
        self
    }

    /// Get an option value by key.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }
}
