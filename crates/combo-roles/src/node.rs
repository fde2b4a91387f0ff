//! Document tree nodes.
//!
//! Role handlers produce [`Node`]s: either plain [`Node::Text`] leaves or
//! [`Element`]s carrying a tag, attributes and children. What an element may
//! be used for depends on its [`ElementClass`]:
//!
//! | Class        | Inline | Text-bearing | Examples                        |
//! |--------------|--------|--------------|---------------------------------|
//! | `Inline`     | yes    | no           | `image`, `target`               |
//! | `Text`       | no     | yes          | `paragraph`, `literal_block`    |
//! | `InlineText` | yes    | yes          | `strong`, `literal`, `reference`|
//! | `Structural` | no     | no           | `section`, `container`          |

use std::collections::BTreeMap;
use std::fmt;

/// Category of an element, deciding where it may appear in a composed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "snake_case")
)]
pub enum ElementClass {
    /// Inline element that does not carry text.
    Inline,
    /// Text-bearing element outside inline flow.
    Text,
    /// Inline, text-bearing element.
    InlineText,
    /// Neither inline nor text-bearing.
    Structural,
}

impl ElementClass {
    /// Whether the element can appear in inline flow.
    #[must_use]
    pub fn is_inline(self) -> bool {
        matches!(self, Self::Inline | Self::InlineText)
    }

    /// Whether the element carries text children.
    #[must_use]
    pub fn is_text_element(self) -> bool {
        matches!(self, Self::Text | Self::InlineText)
    }
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inline => "Inline",
            Self::Text => "TextElement",
            Self::InlineText => "Inline+TextElement",
            Self::Structural => "Element",
        })
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Node {
    /// Plain text leaf.
    Text(String),
    /// Element with tag, attributes and children.
    Element(Element),
}

/// Element node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Element {
    /// Element tag (e.g., "strong", "reference").
    pub tag: String,
    /// Element category.
    pub class: ElementClass,
    /// Attributes, ordered by key.
    pub attributes: BTreeMap<String, String>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a text leaf.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Borrow the element, if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// Kind name for diagnostics: `Text` or the element tag.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Text(_) => "Text",
            Self::Element(element) => &element.tag,
        }
    }

    /// Concatenated text content.
    #[must_use]
    pub fn astext(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Element(element) => element.astext(),
        }
    }

    /// Indented pseudo-XML representation, one node per line.
    #[must_use]
    pub fn pformat(&self) -> String {
        let mut out = String::new();
        self.pformat_into(&mut out, 0);
        out
    }

    fn pformat_into(&self, out: &mut String, depth: usize) {
        let indent = "    ".repeat(depth);
        match self {
            Self::Text(text) => {
                for line in text.lines() {
                    out.push_str(&indent);
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Self::Element(element) => {
                out.push_str(&indent);
                element.write_start_tag(out);
                out.push('\n');
                for child in &element.children {
                    child.pformat_into(out, depth + 1);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Element(element) => fmt::Display::fmt(element, f),
        }
    }
}

impl Element {
    /// Create an empty element.
    #[must_use]
    pub fn new(tag: impl Into<String>, class: ElementClass) -> Self {
        Self {
            tag: tag.into(),
            class,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Create an inline, text-bearing element with a single text child.
    ///
    /// # Example
    ///
    /// ```
    /// use combo_roles::Element;
    ///
    /// let strong = Element::inline_text("strong", "foo");
    /// assert_eq!(strong.to_string(), "<strong>foo</strong>");
    /// ```
    #[must_use]
    pub fn inline_text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(tag, ElementClass::InlineText).with_child(Node::text(text))
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the element has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// First child, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    /// Replace the only child of this element.
    ///
    /// Returns the previous child, or gives `node` back unchanged when the
    /// element does not have exactly one child.
    pub fn replace_sole_child(&mut self, node: impl Into<Node>) -> Result<Node, Node> {
        let node = node.into();
        match self.children.as_mut_slice() {
            [only] => Ok(std::mem::replace(only, node)),
            _ => Err(node),
        }
    }

    /// Replace the child at `index` with a sequence of nodes.
    ///
    /// Returns `false` and leaves the element unchanged if `index` is out of range.
    pub fn replace_child_with(&mut self, index: usize, nodes: Vec<Node>) -> bool {
        if index >= self.children.len() {
            return false;
        }
        self.children.splice(index..=index, nodes);
        true
    }

    /// Concatenated text content of all descendants.
    #[must_use]
    pub fn astext(&self) -> String {
        self.children.iter().map(Node::astext).collect()
    }

    fn write_start_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(value);
            out.push('"');
        }
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut start = String::new();
        self.write_start_tag(&mut start);
        f.write_str(&start)?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.tag)
    }
}
