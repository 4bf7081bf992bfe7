//! Node storage types.

use crate::event::RegisteredListener;
use indexmap::IndexMap;
use sprig_core::alloc::IndexSlot;
use std::fmt;

/// Handle to a node in a [`Document`](crate::Document).
///
/// Ids are generational: releasing a node invalidates every copy of its id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) IndexSlot);

impl NodeId {
    pub fn slot(&self) -> IndexSlot {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", self.0)
    }
}

/// Kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Fragment,
    Element,
    Text,
    Comment,
}

pub(crate) enum NodeKind {
    Document,
    Fragment,
    Element(ElementData),
    Text(String),
    Comment(String),
}

pub(crate) struct ElementData {
    /// Lower-cased tag name.
    pub(crate) tag_name: String,
    pub(crate) attributes: IndexMap<String, String>,
}

impl ElementData {
    pub(crate) fn new(tag_name: String) -> Self {
        Self {
            tag_name,
            attributes: IndexMap::new(),
        }
    }

    pub(crate) fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub(crate) fn has_class(&self, class_name: &str) -> bool {
        self.class_tokens().any(|token| token == class_name)
    }

    pub(crate) fn id(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }
}

pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) listeners: Vec<RegisteredListener>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub(crate) fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Fragment => NodeType::Fragment,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        }
    }

    pub(crate) fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Whether the node may take children.
    pub(crate) fn is_container(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document | NodeKind::Fragment | NodeKind::Element(_)
        )
    }
}

/// Validate a tag or attribute name.
///
/// Accepts ASCII letters, digits, `-`, `_`, `:` and `.`; the first character
/// must be a letter (or `_`/`:` for attributes such as `:foo` or `_x`).
pub(crate) fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("div"));
        assert!(is_valid_name("h1"));
        assert!(is_valid_name("data-count"));
        assert!(is_valid_name("my-widget"));
        assert!(is_valid_name("xml:lang"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1div"));
        assert!(!is_valid_name("di v"));
        assert!(!is_valid_name("<div>"));
        assert!(!is_valid_name("a\"b"));
    }

    #[test]
    fn test_class_tokens() {
        let mut element = ElementData::new("div".into());
        element
            .attributes
            .insert("class".into(), "  one two\tthree ".into());
        let tokens: Vec<_> = element.class_tokens().collect();
        assert_eq!(tokens, vec!["one", "two", "three"]);
        assert!(element.has_class("two"));
        assert!(!element.has_class("tw"));
    }
}
