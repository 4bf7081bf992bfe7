//! Declarative builder API for constructing element trees.

use crate::child::Child;
use crate::error::{UiError, UiResult};
use crate::tag::Tag;
use sprig_core::profiling::profile_function;
use sprig_dom::{Document, NodeId};

/// Where a builder puts the elements it creates.
#[derive(Debug, Clone, Copy)]
pub enum Root<'a> {
    /// A new, detached document fragment.
    Fragment,
    Tag(&'a Tag),
    /// First element in the document matching the selector.
    Selector(&'a str),
    Node(NodeId),
}

impl<'a> From<&'a Tag> for Root<'a> {
    fn from(tag: &'a Tag) -> Self {
        Root::Tag(tag)
    }
}

impl<'a> From<&'a str> for Root<'a> {
    fn from(selector: &'a str) -> Self {
        Root::Selector(selector)
    }
}

impl From<NodeId> for Root<'_> {
    fn from(node: NodeId) -> Self {
        Root::Node(node)
    }
}

impl<'a, T> From<Option<T>> for Root<'a>
where
    T: Into<Root<'a>>,
{
    fn from(root: Option<T>) -> Self {
        root.map_or(Root::Fragment, Into::into)
    }
}

/// Creates elements under a root tag.
///
/// Besides [`HtmlBuilder::tag`] there is one factory per entry of
/// [`TAG_NAMES`](crate::TAG_NAMES), so `html.div(..)` is `html.tag("div", ..)`.
///
/// ```
/// use sprig_dom::Document;
/// use sprig_ui::{Attributes, HtmlBuilder, render};
///
/// let doc = Document::new();
/// let html = HtmlBuilder::new(&doc, doc.body()).unwrap();
/// html.div((
///     Attributes::new().set("id", "card"),
///     render(|html| {
///         html.h1("Title")?;
///         html.p("Body")?;
///         Ok(())
///     }),
/// ))
/// .unwrap();
///
/// assert_eq!(
///     doc.inner_html(doc.body()).unwrap(),
///     r#"<div id="card"><h1>Title</h1><p>Body</p></div>"#
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HtmlBuilder {
    root: Tag,
}

impl HtmlBuilder {
    pub fn new<'a>(document: &Document, root: impl Into<Root<'a>>) -> UiResult<Self> {
        let root = match root.into() {
            Root::Fragment => return Ok(Self::fragment(document)),
            Root::Tag(tag) => tag.clone(),
            Root::Selector(selector) => {
                let node = document
                    .query_selector(document.root(), selector)?
                    .ok_or_else(|| UiError::NoMatch(selector.to_string()))?;
                Tag::new(document, node)
            }
            Root::Node(node) => {
                document.node_type(node)?;
                Tag::new(document, node)
            }
        };
        Ok(Self { root })
    }

    /// Builder over a new document fragment.
    pub fn fragment(document: &Document) -> Self {
        Self {
            root: Tag::new(document, document.create_document_fragment()),
        }
    }

    /// Builder over an existing tag.
    pub fn on(tag: &Tag) -> Self {
        Self { root: tag.clone() }
    }

    pub fn root(&self) -> &Tag {
        &self.root
    }

    pub fn document(&self) -> &Document {
        self.root.document()
    }

    /// Create a `tag_name` element, append `children` to it, then append it
    /// to the root.
    ///
    /// Children are appended while the element is still detached. If that
    /// fails the element is left detached and the root is unchanged.
    pub fn tag<'a>(&self, tag_name: &str, children: impl Into<Child<'a>>) -> UiResult<Tag> {
        profile_function!();
        let tag = Tag::create(self.document(), tag_name)?;
        tag.append(children)?;
        self.root.append_tag(&tag)?;
        Ok(tag)
    }

    /// Append children to the root.
    pub fn append<'a>(&self, children: impl Into<Child<'a>>) -> UiResult<&Self> {
        self.root.append(children)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::render;
    use std::cell::Cell;

    #[test]
    fn test_fragment_root() {
        let doc = Document::new();
        let html = HtmlBuilder::new(&doc, None::<NodeId>).unwrap();
        assert_eq!(
            doc.node_type(html.root().element()).unwrap(),
            sprig_dom::NodeType::Fragment
        );
    }

    #[test]
    fn test_selector_root() {
        let doc = Document::new();
        doc.set_inner_html(doc.body(), r#"<main id="app"></main>"#).unwrap();
        let html = HtmlBuilder::new(&doc, "#app").unwrap();
        html.span("hi").unwrap();
        assert_eq!(
            doc.inner_html(doc.body()).unwrap(),
            r#"<main id="app"><span>hi</span></main>"#
        );
        assert_eq!(
            HtmlBuilder::new(&doc, "#missing").err(),
            Some(UiError::NoMatch("#missing".into()))
        );
    }

    #[test]
    fn test_stale_node_root() {
        let doc = Document::new();
        let node = doc.create_element("div").unwrap();
        doc.release(node).unwrap();
        assert!(matches!(
            HtmlBuilder::new(&doc, node),
            Err(UiError::Dom(sprig_dom::DomError::StaleNode(_)))
        ));
    }

    #[test]
    fn test_render_scoped_to_new_element() {
        let doc = Document::new();
        let html = HtmlBuilder::fragment(&doc);
        let calls = Cell::new(0);
        let section = html
            .section(render(|inner| {
                calls.set(calls.get() + 1);
                assert_ne!(inner.root(), html.root());
                inner.p("nested")?;
                Ok(())
            }))
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(section.html().unwrap(), "<p>nested</p>");
        assert_eq!(doc.children(html.root().element()).unwrap(), vec![section.element()]);
    }

    #[test]
    fn test_failed_children_leave_root_unchanged() {
        let doc = Document::new();
        let html = HtmlBuilder::fragment(&doc);
        let result = html.div(("text", None::<&str>));
        assert_eq!(result.err(), Some(UiError::AbsentChild));
        assert!(doc.children(html.root().element()).unwrap().is_empty());
    }

    #[test]
    fn test_append_returns_builder() {
        let doc = Document::new();
        let html = HtmlBuilder::fragment(&doc);
        html.append("a").unwrap().append("b").unwrap();
        assert_eq!(html.root().text().unwrap(), "ab");
    }
}
