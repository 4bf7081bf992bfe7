//! Element handles.

use crate::builder::HtmlBuilder;
use crate::child::{Appendable, AttrValue, Attributes, Child, validate};
use crate::error::UiResult;
use sprig_core::math::Vec2;
use sprig_core::profiling::profile_function;
use sprig_dom::style::parse_px;
use sprig_dom::{Document, DomError, Event, ListenerId, NodeId, listener};

/// Handle to one node of a [`Document`].
///
/// The document owns the node; a `Tag` is a cheap `(document, node)` pair and
/// reports [`DomError::StaleNode`] once the node is released.
///
/// Mutating methods return `&Self` so calls chain:
///
/// ```
/// use sprig_dom::Document;
/// use sprig_ui::Tag;
///
/// let doc = Document::new();
/// let tag = Tag::create(&doc, "p").unwrap();
/// tag.add_class("note").unwrap().append("Saved").unwrap();
/// assert_eq!(doc.outer_html(tag.element()).unwrap(), r#"<p class="note">Saved</p>"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    document: Document,
    node: NodeId,
}

impl Tag {
    pub fn new(document: &Document, node: NodeId) -> Self {
        Self {
            document: document.clone(),
            node,
        }
    }

    /// Create a detached element.
    pub fn create(document: &Document, tag_name: &str) -> UiResult<Self> {
        Ok(Self::new(document, document.create_element(tag_name)?))
    }

    pub fn element(&self) -> NodeId {
        self.node
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    // Appending

    /// Append another tag's node.
    pub fn append_tag(&self, tag: &Tag) -> UiResult<&Self> {
        self.document.append_child(self.node, tag.node)?;
        Ok(self)
    }

    /// Append children in order.
    ///
    /// Fails with [`UiError::AbsentChild`](crate::UiError::AbsentChild) if
    /// any child is absent, before anything is appended.
    pub fn append<'a>(&self, children: impl Into<Child<'a>>) -> UiResult<&Self> {
        profile_function!();
        let child = children.into();
        validate(&child)?;
        self.append_child(child)?;
        Ok(self)
    }

    fn append_child(&self, child: Child<'_>) -> UiResult<()> {
        match child {
            Child::Absent => Err(crate::UiError::AbsentChild),
            Child::Sequence(children) => {
                for child in children {
                    self.append_child(child)?;
                }
                Ok(())
            }
            Child::Text(text) => {
                let text = self.document.create_text_node(&text);
                self.document.append_child(self.node, text)?;
                Ok(())
            }
            Child::Render(render) => render(&HtmlBuilder::on(self)),
            Child::Appendable(appendable) => appendable.append_to_tag(self),
            Child::Attributes(attributes) => self.attr(attributes).map(|_| ()),
            Child::Node(node) => {
                self.document.append_child(self.node, node)?;
                Ok(())
            }
        }
    }

    // Events and attributes

    pub fn on<F>(&self, event_type: &str, callback: F) -> UiResult<ListenerId>
    where
        F: Fn(&Event) + 'static,
    {
        Ok(self
            .document
            .add_event_listener(self.node, event_type, listener(callback))?)
    }

    /// Remove a listener added with [`Tag::on`]. Returns whether it was
    /// registered.
    pub fn off(&self, event_type: &str, id: ListenerId) -> UiResult<bool> {
        Ok(self
            .document
            .remove_event_listener(self.node, event_type, id)?)
    }

    /// Apply every entry of an attribute map.
    pub fn attr(&self, attributes: impl Into<Attributes>) -> UiResult<&Self> {
        for (key, value) in attributes.into() {
            self.set_attribute(&key, value)?;
        }
        Ok(self)
    }

    /// Set one attribute.
    ///
    /// Handler values are bound as listeners for the `key` event, `class`
    /// (or `klass`) adds classes, anything else is a plain attribute.
    pub fn set_attribute(&self, key: &str, value: impl Into<AttrValue>) -> UiResult<&Self> {
        match value.into() {
            AttrValue::Handler(callback) => {
                self.document
                    .add_event_listener(self.node, key, callback)?;
            }
            AttrValue::Text(value) if key == "class" || key == "klass" => {
                self.add_class(&value)?;
            }
            AttrValue::Text(value) => self.document.set_attribute(self.node, key, &value)?,
        }
        Ok(self)
    }

    pub fn get_attribute(&self, key: &str) -> UiResult<Option<String>> {
        Ok(self.document.get_attribute(self.node, key)?)
    }

    pub fn add_class(&self, class_name: &str) -> UiResult<&Self> {
        self.document.add_class(self.node, class_name)?;
        Ok(self)
    }

    pub fn remove_class(&self, class_name: &str) -> UiResult<&Self> {
        self.document.remove_class(self.node, class_name)?;
        Ok(self)
    }

    pub fn has_class(&self, class_name: &str) -> UiResult<bool> {
        Ok(self.document.has_class(self.node, class_name)?)
    }

    // Style

    /// Computed value of a style property.
    pub fn css(&self, property: &str) -> UiResult<String> {
        Ok(self.document.computed_style(self.node, property)?)
    }

    /// Set an inline style property; an empty value clears it.
    pub fn set_css(&self, property: &str, value: &str) -> UiResult<&Self> {
        self.document
            .set_style_property(self.node, property, value)?;
        Ok(self)
    }

    /// Clear the inline `display` override.
    pub fn show(&self) -> UiResult<&Self> {
        self.set_css("display", "")
    }

    pub fn hide(&self) -> UiResult<&Self> {
        self.set_css("display", "none")
    }

    // Geometry

    /// Top-left corner in page coordinates.
    pub fn offset(&self) -> UiResult<Vec2> {
        let rect = self.document.bounding_client_rect(self.node)?;
        let scroll = self.document.scroll_position();
        Ok(Vec2::new(rect.x + scroll.x, rect.y + scroll.y))
    }

    /// The offset parent, or this tag when there is none.
    pub fn offset_parent(&self) -> UiResult<Tag> {
        let parent = self.document.offset_parent(self.node)?;
        Ok(Tag::new(&self.document, parent.unwrap_or(self.node)))
    }

    pub fn outer_height(&self, include_margin: bool) -> UiResult<f32> {
        let mut height = self.document.offset_height(self.node)?;
        if include_margin {
            height += parse_px(&self.css("margin-top")?) + parse_px(&self.css("margin-bottom")?);
        }
        Ok(height)
    }

    pub fn outer_width(&self, include_margin: bool) -> UiResult<f32> {
        let mut width = self.document.offset_width(self.node)?;
        if include_margin {
            width += parse_px(&self.css("margin-left")?) + parse_px(&self.css("margin-right")?);
        }
        Ok(width)
    }

    /// Offset relative to the offset parent.
    pub fn position(&self) -> UiResult<Vec2> {
        Ok(Vec2::new(
            self.document.offset_left(self.node)?,
            self.document.offset_top(self.node)?,
        ))
    }

    // Tree

    /// Release every child.
    pub fn empty(&self) -> UiResult<&Self> {
        self.document.empty(self.node)?;
        Ok(self)
    }

    /// Detach from the parent. The node stays usable.
    pub fn remove(&self) -> UiResult<()> {
        Ok(self.document.remove(self.node)?)
    }

    /// Put `node` where this tag is in its parent. This tag is detached.
    pub fn replace_with(&self, node: NodeId) -> UiResult<()> {
        let parent = self.document.parent(self.node)?.ok_or_else(|| {
            DomError::HierarchyRequest(format!("{:?} has no parent to replace it in", self.node))
        })?;
        self.document.replace_child(parent, node, self.node)?;
        Ok(())
    }

    /// Whether `node` is this tag's node or one of its descendants.
    pub fn contains(&self, node: NodeId) -> bool {
        self.document.contains(self.node, node)
    }

    pub fn html(&self) -> UiResult<String> {
        Ok(self.document.inner_html(self.node)?)
    }

    pub fn set_html(&self, markup: &str) -> UiResult<&Self> {
        self.document.set_inner_html(self.node, markup)?;
        Ok(self)
    }

    pub fn text(&self) -> UiResult<String> {
        Ok(self.document.text_content(self.node)?)
    }

    pub fn set_text(&self, text: &str) -> UiResult<&Self> {
        self.document.set_text_content(self.node, text)?;
        Ok(self)
    }

    /// Descendants matching `selector`, in document order.
    pub fn find(&self, selector: &str) -> UiResult<Vec<Tag>> {
        Ok(self
            .document
            .query_selector_all(self.node, selector)?
            .into_iter()
            .map(|node| Tag::new(&self.document, node))
            .collect())
    }

    pub fn matches(&self, selector: &str) -> UiResult<bool> {
        Ok(self.document.matches(self.node, selector)?)
    }
}

impl Appendable for Tag {
    fn append_to_tag(&self, tag: &Tag) -> UiResult<()> {
        tag.append_tag(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UiError;
    use std::cell::Cell;
    use std::rc::Rc;

    fn attached(doc: &Document, tag_name: &str) -> Tag {
        let tag = Tag::create(doc, tag_name).unwrap();
        Tag::new(doc, doc.body()).append_tag(&tag).unwrap();
        tag
    }

    #[test]
    fn test_append_text_and_nodes() {
        let doc = Document::new();
        let div = Tag::create(&doc, "div").unwrap();
        let em = doc.create_element("em").unwrap();
        div.append(("a", em, String::from("b"))).unwrap();
        assert_eq!(div.html().unwrap(), "a<em></em>b");
    }

    #[test]
    fn test_absent_child_appends_nothing() {
        let doc = Document::new();
        let div = Tag::create(&doc, "div").unwrap();
        let result = div.append(("first", None::<&str>));
        assert_eq!(result.err(), Some(UiError::AbsentChild));
        assert_eq!(div.html().unwrap(), "");
    }

    #[test]
    fn test_class_key_adds_classes() {
        let doc = Document::new();
        let div = Tag::create(&doc, "div").unwrap();
        div.attr([("class", "a b"), ("klass", "c")]).unwrap();
        div.set_attribute("class", "a d").unwrap();
        assert_eq!(div.get_attribute("class").unwrap().as_deref(), Some("a b c d"));
        assert!(div.has_class("c").unwrap());
        div.remove_class("a").unwrap();
        assert!(!div.has_class("a").unwrap());
    }

    #[test]
    fn test_on_and_off() {
        let doc = Document::new();
        let button = attached(&doc, "button");
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        let id = button.on("click", move |_| counter.set(counter.get() + 1)).unwrap();
        doc.click(button.element()).unwrap();
        assert!(button.off("click", id).unwrap());
        doc.click(button.element()).unwrap();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_show_hide() {
        let doc = Document::new();
        let div = attached(&doc, "div");
        div.hide().unwrap();
        assert_eq!(div.css("display").unwrap(), "none");
        div.show().unwrap();
        assert_eq!(div.css("display").unwrap(), "block");
        assert_eq!(div.get_attribute("style").unwrap(), None);
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let doc = Document::new();
        let list = Tag::create(&doc, "ul").unwrap();
        let items: Vec<Tag> = (0..3).map(|_| Tag::create(&doc, "li").unwrap()).collect();
        for item in &items {
            list.append_tag(item).unwrap();
        }
        let replacement = doc.create_element("li").unwrap();
        items[1].replace_with(replacement).unwrap();
        assert_eq!(
            doc.children(list.element()).unwrap(),
            vec![items[0].element(), replacement, items[2].element()]
        );
        assert_eq!(doc.parent(items[1].element()).unwrap(), None);
    }

    #[test]
    fn test_replace_with_requires_parent() {
        let doc = Document::new();
        let lonely = Tag::create(&doc, "div").unwrap();
        let other = doc.create_element("div").unwrap();
        assert!(matches!(
            lonely.replace_with(other),
            Err(UiError::Dom(DomError::HierarchyRequest(_)))
        ));
    }

    #[test]
    fn test_outer_size_with_margins() {
        let doc = Document::new();
        let div = attached(&doc, "div");
        div.set_css("height", "20px")
            .unwrap()
            .set_css("width", "30px")
            .unwrap()
            .set_css("margin", "1px 2px 3px 4px")
            .unwrap();
        assert_eq!(div.outer_height(false).unwrap(), 20.0);
        assert_eq!(div.outer_height(true).unwrap(), 24.0);
        assert_eq!(div.outer_width(false).unwrap(), 30.0);
        assert_eq!(div.outer_width(true).unwrap(), 36.0);
    }

    #[test]
    fn test_offset_parent_falls_back_to_self() {
        let doc = Document::new();
        let detached = Tag::create(&doc, "div").unwrap();
        assert_eq!(detached.offset_parent().unwrap(), detached);
        let div = attached(&doc, "div");
        assert_eq!(div.offset_parent().unwrap().element(), doc.body());
    }

    #[test]
    fn test_offset_adds_scroll() {
        let doc = Document::new();
        let spacer = attached(&doc, "div");
        spacer.set_css("height", "50px").unwrap();
        let div = attached(&doc, "div");
        doc.set_scroll_position(0.0, 20.0);
        assert_eq!(div.offset().unwrap(), Vec2::new(0.0, 50.0));
        assert_eq!(div.position().unwrap(), Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_find_and_matches() {
        let doc = Document::new();
        let div = attached(&doc, "div");
        div.set_html(r#"<p class="x">1</p><p>2</p><span class="x">3</span>"#)
            .unwrap();
        let found = div.find(".x").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].matches("p.x").unwrap());
        assert_eq!(found[1].text().unwrap(), "3");
        assert!(div.contains(found[1].element()));
    }
}
