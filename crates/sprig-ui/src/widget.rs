//! Re-renderable, identified fragments.

use crate::builder::{HtmlBuilder, Root};
use crate::child::{Appendable, Attributes, render};
use crate::error::{UiError, UiResult};
use crate::tag::Tag;
use crate::widget_id::IdGenerator;
use sprig_core::profiling::profile_function;
use sprig_dom::{Document, NodeId};
use std::fmt;
use std::rc::{Rc, Weak};

/// Renders a widget's content into a builder rooted at its `<widget>` tag.
pub type Content = Rc<dyn Fn(&HtmlBuilder) -> UiResult<()>>;

struct WidgetInner {
    id: String,
    document: Document,
    content: Option<Content>,
}

/// An identified fragment that can attach to a document and re-render itself.
///
/// A widget renders as `<widget id="..">` followed by its content. It is
/// attached while an element with its id is connected to the document;
/// [`Widget::update`] then re-renders and swaps the new element in for the
/// old one.
///
/// ```
/// use sprig_dom::Document;
/// use sprig_ui::Widget;
///
/// let doc = Document::new();
/// let widget = Widget::new(&doc, "greeting", |html| {
///     html.span("hello")?;
///     Ok(())
/// });
/// widget.append_to(doc.body()).unwrap();
/// assert_eq!(
///     doc.inner_html(doc.body()).unwrap(),
///     r#"<widget id="greeting"><span>hello</span></widget>"#
/// );
/// ```
#[derive(Clone)]
pub struct Widget {
    inner: Rc<WidgetInner>,
}

/// Non-owning handle to a [`Widget`], for content that refers back to its
/// own widget.
#[derive(Clone)]
pub struct WeakWidget {
    inner: Weak<WidgetInner>,
}

impl WeakWidget {
    pub fn upgrade(&self) -> Option<Widget> {
        self.inner.upgrade().map(|inner| Widget { inner })
    }
}

impl fmt::Debug for WeakWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakWidget")
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.inner.id)
            .field("has_content", &self.inner.content.is_some())
            .finish()
    }
}

impl Widget {
    pub fn new<F>(document: &Document, id: impl Into<String>, content: F) -> Self
    where
        F: Fn(&HtmlBuilder) -> UiResult<()> + 'static,
    {
        Self::from_parts(document, id.into(), Some(Rc::new(content)))
    }

    /// A widget whose content renders nothing.
    pub fn empty(document: &Document, id: impl Into<String>) -> Self {
        Self::from_parts(document, id.into(), None)
    }

    /// A widget with the next id from `ids`.
    pub fn generated<F>(document: &Document, ids: &IdGenerator, content: F) -> Self
    where
        F: Fn(&HtmlBuilder) -> UiResult<()> + 'static,
    {
        Self::new(document, ids.next_id(), content)
    }

    /// Build the content with a weak handle to the widget being created, so
    /// event handlers inside it can call [`Widget::update`].
    pub fn new_cyclic<M, F>(document: &Document, id: impl Into<String>, make_content: M) -> Self
    where
        M: FnOnce(&WeakWidget) -> F,
        F: Fn(&HtmlBuilder) -> UiResult<()> + 'static,
    {
        let id = id.into();
        let inner = Rc::new_cyclic(|weak| {
            let content = make_content(&WeakWidget {
                inner: weak.clone(),
            });
            WidgetInner {
                id,
                document: document.clone(),
                content: Some(Rc::new(content) as Content),
            }
        });
        Self { inner }
    }

    fn from_parts(document: &Document, id: String, content: Option<Content>) -> Self {
        Self {
            inner: Rc::new(WidgetInner {
                id,
                document: document.clone(),
                content,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakWidget {
        WeakWidget {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// The connected element carrying this widget's id.
    pub fn root_element(&self) -> Option<NodeId> {
        self.inner.document.get_element_by_id(&self.inner.id)
    }

    pub fn root(&self) -> Option<Tag> {
        self.root_element()
            .map(|node| Tag::new(&self.inner.document, node))
    }

    pub fn is_attached(&self) -> bool {
        self.root_element().is_some()
    }

    /// Render under `root`. Fails if the widget is already attached.
    pub fn append_to<'a>(&self, root: impl Into<Root<'a>>) -> UiResult<Tag> {
        self.ensure_detached()?;
        let html = HtmlBuilder::new(&self.inner.document, root)?;
        let tag = self.render_on(&html)?;
        tracing::debug!("Attached widget '{}'", self.inner.id);
        Ok(tag)
    }

    /// Empty `root`, then render into it.
    ///
    /// Fails without touching `root` when the widget is attached outside it.
    pub fn replace<'a>(&self, root: impl Into<Root<'a>>) -> UiResult<Tag> {
        let html = HtmlBuilder::new(&self.inner.document, root)?;
        match self.root_element() {
            Some(current) if !html.root().contains(current) => {
                return Err(UiError::AlreadyAttached(self.inner.id.clone()));
            }
            _ => {}
        }
        html.root().empty()?;
        let tag = self.render_on(&html)?;
        tracing::debug!("Attached widget '{}' in place of existing content", self.inner.id);
        Ok(tag)
    }

    /// Append the `<widget id=..>` root tag to the builder.
    pub fn render_root_on(&self, html: &HtmlBuilder) -> UiResult<Tag> {
        html.tag("widget", Attributes::new().set("id", self.inner.id.as_str()))
    }

    /// Render the root tag and the content into the builder.
    pub fn render_on(&self, html: &HtmlBuilder) -> UiResult<Tag> {
        let root = self.render_root_on(html)?;
        if let Some(content) = &self.inner.content {
            root.append(render(|html| content(html)))?;
        }
        Ok(root)
    }

    /// Re-render and replace the attached element in place.
    ///
    /// Does nothing when the widget is not attached. The replaced subtree is
    /// released, so ids into it become stale.
    pub fn update(&self) -> UiResult<()> {
        profile_function!();
        let Some(old_root) = self.root() else {
            tracing::trace!("Widget '{}' is not attached, skipping update", self.inner.id);
            return Ok(());
        };

        let document = &self.inner.document;
        let html = HtmlBuilder::fragment(document);
        let fragment = html.root().element();
        let new_root = match self.render_on(&html) {
            Ok(tag) => tag,
            Err(err) => {
                document.release(fragment)?;
                return Err(err);
            }
        };

        old_root.replace_with(new_root.element())?;
        document.release(old_root.element())?;
        document.release(fragment)?;
        tracing::debug!("Updated widget '{}'", self.inner.id);
        Ok(())
    }

    fn ensure_detached(&self) -> UiResult<()> {
        if self.is_attached() {
            return Err(UiError::AlreadyAttached(self.inner.id.clone()));
        }
        Ok(())
    }
}

/// Embedding renders a fresh copy, so a parent widget can re-render the
/// widgets it contains.
impl Appendable for Widget {
    fn append_to_tag(&self, tag: &Tag) -> UiResult<()> {
        self.render_on(&HtmlBuilder::on(tag)).map(|_| ())
    }
}

impl<'a> From<&'a Widget> for crate::child::Child<'a> {
    fn from(widget: &'a Widget) -> Self {
        crate::child::embed(widget)
    }
}

impl<'a> From<Widget> for crate::child::Child<'a> {
    fn from(widget: Widget) -> Self {
        crate::child::embed(widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_generated_ids() {
        let doc = Document::new();
        let ids = IdGenerator::default();
        let a = Widget::generated(&doc, &ids, |_| Ok(()));
        let b = Widget::generated(&doc, &ids, |_| Ok(()));
        assert_eq!(a.id(), "widget1");
        assert_eq!(b.id(), "widget2");
    }

    #[test]
    fn test_empty_widget_renders_root_only() {
        let doc = Document::new();
        let widget = Widget::empty(&doc, "w");
        let tag = widget.append_to(doc.body()).unwrap();
        assert_eq!(doc.outer_html(tag.element()).unwrap(), r#"<widget id="w"></widget>"#);
        assert!(widget.is_attached());
    }

    #[test]
    fn test_attach_twice_fails() {
        let doc = Document::new();
        let widget = Widget::empty(&doc, "w");
        widget.append_to(doc.body()).unwrap();
        assert_eq!(
            widget.append_to(doc.body()).err(),
            Some(UiError::AlreadyAttached("w".into()))
        );
    }

    #[test]
    fn test_render_into_fragment_is_not_attached() {
        let doc = Document::new();
        let widget = Widget::empty(&doc, "w");
        widget.append_to(None::<NodeId>).unwrap();
        assert!(!widget.is_attached());
    }

    #[test]
    fn test_update_failure_keeps_old_root() {
        let doc = Document::new();
        let fail = Rc::new(Cell::new(false));
        let flag = fail.clone();
        let widget = Widget::new(&doc, "w", move |html| {
            if flag.get() {
                html.span(None::<&str>)?;
            }
            html.span("ok")?;
            Ok(())
        });
        let root = widget.append_to(doc.body()).unwrap();
        fail.set(true);
        assert_eq!(widget.update().err(), Some(UiError::AbsentChild));
        assert_eq!(widget.root_element(), Some(root.element()));
        assert_eq!(root.text().unwrap(), "ok");
    }

    #[test]
    fn test_weak_widget_upgrade() {
        let doc = Document::new();
        let seen = Rc::new(Cell::new(false));
        let flag = seen.clone();
        let widget = Widget::new_cyclic(&doc, "w", move |weak| {
            let weak = weak.clone();
            move |_html: &HtmlBuilder| {
                flag.set(weak.upgrade().is_some());
                Ok(())
            }
        });
        widget.append_to(doc.body()).unwrap();
        assert!(seen.get());
        let weak = widget.downgrade();
        drop(widget);
        assert!(weak.upgrade().is_none());
    }
}
