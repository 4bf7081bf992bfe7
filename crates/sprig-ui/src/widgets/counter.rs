//! Counter widgets: a count with `+` and `-` buttons.
//!
//! [`SimpleCounter`] owns a fixed `div#counter` and re-renders its content in
//! place. [`Counter`] is a [`Widget`] and replaces its whole subtree on every
//! change.
//!
//! Click handlers hold weak references, so a counter stops reacting once it
//! is dropped.

use crate::builder::{HtmlBuilder, Root};
use crate::child::{Appendable, Attributes, Child, embed, render};
use crate::error::UiResult;
use crate::tag::Tag;
use crate::widget::{WeakWidget, Widget};
use crate::widget_id::IdGenerator;
use sprig_dom::{Document, Event, Listener, listener};
use std::cell::Cell;
use std::rc::Rc;

/// Id of the element a [`SimpleCounter`] renders into.
pub const SIMPLE_COUNTER_ID: &str = "counter";

/// Render `count` and the two buttons. `step(delta)` builds each click listener.
fn render_count<C>(html: &HtmlBuilder, count: i64, step: C) -> UiResult<()>
where
    C: Fn(i64) -> Listener,
{
    html.span(count.to_string())?;
    html.button((Attributes::new().set("click", step(1)), "+"))?;
    html.button((Attributes::new().set("click", step(-1)), "-"))?;
    Ok(())
}

struct SimpleCounterState {
    document: Document,
    count: Cell<i64>,
}

/// Counter rendered into a fixed `div#counter`.
///
/// Updates always target the first `#counter` in the document, so a page
/// holds at most one `SimpleCounter`; a second one would redraw the first
/// element with its own count.
#[derive(Clone)]
pub struct SimpleCounter {
    state: Rc<SimpleCounterState>,
}

impl SimpleCounter {
    pub fn new(document: &Document) -> Self {
        Self {
            state: Rc::new(SimpleCounterState {
                document: document.clone(),
                count: Cell::new(0),
            }),
        }
    }

    pub fn count(&self) -> i64 {
        self.state.count.get()
    }

    pub fn append_to<'a>(&self, root: impl Into<Root<'a>>) -> UiResult<Tag> {
        let html = HtmlBuilder::new(&self.state.document, root)?;
        self.render_on(&html)
    }

    pub fn render_on(&self, html: &HtmlBuilder) -> UiResult<Tag> {
        html.div((
            Attributes::new().set("id", SIMPLE_COUNTER_ID),
            render(|html| self.render_content_on(html)),
        ))
    }

    pub fn render_content_on(&self, html: &HtmlBuilder) -> UiResult<()> {
        let state = Rc::downgrade(&self.state);
        render_count(html, self.count(), |delta| {
            let state = state.clone();
            listener(move |_: &Event| {
                if let Some(state) = state.upgrade() {
                    state.count.set(state.count.get() + delta);
                    if let Err(err) = (SimpleCounter { state }).update() {
                        tracing::warn!("Counter update failed: {}", err);
                    }
                }
            })
        })
    }

    /// Empty `#counter` and render the current count into it. Does nothing
    /// when `#counter` is not in the document.
    pub fn update(&self) -> UiResult<()> {
        let document = &self.state.document;
        let selector = format!("#{}", SIMPLE_COUNTER_ID);
        let Some(root) = document.query_selector(document.root(), &selector)? else {
            tracing::trace!("No #{} element, skipping update", SIMPLE_COUNTER_ID);
            return Ok(());
        };
        let html = HtmlBuilder::new(document, root)?;
        html.root().empty()?;
        self.render_content_on(&html)
    }
}

impl Appendable for SimpleCounter {
    fn append_to_tag(&self, tag: &Tag) -> UiResult<()> {
        self.render_on(&HtmlBuilder::on(tag)).map(|_| ())
    }
}

impl<'a> From<&'a SimpleCounter> for Child<'a> {
    fn from(counter: &'a SimpleCounter) -> Self {
        embed(counter)
    }
}

/// Counter built on [`Widget`]; every change replaces the widget's subtree.
#[derive(Clone)]
pub struct Counter {
    widget: Widget,
    count: Rc<Cell<i64>>,
}

impl Counter {
    pub fn new(document: &Document, ids: &IdGenerator) -> Self {
        let count = Rc::new(Cell::new(0));
        let shared = count.clone();
        let widget = Widget::new_cyclic(document, ids.next_id(), move |weak: &WeakWidget| {
            let weak = weak.clone();
            move |html: &HtmlBuilder| render_count(html, shared.get(), |delta| step(&shared, &weak, delta))
        });
        Self { widget, count }
    }

    pub fn count(&self) -> i64 {
        self.count.get()
    }

    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    pub fn append_to<'a>(&self, root: impl Into<Root<'a>>) -> UiResult<Tag> {
        self.widget.append_to(root)
    }

    pub fn update(&self) -> UiResult<()> {
        self.widget.update()
    }
}

fn step(count: &Rc<Cell<i64>>, widget: &WeakWidget, delta: i64) -> Listener {
    let count = Rc::downgrade(count);
    let widget = widget.clone();
    listener(move |_: &Event| {
        let (Some(count), Some(widget)) = (count.upgrade(), widget.upgrade()) else {
            return;
        };
        count.set(count.get() + delta);
        if let Err(err) = widget.update() {
            tracing::warn!("Counter '{}' update failed: {}", widget.id(), err);
        }
    })
}

impl Appendable for Counter {
    fn append_to_tag(&self, tag: &Tag) -> UiResult<()> {
        self.widget.render_on(&HtmlBuilder::on(tag)).map(|_| ())
    }
}

impl<'a> From<&'a Counter> for Child<'a> {
    fn from(counter: &'a Counter) -> Self {
        embed(counter)
    }
}
