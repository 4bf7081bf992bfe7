//! Sprig UI - declarative tag builder and widgets
//!
//! This crate builds element trees in a [`sprig_dom::Document`] from nested
//! child values:
//! - One builder method per HTML tag (`html.div(..)`, `html.span(..)`, ...)
//! - Children may be text, attribute maps, render closures, existing tags,
//!   widgets, or any nesting of those
//! - Function-valued attributes become event listeners
//! - Widgets re-render themselves and swap their subtree in place
//!
//! ## Quick Start
//!
//! ```rust
//! use sprig_dom::Document;
//! use sprig_ui::{Attributes, HtmlBuilder, render};
//!
//! let doc = Document::new();
//! let html = HtmlBuilder::new(&doc, doc.body()).unwrap();
//!
//! html.div((
//!     Attributes::new().set("class", "greeting"),
//!     render(|html| {
//!         html.h1("Hello")?;
//!         html.p(("Sprig ", "says hi"))?;
//!         Ok(())
//!     }),
//! ))
//! .unwrap();
//!
//! assert_eq!(
//!     doc.inner_html(doc.body()).unwrap(),
//!     r#"<div class="greeting"><h1>Hello</h1><p>Sprig says hi</p></div>"#
//! );
//! ```

pub mod builder;
pub mod child;
pub mod error;
pub mod tag;
pub mod tags;
pub mod widget;
pub mod widget_id;
pub mod widgets;

pub use builder::{HtmlBuilder, Root};
pub use child::{AttrValue, Appendable, Attributes, Child, RenderFn, embed, render};
pub use error::{UiError, UiResult};
pub use tag::Tag;
pub use tags::TAG_NAMES;
pub use widget::{Content, WeakWidget, Widget};
pub use widget_id::IdGenerator;
pub use widgets::{Counter, SimpleCounter};
