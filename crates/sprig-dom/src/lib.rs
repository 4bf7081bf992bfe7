//! Sprig DOM - an in-memory display tree
//!
//! The host document driven by the Sprig tag builder. It models the subset of
//! the browser document API the builder consumes:
//! - Node creation (elements, text, fragments) and tree mutation
//! - Attributes, class lists and inline styles
//! - Selector queries (`#id`, `.class`, `tag`, attributes, combinators)
//! - Event listeners with bubbling dispatch
//! - HTML serialization and fragment parsing
//! - Geometry queries backed by a Taffy layout pass
//!
//! ## Quick Start
//!
//! ```rust
//! use sprig_dom::Document;
//!
//! let doc = Document::new();
//! let div = doc.create_element("div").unwrap();
//! doc.set_attribute(div, "id", "greeting").unwrap();
//! let text = doc.create_text_node("Hello");
//! doc.append_child(div, text).unwrap();
//! doc.append_child(doc.body(), div).unwrap();
//!
//! assert_eq!(doc.outer_html(div).unwrap(), r#"<div id="greeting">Hello</div>"#);
//! assert_eq!(doc.get_element_by_id("greeting"), Some(div));
//! ```
//!
//! Nodes are addressed by [`NodeId`], a generational handle: once a subtree is
//! released every id into it reports [`DomError::StaleNode`].

pub mod config;
pub mod dirty;
pub mod document;
pub mod error;
pub mod event;
pub mod html;
pub mod layout;
pub mod node;
pub mod selector;
pub mod style;

pub use config::{DocumentConfig, TextMetrics};
pub use dirty::DirtyFlags;
pub use document::{Document, WeakDocument};
pub use error::{DomError, DomResult};
pub use event::{Event, Listener, ListenerId, listener};
pub use layout::{LayoutCache, LayoutRect};
pub use node::{NodeId, NodeType};
pub use selector::SelectorList;
pub use style::{InlineStyle, Length};
