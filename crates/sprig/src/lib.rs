//! Sprig - a declarative tag builder
//!
//! Sprig builds element trees in an in-memory document from nested child
//! values and keeps small stateful widgets in sync with it:
//!
//! - **Document**: node arena, selectors, events, HTML and Taffy layout
//!   (`sprig-dom`)
//! - **Builder**: one factory per HTML tag, render closures, attribute maps
//!   and event bindings (`sprig-ui`)
//! - **Widgets**: identified fragments that re-render and replace themselves
//!
//! # Quick Start
//!
//! ```rust
//! use sprig::prelude::*;
//!
//! let doc = Document::new();
//! let ids = IdGenerator::default();
//! let counter = Counter::new(&doc, &ids);
//! counter.append_to(doc.body()).unwrap();
//!
//! let plus = doc.query_selector(doc.root(), "#widget1 button").unwrap().unwrap();
//! doc.click(plus).unwrap();
//! assert_eq!(counter.count(), 1);
//! ```
//!
//! # Features
//!
//! - `ui` (default) - the tag builder and widgets

pub use sprig_core as core;
pub use sprig_core::{Config, ProfilingMode, init};
pub use sprig_dom as dom;

#[cfg(feature = "ui")]
pub use sprig_ui as ui;

pub mod prelude {
    pub use sprig_core::math::Vec2;
    pub use sprig_core::{Config, ProfilingMode};

    pub use sprig_dom::{Document, DocumentConfig, DomError, DomResult, Event, NodeId};

    #[cfg(feature = "ui")]
    pub use sprig_ui::{
        AttrValue, Appendable, Attributes, Child, Counter, HtmlBuilder, IdGenerator, Root,
        SimpleCounter, Tag, UiError, UiResult, Widget, embed, render,
    };
}

#[cfg(all(test, feature = "ui"))]
mod tests {
    use super::prelude::*;
    use sprig_test_utils::TestPage;

    #[test]
    fn test_prelude_builds_tree() {
        let page = TestPage::new();
        page.html()
            .div((Attributes::new().set("id", "app"), "hello"))
            .unwrap();
        assert_eq!(page.body_html(), r#"<div id="app">hello</div>"#);
    }
}
