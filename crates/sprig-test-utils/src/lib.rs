//! Test utilities for Sprig.
//!
//! Headless fixtures for exercising documents, builders and widgets:
//!
//! - [`TestPage`] - a fresh document with a builder rooted at `<body>`
//! - [`MutationProbe`] - asserts whether an operation touched the document
//! - [`assert_html!`] - compares serialized markup with a readable diff
//!
//! # Example
//!
//! ```rust
//! use sprig_test_utils::TestPage;
//!
//! let page = TestPage::new();
//! page.html().button("ok").unwrap();
//! page.click_button("ok");
//! assert_eq!(page.body_html(), "<button>ok</button>");
//! ```

use sprig_dom::{Document, DocumentConfig, NodeId};
use sprig_ui::{HtmlBuilder, Tag};

/// A document plus a builder appending to its `<body>`.
pub struct TestPage {
    document: Document,
    html: HtmlBuilder,
}

impl Default for TestPage {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPage {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    /// A page whose layout viewport is `width` by `height` pixels.
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self::with_config(DocumentConfig::default().viewport(width, height))
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        init_test_logging();
        let document = Document::with_config(config);
        let html = HtmlBuilder::on(&Tag::new(&document, document.body()));
        Self { document, html }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn html(&self) -> &HtmlBuilder {
        &self.html
    }

    pub fn body(&self) -> &Tag {
        self.html.root()
    }

    pub fn body_html(&self) -> String {
        self.document
            .inner_html(self.document.body())
            .expect("body is always live")
    }

    /// Text content of the first match for `selector`.
    ///
    /// # Panics
    /// If nothing matches.
    pub fn text_of(&self, selector: &str) -> String {
        let node = self.find(selector);
        self.document.text_content(node).expect("query results are live")
    }

    /// First match for `selector`.
    ///
    /// # Panics
    /// If the selector is invalid or nothing matches.
    pub fn find(&self, selector: &str) -> NodeId {
        self.try_find(selector)
            .unwrap_or_else(|| panic!("no element matches '{}'", selector))
    }

    pub fn try_find(&self, selector: &str) -> Option<NodeId> {
        self.document
            .query_selector(self.document.root(), selector)
            .unwrap_or_else(|err| panic!("invalid selector '{}': {}", selector, err))
    }

    /// First element matching `selector` whose text content is `text`.
    pub fn find_by_text(&self, selector: &str, text: &str) -> Option<NodeId> {
        self.document
            .query_selector_all(self.document.root(), selector)
            .unwrap_or_else(|err| panic!("invalid selector '{}': {}", selector, err))
            .into_iter()
            .find(|node| {
                self.document
                    .text_content(*node)
                    .is_ok_and(|content| content == text)
            })
    }

    /// Click the first `<button>` labelled `label`, returning how many
    /// listeners ran.
    ///
    /// # Panics
    /// If no button has that label.
    pub fn click_button(&self, label: &str) -> usize {
        let button = self
            .find_by_text("button", label)
            .unwrap_or_else(|| panic!("no button labelled '{}'", label));
        self.document.click(button).expect("button is live")
    }
}

/// Records the document's mutation counter so a test can check whether an
/// operation changed the tree.
pub struct MutationProbe {
    document: Document,
    start: u64,
}

impl MutationProbe {
    pub fn start(document: &Document) -> Self {
        Self {
            document: document.clone(),
            start: document.mutation_count(),
        }
    }

    /// Mutations since the probe started.
    pub fn mutations(&self) -> u64 {
        self.document.mutation_count() - self.start
    }

    #[track_caller]
    pub fn assert_unchanged(&self) {
        assert_eq!(
            self.mutations(),
            0,
            "expected no document mutations, saw {}",
            self.mutations()
        );
    }

    #[track_caller]
    pub fn assert_changed(&self) {
        assert!(self.mutations() > 0, "expected the document to change");
    }
}

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; output is captured by the test harness.
pub fn init_test_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Assert that the markup of `$actual` equals `$expected`.
///
/// `$actual` is anything implementing [`IntoMarkup`]: a string, a `&Tag`
/// (its inner HTML) or a `&TestPage` (the body's inner HTML).
#[macro_export]
macro_rules! assert_html {
    ($actual:expr, $expected:expr $(,)?) => {{
        let actual: String = $crate::IntoMarkup::into_markup($actual);
        let expected: &str = $expected;
        if actual != expected {
            panic!(
                "markup mismatch\n  expected: {}\n    actual: {}",
                expected, actual
            );
        }
    }};
}

/// Values [`assert_html!`] can compare.
pub trait IntoMarkup {
    fn into_markup(self) -> String;
}

impl IntoMarkup for String {
    fn into_markup(self) -> String {
        self
    }
}

impl IntoMarkup for &str {
    fn into_markup(self) -> String {
        self.to_string()
    }
}

impl IntoMarkup for &Tag {
    fn into_markup(self) -> String {
        self.html().expect("tag is live")
    }
}

impl IntoMarkup for &TestPage {
    fn into_markup(self) -> String {
        self.body_html()
    }
}
