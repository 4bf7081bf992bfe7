//! Child values accepted by [`Tag::append`](crate::Tag::append).
//!
//! Every child shape is resolved into a [`Child`] when it is converted, so
//! appending is a plain match:
//!
//! | Value                         | Effect                                   |
//! |-------------------------------|------------------------------------------|
//! | `None`                        | fails with [`UiError::AbsentChild`]      |
//! | tuple, `Vec`, array           | each element, in order                   |
//! | `&str`, `String`              | a text node                              |
//! | [`render`] closure            | called with a builder on the tag         |
//! | `&Tag`, widgets ([`embed`])   | the value appends itself                 |
//! | [`Attributes`]                | attributes, classes and listeners        |
//! | [`NodeId`]                    | the node is moved under the tag          |

use crate::builder::HtmlBuilder;
use crate::error::{UiError, UiResult};
use crate::tag::Tag;
use indexmap::IndexMap;
use sprig_dom::{Event, Listener, NodeId, listener};

/// Something that knows how to append itself to a tag.
pub trait Appendable {
    fn append_to_tag(&self, tag: &Tag) -> UiResult<()>;
}

impl<T: Appendable + ?Sized> Appendable for &T {
    fn append_to_tag(&self, tag: &Tag) -> UiResult<()> {
        (**self).append_to_tag(tag)
    }
}

/// Closure child, run with a builder rooted at the receiving tag.
pub type RenderFn<'a> = Box<dyn FnOnce(&HtmlBuilder) -> UiResult<()> + 'a>;

/// One child argument of [`Tag::append`](crate::Tag::append).
pub enum Child<'a> {
    Absent,
    Sequence(Vec<Child<'a>>),
    Text(String),
    Render(RenderFn<'a>),
    Appendable(Box<dyn Appendable + 'a>),
    Attributes(Attributes),
    Node(NodeId),
}

impl<'a> Child<'a> {
    /// Whether an absent value appears anywhere in this child.
    pub fn contains_absent(&self) -> bool {
        match self {
            Child::Absent => true,
            Child::Sequence(children) => children.iter().any(Child::contains_absent),
            _ => false,
        }
    }

    /// An empty sequence.
    pub fn none() -> Self {
        Child::Sequence(Vec::new())
    }
}

impl std::fmt::Debug for Child<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Child::Absent => f.write_str("Absent"),
            Child::Sequence(children) => f.debug_tuple("Sequence").field(children).finish(),
            Child::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Child::Render(_) => f.write_str("Render(..)"),
            Child::Appendable(_) => f.write_str("Appendable(..)"),
            Child::Attributes(attributes) => f.debug_tuple("Attributes").field(attributes).finish(),
            Child::Node(node) => f.debug_tuple("Node").field(node).finish(),
        }
    }
}

/// Wrap a closure as a child.
///
/// ```
/// use sprig_dom::Document;
/// use sprig_ui::{HtmlBuilder, render};
///
/// let doc = Document::new();
/// let html = HtmlBuilder::fragment(&doc);
/// let list = html
///     .ul(render(|html| {
///         for item in ["a", "b"] {
///             html.li(item)?;
///         }
///         Ok(())
///     }))
///     .unwrap();
/// assert_eq!(list.html().unwrap(), "<li>a</li><li>b</li>");
/// ```
pub fn render<'a, F>(f: F) -> Child<'a>
where
    F: FnOnce(&HtmlBuilder) -> UiResult<()> + 'a,
{
    Child::Render(Box::new(f))
}

/// Embed anything [`Appendable`] (tags, widgets, counters) as a child.
pub fn embed<'a, A>(appendable: A) -> Child<'a>
where
    A: Appendable + 'a,
{
    Child::Appendable(Box::new(appendable))
}

/// Value of an attribute entry.
#[derive(Clone)]
pub enum AttrValue {
    Text(String),
    /// Bound as an event listener named by the key.
    Handler(Listener),
}

impl std::fmt::Debug for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Text(text) => f.debug_tuple("Text").field(text).finish(),
            AttrValue::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<Listener> for AttrValue {
    fn from(value: Listener) -> Self {
        AttrValue::Handler(value)
    }
}

/// Ordered attribute map. Later entries with the same key replace earlier
/// ones.
///
/// `class` (and `klass`) entries add classes; handler entries bind event
/// listeners; everything else becomes a plain attribute.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    entries: IndexMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Bind `callback` to the `event_type` event.
    pub fn on<F>(self, event_type: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        self.set(event_type, AttrValue::Handler(listener(callback)))
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl IntoIterator for Attributes {
    type Item = (String, AttrValue);
    type IntoIter = indexmap::map::IntoIter<String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries
            .into_iter()
            .fold(Attributes::new(), |attributes, (key, value)| attributes.set(key, value))
    }
}

// Conversions

impl<'a> From<&str> for Child<'a> {
    fn from(text: &str) -> Self {
        Child::Text(text.to_string())
    }
}

impl<'a> From<String> for Child<'a> {
    fn from(text: String) -> Self {
        Child::Text(text)
    }
}

impl<'a> From<&String> for Child<'a> {
    fn from(text: &String) -> Self {
        Child::Text(text.clone())
    }
}

impl<'a> From<Attributes> for Child<'a> {
    fn from(attributes: Attributes) -> Self {
        Child::Attributes(attributes)
    }
}

impl<'a> From<NodeId> for Child<'a> {
    fn from(node: NodeId) -> Self {
        Child::Node(node)
    }
}

impl<'a> From<Tag> for Child<'a> {
    fn from(tag: Tag) -> Self {
        embed(tag)
    }
}

impl<'a> From<&'a Tag> for Child<'a> {
    fn from(tag: &'a Tag) -> Self {
        embed(tag)
    }
}

impl<'a> From<()> for Child<'a> {
    fn from(_: ()) -> Self {
        Child::none()
    }
}

impl<'a, T> From<Option<T>> for Child<'a>
where
    T: Into<Child<'a>>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Child::Absent,
        }
    }
}

impl<'a, T> From<Vec<T>> for Child<'a>
where
    T: Into<Child<'a>>,
{
    fn from(children: Vec<T>) -> Self {
        Child::Sequence(children.into_iter().map(Into::into).collect())
    }
}

impl<'a, T, const N: usize> From<[T; N]> for Child<'a>
where
    T: Into<Child<'a>>,
{
    fn from(children: [T; N]) -> Self {
        Child::Sequence(children.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_child_for_tuple {
    ($($name:ident),+) => {
        impl<'a, $($name),+> From<($($name,)+)> for Child<'a>
        where
            $($name: Into<Child<'a>>),+
        {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Child::Sequence(vec![$($name.into()),+])
            }
        }
    };
}

impl_child_for_tuple!(A);
impl_child_for_tuple!(A, B);
impl_child_for_tuple!(A, B, C);
impl_child_for_tuple!(A, B, C, D);
impl_child_for_tuple!(A, B, C, D, E);
impl_child_for_tuple!(A, B, C, D, E, F);
impl_child_for_tuple!(A, B, C, D, E, F, G);
impl_child_for_tuple!(A, B, C, D, E, F, G, H);

/// Reject absent values before anything is appended.
pub(crate) fn validate(child: &Child<'_>) -> UiResult<()> {
    if child.contains_absent() {
        return Err(UiError::AbsentChild);
    }
    Ok(())
}
