//! Layout pass over the document, backed by Taffy.
//!
//! The Taffy tree is rebuilt from the document whenever a geometry query runs
//! after a layout-affecting mutation. Results are cached as page-space border
//! boxes keyed by [`NodeId`].

use crate::config::DocumentConfig;
use crate::node::{ElementData, Node, NodeId, NodeKind};
use crate::style::{InlineStyle, Length, initial_value};
use sprig_core::alloc::{HashMap, SparseSet};
use sprig_core::geometry::Rect;
use sprig_core::profiling::profile_function;
use taffy::TaffyTree;

/// Border box of a node in page coordinates.
pub type LayoutRect = Rect<f32>;

/// Page-space rectangles of every rendered node.
#[derive(Debug, Clone, Default)]
pub struct LayoutCache {
    rects: HashMap<NodeId, LayoutRect>,
}

impl LayoutCache {
    /// Rectangle of a rendered node. Hidden and detached nodes have none.
    pub fn get(&self, node: NodeId) -> Option<LayoutRect> {
        self.rects.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, LayoutRect)> + '_ {
        self.rects.iter().map(|(node, rect)| (*node, *rect))
    }
}

/// Measure context attached to text leaves.
struct TextContext {
    chars: usize,
    longest_word: usize,
}

/// Collapse whitespace runs to single spaces. Returns `None` for text that
/// renders nothing.
fn collapse_whitespace(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let mut collapsed = String::with_capacity(text.len());
    if text.starts_with(char::is_whitespace) {
        collapsed.push(' ');
    }
    collapsed.push_str(&words.join(" "));
    if text.ends_with(char::is_whitespace) {
        collapsed.push(' ');
    }
    Some(collapsed)
}

fn display_of(element: &ElementData, style: &InlineStyle) -> String {
    style
        .resolve("display")
        .unwrap_or_else(|| initial_value(&element.tag_name, "display"))
        .to_ascii_lowercase()
}

fn is_inline_level(display: &str) -> bool {
    matches!(display, "inline" | "inline-block" | "inline-flex")
}

fn inline_style(element: &ElementData) -> InlineStyle {
    element
        .attributes
        .get("style")
        .map(|css| InlineStyle::parse(css))
        .unwrap_or_default()
}

/// Whether every rendered child of `node` is inline-level.
fn has_only_inline_children(nodes: &SparseSet<Node>, node: &Node) -> bool {
    let mut rendered = 0;
    for child in &node.children {
        let Some(child) = nodes.try_get(child.0) else {
            continue;
        };
        match &child.kind {
            NodeKind::Text(text) if collapse_whitespace(text).is_some() => rendered += 1,
            NodeKind::Element(element) => {
                let display = display_of(element, &inline_style(element));
                if display == "none" {
                    continue;
                }
                if !is_inline_level(&display) {
                    return false;
                }
                rendered += 1;
            }
            _ => {}
        }
    }
    rendered > 0
}

fn length(style: &InlineStyle, tag_name: &str, property: &str) -> Length {
    let value = style
        .resolve(property)
        .unwrap_or_else(|| initial_value(tag_name, property));
    Length::parse(value).unwrap_or(Length::Auto)
}

fn sides<T>(mut side: impl FnMut(&str) -> T) -> taffy::Rect<T> {
    taffy::Rect {
        left: side("left"),
        right: side("right"),
        top: side("top"),
        bottom: side("bottom"),
    }
}

/// Map an element's inline style onto a Taffy style. `None` when the element
/// is not rendered.
fn taffy_style(element: &ElementData, style: &InlineStyle, inline_children: bool) -> Option<taffy::Style> {
    let tag = element.tag_name.as_str();
    let display = display_of(element, style);
    let keyword = |property: &str| -> String {
        style
            .resolve(property)
            .unwrap_or_else(|| initial_value(tag, property))
            .to_ascii_lowercase()
    };

    let row_wrap = (
        taffy::Display::Flex,
        taffy::FlexDirection::Row,
        taffy::FlexWrap::Wrap,
    );
    let (display, flex_direction, flex_wrap) = match display.as_str() {
        "none" => return None,
        "flex" | "inline-flex" => {
            let direction = match keyword("flex-direction").as_str() {
                "column" => taffy::FlexDirection::Column,
                "row-reverse" => taffy::FlexDirection::RowReverse,
                "column-reverse" => taffy::FlexDirection::ColumnReverse,
                _ => taffy::FlexDirection::Row,
            };
            let wrap = match keyword("flex-wrap").as_str() {
                "wrap" => taffy::FlexWrap::Wrap,
                "wrap-reverse" => taffy::FlexWrap::WrapReverse,
                _ => taffy::FlexWrap::NoWrap,
            };
            (taffy::Display::Flex, direction, wrap)
        }
        "grid" => (
            taffy::Display::Grid,
            taffy::FlexDirection::Row,
            taffy::FlexWrap::NoWrap,
        ),
        "inline" | "inline-block" => row_wrap,
        _ if inline_children => row_wrap,
        _ => (
            taffy::Display::Block,
            taffy::FlexDirection::Row,
            taffy::FlexWrap::NoWrap,
        ),
    };

    let position_keyword = keyword("position");
    let position = match position_keyword.as_str() {
        "absolute" | "fixed" => taffy::Position::Absolute,
        _ => taffy::Position::Relative,
    };
    let inset = if position_keyword == "static" {
        taffy::Rect {
            left: taffy::LengthPercentageAuto::Auto,
            right: taffy::LengthPercentageAuto::Auto,
            top: taffy::LengthPercentageAuto::Auto,
            bottom: taffy::LengthPercentageAuto::Auto,
        }
    } else {
        sides(|side| length(style, tag, side).to_length_percentage_auto())
    };

    let optional = |property: &str| {
        style
            .resolve(property)
            .and_then(Length::parse)
            .map(Length::to_dimension)
            .unwrap_or(taffy::Dimension::Auto)
    };
    let gap = style
        .resolve("gap")
        .and_then(Length::parse)
        .map(Length::to_length_percentage)
        .unwrap_or(taffy::LengthPercentage::Length(0.0));

    Some(taffy::Style {
        display,
        position,
        inset,
        size: taffy::Size {
            width: length(style, tag, "width").to_dimension(),
            height: length(style, tag, "height").to_dimension(),
        },
        min_size: taffy::Size {
            width: optional("min-width"),
            height: optional("min-height"),
        },
        max_size: taffy::Size {
            width: optional("max-width"),
            height: optional("max-height"),
        },
        margin: sides(|side| length(style, tag, &format!("margin-{}", side)).to_length_percentage_auto()),
        padding: sides(|side| length(style, tag, &format!("padding-{}", side)).to_length_percentage()),
        border: sides(|side| {
            length(style, tag, &format!("border-{}-width", side)).to_length_percentage()
        }),
        flex_direction,
        flex_wrap,
        gap: taffy::Size {
            width: gap,
            height: gap,
        },
        ..Default::default()
    })
}

struct Builder<'a> {
    nodes: &'a SparseSet<Node>,
    taffy: TaffyTree<TextContext>,
    mapping: HashMap<NodeId, taffy::NodeId>,
}

impl Builder<'_> {
    fn build(&mut self, id: NodeId, root: Option<taffy::Size<f32>>) -> Option<taffy::NodeId> {
        let nodes = self.nodes;
        let node = nodes.try_get(id.0)?;
        let taffy_node = match &node.kind {
            NodeKind::Text(text) => {
                let collapsed = collapse_whitespace(text)?;
                let context = TextContext {
                    chars: collapsed.chars().count(),
                    longest_word: collapsed
                        .split(' ')
                        .map(|word| word.chars().count())
                        .max()
                        .unwrap_or(0),
                };
                self.taffy
                    .new_leaf_with_context(taffy::Style::default(), context)
                    .ok()?
            }
            NodeKind::Element(element) => {
                let inline = inline_style(element);
                let mut style =
                    taffy_style(element, &inline, has_only_inline_children(nodes, node))?;
                if let Some(viewport) = root {
                    if style.size.width == taffy::Dimension::Auto {
                        style.size.width = taffy::Dimension::Length(viewport.width);
                    }
                    if style.min_size.height == taffy::Dimension::Auto {
                        style.min_size.height = taffy::Dimension::Length(viewport.height);
                    }
                }
                let children: Vec<taffy::NodeId> = node
                    .children
                    .iter()
                    .filter_map(|child| self.build(*child, None))
                    .collect();
                self.taffy.new_with_children(style, &children).ok()?
            }
            _ => return None,
        };
        self.mapping.insert(id, taffy_node);
        Some(taffy_node)
    }

    fn place(&self, id: NodeId, origin: (f32, f32), rects: &mut HashMap<NodeId, LayoutRect>) {
        let Some(taffy_node) = self.mapping.get(&id) else {
            return;
        };
        let Ok(layout) = self.taffy.layout(*taffy_node) else {
            return;
        };
        let x = origin.0 + layout.location.x;
        let y = origin.1 + layout.location.y;
        rects.insert(id, Rect::new(x, y, layout.size.width, layout.size.height));

        if let Some(node) = self.nodes.try_get(id.0) {
            for child in &node.children {
                self.place(*child, (x, y), rects);
            }
        }
    }
}

/// Lay out the subtree rooted at `document_element` into the viewport.
pub(crate) fn compute(
    nodes: &SparseSet<Node>,
    document_element: NodeId,
    config: &DocumentConfig,
) -> LayoutCache {
    profile_function!();

    let mut builder = Builder {
        nodes,
        taffy: TaffyTree::new(),
        mapping: HashMap::new(),
    };
    let viewport = taffy::Size {
        width: config.viewport.width,
        height: config.viewport.height,
    };
    let Some(root) = builder.build(document_element, Some(viewport)) else {
        return LayoutCache::default();
    };

    let metrics = config.text;
    let available = taffy::Size {
        width: taffy::AvailableSpace::Definite(viewport.width),
        height: taffy::AvailableSpace::Definite(viewport.height),
    };
    let measure = |known: taffy::Size<Option<f32>>,
                   available: taffy::Size<taffy::AvailableSpace>,
                   _node: taffy::NodeId,
                   context: Option<&mut TextContext>,
                   _style: &taffy::Style|
     -> taffy::Size<f32> {
        let Some(text) = context else {
            return taffy::Size {
                width: known.width.unwrap_or(0.0),
                height: known.height.unwrap_or(0.0),
            };
        };
        let limit = known.width.or(match available.width {
            taffy::AvailableSpace::Definite(width) => Some(width),
            taffy::AvailableSpace::MinContent => Some(text.longest_word as f32 * metrics.char_width),
            taffy::AvailableSpace::MaxContent => None,
        });
        let (width, height) = metrics.measure(text.chars, limit);
        taffy::Size {
            width: known.width.unwrap_or(width),
            height: known.height.unwrap_or(height),
        }
    };

    if let Err(err) = builder
        .taffy
        .compute_layout_with_measure(root, available, measure)
    {
        tracing::warn!("Layout failed: {}", err);
        return LayoutCache::default();
    }

    let mut rects = HashMap::new();
    builder.place(document_element, (0.0, 0.0), &mut rects);
    tracing::trace!(nodes = rects.len(), "Layout pass complete");
    LayoutCache { rects }
}
