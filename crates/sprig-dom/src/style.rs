//! Inline styles, CSS lengths and per-tag defaults.

use indexmap::IndexMap;
use std::fmt;

/// CSS length value.
///
/// # Examples
/// ```
/// use sprig_dom::Length;
///
/// assert_eq!(Length::parse("100px"), Some(Length::Px(100.0)));
/// assert_eq!(Length::parse("50%"), Some(Length::Percent(50.0)));
/// assert_eq!(Length::parse("auto"), Some(Length::Auto));
/// assert_eq!(Length::parse("wide"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Fixed pixel value
    Px(f32),
    /// Percentage of the containing block (0.0 - 100.0)
    Percent(f32),
    /// Automatic sizing based on content
    Auto,
}

impl Length {
    /// Parse `auto`, `<n>px`, `<n>%` or a unitless number (pixels).
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Some(Length::Auto);
        }
        if let Some(number) = value.strip_suffix('%') {
            return number.trim().parse().ok().map(Length::Percent);
        }
        let number = value
            .strip_suffix("px")
            .or_else(|| value.strip_suffix("PX"))
            .unwrap_or(value);
        number.trim().parse().ok().map(Length::Px)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    /// Convert to Taffy Dimension.
    pub fn to_dimension(self) -> taffy::Dimension {
        match self {
            Length::Px(v) => taffy::Dimension::Length(v),
            Length::Percent(v) => taffy::Dimension::Percent(v / 100.0),
            Length::Auto => taffy::Dimension::Auto,
        }
    }

    /// Convert to Taffy LengthPercentageAuto (margins, insets).
    pub fn to_length_percentage_auto(self) -> taffy::LengthPercentageAuto {
        match self {
            Length::Px(v) => taffy::LengthPercentageAuto::Length(v),
            Length::Percent(v) => taffy::LengthPercentageAuto::Percent(v / 100.0),
            Length::Auto => taffy::LengthPercentageAuto::Auto,
        }
    }

    /// Convert to Taffy LengthPercentage (paddings, borders, gaps).
    ///
    /// `auto` is not valid there and resolves to zero.
    pub fn to_length_percentage(self) -> taffy::LengthPercentage {
        match self {
            Length::Px(v) => taffy::LengthPercentage::Length(v),
            Length::Percent(v) => taffy::LengthPercentage::Percent(v / 100.0),
            Length::Auto => taffy::LengthPercentage::Length(0.0),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{}px", v),
            Length::Percent(v) => write!(f, "{}%", v),
            Length::Auto => write!(f, "auto"),
        }
    }
}

/// Parse the leading number of a pixel value such as `"12px"`.
///
/// Anything that is not a pixel length (including `auto`) reads as zero.
pub fn parse_px(value: &str) -> f32 {
    match Length::parse(value) {
        Some(Length::Px(v)) => v,
        _ => 0.0,
    }
}

/// Normalize a property name to lower-case kebab-case (`marginTop` ->
/// `margin-top`).
pub fn normalize_property(name: &str) -> String {
    let name = name.trim();
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Longhand `prefix-side-suffix` names covered by a box shorthand.
fn box_shorthand(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "margin" => Some(("margin-", "")),
        "padding" => Some(("padding-", "")),
        "border-width" => Some(("border-", "-width")),
        "inset" => Some(("", "")),
        _ => None,
    }
}

/// Resolve the value a box shorthand gives to one side (CSS 1-4 value syntax).
fn shorthand_side(value: &str, side: usize) -> Option<&str> {
    let parts: Vec<&str> = value.split_ascii_whitespace().collect();
    let index = match (parts.len(), side) {
        (1, _) => 0,
        (2, 0 | 2) => 0,
        (2, _) => 1,
        (3, 0) => 0,
        (3, 1 | 3) => 1,
        (3, _) => 2,
        (4, side) => side,
        _ => return None,
    };
    parts.get(index).copied()
}

/// Ordered inline style declarations, as stored in a `style` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    declarations: IndexMap<String, String>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name: value; ...` declarations. Malformed entries are skipped.
    pub fn parse(css_text: &str) -> Self {
        let mut style = Self::new();
        for declaration in css_text.split(';') {
            if let Some((name, value)) = declaration.split_once(':') {
                style.set(name, value);
            }
        }
        style
    }

    /// Set a declaration; an empty value removes it.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = normalize_property(name);
        let value = value.trim();
        if name.is_empty() {
            return;
        }
        if value.is_empty() {
            self.declarations.shift_remove(&name);
        } else {
            self.declarations.insert(name, value.to_string());
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.declarations.shift_remove(&normalize_property(name))
    }

    /// The declared value of exactly this property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .get(&normalize_property(name))
            .map(String::as_str)
    }

    /// The effective value of a property, expanding box shorthands such as
    /// `margin: 4px 8px`. Later declarations win.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let name = normalize_property(name);
        let mut resolved = None;
        for (declared, value) in &self.declarations {
            if *declared == name {
                resolved = Some(value.as_str());
            } else if let Some((prefix, suffix)) = box_shorthand(declared) {
                if let Some(side) = SIDES
                    .iter()
                    .position(|side| name == format!("{}{}{}", prefix, side, suffix))
                {
                    if let Some(value) = shorthand_side(value, side) {
                        resolved = Some(value);
                    }
                }
            }
        }
        resolved
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Serialize as `name: value;` pairs separated by spaces.
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(name, value)| format!("{}: {};", name, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Elements that are never rendered.
const HIDDEN_TAGS: &[&str] = &[
    "head", "link", "meta", "noscript", "param", "script", "style", "template", "title",
];

/// Elements that generate block boxes by default. Everything else, including
/// custom elements, is inline.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "frameset", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "legend", "li", "main",
    "nav", "ol", "p", "pre", "section", "summary", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

/// Default `display` value for a tag.
pub fn default_display(tag_name: &str) -> &'static str {
    if HIDDEN_TAGS.contains(&tag_name) {
        "none"
    } else if BLOCK_TAGS.contains(&tag_name) {
        "block"
    } else {
        "inline"
    }
}

/// Initial value used for properties without an inline declaration.
pub fn initial_value(tag_name: &str, property: &str) -> &'static str {
    match property {
        "display" => default_display(tag_name),
        "position" => "static",
        "width" | "height" | "top" | "right" | "bottom" | "left" => "auto",
        "min-width" | "min-height" => "0px",
        "max-width" | "max-height" => "none",
        "flex-direction" => "row",
        "flex-wrap" => "nowrap",
        "visibility" => "visible",
        p if p.starts_with("margin-") || p.starts_with("padding-") => "0px",
        p if p.starts_with("border-") && p.ends_with("-width") => "0px",
        _ => "",
    }
}
