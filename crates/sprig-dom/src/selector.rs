//! CSS selector subset used by `query_selector` and `matches`.
//!
//! Supported: selector lists (`a, b`), type (`div`), universal (`*`), `#id`,
//! `.class`, `[attr]`, `[attr=value]`, and the descendant (` `) and child
//! (`>`) combinators.

use crate::error::{DomError, DomResult};
use crate::node::{ElementData, Node, NodeId};
use sprig_core::alloc::SparseSet;
use sprig_core::profiling::profile_function;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    /// Lower-cased type; `None` matches any element.
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

impl Compound {
    fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != element.tag_name {
                return false;
            }
        }
        self.ids.iter().all(|id| element.id() == Some(id.as_str()))
            && self.classes.iter().all(|class| element.has_class(class))
            && self.attributes.iter().all(|attr| {
                match (element.attributes.get(&attr.name), &attr.value) {
                    (Some(actual), Some(expected)) => actual == expected,
                    (Some(_), None) => true,
                    (None, _) => false,
                }
            })
    }
}

/// One complex selector, stored left to right. Each compound after the
/// first carries the combinator linking it to its left neighbour.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<(Option<Combinator>, Compound)>,
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> DomResult<Self> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        };

        let mut selectors = Vec::new();
        for part in split_top_level(selector).map_err(|reason| invalid(reason))? {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                return Err(invalid("empty selector"));
            }
            selectors.push(parse_complex(trimmed).map_err(|reason| invalid(&reason))?);
        }
        Ok(Self {
            source: selector.to_string(),
            selectors,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node` is an element matched by any selector in the list.
    pub(crate) fn matches(&self, nodes: &SparseSet<Node>, node: NodeId) -> bool {
        profile_function!();
        self.selectors
            .iter()
            .any(|complex| matches_from(nodes, &complex.parts, complex.parts.len() - 1, node))
    }
}

fn element_of(nodes: &SparseSet<Node>, node: NodeId) -> Option<&ElementData> {
    nodes.try_get(node.0).and_then(Node::as_element)
}

fn parent_of(nodes: &SparseSet<Node>, node: NodeId) -> Option<NodeId> {
    nodes.try_get(node.0).and_then(|n| n.parent)
}

fn matches_from(
    nodes: &SparseSet<Node>,
    parts: &[(Option<Combinator>, Compound)],
    index: usize,
    node: NodeId,
) -> bool {
    let (combinator, compound) = &parts[index];
    let Some(element) = element_of(nodes, node) else {
        return false;
    };
    if !compound.matches(element) {
        return false;
    }
    match combinator {
        None => true,
        Some(Combinator::Child) => parent_of(nodes, node)
            .is_some_and(|parent| matches_from(nodes, parts, index - 1, parent)),
        Some(Combinator::Descendant) => {
            let mut ancestor = parent_of(nodes, node);
            while let Some(candidate) = ancestor {
                if matches_from(nodes, parts, index - 1, candidate) {
                    return true;
                }
                ancestor = parent_of(nodes, candidate);
            }
            false
        }
    }
}

/// Split on commas that are not inside brackets or quotes.
fn split_top_level(input: &str) -> Result<Vec<&str>, &'static str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1).ok_or("unbalanced ']'")?,
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err("unterminated string");
    }
    if depth != 0 {
        return Err("unterminated attribute selector");
    }
    parts.push(&input[start..]);
    Ok(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) -> bool {
    let mut skipped = false;
    while chars.next_if(|c| c.is_whitespace()).is_some() {
        skipped = true;
    }
    skipped
}

fn parse_ident(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(c) = chars.next_if(|c| is_ident_char(*c)) {
        ident.push(c);
    }
    ident
}

fn parse_complex(input: &str) -> Result<Complex, String> {
    let mut chars = input.chars().peekable();
    let mut parts: Vec<(Option<Combinator>, Compound)> = Vec::new();

    loop {
        skip_whitespace(&mut chars);
        let Some(&next) = chars.peek() else { break };

        let combinator = if next == '>' {
            if parts.is_empty() {
                return Err("selector cannot start with '>'".into());
            }
            chars.next();
            skip_whitespace(&mut chars);
            if chars.peek().is_none() {
                return Err("selector cannot end with '>'".into());
            }
            Some(Combinator::Child)
        } else if parts.is_empty() {
            None
        } else {
            Some(Combinator::Descendant)
        };

        let compound = parse_compound(&mut chars)?;
        parts.push((combinator, compound));
    }

    if parts.is_empty() {
        return Err("empty selector".into());
    }
    Ok(Complex { parts })
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> Result<Compound, String> {
    let mut compound = Compound::default();
    let mut consumed = false;

    if chars.next_if_eq(&'*').is_some() {
        consumed = true;
    } else if chars.peek().is_some_and(|c| is_ident_char(*c)) {
        compound.tag = Some(parse_ident(chars).to_ascii_lowercase());
        consumed = true;
    }

    while let Some(&c) = chars.peek() {
        match c {
            '#' | '.' => {
                chars.next();
                let ident = parse_ident(chars);
                if ident.is_empty() {
                    return Err(format!("expected a name after '{}'", c));
                }
                if c == '#' {
                    compound.ids.push(ident);
                } else {
                    compound.classes.push(ident);
                }
            }
            '[' => {
                chars.next();
                compound.attributes.push(parse_attribute(chars)?);
            }
            c if c.is_whitespace() || c == '>' => break,
            c => return Err(format!("unexpected character '{}'", c)),
        }
        consumed = true;
    }

    if !consumed {
        return Err("expected a selector".into());
    }
    Ok(compound)
}

fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> Result<AttributeSelector, String> {
    skip_whitespace(chars);
    let name = parse_ident(chars).to_ascii_lowercase();
    if name.is_empty() {
        return Err("expected an attribute name".into());
    }
    skip_whitespace(chars);

    let value = if chars.next_if_eq(&'=').is_some() {
        skip_whitespace(chars);
        let value = match chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err("unterminated string".into()),
                    }
                }
                value
            }
            _ => {
                let value = parse_ident(chars);
                if value.is_empty() {
                    return Err("expected an attribute value".into());
                }
                value
            }
        };
        skip_whitespace(chars);
        Some(value)
    } else {
        None
    };

    if chars.next_if_eq(&']').is_none() {
        return Err("expected ']'".into());
    }
    Ok(AttributeSelector { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound_count(selector: &str) -> Vec<usize> {
        SelectorList::parse(selector)
            .unwrap()
            .selectors
            .iter()
            .map(|complex| complex.parts.len())
            .collect()
    }

    #[test]
    fn test_parse_simple() {
        assert_eq!(compound_count("div"), vec![1]);
        assert_eq!(compound_count("#counter"), vec![1]);
        assert_eq!(compound_count("div.a.b#c[data-x='1']"), vec![1]);
        assert_eq!(compound_count("*"), vec![1]);
    }

    #[test]
    fn test_parse_combinators() {
        assert_eq!(compound_count("ul li"), vec![2]);
        assert_eq!(compound_count("ul > li"), vec![2]);
        assert_eq!(compound_count("ul>li span"), vec![3]);
        assert_eq!(compound_count("a, b > c"), vec![1, 2]);
    }

    #[test]
    fn test_type_is_lowercased() {
        let list = SelectorList::parse("BODY").unwrap();
        assert_eq!(list.selectors[0].parts[0].1.tag.as_deref(), Some("body"));
    }

    #[test]
    fn test_attribute_values() {
        let list = SelectorList::parse(r#"[type="text"][disabled]"#).unwrap();
        let attrs = &list.selectors[0].parts[0].1.attributes;
        assert_eq!(attrs[0].value.as_deref(), Some("text"));
        assert_eq!(attrs[1].value, None);
    }

    #[test]
    fn test_invalid_selectors() {
        for selector in ["", " ", "div,", ",div", "> div", "div >", "#", ".", "div!", "[x", "[='a']", "[x='a]"] {
            assert!(
                matches!(SelectorList::parse(selector), Err(DomError::InvalidSelector { .. })),
                "expected '{}' to be rejected",
                selector
            );
        }
    }
}
