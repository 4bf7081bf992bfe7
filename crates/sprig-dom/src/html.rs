//! HTML serialization and lenient fragment parsing.

use crate::node::{Node, NodeId, NodeKind, is_valid_name};
use sprig_core::alloc::SparseSet;

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

pub fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

/// Serialize `node` (when `include_self`) or only its children.
pub(crate) fn serialize(nodes: &SparseSet<Node>, node: NodeId, include_self: bool, out: &mut String) {
    let Some(current) = nodes.try_get(node.0) else {
        return;
    };
    if !include_self {
        for child in &current.children {
            serialize(nodes, *child, true, out);
        }
        return;
    }

    match &current.kind {
        NodeKind::Document | NodeKind::Fragment => {
            for child in &current.children {
                serialize(nodes, *child, true, out);
            }
        }
        NodeKind::Text(text) => {
            let raw = current
                .parent
                .and_then(|parent| nodes.try_get(parent.0))
                .and_then(Node::as_element)
                .is_some_and(|parent| RAW_TEXT_ELEMENTS.contains(&parent.tag_name.as_str()));
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag_name);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(&element.tag_name) {
                return;
            }
            for child in &current.children {
                serialize(nodes, *child, true, out);
            }
            out.push_str("</");
            out.push_str(&element.tag_name);
            out.push('>');
        }
    }
}

/// A node produced by [`parse_fragment`], not yet inserted in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedNode {
    Element {
        tag_name: String,
        attributes: Vec<(String, String)>,
        children: Vec<ParsedNode>,
    },
    Text(String),
    Comment(String),
}

struct OpenElement {
    tag_name: String,
    attributes: Vec<(String, String)>,
    children: Vec<ParsedNode>,
}

impl OpenElement {
    fn close(self) -> ParsedNode {
        ParsedNode::Element {
            tag_name: self.tag_name,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

/// Parse an HTML fragment.
///
/// Parsing never fails: stray end tags are dropped, unclosed elements are
/// closed at the end of input and malformed markup is kept as text.
pub fn parse_fragment(input: &str) -> Vec<ParsedNode> {
    let mut parser = Parser {
        input,
        pos: 0,
        stack: Vec::new(),
        roots: Vec::new(),
    };
    parser.run();
    parser.finish()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<OpenElement>,
    roots: Vec<ParsedNode>,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn push_node(&mut self, node: ParsedNode) {
        let siblings = match self.stack.last_mut() {
            Some(open) => &mut open.children,
            None => &mut self.roots,
        };
        if let (ParsedNode::Text(text), Some(ParsedNode::Text(previous))) = (&node, siblings.last_mut()) {
            previous.push_str(text);
            return;
        }
        siblings.push(node);
    }

    fn push_text(&mut self, raw: &str) {
        if !raw.is_empty() {
            self.push_node(ParsedNode::Text(decode_entities(raw)));
        }
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            let Some(lt) = rest.find('<') else {
                self.push_text(rest);
                self.pos = self.input.len();
                break;
            };
            self.push_text(&rest[..lt]);
            self.pos += lt;

            let rest = self.rest();
            if let Some(comment) = rest.strip_prefix("<!--") {
                let (text, consumed) = match comment.find("-->") {
                    Some(end) => (&comment[..end], 4 + end + 3),
                    None => (comment, rest.len()),
                };
                self.push_node(ParsedNode::Comment(text.to_string()));
                self.pos += consumed;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                // Doctype and processing instructions carry nothing for fragments.
                self.pos += rest.find('>').map_or(rest.len(), |end| end + 1);
            } else if rest.starts_with("</") {
                self.end_tag();
            } else if !self.start_tag() {
                self.push_text("<");
                self.pos += 1;
            }
        }
    }

    fn end_tag(&mut self) {
        let rest = self.rest();
        let end = rest.find('>').map_or(rest.len(), |end| end + 1);
        let name = rest[2..end]
            .trim_end_matches('>')
            .trim()
            .to_ascii_lowercase();
        self.pos += end;

        if let Some(depth) = self.stack.iter().rposition(|open| open.tag_name == name) {
            while self.stack.len() > depth {
                self.close_top();
            }
        }
    }

    fn close_top(&mut self) {
        if let Some(open) = self.stack.pop() {
            let node = open.close();
            self.push_node(node);
        }
    }

    /// Returns false when the `<` does not open a tag.
    fn start_tag(&mut self) -> bool {
        let rest = self.rest();
        let name_len = rest[1..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'))
            .unwrap_or(rest.len() - 1);
        let tag_name = rest[1..1 + name_len].to_ascii_lowercase();
        if !is_valid_name(&tag_name) {
            return false;
        }

        let mut cursor = 1 + name_len;
        let bytes = rest.as_bytes();
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }
            if cursor >= bytes.len() {
                break;
            }
            match bytes[cursor] {
                b'>' => {
                    cursor += 1;
                    break;
                }
                b'/' => {
                    cursor += 1;
                    if bytes.get(cursor) == Some(&b'>') {
                        self_closing = true;
                        cursor += 1;
                        break;
                    }
                }
                _ => {
                    let start = cursor;
                    while cursor < bytes.len()
                        && !bytes[cursor].is_ascii_whitespace()
                        && !matches!(bytes[cursor], b'=' | b'>' | b'/')
                    {
                        cursor += 1;
                    }
                    let name = rest[start..cursor].to_ascii_lowercase();
                    while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                        cursor += 1;
                    }
                    let mut value = String::new();
                    if bytes.get(cursor) == Some(&b'=') {
                        cursor += 1;
                        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                            cursor += 1;
                        }
                        match bytes.get(cursor) {
                            Some(&quote @ (b'"' | b'\'')) => {
                                let value_start = cursor + 1;
                                let value_end = rest[value_start..]
                                    .find(quote as char)
                                    .map_or(rest.len(), |end| value_start + end);
                                value = decode_entities(&rest[value_start..value_end]);
                                cursor = (value_end + 1).min(rest.len());
                            }
                            _ => {
                                let value_start = cursor;
                                while cursor < bytes.len()
                                    && !bytes[cursor].is_ascii_whitespace()
                                    && bytes[cursor] != b'>'
                                {
                                    cursor += 1;
                                }
                                value = decode_entities(&rest[value_start..cursor]);
                            }
                        }
                    }
                    if is_valid_name(&name) && !attributes.iter().any(|(n, _)| *n == name) {
                        attributes.push((name, value));
                    }
                }
            }
        }
        self.pos += cursor;

        if self_closing || is_void_element(&tag_name) {
            self.push_node(ParsedNode::Element {
                tag_name,
                attributes,
                children: Vec::new(),
            });
            return true;
        }

        if RAW_TEXT_ELEMENTS.contains(&tag_name.as_str()) {
            let rest = self.rest();
            let close = format!("</{}", tag_name);
            let end = find_ignore_ascii_case(rest, &close).unwrap_or(rest.len());
            let text = &rest[..end];
            let mut children = Vec::new();
            if !text.is_empty() {
                let text = if tag_name == "textarea" || tag_name == "title" {
                    decode_entities(text)
                } else {
                    text.to_string()
                };
                children.push(ParsedNode::Text(text));
            }
            self.pos += end;
            let rest = self.rest();
            self.pos += rest.find('>').map_or(rest.len(), |gt| gt + 1);
            self.push_node(ParsedNode::Element {
                tag_name,
                attributes,
                children,
            });
            return true;
        }

        self.stack.push(OpenElement {
            tag_name,
            attributes,
            children: Vec::new(),
        });
        true
    }

    fn finish(mut self) -> Vec<ParsedNode> {
        while !self.stack.is_empty() {
            self.close_top();
        }
        self.roots
    }
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Decode character references. Unknown references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').filter(|end| *end <= 10).and_then(|end| {
            let name = &rest[1..end];
            let c = match name {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => {
                    let code = if let Some(hex) =
                        name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = name.strip_prefix('#') {
                        dec.parse().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                }
            };
            c.map(|c| (c, end + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
