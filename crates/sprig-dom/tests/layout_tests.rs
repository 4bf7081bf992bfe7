//! Geometry queries backed by the layout pass.

use sprig_dom::{Document, DocumentConfig, LayoutRect, NodeId};

fn block(doc: &Document, parent: NodeId, css: &str) -> NodeId {
    let div = doc.create_element("div").unwrap();
    if !css.is_empty() {
        doc.set_attribute(div, "style", css).unwrap();
    }
    doc.append_child(parent, div).unwrap();
    div
}

#[test]
fn test_fixed_size_block() {
    let doc = Document::new();
    let div = block(&doc, doc.body(), "width: 100px; height: 50px");
    assert_eq!(doc.bounding_client_rect(div).unwrap(), LayoutRect::new(0.0, 0.0, 100.0, 50.0));
    assert_eq!(doc.offset_width(div).unwrap(), 100.0);
    assert_eq!(doc.offset_height(div).unwrap(), 50.0);
}

#[test]
fn test_blocks_stack_vertically() {
    let doc = Document::new();
    let first = block(&doc, doc.body(), "height: 20px; margin-top: 10px");
    let second = block(&doc, doc.body(), "height: 30px");
    assert_eq!(doc.bounding_client_rect(first).unwrap().y, 10.0);
    assert_eq!(doc.bounding_client_rect(second).unwrap().y, 30.0);
}

#[test]
fn test_auto_width_fills_viewport() {
    let doc = Document::with_config(DocumentConfig::default().viewport(400.0, 300.0));
    let div = block(&doc, doc.body(), "height: 10px");
    assert_eq!(doc.offset_width(div).unwrap(), 400.0);

    doc.set_viewport(200.0, 300.0);
    assert_eq!(doc.offset_width(div).unwrap(), 200.0);
}

#[test]
fn test_text_measured_with_metrics() {
    let doc = Document::new();
    let div = block(&doc, doc.body(), "");
    let span = doc.create_element("span").unwrap();
    doc.append_child(span, doc.create_text_node("abc")).unwrap();
    doc.append_child(div, span).unwrap();
    let second = doc.create_element("span").unwrap();
    doc.append_child(second, doc.create_text_node("de")).unwrap();
    doc.append_child(div, second).unwrap();

    assert_eq!(doc.offset_height(div).unwrap(), 16.0);
    let rect = doc.bounding_client_rect(span).unwrap();
    assert_eq!((rect.width, rect.height), (24.0, 16.0));
    let rect = doc.bounding_client_rect(second).unwrap();
    assert_eq!((rect.x, rect.width), (24.0, 16.0));
}

#[test]
fn test_text_wraps_inside_narrow_block() {
    let doc = Document::new();
    let div = block(&doc, doc.body(), "width: 80px");
    doc.append_child(div, doc.create_text_node("aaaa bbbb cccc dddd eeee"))
        .unwrap();
    // 24 characters at 10 per line
    assert_eq!(doc.offset_height(div).unwrap(), 48.0);
}

#[test]
fn test_hidden_and_detached_are_empty() {
    let doc = Document::new();
    let hidden = block(&doc, doc.body(), "display: none; width: 10px; height: 10px");
    assert_eq!(doc.bounding_client_rect(hidden).unwrap(), LayoutRect::ZERO);
    assert_eq!(doc.offset_parent(hidden).unwrap(), None);

    let detached = doc.create_element("div").unwrap();
    doc.set_attribute(detached, "style", "width: 10px; height: 10px").unwrap();
    assert_eq!(doc.offset_width(detached).unwrap(), 0.0);
    assert_eq!(doc.offset_parent(detached).unwrap(), None);

    let script = doc.create_element("script").unwrap();
    doc.append_child(doc.body(), script).unwrap();
    assert_eq!(doc.offset_height(script).unwrap(), 0.0);
}

#[test]
fn test_client_rect_subtracts_scroll() {
    let doc = Document::new();
    block(&doc, doc.body(), "height: 100px");
    let div = block(&doc, doc.body(), "height: 10px");
    doc.set_scroll_position(0.0, 40.0);
    assert_eq!(doc.bounding_client_rect(div).unwrap().y, 60.0);
    assert_eq!(doc.layout_rect(div).unwrap().map(|rect| rect.y), Some(100.0));
    assert_eq!(doc.offset_top(div).unwrap(), 100.0);
}

#[test]
fn test_offset_parent_and_offsets() {
    let doc = Document::new();
    let plain = block(&doc, doc.body(), "");
    let container = block(
        &doc,
        plain,
        "position: relative; border-width: 2px; padding: 5px; margin-left: 20px",
    );
    let child = block(&doc, container, "height: 10px");

    assert_eq!(doc.offset_parent(container).unwrap(), Some(doc.body()));
    assert_eq!(doc.offset_parent(child).unwrap(), Some(container));
    assert_eq!(doc.offset_left(child).unwrap(), 5.0);
    assert_eq!(doc.offset_top(child).unwrap(), 5.0);
    assert_eq!(doc.offset_left(container).unwrap(), 20.0);
    assert_eq!(doc.bounding_client_rect(child).unwrap().x, 27.0);
}

#[test]
fn test_body_and_html_have_no_offset_parent() {
    let doc = Document::new();
    assert_eq!(doc.offset_parent(doc.body()).unwrap(), None);
    assert_eq!(doc.offset_parent(doc.document_element()).unwrap(), None);
}

#[test]
fn test_layout_recomputed_after_style_change() {
    let doc = Document::new();
    let div = block(&doc, doc.body(), "height: 10px");
    assert_eq!(doc.offset_height(div).unwrap(), 10.0);
    doc.set_style_property(div, "height", "25px").unwrap();
    assert!(doc.dirty_flags().needs_layout());
    assert_eq!(doc.offset_height(div).unwrap(), 25.0);
    assert!(!doc.dirty_flags().needs_layout());
}
