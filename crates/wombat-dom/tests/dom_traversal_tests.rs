//! Tests for tree traversal, ordering and attribute storage.

use wombat_dom::{AttributesMap, DomTree, ElementData, NodeId, NodeType, document_position};

fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag)))
}

/// Builds `<html><head/><body><div><p/><span/></div><em/></body></html>`.
fn sample_tree() -> (DomTree, [NodeId; 7]) {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    let div = alloc_element(&mut tree, "div");
    let p = alloc_element(&mut tree, "p");
    let span = alloc_element(&mut tree, "span");
    let em = alloc_element(&mut tree, "em");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, head);
    tree.append_child(html, body);
    tree.append_child(body, div);
    tree.append_child(div, p);
    tree.append_child(div, span);
    tree.append_child(body, em);
    (tree, [html, head, body, div, p, span, em])
}

// ========== descendants ==========

#[test]
fn test_descendants_in_tree_order() {
    let (tree, [html, head, body, div, p, span, em]) = sample_tree();
    let order: Vec<NodeId> = tree.descendants(NodeId::ROOT).collect();
    assert_eq!(order, vec![html, head, body, div, p, span, em]);
}

#[test]
fn test_descendants_stay_inside_subtree() {
    let (tree, [_, _, _, div, p, span, _]) = sample_tree();
    let order: Vec<NodeId> = tree.descendants(div).collect();
    assert_eq!(order, vec![p, span]);
}

#[test]
fn test_descendants_of_leaf_is_empty() {
    let (tree, [.., em]) = sample_tree();
    assert_eq!(tree.descendants(em).count(), 0);
}

// ========== document accessors ==========

#[test]
fn test_document_element_head_body() {
    let (tree, [html, head, body, ..]) = sample_tree();
    assert_eq!(tree.document_element(NodeId::ROOT), Some(html));
    assert_eq!(tree.head(NodeId::ROOT), Some(head));
    assert_eq!(tree.body(NodeId::ROOT), Some(body));
}

#[test]
fn test_element_siblings_skip_text() {
    let (mut tree, [_, _, _, div, p, span, _]) = sample_tree();
    let text = tree.alloc(NodeType::Text("between".to_string()));
    tree.insert_before(div, text, span);

    assert_eq!(tree.next_sibling(p), Some(text));
    assert_eq!(tree.next_element_sibling(p), Some(span));
    assert_eq!(tree.prev_element_sibling(span), Some(p));
}

// ========== compare_document_position ==========

#[test]
fn test_compare_document_position() {
    let (tree, [html, _, body, div, p, span, _]) = sample_tree();

    assert_eq!(tree.compare_document_position(p, p), 0);
    assert_eq!(tree.compare_document_position(p, span), document_position::FOLLOWING);
    assert_eq!(tree.compare_document_position(span, p), document_position::PRECEDING);
    assert_eq!(tree.compare_document_position(body, div), 20);
    assert_eq!(tree.compare_document_position(div, html), 10);
}

#[test]
fn test_compare_document_position_disconnected() {
    let (mut tree, [_, _, _, div, ..]) = sample_tree();
    let orphan = alloc_element(&mut tree, "aside");

    let position = tree.compare_document_position(div, orphan);
    assert_eq!(
        position & document_position::DISCONNECTED,
        document_position::DISCONNECTED
    );
    assert_eq!(
        position & document_position::IMPLEMENTATION_SPECIFIC,
        document_position::IMPLEMENTATION_SPECIFIC
    );
}

// ========== AttributesMap ==========

#[test]
fn test_attributes_keep_insertion_order() {
    let mut attrs = AttributesMap::new();
    let _ = attrs.set("xmlns", "http://www.w3.org/2000/svg");
    let _ = attrs.set("width", "100");
    let _ = attrs.set("height", "100");
    let _ = attrs.set("width", "200");

    let names: Vec<&str> = attrs.names().collect();
    assert_eq!(names, vec!["xmlns", "width", "height"]);
    assert_eq!(attrs.get("width"), Some("200"));
}

#[test]
fn test_attributes_case_insensitive_lookup() {
    let mut attrs = AttributesMap::new();
    let _ = attrs.set("viewBox", "0 0 10 10");
    assert_eq!(attrs.get("viewbox"), Some("0 0 10 10"));
    assert_eq!(attrs.remove("VIEWBOX").as_deref(), Some("0 0 10 10"));
    assert!(attrs.is_empty());
}

#[test]
fn test_attributes_from_iter_drops_duplicates() {
    let attrs: AttributesMap = [("id", "a"), ("id", "b"), ("class", "c")]
        .into_iter()
        .collect();
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs.get("id"), Some("a"));
}

#[test]
fn test_element_classes() {
    let mut data = ElementData::new("DIV");
    let _ = data.attrs.set("class", "  one two\tthree ");
    assert_eq!(data.tag_name, "div");
    assert_eq!(data.qualified_tag_name(), "DIV");
    assert!(data.has_class("two"));
    assert!(!data.has_class("tw"));
    assert!(data.has_class("three"));
}
