//! Integration tests for `DomParser`, `Document` and node properties.

use wombat::{Document, DomError, DomParser, NodeTypeCode, ParseOptions};

fn parse(html: &str) -> Document {
    DomParser::new().parse_from_string(html, "text/html").unwrap()
}

// ========== Parsing ==========

#[test]
fn test_parse_wraps_in_html_head_body() {
    let document = parse("<div></div>");
    assert_eq!(
        document.document_element().unwrap().outer_html(),
        "<html><head></head><body><div></div></body></html>"
    );
}

#[test]
fn test_unsupported_mime_type() {
    let err = DomParser::new()
        .parse_from_string("<div></div>", "text/xml")
        .unwrap_err();
    assert_eq!(err, DomError::UnsupportedMimeType("text/xml".to_string()));
    assert_eq!(err.to_string(), "Unsupported mime type: text/xml");
}

#[test]
fn test_mime_type_is_case_sensitive() {
    assert!(
        DomParser::new()
            .parse_from_string("", "TEXT/HTML")
            .is_err()
    );
}

#[test]
fn test_stray_body_content_stays_in_body() {
    let document =
        parse(r#"<div class="one">first</div><body>Bad body</body><div id="two">second</div>"#);
    assert_eq!(
        document.document_element().unwrap().outer_html(),
        r#"<html><head></head><body><div class="one">first</div>Bad body<div id="two">second</div></body></html>"#
    );
}

#[test]
fn test_reserialize_and_reparse_is_stable() {
    let source = r#"<!DOCTYPE html><html lang="en"><head><title>T</title></head><body><ul><li>a</li><li class="x">b</li></ul><p>1 &amp; 2</p><!--note--></body></html>"#;
    let first = parse(source).outer_html();
    let second = parse(&first).outer_html();
    assert_eq!(first, second);
    assert_eq!(first, source);
}

#[test]
fn test_scripting_option_controls_noscript() {
    let html = "<noscript><b>x</b></noscript>";
    let scripted = parse(html);
    assert!(scripted.query_selector("noscript b").unwrap().is_none());

    let unscripted = DomParser::with_options(ParseOptions::default().with_scripting(false))
        .parse_from_string(html, "text/html")
        .unwrap();
    assert!(unscripted.query_selector("noscript b").unwrap().is_some());
}

#[test]
fn test_fragment_context_option_applies_to_fragments() {
    let plain = parse("").create_document_fragment();
    plain.set_inner_html("<b>x</b>");
    assert_eq!(plain.child_element_count(), 1);

    let document = DomParser::with_options(ParseOptions::default().with_fragment_context("TEXTAREA"))
        .parse_from_string("", "text/html")
        .unwrap();
    let fragment = document.create_document_fragment();
    fragment.set_inner_html("<b>x</b>");
    assert_eq!(fragment.child_element_count(), 0);
    assert_eq!(fragment.text_content().as_deref(), Some("<b>x</b>"));
}

// ========== Document accessors ==========

#[test]
fn test_head_body_and_title() {
    let document = parse("<title>  Hello \n  World </title><div></div>");
    assert_eq!(document.head().unwrap().tag_name().as_deref(), Some("HEAD"));
    assert_eq!(document.body().unwrap().tag_name().as_deref(), Some("BODY"));
    assert_eq!(document.title(), "Hello World");
    assert_eq!(parse("<p>no title</p>").title(), "");
}

#[test]
fn test_doctype_node() {
    let document = parse(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd"><p>"#,
    );
    let doctype = document.doctype().unwrap();
    assert_eq!(doctype.node_type(), NodeTypeCode::DocumentType);
    assert_eq!(doctype.node_name(), "html");
    assert_eq!(doctype.name().as_deref(), Some("html"));
    assert_eq!(
        doctype.public_id().as_deref(),
        Some("-//W3C//DTD HTML 4.01//EN")
    );
    assert_eq!(
        doctype.system_id().as_deref(),
        Some("http://www.w3.org/TR/html4/strict.dtd")
    );
    assert_eq!(doctype.text_content(), None);
    assert!(parse("<p>").doctype().is_none());
}

#[test]
fn test_get_element_by_id() {
    let document = parse("<p id=a>1</p><div><p id=b>2</p><p id=b>3</p></div>");
    assert_eq!(document.get_element_by_id("b").unwrap().text_content().as_deref(), Some("2"));
    assert!(document.get_element_by_id("missing").is_none());
}

#[test]
fn test_create_nodes_are_detached_and_owned() {
    let document = parse("");
    let div = document.create_element("DIV");
    assert_eq!(div.tag_name().as_deref(), Some("DIV"));
    assert_eq!(div.outer_html(), "<div></div>");
    assert!(div.parent_node().is_none());
    assert!(!div.is_connected());
    assert_eq!(div.owner_document().unwrap(), document);

    let comment = document.create_comment("my comment");
    assert_eq!(comment.node_type(), NodeTypeCode::Comment);
    assert_eq!(comment.node_value().as_deref(), Some("my comment"));

    let text = document.create_text_node("a<b");
    assert_eq!(text.node_type(), NodeTypeCode::Text);
    assert_eq!(text.outer_html(), "a&lt;b");

    let fragment = document.create_document_fragment();
    assert_eq!(fragment.node_type(), NodeTypeCode::DocumentFragment);
    let _ = fragment.append_child(&comment).unwrap();
    assert_eq!(fragment.child_nodes().len(), 1);
}

// ========== Node properties ==========

#[test]
fn test_node_type_and_name() {
    let document = parse("<div>text<!--c--></div>");
    let div = document.query_selector("div").unwrap().unwrap();
    let text = div.first_child().unwrap();
    let comment = div.last_child().unwrap();

    assert_eq!(document.node_type(), NodeTypeCode::Document);
    assert_eq!(document.node_type() as u16, 9);
    assert_eq!(document.node_name(), "#document");
    assert_eq!(div.node_type() as u16, 1);
    assert_eq!(div.node_name(), "DIV");
    assert_eq!(text.node_name(), "#text");
    assert_eq!(comment.node_name(), "#comment");
    assert_eq!(document.create_document_fragment().node_name(), "#document-fragment");
}

#[test]
fn test_node_value_only_on_character_data() {
    let document = parse("<p>hi</p>");
    let p = document.query_selector("p").unwrap().unwrap();
    let text = p.first_child().unwrap();
    assert_eq!(p.node_value(), None);
    assert_eq!(text.node_value().as_deref(), Some("hi"));

    p.set_node_value("ignored");
    text.set_node_value("bye");
    assert_eq!(p.inner_html(), "bye");
    assert_eq!(text.data(), "bye");
    assert_eq!(p.data(), "");
}

#[test]
fn test_owner_document_and_connection() {
    let document = parse("<p>x</p>");
    let p = document.query_selector("p").unwrap().unwrap();
    assert!(document.owner_document().is_none());
    assert_eq!(p.owner_document().unwrap(), document);
    assert!(p.is_connected());
    assert!(document.is_connected());

    p.remove();
    assert!(!p.is_connected());
    assert_eq!(p.owner_document().unwrap(), document);
}

#[test]
fn test_svg_tag_name_keeps_case() {
    let document = parse("<svg><foreignObject></foreignObject></svg>");
    let foreign = document.query_selector("foreignobject").unwrap().unwrap();
    assert_eq!(foreign.tag_name().as_deref(), Some("foreignObject"));
    assert_eq!(document.query_selector("svg").unwrap().unwrap().tag_name().as_deref(), Some("svg"));

    let div = document.create_element("Div");
    assert_eq!(div.tag_name().as_deref(), Some("DIV"));
    assert_eq!(div.local_name().as_deref(), Some("div"));
    assert_eq!(document.local_name(), None);
}

// ========== Navigation ==========

#[test]
fn test_element_traversal() {
    let document = parse("<div><span>1</span>text<b>2</b></div>");
    let div = document.query_selector("div").unwrap().unwrap();
    let span = document.query_selector("span").unwrap().unwrap();
    let b = document.query_selector("b").unwrap().unwrap();

    assert_eq!(div.first_element_child().unwrap().outer_html(), "<span>1</span>");
    assert_eq!(div.last_element_child().unwrap().outer_html(), "<b>2</b>");
    assert_eq!(span.next_element_sibling().unwrap(), b);
    assert_eq!(b.previous_element_sibling().unwrap(), span);
    assert_eq!(span.next_sibling().unwrap().node_value().as_deref(), Some("text"));
    assert_eq!(b.previous_sibling().unwrap().node_type(), NodeTypeCode::Text);
    assert_eq!(span.parent_element().unwrap(), div);
    assert_eq!(div.child_element_count(), 2);
    assert_eq!(div.children().len(), 2);
    assert_eq!(div.child_nodes().len(), 3);
    assert!(div.has_child_nodes());
    assert!(!b.first_child().unwrap().has_child_nodes());
}

#[test]
fn test_parent_element_of_html_is_none() {
    let document = parse("");
    let html = document.document_element().unwrap();
    assert_eq!(html.parent_node().unwrap(), *document.as_node());
    assert!(html.parent_element().is_none());
}

#[test]
fn test_get_root_node() {
    let document = parse("<div></div>");
    let div = document.query_selector("div").unwrap().unwrap();
    assert_eq!(div.get_root_node().node_type(), NodeTypeCode::Document);

    let detached = document.create_element("p");
    let child = document.create_element("span");
    let _ = detached.append_child(&child).unwrap();
    assert_eq!(child.get_root_node(), detached);
    assert_eq!(detached.get_root_node(), detached);
}

#[test]
fn test_is_same_node_is_identity() {
    let document = parse("<div></div><div></div>");
    let first = document.query_selector("div").unwrap().unwrap();
    let again = document.query_selector("div").unwrap().unwrap();
    let all = document.query_selector_all("div").unwrap();
    assert!(first.is_same_node(&again));
    assert!(!first.is_same_node(&all[1]));
    assert!(!first.is_same_node(&document));
}

#[test]
fn test_is_equal_node() {
    let a = parse(r#"<p a="1" b="2">x<i>y</i></p>"#);
    let b = parse(r#"<p b="2" a="1">x<i>y</i></p>"#);
    let c = parse(r#"<p a="1" b="2">x<i>z</i></p>"#);
    let pa = a.query_selector("p").unwrap().unwrap();
    let pb = b.query_selector("p").unwrap().unwrap();
    let pc = c.query_selector("p").unwrap().unwrap();

    assert!(pa.is_equal_node(&pb));
    assert!(!pa.is_equal_node(&pc));
    assert!(pa.is_equal_node(&pa.clone_node(true)));
    assert!(!pa.is_equal_node(&pa.clone_node(false)));
    assert!(a.is_equal_node(&b));
}

#[test]
fn test_contains_is_inclusive() {
    let document = parse("<div><span>hello</span></div>");
    let div = document.query_selector("div").unwrap().unwrap();
    let span = document.query_selector("span").unwrap().unwrap();
    assert!(div.contains(&span));
    assert!(document.contains(&span));
    assert!(span.contains(&span));
    assert!(!span.contains(&div));
    assert!(!div.contains(&parse("<span></span>").query_selector("span").unwrap().unwrap()));
}
