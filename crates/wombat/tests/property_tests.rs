//! Property tests: text, attribute values and cloned subtrees survive a
//! serialize-then-parse round trip, and no sequence of edits breaks the
//! shape of a document's children.

use quickcheck_macros::quickcheck;
use wombat::{Document, DomParser, Node, NodeTypeCode};

fn parse(html: &str) -> Document {
    DomParser::new().parse_from_string(html, "text/html").unwrap()
}

/// Keep characters that need no newline or NUL handling but still
/// exercise escaping.
fn markup_safe(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || " <>&\"'=/!-;#".contains(*c))
        .collect()
}

#[quickcheck]
fn test_text_content_survives_round_trip(input: String) -> bool {
    let text = markup_safe(&input);
    let document = parse("<div></div>");
    let div = document.query_selector("div").unwrap().unwrap();
    div.set_text_content(&text);

    let reparsed = parse(&document.outer_html());
    let div = reparsed.query_selector("div").unwrap().unwrap();
    div.text_content().as_deref() == Some(text.as_str())
}

#[quickcheck]
fn test_attribute_value_survives_round_trip(input: String) -> bool {
    let value = markup_safe(&input);
    let document = parse("<p></p>");
    let p = document.query_selector("p").unwrap().unwrap();
    p.set_attribute("title", &value).unwrap();

    let reparsed = parse(&document.outer_html());
    let p = reparsed.query_selector("p").unwrap().unwrap();
    p.get_attribute("title").as_deref() == Some(value.as_str())
}

#[quickcheck]
fn test_deep_clone_is_equal_and_detached(words: Vec<String>) -> bool {
    let document = parse("<ul></ul>");
    let list = document.query_selector("ul").unwrap().unwrap();
    for word in &words {
        let item = document.create_element("li");
        item.set_text_content(&markup_safe(word));
        let _ = list.append_child(&item).unwrap();
    }

    let copy = list.clone_node(true);
    copy.is_equal_node(&list)
        && copy.parent_node().is_none()
        && copy.child_nodes().len() == words.len()
        && copy.outer_html() == list.outer_html()
}

#[quickcheck]
fn test_document_children_stay_well_formed(edits: Vec<u8>) -> bool {
    let document = parse("<!DOCTYPE html><p>x</p>");
    let spare_doctype = parse("<!DOCTYPE other>").doctype().unwrap();
    for edit in edits {
        let first = document.first_child();
        let node = match edit % 4 {
            0 => document.create_element("html"),
            1 => document.create_text_node("t"),
            2 => document.create_comment("c"),
            _ => spare_doctype.clone(),
        };
        let _ = match edit / 4 % 5 {
            0 => document.append_child(&node).map(drop),
            1 => document.prepend(&node),
            2 => document.insert_before(&node, first.as_ref()).map(drop),
            3 => first.map_or(Ok(()), |first| document.replace_child(&node, &first).map(drop)),
            _ => {
                if let Some(first) = first {
                    first.remove();
                }
                Ok(())
            }
        };
    }

    let kinds: Vec<NodeTypeCode> = document.child_nodes().iter().map(Node::node_type).collect();
    let count = |code: NodeTypeCode| kinds.iter().filter(|&&kind| kind == code).count();
    let position = |code: NodeTypeCode| kinds.iter().position(|&kind| kind == code);
    let doctype_first = match (
        position(NodeTypeCode::DocumentType),
        position(NodeTypeCode::Element),
    ) {
        (Some(doctype), Some(element)) => doctype < element,
        _ => true,
    };
    count(NodeTypeCode::Element) <= 1
        && count(NodeTypeCode::DocumentType) <= 1
        && count(NodeTypeCode::Text) == 0
        && doctype_first
}
