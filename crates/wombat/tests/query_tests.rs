//! Integration tests for selector queries, element lookups and document
//! position.

use wombat::{Document, DomError, DomParser, document_position};

fn parse(html: &str) -> Document {
    DomParser::new().parse_from_string(html, "text/html").unwrap()
}

fn outer(nodes: &[wombat::Node]) -> Vec<String> {
    nodes.iter().map(wombat::Node::outer_html).collect()
}

// ========== Selectors ==========

#[test]
fn test_query_selector_all_in_document_order() {
    let document = parse(r#"<div class="one">first</div><body>Bad body</body><div id="two">second</div>"#);
    let expected = vec![
        r#"<div class="one">first</div>"#.to_string(),
        r#"<div id="two">second</div>"#.to_string(),
    ];
    assert_eq!(outer(&document.query_selector_all("div").unwrap()), expected);
    assert_eq!(outer(&document.query_selector_all("body>*").unwrap()), expected);
}

#[test]
fn test_query_selector_descendant() {
    let document = parse(r#"<span>out</span><div class="foo"><p><span>in</span></p></div>"#);
    let span = document.query_selector(".foo span").unwrap().unwrap();
    assert_eq!(span.text_content().as_deref(), Some("in"));
    assert!(document.query_selector(".missing").unwrap().is_none());
    assert!(document.query_selector_all(".missing").unwrap().is_empty());
}

#[test]
fn test_query_is_scoped_to_descendants() {
    let document = parse("<div id=outer><div id=inner></div></div>");
    let outer_div = document.query_selector("#outer").unwrap().unwrap();
    let found = outer_div.query_selector_all("div").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), "inner");
}

#[test]
fn test_query_results_are_snapshots() {
    let document = parse("<p>1</p><p>2</p>");
    let found = document.query_selector_all("p").unwrap();
    found[0].remove();
    assert_eq!(found.len(), 2);
    assert_eq!(document.query_selector_all("p").unwrap().len(), 1);
}

#[test]
fn test_attribute_and_structural_selectors() {
    let document = parse(
        r#"<ul><li data-k="a b">1</li><li lang="en-US">2</li><li></li></ul><a href="x.pdf">p</a>"#,
    );
    assert_eq!(document.query_selector_all("[data-k~=b]").unwrap().len(), 1);
    assert_eq!(document.query_selector_all("[lang|=en]").unwrap().len(), 1);
    assert_eq!(document.query_selector_all("a[href$='.pdf']").unwrap().len(), 1);
    assert_eq!(document.query_selector_all("li:first-child").unwrap().len(), 1);
    assert_eq!(document.query_selector_all("li:empty").unwrap().len(), 1);
    assert_eq!(document.query_selector_all("li + li").unwrap().len(), 2);
    assert_eq!(document.query_selector_all("ul, a").unwrap().len(), 2);
}

#[test]
fn test_matches_and_closest() {
    let document = parse(r#"<section class="s"><div><span id="x"></span></div></section>"#);
    let span = document.query_selector("#x").unwrap().unwrap();

    assert!(span.matches("section span").unwrap());
    assert!(!span.matches("div > section span").unwrap());
    assert_eq!(
        span.closest("section").unwrap().unwrap().class_name(),
        "s"
    );
    assert_eq!(span.closest("span").unwrap().unwrap(), span);
    assert!(span.closest("article").unwrap().is_none());
}

#[test]
fn test_invalid_selector() {
    let document = parse("<div></div>");
    let err = document.query_selector("div[").unwrap_err();
    assert!(matches!(err, DomError::InvalidSelector(_)));
    let message = err.to_string();
    assert!(message.starts_with("SyntaxError: "));
    assert!(message.contains("div["));

    assert!(document.query_selector_all("").is_err());
    assert!(document.query_selector("p:hover").is_err());
    let div = document.query_selector("div").unwrap().unwrap();
    assert!(div.matches(">>").is_err());
    assert!(div.closest(",").is_err());
}

// ========== Lookups ==========

#[test]
fn test_get_elements_by_tag_name() {
    let document = parse("<div><P>1</P><span><p>2</p></span></div>");
    assert_eq!(document.get_elements_by_tag_name("p").len(), 2);
    assert_eq!(document.get_elements_by_tag_name("P").len(), 2);
    let div = document.query_selector("div").unwrap().unwrap();
    assert_eq!(div.get_elements_by_tag_name("*").len(), 3);
    assert!(div.get_elements_by_tag_name("div").is_empty());
}

#[test]
fn test_get_elements_by_class_name() {
    let document = parse(r#"<p class="a b">1</p><p class="b">2</p><p class="A">3</p>"#);
    assert_eq!(document.get_elements_by_class_name("b").len(), 2);
    assert_eq!(document.get_elements_by_class_name(" b  a ").len(), 1);
    assert_eq!(document.get_elements_by_class_name("a").len(), 1);
    assert!(document.get_elements_by_class_name("   ").is_empty());
}

// ========== Document position ==========

#[test]
fn test_compare_document_position() {
    let document = parse("<div><p id=a></p></div><p id=b></p>");
    let div = document.query_selector("div").unwrap().unwrap();
    let a = document.query_selector("#a").unwrap().unwrap();
    let b = document.query_selector("#b").unwrap().unwrap();

    assert_eq!(a.compare_document_position(&a), 0);
    assert_eq!(b.compare_document_position(&a), document_position::PRECEDING);
    assert_eq!(a.compare_document_position(&b), document_position::FOLLOWING);
    assert_eq!(
        a.compare_document_position(&div),
        document_position::CONTAINS | document_position::PRECEDING
    );
    assert_eq!(a.compare_document_position(&div), 10);
    assert_eq!(
        div.compare_document_position(&a),
        document_position::CONTAINED_BY | document_position::FOLLOWING
    );
    assert_eq!(div.compare_document_position(&a), 20);
}

#[test]
fn test_compare_disconnected_is_consistent() {
    let document = parse("<p></p>");
    let p = document.query_selector("p").unwrap().unwrap();
    let detached = document.create_element("span");
    let elsewhere = parse("<i></i>").query_selector("i").unwrap().unwrap();

    for other in [&detached, &elsewhere] {
        let forward = p.compare_document_position(other);
        let backward = other.compare_document_position(&p);
        let base = document_position::DISCONNECTED | document_position::IMPLEMENTATION_SPECIFIC;
        assert_eq!(forward & base, base);
        assert_eq!(backward & base, base);
        let direction = document_position::PRECEDING | document_position::FOLLOWING;
        assert_ne!(forward & direction, 0);
        assert_ne!(forward & direction, backward & direction);
        assert_eq!(p.compare_document_position(other), forward);
    }
}
