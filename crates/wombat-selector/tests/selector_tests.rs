//! Integration tests for CSS selector parsing and matching.

use wombat_common::ParseOptions;
use wombat_dom::{DomTree, NodeId};
use wombat_html::parse_document;
use wombat_selector::{
    AttributeSelector, Combinator, PseudoClass, SelectorList, SimpleSelector,
};

fn parse_html(html: &str) -> DomTree {
    parse_document(html, &ParseOptions::default())
}

fn parse(selector: &str) -> SelectorList {
    SelectorList::parse(selector).unwrap()
}

/// Tag names (plus `#id` when present) of every match under the document.
fn select(tree: &DomTree, selector: &str) -> Vec<String> {
    parse(selector)
        .all_matches(tree, NodeId::ROOT)
        .into_iter()
        .map(|id| {
            let element = tree.as_element(id).unwrap();
            element.id().map_or_else(
                || element.tag_name.clone(),
                |id| format!("{}#{id}", element.tag_name),
            )
        })
        .collect()
}

fn element_by_id(tree: &DomTree, id: &str) -> NodeId {
    parse(&format!("#{id}"))
        .first_match(tree, NodeId::ROOT)
        .unwrap()
}

// ========== Parsing ==========

#[test]
fn test_parse_type_selector() {
    let list = parse("BODY");
    assert_eq!(list.selectors.len(), 1);
    let selector = &list.selectors[0];
    assert!(selector.combinators.is_empty());
    assert_eq!(
        selector.subject.simple_selectors,
        vec![SimpleSelector::Type("body".to_string())]
    );
}

#[test]
fn test_parse_compound_selector() {
    let list = parse("div.highlight#main.big");
    assert_eq!(
        list.selectors[0].subject.simple_selectors,
        vec![
            SimpleSelector::Type("div".to_string()),
            SimpleSelector::Class("highlight".to_string()),
            SimpleSelector::Id("main".to_string()),
            SimpleSelector::Class("big".to_string()),
        ]
    );
}

#[test]
fn test_parse_combinator_chain_is_right_to_left() {
    let list = parse("div.container > ul li");
    let selector = &list.selectors[0];
    assert_eq!(
        selector.subject.simple_selectors,
        vec![SimpleSelector::Type("li".to_string())]
    );
    let combinators: Vec<Combinator> = selector.combinators.iter().map(|(c, _)| *c).collect();
    assert_eq!(combinators, vec![Combinator::Descendant, Combinator::Child]);
}

#[test]
fn test_parse_combinators_without_spaces() {
    let list = parse("h1+p~span>b");
    let combinators: Vec<Combinator> = list.selectors[0]
        .combinators
        .iter()
        .map(|(c, _)| *c)
        .collect();
    assert_eq!(
        combinators,
        vec![
            Combinator::Child,
            Combinator::SubsequentSibling,
            Combinator::NextSibling
        ]
    );
}

#[test]
fn test_parse_selector_list() {
    let list = parse("h1, .title ,#main");
    assert_eq!(list.selectors.len(), 3);
}

#[test]
fn test_parse_attribute_selectors() {
    let list = parse(r#"a[href][target=_blank][rel~="noopener"][lang|=en][src^='https'][src$=".png"][data-x*=y]"#);
    let simple = &list.selectors[0].subject.simple_selectors;
    assert_eq!(simple.len(), 8);
    assert_eq!(
        simple[1],
        SimpleSelector::Attribute(AttributeSelector::Exists("href".to_string()))
    );
    assert_eq!(
        simple[2],
        SimpleSelector::Attribute(AttributeSelector::Equals(
            "target".to_string(),
            "_blank".to_string()
        ))
    );
    assert_eq!(
        simple[5],
        SimpleSelector::Attribute(AttributeSelector::PrefixMatch(
            "src".to_string(),
            "https".to_string()
        ))
    );
}

#[test]
fn test_parse_comma_inside_attribute_value() {
    let list = parse(r#"[title="a,b"], p"#);
    assert_eq!(list.selectors.len(), 2);
}

#[test]
fn test_parse_pseudo_classes() {
    let list = parse("li:first-child:LAST-CHILD");
    assert_eq!(
        list.selectors[0].subject.simple_selectors[1..],
        [
            SimpleSelector::PseudoClass(PseudoClass::FirstChild),
            SimpleSelector::PseudoClass(PseudoClass::LastChild),
        ]
    );
}

#[test]
fn test_invalid_selectors_are_errors() {
    for bad in [
        "",
        "   ",
        "div,",
        ",div",
        "> p",
        "div >",
        "div..x",
        "#",
        "p::before",
        "li:nth-child(2)",
        "a:hover",
        "[",
        "[href",
        "[href=]",
        "[title=\"open]",
        "ns|div",
        "div!",
        "1abc",
    ] {
        assert!(SelectorList::parse(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn test_error_names_the_selector() {
    let err = SelectorList::parse("p::after").unwrap_err();
    assert_eq!(err.selector, "p::after");
    assert!(err.to_string().contains("p::after"));
}

// ========== Matching ==========

#[test]
fn test_query_all_in_document_order() {
    let tree = parse_html("<div id=a><div id=b></div></div><p><div id=c></div></p>");
    assert_eq!(select(&tree, "div"), vec!["div#a", "div#b", "div#c"]);
}

#[test]
fn test_type_matching_is_case_insensitive() {
    let tree = parse_html("<section><P>x</P></section>");
    assert_eq!(select(&tree, "SECTION p"), vec!["p"]);
}

#[test]
fn test_child_combinator_on_body() {
    let tree = parse_html("<div id=one><span></span></div><div id=two></div>");
    assert_eq!(select(&tree, "body>*"), vec!["div#one", "div#two"]);
}

#[test]
fn test_descendant_combinator() {
    let tree = parse_html(
        "<div class=foo><p><span id=in>a</span></p></div><span id=out>b</span>",
    );
    assert_eq!(select(&tree, ".foo span"), vec!["span#in"]);
}

#[test]
fn test_descendant_combinator_backtracks() {
    // The nearest `span` above the `b` is not the child of `#o`; the outer one is.
    let tree = parse_html(
        "<div id=o><span><div id=i><span><b id=t></b></span></div></span></div>",
    );
    assert_eq!(select(&tree, "#o > span b"), vec!["b#t"]);
    assert_eq!(select(&tree, "#i > span b"), vec!["b#t"]);
    assert_eq!(select(&tree, "#t > span b"), Vec::<String>::new());
}

#[test]
fn test_sibling_combinators() {
    let tree = parse_html("<h1></h1><!--c--><p id=a></p><p id=b></p><div><p id=c></p></div>");
    assert_eq!(select(&tree, "h1 + p"), vec!["p#a"]);
    assert_eq!(select(&tree, "h1 ~ p"), vec!["p#a", "p#b"]);
}

#[test]
fn test_selector_list_matches_any() {
    let tree = parse_html("<h1 id=t></h1><p class=x></p><span></span>");
    assert_eq!(select(&tree, "span, h1, .x"), vec!["h1#t", "p", "span"]);
}

#[test]
fn test_multiple_classes_intersect() {
    let tree = parse_html("<p class='a b' id=both></p><p class=a id=one></p>");
    assert_eq!(select(&tree, ".a.b"), vec!["p#both"]);
}

#[test]
fn test_attribute_operators() {
    let tree = parse_html(
        r#"<a id=l1 href="https://x.org/a.png" lang="en-US" rel="noopener external"></a>
           <a id=l2 href="http://y.org" lang="english"></a>"#,
    );
    assert_eq!(select(&tree, "[href]"), vec!["a#l1", "a#l2"]);
    assert_eq!(select(&tree, "[HREF^=https]"), vec!["a#l1"]);
    assert_eq!(select(&tree, "[href$='.png']"), vec!["a#l1"]);
    assert_eq!(select(&tree, "[href*=y]"), vec!["a#l2"]);
    assert_eq!(select(&tree, "[lang|=en]"), vec!["a#l1"]);
    assert_eq!(select(&tree, "[rel~=external]"), vec!["a#l1"]);
    assert_eq!(select(&tree, "[rel=noopener]"), Vec::<String>::new());
    assert_eq!(select(&tree, "[href^='']"), Vec::<String>::new());
}

#[test]
fn test_structural_pseudo_classes() {
    let tree = parse_html(
        "<ul><li id=a></li><li id=b></li><li id=c></li></ul><ol><li id=only></li></ol>",
    );
    assert_eq!(select(&tree, "li:first-child"), vec!["li#a", "li#only"]);
    assert_eq!(select(&tree, "li:last-child"), vec!["li#c", "li#only"]);
    assert_eq!(select(&tree, "li:only-child"), vec!["li#only"]);
    assert_eq!(select(&tree, ":root"), vec!["html"]);
}

#[test]
fn test_of_type_pseudo_classes() {
    let tree = parse_html("<div><span id=s1></span><p id=p1></p><p id=p2></p><span id=s2></span></div>");
    assert_eq!(select(&tree, "p:first-of-type"), vec!["p#p1"]);
    assert_eq!(select(&tree, "div > :last-of-type"), vec!["p#p2", "span#s2"]);
}

#[test]
fn test_empty_pseudo_class() {
    let tree = parse_html("<p id=a></p><p id=b><!--c--></p><p id=c> </p><p id=d>x</p>");
    assert_eq!(select(&tree, "p:empty"), vec!["p#a", "p#b"]);
}

#[test]
fn test_first_match_and_no_match() {
    let tree = parse_html("<p id=one></p><p id=two></p>");
    let first = parse("p").first_match(&tree, NodeId::ROOT).unwrap();
    assert_eq!(first, element_by_id(&tree, "one"));
    assert_eq!(parse("table").first_match(&tree, NodeId::ROOT), None);
}

#[test]
fn test_scope_is_excluded_but_context_counts() {
    let tree = parse_html("<div id=outer><p id=inner></p></div>");
    let outer = element_by_id(&tree, "outer");
    assert_eq!(parse("div").first_match(&tree, outer), None);
    // Ancestors outside the scope still satisfy combinators.
    assert!(parse("body div p").first_match(&tree, outer).is_some());
}

#[test]
fn test_closest_is_inclusive() {
    let tree = parse_html("<section class=s><div><p id=p></p></div></section>");
    let p = element_by_id(&tree, "p");
    assert_eq!(parse("p").closest(&tree, p), Some(p));
    let section = parse("section").first_match(&tree, NodeId::ROOT).unwrap();
    assert_eq!(parse(".s").closest(&tree, p), Some(section));
    assert_eq!(parse("table").closest(&tree, p), None);
}

#[test]
fn test_text_nodes_never_match() {
    let tree = parse_html("<p>text</p>");
    let p = parse("p").first_match(&tree, NodeId::ROOT).unwrap();
    let text = tree.first_child(p).unwrap();
    assert!(!parse("*").matches(&tree, text));
    assert!(parse("*").matches(&tree, p));
}
