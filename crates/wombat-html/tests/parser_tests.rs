//! Integration tests for the HTML tree builder.

use wombat_common::ParseOptions;
use wombat_dom::{DomTree, Namespace, NodeId, NodeType};
use wombat_html::{
    HTMLParser, HTMLTokenizer, HtmlSerializer, InsertionMode, format_tree, parse_document,
    parse_document_with_issues, parse_fragment,
};

/// Helper to parse an HTML string with default options.
fn parse(html: &str) -> DomTree {
    parse_document(html, &ParseOptions::default())
}

/// `innerHTML` of the body element.
fn body_html(tree: &DomTree) -> String {
    let body = tree.body(NodeId::ROOT).unwrap();
    HtmlSerializer::new().serialize_inner(tree, body)
}

/// Find the first element with the given tag name in tree order.
fn find_element(tree: &DomTree, tag: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .find(|&id| tree.tag_name(id) == Some(tag))
        .unwrap()
}

#[test]
fn test_empty_document_has_html_head_body() {
    let tree = parse("");
    let html = tree.document_element(NodeId::ROOT).unwrap();
    assert_eq!(tree.tag_name(html), Some("html"));
    assert!(tree.head(NodeId::ROOT).is_some());
    assert!(tree.body(NodeId::ROOT).is_some());
    assert_eq!(
        HtmlSerializer::new().serialize_outer(&tree, NodeId::ROOT),
        "<html><head></head><body></body></html>"
    );
}

#[test]
fn test_simple_document() {
    let tree = parse("<!DOCTYPE html><html><head><title>Test</title></head><body><p>Hello</p></body></html>");
    assert_eq!(
        HtmlSerializer::new().serialize_outer(&tree, NodeId::ROOT),
        "<!DOCTYPE html><html><head><title>Test</title></head><body><p>Hello</p></body></html>"
    );
}

#[test]
fn test_doctype_node() {
    let tree = parse("<!DOCTYPE html><p>x");
    let first = tree.first_child(NodeId::ROOT).unwrap();
    match &tree.get(first).unwrap().node_type {
        NodeType::Doctype(doctype) => {
            assert_eq!(doctype.name, "html");
            assert_eq!(doctype.public_id, "");
            assert_eq!(doctype.system_id, "");
        }
        other => panic!("Expected doctype, got {other:?}"),
    }
}

#[test]
fn test_title_goes_into_head() {
    let tree = parse("<title>A &amp; B</title><p>body text");
    let head = tree.head(NodeId::ROOT).unwrap();
    let title = tree.first_child(head).unwrap();
    assert_eq!(tree.tag_name(title), Some("title"));
    assert_eq!(tree.descendant_text_content(title), "A & B");
    assert_eq!(body_html(&tree), "<p>body text</p>");
}

#[test]
fn test_stray_body_tag_is_merged() {
    let tree = parse(
        r#"<div class="one">first</div><body>Bad body</body><div id="two">second</div>"#,
    );
    let html = tree.document_element(NodeId::ROOT).unwrap();
    assert_eq!(
        HtmlSerializer::new().serialize_outer(&tree, html),
        r#"<html><head></head><body><div class="one">first</div>Bad body<div id="two">second</div></body></html>"#
    );
}

#[test]
fn test_stray_body_attributes_are_added_once() {
    let tree = parse(r#"<body class="a"><body class="b" id="x">"#);
    let body = tree.body(NodeId::ROOT).unwrap();
    let element = tree.as_element(body).unwrap();
    assert_eq!(element.attrs.get("class"), Some("a"));
    assert_eq!(element.attrs.get("id"), Some("x"));
}

#[test]
fn test_stray_html_attributes_are_merged() {
    let tree = parse(r#"<html lang="en"><body><html class="x" lang="fr">"#);
    let html = tree.document_element(NodeId::ROOT).unwrap();
    let element = tree.as_element(html).unwrap();
    assert_eq!(element.attrs.get("lang"), Some("en"));
    assert_eq!(element.attrs.get("class"), Some("x"));
}

#[test]
fn test_comment_in_body() {
    let tree = parse("<p>a</p><!-- hi -->");
    let body = tree.body(NodeId::ROOT).unwrap();
    let last = tree.last_child(body).unwrap();
    assert!(matches!(&tree.get(last).unwrap().node_type, NodeType::Comment(data) if data == " hi "));
}

#[test]
fn test_comment_before_html_belongs_to_document() {
    let tree = parse("<!--c--><html><body></body></html>");
    let first = tree.first_child(NodeId::ROOT).unwrap();
    assert!(matches!(&tree.get(first).unwrap().node_type, NodeType::Comment(data) if data == "c"));
}

#[test]
fn test_text_is_coalesced() {
    let tree = parse("a&amp;b");
    let body = tree.body(NodeId::ROOT).unwrap();
    assert_eq!(tree.children(body).len(), 1);
    assert_eq!(tree.as_text(tree.children(body)[0]), Some("a&b"));
}

#[test]
fn test_paragraph_closed_by_block() {
    let tree = parse("<p>a<div>b</div>");
    assert_eq!(body_html(&tree), "<p>a</p><div>b</div>");
}

#[test]
fn test_implied_paragraph_end() {
    let tree = parse("<p>one<p>two");
    assert_eq!(body_html(&tree), "<p>one</p><p>two</p>");
}

#[test]
fn test_list_items_close_each_other() {
    let tree = parse("<ul><li>a<li>b</ul>");
    assert_eq!(body_html(&tree), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn test_nested_list_item_stays_nested() {
    let tree = parse("<ul><li>a<ul><li>b</ul></ul>");
    assert_eq!(body_html(&tree), "<ul><li>a<ul><li>b</li></ul></li></ul>");
}

#[test]
fn test_headings_close_each_other() {
    let tree = parse("<h1>a<h2>b");
    assert_eq!(body_html(&tree), "<h1>a</h1><h2>b</h2>");
}

#[test]
fn test_options_close_each_other() {
    let tree = parse("<select><option>a<option>b</select>");
    assert_eq!(
        body_html(&tree),
        "<select><option>a</option><option>b</option></select>"
    );
}

#[test]
fn test_table_cells_close_each_other() {
    let tree = parse("<table><tr><td>a<td>b</table><p>after");
    assert_eq!(
        body_html(&tree),
        "<table><tr><td>a</td><td>b</td></tr></table><p>after</p>"
    );
}

#[test]
fn test_adoption_agency_misnested_formatting() {
    let tree = parse("<b>1<p>2</b>3</p>");
    assert_eq!(body_html(&tree), "<b>1</b><p><b>2</b>3</p>");
}

#[test]
fn test_formatting_reconstructed_after_block() {
    let tree = parse("<p><i>a</p>b");
    assert_eq!(body_html(&tree), "<p><i>a</i></p><i>b</i>");
}

#[test]
fn test_void_elements_have_no_children() {
    let tree = parse("<p>a<br>b<img src=x>c</p>");
    let br = find_element(&tree, "br");
    assert!(tree.children(br).is_empty());
    assert_eq!(body_html(&tree), r#"<p>a<br>b<img src="x">c</p>"#);
}

#[test]
fn test_leading_newline_dropped_after_pre() {
    let tree = parse("<pre>\nx</pre>");
    let pre = find_element(&tree, "pre");
    assert_eq!(tree.descendant_text_content(pre), "x");
}

#[test]
fn test_leading_newline_dropped_after_textarea() {
    let tree = parse("<textarea>\n\nvalue</textarea>");
    let textarea = find_element(&tree, "textarea");
    assert_eq!(tree.descendant_text_content(textarea), "\nvalue");
}

#[test]
fn test_text_after_body_end_goes_into_body() {
    let tree = parse("<body>a</body>b");
    assert_eq!(body_html(&tree), "ab");
}

#[test]
fn test_svg_names_and_attributes_are_adjusted() {
    let tree = parse(r#"<svg viewbox="0 0 10 10"><path d="M0 0"/><circle r="1"></circle></svg>"#);
    assert_eq!(
        body_html(&tree),
        r#"<svg viewBox="0 0 10 10"><path d="M0 0"></path><circle r="1"></circle></svg>"#
    );
    let path = find_element(&tree, "path");
    assert_eq!(tree.as_element(path).unwrap().namespace, Namespace::Svg);
    assert!(tree.children(path).is_empty());
}

#[test]
fn test_foreign_object_content_is_html() {
    let tree = parse("<svg><foreignObject><div>x</div></foreignObject></svg>");
    let foreign_object = find_element(&tree, "foreignObject");
    assert_eq!(
        tree.as_element(foreign_object).unwrap().namespace,
        Namespace::Svg
    );
    let div = find_element(&tree, "div");
    assert_eq!(tree.as_element(div).unwrap().namespace, Namespace::Html);
    assert_eq!(tree.parent(div), Some(foreign_object));
}

#[test]
fn test_html_element_breaks_out_of_svg() {
    let tree = parse("<svg><p>text</p></svg>");
    assert_eq!(body_html(&tree), "<svg></svg><p>text</p>");
}

#[test]
fn test_mathml_attribute_adjustment() {
    let tree = parse(r#"<math definitionurl="x"><mi>y</mi></math>"#);
    let math = find_element(&tree, "math");
    let element = tree.as_element(math).unwrap();
    assert_eq!(element.namespace, Namespace::MathMl);
    assert_eq!(element.attrs.get("definitionURL"), Some("x"));
}

#[test]
fn test_script_content_is_one_text_node() {
    let tree = parse("<script>if (a < b) {}</script>");
    let script = find_element(&tree, "script");
    assert_eq!(tree.children(script).len(), 1);
    assert_eq!(tree.descendant_text_content(script), "if (a < b) {}");
}

#[test]
fn test_noscript_without_scripting_parses_markup() {
    let options = ParseOptions::default().with_scripting(false);
    let tree = parse_document("<noscript><p>x</p></noscript>", &options);
    let noscript = find_element(&tree, "noscript");
    assert_eq!(
        tree.element_children(noscript)
            .filter_map(|id| tree.tag_name(id))
            .collect::<Vec<_>>(),
        vec!["p"]
    );
}

#[test]
fn test_stray_end_tag_is_reported() {
    let (tree, issues) = parse_document_with_issues("<p>a</div>b</p>", &ParseOptions::default());
    assert!(!issues.is_empty());
    assert_eq!(body_html(&tree), "<p>ab</p>");
}

#[test]
fn test_well_formed_document_has_no_issues() {
    let (_, issues) = parse_document_with_issues(
        "<!DOCTYPE html><html><head></head><body><p>ok</p></body></html>",
        &ParseOptions::default(),
    );
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
}

#[test]
fn test_fragment_has_no_wrapper_elements() {
    let tree = parse_fragment("<li>a</li>text", "ul", &ParseOptions::default());
    let root = NodeId::ROOT;
    assert!(matches!(tree.get(root).unwrap().node_type, NodeType::DocumentFragment));
    assert_eq!(tree.children(root).len(), 2);
    assert_eq!(tree.tag_name(tree.children(root)[0]), Some("li"));
    assert_eq!(tree.as_text(tree.children(root)[1]), Some("text"));
}

#[test]
fn test_fragment_with_rcdata_context() {
    let tree = parse_fragment("<b>x</b>", "title", &ParseOptions::default());
    let root = NodeId::ROOT;
    assert_eq!(tree.children(root).len(), 1);
    assert_eq!(tree.as_text(tree.children(root)[0]), Some("<b>x</b>"));
}

#[test]
fn test_fragment_end_tag_for_context_is_ignored() {
    let tree = parse_fragment("a</div>b", "div", &ParseOptions::default());
    assert_eq!(HtmlSerializer::new().serialize_inner(&tree, NodeId::ROOT), "ab");
}

#[test]
fn test_parser_starts_in_initial_mode() {
    let mut tokenizer = HTMLTokenizer::new("<p>x</p>");
    tokenizer.run();
    let parser = HTMLParser::new(tokenizer.into_tokens());
    assert_eq!(parser.insertion_mode(), InsertionMode::Initial);
}

#[test]
fn test_format_tree_shows_structure() {
    let tree = parse("<p class=\"a\">hi</p>");
    let dump = format_tree(&tree, NodeId::ROOT);
    assert!(dump.contains("<p class=\"a\">"));
    assert!(dump.contains("\"hi\""));
}

#[test]
fn test_reparse_of_serialization_is_stable() {
    let source = "<div id=a><p>one</div><ul><li>x<li>y</ul><!--c--><svg><rect/></svg>";
    let first = HtmlSerializer::new().serialize_outer(&parse(source), NodeId::ROOT);
    let second = HtmlSerializer::new().serialize_outer(&parse(&first), NodeId::ROOT);
    assert_eq!(first, second);
}

// ========== Templates ==========

#[test]
fn test_template_in_head_keeps_one_head_and_body() {
    let source = "<!DOCTYPE html><html><head><template><p>x</p></template></head>\
                  <body><div id=main>m</div></body></html>";
    let tree = parse(source);
    let html = tree.document_element(NodeId::ROOT).unwrap();
    let children: Vec<_> = tree
        .element_children(html)
        .map(|id| tree.tag_name(id).unwrap())
        .collect();
    assert_eq!(children, vec!["head", "body"]);

    let head = tree.head(NodeId::ROOT).unwrap();
    let template = find_element(&tree, "template");
    assert_eq!(tree.parent(template), Some(head));
    assert_eq!(
        HtmlSerializer::new().serialize_inner(&tree, template),
        "<p>x</p>"
    );
    assert_eq!(body_html(&tree), r#"<div id="main">m</div>"#);
    assert_eq!(
        HtmlSerializer::new().serialize_outer(&tree, NodeId::ROOT),
        "<!DOCTYPE html><html><head><template><p>x</p></template></head>\
         <body><div id=\"main\">m</div></body></html>"
    );
}

#[test]
fn test_head_content_after_template_stays_in_head() {
    let tree = parse("<head><template>t<b>b</b></template><title>T</title></head><p>x");
    let head = tree.head(NodeId::ROOT).unwrap();
    let title = find_element(&tree, "title");
    assert_eq!(tree.parent(title), Some(head));
    assert_eq!(
        HtmlSerializer::new().serialize_inner(&tree, head),
        "<template>t<b>b</b></template><title>T</title>"
    );
    assert_eq!(body_html(&tree), "<p>x</p>");
}

#[test]
fn test_nested_templates_restore_their_modes() {
    let tree = parse("<head><template><template>a</template>b</template></head><p>c");
    let outer = find_element(&tree, "template");
    assert_eq!(tree.parent(outer), tree.head(NodeId::ROOT));
    assert_eq!(
        HtmlSerializer::new().serialize_inner(&tree, outer),
        "<template>a</template>b"
    );
    assert_eq!(body_html(&tree), "<p>c</p>");
}

// ========== Round trips ==========

/// Documents covering the tree builder's repairs. Each must serialize to
/// markup that parses back to an equal tree.
const ROUND_TRIP_CORPUS: &[&str] = &[
    "",
    "<!DOCTYPE html><title>t</title><p>x",
    "<!--before--><html><!--in html--><head></head><body></body></html><!--after-->",
    "<p>one<p>two<div>three</div>four",
    "<ul><li>a<li>b<ul><li>c</ul></ul><dl><dt>t<dd>d</dl>",
    "<h1>a<h2>b</h2>",
    "<b><i>misnested</b> formatting</i>",
    "<a href=x>one<a href=y>two</a>",
    "<p><b>bold<div>block</div>after</b></p>",
    "<select><option>a<option>b<optgroup><option>c</select>",
    "<svg viewBox='0 0 1 1'><foreignObject><p>html</p></foreignObject><rect/></svg>",
    "<math><mi definitionURL=x>m</mi></math><p>after",
    "<head><template><p>x</p></template></head><body>b",
    "<template><li>a<li>b</template>",
    "<pre>\n\nleading</pre><textarea>\nraw <b></textarea><listing>\nx</listing>",
    "<script>if (a < b && c) {}</script><style>p > a {}</style>",
    "<p title='a \"quoted\" &amp; value'>a &amp; b &lt; c</p>",
    "<img src=a alt=b><br><input disabled><hr>",
    "</p>stray end tags</div></span>",
    "<body class=a><body id=b>merged",
];

/// Exactly one `head` and one `body`, both children of the root element,
/// with any doctype first.
fn assert_document_shape(tree: &DomTree, source: &str) {
    let html = tree.document_element(NodeId::ROOT).unwrap();
    let count = |tag: &str| {
        tree.descendants(NodeId::ROOT)
            .filter(|&id| tree.tag_name(id) == Some(tag))
            .count()
    };
    assert_eq!(count("html"), 1, "{source:?}");
    assert_eq!(count("head"), 1, "{source:?}");
    assert_eq!(count("body"), 1, "{source:?}");
    assert_eq!(tree.parent(tree.head(NodeId::ROOT).unwrap()), Some(html));
    assert_eq!(tree.parent(tree.body(NodeId::ROOT).unwrap()), Some(html));
    assert_eq!(tree.element_children(NodeId::ROOT).count(), 1, "{source:?}");
    let doctypes: Vec<usize> = tree
        .children(NodeId::ROOT)
        .iter()
        .enumerate()
        .filter(|&(_, &id)| matches!(tree.get(id).unwrap().node_type, NodeType::Doctype(_)))
        .map(|(index, _)| index)
        .collect();
    assert!(doctypes.is_empty() || doctypes == vec![0], "{source:?}");
}

#[test]
fn test_round_trip_corpus_is_stable() {
    let serializer = HtmlSerializer::new();
    for source in ROUND_TRIP_CORPUS {
        let first = parse(source);
        assert_document_shape(&first, source);
        let markup = serializer.serialize_outer(&first, NodeId::ROOT);

        let second = parse(&markup);
        assert_document_shape(&second, &markup);
        assert!(
            first.nodes_equal(NodeId::ROOT, &second, NodeId::ROOT),
            "{source:?} reparsed differently from {markup:?}"
        );
        assert_eq!(serializer.serialize_outer(&second, NodeId::ROOT), markup);
    }
}
