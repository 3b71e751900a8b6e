//! Integration tests for tree mutation, markup setters and character data.

use wombat::{Document, DomError, DomParser, Node};

fn parse(html: &str) -> Document {
    DomParser::new().parse_from_string(html, "text/html").unwrap()
}

fn select(document: &Document, selector: &str) -> Node {
    document.query_selector(selector).unwrap().unwrap()
}

fn body_html(document: &Document) -> String {
    document.body().unwrap().inner_html()
}

// ========== Insertion and removal ==========

#[test]
fn test_append_moves_a_node_exactly_once() {
    let document = parse("<div id=a></div><div id=b></div><span id=s></span>");
    let a = select(&document, "#a");
    let b = select(&document, "#b");
    let span = select(&document, "#s");

    let inserted = a.append_child(&span).unwrap();
    assert_eq!(inserted, span);
    let _ = b.append_child(&span).unwrap();

    assert_eq!(
        body_html(&document),
        r#"<div id="a"></div><div id="b"><span id="s"></span></div>"#
    );
    assert_eq!(document.query_selector_all("span").unwrap().len(), 1);
    assert_eq!(span.parent_node().unwrap(), b);
}

#[test]
fn test_prepend_before_and_after() {
    let document = parse("<ul><li id=m>m</li></ul>");
    let ul = select(&document, "ul");
    let m = select(&document, "#m");

    let first = document.create_element("li");
    first.set_text_content("first");
    ul.prepend(&first).unwrap();

    let before = document.create_text_node("<");
    m.before(&before).unwrap();
    let after = document.create_comment("after");
    m.after(&after).unwrap();

    assert_eq!(
        ul.inner_html(),
        r#"<li>first</li>&lt;<li id="m">m</li><!--after-->"#
    );
}

#[test]
fn test_before_and_after_without_parent_are_noops() {
    let document = parse("");
    let detached = document.create_element("p");
    let other = document.create_element("i");
    detached.before(&other).unwrap();
    detached.after(&other).unwrap();
    assert!(other.parent_node().is_none());
}

#[test]
fn test_insert_before() {
    let document = parse("<div><b>1</b><i>2</i></div>");
    let div = select(&document, "div");
    let i = select(&document, "i");

    let u = document.create_element("u");
    let _ = div.insert_before(&u, Some(&i)).unwrap();
    let s = document.create_element("s");
    let _ = div.insert_before(&s, None).unwrap();
    assert_eq!(div.inner_html(), "<b>1</b><u></u><i>2</i><s></s>");

    let stranger = document.create_element("p");
    let err = div.insert_before(&u, Some(&stranger)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "NotFoundError: The node before which the new node is to be inserted is not a child of this node."
    );
}

#[test]
fn test_replace_child() {
    let document = parse("<div><span>old</span></div>");
    let div = select(&document, "div");
    let old = select(&document, "span");
    let new = document.create_element("b");
    new.set_text_content("new");

    let returned = div.replace_child(&new, &old).unwrap();
    assert_eq!(returned, old);
    assert_eq!(div.inner_html(), "<b>new</b>");
    assert!(old.parent_node().is_none());
}

#[test]
fn test_replace_child_with_stranger_fails_cleanly() {
    let document = parse("<div><span>a</span></div><p>b</p>");
    let div = select(&document, "div");
    let p = select(&document, "p");
    let new = document.create_element("b");

    let err = div.replace_child(&new, &p).unwrap_err();
    assert_eq!(
        err,
        DomError::NotFound("The node to be replaced is not a child of this node.")
    );
    assert_eq!(body_html(&document), "<div><span>a</span></div><p>b</p>");
}

#[test]
fn test_remove_child() {
    let document = parse("<div><span>a</span><span>b</span></div>");
    let div = select(&document, "div");
    let first = select(&document, "span");

    let removed = div.remove_child(&first).unwrap();
    assert_eq!(removed, first);
    assert!(first.parent_node().is_none());
    assert_eq!(div.inner_html(), "<span>b</span>");
}

#[test]
fn test_remove_child_failure_leaves_children_unchanged() {
    let document = parse("<div><p><span>deep</span></p></div>");
    let div = select(&document, "div");
    let span = select(&document, "span");
    let before = div.inner_html();

    let err = div.remove_child(&span).unwrap_err();
    assert_eq!(
        err.to_string(),
        "NotFoundError: The node to be removed is not a child of this node."
    );
    assert_eq!(div.inner_html(), before);
    assert_eq!(span.parent_element().unwrap().tag_name().as_deref(), Some("P"));
}

#[test]
fn test_remove_is_idempotent() {
    let document = parse("<p>x</p>");
    let p = select(&document, "p");
    p.remove();
    p.remove();
    assert_eq!(body_html(&document), "");
    assert_eq!(p.outer_html(), "<p>x</p>");
}

#[test]
fn test_replace_with() {
    let document = parse("<div><p>a</p><p>b</p></div>");
    let first = select(&document, "p");
    let h = document.create_element("h1");
    first.replace_with(&h).unwrap();
    assert_eq!(select(&document, "div").inner_html(), "<h1></h1><p>b</p>");
    assert!(first.parent_node().is_none());
}

#[test]
fn test_replace_children() {
    let document = parse("<div><p>a</p><i>b</i></div>");
    let div = select(&document, "div");
    let italic = select(&document, "i");

    div.replace_children(Some(&italic)).unwrap();
    assert_eq!(div.inner_html(), "<i>b</i>");

    assert!(matches!(
        italic.replace_children(Some(&div)),
        Err(DomError::HierarchyRequest(_))
    ));
    assert_eq!(div.inner_html(), "<i>b</i>");

    div.replace_children(None).unwrap();
    assert!(!div.has_child_nodes());
    assert!(italic.parent_node().is_none());
}

#[test]
fn test_fragment_insertion_moves_children() {
    let document = parse("<div></div>");
    let div = select(&document, "div");
    let fragment = document.create_document_fragment();
    let _ = fragment.append_child(&document.create_element("a")).unwrap();
    let _ = fragment.append_child(&document.create_text_node("t")).unwrap();

    let _ = div.append_child(&fragment).unwrap();
    assert_eq!(div.inner_html(), "<a></a>t");
    assert!(!fragment.has_child_nodes());
}

#[test]
fn test_hierarchy_errors() {
    let document = parse("<div><p></p></div>");
    let div = select(&document, "div");
    let p = select(&document, "p");
    let html = document.document_element().unwrap();

    assert!(matches!(div.append_child(&div), Err(DomError::HierarchyRequest(_))));
    assert!(matches!(p.append_child(&div), Err(DomError::HierarchyRequest(_))));
    assert!(matches!(p.append_child(&html), Err(DomError::HierarchyRequest(_))));
    assert!(matches!(
        div.append_child(&parse("")),
        Err(DomError::HierarchyRequest(_))
    ));

    let text = document.create_text_node("t");
    assert!(matches!(
        text.append_child(&document.create_element("b")),
        Err(DomError::HierarchyRequest(_))
    ));
    assert_eq!(div.inner_html(), "<p></p>");
}

// ========== Document children ==========

#[test]
fn test_document_rejects_a_second_element_or_text() {
    let document = parse("<!DOCTYPE html><p>x</p>");
    let before = document.outer_html();

    let extra = document.create_element("div");
    assert!(matches!(
        document.append_child(&extra),
        Err(DomError::HierarchyRequest(_))
    ));
    assert!(matches!(
        document.prepend(&document.create_text_node("t")),
        Err(DomError::HierarchyRequest(_))
    ));
    assert!(matches!(
        document.replace_children(Some(&extra)),
        Err(DomError::HierarchyRequest(_))
    ));

    let html = document.document_element().unwrap();
    assert!(matches!(
        html.after(&extra),
        Err(DomError::HierarchyRequest(_))
    ));
    assert!(matches!(
        html.insert_adjacent_element("beforebegin", &extra),
        Err(DomError::HierarchyRequest(_))
    ));

    assert_eq!(document.outer_html(), before);
    assert!(extra.parent_node().is_none());
    assert_eq!(document.child_element_count(), 1);
}

#[test]
fn test_document_rejects_fragments_that_break_the_single_element() {
    let document = parse("<p>x</p>");
    let html = document.document_element().unwrap();
    let _ = document.remove_child(&html).unwrap();

    let two = document.create_document_fragment();
    let _ = two.append_child(&document.create_element("html")).unwrap();
    let _ = two.append_child(&document.create_element("html")).unwrap();
    assert!(matches!(
        document.append_child(&two),
        Err(DomError::HierarchyRequest(_))
    ));

    let with_text = document.create_document_fragment();
    let _ = with_text.append_child(&document.create_element("html")).unwrap();
    let _ = with_text.append_child(&document.create_text_node("t")).unwrap();
    assert!(matches!(
        document.append_child(&with_text),
        Err(DomError::HierarchyRequest(_))
    ));
    assert!(!document.has_child_nodes());

    let one = document.create_document_fragment();
    let _ = one.append_child(&document.create_comment("c")).unwrap();
    let _ = one.append_child(&document.create_element("html")).unwrap();
    let _ = document.append_child(&one).unwrap();
    assert_eq!(document.outer_html(), "<!--c--><html></html>");
}

#[test]
fn test_document_element_can_be_replaced() {
    let document = parse("<!DOCTYPE html><p>old</p>");
    let old = document.document_element().unwrap();
    let new = document.create_element("html");
    let body = new.append_child(&document.create_element("body")).unwrap();
    body.set_text_content("new");

    assert_eq!(document.replace_child(&new, &old).unwrap(), old);
    assert_eq!(document.document_element().unwrap(), new);
    assert_eq!(
        document.outer_html(),
        "<!DOCTYPE html><html><body>new</body></html>"
    );

    let _ = document.remove_child(&new).unwrap();
    let _ = document.append_child(&old).unwrap();
    assert_eq!(document.document_element().unwrap(), old);
}

#[test]
fn test_document_keeps_the_doctype_first() {
    let source = parse("<!DOCTYPE html>");
    let doctype = source.doctype().unwrap();
    let document = parse("<p>x</p>");
    let html = document.document_element().unwrap();

    // Only one doctype, and never after the element.
    assert!(matches!(
        document.append_child(&doctype),
        Err(DomError::HierarchyRequest(_))
    ));
    assert!(matches!(
        html.append_child(&doctype),
        Err(DomError::HierarchyRequest(_))
    ));
    document.prepend(&doctype).unwrap();
    assert_eq!(document.doctype().unwrap(), doctype);
    assert!(source.doctype().is_none());

    let second = parse("<!DOCTYPE other>").doctype().unwrap();
    assert!(matches!(
        document.prepend(&second),
        Err(DomError::HierarchyRequest(_))
    ));

    // An element may not land before the doctype.
    let _ = document.remove_child(&html).unwrap();
    assert!(matches!(
        document.insert_before(&html, Some(&doctype)),
        Err(DomError::HierarchyRequest(_))
    ));
    let _ = document.append_child(&html).unwrap();
    assert_eq!(
        document.outer_html(),
        "<!DOCTYPE html><html><head></head><body><p>x</p></body></html>"
    );
}

#[test]
fn test_markup_setters_leave_the_document_element_alone() {
    let document = parse("<p>x</p>");
    let before = document.outer_html();

    document.set_inner_html("<p>a</p><p>b</p>");
    document.set_text_content("text");
    assert_eq!(document.outer_html(), before);

    let html = document.document_element().unwrap();
    assert!(matches!(
        html.insert_adjacent_text("afterend", "t"),
        Err(DomError::HierarchyRequest(_))
    ));
    assert!(matches!(
        html.insert_adjacent_html("beforebegin", "<p>"),
        Err(DomError::HierarchyRequest(_))
    ));
    assert_eq!(document.outer_html(), before);
}

#[test]
fn test_failed_move_leaves_both_documents_untouched() {
    let source = parse("<p id=moved>hi</p>");
    let target = parse("<div></div>");
    let p = select(&source, "#moved");
    let source_html = source.document_element().unwrap();

    assert!(matches!(
        target.append_child(&source_html),
        Err(DomError::HierarchyRequest(_))
    ));
    assert_eq!(p.owner_document().unwrap(), source);
    assert_eq!(source_html.parent_node().unwrap(), *source.as_node());
    assert_eq!(body_html(&source), r#"<p id="moved">hi</p>"#);
    assert_eq!(body_html(&target), "<div></div>");
}

// ========== Cloning ==========

#[test]
fn test_clone_depth() {
    let document = parse(r#"<div id="a" class="x"><p>text</p></div>"#);
    let div = select(&document, "div");

    let shallow = div.clone_node(false);
    assert_eq!(shallow.outer_html(), r#"<div id="a" class="x"></div>"#);
    assert!(!shallow.has_child_nodes());

    let deep = div.clone_node(true);
    assert_eq!(deep.outer_html(), div.outer_html());
    assert!(deep.parent_node().is_none());
    assert_eq!(deep.owner_document().unwrap(), document);
    assert_ne!(deep, div);
}

#[test]
fn test_clone_is_independent() {
    let document = parse(r#"<div id="a"><p>text</p></div>"#);
    let div = select(&document, "div");
    let copy = div.clone_node(true);

    copy.set_attribute("id", "b").unwrap();
    copy.first_child().unwrap().set_text_content("changed");
    assert_eq!(div.outer_html(), r#"<div id="a"><p>text</p></div>"#);
    assert_eq!(copy.outer_html(), r#"<div id="b"><p>changed</p></div>"#);
}

// ========== Across documents ==========

#[test]
fn test_move_between_documents() {
    let source = parse("<p id=moved>hi</p><p id=stays></p>");
    let target = parse("<div></div>");
    let p = select(&source, "#moved");

    let _ = select(&target, "div").append_child(&p).unwrap();
    assert_eq!(body_html(&target), r#"<div><p id="moved">hi</p></div>"#);
    assert_eq!(body_html(&source), r#"<p id="stays"></p>"#);
    assert_eq!(p.owner_document().unwrap(), target);

    // Handles into the old document keep working.
    let stays = select(&source, "#stays");
    stays.set_text_content("still here");
    assert_eq!(body_html(&source), r#"<p id="stays">still here</p>"#);
    assert!(source.contains(&stays));
    assert!(!source.contains(&p));
}

#[test]
fn test_import_and_adopt_node() {
    let source = parse("<p id=a>a</p><p id=b>b</p>");
    let target = parse("");
    let a = select(&source, "#a");
    let b = select(&source, "#b");

    let imported = target.import_node(&a, true).unwrap();
    assert_eq!(imported.outer_html(), r#"<p id="a">a</p>"#);
    assert_eq!(imported.owner_document().unwrap(), target);
    assert!(imported.parent_node().is_none());
    assert_eq!(a.parent_element(), source.body());

    let adopted = target.adopt_node(&b).unwrap();
    assert_eq!(adopted, b);
    assert!(b.parent_node().is_none());
    assert_eq!(b.owner_document().unwrap(), target);
    assert_eq!(body_html(&source), r#"<p id="a">a</p>"#);

    assert!(matches!(
        target.adopt_node(&source),
        Err(DomError::HierarchyRequest(_))
    ));
}

// ========== Attributes ==========

#[test]
fn test_attribute_methods() {
    let document = parse(r#"<div id="foo" class="bar"></div>"#);
    let div = select(&document, "div");

    assert!(div.has_attributes());
    assert_eq!(div.get_attribute_names(), vec!["id", "class"]);
    assert_eq!(div.get_attribute("ID").as_deref(), Some("foo"));

    div.set_attribute("Title", "t").unwrap();
    assert_eq!(div.get_attribute_names(), vec!["id", "class", "title"]);
    div.set_attribute("id", "baz").unwrap();
    assert_eq!(div.id(), "baz");
    div.remove_attribute("class");
    assert_eq!(div.outer_html(), r#"<div id="baz" title="t"></div>"#);
    assert!(!document.create_element("p").has_attributes());
}

#[test]
fn test_invalid_attribute_names_are_rejected() {
    let document = parse(r#"<div id="a"></div>"#);
    let div = select(&document, "div");

    for name in ["", "a b", "a=b", "a>", "a/b", "a\0", "\tx"] {
        assert!(
            matches!(div.set_attribute(name, "v"), Err(DomError::InvalidCharacter(_))),
            "{name:?}"
        );
        assert!(matches!(
            div.toggle_attribute(name, Some(true)),
            Err(DomError::InvalidCharacter(_))
        ));
    }
    assert!(matches!(
        div.dataset_set("a b", "v"),
        Err(DomError::InvalidCharacter(_))
    ));
    assert_eq!(div.outer_html(), r#"<div id="a"></div>"#);

    // Anything else is a name, even if unusual.
    div.set_attribute("x:y", "1").unwrap();
    div.set_attribute("@click", "2").unwrap();
    assert_eq!(div.get_attribute_names(), vec!["id", "x:y", "@click"]);
}

#[test]
fn test_toggle_attribute() {
    let document = parse("<div></div>");
    let div = select(&document, "div");

    assert!(div.toggle_attribute("hidden", None).unwrap());
    assert!(div.has_attribute("hidden"));
    assert!(!div.toggle_attribute("hidden", None).unwrap());
    assert!(!div.has_attribute("hidden"));

    assert!(div.toggle_attribute("readonly", Some(true)).unwrap());
    assert!(div.toggle_attribute("readonly", Some(true)).unwrap());
    assert_eq!(div.get_attribute_names(), vec!["readonly"]);
    assert!(!div.toggle_attribute("readonly", Some(false)).unwrap());
    assert!(!div.toggle_attribute("readonly", Some(false)).unwrap());
    assert!(!div.has_attributes());
}

#[test]
fn test_id_and_class_name_reflection() {
    let document = parse("<p></p>");
    let p = select(&document, "p");
    assert_eq!(p.id(), "");
    assert_eq!(p.class_name(), "");
    p.set_id("main");
    p.set_class_name("a b");
    assert_eq!(p.outer_html(), r#"<p id="main" class="a b"></p>"#);
}

#[test]
fn test_class_list() {
    let document = parse(r#"<p class="a b a"></p>"#);
    let p = select(&document, "p");
    let classes = p.class_list();

    assert_eq!(classes.items(), vec!["a", "b"]);
    assert_eq!(classes.len(), 2);
    assert!(classes.contains("b"));

    classes.add("c");
    assert_eq!(p.class_name(), "a b c");
    classes.remove("a");
    assert_eq!(p.class_name(), "b c");
    assert!(!classes.toggle("b", None));
    assert!(classes.toggle("d", Some(true)));
    assert!(classes.toggle("d", Some(true)));
    assert_eq!(p.class_name(), "c d");
    assert_eq!(classes.element(), &p);
}

#[test]
fn test_dataset() {
    let document = parse(r#"<div data-foo-bar="1"></div>"#);
    let div = select(&document, "div");

    assert_eq!(div.dataset_get("fooBar").as_deref(), Some("1"));
    div.dataset_set("helloWorld", "x").unwrap();
    assert_eq!(div.get_attribute("data-hello-world").as_deref(), Some("x"));
    div.dataset_remove("fooBar");
    assert!(!div.has_attribute("data-foo-bar"));
    assert!(matches!(
        div.dataset_set("a-b", "y"),
        Err(DomError::Syntax(_))
    ));
}

// ========== Content ==========

#[test]
fn test_text_content() {
    let document = parse("<div>a<b>b</b><!--c-->d</div>");
    let div = select(&document, "div");
    assert_eq!(div.text_content().as_deref(), Some("abd"));
    assert_eq!(document.text_content(), None);

    div.set_text_content("<new>");
    assert_eq!(div.inner_html(), "&lt;new&gt;");
    assert_eq!(div.child_nodes().len(), 1);

    div.set_text_content("");
    assert_eq!(div.child_nodes().len(), 1);
    assert_eq!(div.inner_html(), "");
}

#[test]
fn test_inner_html_setter() {
    let document = parse("<div></div>");
    let div = select(&document, "div");
    div.set_inner_html("<span>hello</span><!--x-->");
    assert_eq!(div.inner_html(), "<span>hello</span><!--x-->");
    assert_eq!(select(&document, "span").owner_document().unwrap(), document);
    assert!(select(&document, "span").is_connected());
}

#[test]
fn test_inner_html_setter_uses_element_context() {
    let document = parse("<ul></ul><textarea></textarea>");
    let ul = select(&document, "ul");
    ul.set_inner_html("<li>a<li>b");
    assert_eq!(ul.inner_html(), "<li>a</li><li>b</li>");

    let textarea = select(&document, "textarea");
    textarea.set_inner_html("<b>raw</b>");
    assert_eq!(textarea.child_element_count(), 0);
    assert_eq!(textarea.text_content().as_deref(), Some("<b>raw</b>"));
}

#[test]
fn test_outer_html_setter() {
    let document = parse("<div><p id=x>old</p></div>");
    let div = select(&document, "div");
    let p = select(&document, "#x");

    p.set_outer_html("<b>1</b><i>2</i>").unwrap();
    assert_eq!(div.inner_html(), "<b>1</b><i>2</i>");
    assert!(p.parent_node().is_none());

    let detached = document.create_element("p");
    detached.set_outer_html("<i>ignored</i>").unwrap();
    assert_eq!(detached.outer_html(), "<p></p>");

    let html = document.document_element().unwrap();
    assert!(matches!(
        html.set_outer_html("<p>"),
        Err(DomError::HierarchyRequest(_))
    ));
}

#[test]
fn test_insert_adjacent_html_positions() {
    let document = parse("<div><p id=t>mid</p></div>");
    let div = select(&document, "div");
    let p = select(&document, "#t");

    p.insert_adjacent_html("beforebegin", "<i>a</i>").unwrap();
    p.insert_adjacent_html("afterbegin", "<b>s</b>").unwrap();
    p.insert_adjacent_html("BeforeEnd", "<b>e</b>").unwrap();
    p.insert_adjacent_html("afterend", "<i>z</i>").unwrap();
    assert_eq!(
        div.inner_html(),
        r#"<i>a</i><p id="t"><b>s</b>mid<b>e</b></p><i>z</i>"#
    );

    assert!(matches!(
        p.insert_adjacent_html("middle", "<i></i>"),
        Err(DomError::Syntax(_))
    ));
}

#[test]
fn test_insert_adjacent_element_and_text() {
    let document = parse("<div><p>mid</p></div>");
    let div = select(&document, "div");
    let p = select(&document, "p");

    let hr = document.create_element("hr");
    assert_eq!(p.insert_adjacent_element("afterend", &hr).unwrap(), Some(hr));
    p.insert_adjacent_text("afterbegin", "<").unwrap();
    assert_eq!(div.inner_html(), "<p>&lt;mid</p><hr>");

    let detached = document.create_element("span");
    let br = document.create_element("br");
    assert_eq!(detached.insert_adjacent_element("beforebegin", &br).unwrap(), None);
    assert!(br.parent_node().is_none());
}

#[test]
fn test_normalize() {
    let document = parse("");
    let p = document.create_element("p");
    for data in ["a", "", "b"] {
        let _ = p.append_child(&document.create_text_node(data)).unwrap();
    }
    let _ = p.append_child(&document.create_element("br")).unwrap();
    let _ = p.append_child(&document.create_text_node("")).unwrap();

    p.normalize();
    assert_eq!(p.child_nodes().len(), 2);
    assert_eq!(p.first_child().unwrap().data(), "ab");
}

// ========== Character data ==========

#[test]
fn test_character_data_editing() {
    let document = parse("");
    let text = document.create_text_node("hello");

    assert_eq!(text.length(), 5);
    assert_eq!(text.substring_data(1, 3).unwrap(), "ell");
    assert_eq!(text.substring_data(3, 100).unwrap(), "lo");
    text.append_data(" world");
    text.insert_data(0, ">").unwrap();
    assert_eq!(text.data(), ">hello world");
    text.delete_data(0, 1).unwrap();
    text.replace_data(0, 5, "HELLO").unwrap();
    assert_eq!(text.data(), "HELLO world");

    assert_eq!(text.substring_data(12, 1), Err(DomError::IndexSize));
    assert_eq!(text.insert_data(99, "x"), Err(DomError::IndexSize));
}

#[test]
fn test_character_offsets_count_chars() {
    let document = parse("");
    let comment = document.create_comment("héllo");
    assert_eq!(comment.length(), 5);
    assert_eq!(comment.substring_data(1, 1).unwrap(), "é");
    comment.replace_data(1, 1, "e").unwrap();
    assert_eq!(comment.data(), "hello");
}

#[test]
fn test_split_text() {
    let document = parse("<p>hello</p>");
    let p = select(&document, "p");
    let text = p.first_child().unwrap();

    let tail = text.split_text(2).unwrap();
    assert_eq!(text.data(), "he");
    assert_eq!(tail.data(), "llo");
    assert_eq!(text.next_sibling().unwrap(), tail);
    assert_eq!(p.child_nodes().len(), 2);
    assert_eq!(p.inner_html(), "hello");

    assert_eq!(text.split_text(3).unwrap_err(), DomError::IndexSize);
    assert!(matches!(p.split_text(0), Err(DomError::HierarchyRequest(_))));
}
