//! [§ 13.3 Serializing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#serialising-html-fragments)
//!
//! Produces `innerHTML` and `outerHTML` strings from a [`DomTree`].
//!
//! - void elements get no end tag
//! - text inside raw text elements is written as-is
//! - attributes are always written as `name="value"`

use wombat_dom::{DomTree, Namespace, NodeId, NodeType};

/// "If current node is an area, base, basefont, bgsound, br, col, embed,
/// frame, hr, img, input, keygen, link, meta, param, source, track or wbr
/// element, then continue on to the next child node at this point."
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// "If the parent of current node is a style, script, xmp, iframe, noembed,
/// noframes, or plaintext element, or if the parent of current node is a
/// noscript element and scripting is enabled for the node, then append the
/// value of current node's data literally."
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Whether `tag_name` is a void HTML element, which never has an end tag.
#[must_use]
pub fn is_void_element(tag_name: &str) -> bool {
    VOID_ELEMENTS.contains(&tag_name)
}

/// HTML serializer.
///
/// `scripting` decides whether `noscript` content counts as raw text, the
/// same way the parser's scripting flag decides how it is tokenized.
#[derive(Debug, Clone, Copy)]
pub struct HtmlSerializer {
    /// Serialize `noscript` children literally.
    pub scripting: bool,
}

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlSerializer {
    /// A serializer with scripting enabled, matching the parser's default.
    #[must_use]
    pub const fn new() -> Self {
        Self { scripting: true }
    }

    /// `innerHTML`: the serialization of the node's children.
    #[must_use]
    pub fn serialize_inner(&self, tree: &DomTree, id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, id, &mut output);
        output
    }

    /// `outerHTML`: the node itself followed by its subtree. Documents and
    /// fragments have no markup of their own and serialize their children.
    #[must_use]
    pub fn serialize_outer(&self, tree: &DomTree, id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, id, &mut output);
        output
    }

    fn serialize_children(&self, tree: &DomTree, id: NodeId, output: &mut String) {
        let raw = tree.as_element(id).is_some_and(|element| {
            element.namespace == Namespace::Html
                && (RAW_TEXT_ELEMENTS.contains(&element.tag_name.as_str())
                    || (self.scripting && element.tag_name == "noscript"))
        });
        for &child in tree.children(id) {
            if raw && let Some(text) = tree.as_text(child) {
                output.push_str(text);
            } else {
                self.serialize_node(tree, child, output);
            }
        }
    }

    fn serialize_node(&self, tree: &DomTree, id: NodeId, output: &mut String) {
        let Some(node) = tree.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document | NodeType::DocumentFragment => {
                self.serialize_children(tree, id, output);
            }
            NodeType::Element(element) => {
                let tag = element.tag_name.as_str();
                output.push('<');
                output.push_str(tag);
                for (name, value) in element.attrs.iter() {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    escape_attribute(value, output);
                    output.push('"');
                }
                output.push('>');

                if element.namespace == Namespace::Html && is_void_element(tag) {
                    return;
                }

                // The parser drops one leading newline after these start tags,
                // so a leading newline in the content has to be doubled.
                if element.namespace == Namespace::Html
                    && matches!(tag, "pre" | "textarea" | "listing")
                    && tree
                        .first_child(id)
                        .and_then(|child| tree.as_text(child))
                        .is_some_and(|text| text.starts_with('\n'))
                {
                    output.push('\n');
                }

                self.serialize_children(tree, id, output);
                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeType::Text(text) => escape_text(text, output),
            NodeType::Comment(data) => {
                output.push_str("<!--");
                output.push_str(data);
                output.push_str("-->");
            }
            NodeType::Doctype(doctype) => {
                output.push_str("<!DOCTYPE ");
                output.push_str(&doctype.name);
                output.push('>');
            }
        }
    }
}

/// [§ 13.3 Escaping a string](https://html.spec.whatwg.org/multipage/parsing.html#escapingString)
///
/// Text mode: `&`, U+00A0, `<` and `>` are replaced.
pub fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{A0}' => output.push_str("&nbsp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Attribute mode: `&`, U+00A0 and `"` are replaced.
pub fn escape_attribute(value: &str, output: &mut String) {
    for c in value.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '\u{A0}' => output.push_str("&nbsp;"),
            '"' => output.push_str("&quot;"),
            _ => output.push(c),
        }
    }
}
