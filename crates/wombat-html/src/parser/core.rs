use strum_macros::Display;

use wombat_common::ParseOptions;
use wombat_common::warning::warn_once;
use wombat_dom::{AttributesMap, DoctypeData, DomTree, ElementData, Namespace, NodeId, NodeType};

use super::foreign_content::{
    adjust_for_namespace, breaks_out_of_foreign_content, is_html_integration_point,
    is_mathml_text_integration_point,
};
use crate::tokenizer::{Attribute, Token};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
///
/// Table, select, template and frameset modes are not modelled: those
/// elements are built with the "in body" rules like any other element. A
/// `template` switches to "in body" and its end tag restores the mode it
/// was opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
}

/// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
///
/// A recoverable tree construction error. Parsing never fails; these are
/// only collected for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What went wrong, e.g. `unexpected end tag </div>`.
    pub message: String,
    /// Index into the token stream of the offending token.
    pub token_index: usize,
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list contains elements in the formatting category, and markers."
#[derive(Debug, Clone)]
pub enum ActiveFormattingElement {
    /// A formatting element together with the name and attributes of the
    /// start tag that created it, so it can be recreated by reconstruction
    /// and the adoption agency algorithm.
    Element {
        /// The element in the tree.
        node_id: NodeId,
        /// The start tag's name.
        tag_name: String,
        /// The start tag's attributes.
        attributes: Vec<Attribute>,
    },
    /// "A marker is an entry in the list of active formatting elements that is
    /// distinct from any element." Pushed for `applet`, `marquee` and `object`.
    Marker,
}

impl ActiveFormattingElement {
    const fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Element { node_id, .. } => Some(*node_id),
            Self::Marker => None,
        }
    }
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Builds a [`DomTree`] from the token stream produced by
/// [`HTMLTokenizer`](crate::tokenizer::HTMLTokenizer). Every input yields a
/// tree; malformed markup is repaired and recorded as a [`ParseIssue`].
pub struct HTMLParser {
    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    ///
    /// The insertion mode to return to when each open `template` closes.
    template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    head_element_pointer: Option<NodeId>,

    /// "The form element pointer points to the last form element that was
    /// opened and whose end tag has not yet been seen."
    form_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    active_formatting_elements: Vec<ActiveFormattingElement>,

    /// `NodeId::ROOT` is the Document, or the fragment root when parsing a
    /// fragment.
    tree: DomTree,

    tokens: Vec<Token>,
    token_index: usize,
    stopped: bool,
    issues: Vec<ParseIssue>,
    report_parse_errors: bool,

    /// [§ 13.2.3](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    scripting: bool,

    /// Set after `pre`, `listing` and `textarea` start tags: "If the next
    /// token is a U+000A LINE FEED (LF) character token, then ignore that
    /// token and move on to the next one."
    ignore_next_line_feed: bool,

    /// The synthetic `html` element at the bottom of the stack while parsing
    /// a fragment. Its children become the fragment's children.
    fragment_root: Option<NodeId>,
}

impl HTMLParser {
    /// Create a parser for a full document with default options.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, &ParseOptions::default())
    }

    /// Create a parser for a full document.
    #[must_use]
    pub fn with_options(tokens: Vec<Token>, options: &ParseOptions) -> Self {
        Self {
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_modes: Vec::new(),
            stack_of_open_elements: Vec::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            active_formatting_elements: Vec::new(),
            tree: DomTree::new(),
            tokens,
            token_index: 0,
            stopped: false,
            issues: Vec::new(),
            report_parse_errors: options.report_parse_errors,
            scripting: options.scripting,
            ignore_next_line_feed: false,
            fragment_root: None,
        }
    }

    /// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    ///
    /// "Let root be a new html element with no attributes ... Set up the
    /// parser's stack of open elements so that it contains just the single
    /// element root." The resulting tree's root is a `DocumentFragment`
    /// holding the parsed nodes.
    #[must_use]
    pub fn for_fragment(tokens: Vec<Token>, options: &ParseOptions) -> Self {
        let mut parser = Self::with_options(tokens, options);
        parser.tree = DomTree::new_fragment();
        let root = parser.create_element("html", Namespace::Html, &[]);
        parser.stack_of_open_elements.push(root);
        parser.fragment_root = Some(root);
        parser.insertion_mode = InsertionMode::InBody;
        parser
    }

    /// The current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// Run the parser and return the tree.
    #[must_use]
    pub fn run(self) -> DomTree {
        self.run_with_issues().0
    }

    /// Run the parser and return the tree together with every parse issue.
    #[must_use]
    pub fn run_with_issues(mut self) -> (DomTree, Vec<ParseIssue>) {
        while !self.stopped && self.token_index < self.tokens.len() {
            let token = std::mem::replace(&mut self.tokens[self.token_index], Token::EndOfFile);
            if std::mem::take(&mut self.ignore_next_line_feed)
                && matches!(token, Token::Character { data: '\n' })
            {
                self.token_index += 1;
                continue;
            }
            self.process_token(&token);
            self.token_index += 1;
        }
        if let Some(root) = self.fragment_root {
            self.tree.move_children(root, NodeId::ROOT);
        }
        (self.tree, self.issues)
    }

    /// Record a parse error and report it on the warning channel when enabled.
    fn parse_error(&mut self, message: &str) {
        if self.report_parse_errors {
            let _ = warn_once("HTML Parser", message);
        }
        self.issues.push(ParseIssue {
            message: message.to_string(),
            token_index: self.token_index,
        });
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// Tokens go to the current insertion mode unless the current node is a
    /// foreign element that is not an integration point for the token.
    fn process_token(&mut self, token: &Token) {
        if self.use_foreign_content_rules(token) {
            self.handle_foreign_content(token);
        } else {
            self.process_using_insertion_mode(token);
        }
    }

    fn process_using_insertion_mode(&mut self, token: &Token) {
        match self.insertion_mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
        }
    }

    /// "Reprocess the token"
    fn reprocess_token(&mut self, token: &Token) {
        self.process_token(token);
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    const fn is_whitespace(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' ')
    }

    /// "The current node is the bottommost node in this stack of open elements."
    fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// Without foster parenting the appropriate place is always the end of
    /// the current node, or the fragment/document root when the stack is empty.
    fn insertion_parent(&self) -> NodeId {
        self.current_node().unwrap_or(NodeId::ROOT)
    }

    fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.tree.tag_name(id)
    }

    fn namespace(&self, id: NodeId) -> Namespace {
        self.tree
            .as_element(id)
            .map_or(Namespace::Html, |element| element.namespace)
    }

    /// Whether `id` is an HTML-namespace element named `tag_name`.
    fn is_html_element_named(&self, id: NodeId, tag_name: &str) -> bool {
        self.tree.as_element(id).is_some_and(|element| {
            element.namespace == Namespace::Html && element.tag_name == tag_name
        })
    }

    fn attributes_to_map(attributes: &[Attribute]) -> AttributesMap {
        attributes
            .iter()
            .map(|attr| (attr.name.clone(), attr.value.clone()))
            .collect()
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    /// "Create an element for a token". The element is detached.
    fn create_element(
        &mut self,
        tag_name: &str,
        namespace: Namespace,
        attributes: &[Attribute],
    ) -> NodeId {
        self.tree.alloc(NodeType::Element(ElementData {
            tag_name: tag_name.to_string(),
            namespace,
            attrs: Self::attributes_to_map(attributes),
        }))
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    fn insert_character(&mut self, c: char) {
        let parent = self.insertion_parent();
        if parent == NodeId::ROOT {
            return;
        }

        // "If there is a Text node immediately before the adjusted insertion
        // location, then append data to that Text node's data."
        if let Some(&last) = self.tree.children(parent).last()
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(text) = &mut node.node_type
        {
            text.push(c);
            return;
        }

        // "Otherwise, create a new Text node whose data is data ... and insert
        // the newly created node at the adjusted insertion location."
        let text = self.tree.alloc(NodeType::Text(String::from(c)));
        self.tree.append_child(parent, text);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    fn insert_comment(&mut self, data: &str) {
        let parent = self.insertion_parent();
        self.insert_comment_into(parent, data);
    }

    /// "Insert a comment as the last child of the Document object."
    fn insert_comment_to_document(&mut self, data: &str) {
        self.insert_comment_into(NodeId::ROOT, data);
    }

    fn insert_comment_into(&mut self, parent: NodeId, data: &str) {
        let comment = self.tree.alloc(NodeType::Comment(data.to_string()));
        self.tree.append_child(parent, comment);
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// Create the element, append it at the appropriate place and push it
    /// onto the stack of open elements.
    fn insert_html_element(&mut self, tag_name: &str, attributes: &[Attribute]) -> NodeId {
        let element = self.create_element(tag_name, Namespace::Html, attributes);
        let parent = self.insertion_parent();
        self.tree.append_child(parent, element);
        self.stack_of_open_elements.push(element);
        element
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// Names are re-cased for the namespace first. A self-closing foreign
    /// element is popped straight away: "acknowledge the token's self-closing
    /// flag, and then act as described in the next entry".
    fn insert_foreign_element(
        &mut self,
        tag_name: &str,
        attributes: &[Attribute],
        namespace: Namespace,
        self_closing: bool,
    ) {
        let mut attributes = attributes.to_vec();
        let tag_name = adjust_for_namespace(namespace, tag_name, &mut attributes);
        let element = self.create_element(&tag_name, namespace, &attributes);
        let parent = self.insertion_parent();
        self.tree.append_child(parent, element);
        if !self_closing {
            self.stack_of_open_elements.push(element);
        }
    }

    /// Insert a void element: it is created and popped in one step.
    fn insert_void_element(&mut self, tag_name: &str, attributes: &[Attribute]) {
        let _ = self.insert_html_element(tag_name, attributes);
        let _ = self.stack_of_open_elements.pop();
    }

    /// [§ 13.2.6.2](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    ///
    /// Shared tail of the generic raw text and RCDATA element parsing
    /// algorithms. The tokenizer has already switched its own state.
    fn insert_text_element(&mut self, tag_name: &str, attributes: &[Attribute]) {
        let _ = self.insert_html_element(tag_name, attributes);
        self.original_insertion_mode = Some(self.insertion_mode);
        self.insertion_mode = InsertionMode::Text;
    }

    /// Pop elements until an HTML element named `tag_name` has been popped.
    fn pop_until_tag(&mut self, tag_name: &str) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.is_html_element_named(id, tag_name) {
                break;
            }
        }
    }

    /// Pop elements until one of `tag_names` has been popped.
    fn pop_until_one_of(&mut self, tag_names: &[&str]) {
        while let Some(id) = self.stack_of_open_elements.pop() {
            if self.namespace(id) == Namespace::Html
                && self.tag_name(id).is_some_and(|name| tag_names.contains(&name))
            {
                break;
            }
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// Walk down from the current node: a match wins, a scope boundary loses.
    /// The SVG and MathML integration points are boundaries in every scope.
    fn has_element_in_specific_scope(&self, tag_names: &[&str], scope_markers: &[&str]) -> bool {
        for &node in self.stack_of_open_elements.iter().rev() {
            let Some(element) = self.tree.as_element(node) else {
                continue;
            };
            let name = element.tag_name.as_str();
            match element.namespace {
                Namespace::Html => {
                    if tag_names.contains(&name) {
                        return true;
                    }
                    if scope_markers.contains(&name) {
                        return false;
                    }
                }
                Namespace::MathMl => {
                    if matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml") {
                        return false;
                    }
                }
                Namespace::Svg => {
                    if matches!(name, "foreignObject" | "desc" | "title") {
                        return false;
                    }
                }
            }
        }
        false
    }

    /// "has an element in scope"
    fn has_element_in_scope(&self, tag_name: &str) -> bool {
        self.has_one_of_in_scope(&[tag_name])
    }

    fn has_one_of_in_scope(&self, tag_names: &[&str]) -> bool {
        const DEFAULT_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
        ];
        self.has_element_in_specific_scope(tag_names, DEFAULT_SCOPE)
    }

    /// "has an element in button scope": the default scope plus `button`.
    fn has_element_in_button_scope(&self, tag_name: &str) -> bool {
        const BUTTON_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
            "button",
        ];
        self.has_element_in_specific_scope(&[tag_name], BUTTON_SCOPE)
    }

    /// "has an element in list item scope": the default scope plus `ol`, `ul`.
    fn has_element_in_list_item_scope(&self, tag_name: &str) -> bool {
        const LIST_ITEM_SCOPE: &[&str] = &[
            "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
            "ol", "ul",
        ];
        self.has_element_in_specific_scope(&[tag_name], LIST_ITEM_SCOPE)
    }

    /// "has an element in table scope"
    fn has_one_of_in_table_scope(&self, tag_names: &[&str]) -> bool {
        const TABLE_SCOPE: &[&str] = &["html", "table", "template"];
        self.has_element_in_specific_scope(tag_names, TABLE_SCOPE)
    }

    /// [§ 13.2.6.3 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    fn generate_implied_end_tags(&mut self) {
        self.generate_implied_end_tags_excluding(None);
    }

    /// "If a step requires the UA to generate implied end tags but lists an
    /// element to exclude from the process, then the UA must perform the above
    /// steps as if that element was not in the above list."
    fn generate_implied_end_tags_excluding(&mut self, exclude: Option<&str>) {
        const IMPLIED_END_TAG_ELEMENTS: &[&str] = &[
            "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
        ];
        while let Some(current) = self.current_node() {
            let Some(element) = self.tree.as_element(current) else {
                break;
            };
            let name = element.tag_name.as_str();
            if element.namespace != Namespace::Html
                || !IMPLIED_END_TAG_ELEMENTS.contains(&name)
                || exclude == Some(name)
            {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// Generate implied end tags except for `tag_name`, then pop through the
    /// `tag_name` element, if one is in scope. `p` uses button scope.
    fn close_element_if_in_scope(&mut self, tag_name: &str) {
        let in_scope = if tag_name == "p" {
            self.has_element_in_button_scope(tag_name)
        } else {
            self.has_element_in_scope(tag_name)
        };
        if in_scope {
            self.generate_implied_end_tags_excluding(Some(tag_name));
            self.pop_until_tag(tag_name);
        }
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    fn close_p_element(&mut self) {
        self.close_element_if_in_scope("p");
    }

    /// [§ 13.2.4.3 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    fn reconstruct_active_formatting_elements(&mut self) {
        // STEP 1-2: nothing to do when the list is empty, or its last entry is
        // a marker or an element that is still open.
        let Some(last) = self.active_formatting_elements.last() else {
            return;
        };
        match last.node_id() {
            None => return,
            Some(id) if self.stack_of_open_elements.contains(&id) => return,
            Some(_) => {}
        }

        // STEP 3-6 "Rewind": walk back to just after the last entry that is a
        // marker or an open element.
        let mut entry_index = self.active_formatting_elements.len() - 1;
        while entry_index > 0 {
            let open_or_marker = match self.active_formatting_elements[entry_index - 1].node_id() {
                None => true,
                Some(id) => self.stack_of_open_elements.contains(&id),
            };
            if open_or_marker {
                break;
            }
            entry_index -= 1;
        }

        // STEP 7-10 "Advance" and "Create": reopen every entry from there on.
        for index in entry_index..self.active_formatting_elements.len() {
            let ActiveFormattingElement::Element {
                tag_name,
                attributes,
                ..
            } = self.active_formatting_elements[index].clone()
            else {
                continue;
            };
            let node_id = self.insert_html_element(&tag_name, &attributes);
            self.active_formatting_elements[index] = ActiveFormattingElement::Element {
                node_id,
                tag_name,
                attributes,
            };
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// Includes the Noah's Ark clause: "If there are already three elements in
    /// the list of active formatting elements after the last marker, if any,
    /// or anywhere in the list if there are no markers, that have the same tag
    /// name, namespace, and attributes as element, then remove the earliest
    /// such element from the list."
    fn push_active_formatting_element(
        &mut self,
        node_id: NodeId,
        tag_name: &str,
        attributes: &[Attribute],
    ) {
        let mut count = 0;
        let mut earliest = None;
        for (index, entry) in self.active_formatting_elements.iter().enumerate().rev() {
            match entry {
                ActiveFormattingElement::Marker => break,
                ActiveFormattingElement::Element {
                    tag_name: entry_name,
                    attributes: entry_attributes,
                    ..
                } => {
                    if entry_name == tag_name && same_attributes(entry_attributes, attributes) {
                        count += 1;
                        earliest = Some(index);
                    }
                }
            }
        }
        if count >= 3
            && let Some(index) = earliest
        {
            let _ = self.active_formatting_elements.remove(index);
        }

        self.active_formatting_elements
            .push(ActiveFormattingElement::Element {
                node_id,
                tag_name: tag_name.to_string(),
                attributes: attributes.to_vec(),
            });
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    fn clear_active_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if matches!(entry, ActiveFormattingElement::Marker) {
                break;
            }
        }
    }

    fn active_formatting_index_of(&self, node: NodeId) -> Option<usize> {
        self.active_formatting_elements
            .iter()
            .position(|entry| entry.node_id() == Some(node))
    }

    /// [§ 13.2.4.2 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
    fn is_special_element(&self, id: NodeId) -> bool {
        let Some(element) = self.tree.as_element(id) else {
            return false;
        };
        let name = element.tag_name.as_str();
        match element.namespace {
            Namespace::Html => matches!(
                name,
                "address" | "applet" | "area" | "article" | "aside" | "base" | "basefont"
                    | "bgsound" | "blockquote" | "body" | "br" | "button" | "caption"
                    | "center" | "col" | "colgroup" | "dd" | "details" | "dialog" | "dir"
                    | "div" | "dl" | "dt" | "embed" | "fieldset" | "figcaption" | "figure"
                    | "footer" | "form" | "frame" | "frameset" | "h1" | "h2" | "h3" | "h4"
                    | "h5" | "h6" | "head" | "header" | "hgroup" | "hr" | "html" | "iframe"
                    | "img" | "input" | "keygen" | "li" | "link" | "listing" | "main"
                    | "marquee" | "menu" | "meta" | "nav" | "noembed" | "noframes"
                    | "noscript" | "object" | "ol" | "p" | "param" | "plaintext" | "pre"
                    | "script" | "search" | "section" | "select" | "source" | "style"
                    | "summary" | "table" | "tbody" | "td" | "template" | "textarea"
                    | "tfoot" | "th" | "thead" | "title" | "tr" | "track" | "ul" | "wbr"
                    | "xmp"
            ),
            Namespace::MathMl => {
                matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
            }
            Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
        }
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    /// "Any other end tag"
    fn any_other_end_tag(&mut self, tag_name: &str) {
        let mut index = self.stack_of_open_elements.len();
        while index > 0 {
            index -= 1;
            let node = self.stack_of_open_elements[index];
            // "If node is an HTML element with the same tag name as the token"
            if self.is_html_element_named(node, tag_name) {
                self.generate_implied_end_tags_excluding(Some(tag_name));
                if self.current_node() != Some(node) {
                    self.parse_error(&format!("unclosed elements before </{tag_name}>"));
                }
                self.stack_of_open_elements.truncate(index);
                return;
            }
            // "Otherwise, if node is in the special category, then this is a
            // parse error; ignore the token, and return."
            if self.is_special_element(node) {
                self.parse_error(&format!("unexpected end tag </{tag_name}>"));
                return;
            }
        }
    }

    /// [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Repairs misnested formatting elements such as `<b><p>x</b>y`.
    fn run_adoption_agency(&mut self, subject: &str) {
        // STEP 2: "If the current node is an HTML element whose tag name is
        // subject, and the current node is not in the list of active formatting
        // elements, then pop the current node off the stack of open elements
        // and return."
        if let Some(current) = self.current_node()
            && self.is_html_element_named(current, subject)
            && self.active_formatting_index_of(current).is_none()
        {
            let _ = self.stack_of_open_elements.pop();
            return;
        }

        // STEP 3-6: the outer loop runs at most eight times.
        for _ in 0..8 {
            // STEP 7: "Let formatting element be the last element in the list
            // of active formatting elements that is between the end of the list
            // and the last marker in the list, if any, or the start of the list
            // otherwise, and has the tag name subject."
            let mut found = None;
            for (index, entry) in self.active_formatting_elements.iter().enumerate().rev() {
                match entry {
                    ActiveFormattingElement::Marker => break,
                    ActiveFormattingElement::Element {
                        node_id, tag_name, ..
                    } if tag_name == subject => {
                        found = Some((index, *node_id));
                        break;
                    }
                    ActiveFormattingElement::Element { .. } => {}
                }
            }

            // STEP 8: "If there is no such element, then return and instead act
            // as described in the 'any other end tag' entry above."
            let Some((formatting_index, formatting_element)) = found else {
                self.any_other_end_tag(subject);
                return;
            };

            // STEP 9: "If formatting element is not in the stack of open
            // elements, then this is a parse error; remove the element from the
            // list, and return."
            let Some(formatting_stack_index) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == formatting_element)
            else {
                self.parse_error(&format!("</{subject}> closes an element that is not open"));
                let _ = self.active_formatting_elements.remove(formatting_index);
                return;
            };

            // STEP 10: "If formatting element is in the stack of open elements,
            // but the element is not in scope, then this is a parse error; return."
            if !self.has_element_in_scope(subject) {
                self.parse_error(&format!("</{subject}> is out of scope"));
                return;
            }

            // STEP 12: "Let furthest block be the topmost node in the stack of
            // open elements that is lower in the stack than formatting element,
            // and is an element in the special category."
            let furthest_block_index = (formatting_stack_index + 1
                ..self.stack_of_open_elements.len())
                .find(|&index| self.is_special_element(self.stack_of_open_elements[index]));

            // STEP 13: "If there is no furthest block, then the UA must first
            // pop all the nodes from the bottom of the stack of open elements,
            // from the current node up to and including formatting element, then
            // remove formatting element from the list of active formatting
            // elements, and finally return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.stack_of_open_elements.truncate(formatting_stack_index);
                let _ = self.active_formatting_elements.remove(formatting_index);
                return;
            };
            let furthest_block = self.stack_of_open_elements[furthest_block_index];

            // STEP 14: "Let common ancestor be the element immediately above
            // formatting element in the stack of open elements."
            let Some(&common_ancestor) = formatting_stack_index
                .checked_sub(1)
                .and_then(|index| self.stack_of_open_elements.get(index))
            else {
                return;
            };

            // STEP 15: "Let a bookmark note the position of formatting element
            // in the list of active formatting elements."
            let mut bookmark = formatting_index;

            // STEP 16: "Let node and last node be furthest block."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block;

            // STEP 17-18: inner loop.
            let mut inner_loop_counter = 0;
            loop {
                inner_loop_counter += 1;

                // STEP 18.2: "Let node be the element immediately above node in
                // the stack of open elements." Removals below keep the element
                // above at `node_index - 1`.
                node_index -= 1;
                let node = self.stack_of_open_elements[node_index];

                // STEP 18.3: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 18.4: "If inner loop counter is greater than 3 and node
                // is in the list of active formatting elements, then remove node
                // from the list of active formatting elements."
                let mut node_entry = self.active_formatting_index_of(node);
                if inner_loop_counter > 3
                    && let Some(entry) = node_entry
                {
                    let _ = self.active_formatting_elements.remove(entry);
                    if bookmark > entry {
                        bookmark -= 1;
                    }
                    node_entry = None;
                }

                // STEP 18.5: "If node is not in the list of active formatting
                // elements, then remove node from the stack of open elements and
                // continue."
                let Some(node_entry) = node_entry else {
                    let _ = self.stack_of_open_elements.remove(node_index);
                    continue;
                };

                // STEP 18.6: "Create an element for the token for which the
                // element node was created ... replace the entry for node in the
                // list of active formatting elements with an entry for the new
                // element, replace the entry for node in the stack of open
                // elements with an entry for the new element, and let node be
                // the new element."
                let ActiveFormattingElement::Element {
                    tag_name,
                    attributes,
                    ..
                } = self.active_formatting_elements[node_entry].clone()
                else {
                    break;
                };
                let replacement = self.create_element(&tag_name, Namespace::Html, &attributes);
                self.active_formatting_elements[node_entry] = ActiveFormattingElement::Element {
                    node_id: replacement,
                    tag_name,
                    attributes,
                };
                self.stack_of_open_elements[node_index] = replacement;

                // STEP 18.7: "If last node is furthest block, then move the
                // aforementioned bookmark to be immediately after the new node
                // in the list of active formatting elements."
                if last_node == furthest_block {
                    bookmark = node_entry + 1;
                }

                // STEP 18.8-9: "Append last node to node. Set last node to node."
                self.tree.append_child(replacement, last_node);
                last_node = replacement;
            }

            // STEP 19: "Insert whatever last node ended up being in the previous
            // step at the appropriate place for inserting a node, but using
            // common ancestor as the override target."
            self.tree.append_child(common_ancestor, last_node);

            // STEP 20: "Create an element for the token for which formatting
            // element was created, with furthest block as the intended parent."
            let Some(ActiveFormattingElement::Element {
                tag_name,
                attributes,
                ..
            }) = self
                .active_formatting_elements
                .get(formatting_index)
                .cloned()
            else {
                return;
            };
            let new_element = self.create_element(&tag_name, Namespace::Html, &attributes);

            // STEP 21-22: "Take all of the child nodes of furthest block and
            // append them to the element created in the last step. Append that
            // new element to furthest block."
            self.tree.move_children(furthest_block, new_element);
            self.tree.append_child(furthest_block, new_element);

            // STEP 23: "Remove formatting element from the list of active
            // formatting elements, and insert the new element into the list of
            // active formatting elements at the position of the aforementioned
            // bookmark."
            let _ = self.active_formatting_elements.remove(formatting_index);
            if bookmark > formatting_index {
                bookmark -= 1;
            }
            let bookmark = bookmark.min(self.active_formatting_elements.len());
            self.active_formatting_elements.insert(
                bookmark,
                ActiveFormattingElement::Element {
                    node_id: new_element,
                    tag_name,
                    attributes,
                },
            );

            // STEP 24: "Remove formatting element from the stack of open
            // elements, and insert the new element into the stack of open
            // elements immediately below the position of furthest block in that
            // stack."
            self.stack_of_open_elements
                .retain(|&id| id != formatting_element);
            if let Some(position) = self
                .stack_of_open_elements
                .iter()
                .position(|&id| id == furthest_block)
            {
                self.stack_of_open_elements
                    .insert(position + 1, new_element);
            }
        }
    }

    // =========================================================================
    // Insertion modes
    // =========================================================================

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    fn handle_initial_mode(&mut self, token: &Token) {
        match token {
            // "Ignore the token."
            Token::Character { data } if Self::is_whitespace(*data) => {}

            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => self.insert_comment_to_document(data),

            // "Append a DocumentType node to the Document node, with its name
            // set to the name given in the DOCTYPE token, or the empty string if
            // the name was missing; its public ID set to the public identifier
            // given in the DOCTYPE token, or the empty string if the public
            // identifier was missing; and its system ID set to the system
            // identifier given in the DOCTYPE token, or the empty string if the
            // system identifier was missing."
            Token::Doctype {
                name,
                public_identifier,
                system_identifier,
                ..
            } => {
                if name.as_deref() != Some("html") {
                    self.parse_error("non-html doctype");
                }
                let doctype = self.tree.alloc(NodeType::Doctype(DoctypeData {
                    name: name.clone().unwrap_or_default(),
                    public_id: public_identifier.clone().unwrap_or_default(),
                    system_id: system_identifier.clone().unwrap_or_default(),
                }));
                self.tree.append_child(NodeId::ROOT, doctype);
                self.insertion_mode = InsertionMode::BeforeHtml;
            }

            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                self.insertion_mode = InsertionMode::BeforeHtml;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    fn handle_before_html_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::Comment { data } => self.insert_comment_to_document(data),
            Token::Character { data } if Self::is_whitespace(*data) => {}

            // "Create an element for the token in the HTML namespace, with the
            // Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                let html = self.create_element(name, Namespace::Html, attributes);
                self.tree.append_child(NodeId::ROOT, html);
                self.stack_of_open_elements.push(html);
                self.insertion_mode = InsertionMode::BeforeHead;
            }

            Token::EndTag { name, .. }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.parse_error(&format!("unexpected end tag </{name}> before <html>"));
            }

            // "Create an html element whose node document is the Document
            // object. Append it to the Document object. Put this element in the
            // stack of open elements. Switch the insertion mode to "before
            // head", then reprocess the token."
            _ => {
                let html = self.create_element("html", Namespace::Html, &[]);
                self.tree.append_child(NodeId::ROOT, html);
                self.stack_of_open_elements.push(html);
                self.insertion_mode = InsertionMode::BeforeHead;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    fn handle_before_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {}
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "Insert an HTML element for the token. Set the head element
            // pointer to the newly created head element."
            Token::StartTag {
                name, attributes, ..
            } if name == "head" => {
                let head = self.insert_html_element(name, attributes);
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
            }

            Token::EndTag { name, .. }
                if !matches!(name.as_str(), "head" | "body" | "html" | "br") =>
            {
                self.parse_error(&format!("unexpected end tag </{name}> before <head>"));
            }

            // "Insert an HTML element for a "head" start tag token with no
            // attributes. Set the head element pointer to the newly created head
            // element. Switch the insertion mode to "in head". Reprocess the
            // current token."
            _ => {
                let head = self.insert_html_element("head", &[]);
                self.head_element_pointer = Some(head);
                self.insertion_mode = InsertionMode::InHead;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    fn handle_in_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "base" | "basefont" | "bgsound" | "link" | "meta"
            ) =>
            {
                self.insert_void_element(name, attributes);
            }

            // "Follow the generic RCDATA element parsing algorithm."
            // "Follow the generic raw text element parsing algorithm."
            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "title" | "noframes" | "style" | "script")
                || (name == "noscript" && self.scripting) =>
            {
                self.insert_text_element(name, attributes);
            }

            // "A start tag whose tag name is "noscript", if the scripting flag
            // is disabled: Insert an HTML element for the token. Switch the
            // insertion mode to "in head noscript"."
            Token::StartTag {
                name, attributes, ..
            } if name == "noscript" => {
                let _ = self.insert_html_element(name, attributes);
                self.insertion_mode = InsertionMode::InHeadNoscript;
            }

            // Templates are ordinary containers built with the "in body"
            // rules; the marker keeps formatting elements from leaking in or
            // out.
            Token::StartTag {
                name, attributes, ..
            } if name == "template" => {
                let _ = self.insert_html_element(name, attributes);
                self.active_formatting_elements
                    .push(ActiveFormattingElement::Marker);
                self.template_insertion_modes.push(self.insertion_mode);
                self.insertion_mode = InsertionMode::InBody;
            }

            Token::EndTag { name, .. } if name == "template" => {
                if !self
                    .stack_of_open_elements
                    .iter()
                    .any(|&id| self.is_html_element_named(id, "template"))
                {
                    self.parse_error("unexpected end tag </template>");
                    return;
                }
                self.generate_implied_end_tags();
                self.pop_until_tag("template");
                self.clear_active_formatting_elements_to_last_marker();
                if let Some(mode) = self.template_insertion_modes.pop() {
                    self.insertion_mode = mode;
                }
            }

            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected <head>");
            }

            // "Pop the current node (which will be the head element) off the
            // stack of open elements. Switch the insertion mode to "after head"."
            Token::EndTag { name, .. } if name == "head" => {
                self.pop_until_tag("head");
                self.insertion_mode = InsertionMode::AfterHead;
            }

            Token::EndTag { name, .. } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> in head"));
            }

            // "Pop the current node (which will be the head element) off the
            // stack of open elements. Switch the insertion mode to "after head".
            // Reprocess the token."
            _ => {
                self.pop_until_tag("head");
                self.insertion_mode = InsertionMode::AfterHead;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    fn handle_in_head_noscript_mode(&mut self, token: &Token) {
        match token {
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "Pop the current node (which will be a noscript element) from the
            // stack of open elements; the new current node will be a head
            // element. Switch the insertion mode to "in head"."
            Token::EndTag { name, .. } if name == "noscript" => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = InsertionMode::InHead;
            }

            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_head_mode(token);
            }
            Token::Comment { .. } => self.handle_in_head_mode(token),
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                self.handle_in_head_mode(token);
            }

            Token::StartTag { name, .. } if matches!(name.as_str(), "head" | "noscript") => {
                self.parse_error(&format!("unexpected <{name}> in noscript"));
            }
            Token::EndTag { name, .. } if name != "br" => {
                self.parse_error(&format!("unexpected end tag </{name}> in noscript"));
            }

            // "Parse error. Pop the current node (which will be a noscript
            // element) from the stack of open elements; the new current node
            // will be a head element. Switch the insertion mode to "in head".
            // Reprocess the token."
            _ => {
                self.parse_error("unexpected content in head noscript");
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = InsertionMode::InHead;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    fn handle_after_head_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.insert_character(*data);
            }
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "Insert an HTML element for the token. Switch the insertion mode
            // to "in body"."
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                let _ = self.insert_html_element(name, attributes);
                self.insertion_mode = InsertionMode::InBody;
            }

            Token::StartTag { name, .. } if name == "frameset" => {
                self.parse_error("framesets are not supported");
            }

            // "Parse error. Push the node pointed to by the head element pointer
            // onto the stack of open elements. Process the token using the rules
            // for the "in head" insertion mode. Remove the node pointed to by
            // the head element pointer from the stack of open elements."
            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                self.parse_error(&format!("<{name}> after </head>"));
                let Some(head) = self.head_element_pointer else {
                    return;
                };
                self.stack_of_open_elements.push(head);
                self.handle_in_head_mode(token);
                if let Some(position) = self
                    .stack_of_open_elements
                    .iter()
                    .position(|&id| id == head)
                {
                    let _ = self.stack_of_open_elements.remove(position);
                }
            }

            Token::EndTag { name, .. } if name == "template" => self.handle_in_head_mode(token),

            Token::StartTag { name, .. } if name == "head" => {
                self.parse_error("unexpected <head>");
            }
            Token::EndTag { name, .. } if !matches!(name.as_str(), "body" | "html" | "br") => {
                self.parse_error(&format!("unexpected end tag </{name}> after head"));
            }

            // "Insert an HTML element for a "body" start tag token with no
            // attributes. Switch the insertion mode to "in body". Reprocess the
            // current token."
            _ => {
                let _ = self.insert_html_element("body", &[]);
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    fn handle_text_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } => self.insert_character(*data),

            // "Parse error. Pop the current node off the stack of open
            // elements. Switch the insertion mode to the original insertion mode
            // and reprocess the token."
            Token::EndOfFile => {
                self.parse_error("end of file in raw text element");
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
                self.reprocess_token(token);
            }

            // "Pop the current node off the stack of open elements. Switch the
            // insertion mode to the original insertion mode."
            Token::EndTag { .. } => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
            }

            // The tokenizer only produces characters and the closing tag in a
            // text state; anything else closes the element and is reprocessed.
            _ => {
                let _ = self.stack_of_open_elements.pop();
                self.insertion_mode = self
                    .original_insertion_mode
                    .take()
                    .unwrap_or(InsertionMode::InBody);
                self.reprocess_token(token);
            }
        }
    }

    /// Copy attributes onto `target` where it does not have them yet: "for
    /// each attribute on the token, check to see if the attribute is already
    /// present on the top element of the stack of open elements. If it is not,
    /// add the attribute and its corresponding value to that element."
    fn merge_attributes(&mut self, target: NodeId, attributes: &[Attribute]) {
        if let Some(element) = self.tree.as_element_mut(target) {
            for attr in attributes {
                let _ = element.attrs.insert_if_absent(&attr.name, &attr.value);
            }
        }
    }

    fn has_open_template(&self) -> bool {
        self.stack_of_open_elements
            .iter()
            .any(|&id| self.is_html_element_named(id, "template"))
    }

    /// Table sections are ordinary elements here, so a new cell, row or
    /// section closes the open one of the same level instead of nesting in
    /// it. Nothing below the innermost open `table` is touched.
    fn close_implied_table_parts(&mut self, tag_name: &str) {
        let implied: &[&str] = match tag_name {
            "td" | "th" => &["td", "th"],
            "tr" => &["td", "th", "tr"],
            _ => &[
                "td", "th", "tr", "tbody", "thead", "tfoot", "caption", "colgroup",
            ],
        };
        if !self.has_one_of_in_table_scope(implied) {
            return;
        }
        let floor = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.is_html_element_named(id, "table"))
            .map_or(0, |index| index + 1);
        if let Some(index) = (floor..self.stack_of_open_elements.len()).find(|&index| {
            let node = self.stack_of_open_elements[index];
            self.namespace(node) == Namespace::Html
                && self.tag_name(node).is_some_and(|name| implied.contains(&name))
        }) {
            self.stack_of_open_elements.truncate(index);
        }
    }

    /// "A start tag whose tag name is "li"" and "... one of: "dd", "dt"".
    ///
    /// Walk down the stack closing an open list item of the same kind; stop
    /// at any special element other than `address`, `div` and `p`.
    fn close_open_list_item(&mut self, closes: &[&str]) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let node = self.stack_of_open_elements[index];
            if let Some(name) = self.tag_name(node)
                && self.namespace(node) == Namespace::Html
                && closes.contains(&name)
            {
                let name = name.to_string();
                self.generate_implied_end_tags_excluding(Some(&name));
                if self.current_node() != Some(node) {
                    self.parse_error(&format!("unclosed elements inside <{name}>"));
                }
                self.pop_until_tag(&name);
                return;
            }
            if self.is_special_element(node)
                && !["address", "div", "p"]
                    .iter()
                    .any(|tag| self.is_html_element_named(node, tag))
            {
                return;
            }
        }
    }

    /// The end tag half of "address", "article", ... and the other block
    /// containers: close through the element if it is in scope.
    fn close_block(&mut self, tag_name: &str) {
        if !self.has_element_in_scope(tag_name) {
            self.parse_error(&format!("unexpected end tag </{tag_name}>"));
            return;
        }
        self.generate_implied_end_tags();
        if !self
            .current_node()
            .is_some_and(|node| self.is_html_element_named(node, tag_name))
        {
            self.parse_error(&format!("unclosed elements before </{tag_name}>"));
        }
        self.pop_until_tag(tag_name);
    }

    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    fn handle_in_body_mode(&mut self, token: &Token) {
        const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

        match token {
            // "A character token that is U+0000 NULL: Parse error. Ignore the token."
            Token::Character { data: '\0' } => self.parse_error("unexpected null character"),

            // "Reconstruct the active formatting elements, if any. Insert the
            // token's character."
            Token::Character { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_character(*data);
            }

            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),

            // "A start tag whose tag name is "html": Parse error. If there is a
            // template element on the stack of open elements, then ignore the
            // token. Otherwise, for each attribute on the token, check to see if
            // the attribute is already present on the top element of the stack
            // of open elements. If it is not, add the attribute."
            Token::StartTag {
                name, attributes, ..
            } if name == "html" => {
                self.parse_error("unexpected <html>");
                if self.has_open_template() {
                    return;
                }
                if let Some(&html) = self.stack_of_open_elements.first() {
                    self.merge_attributes(html, attributes);
                }
            }

            Token::StartTag { name, .. }
                if matches!(
                    name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                self.handle_in_head_mode(token);
            }
            Token::EndTag { name, .. } if name == "template" => self.handle_in_head_mode(token),

            // "A start tag whose tag name is "body": Parse error. If the second
            // element on the stack of open elements is not a body element, if
            // the stack of open elements has only one node on it, or if there is
            // a template element on the stack of open elements, then ignore the
            // token. Otherwise ... for each attribute on the token, check to see
            // if the attribute is already present on the body element. If it is
            // not, add the attribute and its corresponding value to that element."
            //
            // The tag is dropped; whatever follows it lands in the real body.
            Token::StartTag {
                name, attributes, ..
            } if name == "body" => {
                self.parse_error("unexpected <body>");
                let Some(&body) = self.stack_of_open_elements.get(1) else {
                    return;
                };
                if !self.is_html_element_named(body, "body") || self.has_open_template() {
                    return;
                }
                self.merge_attributes(body, attributes);
            }

            Token::StartTag { name, .. } if matches!(name.as_str(), "frameset" | "frame" | "head") => {
                self.parse_error(&format!("unexpected <{name}>"));
            }

            // "An end-of-file token: ... Stop parsing."
            Token::EndOfFile => self.stopped = true,

            // "An end tag whose tag name is "body": If the stack of open
            // elements does not have a body element in scope, this is a parse
            // error; ignore the token. ... Switch the insertion mode to "after
            // body"."
            Token::EndTag { name, .. } if name == "body" => {
                if !self.has_element_in_scope("body") {
                    self.parse_error("unexpected end tag </body>");
                    return;
                }
                self.insertion_mode = InsertionMode::AfterBody;
            }

            // "An end tag whose tag name is "html": ... Switch the insertion
            // mode to "after body". Reprocess the token."
            Token::EndTag { name, .. } if name == "html" => {
                if !self.has_element_in_scope("body") {
                    self.parse_error("unexpected end tag </html>");
                    return;
                }
                self.insertion_mode = InsertionMode::AfterBody;
                self.reprocess_token(token);
            }

            // "If the stack of open elements has a p element in button scope,
            // then close a p element. Insert an HTML element for the token."
            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "address"
                    | "article"
                    | "aside"
                    | "blockquote"
                    | "center"
                    | "details"
                    | "dialog"
                    | "dir"
                    | "div"
                    | "dl"
                    | "fieldset"
                    | "figcaption"
                    | "figure"
                    | "footer"
                    | "header"
                    | "hgroup"
                    | "main"
                    | "menu"
                    | "nav"
                    | "ol"
                    | "p"
                    | "search"
                    | "section"
                    | "summary"
                    | "ul"
            ) =>
            {
                self.close_p_element();
                let _ = self.insert_html_element(name, attributes);
            }

            // "If the current node is an HTML element whose tag name is one of
            // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse error;
            // pop the current node off the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if HEADINGS.contains(&name.as_str()) => {
                self.close_p_element();
                if let Some(current) = self.current_node()
                    && HEADINGS
                        .iter()
                        .any(|heading| self.is_html_element_named(current, heading))
                {
                    self.parse_error(&format!("<{name}> inside another heading"));
                    let _ = self.stack_of_open_elements.pop();
                }
                let _ = self.insert_html_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "pre" | "listing") => {
                self.close_p_element();
                let _ = self.insert_html_element(name, attributes);
                self.ignore_next_line_feed = true;
            }

            // "If the form element pointer is not null, and there is no template
            // element on the stack of open elements, then this is a parse error;
            // ignore the token."
            Token::StartTag {
                name, attributes, ..
            } if name == "form" => {
                let has_template = self.has_open_template();
                if self.form_element_pointer.is_some() && !has_template {
                    self.parse_error("nested <form>");
                    return;
                }
                self.close_p_element();
                let form = self.insert_html_element(name, attributes);
                if !has_template {
                    self.form_element_pointer = Some(form);
                }
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "li" => {
                self.close_open_list_item(&["li"]);
                self.close_p_element();
                let _ = self.insert_html_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "dd" | "dt") => {
                self.close_open_list_item(&["dd", "dt"]);
                self.close_p_element();
                let _ = self.insert_html_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "plaintext" => {
                self.close_p_element();
                let _ = self.insert_html_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "button" => {
                if self.has_element_in_scope("button") {
                    self.parse_error("nested <button>");
                    self.generate_implied_end_tags();
                    self.pop_until_tag("button");
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
            }

            // "If the list of active formatting elements contains an a element
            // between the end of the list and the last marker on the list (or
            // the start of the list if there is no marker on the list), then
            // this is a parse error; run the adoption agency algorithm for the
            // token, then remove that element from the list of active formatting
            // elements and the stack of open elements if the adoption agency
            // algorithm didn't already remove it."
            Token::StartTag {
                name, attributes, ..
            } if name == "a" => {
                let open_anchor = self
                    .active_formatting_elements
                    .iter()
                    .rev()
                    .take_while(|entry| !matches!(entry, ActiveFormattingElement::Marker))
                    .find_map(|entry| match entry {
                        ActiveFormattingElement::Element {
                            node_id, tag_name, ..
                        } if tag_name == "a" => Some(*node_id),
                        _ => None,
                    });
                if let Some(anchor) = open_anchor {
                    self.parse_error("<a> inside another <a>");
                    self.run_adoption_agency("a");
                    self.active_formatting_elements
                        .retain(|entry| entry.node_id() != Some(anchor));
                    self.stack_of_open_elements.retain(|&id| id != anchor);
                }
                self.reconstruct_active_formatting_elements();
                let element = self.insert_html_element(name, attributes);
                self.push_active_formatting_element(element, name, attributes);
            }

            // "Reconstruct the active formatting elements, if any. Insert an
            // HTML element for the token. Push onto the list of active
            // formatting elements that element."
            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "b" | "big"
                    | "code"
                    | "em"
                    | "font"
                    | "i"
                    | "s"
                    | "small"
                    | "strike"
                    | "strong"
                    | "tt"
                    | "u"
            ) =>
            {
                self.reconstruct_active_formatting_elements();
                let element = self.insert_html_element(name, attributes);
                self.push_active_formatting_element(element, name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "nobr" => {
                self.reconstruct_active_formatting_elements();
                if self.has_element_in_scope("nobr") {
                    self.parse_error("nested <nobr>");
                    self.run_adoption_agency("nobr");
                    self.reconstruct_active_formatting_elements();
                }
                let element = self.insert_html_element(name, attributes);
                self.push_active_formatting_element(element, name, attributes);
            }

            // "Insert a marker at the end of the list of active formatting elements."
            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "applet" | "marquee" | "object") => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
                self.active_formatting_elements
                    .push(ActiveFormattingElement::Marker);
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "table" => {
                self.close_p_element();
                let _ = self.insert_html_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "caption" | "colgroup" | "tbody" | "thead" | "tfoot" | "tr" | "td" | "th"
            ) =>
            {
                self.close_implied_table_parts(name);
                let _ = self.insert_html_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "col" => self.insert_void_element(name, attributes),

            // "Reconstruct the active formatting elements, if any. Insert an
            // HTML element for the token. Immediately pop the current node off
            // the stack of open elements. Acknowledge the token's self-closing
            // flag, if it is set."
            Token::StartTag {
                name, attributes, ..
            } if matches!(
                name.as_str(),
                "area" | "br" | "embed" | "img" | "keygen" | "wbr" | "input"
            ) =>
            {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(name, attributes);
            }

            // "Parse error. Change the token's tag name to "img" and reprocess
            // it. (Don't ask.)"
            Token::StartTag {
                name, attributes, ..
            } if name == "image" => {
                self.parse_error("<image> treated as <img>");
                self.reconstruct_active_formatting_elements();
                self.insert_void_element("img", attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "param" | "source" | "track") => {
                self.insert_void_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "hr" => {
                self.close_p_element();
                self.insert_void_element(name, attributes);
            }

            // "Insert an HTML element for the token. If the next token is a
            // U+000A LINE FEED (LF) character token, then ignore that token ...
            // Switch the insertion mode to "text"."
            Token::StartTag {
                name, attributes, ..
            } if name == "textarea" => {
                self.insert_text_element(name, attributes);
                self.ignore_next_line_feed = true;
            }

            Token::StartTag {
                name, attributes, ..
            } if name == "xmp" => {
                self.close_p_element();
                self.reconstruct_active_formatting_elements();
                self.insert_text_element(name, attributes);
            }

            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "iframe" | "noembed")
                || (name == "noscript" && self.scripting) =>
            {
                self.insert_text_element(name, attributes);
            }

            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "optgroup" | "option") => {
                if let Some(current) = self.current_node()
                    && self.is_html_element_named(current, "option")
                {
                    let _ = self.stack_of_open_elements.pop();
                }
                if name == "optgroup"
                    && let Some(current) = self.current_node()
                    && self.is_html_element_named(current, "optgroup")
                {
                    let _ = self.stack_of_open_elements.pop();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
            }

            // "If the stack of open elements has a ruby element in scope, then
            // generate implied end tags."
            Token::StartTag {
                name, attributes, ..
            } if matches!(name.as_str(), "rb" | "rtc" | "rp" | "rt") => {
                if self.has_element_in_scope("ruby") {
                    let exclude = matches!(name.as_str(), "rp" | "rt").then_some("rtc");
                    self.generate_implied_end_tags_excluding(exclude);
                }
                let _ = self.insert_html_element(name, attributes);
            }

            // "Reconstruct the active formatting elements, if any. Adjust MathML
            // attributes for the token. Adjust foreign attributes for the token.
            // Insert a foreign element for the token, with MathML namespace."
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } if matches!(name.as_str(), "math" | "svg") => {
                self.reconstruct_active_formatting_elements();
                let namespace = if name == "svg" {
                    Namespace::Svg
                } else {
                    Namespace::MathMl
                };
                self.insert_foreign_element(name, attributes, namespace, *self_closing);
            }

            // "Any other start tag: Reconstruct the active formatting elements,
            // if any. Insert an HTML element for the token."
            Token::StartTag {
                name, attributes, ..
            } => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name, attributes);
            }

            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "address"
                        | "article"
                        | "aside"
                        | "blockquote"
                        | "button"
                        | "center"
                        | "details"
                        | "dialog"
                        | "dir"
                        | "div"
                        | "dl"
                        | "fieldset"
                        | "figcaption"
                        | "figure"
                        | "footer"
                        | "header"
                        | "hgroup"
                        | "listing"
                        | "main"
                        | "menu"
                        | "nav"
                        | "ol"
                        | "pre"
                        | "search"
                        | "section"
                        | "select"
                        | "summary"
                        | "ul"
                ) =>
            {
                self.close_block(name);
            }

            // "Let node be the element that the form element pointer is set to,
            // or null if it is not set to an element. Set the form element
            // pointer to null. If node is null or if the stack of open elements
            // does not have node in scope, then this is a parse error; return
            // and ignore the token. ... Remove node from the stack of open
            // elements."
            Token::EndTag { name, .. } if name == "form" => {
                if self.has_open_template() {
                    self.close_block("form");
                    return;
                }
                let Some(form) = self.form_element_pointer.take() else {
                    self.parse_error("unexpected end tag </form>");
                    return;
                };
                if !self.has_element_in_scope("form") {
                    self.parse_error("unexpected end tag </form>");
                    return;
                }
                self.generate_implied_end_tags();
                self.stack_of_open_elements.retain(|&id| id != form);
            }

            // "If the stack of open elements does not have a p element in button
            // scope, then this is a parse error; insert an HTML element for a "p"
            // start tag token with no attributes. Close a p element."
            Token::EndTag { name, .. } if name == "p" => {
                if !self.has_element_in_button_scope("p") {
                    self.parse_error("unexpected end tag </p>");
                    let _ = self.insert_html_element("p", &[]);
                }
                self.close_p_element();
            }

            Token::EndTag { name, .. } if name == "li" => {
                if !self.has_element_in_list_item_scope("li") {
                    self.parse_error("unexpected end tag </li>");
                    return;
                }
                self.generate_implied_end_tags_excluding(Some("li"));
                self.pop_until_tag("li");
            }

            Token::EndTag { name, .. } if matches!(name.as_str(), "dd" | "dt") => {
                if !self.has_element_in_scope(name) {
                    self.parse_error(&format!("unexpected end tag </{name}>"));
                    return;
                }
                self.generate_implied_end_tags_excluding(Some(name));
                self.pop_until_tag(name);
            }

            // "If the stack of open elements does not have an element in scope
            // that is an HTML element and whose tag name is one of "h1", "h2",
            // "h3", "h4", "h5", or "h6", then this is a parse error; ignore the
            // token. ... pop elements from the stack of open elements until an
            // HTML element whose tag name is one of those has been popped."
            Token::EndTag { name, .. } if HEADINGS.contains(&name.as_str()) => {
                if !self.has_one_of_in_scope(HEADINGS) {
                    self.parse_error(&format!("unexpected end tag </{name}>"));
                    return;
                }
                self.generate_implied_end_tags();
                self.pop_until_one_of(HEADINGS);
            }

            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "a" | "b"
                        | "big"
                        | "code"
                        | "em"
                        | "font"
                        | "i"
                        | "nobr"
                        | "s"
                        | "small"
                        | "strike"
                        | "strong"
                        | "tt"
                        | "u"
                ) =>
            {
                self.run_adoption_agency(name);
            }

            Token::EndTag { name, .. }
                if matches!(name.as_str(), "applet" | "marquee" | "object") =>
            {
                if !self.has_element_in_scope(name) {
                    self.parse_error(&format!("unexpected end tag </{name}>"));
                    return;
                }
                self.generate_implied_end_tags();
                self.pop_until_tag(name);
                self.clear_active_formatting_elements_to_last_marker();
            }

            // Table end tags close through their element even past open
            // cells, which would otherwise stop "any other end tag".
            Token::EndTag { name, .. }
                if matches!(
                    name.as_str(),
                    "table"
                        | "caption"
                        | "colgroup"
                        | "tbody"
                        | "thead"
                        | "tfoot"
                        | "tr"
                        | "td"
                        | "th"
                ) =>
            {
                if !self.has_one_of_in_table_scope(&[name.as_str()]) {
                    self.parse_error(&format!("unexpected end tag </{name}>"));
                    return;
                }
                self.generate_implied_end_tags();
                self.pop_until_tag(name);
            }

            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br" start
            // tag token with no attributes, rather than the end tag token that
            // it actually is."
            Token::EndTag { name, .. } if name == "br" => {
                self.parse_error("</br> treated as <br>");
                self.reconstruct_active_formatting_elements();
                self.insert_void_element("br", &[]);
            }

            Token::EndTag { name, .. } => self.any_other_end_tag(name),
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    fn handle_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_body_mode(token);
            }

            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                let html = self
                    .stack_of_open_elements
                    .first()
                    .copied()
                    .unwrap_or(NodeId::ROOT);
                self.insert_comment_into(html, data);
            }

            Token::Doctype { .. } => self.parse_error("unexpected doctype"),
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html": ... Switch the insertion
            // mode to "after after body"."
            Token::EndTag { name, .. } if name == "html" => {
                self.insertion_mode = InsertionMode::AfterAfterBody;
            }

            Token::EndOfFile => self.stopped = true,

            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token." Trailing content still ends up in body.
            _ => {
                self.parse_error("content after </body>");
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    fn handle_after_after_body_mode(&mut self, token: &Token) {
        match token {
            Token::Comment { data } => self.insert_comment_to_document(data),
            Token::Doctype { .. } => self.handle_in_body_mode(token),
            Token::Character { data } if Self::is_whitespace(*data) => {
                self.handle_in_body_mode(token);
            }
            Token::StartTag { name, .. } if name == "html" => self.handle_in_body_mode(token),
            Token::EndOfFile => self.stopped = true,
            _ => {
                self.parse_error("content after </html>");
                self.insertion_mode = InsertionMode::InBody;
                self.reprocess_token(token);
            }
        }
    }

    // =========================================================================
    // Foreign content
    // =========================================================================

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// Whether `token` is handled by the foreign content rules rather than by
    /// the current insertion mode.
    fn use_foreign_content_rules(&self, token: &Token) -> bool {
        let Some(current) = self.current_node() else {
            return false;
        };
        let Some(element) = self.tree.as_element(current) else {
            return false;
        };
        if element.namespace == Namespace::Html {
            return false;
        }
        let name = element.tag_name.as_str();
        match token {
            Token::EndOfFile => false,
            Token::StartTag {
                name: token_name, ..
            } => {
                let text_point = is_mathml_text_integration_point(element.namespace, name)
                    && !matches!(token_name.as_str(), "mglyph" | "malignmark");
                let svg_in_annotation = element.namespace == Namespace::MathMl
                    && name == "annotation-xml"
                    && token_name == "svg";
                let html_point = is_html_integration_point(
                    element.namespace,
                    name,
                    element.attrs.get("encoding"),
                );
                !(text_point || svg_in_annotation || html_point)
            }
            Token::Character { .. } => {
                !(is_mathml_text_integration_point(element.namespace, name)
                    || is_html_integration_point(
                        element.namespace,
                        name,
                        element.attrs.get("encoding"),
                    ))
            }
            _ => true,
        }
    }

    /// Whether the foreign content break-out loop stops at `node`.
    fn ends_foreign_breakout(&self, node: NodeId) -> bool {
        let Some(element) = self.tree.as_element(node) else {
            return true;
        };
        element.namespace == Namespace::Html
            || is_mathml_text_integration_point(element.namespace, &element.tag_name)
            || is_html_integration_point(
                element.namespace,
                &element.tag_name,
                element.attrs.get("encoding"),
            )
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    fn handle_foreign_content(&mut self, token: &Token) {
        match token {
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            Token::Character { data: '\0' } => {
                self.parse_error("unexpected null character");
                self.insert_character('\u{FFFD}');
            }
            Token::Character { data } => self.insert_character(*data),
            Token::Comment { data } => self.insert_comment(data),
            Token::Doctype { .. } => self.parse_error("unexpected doctype"),

            // "Parse error. While the current node is not a MathML text
            // integration point, an HTML integration point, or an element in the
            // HTML namespace, pop elements from the stack of open elements.
            // Reprocess the token according to the rules given in the section
            // corresponding to the current insertion mode in HTML content."
            Token::StartTag {
                name, attributes, ..
            } if breaks_out_of_foreign_content(name, attributes) => {
                self.break_out_of_foreign_content(token, name);
            }
            Token::EndTag { name, .. } if matches!(name.as_str(), "br" | "p") => {
                self.break_out_of_foreign_content(token, name);
            }

            // "Any other start tag: If the adjusted current node is an element
            // in the SVG namespace, adjust SVG attributes for the token ...
            // Insert a foreign element for the token, with adjusted current
            // node's namespace and false. If the token has its self-closing flag
            // set, pop the current node off the stack of open elements and
            // acknowledge the token's self-closing flag."
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let namespace = self
                    .current_node()
                    .map_or(Namespace::Html, |node| self.namespace(node));
                self.insert_foreign_element(name, attributes, namespace, *self_closing);
            }

            // "Any other end tag": walk down the stack looking for an element
            // with the token's name, deferring to the insertion mode once an
            // HTML element is reached.
            Token::EndTag { name, .. } => {
                let Some(mut index) = self.stack_of_open_elements.len().checked_sub(1) else {
                    return;
                };
                if !self
                    .tag_name(self.stack_of_open_elements[index])
                    .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
                {
                    self.parse_error(&format!("unexpected end tag </{name}> in foreign content"));
                }
                loop {
                    // "If node is the topmost element in the stack of open
                    // elements, then return. (fragment case)"
                    if index == 0 {
                        return;
                    }
                    let node = self.stack_of_open_elements[index];
                    // "If node's tag name, converted to ASCII lowercase, is the
                    // same as the tag name of the token, pop elements from the
                    // stack of open elements until node has been popped from the
                    // stack, and then return."
                    if self
                        .tag_name(node)
                        .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
                    {
                        self.stack_of_open_elements.truncate(index);
                        return;
                    }
                    // "Set node to the previous entry in the stack of open
                    // elements. If node is not an element in the HTML namespace,
                    // return to the step labeled loop. Otherwise, process the
                    // token according to the rules given in the section
                    // corresponding to the current insertion mode in HTML content."
                    index -= 1;
                    if self.namespace(self.stack_of_open_elements[index]) == Namespace::Html {
                        self.process_using_insertion_mode(token);
                        return;
                    }
                }
            }

            Token::EndOfFile => self.process_using_insertion_mode(token),
        }
    }

    fn break_out_of_foreign_content(&mut self, token: &Token, name: &str) {
        self.parse_error(&format!("<{name}> closes foreign content"));
        while let Some(current) = self.current_node()
            && !self.ends_foreign_breakout(current)
        {
            let _ = self.stack_of_open_elements.pop();
        }
        self.process_using_insertion_mode(token);
    }
}

/// Attribute lists compare as sets for the Noah's Ark clause.
fn same_attributes(a: &[Attribute], b: &[Attribute]) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|attr| b.iter().any(|other| other.name == attr.name && other.value == attr.value))
}

/// Render the subtree at `id` as an indented outline, one node per line.
#[must_use]
pub fn format_tree(tree: &DomTree, id: NodeId) -> String {
    let mut out = String::new();
    write_tree(tree, id, 0, &mut out);
    out
}

fn write_tree(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let line = match &node.node_type {
        NodeType::Document => "#document".to_string(),
        NodeType::DocumentFragment => "#document-fragment".to_string(),
        NodeType::Doctype(doctype) => format!("<!DOCTYPE {}>", doctype.name),
        NodeType::Element(element) => {
            let mut line = format!("<{}", element.tag_name);
            match element.namespace {
                Namespace::Svg => line.insert_str(1, "svg "),
                Namespace::MathMl => line.insert_str(1, "math "),
                Namespace::Html => {}
            }
            for (name, value) in element.attrs.iter() {
                line.push_str(&format!(" {name}=\"{value}\""));
            }
            line.push('>');
            line
        }
        NodeType::Text(text) => format!("\"{}\"", text.escape_debug()),
        NodeType::Comment(data) => format!("<!-- {data} -->"),
    };
    out.push_str(&prefix);
    out.push_str(&line);
    out.push('\n');
    for &child in tree.children(id) {
        write_tree(tree, child, indent + 1, out);
    }
}

/// Print the subtree at `id` to stdout, indented by `indent` levels.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    for line in format_tree(tree, id).lines() {
        println!("{prefix}{line}");
    }
}
