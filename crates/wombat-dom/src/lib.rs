//! DOM tree implementation for the wombat document engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues.
//!
//! One arena may hold several roots: the Document at [`NodeId::ROOT`],
//! detached subtrees, fragments, and (after [`DomTree::absorb`]) the nodes
//! of other documents. A detached node stays valid and can be re-inserted
//! anywhere until [`DomTree::sweep`] reclaims its subtree; freed slots are
//! reused by later allocations.

mod attributes;
mod iter;

use std::cmp::Ordering;
use std::collections::BTreeSet;

use strum_macros::Display;

pub use attributes::AttributesMap;
pub use iter::{AncestorIterator, DescendantIterator, PrecedingSiblingIterator};

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document created with the tree is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
/// "Each node has an associated node document..."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-node-document)
    /// "Each node has an associated node document"
    ///
    /// `None` for Document nodes, which are their own node document.
    pub owner_document: Option<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    Doctype(DoctypeData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// The numeric `nodeType` values from
/// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodetype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[repr(u16)]
pub enum NodeTypeCode {
    /// `ELEMENT_NODE`
    Element = 1,
    /// `TEXT_NODE`
    Text = 3,
    /// `COMMENT_NODE`
    Comment = 8,
    /// `DOCUMENT_NODE`
    Document = 9,
    /// `DOCUMENT_TYPE_NODE`
    DocumentType = 10,
    /// `DOCUMENT_FRAGMENT_NODE`
    DocumentFragment = 11,
}

impl NodeType {
    /// The `nodeType` code of this variant.
    #[must_use]
    pub const fn code(&self) -> NodeTypeCode {
        match self {
            Self::Document => NodeTypeCode::Document,
            Self::DocumentFragment => NodeTypeCode::DocumentFragment,
            Self::Doctype(_) => NodeTypeCode::DocumentType,
            Self::Element(_) => NodeTypeCode::Element,
            Self::Text(_) => NodeTypeCode::Text,
            Self::Comment(_) => NodeTypeCode::Comment,
        }
    }

    /// [§ 4.4 nodeName](https://dom.spec.whatwg.org/#dom-node-nodename)
    ///
    /// "Element: Its HTML-uppercased qualified name." Foreign elements keep
    /// their stored case.
    #[must_use]
    pub fn node_name(&self) -> String {
        match self {
            Self::Document => "#document".to_string(),
            Self::DocumentFragment => "#document-fragment".to_string(),
            Self::Doctype(data) => data.name.clone(),
            Self::Element(data) => data.qualified_tag_name(),
            Self::Text(_) => "#text".to_string(),
            Self::Comment(_) => "#comment".to_string(),
        }
    }

    /// Text or comment data.
    #[must_use]
    pub fn character_data(&self) -> Option<&str> {
        match self {
            Self::Text(data) | Self::Comment(data) => Some(data),
            _ => None,
        }
    }
}

/// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
///
/// "Doctypes have an associated name, public ID, and system ID."
/// "When a doctype is created, its name is always given. Unless explicitly
/// given when a doctype is created, its public ID and system ID are the
/// empty string."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    /// "name"
    pub name: String,
    /// "public ID"
    pub public_id: String,
    /// "system ID"
    pub system_id: String,
}

/// [§ 2.1.3 Namespaces](https://infra.spec.whatwg.org/#namespaces)
///
/// Only used to decide tag-name casing and foreign-content parsing rules;
/// no namespace URI is exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Namespace {
    /// The HTML namespace.
    #[default]
    Html,
    /// The SVG namespace.
    Svg,
    /// The MathML namespace.
    MathMl,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// "An element's local name". Lower-case for HTML elements.
    pub tag_name: String,
    /// The element's namespace.
    pub namespace: Namespace,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create an HTML element with no attributes. The name is lower-cased.
    #[must_use]
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            namespace: Namespace::Html,
            attrs: AttributesMap::new(),
        }
    }

    /// [§ 4.9 tagName](https://dom.spec.whatwg.org/#dom-element-tagname)
    ///
    /// "If this is in the HTML namespace and its node document is an HTML
    /// document, then set qualifiedName to qualifiedName in ASCII uppercase."
    #[must_use]
    pub fn qualified_tag_name(&self) -> String {
        match self.namespace {
            Namespace::Html => self.tag_name.to_ascii_uppercase(),
            Namespace::Svg | Namespace::MathMl => self.tag_name.clone(),
        }
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id")
    }

    /// Whether `class` is one of the element's classes.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

/// [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
/// bit flags.
pub mod document_position {
    /// `DOCUMENT_POSITION_DISCONNECTED`
    pub const DISCONNECTED: u16 = 0x01;
    /// `DOCUMENT_POSITION_PRECEDING`
    pub const PRECEDING: u16 = 0x02;
    /// `DOCUMENT_POSITION_FOLLOWING`
    pub const FOLLOWING: u16 = 0x04;
    /// `DOCUMENT_POSITION_CONTAINS`
    pub const CONTAINS: u16 = 0x08;
    /// `DOCUMENT_POSITION_CONTAINED_BY`
    pub const CONTAINED_BY: u16 = 0x10;
    /// `DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC`
    pub const IMPLEMENTATION_SPECIFIC: u16 = 0x20;
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree. A tree is a finite hierarchical
/// tree structure."
///
/// The mutation primitives here do no validation beyond keeping links
/// consistent; callers check parent/child preconditions first.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// `None` marks a reclaimed slot.
    nodes: Vec<Option<Node>>,
    /// Reclaimed slots, reused before the arena grows.
    free: Vec<NodeId>,
    /// Nodes that were parentless when last touched: candidate roots of
    /// garbage subtrees for [`DomTree::sweep`].
    detached: BTreeSet<NodeId>,
}

/// Where [`DomTree::absorb`] placed each node of the absorbed tree.
#[derive(Debug, Clone, Default)]
pub struct Relocation(Vec<Option<NodeId>>);

impl Relocation {
    /// The new id of the absorbed tree's `id`, or `None` if that slot held
    /// no node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<NodeId> {
        self.0.get(id.0).copied().flatten()
    }
}

impl DomTree {
    const fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            detached: BTreeSet::new(),
        }
    }

    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self::empty();
        let _ = tree.push_node(NodeType::Document, None);
        tree
    }

    /// Create a tree whose root is a detached `DocumentFragment`.
    ///
    /// Used as the target of fragment parsing.
    #[must_use]
    pub fn new_fragment() -> Self {
        let mut tree = Self::empty();
        let _ = tree.push_node(NodeType::DocumentFragment, None);
        tree
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Get a mutable reference to a node by its ID.
    #[must_use]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Get the number of live nodes in the arena, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Check if the arena holds no live node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots, live or reclaimed.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Take a free slot, or grow the arena by one.
    fn next_slot(&mut self) -> NodeId {
        self.free.pop().unwrap_or_else(|| {
            self.nodes.push(None);
            NodeId(self.nodes.len() - 1)
        })
    }

    fn push_node(&mut self, node_type: NodeType, owner_document: Option<NodeId>) -> NodeId {
        let id = self.next_slot();
        self.nodes[id.0] = Some(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            owner_document,
        });
        let _ = self.detached.insert(id);
        id
    }

    /// Allocate a new detached node owned by the root document and return its ID.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let owner = self.document_of(NodeId::ROOT);
        self.alloc_in(owner, node_type)
    }

    /// Allocate a new detached node owned by `document`.
    ///
    /// A `Document` node is always its own owner, so `document` is ignored for it.
    pub fn alloc_in(&mut self, document: Option<NodeId>, node_type: NodeType) -> NodeId {
        let owner = match node_type {
            NodeType::Document => None,
            _ => document,
        };
        self.push_node(node_type, owner)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// The node document: the node itself for a Document, otherwise its owner.
    #[must_use]
    pub fn document_of(&self, id: NodeId) -> Option<NodeId> {
        match self.get(id)?.node_type {
            NodeType::Document => Some(id),
            _ => self.get(id)?.owner_document,
        }
    }

    /// [§ 4.4 root](https://dom.spec.whatwg.org/#concept-tree-root)
    ///
    /// "The root of an object is itself, if its parent is null, or else it is
    /// the root of its parent."
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// "An inclusive descendant is an object or one of its descendants."
    #[must_use]
    pub fn is_inclusive_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        descendant == ancestor || self.is_descendant_of(descendant, ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator::new(self, self.parent(id))
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator::new(self, self.prev_sibling(id))
    }

    /// Iterate over the descendants of `id` in tree order (pre-order,
    /// depth-first), excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator::new(self, id)
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    #[must_use]
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Mutable access to the data of a Text or Comment node.
    #[must_use]
    pub fn character_data_mut(&mut self, id: NodeId) -> Option<&mut String> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Text(data) | NodeType::Comment(data) => Some(data),
            _ => None,
        })
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.as_element(id).is_some()
    }

    /// Local name of an element, `None` for other nodes.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|data| data.tag_name.as_str())
    }

    /// [§ 4.4 parentElement](https://dom.spec.whatwg.org/#parent-element)
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    /// Element children of a node, in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    /// [§ 4.2.6 NonDocumentTypeChildNode](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-nextelementsibling)
    /// "The nextElementSibling getter steps are to return the first following
    /// sibling that is an element; otherwise null."
    #[must_use]
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    /// "The previousElementSibling getter steps are to return the first
    /// preceding sibling that is an element; otherwise null."
    #[must_use]
    pub fn prev_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.preceding_siblings(id).find(|&s| self.is_element(s))
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#concept-descendant-text-content)
    ///
    /// "The descendant text content of a node node is the concatenation of
    /// the data of all the Text node descendants of node, in tree order."
    #[must_use]
    pub fn descendant_text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|d| self.as_text(d))
            .collect()
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self, document: NodeId) -> Option<NodeId> {
        self.element_children(document).next()
    }

    /// [§ 3.1.4 The head element](https://html.spec.whatwg.org/multipage/dom.html#the-head-element-2)
    ///
    /// "The head element of a document is the first head element that is a
    /// child of the html element, if there is one, or null otherwise."
    #[must_use]
    pub fn head(&self, document: NodeId) -> Option<NodeId> {
        let html = self.document_element(document)?;
        self.element_children(html)
            .find(|&id| self.tag_name(id) == Some("head"))
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self, document: NodeId) -> Option<NodeId> {
        let html = self.document_element(document)?;
        self.element_children(html)
            .find(|&id| matches!(self.tag_name(id), Some("body" | "frameset")))
    }

    // ===================================================================
    // Mutation primitives
    // ===================================================================

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Unlink `id` from its parent and siblings. No-op for a root.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let (prev, next) = (self.prev_sibling(id), self.next_sibling(id));

        if let Some(node) = prev.and_then(|prev_id| self.get_mut(prev_id)) {
            node.next_sibling = next;
        }
        if let Some(node) = next.and_then(|next_id| self.get_mut(next_id)) {
            node.prev_sibling = prev;
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.retain(|&child| child != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
        let _ = self.detached.insert(id);
    }

    /// Detach `child` from `parent`.
    ///
    /// Returns `false`, leaving the tree untouched, if `child` is not a
    /// child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.detach(child);
        true
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert(parent, child, None);
    }

    /// [§ 4.2.3 Insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Insert `new_child` into `parent` immediately before `reference`.
    /// If `reference` is not a child of `parent`, `new_child` is appended.
    pub fn insert_before(&mut self, parent: NodeId, new_child: NodeId, reference: NodeId) {
        self.insert(parent, new_child, Some(reference));
    }

    /// Insert `node` into `parent` before `reference` (or last when `None`).
    ///
    /// Inserting a `DocumentFragment` moves its children instead:
    /// "If node is a DocumentFragment node, then set nodes to node's children."
    pub fn insert(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        if matches!(
            self.get(node).map(|n| &n.node_type),
            Some(NodeType::DocumentFragment)
        ) {
            let moved = self.children(node).to_vec();
            for child in moved {
                self.insert(parent, child, reference);
            }
            return;
        }

        // "If referenceChild is node, then set referenceChild to node's next sibling."
        let reference = if reference == Some(node) {
            self.next_sibling(node)
        } else {
            reference
        };

        self.detach(node);

        let children = self.children(parent);
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        let prev = index.checked_sub(1).map(|i| children[i]);
        let next = children.get(index).copied();

        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.insert(index, node);
        }
        if let Some(prev_node) = prev.and_then(|prev_id| self.get_mut(prev_id)) {
            prev_node.next_sibling = Some(node);
        }
        if let Some(next_node) = next.and_then(|next_id| self.get_mut(next_id)) {
            next_node.prev_sibling = Some(node);
        }
        if let Some(inserted) = self.get_mut(node) {
            inserted.parent = Some(parent);
            inserted.prev_sibling = prev;
            inserted.next_sibling = next;
        }

        if let Some(document) = self.document_of(parent) {
            self.adopt(node, document);
        }
    }

    /// [§ 4.2.3 Replace](https://dom.spec.whatwg.org/#concept-node-replace)
    ///
    /// Put `new_child` where `old_child` is. Returns `false`, leaving the
    /// tree untouched, if `old_child` is not a child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) -> bool {
        if self.parent(old_child) != Some(parent) {
            return false;
        }
        if new_child == old_child {
            return true;
        }
        let mut reference = self.next_sibling(old_child);
        if reference == Some(new_child) {
            reference = self.next_sibling(new_child);
        }
        self.detach(old_child);
        self.insert(parent, new_child, reference);
        true
    }

    /// Move all children of `from` to the end of `to`, keeping their order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let moved = self.children(from).to_vec();
        for child in moved {
            self.append_child(to, child);
        }
    }

    /// Remove every child of `id`.
    pub fn remove_all_children(&mut self, id: NodeId) {
        let removed = self.children(id).to_vec();
        for child in removed {
            self.detach(child);
        }
    }

    /// [§ 4.5 adopt](https://dom.spec.whatwg.org/#concept-node-adopt)
    ///
    /// "For each inclusiveDescendant in node's shadow-including inclusive
    /// descendants: Set inclusiveDescendant's node document to document."
    pub fn adopt(&mut self, id: NodeId, document: NodeId) {
        if self.get(id).and_then(|n| n.owner_document) == Some(document) {
            return;
        }
        let subtree: Vec<NodeId> = std::iter::once(id).chain(self.descendants(id)).collect();
        for node in subtree {
            if let Some(n) = self.get_mut(node)
                && !matches!(n.node_type, NodeType::Document)
            {
                n.owner_document = Some(document);
            }
        }
    }

    /// [§ 4.5 clone a node](https://dom.spec.whatwg.org/#concept-node-clone)
    ///
    /// "Let copy be a node that implements the same interfaces as node ...
    /// If the clone children flag is set, then for each child child of node,
    /// in tree order: append the result of cloning child ... to copy."
    ///
    /// The copy is detached and shares the source's node document. `None`
    /// when `id` is not a live node.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Option<NodeId> {
        let source = self.get(id)?;
        let (node_type, owner) = (source.node_type.clone(), source.owner_document);
        let copy = self.push_node(node_type, owner);
        if deep {
            let children = self.children(id).to_vec();
            for child in children {
                if let Some(child_copy) = self.clone_node(child, true) {
                    self.append_child(copy, child_copy);
                }
            }
        }
        Some(copy)
    }

    /// [§ 4.4 normalize](https://dom.spec.whatwg.org/#dom-node-normalize)
    ///
    /// "For each descendant exclusive Text node node of this: ... If length
    /// is zero, then remove node ... Replace data with node, length, 0, and
    /// data ... Remove node's contiguous exclusive Text nodes (excluding itself)"
    pub fn normalize(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            if self.parent(child) != Some(id) {
                // merged into a previous sibling
                continue;
            }
            if self.as_text(child).is_none() {
                self.normalize(child);
                continue;
            }
            let mut merged = String::new();
            let mut next = self.next_sibling(child);
            while let Some(sibling) = next
                && let Some(data) = self.as_text(sibling)
            {
                merged.push_str(data);
                next = self.next_sibling(sibling);
                self.detach(sibling);
            }
            if let Some(data) = self.character_data_mut(child) {
                data.push_str(&merged);
                if data.is_empty() {
                    self.detach(child);
                }
            }
        }
    }

    /// Move every node of `other` into this arena, filling free slots
    /// first. Structure is unchanged: `other`'s roots stay roots.
    pub fn absorb(&mut self, other: Self) -> Relocation {
        let relocation = Relocation(
            other
                .nodes
                .iter()
                .map(|node| node.as_ref().map(|_| self.next_slot()))
                .collect(),
        );
        let moved = |id: NodeId| relocation.get(id).unwrap_or(id);
        for (old, node) in other.nodes.into_iter().enumerate() {
            let (Some(mut node), Some(new)) = (node, relocation.get(NodeId(old))) else {
                continue;
            };
            node.parent = node.parent.map(moved);
            node.next_sibling = node.next_sibling.map(moved);
            node.prev_sibling = node.prev_sibling.map(moved);
            node.owner_document = node.owner_document.map(moved);
            for child in &mut node.children {
                *child = moved(*child);
            }
            self.nodes[new.0] = Some(node);
        }
        self.detached
            .extend(other.detached.into_iter().filter_map(|id| relocation.get(id)));
        relocation
    }

    /// Reclaim every detached subtree that holds no pinned node.
    ///
    /// A subtree is garbage when its root has no parent and `is_pinned`
    /// holds for none of its nodes. A Document is kept while any live node
    /// outside it names it as owner, and [`NodeId::ROOT`] is never
    /// reclaimed. Returns the freed ids; later allocations reuse their slots.
    pub fn sweep(&mut self, is_pinned: impl Fn(NodeId) -> bool) -> Vec<NodeId> {
        let mut reclaimed = Vec::new();
        let mut kept = BTreeSet::new();
        // Documents go last so the nodes they own are freed first.
        let (documents, others): (Vec<NodeId>, Vec<NodeId>) = std::mem::take(&mut self.detached)
            .into_iter()
            .filter(|&root| root != NodeId::ROOT && self.get(root).is_some_and(|n| n.parent.is_none()))
            .partition(|&root| matches!(self.get(root).map(|n| &n.node_type), Some(NodeType::Document)));

        for root in others.into_iter().chain(documents) {
            if is_pinned(root) || self.descendants(root).any(&is_pinned) {
                let _ = kept.insert(root);
                continue;
            }
            let subtree: Vec<NodeId> = std::iter::once(root).chain(self.descendants(root)).collect();
            // Everything below a document is owned by it; any further owned
            // node lives outside the subtree.
            let is_document = matches!(self.get(root).map(|n| &n.node_type), Some(NodeType::Document));
            if is_document && self.owned_count(root) >= subtree.len() {
                let _ = kept.insert(root);
                continue;
            }
            for id in subtree {
                self.nodes[id.0] = None;
                self.free.push(id);
                reclaimed.push(id);
            }
        }
        self.detached = kept;
        reclaimed
    }

    /// Number of live nodes whose node document is `document`.
    fn owned_count(&self, document: NodeId) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|node| node.owner_document == Some(document))
            .count()
    }

    // ===================================================================
    // Comparison
    // ===================================================================

    /// [§ 4.4 concept-node-equals](https://dom.spec.whatwg.org/#concept-node-equals)
    ///
    /// "A node A equals a node B if all of the following conditions are true:
    /// A and B implement the same interfaces ... A and B have the same number
    /// of children. Each child of A equals the child of B at the identical index."
    ///
    /// `b` lives in `other`, which may be this same tree.
    #[must_use]
    pub fn nodes_equal(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        let (Some(left), Some(right)) = (self.get(a), other.get(b)) else {
            return false;
        };
        let same_node = match (&left.node_type, &right.node_type) {
            (NodeType::Document, NodeType::Document)
            | (NodeType::DocumentFragment, NodeType::DocumentFragment) => true,
            (NodeType::Doctype(x), NodeType::Doctype(y)) => x == y,
            (NodeType::Element(x), NodeType::Element(y)) => x == y,
            (NodeType::Text(x), NodeType::Text(y))
            | (NodeType::Comment(x), NodeType::Comment(y)) => x == y,
            _ => false,
        };
        same_node
            && left.children.len() == right.children.len()
            && left
                .children
                .iter()
                .zip(&right.children)
                .all(|(&x, &y)| self.nodes_equal(x, other, y))
    }

    /// Order two nodes of the same tree in tree order. Returns `None` when
    /// they have different roots.
    #[must_use]
    pub fn tree_order(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        if a == b {
            return Some(Ordering::Equal);
        }
        let mut path_a: Vec<NodeId> = std::iter::once(a).chain(self.ancestors(a)).collect();
        let mut path_b: Vec<NodeId> = std::iter::once(b).chain(self.ancestors(b)).collect();
        path_a.reverse();
        path_b.reverse();
        if path_a.first() != path_b.first() {
            return None;
        }
        let common = path_a
            .iter()
            .zip(&path_b)
            .take_while(|(x, y)| x == y)
            .count();
        // One path is a prefix of the other: the ancestor comes first.
        let (Some(&branch_a), Some(&branch_b)) = (path_a.get(common), path_b.get(common)) else {
            return Some(path_a.len().cmp(&path_b.len()));
        };
        let siblings = self.children(path_a[common - 1]);
        let index_a = siblings.iter().position(|&c| c == branch_a);
        let index_b = siblings.iter().position(|&c| c == branch_b);
        Some(index_a.cmp(&index_b))
    }

    /// [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
    ///
    /// Position of `other` relative to `reference`, as a bit set of
    /// [`document_position`] flags.
    #[must_use]
    pub fn compare_document_position(&self, reference: NodeId, other: NodeId) -> u16 {
        use document_position::{
            CONTAINED_BY, CONTAINS, DISCONNECTED, FOLLOWING, IMPLEMENTATION_SPECIFIC, PRECEDING,
        };

        if reference == other {
            return 0;
        }
        if self.root_of(reference) != self.root_of(other) {
            // "return the result of adding DOCUMENT_POSITION_DISCONNECTED,
            // DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC, and either
            // DOCUMENT_POSITION_PRECEDING or DOCUMENT_POSITION_FOLLOWING,
            // with the constraint that this is to be consistent"
            let direction = if other < reference { PRECEDING } else { FOLLOWING };
            return DISCONNECTED | IMPLEMENTATION_SPECIFIC | direction;
        }
        if self.is_descendant_of(reference, other) {
            return CONTAINS | PRECEDING;
        }
        if self.is_descendant_of(other, reference) {
            return CONTAINED_BY | FOLLOWING;
        }
        match self.tree_order(other, reference) {
            Some(Ordering::Less) => PRECEDING,
            _ => FOLLOWING,
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}
