//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)

use std::ops::Deref;

use wombat_common::ParseOptions;
use wombat_dom::{DomTree, ElementData, NodeId, NodeType, NodeTypeCode};

use crate::arena::{self, ArenaSlot};
use crate::{DomError, Node};

/// A handle to a Document node.
///
/// Derefs to [`Node`], so every node operation works on a document too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    node: Node,
}

impl Deref for Document {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl Document {
    /// Wrap a parsed tree whose root is a Document.
    pub(crate) fn from_tree(tree: DomTree, options: ParseOptions) -> Self {
        let arena = ArenaSlot::new(tree, options);
        Self {
            node: Node::new(&arena, NodeId::ROOT),
        }
    }

    pub(crate) const fn from_node(node: Node) -> Self {
        Self { node }
    }

    /// This document as a plain [`Node`] handle.
    #[must_use]
    pub const fn as_node(&self) -> &Node {
        &self.node
    }

    /// [doctype](https://dom.spec.whatwg.org/#dom-document-doctype)
    #[must_use]
    pub fn doctype(&self) -> Option<Node> {
        self.related(|tree, id| {
            tree.children(id).iter().copied().find(|&child| {
                matches!(
                    tree.get(child).map(|node| &node.node_type),
                    Some(NodeType::Doctype(_))
                )
            })
        })
    }

    /// [documentElement](https://dom.spec.whatwg.org/#dom-document-documentelement)
    #[must_use]
    pub fn document_element(&self) -> Option<Node> {
        self.related(DomTree::document_element)
    }

    /// [head](https://html.spec.whatwg.org/multipage/dom.html#dom-document-head)
    #[must_use]
    pub fn head(&self) -> Option<Node> {
        self.related(DomTree::head)
    }

    /// [body](https://html.spec.whatwg.org/multipage/dom.html#dom-document-body)
    #[must_use]
    pub fn body(&self) -> Option<Node> {
        self.related(DomTree::body)
    }

    /// [title](https://html.spec.whatwg.org/multipage/dom.html#document.title):
    /// the text of the first `title` element "with ASCII whitespace stripped
    /// and collapsed", or empty.
    #[must_use]
    pub fn title(&self) -> String {
        self.read(|tree, id| {
            tree.descendants(id)
                .find(|&descendant| tree.tag_name(descendant) == Some("title"))
                .map(|title| {
                    tree.descendant_text_content(title)
                        .split_ascii_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        })
    }

    /// [getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid):
    /// the first element in tree order whose `id` is `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<Node> {
        self.related(|tree, root| {
            tree.descendants(root).find(|&descendant| {
                tree.as_element(descendant).and_then(ElementData::id) == Some(id)
            })
        })
    }

    fn create(&self, node_type: NodeType) -> Node {
        let (arena, id) = self.resolve();
        let created = arena.borrow_mut().tree.alloc_in(Some(id), node_type);
        Node::new(&arena, created)
    }

    /// [createElement](https://dom.spec.whatwg.org/#dom-document-createelement):
    /// a detached HTML element, its name lower-cased.
    #[must_use]
    pub fn create_element(&self, tag_name: &str) -> Node {
        self.create(NodeType::Element(ElementData::new(tag_name)))
    }

    /// [createTextNode](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    #[must_use]
    pub fn create_text_node(&self, data: &str) -> Node {
        self.create(NodeType::Text(data.to_string()))
    }

    /// [createComment](https://dom.spec.whatwg.org/#dom-document-createcomment)
    #[must_use]
    pub fn create_comment(&self, data: &str) -> Node {
        self.create(NodeType::Comment(data.to_string()))
    }

    /// [createDocumentFragment](https://dom.spec.whatwg.org/#dom-document-createdocumentfragment)
    #[must_use]
    pub fn create_document_fragment(&self) -> Node {
        self.create(NodeType::DocumentFragment)
    }

    /// [importNode](https://dom.spec.whatwg.org/#dom-document-importnode):
    /// a detached clone of `node`, owned by this document.
    ///
    /// # Errors
    ///
    /// [`DomError::HierarchyRequest`] when `node` is a document.
    pub fn import_node(&self, node: &Node, deep: bool) -> Result<Node, DomError> {
        if node.node_type() == NodeTypeCode::Document {
            return Err(DomError::HierarchyRequest("A document cannot be imported."));
        }
        let (arena, document, source) = arena::unify(self, node);
        let copy = {
            let mut slot = arena.borrow_mut();
            let tree = &mut slot.tree;
            let copy = tree.clone_node(source, deep);
            if let Some(copy) = copy {
                tree.adopt(copy, document);
            }
            copy
        };
        // A pinned node is always live.
        Ok(copy.map_or_else(|| node.clone(), |copy| Node::new(&arena, copy)))
    }

    /// [adoptNode](https://dom.spec.whatwg.org/#dom-document-adoptnode):
    /// detach `node` and make this document its owner, along with its
    /// whole subtree.
    ///
    /// # Errors
    ///
    /// [`DomError::HierarchyRequest`] when `node` is a document.
    pub fn adopt_node(&self, node: &Node) -> Result<Node, DomError> {
        if node.node_type() == NodeTypeCode::Document {
            return Err(DomError::HierarchyRequest("A document cannot be adopted."));
        }
        let (arena, document, adopted) = arena::unify(self, node);
        {
            let mut slot = arena.borrow_mut();
            let tree = &mut slot.tree;
            tree.detach(adopted);
            tree.adopt(adopted, document);
        }
        arena::collect(&arena);
        Ok(node.clone())
    }
}
