//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//! on node handles.
//!
//! Every public method validates first and edits second. Validation reads
//! both arenas in place; a node from another arena is merged in only once
//! the edit is known to succeed (see [`crate::arena`]). Detached subtrees
//! nothing refers to are collected after each edit.

use std::rc::Rc;

use strum_macros::EnumString;
use wombat_dom::{DomTree, NodeId, NodeType, NodeTypeCode};

use crate::arena;
use crate::error::{NOT_A_CHILD_TO_INSERT_BEFORE, NOT_A_CHILD_TO_REMOVE, NOT_A_CHILD_TO_REPLACE};
use crate::{DomError, Node};

/// [insertAdjacentElement](https://dom.spec.whatwg.org/#dom-element-insertadjacentelement)
/// positions. Parsed ASCII case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AdjacentPosition {
    /// Before the element itself.
    BeforeBegin,
    /// Just inside the element, before its first child.
    AfterBegin,
    /// Just inside the element, after its last child.
    BeforeEnd,
    /// After the element itself.
    AfterEnd,
}

impl AdjacentPosition {
    /// Parse a position string.
    ///
    /// # Errors
    ///
    /// [`DomError::Syntax`] for anything but the four position keywords.
    pub fn parse(position: &str) -> Result<Self, DomError> {
        position
            .parse()
            .map_err(|_| DomError::Syntax(format!("'{position}' is not a valid position")))
    }
}

/// Where an inserted node lands among the parent's children.
#[derive(Debug, Clone, Copy)]
enum Target {
    /// Before this child, or last for `None`.
    Before(Option<NodeId>),
    /// In place of this child.
    Replacing(NodeId),
    /// In place of every child. Checked like an append, as
    /// `replaceChildren` is.
    AllChildren,
}

/// Steps 1 and 5 for a Text node: the parent holds children and is not a
/// document.
fn ensure_can_hold_text(tree: &DomTree, parent: NodeId) -> Result<(), DomError> {
    match tree.get(parent).map(|n| n.node_type.code()) {
        Some(NodeTypeCode::Element | NodeTypeCode::DocumentFragment) => Ok(()),
        Some(NodeTypeCode::Document) => Err(DomError::HierarchyRequest(
            "Text cannot be a child of the document.",
        )),
        _ => Err(DomError::HierarchyRequest(
            "This node type does not support children.",
        )),
    }
}

/// [§ 4.2.3 ensure pre-insertion validity](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
///
/// `parent` lives in `tree` and `node` in `node_tree`, which is the same
/// tree when both handles share an arena.
fn ensure_pre_insertion_validity(
    tree: &DomTree,
    parent: NodeId,
    node_tree: &DomTree,
    node: NodeId,
    target: Target,
) -> Result<(), DomError> {
    // "If parent is not a Document, DocumentFragment, or Element node, then
    // throw a HierarchyRequestError."
    let parent_kind = tree.get(parent).map(|n| n.node_type.code());
    if !matches!(
        parent_kind,
        Some(NodeTypeCode::Document | NodeTypeCode::DocumentFragment | NodeTypeCode::Element)
    ) {
        return Err(DomError::HierarchyRequest(
            "This node type does not support children.",
        ));
    }
    // "If node is a host-including inclusive ancestor of parent, then throw
    // a HierarchyRequestError."
    if std::ptr::eq(tree, node_tree) && tree.is_inclusive_descendant_of(parent, node) {
        return Err(DomError::HierarchyRequest(
            "The new child contains the parent.",
        ));
    }
    match node_tree.get(node).map(|n| n.node_type.code()) {
        Some(NodeTypeCode::Document) => {
            return Err(DomError::HierarchyRequest(
                "A document cannot be inserted into another node.",
            ));
        }
        // "If either node is a Text node and parent is a document, or node is
        // a doctype and parent is not a document, then throw"
        Some(NodeTypeCode::Text) => ensure_can_hold_text(tree, parent)?,
        Some(NodeTypeCode::DocumentType) if parent_kind != Some(NodeTypeCode::Document) => {
            return Err(DomError::HierarchyRequest(
                "A doctype can only be a child of the document.",
            ));
        }
        _ => {}
    }
    if parent_kind == Some(NodeTypeCode::Document) {
        ensure_document_child_validity(tree, parent, node_tree, node, target)?;
    }
    Ok(())
}

/// Step 6: a document holds at most one doctype and one element, with the
/// doctype first.
fn ensure_document_child_validity(
    tree: &DomTree,
    document: NodeId,
    node_tree: &DomTree,
    node: NodeId,
    target: Target,
) -> Result<(), DomError> {
    let children = tree.children(document);
    let (child, replaced) = match target {
        Target::Before(child) => (child, None),
        Target::Replacing(child) => (Some(child), Some(child)),
        Target::AllChildren => (None, None),
    };
    // `following` starts at the child itself, so "child is a doctype" and
    // "a doctype is following child" are one check.
    let (preceding, following) = child
        .and_then(|child| children.iter().position(|&c| c == child))
        .map_or((children, &[][..]), |index| children.split_at(index));
    let is_kind = |id: NodeId, code: NodeTypeCode| {
        Some(id) != replaced && tree.get(id).map(|n| n.node_type.code()) == Some(code)
    };

    let has_element = children.iter().any(|&id| is_kind(id, NodeTypeCode::Element));
    let doctype_follows = following
        .iter()
        .any(|&id| is_kind(id, NodeTypeCode::DocumentType));
    let element_fits = || {
        if has_element {
            return Err(DomError::HierarchyRequest(
                "The document already has an element child.",
            ));
        }
        if doctype_follows {
            return Err(DomError::HierarchyRequest(
                "The document element must follow the doctype.",
            ));
        }
        Ok(())
    };

    match node_tree.get(node).map(|n| n.node_type.code()) {
        Some(NodeTypeCode::DocumentFragment) => {
            let elements = node_tree.element_children(node).count();
            let has_text = node_tree
                .children(node)
                .iter()
                .any(|&id| node_tree.as_text(id).is_some());
            if elements > 1 || has_text {
                return Err(DomError::HierarchyRequest(
                    "A document can only hold one element and no text.",
                ));
            }
            if elements == 1 {
                element_fits()?;
            }
        }
        Some(NodeTypeCode::Element) => element_fits()?,
        Some(NodeTypeCode::DocumentType) => {
            if children
                .iter()
                .any(|&id| is_kind(id, NodeTypeCode::DocumentType))
            {
                return Err(DomError::HierarchyRequest(
                    "The document already has a doctype.",
                ));
            }
            if preceding
                .iter()
                .any(|&id| is_kind(id, NodeTypeCode::Element))
            {
                return Err(DomError::HierarchyRequest(
                    "The doctype must come before the document element.",
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

impl Node {
    /// Check `node` against `target` under `parent`, an id in this node's
    /// arena, then merge arenas and edit. Nothing changes on error.
    fn insert_at(&self, parent: NodeId, node: &Self, target: Target) -> Result<(), DomError> {
        let (arena, _) = self.resolve();
        let (node_arena, node_id) = node.resolve();
        ensure_pre_insertion_validity(
            &arena.borrow().tree,
            parent,
            &node_arena.borrow().tree,
            node_id,
            target,
        )?;

        let (arena, _, node_id) = arena::unify(self, node);
        {
            let mut slot = arena.borrow_mut();
            let tree = &mut slot.tree;
            match target {
                Target::Before(reference) => tree.insert(parent, node_id, reference),
                Target::Replacing(old) => {
                    let _ = tree.replace_child(parent, node_id, old);
                }
                Target::AllChildren => {
                    tree.remove_all_children(parent);
                    tree.insert(parent, node_id, None);
                }
            }
        }
        arena::collect(&arena);
        Ok(())
    }

    /// Apply `f` to this node's tree, then collect what it detached.
    pub(crate) fn edit(&self, f: impl FnOnce(&mut DomTree, NodeId)) {
        let (arena, id) = self.resolve();
        f(&mut arena.borrow_mut().tree, id);
        arena::collect(&arena);
    }

    /// This node's id and `other`'s, when `other` is one of its children.
    fn child_id(&self, other: &Self) -> Option<(NodeId, NodeId)> {
        let (arena, parent) = self.resolve();
        let (other_arena, child) = other.resolve();
        let is_child =
            Rc::ptr_eq(&arena, &other_arena) && arena.borrow().tree.parent(child) == Some(parent);
        is_child.then_some((parent, child))
    }

    /// This node's id in the arena that owns it now.
    fn id_now(&self) -> NodeId {
        self.resolve().1
    }

    /// [appendChild](https://dom.spec.whatwg.org/#dom-node-appendchild):
    /// detach `node` from wherever it is and make it the last child.
    /// Appending a fragment moves its children and leaves it empty.
    ///
    /// # Errors
    ///
    /// [`DomError::HierarchyRequest`] when `node` is this node or one of
    /// its ancestors, is a document, or cannot live here. A document takes
    /// at most one doctype and one element, doctype first, and no text.
    pub fn append_child(&self, node: &Self) -> Result<Self, DomError> {
        self.insert_at(self.id_now(), node, Target::Before(None))?;
        Ok(node.clone())
    }

    /// [prepend](https://dom.spec.whatwg.org/#dom-parentnode-prepend) a
    /// single node.
    ///
    /// # Errors
    ///
    /// As [`Node::append_child`].
    pub fn prepend(&self, node: &Self) -> Result<(), DomError> {
        let (parent, first) = self.read(|tree, id| (id, tree.first_child(id)));
        self.insert_at(parent, node, Target::Before(first))
    }

    /// [insertBefore](https://dom.spec.whatwg.org/#dom-node-insertbefore);
    /// a `None` reference appends.
    ///
    /// # Errors
    ///
    /// [`DomError::NotFound`] when `reference` is not a child of this node,
    /// otherwise as [`Node::append_child`].
    pub fn insert_before(&self, node: &Self, reference: Option<&Self>) -> Result<Self, DomError> {
        let (parent, reference_id) = match reference {
            Some(reference) => {
                let (parent, child) = self
                    .child_id(reference)
                    .ok_or(DomError::NotFound(NOT_A_CHILD_TO_INSERT_BEFORE))?;
                (parent, Some(child))
            }
            None => (self.id_now(), None),
        };
        self.insert_at(parent, node, Target::Before(reference_id))?;
        Ok(node.clone())
    }

    /// [before](https://dom.spec.whatwg.org/#dom-childnode-before): insert
    /// `node` as the previous sibling. No-op when this node has no parent.
    ///
    /// # Errors
    ///
    /// As [`Node::append_child`], checked against this node's parent.
    pub fn before(&self, node: &Self) -> Result<(), DomError> {
        let Some((parent, this)) = self.read(|tree, id| tree.parent(id).map(|parent| (parent, id)))
        else {
            return Ok(());
        };
        self.insert_at(parent, node, Target::Before(Some(this)))
    }

    /// [after](https://dom.spec.whatwg.org/#dom-childnode-after): insert
    /// `node` as the next sibling. No-op when this node has no parent.
    ///
    /// # Errors
    ///
    /// As [`Node::before`].
    pub fn after(&self, node: &Self) -> Result<(), DomError> {
        let Some((parent, next)) =
            self.read(|tree, id| tree.parent(id).map(|parent| (parent, tree.next_sibling(id))))
        else {
            return Ok(());
        };
        self.insert_at(parent, node, Target::Before(next))
    }

    /// [replaceChild](https://dom.spec.whatwg.org/#dom-node-replacechild):
    /// put `node` where `old` is and return `old`, now detached.
    ///
    /// # Errors
    ///
    /// [`DomError::NotFound`] when `old` is not a child of this node,
    /// otherwise as [`Node::append_child`]. Nothing changes on error.
    pub fn replace_child(&self, node: &Self, old: &Self) -> Result<Self, DomError> {
        let (parent, old_id) = self
            .child_id(old)
            .ok_or(DomError::NotFound(NOT_A_CHILD_TO_REPLACE))?;
        self.insert_at(parent, node, Target::Replacing(old_id))?;
        Ok(old.clone())
    }

    /// [removeChild](https://dom.spec.whatwg.org/#dom-node-removechild):
    /// detach `child` and return it.
    ///
    /// # Errors
    ///
    /// [`DomError::NotFound`] when `child` is not a child of this node; the
    /// children are left untouched.
    pub fn remove_child(&self, child: &Self) -> Result<Self, DomError> {
        let (_, child_id) = self
            .child_id(child)
            .ok_or(DomError::NotFound(NOT_A_CHILD_TO_REMOVE))?;
        self.edit(|tree, _| tree.detach(child_id));
        Ok(child.clone())
    }

    /// [remove](https://dom.spec.whatwg.org/#dom-childnode-remove): detach
    /// this node. No-op when it has no parent.
    pub fn remove(&self) {
        self.edit(DomTree::detach);
    }

    /// [replaceWith](https://dom.spec.whatwg.org/#dom-childnode-replacewith)
    /// a single node. No-op when this node has no parent.
    ///
    /// # Errors
    ///
    /// As [`Node::before`].
    pub fn replace_with(&self, node: &Self) -> Result<(), DomError> {
        if self == node {
            return Ok(());
        }
        let Some((parent, this)) = self.read(|tree, id| tree.parent(id).map(|parent| (parent, id)))
        else {
            return Ok(());
        };
        self.insert_at(parent, node, Target::Replacing(this))
    }

    /// [replaceChildren](https://dom.spec.whatwg.org/#dom-parentnode-replacechildren)
    /// with a single node, or with nothing to empty this node.
    ///
    /// # Errors
    ///
    /// As [`Node::append_child`], checked against the current children.
    /// Nothing changes on error.
    pub fn replace_children(&self, node: Option<&Self>) -> Result<(), DomError> {
        let Some(node) = node else {
            self.edit(DomTree::remove_all_children);
            return Ok(());
        };
        self.insert_at(self.id_now(), node, Target::AllChildren)
    }

    /// [cloneNode](https://dom.spec.whatwg.org/#dom-node-clonenode): a
    /// detached copy owned by the same document. A shallow clone keeps the
    /// attributes but has no children.
    #[must_use]
    pub fn clone_node(&self, deep: bool) -> Self {
        let (arena, id) = self.resolve();
        let copy = arena.borrow_mut().tree.clone_node(id, deep);
        // A pinned node is always live.
        copy.map_or_else(|| self.clone(), |copy| Self::new(&arena, copy))
    }

    /// [normalize](https://dom.spec.whatwg.org/#dom-node-normalize): merge
    /// adjacent Text descendants and drop empty ones.
    pub fn normalize(&self) {
        self.edit(DomTree::normalize);
    }

    /// [insertAdjacentElement](https://dom.spec.whatwg.org/#dom-element-insertadjacentelement).
    ///
    /// Returns the inserted node, or `None` when `position` is outside the
    /// element and the element has no parent.
    ///
    /// # Errors
    ///
    /// [`DomError::Syntax`] for an unknown position, otherwise as
    /// [`Node::append_child`].
    pub fn insert_adjacent_element(
        &self,
        position: &str,
        element: &Self,
    ) -> Result<Option<Self>, DomError> {
        let position = AdjacentPosition::parse(position)?;
        let Some((parent, reference)) =
            self.read(|tree, id| adjacent_insertion_point(tree, id, position))
        else {
            return Ok(None);
        };
        self.insert_at(parent, element, Target::Before(reference))?;
        Ok(Some(element.clone()))
    }

    /// [insertAdjacentText](https://dom.spec.whatwg.org/#dom-element-insertadjacenttext):
    /// insert a new Text node holding `text`.
    ///
    /// # Errors
    ///
    /// As [`Node::insert_adjacent_element`]. No node is created on error.
    pub fn insert_adjacent_text(&self, position: &str, text: &str) -> Result<(), DomError> {
        let position = AdjacentPosition::parse(position)?;
        let (arena, this) = self.resolve();
        let mut slot = arena.borrow_mut();
        let tree = &mut slot.tree;
        let Some((parent, reference)) = adjacent_insertion_point(tree, this, position) else {
            return Ok(());
        };
        ensure_can_hold_text(tree, parent)?;
        let owner = tree.document_of(this);
        let text = tree.alloc_in(owner, NodeType::Text(text.to_string()));
        tree.insert(parent, text, reference);
        Ok(())
    }
}

/// Where a node goes for `position` relative to `this`: the parent and the
/// child to insert before. `None` when the position is outside `this` and
/// `this` has no parent.
pub(crate) fn adjacent_insertion_point(
    tree: &DomTree,
    this: NodeId,
    position: AdjacentPosition,
) -> Option<(NodeId, Option<NodeId>)> {
    match position {
        AdjacentPosition::BeforeBegin => tree.parent(this).map(|parent| (parent, Some(this))),
        AdjacentPosition::AfterBegin => Some((this, tree.first_child(this))),
        AdjacentPosition::BeforeEnd => Some((this, None)),
        AdjacentPosition::AfterEnd => tree
            .parent(this)
            .map(|parent| (parent, tree.next_sibling(this))),
    }
}
