//! Text and markup content: `textContent`, `innerHTML`, `outerHTML`,
//! `insertAdjacentHTML` and the
//! [CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
//! methods.

use std::ops::Range;

use wombat_dom::{NodeId, NodeType, NodeTypeCode};
use wombat_html::parse_fragment;

use crate::arena::{self, ArenaSlot};
use crate::mutation::{AdjacentPosition, adjacent_insertion_point};
use crate::{DomError, Node};

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `html` as the content of a `context` element and move the result
/// into `slot`'s tree. Returns the detached `DocumentFragment` holding it.
fn parse_into(slot: &mut ArenaSlot, html: &str, context: &str) -> Option<NodeId> {
    let fragment = parse_fragment(html, context, &slot.options);
    slot.tree.absorb(fragment).get(NodeId::ROOT)
}

/// The fragment parsing context for children of `id`: its local name, or
/// the configured [`ParseOptions::fragment_context`] when it is not an
/// element.
///
/// [`ParseOptions::fragment_context`]: wombat_common::ParseOptions::fragment_context
fn context_name(slot: &ArenaSlot, id: NodeId) -> String {
    slot.tree
        .tag_name(id)
        .unwrap_or(slot.options.fragment_context.as_str())
        .to_string()
}

/// Byte range of `count` characters starting at character `offset`,
/// clamped to the end of `data`.
fn char_range(data: &str, offset: usize, count: usize) -> Result<Range<usize>, DomError> {
    let byte_index = |chars: usize| {
        data.char_indices()
            .nth(chars)
            .map_or(data.len(), |(index, _)| index)
    };
    // "If offset is greater than length, then throw an IndexSizeError"
    let length = data.chars().count();
    if offset > length {
        return Err(DomError::IndexSize);
    }
    let end = offset.saturating_add(count).min(length);
    Ok(byte_index(offset)..byte_index(end))
}

impl Node {
    /// [textContent](https://dom.spec.whatwg.org/#dom-node-textcontent):
    /// the text of all Text descendants, the data of a Text or Comment
    /// node, `None` for a document or doctype.
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        self.read(|tree, id| match tree.get(id).map(|node| &node.node_type) {
            Some(NodeType::Text(data) | NodeType::Comment(data)) => Some(data.clone()),
            Some(NodeType::Element(_) | NodeType::DocumentFragment) => {
                Some(tree.descendant_text_content(id))
            }
            _ => None,
        })
    }

    /// Set `textContent`. On an element or fragment every child is replaced
    /// by one Text node, even for an empty string. A Text or Comment node
    /// takes the value as its data. Documents and doctypes ignore it.
    pub fn set_text_content(&self, text: &str) {
        self.edit(|tree, id| match tree.get(id).map(|node| node.node_type.code()) {
            Some(NodeTypeCode::Text | NodeTypeCode::Comment) => {
                if let Some(data) = tree.character_data_mut(id) {
                    text.clone_into(data);
                }
            }
            Some(NodeTypeCode::Element | NodeTypeCode::DocumentFragment) => {
                tree.remove_all_children(id);
                let owner = tree.document_of(id);
                let child = tree.alloc_in(owner, NodeType::Text(text.to_string()));
                tree.append_child(id, child);
            }
            _ => {}
        });
    }

    /// [innerHTML](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-innerhtml):
    /// the serialized children.
    #[must_use]
    pub fn inner_html(&self) -> String {
        let (arena, id) = self.resolve();
        let slot = arena.borrow();
        slot.serializer().serialize_inner(&slot.tree, id)
    }

    /// Replace every child with the result of parsing `html` in this
    /// element's context. Only elements and fragments take markup; a
    /// document keeps its single element.
    pub fn set_inner_html(&self, html: &str) {
        let (arena, id) = self.resolve();
        {
            let mut slot = arena.borrow_mut();
            if !matches!(
                slot.tree.get(id).map(|node| &node.node_type),
                Some(NodeType::Element(_) | NodeType::DocumentFragment)
            ) {
                return;
            }
            let context = context_name(&slot, id);
            let Some(fragment) = parse_into(&mut slot, html, &context) else {
                return;
            };
            slot.tree.remove_all_children(id);
            slot.tree.move_children(fragment, id);
        }
        arena::collect(&arena);
    }

    /// [outerHTML](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-outerhtml):
    /// this node and its subtree. A document or fragment serializes its
    /// children.
    #[must_use]
    pub fn outer_html(&self) -> String {
        let (arena, id) = self.resolve();
        let slot = arena.borrow();
        slot.serializer().serialize_outer(&slot.tree, id)
    }

    /// Replace this node with the result of parsing `html` in its parent's
    /// context. No-op when the node has no parent.
    ///
    /// # Errors
    ///
    /// [`DomError::HierarchyRequest`] when the parent is a document.
    pub fn set_outer_html(&self, html: &str) -> Result<(), DomError> {
        let (arena, id) = self.resolve();
        {
            let mut slot = arena.borrow_mut();
            let Some(parent) = slot.tree.parent(id) else {
                return Ok(());
            };
            // "If parent is a Document, throw a NoModificationAllowedError"
            if matches!(
                slot.tree.get(parent).map(|node| &node.node_type),
                Some(NodeType::Document)
            ) {
                return Err(DomError::HierarchyRequest(
                    "Cannot set outerHTML on a child of the document.",
                ));
            }
            let context = context_name(&slot, parent);
            if let Some(fragment) = parse_into(&mut slot, html, &context) {
                slot.tree.insert(parent, fragment, Some(id));
            }
            slot.tree.detach(id);
        }
        arena::collect(&arena);
        Ok(())
    }

    /// [insertAdjacentHTML](https://html.spec.whatwg.org/multipage/dynamic-markup-insertion.html#dom-element-insertadjacenthtml):
    /// parse `html` and insert the nodes at `position`. No-op when the
    /// position is outside this node and it has no parent.
    ///
    /// # Errors
    ///
    /// [`DomError::Syntax`] for an unknown position,
    /// [`DomError::HierarchyRequest`] when the target cannot hold children
    /// or is a document.
    pub fn insert_adjacent_html(&self, position: &str, html: &str) -> Result<(), DomError> {
        let position = AdjacentPosition::parse(position)?;
        let (arena, id) = self.resolve();
        {
            let mut slot = arena.borrow_mut();
            let Some((parent, reference)) = adjacent_insertion_point(&slot.tree, id, position)
            else {
                return Ok(());
            };
            match slot.tree.get(parent).map(|node| &node.node_type) {
                Some(NodeType::Element(_) | NodeType::DocumentFragment) => {}
                Some(NodeType::Document) => {
                    return Err(DomError::HierarchyRequest(
                        "Cannot insert markup directly into the document.",
                    ));
                }
                _ => {
                    return Err(DomError::HierarchyRequest(
                        "This node type does not support children.",
                    ));
                }
            }
            let context = context_name(&slot, parent);
            if let Some(fragment) = parse_into(&mut slot, html, &context) {
                slot.tree.insert(parent, fragment, reference);
            }
        }
        arena::collect(&arena);
        Ok(())
    }

    // ===================================================================
    // CharacterData
    // ===================================================================

    /// [length](https://dom.spec.whatwg.org/#concept-node-length): the
    /// number of characters of a Text or Comment node, otherwise the
    /// number of children.
    #[must_use]
    pub fn length(&self) -> usize {
        self.read(|tree, id| {
            tree.get(id)
                .and_then(|node| node.node_type.character_data())
                .map_or_else(|| tree.children(id).len(), |data| data.chars().count())
        })
    }

    /// [substringData](https://dom.spec.whatwg.org/#dom-characterdata-substringdata),
    /// with offsets in characters.
    ///
    /// # Errors
    ///
    /// [`DomError::IndexSize`] when `offset` is past the end.
    pub fn substring_data(&self, offset: usize, count: usize) -> Result<String, DomError> {
        let data = self.data();
        let range = char_range(&data, offset, count)?;
        Ok(data[range].to_string())
    }

    /// [appendData](https://dom.spec.whatwg.org/#dom-characterdata-appenddata)
    pub fn append_data(&self, data: &str) {
        self.write(|tree, id| {
            if let Some(existing) = tree.character_data_mut(id) {
                existing.push_str(data);
            }
        });
    }

    /// [insertData](https://dom.spec.whatwg.org/#dom-characterdata-insertdata)
    ///
    /// # Errors
    ///
    /// [`DomError::IndexSize`] when `offset` is past the end.
    pub fn insert_data(&self, offset: usize, data: &str) -> Result<(), DomError> {
        self.replace_data(offset, 0, data)
    }

    /// [deleteData](https://dom.spec.whatwg.org/#dom-characterdata-deletedata)
    ///
    /// # Errors
    ///
    /// [`DomError::IndexSize`] when `offset` is past the end.
    pub fn delete_data(&self, offset: usize, count: usize) -> Result<(), DomError> {
        self.replace_data(offset, count, "")
    }

    /// [replaceData](https://dom.spec.whatwg.org/#dom-characterdata-replacedata):
    /// replace `count` characters from `offset` (clamped to the end) with
    /// `data`. Nodes without character data only accept offset 0 and stay
    /// unchanged.
    ///
    /// # Errors
    ///
    /// [`DomError::IndexSize`] when `offset` is past the end.
    pub fn replace_data(&self, offset: usize, count: usize, data: &str) -> Result<(), DomError> {
        self.write(|tree, id| {
            let Some(existing) = tree.character_data_mut(id) else {
                return char_range("", offset, count).map(|_| ());
            };
            let range = char_range(existing, offset, count)?;
            existing.replace_range(range, data);
            Ok(())
        })
    }

    /// [splitText](https://dom.spec.whatwg.org/#dom-text-splittext): keep
    /// the first `offset` characters here and move the rest into a new
    /// Text node, inserted as the next sibling when there is a parent.
    ///
    /// # Errors
    ///
    /// [`DomError::IndexSize`] when `offset` is past the end,
    /// [`DomError::HierarchyRequest`] when this is not a Text node.
    pub fn split_text(&self, offset: usize) -> Result<Self, DomError> {
        let (arena, id) = self.resolve();
        let new_node = {
            let mut slot = arena.borrow_mut();
            let tree = &mut slot.tree;
            let Some(data) = tree.as_text(id) else {
                return Err(DomError::HierarchyRequest("Only Text nodes can be split."));
            };
            let range = char_range(data, offset, usize::MAX)?;
            let tail = data[range.clone()].to_string();
            if let Some(data) = tree.character_data_mut(id) {
                data.truncate(range.start);
            }

            let owner = tree.document_of(id);
            let new_node = tree.alloc_in(owner, NodeType::Text(tail));
            if let Some(parent) = tree.parent(id) {
                let next = tree.next_sibling(id);
                tree.insert(parent, new_node, next);
            }
            new_node
        };
        Ok(Self::new(&arena, new_node))
    }
}
