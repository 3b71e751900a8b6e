//! [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node):
//! the handle type, its properties, tree navigation and attributes.

use std::fmt;
use std::rc::Rc;

use wombat_dom::{DoctypeData, DomTree, ElementData, Namespace, NodeId, NodeType, NodeTypeCode};

use crate::{Document, DomError};
use crate::arena::{self, Arena, Pin};
use crate::class_list::ClassList;

/// A handle to one node of a document tree.
///
/// Handles are cheap to clone and compare by identity: two handles are
/// equal when they refer to the same node, never because their content
/// matches (see [`Node::is_equal_node`] for that). While a handle exists,
/// its node and everything reachable from it stay allocated.
#[derive(Clone)]
pub struct Node {
    pub(crate) arena: Arena,
    pub(crate) id: NodeId,
    _pin: Pin,
}

impl Node {
    /// A handle to `id`. `arena` must not be borrowed.
    pub(crate) fn new(arena: &Arena, id: NodeId) -> Self {
        let pin = arena.borrow_mut().pin(id);
        Self {
            arena: Rc::clone(arena),
            id,
            _pin: pin,
        }
    }

    /// The arena that owns this node now, and its id there.
    pub(crate) fn resolve(&self) -> (Arena, NodeId) {
        arena::resolve(&self.arena, self.id)
    }

    /// Run `f` against the tree holding this node.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&DomTree, NodeId) -> R) -> R {
        let (arena, id) = self.resolve();
        let slot = arena.borrow();
        f(&slot.tree, id)
    }

    /// Run `f` against the tree holding this node, mutably.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut DomTree, NodeId) -> R) -> R {
        let (arena, id) = self.resolve();
        let mut slot = arena.borrow_mut();
        f(&mut slot.tree, id)
    }

    /// Map a relative of this node, found by `f`, to a handle.
    pub(crate) fn related(&self, f: impl FnOnce(&DomTree, NodeId) -> Option<NodeId>) -> Option<Self> {
        let (arena, id) = self.resolve();
        let found = f(&arena.borrow().tree, id);
        found.map(|found| Self::new(&arena, found))
    }

    /// Map several relatives of this node, found by `f`, to handles.
    pub(crate) fn related_all(
        &self,
        f: impl FnOnce(&DomTree, NodeId) -> Vec<NodeId>,
    ) -> Vec<Self> {
        let (arena, id) = self.resolve();
        let found = f(&arena.borrow().tree, id);
        found.into_iter().map(|id| Self::new(&arena, id)).collect()
    }

    fn with_element<R>(&self, f: impl FnOnce(&ElementData) -> R) -> Option<R> {
        self.read(|tree, id| tree.as_element(id).map(f))
    }

    fn with_element_mut<R>(&self, f: impl FnOnce(&mut ElementData) -> R) -> Option<R> {
        self.write(|tree, id| tree.as_element_mut(id).map(f))
    }

    // ===================================================================
    // Node properties
    // ===================================================================

    /// [nodeType](https://dom.spec.whatwg.org/#dom-node-nodetype)
    #[must_use]
    pub fn node_type(&self) -> NodeTypeCode {
        self.read(|tree, id| {
            tree.get(id)
                .map_or(NodeTypeCode::Document, |node| node.node_type.code())
        })
    }

    /// [nodeName](https://dom.spec.whatwg.org/#dom-node-nodename):
    /// `#document`, `#text`, the doctype name, the upper-cased tag name...
    #[must_use]
    pub fn node_name(&self) -> String {
        self.read(|tree, id| {
            tree.get(id)
                .map(|node| node.node_type.node_name())
                .unwrap_or_default()
        })
    }

    /// [nodeValue](https://dom.spec.whatwg.org/#dom-node-nodevalue): the
    /// data of a Text or Comment node, `None` for everything else.
    #[must_use]
    pub fn node_value(&self) -> Option<String> {
        self.read(|tree, id| {
            tree.get(id)
                .and_then(|node| node.node_type.character_data())
                .map(str::to_string)
        })
    }

    /// Set the data of a Text or Comment node. Other nodes ignore it.
    pub fn set_node_value(&self, value: &str) {
        self.write(|tree, id| {
            if let Some(data) = tree.character_data_mut(id) {
                value.clone_into(data);
            }
        });
    }

    /// [data](https://dom.spec.whatwg.org/#dom-characterdata-data);
    /// empty for nodes that carry no character data.
    #[must_use]
    pub fn data(&self) -> String {
        self.node_value().unwrap_or_default()
    }

    /// [ownerDocument](https://dom.spec.whatwg.org/#dom-node-ownerdocument);
    /// `None` for a document and for nodes of a parsed fragment.
    #[must_use]
    pub fn owner_document(&self) -> Option<Document> {
        self.related(|tree, id| tree.get(id).and_then(|node| node.owner_document))
            .map(Document::from_node)
    }

    /// [isConnected](https://dom.spec.whatwg.org/#dom-node-isconnected):
    /// whether the root of this node is a document.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.read(|tree, id| {
            matches!(
                tree.get(tree.root_of(id)).map(|node| &node.node_type),
                Some(NodeType::Document)
            )
        })
    }

    fn doctype_field(&self, field: impl FnOnce(&DoctypeData) -> &str) -> Option<String> {
        self.read(|tree, id| match tree.get(id).map(|node| &node.node_type) {
            Some(NodeType::Doctype(data)) => Some(field(data).to_string()),
            _ => None,
        })
    }

    /// [name](https://dom.spec.whatwg.org/#dom-documenttype-name) of a
    /// DocumentType node.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.doctype_field(|data| &data.name)
    }

    /// [publicId](https://dom.spec.whatwg.org/#dom-documenttype-publicid)
    /// of a DocumentType node.
    #[must_use]
    pub fn public_id(&self) -> Option<String> {
        self.doctype_field(|data| &data.public_id)
    }

    /// [systemId](https://dom.spec.whatwg.org/#dom-documenttype-systemid)
    /// of a DocumentType node.
    #[must_use]
    pub fn system_id(&self) -> Option<String> {
        self.doctype_field(|data| &data.system_id)
    }

    /// Whether this is an Element node.
    #[must_use]
    pub fn is_element(&self) -> bool {
        self.read(|tree, id| tree.is_element(id))
    }

    /// [tagName](https://dom.spec.whatwg.org/#dom-element-tagname):
    /// upper-cased for HTML elements, `None` for non-elements.
    #[must_use]
    pub fn tag_name(&self) -> Option<String> {
        self.with_element(ElementData::qualified_tag_name)
    }

    /// [localName](https://dom.spec.whatwg.org/#dom-element-localname):
    /// the tag name as stored, without upper-casing.
    #[must_use]
    pub fn local_name(&self) -> Option<String> {
        self.with_element(|element| element.tag_name.clone())
    }

    /// [isSameNode](https://dom.spec.whatwg.org/#dom-node-issamenode)
    #[must_use]
    pub fn is_same_node(&self, other: &Self) -> bool {
        self == other
    }

    /// [isEqualNode](https://dom.spec.whatwg.org/#dom-node-isequalnode):
    /// same kind, name, attributes (in any order), data and equal children.
    #[must_use]
    pub fn is_equal_node(&self, other: &Self) -> bool {
        let (arena, id) = self.resolve();
        let (other_arena, other_id) = other.resolve();
        if Rc::ptr_eq(&arena, &other_arena) {
            let slot = arena.borrow();
            return slot.tree.nodes_equal(id, &slot.tree, other_id);
        }
        let (slot, other_slot) = (arena.borrow(), other_arena.borrow());
        slot.tree.nodes_equal(id, &other_slot.tree, other_id)
    }

    /// [contains](https://dom.spec.whatwg.org/#dom-node-contains): whether
    /// `other` is this node or one of its descendants.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        let (arena, id) = self.resolve();
        let (other_arena, other_id) = other.resolve();
        Rc::ptr_eq(&arena, &other_arena)
            && arena.borrow().tree.is_inclusive_descendant_of(other_id, id)
    }

    // ===================================================================
    // Navigation
    // ===================================================================

    /// [parentNode](https://dom.spec.whatwg.org/#dom-node-parentnode)
    #[must_use]
    pub fn parent_node(&self) -> Option<Self> {
        self.related(DomTree::parent)
    }

    /// [parentElement](https://dom.spec.whatwg.org/#dom-node-parentelement)
    #[must_use]
    pub fn parent_element(&self) -> Option<Self> {
        self.related(DomTree::parent_element)
    }

    /// [childNodes](https://dom.spec.whatwg.org/#dom-node-childnodes), as a
    /// snapshot.
    #[must_use]
    pub fn child_nodes(&self) -> Vec<Self> {
        self.related_all(|tree, id| tree.children(id).to_vec())
    }

    /// [children](https://dom.spec.whatwg.org/#dom-parentnode-children):
    /// element children only, as a snapshot.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.related_all(|tree, id| tree.element_children(id).collect())
    }

    /// [firstChild](https://dom.spec.whatwg.org/#dom-node-firstchild)
    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.related(DomTree::first_child)
    }

    /// [lastChild](https://dom.spec.whatwg.org/#dom-node-lastchild)
    #[must_use]
    pub fn last_child(&self) -> Option<Self> {
        self.related(DomTree::last_child)
    }

    /// [firstElementChild](https://dom.spec.whatwg.org/#dom-parentnode-firstelementchild)
    #[must_use]
    pub fn first_element_child(&self) -> Option<Self> {
        self.related(|tree, id| tree.element_children(id).next())
    }

    /// [lastElementChild](https://dom.spec.whatwg.org/#dom-parentnode-lastelementchild)
    #[must_use]
    pub fn last_element_child(&self) -> Option<Self> {
        self.related(|tree, id| tree.element_children(id).last())
    }

    /// [nextSibling](https://dom.spec.whatwg.org/#dom-node-nextsibling)
    #[must_use]
    pub fn next_sibling(&self) -> Option<Self> {
        self.related(DomTree::next_sibling)
    }

    /// [previousSibling](https://dom.spec.whatwg.org/#dom-node-previoussibling)
    #[must_use]
    pub fn previous_sibling(&self) -> Option<Self> {
        self.related(DomTree::prev_sibling)
    }

    /// [nextElementSibling](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-nextelementsibling)
    #[must_use]
    pub fn next_element_sibling(&self) -> Option<Self> {
        self.related(DomTree::next_element_sibling)
    }

    /// [previousElementSibling](https://dom.spec.whatwg.org/#dom-nondocumenttypechildnode-previouselementsibling)
    #[must_use]
    pub fn previous_element_sibling(&self) -> Option<Self> {
        self.related(DomTree::prev_element_sibling)
    }

    /// [hasChildNodes](https://dom.spec.whatwg.org/#dom-node-haschildnodes)
    #[must_use]
    pub fn has_child_nodes(&self) -> bool {
        self.read(|tree, id| !tree.children(id).is_empty())
    }

    /// [childElementCount](https://dom.spec.whatwg.org/#dom-parentnode-childelementcount)
    #[must_use]
    pub fn child_element_count(&self) -> usize {
        self.read(|tree, id| tree.element_children(id).count())
    }

    /// [getRootNode](https://dom.spec.whatwg.org/#dom-node-getrootnode):
    /// the topmost ancestor, or this node when it has no parent.
    #[must_use]
    pub fn get_root_node(&self) -> Self {
        let (arena, id) = self.resolve();
        let root = arena.borrow().tree.root_of(id);
        Self::new(&arena, root)
    }

    // ===================================================================
    // Attributes
    // ===================================================================

    /// [getAttribute](https://dom.spec.whatwg.org/#dom-element-getattribute)
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.with_element(|element| element.attrs.get(name).map(str::to_string))
            .flatten()
    }

    /// [setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute).
    /// New names on HTML elements are stored lower-cased. No-op on
    /// non-elements.
    ///
    /// # Errors
    ///
    /// [`DomError::InvalidCharacter`] when `name` is not a valid attribute
    /// name. Nothing is stored.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
        ensure_valid_attribute_name(name)?;
        self.store_attribute(name, value);
        Ok(())
    }

    /// `setAttribute` for a name known to be valid.
    pub(crate) fn store_attribute(&self, name: &str, value: &str) {
        let _ = self.with_element_mut(|element| {
            let name = match element.namespace {
                Namespace::Html => name.to_ascii_lowercase(),
                Namespace::Svg | Namespace::MathMl => name.to_string(),
            };
            let _ = element.attrs.set(&name, value);
        });
    }

    /// [removeAttribute](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    pub fn remove_attribute(&self, name: &str) {
        let _ = self.with_element_mut(|element| element.attrs.remove(name));
    }

    /// [hasAttribute](https://dom.spec.whatwg.org/#dom-element-hasattribute)
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.with_element(|element| element.attrs.contains(name))
            .unwrap_or(false)
    }

    /// [hasAttributes](https://dom.spec.whatwg.org/#dom-element-hasattributes)
    #[must_use]
    pub fn has_attributes(&self) -> bool {
        self.with_element(|element| !element.attrs.is_empty())
            .unwrap_or(false)
    }

    /// [getAttributeNames](https://dom.spec.whatwg.org/#dom-element-getattributenames),
    /// in insertion order.
    #[must_use]
    pub fn get_attribute_names(&self) -> Vec<String> {
        self.with_element(|element| element.attrs.names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// [toggleAttribute](https://dom.spec.whatwg.org/#dom-element-toggleattribute)
    ///
    /// With `force` set, the attribute ends up present (`true`) or absent
    /// (`false`) regardless of where it started. Returns whether it is
    /// present afterwards.
    ///
    /// # Errors
    ///
    /// As [`Node::set_attribute`].
    pub fn toggle_attribute(&self, name: &str, force: Option<bool>) -> Result<bool, DomError> {
        ensure_valid_attribute_name(name)?;
        if !self.is_element() {
            return Ok(false);
        }
        let present = self.has_attribute(name);
        let keep = force.unwrap_or(!present);
        match (present, keep) {
            (false, true) => self.store_attribute(name, ""),
            (true, false) => self.remove_attribute(name),
            _ => {}
        }
        Ok(keep)
    }

    /// [id](https://dom.spec.whatwg.org/#dom-element-id); empty when unset.
    #[must_use]
    pub fn id(&self) -> String {
        self.get_attribute("id").unwrap_or_default()
    }

    /// Reflect `id`.
    pub fn set_id(&self, id: &str) {
        self.store_attribute("id", id);
    }

    /// [className](https://dom.spec.whatwg.org/#dom-element-classname);
    /// empty when unset.
    #[must_use]
    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    /// Reflect `class`.
    pub fn set_class_name(&self, class_name: &str) {
        self.store_attribute("class", class_name);
    }

    /// [classList](https://dom.spec.whatwg.org/#dom-element-classlist)
    #[must_use]
    pub fn class_list(&self) -> ClassList {
        ClassList::new(self.clone())
    }

    /// Read `data-*` through its
    /// [dataset](https://html.spec.whatwg.org/multipage/dom.html#dom-dataset)
    /// name: `fooBar` reads `data-foo-bar`.
    #[must_use]
    pub fn dataset_get(&self, name: &str) -> Option<String> {
        self.get_attribute(&dataset_attribute_name(name))
    }

    /// Write `data-*` through its dataset name.
    ///
    /// # Errors
    ///
    /// [`DomError::Syntax`] when `name` contains a `-` followed by a
    /// lower-case ASCII letter, which has no attribute spelling, and
    /// [`DomError::InvalidCharacter`] when the spelled name is not a valid
    /// attribute name.
    pub fn dataset_set(&self, name: &str, value: &str) -> Result<(), DomError> {
        if name
            .as_bytes()
            .windows(2)
            .any(|pair| pair[0] == b'-' && pair[1].is_ascii_lowercase())
        {
            return Err(DomError::Syntax(format!(
                "'{name}' is not a valid dataset name"
            )));
        }
        self.set_attribute(&dataset_attribute_name(name), value)
    }

    /// Remove `data-*` through its dataset name.
    pub fn dataset_remove(&self, name: &str) {
        self.remove_attribute(&dataset_attribute_name(name));
    }
}

/// [valid attribute local name](https://dom.spec.whatwg.org/#valid-attribute-local-name):
/// "its length is at least 1 and it does not contain ASCII whitespace,
/// U+0000 NULL, U+002F (/), U+003D (=), or U+003E (>)."
fn ensure_valid_attribute_name(name: &str) -> Result<(), DomError> {
    let is_invalid = |c: char| c.is_ascii_whitespace() || matches!(c, '\0' | '/' | '=' | '>');
    if name.is_empty() || name.contains(is_invalid) {
        return Err(DomError::InvalidCharacter(format!(
            "'{name}' is not a valid attribute name"
        )));
    }
    Ok(())
}

/// "For each ASCII upper alpha in name, insert a U+002D HYPHEN-MINUS
/// character (-) before the character and replace the character with the
/// same character converted to ASCII lowercase. Insert the string data-
/// at the front of name."
fn dataset_attribute_name(name: &str) -> String {
    let mut attribute = String::from("data-");
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            attribute.push('-');
            attribute.push(c.to_ascii_lowercase());
        } else {
            attribute.push(c);
        }
    }
    attribute
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let (arena, id) = self.resolve();
        let (other_arena, other_id) = other.resolve();
        Rc::ptr_eq(&arena, &other_arena) && id == other_id
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, id) = self.resolve();
        write!(f, "Node({} {})", id.0, self.node_name())
    }
}
