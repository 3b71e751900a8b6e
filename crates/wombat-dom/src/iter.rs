//! Tree-walking iterators over a [`DomTree`].

use crate::{DomTree, NodeId};

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl<'a> AncestorIterator<'a> {
    pub(crate) const fn new(tree: &'a DomTree, start: Option<NodeId>) -> Self {
        Self {
            tree,
            current: start,
        }
    }
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl<'a> PrecedingSiblingIterator<'a> {
    pub(crate) const fn new(tree: &'a DomTree, start: Option<NodeId>) -> Self {
        Self {
            tree,
            current: start,
        }
    }
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// [§ 4.2.1 tree order](https://dom.spec.whatwg.org/#concept-tree-order)
///
/// "preorder, depth-first traversal of a tree"
///
/// Walks the subtree below a root without allocating, using the sibling
/// links to climb back up.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: Option<NodeId>,
}

impl<'a> DescendantIterator<'a> {
    pub(crate) fn new(tree: &'a DomTree, root: NodeId) -> Self {
        Self {
            tree,
            root,
            next: tree.first_child(root),
        }
    }
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.first_child(current).or_else(|| {
            let mut node = current;
            loop {
                if node == self.root {
                    return None;
                }
                if let Some(sibling) = self.tree.next_sibling(node) {
                    return Some(sibling);
                }
                node = self.tree.parent(node)?;
            }
        });
        Some(current)
    }
}
