//! Shared arenas behind the node handles.
//!
//! Every [`Node`] holds an `Rc` to the arena it was created in. When an
//! edit joins nodes from two arenas, the arena of the node being moved is
//! absorbed into the destination's with [`DomTree::absorb`] and left behind
//! as a forwarding entry, so handles minted before the merge keep resolving
//! to the same node.
//!
//! Each handle also holds a pin for its node. After an edit, [`collect`]
//! frees the detached subtrees no pin reaches.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wombat_common::ParseOptions;
use wombat_dom::{DomTree, NodeId, Relocation};
use wombat_html::HtmlSerializer;

use crate::Node;

pub(crate) type Arena = Rc<RefCell<ArenaSlot>>;

/// Shared by every handle to one node; the arena keeps a weak reference.
pub(crate) type Pin = Rc<()>;

/// One arena, or the forwarding address it was merged into.
#[derive(Debug)]
pub(crate) struct ArenaSlot {
    pub(crate) tree: DomTree,
    /// Options used when a setter re-enters the parser.
    pub(crate) options: ParseOptions,
    pins: HashMap<NodeId, Weak<()>>,
    /// Set once this arena has been absorbed: the target arena and where
    /// each node went.
    forward: Option<(Arena, Rc<Relocation>)>,
}

impl ArenaSlot {
    pub(crate) fn new(tree: DomTree, options: ParseOptions) -> Arena {
        Rc::new(RefCell::new(Self {
            tree,
            options,
            pins: HashMap::new(),
            forward: None,
        }))
    }

    pub(crate) const fn serializer(&self) -> HtmlSerializer {
        HtmlSerializer {
            scripting: self.options.scripting,
        }
    }

    /// The pin for `id`, shared with any live handle to it.
    pub(crate) fn pin(&mut self, id: NodeId) -> Pin {
        if let Some(pin) = self.pins.get(&id).and_then(Weak::upgrade) {
            return pin;
        }
        let pin = Rc::new(());
        let _ = self.pins.insert(id, Rc::downgrade(&pin));
        pin
    }
}

/// Follow forwarding entries until the arena that owns `id` now.
pub(crate) fn resolve(arena: &Arena, id: NodeId) -> (Arena, NodeId) {
    let mut arena = Rc::clone(arena);
    let mut id = id;
    loop {
        let next = arena
            .borrow()
            .forward
            .as_ref()
            .map(|(target, relocation)| (Rc::clone(target), relocation.get(id)));
        match next {
            Some((target, moved)) => {
                arena = target;
                id = moved.unwrap_or(id);
            }
            None => return (arena, id),
        }
    }
}

/// Bring `a` and `b` into one arena, merging `b`'s arena into `a`'s when
/// they differ. Returns the shared arena and both ids within it.
pub(crate) fn unify(a: &Node, b: &Node) -> (Arena, NodeId, NodeId) {
    let (arena, a_id) = a.resolve();
    let (other, b_id) = b.resolve();
    if Rc::ptr_eq(&arena, &other) {
        return (arena, a_id, b_id);
    }

    let (absorbed, pins) = {
        let mut other_slot = other.borrow_mut();
        (
            std::mem::take(&mut other_slot.tree),
            std::mem::take(&mut other_slot.pins),
        )
    };
    let relocation = {
        let mut slot = arena.borrow_mut();
        let relocation = slot.tree.absorb(absorbed);
        slot.pins.extend(
            pins.into_iter()
                .filter_map(|(id, pin)| relocation.get(id).map(|moved| (moved, pin))),
        );
        relocation
    };
    let b_id = relocation.get(b_id).unwrap_or(b_id);
    other.borrow_mut().forward = Some((Rc::clone(&arena), Rc::new(relocation)));
    (arena, a_id, b_id)
}

/// Free every detached subtree of `arena` that no handle can reach.
pub(crate) fn collect(arena: &Arena) {
    let mut slot = arena.borrow_mut();
    let ArenaSlot { tree, pins, .. } = &mut *slot;
    let reclaimed = tree.sweep(|id| pins.get(&id).is_some_and(|pin| pin.strong_count() > 0));
    for id in reclaimed {
        let _ = pins.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::{DomError, DomParser};

    fn same_arena(a: &crate::Node, b: &crate::Node) -> bool {
        Rc::ptr_eq(&a.resolve().0, &b.resolve().0)
    }

    fn arena_len(node: &crate::Node) -> usize {
        node.resolve().0.borrow().tree.len()
    }

    fn arena_capacity(node: &crate::Node) -> usize {
        node.resolve().0.borrow().tree.capacity()
    }

    #[test]
    fn test_repeated_inner_html_does_not_grow_the_arena() {
        let document = DomParser::new()
            .parse_from_string("<div id=a></div>", "text/html")
            .unwrap();
        let a = document.get_element_by_id("a").unwrap();
        a.set_inner_html("<span>x</span>");
        let settled = arena_len(&a);

        for _ in 0..1000 {
            a.set_inner_html("<span>x</span>");
        }

        assert_eq!(arena_len(&a), settled);
        assert!(arena_capacity(&a) <= settled + 8);
        assert_eq!(a.inner_html(), "<span>x</span>");
    }

    #[test]
    fn test_held_handles_keep_removed_nodes_alive() {
        let document = DomParser::new()
            .parse_from_string("<p><b>kept</b></p><i>dropped</i>", "text/html")
            .unwrap();
        let b = document.query_selector("b").unwrap().unwrap();
        let p = document.query_selector("p").unwrap().unwrap();
        let before = arena_len(&document);

        p.remove();
        drop(p);
        let i = document.query_selector("i").unwrap().unwrap();
        i.remove();
        drop(i);
        document.body().unwrap().normalize();

        // `b` still reaches `p` through its parent, so only `i` and its
        // text are freed.
        assert_eq!(arena_len(&document), before - 2);
        assert_eq!(b.parent_node().unwrap().outer_html(), "<p><b>kept</b></p>");
    }

    #[test]
    fn test_dropped_detached_nodes_are_freed_on_the_next_edit() {
        let document = DomParser::new().parse_from_string("", "text/html").unwrap();
        let before = arena_len(&document);
        for _ in 0..10 {
            let div = document.create_element("div");
            div.set_text_content("scratch");
        }
        document.body().unwrap().set_text_content("");
        assert_eq!(arena_len(&document), before + 1);
    }

    #[test]
    fn test_rejected_edits_do_not_merge_arenas() {
        let parser = DomParser::new();
        let target = parser.parse_from_string("<p>x</p>", "text/html").unwrap();
        let source = parser.parse_from_string("<i>y</i>", "text/html").unwrap();
        let html = source.document_element().unwrap();

        assert!(matches!(
            target.append_child(&html),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            target.adopt_node(&source),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            target.import_node(&source, true),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(!same_arena(&target, &source));
    }

    #[test]
    fn test_compare_document_position_does_not_merge_arenas() {
        let parser = DomParser::new();
        let a = parser.parse_from_string("", "text/html").unwrap();
        let b = parser.parse_from_string("", "text/html").unwrap();

        let forward = a.compare_document_position(&b);
        assert_eq!(forward, a.compare_document_position(&b));
        assert_ne!(forward, b.compare_document_position(&a));
        assert!(!same_arena(&a, &b));
    }

    #[test]
    fn test_rejected_adjacent_text_allocates_nothing() {
        let document = DomParser::new().parse_from_string("", "text/html").unwrap();
        let html = document.document_element().unwrap();
        let before = arena_len(&document);

        for _ in 0..10 {
            assert!(html.insert_adjacent_text("beforebegin", "t").is_err());
        }
        assert_eq!(arena_len(&document), before);
    }
}
