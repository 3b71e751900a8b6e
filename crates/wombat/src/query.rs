//! Selector queries and the other lookups that walk a subtree.

use std::rc::Rc;

use wombat_selector::SelectorList;

use crate::{DomError, Node};

impl Node {
    /// [matches](https://dom.spec.whatwg.org/#dom-element-matches)
    ///
    /// # Errors
    ///
    /// [`DomError::InvalidSelector`] when `selector` does not parse.
    pub fn matches(&self, selector: &str) -> Result<bool, DomError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.read(|tree, id| selector.matches(tree, id)))
    }

    /// [querySelector](https://dom.spec.whatwg.org/#dom-parentnode-queryselector):
    /// the first matching descendant in document order.
    ///
    /// # Errors
    ///
    /// [`DomError::InvalidSelector`] when `selector` does not parse.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Self>, DomError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.related(|tree, id| selector.first_match(tree, id)))
    }

    /// [querySelectorAll](https://dom.spec.whatwg.org/#dom-parentnode-queryselectorall):
    /// a snapshot of every matching descendant in document order.
    ///
    /// # Errors
    ///
    /// [`DomError::InvalidSelector`] when `selector` does not parse.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Self>, DomError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.related_all(|tree, id| selector.all_matches(tree, id)))
    }

    /// [closest](https://dom.spec.whatwg.org/#dom-element-closest): this
    /// element or the nearest ancestor that matches.
    ///
    /// # Errors
    ///
    /// [`DomError::InvalidSelector`] when `selector` does not parse.
    pub fn closest(&self, selector: &str) -> Result<Option<Self>, DomError> {
        let selector = SelectorList::parse(selector)?;
        Ok(self.related(|tree, id| selector.closest(tree, id)))
    }

    /// [getElementsByTagName](https://dom.spec.whatwg.org/#dom-document-getelementsbytagname):
    /// descendants whose tag name matches ASCII case-insensitively, or all
    /// descendant elements for `*`.
    #[must_use]
    pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<Self> {
        self.related_all(|tree, id| {
            tree.descendants(id)
                .filter(|&descendant| {
                    tree.tag_name(descendant)
                        .is_some_and(|tag| name == "*" || tag.eq_ignore_ascii_case(name))
                })
                .collect()
        })
    }

    /// [getElementsByClassName](https://dom.spec.whatwg.org/#dom-document-getelementsbyclassname):
    /// descendants carrying every class in the whitespace-separated
    /// `class_names`. An empty list matches nothing.
    #[must_use]
    pub fn get_elements_by_class_name(&self, class_names: &str) -> Vec<Self> {
        let wanted: Vec<&str> = class_names.split_ascii_whitespace().collect();
        if wanted.is_empty() {
            return Vec::new();
        }
        self.related_all(|tree, id| {
            tree.descendants(id)
                .filter(|&descendant| {
                    tree.as_element(descendant)
                        .is_some_and(|element| wanted.iter().all(|class| element.has_class(class)))
                })
                .collect()
        })
    }

    /// [compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition):
    /// where `other` sits relative to this node, as
    /// [`wombat_dom::document_position`] flags.
    #[must_use]
    pub fn compare_document_position(&self, other: &Self) -> u16 {
        use wombat_dom::document_position::{
            DISCONNECTED, FOLLOWING, IMPLEMENTATION_SPECIFIC, PRECEDING,
        };

        let (arena, this) = self.resolve();
        let (other_arena, other) = other.resolve();
        if Rc::ptr_eq(&arena, &other_arena) {
            return arena.borrow().tree.compare_document_position(this, other);
        }
        // Separate arenas share no root; order them by address.
        let direction = if Rc::as_ptr(&other_arena) < Rc::as_ptr(&arena) {
            PRECEDING
        } else {
            FOLLOWING
        };
        DISCONNECTED | IMPLEMENTATION_SPECIFIC | direction
    }
}
