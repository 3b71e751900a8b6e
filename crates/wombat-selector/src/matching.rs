//! [§ 4.1 Selector matching](https://www.w3.org/TR/selectors-4/#match-a-selector-against-an-element)
//!
//! One matcher, [`SelectorList::matches`], backs every query entry point.

use wombat_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SelectorList,
    SimpleSelector,
};

impl SelectorList {
    /// Whether the element `node_id` matches any selector in the list.
    /// Non-element nodes never match.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|selector| selector.matches(tree, node_id))
    }

    /// `querySelector`: the first matching descendant of `scope` in tree
    /// order. `scope` itself is never returned.
    #[must_use]
    pub fn first_match(&self, tree: &DomTree, scope: NodeId) -> Option<NodeId> {
        tree.descendants(scope).find(|&id| self.matches(tree, id))
    }

    /// `querySelectorAll`: every matching descendant of `scope` in tree order.
    #[must_use]
    pub fn all_matches(&self, tree: &DomTree, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .filter(|&id| self.matches(tree, id))
            .collect()
    }

    /// [`closest()`](https://dom.spec.whatwg.org/#dom-element-closest):
    /// "the first (starting at element) inclusive ancestor of element that
    /// matches"
    #[must_use]
    pub fn closest(&self, tree: &DomTree, node_id: NodeId) -> Option<NodeId> {
        std::iter::once(node_id)
            .chain(tree.ancestors(node_id))
            .find(|&id| self.matches(tree, id))
    }
}

impl ComplexSelector {
    /// Match with full DOM tree context.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        self.subject.matches(tree, node_id) && self.matches_combinators(tree, node_id, 0)
    }

    /// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    ///
    /// `current_id` has matched every compound before `index`. Descendant
    /// and subsequent-sibling steps try each candidate in turn, so
    /// `div > p span` still matches when the nearest `p` is not the one
    /// inside the `div`.
    fn matches_combinators(&self, tree: &DomTree, current_id: NodeId, index: usize) -> bool {
        let Some((combinator, compound)) = self.combinators.get(index) else {
            return true;
        };
        let next = |candidate: NodeId| {
            compound.matches(tree, candidate)
                && self.matches_combinators(tree, candidate, index + 1)
        };

        match combinator {
            // "A selector of the form 'A B' represents an element B that is an
            // arbitrary descendant of some ancestor element A."
            Combinator::Descendant => tree.ancestors(current_id).any(next),

            // "A selector of the form 'A > B' represents an element B that is a
            // direct child of element A."
            Combinator::Child => tree.parent(current_id).is_some_and(next),

            // "'A + B' represents an element B that immediately follows
            // element A, where A and B share the same parent."
            Combinator::NextSibling => tree.prev_element_sibling(current_id).is_some_and(next),

            // "'A ~ B' represents an element B that follows element A (not
            // necessarily immediately)"
            Combinator::SubsequentSibling => tree
                .preceding_siblings(current_id)
                .filter(|&sibling| tree.is_element(sibling))
                .any(next),
        }
    }
}

impl CompoundSelector {
    /// All simple selectors match the element.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId) -> bool {
        let Some(element) = tree.as_element(node_id) else {
            return false;
        };
        self.simple_selectors
            .iter()
            .all(|simple| simple.matches(tree, node_id, element))
    }
}

impl SimpleSelector {
    /// Check if this simple selector matches `element`, the data of `node_id`.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node_id: NodeId, element: &ElementData) -> bool {
        match self {
            // "represents an element in the document tree with the same
            // qualified name as the identifier"
            Self::Type(name) => element.tag_name.eq_ignore_ascii_case(name),
            Self::Class(class_name) => element.has_class(class_name),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Universal => true,
            Self::PseudoClass(pseudo) => pseudo.matches(tree, node_id, element),
            Self::Attribute(selector) => selector.matches(element),
        }
    }
}

impl PseudoClass {
    /// Match against an element with full DOM tree context.
    #[must_use]
    pub fn matches(self, tree: &DomTree, node_id: NodeId, element: &ElementData) -> bool {
        let same_type = |id: &NodeId| {
            tree.as_element(*id)
                .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(&element.tag_name))
        };
        match self {
            // "In HTML, this is the <html> element": the element whose
            // parent is the document.
            Self::Root => tree
                .parent(node_id)
                .and_then(|parent| tree.get(parent))
                .is_some_and(|parent| matches!(parent.node_type, NodeType::Document)),

            Self::FirstChild => {
                tree.prev_element_sibling(node_id).is_none() && has_parent(tree, node_id)
            }
            Self::LastChild => {
                tree.next_element_sibling(node_id).is_none() && has_parent(tree, node_id)
            }
            Self::OnlyChild => {
                tree.prev_element_sibling(node_id).is_none()
                    && tree.next_element_sibling(node_id).is_none()
                    && has_parent(tree, node_id)
            }

            Self::FirstOfType => tree.parent(node_id).is_some_and(|parent| {
                tree.children(parent).iter().find(|id| same_type(id)) == Some(&node_id)
            }),
            Self::LastOfType => tree.parent(node_id).is_some_and(|parent| {
                tree.children(parent).iter().rev().find(|id| same_type(id)) == Some(&node_id)
            }),

            // Comments do not count; any text child does, even whitespace.
            Self::Empty => tree.children(node_id).iter().all(|&child| {
                matches!(
                    tree.get(child).map(|n| &n.node_type),
                    Some(NodeType::Comment(_))
                )
            }),
        }
    }
}

fn has_parent(tree: &DomTree, node_id: NodeId) -> bool {
    tree.parent(node_id).is_some()
}

impl AttributeSelector {
    /// Match against an element's attributes. Names are compared
    /// ASCII case-insensitively, values exactly.
    #[must_use]
    pub fn matches(&self, element: &ElementData) -> bool {
        let attrs = &element.attrs;
        match self {
            Self::Exists(name) => attrs.contains(name),
            Self::Equals(name, val) => attrs.get(name) == Some(val.as_str()),
            Self::Includes(name, val) => attrs.get(name).is_some_and(|v| {
                !val.is_empty() && v.split_ascii_whitespace().any(|w| w == val.as_str())
            }),
            Self::DashMatch(name, val) => attrs.get(name).is_some_and(|v| {
                v == val.as_str()
                    || v
                        .strip_prefix(val.as_str())
                        .is_some_and(|rest| rest.starts_with('-'))
            }),
            // "If 'val' is the empty string then the selector does not
            // represent anything."
            Self::PrefixMatch(name, val) => attrs
                .get(name)
                .is_some_and(|v| !val.is_empty() && v.starts_with(val.as_str())),
            Self::SuffixMatch(name, val) => attrs
                .get(name)
                .is_some_and(|v| !val.is_empty() && v.ends_with(val.as_str())),
            Self::SubstringMatch(name, val) => attrs
                .get(name)
                .is_some_and(|v| !val.is_empty() && v.contains(val.as_str())),
        }
    }
}
