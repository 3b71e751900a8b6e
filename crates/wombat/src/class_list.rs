//! [§ 7.1 Interface DOMTokenList](https://dom.spec.whatwg.org/#interface-domtokenlist)
//! over the `class` attribute.

use crate::Node;

/// A live view of an element's classes. Every method reads or rewrites the
/// `class` attribute, so edits through the handle and through
/// [`Node::set_class_name`] see each other.
#[derive(Debug, Clone)]
pub struct ClassList {
    element: Node,
}

impl ClassList {
    pub(crate) const fn new(element: Node) -> Self {
        Self { element }
    }

    /// The element whose classes this list views.
    #[must_use]
    pub const fn element(&self) -> &Node {
        &self.element
    }

    /// The classes in order, without duplicates.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        let class = self.element.class_name();
        let mut items: Vec<String> = Vec::new();
        for token in class.split_ascii_whitespace() {
            if !items.iter().any(|item| item == token) {
                items.push(token.to_string());
            }
        }
        items
    }

    /// Number of distinct classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether there are no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// [contains](https://dom.spec.whatwg.org/#dom-domtokenlist-contains)
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.items().iter().any(|item| item == token)
    }

    /// [add](https://dom.spec.whatwg.org/#dom-domtokenlist-add): append
    /// `token` unless present.
    pub fn add(&self, token: &str) {
        let mut items = self.items();
        if !items.iter().any(|item| item == token) {
            items.push(token.to_string());
        }
        self.write(&items);
    }

    /// [remove](https://dom.spec.whatwg.org/#dom-domtokenlist-remove)
    pub fn remove(&self, token: &str) {
        let mut items = self.items();
        items.retain(|item| item != token);
        self.write(&items);
    }

    /// [toggle](https://dom.spec.whatwg.org/#dom-domtokenlist-toggle):
    /// with `force`, add (`true`) or remove (`false`) regardless. Returns
    /// whether `token` is present afterwards.
    pub fn toggle(&self, token: &str, force: Option<bool>) -> bool {
        let keep = force.unwrap_or(!self.contains(token));
        if keep {
            self.add(token);
        } else {
            self.remove(token);
        }
        keep
    }

    /// "the update steps": serialize the ordered set back into `class`.
    fn write(&self, items: &[String]) {
        if !self.element.has_attribute("class") && items.is_empty() {
            return;
        }
        self.element.store_attribute("class", &items.join(" "));
    }
}
