//! Ordered attribute storage for elements.

/// [§ 4.9.2 Interface NamedNodeMap](https://dom.spec.whatwg.org/#interface-namednodemap)
///
/// "An element has an associated attribute list"
///
/// A list of `(name, value)` pairs kept in insertion order. Names are unique
/// and matched ASCII case-insensitively; lookups never change the stored
/// spelling, so foreign attributes such as `viewBox` keep their case.
///
/// Equality ignores order: two maps are equal when they hold the same set
/// of name/value pairs.
#[derive(Debug, Clone, Default)]
pub struct AttributesMap {
    entries: Vec<(String, String)>,
}

impl AttributesMap {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    /// [§ 4.9 get an attribute by name](https://dom.spec.whatwg.org/#concept-element-attributes-get-by-name)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    /// Whether an attribute with this name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// [§ 4.9 set an attribute value](https://dom.spec.whatwg.org/#concept-element-attributes-set-value)
    ///
    /// "If attribute is null, create an attribute ... then append this
    /// attribute to element. ... Change attribute to value."
    ///
    /// Existing attributes keep their position; new ones go last.
    /// Returns the previous value, if any.
    pub fn set(&mut self, name: &str, value: &str) -> Option<String> {
        if let Some(i) = self.position(name) {
            return Some(std::mem::replace(&mut self.entries[i].1, value.to_string()));
        }
        self.entries.push((name.to_string(), value.to_string()));
        None
    }

    /// Append an attribute only when no attribute of that name exists.
    ///
    /// Returns `true` if the attribute was added.
    pub fn insert_if_absent(&mut self, name: &str, value: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.entries.push((name.to_string(), value.to_string()));
        true
    }

    /// [§ 4.9 remove an attribute by name](https://dom.spec.whatwg.org/#concept-element-attributes-remove-by-name)
    ///
    /// Returns the removed value, if any.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.entries.remove(i).1)
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for AttributesMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl Eq for AttributesMap {}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for AttributesMap {
    /// Later duplicates of a name are dropped, matching the tokenizer's
    /// duplicate-attribute rule.
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            let _ = map.insert_if_absent(&name.into(), &value.into());
        }
        map
    }
}
