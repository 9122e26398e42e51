//! DOM node model.
//!
//! All nodes live in an `Arena<Node>` and are referenced by `NodeId`.
//! A node owns its ordered child list; the `parent` link is a plain index and
//! never keeps anything alive.

/// A handle into the arena that uniquely identifies a DOM node.
pub type NodeId = arena::Index<Node>;

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A single attribute on an element (e.g. `class="foo"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// Attribute map of an element.
///
/// Keys are unique. Built from the ordered pairs of a tag; when a key repeats
/// the later value wins but the key keeps its first position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attr>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse ordered `(name, value)` pairs into a map, last write wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut attrs = Self::new();
        for (name, value) in pairs {
            attrs.insert(name, value);
        }
        attrs
    }

    /// Set `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.entries.push(Attr { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attr> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attr;
    type IntoIter = std::slice::Iter<'a, Attr>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single element in the tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub tag_name: String,
    pub attributes: Attributes,

    // -- tree links ----------------------------------------------------------
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    /// Create a node with no children.
    pub fn new(tag_name: &str, attributes: Attributes, parent: Option<NodeId>) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attributes,
            parent,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// The raw `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// The raw `class` attribute, not split into tokens.
    pub fn class(&self) -> Option<&str> {
        self.attr("class")
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
