//! Path-based element lookup.
//!
//! A path is a `/`-separated list of tag names read right to left. The last
//! segment must name the node itself. Each earlier segment is looked up from
//! the node matched so far: a plain segment takes the nearest node with that
//! tag walking up through [`Dom::find_tag_reverse`], which starts at the node
//! itself. A segment followed by one with the `.` direct-child marker must be
//! exactly the parent.
//!
//! | path        | matches                                          |
//! |-------------|--------------------------------------------------|
//! | `""`        | every node                                       |
//! | `h1`        | every `h1`                                       |
//! | `div/h1`    | an `h1` with a `div` somewhere above it          |
//! | `div/.h1`   | an `h1` whose parent is a `div`                  |
//! | `div/div`   | every `div` (the search includes the node)       |
//!
//! Class and id filters compare the whole attribute value; `class="a b"`
//! does not match the class `a`.

use std::convert::Infallible;
use std::str::FromStr;

use crate::node::NodeId;
use crate::tree::Dom;

/// Marks a segment that must be the direct child of the segment before it.
pub const DIRECT_CHILD_MARKER: char = '.';

// ---------------------------------------------------------------------------
// NodePath
// ---------------------------------------------------------------------------

/// What to look for. Empty fields impose no constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodePath {
    pub path: String,
    pub class: String,
    pub id: String,
}

impl NodePath {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// Matches every node.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }
}

impl From<&str> for NodePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl FromStr for NodePath {
    type Err = Infallible;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(path))
    }
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment<'a> {
    tag: &'a str,
    direct: bool,
}

fn segments(path: &str) -> Vec<Segment<'_>> {
    path.split('/')
        .map(|raw| match raw.strip_prefix(DIRECT_CHILD_MARKER) {
            Some(tag) => Segment { tag, direct: true },
            None => Segment {
                tag: raw,
                direct: false,
            },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl Dom {
    /// Nearest node named `tag`, starting at `node` itself and walking up.
    pub fn find_tag_reverse(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&id| self.tag_name(id) == tag)
    }

    /// First node named `tag` in the subtree under `node`, pre-order,
    /// `node` included.
    pub fn find_tag(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        self.preorder(node).find(|&id| self.tag_name(id) == tag)
    }

    /// `true` if `class` is empty or equals the node's `class` attribute.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        class.is_empty() || self.attr(node, "class") == Some(class)
    }

    /// `true` if `id` is empty or equals the node's `id` attribute.
    pub fn has_id(&self, node: NodeId, id: &str) -> bool {
        id.is_empty() || self.attr(node, "id") == Some(id)
    }

    /// Test `node` against a path expression; see the module docs.
    pub fn matches_path(&self, node: NodeId, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }

        let segments = segments(path);
        let mut remaining = segments.as_slice();
        let mut current = node;

        while let Some((last, rest)) = remaining.split_last() {
            if last.tag != self.tag_name(current) {
                return false;
            }
            let Some(next) = rest.last() else {
                return true;
            };

            let step = if last.direct {
                self.parent(current)
            } else {
                self.find_tag_reverse(current, next.tag)
            };
            match step {
                Some(id) => current = id,
                None => return false,
            }
            remaining = rest;
        }
        true
    }

    /// Path, class and id filters combined.
    pub fn matches(&self, node: NodeId, query: &NodePath) -> bool {
        self.matches_path(node, &query.path)
            && self.has_class(node, &query.class)
            && self.has_id(node, &query.id)
    }

    /// First match in pre-order under `node`, `node` included.
    pub fn find_path(&self, node: NodeId, query: &NodePath) -> Option<NodeId> {
        self.preorder(node).find(|&id| self.matches(id, query))
    }

    /// Every match under `node` in document order, `node` included.
    pub fn find_path_all(&self, node: NodeId, query: &NodePath) -> Vec<NodeId> {
        self.preorder(node)
            .filter(|&id| self.matches(id, query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attributes;
    use crate::tree::tests::sample;

    #[test]
    fn segments_split_marker() {
        assert_eq!(
            segments("div/.h1"),
            vec![
                Segment {
                    tag: "div",
                    direct: false
                },
                Segment {
                    tag: "h1",
                    direct: true
                },
            ]
        );
    }

    // -- find_tag / find_tag_reverse -----------------------------------------

    #[test]
    fn find_tag_reverse_includes_self() {
        let s = sample();
        assert_eq!(s.dom.find_tag_reverse(s.h2, "h2"), Some(s.h2));
        assert_eq!(s.dom.find_tag_reverse(s.h2, "body"), Some(s.body));
        assert_eq!(s.dom.find_tag_reverse(s.h2, "head"), None);
    }

    #[test]
    fn find_tag_first_in_preorder() {
        let s = sample();
        assert_eq!(s.dom.find_tag(s.html, "h1"), Some(s.h1_element));
        assert_eq!(s.dom.find_tag(s.body, "body"), Some(s.body));
        assert_eq!(s.dom.find_tag(s.head, "h1"), None);
    }

    // -- matches_path ---------------------------------------------------------

    #[test]
    fn empty_path_matches_anything() {
        let s = sample();
        assert!(s.dom.matches_path(s.html, ""));
        assert!(s.dom.matches_path(s.img, ""));
    }

    #[test]
    fn single_segment_is_tag_test() {
        let s = sample();
        assert!(s.dom.matches_path(s.body, "body"));
        assert!(!s.dom.matches_path(s.body, "div"));
        // A marker on the only segment has nothing to constrain.
        assert!(s.dom.matches_path(s.body, ".body"));
    }

    #[test]
    fn ancestor_segments() {
        let s = sample();
        assert!(s.dom.matches_path(s.h1_element, "div/h1"));
        assert!(s.dom.matches_path(s.h1_element, "html/h1"));
        assert!(s.dom.matches_path(s.h1_element, "html/body/div/h1"));
        assert!(!s.dom.matches_path(s.h1_outer, "div/h1"));
        assert!(!s.dom.matches_path(s.h1_element, "head/h1"));
        // Order matters: body is not above div.
        assert!(!s.dom.matches_path(s.h1_element, "div/body/h1"));
    }

    #[test]
    fn direct_child_marker() {
        let mut dom = Dom::new("div", Attributes::new());
        let section = dom.append_element(dom.root(), "section", Attributes::new());
        let h1 = dom.append_element(section, "h1", Attributes::new());

        assert!(!dom.matches_path(h1, "div/.h1"));
        assert!(dom.matches_path(h1, "div/h1"));
        assert!(dom.matches_path(h1, "section/.h1"));
        assert!(dom.matches_path(h1, "div/.section/.h1"));
        assert!(!dom.matches_path(section, "section/.section"));
    }

    #[test]
    fn direct_marker_on_root_fails() {
        let s = sample();
        assert!(!s.dom.matches_path(s.html, "x/.html"));
    }

    #[test]
    fn repeated_tag_search_starts_at_node() {
        let mut dom = Dom::new("div", Attributes::new());
        let root = dom.root();
        let inner = dom.append_element(root, "div", Attributes::new());
        let p = dom.append_element(inner, "p", Attributes::new());

        assert!(dom.matches_path(inner, "div/div"));
        assert!(dom.matches_path(root, "div/div"));
        assert!(dom.matches_path(root, "div/div/div"));
        assert_eq!(dom.find_path_all(root, &"div/div".into()), vec![root, inner]);

        // The direct marker still needs a real parent.
        assert!(!dom.matches_path(root, "div/.div"));
        assert!(dom.matches_path(inner, "div/.div"));
        assert!(dom.matches_path(p, "div/.div/.p"));
    }

    #[test]
    fn empty_segment_never_matches() {
        let s = sample();
        assert!(!s.dom.matches_path(s.h2, "div//h2"));
        assert!(!s.dom.matches_path(s.h2, "div/"));
    }

    // -- filters --------------------------------------------------------------

    #[test]
    fn class_and_id_exact_match() {
        let mut dom = Dom::new(
            "p",
            Attributes::from_pairs([("class", "intro highlight"), ("id", "first")]),
        );
        let root = dom.root();
        let child = dom.append_element(root, "span", Attributes::new());

        assert!(dom.has_class(root, ""));
        assert!(dom.has_class(root, "intro highlight"));
        assert!(!dom.has_class(root, "intro"));
        assert!(!dom.has_class(child, "intro"));
        assert!(dom.has_id(root, "first"));
        assert!(!dom.has_id(root, "second"));
        assert!(dom.has_id(child, ""));
    }

    // -- find_path / find_path_all --------------------------------------------

    #[test]
    fn find_path_first_match() {
        let s = sample();
        assert_eq!(s.dom.find_path(s.html, &"body".into()), Some(s.body));
        assert_eq!(s.dom.find_path(s.html, &"span".into()), None);
        assert_eq!(s.dom.find_path(s.html, &"h1".into()), Some(s.h1_element));
        assert_eq!(
            s.dom.find_path(s.html, &NodePath::new("h1").with_class("outer")),
            Some(s.h1_outer)
        );
        assert_eq!(
            s.dom.find_path(s.html, &NodePath::any().with_id("main")),
            Some(s.div)
        );
    }

    #[test]
    fn find_path_all_document_order() {
        let s = sample();
        let all = s.dom.find_path_all(s.html, &NodePath::new("div/h1"));
        assert_eq!(all, vec![s.h1_element, s.h1_other]);

        let filtered = s
            .dom
            .find_path_all(s.html, &NodePath::new("div/h1").with_class("element"));
        assert_eq!(filtered, vec![s.h1_element]);

        let by_class = s
            .dom
            .find_path_all(s.html, &NodePath::any().with_class("element"));
        assert_eq!(by_class, vec![s.h1_element, s.img]);

        assert_eq!(s.dom.find_path_all(s.html, &NodePath::any()).len(), s.dom.len());
    }

    #[test]
    fn find_path_all_scoped_to_subtree() {
        let s = sample();
        assert!(s.dom.find_path_all(s.head, &"h1".into()).is_empty());
        assert_eq!(s.dom.find_path_all(s.div, &"h2".into()), vec![s.h2]);
        assert_eq!(s.dom.find_path_all(s.p, &"body/p".into()), vec![s.p]);
    }

    #[test]
    fn lookups_are_repeatable() {
        let s = sample();
        let query = NodePath::new("body/h1");
        let first = s.dom.find_path_all(s.html, &query);
        let second = s.dom.find_path_all(s.html, &query);
        assert_eq!(first, second);
        assert_eq!(first, vec![s.h1_element, s.h1_other, s.h1_outer]);
        assert_eq!(s.dom.find_path(s.html, &query), s.dom.find_path(s.html, &query));
    }

    #[test]
    fn node_path_from_str() {
        let parsed: NodePath = "div/.p".parse().unwrap();
        assert_eq!(parsed, NodePath::new("div/.p"));
        assert!(parsed.class.is_empty() && parsed.id.is_empty());
    }
}
