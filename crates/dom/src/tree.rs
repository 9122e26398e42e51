//! DOM tree operations.
//!
//! The [`Dom`] struct owns an `Arena<Node>` plus the id of the root element and
//! provides the methods that keep parent links and child lists consistent.
//! Traversals use explicit stacks so arbitrarily deep documents are fine.

use std::fmt::Write as _;

use arena::Arena;

use crate::node::{Attributes, Node, NodeId};

// ---------------------------------------------------------------------------
// Dom
// ---------------------------------------------------------------------------

/// A built element tree. Always has a root.
#[derive(Debug)]
pub struct Dom {
    pub nodes: Arena<Node>,
    root: NodeId,
}

impl Dom {
    /// Create a tree consisting only of its root element.
    pub fn new(tag_name: &str, attributes: Attributes) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.allocate(Node::new(tag_name, attributes, None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the tree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    // =======================================================================
    // Construction
    // =======================================================================

    /// Create an element as the last child of `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attributes: Attributes,
    ) -> NodeId {
        let child = self
            .nodes
            .allocate(Node::new(tag_name, attributes, Some(parent)));
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(child);
        }
        child
    }

    // =======================================================================
    // Accessors
    // =======================================================================

    /// Tag name of `node`, or "" for an id from another tree.
    pub fn tag_name(&self, node: NodeId) -> &str {
        self.nodes
            .get(node)
            .map(|n| n.tag_name.as_str())
            .unwrap_or_default()
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node).and_then(|n| n.attr(name))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Immediate children of `node` in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    // =======================================================================
    // Traversal
    // =======================================================================

    /// Ancestors of `node`, nearest first, ending at the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&id| self.parent(id))
    }

    /// `node` followed by all of its descendants in pre-order.
    pub fn preorder(&self, node: NodeId) -> Preorder<'_> {
        Preorder {
            dom: self,
            stack: if self.nodes.contains(node) {
                vec![node]
            } else {
                Vec::new()
            },
        }
    }

    /// All descendants of `node` in pre-order, excluding `node` itself.
    pub fn flatten_children(&self, node: NodeId) -> Vec<NodeId> {
        self.preorder(node).skip(1).collect()
    }

    // =======================================================================
    // Diagnostics
    // =======================================================================

    /// The `/`-prefixed chain of tag names from the root down to `node`,
    /// e.g. `/html/body/p`.
    pub fn compute_path(&self, node: NodeId) -> String {
        let mut chain: Vec<&str> = self.ancestors(node).map(|id| self.tag_name(id)).collect();
        chain.reverse();
        chain.push(self.tag_name(node));

        let mut path = String::new();
        for tag in chain {
            path.push('/');
            path.push_str(tag);
        }
        path
    }

    /// Render the subtree under `node` as indented text.
    ///
    /// Each node is written as `fill` repeated `indent` times followed by its
    /// tag name. A node with children repeats its tag name after them, at the
    /// same indentation, as a closing line.
    pub fn structure(&self, node: NodeId, indent: usize, fill: &str) -> String {
        enum Step {
            Open(NodeId, usize),
            Close(NodeId, usize),
        }

        let mut out = String::new();
        let mut stack = vec![Step::Open(node, indent)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id, depth) => {
                    let _ = writeln!(out, "{}{}", fill.repeat(depth), self.tag_name(id));
                    let children = self.children(id);
                    if !children.is_empty() {
                        stack.push(Step::Close(id, depth));
                        for &child in children.iter().rev() {
                            stack.push(Step::Open(child, depth + 1));
                        }
                    }
                }
                Step::Close(id, depth) => {
                    let _ = writeln!(out, "{}{}", fill.repeat(depth), self.tag_name(id));
                }
            }
        }
        out
    }

    /// Print [`structure`](Dom::structure) to stdout.
    pub fn print_structure(&self, node: NodeId, indent: usize, fill: &str) {
        print!("{}", self.structure(node, indent, fill));
    }
}

// ---------------------------------------------------------------------------
// Preorder iterator
// ---------------------------------------------------------------------------

/// Depth-first pre-order walk; see [`Dom::preorder`].
pub struct Preorder<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Push children in reverse so the first child is processed first.
        self.stack.extend(self.dom.children(id).iter().rev());
        Some(id)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
