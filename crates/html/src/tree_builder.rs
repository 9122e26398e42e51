//! HTML tree builder. Constructs a [`Dom`] from a stream of [`HtmlToken`]s.
//!
//! A forgiving algorithm, not the WHATWG one. A single cursor
//! points at the innermost open element:
//!
//! - a start tag opens a child of the cursor and moves the cursor into it;
//! - a self-closing tag adds a leaf under the cursor and leaves it in place;
//! - an end tag closes the nearest open element with that name (the cursor
//!   or one of its ancestors), moving the cursor to that element's parent.
//!
//! Input that does not fit is dropped rather than repaired: a stray end tag
//! with no matching open element, a self-closing tag with nothing open, and
//! anything that starts after the root element has been closed.

use dom::node::{Attributes, NodeId};
use dom::Dom;
use tracing::debug;

use crate::token::HtmlToken;

// ---------------------------------------------------------------------------
// Tree builder
// ---------------------------------------------------------------------------

/// Builds a DOM tree from HTML tokens.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    dom: Option<Dom>,
    cursor: Option<NodeId>,
}

impl TreeBuilder {
    /// Create a new tree builder with no root yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tree built so far, if a start tag has been seen.
    pub fn dom(&self) -> Option<&Dom> {
        self.dom.as_ref()
    }

    /// The innermost open element.
    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Give up the tree. `None` if no start tag was ever processed.
    pub fn finish(self) -> Option<Dom> {
        self.dom
    }

    // =======================================================================
    // Token processing: main dispatch
    // =======================================================================

    /// Process a single token. Text, comments, doctypes and EOF carry no
    /// structure and leave the tree unchanged.
    pub fn process_token(&mut self, token: HtmlToken) {
        match token {
            HtmlToken::StartTag { name, attrs } => self.start_tag(&name, attrs),
            HtmlToken::SelfClosingTag { name, attrs } => self.self_closing_tag(&name, attrs),
            HtmlToken::EndTag { name } => self.end_tag(&name),
            HtmlToken::Text(_)
            | HtmlToken::Comment(_)
            | HtmlToken::Doctype { .. }
            | HtmlToken::EOF => {}
        }
    }

    fn start_tag(&mut self, name: &str, attrs: Vec<(String, String)>) {
        let attributes = Attributes::from_pairs(attrs);
        match (&mut self.dom, self.cursor) {
            (None, _) => {
                let dom = Dom::new(name, attributes);
                self.cursor = Some(dom.root());
                self.dom = Some(dom);
            }
            (Some(dom), Some(parent)) => {
                self.cursor = Some(dom.append_element(parent, name, attributes));
            }
            (Some(_), None) => {
                debug!(tag = name, "ignoring start tag after the root element closed");
            }
        }
    }

    fn self_closing_tag(&mut self, name: &str, attrs: Vec<(String, String)>) {
        match (&mut self.dom, self.cursor) {
            (Some(dom), Some(parent)) => {
                dom.append_element(parent, name, Attributes::from_pairs(attrs));
            }
            _ => debug!(tag = name, "ignoring self-closing tag with no open element"),
        }
    }

    fn end_tag(&mut self, name: &str) {
        let (Some(dom), Some(cursor)) = (&self.dom, self.cursor) else {
            debug!(tag = name, "ignoring end tag with no open element");
            return;
        };
        match dom.find_tag_reverse(cursor, name) {
            Some(open) => self.cursor = dom.parent(open),
            None => debug!(tag = name, "ignoring stray end tag"),
        }
    }
}

// ===========================================================================
// Public convenience function
// ===========================================================================

/// Build a tree from `tokens`, stopping at the first [`HtmlToken::EOF`].
///
/// Returns `None` when the stream ends before any start tag.
pub fn build<I>(tokens: I) -> Option<Dom>
where
    I: IntoIterator<Item = HtmlToken>,
{
    let mut builder = TreeBuilder::new();
    for token in tokens {
        if token == HtmlToken::EOF {
            break;
        }
        builder.process_token(token);
    }
    builder.finish()
}

// ===========================================================================
// Tests
// ===========================================================================
