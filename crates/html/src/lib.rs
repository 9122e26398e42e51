//! HTML parser crate: tokenizer and tree builder.
//!
//! Turns markup into a [`dom::Dom`]. Tokenizing is delegated to html5ever's
//! tokenizer; tree construction is a small cursor algorithm that tolerates
//! malformed nesting instead of repairing it.

use std::io::{self, Read};

use dom::Dom;

pub mod token;
pub mod tokenizer;
pub mod tree_builder;

pub use token::HtmlToken;
pub use tokenizer::Tokenizer;
pub use tree_builder::{TreeBuilder, build};

/// Failure to obtain the markup itself. Malformed markup is never an error.
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("failed to read markup: {0}")]
    Io(#[from] io::Error),
}

/// Convenience function: parse an HTML string into a DOM tree.
///
/// A tag that repeats an attribute keeps the **first** value: the tokenizer
/// drops later duplicates before the tree builder sees them. Token streams
/// passed to [`build`] directly keep the last value instead.
///
/// ```
/// let dom = html::parse("<p>Hello</p>").unwrap();
/// assert_eq!(dom.tag_name(dom.root()), "p");
/// ```
pub fn parse(html: &str) -> Option<Dom> {
    build(Tokenizer::new(html))
}

/// Parse markup pulled from `reader` as it is tokenized. Duplicate
/// attributes resolve as in [`parse`].
///
/// A read failure is reported even if part of a tree was already built.
pub fn parse_reader<R: Read>(reader: R) -> Result<Option<Dom>, HtmlError> {
    let mut tokenizer = Tokenizer::from_reader(reader);
    let dom = build(tokenizer.by_ref());
    match tokenizer.take_error() {
        Some(e) => Err(e.into()),
        None => Ok(dom),
    }
}
