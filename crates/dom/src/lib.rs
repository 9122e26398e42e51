//! DOM crate: element tree and path lookup
//!
//! Arena-based element tree built once and queried many times.
//! Parent links are arena indices, so only the child lists own nodes.

pub mod node;
pub mod path;
pub mod tree;

pub use node::*;
pub use path::NodePath;
pub use tree::{Dom, Preorder};
