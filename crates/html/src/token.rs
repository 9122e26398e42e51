//! HTML token types produced by the tokenizer.

/// A single token emitted by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    /// A `<!DOCTYPE …>` token.
    Doctype { name: Option<String> },
    /// A start tag like `<div class="x">`.
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    /// A tag closed in place, like `<img src="x"/>`.
    SelfClosingTag {
        name: String,
        attrs: Vec<(String, String)>,
    },
    /// An end tag like `</div>`.
    EndTag { name: String },
    /// A run of text content.
    Text(String),
    /// A comment like `<!-- text -->`.
    Comment(String),
    /// End of input, or the input could not be read any further.
    EOF,
}

impl HtmlToken {
    /// Shorthand for a start tag without attributes.
    pub fn start(name: &str) -> Self {
        Self::StartTag {
            name: name.to_string(),
            attrs: Vec::new(),
        }
    }

    /// Shorthand for a self-closing tag without attributes.
    pub fn self_closing(name: &str) -> Self {
        Self::SelfClosingTag {
            name: name.to_string(),
            attrs: Vec::new(),
        }
    }

    pub fn end(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
        }
    }

    pub fn text(data: &str) -> Self {
        Self::Text(data.to_string())
    }
}
