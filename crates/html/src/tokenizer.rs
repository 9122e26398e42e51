//! Lazy HTML tokenizer.
//!
//! Wraps the html5ever tokenizer state machine and turns its callbacks into
//! an iterator of [`HtmlToken`]s. Input is pulled from a reader in chunks, so
//! a network body is tokenized while it arrives. The iterator always ends with
//! exactly one [`HtmlToken::EOF`]; a read failure also ends the stream there
//! and is kept for [`Tokenizer::take_error`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read};

use html5ever::TokenizerResult;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, TokenizerOpts,
};
use tracing::{trace, warn};

use crate::token::HtmlToken;

/// Bytes read from the source per refill.
pub const CHUNK_SIZE: usize = 8 * 1024;

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// Collects converted tokens until the iterator hands them out.
#[derive(Default)]
struct Sink {
    tokens: RefCell<VecDeque<HtmlToken>>,
}

impl Sink {
    fn push(&self, token: HtmlToken) {
        self.tokens.borrow_mut().push_back(token);
    }

    fn pop(&self) -> Option<HtmlToken> {
        self.tokens.borrow_mut().pop_front()
    }
}

/// Content model switch for elements whose body is not markup.
fn raw_kind(name: &str) -> Option<TokenSinkResult<()>> {
    match name {
        "script" => Some(TokenSinkResult::RawData(RawKind::ScriptData)),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            Some(TokenSinkResult::RawData(RawKind::Rawtext))
        }
        "title" | "textarea" => Some(TokenSinkResult::RawData(RawKind::Rcdata)),
        "plaintext" => Some(TokenSinkResult::Plaintext),
        _ => None,
    }
}

fn convert_tag(tag: Tag) -> (HtmlToken, TokenSinkResult<()>) {
    let name = tag.name.to_string();
    // Repeated attribute names were already dropped here, first one kept.
    let attrs: Vec<(String, String)> = tag
        .attrs
        .into_iter()
        .map(|a| (a.name.local.to_string(), a.value.to_string()))
        .collect();

    match tag.kind {
        TagKind::EndTag => (HtmlToken::EndTag { name }, TokenSinkResult::Continue),
        TagKind::StartTag if tag.self_closing => (
            HtmlToken::SelfClosingTag { name, attrs },
            TokenSinkResult::Continue,
        ),
        TagKind::StartTag => {
            let next = raw_kind(&name).unwrap_or(TokenSinkResult::Continue);
            (HtmlToken::StartTag { name, attrs }, next)
        }
    }
}

impl TokenSink for Sink {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => {
                let (token, next) = convert_tag(tag);
                self.push(token);
                return next;
            }
            Token::CharacterTokens(text) => self.push(HtmlToken::Text(text.to_string())),
            Token::CommentToken(text) => self.push(HtmlToken::Comment(text.to_string())),
            Token::DoctypeToken(doctype) => self.push(HtmlToken::Doctype {
                name: doctype.name.map(|n| n.to_string()),
            }),
            Token::EOFToken => self.push(HtmlToken::EOF),
            Token::ParseError(msg) => trace!(%msg, "tokenizer recovered from malformed markup"),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// HTML tokenizer over any byte source. Iterate it until [`HtmlToken::EOF`].
pub struct Tokenizer<R> {
    reader: Option<R>,
    inner: html5ever::tokenizer::Tokenizer<Sink>,
    input: BufferQueue,
    /// Bytes of a UTF-8 sequence split across two reads.
    pending: Vec<u8>,
    error: Option<io::Error>,
    finished: bool,
}

impl<'a> Tokenizer<&'a [u8]> {
    /// Create a new tokenizer for the given HTML source string.
    pub fn new(input: &'a str) -> Self {
        Self::from_reader(input.as_bytes())
    }
}

impl<R: Read> Tokenizer<R> {
    /// Tokenize UTF-8 markup read from `reader`. Invalid sequences become
    /// U+FFFD.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: Some(reader),
            inner: html5ever::tokenizer::Tokenizer::new(Sink::default(), TokenizerOpts::default()),
            input: BufferQueue::default(),
            pending: Vec::new(),
            error: None,
            finished: false,
        }
    }

    /// The read error that cut the stream short, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Read one chunk and run it through the state machine.
    fn pump(&mut self) {
        let Some(reader) = self.reader.as_mut() else {
            self.finish();
            return;
        };

        let mut chunk = [0u8; CHUNK_SIZE];
        match reader.read(&mut chunk) {
            Ok(0) => self.finish(),
            Ok(n) => {
                self.pending.extend_from_slice(&chunk[..n]);
                let text = decode_utf8(&mut self.pending);
                self.feed(text);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!(error = %e, "markup stream failed, ending token stream early");
                self.error = Some(e);
                self.finish();
            }
        }
    }

    fn feed(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.input.push_back(StrTendril::from(text));
        // A script pause leaves input queued; keep feeding until it drains.
        while let TokenizerResult::Script(()) = self.inner.feed(&self.input) {
            trace!("tokenizer paused at a script boundary");
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.reader = None;
        if !self.pending.is_empty() {
            // Truncated multi-byte sequence at end of input.
            self.pending.clear();
            self.feed(char::REPLACEMENT_CHARACTER.to_string());
        }
        self.inner.end();
        self.finished = true;
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = HtmlToken;

    fn next(&mut self) -> Option<HtmlToken> {
        loop {
            if let Some(token) = self.inner.sink.pop() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            self.pump();
        }
    }
}

/// Decode as much of `buf` as possible, leaving an incomplete trailing
/// sequence in place for the next read.
fn decode_utf8(buf: &mut Vec<u8>) -> String {
    let mut out = String::with_capacity(buf.len());
    let mut start = 0;
    loop {
        match std::str::from_utf8(&buf[start..]) {
            Ok(rest) => {
                out.push_str(rest);
                start = buf.len();
                break;
            }
            Err(e) => {
                let valid = start + e.valid_up_to();
                out.push_str(&String::from_utf8_lossy(&buf[start..valid]));
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        start = valid + len;
                    }
                    None => {
                        start = valid;
                        break;
                    }
                }
            }
        }
    }
    buf.drain(..start);
    out
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Tokens without the trailing EOF, with adjacent text runs merged.
    fn tokenize(input: &str) -> Vec<HtmlToken> {
        let mut tokens: Vec<HtmlToken> = Vec::new();
        for tok in Tokenizer::new(input) {
            if tok == HtmlToken::EOF {
                break;
            }
            if let (Some(HtmlToken::Text(prev)), HtmlToken::Text(more)) = (tokens.last_mut(), &tok)
            {
                prev.push_str(more);
                continue;
            }
            tokens.push(tok);
        }
        tokens
    }

    #[test]
    fn simple_tag() {
        assert_eq!(tokenize("<div>"), vec![HtmlToken::start("div")]);
    }

    #[test]
    fn end_tag() {
        assert_eq!(tokenize("</div>"), vec![HtmlToken::end("div")]);
    }

    #[test]
    fn self_closing_tag() {
        assert_eq!(tokenize("<br/>"), vec![HtmlToken::self_closing("br")]);
        // Without the slash it is an ordinary start tag.
        assert_eq!(tokenize("<br>"), vec![HtmlToken::start("br")]);
    }

    #[test]
    fn tag_with_attributes() {
        assert_eq!(
            tokenize(r#"<a href="url" class='link' data-x=1>"#),
            vec![HtmlToken::StartTag {
                name: "a".into(),
                attrs: vec![
                    ("href".into(), "url".into()),
                    ("class".into(), "link".into()),
                    ("data-x".into(), "1".into()),
                ],
            }]
        );
    }

    #[test]
    fn self_closing_with_attr() {
        assert_eq!(
            tokenize(r#"<img class="element"/>"#),
            vec![HtmlToken::SelfClosingTag {
                name: "img".into(),
                attrs: vec![("class".into(), "element".into())],
            }]
        );
    }

    #[test]
    fn uppercase_tag_lowered() {
        assert_eq!(
            tokenize("<DIV></Div>"),
            vec![HtmlToken::start("div"), HtmlToken::end("div")]
        );
    }

    #[test]
    fn text_comment_doctype() {
        assert_eq!(
            tokenize("<!DOCTYPE html><!-- note --><p>Hi</p>"),
            vec![
                HtmlToken::Doctype {
                    name: Some("html".into())
                },
                HtmlToken::Comment(" note ".into()),
                HtmlToken::start("p"),
                HtmlToken::text("Hi"),
                HtmlToken::end("p"),
            ]
        );
    }

    #[test]
    fn input_after_scripts_is_drained() {
        assert_eq!(
            tokenize("<script>a</script><p>b</p><script>c</script><i>"),
            vec![
                HtmlToken::start("script"),
                HtmlToken::text("a"),
                HtmlToken::end("script"),
                HtmlToken::start("p"),
                HtmlToken::text("b"),
                HtmlToken::end("p"),
                HtmlToken::start("script"),
                HtmlToken::text("c"),
                HtmlToken::end("script"),
                HtmlToken::start("i"),
            ]
        );
    }

    #[test]
    fn script_body_is_text() {
        assert_eq!(
            tokenize("<script>if (a<b) {}</script>"),
            vec![
                HtmlToken::start("script"),
                HtmlToken::text("if (a<b) {}"),
                HtmlToken::end("script"),
            ]
        );
    }

    #[test]
    fn exactly_one_eof() {
        let tokens: Vec<HtmlToken> = Tokenizer::new("<p>x</p>").collect();
        assert_eq!(tokens.last(), Some(&HtmlToken::EOF));
        assert_eq!(tokens.iter().filter(|t| **t == HtmlToken::EOF).count(), 1);

        let empty: Vec<HtmlToken> = Tokenizer::new("").collect();
        assert_eq!(empty, vec![HtmlToken::EOF]);
    }

    #[test]
    fn input_larger_than_one_chunk() {
        let markup = "<li>item</li>".repeat(CHUNK_SIZE / 4);
        let starts = tokenize(&markup)
            .into_iter()
            .filter(|t| matches!(t, HtmlToken::StartTag { .. }))
            .count();
        assert_eq!(starts, CHUNK_SIZE / 4);
    }

    #[test]
    fn decode_keeps_split_sequence() {
        let bytes = "é".as_bytes();
        let mut buf = vec![b'a', bytes[0]];
        assert_eq!(decode_utf8(&mut buf), "a");
        assert_eq!(buf, vec![bytes[0]]);

        buf.push(bytes[1]);
        assert_eq!(decode_utf8(&mut buf), "é");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_replaces_invalid_bytes() {
        let mut buf = vec![b'a', 0xff, b'b'];
        assert_eq!(decode_utf8(&mut buf), "a\u{FFFD}b");
        assert!(buf.is_empty());
    }

    /// A reader that yields some bytes and then fails.
    struct Broken<'a>(&'a [u8]);

    impl Read for Broken<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            let n = self.0.read(buf)?;
            Ok(n)
        }
    }

    #[test]
    fn read_error_ends_stream_and_is_kept() {
        let mut tokenizer = Tokenizer::from_reader(Broken(b"<div><p>"));
        let tokens: Vec<HtmlToken> = tokenizer.by_ref().collect();
        assert_eq!(
            tokens,
            vec![HtmlToken::start("div"), HtmlToken::start("p"), HtmlToken::EOF]
        );
        let err = tokenizer.take_error().expect("error should be kept");
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(tokenizer.take_error().is_none());
    }
}
