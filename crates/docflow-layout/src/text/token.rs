//! Tokenizer for wrap input.
//!
//! A token is a maximal run of non-whitespace characters. `[[url label]]` hyperlink spans are
//! atomic: whitespace inside a span never ends the token, and the span's markup is kept
//! verbatim in [`Token::source`] so wrapped lines reproduce the input exactly. The visible text
//! (what a renderer draws, and what gets measured) substitutes the link label for the markup.
//!
//! An opening `[[` with no matching `]]` is ordinary text.

use serde::Serialize;

pub const LINK_OPEN: &str = "[[";
pub const LINK_CLOSE: &str = "]]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Original text including any link markup.
    pub source: String,
    /// Text as rendered: link spans are replaced by their label.
    pub visible: String,
    /// Whether the token contains at least one `[[...]]` span.
    pub protected: bool,
}

#[derive(Debug, Default)]
struct TokenBuilder {
    source: String,
    visible: String,
    protected: bool,
}

impl TokenBuilder {
    fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    fn push_char(&mut self, ch: char) {
        self.source.push(ch);
        self.visible.push(ch);
    }

    fn push_link(&mut self, markup: &str, inner: &str) {
        self.source.push_str(markup);
        self.visible.push_str(link_visible_text(inner));
        self.protected = true;
    }

    fn finish(&mut self) -> Token {
        let b = std::mem::take(self);
        Token {
            source: b.source,
            visible: b.visible,
            protected: b.protected,
        }
    }
}

/// Splits the inside of a `[[...]]` span into `(url, label)`.
pub fn split_link(inner: &str) -> (&str, &str) {
    let inner = inner.trim();
    match inner.find(char::is_whitespace) {
        Some(idx) => (&inner[..idx], inner[idx..].trim()),
        None => (inner, ""),
    }
}

fn link_visible_text(inner: &str) -> &str {
    let (url, label) = split_link(inner);
    if label.is_empty() { url } else { label }
}

pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut cur = TokenBuilder::default();
    let mut i = 0usize;

    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(LINK_OPEN) {
            let body = &rest[LINK_OPEN.len()..];
            if let Some(end) = body.find(LINK_CLOSE) {
                let span_len = LINK_OPEN.len() + end + LINK_CLOSE.len();
                cur.push_link(&rest[..span_len], &body[..end]);
                i += span_len;
                continue;
            }
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        if ch.is_whitespace() {
            if !cur.is_empty() {
                tokens.push(cur.finish());
            }
        } else {
            cur.push_char(ch);
        }
        i += ch.len_utf8();
    }

    if !cur.is_empty() {
        tokens.push(cur.finish());
    }
    tokens
}
