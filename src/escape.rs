//! Purpose: Encode untrusted text for safe insertion into HTML element content.
//! Exports: `escape_html`, `push_escaped`.
//! Role: Thin wrapper over askama's HTML escaper for callers outside a template.
//! Invariants: Output never contains a raw `&`, `<`, `>`, `"`, or `'` from the input.
//! Invariants: Returns a borrow when nothing needs encoding.
use std::borrow::Cow;

use askama::Template;

const SPECIALS: [char; 5] = ['&', '<', '>', '"', '\''];

#[derive(Template)]
#[template(source = "{{ text }}", ext = "html")]
struct EscapedText<'a> {
    text: &'a str,
}

pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(SPECIALS) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    push_escaped(&mut out, text);
    Cow::Owned(out)
}

/// Appends the escaped form of `text`; on a writer failure nothing is appended.
pub fn push_escaped(out: &mut String, text: &str) {
    let start = out.len();
    if let Err(err) = (EscapedText { text }).render_into(out) {
        out.truncate(start);
        tracing::error!(%err, "failed to escape text");
    }
}
