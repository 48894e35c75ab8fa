//! Purpose: Assemble flash messages into Bootstrap-style alert markup.
//! Exports: `RenderOptions`, `render_one`, `render_all`, `render_with`, `write_one`, `write_all`.
//! Role: Pure formatter; the only place alert structure and escaping decisions live.
//! Invariants: Titles are always escaped; bodies are escaped unless flagged as markup.
//! Invariants: Batch output is the in-order concatenation of per-message fragments.
//! Invariants: No hidden state; identical inputs give identical output.
use askama::Template;

use crate::message::Message;

const SVG_OPEN: &str = concat!(
    r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="24px" height="24px" viewBox="0 0 24 24" version="1.1">"#,
    r#"<g stroke="none" stroke-width="1" fill="none" fill-rule="evenodd">"#,
    r#"<rect x="0" y="0" width="24" height="24" />"#,
);
const SVG_CLOSE: &str = "</g></svg></span></div>";
const TEXT_OPEN: &str = r#"<div class="alert-text font-weight-bold">"#;

// Title and body of one alert; `html` escaping applies to every `{{ }}` without `|safe`.
#[derive(Template)]
#[template(
    source = r#"
{%- if let Some(title) = title -%}
<strong>{{ title }}</strong>{{ " " }}
{%- endif -%}
{%- if is_markup -%}
{{ body|safe }}
{%- else -%}
{{ body }}
{%- endif -%}
"#,
    ext = "html"
)]
struct AlertText<'a> {
    title: Option<&'a str>,
    body: &'a str,
    is_markup: bool,
}

const DISMISS_BLOCK: &str = concat!(
    r#"<div class="alert-close">"#,
    r#"<button type="button" class="close" data-dismiss="alert" aria-label="Close">"#,
    r#"<span aria-hidden="true"><i class="ki ki-close"></i></span>"#,
    "</button>",
    "</div>",
);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderOptions {
    /// Append a close control to each alert.
    pub dismissable: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { dismissable: true }
    }
}

impl RenderOptions {
    pub fn dismissable(dismissable: bool) -> Self {
        Self { dismissable }
    }
}

pub fn render_one(message: &Message, dismissable: bool) -> String {
    let mut out = String::with_capacity(1024 + message.body().len());
    write_one(&mut out, message, dismissable);
    out
}

pub fn render_all(messages: &[Message], dismissable: bool) -> String {
    let mut out = String::new();
    write_all(&mut out, messages, dismissable);
    out
}

pub fn render_with(messages: &[Message], options: &RenderOptions) -> String {
    render_all(messages, options.dismissable)
}

pub fn write_all(out: &mut String, messages: &[Message], dismissable: bool) {
    for message in messages {
        write_one(out, message, dismissable);
    }
    tracing::trace!(count = messages.len(), dismissable, "rendered flash messages");
}

/// Appends one alert. A fragment is written whole or not at all.
pub fn write_one(out: &mut String, message: &Message, dismissable: bool) {
    let start = out.len();
    let presentation = message.severity().presentation();
    let token = presentation.color_token;

    out.push_str(r#"<div class="alert alert-custom alert-notice alert-light-"#);
    out.push_str(token);
    out.push_str(r#" fade show" role="alert">"#);

    out.push_str(r#"<div class="alert-icon"><span class="svg-icon svg-icon-3x svg-icon-"#);
    out.push_str(token);
    out.push_str(r#"">"#);
    out.push_str(SVG_OPEN);
    out.push_str(presentation.icon_glyph);
    out.push_str(SVG_CLOSE);

    out.push_str(TEXT_OPEN);
    let text = AlertText {
        title: message.visible_title(),
        body: message.body(),
        is_markup: message.is_markup(),
    };
    if let Err(err) = text.render_into(out) {
        out.truncate(start);
        tracing::error!(%err, severity = %message.severity(), "failed to render alert text");
        return;
    }
    out.push_str("</div>");

    if dismissable {
        out.push_str(DISMISS_BLOCK);
    }
    out.push_str("</div>");
}

#[cfg(test)]
mod tests {
    use super::{
        DISMISS_BLOCK, RenderOptions, TEXT_OPEN, render_all, render_one, render_with, write_one,
    };
    use crate::escape::escape_html;
    use crate::escape::tests::unescape;
    use crate::message::Message;
    use crate::severity::Severity;

    #[test]
    fn danger_alert_matches_expected_markup() {
        let message = Message::danger("Save failed").with_title("Oops");
        let html = render_one(&message, true);

        let expected = [
            r#"<div class="alert alert-custom alert-notice alert-light-danger fade show" role="alert">"#,
            r#"<div class="alert-icon"><span class="svg-icon svg-icon-3x svg-icon-danger">"#,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="24px" height="24px" viewBox="0 0 24 24" version="1.1">"#,
            r#"<g stroke="none" stroke-width="1" fill="none" fill-rule="evenodd">"#,
            r#"<rect x="0" y="0" width="24" height="24" />"#,
            Severity::Danger.icon_glyph(),
            "</g></svg></span></div>",
            r#"<div class="alert-text font-weight-bold"><strong>Oops</strong> Save failed</div>"#,
            r#"<div class="alert-close"><button type="button" class="close" data-dismiss="alert" aria-label="Close">"#,
            r#"<span aria-hidden="true"><i class="ki ki-close"></i></span></button></div>"#,
            "</div>",
        ]
        .concat();
        assert_eq!(html, expected);
    }

    #[test]
    fn markup_confirmation_without_title_or_close() {
        let message = Message::confirmation("<em>Saved!</em>")
            .with_title("")
            .with_markup(true);
        let html = render_one(&message, false);

        assert!(html.contains("alert-light-success"));
        assert!(html.contains("svg-icon-success"));
        assert!(html.contains(r#"<div class="alert-text font-weight-bold"><em>Saved!</em></div>"#));
        assert!(!html.contains("<strong>"));
        assert!(!html.contains("alert-close"));
        assert!(html.ends_with("</div></div>"));
    }

    #[test]
    fn title_is_escaped_even_for_markup_bodies() {
        let message = Message::warning("<i>ok</i>")
            .with_title("<b>x</b>")
            .with_markup(true);
        let html = render_one(&message, true);
        assert!(!html.contains("<b>"));
        let expected = format!("<strong>{}</strong> <i>ok</i>", escape_html("<b>x</b>"));
        assert!(html.contains(&expected));
    }

    #[test]
    fn plain_body_is_escaped() {
        let body = r#"<script>alert("x" & 'y')</script>"#;
        let html = render_one(&Message::info(body), false);
        assert!(!html.contains("<script>"));

        let start = html.find(TEXT_OPEN).expect("text block") + TEXT_OPEN.len();
        let end = start + html[start..].find("</div>").expect("text block end");
        let text = &html[start..end];
        assert!(!text.contains(['<', '>', '"', '\'']));
        assert_eq!(unescape(text), body);
    }

    #[test]
    fn markup_flag_does_not_leak_into_title() {
        let plain = render_one(&Message::danger("b").with_title("A & B"), false);
        let markup = render_one(&Message::danger("b").with_title("A & B").with_markup(true), false);
        assert_eq!(plain, markup);
        assert!(!plain.contains("A & B"));
    }

    #[test]
    fn empty_body_renders_empty_text_block() {
        let html = render_one(&Message::info(""), false);
        assert!(html.contains(r#"<div class="alert-text font-weight-bold"></div>"#));
    }

    #[test]
    fn batch_is_in_order_concatenation() {
        let first = Message::danger("one");
        let second = Message::warning("two").with_title("T");
        let batch = [first.clone(), second.clone()];

        for dismissable in [true, false] {
            let expected = render_one(&first, dismissable) + &render_one(&second, dismissable);
            assert_eq!(render_all(&batch, dismissable), expected);
            assert_eq!(render_all(&batch, dismissable), render_all(&batch, dismissable));
        }
        assert_eq!(render_all(&[], true), "");
    }

    #[test]
    fn dismiss_control_appears_once_per_message() {
        let batch = vec![Message::info("a"), Message::danger("b"), Message::warning("c")];
        let html = render_all(&batch, true);
        assert_eq!(html.matches(DISMISS_BLOCK).count(), 3);
        assert_eq!(render_all(&batch, false).matches("alert-close").count(), 0);
    }

    #[test]
    fn options_default_to_dismissable() {
        let batch = [Message::info("a")];
        assert!(RenderOptions::default().dismissable);
        assert_eq!(
            render_with(&batch, &RenderOptions::default()),
            render_all(&batch, true)
        );
        assert_eq!(
            render_with(&batch, &RenderOptions::dismissable(false)),
            render_all(&batch, false)
        );
    }

    #[test]
    fn write_one_appends_to_existing_buffer() {
        let mut out = String::from("<section>");
        write_one(&mut out, &Message::info("a"), false);
        assert!(out.starts_with("<section><div class=\"alert "));
        assert_eq!(out.len(), "<section>".len() + render_one(&Message::info("a"), false).len());
    }
}
