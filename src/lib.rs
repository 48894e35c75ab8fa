//! Purpose: Render queued flash messages as accessible, severity-styled HTML alerts.
//! Exports: Severity mapping, message model and intake, renderer, escaping, errors.
//! Role: Library backing the `flashmark` CLI; host frameworks call the render functions directly.
//! Invariants: All operations are pure and synchronous; no shared or hidden state.
//! Invariants: Output is safe to embed without further escaping by the host.
pub mod error;
pub mod escape;
pub mod message;
pub mod render;
pub mod severity;

pub use error::{Error, ErrorKind, to_exit_code};
pub use escape::{escape_html, push_escaped};
pub use message::{InputFormat, Message, decode_batch};
pub use render::{RenderOptions, render_all, render_one, render_with, write_all, write_one};
pub use severity::{Presentation, Severity, SeverityPolicy, color_token_for_tag, icon_glyph_for_tag};
