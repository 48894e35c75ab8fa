//! Purpose: Define the immutable flash message record and decode serialized batches of them.
//! Exports: `Message`, `InputFormat`, `decode_batch`.
//! Role: Input boundary between an external message queue and the renderer.
//! Invariants: A `Message` is never mutated after construction; builders consume `self`.
//! Invariants: A batch decodes completely or fails with an `Invalid` error naming the record.
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, ErrorKind};
use crate::severity::{Severity, SeverityPolicy};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    severity: Severity,
    title: Option<String>,
    body: String,
    is_markup: bool,
}

impl Message {
    pub fn new(severity: Severity, body: impl Into<String>) -> Self {
        Self {
            severity,
            title: None,
            body: body.into(),
            is_markup: false,
        }
    }

    pub fn info(body: impl Into<String>) -> Self {
        Self::new(Severity::Info, body)
    }

    pub fn warning(body: impl Into<String>) -> Self {
        Self::new(Severity::Warning, body)
    }

    pub fn danger(body: impl Into<String>) -> Self {
        Self::new(Severity::Danger, body)
    }

    pub fn confirmation(body: impl Into<String>) -> Self {
        Self::new(Severity::Confirmation, body)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Marks the body as trusted markup that is inserted without escaping.
    pub fn with_markup(mut self, is_markup: bool) -> Self {
        self.is_markup = is_markup;
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The title, unless it is absent, empty, or whitespace-only.
    pub fn visible_title(&self) -> Option<&str> {
        self.title().filter(|title| !title.trim().is_empty())
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_markup(&self) -> bool {
        self.is_markup
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InputFormat {
    /// `Json` when the input starts with `[`, otherwise a sequence of
    /// whitespace-separated objects (JSON Lines or pretty-printed).
    #[default]
    Auto,
    Json,
    Jsonl,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default, alias = "type")]
    severity: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, alias = "message")]
    body: Option<String>,
    #[serde(default, alias = "is_html")]
    is_markup: bool,
}

impl WireMessage {
    fn into_message(self, policy: SeverityPolicy) -> Result<Message, Error> {
        let severity = match self.severity {
            Some(Value::String(tag)) => Severity::resolve_tag(&tag, policy)?,
            Some(Value::Number(number)) => {
                let code = severity_code(&number).ok_or_else(|| {
                    Error::new(ErrorKind::Invalid).with_message(format!(
                        "numeric severity `{number}` must be a non-negative integer"
                    ))
                })?;
                Severity::resolve_tag(&code.to_string(), policy)?
            }
            Some(Value::Null) | None => return Err(missing_field("severity")),
            Some(_) => {
                return Err(Error::new(ErrorKind::Invalid)
                    .with_message("field `severity` must be a string or an integer"));
            }
        };
        let body = self.body.ok_or_else(|| missing_field("body"))?;
        Ok(Message {
            severity,
            title: self.title,
            body,
            is_markup: self.is_markup,
        })
    }
}

// Accepts integral floats such as `2.0`, which some serializers emit for integer codes.
fn severity_code(number: &serde_json::Number) -> Option<u64> {
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|value| value.fract() == 0.0 && *value >= 0.0 && *value <= u64::MAX as f64)
            .map(|value| value as u64)
    })
}

fn missing_field(name: &str) -> Error {
    Error::new(ErrorKind::Invalid)
        .with_message(format!("missing required field `{name}`"))
        .with_hint("Each message needs `severity` and `body`; `title` and `is_markup` are optional.")
}

fn decode_record(value: Value, index: usize, policy: SeverityPolicy) -> Result<Message, Error> {
    let wire: WireMessage = serde_json::from_value(value).map_err(|err| {
        Error::new(ErrorKind::Invalid)
            .with_message(format!("malformed message: {err}"))
            .with_index(index)
            .with_source(err)
    })?;
    wire.into_message(policy)
        .map_err(|err| err.with_index(index))
}

/// Decodes a batch of messages, preserving input order.
pub fn decode_batch(
    text: &str,
    format: InputFormat,
    policy: SeverityPolicy,
) -> Result<Vec<Message>, Error> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let messages = match format {
        InputFormat::Auto if trimmed.starts_with('[') => decode_document(text, policy)?,
        InputFormat::Auto => decode_stream(text, policy)?,
        InputFormat::Json => decode_document(text, policy)?,
        InputFormat::Jsonl => decode_lines(text, policy)?,
    };
    tracing::debug!(count = messages.len(), ?format, "decoded message batch");
    Ok(messages)
}

fn decode_document(text: &str, policy: SeverityPolicy) -> Result<Vec<Message>, Error> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Invalid)
            .with_message(format!("input is not valid JSON: {err}"))
            .with_hint("Provide a JSON array of message objects, or use --input jsonl.")
            .with_source(err)
    })?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| decode_record(item, index, policy))
            .collect(),
        Value::Object(_) => Ok(vec![decode_record(value, 0, policy)?]),
        _ => Err(Error::new(ErrorKind::Invalid)
            .with_message("expected a message object or an array of message objects")),
    }
}

/// Decodes whitespace-separated JSON values, so pretty-printed objects work as well as JSONL.
fn decode_stream(text: &str, policy: SeverityPolicy) -> Result<Vec<Message>, Error> {
    let mut messages = Vec::new();
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    loop {
        let consumed = stream.byte_offset();
        let rest = &text[consumed..];
        let value_start = consumed + (rest.len() - rest.trim_start().len());
        let line_no = text[..value_start].matches('\n').count() + 1;
        let index = messages.len();
        let Some(next) = stream.next() else {
            break;
        };
        let value = next.map_err(|err| {
            Error::new(ErrorKind::Invalid)
                .with_message(format!("input is not valid JSON: {err}"))
                .with_index(index)
                .with_line(err.line())
                .with_source(err)
        })?;
        let message = decode_record(value, index, policy).map_err(|err| err.with_line(line_no))?;
        messages.push(message);
    }
    Ok(messages)
}

fn decode_lines(text: &str, policy: SeverityPolicy) -> Result<Vec<Message>, Error> {
    let mut messages = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = line_idx + 1;
        let index = messages.len();
        let value: Value = serde_json::from_str(line).map_err(|err| {
            Error::new(ErrorKind::Invalid)
                .with_message(format!("line is not valid JSON: {err}"))
                .with_index(index)
                .with_line(line_no)
                .with_source(err)
        })?;
        let message = decode_record(value, index, policy).map_err(|err| err.with_line(line_no))?;
        messages.push(message);
    }
    Ok(messages)
}
