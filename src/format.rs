//! Canonical text rendering of values.
//!
//! [`format`] turns a [`Value`] into text plus a [`Presentation`] hint and a quoting
//! flag. It never fails: containers that cannot be rendered structurally fall back to
//! their plain textual form.
//!
//! [`format_pair`] and [`format_one`] decide how one or two formatted values are laid out
//! inside a failure message.

use tracing::trace;

use crate::value::{format_temporal, Value};

/// Indentation prefixed to every line of a block-rendered value.
pub const BLOCK_INDENT: &str = "    ";

/// How a value is laid out inside a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Inline, on the same line as the surrounding text.
    Compact,
    /// On its own lines, indented.
    Block,
}

/// The canonical rendering of one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub presentation: Presentation,
    pub quoted: bool,
}

impl Formatted {
    fn compact(text: impl Into<String>, quoted: bool) -> Self {
        Self {
            text: text.into(),
            presentation: Presentation::Compact,
            quoted,
        }
    }

    fn block(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            presentation: Presentation::Block,
            quoted: false,
        }
    }

    /// Text with quotes applied when the value asks for them.
    pub fn delimited(&self) -> String {
        quote(&self.text, self.quoted)
    }

    fn is_block(&self) -> bool {
        self.presentation == Presentation::Block || self.text.contains('\n')
    }
}

/// Formats a value. Rules are applied in priority order; the first match wins.
///
/// # Examples
///
/// ```rust
/// use expecto::format::{format, Presentation};
/// use expecto::Value;
///
/// let f = format(&Value::from("foo"));
/// assert_eq!((f.text.as_str(), f.quoted), ("foo", true));
///
/// let f = format(&Value::from(vec!["a", "b"]));
/// assert_eq!(f.text, "- a\n- b");
/// assert_eq!(f.presentation, Presentation::Block);
/// ```
pub fn format(value: &Value) -> Formatted {
    match value {
        v if v.is_absent() && !matches!(v, Value::Reference(_)) => Formatted::compact("nil", false),
        Value::Bool(_) | Value::Int(_) | Value::Uint(_) | Value::Float32(_) | Value::Float(_) => {
            Formatted::compact(value.to_string(), false)
        }
        Value::Text(s) => Formatted::compact(s.clone(), true),
        Value::Temporal(t) => Formatted::compact(format_temporal(t), false),
        Value::Error(Some(message)) => Formatted::compact(message.clone(), true),
        Value::Reference(None) => Formatted::compact("<nil>", false),
        Value::Reference(Some(inner)) => format(inner),
        Value::Bytes(_)
        | Value::Sequence(_)
        | Value::Mapping(_)
        | Value::Queue(_)
        | Value::Record(_) => format_structured(value),
        _ => Formatted::compact(value.to_string(), false),
    }
}

/// Structured YAML rendering of a container. Map and record keys come out sorted.
pub fn structured_text(value: &Value) -> Result<String, serde_yaml::Error> {
    let mut text = serde_yaml::to_string(value)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

fn format_structured(value: &Value) -> Formatted {
    match structured_text(value) {
        Ok(text) => Formatted::block(text),
        Err(e) => {
            trace!(error = %e, kind = value.type_name(), "structured rendering failed, using plain form");
            Formatted::compact(value.to_string(), false)
        }
    }
}

/// Lays out an expected/actual pair. If either side needs a block, both get one so the
/// two renderings line up; compact texts come back already quoted.
pub fn format_pair(expected: &Value, actual: &Value) -> (String, String, Presentation) {
    let e = format(expected);
    let a = format(actual);

    if e.is_block() || a.is_block() {
        return (e.text, a.text, Presentation::Block);
    }

    (e.delimited(), a.delimited(), Presentation::Compact)
}

/// Lays out a single value for a message.
pub fn format_one(value: &Value) -> (String, Presentation) {
    let f = format(value);
    if f.is_block() {
        return (f.text, Presentation::Block);
    }
    (f.delimited(), Presentation::Compact)
}

/// Indents every line of a block rendering; compact text is returned unchanged.
pub fn indent(text: &str, presentation: Presentation) -> String {
    match presentation {
        Presentation::Compact => text.to_string(),
        Presentation::Block => text
            .split('\n')
            .map(|line| format!("{}{}", BLOCK_INDENT, line))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Wraps text in single quotes when `quoted` is set.
pub fn quote(text: &str, quoted: bool) -> String {
    if quoted {
        format!("'{}'", text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_string_promotes_pair_to_block() {
        let (e, a, p) = format_pair(&Value::from("a\nb"), &Value::from("x"));
        assert_eq!(p, Presentation::Block);
        assert_eq!(e, "a\nb");
        assert_eq!(a, "x");
    }

    #[test]
    fn indent_prefixes_each_line() {
        assert_eq!(indent("a\nb", Presentation::Block), "    a\n    b");
        assert_eq!(indent("a", Presentation::Compact), "a");
    }
}
