//! Log call state
//!
//! A log call carries either plain text or a message template with ordered
//! properties. The caller picks the variant through the typed entry points
//! on [`Logger`](super::Logger); nothing is inspected at runtime.

use super::properties::{FieldValue, Properties};

#[derive(Debug, Clone, PartialEq)]
pub enum LogState {
    /// Free text, used verbatim as the message
    PlainText(String),
    /// `"Hello {Name}"` style template plus the values it refers to
    Template {
        template: String,
        properties: Properties,
    },
}

impl LogState {
    pub fn text(text: impl Into<String>) -> Self {
        LogState::PlainText(text.into())
    }

    pub fn template(template: impl Into<String>, properties: Properties) -> Self {
        LogState::Template {
            template: template.into(),
            properties,
        }
    }

    /// Structured properties, present only for template state
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            LogState::PlainText(_) => None,
            LogState::Template { properties, .. } => Some(properties),
        }
    }

    /// Verbatim text, present only for plain-text state
    pub fn plain_text(&self) -> Option<&str> {
        match self {
            LogState::PlainText(text) => Some(text),
            LogState::Template { .. } => None,
        }
    }

    /// String form of the state.
    ///
    /// Templates have their placeholders substituted; a template-less
    /// structured state renders as `k1 = v1, k2 = v2`.
    pub fn render_message(&self) -> String {
        match self {
            LogState::PlainText(text) => text.clone(),
            LogState::Template {
                template,
                properties,
            } if template.is_empty() => properties.join(", "),
            LogState::Template {
                template,
                properties,
            } => render_template(template, properties),
        }
    }
}

impl Default for LogState {
    fn default() -> Self {
        LogState::PlainText(String::new())
    }
}

impl From<&str> for LogState {
    fn from(text: &str) -> Self {
        LogState::text(text)
    }
}

impl From<String> for LogState {
    fn from(text: String) -> Self {
        LogState::PlainText(text)
    }
}

/// Substitute `{Name}` placeholders.
///
/// `{{` and `}}` are literal braces. Alignment or format suffixes
/// (`{Name,10}`, `{Name:x}`) are accepted and ignored. Placeholders without
/// a matching property, and unterminated ones, are kept verbatim.
pub fn render_template(template: &str, properties: &Properties) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '{' => match template[start + 1..].find('}') {
                Some(len) => {
                    let hole = &template[start + 1..start + 1 + len];
                    let name = hole
                        .split([',', ':'])
                        .next()
                        .unwrap_or("")
                        .trim_start_matches(['@', '$'])
                        .trim();
                    match properties.get(name) {
                        Some(value) => push_value(&mut out, value),
                        None => {
                            out.push('{');
                            out.push_str(hole);
                            out.push('}');
                        }
                    }
                    let close = start + 1 + len;
                    while let Some((idx, _)) = chars.peek() {
                        if *idx > close {
                            break;
                        }
                        chars.next();
                    }
                }
                None => {
                    out.push_str(&template[start..]);
                    break;
                }
            },
            other => out.push(other),
        }
    }

    out
}

fn push_value(out: &mut String, value: &FieldValue) {
    use std::fmt::Write;
    let _ = write!(out, "{}", value);
}
