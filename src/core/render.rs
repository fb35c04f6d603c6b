//! Rendered views of a log entry
//!
//! Three views exist, each computed at most once per entry:
//! - line: fixed-width columns followed by message, error and properties
//! - list: one `Label       : value` line per non-blank field
//! - JSON: an object with a fixed key set
//!
//! Column widths live in an immutable [`RenderConfig`] built once and
//! shared by every entry of a provider.

use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use serde::{Deserialize, Serialize};

/// `yyyy-MM-dd HH:mm:ss.fff`, always UTC
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Column widths of the single-line view, in characters.
///
/// | column    | default |
/// |-----------|---------|
/// | Id        | 40      |
/// | TimeStamp | 24      |
/// | Host      | 24      |
/// | Actor     | 24      |
/// | Level     | 12      |
/// | EventId   | 14      |
/// | Category  | 92      |
/// | Scope     | 64      |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineLayout {
    pub id: usize,
    pub timestamp: usize,
    pub host: usize,
    pub actor: usize,
    pub level: usize,
    pub event_id: usize,
    pub category: usize,
    pub scope: usize,
}

impl LineLayout {
    pub fn total_width(&self) -> usize {
        self.id
            + self.timestamp
            + self.host
            + self.actor
            + self.level
            + self.event_id
            + self.category
            + self.scope
    }

    pub fn validate(&self) -> Result<()> {
        let columns = [
            ("Id", self.id),
            ("TimeStamp", self.timestamp),
            ("Host", self.host),
            ("Actor", self.actor),
            ("Level", self.level),
            ("EventId", self.event_id),
            ("Category", self.category),
            ("Scope", self.scope),
        ];
        match columns.iter().find(|(_, width)| *width == 0) {
            Some((name, _)) => Err(LoggerError::config(
                "LineLayout",
                format!("column '{}' must be at least one character wide", name),
            )),
            None => Ok(()),
        }
    }
}

impl Default for LineLayout {
    fn default() -> Self {
        Self {
            id: 40,
            timestamp: 24,
            host: 24,
            actor: 24,
            level: 12,
            event_id: 14,
            category: 92,
            scope: 64,
        }
    }
}

/// Immutable rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    layout: LineLayout,
    list_label_width: usize,
    header: String,
}

pub const DEFAULT_LIST_LABEL_WIDTH: usize = 12;

impl RenderConfig {
    pub fn try_new(layout: LineLayout, list_label_width: usize) -> Result<Self> {
        layout.validate()?;
        Ok(Self::build(layout, list_label_width))
    }

    fn build(layout: LineLayout, list_label_width: usize) -> Self {
        let header = [
            pad_column("Id", layout.id),
            pad_column("TimeStamp", layout.timestamp),
            pad_column("Host", layout.host),
            pad_column("Actor", layout.actor),
            pad_column("Level", layout.level),
            pad_column("EventId", layout.event_id),
            pad_column("Category", layout.category),
            pad_column("Scope", layout.scope),
            "Text".to_string(),
        ]
        .concat();

        Self {
            layout,
            list_label_width,
            header,
        }
    }

    pub fn layout(&self) -> &LineLayout {
        &self.layout
    }

    pub fn list_label_width(&self) -> usize {
        self.list_label_width
    }

    /// Column titles aligned with [`LogEntry::as_line`]
    pub fn header_line(&self) -> &str {
        &self.header
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::build(LineLayout::default(), DEFAULT_LIST_LABEL_WIDTH)
    }
}

/// Truncate or space-pad `value` to exactly `width` characters
pub fn pad_column(value: &str, width: usize) -> String {
    format!("{:<width$.width$}", value, width = width)
}

/// Replace every line break (`\r\n`, `\n`, `\r`) with a single space
pub fn strip_line_breaks(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Fixed-shape JSON view of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EntryJson {
    pub id: String,
    pub time_stamp: String,
    pub level: String,
    pub category: String,
    pub scope: String,
    pub event_id: String,
    pub host: String,
    pub user: String,
    pub text: String,
    pub stack: String,
    pub properties: String,
}

impl EntryJson {
    pub(crate) fn from_entry(entry: &LogEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            time_stamp: entry.timestamp_text(),
            level: entry.level().to_string(),
            category: entry.category().to_string(),
            scope: entry.scope_text().to_string(),
            event_id: entry.event_id().to_string(),
            host: entry.host().to_string(),
            user: entry.actor().to_string(),
            text: entry.message().to_string(),
            stack: entry
                .exception()
                .map(|e| e.full_text().to_string())
                .unwrap_or_default(),
            properties: entry
                .state_properties()
                .map(|p| p.to_lines())
                .unwrap_or_default(),
        }
    }
}

pub(crate) fn render_line(entry: &LogEntry) -> String {
    let layout = entry.render_config().layout();
    let mut line = String::with_capacity(layout.total_width() + entry.message().len() + 16);

    line.push_str(&pad_column(&entry.id().to_string(), layout.id));
    line.push_str(&pad_column(&entry.timestamp_text(), layout.timestamp));
    line.push_str(&pad_column(entry.host(), layout.host));
    line.push_str(&pad_column(entry.actor(), layout.actor));
    line.push_str(&pad_column(entry.level().to_str(), layout.level));
    line.push_str(&pad_column(&entry.event_id().to_string(), layout.event_id));
    line.push_str(&pad_column(entry.category(), layout.category));
    line.push_str(&pad_column(entry.scope_text(), layout.scope));
    line.push_str(&strip_line_breaks(entry.message()));

    if let Some(exception) = entry.exception() {
        line.push(' ');
        line.push_str(&strip_line_breaks(exception.full_text()));
    }

    if let Some(properties) = entry.state_properties().filter(|p| !p.is_empty()) {
        line.push_str(" - Properties: ");
        line.push_str(&strip_line_breaks(&properties.join(", ")));
    }

    line
}

pub(crate) fn render_list(entry: &LogEntry) -> String {
    let width = entry.render_config().list_label_width();
    let stack = entry
        .exception()
        .map(|e| e.full_text().to_string())
        .unwrap_or_default();
    let properties = entry
        .state_properties()
        .map(|p| p.to_lines())
        .unwrap_or_default();

    let fields: [(&str, String); 11] = [
        ("Id", entry.id().to_string()),
        ("TimeStamp", entry.timestamp_text()),
        ("Level", entry.level().to_string()),
        ("Category", entry.category().to_string()),
        ("Scope", entry.scope_text().to_string()),
        ("EventId", entry.event_id().to_string()),
        ("Host", entry.host().to_string()),
        ("Actor", entry.actor().to_string()),
        ("Text", entry.message().to_string()),
        ("Stack", stack),
        ("Properties", properties),
    ];

    fields
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(name, value)| format!("{:<width$}: {}", name, value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
