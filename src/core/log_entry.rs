//! Log entry structure
//!
//! A [`LogEntry`] is the immutable snapshot of one enabled logging call.
//! Everything is fixed at construction; the rendered views are computed
//! lazily on first read and cached for the lifetime of the entry, so every
//! sink sharing an `Arc<LogEntry>` sees byte-identical output.

use super::event_id::EventId;
use super::exception::ExceptionInfo;
use super::identity::ProcessIdentity;
use super::log_level::LogLevel;
use super::properties::Properties;
use super::render::{self, EntryJson, RenderConfig, TIMESTAMP_FORMAT};
use super::scope::{current_scope_text, ScopeFrame};
use super::state::LogState;
use chrono::{DateTime, Utc};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// Caller-supplied parts of an entry.
#[derive(Debug, Clone, Default)]
pub struct EntryParts {
    pub category: String,
    pub level: LogLevel,
    pub event_id: EventId,
    pub state: LogState,
    pub exception: Option<ExceptionInfo>,
    pub scopes: Vec<ScopeFrame>,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    id: Uuid,
    timestamp: DateTime<Utc>,
    host: String,
    actor: String,
    category: String,
    level: LogLevel,
    event_id: EventId,
    message: String,
    exception: Option<ExceptionInfo>,
    state: LogState,
    scopes: Vec<ScopeFrame>,
    render: Arc<RenderConfig>,
    line: OnceLock<String>,
    list: OnceLock<String>,
    json_object: OnceLock<EntryJson>,
    json: OnceLock<String>,
}

impl LogEntry {
    /// Build an entry with a fresh id and the current UTC time.
    ///
    /// The message is the error's message when one is attached, otherwise
    /// the string form of the state.
    pub fn capture(parts: EntryParts, identity: &ProcessIdentity, render: Arc<RenderConfig>) -> Self {
        let message = match &parts.exception {
            Some(exception) => exception.message().to_string(),
            None => parts.state.render_message(),
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            host: identity.host.clone(),
            actor: identity.actor.clone(),
            category: parts.category,
            level: parts.level,
            event_id: parts.event_id,
            message,
            exception: parts.exception,
            state: parts.state,
            scopes: parts.scopes,
            render,
            line: OnceLock::new(),
            list: OnceLock::new(),
            json_object: OnceLock::new(),
            json: OnceLock::new(),
        }
    }

    /// Plain-text entry with environment identity and default layout
    pub fn new(category: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self::capture(
            EntryParts {
                category: category.into(),
                level,
                state: LogState::PlainText(message.into()),
                ..EntryParts::default()
            },
            &ProcessIdentity::from_env(),
            Arc::new(RenderConfig::default()),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Timestamp as `yyyy-MM-dd HH:mm:ss.fff`
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }

    /// The state exactly as the caller passed it
    pub fn raw_state(&self) -> &LogState {
        &self.state
    }

    /// Template properties; `None` for plain-text calls
    pub fn state_properties(&self) -> Option<&Properties> {
        self.state.properties()
    }

    /// Verbatim text; `None` for template calls
    pub fn state_text(&self) -> Option<&str> {
        self.state.plain_text()
    }

    /// Captured scopes, outermost first. The last one is the current scope.
    pub fn scopes(&self) -> &[ScopeFrame] {
        &self.scopes
    }

    pub fn scope_text(&self) -> &str {
        current_scope_text(&self.scopes)
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render
    }

    /// Single fixed-width line
    pub fn as_line(&self) -> &str {
        self.line.get_or_init(|| render::render_line(self))
    }

    /// Multi-line `Label       : value` block
    pub fn as_list(&self) -> &str {
        self.list.get_or_init(|| render::render_list(self))
    }

    pub fn as_json_object(&self) -> &EntryJson {
        self.json_object.get_or_init(|| EntryJson::from_entry(self))
    }

    pub fn as_json(&self) -> &str {
        self.json
            .get_or_init(|| serde_json::to_string(self.as_json_object()).unwrap_or_default())
    }
}
