//! Fluent construction of a single record
//!
//! Collects a message template, properties, an event id and an optional
//! error, then hands them to the logger in one call.

use super::event_id::EventId;
use super::exception::ExceptionInfo;
use super::log_level::LogLevel;
use super::logger::Logger;
use super::properties::{FieldValue, Properties};
use super::state::LogState;
use std::error::Error;

/// Builder for one log record
///
/// Without properties the message is logged verbatim; with properties it is
/// treated as a template and `{Name}` placeholders are filled in.
#[must_use = "nothing is logged until `log` is called"]
pub struct LogEventBuilder<'a> {
    logger: &'a Logger,
    level: LogLevel,
    event_id: EventId,
    message: String,
    properties: Properties,
    exception: Option<ExceptionInfo>,
}

impl<'a> LogEventBuilder<'a> {
    pub fn new(logger: &'a Logger, level: LogLevel) -> Self {
        Self {
            logger,
            level,
            event_id: EventId::default(),
            message: String::new(),
            properties: Properties::new(),
            exception: None,
        }
    }

    /// Set the message or template
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    /// Add one structured property
    pub fn property<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.properties.insert(key, value);
        self
    }

    /// Add every property of `properties`, replacing existing keys
    pub fn properties(mut self, properties: Properties) -> Self {
        for (key, value) in properties.iter() {
            self.properties.insert(key, value.clone());
        }
        self
    }

    pub fn event_id(mut self, event_id: impl Into<EventId>) -> Self {
        self.event_id = event_id.into();
        self
    }

    pub fn exception(mut self, error: &(dyn Error + 'static)) -> Self {
        self.exception = Some(ExceptionInfo::from_error(error));
        self
    }

    pub fn exception_info(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// Build and dispatch the record
    pub fn log(self) {
        if !self.logger.is_enabled(self.level) {
            return;
        }
        let state = if self.properties.is_empty() {
            LogState::PlainText(self.message)
        } else {
            LogState::template(self.message, self.properties)
        };
        self.logger
            .emit(self.level, self.event_id, state, self.exception);
    }
}
