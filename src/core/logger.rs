//! Category-bound log producer

use super::event_builder::LogEventBuilder;
use super::event_id::EventId;
use super::exception::ExceptionInfo;
use super::log_entry::EntryParts;
use super::log_level::LogLevel;
use super::properties::Properties;
use super::provider::ProviderShared;
use super::scope::{InScope, ScopeFrame, ScopeGuard};
use super::state::LogState;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Front-end for one category, bound to the provider that created it.
///
/// Obtained from [`LoggerProvider::logger`](super::LoggerProvider::logger)
/// and cheap to share across threads. Logging calls never block on sink I/O
/// and never return errors.
pub struct Logger {
    provider: Arc<ProviderShared>,
    category: String,
}

impl Logger {
    pub(crate) fn new(provider: Arc<ProviderShared>, category: impl Into<String>) -> Self {
        Self {
            provider,
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether a record at `level` would currently be produced
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.provider.is_enabled(level)
    }

    /// Produce and dispatch one record.
    ///
    /// Disabled levels return before anything is captured. When `exception`
    /// is set, its message becomes the record message.
    pub fn log(
        &self,
        level: LogLevel,
        event_id: impl Into<EventId>,
        state: impl Into<LogState>,
        exception: Option<&(dyn Error + 'static)>,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        self.emit(
            level,
            event_id.into(),
            state.into(),
            exception.map(ExceptionInfo::from_error),
        );
    }

    pub(crate) fn emit(
        &self,
        level: LogLevel,
        event_id: EventId,
        state: LogState,
        exception: Option<ExceptionInfo>,
    ) {
        if !self.is_enabled(level) {
            return;
        }

        let scopes = self.provider.scopes().snapshot().into_frames();
        let entry = self.provider.capture(EntryParts {
            category: self.category.clone(),
            level,
            event_id,
            state,
            exception,
            scopes,
        });
        self.provider.dispatch(entry);
    }

    pub fn log_text(&self, level: LogLevel, message: impl Into<String>) {
        if self.is_enabled(level) {
            self.emit(level, EventId::default(), LogState::PlainText(message.into()), None);
        }
    }

    /// Log a message template such as `"Paid {Amount} for {Order}"`
    pub fn log_template(&self, level: LogLevel, template: &str, properties: Properties) {
        if self.is_enabled(level) {
            self.emit(
                level,
                EventId::default(),
                LogState::template(template, properties),
                None,
            );
        }
    }

    /// Log an error; its message becomes the record text and its source
    /// chain the stack
    pub fn log_error(
        &self,
        level: LogLevel,
        event_id: impl Into<EventId>,
        error: &(dyn Error + 'static),
    ) {
        if self.is_enabled(level) {
            let exception = ExceptionInfo::from_error(error);
            let state = LogState::PlainText(exception.message().to_string());
            self.emit(level, event_id.into(), state, Some(exception));
        }
    }

    #[inline]
    pub fn trace(&self, message: impl Into<String>) {
        self.log_text(LogLevel::Trace, message);
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) {
        self.log_text(LogLevel::Debug, message);
    }

    #[inline]
    pub fn information(&self, message: impl Into<String>) {
        self.log_text(LogLevel::Information, message);
    }

    #[inline]
    pub fn warning(&self, message: impl Into<String>) {
        self.log_text(LogLevel::Warning, message);
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) {
        self.log_text(LogLevel::Error, message);
    }

    #[inline]
    pub fn critical(&self, message: impl Into<String>) {
        self.log_text(LogLevel::Critical, message);
    }

    /// Push a scope frame shared with every logger of the same provider
    ///
    /// # Example
    ///
    /// ```
    /// use scoped_logger::prelude::*;
    ///
    /// let provider = LoggerProvider::builder().build();
    /// let logger = provider.logger("Checkout");
    ///
    /// let _request = logger.begin_scope_text("Req#42");
    /// logger.information("inside the request scope");
    /// ```
    pub fn begin_scope(&self, frame: impl Into<ScopeFrame>) -> ScopeGuard {
        self.provider.scopes().push(frame.into())
    }

    pub fn begin_scope_text(&self, text: impl Into<String>) -> ScopeGuard {
        self.begin_scope(ScopeFrame::Text(text.into()))
    }

    pub fn begin_scope_properties(&self, properties: Properties) -> ScopeGuard {
        self.begin_scope(ScopeFrame::Properties(properties))
    }

    /// Run `future` inside a scope that belongs to it alone.
    ///
    /// Use this rather than [`begin_scope`](Self::begin_scope) when several
    /// futures share a thread, e.g. under `tokio::join!`.
    pub fn in_scope<F: Future>(&self, frame: impl Into<ScopeFrame>, future: F) -> InScope<F> {
        self.provider.scopes().in_scope(frame.into(), future)
    }

    /// Start a fluent record at `level`
    ///
    /// # Example
    ///
    /// ```
    /// use scoped_logger::prelude::*;
    ///
    /// let provider = LoggerProvider::builder().build();
    /// let logger = provider.logger("Api");
    ///
    /// logger.builder(LogLevel::Information)
    ///     .message("Request {Path} took {Ms} ms")
    ///     .property("Path", "/orders")
    ///     .property("Ms", 42)
    ///     .event_id(EventId::named(7, "RequestDone"))
    ///     .log();
    /// ```
    pub fn builder(&self, level: LogLevel) -> LogEventBuilder<'_> {
        LogEventBuilder::new(self, level)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{EventId, LogLevel, LoggerProvider, Properties, ScopeFrame};
    use crate::sinks::MemorySink;
    use std::fmt;
    use std::time::Duration;

    fn provider_with(sink: &MemorySink, level: LogLevel) -> LoggerProvider {
        LoggerProvider::builder()
            .min_level(level)
            .host("test-host")
            .actor("tester")
            .sink(sink.clone())
            .build()
    }

    #[derive(Debug)]
    struct Timeout;

    impl fmt::Display for Timeout {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "upstream timed out")
        }
    }

    impl std::error::Error for Timeout {}

    #[test]
    fn test_disabled_level_produces_nothing() {
        let sink = MemorySink::new();
        let provider = provider_with(&sink, LogLevel::Warning);
        let logger = provider.logger("Gate");

        logger.debug("hidden");
        logger.information("hidden");
        logger.warning("shown");
        logger.log_text(LogLevel::None, "never");

        provider.shutdown(Duration::from_secs(5));
        assert_eq!(sink.messages(), vec!["shown".to_string()]);
        assert_eq!(provider.metrics().dispatched(), 1);
    }

    #[test]
    fn test_record_fields() {
        let sink = MemorySink::new();
        let provider = provider_with(&sink, LogLevel::Trace);
        let logger = provider.logger("Billing.Invoices");

        logger.log(LogLevel::Error, EventId::named(3, "Sent"), "sent", None);
        provider.shutdown(Duration::from_secs(5));

        let entries = sink.entries();
        let entry = &entries[0];
        assert_eq!(entry.category(), "Billing.Invoices");
        assert_eq!(entry.level(), LogLevel::Error);
        assert_eq!(entry.event_id(), &EventId::named(3, "Sent"));
        assert_eq!(entry.host(), "test-host");
        assert_eq!(entry.actor(), "tester");
        assert_eq!(entry.message(), "sent");
    }

    #[test]
    fn test_scopes_are_captured_outermost_first() {
        let sink = MemorySink::new();
        let provider = provider_with(&sink, LogLevel::Trace);
        let logger = provider.logger("Scoped");

        {
            let _a = logger.begin_scope_text("A");
            let _b = logger.begin_scope_text("B");
            logger.information("inside");
        }
        logger.information("outside");
        provider.shutdown(Duration::from_secs(5));

        let inside = sink.find("inside").unwrap();
        assert_eq!(inside.scopes(), &[ScopeFrame::text("A"), ScopeFrame::text("B")]);
        assert_eq!(inside.scope_text(), "B");

        let outside = sink.find("outside").unwrap();
        assert!(outside.scopes().is_empty());
    }

    #[test]
    fn test_scopes_are_shared_between_categories() {
        let sink = MemorySink::new();
        let provider = provider_with(&sink, LogLevel::Trace);
        let outer = provider.logger("Outer");
        let inner = provider.logger("Inner");

        let _scope = outer.begin_scope_properties(Properties::new().with("RequestId", 42));
        inner.information("nested call");
        provider.shutdown(Duration::from_secs(5));

        let entry = sink.find("nested call").unwrap();
        assert_eq!(entry.scopes().len(), 1);
        assert_eq!(entry.scope_text(), "");
    }

    #[test]
    fn test_log_error_uses_error_message() {
        let sink = MemorySink::new();
        let provider = provider_with(&sink, LogLevel::Trace);
        let logger = provider.logger("Upstream");

        logger.log_error(LogLevel::Error, 500, &Timeout);
        logger.log(LogLevel::Warning, 0, "ignored text", Some(&Timeout));
        provider.shutdown(Duration::from_secs(5));

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert_eq!(entry.message(), "upstream timed out");
            assert!(entry.exception().is_some());
        }
    }

    #[test]
    fn test_template_logging() {
        let sink = MemorySink::new();
        let provider = provider_with(&sink, LogLevel::Trace);
        let logger = provider.logger("Greeter");

        logger.log_template(
            LogLevel::Information,
            "Hello {Name}",
            Properties::new().with("Name", "World"),
        );
        provider.shutdown(Duration::from_secs(5));

        let entry = sink.find("Hello World").unwrap();
        assert_eq!(
            entry.state_properties().unwrap().get("Name").map(|v| v.to_string()),
            Some("World".to_string())
        );
    }

    #[test]
    fn test_builder_logs_template() {
        let sink = MemorySink::new();
        let provider = provider_with(&sink, LogLevel::Trace);
        let logger = provider.logger("Builder");

        logger
            .builder(LogLevel::Warning)
            .message("Disk {Mount} at {Percent}%")
            .property("Mount", "/var")
            .property("Percent", 91)
            .event_id(12)
            .log();
        provider.shutdown(Duration::from_secs(5));

        let entry = sink.find("Disk /var at 91%").unwrap();
        assert_eq!(entry.level(), LogLevel::Warning);
        assert_eq!(entry.event_id().id, 12);
    }
}
