//! # Scoped Logger
//!
//! A structured log capture and dispatch pipeline.
//!
//! ## Features
//!
//! - **Category loggers**: one cached [`Logger`] per category, shared across threads
//! - **Nested scopes**: ambient breadcrumbs captured on every record
//! - **Immutable records**: line, list and JSON views rendered once and cached
//! - **Fire-and-forget sinks**: bounded worker-pool dispatch; sink failures
//!   never reach the caller
//! - **Hot-reloadable gate**: `{"Default": "Warning"}` style level configuration
//!
//! ## Example
//!
//! ```
//! use scoped_logger::prelude::*;
//!
//! let sink = MemorySink::new();
//! let provider = LoggerProvider::builder()
//!     .min_level(LogLevel::Information)
//!     .sink(sink.clone())
//!     .build();
//!
//! let logger = provider.logger("Checkout");
//! let _order = logger.begin_scope_text("Order#1001");
//! logger.log_template(
//!     LogLevel::Information,
//!     "Charged {Amount} to {Customer}",
//!     Properties::new().with("Amount", 42.5).with("Customer", "ACME"),
//! );
//!
//! provider.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
//! let entry = sink.find("Charged 42.5 to ACME").unwrap();
//! assert_eq!(entry.scope_text(), "Order#1001");
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        EventId, ExceptionInfo, FieldValue, LevelGate, LogEntry, LogEventBuilder, LogLevel,
        LogState, Logger, LoggerError, LoggerProvider, LoggerProviderBuilder, OverflowCallback,
        OverflowPolicy, Properties, ProviderMetrics, RenderConfig, Result, ScopeFrame, ScopeGuard,
        Sink, DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::sinks::{MemorySink, NullSink};

    #[cfg(feature = "console")]
    pub use crate::sinks::ConsoleSink;
    #[cfg(feature = "file")]
    pub use crate::sinks::{FileSink, JsonSink};
    #[cfg(feature = "async-sinks")]
    pub use crate::core::AsyncSink;
}

pub use core::{
    EntryParts, EventId, ExceptionInfo, FieldValue, InScope, LevelGate, LineLayout, LogEntry,
    LogEventBuilder, LogLevel, LogState, Logger, LoggerError, LoggerProvider,
    LoggerProviderBuilder, OverflowCallback, OverflowPolicy, ProcessIdentity, Properties,
    ProviderMetrics, ProviderState, RenderConfig, Result, ScopeContext, ScopeFrame, ScopeGuard,
    ScopeSnapshot, Sink, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use sinks::{MemorySink, NullSink};

#[cfg(feature = "console")]
pub use sinks::ConsoleSink;
#[cfg(feature = "file")]
pub use sinks::{FileSink, JsonSink};
#[cfg(feature = "async-sinks")]
pub use core::AsyncSink;
