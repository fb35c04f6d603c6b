//! Core pipeline types and traits

pub mod dispatch;
pub mod error;
pub mod event_builder;
pub mod event_id;
pub mod exception;
pub mod identity;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod properties;
pub mod provider;
pub mod render;
pub mod scope;
pub mod sink;
pub mod state;

#[cfg(feature = "async-sinks")]
pub(crate) mod async_dispatch;
#[cfg(feature = "async-sinks")]
pub mod async_sink;

#[cfg(feature = "async-sinks")]
pub use async_sink::AsyncSink;
pub use dispatch::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
pub use error::{LoggerError, Result};
pub use event_builder::LogEventBuilder;
pub use event_id::EventId;
pub use exception::ExceptionInfo;
pub use identity::ProcessIdentity;
pub use log_entry::{EntryParts, LogEntry};
pub use log_level::LogLevel;
pub use logger::Logger;
pub use metrics::ProviderMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
pub use properties::{FieldValue, Properties};
pub use provider::{
    LevelGate, LoggerProvider, LoggerProviderBuilder, ProviderState, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use render::{EntryJson, LineLayout, RenderConfig};
pub use scope::{InScope, ScopeContext, ScopeFrame, ScopeGuard, ScopeSnapshot};
pub use sink::Sink;
pub use state::LogState;
