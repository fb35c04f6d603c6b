//! Async sink trait for non-blocking record output

use super::{error::Result, log_entry::LogEntry};
use async_trait::async_trait;

/// Trait for asynchronous sinks
///
/// Each entry is written from its own tokio task; nothing awaits the result
/// on the logging side.
///
/// # Example
///
/// ```no_run
/// use scoped_logger::core::{AsyncSink, LogEntry, Result};
/// use async_trait::async_trait;
///
/// struct RemoteSink;
///
/// #[async_trait]
/// impl AsyncSink for RemoteSink {
///     async fn write_record(&self, entry: &LogEntry) -> Result<()> {
///         // ship entry.as_json() somewhere
///         let _ = entry.as_json();
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "remote"
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncSink: Send + Sync {
    /// Write an entry asynchronously
    async fn write_record(&self, entry: &LogEntry) -> Result<()>;

    /// Flush buffered entries asynchronously
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Get the sink name
    fn name(&self) -> &str;
}
