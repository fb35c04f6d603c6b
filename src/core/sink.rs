//! Sink trait for record destinations

use super::{error::Result, log_entry::LogEntry};

/// Destination for dispatched entries.
///
/// Called from dispatch worker threads, possibly from several at once, so
/// implementations synchronise internally. Errors and panics are contained
/// by the dispatcher and never reach the code that logged the entry.
pub trait Sink: Send + Sync {
    fn write_record(&self, entry: &LogEntry) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}
