//! Sink that discards everything

use crate::core::{LogEntry, Result, Sink};

/// Accepts every record and does nothing with it
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl Sink for NullSink {
    fn write_record(&self, _entry: &LogEntry) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
