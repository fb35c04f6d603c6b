//! In-memory sink for tests and inspection

use crate::core::{LogEntry, Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps a copy of every delivered entry.
///
/// Clones share the same storage, so one clone can be handed to the
/// provider while another is kept for assertions.
///
/// # Example
///
/// ```
/// use scoped_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let provider = LoggerProvider::builder().sink(sink.clone()).build();
///
/// provider.logger("Demo").warning("low disk");
/// provider.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
///
/// assert_eq!(sink.messages(), vec!["low disk".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of all entries received so far, in arrival order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|entry| entry.message().to_string())
            .collect()
    }

    /// First entry whose message equals `message`
    pub fn find(&self, message: &str) -> Option<LogEntry> {
        self.entries
            .lock()
            .iter()
            .find(|entry| entry.message() == message)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_record(&self, entry: &LogEntry) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
