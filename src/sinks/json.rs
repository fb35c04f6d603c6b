//! JSON-lines sink for structured logging

use crate::core::{LogEntry, Result, Sink};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON file sink
///
/// Writes each entry as a single-line JSON object (JSONL format) with the
/// keys `Id, TimeStamp, Level, Category, Scope, EventId, Host, User, Text,
/// Stack, Properties`. Compatible with log aggregation tools like ELK, Loki, etc.
pub struct JsonSink {
    writer: Mutex<BufWriter<File>>,
    pretty: bool,
}

impl JsonSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            pretty: false,
        })
    }

    /// One indented object per entry instead of one line
    pub fn new_pretty<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut sink = Self::new(path)?;
        sink.pretty = true;
        Ok(sink)
    }
}

impl Sink for JsonSink {
    fn write_record(&self, entry: &LogEntry) -> Result<()> {
        let mut writer = self.writer.lock();
        if self.pretty {
            let json = serde_json::to_string_pretty(entry.as_json_object())?;
            writeln!(writer, "{}", json)?;
        } else {
            writeln!(writer, "{}", entry.as_json())?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
