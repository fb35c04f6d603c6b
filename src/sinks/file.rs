//! File sink implementation

use crate::core::{LogEntry, LoggerError, RenderConfig, Result, Sink};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one rendered entry per line to a file
pub struct FileSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Open the file and write the column header if the file is new or empty
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use scoped_logger::sinks::FileSink;
    /// use scoped_logger::RenderConfig;
    ///
    /// let sink = FileSink::with_header("/var/log/app.log", &RenderConfig::default()).unwrap();
    /// ```
    pub fn with_header(path: impl Into<PathBuf>, render: &RenderConfig) -> Result<Self> {
        let sink = Self::new(path)?;
        let is_empty = std::fs::metadata(&sink.path)
            .map_err(|e| LoggerError::io_operation("reading metadata", sink.path.display().to_string(), e))?
            .len()
            == 0;

        if is_empty {
            let mut writer = sink.writer.lock();
            writeln!(writer, "{}", render.header_line())?;
            writer.flush()?;
        }
        Ok(sink)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggerError::io_operation("opening log file", path.display().to_string(), e))
}

impl Sink for FileSink {
    fn write_record(&self, entry: &LogEntry) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(entry.as_line().as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.get_mut().flush();
    }
}
