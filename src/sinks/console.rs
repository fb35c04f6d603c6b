//! Console sink implementation

use crate::core::{LogEntry, Result, Sink};
use colored::Colorize;
use std::io::Write;

/// Writes records to the terminal; `Error` and above go to stderr
pub struct ConsoleSink {
    use_colors: bool,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn format(&self, entry: &LogEntry) -> String {
        let text = entry.as_line();
        if self.use_colors {
            text.color(entry.level().color_code()).to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write_record(&self, entry: &LogEntry) -> Result<()> {
        let output = self.format(entry);

        if entry.level().is_error() {
            writeln!(std::io::stderr().lock(), "{}", output)?;
        } else {
            writeln!(std::io::stdout().lock(), "{}", output)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
