//! Captured error details attached to a log entry

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Snapshot of an error and its source chain.
///
/// `message` is the top-level error's display text; `full_text` adds every
/// `source()` below it, one per line, prefixed with `---> `.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    message: String,
    full_text: String,
}

impl ExceptionInfo {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            full_text: message.clone(),
            message,
        }
    }

    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let message = error.to_string();
        let mut full_text = message.clone();
        let mut source = error.source();
        while let Some(cause) = source {
            full_text.push_str("\n ---> ");
            full_text.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { message, full_text }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_text)
    }
}
