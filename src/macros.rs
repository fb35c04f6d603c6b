//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. The arguments are
//! only formatted when the level is enabled.
//!
//! # Examples
//!
//! ```
//! use scoped_logger::prelude::*;
//! use scoped_logger::information;
//!
//! let provider = LoggerProvider::builder().build();
//! let logger = provider.logger("Server");
//!
//! // Basic logging
//! information!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! information!(logger, "Server listening on port {}", port);
//! ```

/// Log a formatted message at the given level.
///
/// # Examples
///
/// ```
/// # use scoped_logger::prelude::*;
/// # let provider = LoggerProvider::builder().build();
/// # let logger = provider.logger("Doc");
/// use scoped_logger::log;
/// log!(logger, LogLevel::Information, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.is_enabled(level) {
            logger.log_text(level, format!($($arg)+));
        }
    }};
}

/// Log a trace-level message.
///
/// ```
/// # use scoped_logger::prelude::*;
/// # let provider = LoggerProvider::builder().min_level(LogLevel::Trace).build();
/// # let logger = provider.logger("Doc");
/// use scoped_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an information-level message.
///
/// ```
/// # use scoped_logger::prelude::*;
/// # let provider = LoggerProvider::builder().build();
/// # let logger = provider.logger("Doc");
/// use scoped_logger::information;
/// information!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! information {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Information, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warning {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
///
/// ```
/// # use scoped_logger::prelude::*;
/// # let provider = LoggerProvider::builder().build();
/// # let logger = provider.logger("Doc");
/// use scoped_logger::error;
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{LogLevel, LoggerProvider};
    use crate::sinks::MemorySink;
    use std::cell::Cell;
    use std::fmt;
    use std::time::Duration;

    #[test]
    fn test_level_macros() {
        let sink = MemorySink::new();
        let provider = LoggerProvider::builder()
            .min_level(LogLevel::Trace)
            .sink(sink.clone())
            .build();
        let logger = provider.logger("Macros");

        log!(logger, LogLevel::Information, "Formatted: {}", 42);
        trace!(logger, "Value: {}", 10);
        debug!(logger, "Count: {}", 5);
        information!(logger, "Items: {}", 100);
        warning!(logger, "Retry {} of {}", 1, 3);
        error!(logger, "Code: {}", 500);
        critical!(logger, "Critical failure: {}", "system");
        provider.shutdown(Duration::from_secs(5));

        let mut levels: Vec<LogLevel> = sink.entries().iter().map(|e| e.level()).collect();
        levels.sort();
        assert_eq!(
            levels,
            vec![
                LogLevel::Trace,
                LogLevel::Debug,
                LogLevel::Information,
                LogLevel::Information,
                LogLevel::Warning,
                LogLevel::Error,
                LogLevel::Critical,
            ]
        );
        assert!(sink.find("Retry 1 of 3").is_some());
    }

    struct Counted<'a>(&'a Cell<u32>);

    impl fmt::Display for Counted<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.set(self.0.get() + 1);
            write!(f, "counted")
        }
    }

    #[test]
    fn test_disabled_level_skips_formatting() {
        let provider = LoggerProvider::builder().min_level(LogLevel::Error).build();
        let logger = provider.logger("Lazy");
        let calls = Cell::new(0);

        debug!(logger, "{}", Counted(&calls));
        assert_eq!(calls.get(), 0);

        error!(logger, "{}", Counted(&calls));
        assert_eq!(calls.get(), 1);
    }
}
