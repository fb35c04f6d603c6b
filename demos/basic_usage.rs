//! Basic logger usage example
//!
//! Demonstrates a provider with a console sink, different log levels and a
//! runtime gate change.
//!
//! Run with: cargo run --example basic_usage

use scoped_logger::prelude::*;
use scoped_logger::{information, warning};

fn main() -> Result<()> {
    println!("=== Scoped Logger - Basic Usage Example ===\n");

    let provider = LoggerProvider::builder()
        .gate_json(r#"{"Default": "Trace"}"#)?
        .sink(ConsoleSink::new())
        .build();

    let logger = provider.logger("Demo.Basic");

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.information("This is an information message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");
    provider.flush();

    println!("\n2. Logging with a different minimum level:");
    provider.set_min_level(LogLevel::Information);
    println!("   Minimum level set to Information - trace and debug won't show:");
    logger.trace("Trace message (hidden)");
    logger.debug("Debug message (hidden)");
    information!(logger, "Information message (visible), {} of {}", 1, 2);
    warning!(logger, "Warning message (visible), {} of {}", 2, 2);

    println!("\n3. Structured template:");
    logger
        .builder(LogLevel::Information)
        .message("Shipped {Count} parcels to {City}")
        .property("Count", 3)
        .property("City", "Lyon")
        .event_id(EventId::named(10, "Shipped"))
        .log();

    provider.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
