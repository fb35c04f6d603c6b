//! File logging example
//!
//! Demonstrates logging to console, a fixed-width text file and a JSON-lines
//! file at the same time.
//!
//! Run with: cargo run --example file_logging

use scoped_logger::prelude::*;

fn main() -> Result<()> {
    println!("=== Scoped Logger - File Logging Example ===\n");

    let render = RenderConfig::default();
    let provider = LoggerProvider::builder()
        .min_level(LogLevel::Debug)
        .sink(ConsoleSink::new())
        .sink(FileSink::with_header("application.log", &render)?)
        .sink(JsonSink::new("application.jsonl")?)
        .render_config(render)
        .build();

    let logger = provider.logger("Demo.Files");

    println!("1. Logging to console and files:");
    logger.information("Application started");
    logger.debug("Loading configuration...");
    logger.warning("Using default settings for some options");
    logger.error("Failed to load optional plugin");

    println!("\n2. Performing some operations:");
    let _job = logger.begin_scope_text("Job#2024");
    for i in 1..=5 {
        logger.log_template(
            LogLevel::Information,
            "Processing item {Item}/{Total}",
            Properties::new().with("Item", i).with("Total", 5),
        );
        if i == 3 {
            logger.warning("Item 3 took longer than expected");
        }
    }

    logger.information("All operations completed");

    if !provider.shutdown(DEFAULT_SHUTDOWN_TIMEOUT) {
        eprintln!("Warning: logger shutdown timed out");
    }

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' and 'application.jsonl' for the full output");

    Ok(())
}
