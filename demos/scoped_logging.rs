//! Scoped logging example
//!
//! Demonstrates nested scopes, properties scopes and carrying a scope
//! snapshot to a worker thread.
//!
//! Run with: cargo run --example scoped_logging

use scoped_logger::prelude::*;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct PaymentDeclined;

impl fmt::Display for PaymentDeclined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "payment declined by issuer")
    }
}

impl std::error::Error for PaymentDeclined {}

fn handle_request(provider: &Arc<LoggerProvider>, request_id: u32) {
    let logger = provider.logger("Demo.Checkout");
    let _request = logger.begin_scope_text(format!("Req#{}", request_id));

    logger.information("request received");
    {
        let _user = logger.begin_scope_properties(Properties::new().with("UserId", 7));
        logger.debug("user loaded");
    }

    // Carry the request scope to a worker thread
    let snapshot = provider.scopes().snapshot();
    let worker = Arc::clone(provider);
    std::thread::spawn(move || {
        let _attached = worker.scopes().attach(&snapshot);
        let payments = worker.logger("Demo.Payments");
        payments.log_error(LogLevel::Error, EventId::named(402, "Declined"), &PaymentDeclined);
    })
    .join()
    .ok();

    logger.information("request finished");
}

fn main() {
    println!("=== Scoped Logger - Scoped Logging Example ===\n");

    let sink = MemorySink::new();
    let provider = Arc::new(
        LoggerProvider::builder()
            .min_level(LogLevel::Debug)
            .sink(sink.clone())
            .build(),
    );

    handle_request(&provider, 42);
    provider.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

    for entry in sink.entries() {
        println!("{}\n", entry.as_list());
    }

    println!("=== Example completed successfully! ===");
}
