//! Tokio-backed delivery to [`AsyncSink`]s
//!
//! Every entry spawns one task per async sink on the configured runtime.
//! The number of unfinished tasks is capped; past the cap entries are
//! dropped and counted instead of piling up tasks without bound.
//!
//! Waiting for those tasks from synchronous code must not park a thread the
//! tasks need. [`AsyncDispatch::shutdown`] waits through `block_in_place` on
//! a multi-thread runtime and skips the wait on a current-thread runtime;
//! [`AsyncDispatch::shutdown_async`] awaits the tasks instead.

use super::async_sink::AsyncSink;
use super::dispatch::{panic_message, report_sink_failure, should_alert};
use super::log_entry::LogEntry;
use super::metrics::ProviderMetrics;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Notify;

pub(crate) struct AsyncDispatch {
    runtime: Handle,
    sinks: Arc<Vec<Arc<dyn AsyncSink>>>,
    in_flight: Arc<InFlightCount>,
    limit: usize,
    metrics: Arc<ProviderMetrics>,
}

#[derive(Default)]
struct InFlightCount {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlightCount {
    fn load(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    fn release(&self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Decrements the in-flight counter when the task ends, even by panic.
struct InFlight(Arc<InFlightCount>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.release();
    }
}

impl AsyncDispatch {
    pub(crate) fn new(
        runtime: Handle,
        sinks: Vec<Arc<dyn AsyncSink>>,
        limit: usize,
        metrics: Arc<ProviderMetrics>,
    ) -> Self {
        Self {
            runtime,
            sinks: Arc::new(sinks),
            in_flight: Arc::new(InFlightCount::default()),
            limit: limit.max(1),
            metrics,
        }
    }

    pub(crate) fn spawn(&self, entry: &Arc<LogEntry>) {
        for sink in self.sinks.iter() {
            if self.in_flight.count.fetch_add(1, Ordering::AcqRel) >= self.limit {
                self.in_flight.release();
                let previous = self.metrics.record_dropped();
                if should_alert(previous) {
                    eprintln!(
                        "[LOGGER WARNING] {} async writes in flight, dropping record for sink '{}' \
                         ({} dropped so far)",
                        self.limit,
                        sink.name(),
                        previous + 1
                    );
                }
                continue;
            }

            let ticket = InFlight(Arc::clone(&self.in_flight));
            let name = sink.name().to_string();
            let metrics = Arc::clone(&self.metrics);

            let sink = Arc::clone(sink);
            let entry = Arc::clone(entry);
            let write = self
                .runtime
                .spawn(async move { sink.write_record(&entry).await });

            self.runtime.spawn(async move {
                let _ticket = ticket;
                match write.await {
                    Ok(Ok(())) => {
                        metrics.record_sink_write();
                    }
                    Ok(Err(e)) => report_sink_failure(&metrics, &name, &e, false),
                    Err(join_error) if join_error.is_panic() => {
                        let detail = panic_message(&*join_error.into_panic());
                        report_sink_failure(&metrics, &name, &detail, true)
                    }
                    Err(join_error) => report_sink_failure(&metrics, &name, &join_error, false),
                }
            });
        }
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load()
    }

    /// Wait for outstanding writes from synchronous code, then flush sinks.
    ///
    /// On a current-thread runtime the writes cannot progress while this
    /// thread waits, so they are left running and `false` is returned when
    /// any are still outstanding. Use [`shutdown_async`](Self::shutdown_async)
    /// there.
    pub(crate) fn shutdown(&self, deadline: Instant) -> bool {
        let idle = match Handle::try_current() {
            Ok(current) => match current.runtime_flavor() {
                RuntimeFlavor::MultiThread => {
                    tokio::task::block_in_place(|| self.wait_blocking(deadline))
                }
                _ => {
                    let pending = self.in_flight();
                    if pending > 0 {
                        eprintln!(
                            "[LOGGER WARNING] {} async writes left running: blocking shutdown \
                             called on a current-thread runtime, use shutdown_async instead",
                            pending
                        );
                    }
                    pending == 0
                }
            },
            Err(_) => self.wait_blocking(deadline),
        };

        if idle {
            self.spawn_flushes();
        }
        idle
    }

    /// Await outstanding writes until `deadline`, then flush every sink.
    pub(crate) async fn shutdown_async(&self, deadline: Instant) -> bool {
        let idle = async {
            loop {
                let notified = self.in_flight.idle.notified();
                if self.in_flight() == 0 {
                    return;
                }
                notified.await;
            }
        };

        let deadline = tokio::time::Instant::from_std(deadline);
        if tokio::time::timeout_at(deadline, idle).await.is_err() {
            self.warn_timeout();
            return false;
        }

        for sink in self.sinks.iter() {
            if let Err(e) = sink.flush().await {
                eprintln!("[LOGGER ERROR] Async sink '{}' flush failed: {}", sink.name(), e);
            }
        }
        true
    }

    fn wait_blocking(&self, deadline: Instant) -> bool {
        while self.in_flight() > 0 {
            if Instant::now() >= deadline {
                self.warn_timeout();
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        true
    }

    fn warn_timeout(&self) {
        eprintln!(
            "[LOGGER WARNING] {} async writes still running at shutdown timeout",
            self.in_flight()
        );
    }

    fn spawn_flushes(&self) {
        for sink in self.sinks.iter() {
            let sink = Arc::clone(sink);
            // Flushes run detached; nothing can await them from here
            self.runtime.spawn(async move {
                if let Err(e) = sink.flush().await {
                    eprintln!("[LOGGER ERROR] Async sink '{}' flush failed: {}", sink.name(), e);
                }
            });
        }
    }
}
