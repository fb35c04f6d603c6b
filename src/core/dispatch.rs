//! Fire-and-forget delivery of entries to sinks
//!
//! Entries are queued on a bounded channel and written by a small pool of
//! worker threads, so a logging call never waits on sink I/O (unless a
//! blocking [`OverflowPolicy`] was chosen). Workers deliver every entry to
//! every sink with per-sink panic isolation; failures only show up in
//! [`ProviderMetrics`] and throttled stderr diagnostics.
//!
//! No ordering is guaranteed between entries handled by different workers.

use super::{
    log_entry::LogEntry,
    metrics::ProviderMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    sink::Sink,
};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Upper bound on entries a worker takes off the queue before flushing.
const BATCH_SIZE: usize = 50;

/// Repeated diagnostics print on the first occurrence, then every this many.
const ALERT_EVERY: u64 = 1000;

pub(crate) type SharedSinks = Arc<Vec<Arc<dyn Sink>>>;

pub(crate) struct DispatchConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub overflow_policy: OverflowPolicy,
    pub on_overflow: Option<OverflowCallback>,
}

pub(crate) struct Dispatcher {
    sender: RwLock<Option<Sender<Arc<LogEntry>>>>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    sinks: SharedSinks,
    capacity: usize,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<ProviderMetrics>,
    #[cfg(feature = "async-sinks")]
    async_dispatch: Option<super::async_dispatch::AsyncDispatch>,
}

impl Dispatcher {
    pub(crate) fn new(
        config: DispatchConfig,
        sinks: Vec<Arc<dyn Sink>>,
        metrics: Arc<ProviderMetrics>,
    ) -> Self {
        let sinks: SharedSinks = Arc::new(sinks);
        let mut sender = None;
        let mut workers = Vec::new();

        // Without sync sinks there is nothing for workers to do.
        if !sinks.is_empty() {
            let (tx, rx) = bounded(config.queue_capacity);
            for index in 0..config.workers {
                let receiver = rx.clone();
                let sinks = Arc::clone(&sinks);
                let metrics = Arc::clone(&metrics);
                let spawned = thread::Builder::new()
                    .name(format!("log-dispatch-{}", index))
                    .spawn(move || run_worker(receiver, sinks, metrics));
                match spawned {
                    Ok(handle) => workers.push(handle),
                    Err(e) => eprintln!(
                        "[LOGGER ERROR] Failed to spawn dispatch worker #{}: {}",
                        index, e
                    ),
                }
            }
            if !workers.is_empty() {
                sender = Some(tx);
            }
        }

        Self {
            sender: RwLock::new(sender),
            workers: Mutex::new(workers),
            sinks,
            capacity: config.queue_capacity,
            overflow_policy: config.overflow_policy,
            on_overflow: config.on_overflow,
            metrics,
            #[cfg(feature = "async-sinks")]
            async_dispatch: None,
        }
    }

    #[cfg(feature = "async-sinks")]
    pub(crate) fn with_async(mut self, async_dispatch: super::async_dispatch::AsyncDispatch) -> Self {
        self.async_dispatch = Some(async_dispatch);
        self
    }

    /// Hand an entry off without waiting for any sink
    pub(crate) fn dispatch(&self, entry: LogEntry) {
        self.metrics.record_dispatched();
        let entry = Arc::new(entry);
        self.dispatch_async(&entry);

        if self.sinks.is_empty() {
            return;
        }

        let sender = self.sender.read();
        let Some(sender) = sender.as_ref() else {
            self.metrics.record_dropped();
            return;
        };

        match sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => self.handle_overflow(sender, entry),
            Err(TrySendError::Disconnected(_)) => {
                // Workers are gone, the provider is shutting down
                self.metrics.record_dropped();
            }
        }
    }

    #[cfg(feature = "async-sinks")]
    fn dispatch_async(&self, entry: &Arc<LogEntry>) {
        if let Some(async_dispatch) = &self.async_dispatch {
            async_dispatch.spawn(entry);
        }
    }

    #[cfg(not(feature = "async-sinks"))]
    fn dispatch_async(&self, _entry: &Arc<LogEntry>) {}

    fn handle_overflow(&self, sender: &Sender<Arc<LogEntry>>, entry: Arc<LogEntry>) {
        self.metrics.record_queue_full();

        match &self.overflow_policy {
            OverflowPolicy::DropNewest => {
                self.metrics.record_dropped();
            }

            OverflowPolicy::Block => {
                self.metrics.record_block();
                if sender.send(entry).is_err() {
                    self.metrics.record_dropped();
                }
            }

            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                match sender.send_timeout(entry, *timeout) {
                    Ok(()) => {}
                    Err(SendTimeoutError::Timeout(_)) => self.alert_and_drop(),
                    Err(SendTimeoutError::Disconnected(_)) => {
                        self.metrics.record_dropped();
                    }
                }
            }

            OverflowPolicy::AlertAndDrop => self.alert_and_drop(),
        }
    }

    fn alert_and_drop(&self) {
        let previous = self.metrics.record_dropped();

        if should_alert(previous) {
            eprintln!(
                "[LOGGER WARNING] Dispatch queue full (capacity {}), {} records dropped. \
                 Consider more workers, a larger queue or a different overflow policy.",
                self.capacity,
                previous + 1
            );
        }

        // The callback sees every drop; only the stderr line is throttled
        if let Some(ref callback) = self.on_overflow {
            callback(previous + 1);
        }
    }

    /// Flush every sync sink, isolating failures
    pub(crate) fn flush(&self) {
        flush_sinks(&self.sinks);
    }

    /// Close the queue, let workers drain it and join them.
    ///
    /// Returns `false` if a worker panicked or did not finish in time.
    pub(crate) fn shutdown(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut clean = self.close_workers(deadline);
        clean &= self.drain_async_sinks(deadline);

        self.flush();
        clean
    }

    /// Like [`shutdown`](Self::shutdown), but awaits async sink writes
    /// instead of blocking the runtime thread they need.
    #[cfg(feature = "async-sinks")]
    pub(crate) async fn shutdown_async(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut clean = self.close_workers(deadline);
        if let Some(async_dispatch) = &self.async_dispatch {
            clean &= async_dispatch.shutdown_async(deadline).await;
        }

        self.flush();
        clean
    }

    fn close_workers(&self, deadline: Instant) -> bool {
        // Dropping the only sender disconnects the channel once it is empty
        drop(self.sender.write().take());

        let handles = std::mem::take(&mut *self.workers.lock());
        let mut clean = true;
        for handle in handles {
            clean &= join_until(handle, deadline);
        }
        clean
    }

    #[cfg(feature = "async-sinks")]
    fn drain_async_sinks(&self, deadline: Instant) -> bool {
        match &self.async_dispatch {
            Some(async_dispatch) => async_dispatch.shutdown(deadline),
            None => true,
        }
    }

    #[cfg(not(feature = "async-sinks"))]
    fn drain_async_sinks(&self, _deadline: Instant) -> bool {
        true
    }
}

fn run_worker(receiver: Receiver<Arc<LogEntry>>, sinks: SharedSinks, metrics: Arc<ProviderMetrics>) {
    let mut batch = Vec::with_capacity(BATCH_SIZE);

    // recv() keeps yielding queued entries after disconnection, so the
    // queue is drained before the loop ends
    while let Ok(entry) = receiver.recv() {
        batch.push(entry);

        while batch.len() < BATCH_SIZE {
            match receiver.try_recv() {
                Ok(entry) => batch.push(entry),
                Err(_) => break,
            }
        }

        for entry in batch.drain(..) {
            deliver(&sinks, &entry, &metrics);
        }

        flush_sinks(&sinks);
    }
}

/// Write one entry to every sink; one failing sink never stops the others
fn deliver(sinks: &[Arc<dyn Sink>], entry: &LogEntry, metrics: &ProviderMetrics) {
    for sink in sinks {
        let result = catch_unwind(AssertUnwindSafe(|| sink.write_record(entry)));

        match result {
            Ok(Ok(())) => {
                metrics.record_sink_write();
            }
            Ok(Err(e)) => report_sink_failure(metrics, sink.name(), &e, false),
            Err(panic_info) => {
                report_sink_failure(metrics, sink.name(), &panic_message(&*panic_info), true)
            }
        }
    }
}

fn flush_sinks(sinks: &[Arc<dyn Sink>]) {
    for sink in sinks {
        match catch_unwind(AssertUnwindSafe(|| sink.flush())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("[LOGGER ERROR] Sink '{}' flush failed: {}", sink.name(), e),
            Err(panic_info) => eprintln!(
                "[LOGGER CRITICAL] Sink '{}' panicked during flush: {}. \
                 Other sinks continue to function.",
                sink.name(),
                panic_message(&*panic_info)
            ),
        }
    }
}

fn join_until(handle: thread::JoinHandle<()>, deadline: Instant) -> bool {
    loop {
        if handle.is_finished() {
            return match handle.join() {
                Ok(()) => true,
                Err(e) => {
                    eprintln!(
                        "[LOGGER ERROR] Dispatch worker panicked during shutdown: {:?}",
                        e
                    );
                    false
                }
            };
        }

        if Instant::now() >= deadline {
            eprintln!(
                "[LOGGER WARNING] Dispatch worker did not finish before the shutdown timeout. \
                 Some records may be lost."
            );
            return false;
        }

        thread::sleep(Duration::from_millis(10));
    }
}

pub(crate) fn should_alert(previous: u64) -> bool {
    previous % ALERT_EVERY == 0
}

pub(crate) fn report_sink_failure(
    metrics: &ProviderMetrics,
    sink: &str,
    detail: &dyn fmt::Display,
    panicked: bool,
) {
    let previous = metrics.record_sink_failure();
    if !should_alert(previous) {
        return;
    }
    if panicked {
        eprintln!(
            "[LOGGER CRITICAL] Sink '{}' panicked: {}. Other sinks continue to function. \
             ({} failures so far)",
            sink,
            detail,
            previous + 1
        );
    } else {
        eprintln!(
            "[LOGGER ERROR] Sink '{}' failed: {} ({} failures so far)",
            sink,
            detail,
            previous + 1
        );
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LogLevel, LoggerError, Result};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    struct CountingSink {
        writes: AtomicUsize,
    }

    impl Sink for CountingSink {
        fn write_record(&self, _entry: &LogEntry) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    struct FailingSink;

    impl Sink for FailingSink {
        fn write_record(&self, _entry: &LogEntry) -> Result<()> {
            Err(LoggerError::other("boom"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct PanickingSink;

    impl Sink for PanickingSink {
        fn write_record(&self, _entry: &LogEntry) -> Result<()> {
            panic!("sink exploded");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    fn config(workers: usize, capacity: usize) -> DispatchConfig {
        DispatchConfig {
            workers,
            queue_capacity: capacity,
            overflow_policy: OverflowPolicy::AlertAndDrop,
            on_overflow: None,
        }
    }

    fn entry(message: &str) -> LogEntry {
        LogEntry::new("Dispatch", LogLevel::Information, message)
    }

    #[test]
    fn test_shutdown_drains_queue() {
        let counting = Arc::new(CountingSink {
            writes: AtomicUsize::new(0),
        });
        let metrics = Arc::new(ProviderMetrics::new());
        let dispatcher = Dispatcher::new(
            config(2, 256),
            vec![counting.clone() as Arc<dyn Sink>],
            Arc::clone(&metrics),
        );

        for i in 0..100 {
            dispatcher.dispatch(entry(&format!("message {}", i)));
        }
        assert!(dispatcher.shutdown(Duration::from_secs(5)));

        assert_eq!(counting.writes.load(Ordering::SeqCst), 100);
        assert_eq!(metrics.dispatched(), 100);
        assert_eq!(metrics.sink_writes(), 100);
    }

    #[test]
    fn test_failures_and_panics_are_isolated() {
        let counting = Arc::new(CountingSink {
            writes: AtomicUsize::new(0),
        });
        let metrics = Arc::new(ProviderMetrics::new());
        let dispatcher = Dispatcher::new(
            config(1, 64),
            vec![
                Arc::new(FailingSink) as Arc<dyn Sink>,
                Arc::new(PanickingSink) as Arc<dyn Sink>,
                counting.clone() as Arc<dyn Sink>,
            ],
            Arc::clone(&metrics),
        );

        for _ in 0..10 {
            dispatcher.dispatch(entry("x"));
        }
        assert!(dispatcher.shutdown(Duration::from_secs(5)));

        assert_eq!(counting.writes.load(Ordering::SeqCst), 10);
        assert_eq!(metrics.sink_failures(), 20);
    }

    #[test]
    fn test_dispatch_after_shutdown_is_dropped() {
        let metrics = Arc::new(ProviderMetrics::new());
        let dispatcher = Dispatcher::new(
            config(1, 8),
            vec![Arc::new(FailingSink) as Arc<dyn Sink>],
            Arc::clone(&metrics),
        );
        dispatcher.shutdown(Duration::from_secs(1));

        dispatcher.dispatch(entry("late"));
        assert_eq!(metrics.dropped_count(), 1);
    }

    #[test]
    fn test_no_sinks_is_a_no_op() {
        let metrics = Arc::new(ProviderMetrics::new());
        let dispatcher = Dispatcher::new(config(2, 8), Vec::new(), Arc::clone(&metrics));

        dispatcher.dispatch(entry("nowhere"));
        assert!(dispatcher.shutdown(Duration::from_secs(1)));
        assert_eq!(metrics.dispatched(), 1);
        assert_eq!(metrics.dropped_count(), 0);
    }

    struct GatedSink {
        gate: Arc<Mutex<()>>,
    }

    impl Sink for GatedSink {
        fn write_record(&self, _entry: &LogEntry) -> Result<()> {
            let _open = self.gate.lock();
            Ok(())
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    #[test]
    fn test_overflow_callback_sees_every_drop() {
        let calls = Arc::new(AtomicU64::new(0));
        let last = Arc::new(AtomicU64::new(0));
        let (calls_cb, last_cb) = (Arc::clone(&calls), Arc::clone(&last));

        let gate = Arc::new(Mutex::new(()));
        let metrics = Arc::new(ProviderMetrics::new());
        let dispatcher = Dispatcher::new(
            DispatchConfig {
                on_overflow: Some(Arc::new(move |count| {
                    calls_cb.fetch_add(1, Ordering::SeqCst);
                    last_cb.store(count, Ordering::SeqCst);
                })),
                ..config(1, 1)
            },
            vec![Arc::new(GatedSink {
                gate: Arc::clone(&gate),
            }) as Arc<dyn Sink>],
            Arc::clone(&metrics),
        );

        let closed = gate.lock();
        for _ in 0..50 {
            dispatcher.dispatch(entry("burst"));
        }
        drop(closed);
        assert!(dispatcher.shutdown(Duration::from_secs(5)));

        let dropped = metrics.dropped_count();
        assert!(dropped > 1);
        assert_eq!(calls.load(Ordering::SeqCst), dropped);
        assert_eq!(last.load(Ordering::SeqCst), dropped);
    }

    #[test]
    fn test_should_alert_throttle() {
        assert!(should_alert(0));
        assert!(!should_alert(1));
        assert!(!should_alert(999));
        assert!(should_alert(1000));
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(&*boxed), "static str");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*boxed), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(&*boxed), "Unknown panic");
    }
}
