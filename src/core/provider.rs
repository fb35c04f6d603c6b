//! Logger provider: level gate, producer registry and dispatch lifecycle

use super::dispatch::{DispatchConfig, Dispatcher, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};
use super::error::{LoggerError, Result};
use super::identity::ProcessIdentity;
use super::log_entry::{EntryParts, LogEntry};
use super::log_level::LogLevel;
use super::logger::Logger;
use super::metrics::ProviderMetrics;
use super::overflow_policy::{OverflowCallback, OverflowPolicy};
use super::render::RenderConfig;
use super::scope::{ScopeContext, ScopeFrame, ScopeGuard};
use super::sink::Sink;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "async-sinks")]
use super::{async_dispatch::AsyncDispatch, async_sink::AsyncSink};

/// Default shutdown timeout (5 seconds)
///
/// Used when the provider is dropped without an explicit
/// [`LoggerProvider::shutdown`].
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const ACTIVE: u8 = 0;
const DISPOSING: u8 = 1;
const DISPOSED: u8 = 2;

/// Minimum level a record needs to be produced.
///
/// Deserializes from the configuration shape `{"Default": "Warning"}`.
///
/// # Example
///
/// ```
/// use scoped_logger::{LevelGate, LogLevel};
///
/// let gate = LevelGate::from_json(r#"{"Default": "Warning"}"#).unwrap();
/// assert_eq!(gate.default, LogLevel::Warning);
/// assert!(gate.allows(LogLevel::Error));
/// assert!(!gate.allows(LogLevel::Information));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LevelGate {
    pub default: LogLevel,
}

impl LevelGate {
    pub fn new(default: LogLevel) -> Self {
        Self { default }
    }

    /// Gate that lets nothing through
    pub fn off() -> Self {
        Self::new(LogLevel::None)
    }

    pub fn allows(&self, level: LogLevel) -> bool {
        level.passes(self.default)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Lifecycle of a provider. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Active,
    Disposing,
    Disposed,
}

/// State shared between a provider and every logger it hands out
pub(crate) struct ProviderShared {
    gate: AtomicU8,
    state: AtomicU8,
    scopes: ScopeContext,
    identity: ProcessIdentity,
    render: Arc<RenderConfig>,
    dispatcher: Dispatcher,
    metrics: Arc<ProviderMetrics>,
}

impl ProviderShared {
    #[inline]
    fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == ACTIVE
    }

    #[inline]
    pub(crate) fn is_enabled(&self, level: LogLevel) -> bool {
        self.is_active() && level.passes(LogLevel::from_ordinal(self.gate.load(Ordering::Relaxed)))
    }

    pub(crate) fn scopes(&self) -> &ScopeContext {
        &self.scopes
    }

    pub(crate) fn capture(&self, parts: EntryParts) -> LogEntry {
        LogEntry::capture(parts, &self.identity, Arc::clone(&self.render))
    }

    pub(crate) fn dispatch(&self, entry: LogEntry) {
        // Disposal may have started between the gate check and here
        if !self.is_active() {
            self.metrics.record_dropped();
            return;
        }
        self.dispatcher.dispatch(entry);
    }

    /// Disposed shell for loggers requested after disposal
    fn detached(&self) -> Self {
        Self {
            gate: AtomicU8::new(LogLevel::None.ordinal()),
            state: AtomicU8::new(DISPOSED),
            scopes: ScopeContext::new(),
            identity: self.identity.clone(),
            render: Arc::clone(&self.render),
            dispatcher: Dispatcher::new(
                DispatchConfig {
                    workers: 0,
                    queue_capacity: 1,
                    overflow_policy: OverflowPolicy::DropNewest,
                    on_overflow: None,
                },
                Vec::new(),
                Arc::new(ProviderMetrics::new()),
            ),
            metrics: Arc::new(ProviderMetrics::new()),
        }
    }
}

/// Owns the level gate, the category registry, the shared scope context
/// and the dispatch pipeline.
///
/// Loggers handed out by [`LoggerProvider::logger`] are cached per category:
/// asking twice for the same category returns the same `Arc<Logger>`.
///
/// # Example
///
/// ```
/// use scoped_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let provider = LoggerProvider::builder()
///     .min_level(LogLevel::Debug)
///     .sink(sink.clone())
///     .build();
///
/// let logger = provider.logger("Orders");
/// logger.information("order created");
///
/// provider.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
/// assert_eq!(sink.len(), 1);
/// ```
pub struct LoggerProvider {
    shared: Arc<ProviderShared>,
    registry: DashMap<String, Arc<Logger>>,
    shutdown_timeout: Duration,
}

impl LoggerProvider {
    #[must_use]
    pub fn builder() -> LoggerProviderBuilder {
        LoggerProviderBuilder::new()
    }

    /// Producer for `category`, created on first request
    pub fn logger(&self, category: &str) -> Arc<Logger> {
        if !self.shared.is_active() {
            return Arc::new(Logger::new(Arc::new(self.shared.detached()), category));
        }

        if let Some(existing) = self.registry.get(category) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .registry
            .entry(category.to_string())
            .or_insert_with(|| Arc::new(Logger::new(Arc::clone(&self.shared), category)));
        Arc::clone(entry.value())
    }

    /// Like [`logger`](Self::logger), but fails once the provider is disposed
    pub fn try_logger(&self, category: &str) -> Result<Arc<Logger>> {
        if self.is_disposed() {
            return Err(LoggerError::ProviderDisposed);
        }
        Ok(self.logger(category))
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.shared.is_enabled(level)
    }

    pub fn gate(&self) -> LevelGate {
        LevelGate::new(LogLevel::from_ordinal(self.shared.gate.load(Ordering::Relaxed)))
    }

    /// Replace the gate; affects every logger immediately
    pub fn set_gate(&self, gate: LevelGate) {
        self.shared.gate.store(gate.default.ordinal(), Ordering::Relaxed);
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.set_gate(LevelGate::new(level));
    }

    pub fn begin_scope(&self, frame: impl Into<ScopeFrame>) -> ScopeGuard {
        self.shared.scopes.push(frame.into())
    }

    pub fn scopes(&self) -> &ScopeContext {
        &self.shared.scopes
    }

    pub fn identity(&self) -> &ProcessIdentity {
        &self.shared.identity
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.shared.render
    }

    /// Get the provider metrics
    ///
    /// ```
    /// use scoped_logger::LoggerProvider;
    ///
    /// let provider = LoggerProvider::builder().build();
    /// let metrics = provider.metrics();
    /// println!("Dropped: {}", metrics.dropped_count());
    /// println!("Drop rate: {:.2}%", metrics.drop_rate());
    /// ```
    pub fn metrics(&self) -> &ProviderMetrics {
        &self.shared.metrics
    }

    /// Number of categories in the registry
    pub fn logger_count(&self) -> usize {
        self.registry.len()
    }

    pub fn state(&self) -> ProviderState {
        match self.shared.state.load(Ordering::Acquire) {
            ACTIVE => ProviderState::Active,
            DISPOSING => ProviderState::Disposing,
            _ => ProviderState::Disposed,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state() != ProviderState::Active
    }

    /// Flush every sync sink from the calling thread
    pub fn flush(&self) {
        self.shared.dispatcher.flush();
    }

    /// Stop accepting records, drain what is queued and flush sinks.
    ///
    /// Returns `true` if everything finished within `timeout`. Only the
    /// first call does any work; later calls return `true` immediately.
    ///
    /// Async sink writes are awaited by parking the calling thread. Inside a
    /// current-thread tokio runtime that would starve them, so they are left
    /// running and the result is `false` if any are pending; call
    /// [`shutdown_async`](Self::shutdown_async) from async code instead.
    ///
    /// ```no_run
    /// use scoped_logger::LoggerProvider;
    /// use std::time::Duration;
    ///
    /// let provider = LoggerProvider::builder().build();
    /// provider.logger("App").information("Important message");
    ///
    /// if !provider.shutdown(Duration::from_secs(10)) {
    ///     eprintln!("Warning: logger shutdown timed out");
    /// }
    /// ```
    pub fn shutdown(&self, timeout: Duration) -> bool {
        if !self.begin_disposing() {
            return true;
        }
        let clean = self.shared.dispatcher.shutdown(timeout);
        self.finish_disposing();
        clean
    }

    /// Async counterpart of [`shutdown`](Self::shutdown) for use on a tokio
    /// runtime of any flavor. Requires the runtime's time driver.
    #[cfg(feature = "async-sinks")]
    pub async fn shutdown_async(&self, timeout: Duration) -> bool {
        if !self.begin_disposing() {
            return true;
        }
        let clean = self.shared.dispatcher.shutdown_async(timeout).await;
        self.finish_disposing();
        clean
    }

    fn begin_disposing(&self) -> bool {
        self.shared
            .state
            .compare_exchange(ACTIVE, DISPOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish_disposing(&self) {
        self.registry.clear();

        let metrics = &self.shared.metrics;
        let dropped = metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger provider shutting down with {} dropped records \
                 (drop rate: {:.2}%)",
                dropped,
                metrics.drop_rate()
            );
        }

        self.shared.state.store(DISPOSED, Ordering::Release);
    }

    /// Shut down with the configured timeout. Idempotent.
    pub fn dispose(&self) {
        let _ = self.shutdown(self.shutdown_timeout);
    }
}

impl Drop for LoggerProvider {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for LoggerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerProvider")
            .field("gate", &self.gate())
            .field("state", &self.state())
            .field("loggers", &self.registry.len())
            .finish()
    }
}

/// Builder for [`LoggerProvider`]
///
/// # Example
/// ```
/// use scoped_logger::prelude::*;
/// use std::sync::Arc;
///
/// let provider = LoggerProvider::builder()
///     .min_level(LogLevel::Debug)
///     .sink(NullSink)
///     .workers(4)
///     .queue_capacity(4096)
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} records dropped", count);
///     }))
///     .build();
/// ```
pub struct LoggerProviderBuilder {
    gate: LevelGate,
    sinks: Vec<Arc<dyn Sink>>,
    workers: usize,
    queue_capacity: usize,
    overflow_policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    render: RenderConfig,
    host: Option<String>,
    actor: Option<String>,
    shutdown_timeout: Duration,
    #[cfg(feature = "async-sinks")]
    async_sinks: Vec<Arc<dyn AsyncSink>>,
    #[cfg(feature = "async-sinks")]
    runtime: Option<tokio::runtime::Handle>,
}

impl LoggerProviderBuilder {
    pub fn new() -> Self {
        Self {
            gate: LevelGate::default(),
            sinks: Vec::new(),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
            on_overflow: None,
            render: RenderConfig::default(),
            host: None,
            actor: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            #[cfg(feature = "async-sinks")]
            async_sinks: Vec::new(),
            #[cfg(feature = "async-sinks")]
            runtime: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn gate(mut self, gate: LevelGate) -> Self {
        self.gate = gate;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.gate = LevelGate::new(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add a sink that is also kept elsewhere
    #[must_use = "builder methods return a new value"]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of dispatch worker threads (at least one)
    #[must_use = "builder methods return a new value"]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Bound of the dispatch queue and of in-flight async writes (at least one)
    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// What happens when the dispatch queue is full. Default is `AlertAndDrop`.
    ///
    /// ```
    /// use scoped_logger::prelude::*;
    /// use std::time::Duration;
    ///
    /// let provider = LoggerProvider::builder()
    ///     .queue_capacity(100)
    ///     .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
    ///     .build();
    /// ```
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Called with the running drop count when records are dropped on overflow
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn render_config(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn identity(mut self, identity: ProcessIdentity) -> Self {
        self.host = Some(identity.host);
        self.actor = Some(identity.actor);
        self
    }

    /// Timeout used by `dispose` and `Drop`
    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    #[cfg(feature = "async-sinks")]
    #[must_use = "builder methods return a new value"]
    pub fn async_sink<S: AsyncSink + 'static>(mut self, sink: S) -> Self {
        self.async_sinks.push(Arc::new(sink));
        self
    }

    /// Runtime that async sink tasks are spawned on.
    ///
    /// Defaults to the runtime `build` is called from.
    #[cfg(feature = "async-sinks")]
    #[must_use = "builder methods return a new value"]
    pub fn runtime(mut self, runtime: tokio::runtime::Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Parse and apply a `{"Default": "<level>"}` gate
    pub fn gate_json(self, json: &str) -> Result<Self> {
        let gate = LevelGate::from_json(json).map_err(|e| {
            LoggerError::config("LevelGate", format!("cannot parse '{}': {}", json, e))
        })?;
        Ok(self.gate(gate))
    }

    pub fn build(self) -> LoggerProvider {
        let identity = match (self.host, self.actor) {
            (Some(host), Some(actor)) => ProcessIdentity::new(host, actor),
            (host, actor) => {
                let env = ProcessIdentity::from_env();
                ProcessIdentity::new(host.unwrap_or(env.host), actor.unwrap_or(env.actor))
            }
        };

        let metrics = Arc::new(ProviderMetrics::new());
        let dispatcher = Dispatcher::new(
            DispatchConfig {
                workers: self.workers,
                queue_capacity: self.queue_capacity,
                overflow_policy: self.overflow_policy,
                on_overflow: self.on_overflow,
            },
            self.sinks,
            Arc::clone(&metrics),
        );

        #[cfg(feature = "async-sinks")]
        let dispatcher = attach_async(
            dispatcher,
            self.async_sinks,
            self.runtime,
            self.queue_capacity,
            &metrics,
        );

        let shared = ProviderShared {
            gate: AtomicU8::new(self.gate.default.ordinal()),
            state: AtomicU8::new(ACTIVE),
            scopes: ScopeContext::new(),
            identity,
            render: Arc::new(self.render),
            dispatcher,
            metrics,
        };

        LoggerProvider {
            shared: Arc::new(shared),
            registry: DashMap::new(),
            shutdown_timeout: self.shutdown_timeout,
        }
    }
}

#[cfg(feature = "async-sinks")]
fn attach_async(
    dispatcher: Dispatcher,
    sinks: Vec<Arc<dyn AsyncSink>>,
    runtime: Option<tokio::runtime::Handle>,
    limit: usize,
    metrics: &Arc<ProviderMetrics>,
) -> Dispatcher {
    if sinks.is_empty() {
        return dispatcher;
    }
    let runtime = match runtime.or_else(|| tokio::runtime::Handle::try_current().ok()) {
        Some(runtime) => runtime,
        None => {
            eprintln!(
                "[LOGGER ERROR] {} async sink(s) configured without a tokio runtime; they are disabled",
                sinks.len()
            );
            return dispatcher;
        }
    };
    dispatcher.with_async(AsyncDispatch::new(runtime, sinks, limit, Arc::clone(metrics)))
}

impl Default for LoggerProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
