//! Ambient scope frames
//!
//! This module provides:
//! - `ScopeFrame`: a free-text or key/value breadcrumb
//! - `ScopeContext`: a stack of frames local to the current call chain
//! - `ScopeGuard`: RAII guard that pops its frames when dropped
//! - `ScopeSnapshot`: a `Send` copy of a stack, for carrying a call chain
//!   across a thread hop
//! - `InScope`: a future that carries its own stack and installs it only
//!   while it is being polled
//!
//! Frames live in thread-local storage keyed by the owning context, so two
//! threads sharing one `ScopeContext` never see each other's frames. Guards
//! from [`ScopeContext::push`] therefore suit synchronous call chains only;
//! futures interleaved on one thread (`join!`, `select!`, `spawn_local`)
//! each need [`ScopeContext::in_scope`].

use super::error::{LoggerError, Result};
use super::properties::Properties;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{self, Poll};

/// One scope breadcrumb: either free text or a set of properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScopeFrame {
    Text(String),
    Properties(Properties),
}

impl ScopeFrame {
    pub fn text(text: impl Into<String>) -> Self {
        ScopeFrame::Text(text.into())
    }

    pub fn properties(properties: Properties) -> Self {
        ScopeFrame::Properties(properties)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScopeFrame::Text(text) => Some(text),
            ScopeFrame::Properties(_) => None,
        }
    }

    pub fn as_properties(&self) -> Option<&Properties> {
        match self {
            ScopeFrame::Text(_) => None,
            ScopeFrame::Properties(properties) => Some(properties),
        }
    }
}

impl fmt::Display for ScopeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeFrame::Text(text) => f.write_str(text),
            ScopeFrame::Properties(properties) => write!(f, "{}", properties),
        }
    }
}

impl From<&str> for ScopeFrame {
    fn from(text: &str) -> Self {
        ScopeFrame::text(text)
    }
}

impl From<String> for ScopeFrame {
    fn from(text: String) -> Self {
        ScopeFrame::Text(text)
    }
}

impl From<Properties> for ScopeFrame {
    fn from(properties: Properties) -> Self {
        ScopeFrame::Properties(properties)
    }
}

/// Text shown in the single-line scope column: the innermost frame's text,
/// or empty when the innermost frame carries properties.
pub fn current_scope_text(frames: &[ScopeFrame]) -> &str {
    frames.last().and_then(ScopeFrame::as_text).unwrap_or("")
}

struct ActiveFrame {
    token: u64,
    frame: ScopeFrame,
}

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static ACTIVE_SCOPES: RefCell<HashMap<u64, Vec<ActiveFrame>>> = RefCell::new(HashMap::new());
}

/// Stack of scope frames, local to each call chain.
///
/// One instance is shared by every [`Logger`](super::Logger) of a provider.
/// Pushing returns a [`ScopeGuard`]; frames are visible to log calls made on
/// the same thread until the guard is dropped or released. Async call chains
/// sharing a thread use [`in_scope`](Self::in_scope) instead.
///
/// # Example
///
/// ```
/// use scoped_logger::core::{ScopeContext, ScopeFrame};
///
/// let scopes = ScopeContext::new();
/// let _request = scopes.push(ScopeFrame::text("Req#42"));
/// let _user = scopes.push(ScopeFrame::text("User#7"));
///
/// let mut seen = Vec::new();
/// scopes.for_each(|frame| seen.push(frame.to_string()));
/// assert_eq!(seen, vec!["Req#42", "User#7"]);
/// ```
#[derive(Debug)]
pub struct ScopeContext {
    id: u64,
    next_token: AtomicU64,
}

impl ScopeContext {
    pub fn new() -> Self {
        Self {
            id: NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed),
            next_token: AtomicU64::new(1),
        }
    }

    /// Push a frame for the current synchronous call chain
    pub fn push(&self, frame: ScopeFrame) -> ScopeGuard {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        with_scopes(|scopes| {
            scopes
                .entry(self.id)
                .or_default()
                .push(ActiveFrame { token, frame });
        });
        ScopeGuard::new(self.id, token, 1)
    }

    /// Re-enter a snapshot taken elsewhere, typically on another thread.
    ///
    /// The snapshot's frames are pushed on top of whatever is already active
    /// here, in their original order, and popped together by the guard.
    pub fn attach(&self, snapshot: &ScopeSnapshot) -> ScopeGuard {
        let count = snapshot.frames.len();
        let first = self.next_token.fetch_add(count as u64, Ordering::Relaxed);
        if count > 0 {
            with_scopes(|scopes| {
                let stack = scopes.entry(self.id).or_default();
                for (offset, frame) in snapshot.frames.iter().enumerate() {
                    stack.push(ActiveFrame {
                        token: first + offset as u64,
                        frame: frame.clone(),
                    });
                }
            });
        }
        ScopeGuard::new(self.id, first, count)
    }

    /// Run `future` with `frame` pushed on top of the frames active now.
    ///
    /// The returned future owns its stack and installs it only while polled,
    /// so other futures on the same thread never see its frames, and guards
    /// pushed inside it may be held across `.await` points.
    ///
    /// ```
    /// use scoped_logger::core::{ScopeContext, ScopeFrame};
    /// use std::sync::Arc;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let scopes = Arc::new(ScopeContext::new());
    /// let inner = Arc::clone(&scopes);
    /// let depth = scopes
    ///     .in_scope(ScopeFrame::text("Req#42"), async move { inner.depth() })
    ///     .await;
    /// assert_eq!(depth, 1);
    /// assert_eq!(scopes.depth(), 0);
    /// # });
    /// ```
    pub fn in_scope<F: Future>(&self, frame: ScopeFrame, future: F) -> InScope<F> {
        let base = self.snapshot().frames;
        let first = self.next_token.fetch_add(base.len() as u64 + 1, Ordering::Relaxed);
        let frames = base
            .into_iter()
            .chain(std::iter::once(frame))
            .enumerate()
            .map(|(offset, frame)| ActiveFrame {
                token: first + offset as u64,
                frame,
            })
            .collect();

        InScope {
            context_id: self.id,
            frames,
            inner: Some(Box::pin(future)),
        }
    }

    /// Visit every active frame, outermost first.
    ///
    /// The frames are copied before visiting, so `visit` may push scopes of
    /// its own without affecting this enumeration.
    pub fn for_each<F: FnMut(&ScopeFrame)>(&self, mut visit: F) {
        for frame in self.snapshot().frames.iter() {
            visit(frame);
        }
    }

    /// Copy of the active frames, outermost first
    pub fn snapshot(&self) -> ScopeSnapshot {
        let frames = ACTIVE_SCOPES
            .try_with(|scopes| {
                scopes
                    .borrow()
                    .get(&self.id)
                    .map(|stack| stack.iter().map(|active| active.frame.clone()).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default();
        ScopeSnapshot { frames }
    }

    /// Number of frames active on this thread
    pub fn depth(&self) -> usize {
        ACTIVE_SCOPES
            .try_with(|scopes| scopes.borrow().get(&self.id).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl Default for ScopeContext {
    fn default() -> Self {
        Self::new()
    }
}

fn with_scopes<R>(f: impl FnOnce(&mut HashMap<u64, Vec<ActiveFrame>>) -> R) -> R {
    ACTIVE_SCOPES.with(|scopes| f(&mut scopes.borrow_mut()))
}

/// Future returned by [`ScopeContext::in_scope`].
#[must_use = "futures do nothing unless polled"]
pub struct InScope<F> {
    context_id: u64,
    frames: Vec<ActiveFrame>,
    inner: Option<Pin<Box<F>>>,
}

impl<F> InScope<F> {
    fn enter(&mut self) -> Entered<'_> {
        let context_id = self.context_id;
        let own = std::mem::take(&mut self.frames);
        let outer = ACTIVE_SCOPES
            .try_with(|scopes| {
                let mut scopes = scopes.borrow_mut();
                let outer = scopes.remove(&context_id);
                if !own.is_empty() {
                    scopes.insert(context_id, own);
                }
                outer
            })
            .ok()
            .flatten();

        Entered {
            context_id,
            frames: &mut self.frames,
            outer,
        }
    }
}

impl<F: Future> Future for InScope<F> {
    type Output = F::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> Poll<F::Output> {
        let this = &mut *self;
        let mut inner = match this.inner.take() {
            Some(inner) => inner,
            None => panic!("`InScope` polled after completion"),
        };

        let entered = this.enter();
        let poll = inner.as_mut().poll(cx);
        if poll.is_pending() {
            drop(entered);
            this.inner = Some(inner);
        } else {
            // Locals of the finished future drop while its stack is installed
            drop(inner);
            drop(entered);
        }
        poll
    }
}

impl<F> Drop for InScope<F> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            let _entered = self.enter();
            drop(inner);
        }
    }
}

impl<F> fmt::Debug for InScope<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InScope")
            .field("context_id", &self.context_id)
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// Restores the outer stack when an `InScope` poll ends, even by panic.
struct Entered<'a> {
    context_id: u64,
    frames: &'a mut Vec<ActiveFrame>,
    outer: Option<Vec<ActiveFrame>>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        let context_id = self.context_id;
        let outer = self.outer.take();
        let own = ACTIVE_SCOPES
            .try_with(|scopes| {
                let mut scopes = scopes.borrow_mut();
                let own = scopes.remove(&context_id);
                if let Some(outer) = outer {
                    scopes.insert(context_id, outer);
                }
                own
            })
            .ok()
            .flatten();
        *self.frames = own.unwrap_or_default();
    }
}

/// Frozen copy of a scope stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeSnapshot {
    frames: Vec<ScopeFrame>,
}

impl ScopeSnapshot {
    pub fn frames(&self) -> &[ScopeFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_frames(self) -> Vec<ScopeFrame> {
        self.frames
    }
}

/// RAII guard for scope frames
///
/// Dropping the guard removes exactly the frames it pushed. Guards are bound
/// to the thread that created them and cannot be sent elsewhere.
///
/// Releasing a guard while a newer frame is still active is a caller error:
/// [`ScopeGuard::release`] reports it as [`LoggerError::ScopeOutOfOrder`].
/// The guard's own frames are removed either way and the newer frames stay.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct ScopeGuard {
    context_id: u64,
    first_token: u64,
    count: usize,
    released: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl ScopeGuard {
    fn new(context_id: u64, first_token: u64, count: usize) -> Self {
        Self {
            context_id,
            first_token,
            count,
            released: false,
            _thread_bound: PhantomData,
        }
    }

    /// End the scope explicitly, checking LIFO order
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.remove()
    }

    fn remove(&self) -> Result<()> {
        if self.count == 0 {
            return Ok(());
        }
        let first = self.first_token;
        let last = first + self.count as u64 - 1;
        let context_id = self.context_id;

        // try_with: the guard may be dropped during thread-local teardown.
        ACTIVE_SCOPES
            .try_with(|scopes| {
                let mut scopes = scopes.borrow_mut();
                let Some(stack) = scopes.get_mut(&context_id) else {
                    return Ok(());
                };
                let newer = stack.iter().filter(|active| active.token > last).count();
                stack.retain(|active| active.token < first || active.token > last);
                if stack.is_empty() {
                    scopes.remove(&context_id);
                }
                if newer > 0 {
                    Err(LoggerError::ScopeOutOfOrder { active: newer })
                } else {
                    Ok(())
                }
            })
            .unwrap_or(Ok(()))
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.remove();
        }
    }
}

impl fmt::Debug for ScopeGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeGuard")
            .field("context_id", &self.context_id)
            .field("frames", &self.count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(scopes: &ScopeContext) -> Vec<String> {
        let mut seen = Vec::new();
        scopes.for_each(|frame| seen.push(frame.to_string()));
        seen
    }

    #[test]
    fn test_push_order_is_outermost_first() {
        let scopes = ScopeContext::new();
        let _a = scopes.push(ScopeFrame::text("A"));
        let _b = scopes.push(ScopeFrame::text("B"));

        assert_eq!(texts(&scopes), vec!["A", "B"]);
        assert_eq!(scopes.depth(), 2);
    }

    #[test]
    fn test_empty_context_visits_nothing() {
        let scopes = ScopeContext::new();
        let mut calls = 0;
        scopes.for_each(|_| calls += 1);
        assert_eq!(calls, 0);
        assert!(scopes.snapshot().is_empty());
    }

    #[test]
    fn test_guard_drop_pops_frame() {
        let scopes = ScopeContext::new();
        let _outer = scopes.push(ScopeFrame::text("outer"));
        {
            let _inner = scopes.push(ScopeFrame::text("inner"));
            assert_eq!(scopes.depth(), 2);
        }
        assert_eq!(texts(&scopes), vec!["outer"]);
    }

    #[test]
    fn test_release_in_order() {
        let scopes = ScopeContext::new();
        let a = scopes.push(ScopeFrame::text("A"));
        let b = scopes.push(ScopeFrame::text("B"));

        assert!(b.release().is_ok());
        assert!(a.release().is_ok());
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_release_out_of_order_is_reported() {
        let scopes = ScopeContext::new();
        let a = scopes.push(ScopeFrame::text("A"));
        let _b = scopes.push(ScopeFrame::text("B"));

        let result = a.release();
        assert!(matches!(result, Err(LoggerError::ScopeOutOfOrder { active: 1 })));
        // A is gone, B survives
        assert_eq!(texts(&scopes), vec!["B"]);
    }

    #[test]
    fn test_contexts_are_independent() {
        let first = ScopeContext::new();
        let second = ScopeContext::new();
        let _guard = first.push(ScopeFrame::text("only-first"));

        assert_eq!(first.depth(), 1);
        assert_eq!(second.depth(), 0);
    }

    #[test]
    fn test_threads_do_not_share_frames() {
        let scopes = std::sync::Arc::new(ScopeContext::new());
        let _main = scopes.push(ScopeFrame::text("main"));

        let worker = std::sync::Arc::clone(&scopes);
        let seen = std::thread::spawn(move || {
            let _own = worker.push(ScopeFrame::text("worker"));
            texts(&worker)
        })
        .join()
        .unwrap();

        assert_eq!(seen, vec!["worker"]);
        assert_eq!(texts(&scopes), vec!["main"]);
    }

    #[test]
    fn test_snapshot_attach_across_threads() {
        let scopes = std::sync::Arc::new(ScopeContext::new());
        let _req = scopes.push(ScopeFrame::text("Req#42"));
        let _user = scopes.push(ScopeFrame::properties(Properties::new().with("user", 7)));
        let snapshot = scopes.snapshot();

        let worker = std::sync::Arc::clone(&scopes);
        let (during, after) = std::thread::spawn(move || {
            let guard = worker.attach(&snapshot);
            let during = worker.snapshot();
            drop(guard);
            (during, worker.depth())
        })
        .join()
        .unwrap();

        assert_eq!(during.frames().len(), 2);
        assert_eq!(during.frames()[0], ScopeFrame::text("Req#42"));
        assert_eq!(after, 0);
    }

    #[tokio::test]
    async fn test_interleaved_chains_keep_their_own_frames() {
        use std::sync::Arc;
        use std::time::Duration;

        let scopes = Arc::new(ScopeContext::new());
        let (a_ctx, b_ctx) = (Arc::clone(&scopes), Arc::clone(&scopes));

        let chain_a = scopes.in_scope(ScopeFrame::text("Req#A"), async move {
            let _step = a_ctx.push(ScopeFrame::text("Step#1"));
            tokio::time::sleep(Duration::from_millis(30)).await;
            texts(&a_ctx)
        });
        let chain_b = scopes.in_scope(ScopeFrame::text("Req#B"), async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            texts(&b_ctx)
        });
        let bare = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            texts(&scopes)
        };

        let (a, b, outside) = tokio::join!(chain_a, chain_b, bare);
        assert_eq!(a, vec!["Req#A", "Step#1"]);
        assert_eq!(b, vec!["Req#B"]);
        assert!(outside.is_empty());
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_in_scope_inherits_and_restores() {
        let scopes = ScopeContext::new();
        let _outer = scopes.push(ScopeFrame::text("outer"));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let seen = runtime.block_on(scopes.in_scope(ScopeFrame::text("inner"), async {
            texts(&scopes)
        }));

        assert_eq!(seen, vec!["outer", "inner"]);
        assert_eq!(texts(&scopes), vec!["outer"]);
    }

    #[test]
    fn test_dropping_unfinished_in_scope_leaves_no_frames() {
        let scopes = ScopeContext::new();
        let pending = scopes.in_scope(ScopeFrame::text("never-run"), std::future::pending::<()>());
        drop(pending);
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn test_current_scope_text() {
        let frames = vec![ScopeFrame::text("A"), ScopeFrame::text("B")];
        assert_eq!(current_scope_text(&frames), "B");

        let frames = vec![
            ScopeFrame::text("A"),
            ScopeFrame::properties(Properties::new().with("k", 1)),
        ];
        assert_eq!(current_scope_text(&frames), "");
        assert_eq!(current_scope_text(&[]), "");
    }

    #[test]
    fn test_visitor_may_push() {
        let scopes = ScopeContext::new();
        let _a = scopes.push(ScopeFrame::text("A"));
        let mut visited = 0;
        scopes.for_each(|_| {
            let _nested = scopes.push(ScopeFrame::text("nested"));
            visited += 1;
        });
        assert_eq!(visited, 1);
        assert_eq!(scopes.depth(), 1);
    }
}
