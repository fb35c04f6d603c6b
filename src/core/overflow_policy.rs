//! Overflow policies for the dispatch queue
//!
//! When the bounded dispatch queue is full, these policies decide what
//! happens to a new entry. Only the blocking variants can make a logging
//! call wait, and only when chosen explicitly.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Policy for handling a full dispatch queue
///
/// # Example
///
/// ```
/// use scoped_logger::OverflowPolicy;
/// use std::time::Duration;
///
/// // Default behavior: alert and drop
/// let policy = OverflowPolicy::default();
///
/// // Block with timeout
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Drop the new entry silently; metrics still count it
    DropNewest,

    /// Wait until space is available
    ///
    /// Applies backpressure to the logging thread. Only use when every
    /// entry matters more than caller latency.
    Block,

    /// Wait up to the timeout, then drop
    BlockWithTimeout(Duration),

    /// Drop, report on stderr and invoke the overflow callback
    #[default]
    AlertAndDrop,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when entries are dropped due to queue overflow.
/// The parameter is the total count of dropped entries so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
