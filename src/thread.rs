/*
 * Per-Thread Scheduling State
 *
 * This module defines the scheduling record kept for each schedulable
 * thread: its base priority, the memoized effective priority, the set of
 * resources it currently holds, and the single queue (if any) it is
 * waiting on.
 *
 * Records are created lazily by the donation graph on a thread's first
 * scheduler interaction and live for the thread's lifetime.
 */

use alloc::collections::BTreeSet;

use crate::types::{Priority, QueueId};

/// Scheduling state of one thread
///
/// The `held` and `waiting_on` fields are the thread's edges in the
/// donation graph. A thread may hold any number of queues at once (nested
/// locks) but waits on at most one queue at a time.
#[derive(Debug, Clone)]
pub struct ThreadSchedState {
    /// Explicitly set base priority / base ticket count
    pub base: Priority,

    /// Memoized result of the donation computation
    pub cached_effective: u64,

    /// True when `cached_effective` is stale and must be recomputed
    /// before the next read
    pub dirty: bool,

    /// Queues this thread currently owns (unordered, no duplicates)
    pub held: BTreeSet<QueueId>,

    /// The queue this thread is currently enqueued on, if any
    pub waiting_on: Option<QueueId>,
}

impl ThreadSchedState {
    /// Create the state for a thread on its first scheduler contact
    pub fn new() -> Self {
        Self {
            base: Priority::DEFAULT,
            cached_effective: Priority::DEFAULT.as_weight(),
            dirty: false,
            held: BTreeSet::new(),
            waiting_on: None,
        }
    }
}

impl Default for ThreadSchedState {
    fn default() -> Self {
        Self::new()
    }
}
