/*
 * Resource Wait Queue State
 *
 * This module defines the record kept for each contended resource: the
 * FIFO sequence of waiting threads, the current holder, and the cached
 * aggregate effective priority of the waiters.
 *
 * A queue created with `transfer_enabled = false` never participates in
 * donation; it acts as a plain FIFO/lottery pool with no effect on its
 * holder's priority.
 */

use alloc::collections::VecDeque;

use crate::types::{CombineRule, ThreadId};

/// Wait queue state for one contended resource
///
/// `waiting` preserves strict insertion order. That order is the FIFO
/// tie-break for the ordered policy and the stable enumeration order the
/// lottery policy relies on so its ticket sum and its re-scan agree.
#[derive(Debug, Clone)]
pub struct WaitQueueState {
    /// Whether this queue transfers priority/tickets from waiting threads
    /// to the owning thread
    pub transfer_enabled: bool,

    /// Waiting threads in insertion (FIFO) order; a thread is never
    /// enqueued twice without first being dequeued
    pub waiting: VecDeque<ThreadId>,

    /// Current owner of the resource, if any
    pub holder: Option<ThreadId>,

    /// Memoized combine-reduction over the waiters' effective priorities
    pub cached_effective: u64,

    /// True when `cached_effective` is stale
    pub dirty: bool,
}

impl WaitQueueState {
    /// Create the state for a newly allocated wait queue
    pub fn new(transfer_enabled: bool) -> Self {
        Self {
            transfer_enabled,
            waiting: VecDeque::new(),
            holder: None,
            cached_effective: CombineRule::IDENTITY,
            dirty: false,
        }
    }

    /// True when the queue has neither a holder nor waiters
    ///
    /// A queue must be idle before its resource (and this record) may be
    /// destroyed.
    pub fn is_idle(&self) -> bool {
        self.holder.is_none() && self.waiting.is_empty()
    }
}
