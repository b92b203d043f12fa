/*
 * Scheduler Core - Public Surface
 *
 * This module implements SchedulerCore, the stable facade the lifecycle
 * collaborator talks to:
 *
 * 1. Holds the donation graph (mechanism) and the active selection
 *    policy (Box<dyn SelectionPolicy>)
 * 2. Exposes queue creation, wait/acquire/next-thread, and the priority
 *    accessors
 * 3. Provides the two thin factories that pair a policy with the
 *    matching donation arithmetic
 *
 * EXTERNAL CONTRACT:
 * =================
 *
 * Every call happens under the collaborator's disabled-preemption
 * guarantee: no scheduler operation is ever concurrent with another. No
 * operation blocks, suspends, or performs I/O; each is linear in the
 * number of waiters on the queue being touched, and repeated
 * effective-priority reads are O(1) thanks to the dirty-flag caches.
 *
 * The scheduler never initiates a context switch. It only answers "who
 * holds this resource" and "who goes next"; acting on the answer is the
 * collaborator's job.
 */

use alloc::boxed::Box;

use crate::graph::{DonationGraph, GraphStats};
use crate::policies::{LotteryPolicy, OrderedPolicy};
use crate::traits::SelectionPolicy;
use crate::types::{Priority, QueueId, ThreadId};

/// The scheduler core
///
/// Owns all scheduling state for one scheduler instance. Construct via
/// [`SchedulerCore::ordered`] or [`SchedulerCore::lottery`].
pub struct SchedulerCore {
    graph: DonationGraph,
    policy: Box<dyn SelectionPolicy>,
}

impl SchedulerCore {
    /// Create a scheduler core around an arbitrary policy
    ///
    /// The policy's combine rule configures the donation graph's
    /// recomputation arithmetic.
    pub fn new(policy: Box<dyn SelectionPolicy>) -> Self {
        log::info!("SchedulerCore initialized with policy: {}", policy.name());
        Self {
            graph: DonationGraph::new(policy.combine_rule()),
            policy,
        }
    }

    /// Deterministic highest-priority-first scheduler with FIFO
    /// tie-breaking
    pub fn ordered() -> Self {
        Self::new(Box::new(OrderedPolicy::new()))
    }

    /// Randomized proportional-share scheduler drawing from the
    /// process-wide generator
    pub fn lottery() -> Self {
        Self::new(Box::new(LotteryPolicy::new()))
    }

    /// Lottery scheduler with a private seeded generator, for
    /// reproducible selections
    pub fn lottery_with_seed(seed: u64) -> Self {
        Self::new(Box::new(LotteryPolicy::with_seed(seed)))
    }

    /// Name of the active policy
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    // ========================================================================
    // EXTERNAL API - What the lifecycle collaborator calls
    // ========================================================================

    /// Allocate a new resource wait queue
    ///
    /// `transfer_enabled` decides whether the queue donates its waiters'
    /// priority/tickets to the holding thread.
    pub fn new_queue(&mut self, transfer_enabled: bool) -> QueueId {
        self.graph.new_queue(transfer_enabled)
    }

    /// Destroy a wait queue; fatal if it still has a holder or waiters
    pub fn destroy_queue(&mut self, queue: QueueId) {
        self.graph.destroy_queue(queue);
    }

    /// Enqueue a thread that could not immediately acquire the resource
    pub fn wait_for_access(&mut self, queue: QueueId, thread: ThreadId) {
        self.graph.wait_for_access(queue, thread);
    }

    /// Hand the resource to a thread directly (it was free, or the
    /// collaborator is transferring ownership explicitly)
    pub fn acquire(&mut self, queue: QueueId, thread: ThreadId) {
        self.graph.acquire(queue, thread);
    }

    /// Dequeue the next thread the policy selects, transferring
    /// ownership of the resource to it
    ///
    /// Returns None (with no side effects) when nothing is waiting.
    pub fn next_thread(&mut self, queue: QueueId) -> Option<ThreadId> {
        if self.graph.waiter_count(queue) == 0 {
            return None;
        }

        let picked = self.policy.pick_next(&mut self.graph, queue)?;
        self.graph.acquire(queue, picked);
        self.graph.remove_waiter(queue, picked);
        log::debug!("[{}] {queue}: dequeued {picked}", self.policy.name());
        Some(picked)
    }

    /// Pull a thread off a queue's waiting set without selecting it
    /// (timeout expiry and similar externally driven removals)
    pub fn remove_waiter(&mut self, queue: QueueId, thread: ThreadId) {
        self.graph.remove_waiter(queue, thread);
    }

    /// Current owner of a resource, or None if it is free
    pub fn holder(&self, queue: QueueId) -> Option<ThreadId> {
        self.graph.holder(queue)
    }

    /// A thread's base priority
    pub fn priority(&mut self, thread: ThreadId) -> Priority {
        self.graph.priority(thread)
    }

    /// Set a thread's base priority; fatal outside [MIN, MAX]
    pub fn set_priority(&mut self, thread: ThreadId, priority: Priority) {
        self.graph.set_priority(thread, priority);
    }

    /// A thread's effective priority (base plus donations)
    pub fn effective_priority(&mut self, thread: ThreadId) -> u64 {
        self.graph.thread_effective(thread)
    }

    /// Step a thread's base priority up; false at the upper bound
    pub fn increase_priority(&mut self, thread: ThreadId) -> bool {
        self.graph.increase_priority(thread)
    }

    /// Step a thread's base priority down; false at the lower bound
    pub fn decrease_priority(&mut self, thread: ThreadId) -> bool {
        self.graph.decrease_priority(thread)
    }

    /// Caching/propagation counters for diagnostics
    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    /// Direct access to the donation graph
    ///
    /// Exists for diagnostics and tests; the collaborator surface above
    /// is the intended entry point.
    pub fn graph(&self) -> &DonationGraph {
        &self.graph
    }
}

impl core::fmt::Debug for SchedulerCore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SchedulerCore")
            .field("policy", &self.policy.name())
            .field("graph", &self.graph)
            .finish()
    }
}
