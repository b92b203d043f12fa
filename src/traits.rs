/*
 * Policy / Mechanism Trait Definitions
 *
 * This module defines the traits that separate selection policy from the
 * donation mechanism:
 *
 * - SelectionPolicy: the policy interface the two algorithms implement
 * - DonationCtx: the mechanism interface policies use to inspect a queue
 *
 * This separation allows:
 * 1. Swapping selection algorithms without touching the donation graph
 * 2. Testing policies against a synthetic context in isolation
 * 3. Clear ownership boundaries (policies never touch thread or queue
 *    records directly)
 */

use crate::types::{CombineRule, QueueId, ThreadId};

/// Mechanism interface for selection policies
///
/// This trait is the ONLY way a policy can query scheduler state. Waiters
/// are addressed by index in stable insertion (FIFO) order; reading an
/// effective priority may recompute and cache it, which is why the method
/// takes `&mut self`.
pub trait DonationCtx {
    /// Number of threads currently waiting on a queue
    fn waiter_count(&self, queue: QueueId) -> usize;

    /// The waiter at `index` in insertion order, or None past the end
    fn waiter_at(&self, queue: QueueId, index: usize) -> Option<ThreadId>;

    /// A thread's effective priority (base plus donations), recomputing
    /// the cached value if it is stale
    fn effective_priority(&mut self, thread: ThreadId) -> u64;
}

/// Selection policy trait
///
/// The two scheduling algorithms (ordered, lottery) implement this trait.
/// The scheduler core holds a `Box<dyn SelectionPolicy>` and consults it
/// whenever a queue must hand the resource to its next thread.
pub trait SelectionPolicy: Send {
    /// Choose which waiter `next_thread()` should dequeue, without
    /// mutating the queue
    ///
    /// Must return None when the queue has no waiters; callers never
    /// dereference a None result.
    fn pick_next(&mut self, ctx: &mut dyn DonationCtx, queue: QueueId) -> Option<ThreadId>;

    /// The combine operator this policy donates with
    ///
    /// Read once at scheduler construction to configure the donation
    /// graph's recomputation arithmetic.
    fn combine_rule(&self) -> CombineRule;

    /// Get the policy name for logging and debugging
    fn name(&self) -> &'static str;
}
