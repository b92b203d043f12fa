/*
 * Priority Donation Scheduler Core
 *
 * This crate implements a thread scheduler core that resolves priority
 * inversion through priority donation: a thread blocked on a resource
 * temporarily lends its urgency to the thread currently holding that
 * resource, transitively, across chains of locks and joins.
 *
 * PRIORITY DONATION EXPLAINED:
 * ===========================
 *
 * Without donation, a high-priority thread H waiting on a lock held by a
 * low-priority thread L can be starved indefinitely: a medium-priority
 * thread M keeps preempting L, so L never runs and never releases the lock
 * H needs. This is the classic priority inversion problem.
 *
 * With donation, H's urgency flows to L for as long as L holds the lock:
 *
 *   H --waits on--> Q1 --held by--> L        eff(L) includes eff(H)
 *
 * Donation is transitive. If L itself waits on another queue, its inflated
 * urgency keeps flowing upstream through that queue's holder, and so on.
 *
 * TWO SELECTION POLICIES:
 * ======================
 *
 * 1. ORDERED: deterministic highest-effective-priority-first, FIFO among
 *    equals. Donated values combine with max.
 * 2. LOTTERY: randomized, selection probability proportional to a thread's
 *    (possibly donation-inflated) ticket count. Donated values combine with
 *    a saturating sum, and no per-ticket state is kept even when ticket
 *    counts reach the billions.
 *
 * CACHING DISCIPLINE:
 * ==================
 *
 * Effective priority is an arbitrarily deep mutual recursion across the
 * live ownership graph (threads consult held queues, queues consult their
 * waiters). Every node caches its last computed value and carries a dirty
 * flag; mutations propagate dirty marks along the live edges and stop at
 * the first already-dirty node, so invalidation is O(chain length) and
 * repeated reads are O(1).
 *
 * SCOPE:
 * =====
 *
 * Thread lifecycle, context switching, and the interrupts-disabled
 * atomicity guarantee are external collaborators. Every operation here is
 * a synchronous, bounded, in-memory computation; the scheduler only
 * answers "who holds this resource" and "who goes next".
 *
 * Key features:
 * - Transitive priority donation through locks and joins
 * - Lazy invalidation with short-circuiting dirty propagation
 * - Deterministic (ordered) and randomized (lottery) selection policies
 * - O(waiters) lottery draws with O(1) extra space
 * - no_std + alloc, suitable for kernel or userspace runtimes
 */

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod graph;
pub mod policies;
pub mod queue;
pub mod rng;
pub mod sched_core;
pub mod thread;
pub mod traits;
pub mod types;

pub use graph::{DonationGraph, GraphStats};
pub use policies::{LotteryPolicy, OrderedPolicy};
pub use sched_core::SchedulerCore;
pub use traits::{DonationCtx, SelectionPolicy};
pub use types::{CombineRule, Priority, QueueId, ThreadId};
