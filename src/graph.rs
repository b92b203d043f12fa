/*
 * Donation Graph - Mechanism Layer
 *
 * This module implements DonationGraph, the arena that owns every
 * per-thread and per-queue scheduling record and performs:
 *
 * 1. Structural mutations: enqueueing waiters, transferring ownership,
 *    removing waiters, queue creation/destruction
 * 2. Dirty-flag propagation along the live ownership edges
 * 3. The recursive effective-priority recomputation
 *
 * GRAPH SHAPE:
 * ===========
 *
 * The donation graph is the union of three edge kinds:
 *
 *   thread --waiting_on--> queue       (at most one per thread)
 *   queue  --holder-----> thread       (at most one per queue)
 *   thread --held-------> queue        (any number per thread)
 *
 * Records reference each other by ThreadId/QueueId only; the arena owns
 * everything, so cross-ownership never creates lifetime ambiguity. The
 * live graph is assumed acyclic: a thread transitively waiting on a
 * resource it holds is a deadlock in the collaborator, and deadlock
 * detection is out of scope here.
 *
 * DIRTY PROPAGATION:
 * =================
 *
 * Any mutation that can change a reachable effective priority marks the
 * touched node dirty, and the mark travels upstream: a dirty thread marks
 * the queue it waits on, a dirty queue marks its holder. Propagation
 * stops at the first already-dirty node. Without that short-circuit a
 * chain of k donation hops would cost O(k^2) per mutation instead of
 * O(k); with it, each node is visited at most once per mutation.
 *
 * RECOMPUTATION:
 * =============
 *
 * A dirty read always resets to the identity/base value and recombines
 * over the current donors, never adjusts incrementally. A running
 * maximum without the reset could only ever rise, so effective priority
 * would stay inflated after a high-priority donor departs.
 */

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::queue::WaitQueueState;
use crate::thread::ThreadSchedState;
use crate::traits::DonationCtx;
use crate::types::{CombineRule, Priority, QueueId, ThreadId};

/// Bookkeeping counters for the caching discipline
///
/// `dirty_marks` counts nodes actually marked dirty (short-circuited
/// propagations do not count); `recomputes` counts cache rebuilds (cache
/// hits do not count). Both exist so the O(k) propagation bound and the
/// O(1) repeated-read guarantee stay observable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct GraphStats {
    /// Nodes (threads + queues) marked dirty since construction
    pub dirty_marks: u64,

    /// Effective-priority cache rebuilds since construction
    pub recomputes: u64,
}

/// The donation graph arena
///
/// Owns all thread and queue scheduling records. Thread records are
/// created lazily on a thread's first scheduler interaction; queue
/// records are created by `new_queue` and live until `destroy_queue`.
#[derive(Debug)]
pub struct DonationGraph {
    threads: BTreeMap<ThreadId, ThreadSchedState>,
    queues: BTreeMap<QueueId, WaitQueueState>,
    next_queue_id: u64,
    combine: CombineRule,
    stats: GraphStats,
}

impl DonationGraph {
    /// Create an empty graph using the given donation arithmetic
    pub fn new(combine: CombineRule) -> Self {
        Self {
            threads: BTreeMap::new(),
            queues: BTreeMap::new(),
            next_queue_id: 0,
            combine,
            stats: GraphStats::default(),
        }
    }

    /// The combine rule this graph donates with
    pub fn combine_rule(&self) -> CombineRule {
        self.combine
    }

    /// Caching/propagation counters
    pub fn stats(&self) -> GraphStats {
        self.stats
    }

    // ========================================================================
    // QUEUE LIFECYCLE
    // ========================================================================

    /// Allocate a new resource wait queue
    pub fn new_queue(&mut self, transfer_enabled: bool) -> QueueId {
        let qid = QueueId(self.next_queue_id);
        self.next_queue_id += 1;
        self.queues.insert(qid, WaitQueueState::new(transfer_enabled));
        log::trace!("[Graph] created {qid} (transfer_enabled={transfer_enabled})");
        qid
    }

    /// Destroy a wait queue
    ///
    /// # Panics
    /// Panics if the queue still has a holder or waiters; the resource
    /// must be quiesced before its queue is torn down.
    pub fn destroy_queue(&mut self, queue: QueueId) {
        let state = match self.queues.remove(&queue) {
            Some(state) => state,
            None => panic!("destroy_queue: {queue} does not exist"),
        };
        assert!(
            state.is_idle(),
            "destroy_queue: {queue} still has a holder or waiters"
        );
        log::trace!("[Graph] destroyed {queue}");
    }

    // ========================================================================
    // RECORD ACCESS
    // ========================================================================

    fn queue_ref(&self, queue: QueueId) -> &WaitQueueState {
        match self.queues.get(&queue) {
            Some(state) => state,
            None => panic!("{queue} does not exist"),
        }
    }

    fn queue_mut(&mut self, queue: QueueId) -> &mut WaitQueueState {
        match self.queues.get_mut(&queue) {
            Some(state) => state,
            None => panic!("{queue} does not exist"),
        }
    }

    /// Thread record, created lazily on first contact
    fn thread_mut(&mut self, thread: ThreadId) -> &mut ThreadSchedState {
        self.threads.entry(thread).or_default()
    }

    /// Current owner of a resource, or None if it is free
    pub fn holder(&self, queue: QueueId) -> Option<ThreadId> {
        self.queue_ref(queue).holder
    }

    /// Number of threads waiting on a queue
    pub fn waiter_count(&self, queue: QueueId) -> usize {
        self.queue_ref(queue).waiting.len()
    }

    /// The waiter at `index` in insertion order
    pub fn waiter_at(&self, queue: QueueId, index: usize) -> Option<ThreadId> {
        self.queue_ref(queue).waiting.get(index).copied()
    }

    // ========================================================================
    // BASE PRIORITY
    // ========================================================================

    /// A thread's base priority
    pub fn priority(&mut self, thread: ThreadId) -> Priority {
        self.thread_mut(thread).base
    }

    /// Set a thread's base priority
    ///
    /// No-op when the value is unchanged; otherwise the thread is marked
    /// dirty and the mark propagates upstream.
    ///
    /// # Panics
    /// Panics if `priority` is outside [Priority::MIN, Priority::MAX].
    pub fn set_priority(&mut self, thread: ThreadId, priority: Priority) {
        assert!(
            priority >= Priority::MIN && priority <= Priority::MAX,
            "set_priority: {priority} outside [{}, {}]",
            Priority::MIN,
            Priority::MAX
        );

        let state = self.thread_mut(thread);
        if state.base == priority {
            return;
        }

        log::debug!("[Graph] {thread} base priority {} -> {priority}", state.base);
        state.base = priority;
        self.set_thread_dirty(thread);
    }

    /// Raise a thread's base priority by one step
    ///
    /// Returns false (and does nothing) at the upper bound.
    pub fn increase_priority(&mut self, thread: ThreadId) -> bool {
        let current = self.priority(thread);
        if current == Priority::MAX {
            return false;
        }
        self.set_priority(thread, Priority(current.get() + 1));
        true
    }

    /// Lower a thread's base priority by one step
    ///
    /// Returns false (and does nothing) at the lower bound.
    pub fn decrease_priority(&mut self, thread: ThreadId) -> bool {
        let current = self.priority(thread);
        if current == Priority::MIN {
            return false;
        }
        self.set_priority(thread, Priority(current.get() - 1));
        true
    }

    // ========================================================================
    // STRUCTURAL MUTATIONS
    // ========================================================================

    /// Enqueue a thread on a wait queue
    ///
    /// Called only when the thread cannot immediately acquire the
    /// resource. The thread joins the end of the FIFO sequence and the
    /// queue is marked dirty (it gained a donor).
    ///
    /// # Panics
    /// Panics if the thread is already waiting on some queue; a thread
    /// is in at most one waiting set at a time.
    pub fn wait_for_access(&mut self, queue: QueueId, thread: ThreadId) {
        let state = self.thread_mut(thread);
        if let Some(current) = state.waiting_on {
            panic!("wait_for_access: {thread} is already waiting on {current}");
        }

        self.queue_mut(queue).waiting.push_back(thread);
        self.set_queue_dirty(queue);
        self.thread_mut(thread).waiting_on = Some(queue);
        log::trace!("[Graph] {thread} now waiting on {queue}");
    }

    /// Make a thread the owner of a resource
    ///
    /// Called when the resource was free, or when a selection just chose
    /// the thread. If the queue already had a holder and transfers
    /// priority, the queue is detached from the former holder's held set
    /// and the former holder is marked dirty (it lost a donation
    /// source). The new holder is marked dirty as well; recomputing from
    /// base handles both directions uniformly.
    pub fn acquire(&mut self, queue: QueueId, thread: ThreadId) {
        let transfer_enabled = self.queue_ref(queue).transfer_enabled;

        if let Some(former) = self.queue_ref(queue).holder {
            if transfer_enabled {
                self.thread_mut(former).held.remove(&queue);
                self.set_thread_dirty(former);
                log::debug!("[Graph] {queue} detached from former holder {former}");
            }
        }

        self.queue_mut(queue).holder = Some(thread);

        let state = self.thread_mut(thread);
        if state.waiting_on == Some(queue) {
            state.waiting_on = None;
        }
        state.held.insert(queue);
        self.set_thread_dirty(thread);
        log::trace!("[Graph] {thread} acquired {queue}");
    }

    /// Remove a thread from a queue's waiting set
    ///
    /// The externally driven removal primitive (a timeout expiring, a
    /// selection completing). The queue is marked dirty because its
    /// aggregate shrank.
    ///
    /// # Panics
    /// Panics if the thread is not in the queue's waiting set.
    pub fn remove_waiter(&mut self, queue: QueueId, thread: ThreadId) {
        let state = self.queue_mut(queue);
        let before = state.waiting.len();
        state.waiting.retain(|&tid| tid != thread);
        assert!(
            state.waiting.len() < before,
            "remove_waiter: {thread} is not waiting on {queue}"
        );

        let thread_state = self.thread_mut(thread);
        if thread_state.waiting_on == Some(queue) {
            thread_state.waiting_on = None;
        }
        self.set_queue_dirty(queue);
        log::trace!("[Graph] {thread} removed from {queue}");
    }

    // ========================================================================
    // DIRTY PROPAGATION
    // ========================================================================

    /// Mark a thread's cached effective priority stale
    ///
    /// Propagation stops at an already-dirty node: any ancestor reading
    /// this thread's value will recompute transitively anyway, so
    /// re-walking its subgraph buys nothing.
    pub fn set_thread_dirty(&mut self, thread: ThreadId) {
        let state = self.thread_mut(thread);
        if state.dirty {
            return;
        }
        state.dirty = true;
        self.stats.dirty_marks += 1;

        if let Some(queue) = self.threads[&thread].waiting_on {
            self.set_queue_dirty(queue);
        }
    }

    /// Mark a queue's cached aggregate stale
    ///
    /// No-op on transfer-disabled queues, which are structurally outside
    /// the donation graph. Mirrors `set_thread_dirty` along the holder
    /// edge.
    pub fn set_queue_dirty(&mut self, queue: QueueId) {
        let state = self.queue_mut(queue);
        if !state.transfer_enabled || state.dirty {
            return;
        }
        state.dirty = true;
        self.stats.dirty_marks += 1;

        if let Some(holder) = self.queue_ref(queue).holder {
            self.set_thread_dirty(holder);
        }
    }

    // ========================================================================
    // EFFECTIVE PRIORITY
    // ========================================================================

    /// A thread's effective priority: base plus donations through every
    /// queue it holds
    ///
    /// O(1) when the cache is clean. A dirty read resets to the base
    /// priority and recombines over the held queues, recursing into
    /// their waiters; the recursion terminates because the live graph is
    /// acyclic under the no-deadlock assumption.
    pub fn thread_effective(&mut self, thread: ThreadId) -> u64 {
        if !self.thread_mut(thread).dirty {
            return self.threads[&thread].cached_effective;
        }

        let held: Vec<QueueId> = self.threads[&thread].held.iter().copied().collect();
        let mut weight = self.threads[&thread].base.as_weight();
        for queue in held {
            let donated = self.queue_effective(queue);
            weight = self.combine.combine(weight, donated);
        }

        let state = self.thread_mut(thread);
        state.cached_effective = weight;
        state.dirty = false;
        self.stats.recomputes += 1;
        log::trace!("[Graph] recomputed {thread} effective = {weight}");
        weight
    }

    /// A queue's aggregate effective priority over its waiters
    ///
    /// Transfer-disabled queues contribute the identity unconditionally,
    /// with no caching needed. Otherwise the cached combine-reduction
    /// over the waiters is rebuilt on a dirty read.
    pub fn queue_effective(&mut self, queue: QueueId) -> u64 {
        {
            let state = self.queue_ref(queue);
            if !state.transfer_enabled {
                return CombineRule::IDENTITY;
            }
            if !state.dirty {
                return state.cached_effective;
            }
        }

        let waiters: Vec<ThreadId> = self.queue_ref(queue).waiting.iter().copied().collect();
        let mut weight = CombineRule::IDENTITY;
        for waiter in waiters {
            let donated = self.thread_effective(waiter);
            weight = self.combine.combine(weight, donated);
        }

        let state = self.queue_mut(queue);
        state.cached_effective = weight;
        state.dirty = false;
        self.stats.recomputes += 1;
        log::trace!("[Graph] recomputed {queue} aggregate = {weight}");
        weight
    }

    /// Whether a thread's cache is currently stale
    pub fn is_thread_dirty(&self, thread: ThreadId) -> bool {
        self.threads.get(&thread).is_some_and(|s| s.dirty)
    }

    /// Whether a queue's cache is currently stale
    pub fn is_queue_dirty(&self, queue: QueueId) -> bool {
        self.queue_ref(queue).dirty
    }
}

impl DonationCtx for DonationGraph {
    fn waiter_count(&self, queue: QueueId) -> usize {
        DonationGraph::waiter_count(self, queue)
    }

    fn waiter_at(&self, queue: QueueId, index: usize) -> Option<ThreadId> {
        DonationGraph::waiter_at(self, queue, index)
    }

    fn effective_priority(&mut self, thread: ThreadId) -> u64 {
        self.thread_effective(thread)
    }
}
