/*
 * Donation Graph Integration Tests
 *
 * Exercises the donation/caching properties shared by both policies:
 * donation through chains of locks, cache idempotence, the
 * reset-before-recombine rule (effective priority must be able to fall
 * when a donor departs), and the short-circuiting dirty propagation.
 */

use donation_sched::{Priority, SchedulerCore, ThreadId};

const L: ThreadId = ThreadId(1); // low-priority holder
const M: ThreadId = ThreadId(2); // middle of the chain
const H: ThreadId = ThreadId(3); // high-priority waiter

#[test]
fn first_contact_uses_default_priority() {
    let mut core = SchedulerCore::ordered();
    assert_eq!(core.priority(L), Priority::DEFAULT);
    assert_eq!(core.effective_priority(L), Priority::DEFAULT.as_weight());
}

#[test]
fn effective_equals_base_without_donation_sources() {
    // No held resources plus transfer-disabled queues only: effective
    // priority is exactly the base priority.
    let mut core = SchedulerCore::ordered();
    let q = core.new_queue(false);

    core.acquire(q, L);
    core.wait_for_access(q, H);
    core.set_priority(H, Priority::MAX);

    assert_eq!(core.effective_priority(L), Priority::DEFAULT.as_weight());
    assert_eq!(core.effective_priority(H), Priority::MAX.as_weight());
}

#[test]
fn waiter_donates_to_holder() {
    let mut core = SchedulerCore::ordered();
    let q = core.new_queue(true);

    core.acquire(q, L);
    core.set_priority(H, Priority(7));
    core.wait_for_access(q, H);

    assert_eq!(core.effective_priority(L), 7);
    // Base priority is untouched by donation.
    assert_eq!(core.priority(L), Priority::DEFAULT);
}

#[test]
fn two_hop_chain_donates_max_under_ordered() {
    // L holds Q1; M waits on Q1 and holds Q2; H waits on Q2 with the
    // highest base priority. H's urgency must reach L through both hops.
    let mut core = SchedulerCore::ordered();
    let q1 = core.new_queue(true);
    let q2 = core.new_queue(true);

    core.acquire(q1, L);
    core.acquire(q2, M);
    core.wait_for_access(q1, M);
    core.set_priority(H, Priority(7));
    core.wait_for_access(q2, H);

    assert_eq!(core.effective_priority(H), 7);
    assert_eq!(core.effective_priority(M), 7);
    assert_eq!(core.effective_priority(L), 7);
}

#[test]
fn two_hop_chain_donates_sums_under_lottery() {
    // Same chain shape, additive arithmetic: M runs with its own ticket
    // plus H's, and L with its own ticket plus M's inflated count.
    let mut core = SchedulerCore::lottery_with_seed(11);
    let q1 = core.new_queue(true);
    let q2 = core.new_queue(true);

    core.acquire(q1, L);
    core.acquire(q2, M);
    core.wait_for_access(q1, M);
    core.set_priority(H, Priority(7));
    core.wait_for_access(q2, H);

    assert_eq!(core.effective_priority(H), 7);
    assert_eq!(core.effective_priority(M), 1 + 7);
    assert_eq!(core.effective_priority(L), 1 + (1 + 7));
}

#[test]
fn donation_is_monotone_while_the_donor_waits() {
    let mut core = SchedulerCore::ordered();
    let q = core.new_queue(true);

    core.acquire(q, L);
    core.set_priority(M, Priority(3));
    core.wait_for_access(q, M);
    assert_eq!(core.effective_priority(L), 3);

    // A second, more urgent waiter can only raise the holder.
    core.set_priority(H, Priority(6));
    core.wait_for_access(q, H);
    assert_eq!(core.effective_priority(L), 6);

    // Raising the first waiter past the second raises the holder again.
    core.set_priority(M, Priority(7));
    assert_eq!(core.effective_priority(L), 7);
}

#[test]
fn effective_priority_falls_when_the_donor_departs() {
    // Regression for the reset-before-recombine rule: once the donated
    // value is cached, removing the donor must bring the holder back
    // down, not leave the cache inflated.
    let mut core = SchedulerCore::ordered();
    let q = core.new_queue(true);

    core.acquire(q, L);
    core.set_priority(H, Priority(7));
    core.wait_for_access(q, H);
    assert_eq!(core.effective_priority(L), 7);

    core.remove_waiter(q, H);
    assert_eq!(core.effective_priority(L), Priority::DEFAULT.as_weight());
}

#[test]
fn ownership_transfer_detaches_the_former_holder() {
    let mut core = SchedulerCore::ordered();
    let q = core.new_queue(true);

    core.acquire(q, L);
    core.set_priority(H, Priority(7));
    core.wait_for_access(q, H);
    assert_eq!(core.effective_priority(L), 7);

    // The selection hands the resource to H; L loses its only donation
    // source and must drop back to its un-donated baseline.
    assert_eq!(core.next_thread(q), Some(H));
    assert_eq!(core.holder(q), Some(H));
    assert_eq!(core.effective_priority(L), Priority::DEFAULT.as_weight());
    assert_eq!(core.effective_priority(H), 7);
}

#[test]
fn cached_reads_are_idempotent() {
    let mut core = SchedulerCore::ordered();
    let q = core.new_queue(true);

    core.acquire(q, L);
    core.set_priority(H, Priority(5));
    core.wait_for_access(q, H);

    let first = core.effective_priority(L);
    let recomputes_after_first = core.stats().recomputes;

    let second = core.effective_priority(L);
    let recomputes_after_second = core.stats().recomputes;

    assert_eq!(first, second);
    // The second read is a pure cache hit.
    assert_eq!(recomputes_after_first, recomputes_after_second);
    assert!(!core.graph().is_thread_dirty(L));
}

#[test]
fn dirty_propagation_visits_each_node_at_most_once() {
    // Chain: L holds Q1 <- M holds Q2 <- H. Clean every cache, then
    // mutate H once: exactly the five nodes on the chain (H, Q2, M, Q1,
    // L) are marked. Mutating H again while the chain is still dirty
    // marks nothing: propagation stops at the first dirty node.
    let mut core = SchedulerCore::ordered();
    let q1 = core.new_queue(true);
    let q2 = core.new_queue(true);

    core.acquire(q1, L);
    core.acquire(q2, M);
    core.wait_for_access(q1, M);
    core.wait_for_access(q2, H);

    core.effective_priority(L);
    core.effective_priority(M);
    core.effective_priority(H);
    assert!(!core.graph().is_thread_dirty(L));
    assert!(!core.graph().is_queue_dirty(q1));

    let marks_before = core.stats().dirty_marks;
    core.set_priority(H, Priority(5));
    assert_eq!(core.stats().dirty_marks - marks_before, 5);

    let marks_before = core.stats().dirty_marks;
    core.set_priority(H, Priority(6));
    assert_eq!(core.stats().dirty_marks - marks_before, 0);
}

#[test]
fn increase_and_decrease_stop_at_the_bounds() {
    let mut core = SchedulerCore::ordered();

    core.set_priority(L, Priority::MAX);
    assert!(!core.increase_priority(L));
    assert_eq!(core.priority(L), Priority::MAX);

    core.set_priority(L, Priority::MIN);
    assert!(!core.decrease_priority(L));
    assert_eq!(core.priority(L), Priority::MIN);

    assert!(core.increase_priority(L));
    assert_eq!(core.priority(L), Priority(1));
    assert!(core.decrease_priority(L));
    assert_eq!(core.priority(L), Priority::MIN);
}

#[test]
fn nested_holds_combine_donations() {
    // One thread holding two contended locks receives from both.
    let mut core = SchedulerCore::ordered();
    let q1 = core.new_queue(true);
    let q2 = core.new_queue(true);

    core.acquire(q1, L);
    core.acquire(q2, L);
    core.set_priority(M, Priority(4));
    core.wait_for_access(q1, M);
    core.set_priority(H, Priority(6));
    core.wait_for_access(q2, H);

    assert_eq!(core.effective_priority(L), 6);

    core.remove_waiter(q2, H);
    assert_eq!(core.effective_priority(L), 4);
}

#[test]
fn queue_teardown_after_drain() {
    let mut core = SchedulerCore::ordered();
    let q = core.new_queue(true);

    core.acquire(q, L);
    core.wait_for_access(q, H);
    assert_eq!(core.next_thread(q), Some(H));
    assert_eq!(core.next_thread(q), None);

    // q is still held by H and may not be destroyed; only a fully idle
    // queue dies cleanly.
    let idle = core.new_queue(true);
    core.destroy_queue(idle);
}
