/*
 * Ordered Selection Policy
 *
 * Deterministic highest-effective-priority-first selection with FIFO
 * tie-breaking: the next thread dequeued always has effective priority
 * no less than any other waiter, and among the waiters at that priority
 * the one that has been waiting longest wins.
 *
 * Donated priorities combine with max, so a holder runs at the urgency
 * of its most urgent (transitive) waiter.
 */

use crate::traits::{DonationCtx, SelectionPolicy};
use crate::types::{CombineRule, QueueId, ThreadId};

/// Highest-effective-priority-first policy
pub struct OrderedPolicy;

impl OrderedPolicy {
    /// Create a new ordered policy
    pub const fn new() -> Self {
        OrderedPolicy
    }
}

impl SelectionPolicy for OrderedPolicy {
    fn pick_next(&mut self, ctx: &mut dyn DonationCtx, queue: QueueId) -> Option<ThreadId> {
        let count = ctx.waiter_count(queue);
        let mut best: Option<(ThreadId, u64)> = None;

        // One scan in insertion order. Strict > keeps the incumbent on
        // ties, so the earliest-enqueued waiter wins among equals.
        for index in 0..count {
            let Some(waiter) = ctx.waiter_at(queue, index) else {
                break;
            };
            let weight = ctx.effective_priority(waiter);
            match best {
                Some((_, incumbent)) if weight <= incumbent => {}
                _ => best = Some((waiter, weight)),
            }
        }

        if let Some((winner, weight)) = best {
            log::debug!("[Ordered] {queue}: picked {winner} (effective {weight})");
        }
        best.map(|(winner, _)| winner)
    }

    fn combine_rule(&self) -> CombineRule {
        CombineRule::Max
    }

    fn name(&self) -> &'static str {
        "Ordered"
    }
}

impl Default for OrderedPolicy {
    fn default() -> Self {
        Self::new()
    }
}
