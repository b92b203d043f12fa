/*
 * Lottery Selection Policy
 *
 * Randomized selection where each waiting thread's effective priority is
 * its ticket count (base tickets plus tickets donated through resources
 * it holds) and the winner is drawn with probability proportional to its
 * share of the total.
 *
 * Ticket counts can be enormous (donation sums across many waiters), so
 * no per-ticket state is ever materialized: a draw is one pass to sum
 * the tickets, one uniform draw in [1, total], and one re-scan
 * accumulating a running total until it reaches the drawn ticket.
 * O(waiters) time, O(1) extra space.
 *
 * Donated ticket counts combine with a saturating sum.
 */

use crate::rng::{self, Xorshift64Star};
use crate::traits::{DonationCtx, SelectionPolicy};
use crate::types::{CombineRule, QueueId, ThreadId};

/// Where a lottery policy gets its draws
///
/// The process-wide generator is the default; a locally seeded generator
/// makes selections reproducible for tests and deterministic
/// deployments.
#[derive(Debug)]
enum DrawSource {
    Process,
    Seeded(Xorshift64Star),
}

/// Proportional-share lottery policy
pub struct LotteryPolicy {
    draws: DrawSource,
}

impl LotteryPolicy {
    /// Create a lottery policy drawing from the process-wide generator
    pub const fn new() -> Self {
        Self {
            draws: DrawSource::Process,
        }
    }

    /// Create a lottery policy with its own seeded generator
    pub const fn with_seed(seed: u64) -> Self {
        Self {
            draws: DrawSource::Seeded(Xorshift64Star::new(seed)),
        }
    }

    fn draw(&mut self, total: u64) -> u64 {
        match &mut self.draws {
            DrawSource::Process => rng::process_draw(total),
            DrawSource::Seeded(generator) => generator.draw(total),
        }
    }
}

impl SelectionPolicy for LotteryPolicy {
    fn pick_next(&mut self, ctx: &mut dyn DonationCtx, queue: QueueId) -> Option<ThreadId> {
        let count = ctx.waiter_count(queue);
        if count == 0 {
            return None;
        }

        // Pass 1: total tickets. This leaves every waiter's cache clean,
        // so the re-scan below reads identical values and the running
        // total is guaranteed to reach the drawn ticket.
        let mut total: u64 = 0;
        for index in 0..count {
            let Some(waiter) = ctx.waiter_at(queue, index) else {
                break;
            };
            total = total.saturating_add(ctx.effective_priority(waiter));
        }

        // A zero-ticket pool has no defined draw; fall back to the first
        // waiter so next_thread() stays total.
        if total == 0 {
            let first = ctx.waiter_at(queue, 0);
            log::debug!("[Lottery] {queue}: zero tickets, falling back to first waiter");
            return first;
        }

        let ticket = self.draw(total);

        // Pass 2: walk the same order, return the waiter owning the
        // drawn ticket.
        let mut running: u64 = 0;
        for index in 0..count {
            let Some(waiter) = ctx.waiter_at(queue, index) else {
                break;
            };
            running = running.saturating_add(ctx.effective_priority(waiter));
            if running >= ticket {
                log::debug!(
                    "[Lottery] {queue}: ticket {ticket}/{total} picked {waiter}"
                );
                return Some(waiter);
            }
        }

        // Unreachable while the waiter set is stable between the two
        // passes; keep the operation total regardless.
        ctx.waiter_at(queue, count - 1)
    }

    fn combine_rule(&self) -> CombineRule {
        CombineRule::Sum
    }

    fn name(&self) -> &'static str {
        "Lottery"
    }
}

impl Default for LotteryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
