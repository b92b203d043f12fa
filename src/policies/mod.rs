/*
 * Selection Policies Module
 *
 * This module contains the selection policy implementations. Each policy
 * implements the SelectionPolicy trait and is plugged into the
 * SchedulerCore at construction time.
 *
 * Available policies:
 * - Ordered: highest effective priority first, FIFO among equals
 * - Lottery: random draw, probability proportional to effective tickets
 */

pub mod lottery;
pub mod ordered;

pub use lottery::LotteryPolicy;
pub use ordered::OrderedPolicy;
