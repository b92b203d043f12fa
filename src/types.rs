/*
 * Scheduler Core Type Definitions
 *
 * This module defines the core types used throughout the donation
 * scheduler. These types are lightweight, Copy-able, and suitable for use
 * in both the policy and mechanism layers.
 */

use core::fmt;

/// Thread identifier
///
/// Provided by the lifecycle collaborator as a stable identity key. The
/// total order exists for deterministic iteration and logging, never for
/// scheduling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(pub u64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thread({})", self.0)
    }
}

/// Wait queue identifier
///
/// Allocated by the scheduler core when a resource wait queue is created,
/// one per contended resource (a lock, a join slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueueId(pub u64);

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Queue({})", self.0)
    }
}

/// Base thread priority / base ticket count
///
/// Explicitly set per thread and bounded to [MIN, MAX]. Under the ordered
/// policy this is a priority level; under the lottery policy it is the
/// thread's own ticket count before donation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub u32);

impl Priority {
    /// Minimum priority a thread can have
    pub const MIN: Priority = Priority(0);

    /// Priority assigned to a thread on first scheduler contact
    pub const DEFAULT: Priority = Priority(1);

    /// Maximum priority a thread can have
    pub const MAX: Priority = Priority(7);

    /// Get the raw value
    pub fn get(self) -> u32 {
        self.0
    }

    /// Widen to the effective-weight domain
    ///
    /// Effective priorities are computed in u64 because donated ticket
    /// sums can exceed the bounded per-thread range by orders of
    /// magnitude.
    pub fn as_weight(self) -> u64 {
        self.0 as u64
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How donated weights combine during effective-priority recomputation
///
/// The ordered policy takes the maximum of the donors; the lottery policy
/// adds ticket counts. Both reductions start from [`CombineRule::IDENTITY`]
/// so that a recomputation always resets before recombining, which lets
/// effective priority fall as well as rise when donors come and go.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CombineRule {
    /// Take the maximum donor weight (ordered policy)
    Max,

    /// Saturating sum of donor weights (lottery policy)
    Sum,
}

impl CombineRule {
    /// Identity element of both reductions
    pub const IDENTITY: u64 = 0;

    /// Fold one donor weight into an accumulated weight
    pub fn combine(self, acc: u64, donor: u64) -> u64 {
        match self {
            CombineRule::Max => {
                if donor > acc {
                    donor
                } else {
                    acc
                }
            }
            CombineRule::Sum => acc.saturating_add(donor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_bounds() {
        assert_eq!(Priority::MIN.get(), 0);
        assert_eq!(Priority::DEFAULT.get(), 1);
        assert_eq!(Priority::MAX.get(), 7);
        assert!(Priority::MIN < Priority::DEFAULT);
        assert!(Priority::DEFAULT < Priority::MAX);
    }

    #[test]
    fn combine_max_keeps_larger() {
        assert_eq!(CombineRule::Max.combine(3, 7), 7);
        assert_eq!(CombineRule::Max.combine(7, 3), 7);
        assert_eq!(CombineRule::Max.combine(CombineRule::IDENTITY, 0), 0);
    }

    #[test]
    fn combine_sum_saturates() {
        assert_eq!(CombineRule::Sum.combine(3, 7), 10);
        assert_eq!(CombineRule::Sum.combine(u64::MAX, 1), u64::MAX);
        assert_eq!(CombineRule::Sum.combine(CombineRule::IDENTITY, 5), 5);
    }
}
