/*
 * Lottery Randomness Source
 *
 * This module provides the pseudo-random generator used by the lottery
 * policy: a xorshift64* generator plus a single process-wide instance
 * behind a spin::Mutex.
 *
 * xorshift64* is fast, has a full 2^64 - 1 period, and needs no hardware
 * support, which keeps the crate usable in no_std environments. It is not
 * cryptographic, and does not need to be: the only requirement is a
 * uniform draw over [1, total] on every call.
 */

use spin::Mutex;

/// Non-cryptographic xorshift64* generator
///
/// State must never be zero; a zero seed is replaced with a fixed odd
/// constant.
#[derive(Debug, Clone)]
pub struct Xorshift64Star {
    state: u64,
}

impl Xorshift64Star {
    /// Create a generator from a seed
    pub const fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    /// Next raw 64-bit output
    pub fn next_u64(&mut self) -> u64 {
        let mut s = self.state;
        s ^= s >> 12;
        s ^= s << 25;
        s ^= s >> 27;
        self.state = s;
        s.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform draw in [1, bound]
    ///
    /// Uses rejection sampling so the draw stays uniform for arbitrary
    /// bounds: raw outputs at or above the largest multiple of `bound`
    /// are discarded instead of folded in by the modulo.
    ///
    /// # Panics
    /// Panics if `bound` is zero; callers handle the zero-ticket case
    /// before drawing.
    pub fn draw(&mut self, bound: u64) -> u64 {
        assert!(bound > 0, "cannot draw from an empty ticket range");

        // Largest multiple of bound representable in u64. Outputs past it
        // would bias the low residues.
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let raw = self.next_u64();
            if raw < zone {
                return 1 + raw % bound;
            }
        }
    }
}

/// Process-wide generator
///
/// The lottery policy defaults to this single shared instance; seeding it
/// differently is outside the core's concern. Deterministic deployments
/// construct their scheduler with a locally seeded generator instead.
static PROCESS_RNG: Mutex<Xorshift64Star> = Mutex::new(Xorshift64Star::new(0x853C_49E6_748F_EA9B));

/// Draw uniformly from [1, bound] using the process-wide generator
pub fn process_draw(bound: u64) -> u64 {
    PROCESS_RNG.lock().draw(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_seed_is_replaced() {
        let mut a = Xorshift64Star::new(0);
        let mut b = Xorshift64Star::new(0x9E37_79B9_7F4A_7C15);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Xorshift64Star::new(42);
        let mut b = Xorshift64Star::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn draw_stays_in_range() {
        let mut rng = Xorshift64Star::new(0xDEAD_BEEF);
        for bound in [1u64, 2, 7, 100, u64::MAX] {
            for _ in 0..200 {
                let r = rng.draw(bound);
                assert!(r >= 1 && r <= bound, "draw {r} outside [1, {bound}]");
            }
        }
    }

    #[test]
    fn small_range_is_covered() {
        let mut rng = Xorshift64Star::new(7);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            seen[(rng.draw(5) - 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "1000 draws missed a value in [1, 5]");
    }

    #[test]
    #[should_panic(expected = "empty ticket range")]
    fn zero_bound_panics() {
        Xorshift64Star::new(1).draw(0);
    }
}
