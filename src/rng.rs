//! Random number providers. Gameplay never calls a global RNG directly; it draws
//! through [`RandomSource`] so tests can pin the sequence.

use std::collections::VecDeque;

pub trait RandomSource {
    /// Uniform integer in `0..bound`. `bound == 0` yields 0.
    fn below(&mut self, bound: u32) -> u32;

    /// Uniform integer in `1..=max`.
    fn inclusive_from_one(&mut self, max: u32) -> u32 {
        1 + self.below(max)
    }
}

/// Entropy from `getrandom` (crypto.getRandomValues in the browser).
pub struct OsRandom {
    fallback: u64,
}

impl OsRandom {
    pub fn new() -> Self {
        Self { fallback: 0x2545_f491 }
    }

    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        match getrandom::getrandom(&mut buf) {
            Ok(()) => u32::from_le_bytes(buf),
            Err(err) => {
                log::debug!("getrandom unavailable ({err}); using LCG fallback");
                self.fallback = self
                    .fallback
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (self.fallback >> 32) as u32
            }
        }
    }
}

impl Default for OsRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for OsRandom {
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        // Rejection sampling keeps the draw unbiased for bounds that don't divide 2^32.
        let zone = u32::MAX - (u32::MAX % bound);
        loop {
            let v = self.next_u32();
            if v < zone {
                return v % bound;
            }
        }
    }
}

/// Replays a fixed list of raw draws (each reduced modulo the requested bound),
/// then keeps returning 0.
#[derive(Debug, Default, Clone)]
pub struct SequenceRandom {
    draws: VecDeque<u32>,
}

impl SequenceRandom {
    pub fn new(draws: impl IntoIterator<Item = u32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    pub fn push(&mut self, draw: u32) {
        self.draws.push_back(draw);
    }
}

impl RandomSource for SequenceRandom {
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.draws.pop_front().unwrap_or(0) % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_random_stays_in_bounds() {
        let mut rng = OsRandom::new();
        for bound in [1u32, 2, 5, 7, 20] {
            for _ in 0..200 {
                assert!(rng.below(bound) < bound);
            }
        }
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn sequence_replays_then_zero() {
        let mut rng = SequenceRandom::new([3, 12]);
        assert_eq!(rng.below(10), 3);
        assert_eq!(rng.below(10), 2);
        assert_eq!(rng.below(10), 0);
        assert_eq!(rng.inclusive_from_one(5), 1);
    }
}
