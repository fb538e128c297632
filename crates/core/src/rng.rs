//! Seedable randomness for deck shuffling and effect targets
//!
//! A simple LCG keeps every random decision in the match (deck order,
//! start-block removal, hand discards) reproducible from a single seed,
//! which the tests lean on heavily.

/// 32-bit linear congruential generator
///
/// Numerical Recipes constants; the nonzero increment means every seed,
/// zero included, walks the full cycle.
#[derive(Debug, Clone)]
pub struct GameRng {
    state: u32,
}

impl GameRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next raw value: `state * a + c` mod 2^32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max). `max` must be nonzero.
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}
