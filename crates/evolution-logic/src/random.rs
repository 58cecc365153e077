//! Seeded pseudo-random number generator
//!
//! Deterministic PRNG for reproducible evolution runs.
//! Uses a simple but effective xorshift algorithm and plugs into `rand`
//! through [`RngCore`], so shuffling and sampling go through the `rand` API.

use rand::{Rng, RngCore};

/// Seeded random number generator
///
/// Deterministic: same seed + stream = same sequence
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a new RNG from a 32-byte seed and a stream index
    pub fn new(seed: &[u8; 32], stream: u32) -> Self {
        // Combine seed bytes into initial state
        let mut state = 0u64;
        for (i, chunk) in seed.chunks(8).enumerate() {
            let mut bytes = [0u8; 8];
            bytes[..chunk.len()].copy_from_slice(chunk);
            state ^= u64::from_le_bytes(bytes).wrapping_add(i as u64);
        }

        state ^= (stream as u64).wrapping_mul(0x517cc1b727220a95);

        // xorshift is stuck at zero forever
        if state == 0 {
            state = 0x9e3779b97f4a7c15;
        }

        // Warm up the generator
        let mut rng = Self { state };
        for _ in 0..8 {
            rng.step();
        }

        rng
    }

    /// Derive an independent sub-stream (per game, per round, per player)
    ///
    /// Does not advance `self`, so the derived stream only depends on the
    /// parent's current state and `index`.
    pub fn derive(&self, index: u32) -> Self {
        let mut new_state = self.state;
        new_state ^= (index as u64 + 1).wrapping_mul(0x9e3779b97f4a7c15);
        if new_state == 0 {
            new_state = 0x2545f4914f6cdd1d;
        }

        let mut rng = Self { state: new_state };
        rng.step(); // Mix
        rng
    }

    /// Generate a value 0-99 (for percentage checks)
    pub fn next_percent(&mut self) -> u8 {
        self.random_range(0..100u8)
    }

    // xorshift64*
    fn step(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
