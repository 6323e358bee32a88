// Seedable pseudo-random number generator for the hex snake core.
//
// xoshiro256++ (Blackman & Vigna) with SplitMix64 state expansion. Nothing in
// the core reaches for ambient randomness: every random choice (fallback
// steps when no path exists, wall placement in the demo binary) draws from a
// `SnakeRng` owned by the caller and passed in explicitly. Tests inject a
// fixed seed and get a fixed sequence.
//
// The generator uses integer arithmetic only. Floating-point helpers are
// derived from the integer stream after the fact.

use serde::{Deserialize, Serialize};

/// xoshiro256++ state. Cheap to clone; cloning forks the sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeRng {
    s: [u64; 4],
}

impl SnakeRng {
    /// Seed a generator. Equal seeds give equal sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        let s = [
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
            splitmix64(&mut sm),
        ];
        Self { s }
    }

    pub fn next_u64(&mut self) -> u64 {
        let [s0, s1, s2, s3] = self.s;
        let out = s0.wrapping_add(s3).rotate_left(23).wrapping_add(s0);

        let t = s1 << 17;
        let mut s2 = s2 ^ s0;
        let mut s3 = s3 ^ s1;
        let s1 = s1 ^ s2;
        let s0 = s0 ^ s3;
        s2 ^= t;
        s3 = s3.rotate_left(45);

        self.s = [s0, s1, s2, s3];
        out
    }

    /// Upper 32 bits of the next `u64`.
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform `f64` in `[0, 1)` built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[0, bound)`, rejection-sampled to avoid modulo
    /// bias. Returns `None` when `bound` is zero.
    pub fn below(&mut self, bound: u64) -> Option<u64> {
        if bound == 0 {
            return None;
        }
        if bound.is_power_of_two() {
            return Some(self.next_u64() & (bound - 1));
        }
        let zone = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u64();
            if r >= zone {
                return Some(r % bound);
            }
        }
    }

    /// Uniform index into a collection of `len` elements.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        self.below(len as u64).map(|i| i as usize)
    }

    /// Pick one element of a slice uniformly. `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }

    /// `true` with probability `p`. `p <= 0` never fires, `p >= 1` always does.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            if let Some(j) = self.index(i + 1) {
                items.swap(i, j);
            }
        }
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
