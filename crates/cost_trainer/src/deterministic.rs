//! Seeded randomness for reproducible splits
//!
//! A 64-bit linear congruential generator drives Fisher–Yates shuffles, so the
//! same seed produces the same train/test split on every platform.

use std::num::Wrapping;

/// Linear congruential generator (MMIX constants)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
    const INCREMENT: u64 = 1_442_695_040_888_963_407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(seed),
        };
        // discard the first output, which is an affine function of the seed
        rng.next_u64();
        rng
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        // low bits of an LCG have short periods; swap halves
        self.state.0.rotate_right(32)
    }

    /// Uniform-ish integer in `[0, bound)`; `bound == 0` yields 0
    pub fn next_below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as usize
    }

    /// In-place Fisher–Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_below(i + 1);
            items.swap(i, j);
        }
    }
}

/// Seeded permutation of `0..n`
pub fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    LcgRng::new(seed).shuffle(&mut indices);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = LcgRng::new(42);
        let mut b = LcgRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a: Vec<_> = (0..8).map({
            let mut rng = LcgRng::new(1);
            move |_| rng.next_u64()
        }).collect();
        let b: Vec<_> = (0..8).map({
            let mut rng = LcgRng::new(2);
            move |_| rng.next_u64()
        }).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn next_below_respects_bound() {
        let mut rng = LcgRng::new(7);
        for _ in 0..1000 {
            assert!(rng.next_below(10) < 10);
        }
        assert_eq!(rng.next_below(0), 0);
    }

    #[test]
    fn permutation_is_complete_and_reproducible() {
        let p = permutation(50, 42);
        let mut sorted = p.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_eq!(p, permutation(50, 42));
        assert_ne!(p, (0..50).collect::<Vec<_>>());
    }
}
