//! Execution ordering
//!
//! Decides the order top-level tests run in and the order a parameterized
//! test visits its sub-indices. With a zero seed both orders are the
//! identity; any other seed drives a [`TestRng`] so that the same seed and
//! the same registrations always reproduce the same run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pseudo-random generator for a single run
#[derive(Debug, Clone)]
pub struct TestRng {
    inner: StdRng,
}

impl TestRng {
    pub fn from_seed(seed: i64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed as u64),
        }
    }

    /// Uniform value in `[0, bound)`; `bound` must be non-zero
    pub fn below(&mut self, bound: usize) -> usize {
        self.inner.random_range(0..bound)
    }
}

/// Greatest common divisor
pub fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Order of top-level test indices in `[0, n)`
///
/// Seed 0 keeps registration order. Otherwise a backward Fisher-Yates
/// shuffle: for `i` from `n - 1` down to 1, swap `i` with `j` drawn from
/// `[0, i]`.
pub fn permutation(n: usize, seed: i64, rng: &mut TestRng) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    if seed != 0 {
        for i in (1..n).rev() {
            let j = rng.below(i + 1);
            order.swap(i, j);
        }
    }
    order
}

/// Step used to walk the sub-indices of a test with `n` cases
///
/// Seeded runs with at least three cases draw steps from `[0, n)` until one
/// is non-zero and coprime with `n`.
pub fn choose_step(n: usize, seed: i64, rng: &mut TestRng) -> usize {
    if seed == 0 || n < 3 {
        return 1;
    }
    loop {
        let step = rng.below(n);
        if step != 0 && gcd(n, step) == 1 {
            return step;
        }
    }
}

/// Visits `0, s, 2s, ... (mod n)` for `n` steps
///
/// Every index in `[0, n)` is produced exactly once when `s` is coprime
/// with `n`.
#[derive(Debug, Clone)]
pub struct SubIndexOrder {
    count: usize,
    step: usize,
    next: usize,
    remaining: usize,
}

impl SubIndexOrder {
    pub fn new(count: usize, step: usize) -> Self {
        Self {
            count,
            step: if count == 0 { 0 } else { step % count },
            next: 0,
            remaining: count,
        }
    }

    /// Traversal for a test with `count` cases under the given seed
    pub fn for_seed(count: usize, seed: i64, rng: &mut TestRng) -> Self {
        Self::new(count, choose_step(count, seed, rng))
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

impl Iterator for SubIndexOrder {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.next = (self.next + self.step) % self.count;
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SubIndexOrder {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(7, 3), 1);
        assert_eq!(gcd(5, 0), 5);
        assert_eq!(gcd(0, 5), 5);
    }

    #[test]
    fn test_identity_without_seed() {
        let mut rng = TestRng::from_seed(0);
        assert_eq!(permutation(6, 0, &mut rng), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(permutation(0, 0, &mut rng), Vec::<usize>::new());
    }

    #[test]
    fn test_seeded_permutation_is_permutation() {
        for seed in 1..50 {
            let mut rng = TestRng::from_seed(seed);
            let order = permutation(17, seed, &mut rng);
            assert_eq!(sorted(order), (0..17).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_seeded_permutation_reproducible() {
        let mut a = TestRng::from_seed(1234);
        let mut b = TestRng::from_seed(1234);
        assert_eq!(permutation(30, 1234, &mut a), permutation(30, 1234, &mut b));
        assert_eq!(choose_step(30, 1234, &mut a), choose_step(30, 1234, &mut b));
    }

    #[test]
    fn test_seeded_permutation_moves_something() {
        let moved = (1..20).any(|seed| {
            let mut rng = TestRng::from_seed(seed);
            permutation(10, seed, &mut rng) != (0..10).collect::<Vec<_>>()
        });
        assert!(moved);
    }

    #[test]
    fn test_step_is_one_for_small_or_unseeded() {
        let mut rng = TestRng::from_seed(99);
        assert_eq!(choose_step(10, 0, &mut rng), 1);
        assert_eq!(choose_step(2, 99, &mut rng), 1);
        assert_eq!(choose_step(0, 99, &mut rng), 1);
    }

    #[test]
    fn test_step_is_coprime() {
        for n in 3..40 {
            let mut rng = TestRng::from_seed(n as i64);
            let step = choose_step(n, 7, &mut rng);
            assert!(step >= 1 && step < n);
            assert_eq!(gcd(n, step), 1);
        }
    }

    #[test]
    fn test_coprime_walk_visits_every_index_once() {
        for n in 3..30 {
            for step in (1..n).filter(|s| gcd(n, *s) == 1) {
                let order: Vec<_> = SubIndexOrder::new(n, step).collect();
                assert_eq!(order.len(), n);
                assert_eq!(order[0], 0);
                assert_eq!(sorted(order), (0..n).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_unit_step_is_sequential() {
        let order: Vec<_> = SubIndexOrder::new(5, 1).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        assert_eq!(SubIndexOrder::new(0, 1).count(), 0);
    }

    #[test]
    fn test_walk_with_step() {
        let order: Vec<_> = SubIndexOrder::new(5, 2).collect();
        assert_eq!(order, vec![0, 2, 4, 1, 3]);
    }
}
