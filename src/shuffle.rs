//! Seedable shuffling for presentation order.
//!
//! Ordering items and the matching right-hand column are displayed shuffled,
//! but grading must be independent of display order. Keeping the shuffle pure
//! and seeded lets tests pin the presented order exactly.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fisher-Yates over a copy of `items`, driven by `seed`.
pub fn shuffled<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
  let mut out = items.to_vec();
  let mut rng = StdRng::seed_from_u64(seed);
  for i in (1..out.len()).rev() {
    let j = rng.random_range(0..=i);
    out.swap(i, j);
  }
  out
}

/// Derive the working-state seed for one question index from the session
/// seed. Deterministic, so re-initializing a question always produces the
/// same presentation order.
pub fn question_seed(session_seed: u64, index: usize) -> u64 {
  session_seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
