//! Random reordering used by the study loop.
use rand::Rng;

/// Chance that a card answered correctly is retired instead of requeued.
pub const RETIRE_PROBABILITY: f64 = 0.8;

/// Fisher-Yates shuffle, from the last index down to 1.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Insertion point for a requeued card among `len` cards: uniform over `[0, len]`.
///
/// Position 0 is allowed, so the same card can come up again right away.
pub fn requeue_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> usize {
    if len == 0 {
        return 0;
    }
    rng.gen_range(0..=len)
}

/// Decides whether a correctly answered card leaves the session.
pub fn should_retire<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.gen_bool(RETIRE_PROBABILITY)
}
