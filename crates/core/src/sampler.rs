//! Random ordering and sampling without replacement.
//!
//! All randomness flows through [`RandomSource`] so sessions can be replayed:
//! production wires an OS-seeded [`RngSource`], tests use a seeded one or a
//! [`ScriptedSource`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A uniform integer generator.
pub trait RandomSource {
    /// Returns an index uniformly distributed in `0..upper`.
    ///
    /// Callers never pass `upper == 0`.
    fn next_index(&mut self, upper: usize) -> usize;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next_index(&mut self, upper: usize) -> usize {
        (**self).next_index(upper)
    }
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn next_index(&mut self, upper: usize) -> usize {
        (**self).next_index(upper)
    }
}

/// Adapts any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

/// The generator used when none is injected.
pub type OsRngSource = RngSource<StdRng>;

impl RngSource<StdRng> {
    /// Seeded from the operating system.
    #[must_use]
    pub fn from_os() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Deterministic generator for reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, upper: usize) -> usize {
        self.0.random_range(0..upper)
    }
}

/// Replays a fixed sequence of values, each reduced modulo the requested bound.
///
/// Cycles when exhausted; an empty script always yields 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that always returns the upper bound minus one, which makes
    /// [`shuffle`] leave its input in order.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(vec![usize::MAX])
    }
}

impl RandomSource for ScriptedSource {
    fn next_index(&mut self, upper: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        if value == usize::MAX {
            upper - 1
        } else {
            value % upper
        }
    }
}

/// Fisher-Yates shuffle into a new vector; the input is untouched.
#[must_use]
pub fn shuffle<T: Clone>(items: &[T], rng: &mut impl RandomSource) -> Vec<T> {
    let mut out = items.to_vec();
    shuffle_in_place(&mut out, rng);
    out
}

/// Fisher-Yates shuffle of `items` in place.
pub fn shuffle_in_place<T>(items: &mut [T], rng: &mut impl RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Up to `n` distinct elements in random order.
///
/// When `n >= items.len()` every element is returned, shuffled.
#[must_use]
pub fn sample_without_replacement<T: Clone>(
    items: &[T],
    n: usize,
    rng: &mut impl RandomSource,
) -> Vec<T> {
    let mut out = shuffle(items, rng);
    out.truncate(n);
    out
}
