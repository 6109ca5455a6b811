//! Fisher–Yates shuffle over an injectable random source.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// A uniform generator of values in `[0, 1)`.
///
/// Closures of type `FnMut() -> f64` implement this trait, so tests can pass
/// `&mut || 0.1` to force a fixed sequence.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Adapts any `rand` generator into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: RngCore> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

impl RngSource<StdRng> {
    /// A generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        RngSource(StdRng::from_entropy())
    }

    /// A reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        RngSource(StdRng::seed_from_u64(seed))
    }
}

/// Returns a new permutation of `items`; the input is left untouched.
pub fn shuffle<T, R>(items: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: RandomSource + ?Sized,
{
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = pick_index(rng, i + 1);
        out.swap(i, j);
    }
    out
}

/// Draws `floor(r * len)`, clamped into `0..len` for out-of-range sources.
fn pick_index<R: RandomSource + ?Sized>(rng: &mut R, len: usize) -> usize {
    let r = rng.next_unit();
    if r.is_nan() || r <= 0.0 {
        return 0;
    }
    ((r * len as f64).floor() as usize).min(len - 1)
}
