use ::rand::rngs::StdRng;
use ::rand::{Rng as _, SeedableRng};

/// The single random source threaded through one render.
///
/// Every random decision of a run (cell sample choice, jitter, dot size) is drawn from one
/// `Rng` in a fixed order, so equal seeds produce pixel-identical images.
#[derive(Clone)]
pub struct Rng {
    inner: StdRng,
}

impl std::fmt::Debug for Rng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rng").finish_non_exhaustive()
    }
}

impl Rng {
    pub fn seeded(seed: u64) -> Rng {
        Rng {
            inner: StdRng::seed_from_u64(seed),
        }
    }

    /// A fresh generator seeded from the operating system's entropy source.
    pub fn from_entropy() -> Rng {
        Rng {
            inner: StdRng::from_entropy(),
        }
    }

    /// Seeded if `seed` is given, from entropy otherwise.
    pub fn new(seed: Option<u64>) -> Rng {
        seed.map_or_else(Rng::from_entropy, Rng::seeded)
    }

    /// Picks a random value uniformly distributed between `0.0` (inclusive) and `1.0` (exclusive).
    pub fn rnd(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Picks a random value uniformly distributed between `min` (inclusive) and `max` (exclusive).
    /// Also accepts `min == max` (always returns `min`).
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.rnd() * (max - min) + min
    }

    /// Picks `true` with probability `p`. `p <= 0.0` never succeeds and `p >= 1.0` always does.
    pub fn odds(&mut self, p: f64) -> bool {
        self.rnd() < p
    }

    /// Picks an index uniformly from `0..len`.
    ///
    /// # Panics
    ///
    /// Panics if `len == 0`.
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "no items");
        self.inner.gen_range(0..len)
    }
}
