use rand::Rng;
use rand::SeedableRng;
use rand::rngs::{StdRng, ThreadRng};

/// A source of the market noise mixed into appreciation and growth figures.
///
/// Callers choose the source: the thread RNG in production, a seeded `StdRng`
/// for reproducible output, or `NoNoise` to switch the noise off entirely.
pub trait RandomSource {
    /// Draws from `[low, high)`. Returns `low` when the interval is empty.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl RandomSource for StdRng {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low < high { self.gen_range(low..high) } else { low }
    }
}

impl RandomSource for ThreadRng {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low < high { self.gen_range(low..high) } else { low }
    }
}

/// Always returns the midpoint of the requested interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNoise;

impl RandomSource for NoNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low < high { low + (high - low) / 2.0 } else { low }
    }
}

/// A reproducible generator for the given seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Runs `f` with a generator seeded from `seed`, or the thread RNG when unseeded.
pub fn with_rng<T>(seed: Option<u64>, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
    match seed {
        Some(seed) => f(&mut seeded(seed)),
        None => f(&mut rand::thread_rng()),
    }
}
