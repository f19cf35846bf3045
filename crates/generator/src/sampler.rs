//! Source of randomness for the generator.
//!
//! Every draw the generator makes goes through [`Sampler`], so tests can pin
//! individual quantities while production runs use a seeded RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::profile::UniformRange;

pub trait Sampler {
    /// Uniform draw from the closed interval `range`.
    fn uniform(&mut self, range: UniformRange) -> f64;

    fn volume_variation(&mut self, range: UniformRange) -> f64 {
        self.uniform(range)
    }

    fn click_through_rate(&mut self, range: UniformRange) -> f64 {
        self.uniform(range)
    }

    fn cost_per_click(&mut self, range: UniformRange) -> f64 {
        self.uniform(range)
    }

    fn conversion_rate(&mut self, range: UniformRange) -> f64 {
        self.uniform(range)
    }

    fn order_value(&mut self, range: UniformRange) -> f64 {
        self.uniform(range)
    }
}

/// [`Sampler`] backed by any `rand` generator.
pub struct RandomSampler<R> {
    rng: R,
}

impl<R: Rng> RandomSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSampler<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Sampler for RandomSampler<R> {
    fn uniform(&mut self, range: UniformRange) -> f64 {
        // Degenerate ranges (Email CPC) have a single value.
        if range.high <= range.low {
            return range.low;
        }
        self.rng.gen_range(range.low..=range.high)
    }
}
