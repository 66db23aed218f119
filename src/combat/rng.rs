//! Seeded randomness
//!
//! When a seed is provided (e.g. via headless config), the same seed always
//! produces the same match. Without a seed, uses system entropy.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

#[derive(Resource, Clone, Debug)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Either seeded or entropy-backed depending on `seed`
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in [min, max)
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// True with probability `p` (clamped to 0..=1)
    pub fn chance(&mut self, p: f32) -> bool {
        self.random_f32() < p.clamp(0.0, 1.0)
    }

    /// Derive an independent generator, keeping determinism when seeded
    pub fn fork(&mut self) -> Self {
        match self.seed {
            Some(_) => Self::from_seed(self.rng.gen()),
            None => Self::from_entropy(),
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
