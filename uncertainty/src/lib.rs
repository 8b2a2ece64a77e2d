//! Seedable noise sources for sensor and actuator models.
//!
//! Every [`Noise`] owns its own `SmallRng`. Seeds are drawn from a caller supplied
//! rng when the noise is built, so a whole simulation is reproducible from one
//! master seed while each port still draws independent samples.

pub mod gaussian;
pub mod uniform;

use gaussian::GaussianNoise;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::NormalError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uniform::UniformNoise;

#[derive(Debug, Error)]
pub enum UncertaintyErrors {
    #[error("standard deviation must be finite and non-negative, got {0}")]
    InvalidStd(f64),
    #[error("uniform noise needs finite bounds with low < high, got [{0}, {1}]")]
    InvalidRange(f64, f64),
    #[error("{0}")]
    Normal(#[from] NormalError),
    #[error("{0}")]
    Uniform(#[from] rand::distr::uniform::Error),
}

pub trait NoiseTrait {
    fn sample(&self, rng: &mut SmallRng) -> f64;
}

#[derive(Debug, Clone)]
pub enum NoiseModels {
    None,
    Gaussian(GaussianNoise),
    Uniform(UniformNoise),
}

impl NoiseTrait for NoiseModels {
    fn sample(&self, rng: &mut SmallRng) -> f64 {
        match self {
            NoiseModels::None => 0.0,
            NoiseModels::Gaussian(noise) => noise.sample(rng),
            NoiseModels::Uniform(noise) => noise.sample(rng),
        }
    }
}

/// Serializable description of a noise source, as it appears in configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum NoiseBuilder {
    #[default]
    None,
    /// `std = 0` is accepted and builds a noiseless source, it is not a configuration error.
    Gaussian {
        mean: f64,
        std: f64,
    },
    Uniform {
        low: f64,
        high: f64,
    },
}

impl NoiseBuilder {
    pub fn new_normal(mean: f64, std: f64) -> Self {
        NoiseBuilder::Gaussian { mean, std }
    }

    pub fn new_uniform(low: f64, high: f64) -> Self {
        NoiseBuilder::Uniform { low, high }
    }

    /// Checks the parameters without building anything.
    pub fn validate(&self) -> Result<(), UncertaintyErrors> {
        self.model().map(|_| ())
    }

    fn model(&self) -> Result<NoiseModels, UncertaintyErrors> {
        let model = match *self {
            NoiseBuilder::None => NoiseModels::None,
            NoiseBuilder::Gaussian { mean, std } => {
                if !std.is_finite() || std < 0.0 {
                    return Err(UncertaintyErrors::InvalidStd(std));
                }
                if std == 0.0 && mean == 0.0 {
                    NoiseModels::None
                } else {
                    NoiseModels::Gaussian(GaussianNoise::new(mean, std)?)
                }
            }
            NoiseBuilder::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low >= high {
                    return Err(UncertaintyErrors::InvalidRange(low, high));
                }
                NoiseModels::Uniform(UniformNoise::new(low, high)?)
            }
        };
        Ok(model)
    }

    /// Builds the noise source, drawing its seed from `rng`.
    pub fn build(&self, rng: &mut SmallRng) -> Result<Noise, UncertaintyErrors> {
        let seed = rng.random::<u64>();
        self.build_seeded(seed)
    }

    pub fn build_seeded(&self, seed: u64) -> Result<Noise, UncertaintyErrors> {
        Ok(Noise::new(self.model()?, seed))
    }
}

#[derive(Debug, Clone)]
pub struct Noise {
    model: NoiseModels,
    rng: SmallRng,
    seed: u64,
}

impl Noise {
    pub fn new(model: NoiseModels, seed: u64) -> Self {
        let rng = SmallRng::seed_from_u64(seed);
        Self { model, rng, seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts the sample sequence from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
    }

    pub fn sample(&mut self) -> f64 {
        self.model.sample(&mut self.rng)
    }

    /// Three independent samples, one per axis.
    pub fn sample_vector(&mut self) -> Vector3<f64> {
        let x = self.sample();
        let y = self.sample();
        let z = self.sample();
        Vector3::new(x, y, z)
    }
}

/// The master rng for a run. Uses `seed` when given, otherwise draws one from the
/// thread rng. The seed actually used is returned so it can be reported.
pub fn master_rng(seed: Option<u64>) -> (SmallRng, u64) {
    let seed = seed.unwrap_or_else(|| rand::rng().random::<u64>());
    (SmallRng::seed_from_u64(seed), seed)
}
