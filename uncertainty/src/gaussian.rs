use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal, NormalError};

use super::NoiseTrait;

#[derive(Debug, Clone, Copy)]
pub struct GaussianNoise {
    dist: Normal<f64>,
}

impl GaussianNoise {
    pub fn new(mean: f64, sigma: f64) -> Result<Self, NormalError> {
        let dist = Normal::new(mean, sigma)?;
        Ok(Self { dist })
    }
}

impl NoiseTrait for GaussianNoise {
    fn sample(&self, rng: &mut SmallRng) -> f64 {
        self.dist.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn test_gaussian_sample_statistics() {
        let noise = GaussianNoise::new(1.0, 0.1).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| noise.sample(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

        assert_abs_diff_eq!(mean, 1.0, epsilon = 5e-3);
        assert_abs_diff_eq!(var.sqrt(), 0.1, epsilon = 5e-3);
    }
}
