use rand::distr::{Uniform, uniform::Error};
use rand::rngs::SmallRng;
use rand_distr::Distribution;

use super::NoiseTrait;

#[derive(Debug, Clone)]
pub struct UniformNoise {
    dist: Uniform<f64>,
}

impl UniformNoise {
    pub fn new(low: f64, high: f64) -> Result<Self, Error> {
        let dist = Uniform::new(low, high)?;
        Ok(Self { dist })
    }
}

impl NoiseTrait for UniformNoise {
    fn sample(&self, rng: &mut SmallRng) -> f64 {
        self.dist.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_uniform_stays_in_range() {
        let noise = UniformNoise::new(-0.2, 0.3).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..1000 {
            let s = noise.sample(&mut rng);
            assert!((-0.2..0.3).contains(&s));
        }
    }
}
