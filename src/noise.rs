//! Measurement noise applied to armature current readings.
//!
//! The motor model draws one value per reading from a [`NoiseSource`].
//! [`GaussianNoise`] reproduces the ammeter error of the bench; seeding it
//! makes a session reproducible. [`Silent`] returns zero and is what tests
//! use when they need exact currents.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::error::{ArmatureError, Result};

/// A source of additive measurement error.
pub trait NoiseSource {
    /// Draw the next error value.
    fn draw(&mut self) -> f64;
}

/// Zero-mean normal noise with a fixed standard deviation.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    normal: Normal<f64>,
    rng: StdRng,
}

impl GaussianNoise {
    /// Noise seeded from operating-system entropy.
    pub fn new(sigma: f64) -> Result<Self> {
        Ok(Self {
            normal: normal(sigma)?,
            rng: StdRng::from_entropy(),
        })
    }

    /// Noise with a fixed seed, for reproducible sessions.
    pub fn with_seed(sigma: f64, seed: u64) -> Result<Self> {
        Ok(Self {
            normal: normal(sigma)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

fn normal(sigma: f64) -> Result<Normal<f64>> {
    // rand_distr only rejects a non-finite std_dev, not a negative one.
    if !sigma.is_finite() || sigma < 0.0 {
        return Err(ArmatureError::Config(format!(
            "error_sigma must be a non-negative number, got {}",
            sigma
        )));
    }
    Normal::new(0.0, sigma)
        .map_err(|e| ArmatureError::Config(format!("invalid error_sigma {}: {}", sigma, e)))
}

impl NoiseSource for GaussianNoise {
    fn draw(&mut self) -> f64 {
        self.normal.sample(&mut self.rng)
    }
}

/// No measurement error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl NoiseSource for Silent {
    fn draw(&mut self) -> f64 {
        0.0
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn draw(&mut self) -> f64 {
        (**self).draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_is_zero() {
        let mut noise = Silent;
        assert_eq!(noise.draw(), 0.0);
        assert_eq!(noise.draw(), 0.0);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let mut a = GaussianNoise::with_seed(1.0, 42).unwrap();
        let mut b = GaussianNoise::with_seed(1.0, 42).unwrap();
        for _ in 0..16 {
            assert_eq!(a.draw().to_bits(), b.draw().to_bits());
        }
    }

    #[test]
    fn test_successive_draws_differ() {
        let mut noise = GaussianNoise::with_seed(1.0, 7).unwrap();
        let first = noise.draw();
        let second = noise.draw();
        assert_ne!(first, second);
    }

    #[test]
    fn test_zero_sigma_draws_zero() {
        let mut noise = GaussianNoise::with_seed(0.0, 1).unwrap();
        assert_eq!(noise.draw(), 0.0);
    }

    #[test]
    fn test_sample_spread_matches_sigma() {
        let mut noise = GaussianNoise::with_seed(2.0, 3).unwrap();
        let draws: Vec<f64> = (0..20_000).map(|_| noise.draw()).collect();
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / draws.len() as f64;
        assert!(mean.abs() < 0.1, "mean {}", mean);
        assert!((var.sqrt() - 2.0).abs() < 0.1, "std {}", var.sqrt());
    }

    #[test]
    fn test_negative_sigma_rejected() {
        assert!(matches!(
            GaussianNoise::with_seed(-1.0, 0),
            Err(ArmatureError::Config(_))
        ));
        assert!(matches!(
            GaussianNoise::new(-0.5),
            Err(ArmatureError::Config(_))
        ));
        assert!(matches!(
            GaussianNoise::with_seed(f64::NAN, 0),
            Err(ArmatureError::Config(_))
        ));
    }
}
