//! Precomputed reward sequences for adversarial bandits.

use rand::{Rng, SeedableRng};
use rand_distr::{Beta, Distribution, Normal};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::arm::Arm;
use crate::bandit::{AdversarialBandit, Bandit};
use crate::error::{BanditError, Result};
use crate::numeric::dot;

/// Generates one reward row per arm, each exactly `horizon` long.
///
/// # Examples
///
/// ```
/// use banditsim::SequenceBuilder;
///
/// let bandit = SequenceBuilder::new(100, Some(42))
///     .unwrap()
///     .bernoulli(0.3)
///     .unwrap()
///     .normal(0.5, 1.0)
///     .unwrap()
///     .into_bandit()
///     .unwrap();
/// assert_eq!(bandit.n_arms(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct SequenceBuilder {
    horizon: usize,
    rng: Xoshiro256PlusPlus,
    rows: Vec<Vec<f64>>,
}

impl SequenceBuilder {
    /// `seed` makes generation reproducible.
    pub fn new(horizon: usize, seed: Option<u64>) -> Result<Self> {
        if horizon == 0 {
            return Err(BanditError::invalid_parameter("sequence horizon must be positive"));
        }
        let rng = match seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_os_rng(),
        };
        Ok(Self {
            horizon,
            rng,
            rows: Vec::new(),
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    fn push_sampled<D: Distribution<f64>>(mut self, dist: D) -> Self {
        let row = dist.sample_iter(&mut self.rng).take(self.horizon).collect();
        self.rows.push(row);
        self
    }

    /// Appends a row of 0/1 draws.
    pub fn bernoulli(mut self, mean: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&mean) {
            return Err(BanditError::invalid_parameter(format!(
                "Bernoulli mean must be in [0, 1], got {mean}"
            )));
        }
        let row = (0..self.horizon)
            .map(|_| if self.rng.random::<f64>() < mean { 1.0 } else { 0.0 })
            .collect();
        self.rows.push(row);
        Ok(self)
    }

    pub fn normal(self, mean: f64, variance: f64) -> Result<Self> {
        let dist = normal(mean, variance)?;
        Ok(self.push_sampled(dist))
    }

    pub fn beta(self, alpha: f64, beta: f64) -> Result<Self> {
        let dist = Beta::new(alpha, beta)
            .map_err(|e| BanditError::invalid_parameter(format!("beta({alpha}, {beta}): {e}")))?;
        Ok(self.push_sampled(dist))
    }

    /// Appends `<features, mean_vector> + N(noise_mean, noise_variance)`
    /// per timestep; the noise is a scalar added to the inner product.
    pub fn linear(
        mut self,
        features: &[f64],
        mean_vector: &[f64],
        noise_mean: f64,
        noise_variance: f64,
    ) -> Result<Self> {
        if features.len() != mean_vector.len() {
            return Err(BanditError::DimensionMismatch {
                message: format!(
                    "arm vector has {} entries, mean vector has {}",
                    features.len(),
                    mean_vector.len()
                ),
            });
        }
        let base = dot(features, mean_vector);
        let noise = normal(noise_mean, noise_variance)?;
        let row = noise
            .sample_iter(&mut self.rng)
            .take(self.horizon)
            .map(|e| base + e)
            .collect();
        self.rows.push(row);
        Ok(self)
    }

    /// Appends a caller-supplied row; its length must equal the horizon.
    pub fn custom(mut self, rewards: Vec<f64>) -> Result<Self> {
        if rewards.len() != self.horizon {
            return Err(BanditError::DimensionMismatch {
                message: format!(
                    "custom sequence has {} entries, horizon is {}",
                    rewards.len(),
                    self.horizon
                ),
            });
        }
        self.rows.push(rewards);
        Ok(self)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn build(self) -> Result<Vec<Arm>> {
        if self.rows.is_empty() {
            return Err(BanditError::NoArmsAvailable);
        }
        self.rows.into_iter().map(Arm::sequence).collect()
    }

    pub fn into_bandit(self) -> Result<Bandit> {
        Ok(Bandit::Adversarial(AdversarialBandit::new(self.build()?)?))
    }
}

fn normal(mean: f64, variance: f64) -> Result<Normal<f64>> {
    if variance.is_nan() || variance < 0.0 {
        return Err(BanditError::invalid_parameter(format!(
            "variance must be non-negative, got {variance}"
        )));
    }
    Normal::new(mean, variance.sqrt()).map_err(|e| BanditError::invalid_parameter(e.to_string()))
}
