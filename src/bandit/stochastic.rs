use crate::arm::Arm;
use crate::bandit::Counters;
use crate::error::{BanditError, Result};
use crate::numeric::incremental_mean;

/// Independent Bernoulli/Normal arms with running sample means.
#[derive(Clone, Debug)]
pub struct StochasticBandit {
    arms: Vec<Arm>,
    counters: Counters,
    /// Sample mean of the rewards observed per arm
    running_mean: Vec<f64>,
    /// Sum of rewards per arm (success counts for Bernoulli arms)
    reward_sum: Vec<f64>,
    best_mean: f64,
}

impl StochasticBandit {
    /// Creates a bandit over Bernoulli and/or Normal arms.
    pub fn new(arms: Vec<Arm>) -> Result<Self> {
        if arms.is_empty() {
            return Err(BanditError::NoArmsAvailable);
        }
        if let Some(other) = arms
            .iter()
            .find(|a| !matches!(a, Arm::Bernoulli { .. } | Arm::Normal { .. }))
        {
            return Err(BanditError::invalid_config(format!(
                "stochastic bandit cannot hold a {} arm",
                other.descriptor().type_name()
            )));
        }

        let n = arms.len();
        let best_mean = arms
            .iter()
            .map(Arm::mean)
            .fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            arms,
            counters: Counters::new(n),
            running_mean: vec![0.0; n],
            reward_sum: vec![0.0; n],
            best_mean,
        })
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub(crate) fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    pub fn running_means(&self) -> &[f64] {
        &self.running_mean
    }

    pub fn reward_sums(&self) -> &[f64] {
        &self.reward_sum
    }

    /// Whether every arm is Bernoulli, i.e. rewards are 0/1.
    pub fn all_bernoulli(&self) -> bool {
        self.arms.iter().all(|a| matches!(a, Arm::Bernoulli { .. }))
    }

    /// `(successes, failures)` of an arm, counting reward mass as successes.
    pub fn beta_counts(&self, arm: usize) -> (f64, f64) {
        let successes = self.reward_sum[arm].max(0.0);
        let failures = (self.counters.pull_count[arm] as f64 - successes).max(0.0);
        (successes, failures)
    }

    pub fn pull(&mut self, arm: usize, rng: &mut dyn rand::RngCore) -> Result<f64> {
        self.counters.check_index(arm)?;
        let reward = self.arms[arm].pull(self.counters.timestep, rng)?;
        let count = self.counters.record(arm);
        self.running_mean[arm] = incremental_mean(self.running_mean[arm], reward, count);
        self.reward_sum[arm] += reward;
        Ok(reward)
    }

    /// Pseudo-regret: `sum_i T_i * (max_j mu_j - mu_i)`.
    pub fn regret(&self) -> f64 {
        self.arms
            .iter()
            .zip(&self.counters.pull_count)
            .map(|(arm, &pulls)| pulls as f64 * (self.best_mean - arm.mean()))
            .sum()
    }

    pub fn reset(&mut self) {
        self.counters.reset();
        self.running_mean.fill(0.0);
        self.reward_sum.fill(0.0);
    }
}
