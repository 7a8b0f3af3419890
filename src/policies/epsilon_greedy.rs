use rand::Rng;

use super::{Greedy, LearningPolicy, Random};
use crate::bandit::Bandit;
use crate::error::{BanditError, Result};
use crate::policy::{Policy, require_stochastic};

/// Epsilon-greedy policy - explores with probability epsilon, exploits otherwise
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
}

impl EpsilonGreedy {
    /// Creates a new EpsilonGreedy policy; `epsilon` must be in `[0, 1]`.
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(BanditError::invalid_parameter(format!(
                "epsilon must be between 0 and 1, got {epsilon}"
            )));
        }
        Ok(Self { epsilon })
    }

    /// Gets the epsilon value
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Policy for EpsilonGreedy {
    fn name(&self) -> &'static str {
        "greedy_ep"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::EpsilonGreedy {
            epsilon: self.epsilon,
        })
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_stochastic(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, rng: &mut dyn rand::RngCore) -> Result<usize> {
        if rng.random::<f64>() < self.epsilon {
            Random.select(bandit, rng)
        } else {
            Greedy.select(bandit, rng)
        }
    }
}
