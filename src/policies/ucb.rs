use super::{IndexFn, LearningPolicy};
use crate::bandit::Bandit;
use crate::error::{BanditError, Result};
use crate::numeric::{UNPULLED_SCORE, log_index};
use crate::policy::{Policy, best_arm, require_stochastic, stochastic};

/// Upper Confidence Bound policy
///
/// Scores each arm with `mean_i + sqrt(alpha / T_i * log(index_i))`, where the
/// index comes from a configurable growth-rate function, and picks the best.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ucb {
    /// Exploration weight
    alpha: f64,
    /// Growth-rate function inside the logarithm
    index: IndexFn,
}

impl Ucb {
    /// Creates a new UCB policy; `alpha` must be positive.
    pub fn new(alpha: f64, index: IndexFn) -> Result<Self> {
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(BanditError::invalid_parameter(format!(
                "alpha must be positive, got {alpha}"
            )));
        }
        Ok(Self { alpha, index })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn index(&self) -> IndexFn {
        self.index
    }
}

impl Policy for Ucb {
    fn name(&self) -> &'static str {
        "UCB"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::Ucb {
            alpha: self.alpha,
            index: self.index,
        })
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_stochastic(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, _rng: &mut dyn rand::RngCore) -> Result<usize> {
        let scores: Vec<f64> = {
            let b = stochastic(self.name(), bandit)?;
            let counters = b.counters();
            let index = self
                .index
                .evaluate(counters.timestep, counters.horizon, &counters.pull_count);
            b.running_means()
                .iter()
                .zip(&counters.pull_count)
                .zip(index)
                .map(|((&mean, &pulls), idx)| {
                    if pulls == 0 {
                        UNPULLED_SCORE
                    } else {
                        mean + (self.alpha / pulls as f64 * log_index(idx)).sqrt()
                    }
                })
                .collect()
        };
        bandit.adjusted_values_mut().copy_from_slice(&scores);
        best_arm(&scores)
    }
}
