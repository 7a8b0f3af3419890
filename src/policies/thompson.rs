use rand_distr::{Beta, Distribution, Normal};

use super::LearningPolicy;
use crate::bandit::Bandit;
use crate::error::{BanditError, Result};
use crate::numeric::UNPULLED_SCORE;
use crate::policy::{Policy, best_arm, require_bernoulli, require_stochastic, stochastic};

/// Thompson Sampling policy using Beta distribution
///
/// Samples each arm from `Beta(successes + 1, failures + 1)`, i.e. the
/// posterior under a uniform prior, and plays the largest sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BetaThompson;

impl Policy for BetaThompson {
    fn name(&self) -> &'static str {
        "TS_Beta"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::BetaThompson)
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_bernoulli(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, rng: &mut dyn rand::RngCore) -> Result<usize> {
        let samples = {
            let b = stochastic(self.name(), bandit)?;
            let mut samples = Vec::with_capacity(b.arms().len());
            for arm in 0..b.arms().len() {
                let (successes, failures) = b.beta_counts(arm);
                let dist = Beta::new(successes + 1.0, failures + 1.0)
                    .map_err(|e| BanditError::numerical(format!("beta posterior: {e}")))?;
                samples.push(dist.sample(rng));
            }
            samples
        };
        bandit.adjusted_values_mut().copy_from_slice(&samples);
        best_arm(&samples)
    }
}

/// Thompson Sampling with Gaussian posteriors `N(mean_i, 1 / T_i)`.
///
/// Arms without pulls get a large placeholder so they are tried first.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GaussianThompson;

impl Policy for GaussianThompson {
    fn name(&self) -> &'static str {
        "TS_Gauss"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::GaussianThompson)
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_stochastic(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, rng: &mut dyn rand::RngCore) -> Result<usize> {
        let samples = {
            let b = stochastic(self.name(), bandit)?;
            let pulls = &b.counters().pull_count;
            let mut samples = Vec::with_capacity(pulls.len());
            for (&mean, &count) in b.running_means().iter().zip(pulls) {
                if count == 0 {
                    samples.push(UNPULLED_SCORE);
                    continue;
                }
                let dist = Normal::new(mean, (1.0 / count as f64).sqrt())
                    .map_err(|e| BanditError::numerical(format!("gaussian posterior: {e}")))?;
                samples.push(dist.sample(rng));
            }
            samples
        };
        bandit.adjusted_values_mut().copy_from_slice(&samples);
        best_arm(&samples)
    }
}
