use super::{IndexFn, LearningPolicy};
use crate::bandit::Bandit;
use crate::error::Result;
use crate::numeric::{UNPULLED_SCORE, approx_normal_quantile};
use crate::policy::{Policy, best_arm, precision, require_stochastic, stochastic};

/// Bayesian Gaussian upper quantile policy.
///
/// Scores arm `i` with the `1 - 1/index_i` quantile of
/// `N(mean_i, 1 / T_i)`, solved by Newton iteration on an approximate
/// normal CDF/PDF pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BayesGauss {
    index: IndexFn,
}

impl BayesGauss {
    pub fn new(index: IndexFn) -> Self {
        Self { index }
    }

    pub fn index(&self) -> IndexFn {
        self.index
    }
}

impl Policy for BayesGauss {
    fn name(&self) -> &'static str {
        "Bayes_Gauss"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::BayesGauss { index: self.index })
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_stochastic(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, _rng: &mut dyn rand::RngCore) -> Result<usize> {
        let scores: Vec<f64> = {
            let b = stochastic(self.name(), bandit)?;
            let counters = b.counters();
            let tolerance = precision(counters.horizon);
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
                        let sd = (1.0 / pulls as f64).sqrt();
                        approx_normal_quantile(1.0 - 1.0 / idx, mean, sd, tolerance).value
                    }
                })
                .collect()
        };
        bandit.adjusted_values_mut().copy_from_slice(&scores);
        best_arm(&scores)
    }
}
