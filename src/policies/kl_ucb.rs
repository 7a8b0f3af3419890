use super::{IndexFn, LearningPolicy};
use crate::bandit::Bandit;
use crate::error::Result;
use crate::numeric::{UNPULLED_SCORE, kl_upper_bound, log_index};
use crate::policy::{Policy, best_arm, precision, require_bernoulli, stochastic};

/// KL-UCB for Bernoulli arms.
///
/// Each arm's score is the largest `q` with `KL(mean_i, q) <= log(index_i) / T_i`,
/// found by Newton iteration to a precision of `1 / horizon`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KlUcb {
    index: IndexFn,
}

impl KlUcb {
    pub fn new(index: IndexFn) -> Self {
        Self { index }
    }

    pub fn index(&self) -> IndexFn {
        self.index
    }
}

impl Policy for KlUcb {
    fn name(&self) -> &'static str {
        "UCB_KL"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::KlUcb { index: self.index })
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_bernoulli(self.name(), bandit)
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
                        let target = log_index(idx) / pulls as f64;
                        kl_upper_bound(mean, target, tolerance).value
                    }
                })
                .collect()
        };
        bandit.adjusted_values_mut().copy_from_slice(&scores);
        best_arm(&scores)
    }
}
