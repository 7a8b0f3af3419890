use rand_distr::{Distribution, StandardNormal};

use super::LearningPolicy;
use crate::bandit::Bandit;
use crate::error::Result;
use crate::numeric::dot;
use crate::policy::{Policy, best_arm, linear, require_linear};

/// Linear Thompson Sampling (LinTS) policy for linear bandits
///
/// Draws one weight vector from `N(theta_hat, G^-1)` through the Cholesky
/// factor of `G^-1` and scores every arm against that single draw.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinTs;

impl Policy for LinTs {
    fn name(&self) -> &'static str {
        "TS_Lin"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::LinTs)
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_linear(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, rng: &mut dyn rand::RngCore) -> Result<usize> {
        let scores: Vec<f64> = {
            let b = linear(self.name(), bandit)?;
            let d = b.dimension();
            let factor = b.model().inverse_cholesky()?;
            let z: Vec<f64> = (0..d).map(|_| StandardNormal.sample(rng)).collect();

            // w = theta_hat + L z
            let mut sampled = b.weight_estimate().to_vec();
            for (i, w) in sampled.iter_mut().enumerate() {
                *w += (0..=i).map(|j| factor[(i, j)] * z[j]).sum::<f64>();
            }
            (0..b.arms().len())
                .map(|i| dot(&sampled, b.features(i)))
                .collect()
        };
        bandit.adjusted_values_mut().copy_from_slice(&scores);
        best_arm(&scores)
    }
}
