use rand::Rng;

use super::LearningPolicy;
use crate::bandit::Bandit;
use crate::error::Result;
use crate::policy::Policy;

/// Random selection policy - selects arms uniformly at random
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Random;

impl Policy for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::Random)
    }

    fn check_compatible(&self, _bandit: &Bandit) -> Result<()> {
        // Only needs the arm count
        Ok(())
    }

    fn select(&self, bandit: &mut Bandit, rng: &mut dyn rand::RngCore) -> Result<usize> {
        Ok(rng.random_range(0..bandit.n_arms()))
    }
}
