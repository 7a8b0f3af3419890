use super::LearningPolicy;
use crate::bandit::Bandit;
use crate::error::Result;
use crate::policy::{Policy, best_arm, require_stochastic, stochastic};

/// Always exploits: picks the arm with the highest running mean.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Greedy;

impl Policy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::Greedy)
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_stochastic(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, _rng: &mut dyn rand::RngCore) -> Result<usize> {
        let b = stochastic(self.name(), bandit)?;
        best_arm(b.running_means())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::Arm;
    use crate::error::BanditError;
    use rand::SeedableRng;

    #[test]
    fn test_greedy_picks_best_mean_lowest_index_on_tie() {
        let mut bandit = Bandit::from_arms(
            vec![
                Arm::bernoulli(0.0).unwrap(),
                Arm::bernoulli(1.0).unwrap(),
                Arm::bernoulli(1.0).unwrap(),
            ],
            None,
            false,
        )
        .unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        // All means zero before any pull: first index wins.
        assert_eq!(Greedy.select(&mut bandit, &mut rng).unwrap(), 0);

        for arm in 0..3 {
            bandit.pull(arm, &mut rng).unwrap();
        }
        assert_eq!(Greedy.select(&mut bandit, &mut rng).unwrap(), 1);
    }

    #[test]
    fn test_greedy_rejects_linear_bandit() {
        let mut bandit = Bandit::from_arms(
            vec![Arm::linear(vec![1.0]).unwrap()],
            Some(vec![1.0]),
            false,
        )
        .unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        assert!(matches!(
            Greedy.check_compatible(&bandit),
            Err(BanditError::IncompatiblePolicy { .. })
        ));
        assert!(Greedy.select(&mut bandit, &mut rng).is_err());
    }
}
