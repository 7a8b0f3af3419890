use super::LearningPolicy;
use crate::bandit::Bandit;
use crate::error::Result;
use crate::numeric::log_index;
use crate::policy::{Policy, best_arm, linear, require_linear};

/// Linear Upper Confidence Bound (LinUCB) policy for linear bandits
///
/// Scores arm `i` with `<x_i, theta_hat> + sqrt(rho * x_i^T G^-1 x_i)`
/// where `rho = d * log(t)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinUcb;

impl Policy for LinUcb {
    fn name(&self) -> &'static str {
        "UCB_Lin"
    }

    fn learning_policy(&self) -> Option<LearningPolicy> {
        Some(LearningPolicy::LinUcb)
    }

    fn check_compatible(&self, bandit: &Bandit) -> Result<()> {
        require_linear(self.name(), bandit)
    }

    fn select(&self, bandit: &mut Bandit, _rng: &mut dyn rand::RngCore) -> Result<usize> {
        let scores: Vec<f64> = {
            let b = linear(self.name(), bandit)?;
            let model = b.model();
            let rho = b.dimension() as f64 * log_index(b.counters().timestep as f64);
            (0..b.arms().len())
                .map(|i| {
                    let x = b.features(i);
                    model.predict(x) + (rho * model.quad_form(x)).sqrt()
                })
                .collect()
        };
        bandit.adjusted_values_mut().copy_from_slice(&scores);
        best_arm(&scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::Arm;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_linucb_scores() {
        let mut bandit = Bandit::from_arms(
            vec![
                Arm::linear(vec![1.0, 0.0]).unwrap(),
                Arm::linear(vec![0.0, 1.0]).unwrap(),
            ],
            Some(vec![1.0, 0.0]),
            false,
        )
        .unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        bandit.pull(0, &mut rng).unwrap();
        bandit.pull(0, &mut rng).unwrap();
        bandit.pull(1, &mut rng).unwrap();

        LinUcb.select(&mut bandit, &mut rng).unwrap();
        let lin = bandit.as_linear().unwrap();
        let rho = 2.0 * 3.0_f64.ln();
        // G = diag(3, 2)
        let expected0 = lin.weight_estimate()[0] + (rho / 3.0).sqrt();
        let expected1 = lin.weight_estimate()[1] + (rho / 2.0).sqrt();
        assert_relative_eq!(bandit.adjusted_values()[0], expected0, epsilon = 1e-12);
        assert_relative_eq!(bandit.adjusted_values()[1], expected1, epsilon = 1e-12);
    }

    #[test]
    fn test_linucb_finds_best_direction() {
        let mut bandit = Bandit::from_arms(
            vec![
                Arm::linear(vec![1.0, 0.0]).unwrap(),
                Arm::linear(vec![0.0, 1.0]).unwrap(),
                Arm::linear(vec![0.7, 0.7]).unwrap(),
            ],
            Some(vec![0.0, 3.0]),
            false,
        )
        .unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for arm in 0..3 {
            bandit.pull(arm, &mut rng).unwrap();
        }
        for _ in 0..300 {
            let arm = LinUcb.select(&mut bandit, &mut rng).unwrap();
            bandit.pull(arm, &mut rng).unwrap();
        }
        let counts = bandit.pull_counts();
        assert!(counts[1] > counts[0] && counts[1] > counts[2], "{counts:?}");
    }
}
