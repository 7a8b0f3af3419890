//! Bandit environments.
//!
//! A [`Bandit`] owns its arms plus the running statistics that policies read:
//! per-arm pull counts, the timestep, and an `adjusted_value` scratch array
//! that the bound policy overwrites on each selection. The three variants
//! differ in what else they track and in how regret is measured.

mod adversarial;
mod linear;
mod snapshot;
mod stochastic;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arm::{Arm, ArmDescriptor};
use crate::error::{BanditError, Result};

pub use adversarial::AdversarialBandit;
pub use linear::LinearBandit;
pub use snapshot::{BanditSnapshot, Estimates};
pub use stochastic::StochasticBandit;

/// Which family of bandit an instance belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BanditKind {
    Stochastic,
    Linear,
    Adversarial,
}

impl BanditKind {
    pub fn name(self) -> &'static str {
        match self {
            BanditKind::Stochastic => "stochastic",
            BanditKind::Linear => "linear",
            BanditKind::Adversarial => "adversarial",
        }
    }
}

impl fmt::Display for BanditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters shared by every bandit variant.
#[derive(Clone, Debug, PartialEq)]
pub struct Counters {
    /// Pulls per arm; sums to `timestep`.
    pub pull_count: Vec<u64>,
    /// Total pulls since the last reset.
    pub timestep: u64,
    /// Steps per cycle, as announced by the driver.
    pub horizon: u64,
    /// Policy-owned scratch space for confidence-adjusted scores.
    pub adjusted_value: Vec<f64>,
}

impl Counters {
    pub(crate) fn new(n_arms: usize) -> Self {
        Self {
            pull_count: vec![0; n_arms],
            timestep: 0,
            horizon: 0,
            adjusted_value: vec![0.0; n_arms],
        }
    }

    pub(crate) fn check_index(&self, arm: usize) -> Result<()> {
        if arm >= self.pull_count.len() {
            return Err(BanditError::ArmOutOfRange {
                index: arm,
                n_arms: self.pull_count.len(),
            });
        }
        Ok(())
    }

    /// Returns the new pull count of `arm`.
    pub(crate) fn record(&mut self, arm: usize) -> u64 {
        self.pull_count[arm] += 1;
        self.timestep += 1;
        self.pull_count[arm]
    }

    /// Zeroes everything except the horizon.
    pub(crate) fn reset(&mut self) {
        self.pull_count.fill(0);
        self.timestep = 0;
        self.adjusted_value.fill(0.0);
    }
}

/// A bandit environment of one of the three supported families.
#[derive(Clone, Debug)]
pub enum Bandit {
    Stochastic(StochasticBandit),
    Linear(LinearBandit),
    Adversarial(AdversarialBandit),
}

impl Bandit {
    /// Builds a bandit from a list of arms, choosing the variant from the arm family.
    ///
    /// `mean_vector` and `normalized` belong to linear arms only; passing
    /// either with another family is a configuration error.
    pub fn from_arms(arms: Vec<Arm>, mean_vector: Option<Vec<f64>>, normalized: bool) -> Result<Self> {
        let first = arms.first().ok_or(BanditError::NoArmsAvailable)?;
        if !matches!(first, Arm::Linear { .. }) {
            let family = first.descriptor().type_name();
            if mean_vector.is_some() {
                return Err(BanditError::invalid_config(format!(
                    "a mean vector only applies to linear arms, not {family}"
                )));
            }
            if normalized {
                return Err(BanditError::invalid_config(format!(
                    "normalization only applies to linear arms, not {family}"
                )));
            }
        }
        match first {
            Arm::Bernoulli { .. } | Arm::Normal { .. } => {
                Ok(Bandit::Stochastic(StochasticBandit::new(arms)?))
            }
            Arm::Linear { .. } => {
                let mean_vector = mean_vector.ok_or_else(|| {
                    BanditError::invalid_config("linear bandit requires a mean vector")
                })?;
                Ok(Bandit::Linear(LinearBandit::new(arms, mean_vector, normalized)?))
            }
            Arm::Sequence { .. } => Ok(Bandit::Adversarial(AdversarialBandit::new(arms)?)),
        }
    }

    pub fn kind(&self) -> BanditKind {
        match self {
            Bandit::Stochastic(_) => BanditKind::Stochastic,
            Bandit::Linear(_) => BanditKind::Linear,
            Bandit::Adversarial(_) => BanditKind::Adversarial,
        }
    }

    fn counters(&self) -> &Counters {
        match self {
            Bandit::Stochastic(b) => b.counters(),
            Bandit::Linear(b) => b.counters(),
            Bandit::Adversarial(b) => b.counters(),
        }
    }

    fn counters_mut(&mut self) -> &mut Counters {
        match self {
            Bandit::Stochastic(b) => b.counters_mut(),
            Bandit::Linear(b) => b.counters_mut(),
            Bandit::Adversarial(b) => b.counters_mut(),
        }
    }

    pub fn arms(&self) -> &[Arm] {
        match self {
            Bandit::Stochastic(b) => b.arms(),
            Bandit::Linear(b) => b.arms(),
            Bandit::Adversarial(b) => b.arms(),
        }
    }

    pub fn n_arms(&self) -> usize {
        self.arms().len()
    }

    pub fn pull_counts(&self) -> &[u64] {
        &self.counters().pull_count
    }

    pub fn timestep(&self) -> u64 {
        self.counters().timestep
    }

    pub fn horizon(&self) -> u64 {
        self.counters().horizon
    }

    /// Announces the cycle length; adversarial bandits reject horizons longer
    /// than their reward sequences.
    pub fn set_horizon(&mut self, horizon: u64) -> Result<()> {
        if let Bandit::Adversarial(b) = self {
            if horizon > b.sequence_len() {
                return Err(BanditError::invalid_config(format!(
                    "horizon {horizon} exceeds reward sequence length {}",
                    b.sequence_len()
                )));
            }
        }
        self.counters_mut().horizon = horizon;
        Ok(())
    }

    pub fn adjusted_values(&self) -> &[f64] {
        &self.counters().adjusted_value
    }

    pub fn adjusted_values_mut(&mut self) -> &mut [f64] {
        &mut self.counters_mut().adjusted_value
    }

    /// Pulls `arm`, updating the statistics. Returns the observed reward.
    pub fn pull(&mut self, arm: usize, rng: &mut dyn rand::RngCore) -> Result<f64> {
        match self {
            Bandit::Stochastic(b) => b.pull(arm, rng),
            Bandit::Linear(b) => b.pull(arm, rng),
            Bandit::Adversarial(b) => b.pull(arm),
        }
    }

    /// Regret accumulated since the last reset.
    pub fn regret(&self) -> f64 {
        match self {
            Bandit::Stochastic(b) => b.regret(),
            Bandit::Linear(b) => b.regret(),
            Bandit::Adversarial(b) => b.regret(),
        }
    }

    /// Clears all per-cycle statistics; arms and horizon persist.
    pub fn reset(&mut self) {
        match self {
            Bandit::Stochastic(b) => b.reset(),
            Bandit::Linear(b) => b.reset(),
            Bandit::Adversarial(b) => b.reset(),
        }
    }

    pub fn arm_descriptors(&self) -> Vec<ArmDescriptor> {
        self.arms().iter().map(Arm::descriptor).collect()
    }

    /// Statistics snapshot for display collaborators.
    pub fn snapshot(&self) -> BanditSnapshot {
        let estimates = match self {
            Bandit::Stochastic(b) => Estimates::RunningMean(b.running_means().to_vec()),
            Bandit::Linear(b) => Estimates::WeightEstimate(b.weight_estimate().to_vec()),
            Bandit::Adversarial(_) => Estimates::None,
        };
        let counters = self.counters();
        BanditSnapshot {
            kind: self.kind(),
            arms: self.arm_descriptors(),
            pull_count: counters.pull_count.clone(),
            estimates,
            adjusted_value: counters.adjusted_value.clone(),
            timestep: counters.timestep,
            horizon: counters.horizon,
            regret: self.regret(),
        }
    }

    pub fn as_stochastic(&self) -> Option<&StochasticBandit> {
        match self {
            Bandit::Stochastic(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_stochastic_mut(&mut self) -> Option<&mut StochasticBandit> {
        match self {
            Bandit::Stochastic(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_linear(&self) -> Option<&LinearBandit> {
        match self {
            Bandit::Linear(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_linear_mut(&mut self) -> Option<&mut LinearBandit> {
        match self {
            Bandit::Linear(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_adversarial(&self) -> Option<&AdversarialBandit> {
        match self {
            Bandit::Adversarial(b) => Some(b),
            _ => None,
        }
    }
}

impl From<StochasticBandit> for Bandit {
    fn from(b: StochasticBandit) -> Self {
        Bandit::Stochastic(b)
    }
}

impl From<LinearBandit> for Bandit {
    fn from(b: LinearBandit) -> Self {
        Bandit::Linear(b)
    }
}

impl From<AdversarialBandit> for Bandit {
    fn from(b: AdversarialBandit) -> Self {
        Bandit::Adversarial(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn bernoulli_arms(means: &[f64]) -> Vec<Arm> {
        means.iter().map(|&m| Arm::bernoulli(m).unwrap()).collect()
    }

    #[test]
    fn test_from_arms_picks_variant() {
        let sto = Bandit::from_arms(bernoulli_arms(&[0.1, 0.9]), None, false).unwrap();
        assert_eq!(sto.kind(), BanditKind::Stochastic);
        assert_eq!(sto.n_arms(), 2);

        let lin = Bandit::from_arms(
            vec![Arm::linear(vec![1.0, 0.0]).unwrap()],
            Some(vec![0.5, 0.5]),
            false,
        )
        .unwrap();
        assert_eq!(lin.kind(), BanditKind::Linear);

        let adv = Bandit::from_arms(vec![Arm::sequence(vec![0.0, 1.0]).unwrap()], None, false)
            .unwrap();
        assert_eq!(adv.kind(), BanditKind::Adversarial);
    }

    #[test]
    fn test_from_arms_errors() {
        assert!(matches!(
            Bandit::from_arms(vec![], None, false),
            Err(BanditError::NoArmsAvailable)
        ));
        assert!(matches!(
            Bandit::from_arms(vec![Arm::linear(vec![1.0]).unwrap()], None, false),
            Err(BanditError::InvalidConfig { .. })
        ));
        let mixed = vec![
            Arm::bernoulli(0.5).unwrap(),
            Arm::sequence(vec![1.0]).unwrap(),
        ];
        assert!(matches!(
            Bandit::from_arms(mixed, None, false),
            Err(BanditError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_linear_parameters_rejected_for_other_families() {
        assert!(matches!(
            Bandit::from_arms(bernoulli_arms(&[0.5]), Some(vec![1.0]), false),
            Err(BanditError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Bandit::from_arms(bernoulli_arms(&[0.5]), None, true),
            Err(BanditError::InvalidConfig { .. })
        ));
        assert!(matches!(
            Bandit::from_arms(vec![Arm::sequence(vec![0.0]).unwrap()], Some(vec![1.0]), false),
            Err(BanditError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_out_of_range_pull() {
        let mut bandit = Bandit::from_arms(bernoulli_arms(&[0.5]), None, false).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        assert!(matches!(
            bandit.pull(1, &mut rng),
            Err(BanditError::ArmOutOfRange {
                index: 1,
                n_arms: 1
            })
        ));
        assert_eq!(bandit.timestep(), 0);
    }

    #[test]
    fn test_reset_keeps_horizon() {
        let mut bandit = Bandit::from_arms(bernoulli_arms(&[0.2, 0.4]), None, false).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        bandit.set_horizon(10).unwrap();
        bandit.pull(0, &mut rng).unwrap();
        bandit.adjusted_values_mut()[1] = 3.0;
        bandit.reset();
        assert_eq!(bandit.horizon(), 10);
        assert_eq!(bandit.timestep(), 0);
        assert_eq!(bandit.pull_counts(), &[0, 0]);
        assert_eq!(bandit.adjusted_values(), &[0.0, 0.0]);
        assert_eq!(bandit.regret(), 0.0);
    }

    #[test]
    fn test_adversarial_horizon_limit() {
        let mut bandit =
            Bandit::from_arms(vec![Arm::sequence(vec![0.0; 5]).unwrap()], None, false).unwrap();
        assert!(bandit.set_horizon(5).is_ok());
        assert!(matches!(
            bandit.set_horizon(6),
            Err(BanditError::InvalidConfig { .. })
        ));
    }
}
