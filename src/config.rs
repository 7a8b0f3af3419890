//! Serializable, fully-resolved experiment configuration.
//!
//! A loader (YAML, JSON, ...) hands these types to the engine. Every name
//! maps to a closed enum during deserialization, so nothing is looked up by
//! string once a simulation runs.

use serde::{Deserialize, Serialize};

use crate::arm::Arm;
use crate::bandit::Bandit;
use crate::error::{BanditError, Result};
use crate::output::{EmitMode, RegretSink};
use crate::policies::LearningPolicy;
use crate::policy::Policy;
use crate::simulation::Simulation;

/// One arm as written in a configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArmSpec {
    Bernoulli { mean: f64 },
    Normal { mean: f64, variance: f64 },
    Linear { vector: Vec<f64> },
    Sequence { rewards: Vec<f64> },
}

impl ArmSpec {
    pub fn build(&self) -> Result<Arm> {
        match self {
            ArmSpec::Bernoulli { mean } => Arm::bernoulli(*mean),
            ArmSpec::Normal { mean, variance } => Arm::normal(*mean, *variance),
            ArmSpec::Linear { vector } => Arm::linear(vector.clone()),
            ArmSpec::Sequence { rewards } => Arm::sequence(rewards.clone()),
        }
    }
}

/// Arms plus the extra parameters of linear bandits.
///
/// The arm family picks the bandit variant; mixing families is rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BanditConfig {
    pub arms: Vec<ArmSpec>,
    /// Hidden weight vector, required for linear arms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_vector: Option<Vec<f64>>,
    #[serde(default)]
    pub normalized: bool,
}

impl BanditConfig {
    pub fn build(&self) -> Result<Bandit> {
        let arms = self
            .arms
            .iter()
            .map(ArmSpec::build)
            .collect::<Result<Vec<_>>>()?;
        Bandit::from_arms(arms, self.mean_vector.clone(), self.normalized)
    }
}

/// Everything needed to run one experiment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub bandit: BanditConfig,
    pub policy: LearningPolicy,
    pub horizon: u64,
    pub cycles: u64,
    /// Fixed seed for reproducible runs; OS entropy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub emit: EmitMode,
}

impl SimulationConfig {
    /// Rejects the configuration before any pull happens.
    pub fn validate(&self) -> Result<()> {
        self.prepare().map(|_| ())
    }

    /// Validates and returns the resolved parts, with the bandit's horizon set.
    pub(crate) fn prepare(&self) -> Result<(Bandit, Box<dyn Policy>)> {
        if self.cycles == 0 {
            return Err(BanditError::invalid_config("cycles must be at least 1"));
        }
        let policy = self.policy.build()?;
        let mut bandit = self.bandit.build()?;
        if self.horizon < bandit.n_arms() as u64 {
            return Err(BanditError::invalid_config(format!(
                "horizon {} is shorter than the {} arms",
                self.horizon,
                bandit.n_arms()
            )));
        }
        bandit.set_horizon(self.horizon)?;
        policy.check_compatible(&bandit)?;
        Ok((bandit, policy))
    }

    /// Runs the configured experiment, emitting into `sink`.
    pub fn run<S: RegretSink>(&self, sink: &mut S) -> Result<Simulation> {
        let mut simulation = Simulation::from_config(self)?;
        simulation.run_many(self.horizon, self.cycles, self.emit, sink)?;
        Ok(simulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::IndexFn;

    fn stochastic(policy: LearningPolicy) -> SimulationConfig {
        SimulationConfig {
            bandit: BanditConfig {
                arms: vec![
                    ArmSpec::Bernoulli { mean: 0.3 },
                    ArmSpec::Bernoulli { mean: 0.7 },
                ],
                mean_vector: None,
                normalized: false,
            },
            policy,
            horizon: 50,
            cycles: 2,
            seed: Some(3),
            emit: EmitMode::Histogram,
        }
    }

    #[test]
    fn test_validate_accepts_compatible() {
        assert!(stochastic(LearningPolicy::BetaThompson).validate().is_ok());
        assert!(
            stochastic(LearningPolicy::KlUcb {
                index: IndexFn::B3
            })
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn test_validate_rejects() {
        assert!(matches!(
            stochastic(LearningPolicy::LinTs).validate(),
            Err(BanditError::IncompatiblePolicy { .. })
        ));

        let mut short = stochastic(LearningPolicy::Greedy);
        short.horizon = 1;
        assert!(matches!(short.validate(), Err(BanditError::InvalidConfig { .. })));

        let mut no_cycles = stochastic(LearningPolicy::Greedy);
        no_cycles.cycles = 0;
        assert!(no_cycles.validate().is_err());

        let mut bad_arm = stochastic(LearningPolicy::Greedy);
        bad_arm.bandit.arms.push(ArmSpec::Bernoulli { mean: 1.5 });
        assert!(matches!(
            bad_arm.validate(),
            Err(BanditError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_sequence_shorter_than_horizon() {
        let config = SimulationConfig {
            bandit: BanditConfig {
                arms: vec![ArmSpec::Sequence {
                    rewards: vec![0.0; 10],
                }],
                mean_vector: None,
                normalized: false,
            },
            policy: LearningPolicy::Random,
            horizon: 11,
            cycles: 1,
            seed: None,
            emit: EmitMode::Variable,
        };
        assert!(matches!(
            config.validate(),
            Err(BanditError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_linear_parameters_on_stochastic_arms() {
        let mut with_vector = stochastic(LearningPolicy::Greedy);
        with_vector.bandit.mean_vector = Some(vec![1.0]);
        assert!(matches!(
            with_vector.validate(),
            Err(BanditError::InvalidConfig { .. })
        ));

        let mut normalized = stochastic(LearningPolicy::Greedy);
        normalized.bandit.normalized = true;
        assert!(matches!(
            normalized.validate(),
            Err(BanditError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_prepare_sets_horizon() {
        let (bandit, policy) = stochastic(LearningPolicy::Greedy).prepare().unwrap();
        assert_eq!(bandit.horizon(), 50);
        assert_eq!(policy.name(), "greedy");

        let sim = Simulation::from_config(&stochastic(LearningPolicy::Greedy)).unwrap();
        assert_eq!(sim.horizon(), 50);
    }

    #[test]
    fn test_run_emits_per_cycle() {
        let mut out = Vec::<f64>::new();
        let sim = stochastic(LearningPolicy::Greedy).run(&mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(sim.iterations(), 2);
    }
}
