//! Arm type for multi-armed bandits.
//!
//! An `Arm` is one reward source. Stochastic arms draw a fresh reward on every
//! pull, linear arms add unit Gaussian noise to the inner product of their
//! feature vector with the bandit's hidden weight vector, and sequence arms
//! replay a precomputed reward per timestep.

use std::fmt;

use rand::Rng;
use rand_distr::{Distribution, Normal, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::{BanditError, Result};
use crate::numeric::dot;

/// A single reward source.
///
/// # Examples
///
/// ```
/// use banditsim::Arm;
/// use rand::SeedableRng;
///
/// let arm = Arm::bernoulli(0.7).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(42);
/// let reward = arm.pull(0, &mut rng).unwrap();
/// assert!(reward == 0.0 || reward == 1.0);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Arm {
    /// Pays 1 with probability `mean`, else 0.
    Bernoulli { mean: f64 },
    /// Draws from `Normal(mean, sqrt(variance))`.
    Normal { mean: f64, variance: f64 },
    /// Pays `<features, mean_vector> + N(0, 1)`.
    ///
    /// `mean_vector` is empty until the owning linear bandit assigns it.
    Linear {
        features: Vec<f64>,
        mean_vector: Vec<f64>,
    },
    /// Replays `rewards[timestep]`.
    Sequence { rewards: Vec<f64> },
}

impl Arm {
    /// Creates a Bernoulli arm; `mean` must lie in `[0, 1]`.
    pub fn bernoulli(mean: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&mean) {
            return Err(BanditError::invalid_parameter(format!(
                "Bernoulli mean must be in [0, 1], got {mean}"
            )));
        }
        Ok(Arm::Bernoulli { mean })
    }

    /// Creates a Normal arm; `variance` must be finite and non-negative.
    pub fn normal(mean: f64, variance: f64) -> Result<Self> {
        if !mean.is_finite() || !variance.is_finite() || variance < 0.0 {
            return Err(BanditError::invalid_parameter(format!(
                "Normal arm needs a finite mean and a non-negative variance, got ({mean}, {variance})"
            )));
        }
        Ok(Arm::Normal { mean, variance })
    }

    /// Creates a linear arm from its feature vector.
    pub fn linear(features: Vec<f64>) -> Result<Self> {
        if features.is_empty() {
            return Err(BanditError::ZeroDimension);
        }
        if features.iter().any(|x| !x.is_finite()) {
            return Err(BanditError::invalid_parameter(
                "linear arm features must be finite",
            ));
        }
        Ok(Arm::Linear {
            features,
            mean_vector: Vec::new(),
        })
    }

    /// Creates an arm that replays a precomputed reward sequence.
    pub fn sequence(rewards: Vec<f64>) -> Result<Self> {
        if rewards.is_empty() {
            return Err(BanditError::invalid_parameter(
                "reward sequence must not be empty",
            ));
        }
        Ok(Arm::Sequence { rewards })
    }

    /// Draws one reward. `timestep` is only read by sequence arms.
    pub fn pull(&self, timestep: u64, rng: &mut dyn rand::RngCore) -> Result<f64> {
        match self {
            Arm::Bernoulli { mean } => Ok(if rng.random::<f64>() < *mean {
                1.0
            } else {
                0.0
            }),
            Arm::Normal { mean, variance } => {
                let dist = Normal::new(*mean, variance.sqrt())
                    .map_err(|e| BanditError::invalid_parameter(e.to_string()))?;
                Ok(dist.sample(rng))
            }
            Arm::Linear {
                features,
                mean_vector,
            } => {
                if features.len() != mean_vector.len() {
                    return Err(BanditError::DimensionMismatch {
                        message: format!(
                            "arm has {} features but mean vector has {} entries",
                            features.len(),
                            mean_vector.len()
                        ),
                    });
                }
                let noise: f64 = StandardNormal.sample(rng);
                Ok(dot(features, mean_vector) + noise)
            }
            Arm::Sequence { rewards } => rewards.get(timestep as usize).copied().ok_or(
                BanditError::HorizonExceeded {
                    timestep,
                    horizon: rewards.len() as u64,
                },
            ),
        }
    }

    /// Expected reward of one pull, where it is defined.
    ///
    /// Sequence arms report the average of their sequence.
    pub fn mean(&self) -> f64 {
        match self {
            Arm::Bernoulli { mean } | Arm::Normal { mean, .. } => *mean,
            Arm::Linear {
                features,
                mean_vector,
            } => dot(features, mean_vector),
            Arm::Sequence { rewards } => rewards.iter().sum::<f64>() / rewards.len() as f64,
        }
    }

    /// Feature vector of a linear arm.
    pub fn features(&self) -> Option<&[f64]> {
        match self {
            Arm::Linear { features, .. } => Some(features),
            _ => None,
        }
    }

    pub(crate) fn set_mean_vector(&mut self, vector: &[f64]) {
        if let Arm::Linear { mean_vector, .. } = self {
            *mean_vector = vector.to_vec();
        }
    }

    pub(crate) fn set_features(&mut self, vector: Vec<f64>) {
        if let Arm::Linear { features, .. } = self {
            *features = vector;
        }
    }

    /// Display/logging descriptor for this arm.
    pub fn descriptor(&self) -> ArmDescriptor {
        match self {
            Arm::Bernoulli { mean } => ArmDescriptor::Bernoulli { mean: *mean },
            Arm::Normal { mean, variance } => ArmDescriptor::Normal {
                mean: *mean,
                variance: *variance,
            },
            Arm::Linear {
                features,
                mean_vector,
            } => ArmDescriptor::Linear {
                features: features.clone(),
                mean_vector: mean_vector.clone(),
            },
            Arm::Sequence { rewards } => ArmDescriptor::Sequence {
                length: rewards.len(),
                mean: self.mean(),
            },
        }
    }
}

/// Type tag plus parameters of an arm, for display and logging only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ArmDescriptor {
    Bernoulli {
        mean: f64,
    },
    Normal {
        mean: f64,
        variance: f64,
    },
    Linear {
        features: Vec<f64>,
        mean_vector: Vec<f64>,
    },
    Sequence {
        length: usize,
        mean: f64,
    },
}

impl ArmDescriptor {
    /// Short name of the arm family.
    pub fn type_name(&self) -> &'static str {
        match self {
            ArmDescriptor::Bernoulli { .. } => "Bernoulli",
            ArmDescriptor::Normal { .. } => "Normal",
            ArmDescriptor::Linear { .. } => "Linear",
            ArmDescriptor::Sequence { .. } => "Sequence",
        }
    }
}

impl fmt::Display for ArmDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmDescriptor::Bernoulli { mean } => write!(f, "Bernoulli({mean})"),
            ArmDescriptor::Normal { mean, variance } => write!(f, "Normal({mean}, {variance})"),
            ArmDescriptor::Linear {
                features,
                mean_vector,
            } => write!(f, "Linear({features:?}, {mean_vector:?})"),
            ArmDescriptor::Sequence { length, mean } => {
                write!(f, "Sequence(len={length}, mean={mean})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn test_arm_validation() {
        assert!(Arm::bernoulli(0.5).is_ok());
        assert!(matches!(
            Arm::bernoulli(1.5),
            Err(BanditError::InvalidParameter { .. })
        ));
        assert!(Arm::normal(0.0, -1.0).is_err());
        assert!(Arm::normal(f64::NAN, 1.0).is_err());
        assert!(matches!(
            Arm::linear(vec![]),
            Err(BanditError::ZeroDimension)
        ));
        assert!(Arm::sequence(vec![]).is_err());
    }

    #[test]
    fn test_bernoulli_pull_frequency() {
        let arm = Arm::bernoulli(0.7).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let n = 10_000;
        let total: f64 = (0..n).map(|_| arm.pull(0, &mut rng).unwrap()).sum();
        assert_abs_diff_eq!(total / n as f64, 0.7, epsilon = 0.03);
    }

    #[test]
    fn test_degenerate_bernoulli_arms() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let never = Arm::bernoulli(0.0).unwrap();
        let always = Arm::bernoulli(1.0).unwrap();
        for _ in 0..100 {
            assert_eq!(never.pull(0, &mut rng).unwrap(), 0.0);
            assert_eq!(always.pull(0, &mut rng).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_normal_pull_mean() {
        let arm = Arm::normal(2.0, 4.0).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let n = 20_000;
        let total: f64 = (0..n).map(|_| arm.pull(0, &mut rng).unwrap()).sum();
        assert_abs_diff_eq!(total / n as f64, 2.0, epsilon = 0.1);
    }

    #[test]
    fn test_linear_pull_requires_mean_vector() {
        let mut arm = Arm::linear(vec![1.0, 0.0]).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        assert!(matches!(
            arm.pull(0, &mut rng),
            Err(BanditError::DimensionMismatch { .. })
        ));

        arm.set_mean_vector(&[3.0, -1.0]);
        assert_eq!(arm.mean(), 3.0);
        assert!(arm.pull(0, &mut rng).unwrap().is_finite());
    }

    #[test]
    fn test_sequence_pull_and_bounds() {
        let arm = Arm::sequence(vec![0.1, 0.2, 0.3]).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        assert_eq!(arm.pull(1, &mut rng).unwrap(), 0.2);
        assert!(matches!(
            arm.pull(3, &mut rng),
            Err(BanditError::HorizonExceeded {
                timestep: 3,
                horizon: 3
            })
        ));
        assert_abs_diff_eq!(arm.mean(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_descriptor_display() {
        assert_eq!(
            Arm::bernoulli(0.7).unwrap().descriptor().to_string(),
            "Bernoulli(0.7)"
        );
        assert_eq!(
            Arm::normal(0.5, 1.0).unwrap().descriptor().to_string(),
            "Normal(0.5, 1)"
        );
        let seq = Arm::sequence(vec![1.0, 3.0]).unwrap().descriptor();
        assert_eq!(seq.type_name(), "Sequence");
        assert_eq!(seq.to_string(), "Sequence(len=2, mean=2)");
    }
}
