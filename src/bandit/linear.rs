use crate::arm::Arm;
use crate::bandit::Counters;
use crate::error::{BanditError, Result};
use crate::numeric::norm;
use crate::regression::LeastSquares;

/// Arms are feature vectors sharing one hidden weight vector.
///
/// Rewards are `<x_i, theta> + N(0, 1)`; the bandit keeps the regularized
/// least-squares estimate of `theta` up to date after every pull.
#[derive(Clone, Debug)]
pub struct LinearBandit {
    arms: Vec<Arm>,
    counters: Counters,
    true_mean: Vec<f64>,
    /// Expected reward of each arm under `true_mean`
    arm_means: Vec<f64>,
    normalized: bool,
    model: LeastSquares,
}

impl LinearBandit {
    /// Creates a linear bandit.
    ///
    /// With `normalized`, the mean vector and every feature vector are rescaled
    /// to unit length, keeping their direction.
    pub fn new(mut arms: Vec<Arm>, mean_vector: Vec<f64>, normalized: bool) -> Result<Self> {
        if arms.is_empty() {
            return Err(BanditError::NoArmsAvailable);
        }
        let dimension = mean_vector.len();
        if dimension == 0 {
            return Err(BanditError::ZeroDimension);
        }
        if mean_vector.iter().any(|x| !x.is_finite()) {
            return Err(BanditError::invalid_parameter("mean vector must be finite"));
        }
        for (i, arm) in arms.iter().enumerate() {
            let features = arm.features().ok_or_else(|| {
                BanditError::invalid_config(format!(
                    "linear bandit cannot hold a {} arm",
                    arm.descriptor().type_name()
                ))
            })?;
            if features.len() != dimension {
                return Err(BanditError::DimensionMismatch {
                    message: format!(
                        "arm {i} has {} features, mean vector has {dimension}",
                        features.len()
                    ),
                });
            }
        }

        let true_mean = if normalized {
            unit(&mean_vector, "mean vector")?
        } else {
            mean_vector
        };
        for arm in arms.iter_mut() {
            if normalized {
                let scaled = unit(arm.features().unwrap_or_default(), "arm feature vector")?;
                arm.set_features(scaled);
            }
            arm.set_mean_vector(&true_mean);
        }

        let arm_means = arms.iter().map(Arm::mean).collect();
        let n = arms.len();
        Ok(Self {
            arms,
            counters: Counters::new(n),
            true_mean,
            arm_means,
            normalized,
            model: LeastSquares::new(dimension),
        })
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub(crate) fn counters_mut(&mut self) -> &mut Counters {
        &mut self.counters
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// The hidden weight vector.
    pub fn true_mean(&self) -> &[f64] {
        &self.true_mean
    }

    /// Feature vector of arm `i`. Panics if `i` is out of range.
    pub fn features(&self, i: usize) -> &[f64] {
        self.arms[i].features().unwrap_or_default()
    }

    /// Least-squares estimate `G^-1 b` of the hidden weight vector.
    pub fn weight_estimate(&self) -> &[f64] {
        &self.model.estimate
    }

    /// The least-squares state (Gram matrix, inverse, weighted sum).
    pub fn model(&self) -> &LeastSquares {
        &self.model
    }

    pub fn pull(&mut self, arm: usize, rng: &mut dyn rand::RngCore) -> Result<f64> {
        self.counters.check_index(arm)?;
        let reward = self.arms[arm].pull(self.counters.timestep, rng)?;
        let features = self.arms[arm].features().unwrap_or_default();
        self.model.fit(features, reward)?;
        self.counters.record(arm);
        Ok(reward)
    }

    /// `max_i <x_i, theta> * t - sum_i T_i <x_i, theta>`
    pub fn regret(&self) -> f64 {
        let best = self
            .arm_means
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let realized: f64 = self
            .arm_means
            .iter()
            .zip(&self.counters.pull_count)
            .map(|(mean, &pulls)| pulls as f64 * mean)
            .sum();
        best * self.counters.timestep as f64 - realized
    }

    pub fn reset(&mut self) {
        self.counters.reset();
        self.model.reset();
    }
}

fn unit(v: &[f64], what: &str) -> Result<Vec<f64>> {
    let length = norm(v);
    if length == 0.0 || !length.is_finite() {
        return Err(BanditError::invalid_parameter(format!(
            "cannot normalize a zero-length {what}"
        )));
    }
    Ok(v.iter().map(|x| x / length).collect())
}
