//! Policy trait definition for arm-selection algorithms

use std::fmt;

use crate::bandit::{Bandit, LinearBandit, StochasticBandit};
use crate::error::{BanditError, Result};
use crate::numeric::argmax;
use crate::policies::LearningPolicy;

/// An arm-selection algorithm bound to a bandit for a simulation's lifetime.
///
/// Policies carry only their immutable parameters. The single piece of
/// cross-call state is the bandit's `adjusted_value` array, which `select`
/// may overwrite with its per-arm scores.
///
/// Like the rest of the crate, `select` takes `&mut dyn rand::RngCore` so
/// that `Box<dyn Policy>` stays object-safe.
pub trait Policy: fmt::Debug + Send + Sync {
    /// Catalog name of the algorithm (`"UCB"`, `"TS_Lin"`, ...).
    fn name(&self) -> &'static str;

    /// The catalog selector, parameters included, that rebuilds this policy.
    /// `None` for policies defined outside the catalog.
    fn learning_policy(&self) -> Option<LearningPolicy> {
        None
    }

    /// Fails with a configuration error if this policy cannot read `bandit`.
    fn check_compatible(&self, bandit: &Bandit) -> Result<()>;

    /// Chooses the next arm to pull. The index is always in `[0, n_arms)`.
    ///
    /// # Arguments
    /// - `bandit`: statistics to read; `adjusted_value` may be overwritten
    /// - `rng`: random source for stochastic policies
    fn select(&self, bandit: &mut Bandit, rng: &mut dyn rand::RngCore) -> Result<usize>;
}

pub(crate) fn incompatible(policy: &'static str, bandit: &Bandit) -> BanditError {
    BanditError::IncompatiblePolicy {
        policy,
        bandit: bandit.kind().name(),
    }
}

pub(crate) fn stochastic<'a>(
    policy: &'static str,
    bandit: &'a mut Bandit,
) -> Result<&'a mut StochasticBandit> {
    match bandit {
        Bandit::Stochastic(b) => Ok(b),
        other => Err(incompatible(policy, other)),
    }
}

pub(crate) fn linear<'a>(
    policy: &'static str,
    bandit: &'a mut Bandit,
) -> Result<&'a mut LinearBandit> {
    match bandit {
        Bandit::Linear(b) => Ok(b),
        other => Err(incompatible(policy, other)),
    }
}

pub(crate) fn require_stochastic(policy: &'static str, bandit: &Bandit) -> Result<()> {
    match bandit {
        Bandit::Stochastic(_) => Ok(()),
        other => Err(incompatible(policy, other)),
    }
}

pub(crate) fn require_bernoulli(policy: &'static str, bandit: &Bandit) -> Result<()> {
    match bandit {
        Bandit::Stochastic(b) if b.all_bernoulli() => Ok(()),
        Bandit::Stochastic(_) => Err(BanditError::invalid_config(format!(
            "{policy} needs every arm to be Bernoulli"
        ))),
        other => Err(incompatible(policy, other)),
    }
}

pub(crate) fn require_linear(policy: &'static str, bandit: &Bandit) -> Result<()> {
    match bandit {
        Bandit::Linear(_) => Ok(()),
        other => Err(incompatible(policy, other)),
    }
}

/// First-occurrence argmax over per-arm scores.
pub(crate) fn best_arm(scores: &[f64]) -> Result<usize> {
    argmax(scores).ok_or_else(|| BanditError::numerical("no arm has a comparable score"))
}

/// Newton precision target for a cycle of `horizon` steps.
pub(crate) fn precision(horizon: u64) -> f64 {
    if horizon > 0 {
        1.0 / horizon as f64
    } else {
        1e-3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_arm_first_occurrence() {
        assert_eq!(best_arm(&[0.5, 2.0, 2.0]).unwrap(), 1);
        assert_eq!(best_arm(&[f64::NAN, 1.0]).unwrap(), 1);
    }

    #[test]
    fn test_best_arm_without_comparable_score() {
        assert!(matches!(
            best_arm(&[f64::NAN, f64::NAN]),
            Err(BanditError::NumericalError { .. })
        ));
    }
}
