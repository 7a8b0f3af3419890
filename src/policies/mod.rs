//! Selection algorithms and their configuration.
//!
//! Each algorithm lives in its own file and implements [`Policy`]. The
//! [`LearningPolicy`] enum is the serializable form used in configuration;
//! it resolves to a boxed policy exactly once, when a simulation is set up.

mod bayes_gauss;
mod epsilon_greedy;
mod greedy;
mod index;
mod kl_ucb;
mod lints;
mod linucb;
mod random;
mod thompson;
mod ucb;

use serde::{Deserialize, Serialize};

pub use crate::policy::Policy;
pub use bayes_gauss::BayesGauss;
pub use epsilon_greedy::EpsilonGreedy;
pub use greedy::Greedy;
pub use index::IndexFn;
pub use kl_ucb::KlUcb;
pub use lints::LinTs;
pub use linucb::LinUcb;
pub use random::Random;
pub use thompson::{BetaThompson, GaussianThompson};
pub use ucb::Ucb;

use crate::error::Result;

/// Serializable policy selector with its named parameters.
///
/// Tagged by `"algtype"`, e.g. `{"algtype": "UCB", "alpha": 0.5, "incr": "B1"}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algtype")]
pub enum LearningPolicy {
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "greedy")]
    Greedy,
    #[serde(rename = "greedy_ep")]
    EpsilonGreedy { epsilon: f64 },
    #[serde(rename = "UCB")]
    Ucb {
        alpha: f64,
        #[serde(rename = "incr")]
        index: IndexFn,
    },
    #[serde(rename = "UCB_KL")]
    KlUcb {
        #[serde(rename = "incr")]
        index: IndexFn,
    },
    #[serde(rename = "Bayes_Gauss")]
    BayesGauss {
        #[serde(rename = "incr")]
        index: IndexFn,
    },
    #[serde(rename = "TS_Beta")]
    BetaThompson,
    #[serde(rename = "TS_Gauss")]
    GaussianThompson,
    #[serde(rename = "UCB_Lin")]
    LinUcb,
    #[serde(rename = "TS_Lin")]
    LinTs,
}

impl LearningPolicy {
    /// Catalog name, identical to the `"algtype"` tag.
    pub fn name(&self) -> &'static str {
        match self {
            LearningPolicy::Random => "random",
            LearningPolicy::Greedy => "greedy",
            LearningPolicy::EpsilonGreedy { .. } => "greedy_ep",
            LearningPolicy::Ucb { .. } => "UCB",
            LearningPolicy::KlUcb { .. } => "UCB_KL",
            LearningPolicy::BayesGauss { .. } => "Bayes_Gauss",
            LearningPolicy::BetaThompson => "TS_Beta",
            LearningPolicy::GaussianThompson => "TS_Gauss",
            LearningPolicy::LinUcb => "UCB_Lin",
            LearningPolicy::LinTs => "TS_Lin",
        }
    }

    /// Checks parameter ranges without building anything.
    pub fn validate(&self) -> Result<()> {
        self.build().map(|_| ())
    }

    /// Resolves the selector into a ready-to-use policy.
    pub fn build(&self) -> Result<Box<dyn Policy>> {
        Ok(match *self {
            LearningPolicy::Random => Box::new(Random),
            LearningPolicy::Greedy => Box::new(Greedy),
            LearningPolicy::EpsilonGreedy { epsilon } => Box::new(EpsilonGreedy::new(epsilon)?),
            LearningPolicy::Ucb { alpha, index } => Box::new(Ucb::new(alpha, index)?),
            LearningPolicy::KlUcb { index } => Box::new(KlUcb::new(index)),
            LearningPolicy::BayesGauss { index } => Box::new(BayesGauss::new(index)),
            LearningPolicy::BetaThompson => Box::new(BetaThompson),
            LearningPolicy::GaussianThompson => Box::new(GaussianThompson),
            LearningPolicy::LinUcb => Box::new(LinUcb),
            LearningPolicy::LinTs => Box::new(LinTs),
        })
    }
}
