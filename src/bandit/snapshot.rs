use std::fmt;

use serde::Serialize;

use crate::arm::ArmDescriptor;
use crate::bandit::BanditKind;

/// Point estimates exposed by a bandit variant.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values")]
pub enum Estimates {
    /// Per-arm sample means (stochastic bandits).
    RunningMean(Vec<f64>),
    /// Least-squares weight vector (linear bandits).
    WeightEstimate(Vec<f64>),
    /// Adversarial bandits keep no estimate.
    None,
}

/// Read-only view of a bandit's statistics, for display and animation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BanditSnapshot {
    pub kind: BanditKind,
    pub arms: Vec<ArmDescriptor>,
    pub pull_count: Vec<u64>,
    pub estimates: Estimates,
    pub adjusted_value: Vec<f64>,
    pub timestep: u64,
    pub horizon: u64,
    pub regret: f64,
}

impl fmt::Display for BanditSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(85);
        writeln!(f, "+{rule}+")?;
        if let Estimates::WeightEstimate(w) = &self.estimates {
            writeln!(f, "| Weight estimate: {w:?}")?;
        }
        for (i, arm) in self.arms.iter().enumerate() {
            write!(f, "| Arm {i}: {arm}")?;
            if let Estimates::RunningMean(means) = &self.estimates {
                write!(f, ", average reward ({:.6})", means[i])?;
            }
            writeln!(
                f,
                ", confidence ({:.6}), called ({}) times",
                self.adjusted_value[i], self.pull_count[i]
            )?;
        }
        writeln!(
            f,
            "|\n| {} {} arms, regret ({}), timestep ({} / {})",
            self.arms.len(),
            self.kind,
            self.regret,
            self.timestep,
            self.horizon
        )?;
        write!(f, "+{rule}+")
    }
}
