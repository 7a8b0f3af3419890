use crate::arm::Arm;
use crate::bandit::Counters;
use crate::error::{BanditError, Result};

/// Arms replay precomputed per-timestep values.
///
/// Sequence values are treated as losses: regret is the realized loss of the
/// pulled cells minus the loss of the best fixed arm over the same prefix.
#[derive(Clone, Debug)]
pub struct AdversarialBandit {
    arms: Vec<Arm>,
    counters: Counters,
    /// `pulled[arm][t]` is set when `arm` was chosen at timestep `t`
    pulled: Vec<Vec<bool>>,
    sequence_len: usize,
}

impl AdversarialBandit {
    /// Creates an adversarial bandit; every sequence must have the same length.
    pub fn new(arms: Vec<Arm>) -> Result<Self> {
        let mut lengths = Vec::with_capacity(arms.len());
        for arm in &arms {
            match arm {
                Arm::Sequence { rewards } => lengths.push(rewards.len()),
                other => {
                    return Err(BanditError::invalid_config(format!(
                        "adversarial bandit cannot hold a {} arm",
                        other.descriptor().type_name()
                    )));
                }
            }
        }
        let sequence_len = *lengths.first().ok_or(BanditError::NoArmsAvailable)?;
        if lengths.iter().any(|&l| l != sequence_len) {
            return Err(BanditError::DimensionMismatch {
                message: format!("reward sequences differ in length: {lengths:?}"),
            });
        }

        let n = arms.len();
        Ok(Self {
            arms,
            counters: Counters::new(n),
            pulled: vec![vec![false; sequence_len]; n],
            sequence_len,
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

    /// Length of every reward sequence.
    pub fn sequence_len(&self) -> u64 {
        self.sequence_len as u64
    }

    pub fn pulled_mask(&self) -> &[Vec<bool>] {
        &self.pulled
    }

    fn value(&self, arm: usize, t: usize) -> f64 {
        match &self.arms[arm] {
            Arm::Sequence { rewards } => rewards[t],
            _ => 0.0,
        }
    }

    /// Marks the current cell of `arm` as realized and returns its value.
    pub fn pull(&mut self, arm: usize) -> Result<f64> {
        self.counters.check_index(arm)?;
        let t = self.counters.timestep;
        if t >= self.sequence_len as u64 {
            return Err(BanditError::HorizonExceeded {
                timestep: t,
                horizon: self.sequence_len as u64,
            });
        }
        self.pulled[arm][t as usize] = true;
        self.counters.record(arm);
        Ok(self.value(arm, t as usize))
    }

    /// Realized loss minus the best fixed arm's loss over `[0, timestep)`.
    pub fn regret(&self) -> f64 {
        let prefix = self.counters.timestep as usize;
        let mut realized = 0.0;
        for (arm, mask) in self.pulled.iter().enumerate() {
            for (t, &pulled) in mask[..prefix].iter().enumerate() {
                if pulled {
                    realized += self.value(arm, t);
                }
            }
        }
        let best = (0..self.arms.len())
            .map(|arm| (0..prefix).map(|t| self.value(arm, t)).sum::<f64>())
            .fold(f64::INFINITY, f64::min);
        realized - best
    }

    pub fn reset(&mut self) {
        self.counters.reset();
        for row in &mut self.pulled {
            row.fill(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bandit() -> AdversarialBandit {
        AdversarialBandit::new(vec![
            Arm::sequence(vec![1.0, 0.0, 1.0, 1.0]).unwrap(),
            Arm::sequence(vec![0.0, 1.0, 0.0, 0.0]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_pull_marks_cells() {
        let mut b = bandit();
        assert_eq!(b.pull(0).unwrap(), 1.0);
        assert_eq!(b.pull(1).unwrap(), 1.0);
        assert!(b.pulled_mask()[0][0]);
        assert!(b.pulled_mask()[1][1]);
        assert!(!b.pulled_mask()[0][1]);
        assert_eq!(b.counters().pull_count, vec![1, 1]);
    }

    #[test]
    fn test_regret_against_best_fixed_arm() {
        let mut b = bandit();
        for _ in 0..3 {
            b.pull(0).unwrap();
        }
        // realized 1 + 0 + 1, best fixed arm over 3 steps is arm 1 with 1
        assert_abs_diff_eq!(b.regret(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pull_past_end() {
        let mut b = bandit();
        for _ in 0..4 {
            b.pull(1).unwrap();
        }
        assert!(matches!(
            b.pull(0),
            Err(BanditError::HorizonExceeded {
                timestep: 4,
                horizon: 4
            })
        ));
    }

    #[test]
    fn test_reset() {
        let mut b = bandit();
        b.pull(0).unwrap();
        b.reset();
        assert_eq!(b.regret(), 0.0);
        assert!(b.pulled_mask().iter().flatten().all(|p| !p));
    }

    #[test]
    fn test_length_mismatch() {
        let result = AdversarialBandit::new(vec![
            Arm::sequence(vec![1.0]).unwrap(),
            Arm::sequence(vec![1.0, 2.0]).unwrap(),
        ]);
        assert!(matches!(result, Err(BanditError::DimensionMismatch { .. })));
    }
}
