use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BanditError;

/// Growth-rate functions feeding the `log(index)` term of index policies.
///
/// With `t` the timestep, `n` the horizon, `K` the number of arms and `T_i`
/// the pulls of arm `i`:
///
/// | tag | value |
/// |-----|-------|
/// | B1  | `t` |
/// | B2  | `n` |
/// | B3  | `n / t` |
/// | B4  | `t / T_i` |
/// | B5  | `n / T_i` |
/// | B6  | `1 + t / (T_i * S_i)` |
/// | B7  | `max(e, t / (T_i * S_i))` |
/// | B8  | `n / (K * T_i)` |
/// | B9  | `t / (K * T_i) + 1` |
///
/// where `S_i = sum_j min(1, T_j / T_i)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexFn {
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
    B8,
    B9,
}

impl IndexFn {
    pub const ALL: [IndexFn; 9] = [
        IndexFn::B1,
        IndexFn::B2,
        IndexFn::B3,
        IndexFn::B4,
        IndexFn::B5,
        IndexFn::B6,
        IndexFn::B7,
        IndexFn::B8,
        IndexFn::B9,
    ];

    /// Per-arm index values. Arms with zero pulls may get `inf`/`NaN` for
    /// the per-arm variants; callers score those arms separately.
    pub fn evaluate(self, timestep: u64, horizon: u64, pulls: &[u64]) -> Vec<f64> {
        let t = timestep as f64;
        let n = horizon as f64;
        let k = pulls.len() as f64;
        let per_arm = |f: &dyn Fn(f64, usize) -> f64| -> Vec<f64> {
            pulls
                .iter()
                .enumerate()
                .map(|(i, &p)| f(p as f64, i))
                .collect()
        };
        let spread = |i: usize| -> f64 {
            let ti = pulls[i] as f64;
            pulls.iter().map(|&tj| (tj as f64 / ti).min(1.0)).sum()
        };

        match self {
            IndexFn::B1 => vec![t; pulls.len()],
            IndexFn::B2 => vec![n; pulls.len()],
            IndexFn::B3 => vec![n / t; pulls.len()],
            IndexFn::B4 => per_arm(&|ti, _| t / ti),
            IndexFn::B5 => per_arm(&|ti, _| n / ti),
            IndexFn::B6 => per_arm(&|ti, i| 1.0 + t / (ti * spread(i))),
            IndexFn::B7 => per_arm(&|ti, i| (t / (ti * spread(i))).max(std::f64::consts::E)),
            IndexFn::B8 => per_arm(&|ti, _| n / (k * ti)),
            IndexFn::B9 => per_arm(&|ti, _| t / (k * ti) + 1.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IndexFn::B1 => "B1",
            IndexFn::B2 => "B2",
            IndexFn::B3 => "B3",
            IndexFn::B4 => "B4",
            IndexFn::B5 => "B5",
            IndexFn::B6 => "B6",
            IndexFn::B7 => "B7",
            IndexFn::B8 => "B8",
            IndexFn::B9 => "B9",
        }
    }
}

impl fmt::Display for IndexFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndexFn {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndexFn::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| BanditError::invalid_config(format!("unknown index function {s:?}")))
    }
}
