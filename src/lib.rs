//! banditsim: a multi-armed bandit simulation engine.
//!
//! The crate models three bandit families (stochastic, linear and
//! adversarial), a catalog of arm-selection policies, and a [`Simulation`]
//! driver that runs pull-loops, accumulates regret and resets state between
//! cycles.
//!
//! # Quick Start
//!
//! ```
//! use banditsim::prelude::*;
//!
//! let bandit = Bandit::from_arms(
//!     vec![Arm::bernoulli(0.3).unwrap(), Arm::bernoulli(0.7).unwrap()],
//!     None,
//!     false,
//! )
//! .unwrap();
//!
//! let mut sim = Simulation::builder()
//!     .bandit(bandit)
//!     .policy(Ucb::new(0.5, IndexFn::B1).unwrap())
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! // One regret value per cycle
//! let mut regrets: Vec<f64> = Vec::new();
//! sim.run_many(100, 5, EmitMode::Histogram, &mut regrets).unwrap();
//! assert_eq!(regrets.len(), 5);
//! ```

mod arm;
pub mod bandit;
mod config;
mod error;
mod numeric;
mod output;
pub mod policies;
mod policy;
mod regression;
mod sequence;
mod simulation;

// Re-export main types
pub use arm::{Arm, ArmDescriptor};
pub use bandit::{Bandit, BanditKind, BanditSnapshot};
pub use config::{ArmSpec, BanditConfig, SimulationConfig};
pub use error::{BanditError, Result};
pub use output::{ChannelSink, EmitMode, LineSink, RegretSink};
pub use policies::{LearningPolicy, Policy};
pub use regression::LeastSquares;
pub use sequence::SequenceBuilder;
pub use simulation::{RunSummary, Simulation, SimulationBuilder};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use banditsim::prelude::*;
/// ```
pub mod prelude {
    pub use crate::policies::{
        BayesGauss, BetaThompson, EpsilonGreedy, GaussianThompson, Greedy, IndexFn, KlUcb,
        LearningPolicy, LinTs, LinUcb, Policy, Random, Ucb,
    };
    pub use crate::{
        Arm, Bandit, BanditError, EmitMode, RegretSink, Result, SequenceBuilder, Simulation,
        SimulationConfig,
    };
}
