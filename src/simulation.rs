//! The pull-loop driver binding one bandit to one policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::arm::ArmDescriptor;
use crate::bandit::{Bandit, BanditSnapshot};
use crate::config::SimulationConfig;
use crate::error::{BanditError, Result};
use crate::output::{EmitMode, RegretSink};
use crate::policies::LearningPolicy;
use crate::policy::Policy;

/// Outcome of [`Simulation::run_standard`] and [`Simulation::run_view`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub iterations: u64,
    pub average_regret: f64,
    pub horizon: u64,
    pub runtime: Duration,
    pub policy: String,
    /// Selector and parameters of the policy, when it comes from the catalog.
    pub parameters: Option<LearningPolicy>,
    pub arms: Vec<ArmDescriptor>,
}

/// Drives one bandit with one policy over repeated cycles.
///
/// Every cycle starts with forced exploration (each arm pulled once, in
/// index order), continues with policy-driven pulls up to the horizon, then
/// records the bandit's regret and resets it.
#[derive(Debug)]
pub struct Simulation {
    bandit: Bandit,
    policy: Box<dyn Policy>,
    rng: Xoshiro256PlusPlus,
    iterations: u64,
    total_regret: f64,
    horizon: u64,
}

impl Simulation {
    /// Binds `policy` to `bandit`. Without a seed the generator is seeded
    /// from the operating system.
    pub fn new(bandit: Bandit, policy: Box<dyn Policy>, seed: Option<u64>) -> Result<Self> {
        if bandit.n_arms() == 0 {
            return Err(BanditError::NoArmsAvailable);
        }
        policy.check_compatible(&bandit)?;
        let rng = match seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_os_rng(),
        };
        let horizon = bandit.horizon();
        Ok(Self {
            bandit,
            policy,
            rng,
            iterations: 0,
            total_regret: 0.0,
            horizon,
        })
    }

    /// Builds a simulation from a validated configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let (bandit, policy) = config.prepare()?;
        Self::new(bandit, policy, config.seed)
    }

    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::default()
    }

    pub fn bandit(&self) -> &Bandit {
        &self.bandit
    }

    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    /// Completed cycles since the last reset.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn total_regret(&self) -> f64 {
        self.total_regret
    }

    /// Horizon of the most recent run.
    pub fn horizon(&self) -> u64 {
        self.horizon
    }

    /// `total_regret / iterations`, or 0 before the first cycle.
    pub fn average_regret(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.total_regret / self.iterations as f64
        }
    }

    /// Statistics of the bandit as they stand now.
    pub fn snapshot(&self) -> BanditSnapshot {
        self.bandit.snapshot()
    }

    /// Restarts the random stream for deterministic replay.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    }

    /// Zeroes the bandit and the cycle counters; the policy stays bound.
    pub fn reset(&mut self) {
        self.bandit.reset();
        self.iterations = 0;
        self.total_regret = 0.0;
    }

    fn set_horizon(&mut self, horizon: u64) -> Result<()> {
        let n_arms = self.bandit.n_arms() as u64;
        if horizon < n_arms {
            return Err(BanditError::invalid_config(format!(
                "horizon {horizon} is shorter than the {n_arms} forced exploration pulls"
            )));
        }
        self.bandit.set_horizon(horizon)?;
        self.horizon = horizon;
        Ok(())
    }

    fn policy_pull(&mut self) -> Result<()> {
        let arm = self.policy.select(&mut self.bandit, &mut self.rng)?;
        self.bandit.pull(arm, &mut self.rng)?;
        Ok(())
    }

    /// Runs one full cycle and returns its regret.
    ///
    /// A cycle left half-finished by [`run_step`](Self::run_step) is
    /// discarded first.
    pub fn run_cycle(&mut self, horizon: u64) -> Result<f64> {
        self.run_cycle_with(horizon, |_| {})
    }

    fn run_cycle_with<F>(&mut self, horizon: u64, mut on_pull: F) -> Result<f64>
    where
        F: FnMut(&Bandit),
    {
        self.set_horizon(horizon)?;
        if self.bandit.timestep() > 0 {
            debug!(
                timestep = self.bandit.timestep(),
                "discarding partial cycle"
            );
            self.bandit.reset();
        }

        for arm in 0..self.bandit.n_arms() {
            self.bandit.pull(arm, &mut self.rng)?;
            on_pull(&self.bandit);
        }
        while self.bandit.timestep() < horizon {
            self.policy_pull()?;
            on_pull(&self.bandit);
        }

        let regret = self.bandit.regret();
        self.total_regret += regret;
        self.iterations += 1;
        debug!(cycle = self.iterations, regret, "cycle complete");
        self.bandit.reset();
        Ok(regret)
    }

    /// Advances exactly `n` policy-driven pulls without resetting.
    pub fn run_step(&mut self, n: u64, horizon: u64) -> Result<()> {
        self.set_horizon(horizon)?;
        for _ in 0..n {
            self.policy_pull()?;
        }
        Ok(())
    }

    /// Runs `cycles` cycles and emits regret according to `emit`.
    pub fn run_many<S: RegretSink>(
        &mut self,
        horizon: u64,
        cycles: u64,
        emit: EmitMode,
        sink: &mut S,
    ) -> Result<()> {
        let never = AtomicBool::new(false);
        self.run_many_until(horizon, cycles, emit, sink, &never)
            .map(|_| ())
    }

    /// Like [`run_many`](Self::run_many) but checks `stop` before every
    /// cycle. Returns the number of cycles completed.
    ///
    /// A stopped run emits nothing further, including the average of
    /// [`EmitMode::Variable`].
    pub fn run_many_until<S: RegretSink>(
        &mut self,
        horizon: u64,
        cycles: u64,
        emit: EmitMode,
        sink: &mut S,
        stop: &AtomicBool,
    ) -> Result<u64> {
        if cycles == 0 {
            return Err(BanditError::invalid_config("cycles must be at least 1"));
        }
        info!(
            policy = self.policy.name(),
            bandit = %self.bandit.kind(),
            horizon,
            cycles,
            "starting run"
        );
        let start = Instant::now();

        let mut completed = 0;
        while completed < cycles {
            if stop.load(Ordering::Relaxed) {
                info!(completed, cycles, "run stopped");
                return Ok(completed);
            }
            let regret = self.run_cycle(horizon)?;
            if emit == EmitMode::Histogram {
                sink.emit(regret)?;
            }
            completed += 1;
        }
        if emit == EmitMode::Variable {
            sink.emit(self.average_regret())?;
        }

        info!(
            average_regret = self.average_regret(),
            elapsed = ?start.elapsed(),
            "run finished"
        );
        Ok(completed)
    }

    /// Runs `cycles` cycles and reports the average regret.
    pub fn run_standard(&mut self, horizon: u64, cycles: u64) -> Result<RunSummary> {
        if cycles == 0 {
            return Err(BanditError::invalid_config("cycles must be at least 1"));
        }
        info!(policy = self.policy.name(), horizon, cycles, "starting run");
        let start = Instant::now();
        for cycle in 0..cycles {
            self.run_cycle(horizon)?;
            trace!(done = cycle + 1, cycles, "progress");
        }
        let summary = self.summary(start.elapsed());
        info!(
            average_regret = summary.average_regret,
            runtime = ?summary.runtime,
            "run finished"
        );
        Ok(summary)
    }

    /// Runs a single cycle, handing a statistics snapshot to `on_step`
    /// after every pull.
    pub fn run_view<F>(&mut self, horizon: u64, mut on_step: F) -> Result<RunSummary>
    where
        F: FnMut(&BanditSnapshot),
    {
        let start = Instant::now();
        self.run_cycle_with(horizon, |bandit| {
            let snapshot = bandit.snapshot();
            trace!("\n{snapshot}");
            on_step(&snapshot);
        })?;
        Ok(self.summary(start.elapsed()))
    }

    fn summary(&self, runtime: Duration) -> RunSummary {
        RunSummary {
            iterations: self.iterations,
            average_regret: self.average_regret(),
            horizon: self.horizon,
            runtime,
            policy: self.policy.name().to_string(),
            parameters: self.policy.learning_policy(),
            arms: self.bandit.arm_descriptors(),
        }
    }
}

/// Builder for [`Simulation`] with a fluent API.
#[derive(Debug, Default)]
pub struct SimulationBuilder {
    bandit: Option<Bandit>,
    policy: Option<Box<dyn Policy>>,
    seed: Option<u64>,
    horizon: Option<u64>,
}

impl SimulationBuilder {
    pub fn bandit(mut self, bandit: Bandit) -> Self {
        self.bandit = Some(bandit);
        self
    }

    pub fn policy<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.policy = Some(Box::new(policy));
        self
    }

    /// Sets an already boxed policy, e.g. from [`LearningPolicy::build`](crate::policies::LearningPolicy::build).
    pub fn boxed_policy(mut self, policy: Box<dyn Policy>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the horizon against the bandit at build time.
    pub fn horizon(mut self, horizon: u64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    pub fn build(self) -> Result<Simulation> {
        let bandit = self.bandit.ok_or(BanditError::BuilderError {
            message: "bandit not specified".into(),
        })?;
        let policy = self.policy.ok_or(BanditError::BuilderError {
            message: "policy not specified".into(),
        })?;
        let mut simulation = Simulation::new(bandit, policy, self.seed)?;
        if let Some(horizon) = self.horizon {
            simulation.set_horizon(horizon)?;
        }
        Ok(simulation)
    }
}
