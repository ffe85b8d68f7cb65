//! Simulation driver
//!
//! Owns the particle population for a run and moves it through
//! `Uninitialized -> Initialized -> Running -> Completed`. Each advancing step
//! accumulates all pairwise forces, integrates, and records the density inside
//! the monitored radius. Observers receive a read-only (x, y) snapshot after
//! every recorded sample.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::error::{Result, SimError};
use crate::simulation::forces::{ForceSet, SoftenedGravity};
use crate::simulation::integrator::semi_implicit_euler;
use crate::simulation::params::SimulationConfig;
use crate::simulation::radius::{density_within, sort_by_radius_desc};
use crate::simulation::states::{DensityTimeSeries, NVec, Particle, SimulationState, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initialized,
    Running { step: usize },
    Completed,
    Cancelled { step: usize },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Uninitialized => write!(f, "uninitialized"),
            Phase::Initialized => write!(f, "initialized"),
            Phase::Running { step } => write!(f, "running (step {step})"),
            Phase::Completed => write!(f, "completed"),
            Phase::Cancelled { step } => write!(f, "cancelled (step {step})"),
        }
    }
}

/// Cooperative stop flag, checked once per step boundary
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    Cancelled { step: usize },
}

/// Everything a finished (or cancelled) run hands back
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: SimulationState,
    pub density: DensityTimeSeries,
    pub status: RunStatus,
}

pub struct Simulation {
    config: SimulationConfig,
    forces: ForceSet,
    state: SimulationState,
    density: DensityTimeSeries,
    phase: Phase,
    force_buf: Vec<NVec>, // per-particle accumulator, zeroed every step
    warned_non_finite: bool,
}

impl Simulation {
    /// Validate the configuration and register softened gravity
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let forces = ForceSet::new().with(SoftenedGravity::from_config(&config));
        Self::with_forces(config, forces)
    }

    /// Same as [`Simulation::new`] with a caller-built force set
    pub fn with_forces(config: SimulationConfig, forces: ForceSet) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            density: DensityTimeSeries::with_capacity(config.steps),
            force_buf: Vec::new(),
            config,
            forces,
            state: SimulationState::new(Vec::new()),
            phase: Phase::Uninitialized,
            warned_non_finite: false,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn density(&self) -> &DensityTimeSeries {
        &self.density
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Take ownership of the initial population, sort it once by radius and
    /// record the step-0 density sample
    pub fn initialize(&mut self, particles: Vec<Particle>) -> Result<()> {
        self.require(matches!(self.phase, Phase::Uninitialized), "initialize")?;

        if particles.len() != self.config.num_particles {
            return Err(SimError::Configuration(format!(
                "expected {} particles, got {}",
                self.config.num_particles,
                particles.len()
            )));
        }

        let mut state = SimulationState::new(particles);
        state.check_dimension(self.config.dimension)?;
        sort_by_radius_desc(&mut state.particles);

        let d0 = density_within(self.config.monitor_radius, &state.particles, self.config.mass)?;
        self.density.push(state.t, d0);
        self.force_buf = vec![NVec::zeros(self.config.dimension); state.len()];
        self.state = state;
        self.phase = if self.config.steps == 1 {
            Phase::Completed
        } else {
            Phase::Initialized
        };

        info!(
            "initialized {} particles in {}D, density(r < {}) = {:.6}",
            self.config.num_particles, self.config.dimension, self.config.monitor_radius, d0
        );
        Ok(())
    }

    /// Advance one step and record its density sample.
    /// Returns the sample's (time, density).
    pub fn step(&mut self) -> Result<(f64, f64)> {
        self.require(
            matches!(self.phase, Phase::Initialized | Phase::Running { .. }),
            "step",
        )?;

        self.forces.accumulate_forces(&self.state.particles, &mut self.force_buf)?;
        semi_implicit_euler(&mut self.state, &self.force_buf, self.config.mass, self.config.h)?;

        let density = density_within(self.config.monitor_radius, &self.state.particles, self.config.mass)?;
        self.density.push(self.state.t, density);

        if !self.warned_non_finite && (!density.is_finite() || self.state.has_non_finite()) {
            warn!("non-finite particle state at step {} (t = {})", self.state.step, self.state.t);
            self.warned_non_finite = true;
        }
        debug!("step {} t = {:.4} density = {:.6}", self.state.step, self.state.t, density);

        self.phase = if self.density.len() >= self.config.steps {
            info!("completed {} steps", self.state.step);
            Phase::Completed
        } else {
            Phase::Running { step: self.state.step }
        };
        Ok((self.state.t, density))
    }

    /// Step until completed or cancelled
    pub fn run(&mut self, cancel: &CancellationToken) -> Result<RunStatus> {
        self.run_with_observer(cancel, |_| {})
    }

    /// Step until completed or cancelled, handing a snapshot of the current
    /// population to `observer` first and then after every step
    pub fn run_with_observer<F>(&mut self, cancel: &CancellationToken, mut observer: F) -> Result<RunStatus>
    where
        F: FnMut(&Snapshot),
    {
        match self.phase {
            Phase::Initialized | Phase::Completed => observer(&self.snapshot()),
            Phase::Running { .. } => {}
            _ => self.require(false, "run")?,
        }

        while self.phase != Phase::Completed {
            if cancel.is_cancelled() {
                info!("run cancelled after step {}", self.state.step);
                self.phase = Phase::Cancelled { step: self.state.step };
                return Ok(RunStatus::Cancelled { step: self.state.step });
            }
            self.step()?;
            observer(&self.snapshot());
        }
        Ok(RunStatus::Completed)
    }

    /// Hand off the final state and the density series
    pub fn into_report(self) -> Result<RunReport> {
        let status = match self.phase {
            Phase::Completed => RunStatus::Completed,
            Phase::Cancelled { step } => RunStatus::Cancelled { step },
            _ => {
                return Err(SimError::InvalidPhase {
                    phase: self.phase.to_string(),
                    operation: "report",
                })
            }
        };
        Ok(RunReport {
            state: self.state,
            density: self.density,
            status,
        })
    }

    fn require(&self, allowed: bool, operation: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(SimError::InvalidPhase {
                phase: self.phase.to_string(),
                operation,
            })
        }
    }
}

/// Initialize and run to completion in one call
pub fn simulate(config: SimulationConfig, particles: Vec<Particle>) -> Result<RunReport> {
    let mut sim = Simulation::new(config)?;
    sim.initialize(particles)?;
    sim.run(&CancellationToken::new())?;
    sim.into_report()
}
