//! Direct-sum gravitational N-body engine with a radial density diagnostic.
//!
//! A run starts from a validated [`SimulationConfig`] and an initial
//! population, integrates it with semi-implicit Euler under softened pairwise
//! gravity, and records the mass density inside a monitored radius after
//! every step.

pub mod configuration;
pub mod error;
pub mod simulation;

pub use error::{Result, SimError};

pub use simulation::states::{DensitySample, DensityTimeSeries, NVec, Particle, SimulationState, Snapshot};
pub use simulation::params::{ForceEvaluation, ForcePairing, SimulationConfig};
pub use simulation::forces::{ForceSet, ForceTerm, SoftenedGravity};
pub use simulation::integrator::semi_implicit_euler;
pub use simulation::radius::{density_within, radius_of, sort_by_radius_desc};
pub use simulation::engine::{simulate, CancellationToken, Phase, RunReport, RunStatus, Simulation};
pub use simulation::scenario::{uniform_cube, Scenario};

pub use configuration::config::{load_scenario, parse_scenario, BodyConfig, InitialConfig, ParametersConfig, ScenarioConfig};
