//! Error taxonomy for the engine
//!
//! Configuration and dimension errors abort a run. Numeric blow-up during
//! integration is never reported here; it flows into the output series.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid static parameters, detected before a run starts
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Two vector operands of different length
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Density requested for a radius that does not bound a volume
    #[error("numeric degenerate input: {0}")]
    NumericDegenerate(String),

    /// Driver operation called in a phase that does not allow it
    #[error("cannot {operation} while simulation is {phase}")]
    InvalidPhase { phase: String, operation: &'static str },

    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
