use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("only {got} usable samples, finite differencing needs at least {needed}")]
    InsufficientSamples { got: usize, needed: usize },
    #[error("zero velocity at sample {index}, angular rate undefined")]
    DegenerateVelocity { index: usize },
}
