use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    #[error("No feasible configuration: {0}")]
    InfeasibleSearch(String),

    #[error("Could not read configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("Could not parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
