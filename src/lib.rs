pub mod constants;
pub mod control;
pub mod errors;
pub mod optimization_system;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use constants::*;
pub use control::environment::Wind;
pub use control::launch::LaunchParameters;
pub use control::physical_config::{GroundPolicy, PhysicalConfig};
pub use errors::{Result, SimulationError};

// Re-export commonly used items from trajectory_system
pub use trajectory_system::simulation::{
    compare_wind, simulate, simulate_range, SimulationResult, Termination, TrajectorySample,
    WindComparison,
};

// Re-export commonly used items from optimization_system
pub use optimization_system::range_optimizer::{
    optimize, OptimizationResult, OptimizerSettings, RangeOptimizer, StopReason,
};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::FlightSummary;

// Re-export commonly used utilities
pub use utils::vector2d::Vector2D;
