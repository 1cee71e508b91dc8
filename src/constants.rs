// Reference physical configuration
pub const GRAVITY: f64 = 9.81; // m/s²
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³
pub const ROCKET_DRAG_COEFFICIENT: f64 = 0.75;
pub const ROCKET_CROSS_SECTIONAL_AREA: f64 = 0.03; // m²
pub const ROCKET_INITIAL_MASS: f64 = 50.0; // kg
pub const ROCKET_DRY_MASS: f64 = 10.0; // kg
pub const ROCKET_BURN_TIME: f64 = 10.0; // s

// Simulation Parameters
pub const TIME_STEP: f64 = 0.01; // s
pub const MAX_SIMULATION_TIME: f64 = 50.0; // s

// Gust model used by the wind comparison runs: 5 m/s peak, 0.5 rad/s
pub const GUST_AMPLITUDE: f64 = 5.0; // m/s
pub const GUST_ANGULAR_FREQUENCY: f64 = 0.5; // rad/s

// Range search defaults
pub const MIN_LAUNCH_ANGLE_DEG: f64 = 10.0;
pub const MAX_LAUNCH_ANGLE_DEG: f64 = 80.0;
pub const MIN_THRUST: f64 = 500.0; // N
pub const MAX_THRUST: f64 = 4000.0; // N
pub const DEFAULT_LAUNCH_ANGLE_DEG: f64 = 45.0;
pub const DEFAULT_THRUST: f64 = 2000.0; // N

// Objective value for candidates outside the search box or that break the integrator.
// Flights only ever report finite ranges, so this sits above every -range.
pub const OUT_OF_BOUNDS_PENALTY: f64 = f64::INFINITY;
