use serde::Serialize;
use tracing::trace;

use crate::{
    control::{
        launch::LaunchParameters, physical_config::PhysicalConfig, propulsion::burn_propellant,
    },
    errors::{Result, SimulationError},
    utils::vector2d::Vector2D,
};

use super::kinematics::{FlightState, Kinematics};

// Upper bound on the samples reserved up front; longer flights grow the path as they go.
const PATH_RESERVE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Landed,
    TimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub time: f64,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub mass: f64,
}

impl From<&FlightState> for TrajectorySample {
    fn from(state: &FlightState) -> Self {
        TrajectorySample {
            time: state.time,
            position: state.position,
            velocity: state.velocity,
            mass: state.mass,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    /// Horizontal position of the last committed state.
    pub distance: f64,
    pub flight_time: f64,
    pub termination: Termination,
    /// End of the step on which the rocket came back to the ground, if it did.
    pub landing_time: Option<f64>,
    pub final_state: FlightState,
    pub path: Option<Vec<TrajectorySample>>,
}

impl SimulationResult {
    pub fn landed(&self) -> bool {
        self.termination == Termination::Landed
    }
}

/// Integrates one flight with forward Euler until landing or timeout.
///
/// With [`GroundPolicy::HaltOnLanding`](crate::GroundPolicy) the step that
/// would take the rocket underground is never committed. With
/// `ClampAndContinue` the altitude is pinned at zero and the run always ends
/// on the timeout.
pub fn simulate(
    config: &PhysicalConfig,
    params: &LaunchParameters,
    record_path: bool,
) -> Result<SimulationResult> {
    config.validate()?;
    params.validate()?;

    let kinematics = Kinematics::new(config, params);
    let delta_time = config.time_step;
    let halt_on_landing = config.halt_on_landing();

    let mut state = FlightState::initial(config);
    let mut path = if record_path {
        let steps = (config.max_simulation_time / delta_time).ceil();
        let mut samples = Vec::with_capacity(steps.min(PATH_RESERVE as f64) as usize + 1);
        samples.push(TrajectorySample::from(&state));
        Some(samples)
    } else {
        None
    };

    let mut termination = Termination::TimedOut;
    let mut landing_time = None;
    let mut airborne = false;

    while state.time < config.max_simulation_time && state.position.y >= 0.0 {
        let (velocity, mut position) = kinematics.integrate(&state);
        if !velocity.is_finite() || !position.is_finite() {
            return Err(SimulationError::NumericalDegeneracy(format!(
                "non-finite state at t = {:.4} s (velocity {:?}, position {:?})",
                state.time, velocity, position
            )));
        }

        if position.y < 0.0 {
            if halt_on_landing {
                termination = Termination::Landed;
                landing_time = Some(state.time + delta_time);
                break;
            }
            position.y = 0.0;
            if airborne && landing_time.is_none() {
                landing_time = Some(state.time + delta_time);
            }
        }

        state.velocity = velocity;
        state.position = position;
        state.mass = burn_propellant(config, state.mass, state.time, delta_time);
        state.time += delta_time;

        if state.position.y > 0.0 {
            airborne = true;
        }
        if let Some(samples) = path.as_mut() {
            samples.push(TrajectorySample::from(&state));
        }
    }

    trace!(
        angle_deg = params.launch_angle_degrees(),
        max_thrust = params.max_thrust,
        distance = state.position.x,
        flight_time = state.time,
        ?termination,
        "flight finished"
    );

    Ok(SimulationResult {
        distance: state.position.x,
        flight_time: state.time,
        termination,
        landing_time,
        final_state: state,
        path,
    })
}

/// Range of a calm-air flight, without recording the path.
pub fn simulate_range(config: &PhysicalConfig, launch_angle: f64, max_thrust: f64) -> Result<f64> {
    let params = LaunchParameters::new(launch_angle, max_thrust);
    Ok(simulate(config, &params, false)?.distance)
}

#[derive(Debug, Clone, Serialize)]
pub struct WindComparison {
    pub without_wind: SimulationResult,
    pub with_wind: SimulationResult,
}

impl WindComparison {
    /// Range gained (positive) or lost to the wind.
    pub fn range_shift(&self) -> f64 {
        self.with_wind.distance - self.without_wind.distance
    }
}

/// Flies the same launch in calm air and under `params.wind`, recording both paths.
pub fn compare_wind(config: &PhysicalConfig, params: &LaunchParameters) -> Result<WindComparison> {
    let calm = LaunchParameters::new(params.launch_angle, params.max_thrust);
    Ok(WindComparison {
        without_wind: simulate(config, &calm, true)?,
        with_wind: simulate(config, params, true)?,
    })
}
