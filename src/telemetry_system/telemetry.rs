use serde::Serialize;

use crate::optimization_system::range_optimizer::OptimizationResult;
use crate::trajectory_system::simulation::{SimulationResult, Termination};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSummary {
    pub distance: f64,
    pub apex_altitude: f64,
    pub max_speed: f64,
    pub flight_time: f64,
    pub landed: bool,
    pub landing_time: Option<f64>,
}

impl FlightSummary {
    /// Apex and peak speed come from the recorded path when there is one,
    /// otherwise from the final state alone.
    pub fn from_result(result: &SimulationResult) -> Self {
        let (apex_altitude, max_speed) = match &result.path {
            Some(path) => path.iter().fold((0.0_f64, 0.0_f64), |(apex, speed), sample| {
                (
                    apex.max(sample.position.y),
                    speed.max(sample.velocity.magnitude()),
                )
            }),
            None => (
                result.final_state.position.y,
                result.final_state.velocity.magnitude(),
            ),
        };

        FlightSummary {
            distance: result.distance,
            apex_altitude,
            max_speed,
            flight_time: result.flight_time,
            landed: result.termination == Termination::Landed,
            landing_time: result.landing_time,
        }
    }

    pub fn report(&self) -> String {
        let outcome = match (self.landed, self.landing_time) {
            (true, _) => "landed".to_string(),
            (false, Some(t)) => format!("touched down at {}", format_time(t)),
            (false, None) => "still airborne at timeout".to_string(),
        };
        format!(
            "Horizontal distance: {}\n\
             Max altitude: {}\n\
             Max speed: {:.2} m/s\n\
             Flight time: {} ({})",
            format_distance(self.distance),
            format_distance(self.apex_altitude),
            self.max_speed,
            format_time(self.flight_time),
            outcome
        )
    }
}

pub fn optimization_report(result: &OptimizationResult) -> String {
    format!(
        "Optimal launch angle: {:.2} degrees\n\
         Optimal max thrust: {:.2} N\n\
         Maximum horizontal distance: {}\n\
         Iterations: {}, evaluations: {}, stop: {:?}",
        result.best_angle_degrees(),
        result.best_thrust,
        format_distance(result.best_distance),
        result.iterations,
        result.evaluations,
        result.stop_reason
    )
}

pub fn format_time(elapsed_time: f64) -> String {
    if elapsed_time >= 60.0 {
        let minutes = (elapsed_time / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}m {:.2}s", minutes, seconds)
    } else {
        format!("{:.2}s", elapsed_time)
    }
}

pub fn format_distance(meters: f64) -> String {
    if meters.abs() >= 1000.0 {
        format!("{:.2} km", meters / 1000.0)
    } else {
        format!("{:.2} m", meters)
    }
}
