use crate::control::environment::Wind;
use crate::errors::{Result, SimulationError};

/// Inputs for one flight: fixed thrust direction, peak thrust and wind.
#[derive(Debug, Clone, Default)]
pub struct LaunchParameters {
    pub launch_angle: f64, // radians above horizontal
    pub max_thrust: f64,   // N at ignition
    pub wind: Wind,
}

impl LaunchParameters {
    pub fn new(launch_angle: f64, max_thrust: f64) -> Self {
        LaunchParameters {
            launch_angle,
            max_thrust,
            wind: Wind::Calm,
        }
    }

    pub fn from_degrees(launch_angle_deg: f64, max_thrust: f64) -> Self {
        LaunchParameters::new(launch_angle_deg.to_radians(), max_thrust)
    }

    pub fn with_wind(mut self, wind: Wind) -> Self {
        self.wind = wind;
        self
    }

    pub fn launch_angle_degrees(&self) -> f64 {
        self.launch_angle.to_degrees()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.launch_angle.is_finite() || !self.max_thrust.is_finite() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "launch parameters must be finite, got angle {} rad and thrust {} N",
                self.launch_angle, self.max_thrust
            )));
        }
        Ok(())
    }
}
