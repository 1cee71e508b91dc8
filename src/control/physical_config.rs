use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, GRAVITY, MAX_SIMULATION_TIME, ROCKET_BURN_TIME,
    ROCKET_CROSS_SECTIONAL_AREA, ROCKET_DRAG_COEFFICIENT, ROCKET_DRY_MASS, ROCKET_INITIAL_MASS,
    TIME_STEP,
};
use crate::errors::{Result, SimulationError};
use crate::utils::vector2d::Vector2D;

/// What the integrator does when a step would carry the rocket below the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundPolicy {
    /// Stop before committing the step that would go underground.
    #[default]
    HaltOnLanding,
    /// Pin altitude at zero and keep integrating until the timeout.
    ClampAndContinue,
}

/// Physical constants and integration settings shared by every run.
///
/// Missing fields in a JSON document fall back to the reference values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConfig {
    pub gravity: f64,
    pub air_density: f64,
    pub drag_coefficient: f64,
    pub cross_sectional_area: f64,
    pub initial_mass: f64,
    pub dry_mass: f64,
    pub burn_time: f64,
    pub time_step: f64,
    pub max_simulation_time: f64,
    pub initial_velocity: Vector2D,
    pub ground_policy: GroundPolicy,
}

impl Default for PhysicalConfig {
    fn default() -> Self {
        PhysicalConfig::reference()
    }
}

impl PhysicalConfig {
    pub fn reference() -> Self {
        PhysicalConfig {
            gravity: GRAVITY,
            air_density: AIR_DENSITY_SEA_LEVEL,
            drag_coefficient: ROCKET_DRAG_COEFFICIENT,
            cross_sectional_area: ROCKET_CROSS_SECTIONAL_AREA,
            initial_mass: ROCKET_INITIAL_MASS,
            dry_mass: ROCKET_DRY_MASS,
            burn_time: ROCKET_BURN_TIME,
            time_step: TIME_STEP,
            max_simulation_time: MAX_SIMULATION_TIME,
            initial_velocity: Vector2D::ZERO,
            ground_policy: GroundPolicy::HaltOnLanding,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PhysicalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_max_simulation_time(mut self, max_simulation_time: f64) -> Self {
        self.max_simulation_time = max_simulation_time;
        self
    }

    pub fn with_initial_velocity(mut self, initial_velocity: Vector2D) -> Self {
        self.initial_velocity = initial_velocity;
        self
    }

    pub fn with_ground_policy(mut self, ground_policy: GroundPolicy) -> Self {
        self.ground_policy = ground_policy;
        self
    }

    pub fn with_burn_time(mut self, burn_time: f64) -> Self {
        self.burn_time = burn_time;
        self
    }

    /// Lumped quadratic drag constant `0.5 * rho * Cd * A`.
    pub fn drag_constant(&self) -> f64 {
        0.5 * self.air_density * self.drag_coefficient * self.cross_sectional_area
    }

    pub fn propellant_mass(&self) -> f64 {
        self.initial_mass - self.dry_mass
    }

    pub fn halt_on_landing(&self) -> bool {
        self.ground_policy == GroundPolicy::HaltOnLanding
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("gravity", self.gravity),
            ("time_step", self.time_step),
            ("max_simulation_time", self.max_simulation_time),
            ("dry_mass", self.dry_mass),
            ("initial_mass", self.initial_mass),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        let non_negative = [
            ("air_density", self.air_density),
            ("drag_coefficient", self.drag_coefficient),
            ("cross_sectional_area", self.cross_sectional_area),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }

        if self.dry_mass > self.initial_mass {
            return Err(SimulationError::InvalidConfiguration(format!(
                "dry_mass ({}) exceeds initial_mass ({})",
                self.dry_mass, self.initial_mass
            )));
        }

        // A non-positive burn time is legal and means an unpowered flight.
        if !self.burn_time.is_finite() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "burn_time must be finite, got {}",
                self.burn_time
            )));
        }

        if !self.initial_velocity.is_finite() {
            return Err(SimulationError::InvalidConfiguration(
                "initial_velocity must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reference_config_is_valid() {
        let config = PhysicalConfig::reference();
        assert!(config.validate().is_ok());
        assert!(config.halt_on_landing());
        assert_eq!(config, PhysicalConfig::default());
    }

    #[test]
    fn test_drag_constant() {
        let config = PhysicalConfig::reference();
        assert_relative_eq!(config.drag_constant(), 0.5 * 1.225 * 0.75 * 0.03, epsilon = 1e-12);
        assert_relative_eq!(config.propellant_mass(), 40.0);
    }

    #[test]
    fn test_rejects_non_positive_time_step() {
        for dt in [0.0, -0.01, f64::NAN] {
            let config = PhysicalConfig::reference().with_time_step(dt);
            assert!(
                matches!(config.validate(), Err(SimulationError::InvalidConfiguration(_))),
                "time step {dt} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_dry_mass_above_initial_mass() {
        let config = PhysicalConfig {
            dry_mass: 60.0,
            ..PhysicalConfig::reference()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dry_mass"), "unexpected error: {err}");
    }

    #[test]
    fn test_zero_burn_time_is_allowed() {
        let config = PhysicalConfig::reference().with_burn_time(0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_overlays_reference() {
        let config = PhysicalConfig::from_json_str(
            r#"{ "gravity": 3.71, "ground_policy": "clamp_and_continue" }"#,
        )
        .unwrap();
        assert_relative_eq!(config.gravity, 3.71);
        assert_relative_eq!(config.initial_mass, 50.0);
        assert_eq!(config.ground_policy, GroundPolicy::ClampAndContinue);
    }

    #[test]
    fn test_json_rejects_invalid_values() {
        let result = PhysicalConfig::from_json_str(r#"{ "time_step": -1.0 }"#);
        assert!(matches!(result, Err(SimulationError::InvalidConfiguration(_))));

        let result = PhysicalConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(SimulationError::ConfigParse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = PhysicalConfig::from_json_file("/nonexistent/rocket-config.json");
        assert!(matches!(result, Err(SimulationError::ConfigIo(_))));
    }
}
