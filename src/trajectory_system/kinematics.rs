use serde::Serialize;

use crate::{
    control::{
        launch::LaunchParameters, physical_config::PhysicalConfig, propulsion::ThrustProfile,
    },
    utils::vector2d::Vector2D,
};

use super::aerodynamics::Aerodynamics;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightState {
    pub time: f64,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub mass: f64,
}

impl FlightState {
    pub fn initial(config: &PhysicalConfig) -> Self {
        FlightState {
            time: 0.0,
            position: Vector2D::ZERO,
            velocity: config.initial_velocity,
            mass: config.initial_mass,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.position.is_finite()
            && self.velocity.is_finite()
            && self.mass.is_finite()
    }
}

/// Force model and explicit Euler update for a single launch.
#[derive(Debug)]
pub struct Kinematics<'a> {
    config: &'a PhysicalConfig,
    params: &'a LaunchParameters,
    aerodynamics: Aerodynamics,
    thrust: ThrustProfile,
}

impl<'a> Kinematics<'a> {
    pub fn new(config: &'a PhysicalConfig, params: &'a LaunchParameters) -> Self {
        Kinematics {
            config,
            params,
            aerodynamics: Aerodynamics::from_config(config),
            thrust: ThrustProfile::new(params.max_thrust, config.burn_time),
        }
    }

    pub fn net_force(&self, state: &FlightState) -> Vector2D {
        let thrust = self.thrust.vector_at(state.time, self.params.launch_angle);
        let wind_speed = self.params.wind.speed_at(state.time);
        let relative_velocity = Aerodynamics::relative_velocity(state.velocity, wind_speed);
        let drag = self.aerodynamics.calculate_drag(relative_velocity);

        Vector2D::new(
            thrust.x + drag.x,
            thrust.y - state.mass * self.config.gravity + drag.y,
        )
    }

    /// Proposed `(velocity, position)` after one step. Velocity is advanced
    /// first and the new velocity moves the position.
    pub fn integrate(&self, state: &FlightState) -> (Vector2D, Vector2D) {
        let delta_time = self.config.time_step;
        let acceleration = self.net_force(state) / state.mass;

        let mut velocity = state.velocity;
        velocity += acceleration * delta_time;

        let mut position = state.position;
        position += velocity * delta_time;

        (velocity, position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::environment::Wind;
    use approx::assert_relative_eq;

    #[test]
    fn test_kinematics_initial_state() {
        let config = PhysicalConfig::reference().with_initial_velocity(Vector2D::new(0.0, 1.0));
        let state = FlightState::initial(&config);
        assert_eq!(state.position, Vector2D::ZERO);
        assert_eq!(state.velocity, Vector2D::new(0.0, 1.0));
        assert_eq!(state.mass, 50.0);
        assert_eq!(state.time, 0.0);
    }

    #[test]
    fn test_gravity_only_at_rest() {
        let config = PhysicalConfig::reference();
        let params = LaunchParameters::from_degrees(45.0, 0.0);
        let kinematics = Kinematics::new(&config, &params);
        let state = FlightState::initial(&config);

        let force = kinematics.net_force(&state);
        assert_relative_eq!(force.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(force.y, -50.0 * 9.81, epsilon = 1e-9);
    }

    #[test]
    fn test_euler_updates_velocity_before_position() {
        let config = PhysicalConfig::reference().with_time_step(0.1);
        let params = LaunchParameters::from_degrees(90.0, 1000.0);
        let kinematics = Kinematics::new(&config, &params);
        let state = FlightState::initial(&config);

        let (velocity, position) = kinematics.integrate(&state);

        // a_y = (1000 - 50 * 9.81) / 50 at rest, no drag yet
        let expected_vy = (1000.0 - 50.0 * 9.81) / 50.0 * 0.1;
        assert_relative_eq!(velocity.y, expected_vy, epsilon = 1e-9);
        assert_relative_eq!(position.y, expected_vy * 0.1, epsilon = 1e-9);
        assert_relative_eq!(velocity.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_angled_thrust_moves_downrange() {
        let config = PhysicalConfig::reference();
        let params = LaunchParameters::from_degrees(45.0, 2000.0);
        let kinematics = Kinematics::new(&config, &params);
        let mut state = FlightState::initial(&config);

        for _ in 0..100 {
            let (velocity, position) = kinematics.integrate(&state);
            state.velocity = velocity;
            state.position = position;
            state.time += config.time_step;
        }

        assert!(
            state.position.x > 0.0 && state.position.y > 0.0,
            "Rocket should climb downrange. Position: {:?}",
            state.position
        );
    }

    #[test]
    fn test_wind_only_acts_through_drag() {
        let config = PhysicalConfig {
            air_density: 0.0,
            ..PhysicalConfig::reference()
        };
        let params = LaunchParameters::from_degrees(90.0, 0.0).with_wind(Wind::constant(20.0));
        let kinematics = Kinematics::new(&config, &params);

        let force = kinematics.net_force(&FlightState::initial(&config));
        assert_eq!(force.x, 0.0);
    }
}
