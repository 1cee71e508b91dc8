use crate::control::physical_config::PhysicalConfig;
use crate::utils::vector2d::Vector2D;

/// Linearly decaying motor: `max_thrust` at ignition, zero at burnout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustProfile {
    pub max_thrust: f64,
    pub burn_time: f64,
}

impl ThrustProfile {
    pub fn new(max_thrust: f64, burn_time: f64) -> Self {
        ThrustProfile {
            max_thrust,
            burn_time,
        }
    }

    pub fn is_burning(&self, time: f64) -> bool {
        self.burn_time > 0.0 && time < self.burn_time
    }

    pub fn magnitude_at(&self, time: f64) -> f64 {
        if self.is_burning(time) {
            self.max_thrust * (1.0 - time / self.burn_time)
        } else {
            0.0
        }
    }

    pub fn vector_at(&self, time: f64, launch_angle: f64) -> Vector2D {
        Vector2D::from_polar(self.magnitude_at(time), launch_angle)
    }
}

/// Mass after burning propellant for one step starting at `time`.
///
/// Depletion runs at `(initial_mass - dry_mass) / burn_time` and never goes
/// below the dry mass. Outside the burn window the mass is returned unchanged.
pub fn burn_propellant(config: &PhysicalConfig, mass: f64, time: f64, delta_time: f64) -> f64 {
    if config.burn_time <= 0.0 || time >= config.burn_time {
        return mass;
    }
    let burn_rate = config.propellant_mass() / config.burn_time;
    (mass - burn_rate * delta_time).max(config.dry_mass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_thrust_decays_linearly() {
        let profile = ThrustProfile::new(2000.0, 10.0);
        assert_relative_eq!(profile.magnitude_at(0.0), 2000.0);
        assert_relative_eq!(profile.magnitude_at(2.5), 1500.0);
        assert_relative_eq!(profile.magnitude_at(5.0), 1000.0);
        assert_eq!(profile.magnitude_at(10.0), 0.0);
        assert_eq!(profile.magnitude_at(25.0), 0.0);
    }

    #[test]
    fn test_zero_burn_time_has_no_thrust() {
        let profile = ThrustProfile::new(2000.0, 0.0);
        assert!(!profile.is_burning(0.0));
        assert_eq!(profile.magnitude_at(0.0), 0.0);
        assert!(profile.vector_at(0.0, 1.0).is_finite());
    }

    #[test]
    fn test_vertical_thrust_vector() {
        let profile = ThrustProfile::new(1500.0, 10.0);
        let thrust = profile.vector_at(0.0, FRAC_PI_2);
        assert_relative_eq!(thrust.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(thrust.y, 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_burn_propellant_rate_and_floor() {
        let config = PhysicalConfig::reference();
        // 40 kg over 10 s
        assert_relative_eq!(burn_propellant(&config, 50.0, 0.0, 0.5), 48.0);
        assert_relative_eq!(burn_propellant(&config, 10.5, 9.9, 1.0), 10.0);
        assert_relative_eq!(burn_propellant(&config, 10.0, 12.0, 1.0), 10.0);
    }

    #[test]
    fn test_burn_propellant_without_burn_time() {
        let config = PhysicalConfig::reference().with_burn_time(0.0);
        assert_eq!(burn_propellant(&config, 50.0, 0.0, 0.01), 50.0);
    }
}
