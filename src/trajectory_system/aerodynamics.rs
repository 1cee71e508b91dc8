use crate::{control::physical_config::PhysicalConfig, utils::vector2d::Vector2D};

/// Quadratic drag with a lumped constant `k = 0.5 * rho * Cd * A`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aerodynamics {
    pub drag_constant: f64,
}

impl Aerodynamics {
    pub fn new(drag_constant: f64) -> Self {
        Aerodynamics { drag_constant }
    }

    pub fn from_config(config: &PhysicalConfig) -> Self {
        Aerodynamics::new(config.drag_constant())
    }

    /// Velocity of the rocket through the air. Wind is horizontal only.
    pub fn relative_velocity(velocity: Vector2D, wind_speed: f64) -> Vector2D {
        velocity - Vector2D::new(wind_speed, 0.0)
    }

    pub fn calculate_drag(&self, relative_velocity: Vector2D) -> Vector2D {
        let speed = relative_velocity.magnitude();
        if speed == 0.0 {
            return Vector2D::ZERO;
        }

        let drag_magnitude = self.drag_constant * speed * speed;
        Vector2D::new(
            -drag_magnitude * (relative_velocity.x / speed),
            -drag_magnitude * (relative_velocity.y / speed),
        )
    }
}
