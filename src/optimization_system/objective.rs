use serde::Serialize;
use tracing::debug;

use crate::{
    constants::OUT_OF_BOUNDS_PENALTY,
    control::{environment::Wind, launch::LaunchParameters, physical_config::PhysicalConfig},
    errors::{Result, SimulationError},
    trajectory_system::simulation::simulate,
};

/// Closed interval `[lo, hi]` for one search variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    pub fn new(name: &str, (lo, hi): (f64, f64)) -> Result<Self> {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(SimulationError::InvalidConfiguration(format!(
                "{name} bounds must be finite, got ({lo}, {hi})"
            )));
        }
        if lo > hi {
            return Err(SimulationError::InvalidConfiguration(format!(
                "{name} bounds are inverted: lower {lo} exceeds upper {hi}"
            )));
        }
        Ok(Interval { lo, hi })
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lo, self.hi)
    }

    pub fn to_unit(&self, value: f64) -> f64 {
        if self.width() == 0.0 {
            0.0
        } else {
            ((value - self.lo) / self.width()).clamp(0.0, 1.0)
        }
    }

    pub fn from_unit(&self, unit: f64) -> f64 {
        self.clamp(self.lo + unit * self.width())
    }
}

/// Box of admissible `(launch angle [rad], max thrust [N])` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchBounds {
    pub angle: Interval,
    pub thrust: Interval,
}

impl SearchBounds {
    pub fn new(angle_bounds: (f64, f64), thrust_bounds: (f64, f64)) -> Result<Self> {
        Ok(SearchBounds {
            angle: Interval::new("launch angle", angle_bounds)?,
            thrust: Interval::new("thrust", thrust_bounds)?,
        })
    }

    pub fn contains(&self, angle: f64, thrust: f64) -> bool {
        self.angle.contains(angle) && self.thrust.contains(thrust)
    }

    pub fn to_unit(&self, (angle, thrust): (f64, f64)) -> [f64; 2] {
        [self.angle.to_unit(angle), self.thrust.to_unit(thrust)]
    }

    pub fn from_unit(&self, unit: [f64; 2]) -> (f64, f64) {
        (self.angle.from_unit(unit[0]), self.thrust.from_unit(unit[1]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub angle: f64,
    pub thrust: f64,
    pub value: f64,
}

/// Negated range, with [`OUT_OF_BOUNDS_PENALTY`] outside the search box.
///
/// Keeps count of every call and remembers the best feasible point seen.
pub struct RangeObjective<'a> {
    config: &'a PhysicalConfig,
    wind: Wind,
    bounds: SearchBounds,
    evaluations: usize,
    feasible_evaluations: usize,
    best: Option<Evaluation>,
}

impl<'a> RangeObjective<'a> {
    pub fn new(config: &'a PhysicalConfig, bounds: SearchBounds, wind: Wind) -> Self {
        RangeObjective {
            config,
            wind,
            bounds,
            evaluations: 0,
            feasible_evaluations: 0,
            best: None,
        }
    }

    pub fn bounds(&self) -> &SearchBounds {
        &self.bounds
    }

    pub fn evaluate(&mut self, angle: f64, thrust: f64) -> f64 {
        self.evaluations += 1;
        if !self.bounds.contains(angle, thrust) {
            return OUT_OF_BOUNDS_PENALTY;
        }

        let params = LaunchParameters::new(angle, thrust).with_wind(self.wind.clone());
        let distance = match simulate(self.config, &params, false) {
            Ok(result) => result.distance,
            Err(e) => {
                debug!(angle, thrust, error = %e, "candidate rejected");
                return OUT_OF_BOUNDS_PENALTY;
            }
        };

        let value = -distance;
        self.feasible_evaluations += 1;
        if self.best.map_or(true, |best| value < best.value) {
            self.best = Some(Evaluation {
                angle,
                thrust,
                value,
            });
        }
        value
    }

    pub fn evaluate_unit(&mut self, unit: [f64; 2]) -> f64 {
        let (angle, thrust) = self.bounds.from_unit(unit);
        self.evaluate(angle, thrust)
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn feasible_evaluations(&self) -> usize {
        self.feasible_evaluations
    }

    pub fn best(&self) -> Option<Evaluation> {
        self.best
    }
}
