use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{GUST_AMPLITUDE, GUST_ANGULAR_FREQUENCY};

/// Horizontal wind speed as a pure function of flight time (m/s, +x downrange).
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Wind {
    #[default]
    Calm,
    Constant {
        speed: f64,
    },
    Sinusoidal {
        amplitude: f64,
        angular_frequency: f64,
    },
    #[serde(skip)]
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Wind {
    pub fn constant(speed: f64) -> Self {
        Wind::Constant { speed }
    }

    pub fn sinusoidal(amplitude: f64, angular_frequency: f64) -> Self {
        Wind::Sinusoidal {
            amplitude,
            angular_frequency,
        }
    }

    /// 5 m/s gusts oscillating at 0.5 rad/s.
    pub fn gusts() -> Self {
        Wind::sinusoidal(GUST_AMPLITUDE, GUST_ANGULAR_FREQUENCY)
    }

    pub fn custom<F>(profile: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Wind::Custom(Arc::new(profile))
    }

    pub fn speed_at(&self, time: f64) -> f64 {
        match self {
            Wind::Calm => 0.0,
            Wind::Constant { speed } => *speed,
            Wind::Sinusoidal {
                amplitude,
                angular_frequency,
            } => amplitude * (angular_frequency * time).sin(),
            Wind::Custom(profile) => profile(time),
        }
    }

    pub fn is_calm(&self) -> bool {
        matches!(self, Wind::Calm)
    }
}

impl fmt::Debug for Wind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wind::Calm => write!(f, "Calm"),
            Wind::Constant { speed } => f.debug_struct("Constant").field("speed", speed).finish(),
            Wind::Sinusoidal {
                amplitude,
                angular_frequency,
            } => f
                .debug_struct("Sinusoidal")
                .field("amplitude", amplitude)
                .field("angular_frequency", angular_frequency)
                .finish(),
            Wind::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
