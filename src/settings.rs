//! Physics tuning
//!
//! Speeds and forces are tuned by feel, not calibrated to real units.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fixed::Fixed;
use crate::vector::Vector2;

/// World-wide integration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Massless force added to every movable actor each tick (gravity)
    pub gravity: Vector2,
    /// Velocity multiplier applied during integration (1.0 = no damping)
    pub damping: Fixed,
    /// Integration step; forces are scaled by its square
    pub time_step: Fixed,
    /// Milliseconds of host time consumed by one physics tick
    pub tick_ms: u32,
    /// Cap on ticks run by a single `step` call
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vector2::from_f64(0.0, 0.05),
            damping: Fixed::from_f64(0.995),
            time_step: Fixed::ONE,
            tick_ms: crate::consts::TICK_MS,
            max_substeps: crate::consts::MAX_SUBSTEPS,
        }
    }
}

impl PhysicsConfig {
    /// Reject settings that would break integration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.damping.is_negative() || self.damping > Fixed::ONE {
            return Err(ConfigError::DampingOutOfRange {
                damping: self.damping.to_f64(),
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTickLength);
        }
        Ok(())
    }

    /// `time_step²`, the factor applied to accumulated forces
    pub fn time_step_squared(&self) -> Fixed {
        self.time_step * self.time_step
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, crate::error::TableError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Physics config: tick={}ms damping={} gravity=({}, {})",
            config.tick_ms,
            config.damping,
            config.gravity.x,
            config.gravity.y
        );
        Ok(config)
    }
}
