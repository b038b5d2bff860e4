//! Pinball Physics - a deterministic 2D pinball simulation core
//!
//! Core modules:
//! - `fixed`, `vector`: 16.16 fixed-point scalar and 2D vector math
//! - `sim`: Shapes, actors, collision detection and response, the physics backend
//! - `game`: Trigger groups, table loading, per-frame game tick
//! - `settings`: Physics tuning
//!
//! All simulation state is fixed-point, so identical inputs produce
//! bit-identical results on every platform.

pub mod error;
pub mod fixed;
pub mod game;
pub mod settings;
pub mod sim;
pub mod vector;

pub use error::{ConfigError, TableError};
pub use fixed::Fixed;
pub use settings::PhysicsConfig;
pub use vector::Vector2;

/// Game configuration constants
pub mod consts {
    use crate::fixed::Fixed;

    /// Host milliseconds per physics tick (125 Hz)
    pub const TICK_MS: u32 = 8;
    /// Maximum ticks per `step` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Mass reported by fixed actors. They never move, so it only matters to
    /// code that reads it.
    pub const FIXED_MASS: Fixed = Fixed::from_int(10_000);

    /// A series trigger attempt is abandoned after this many ms
    pub const TRIGGER_EXPIRY: u64 = 5_000;
    /// Sequence completions this close together (ms) earn a repeat bonus
    pub const SEQUENCE_REPEAT_WINDOW: u64 = 15_000;

    /// Ball defaults
    pub const BALL_RADIUS: Fixed = Fixed::from_int(8);
    pub const BALL_MASS: Fixed = Fixed::ONE;

    /// Popper launch force before jitter
    pub const POPPER_FORCE: Fixed = Fixed::from_int(6);
    /// Jitter applied to popper force, in thousandths either way
    pub const POPPER_JITTER_PERMILLE: i32 = 100;

    /// Balls this far below the table bottom are lost
    pub const OUT_OF_BOUNDS_MARGIN: Fixed = Fixed::from_int(50);

    /// Scoring
    pub const COMPLETION_SCORE: u64 = 1_000;
    pub const SEQUENCE_BONUS: u64 = 5_000;
    pub const MAX_MULTIPLIER: u32 = 8;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: Fixed) -> Fixed {
    while angle >= Fixed::PI {
        angle -= Fixed::TAU;
    }
    while angle < -Fixed::PI {
        angle += Fixed::TAU;
    }
    angle
}

/// Degrees (as authored in table files) to radians
#[inline]
pub fn degrees_to_radians(degrees: Fixed) -> Fixed {
    degrees * Fixed::PI / Fixed::from_int(180)
}
