//! Rigid bodies
//!
//! An actor is a Verlet particle: velocity is implied by the difference
//! between the current and previous positions. Behaviour differences between
//! table geometry, sensors and balls come from flags, not from subtypes.

use serde::{Deserialize, Serialize};

use super::shape::{Aabb, Shape};
use crate::consts::FIXED_MASS;
use crate::error::ConfigError;
use crate::fixed::Fixed;
use crate::normalize_angle;
use crate::vector::Vector2;

/// Identity of an actor inside a physics backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorHandle(pub u32);

/// Every recognized actor option, with defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ActorConfig {
    pub position: Vector2,
    pub angle: Fixed,
    /// Radians added to the angle every tick
    pub angular_velocity: Fixed,
    pub shape: Shape,
    /// Ignored for fixed actors, which use [`FIXED_MASS`]
    pub mass: Fixed,
    pub restitution: Fixed,
    pub friction: Fixed,
    /// Immovable: never integrated, never displaced by collisions
    pub fixed: bool,
    pub collidable: bool,
    /// Reports contacts but is never resolved
    pub sensor: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            position: Vector2::ZERO,
            angle: Fixed::ZERO,
            angular_velocity: Fixed::ZERO,
            shape: Shape::circle(Fixed::ONE),
            mass: Fixed::ONE,
            restitution: Fixed::from_f64(0.3),
            friction: Fixed::ZERO,
            fixed: false,
            collidable: true,
            sensor: false,
        }
    }
}

impl ActorConfig {
    pub fn circle(position: Vector2, radius: Fixed) -> Self {
        Self {
            position,
            shape: Shape::circle(radius),
            ..Default::default()
        }
    }

    pub fn rectangle(position: Vector2, width: Fixed, height: Fixed, angle: Fixed) -> Self {
        Self {
            position,
            angle,
            shape: Shape::rectangle(width, height, angle),
            ..Default::default()
        }
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    pub fn with_mass(mut self, mass: Fixed) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_material(mut self, restitution: Fixed, friction: Fixed) -> Self {
        self.restitution = restitution;
        self.friction = friction;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fixed && !self.mass.is_positive() {
            return Err(ConfigError::NonPositiveMass {
                mass: self.mass.to_f64(),
            });
        }
        if self.friction.is_negative() || self.friction > Fixed::ONE {
            return Err(ConfigError::FrictionOutOfRange {
                friction: self.friction.to_f64(),
            });
        }
        if self.restitution.is_negative() {
            return Err(ConfigError::NegativeRestitution {
                restitution: self.restitution.to_f64(),
            });
        }
        match self.shape {
            Shape::Circle { radius } if !radius.is_positive() => {
                Err(ConfigError::InvalidDimension {
                    what: "radius",
                    value: radius.to_f64(),
                })
            }
            Shape::OrientedBox(obb) if !obb.half_extents.x.is_positive() => {
                Err(ConfigError::InvalidDimension {
                    what: "width",
                    value: (obb.half_extents.x + obb.half_extents.x).to_f64(),
                })
            }
            Shape::OrientedBox(obb) if !obb.half_extents.y.is_positive() => {
                Err(ConfigError::InvalidDimension {
                    what: "height",
                    value: (obb.half_extents.y + obb.half_extents.y).to_f64(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// A physical body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    position: Vector2,
    previous: Vector2,
    force: Vector2,
    angle: Fixed,
    angular_velocity: Fixed,
    mass: Fixed,
    inverse_mass: Fixed,
    restitution: Fixed,
    friction: Fixed,
    fixed: bool,
    collidable: bool,
    sensor: bool,
    /// Set by the first resolution within a tick
    is_colliding: bool,
    shape: Shape,
    bounds: Aabb,
}

impl Actor {
    pub fn new(config: ActorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (mass, inverse_mass) = if config.fixed {
            (FIXED_MASS, Fixed::ZERO)
        } else {
            (config.mass, Fixed::ONE / config.mass)
        };
        let mut shape = config.shape;
        shape.set_angle(config.angle);
        let mut actor = Self {
            position: config.position,
            previous: config.position,
            force: Vector2::ZERO,
            angle: config.angle,
            angular_velocity: config.angular_velocity,
            mass,
            inverse_mass,
            restitution: config.restitution,
            friction: config.friction,
            fixed: config.fixed,
            collidable: config.collidable,
            sensor: config.sensor,
            is_colliding: false,
            shape,
            bounds: Aabb::default(),
        };
        actor.refresh_bounds();
        Ok(actor)
    }

    #[inline]
    pub fn position(&self) -> Vector2 {
        self.position
    }

    #[inline]
    pub fn previous_position(&self) -> Vector2 {
        self.previous
    }

    /// Teleport; the actor comes to rest at `position`
    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
        self.previous = position;
        self.refresh_bounds();
    }

    #[inline]
    pub fn velocity(&self) -> Vector2 {
        self.position - self.previous
    }

    pub fn set_velocity(&mut self, velocity: Vector2) {
        self.previous = self.position - velocity;
    }

    /// Split the velocity into parts along and across `normal`
    pub fn velocity_components(&self, normal: Vector2) -> (Vector2, Vector2) {
        let velocity = self.velocity();
        let normal_part = normal * velocity.dot(normal);
        (normal_part, velocity - normal_part)
    }

    /// Accumulate a force for the next integration
    pub fn apply_force(&mut self, force: Vector2) {
        self.force += force;
    }

    #[inline]
    pub fn force(&self) -> Vector2 {
        self.force
    }

    #[inline]
    pub fn angle(&self) -> Fixed {
        self.angle
    }

    pub fn set_angle(&mut self, angle: Fixed) {
        self.angle = normalize_angle(angle);
        self.shape.set_angle(self.angle);
        self.refresh_bounds();
    }

    #[inline]
    pub fn angular_velocity(&self) -> Fixed {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: Fixed) {
        self.angular_velocity = angular_velocity;
    }

    #[inline]
    pub fn mass(&self) -> Fixed {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> Fixed {
        self.inverse_mass
    }

    #[inline]
    pub fn restitution(&self) -> Fixed {
        self.restitution
    }

    #[inline]
    pub fn friction(&self) -> Fixed {
        self.friction
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    #[inline]
    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    #[inline]
    pub fn is_sensor(&self) -> bool {
        self.sensor
    }

    #[inline]
    pub fn is_colliding(&self) -> bool {
        self.is_colliding
    }

    /// Start of a tick: the actor may take a new velocity again
    pub(crate) fn clear_colliding(&mut self) {
        self.is_colliding = false;
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    fn refresh_bounds(&mut self) {
        self.bounds = self.shape.bounds(self.position);
    }

    /// Verlet step. `massless_force` (gravity) is added as-is, accumulated
    /// forces are scaled by the inverse mass, and both by `dt²`.
    pub fn update(&mut self, massless_force: Vector2, damping: Fixed, dt_squared: Fixed) {
        if self.fixed {
            return;
        }
        let acceleration = self.force * self.inverse_mass + massless_force;
        let start = self.position;
        let velocity = (self.velocity() + acceleration * dt_squared) * damping;
        self.position += velocity;
        self.previous = start;
        self.force = Vector2::ZERO;

        if !self.angular_velocity.is_zero() {
            self.set_angle(self.angle + self.angular_velocity);
        } else {
            self.refresh_bounds();
        }
    }

    /// Apply a collision response.
    ///
    /// The positional correction always lands and keeps the current velocity.
    /// `velocity` is only taken by the first resolution of the tick, so an
    /// actor wedged against several surfaces keeps that first answer.
    pub fn resolve(&mut self, mtd: Vector2, velocity: Option<Vector2>) {
        self.position += mtd;
        self.previous += mtd;
        if let Some(velocity) = velocity {
            if !self.is_colliding {
                self.set_velocity(velocity);
                self.is_colliding = true;
            }
        }
        self.refresh_bounds();
    }
}
