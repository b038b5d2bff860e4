//! Deterministic physics module
//!
//! Everything in here must stay pure and deterministic:
//! - Fixed-point arithmetic only
//! - Fixed timestep only
//! - Stable iteration order (by actor handle)
//! - No rendering or platform dependencies

pub mod actor;
pub mod backend;
pub mod collision;
pub mod resolver;
pub mod shape;
pub mod world;

pub use actor::{Actor, ActorConfig, ActorHandle};
pub use backend::{ContactEvent, PhysicsBackend, StepReport};
pub use collision::{Manifold, detect, should_test};
pub use resolver::{Resolution, resolve};
pub use shape::{Aabb, Interval, OrientedBox, Shape};
pub use world::World;
