//! Physics backend contract
//!
//! Game logic talks to physics only through [`PhysicsBackend`], so the
//! hand-rolled [`World`](super::world::World) and an adapter over some other
//! rigid-body engine are interchangeable.

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorHandle};
use super::collision::Manifold;
use crate::fixed::Fixed;

/// Two bodies overlapping during a tick. Sensor contacts are reported too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactEvent {
    pub a: ActorHandle,
    pub b: ActorHandle,
}

impl ContactEvent {
    pub fn involves(&self, handle: ActorHandle) -> bool {
        self.a == handle || self.b == handle
    }

    /// The partner of `handle`, if `handle` is part of this contact
    pub fn other(&self, handle: ActorHandle) -> Option<ActorHandle> {
        if self.a == handle {
            Some(self.b)
        } else if self.b == handle {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Everything that happened during one `step` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Fixed ticks actually simulated
    pub ticks: u32,
    /// Resolved (non-sensor) collisions, in detection order
    pub manifolds: Vec<Manifold>,
    /// Every overlapping pair, in detection order
    pub contacts: Vec<ContactEvent>,
}

impl StepReport {
    pub fn merge(&mut self, other: StepReport) {
        self.ticks += other.ticks;
        self.manifolds.extend(other.manifolds);
        self.contacts.extend(other.contacts);
    }
}

pub trait PhysicsBackend {
    /// Take ownership of an actor and return its handle
    fn add_body(&mut self, actor: Actor) -> ActorHandle;

    /// Remove and return an actor; `None` for unknown handles
    fn remove_body(&mut self, handle: ActorHandle) -> Option<Actor>;

    /// Accumulate a force for the next tick; false for unknown handles
    fn apply_force(&mut self, handle: ActorHandle, fx: Fixed, fy: Fixed) -> bool;

    /// Advance by `dt_ms` of host time
    fn step(&mut self, dt_ms: u32) -> StepReport;

    fn body(&self, handle: ActorHandle) -> Option<&Actor>;

    fn body_mut(&mut self, handle: ActorHandle) -> Option<&mut Actor>;
}
