//! Game layer
//!
//! Everything here drives physics through [`PhysicsBackend`](crate::sim::PhysicsBackend)
//! and stays deterministic for a given seed and input sequence.

pub mod state;
pub mod table;
pub mod tick;
pub mod trigger;

pub use state::{FlipperState, GameEvent, GameState, Popper};
pub use table::{DEMO_TABLE, PopperDef, RectDef, TableDescriptor, TriggerGroupDef};
pub use tick::{TickInput, TickOutput, tick};
pub use trigger::{
    GroupState, Trigger, TriggerGroup, TriggerId, TriggerIdAllocator, TriggerTarget, TriggerType,
};
