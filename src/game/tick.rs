//! Per-frame game tick
//!
//! The host calls [`tick`] once per frame with the elapsed milliseconds and
//! the current button state. Physics runs in fixed ticks underneath; trigger
//! timers follow host time.

use std::collections::BTreeSet;

use super::state::{FlipperState, GameEvent, GameState};
use crate::sim::{ActorHandle, Manifold, PhysicsBackend};

/// Input commands for a single frame (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left flipper button held
    pub left_flipper: bool,
    /// Right flipper button held
    pub right_flipper: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TickOutput {
    /// Fixed physics ticks run this frame
    pub ticks: u32,
    /// Resolved collisions, for impact sounds and effects
    pub manifolds: Vec<Manifold>,
    pub events: Vec<GameEvent>,
}

/// Advance the game by `dt_ms` of host time
pub fn tick<B: PhysicsBackend>(
    state: &mut GameState<B>,
    input: &TickInput,
    dt_ms: u32,
) -> TickOutput {
    let mut events = Vec::new();

    // Flipper presses shift round-robin lanes, once per press
    if input.left_flipper && !state.flippers.left {
        for group in state.trigger_groups.iter_mut().filter(|g| g.is_round_robin()) {
            group.move_triggers_left();
        }
    }
    if input.right_flipper && !state.flippers.right {
        for group in state.trigger_groups.iter_mut().filter(|g| g.is_round_robin()) {
            group.move_triggers_right();
        }
    }
    state.flippers = FlipperState {
        left: input.left_flipper,
        right: input.right_flipper,
    };

    let report = state.backend.step(dt_ms);
    state.timestamp += u64::from(dt_ms);
    for group in &mut state.trigger_groups {
        group.update(state.timestamp);
    }

    let current: BTreeSet<_> = report
        .contacts
        .iter()
        .map(|c| (c.a.min(c.b), c.a.max(c.b)))
        .collect();
    for (a, b) in state.begin_contacts(current) {
        let (ball, other) = if state.balls.contains(&a) {
            (a, b)
        } else if state.balls.contains(&b) {
            (b, a)
        } else {
            continue;
        };
        route_contact(state, ball, other, &mut events);
    }

    state.drain_lost_balls(&mut events);

    TickOutput {
        ticks: report.ticks,
        manifolds: report.manifolds,
        events,
    }
}

fn route_contact<B: PhysicsBackend>(
    state: &mut GameState<B>,
    ball: ActorHandle,
    other: ActorHandle,
    events: &mut Vec<GameEvent>,
) {
    if let Some((group, id)) = state.trigger_for_actor(other) {
        let timestamp = state.timestamp;
        if state.trigger_groups[group].trigger_at(id, timestamp) {
            state.complete_group(group, events);
        }
    } else if let Some(popper) = state.popper_for_actor(other) {
        if state.fire_popper(popper, ball) {
            events.push(GameEvent::BallLaunched { ball, popper });
        }
    }
}
