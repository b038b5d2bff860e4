//! Game state
//!
//! Owns the physics backend plus everything layered on top of it: trigger
//! banks, poppers, live balls and the score. Deterministic for a given table,
//! seed and input sequence.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::table::TableDescriptor;
use super::trigger::{Trigger, TriggerGroup, TriggerId, TriggerIdAllocator, TriggerTarget};
use crate::consts::*;
use crate::error::TableError;
use crate::fixed::Fixed;
use crate::sim::{Actor, ActorHandle, PhysicsBackend, World};
use crate::vector::Vector2;

/// Events emitted by a game tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GroupCompleted {
        group: usize,
        target: TriggerTarget,
        message: Option<String>,
        completions: u32,
    },
    BallSpawned { ball: ActorHandle },
    BallLaunched { ball: ActorHandle, popper: usize },
    BallLost { ball: ActorHandle },
    UnderworldUnlocked,
}

#[derive(Debug, Clone)]
pub struct Popper {
    pub actor: ActorHandle,
    pub direction: Vector2,
    pub force: Fixed,
    pub once: bool,
    pub armed: bool,
}

/// Flipper buttons as of the previous tick, for edge detection
#[derive(Debug, Clone, Copy, Default)]
pub struct FlipperState {
    pub left: bool,
    pub right: bool,
}

pub struct GameState<B: PhysicsBackend = World> {
    pub backend: B,
    pub table: TableDescriptor,
    pub trigger_groups: Vec<TriggerGroup>,
    /// Sensor body -> (group index, trigger)
    trigger_index: BTreeMap<ActorHandle, (usize, TriggerId)>,
    pub poppers: Vec<Popper>,
    pub balls: Vec<ActorHandle>,
    pub score: u64,
    pub multiplier: u32,
    pub underworld_unlocked: bool,
    /// Host milliseconds since the game started
    pub timestamp: u64,
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub flippers: FlipperState,
    /// Pairs overlapping at the end of the previous tick
    touching: BTreeSet<(ActorHandle, ActorHandle)>,
}

impl GameState<World> {
    /// Build a table on the hand-rolled backend
    pub fn new(table: TableDescriptor, seed: u64) -> Result<Self, TableError> {
        let world = World::new(table.physics.clone())?;
        Self::with_backend(world, table, seed)
    }
}

impl<B: PhysicsBackend> GameState<B> {
    /// Populate `backend` from `table` and spawn the first ball
    pub fn with_backend(
        mut backend: B,
        table: TableDescriptor,
        seed: u64,
    ) -> Result<Self, TableError> {
        table.validate()?;

        for (index, rect) in table.rects.iter().enumerate() {
            let actor = Actor::new(rect.actor_config()).map_err(|source| TableError::Entry {
                list: "rects",
                index,
                source,
            })?;
            backend.add_body(actor);
        }

        let mut ids = TriggerIdAllocator::default();
        let mut trigger_index = BTreeMap::new();
        let mut trigger_groups = Vec::with_capacity(table.triggers.len());
        for (group_index, def) in table.triggers.iter().enumerate() {
            if def.triggers.is_empty() {
                log::warn!("Trigger group {group_index} ({:?}) has no triggers", def.target);
            }
            let mut triggers = Vec::with_capacity(def.triggers.len());
            for (index, rect) in def.triggers.iter().enumerate() {
                let actor = Actor::new(rect.actor_config().sensor()).map_err(|source| {
                    TableError::Entry {
                        list: "triggers",
                        index,
                        source,
                    }
                })?;
                let handle = backend.add_body(actor);
                let id = ids.next_id();
                trigger_index.insert(handle, (group_index, id));
                triggers.push(Trigger::new(id, Some(handle)));
            }
            trigger_groups.push(
                TriggerGroup::new(def.target, def.kind, triggers)
                    .with_round_robin(def.round_robin)
                    .with_message(def.message.clone()),
            );
        }

        let mut poppers = Vec::with_capacity(table.poppers.len());
        for (index, def) in table.poppers.iter().enumerate() {
            let actor = Actor::new(def.rect.actor_config().sensor()).map_err(|source| {
                TableError::Entry {
                    list: "poppers",
                    index,
                    source,
                }
            })?;
            poppers.push(Popper {
                actor: backend.add_body(actor),
                direction: def.direction(),
                force: def.force,
                once: def.once,
                armed: true,
            });
        }

        let mut state = Self {
            backend,
            table,
            trigger_groups,
            trigger_index,
            poppers,
            balls: Vec::new(),
            score: 0,
            multiplier: 1,
            underworld_unlocked: false,
            timestamp: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            flippers: FlipperState::default(),
            touching: BTreeSet::new(),
        };
        state.spawn_ball()?;
        Ok(state)
    }

    /// Add a ball at the table's start position
    pub fn spawn_ball(&mut self) -> Result<ActorHandle, TableError> {
        let actor = Actor::new(self.table.ball_config()).map_err(|source| TableError::Entry {
            list: "ball",
            index: 0,
            source,
        })?;
        let handle = self.backend.add_body(actor);
        self.balls.push(handle);
        log::info!("Spawned ball {:?} ({} in play)", handle, self.balls.len());
        Ok(handle)
    }

    pub fn ball_positions(&self) -> Vec<Vector2> {
        self.balls
            .iter()
            .filter_map(|&ball| self.backend.body(ball))
            .map(|actor| actor.position())
            .collect()
    }

    /// Ball positions for a renderer
    pub fn ball_positions_f32(&self) -> Vec<Vec2> {
        self.ball_positions().into_iter().map(Vector2::to_vec2).collect()
    }

    pub fn trigger_for_actor(&self, actor: ActorHandle) -> Option<(usize, TriggerId)> {
        self.trigger_index.get(&actor).copied()
    }

    pub fn popper_for_actor(&self, actor: ActorHandle) -> Option<usize> {
        self.poppers.iter().position(|p| p.actor == actor)
    }

    /// Keep only pairs that were not touching last tick
    pub(crate) fn begin_contacts(
        &mut self,
        current: BTreeSet<(ActorHandle, ActorHandle)>,
    ) -> Vec<(ActorHandle, ActorHandle)> {
        let started = current.difference(&self.touching).copied().collect();
        self.touching = current;
        started
    }

    /// Kick `ball` off popper `index`, if it is still armed
    pub(crate) fn fire_popper(&mut self, index: usize, ball: ActorHandle) -> bool {
        let Some(popper) = self.poppers.get_mut(index) else {
            return false;
        };
        if !popper.armed {
            return false;
        }
        if popper.once {
            popper.armed = false;
        }
        let permille = self
            .rng
            .random_range(-POPPER_JITTER_PERMILLE..=POPPER_JITTER_PERMILLE);
        let jitter = Fixed::ONE + Fixed::from_int(permille) / Fixed::from_int(1000);
        let force = popper.direction * (popper.force * jitter);
        log::debug!("Popper {index} launching ball {:?} with {}", ball, force.magnitude());
        self.backend.apply_force(ball, force.x, force.y)
    }

    /// Pay out a completed group and reset its lights
    pub(crate) fn complete_group(&mut self, group: usize, events: &mut Vec<GameEvent>) {
        let Some(trigger_group) = self.trigger_groups.get_mut(group) else {
            return;
        };
        trigger_group.unset_triggers();
        let target = trigger_group.target();
        let completions = trigger_group.completions();
        let repeat_bonus = trigger_group.repeat_bonus();
        let message = trigger_group.message().map(str::to_owned);
        log::info!(
            "Group {group} ({:?}) completed x{completions}: {}",
            target,
            message.as_deref().unwrap_or("")
        );

        self.score += COMPLETION_SCORE * u64::from(self.multiplier);
        match target {
            TriggerTarget::Multiplier => {
                self.multiplier = (self.multiplier + 1).min(MAX_MULTIPLIER);
            }
            TriggerTarget::Multiball => match self.spawn_ball() {
                Ok(ball) => events.push(GameEvent::BallSpawned { ball }),
                Err(err) => log::warn!("Multiball failed: {err}"),
            },
            TriggerTarget::Sequence => {
                self.score += SEQUENCE_BONUS
                    * u64::from(repeat_bonus + 1)
                    * u64::from(self.multiplier);
            }
            TriggerTarget::Underworld => {
                if !self.underworld_unlocked {
                    self.underworld_unlocked = true;
                    log::info!("Underworld unlocked");
                    events.push(GameEvent::UnderworldUnlocked);
                }
            }
        }

        events.push(GameEvent::GroupCompleted {
            group,
            target,
            message,
            completions,
        });
    }

    /// Remove balls that fell off the bottom; serve a new one if none remain
    pub(crate) fn drain_lost_balls(&mut self, events: &mut Vec<GameEvent>) {
        let limit = self.table.height + OUT_OF_BOUNDS_MARGIN;
        let lost: Vec<ActorHandle> = self
            .balls
            .iter()
            .copied()
            .filter(|&ball| {
                self.backend
                    .body(ball)
                    .is_none_or(|actor| actor.position().y > limit)
            })
            .collect();
        if lost.is_empty() {
            return;
        }

        for ball in lost {
            self.balls.retain(|&b| b != ball);
            self.backend.remove_body(ball);
            log::info!("Lost ball {:?}", ball);
            events.push(GameEvent::BallLost { ball });
        }
        if self.balls.is_empty() {
            self.multiplier = 1;
            match self.spawn_ball() {
                Ok(ball) => events.push(GameEvent::BallSpawned { ball }),
                Err(err) => log::warn!("Could not serve a new ball: {err}"),
            }
        }
    }
}
