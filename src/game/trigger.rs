//! Trigger groups
//!
//! A group is a bank of sensor "lights" that pays out once all of them have
//! been hit. `Bool` groups accept hits in any order and never time out.
//! `Series` groups abandon a partial attempt after [`TRIGGER_EXPIRY`].
//!
//! State is implied by the active set: empty is idle, partially filled is an
//! attempt in progress, and a full set is the transient completion that
//! `trigger` reports by returning `true`. The caller then applies the payout
//! and calls [`TriggerGroup::unset_triggers`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::{SEQUENCE_REPEAT_WINDOW, TRIGGER_EXPIRY};
use crate::sim::ActorHandle;

/// What completing a group pays out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTarget {
    Multiplier,
    Multiball,
    /// Sequence completion, rewarded more for quick repeats
    Sequence,
    Underworld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerType {
    /// Order-independent, no time limit
    Bool,
    /// Must be completed within the expiry window
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

/// Hands out trigger ids; owned by whoever loads the table
#[derive(Debug, Default)]
pub struct TriggerIdAllocator {
    next: u32,
}

impl TriggerIdAllocator {
    pub fn next_id(&mut self) -> TriggerId {
        let id = TriggerId(self.next);
        self.next += 1;
        id
    }
}

/// One light in a bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub id: TriggerId,
    /// Sensor body in the physics backend, if the trigger has one
    pub actor: Option<ActorHandle>,
    /// Lit
    pub active: bool,
}

impl Trigger {
    pub fn new(id: TriggerId, actor: Option<ActorHandle>) -> Self {
        Self {
            id,
            actor,
            active: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Idle,
    Partial,
    Complete,
}

#[derive(Debug, Clone)]
pub struct TriggerGroup {
    target: TriggerTarget,
    kind: TriggerType,
    message: Option<String>,
    round_robin: bool,
    triggers: Vec<Trigger>,
    active: BTreeSet<TriggerId>,
    completions: u32,
    /// Start of the current attempt
    attempt_start: Option<u64>,
    /// Latest host time seen by `update` or `trigger_at`
    clock: u64,
    last_completion: Option<u64>,
    repeat_bonus: u32,
}

impl TriggerGroup {
    pub fn new(target: TriggerTarget, kind: TriggerType, triggers: Vec<Trigger>) -> Self {
        Self {
            target,
            kind,
            message: None,
            round_robin: false,
            triggers,
            active: BTreeSet::new(),
            completions: 0,
            attempt_start: None,
            clock: 0,
            last_completion: None,
            repeat_bonus: 0,
        }
    }

    pub fn with_round_robin(mut self, round_robin: bool) -> Self {
        self.round_robin = round_robin;
        self
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn target(&self) -> TriggerTarget {
        self.target
    }

    pub fn kind(&self) -> TriggerType {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_round_robin(&self) -> bool {
        self.round_robin
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn active_triggers(&self) -> &BTreeSet<TriggerId> {
        &self.active
    }

    pub fn completions(&self) -> u32 {
        self.completions
    }

    /// Quick repeats of a sequence group inside the repeat window
    pub fn repeat_bonus(&self) -> u32 {
        self.repeat_bonus
    }

    /// Lit/unlit flags in trigger order
    pub fn pattern(&self) -> Vec<bool> {
        self.triggers.iter().map(|t| t.active).collect()
    }

    pub fn state(&self) -> GroupState {
        if self.active.is_empty() {
            GroupState::Idle
        } else if self.active.len() < self.triggers.len() {
            GroupState::Partial
        } else {
            GroupState::Complete
        }
    }

    pub fn trigger_for_actor(&self, actor: ActorHandle) -> Option<TriggerId> {
        self.triggers
            .iter()
            .find(|t| t.actor == Some(actor))
            .map(|t| t.id)
    }

    /// Light trigger `id` at host time `timestamp`. Returns `true` when this
    /// hit completes the group.
    pub fn trigger_at(&mut self, id: TriggerId, timestamp: u64) -> bool {
        self.clock = self.clock.max(timestamp);
        self.trigger(id)
    }

    /// Light trigger `id` at the time of the most recent `update`. Hosts that
    /// trigger between updates should use [`trigger_at`](Self::trigger_at).
    pub fn trigger(&mut self, id: TriggerId) -> bool {
        if self.triggers.is_empty() {
            log::warn!("{:?} group has no triggers, ignoring hit on {:?}", self.target, id);
            return false;
        }
        let Some(trigger) = self.triggers.iter_mut().find(|t| t.id == id) else {
            log::warn!("{:?} group has no trigger {:?}", self.target, id);
            return false;
        };
        trigger.active = true;

        if self.active.is_empty() {
            self.attempt_start = Some(self.clock);
        }
        if !self.active.insert(id) || self.active.len() < self.triggers.len() {
            return false;
        }

        self.completions += 1;
        if self.target == TriggerTarget::Sequence {
            self.repeat_bonus = match self.last_completion {
                Some(last) if self.clock.saturating_sub(last) < SEQUENCE_REPEAT_WINDOW => {
                    self.repeat_bonus + 1
                }
                _ => 0,
            };
            self.last_completion = Some(self.clock);
        }
        true
    }

    /// Clear every light. The completion count survives.
    pub fn unset_triggers(&mut self) {
        self.active.clear();
        for trigger in &mut self.triggers {
            trigger.active = false;
        }
        self.attempt_start = None;
    }

    /// Advance the group's timers to `timestamp` (host milliseconds)
    pub fn update(&mut self, timestamp: u64) {
        self.clock = timestamp;

        if let Some(last) = self.last_completion {
            if timestamp.saturating_sub(last) >= SEQUENCE_REPEAT_WINDOW {
                log::debug!("{:?} repeat window closed", self.target);
                self.completions = 0;
                self.repeat_bonus = 0;
                self.last_completion = None;
            }
        }

        if self.kind != TriggerType::Series {
            return;
        }
        if self.active.is_empty() {
            self.attempt_start = None;
            return;
        }
        let start = *self.attempt_start.get_or_insert(timestamp);
        if self.active.len() < self.triggers.len()
            && timestamp.saturating_sub(start) >= TRIGGER_EXPIRY
        {
            log::debug!(
                "{:?} attempt expired with {}/{} lit",
                self.target,
                self.active.len(),
                self.triggers.len()
            );
            self.unset_triggers();
            self.completions = 0;
        }
    }

    /// Shift the lit pattern one place toward the front, wrapping around
    pub fn move_triggers_left(&mut self) {
        self.rotate_pattern(1);
    }

    /// Shift the lit pattern one place toward the back, wrapping around
    pub fn move_triggers_right(&mut self) {
        let count = self.triggers.len();
        if count > 0 {
            self.rotate_pattern(count - 1);
        }
    }

    fn rotate_pattern(&mut self, offset: usize) {
        if !self.round_robin {
            log::warn!("{:?} group is not round-robin, not shifting", self.target);
            return;
        }
        let count = self.triggers.len();
        if count == 0 {
            return;
        }
        let pattern = self.pattern();
        for (i, trigger) in self.triggers.iter_mut().enumerate() {
            trigger.active = pattern[(i + offset) % count];
        }
        self.active = self
            .triggers
            .iter()
            .filter(|t| t.active)
            .map(|t| t.id)
            .collect();
    }
}
