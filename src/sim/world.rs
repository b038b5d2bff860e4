//! The hand-rolled physics backend
//!
//! One tick: clear per-tick collision flags, test every pair in handle order
//! (broad-phase bounds first, then the narrow phase), resolve non-sensor hits
//! immediately, then integrate every movable actor.
//!
//! Pairs are resolved one after another in iteration order, so with three or
//! more bodies touching in the same tick the order affects the result.

use super::actor::{Actor, ActorHandle};
use super::backend::{ContactEvent, PhysicsBackend, StepReport};
use super::collision::{detect, should_test};
use super::resolver::resolve;
use crate::error::ConfigError;
use crate::fixed::Fixed;
use crate::settings::PhysicsConfig;
use crate::vector::Vector2;

pub struct World {
    config: PhysicsConfig,
    /// Sorted by handle; handles only ever grow so pushes keep the order
    bodies: Vec<(ActorHandle, Actor)>,
    next_handle: u32,
    accumulator_ms: u32,
    tick_count: u64,
}

impl World {
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            bodies: Vec::new(),
            next_handle: 1,
            accumulator_ms: 0,
            tick_count: 0,
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Total fixed ticks simulated since creation
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorHandle, &Actor)> {
        self.bodies.iter().map(|(handle, actor)| (*handle, actor))
    }

    fn index_of(&self, handle: ActorHandle) -> Option<usize> {
        self.bodies.binary_search_by_key(&handle, |(h, _)| *h).ok()
    }

    /// Run exactly one fixed tick
    pub fn tick(&mut self) -> StepReport {
        let mut report = StepReport {
            ticks: 1,
            ..Default::default()
        };

        for (_, actor) in &mut self.bodies {
            actor.clear_colliding();
        }

        let count = self.bodies.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (left, right) = self.bodies.split_at_mut(j);
                let (handle_a, a) = &mut left[i];
                let (handle_b, b) = &mut right[0];

                if !should_test(a, b) || !a.bounds().overlaps(&b.bounds()) {
                    continue;
                }
                let Some(manifold) = detect(*handle_a, a, *handle_b, b) else {
                    continue;
                };
                report.contacts.push(ContactEvent {
                    a: *handle_a,
                    b: *handle_b,
                });
                if a.is_sensor() || b.is_sensor() {
                    continue;
                }
                // The detector may have swapped the pair to run box-first
                if manifold.a == *handle_a {
                    resolve(&manifold, a, b);
                } else {
                    resolve(&manifold, b, a);
                }
                report.manifolds.push(manifold);
            }
        }

        let gravity = self.config.gravity;
        let damping = self.config.damping;
        let dt_squared = self.config.time_step_squared();
        for (_, actor) in &mut self.bodies {
            actor.update(gravity, damping, dt_squared);
        }

        self.tick_count += 1;
        report
    }
}

impl PhysicsBackend for World {
    fn add_body(&mut self, actor: Actor) -> ActorHandle {
        let handle = ActorHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.push((handle, actor));
        handle
    }

    fn remove_body(&mut self, handle: ActorHandle) -> Option<Actor> {
        match self.index_of(handle) {
            Some(index) => Some(self.bodies.remove(index).1),
            None => {
                log::warn!("remove_body: unknown actor {:?}", handle);
                None
            }
        }
    }

    fn apply_force(&mut self, handle: ActorHandle, fx: Fixed, fy: Fixed) -> bool {
        match self.body_mut(handle) {
            Some(actor) => {
                actor.apply_force(Vector2::new(fx, fy));
                true
            }
            None => {
                log::warn!("apply_force: unknown actor {:?}", handle);
                false
            }
        }
    }

    /// Runs as many whole ticks as the accumulated time allows, up to
    /// `max_substeps`. Time beyond the cap is dropped.
    fn step(&mut self, dt_ms: u32) -> StepReport {
        let tick_ms = self.config.tick_ms;
        let max_substeps = self.config.max_substeps.max(1);
        self.accumulator_ms = self.accumulator_ms.saturating_add(dt_ms);

        let mut report = StepReport::default();
        while self.accumulator_ms >= tick_ms {
            if report.ticks >= max_substeps {
                log::debug!(
                    "Dropping {}ms of simulation after {} substeps",
                    self.accumulator_ms - self.accumulator_ms % tick_ms,
                    max_substeps
                );
                self.accumulator_ms %= tick_ms;
                break;
            }
            self.accumulator_ms -= tick_ms;
            let tick = self.tick();
            report.merge(tick);
        }
        report
    }

    fn body(&self, handle: ActorHandle) -> Option<&Actor> {
        self.index_of(handle).map(|index| &self.bodies[index].1)
    }

    fn body_mut(&mut self, handle: ActorHandle) -> Option<&mut Actor> {
        self.index_of(handle)
            .map(move |index| &mut self.bodies[index].1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::ActorConfig;

    fn fx(v: f64) -> Fixed {
        Fixed::from_f64(v)
    }

    fn weightless() -> PhysicsConfig {
        PhysicsConfig {
            gravity: Vector2::ZERO,
            damping: Fixed::ONE,
            ..Default::default()
        }
    }

    fn ball_at(x: f64, y: f64) -> Actor {
        Actor::new(ActorConfig::circle(Vector2::from_f64(x, y), fx(5.0))).unwrap()
    }

    #[test]
    fn test_handles_are_monotonic_and_removable() {
        let mut world = World::new(weightless()).unwrap();
        let a = world.add_body(ball_at(0.0, 0.0));
        let b = world.add_body(ball_at(50.0, 0.0));
        assert!(b > a);
        assert!(world.remove_body(a).is_some());
        assert!(world.remove_body(a).is_none());
        let c = world.add_body(ball_at(0.0, 0.0));
        assert!(c > b);
        assert_eq!(world.len(), 2);
        assert!(world.body(b).is_some());
    }

    #[test]
    fn test_apply_force_to_unknown_handle() {
        let mut world = World::new(weightless()).unwrap();
        assert!(!world.apply_force(ActorHandle(42), Fixed::ONE, Fixed::ZERO));
        let ball = world.add_body(ball_at(0.0, 0.0));
        assert!(world.apply_force(ball, Fixed::ONE, Fixed::ZERO));
        world.tick();
        let velocity = world.body(ball).unwrap().velocity();
        assert_eq!(velocity, Vector2::from_int(1, 0));
    }

    #[test]
    fn test_step_accumulates_whole_ticks() {
        let mut world = World::new(PhysicsConfig {
            tick_ms: 8,
            ..weightless()
        })
        .unwrap();
        assert_eq!(world.step(20).ticks, 2);
        // 4ms carried over
        assert_eq!(world.step(4).ticks, 1);
        assert_eq!(world.step(7).ticks, 0);
        assert_eq!(world.tick_count(), 3);
    }

    #[test]
    fn test_step_caps_substeps() {
        let mut world = World::new(PhysicsConfig {
            tick_ms: 8,
            max_substeps: 4,
            ..weightless()
        })
        .unwrap();
        assert_eq!(world.step(1000).ticks, 4);
        // The backlog was dropped rather than carried into the next frame
        assert_eq!(world.step(0).ticks, 0);
    }

    #[test]
    fn test_ball_comes_to_rest_on_floor() {
        let mut world = World::new(PhysicsConfig::default()).unwrap();
        let floor = Actor::new(
            ActorConfig::rectangle(Vector2::from_int(0, 100), fx(200.0), fx(10.0), Fixed::ZERO)
                .fixed(),
        )
        .unwrap();
        world.add_body(floor);
        let ball = world.add_body(ball_at(0.0, 80.0));

        let mut hits = 0;
        for _ in 0..2000 {
            hits += world.tick().manifolds.len();
        }
        let y = world.body(ball).unwrap().position().y.to_f64();
        assert!(hits > 0);
        assert!(y > 85.0 && y < 92.0, "ball rested at {y}");
    }

    #[test]
    fn test_sensor_reports_contact_without_response() {
        let mut world = World::new(weightless()).unwrap();
        let sensor = world.add_body(
            Actor::new(
                ActorConfig::rectangle(Vector2::ZERO, fx(10.0), fx(10.0), Fixed::ZERO)
                    .fixed()
                    .sensor(),
            )
            .unwrap(),
        );
        let ball = world.add_body(ball_at(-20.0, 0.0));
        world.body_mut(ball).unwrap().set_velocity(Vector2::from_int(1, 0));

        let mut contacts = Vec::new();
        for _ in 0..40 {
            let report = world.tick();
            assert!(report.manifolds.is_empty());
            contacts.extend(report.contacts);
        }
        assert!(contacts.iter().any(|c| c.involves(sensor) && c.other(sensor) == Some(ball)));
        assert_eq!(world.body(ball).unwrap().velocity(), Vector2::from_int(1, 0));
    }

    #[test]
    fn test_identical_worlds_stay_identical() {
        let build = || {
            let mut world = World::new(PhysicsConfig::default()).unwrap();
            world.add_body(
                Actor::new(
                    ActorConfig::rectangle(Vector2::from_int(0, 60), fx(100.0), fx(4.0), fx(0.2))
                        .fixed(),
                )
                .unwrap(),
            );
            for i in 0..5 {
                world.add_body(ball_at(i as f64 * 11.0 - 22.0, 0.0));
            }
            world
        };
        let mut first = build();
        let mut second = build();
        for _ in 0..500 {
            first.step(16);
            second.step(16);
        }
        let a: Vec<_> = first.iter().map(|(_, actor)| actor.position()).collect();
        let b: Vec<_> = second.iter().map(|(_, actor)| actor.position()).collect();
        assert_eq!(a, b);
    }
}
