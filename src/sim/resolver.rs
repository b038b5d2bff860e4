//! Collision response
//!
//! Turns a manifold into position and velocity changes for both actors.
//! Restitution combines as the sum of both coefficients, so two 0.4 bodies
//! bounce at 0.8. Friction combines as `1 - (fa + fb)` clamped to [0, 1] and
//! scales the tangential velocity.

use super::actor::Actor;
use super::collision::Manifold;
use crate::fixed::Fixed;
use crate::vector::Vector2;

/// What a resolution did, for hosts that care about impacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Both bodies approached: corrected and given new velocities
    Impulse,
    /// Bodies were already separating: positions corrected only
    Separating,
    /// Neither body can move
    Immovable,
}

/// Resolve one manifold. `a` and `b` must be the actors named by
/// `manifold.a` and `manifold.b`.
pub fn resolve(manifold: &Manifold, a: &mut Actor, b: &mut Actor) -> Resolution {
    let sum_inverse_mass = a.inverse_mass() + b.inverse_mass();
    if sum_inverse_mass.is_zero() {
        return Resolution::Immovable;
    }

    let normal = manifold.normal;
    let mtd = manifold.mtd();
    let mtd_a = mtd * (a.inverse_mass() / sum_inverse_mass);
    let mtd_b = -(mtd * (b.inverse_mass() / sum_inverse_mass));

    let relative_normal_velocity = (a.velocity() - b.velocity()).dot(normal);
    if relative_normal_velocity.is_positive() {
        apply(a, mtd_a, None);
        apply(b, mtd_b, None);
        return Resolution::Separating;
    }

    let restitution = a.restitution() + b.restitution();
    let tangent_keep = (Fixed::ONE - (a.friction() + b.friction())).clamp(Fixed::ZERO, Fixed::ONE);

    let (vn_a, vt_a) = a.velocity_components(normal);
    let (vn_b, vt_b) = b.velocity_components(normal);

    // One-dimensional restitution law along the normal, written with inverse
    // masses so a fixed body (inverse mass zero) reflects the other cleanly
    let new_vn_a = (vn_b * ((restitution + Fixed::ONE) * a.inverse_mass())
        + vn_a * (b.inverse_mass() - restitution * a.inverse_mass()))
        / sum_inverse_mass;
    let new_vn_b = (vn_a * ((restitution + Fixed::ONE) * b.inverse_mass())
        + vn_b * (a.inverse_mass() - restitution * b.inverse_mass()))
        / sum_inverse_mass;

    apply(a, mtd_a, Some(new_vn_a + vt_a * tangent_keep));
    apply(b, mtd_b, Some(new_vn_b + vt_b * tangent_keep));
    Resolution::Impulse
}

fn apply(actor: &mut Actor, mtd: Vector2, velocity: Option<Vector2>) {
    if !actor.is_fixed() {
        actor.resolve(mtd, velocity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::{ActorConfig, ActorHandle};
    use crate::sim::collision::detect;

    fn fx(v: f64) -> Fixed {
        Fixed::from_f64(v)
    }

    fn ball(x: f64, vx: f64, mass: f64, restitution: f64) -> Actor {
        let mut actor = Actor::new(
            ActorConfig::circle(Vector2::from_f64(x, 0.0), Fixed::ONE)
                .with_mass(fx(mass))
                .with_material(fx(restitution), Fixed::ZERO),
        )
        .unwrap();
        actor.set_velocity(Vector2::from_f64(vx, 0.0));
        actor
    }

    fn collide(a: &mut Actor, b: &mut Actor) -> Resolution {
        let manifold = detect(ActorHandle(1), a, ActorHandle(2), b).unwrap();
        resolve(&manifold, a, b)
    }

    fn close(a: Fixed, b: f64) -> bool {
        (a.to_f64() - b).abs() < 0.01
    }

    #[test]
    fn test_elastic_equal_mass_swaps_velocities() {
        let mut a = ball(0.0, 2.0, 1.0, 0.5);
        let mut b = ball(1.9, -1.0, 1.0, 0.5);
        assert_eq!(collide(&mut a, &mut b), Resolution::Impulse);
        assert!(close(a.velocity().x, -1.0));
        assert!(close(b.velocity().x, 2.0));
    }

    #[test]
    fn test_restitution_is_summed() {
        let mut a = ball(0.0, 2.0, 1.0, 0.0);
        let mut b = ball(1.9, -2.0, 1.0, 0.0);
        collide(&mut a, &mut b);
        // Perfectly inelastic equal masses meet in the middle
        assert!(close(a.velocity().x, 0.0));
        assert!(close(b.velocity().x, 0.0));
    }

    #[test]
    fn test_fixed_wall_reflects_ball() {
        let mut wall = Actor::new(
            ActorConfig::rectangle(Vector2::from_int(3, 0), fx(2.0), fx(20.0), Fixed::ZERO)
                .fixed()
                .with_material(fx(0.5), Fixed::ZERO),
        )
        .unwrap();
        let mut b = ball(1.5, 4.0, 1.0, 0.3);
        collide(&mut wall, &mut b);
        assert_eq!(wall.position(), Vector2::from_int(3, 0));
        assert!(close(b.velocity().x, -3.2));
        // Pushed fully out of the wall
        assert!(close(b.position().x, 1.0));
    }

    #[test]
    fn test_mtd_split_by_inverse_mass() {
        let mut light = ball(0.0, 0.0, 1.0, 0.0);
        let mut heavy = ball(1.0, 0.0, 3.0, 0.0);
        collide(&mut light, &mut heavy);
        // Depth 1: the light body takes three quarters of the correction
        assert!(close(light.position().x, -0.75));
        assert!(close(heavy.position().x, 1.25));
    }

    #[test]
    fn test_separating_bodies_keep_velocity() {
        let mut a = ball(0.0, -1.0, 1.0, 0.5);
        let mut b = ball(1.5, 1.0, 1.0, 0.5);
        assert_eq!(collide(&mut a, &mut b), Resolution::Separating);
        assert!(close(a.velocity().x, -1.0));
        assert!(close(b.velocity().x, 1.0));
        assert!(close(b.position().x - a.position().x, 2.0));
        assert!(!a.is_colliding());
    }

    #[test]
    fn test_friction_scales_tangential_velocity() {
        let mut floor = Actor::new(
            ActorConfig::rectangle(Vector2::ZERO, fx(40.0), fx(2.0), Fixed::ZERO)
                .fixed()
                .with_material(Fixed::ZERO, fx(0.25)),
        )
        .unwrap();
        let mut puck = Actor::new(
            ActorConfig::circle(Vector2::from_f64(0.0, -1.9), Fixed::ONE)
                .with_material(Fixed::ZERO, fx(0.25)),
        )
        .unwrap();
        puck.set_velocity(Vector2::from_f64(4.0, 1.0));
        collide(&mut floor, &mut puck);
        assert!(close(puck.velocity().x, 2.0));
        assert!(close(puck.velocity().y, 0.0));
    }
}
