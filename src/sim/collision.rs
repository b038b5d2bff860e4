//! Narrow-phase collision detection
//!
//! Picks a test by shape pair: circle/circle, box/circle (either order,
//! always run box-first), or box/box. Boxes use the separating-axis test on
//! their own axes and keep the axis of least penetration.

use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorHandle};
use super::shape::{Interval, OrientedBox, Shape};
use crate::fixed::Fixed;
use crate::vector::Vector2;

/// Result of one overlapping pair, consumed by the resolver in the same tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifold {
    pub a: ActorHandle,
    pub b: ActorHandle,
    /// Unit normal pointing from `b` toward `a`: moving `a` along it (and `b`
    /// against it) separates the pair
    pub normal: Vector2,
    /// Penetration depth, always positive
    pub depth: Fixed,
    pub contact: Vector2,
}

impl Manifold {
    /// Minimum translation distance for `a`
    pub fn mtd(&self) -> Vector2 {
        self.normal * self.depth
    }

    pub fn involves(&self, handle: ActorHandle) -> bool {
        self.a == handle || self.b == handle
    }

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

/// Geometry-only part of a hit, before the handles are attached
#[derive(Debug, Clone, Copy, PartialEq)]
struct Contact {
    normal: Vector2,
    depth: Fixed,
    point: Vector2,
}

/// Pairs that never need a test
pub fn should_test(a: &Actor, b: &Actor) -> bool {
    !(a.is_fixed() && b.is_fixed()) && a.is_collidable() && b.is_collidable()
}

/// Test two actors and build a manifold if they overlap
pub fn detect(
    handle_a: ActorHandle,
    a: &Actor,
    handle_b: ActorHandle,
    b: &Actor,
) -> Option<Manifold> {
    if !should_test(a, b) {
        return None;
    }
    let (pa, pb) = (a.position(), b.position());
    let (first, second, contact) = match (a.shape(), b.shape()) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            (handle_a, handle_b, circle_circle(pa, *ra, pb, *rb)?)
        }
        (Shape::OrientedBox(obb), Shape::Circle { radius }) => {
            (handle_a, handle_b, box_circle(pa, obb, pb, *radius)?)
        }
        (Shape::Circle { radius }, Shape::OrientedBox(obb)) => {
            (handle_b, handle_a, box_circle(pb, obb, pa, *radius)?)
        }
        (Shape::OrientedBox(box_a), Shape::OrientedBox(box_b)) => {
            (handle_a, handle_b, box_box(pa, box_a, pb, box_b)?)
        }
    };
    Some(Manifold {
        a: first,
        b: second,
        normal: contact.normal,
        depth: contact.depth,
        contact: contact.point,
    })
}

fn axis_interval(center: Fixed, radius: Fixed) -> Interval {
    Interval::new(center - radius, center + radius)
}

/// Turn a signed axis overlap into an outward normal and positive depth
fn oriented(axis: Vector2, signed_depth: Fixed) -> (Vector2, Fixed) {
    if signed_depth.is_negative() {
        (-axis, -signed_depth)
    } else {
        (axis, signed_depth)
    }
}

/// Direction of `delta`, or +x when it has no length
fn direction_or_default(delta: Vector2, length: Fixed) -> Vector2 {
    if length.is_zero() {
        Vector2::UNIT_X
    } else {
        delta / length
    }
}

fn circle_circle(pa: Vector2, ra: Fixed, pb: Vector2, rb: Fixed) -> Option<Contact> {
    // Cheap per-axis rejection before the square root
    if axis_interval(pa.x, ra)
        .overlap_depth(axis_interval(pb.x, rb))
        .is_zero()
    {
        return None;
    }
    if axis_interval(pa.y, ra)
        .overlap_depth(axis_interval(pb.y, rb))
        .is_zero()
    {
        return None;
    }

    let delta = pa - pb;
    let distance = delta.magnitude();
    let depth = ra + rb - distance;
    if !depth.is_positive() {
        return None;
    }
    let normal = direction_or_default(delta, distance);
    Some(Contact {
        normal,
        depth,
        point: pa - normal * ra,
    })
}

fn box_box(pa: Vector2, a: &OrientedBox, pb: Vector2, b: &OrientedBox) -> Option<Contact> {
    let shape_a = Shape::OrientedBox(*a);
    let shape_b = Shape::OrientedBox(*b);

    let mut best: Option<(Vector2, Fixed)> = None;
    for i in 0..2 {
        for axis in [a.axes()[i], b.axes()[i]] {
            let depth = shape_a
                .projection(pa, axis)
                .overlap_depth(shape_b.projection(pb, axis));
            if depth.is_zero() {
                return None;
            }
            if best.is_none_or(|(_, best_depth)| depth.abs() < best_depth.abs()) {
                best = Some((axis, depth));
            }
        }
    }

    let (axis, signed_depth) = best?;
    let (normal, depth) = oriented(axis, signed_depth);
    // The corner of b reaching furthest into a
    let point = b
        .vertices(pb)
        .into_iter()
        .max_by_key(|v| v.dot(normal))
        .unwrap_or(pb);
    Some(Contact {
        normal,
        depth,
        point,
    })
}

fn box_circle(pa: Vector2, obb: &OrientedBox, pb: Vector2, radius: Fixed) -> Option<Contact> {
    let shape_a = Shape::OrientedBox(*obb);
    let shape_b = Shape::circle(radius);

    let mut best: Option<(Vector2, Fixed)> = None;
    let mut depths = [Fixed::ZERO; 2];
    for (i, axis) in obb.axes().into_iter().enumerate() {
        let depth = shape_a
            .projection(pa, axis)
            .overlap_depth(shape_b.projection(pb, axis));
        if depth.is_zero() {
            return None;
        }
        if best.is_none_or(|(_, best_depth)| depth.abs() < best_depth.abs()) {
            best = Some((axis, depth));
        }
        depths[i] = depth;
    }

    // Shallow on both axes: the circle sits off a corner
    if depths[0].abs() < radius && depths[1].abs() < radius {
        let vertex = obb.closest_vertex(pa, pb);
        let delta = vertex - pb;
        let distance = delta.magnitude();
        let depth = radius - distance;
        if !depth.is_positive() {
            return None;
        }
        return Some(Contact {
            normal: direction_or_default(delta, distance),
            depth,
            point: vertex,
        });
    }

    let (axis, signed_depth) = best?;
    let (normal, depth) = oriented(axis, signed_depth);
    Some(Contact {
        normal,
        depth,
        point: pb + normal * radius,
    })
}
