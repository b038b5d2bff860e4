//! Shape descriptors: circles and oriented boxes
//!
//! A box keeps its two unit axes alongside its half extents. The axes follow
//! the owning actor's angle and are recomputed every time the angle changes.

use serde::{Deserialize, Serialize};

use crate::fixed::Fixed;
use crate::vector::Vector2;

/// Projection of a shape onto an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub min: Fixed,
    pub max: Fixed,
}

impl Interval {
    pub fn new(min: Fixed, max: Fixed) -> Self {
        Self { min, max }
    }

    /// Signed overlap with `other`, zero when separated or exactly touching.
    ///
    /// The sign says which way `self` must move along the axis to separate:
    /// positive pushes it toward +axis, negative toward -axis.
    pub fn overlap_depth(self, other: Interval) -> Fixed {
        if self.max <= other.min || other.max <= self.min {
            return Fixed::ZERO;
        }
        let push_positive = other.max - self.min;
        let push_negative = other.min - self.max;
        if push_positive.abs() < push_negative.abs() {
            push_positive
        } else {
            push_negative
        }
    }
}

/// Axis-aligned bounds, cached on actors for broad-phase and viewport use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vector2,
    pub max: Vector2,
}

impl Aabb {
    pub fn from_center(center: Vector2, half_size: Vector2) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Inclusive test; exact-touch rejection is left to the narrow phase
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn contains(&self, point: Vector2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// A rectangle free to take any angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrientedBox {
    pub half_extents: Vector2,
    pub axis_x: Vector2,
    pub axis_y: Vector2,
}

impl OrientedBox {
    pub fn new(width: Fixed, height: Fixed, angle: Fixed) -> Self {
        let mut obb = Self {
            half_extents: Vector2::new(width * Fixed::HALF, height * Fixed::HALF),
            axis_x: Vector2::UNIT_X,
            axis_y: Vector2::UNIT_Y,
        };
        obb.set_angle(angle);
        obb
    }

    pub fn set_angle(&mut self, angle: Fixed) {
        let (sin, cos) = (angle.sin(), angle.cos());
        self.axis_x = Vector2::new(cos, sin);
        self.axis_y = Vector2::new(-sin, cos);
    }

    #[inline]
    pub fn axes(&self) -> [Vector2; 2] {
        [self.axis_x, self.axis_y]
    }

    #[inline]
    pub fn extents(&self) -> [Fixed; 2] {
        [self.half_extents.x, self.half_extents.y]
    }

    /// Half-length of the box's shadow on `axis`
    pub fn projection_radius(&self, axis: Vector2) -> Fixed {
        self.half_extents.x * axis.dot(self.axis_x).abs()
            + self.half_extents.y * axis.dot(self.axis_y).abs()
    }

    pub fn vertices(&self, center: Vector2) -> [Vector2; 4] {
        let ex = self.axis_x * self.half_extents.x;
        let ey = self.axis_y * self.half_extents.y;
        [
            center - ex - ey,
            center + ex - ey,
            center + ex + ey,
            center - ex + ey,
        ]
    }

    /// Corner of the box (centered at `center`) nearest to `point`
    pub fn closest_vertex(&self, center: Vector2, point: Vector2) -> Vector2 {
        let offset = point - center;
        let mut vertex = center;
        for (axis, extent) in self.axes().into_iter().zip(self.extents()) {
            let along = if offset.dot(axis).is_negative() {
                -extent
            } else {
                extent
            };
            vertex += axis * along;
        }
        vertex
    }
}

/// Geometry owned by an actor, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: Fixed },
    OrientedBox(OrientedBox),
}

impl Shape {
    pub fn circle(radius: Fixed) -> Self {
        Shape::Circle { radius }
    }

    pub fn rectangle(width: Fixed, height: Fixed, angle: Fixed) -> Self {
        Shape::OrientedBox(OrientedBox::new(width, height, angle))
    }

    /// Refresh orientation-dependent data; circles have none
    pub fn set_angle(&mut self, angle: Fixed) {
        if let Shape::OrientedBox(obb) = self {
            obb.set_angle(angle);
        }
    }

    pub fn projection(&self, center: Vector2, axis: Vector2) -> Interval {
        let c = center.dot(axis);
        let radius = match self {
            Shape::Circle { radius } => *radius,
            Shape::OrientedBox(obb) => obb.projection_radius(axis),
        };
        Interval::new(c - radius, c + radius)
    }

    pub fn bounds(&self, center: Vector2) -> Aabb {
        let half_size = match self {
            Shape::Circle { radius } => Vector2::new(*radius, *radius),
            Shape::OrientedBox(obb) => Vector2::new(
                obb.projection_radius(Vector2::UNIT_X),
                obb.projection_radius(Vector2::UNIT_Y),
            ),
        };
        Aabb::from_center(center, half_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fx(v: f64) -> Fixed {
        Fixed::from_f64(v)
    }

    #[test]
    fn test_interval_overlap_sign() {
        let a = Interval::new(fx(0.0), fx(10.0));
        // b overlaps a's right side: a must move left by 2
        let b = Interval::new(fx(8.0), fx(18.0));
        assert_eq!(a.overlap_depth(b), fx(-2.0));
        // and b must move right by 2
        assert_eq!(b.overlap_depth(a), fx(2.0));
    }

    #[test]
    fn test_interval_touching_is_zero() {
        let a = Interval::new(fx(0.0), fx(10.0));
        let b = Interval::new(fx(10.0), fx(20.0));
        assert_eq!(a.overlap_depth(b), Fixed::ZERO);
        assert_eq!(b.overlap_depth(a), Fixed::ZERO);
        let far = Interval::new(fx(30.0), fx(40.0));
        assert_eq!(a.overlap_depth(far), Fixed::ZERO);
    }

    #[test]
    fn test_box_vertices_axis_aligned() {
        let obb = OrientedBox::new(fx(4.0), fx(2.0), Fixed::ZERO);
        let verts = obb.vertices(Vector2::from_int(10, 10));
        assert_eq!(verts[0], Vector2::from_int(8, 9));
        assert_eq!(verts[2], Vector2::from_int(12, 11));
    }

    #[test]
    fn test_box_axes_follow_angle() {
        let mut shape = Shape::rectangle(fx(4.0), fx(2.0), Fixed::ZERO);
        shape.set_angle(Fixed::PI / Fixed::from_int(2));
        let Shape::OrientedBox(obb) = shape else {
            panic!("expected a box");
        };
        assert!(obb.axis_x.x.abs() < fx(0.001));
        assert!((obb.axis_x.y - Fixed::ONE).abs() < fx(0.001));
        assert!((obb.axis_y.x + Fixed::ONE).abs() < fx(0.001));
    }

    #[test]
    fn test_closest_vertex() {
        let obb = OrientedBox::new(fx(4.0), fx(4.0), Fixed::ZERO);
        let v = obb.closest_vertex(Vector2::ZERO, Vector2::from_int(5, -7));
        assert_eq!(v, Vector2::from_int(2, -2));
    }

    #[test]
    fn test_bounds_of_rotated_box() {
        let shape = Shape::rectangle(fx(2.0), fx(2.0), Fixed::PI / Fixed::from_int(4));
        let bounds = shape.bounds(Vector2::ZERO);
        // Diagonal half-length of a 2x2 square is sqrt(2)
        assert!((bounds.max.x.to_f64() - 2f64.sqrt()).abs() < 0.001);
        assert!((bounds.min.y.to_f64() + 2f64.sqrt()).abs() < 0.001);
    }

    #[test]
    fn test_circle_projection() {
        let shape = Shape::circle(fx(3.0));
        let interval = shape.projection(Vector2::from_int(5, 1), Vector2::UNIT_X);
        assert_eq!(interval, Interval::new(fx(2.0), fx(8.0)));
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::from_center(Vector2::ZERO, Vector2::from_int(1, 1));
        let b = Aabb::from_center(Vector2::from_int(2, 0), Vector2::from_int(1, 1));
        let c = Aabb::from_center(Vector2::from_int(3, 0), Vector2::from_int(1, 1));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(Vector2::from_f64(0.5, -0.5)));
    }
}
