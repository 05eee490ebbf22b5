//! Plane representation and point classification.

use crate::traits::{length, Position};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is behind the plane (negative side of normal)
    Behind,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
    /// Point is in front of the plane (positive side of normal)
    InFront,
}

impl PlaneSide {
    /// Classifies a signed distance with the given tolerance.
    #[inline]
    pub fn from_distance(distance: f32, epsilon: f32) -> Self {
        if distance > epsilon {
            Self::InFront
        } else if distance < -epsilon {
            Self::Behind
        } else {
            Self::OnPlane
        }
    }

    /// Returns `true` if the two sides are strictly opposite (behind vs. in front).
    #[inline]
    pub fn opposes(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Behind, Self::InFront) | (Self::InFront, Self::Behind)
        )
    }
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane<P> {
    normal: P,
    offset: f32,
}

impl<P: Position> Plane<P> {
    /// Creates a plane from a normal and offset as given, without normalizing.
    pub fn new(normal: P, offset: f32) -> Self {
        Self { normal, offset }
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a),
    /// and is normalized so that distances are in model units.
    ///
    /// Returns `None` if the points are collinear (or nearly so). The test
    /// compares the angle at `a`, not the area, so it holds at any model scale.
    pub fn from_points(a: P, b: P, c: P) -> Option<Self> {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        let norm = length(&normal);
        // |ab × ac| = |ab| |ac| sin(angle)
        if !norm.is_finite() || norm <= f32::EPSILON * length(&ab) * length(&ac) {
            return None;
        }
        let unit = normal * (1.0 / norm);
        Some(Self {
            normal: unit,
            offset: unit.dot(&a),
        })
    }

    /// Creates the zero plane used for nodes built from degenerate triangles.
    ///
    /// Every point has distance zero to it, so everything classifies as on the plane.
    pub fn degenerate(anchor: P) -> Self {
        Self {
            normal: anchor - anchor,
            offset: 0.0,
        }
    }

    /// Returns the normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> P {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: &P) -> f32 {
        self.normal.dot(point) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    #[inline]
    pub fn classify_point(&self, point: &P, epsilon: f32) -> PlaneSide {
        PlaneSide::from_distance(self.signed_distance(point), epsilon)
    }

    /// Returns `true` if `direction` points to the front side of the plane.
    #[inline]
    pub fn faces_same_direction(&self, direction: &P) -> bool {
        self.normal.dot(direction) > 0.0
    }
}
