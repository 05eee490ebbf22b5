//! Indexed triangles and their classification against a plane.

use crate::plane::{Plane, PlaneSide};
use crate::traits::{Position, Vertex};

/// A triangle as three indices into a shared vertex buffer.
pub type Triangle = [u32; 3];

/// Coarse classification of a triangle relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleClassification {
    /// No corner is in front, at least one is behind
    Behind,
    /// No corner is behind, at least one is in front
    InFront,
    /// All corners lie on the plane (coplanar)
    OnPlane,
    /// Corners on both sides (spans the plane)
    Spanning,
}

/// The split-type encoding: the side of each of the three corners, in winding order.
///
/// The 27 combinations collapse to the four [`TriangleClassification`]s and,
/// for spanning triangles, select one of the twelve retriangulation cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitType(pub [PlaneSide; 3]);

impl SplitType {
    /// Classifies the corners with the given signed distances.
    pub fn from_distances(distances: [f32; 3], epsilon: f32) -> Self {
        Self(distances.map(|d| PlaneSide::from_distance(d, epsilon)))
    }

    /// Returns the corner sides.
    #[inline]
    pub fn sides(&self) -> [PlaneSide; 3] {
        self.0
    }

    /// Collapses the corner sides into an outcome class.
    pub fn classification(&self) -> TriangleClassification {
        let mut behind = 0;
        let mut infront = 0;
        for side in self.0 {
            match side {
                PlaneSide::Behind => behind += 1,
                PlaneSide::InFront => infront += 1,
                PlaneSide::OnPlane => {}
            }
        }

        match (behind, infront) {
            (0, 0) => TriangleClassification::OnPlane,
            (_, 0) => TriangleClassification::Behind,
            (0, _) => TriangleClassification::InFront,
            _ => TriangleClassification::Spanning,
        }
    }

    /// Predicts how many triangles end up `(behind, infront)` if this triangle is partitioned.
    ///
    /// A spanning triangle with one corner on the plane yields one piece per side;
    /// otherwise the side holding two corners receives two pieces.
    pub fn fragment_counts(&self) -> (usize, usize) {
        match self.classification() {
            TriangleClassification::OnPlane => (0, 0),
            TriangleClassification::Behind => (1, 0),
            TriangleClassification::InFront => (0, 1),
            TriangleClassification::Spanning => {
                let behind = self.0.iter().filter(|s| **s == PlaneSide::Behind).count();
                let infront = self.0.iter().filter(|s| **s == PlaneSide::InFront).count();
                match (behind, infront) {
                    (1, 1) => (1, 1),
                    (2, 1) => (2, 1),
                    _ => (1, 2),
                }
            }
        }
    }
}

/// Returns the positions of a triangle's corners.
#[inline]
pub fn corner_positions<V: Vertex>(vertices: &[V], triangle: &Triangle) -> [V::Position; 3] {
    triangle.map(|i| vertices[i as usize].position())
}

/// Signed distances of a triangle's corners to a plane.
#[inline]
pub fn corner_distances<V: Vertex>(
    vertices: &[V],
    triangle: &Triangle,
    plane: &Plane<V::Position>,
) -> [f32; 3] {
    corner_positions(vertices, triangle).map(|p| plane.signed_distance(&p))
}

/// Classifies a triangle relative to a plane.
pub fn classify<V: Vertex>(
    vertices: &[V],
    triangle: &Triangle,
    plane: &Plane<V::Position>,
    epsilon: f32,
) -> SplitType {
    SplitType::from_distances(corner_distances(vertices, triangle, plane), epsilon)
}

/// Returns the plane the triangle lies on, or `None` for degenerate triangles.
pub fn plane_of<V: Vertex>(vertices: &[V], triangle: &Triangle) -> Option<Plane<V::Position>> {
    let [a, b, c] = corner_positions(vertices, triangle);
    Plane::from_points(a, b, c)
}

/// Computes the (unnormalized) normal vector of the triangle.
///
/// The direction follows the right-hand rule based on vertex winding.
pub fn normal<V: Vertex>(vertices: &[V], triangle: &Triangle) -> V::Position {
    let [a, b, c] = corner_positions(vertices, triangle);
    (b - a).cross(&(c - a))
}

/// Computes the area of the triangle.
#[cfg(test)]
pub(crate) fn area<V: Vertex>(vertices: &[V], triangle: &Triangle) -> f32 {
    let n = normal(vertices, triangle);
    0.5 * n.dot(&n).sqrt()
}
