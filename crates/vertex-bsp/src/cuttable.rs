//! Triangle cutting: retriangulation of an indexed triangle against a plane.

use smallvec::{smallvec, SmallVec};

use crate::plane::{Plane, PlaneSide};
use crate::triangle::{corner_distances, SplitType, Triangle, TriangleClassification};
use crate::traits::Vertex;
use crate::BspError;

/// Up to two triangles produced on one side of a cut.
pub type Fragments = SmallVec<[Triangle; 2]>;

/// Outcome of cutting one triangle by a plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cut {
    /// The whole triangle is behind the plane.
    Behind,
    /// The whole triangle is in front of the plane.
    InFront,
    /// The triangle lies on the plane.
    OnPlane,
    /// The triangle was split; the pieces keep the original winding.
    Split {
        /// Pieces behind the plane.
        behind: Fragments,
        /// Pieces in front of the plane.
        infront: Fragments,
    },
}

/// Fraction along an edge where the signed distance crosses zero.
///
/// Assumes `a` and `b` have opposite signs, so the denominator is not zero.
#[inline]
fn relation(a: f32, b: f32) -> f32 {
    a.abs() / (a.abs() + b.abs())
}

/// Appends a vertex to the buffer and returns its index.
fn push_vertex<V: Vertex>(vertices: &mut Vec<V>, vertex: V) -> Result<u32, BspError> {
    let index = u32::try_from(vertices.len()).map_err(|_| BspError::IndexOverflow)?;
    vertices.push(vertex);
    Ok(index)
}

/// Cuts a triangle by a plane.
///
/// Whole triangles are reported by side without touching the buffer. For a
/// spanning triangle a new vertex is appended for every edge whose endpoints
/// lie strictly on opposite sides, interpolated at `|d_a| / (|d_a| + |d_b|)`
/// from `a` toward `b`, and the triangle is retriangulated into one piece per
/// side (one corner on the plane) or two plus one pieces (no corner on it).
pub fn cut_triangle<V: Vertex>(
    vertices: &mut Vec<V>,
    plane: &Plane<V::Position>,
    triangle: Triangle,
    epsilon: f32,
) -> Result<Cut, BspError> {
    let dist = corner_distances(vertices, &triangle, plane);
    let split = SplitType::from_distances(dist, epsilon);

    match split.classification() {
        TriangleClassification::Behind => return Ok(Cut::Behind),
        TriangleClassification::InFront => return Ok(Cut::InFront),
        TriangleClassification::OnPlane => return Ok(Cut::OnPlane),
        TriangleClassification::Spanning => {}
    }

    let side = split.sides();
    let [i0, i1, i2] = triangle;

    // Intersection vertices on edges 0-1, 1-2 and 2-0, created only where the edge crosses.
    let mut cross = [0u32; 3];
    for edge in 0..3 {
        let next = (edge + 1) % 3;
        if side[edge].opposes(side[next]) {
            let a = &vertices[triangle[edge] as usize];
            let b = &vertices[triangle[next] as usize];
            let v = a.interpolate(b, relation(dist[edge], dist[next]));
            cross[edge] = push_vertex(vertices, v)?;
        }
    }
    let [a01, a12, a20] = cross;

    use PlaneSide::{Behind as B, InFront as F, OnPlane as O};
    let (behind, infront): (Fragments, Fragments) = match side {
        // one corner on the plane, one piece per side
        [F, B, O] => (smallvec![[i1, i2, a01]], smallvec![[i2, i0, a01]]),
        [B, O, F] => (smallvec![[i0, i1, a20]], smallvec![[i1, i2, a20]]),
        [O, F, B] => (smallvec![[i2, i0, a12]], smallvec![[i0, i1, a12]]),
        [B, F, O] => (smallvec![[i2, i0, a01]], smallvec![[i1, i2, a01]]),
        [F, O, B] => (smallvec![[i1, i2, a20]], smallvec![[i0, i1, a20]]),
        [O, B, F] => (smallvec![[i0, i1, a12]], smallvec![[i2, i0, a12]]),

        // one corner alone on its side
        [F, B, B] => (
            smallvec![[i1, a20, a01], [i1, i2, a20]],
            smallvec![[i0, a01, a20]],
        ),
        [B, F, B] => (
            smallvec![[i2, a01, a12], [i2, i0, a01]],
            smallvec![[i1, a12, a01]],
        ),
        [B, B, F] => (
            smallvec![[i0, a12, a20], [i0, i1, a12]],
            smallvec![[i2, a20, a12]],
        ),
        [B, F, F] => (
            smallvec![[i0, a01, a20]],
            smallvec![[i1, a20, a01], [i1, i2, a20]],
        ),
        [F, B, F] => (
            smallvec![[i1, a12, a01]],
            smallvec![[i0, a01, a12], [i2, i0, a12]],
        ),
        [F, F, B] => (
            smallvec![[i2, a20, a12]],
            smallvec![[i0, a12, a20], [i0, i1, a12]],
        ),

        // classification() only reports Spanning for the twelve cases above
        _ => unreachable!("non-spanning split type {side:?}"),
    };

    Ok(Cut::Split { behind, infront })
}
