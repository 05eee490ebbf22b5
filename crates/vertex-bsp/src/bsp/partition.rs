//! Separation of a triangle set by a partitioning plane.

use crate::cuttable::{cut_triangle, Cut};
use crate::traits::Vertex;
use crate::{BspError, Plane};

use super::selector::triangles;

/// Triangles of one node's input, sorted by side of the node's plane.
///
/// Each list is a flat index list, three indices per triangle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Triangles (or fragments) behind the plane.
    pub behind: Vec<u32>,
    /// Triangles (or fragments) in front of the plane.
    pub infront: Vec<u32>,
    /// Triangles lying on the plane.
    pub on_plane: Vec<u32>,
}

/// Separates the triangles in `indices` into behind, in front and on `plane`.
///
/// Spanning triangles are cut and their fragments added to the proper lists;
/// new vertices are appended to `vertices`. The triangle at position `pivot`,
/// if given, always goes on the plane, which guarantees every partition step
/// removes at least one triangle from the remaining set.
pub fn separate_triangles<V: Vertex>(
    vertices: &mut Vec<V>,
    plane: &Plane<V::Position>,
    indices: &[u32],
    pivot: Option<usize>,
    epsilon: f32,
) -> Result<Partition, BspError> {
    let mut partition = Partition::default();

    for (position, triangle) in triangles(indices).enumerate() {
        if pivot == Some(position) {
            partition.on_plane.extend_from_slice(&triangle);
            continue;
        }

        match cut_triangle(vertices, plane, triangle, epsilon)? {
            Cut::Behind => partition.behind.extend_from_slice(&triangle),
            Cut::InFront => partition.infront.extend_from_slice(&triangle),
            Cut::OnPlane => partition.on_plane.extend_from_slice(&triangle),
            Cut::Split { behind, infront } => {
                partition.behind.extend(behind.iter().flatten());
                partition.infront.extend(infront.iter().flatten());
            }
        }
    }

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangle::area;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::Vector3;

    const EPS: f32 = 1e-5;

    #[test]
    fn splits_a_crossing_triangle_into_three() {
        // T3 crossed by the plane x = 0 of a wall triangle
        let mut vertices = vec![
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(2.0, -1.0, 0.0),
            Vector3::new(0.5, 2.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
        ];
        let wall = [3u32, 4, 5];
        let plane = crate::triangle::plane_of(&vertices, &wall).unwrap();

        let partition =
            separate_triangles(&mut vertices, &plane, &[0, 1, 2, 3, 4, 5], Some(1), EPS).unwrap();

        assert_eq!(partition.on_plane, vec![3, 4, 5]);
        let fragments = (partition.behind.len() + partition.infront.len()) / 3;
        assert_eq!(fragments, 3);
        assert!(
            (partition.behind.len(), partition.infront.len()) == (3, 6)
                || (partition.behind.len(), partition.infront.len()) == (6, 3)
        );

        // exactly two interpolated vertices, both on x = 0
        assert_eq!(vertices.len(), 8);
        for v in &vertices[6..] {
            assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-6);
        }

        let pieces = partition.behind.iter().chain(partition.infront.iter()).copied().collect::<Vec<_>>();
        let fragment_area: f32 = pieces.chunks_exact(3).map(|t| area(&vertices, &[t[0], t[1], t[2]])).sum();
        assert_relative_eq!(fragment_area, area(&vertices, &[0, 1, 2]), max_relative = 1e-5);
    }

    #[test]
    fn pivot_is_forced_on_plane() {
        let mut vertices = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        // a plane the pivot does not actually lie on
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), 10.0);

        let partition = separate_triangles(&mut vertices, &plane, &[0, 1, 2], Some(0), EPS).unwrap();
        assert_eq!(partition.on_plane, vec![0, 1, 2]);
        assert!(partition.behind.is_empty());

        let partition = separate_triangles(&mut vertices, &plane, &[0, 1, 2], None, EPS).unwrap();
        assert_eq!(partition.behind, vec![0, 1, 2]);
    }

    #[test]
    fn unmodified_triangles_keep_their_indices() {
        let mut vertices = vec![
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(1.0, 0.0, -1.0),
            Vector3::new(0.0, 1.0, -1.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 1.0),
        ];
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), 0.0);

        let partition =
            separate_triangles(&mut vertices, &plane, &[0, 1, 2, 3, 4, 5], None, EPS).unwrap();
        assert_eq!(partition.behind, vec![0, 1, 2]);
        assert_eq!(partition.infront, vec![3, 4, 5]);
        assert!(partition.on_plane.is_empty());
        assert_eq!(vertices.len(), 6);
    }
}
