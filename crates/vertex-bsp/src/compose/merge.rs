//! Grafting two trees under a bisector plane.

use tracing::{debug, instrument};

use crate::bsp::{BspNode, BspTree};
use crate::traits::{length, Position, Vertex};
use crate::{BspError, Plane};

use super::copy_subtree;

impl<V: Vertex> BspTree<V> {
    /// Combines two trees of separate parts into one tree without splitting
    /// any triangle.
    ///
    /// The new root holds no triangles; its plane bisects the segment between
    /// the centroids of the two vertex buffers, so each part ends up entirely
    /// on one side. The part behind the root is `lhs` if the centroids point
    /// in opposing directions from the origin and `rhs` otherwise. The root
    /// normal points from the part behind toward the part in front.
    ///
    /// The parts should not interpenetrate; if they do, the back-to-front order
    /// near the bisector is only approximate. If either tree is empty, the
    /// result is a copy of the other. Returns [`BspError::CoincidentParts`] if
    /// both centroids are the same point.
    #[instrument(level = "debug", skip_all, fields(lhs = lhs.triangle_count(), rhs = rhs.triangle_count()))]
    pub fn merge(lhs: &Self, rhs: &Self) -> Result<Self, BspError> {
        let config = *lhs.config();
        let (Some(lhs_centroid), Some(rhs_centroid)) = (centroid(lhs), centroid(rhs)) else {
            let source = if lhs.is_empty() { rhs } else { lhs };
            let mut vertices = Vec::new();
            let root = copy_subtree(source.root(), source.vertices(), &mut vertices)?;
            return Ok(BspTree::from_parts(vertices, root, config));
        };

        let (back, front, back_centroid, front_centroid) =
            if rhs_centroid.dot(&lhs_centroid) < 0.0 {
                (lhs, rhs, lhs_centroid, rhs_centroid)
            } else {
                (rhs, lhs, rhs_centroid, lhs_centroid)
            };

        let direction = front_centroid - back_centroid;
        let distance = length(&direction);
        if distance.is_nan() || distance <= f32::EPSILON {
            return Err(BspError::CoincidentParts);
        }
        let normal = direction * (1.0 / distance);
        let midpoint = (back_centroid + front_centroid) * 0.5;
        let plane = Plane::new(normal, normal.dot(&midpoint));

        let mut vertices = Vec::with_capacity(lhs.vertices().len() + rhs.vertices().len());
        let mut root = BspNode::new(plane);
        root.set_behind(copy_subtree(back.root(), back.vertices(), &mut vertices)?);
        root.set_infront(copy_subtree(front.root(), front.vertices(), &mut vertices)?);

        let tree = BspTree::from_parts(vertices, Some(root), config);
        debug!(
            vertices = tree.vertices().len(),
            depth = tree.depth(),
            "merged BSP trees"
        );
        Ok(tree)
    }
}

/// Average position of a non-empty tree's vertex buffer.
fn centroid<V: Vertex>(tree: &BspTree<V>) -> Option<V::Position> {
    if tree.is_empty() {
        return None;
    }
    let mut positions = tree.vertices().iter().map(Vertex::position);
    let first = positions.next()?;
    let sum = positions.fold(first, |acc, p| acc + p);
    Some(sum * (1.0 / tree.vertices().len() as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::fixtures::cuboid;
    use crate::triangle::area;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    type V3 = Vector3<f32>;

    /// Triangles of a tree as corner positions, sorted for comparison.
    fn corner_sets(tree: &BspTree<V3>) -> Vec<[[u32; 3]; 3]> {
        let mut result: Vec<[[u32; 3]; 3]> = tree
            .collect_indices()
            .chunks_exact(3)
            .map(|t| {
                let corner = |i: u32| {
                    let p = tree.vertices()[i as usize];
                    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
                };
                [corner(t[0]), corner(t[1]), corner(t[2])]
            })
            .collect();
        result.sort_unstable();
        result
    }

    #[test]
    fn merge_keeps_every_triangle_unsplit() {
        let left = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let right = cuboid([3.0, 0.0, 0.0], [4.0, 1.0, 1.0]);

        let merged = BspTree::merge(&left, &right).unwrap();

        assert_eq!(merged.triangle_count(), left.triangle_count() + right.triangle_count());
        assert!(merged.root().unwrap().triangles().is_empty());

        let mut expected = corner_sets(&left);
        expected.extend(corner_sets(&right));
        expected.sort_unstable();
        assert_eq!(corner_sets(&merged), expected);
    }

    #[test]
    fn bisector_separates_the_parts() {
        let left = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let right = cuboid([3.0, 0.0, 0.0], [4.0, 1.0, 1.0]);
        let merged = BspTree::merge(&left, &right).unwrap();

        let root = merged.root().unwrap();
        // centroids (0.5, .5, .5) and (3.5, .5, .5) point the same way: rhs goes behind
        assert_relative_eq!(root.plane().normal(), Vector3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(root.plane().offset(), -2.0);

        let behind = root.behind().unwrap();
        let infront = root.infront().unwrap();
        assert_eq!(behind.subtree_triangle_count(), 12);
        assert_eq!(infront.subtree_triangle_count(), 12);
        for &i in behind.triangles() {
            assert!(merged.vertices()[i as usize].x >= 3.0);
        }
    }

    #[test]
    fn merged_tree_draws_the_far_part_first() {
        let left = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let right = cuboid([3.0, 0.0, 0.0], [4.0, 1.0, 1.0]);
        let merged = BspTree::merge(&left, &right).unwrap();

        for (eye, far_is_left) in [(Vector3::new(10.0, 0.5, 0.5), true), (Vector3::new(-10.0, 0.5, 0.5), false)] {
            let order = merged.sort(&eye);
            let first_half = &order[..order.len() / 2];
            for &i in first_half {
                let x = merged.vertices()[i as usize].x;
                assert_eq!(x <= 1.0, far_is_left, "eye {eye:?}: vertex at x = {x} drawn early");
            }
        }
    }

    #[test]
    fn opposing_centroids_put_lhs_behind() {
        let left = cuboid([-2.0, -1.0, -1.0], [-1.0, 0.0, 0.0]);
        let right = cuboid([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);
        let merged = BspTree::merge(&left, &right).unwrap();

        let root = merged.root().unwrap();
        for &i in root.behind().unwrap().triangles() {
            assert!(merged.vertices()[i as usize].x <= -1.0);
        }
        assert!(root.plane().normal().x > 0.0);
    }

    #[test]
    fn merge_with_empty_copies_the_other() {
        let part = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let empty = BspTree::new();

        for merged in [BspTree::merge(&part, &empty).unwrap(), BspTree::merge(&empty, &part).unwrap()] {
            assert_eq!(merged.triangle_count(), 12);
            assert_eq!(merged.node_count(), part.node_count());
            assert_eq!(corner_sets(&merged), corner_sets(&part));
        }

        let both = BspTree::<V3>::merge(&empty, &empty).unwrap();
        assert!(both.is_empty());
    }

    #[test]
    fn coincident_centroids_are_rejected() {
        let part = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let result = BspTree::merge(&part, &part.clone());
        assert!(matches!(result, Err(BspError::CoincidentParts)));
    }

    #[test]
    fn merge_preserves_area() {
        let left = cuboid([0.0, 0.0, 0.0], [1.0, 2.0, 1.0]);
        let right = cuboid([0.0, 0.0, 5.0], [1.0, 1.0, 6.0]);
        let merged = BspTree::merge(&left, &right).unwrap();

        let total: f32 = merged
            .collect_indices()
            .chunks_exact(3)
            .map(|t| area(merged.vertices(), &[t[0], t[1], t[2]]))
            .sum();
        assert_relative_eq!(total, 10.0 + 6.0, max_relative = 1e-5);
    }
}
