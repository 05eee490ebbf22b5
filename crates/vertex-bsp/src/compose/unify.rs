//! Union of two closed solids by cross-classification against each other's tree.

use tracing::{debug, instrument, trace};

use crate::bsp::{triangles, BspNode, BspTree};
use crate::config::guard_stack;
use crate::cuttable::{cut_triangle, Cut};
use crate::traits::Vertex;
use crate::triangle::{normal, Triangle};
use crate::BspError;

impl<V: Vertex> BspTree<V> {
    /// Builds the tree of the union of two closed, outward-facing meshes.
    ///
    /// Triangles of each mesh are pushed through the other tree and kept
    /// where they end up outside of it. Faces shared by both meshes with the
    /// same orientation are kept once, from `lhs`; faces that touch with
    /// opposite orientations are interior to the union and dropped. A triangle
    /// that had to be split but survives whole is emitted unsplit.
    ///
    /// The result is rebuilt from scratch with the configuration of `lhs`. If
    /// either tree is empty, the result is a copy of the other.
    #[instrument(level = "debug", skip_all, fields(lhs = lhs.triangle_count(), rhs = rhs.triangle_count()))]
    pub fn unify(lhs: &Self, rhs: &Self) -> Result<Self, BspError> {
        let (Some(lhs_root), Some(rhs_root)) = (lhs.root(), rhs.root()) else {
            return Ok(if lhs.is_empty() { rhs.clone() } else { lhs.clone() });
        };

        let epsilon = lhs.config().epsilon();
        let mut soup = Vec::new();
        let kept_lhs = keep_outside(lhs, rhs_root, true, epsilon, &mut soup)?;
        let kept_rhs = keep_outside(rhs, lhs_root, false, epsilon, &mut soup)?;
        debug!(kept_lhs, kept_rhs, "classified triangles");

        BspTree::from_triangle_soup_with(soup, *lhs.config())
    }
}

/// Appends the corners of every triangle of `part` that lies outside `other`
/// to `soup` and returns how many triangles were appended.
fn keep_outside<V: Vertex>(
    part: &BspTree<V>,
    other: &BspNode<V::Position>,
    keep_edge: bool,
    epsilon: f32,
    soup: &mut Vec<V>,
) -> Result<usize, BspError> {
    // interpolated vertices go to a private copy of the buffer
    let mut vertices = part.vertices().to_vec();
    let mut kept = Vec::new();
    let mut classifier = Classifier {
        vertices: &mut vertices,
        keep_edge,
        epsilon,
        kept: &mut kept,
    };

    let indices = part.collect_indices();
    for triangle in triangles(&indices) {
        classifier.classify(other, triangle)?;
    }
    trace!(input = indices.len() / 3, kept = kept.len(), keep_edge, "kept outside triangles");

    soup.extend(
        kept.iter()
            .flatten()
            .map(|&i| vertices[i as usize].clone()),
    );
    Ok(kept.len())
}

/// Walks triangles down a tree, collecting the pieces that end up outside.
struct Classifier<'a, V> {
    vertices: &'a mut Vec<V>,
    keep_edge: bool,
    epsilon: f32,
    kept: &'a mut Vec<Triangle>,
}

impl<V: Vertex> Classifier<'_, V> {
    /// Classifies `triangle` at `node`. Returns `true` if all of it was kept.
    fn classify(&mut self, node: &BspNode<V::Position>, triangle: Triangle) -> Result<bool, BspError> {
        guard_stack(|| match cut_triangle(self.vertices, node.plane(), triangle, self.epsilon)? {
            Cut::Behind => self.descend(node.behind(), true, triangle),
            Cut::InFront => self.descend(node.infront(), false, triangle),
            Cut::OnPlane => {
                let facing = normal(self.vertices.as_slice(), &triangle);
                if self.keep_edge && node.plane().faces_same_direction(&facing) {
                    self.descend(node.infront(), false, triangle)
                } else {
                    self.descend(node.behind(), true, triangle)
                }
            }
            Cut::Split { behind, infront } => {
                let mark = self.kept.len();
                let mut whole = true;
                for fragment in behind {
                    whole &= self.descend(node.behind(), true, fragment)?;
                }
                for fragment in infront {
                    whole &= self.descend(node.infront(), false, fragment)?;
                }
                if whole {
                    self.kept.truncate(mark);
                    self.kept.push(triangle);
                }
                Ok(whole)
            }
        })
    }

    fn descend(
        &mut self,
        child: Option<&BspNode<V::Position>>,
        inside: bool,
        triangle: Triangle,
    ) -> Result<bool, BspError> {
        match child {
            Some(child) => self.classify(child, triangle),
            None if inside => Ok(false),
            None => {
                self.kept.push(triangle);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::fixtures::{cuboid, surface_area};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    type V3 = Vector3<f32>;

    fn bounds(tree: &BspTree<V3>) -> (V3, V3) {
        let indices = tree.collect_indices();
        let mut min = Vector3::repeat(f32::MAX);
        let mut max = Vector3::repeat(f32::MIN);
        for &i in &indices {
            let p = tree.vertices()[i as usize];
            min = min.inf(&p);
            max = max.sup(&p);
        }
        (min, max)
    }

    #[test]
    fn disjoint_solids_keep_everything() {
        let a = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = cuboid([2.0, 0.0, 0.0], [3.0, 1.0, 1.0]);

        let union = BspTree::unify(&a, &b).unwrap();
        assert_eq!(union.triangle_count(), 24);
        assert_relative_eq!(surface_area(&union), 12.0, max_relative = 1e-5);
    }

    #[test]
    fn contained_solid_disappears() {
        let outer = cuboid([0.0, 0.0, 0.0], [4.0, 4.0, 4.0]);
        let inner = cuboid([1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);

        for union in [BspTree::unify(&outer, &inner).unwrap(), BspTree::unify(&inner, &outer).unwrap()] {
            assert_eq!(union.triangle_count(), 12);
            assert_relative_eq!(surface_area(&union), 96.0, max_relative = 1e-5);
            let (min, max) = bounds(&union);
            assert_relative_eq!(min, Vector3::new(0.0, 0.0, 0.0));
            assert_relative_eq!(max, Vector3::new(4.0, 4.0, 4.0));
        }
    }

    #[test]
    fn shared_face_is_kept_once() {
        let a = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);

        let union = BspTree::unify(&a, &a).unwrap();
        assert_eq!(union.triangle_count(), 12);
        assert_relative_eq!(surface_area(&union), 6.0, max_relative = 1e-5);
    }

    #[test]
    fn touching_faces_are_dropped() {
        // the +X face of `a` and the -X face of `b` coincide with opposite orientation
        let a = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = cuboid([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]);

        let union = BspTree::unify(&a, &b).unwrap();
        assert_eq!(union.triangle_count(), 20);
        assert_relative_eq!(surface_area(&union), 10.0, max_relative = 1e-5);
    }

    #[test]
    fn overlapping_solids_fuse() {
        let a = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let b = cuboid([0.5, 0.0, 0.0], [1.5, 1.0, 1.0]);

        let union = BspTree::unify(&a, &b).unwrap();
        assert_relative_eq!(surface_area(&union), 8.0, max_relative = 1e-4);
        let (min, max) = bounds(&union);
        assert_relative_eq!(min, Vector3::new(0.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(max, Vector3::new(1.5, 1.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn surviving_split_triangle_is_emitted_whole() {
        // a wall beside the box, crossing the planes z = 0 and z = 1
        let vertices = vec![
            Vector3::new(2.0, 0.5, -1.0),
            Vector3::new(3.0, 0.5, -1.0),
            Vector3::new(2.5, 0.5, 3.0),
        ];
        let wall = BspTree::build(vertices.clone(), &[0, 1, 2]).unwrap();
        let solid = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);

        let mut soup = Vec::new();
        let kept = keep_outside(&wall, solid.root().unwrap(), true, 1e-5, &mut soup).unwrap();

        assert_eq!(kept, 1);
        assert_eq!(soup, vertices);
    }

    #[test]
    fn solid_behind_an_open_surface_is_dropped() {
        let vertices = vec![
            Vector3::new(-5.0, -5.0, 3.0),
            Vector3::new(5.0, -5.0, 3.0),
            Vector3::new(0.0, 5.0, 3.0),
        ];
        let roof = BspTree::build(vertices.clone(), &[0, 1, 2]).unwrap();
        let solid = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);

        let union = BspTree::unify(&roof, &solid).unwrap();

        assert_eq!(union.triangle_count(), 1);
        assert_eq!(union.vertices(), vertices.as_slice());
    }

    #[test]
    fn empty_input_copies_the_other() {
        let solid = cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        let empty = BspTree::new();

        assert_eq!(BspTree::unify(&solid, &empty).unwrap().root(), solid.root());
        assert_eq!(BspTree::unify(&empty, &solid).unwrap().root(), solid.root());
    }
}
