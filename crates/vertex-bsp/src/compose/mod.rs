//! Combining independently built trees.
//!
//! [`BspTree::merge`](crate::BspTree::merge) grafts two parts under a new
//! root without touching their triangles. [`BspTree::unify`](crate::BspTree::unify)
//! computes the surface of the union of two closed solids.

mod merge;
mod unify;

use hashbrown::HashMap;

use crate::bsp::BspNode;
use crate::config::guard_stack;
use crate::traits::Vertex;
use crate::BspError;

/// Deep-copies a subtree into `target`, remapping its indices.
///
/// Every node gets its own copies of the vertices it references, so shared
/// vertices are deduplicated within a node but not across nodes. Vertices no
/// triangle references are dropped.
pub(crate) fn copy_subtree<V: Vertex>(
    node: Option<&BspNode<V::Position>>,
    source: &[V],
    target: &mut Vec<V>,
) -> Result<Option<BspNode<V::Position>>, BspError> {
    let Some(node) = node else {
        return Ok(None);
    };

    guard_stack(|| {
        let mut remap: HashMap<u32, u32> = HashMap::with_capacity(node.triangles().len());
        let mut triangles = Vec::with_capacity(node.triangles().len());
        for &index in node.triangles() {
            let mapped = match remap.get(&index) {
                Some(&mapped) => mapped,
                None => {
                    let mapped = u32::try_from(target.len()).map_err(|_| BspError::IndexOverflow)?;
                    target.push(source[index as usize].clone());
                    remap.insert(index, mapped);
                    mapped
                }
            };
            triangles.push(mapped);
        }

        let mut copy = BspNode::with_triangles(*node.plane(), triangles);
        copy.set_behind(copy_subtree(node.behind(), source, target)?);
        copy.set_infront(copy_subtree(node.infront(), source, target)?);
        Ok(Some(copy))
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use nalgebra::Vector3;

    use crate::BspTree;

    /// Builds a closed axis-aligned box with outward-facing triangles.
    pub(crate) fn cuboid(min: [f32; 3], max: [f32; 3]) -> BspTree<Vector3<f32>> {
        let vertices: Vec<Vector3<f32>> = (0..8u32)
            .map(|i| {
                Vector3::new(
                    if i & 1 == 0 { min[0] } else { max[0] },
                    if i & 2 == 0 { min[1] } else { max[1] },
                    if i & 4 == 0 { min[2] } else { max[2] },
                )
            })
            .collect();
        // corners: bit 0 = x, bit 1 = y, bit 2 = z; quads counter-clockwise from outside
        let quads: [[u32; 4]; 6] = [
            [4, 5, 7, 6],
            [1, 0, 2, 3],
            [0, 4, 6, 2],
            [5, 1, 3, 7],
            [6, 7, 3, 2],
            [0, 1, 5, 4],
        ];
        let indices: Vec<u32> = quads
            .iter()
            .flat_map(|&[a, b, c, d]| [a, b, c, a, c, d])
            .collect();
        BspTree::build(vertices, &indices).unwrap()
    }

    /// Sum of the triangle areas of a tree.
    pub(crate) fn surface_area(tree: &BspTree<Vector3<f32>>) -> f32 {
        tree.collect_indices()
            .chunks_exact(3)
            .map(|t| crate::triangle::area(tree.vertices(), &[t[0], t[1], t[2]]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Plane;
    use nalgebra::Vector3;

    #[test]
    fn copy_remaps_per_node() {
        let source = vec![
            Vector3::new(9.0, 9.0, 9.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
        ];
        let plane = Plane::new(Vector3::new(0.0, 0.0, 1.0), 0.0);
        let mut root = BspNode::with_triangles(plane, vec![1, 2, 3, 3, 2, 4]);
        root.set_infront(Some(BspNode::with_triangles(plane, vec![1, 2, 3])));

        let mut target = Vec::new();
        let copy = copy_subtree(Some(&root), &source, &mut target).unwrap().unwrap();

        // 4 shared within the root, 3 more for the child; the unused vertex is gone
        assert_eq!(target.len(), 7);
        assert_eq!(copy.triangles(), &[0, 1, 2, 2, 1, 3]);
        assert_eq!(copy.infront().unwrap().triangles(), &[4, 5, 6]);
        assert_eq!(target[3], source[4]);
        assert_eq!(copy.plane(), root.plane());
    }

    #[test]
    fn copy_of_nothing_is_nothing() {
        let mut target: Vec<Vector3<f32>> = Vec::new();
        assert!(copy_subtree(None, &[], &mut target).unwrap().is_none());
        assert!(target.is_empty());
    }
}
