//! BSP tree container, construction and viewpoint traversal.

use tracing::{debug, instrument, trace};

use crate::config::{guard_stack, BspConfig};
use crate::traits::{Position, Vertex};
use crate::triangle::plane_of;
use crate::{BspError, Plane};

use super::node::BspNode;
use super::partition::separate_triangles;
use super::selector::{triangle_at, MinimalSplits, PivotSelector};
use super::visitor::{BspVisitor, CollectingVisitor};

/// A Binary Space Partitioning tree over an indexed triangle mesh.
///
/// The tree owns the shared vertex buffer. Triangles are stored at the node
/// whose plane they lie on, as indices into that buffer; splitting during
/// construction appends interpolated vertices to it.
///
/// # Construction
///
/// ```
/// use nalgebra::Vector3;
/// use vertex_bsp::BspTree;
///
/// let vertices = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(0.0, 1.0, 0.0),
///     Vector3::new(0.0, 0.0, 1.0),
///     Vector3::new(1.0, 0.0, 1.0),
///     Vector3::new(0.0, 1.0, 1.0),
/// ];
/// let tree = BspTree::build(vertices, &[0, 1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(tree.triangle_count(), 2);
/// ```
///
/// # Traversal
///
/// The tree orders its triangles relative to a viewpoint, for painter's
/// algorithm rendering. Camera motion never requires a rebuild:
///
/// ```
/// # use nalgebra::Vector3;
/// # use vertex_bsp::BspTree;
/// # let vertices = vec![
/// #     Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0),
/// #     Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 1.0), Vector3::new(0.0, 1.0, 1.0),
/// # ];
/// # let tree = BspTree::build(vertices, &[0, 1, 2, 3, 4, 5]).unwrap();
/// let order = tree.sort(&Vector3::new(0.2, 0.2, 10.0));
/// assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct BspTree<V: Vertex> {
    vertices: Vec<V>,
    root: Option<BspNode<V::Position>>,
    config: BspConfig,
}

impl<V: Vertex> Default for BspTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> BspTree<V> {
    /// Creates an empty BSP tree.
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), None, BspConfig::default())
    }

    /// Assembles a tree from an already partitioned buffer and root.
    pub(crate) fn from_parts(
        vertices: Vec<V>,
        root: Option<BspNode<V::Position>>,
        config: BspConfig,
    ) -> Self {
        Self {
            vertices,
            root,
            config,
        }
    }

    /// Builds a BSP tree with the default configuration and the
    /// [`MinimalSplits`] selector.
    ///
    /// `vertices` is taken over and grows when triangles are split; `indices`
    /// holds three vertex indices per triangle. Returns an empty tree if
    /// `indices` is empty.
    pub fn build(vertices: Vec<V>, indices: &[u32]) -> Result<Self, BspError> {
        Self::build_with(vertices, indices, BspConfig::default(), &MinimalSplits)
    }

    /// Builds a BSP tree from a buffer whose vertices are grouped in triples,
    /// one triple per triangle.
    ///
    /// Trailing vertices that do not complete a triangle are ignored.
    pub fn from_triangle_soup(vertices: Vec<V>) -> Result<Self, BspError> {
        Self::from_triangle_soup_with(vertices, BspConfig::default())
    }

    /// Like [`BspTree::from_triangle_soup`], with an explicit configuration.
    pub fn from_triangle_soup_with(vertices: Vec<V>, config: BspConfig) -> Result<Self, BspError> {
        let count = u32::try_from(vertices.len()).map_err(|_| BspError::IndexOverflow)?;
        let indices: Vec<u32> = (0..count - count % 3).collect();
        Self::build_with(vertices, &indices, config, &MinimalSplits)
    }

    /// Builds a BSP tree with an explicit configuration and pivot selector.
    #[instrument(level = "debug", skip_all, fields(vertices = vertices.len(), triangles = indices.len() / 3))]
    pub fn build_with<S: PivotSelector>(
        mut vertices: Vec<V>,
        indices: &[u32],
        config: BspConfig,
        selector: &S,
    ) -> Result<Self, BspError> {
        validate_indices(vertices.len(), indices)?;

        let input_vertices = vertices.len();
        let root = build_node(&mut vertices, indices, &config, selector)?;
        let tree = Self::from_parts(vertices, root, config);

        debug!(
            nodes = tree.node_count(),
            depth = tree.depth(),
            triangles = tree.triangle_count(),
            added_vertices = tree.vertices.len() - input_vertices,
            "built BSP tree"
        );
        Ok(tree)
    }

    /// Returns the shared vertex buffer.
    #[inline]
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Returns the configuration the tree was built with.
    #[inline]
    pub fn config(&self) -> &BspConfig {
        &self.config
    }

    /// Returns `true` if the tree contains no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&BspNode<V::Position>> {
        self.root.as_ref()
    }

    /// Returns the total number of triangles in the tree.
    pub fn triangle_count(&self) -> usize {
        self.root.as_ref().map_or(0, BspNode::subtree_triangle_count)
    }

    /// Returns the number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, BspNode::node_count)
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, BspNode::depth)
    }

    /// Traverses the tree back-to-front relative to the given viewpoint.
    ///
    /// The visitor is called once per node that holds triangles, farthest
    /// first, which is the drawing order for the painter's algorithm.
    pub fn traverse_back_to_front<T: BspVisitor>(&self, eye: &V::Position, visitor: &mut T) {
        if let Some(ref root) = self.root {
            traverse_node(root, eye, visitor, true);
        }
    }

    /// Traverses the tree front-to-back relative to the given viewpoint.
    ///
    /// This is the exact reverse of back-to-front traversal.
    pub fn traverse_front_to_back<T: BspVisitor>(&self, eye: &V::Position, visitor: &mut T) {
        if let Some(ref root) = self.root {
            traverse_node(root, eye, visitor, false);
        }
    }

    /// Returns all triangle indices sorted back-to-front as seen from `eye`.
    ///
    /// The result has the same length as the tree's total index count and is
    /// meant to be uploaded as the index buffer for the current frame.
    pub fn sort(&self, eye: &V::Position) -> Vec<u32> {
        let mut visitor = CollectingVisitor::with_capacity(self.triangle_count() * 3);
        self.traverse_back_to_front(eye, &mut visitor);
        visitor.into_indices()
    }

    /// Returns all triangle indices sorted front-to-back as seen from `eye`.
    pub fn sort_front_to_back(&self, eye: &V::Position) -> Vec<u32> {
        let mut visitor = CollectingVisitor::with_capacity(self.triangle_count() * 3);
        self.traverse_front_to_back(eye, &mut visitor);
        visitor.into_indices()
    }

    /// Collects all triangle indices in the tree, in pre-order (node, behind, in front).
    ///
    /// The order does not depend on any viewpoint.
    pub fn collect_indices(&self) -> Vec<u32> {
        let mut result = Vec::with_capacity(self.triangle_count() * 3);
        collect_indices_recursive(self.root.as_ref(), &mut result);
        result
    }
}

/// Checks that `indices` describes whole triangles within the buffer.
fn validate_indices(vertex_count: usize, indices: &[u32]) -> Result<(), BspError> {
    if indices.len() % 3 != 0 {
        return Err(BspError::IncompleteTriangle { len: indices.len() });
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(BspError::IndexOutOfRange {
            index,
            len: vertex_count,
        });
    }
    Ok(())
}

/// Recursively builds a BSP node from a flat index list.
fn build_node<V: Vertex, S: PivotSelector>(
    vertices: &mut Vec<V>,
    indices: &[u32],
    config: &BspConfig,
    selector: &S,
) -> Result<Option<BspNode<V::Position>>, BspError> {
    guard_stack(|| {
        if indices.is_empty() {
            return Ok(None);
        }

        // A single triangle becomes a leaf without any pivot search
        if indices.len() == 3 {
            let plane = node_plane(vertices, indices, Some(0));
            return Ok(Some(BspNode::with_triangles(plane, indices.to_vec())));
        }

        let pivot = selector
            .select(vertices.as_slice(), indices, config)
            .filter(|&p| p < indices.len() / 3);
        let plane = node_plane(vertices, indices, pivot);
        // Without an eligible pivot every triangle is degenerate and lands on the node
        let pivot = pivot.or(Some(0));

        let partition = separate_triangles(vertices, &plane, indices, pivot, config.epsilon())?;
        trace!(
            from = indices.len() / 3,
            on = partition.on_plane.len() / 3,
            behind = partition.behind.len() / 3,
            infront = partition.infront.len() / 3,
            "partitioned node"
        );

        let mut node = BspNode::with_triangles(plane, partition.on_plane);
        node.set_behind(build_node(vertices, &partition.behind, config, selector)?);
        node.set_infront(build_node(vertices, &partition.infront, config, selector)?);

        Ok(Some(node))
    })
}

/// Plane of the pivot triangle, or the degenerate plane if there is none.
fn node_plane<V: Vertex>(
    vertices: &[V],
    indices: &[u32],
    pivot: Option<usize>,
) -> Plane<V::Position> {
    pivot
        .and_then(|p| plane_of(vertices, &triangle_at(indices, p)))
        .unwrap_or_else(|| Plane::degenerate(vertices[indices[0] as usize].position()))
}

/// Traverses a node subtree, far side first when `back_to_front` is set.
fn traverse_node<P, T>(node: &BspNode<P>, eye: &P, visitor: &mut T, back_to_front: bool)
where
    P: Position,
    T: BspVisitor,
{
    guard_stack(|| {
        let eye_behind = node.plane().signed_distance(eye) < 0.0;

        // Eye behind the plane: the in-front subtree is farther away
        let (first, second) = if eye_behind == back_to_front {
            (node.infront(), node.behind())
        } else {
            (node.behind(), node.infront())
        };

        if let Some(first) = first {
            traverse_node(first, eye, visitor, back_to_front);
        }
        if !node.triangles().is_empty() {
            visitor.visit(node.triangles());
        }
        if let Some(second) = second {
            traverse_node(second, eye, visitor, back_to_front);
        }
    });
}

/// Recursively collects all triangle indices from a node subtree.
fn collect_indices_recursive<P>(node: Option<&BspNode<P>>, result: &mut Vec<u32>) {
    if let Some(n) = node {
        guard_stack(|| {
            result.extend_from_slice(n.triangles());
            collect_indices_recursive(n.behind(), result);
            collect_indices_recursive(n.infront(), result);
        });
    }
}
