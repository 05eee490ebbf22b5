//! BSP tree node implementation.

use crate::config::guard_stack;
use crate::Plane;

/// A node in the BSP tree.
///
/// Each node partitions space using a splitting plane and stores the
/// triangles that lie on that plane as a flat list of vertex indices (three
/// per triangle). Triangles behind or in front of the plane are stored in the
/// respective child subtrees; an absent child means that side is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct BspNode<P> {
    /// The splitting plane for this node.
    plane: Plane<P>,

    /// Indices of the triangles on the plane, three per triangle.
    triangles: Vec<u32>,

    /// Subtree containing triangles BEHIND the splitting plane.
    behind: Option<Box<BspNode<P>>>,

    /// Subtree containing triangles in FRONT of the splitting plane.
    infront: Option<Box<BspNode<P>>>,
}

impl<P> BspNode<P> {
    /// Creates a new BSP node with the given splitting plane.
    ///
    /// The node starts with no triangles and no children.
    pub fn new(plane: Plane<P>) -> Self {
        Self::with_triangles(plane, Vec::new())
    }

    /// Creates a new BSP node with a splitting plane and its on-plane triangles.
    pub fn with_triangles(plane: Plane<P>, triangles: Vec<u32>) -> Self {
        debug_assert!(triangles.len() % 3 == 0, "triangle list must hold whole triangles");
        Self {
            plane,
            triangles,
            behind: None,
            infront: None,
        }
    }

    /// Returns a reference to the splitting plane.
    #[inline]
    pub fn plane(&self) -> &Plane<P> {
        &self.plane
    }

    /// Returns the vertex indices of the triangles on the plane.
    #[inline]
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    /// Returns the number of triangles on the plane.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Returns a reference to the behind child subtree.
    #[inline]
    pub fn behind(&self) -> Option<&BspNode<P>> {
        self.behind.as_deref()
    }

    /// Returns a reference to the in-front child subtree.
    #[inline]
    pub fn infront(&self) -> Option<&BspNode<P>> {
        self.infront.as_deref()
    }

    /// Sets the behind child subtree.
    #[inline]
    pub fn set_behind(&mut self, node: Option<BspNode<P>>) {
        self.behind = node.map(Box::new);
    }

    /// Sets the in-front child subtree.
    #[inline]
    pub fn set_infront(&mut self, node: Option<BspNode<P>>) {
        self.infront = node.map(Box::new);
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.behind.is_none() && self.infront.is_none()
    }

    /// Returns the total number of triangles in this subtree.
    pub fn subtree_triangle_count(&self) -> usize {
        guard_stack(|| {
            self.triangle_count()
                + self.behind().map_or(0, BspNode::subtree_triangle_count)
                + self.infront().map_or(0, BspNode::subtree_triangle_count)
        })
    }

    /// Returns the number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        guard_stack(|| {
            1 + self.behind().map_or(0, BspNode::node_count)
                + self.infront().map_or(0, BspNode::node_count)
        })
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        guard_stack(|| {
            let behind_depth = self.behind().map_or(0, BspNode::depth);
            let infront_depth = self.infront().map_or(0, BspNode::depth);
            1 + behind_depth.max(infront_depth)
        })
    }
}
