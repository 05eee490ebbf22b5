//! BSP (Binary Space Partitioning) trees over indexed triangle meshes.
//!
//! A [`BspTree`] is built once from a vertex buffer and an index list and can
//! then hand out the mesh's triangles in back-to-front order for any
//! viewpoint, which is what the painter's algorithm needs to draw
//! transparent geometry correctly. Trees can be saved to and loaded from a
//! compact binary format, grafted together with [`BspTree::merge`] and
//! combined into the union of two solids with [`BspTree::unify`].
//!
//! The tree is generic over the vertex layout through the [`Vertex`] trait;
//! `nalgebra::Vector3<f32>` and [`MeshVertex`] are supported out of the box.

pub mod bsp;
mod compose;
mod config;
mod cuttable;
mod error;
mod persist;
mod plane;
mod traits;
mod triangle;
mod vertex;

pub use bsp::{
    BspNode, BspTree, BspVisitor, CollectingVisitor, FirstTriangle, FnVisitor, MinimalSplits,
    Partition, PivotScore, PivotSelector,
};
pub use config::{BspConfig, DEFAULT_EPSILON_EXPONENT, DEFAULT_PARALLEL_THRESHOLD};
pub use cuttable::{cut_triangle, Cut, Fragments};
pub use error::BspError;
pub use persist::Persist;
pub use plane::{Plane, PlaneSide};
pub use traits::{Position, Vertex};
pub use triangle::{SplitType, Triangle, TriangleClassification};
pub use vertex::MeshVertex;
