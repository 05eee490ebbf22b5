//! Binary Space Partitioning tree over indexed triangle meshes.
//!
//! This module builds a BSP tree from a vertex buffer and a flat index list,
//! picking each node's plane from one of the remaining triangles, and orders
//! the triangles relative to a viewpoint without any per-frame depth sort.
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use vertex_bsp::bsp::{BspTree, CollectingVisitor};
//!
//! let vertices = vec![
//!     Vector3::new(0.0, 0.0, 0.0),
//!     Vector3::new(1.0, 0.0, 0.0),
//!     Vector3::new(0.0, 1.0, 0.0),
//! ];
//! let tree = BspTree::build(vertices, &[0, 1, 2]).unwrap();
//!
//! // Traverse front-to-back, for example to fill a depth prepass
//! let eye = Vector3::new(0.0, 0.0, 10.0);
//! let mut visitor = CollectingVisitor::new();
//! tree.traverse_front_to_back(&eye, &mut visitor);
//! assert_eq!(visitor.into_indices(), vec![0, 1, 2]);
//! ```
//!
//! # Architecture
//!
//! - [`BspTree`]: The container owning the vertex buffer and the root node
//! - [`BspNode`]: Nodes storing a splitting plane and the triangles on it
//! - [`PivotSelector`]: Strategy trait for choosing splitting planes
//! - [`separate_triangles`]: One partitioning step, cutting spanning triangles
//! - [`BspVisitor`]: Visitor trait for custom traversal behavior

mod node;
mod partition;
mod selector;
mod tree;
mod visitor;

pub use node::BspNode;
pub use partition::{separate_triangles, Partition};
pub use selector::{evaluate_pivot, FirstTriangle, MinimalSplits, PivotScore, PivotSelector};
pub use tree::BspTree;
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};

pub(crate) use selector::triangles;
