//! Position + normal vertex, the layout produced by the asset loader.

use nalgebra::Vector3;

use crate::traits::Vertex;

/// A vertex with a position and a shading normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    /// Position in model space.
    pub position: Vector3<f32>,
    /// Shading normal.
    pub normal: Vector3<f32>,
}

impl MeshVertex {
    /// Creates a vertex from a position and a normal.
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

impl Vertex for MeshVertex {
    type Position = Vector3<f32>;

    #[inline]
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    /// Linear blend of position and normal. The normal is not renormalized.
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            normal: self.normal + (other.normal - self.normal) * t,
        }
    }
}
