//! Geometry traits binding a vertex layout to the operations the tree needs.
//!
//! The tree never looks inside a vertex. It only asks for the vertex
//! position, does vector math on that position through [`Position`], and
//! creates new vertices on cut edges through [`Vertex::interpolate`].

use std::ops::{Add, Mul, Sub};

use nalgebra::Vector3;

/// A 3D position or direction with `f32` coordinates.
pub trait Position:
    Copy + Send + Sync + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    /// Cross product `self × other`.
    fn cross(&self, other: &Self) -> Self;

    /// Dot product `self · other`.
    fn dot(&self, other: &Self) -> f32;
}

/// A mesh vertex: a position plus any number of interpolable attributes.
pub trait Vertex: Clone + Send + Sync {
    /// The position type used for plane math.
    type Position: Position;

    /// Returns the vertex position.
    fn position(&self) -> Self::Position;

    /// Returns the vertex at fraction `t` along the edge from `self` to `other`.
    ///
    /// `t = 0` yields `self`, `t = 1` yields `other`. Every attribute must be
    /// interpolated, not only the position.
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Position for Vector3<f32> {
    #[inline]
    fn cross(&self, other: &Self) -> Self {
        Vector3::cross(self, other)
    }

    #[inline]
    fn dot(&self, other: &Self) -> f32 {
        Vector3::dot(self, other)
    }
}

/// A bare position is a vertex without extra attributes.
impl Vertex for Vector3<f32> {
    type Position = Self;

    #[inline]
    fn position(&self) -> Self {
        *self
    }

    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

/// Euclidean length of a position, using only the trait operations.
#[inline]
pub(crate) fn length<P: Position>(p: &P) -> f32 {
    p.dot(p).sqrt()
}
