//! Pivot selection strategies for BSP tree construction.
//!
//! The choice of splitting plane affects tree balance and the number of
//! triangle splits during construction. [`MinimalSplits`] scores every
//! candidate and is the default; [`FirstTriangle`] is a cheap alternative for
//! input whose order is already good.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::BspConfig;
use crate::traits::Vertex;
use crate::triangle::{classify, plane_of, Triangle};

/// Strategy for selecting which triangle's plane to use for splitting.
pub trait PivotSelector {
    /// Selects a triangle from the flat index list to use as the splitting plane.
    ///
    /// Returns the triangle's position (index list offset divided by three),
    /// or `None` if no triangle in the list defines a plane. The tree ignores
    /// positions past the last triangle and treats them like `None`.
    fn select<V: Vertex>(&self, vertices: &[V], indices: &[u32], config: &BspConfig)
        -> Option<usize>;
}

/// Selects the first triangle that defines a plane.
///
/// This is the fastest selector, but may split many triangles and produce
/// unbalanced trees depending on input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTriangle;

impl PivotSelector for FirstTriangle {
    fn select<V: Vertex>(
        &self,
        vertices: &[V],
        indices: &[u32],
        _config: &BspConfig,
    ) -> Option<usize> {
        triangles(indices).position(|t| plane_of(vertices, &t).is_some())
    }
}

/// Predicted outcome of partitioning a triangle set by one candidate plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PivotScore {
    /// Triangles (after splitting) that would end up behind the plane.
    pub behind: usize,
    /// Triangles (after splitting) that would end up in front of the plane.
    pub infront: usize,
}

impl PivotScore {
    /// Total number of triangles left to partition below the node.
    #[inline]
    pub fn total(&self) -> usize {
        self.behind + self.infront
    }

    /// Difference between the two sides.
    #[inline]
    pub fn imbalance(&self) -> usize {
        self.behind.abs_diff(self.infront)
    }
}

/// Selects the triangle whose plane splits the fewest triangles, breaking
/// ties by balance and then by position.
///
/// If there is a way to partition a node without splitting, it is found.
/// Every candidate is scored independently, read-only, so scoring runs on
/// the rayon pool when the `parallel` feature is enabled and there are at
/// least [`BspConfig::parallel_threshold`] candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimalSplits;

impl PivotSelector for MinimalSplits {
    fn select<V: Vertex>(
        &self,
        vertices: &[V],
        indices: &[u32],
        config: &BspConfig,
    ) -> Option<usize> {
        score_candidates(vertices, indices, config)
            .into_iter()
            .min_by_key(|(score, candidate)| (score.total(), score.imbalance(), *candidate))
            .map(|(_, candidate)| candidate)
    }
}

/// Predicts what would happen if the plane of `candidate` partitioned `indices`.
///
/// Returns `None` if the candidate triangle is degenerate.
pub fn evaluate_pivot<V: Vertex>(
    vertices: &[V],
    indices: &[u32],
    candidate: usize,
    epsilon: f32,
) -> Option<PivotScore> {
    let pivot = triangle_at(indices, candidate);
    let plane = plane_of(vertices, &pivot)?;

    let mut score = PivotScore::default();
    for triangle in triangles(indices) {
        let (behind, infront) = classify(vertices, &triangle, &plane, epsilon).fragment_counts();
        score.behind += behind;
        score.infront += infront;
    }
    Some(score)
}

/// Scores every eligible candidate in the list.
fn score_candidates<V: Vertex>(
    vertices: &[V],
    indices: &[u32],
    config: &BspConfig,
) -> Vec<(PivotScore, usize)> {
    let count = indices.len() / 3;
    let epsilon = config.epsilon();
    let score = |candidate: usize| {
        evaluate_pivot(vertices, indices, candidate, epsilon).map(|s| (s, candidate))
    };

    #[cfg(feature = "parallel")]
    if count >= config.parallel_threshold() {
        return (0..count).into_par_iter().filter_map(score).collect();
    }

    (0..count).filter_map(score).collect()
}

/// Iterates the triangles of a flat index list.
#[inline]
pub(crate) fn triangles(indices: &[u32]) -> impl Iterator<Item = Triangle> + '_ {
    indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
}

/// Returns the triangle at the given position of a flat index list.
#[inline]
pub(crate) fn triangle_at(indices: &[u32], position: usize) -> Triangle {
    let i = position * 3;
    [indices[i], indices[i + 1], indices[i + 2]]
}
