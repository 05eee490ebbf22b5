//! Consumers of a viewpoint traversal.
//!
//! A traversal hands each visitor one node's index list at a time, so an
//! index buffer can be filled or draw calls issued without collecting first.

/// Receives node index lists in traversal order.
///
/// [`BspTree::sort`](crate::BspTree::sort) is a traversal with a
/// [`CollectingVisitor`]; implement this to stream the order elsewhere.
pub trait BspVisitor {
    /// Called for each node that holds triangles.
    ///
    /// `triangles` is the node's flat index list, three indices per triangle.
    /// All of them lie on the same plane.
    fn visit(&mut self, triangles: &[u32]);
}

/// A visitor that appends every visited index list to one buffer.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<u32>,
}

impl CollectingVisitor {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collecting visitor with room for `capacity` indices.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            collected: Vec::with_capacity(capacity),
        }
    }

    /// Returns the collected indices.
    pub fn into_indices(self) -> Vec<u32> {
        self.collected
    }

    /// Returns a reference to the collected indices.
    pub fn indices(&self) -> &[u32] {
        &self.collected
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, triangles: &[u32]) {
        self.collected.extend_from_slice(triangles);
    }
}

/// A visitor that calls a closure for each node's index list.
pub struct FnVisitor<F>
where
    F: FnMut(&[u32]),
{
    func: F,
}

impl<F> FnVisitor<F>
where
    F: FnMut(&[u32]),
{
    /// Creates a new visitor from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> BspVisitor for FnVisitor<F>
where
    F: FnMut(&[u32]),
{
    fn visit(&mut self, triangles: &[u32]) {
        (self.func)(triangles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_visitor_empty() {
        let visitor = CollectingVisitor::new();
        assert!(visitor.indices().is_empty());
    }

    #[test]
    fn collecting_visitor_collects_in_order() {
        let mut visitor = CollectingVisitor::with_capacity(9);

        visitor.visit(&[3, 4, 5]);
        visitor.visit(&[0, 1, 2, 6, 7, 8]);

        assert_eq!(visitor.indices(), &[3, 4, 5, 0, 1, 2, 6, 7, 8]);
        assert_eq!(visitor.into_indices().len(), 9);
    }

    #[test]
    fn fn_visitor_calls_closure() {
        let mut count = 0;
        {
            let mut visitor = FnVisitor::new(|triangles: &[u32]| {
                count += triangles.len() / 3;
            });

            visitor.visit(&[0, 1, 2]);
            visitor.visit(&[0, 1, 2, 2, 1, 3]);
        }
        assert_eq!(count, 3);
    }
}
