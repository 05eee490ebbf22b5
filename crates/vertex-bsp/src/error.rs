//! Error type shared by tree construction, persistence and composition.

use std::io;

use thiserror::Error;

/// Errors produced by BSP tree operations.
#[derive(Debug, Error)]
pub enum BspError {
    /// An underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Persisted data ended before the tree was complete.
    #[error("persisted tree is truncated")]
    Truncated,

    /// Persisted data is structurally invalid.
    #[error("persisted tree is malformed: {0}")]
    Malformed(String),

    /// The index array does not describe whole triangles.
    #[error("index count {len} is not a multiple of three")]
    IncompleteTriangle {
        /// Length of the offending index array.
        len: usize,
    },

    /// An index points past the end of the vertex buffer.
    #[error("index {index} is out of range for {len} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices in the buffer.
        len: usize,
    },

    /// Splitting grew the vertex buffer beyond what `u32` indices can address.
    #[error("vertex buffer exceeds the u32 index range")]
    IndexOverflow,

    /// The two parts handed to merge have the same centroid, so no bisector exists.
    #[error("cannot merge parts with coincident centroids")]
    CoincidentParts,
}

impl BspError {
    /// Maps a read failure, turning an unexpected end of input into [`BspError::Truncated`].
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(err)
        }
    }
}
