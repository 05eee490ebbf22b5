//! Binary persistence of BSP trees.
//!
//! A tree is stored as its vertex buffer followed by its nodes in pre-order
//! (node, behind subtree, in-front subtree). All scalars are little-endian:
//!
//! ```text
//! file := vertex_count:u64 vertex[vertex_count] node
//! node := 0u8
//!       | 1u8 normal:f32x3 offset:f32 index_count:u64 index[index_count]:u32 node node
//! ```
//!
//! `index_count` counts `u32` entries, three per triangle.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Vector3;
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::bsp::{BspNode, BspTree};
use crate::config::{guard_stack, BspConfig};
use crate::traits::{Position, Vertex};
use crate::vertex::MeshVertex;
use crate::{BspError, Plane};

/// Upper bound on elements reserved ahead of reading them.
const MAX_PREALLOCATION: usize = 1 << 16;

/// Fixed-layout binary encoding of a value.
pub trait Persist: Sized {
    /// Writes the value in little-endian byte order.
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    /// Reads a value written by [`Persist::write_to`].
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self>;
}

impl Persist for Vector3<f32> {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for c in self.iter() {
            writer.write_all(&c.to_le_bytes())?;
        }
        Ok(())
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Vector3::new(
            read_f32(reader)?,
            read_f32(reader)?,
            read_f32(reader)?,
        ))
    }
}

/// Position first, then normal.
impl Persist for MeshVertex {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.position.write_to(writer)?;
        self.normal.write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let position = Vector3::read_from(reader)?;
        let normal = Vector3::read_from(reader)?;
        Ok(MeshVertex::new(position, normal))
    }
}

impl<V> BspTree<V>
where
    V: Vertex + Persist,
    V::Position: Persist,
{
    /// Writes the tree to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), BspError> {
        write_len(writer, self.vertices().len())?;
        for vertex in self.vertices() {
            vertex.write_to(writer)?;
        }
        write_node(writer, self.root())
    }

    /// Reads a tree written by [`BspTree::write_to`].
    ///
    /// The data is validated while reading; on any error no tree is returned.
    /// `config` becomes the configuration of the loaded tree.
    pub fn read_from<R: Read>(reader: &mut R, config: BspConfig) -> Result<Self, BspError> {
        let vertex_count = read_len(reader)?;
        let mut vertices = Vec::with_capacity(vertex_count.min(MAX_PREALLOCATION));
        for _ in 0..vertex_count {
            vertices.push(V::read_from(reader).map_err(BspError::from_read)?);
        }

        let root = read_node(reader, vertices.len())?;
        Ok(BspTree::from_parts(vertices, root, config))
    }

    /// Saves the tree to a file, replacing any existing file.
    ///
    /// The data goes to a temporary file in the same directory first, which
    /// is renamed over `path` once complete, so a failed save leaves any
    /// previous file untouched.
    #[instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BspError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut writer = BufWriter::new(NamedTempFile::new_in(dir)?);
        self.write_to(&mut writer)?;
        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.persist(path).map_err(|err| err.error)?;
        debug!(
            vertices = self.vertices().len(),
            nodes = self.node_count(),
            "saved BSP tree"
        );
        Ok(())
    }

    /// Loads a tree saved with [`BspTree::save`], using the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BspError> {
        Self::load_with_config(path, BspConfig::default())
    }

    /// Loads a tree saved with [`BspTree::save`].
    ///
    /// Bytes after the end of the tree are rejected as malformed.
    #[instrument(level = "debug", skip(path, config), fields(path = %path.as_ref().display()))]
    pub fn load_with_config(path: impl AsRef<Path>, config: BspConfig) -> Result<Self, BspError> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let tree = Self::read_from(&mut reader, config)?;
        if !reader.fill_buf()?.is_empty() {
            return Err(BspError::Malformed("trailing bytes after tree".into()));
        }
        debug!(
            vertices = tree.vertices().len(),
            nodes = tree.node_count(),
            "loaded BSP tree"
        );
        Ok(tree)
    }
}

fn write_node<W: Write, P: Position + Persist>(
    writer: &mut W,
    node: Option<&BspNode<P>>,
) -> Result<(), BspError> {
    let Some(node) = node else {
        writer.write_all(&[0])?;
        return Ok(());
    };

    guard_stack(|| {
        writer.write_all(&[1])?;
        node.plane().normal().write_to(writer)?;
        writer.write_all(&node.plane().offset().to_le_bytes())?;

        write_len(writer, node.triangles().len())?;
        for index in node.triangles() {
            writer.write_all(&index.to_le_bytes())?;
        }

        write_node(writer, node.behind())?;
        write_node(writer, node.infront())
    })
}

fn read_node<R: Read, P: Position + Persist>(
    reader: &mut R,
    vertex_count: usize,
) -> Result<Option<BspNode<P>>, BspError> {
    match read_u8(reader)? {
        0 => return Ok(None),
        1 => {}
        flag => return Err(BspError::Malformed(format!("invalid node flag {flag}"))),
    }

    guard_stack(|| {
        let normal = P::read_from(reader).map_err(BspError::from_read)?;
        let offset = read_f32(reader).map_err(BspError::from_read)?;

        let index_count = read_len(reader)?;
        if index_count % 3 != 0 {
            return Err(BspError::Malformed(format!(
                "index count {index_count} is not a multiple of three"
            )));
        }
        let mut triangles = Vec::with_capacity(index_count.min(MAX_PREALLOCATION));
        for _ in 0..index_count {
            let index = read_u32(reader)?;
            if index as usize >= vertex_count {
                return Err(BspError::Malformed(format!(
                    "index {index} is out of range for {vertex_count} vertices"
                )));
            }
            triangles.push(index);
        }

        let mut node = BspNode::with_triangles(Plane::new(normal, offset), triangles);
        node.set_behind(read_node(reader, vertex_count)?);
        node.set_infront(read_node(reader, vertex_count)?);
        Ok(Some(node))
    })
}

fn write_len<W: Write>(writer: &mut W, len: usize) -> Result<(), BspError> {
    writer.write_all(&(len as u64).to_le_bytes())?;
    Ok(())
}

fn read_len<R: Read>(reader: &mut R) -> Result<usize, BspError> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(BspError::from_read)?;
    let len = u64::from_le_bytes(buf);
    usize::try_from(len).map_err(|_| BspError::Malformed(format!("count {len} does not fit in memory")))
}

fn read_u8<R: Read>(reader: &mut R) -> Result<u8, BspError> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf).map_err(BspError::from_read)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, BspError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf).map_err(BspError::from_read)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}
