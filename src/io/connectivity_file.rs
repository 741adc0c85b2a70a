//! Fixed, versioned, little-endian file layout for [`Connectivity`].
//!
//! ```text
//! magic     6 bytes   "mfor2d" | "mfor3d"
//! header    8 x u64   version, index width, V, T, E, ett, C, ctt
//! vertices          3 f64 per vertex          (V > 0)
//! tree_to_edge      12 i32 per tree           (E > 0)
//! tree_to_vertex    CHILDREN i32 per tree     (V > 0)
//! tree_to_corner    CHILDREN i32 per tree     (C > 0)
//! tree_to_tree      FACES i32 per tree
//! tree_to_face      FACES i8 per tree
//! ett_offset        E + 1 i32                 (3D only)
//! edge_to_tree      ett i32, edge_to_edge ett i8   (E > 0)
//! ctt_offset        C + 1 i32
//! corner_to_tree    ctt i32, corner_to_corner ctt i8 (C > 0)
//! ```
//!
//! Loading re-runs the validator; a file is never accepted provisionally.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::mem::size_of;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use log::debug;
use static_assertions::const_assert_eq;

use crate::mesh_error::MeshForestError;
use crate::topology::TopIdx;
use crate::topology::connectivity::{Connectivity, ConnectivityTables};
use crate::topology::dimension::Dimension;

/// Bump when the layout or semantics change in incompatible ways.
pub const FORMAT_VERSION: u64 = 1;

/// Byte width of one index word (`TopIdx`).
pub const INDEX_WIDTH: u64 = size_of::<TopIdx>() as u64;

/// The eight header words following the magic.
///
/// All fields are stored pre-LE with `.to_le()` and decoded with
/// `.from_le()`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct HeaderWords {
    pub version_le: u64,
    pub index_width_le: u64,
    pub num_vertices_le: u64,
    pub num_trees_le: u64,
    pub num_edges_le: u64,
    pub num_ett_le: u64,
    pub num_corners_le: u64,
    pub num_ctt_le: u64,
}

const_assert_eq!(size_of::<HeaderWords>(), 64);

/// Header counts, host order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Counts {
    num_vertices: usize,
    num_trees: usize,
    num_edges: usize,
    num_ett: usize,
    num_corners: usize,
    num_ctt: usize,
}

impl HeaderWords {
    fn of<D: Dimension>(conn: &Connectivity<D>) -> Self {
        let le = |v: usize| (v as u64).to_le();
        Self {
            version_le: FORMAT_VERSION.to_le(),
            index_width_le: INDEX_WIDTH.to_le(),
            num_vertices_le: le(conn.num_vertices()),
            num_trees_le: le(conn.num_trees()),
            num_edges_le: le(conn.num_edges()),
            num_ett_le: le(conn.num_ett()),
            num_corners_le: le(conn.num_corners()),
            num_ctt_le: le(conn.num_ctt()),
        }
    }

    pub fn version(&self) -> u64 {
        u64::from_le(self.version_le)
    }

    pub fn index_width(&self) -> u64 {
        u64::from_le(self.index_width_le)
    }

    /// Check version, width and every count for a `D` connectivity.
    fn counts<D: Dimension>(&self) -> Result<Counts, MeshForestError> {
        if self.version() != FORMAT_VERSION {
            return Err(MeshForestError::FormatVersion(self.version()));
        }
        if self.index_width() != INDEX_WIDTH {
            return Err(MeshForestError::IndexWidth(self.index_width()));
        }
        let count = |field: &'static str, raw: u64| -> Result<usize, MeshForestError> {
            let value = u64::from_le(raw);
            if value > TopIdx::MAX as u64 {
                return Err(MeshForestError::HeaderCount { field, value });
            }
            Ok(value as usize)
        };
        let counts = Counts {
            num_vertices: count("num_vertices", self.num_vertices_le)?,
            num_trees: count("num_trees", self.num_trees_le)?,
            num_edges: count("num_edges", self.num_edges_le)?,
            num_ett: count("num_ett", self.num_ett_le)?,
            num_corners: count("num_corners", self.num_corners_le)?,
            num_ctt: count("num_ctt", self.num_ctt_le)?,
        };
        if D::EDGES == 0 {
            if counts.num_edges > 0 {
                return Err(MeshForestError::HeaderCount {
                    field: "num_edges",
                    value: counts.num_edges as u64,
                });
            }
            if counts.num_ett > 0 {
                return Err(MeshForestError::HeaderCount {
                    field: "num_ett",
                    value: counts.num_ett as u64,
                });
            }
        }
        Ok(counts)
    }
}

/// Scalars stored in the file, with their little-endian conversion.
trait LeScalar: Pod {
    fn to_le_word(self) -> Self;
    fn from_le_word(self) -> Self;
}

impl LeScalar for i8 {
    fn to_le_word(self) -> Self {
        self
    }
    fn from_le_word(self) -> Self {
        self
    }
}

impl LeScalar for i32 {
    fn to_le_word(self) -> Self {
        self.to_le()
    }
    fn from_le_word(self) -> Self {
        i32::from_le(self)
    }
}

impl LeScalar for f64 {
    fn to_le_word(self) -> Self {
        f64::from_bits(self.to_bits().to_le())
    }
    fn from_le_word(self) -> Self {
        f64::from_bits(u64::from_le(self.to_bits()))
    }
}

fn write_table<W: Write, T: LeScalar>(w: &mut W, table: &[T]) -> std::io::Result<()> {
    if cfg!(target_endian = "little") {
        return w.write_all(bytemuck::cast_slice(table));
    }
    let swapped: Vec<T> = table.iter().map(|v| v.to_le_word()).collect();
    w.write_all(bytemuck::cast_slice(&swapped))
}

/// Elements read per step; a table grows only as its bytes arrive.
const READ_CHUNK: usize = 1 << 16;

fn read_table<R: Read, T: LeScalar>(r: &mut R, len: usize) -> std::io::Result<Vec<T>> {
    let mut table = Vec::with_capacity(len.min(READ_CHUNK));
    while table.len() < len {
        let start = table.len();
        table.resize(start + (len - start).min(READ_CHUNK), T::zeroed());
        r.read_exact(bytemuck::cast_slice_mut(&mut table[start..]))?;
    }
    if cfg!(target_endian = "big") {
        for v in table.iter_mut() {
            *v = v.from_le_word();
        }
    }
    Ok(table)
}

/// The last offset must equal the list length announced by the header.
fn check_offset_total(
    table: &'static str,
    offsets: &[TopIdx],
    expected: usize,
) -> Result<(), MeshForestError> {
    let found = offsets.last().copied().unwrap_or(0);
    if found < 0 || found as usize != expected {
        return Err(MeshForestError::TableSizeMismatch {
            table,
            expected,
            found: found.max(0) as usize,
        });
    }
    Ok(())
}

impl<D: Dimension> Connectivity<D> {
    /// Number of bytes [`write_to`](Self::write_to) produces.
    pub fn serialized_len(&self) -> usize {
        let idx = size_of::<TopIdx>();
        let mut len = D::MAGIC.len() + size_of::<HeaderWords>();
        len += self.vertices.len() * size_of::<f64>();
        len += (self.tree_to_edge.len() + self.tree_to_vertex.len() + self.tree_to_corner.len())
            * idx;
        len += self.tree_to_tree.len() * idx + self.tree_to_face.len();
        if D::EDGES > 0 {
            len += self.ett_offset.len() * idx;
        }
        len += self.edge_to_tree.len() * idx + self.edge_to_edge.len();
        len += self.ctt_offset.len() * idx;
        len += self.corner_to_tree.len() * idx + self.corner_to_corner.len();
        len
    }

    /// Serialize into `w` in the layout described at module level.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), MeshForestError> {
        w.write_all(&D::MAGIC)?;
        w.write_all(bytemuck::bytes_of(&HeaderWords::of(self)))?;

        write_table(&mut w, &self.vertices)?;
        write_table(&mut w, &self.tree_to_edge)?;
        write_table(&mut w, &self.tree_to_vertex)?;
        write_table(&mut w, &self.tree_to_corner)?;
        write_table(&mut w, &self.tree_to_tree)?;
        write_table(&mut w, &self.tree_to_face)?;
        if D::EDGES > 0 {
            write_table(&mut w, &self.ett_offset)?;
        }
        write_table(&mut w, &self.edge_to_tree)?;
        write_table(&mut w, &self.edge_to_edge)?;
        write_table(&mut w, &self.ctt_offset)?;
        write_table(&mut w, &self.corner_to_tree)?;
        write_table(&mut w, &self.corner_to_corner)?;
        w.flush()?;
        Ok(())
    }

    /// Write to a new file at `path`, truncating any existing one.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MeshForestError> {
        let file = File::create(path.as_ref())?;
        self.write_to(BufWriter::new(file))
    }

    /// Read and validate a connectivity.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self, MeshForestError> {
        let mut magic = [0u8; 6];
        r.read_exact(&mut magic)?;
        if magic != D::MAGIC {
            return Err(MeshForestError::BadMagic {
                expected: D::MAGIC,
                found: magic,
            });
        }
        let mut header = HeaderWords::zeroed();
        r.read_exact(bytemuck::bytes_of_mut(&mut header))?;
        let counts = header.counts::<D>()?;

        let trees = counts.num_trees;
        let present = |count: usize, width: usize| if count > 0 { trees * width } else { 0 };
        let vertices: Vec<f64> = read_table(&mut r, 3 * counts.num_vertices)?;
        let tree_to_edge: Vec<TopIdx> = read_table(&mut r, present(counts.num_edges, D::EDGES))?;
        let tree_to_vertex: Vec<TopIdx> = read_table(&mut r, present(counts.num_vertices, D::CHILDREN))?;
        let tree_to_corner: Vec<TopIdx> = read_table(&mut r, present(counts.num_corners, D::CHILDREN))?;
        let tree_to_tree: Vec<TopIdx> = read_table(&mut r, trees * D::FACES)?;
        let tree_to_face: Vec<i8> = read_table(&mut r, trees * D::FACES)?;
        let ett_offset: Vec<TopIdx> = if D::EDGES > 0 {
            let offsets: Vec<TopIdx> = read_table(&mut r, counts.num_edges + 1)?;
            check_offset_total("ett_offset", &offsets, counts.num_ett)?;
            offsets
        } else {
            Vec::new()
        };
        let edge_to_tree: Vec<TopIdx> = read_table(&mut r, counts.num_ett)?;
        let edge_to_edge: Vec<i8> = read_table(&mut r, counts.num_ett)?;
        let ctt_offset: Vec<TopIdx> = read_table(&mut r, counts.num_corners + 1)?;
        check_offset_total("ctt_offset", &ctt_offset, counts.num_ctt)?;
        let corner_to_tree: Vec<TopIdx> = read_table(&mut r, counts.num_ctt)?;
        let corner_to_corner: Vec<i8> = read_table(&mut r, counts.num_ctt)?;

        let conn = Self::from_tables(ConnectivityTables {
            vertices: &vertices,
            tree_to_vertex: &tree_to_vertex,
            tree_to_tree: &tree_to_tree,
            tree_to_face: &tree_to_face,
            tree_to_edge: &tree_to_edge,
            ett_offset: &ett_offset,
            edge_to_tree: &edge_to_tree,
            edge_to_edge: &edge_to_edge,
            tree_to_corner: &tree_to_corner,
            ctt_offset: &ctt_offset,
            corner_to_tree: &corner_to_tree,
            corner_to_corner: &corner_to_corner,
        })?;
        debug!(
            "loaded {}D connectivity: {} trees, {} vertices, {} edges, {} corners",
            D::DIM,
            counts.num_trees,
            counts.num_vertices,
            counts.num_edges,
            counts.num_corners
        );
        Ok(conn)
    }

    /// Read and validate the connectivity stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshForestError> {
        let file = File::open(path.as_ref())?;
        Self::read_from(BufReader::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_generation::{Periodicity, brick_2d, brick_3d};
    use crate::topology::canonical;
    use crate::topology::connectivity::{OctConnectivity, QuadConnectivity};
    use crate::topology::validation::ConnectivityViolation;

    fn bytes_of<D: Dimension>(conn: &Connectivity<D>) -> Vec<u8> {
        let mut buf = Vec::new();
        conn.write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn canonical_meshes_survive_the_file_format() {
        for conn in [
            canonical::unit_square(),
            canonical::periodic(),
            canonical::rotwrap(),
            canonical::corner(),
            canonical::moebius(),
            canonical::star(),
        ] {
            let buf = bytes_of(&conn);
            assert_eq!(buf.len(), conn.serialized_len());
            let back = QuadConnectivity::read_from(buf.as_slice()).unwrap();
            assert!(back.structural_eq(&conn));
        }
        for conn in [canonical::unit_cube(), canonical::periodic_cube()] {
            let buf = bytes_of(&conn);
            assert_eq!(buf.len(), conn.serialized_len());
            let back = OctConnectivity::read_from(buf.as_slice()).unwrap();
            assert!(back.structural_eq(&conn));
        }
    }

    #[test]
    fn header_layout_is_little_endian() {
        let buf = bytes_of(&canonical::corner());
        assert_eq!(&buf[..6], b"mfor2d");
        let word = |i: usize| u64::from_le_bytes(buf[6 + 8 * i..14 + 8 * i].try_into().unwrap());
        assert_eq!(word(0), FORMAT_VERSION);
        assert_eq!(word(1), 4);
        assert_eq!((word(2), word(3), word(4)), (7, 3, 0));
        assert_eq!((word(6), word(7)), (1, 3));
    }

    #[test]
    fn dimension_mismatch_is_bad_magic() {
        let buf = bytes_of(&canonical::unit_square());
        let err = OctConnectivity::read_from(buf.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            MeshForestError::BadMagic { found, .. } if &found == b"mfor2d"
        ));
    }

    #[test]
    fn version_and_width_are_checked() {
        let mut buf = bytes_of(&canonical::unit_square());
        buf[6] = 2;
        assert!(matches!(
            QuadConnectivity::read_from(buf.as_slice()),
            Err(MeshForestError::FormatVersion(2))
        ));
        let mut buf = bytes_of(&canonical::unit_square());
        buf[14] = 8;
        assert!(matches!(
            QuadConnectivity::read_from(buf.as_slice()),
            Err(MeshForestError::IndexWidth(8))
        ));
    }

    #[test]
    fn edges_in_a_2d_header_are_rejected() {
        let mut buf = bytes_of(&canonical::unit_square());
        buf[6 + 8 * 4] = 1;
        assert!(matches!(
            QuadConnectivity::read_from(buf.as_slice()),
            Err(MeshForestError::HeaderCount { field: "num_edges", value: 1 })
        ));
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let mut buf = bytes_of(&canonical::unit_square());
        buf[6 + 8 * 3 + 4] = 1;
        assert!(matches!(
            QuadConnectivity::read_from(buf.as_slice()),
            Err(MeshForestError::HeaderCount { field: "num_trees", .. })
        ));
    }

    #[test]
    fn truncated_file_is_an_io_error() {
        let buf = bytes_of(&canonical::star());
        let err = QuadConnectivity::read_from(&buf[..buf.len() - 1]).unwrap_err();
        assert!(matches!(err, MeshForestError::Io(_)));
    }

    #[test]
    fn huge_counts_without_tables_fail_on_read() {
        // a bare header announcing i32::MAX trees and vertices
        let mut buf = bytes_of(&canonical::unit_square())[..6 + 64].to_vec();
        let max = (TopIdx::MAX as u64).to_le_bytes();
        buf[6 + 8 * 2..6 + 8 * 3].copy_from_slice(&max);
        buf[6 + 8 * 3..6 + 8 * 4].copy_from_slice(&max);
        buf.extend_from_slice(&[0u8; 6]);
        let err = QuadConnectivity::read_from(buf.as_slice()).unwrap_err();
        assert!(matches!(err, MeshForestError::Io(_)));
    }

    #[test]
    fn tables_longer_than_one_chunk_load() {
        let conn = brick_2d(130, 130, Periodicity::none()).unwrap();
        assert!(conn.num_trees() * 4 > READ_CHUNK);
        let back = QuadConnectivity::read_from(bytes_of(&conn).as_slice()).unwrap();
        assert!(back.structural_eq(&conn));
    }

    #[test]
    fn inconsistent_offsets_are_rejected() {
        let conn = canonical::periodic();
        let mut buf = bytes_of(&conn);
        // ctt_offset = [0, 4] sits right before the corner lists (4 i32 + 4 i8)
        let last = buf.len() - 4 * 4 - 4 - 4;
        buf[last] = 3;
        assert!(matches!(
            QuadConnectivity::read_from(buf.as_slice()),
            Err(MeshForestError::TableSizeMismatch {
                table: "ctt_offset",
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn loading_revalidates() {
        let conn = canonical::corner();
        let mut buf = bytes_of(&conn);
        // first tree_to_tree entry: vertices (7*3 f64), ttv (12 i32), ttc (12 i32)
        let ttt = 6 + 64 + 7 * 3 * 8 + 12 * 4 + 12 * 4;
        buf[ttt] = 2;
        let err = QuadConnectivity::read_from(buf.as_slice()).unwrap_err();
        assert!(matches!(
            err,
            MeshForestError::InvalidConnectivity(ConnectivityViolation::FaceReciprocity { .. })
        ));
    }

    #[test]
    fn save_and_load_through_a_file() {
        let conn = brick_3d(2, 3, 2, Periodicity { x: true, y: false, z: true }).unwrap();
        let path = std::env::temp_dir().join(format!("mesh-forest-{}.mfor", std::process::id()));
        conn.save(&path).unwrap();
        let back = OctConnectivity::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(back.structural_eq(&conn));
    }
}
