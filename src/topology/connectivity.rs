//! The coarse tree connectivity.
//!
//! A [`Connectivity`] stores, for every tree, its vertices, its face
//! neighbors, and (when present) the ids of the edges and corners it shares
//! with other trees. Each edge and corner id owns a compressed list of every
//! `(tree, local feature)` that touches it, `ett_offset` / `ctt_offset`
//! delimiting the slices.
//!
//! Once built the tables are only changed by [`Connectivity::permute_trees`].

use std::marker::PhantomData;
use std::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshForestError;
use crate::topology::TopIdx;
use crate::topology::dimension::{Dim2, Dim3, Dimension};
use crate::topology::orientation::{EdgeCode, FaceCode};
use crate::topology::tables::EDGES_3D;
use crate::topology::validation::{self, ConnectivityViolation};

/// Tree connectivity of a 2D (`Dim2`) or 3D (`Dim3`) forest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Connectivity<D: Dimension> {
    pub(crate) num_vertices: usize,
    pub(crate) num_trees: usize,
    pub(crate) num_edges: usize,
    pub(crate) num_corners: usize,

    pub(crate) vertices: Vec<f64>,
    pub(crate) tree_to_vertex: Vec<TopIdx>,

    pub(crate) tree_to_tree: Vec<TopIdx>,
    pub(crate) tree_to_face: Vec<i8>,

    pub(crate) tree_to_edge: Vec<TopIdx>,
    pub(crate) ett_offset: Vec<TopIdx>,
    pub(crate) edge_to_tree: Vec<TopIdx>,
    pub(crate) edge_to_edge: Vec<i8>,

    pub(crate) tree_to_corner: Vec<TopIdx>,
    pub(crate) ctt_offset: Vec<TopIdx>,
    pub(crate) corner_to_tree: Vec<TopIdx>,
    pub(crate) corner_to_corner: Vec<i8>,

    #[serde(skip)]
    _dim: PhantomData<D>,
}

/// A quadtree connectivity.
pub type QuadConnectivity = Connectivity<Dim2>;
/// An octree connectivity.
pub type OctConnectivity = Connectivity<Dim3>;

/// Borrowed raw tables, the input of [`Connectivity::from_tables`].
///
/// Counts are derived from the slice lengths: `vertices.len() / 3`,
/// `tree_to_tree.len() / FACES`, `ett_offset.len() - 1` and
/// `ctt_offset.len() - 1`. An empty offset slice means no edges or corners.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConnectivityTables<'a> {
    pub vertices: &'a [f64],
    pub tree_to_vertex: &'a [TopIdx],
    pub tree_to_tree: &'a [TopIdx],
    pub tree_to_face: &'a [i8],
    pub tree_to_edge: &'a [TopIdx],
    pub ett_offset: &'a [TopIdx],
    pub edge_to_tree: &'a [TopIdx],
    pub edge_to_edge: &'a [i8],
    pub tree_to_corner: &'a [TopIdx],
    pub ctt_offset: &'a [TopIdx],
    pub corner_to_tree: &'a [TopIdx],
    pub corner_to_corner: &'a [i8],
}

/// Mutable view of every table, for filling a connectivity allocated with
/// [`Connectivity::new`]. Lengths are fixed; run [`Connectivity::validate`]
/// when done.
#[derive(Debug)]
pub struct ConnectivityTablesMut<'a> {
    pub vertices: &'a mut [f64],
    pub tree_to_vertex: &'a mut [TopIdx],
    pub tree_to_tree: &'a mut [TopIdx],
    pub tree_to_face: &'a mut [i8],
    pub tree_to_edge: &'a mut [TopIdx],
    pub ett_offset: &'a mut [TopIdx],
    pub edge_to_tree: &'a mut [TopIdx],
    pub edge_to_edge: &'a mut [i8],
    pub tree_to_corner: &'a mut [TopIdx],
    pub ctt_offset: &'a mut [TopIdx],
    pub corner_to_tree: &'a mut [TopIdx],
    pub corner_to_corner: &'a mut [i8],
}

fn alloc_table<T: Clone>(
    table: &'static str,
    len: usize,
    fill: T,
) -> Result<Vec<T>, MeshForestError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| MeshForestError::Allocation { table, len })?;
    v.resize(len, fill);
    Ok(v)
}

fn table_len(
    table: &'static str,
    count: usize,
    width: usize,
) -> Result<usize, MeshForestError> {
    count
        .checked_mul(width)
        .ok_or(MeshForestError::Allocation { table, len: usize::MAX })
}

fn check_count(field: &'static str, value: usize) -> Result<(), MeshForestError> {
    if value > TopIdx::MAX as usize {
        return Err(MeshForestError::HeaderCount {
            field,
            value: value as u64,
        });
    }
    Ok(())
}

fn copy_table<T: Copy>(
    table: &'static str,
    dst: &mut [T],
    src: &[T],
) -> Result<(), MeshForestError> {
    if dst.len() != src.len() {
        return Err(MeshForestError::TableSizeMismatch {
            table,
            expected: dst.len(),
            found: src.len(),
        });
    }
    dst.copy_from_slice(src);
    Ok(())
}

fn permute_rows<T: Copy>(table: &mut Vec<T>, width: usize, newid: &[usize]) {
    if table.is_empty() {
        return;
    }
    let mut out = table.clone();
    for (old, row) in table.chunks_exact(width).enumerate() {
        let new = newid[old];
        out[new * width..(new + 1) * width].copy_from_slice(row);
    }
    *table = out;
}

impl<D: Dimension> Connectivity<D> {
    /// Allocate a connectivity with every face a boundary and no vertex,
    /// edge or corner assigned (`-1`).
    ///
    /// Vertex tables are present iff `num_vertices > 0`, `tree_to_edge` iff
    /// `num_edges > 0`, `tree_to_corner` iff `num_corners > 0`. Offsets are
    /// zero except the last one, which holds the list length.
    pub fn new(
        num_vertices: usize,
        num_trees: usize,
        num_edges: usize,
        num_ett: usize,
        num_corners: usize,
        num_ctt: usize,
    ) -> Result<Self, MeshForestError> {
        if D::EDGES == 0 && (num_edges > 0 || num_ett > 0) {
            return Err(MeshForestError::TableSizeMismatch {
                table: "edge_to_tree",
                expected: 0,
                found: num_ett.max(num_edges),
            });
        }
        check_count("num_vertices", num_vertices)?;
        check_count("num_trees", num_trees)?;
        check_count("num_edges", num_edges)?;
        check_count("num_ett", num_ett)?;
        check_count("num_corners", num_corners)?;
        check_count("num_ctt", num_ctt)?;

        let vertices = alloc_table("vertices", table_len("vertices", num_vertices, 3)?, 0.0)?;
        let ttv_len = if num_vertices > 0 {
            table_len("tree_to_vertex", num_trees, D::CHILDREN)?
        } else {
            0
        };
        let tree_to_vertex = alloc_table("tree_to_vertex", ttv_len, -1)?;

        let face_len = table_len("tree_to_tree", num_trees, D::FACES)?;
        let mut tree_to_tree = alloc_table("tree_to_tree", face_len, 0)?;
        let mut tree_to_face = alloc_table("tree_to_face", face_len, 0)?;
        for (slot, (ntree, ncode)) in tree_to_tree
            .iter_mut()
            .zip(tree_to_face.iter_mut())
            .enumerate()
        {
            *ntree = (slot / D::FACES) as TopIdx;
            *ncode = (slot % D::FACES) as i8;
        }

        let tte_len = if num_edges > 0 {
            table_len("tree_to_edge", num_trees, EDGES_3D)?
        } else {
            0
        };
        let tree_to_edge = alloc_table("tree_to_edge", tte_len, -1)?;
        let mut ett_offset = alloc_table("ett_offset", num_edges + 1, 0)?;
        ett_offset[num_edges] = num_ett as TopIdx;
        let edge_to_tree = alloc_table("edge_to_tree", num_ett, 0)?;
        let edge_to_edge = alloc_table("edge_to_edge", num_ett, 0)?;

        let ttc_len = if num_corners > 0 {
            table_len("tree_to_corner", num_trees, D::CHILDREN)?
        } else {
            0
        };
        let tree_to_corner = alloc_table("tree_to_corner", ttc_len, -1)?;
        let mut ctt_offset = alloc_table("ctt_offset", num_corners + 1, 0)?;
        ctt_offset[num_corners] = num_ctt as TopIdx;
        let corner_to_tree = alloc_table("corner_to_tree", num_ctt, 0)?;
        let corner_to_corner = alloc_table("corner_to_corner", num_ctt, 0)?;

        Ok(Self {
            num_vertices,
            num_trees,
            num_edges,
            num_corners,
            vertices,
            tree_to_vertex,
            tree_to_tree,
            tree_to_face,
            tree_to_edge,
            ett_offset,
            edge_to_tree,
            edge_to_edge,
            tree_to_corner,
            ctt_offset,
            corner_to_tree,
            corner_to_corner,
            _dim: PhantomData,
        })
    }

    /// Copy raw tables into a new connectivity and validate it.
    pub fn from_tables(tables: ConnectivityTables<'_>) -> Result<Self, MeshForestError> {
        let num_vertices = tables.vertices.len() / 3;
        if tables.vertices.len() % 3 != 0 {
            return Err(MeshForestError::TableSizeMismatch {
                table: "vertices",
                expected: 3 * num_vertices,
                found: tables.vertices.len(),
            });
        }
        let num_trees = tables.tree_to_tree.len() / D::FACES;
        if tables.tree_to_tree.len() % D::FACES != 0 {
            return Err(MeshForestError::TableSizeMismatch {
                table: "tree_to_tree",
                expected: D::FACES * num_trees,
                found: tables.tree_to_tree.len(),
            });
        }
        let num_edges = tables.ett_offset.len().saturating_sub(1);
        let num_corners = tables.ctt_offset.len().saturating_sub(1);

        let mut conn = Self::new(
            num_vertices,
            num_trees,
            num_edges,
            tables.edge_to_tree.len(),
            num_corners,
            tables.corner_to_tree.len(),
        )?;

        copy_table("vertices", &mut conn.vertices, tables.vertices)?;
        copy_table("tree_to_vertex", &mut conn.tree_to_vertex, tables.tree_to_vertex)?;
        copy_table("tree_to_tree", &mut conn.tree_to_tree, tables.tree_to_tree)?;
        copy_table("tree_to_face", &mut conn.tree_to_face, tables.tree_to_face)?;
        copy_table("tree_to_edge", &mut conn.tree_to_edge, tables.tree_to_edge)?;
        if !tables.ett_offset.is_empty() {
            copy_table("ett_offset", &mut conn.ett_offset, tables.ett_offset)?;
        }
        copy_table("edge_to_tree", &mut conn.edge_to_tree, tables.edge_to_tree)?;
        copy_table("edge_to_edge", &mut conn.edge_to_edge, tables.edge_to_edge)?;
        copy_table("tree_to_corner", &mut conn.tree_to_corner, tables.tree_to_corner)?;
        if !tables.ctt_offset.is_empty() {
            copy_table("ctt_offset", &mut conn.ctt_offset, tables.ctt_offset)?;
        }
        copy_table("corner_to_tree", &mut conn.corner_to_tree, tables.corner_to_tree)?;
        copy_table("corner_to_corner", &mut conn.corner_to_corner, tables.corner_to_corner)?;

        conn.validate()?;
        Ok(conn)
    }

    /// Mutable access to every table for hand-filling.
    ///
    /// Nothing is checked on write. Run [`validate`](Self::validate) after
    /// editing and before any query: the accessors assume in-range codes
    /// and panic on anything else.
    pub fn tables_mut(&mut self) -> ConnectivityTablesMut<'_> {
        ConnectivityTablesMut {
            vertices: &mut self.vertices,
            tree_to_vertex: &mut self.tree_to_vertex,
            tree_to_tree: &mut self.tree_to_tree,
            tree_to_face: &mut self.tree_to_face,
            tree_to_edge: &mut self.tree_to_edge,
            ett_offset: &mut self.ett_offset,
            edge_to_tree: &mut self.edge_to_tree,
            edge_to_edge: &mut self.edge_to_edge,
            tree_to_corner: &mut self.tree_to_corner,
            ctt_offset: &mut self.ctt_offset,
            corner_to_tree: &mut self.corner_to_tree,
            corner_to_corner: &mut self.corner_to_corner,
        }
    }

    /// Run the full consistency check.
    pub fn validate(&self) -> Result<(), ConnectivityViolation> {
        validation::validate(self)
    }

    /// Like [`validate`](Self::validate), logging the violation.
    pub fn is_valid(&self) -> bool {
        validation::is_valid(self)
    }

    // --- counts --------------------------------------------------------

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }
    #[inline]
    pub fn num_trees(&self) -> usize {
        self.num_trees
    }
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }
    #[inline]
    pub fn num_corners(&self) -> usize {
        self.num_corners
    }
    /// Total length of the edge lists.
    #[inline]
    pub fn num_ett(&self) -> usize {
        self.edge_to_tree.len()
    }
    /// Total length of the corner lists.
    #[inline]
    pub fn num_ctt(&self) -> usize {
        self.corner_to_tree.len()
    }

    // --- raw tables ----------------------------------------------------

    pub fn vertices(&self) -> &[f64] {
        &self.vertices
    }
    pub fn tree_to_vertex(&self) -> &[TopIdx] {
        &self.tree_to_vertex
    }
    pub fn tree_to_tree(&self) -> &[TopIdx] {
        &self.tree_to_tree
    }
    pub fn tree_to_face(&self) -> &[i8] {
        &self.tree_to_face
    }
    pub fn tree_to_edge(&self) -> &[TopIdx] {
        &self.tree_to_edge
    }
    pub fn ett_offset(&self) -> &[TopIdx] {
        &self.ett_offset
    }
    pub fn edge_to_tree(&self) -> &[TopIdx] {
        &self.edge_to_tree
    }
    pub fn edge_to_edge(&self) -> &[i8] {
        &self.edge_to_edge
    }
    pub fn tree_to_corner(&self) -> &[TopIdx] {
        &self.tree_to_corner
    }
    pub fn ctt_offset(&self) -> &[TopIdx] {
        &self.ctt_offset
    }
    pub fn corner_to_tree(&self) -> &[TopIdx] {
        &self.corner_to_tree
    }
    pub fn corner_to_corner(&self) -> &[i8] {
        &self.corner_to_corner
    }

    // --- typed queries -------------------------------------------------

    /// Coordinates of vertex `i`.
    pub fn vertex(&self, i: usize) -> [f64; 3] {
        let v = &self.vertices[3 * i..3 * i + 3];
        [v[0], v[1], v[2]]
    }

    /// Vertex of `tree` at `corner`, if vertices are present.
    pub fn tree_vertex(&self, tree: usize, corner: usize) -> Option<usize> {
        debug_assert!(corner < D::CHILDREN);
        self.tree_to_vertex
            .get(tree * D::CHILDREN + corner)
            .and_then(|&v| usize::try_from(v).ok())
    }

    /// Neighbor tree and face code across `face` of `tree`.
    pub fn tree_neighbor(&self, tree: usize, face: usize) -> (usize, FaceCode) {
        let slot = tree * D::FACES + face;
        let code = FaceCode::decode::<D>(self.tree_to_face[slot])
            .expect("validated connectivity holds in-range face codes");
        (self.tree_to_tree[slot] as usize, code)
    }

    /// Whether `face` of `tree` is a domain boundary.
    pub fn is_boundary_face(&self, tree: usize, face: usize) -> bool {
        let slot = tree * D::FACES + face;
        self.tree_to_tree[slot] as usize == tree && self.tree_to_face[slot] as usize == face
    }

    /// Edge id of local `edge`, if assigned.
    pub fn tree_edge(&self, tree: usize, edge: usize) -> Option<usize> {
        if self.num_edges == 0 {
            return None;
        }
        debug_assert!(edge < D::EDGES);
        usize::try_from(self.tree_to_edge[tree * EDGES_3D + edge]).ok()
    }

    /// Corner id of local `corner`, if assigned.
    pub fn tree_corner(&self, tree: usize, corner: usize) -> Option<usize> {
        if self.num_corners == 0 {
            return None;
        }
        debug_assert!(corner < D::CHILDREN);
        usize::try_from(self.tree_to_corner[tree * D::CHILDREN + corner]).ok()
    }

    /// Slice bounds of edge `id` in `edge_to_tree` / `edge_to_edge`.
    pub fn edge_range(&self, id: usize) -> std::ops::Range<usize> {
        self.ett_offset[id] as usize..self.ett_offset[id + 1] as usize
    }

    /// Slice bounds of corner `id` in `corner_to_tree` / `corner_to_corner`.
    pub fn corner_range(&self, id: usize) -> std::ops::Range<usize> {
        self.ctt_offset[id] as usize..self.ctt_offset[id + 1] as usize
    }

    /// Every `(tree, edge code)` sharing edge `id`, in stored order.
    pub fn edge_trees(&self, id: usize) -> impl Iterator<Item = (usize, EdgeCode)> + '_ {
        let range = self.edge_range(id);
        self.edge_to_tree[range.clone()]
            .iter()
            .zip(&self.edge_to_edge[range])
            .map(|(&t, &e)| {
                let code =
                    EdgeCode::decode(e).expect("validated connectivity holds in-range edge codes");
                (t as usize, code)
            })
    }

    /// Every `(tree, local corner)` sharing corner `id`, in stored order.
    pub fn corner_trees(&self, id: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let range = self.corner_range(id);
        self.corner_to_tree[range.clone()]
            .iter()
            .zip(&self.corner_to_corner[range])
            .map(|(&t, &c)| (t as usize, c as usize))
    }

    // --- bookkeeping ---------------------------------------------------

    /// Bytes held by the struct and every owned table.
    pub fn memory_footprint(&self) -> usize {
        size_of::<Self>()
            + self.vertices.len() * size_of::<f64>()
            + (self.tree_to_vertex.len()
                + self.tree_to_tree.len()
                + self.tree_to_edge.len()
                + self.ett_offset.len()
                + self.edge_to_tree.len()
                + self.tree_to_corner.len()
                + self.ctt_offset.len()
                + self.corner_to_tree.len())
                * size_of::<TopIdx>()
            + (self.tree_to_face.len() + self.edge_to_edge.len() + self.corner_to_corner.len())
                * size_of::<i8>()
    }

    /// Counts first, then every table entry; vertices compare by bit
    /// pattern. Equivalent connectivities with different numbering differ.
    pub fn structural_eq(&self, other: &Self) -> bool {
        self.num_vertices == other.num_vertices
            && self.num_trees == other.num_trees
            && self.num_edges == other.num_edges
            && self.num_corners == other.num_corners
            && self.num_ett() == other.num_ett()
            && self.num_ctt() == other.num_ctt()
            && self
                .vertices
                .iter()
                .map(|v| v.to_bits())
                .eq(other.vertices.iter().map(|v| v.to_bits()))
            && self.tree_to_vertex == other.tree_to_vertex
            && self.tree_to_tree == other.tree_to_tree
            && self.tree_to_face == other.tree_to_face
            && self.tree_to_edge == other.tree_to_edge
            && self.ett_offset == other.ett_offset
            && self.edge_to_tree == other.edge_to_tree
            && self.edge_to_edge == other.edge_to_edge
            && self.tree_to_corner == other.tree_to_corner
            && self.ctt_offset == other.ctt_offset
            && self.corner_to_tree == other.corner_to_tree
            && self.corner_to_corner == other.corner_to_corner
    }

    /// Renumber trees so that old tree `t` becomes `newid[t]`.
    ///
    /// Every tree reference is renamed and the per-tree tables are permuted;
    /// the compressed lists keep their order.
    pub fn permute_trees(&mut self, newid: &[usize]) {
        assert_eq!(newid.len(), self.num_trees, "permutation length");
        debug_assert!({
            let mut seen = vec![false; newid.len()];
            newid.iter().all(|&n| n < seen.len() && !std::mem::replace(&mut seen[n], true))
        });

        for t in self
            .tree_to_tree
            .iter_mut()
            .chain(self.edge_to_tree.iter_mut())
            .chain(self.corner_to_tree.iter_mut())
        {
            *t = newid[*t as usize] as TopIdx;
        }

        permute_rows(&mut self.tree_to_vertex, D::CHILDREN, newid);
        permute_rows(&mut self.tree_to_tree, D::FACES, newid);
        permute_rows(&mut self.tree_to_face, D::FACES, newid);
        permute_rows(&mut self.tree_to_edge, EDGES_3D, newid);
        permute_rows(&mut self.tree_to_corner, D::CHILDREN, newid);

        crate::debug_invariants!(self.validate(), "permuted connectivity");
    }
}

impl<D: Dimension> DebugInvariants for Connectivity<D> {
    fn validate_invariants(&self) -> Result<(), MeshForestError> {
        self.validate().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::canonical;

    #[test]
    fn new_allocates_boundary_faces() {
        let conn = QuadConnectivity::new(0, 3, 0, 0, 0, 0).unwrap();
        assert_eq!(conn.num_trees(), 3);
        assert!(conn.tree_to_vertex().is_empty());
        assert_eq!(conn.ett_offset(), &[0]);
        assert_eq!(conn.ctt_offset(), &[0]);
        for t in 0..3 {
            for f in 0..4 {
                assert!(conn.is_boundary_face(t, f));
            }
        }
        assert!(conn.is_valid());
    }

    #[test]
    fn new_rejects_edges_in_2d() {
        let err = QuadConnectivity::new(0, 1, 1, 4, 0, 0).unwrap_err();
        assert!(matches!(err, MeshForestError::TableSizeMismatch { .. }));
    }

    #[test]
    fn new_sets_offset_totals() {
        let conn = OctConnectivity::new(8, 1, 2, 5, 1, 3).unwrap();
        assert_eq!(conn.ett_offset(), &[0, 0, 5]);
        assert_eq!(conn.ctt_offset(), &[0, 3]);
        assert_eq!(conn.tree_to_edge().len(), 12);
        assert!(conn.tree_to_edge().iter().all(|&e| e == -1));
        assert_eq!(conn.tree_to_corner().len(), 8);
    }

    #[test]
    fn hand_filled_unit_square_is_valid() {
        let mut conn = QuadConnectivity::new(4, 1, 0, 0, 0, 0).unwrap();
        let t = conn.tables_mut();
        t.vertices
            .copy_from_slice(&[0., 0., 0., 1., 0., 0., 0., 1., 0., 1., 1., 0.]);
        t.tree_to_vertex.copy_from_slice(&[0, 1, 2, 3]);
        assert!(conn.is_valid());
        assert!(conn.structural_eq(&canonical::unit_square()));
    }

    #[test]
    fn hand_edits_are_caught_by_validate() {
        let mut conn = canonical::unit_square();
        conn.tables_mut().tree_to_face[1] = 99;
        assert!(matches!(
            conn.validate(),
            Err(ConnectivityViolation::EntryRange {
                table: "tree_to_face",
                index: 1,
                value: 99
            })
        ));
    }

    #[test]
    #[should_panic(expected = "in-range face codes")]
    fn queries_on_unvalidated_edits_panic() {
        let mut conn = canonical::unit_square();
        conn.tables_mut().tree_to_face[1] = 99;
        let _ = conn.tree_neighbor(0, 1);
    }

    #[test]
    fn from_tables_rejects_short_tables() {
        let err = QuadConnectivity::from_tables(ConnectivityTables {
            tree_to_tree: &[0, 0, 0, 0],
            tree_to_face: &[0, 1, 2],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            MeshForestError::TableSizeMismatch {
                table: "tree_to_face",
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn from_tables_rejects_inconsistent_tables() {
        let err = QuadConnectivity::from_tables(ConnectivityTables {
            tree_to_tree: &[0, 0, 0, 0],
            tree_to_face: &[1, 1, 2, 3],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, MeshForestError::InvalidConnectivity(_)));
    }

    #[test]
    fn accessors_decode_codes() {
        let conn = canonical::rotwrap();
        let (ntree, code) = conn.tree_neighbor(0, 2);
        assert_eq!(ntree, 0);
        assert_eq!(code, FaceCode::new(3, 1));
        assert_eq!(conn.tree_corner(0, 2), Some(0));
        let members: Vec<_> = conn.corner_trees(0).collect();
        assert_eq!(members, vec![(0, 0), (0, 1), (0, 2), (0, 3)]);
        assert_eq!(conn.vertex(3), [1.0, 1.0, 0.0]);
        assert_eq!(conn.tree_vertex(0, 3), Some(3));
    }

    #[test]
    fn footprint_counts_compressed_lists() {
        let plain = canonical::unit_square();
        let periodic = canonical::periodic();
        assert!(periodic.memory_footprint() > plain.memory_footprint());
        assert_eq!(
            periodic.memory_footprint() - plain.memory_footprint(),
            (4 + 1 + 4) * size_of::<TopIdx>() + 4
        );
    }

    #[test]
    fn structural_eq_is_sensitive_to_every_table() {
        let a = canonical::periodic();
        let mut b = a.clone();
        assert!(a.structural_eq(&b));
        b.corner_to_corner.swap(0, 1);
        assert!(!a.structural_eq(&b));
        assert!(!a.structural_eq(&canonical::rotwrap()));
    }

    #[test]
    fn permute_trees_reverses_corner_fan() {
        let mut conn = canonical::corner();
        conn.permute_trees(&[2, 1, 0]);
        assert!(conn.is_valid());
        assert_eq!(conn.corner_to_tree(), &[2, 1, 0]);
        assert_eq!(&conn.tree_to_vertex()[8..12], &[0, 1, 2, 3]);
    }
}
