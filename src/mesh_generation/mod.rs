//! Structured brick connectivities with optional periodicity per axis.
//!
//! Trees are numbered along the bit-interleaved order of
//! [`BrickIndexer`], so a brick is already Morton-local. Corner and edge
//! ids are owned by the tree for which the feature is the upper (high side
//! on every axis) one, and each compressed list stores tree `t`'s local
//! corner `i` at slot `CHILDREN - 1 - i` (edges: slot `3 - j`).

pub mod brick_index;

pub use brick_index::BrickIndexer;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::mesh_error::MeshForestError;
use crate::topology::TopIdx;
use crate::topology::connectivity::{Connectivity, OctConnectivity, QuadConnectivity};
use crate::topology::dimension::{Dim2, Dim3, Dimension};
use crate::topology::tables::EDGES_3D;

/// Optional periodic identification for structured meshes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periodicity {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl Periodicity {
    /// No periodic directions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Periodic in every direction.
    pub fn all() -> Self {
        Self {
            x: true,
            y: true,
            z: true,
        }
    }

    fn as_array(self) -> [bool; 3] {
        [self.x, self.y, self.z]
    }
}

/// Optional configuration for mesh generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshGenerationOptions {
    pub periodic: Periodicity,
}

impl From<Periodicity> for MeshGenerationOptions {
    fn from(periodic: Periodicity) -> Self {
        Self { periodic }
    }
}

fn invalid_geometry(message: impl Into<String>) -> MeshForestError {
    MeshForestError::InvalidGeometry(message.into())
}

fn product(values: impl IntoIterator<Item = usize>) -> Result<usize, MeshForestError> {
    values
        .into_iter()
        .try_fold(1usize, |acc, v| acc.checked_mul(v))
        .ok_or_else(|| invalid_geometry("brick size overflows the index range"))
}

/// Box geometry shared by both passes.
struct Grid {
    dim: usize,
    ext: [usize; 3],
    periodic: [bool; 3],
}

impl Grid {
    /// Whether the feature on `side` (0 low, 1 high) of `axis` lies on a
    /// non-periodic outer boundary.
    fn on_boundary(&self, coords: &[u64; 3], axis: usize, side: usize) -> bool {
        let c = coords[axis] as usize;
        !self.periodic[axis]
            && ((c == 0 && side == 0) || (c == self.ext[axis] - 1 && side == 1))
    }

    /// Whether the high side of `axis` is shared with another tree.
    fn interior_high(&self, coords: &[u64; 3], axis: usize) -> bool {
        !self.on_boundary(coords, axis, 1)
    }

    fn contains(&self, coords: &[u64; 3]) -> bool {
        (0..self.dim).all(|a| (coords[a] as usize) < self.ext[a])
    }

    /// `coords` moved by `delta`, wrapped into the grid.
    fn shifted(&self, coords: &[u64; 3], delta: [i64; 3]) -> [u64; 3] {
        let mut out = [0u64; 3];
        for a in 0..self.dim {
            let e = self.ext[a] as i64;
            out[a] = ((coords[a] as i64 + delta[a] + e) % e) as u64;
        }
        out
    }
}

/// Build a brick of `extents` trees (one entry per axis).
///
/// Counts: `T = Πext`, corners `Πc` with `c = ext` on periodic axes and
/// `ext - 1` otherwise, vertices `Π(ext + 1)`, and in 3D edges
/// `Σ_axis ext[axis] · Π_{other} c[other]`.
pub fn brick<D: Dimension>(
    extents: &[usize],
    options: impl Into<MeshGenerationOptions>,
) -> Result<Connectivity<D>, MeshForestError> {
    let options = options.into();
    let dim = D::DIM;
    if extents.len() != dim {
        return Err(invalid_geometry(format!(
            "{} extents given for a {dim}D brick",
            extents.len()
        )));
    }
    if let Some(axis) = extents.iter().position(|&e| e == 0) {
        return Err(invalid_geometry(format!("extent along axis {axis} is zero")));
    }

    let mut grid = Grid {
        dim,
        ext: [1; 3],
        periodic: [false; 3],
    };
    grid.ext[..dim].copy_from_slice(extents);
    grid.periodic[..dim].copy_from_slice(&options.periodic.as_array()[..dim]);

    let cext: Vec<usize> = (0..dim)
        .map(|a| if grid.periodic[a] { grid.ext[a] } else { grid.ext[a] - 1 })
        .collect();
    let num_trees = product(extents.iter().copied())?;
    let num_corners = product(cext.iter().copied())?;
    let num_vertices = product(extents.iter().map(|e| e + 1))?;
    let num_edges = if dim == 3 {
        let mut total = 0usize;
        for axis in 0..3 {
            let along = product((0..3).map(|b| if b == axis { grid.ext[b] } else { cext[b] }))?;
            total = total
                .checked_add(along)
                .ok_or_else(|| invalid_geometry("brick size overflows the index range"))?;
        }
        total
    } else {
        0
    };
    let children = D::CHILDREN;

    let mut conn = Connectivity::<D>::new(
        num_vertices,
        num_trees,
        num_edges,
        4 * num_edges,
        num_corners,
        children * num_corners,
    )?;
    for (id, off) in conn.ett_offset.iter_mut().enumerate() {
        *off = (4 * id) as TopIdx;
    }
    for (id, off) in conn.ctt_offset.iter_mut().enumerate() {
        *off = (children * id) as TopIdx;
    }

    let indexer = BrickIndexer::<D>::new(extents);
    let n_iter = indexer.len();

    // pass 1: dense tree, corner and per-axis edge ids in linear order
    let mut linear_to_tree = vec![-1 as TopIdx; n_iter as usize];
    let mut tree_to_corner2 = vec![-1 as TopIdx; num_trees];
    let mut tree_to_edge2 = vec![-1 as TopIdx; if dim == 3 { 3 * num_trees } else { 0 }];
    let (mut tj, mut tk, mut tl) = (0usize, 0usize, 0usize);
    for ti in 0..n_iter {
        let coords = indexer.linear_to_coords(ti);
        if !grid.contains(&coords) {
            continue;
        }
        linear_to_tree[ti as usize] = tj as TopIdx;
        if (0..dim).all(|a| grid.interior_high(&coords, a)) {
            tree_to_corner2[tj] = tk as TopIdx;
            tk += 1;
        }
        if dim == 3 {
            for axis in 0..3 {
                if (0..3).filter(|&b| b != axis).all(|b| grid.interior_high(&coords, b)) {
                    tree_to_edge2[3 * tj + axis] = tl as TopIdx;
                    tl += 1;
                }
            }
        }
        tj += 1;
    }
    debug_assert_eq!((tj, tk, tl), (num_trees, num_corners, num_edges));

    // pass 2: faces, edges, corners and shared vertices
    let tree_at =
        |coords: [u64; 3]| linear_to_tree[indexer.coords_to_linear(coords) as usize] as usize;
    let mut vcount = 0usize;
    for ti in 0..n_iter {
        let coords = indexer.linear_to_coords(ti);
        if !grid.contains(&coords) {
            continue;
        }
        let tj = linear_to_tree[ti as usize] as usize;

        let mut tf = [0usize; 6];
        for axis in 0..dim {
            for side in 0..2 {
                let mut delta = [0i64; 3];
                delta[axis] = 2 * side as i64 - 1;
                tf[2 * axis + side] = tree_at(grid.shifted(&coords, delta));
            }
        }
        let mut te = [0usize; EDGES_3D];
        if dim == 3 {
            for axis in 0..3 {
                let (dir1, dir2) = edge_dirs(axis);
                for j in 0..4 {
                    let mut delta = [0i64; 3];
                    delta[dir1] = 2 * (j & 1) as i64 - 1;
                    delta[dir2] = 2 * (j >> 1) as i64 - 1;
                    te[4 * axis + j] = tree_at(grid.shifted(&coords, delta));
                }
            }
        }
        let mut tc = [0usize; 8];
        for (corner, t) in tc.iter_mut().enumerate().take(children) {
            let mut delta = [0i64; 3];
            for (a, d) in delta.iter_mut().enumerate().take(dim) {
                *d = if (corner >> a) & 1 == 0 { -1 } else { 1 };
            }
            *t = tree_at(grid.shifted(&coords, delta));
        }

        for axis in 0..dim {
            for side in 0..2 {
                let face = 2 * axis + side;
                let slot = tj * D::FACES + face;
                if grid.on_boundary(&coords, axis, side) {
                    conn.tree_to_tree[slot] = tj as TopIdx;
                    conn.tree_to_face[slot] = face as i8;
                } else {
                    conn.tree_to_tree[slot] = tf[face] as TopIdx;
                    conn.tree_to_face[slot] = D::face_dual(face) as i8;
                }
            }
        }

        if num_edges > 0 {
            for axis in 0..3 {
                let (dir1, dir2) = edge_dirs(axis);
                for j in 0..4 {
                    let edge = 4 * axis + j;
                    let slot = tj * EDGES_3D + edge;
                    if grid.on_boundary(&coords, dir1, j & 1)
                        || grid.on_boundary(&coords, dir2, j >> 1)
                    {
                        conn.tree_to_edge[slot] = -1;
                        continue;
                    }
                    let owner = match j {
                        0 => te[edge],
                        1 => tf[2 * dir2],
                        2 => tf[2 * dir1],
                        _ => tj,
                    };
                    let id = tree_to_edge2[3 * owner + axis];
                    debug_assert!(id >= 0, "edge owner {owner} carries no id on axis {axis}");
                    let id = id as usize;
                    conn.tree_to_edge[slot] = id as TopIdx;
                    conn.edge_to_tree[4 * id + 3 - j] = tj as TopIdx;
                    conn.edge_to_edge[4 * id + 3 - j] = edge as i8;
                }
            }
        }

        for corner in 0..children {
            if num_corners > 0 {
                let on_boundary =
                    (0..dim).any(|a| grid.on_boundary(&coords, a, (corner >> a) & 1));
                if on_boundary {
                    conn.tree_to_corner[tj * children + corner] = -1;
                } else {
                    let owner = corner_owner::<D>(corner, tj, &tf, &te, &tc);
                    let id = tree_to_corner2[owner];
                    debug_assert!(id >= 0, "corner owner {owner} carries no id");
                    let id = id as usize;
                    conn.tree_to_corner[tj * children + corner] = id as TopIdx;
                    conn.corner_to_tree[id * children + children - 1 - corner] = tj as TopIdx;
                    conn.corner_to_corner[id * children + children - 1 - corner] = corner as i8;
                }
            }

            let slot = tj * children + corner;
            let (tx, ty, tz) = (coords[0], coords[1], coords[2]);
            let vertex = if dim == 3 && tz > 0 && corner >> 2 == 0 {
                conn.tree_to_vertex[tf[4] * children + corner + 4]
            } else if ty > 0 && (corner >> 1) & 1 == 0 {
                conn.tree_to_vertex[tf[2] * children + corner + 2]
            } else if tx > 0 && corner & 1 == 0 {
                conn.tree_to_vertex[tf[0] * children + corner + 1]
            } else {
                let v = &mut conn.vertices[3 * vcount..3 * vcount + 3];
                v[0] = (tx + (corner & 1) as u64) as f64;
                v[1] = (ty + ((corner >> 1) & 1) as u64) as f64;
                v[2] = if dim == 3 { (tz + (corner >> 2) as u64) as f64 } else { 0.0 };
                vcount += 1;
                (vcount - 1) as TopIdx
            };
            conn.tree_to_vertex[slot] = vertex;
        }
    }
    debug_assert_eq!(vcount, num_vertices);

    debug!(
        "brick {:?} periodic {:?}: {} trees, {} edges, {} corners, {} vertices",
        extents, options.periodic, num_trees, num_edges, num_corners, num_vertices
    );
    crate::debug_invariants!(conn.validate(), "brick connectivity");
    Ok(conn)
}

/// The two axes spanning the cross-section of an edge along `axis`, in
/// ascending order.
fn edge_dirs(axis: usize) -> (usize, usize) {
    (if axis == 0 { 1 } else { 0 }, if axis == 2 { 1 } else { 2 })
}

/// Tree whose upper corner is local `corner` of tree `tj`.
fn corner_owner<D: Dimension>(
    corner: usize,
    tj: usize,
    tf: &[usize; 6],
    te: &[usize; EDGES_3D],
    tc: &[usize; 8],
) -> usize {
    if D::DIM == 2 {
        [tc[0], tf[2], tf[0], tj][corner]
    } else {
        [tc[0], te[0], te[4], tf[4], te[8], tf[2], tf[0], tj][corner]
    }
}

/// `m × n` quadtree brick.
pub fn brick_2d(
    m: usize,
    n: usize,
    options: impl Into<MeshGenerationOptions>,
) -> Result<QuadConnectivity, MeshForestError> {
    brick::<Dim2>(&[m, n], options)
}

/// `m × n × p` octree brick.
pub fn brick_3d(
    m: usize,
    n: usize,
    p: usize,
    options: impl Into<MeshGenerationOptions>,
) -> Result<OctConnectivity, MeshForestError> {
    brick::<Dim3>(&[m, n, p], options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_by_two_counts() {
        let conn = brick_2d(3, 2, Periodicity::none()).unwrap();
        assert_eq!(conn.num_trees(), 6);
        assert_eq!(conn.num_corners(), 2);
        assert_eq!(conn.num_vertices(), 12);
        assert_eq!(conn.ctt_offset(), &[0, 4, 8]);
        assert!(conn.is_valid());
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert!(matches!(
            brick_2d(0, 3, Periodicity::none()),
            Err(MeshForestError::InvalidGeometry(_))
        ));
        assert!(matches!(
            brick::<Dim3>(&[1, 2], Periodicity::none()),
            Err(MeshForestError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn single_tree_periodic_matches_hand_built_faces() {
        let conn = brick_2d(1, 1, Periodicity::all()).unwrap();
        assert_eq!(conn.tree_to_tree(), &[0, 0, 0, 0]);
        assert_eq!(conn.tree_to_face(), &[1, 0, 3, 2]);
        assert_eq!(conn.corner_to_corner(), &[3, 2, 1, 0]);
    }

    #[test]
    fn vertices_are_shared_between_neighbors() {
        let conn = brick_2d(2, 1, Periodicity::none()).unwrap();
        // tree 0 right corners are tree 1 left corners
        assert_eq!(conn.tree_vertex(0, 1), conn.tree_vertex(1, 0));
        assert_eq!(conn.tree_vertex(0, 3), conn.tree_vertex(1, 2));
        assert_eq!(conn.vertex(conn.tree_vertex(1, 3).unwrap()), [2.0, 1.0, 0.0]);
    }

    #[test]
    fn periodic_cube_edges() {
        let conn = brick_3d(1, 1, 1, Periodicity::all()).unwrap();
        assert_eq!(conn.num_edges(), 3);
        assert_eq!(conn.num_corners(), 1);
        assert_eq!(conn.tree_to_edge(), &[0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
        assert!(conn.is_valid());
    }
}
