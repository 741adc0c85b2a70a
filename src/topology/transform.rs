//! Neighbor queries across faces, edges and corners of a tree.
//!
//! Face neighbors come straight from `tree_to_tree` / `tree_to_face`.
//! Edge and corner neighbors are read from the compressed lists, dropping
//! the entry for the queried feature itself and every entry already reached
//! through a face (or, for corners, an edge). What remains are the
//! all-diagonal neighbors.

use serde::{Deserialize, Serialize};

use crate::topology::connectivity::Connectivity;
use crate::topology::dimension::Dimension;
use crate::topology::tables::edge_between_corners;

/// Change of coordinate frame from a tree to its neighbor across a face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FaceTransform {
    /// My tangential axes followed by my normal axis.
    pub my_axis: [usize; 3],
    /// The neighbor's axes matching `my_axis`.
    pub target_axis: [usize; 3],
    /// Whether each tangential axis runs backwards in the neighbor.
    pub edge_reverse: [bool; 2],
    /// `2 * (my_face & 1) + (neighbor_face & 1)`.
    pub normal_code: u8,
    tangents: u8,
}

impl FaceTransform {
    pub(crate) fn quad(iface: usize, nface: usize, orientation: usize) -> Self {
        Self {
            my_axis: [1 - iface / 2, 0, iface / 2],
            target_axis: [1 - nface / 2, 0, nface / 2],
            edge_reverse: [orientation != 0, false],
            normal_code: (2 * (iface & 1) + (nface & 1)) as u8,
            tangents: 1,
        }
    }

    pub(crate) fn oct(iface: usize, nface: usize, orientation: usize) -> Self {
        use crate::topology::tables::FACE_PERMUTATION_REFS as REFS;

        let my_axis = [
            if iface < 2 { 1 } else { 0 },
            if iface < 4 { 2 } else { 1 },
            iface / 2,
        ];
        let reverse = (REFS[0][iface] ^ REFS[0][nface] ^ (orientation == 0 || orientation == 3) as usize) & 1;
        let mut target_axis = [0; 3];
        target_axis[reverse] = if nface < 2 { 1 } else { 0 };
        target_axis[1 - reverse] = if nface < 4 { 2 } else { 1 };
        target_axis[2] = nface / 2;

        let swapped = (REFS[iface][nface] == 1) as usize;
        let mut edge_reverse = [false; 2];
        edge_reverse[swapped] = orientation & 1 != 0;
        edge_reverse[1 - swapped] = orientation >> 1 != 0;

        let ft = Self {
            my_axis,
            target_axis,
            edge_reverse,
            normal_code: (2 * (iface & 1) + (nface & 1)) as u8,
            tangents: 2,
        };
        debug_assert!(is_axis_permutation(ft.my_axis) && is_axis_permutation(ft.target_axis));
        ft
    }

    /// Packed form: `my_axis`, `target_axis`, `edge_reverse`, `normal_code`.
    pub fn as_array(&self) -> [i32; 9] {
        [
            self.my_axis[0] as i32,
            self.my_axis[1] as i32,
            self.my_axis[2] as i32,
            self.target_axis[0] as i32,
            self.target_axis[1] as i32,
            self.target_axis[2] as i32,
            self.edge_reverse[0] as i32,
            self.edge_reverse[1] as i32,
            self.normal_code as i32,
        ]
    }

    /// Map integer coordinates at `level` (possibly just outside my tree)
    /// into the neighbor's frame.
    ///
    /// A quadrant one step across my face lands one step inside the
    /// neighbor's face.
    pub fn transform_coords(&self, coords: [i64; 3], level: u8) -> [i64; 3] {
        let root = 1i64 << level;
        let mut out = [0i64; 3];
        for k in 0..self.tangents as usize {
            let m = coords[self.my_axis[k]];
            out[self.target_axis[k]] = if self.edge_reverse[k] { root - 1 - m } else { m };
        }
        let m = coords[self.my_axis[2]];
        out[self.target_axis[2]] = match self.normal_code {
            0 => -m - 1,
            1 => m + root,
            2 => m - root,
            _ => 2 * root - m - 1,
        };
        out
    }
}

fn is_axis_permutation(axes: [usize; 3]) -> bool {
    let mut seen = [false; 3];
    axes.iter().all(|&a| a < 3 && !std::mem::replace(&mut seen[a], true))
}

/// Neighbor across `face` of `tree` and the frame change to reach it.
///
/// `None` for a boundary face, i.e. one glued to itself with orientation 0.
pub fn find_face_transform<D: Dimension>(
    conn: &Connectivity<D>,
    tree: usize,
    face: usize,
) -> Option<(usize, FaceTransform)> {
    debug_assert!(tree < conn.num_trees() && face < D::FACES);
    if conn.is_boundary_face(tree, face) {
        return None;
    }
    let (ntree, code) = conn.tree_neighbor(tree, face);
    Some((
        ntree,
        D::face_transform(face, code.face_index(), code.orientation_index()),
    ))
}

/// A diagonal edge neighbor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeTransform {
    pub ntree: usize,
    pub nedge: usize,
    /// Direction of the neighbor edge relative to mine.
    pub nflip: bool,
}

/// Result of [`find_edge_transform`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeInfo {
    pub iedge: usize,
    pub transforms: Vec<EdgeTransform>,
    /// Non-boundary faces touching the edge.
    pub face_neighbors: usize,
}

impl EdgeInfo {
    /// Length the edge's list must have to be explained by this result.
    pub fn expected_count(&self) -> usize {
        self.transforms.len() + 1 + self.face_neighbors
    }
}

/// Diagonal neighbors of local `edge` of `tree`. Empty when the
/// connectivity has no edges or the edge carries no id.
pub fn find_edge_transform<D: Dimension>(
    conn: &Connectivity<D>,
    tree: usize,
    edge: usize,
) -> EdgeInfo {
    let mut info = EdgeInfo {
        iedge: edge,
        ..Default::default()
    };
    if D::EDGES == 0 {
        return info;
    }
    let Some(id) = conn.tree_edge(tree, edge) else {
        return info;
    };

    let own_flip = conn
        .edge_trees(id)
        .find(|&(t, code)| t == tree && code.edge_index() == edge)
        .map(|(_, code)| code.flip)
        .unwrap_or(false);

    // edges reached through either touching face
    let [c0, c1] = D::edge_corners(edge);
    let mut via_face: [Option<(usize, Option<usize>)>; 2] = [None; 2];
    for (slot, iface) in D::edge_faces(edge).into_iter().enumerate() {
        if conn.is_boundary_face(tree, iface) {
            continue;
        }
        info.face_neighbors += 1;
        let (ntree, code) = conn.tree_neighbor(tree, iface);
        let across = |c: usize| {
            let fc = D::corner_face_corner(c, iface).unwrap_or_default();
            let nfc = D::face_corner_across(iface, code.face_index(), code.orientation_index(), fc);
            D::face_corners(code.face_index())[nfc]
        };
        via_face[slot] = Some((ntree, edge_between_corners(across(c0), across(c1))));
    }

    for (ntree, code) in conn.edge_trees(id) {
        let nedge = code.edge_index();
        if ntree == tree && nedge == edge {
            continue;
        }
        if via_face
            .iter()
            .flatten()
            .any(|&(t, e)| t == ntree && e == Some(nedge))
        {
            continue;
        }
        info.transforms.push(EdgeTransform {
            ntree,
            nedge,
            nflip: code.flip ^ own_flip,
        });
    }
    info
}

/// A diagonal corner neighbor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CornerTransform {
    pub ntree: usize,
    pub ncorner: usize,
}

/// Result of [`find_corner_transform`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CornerInfo {
    pub icorner: usize,
    pub transforms: Vec<CornerTransform>,
    /// Non-boundary faces touching the corner.
    pub face_neighbors: usize,
    /// List entries reached through an edge neighbor instead.
    pub edge_omitted: usize,
}

impl CornerInfo {
    /// Length the corner's list must have to be explained by this result.
    pub fn expected_count(&self) -> usize {
        self.transforms.len() + 1 + self.face_neighbors + self.edge_omitted
    }
}

/// Diagonal neighbors of local `corner` of `tree`, in list order.
///
/// A list entry is dropped when it is the corner itself, when a face
/// neighbor's corner permutation lands on it, or (3D) when a diagonal edge
/// neighbor's matching end lands on it.
pub fn find_corner_transform<D: Dimension>(
    conn: &Connectivity<D>,
    tree: usize,
    corner: usize,
) -> CornerInfo {
    let mut info = CornerInfo {
        icorner: corner,
        ..Default::default()
    };
    let Some(id) = conn.tree_corner(tree, corner) else {
        return info;
    };

    let mut via_face = Vec::with_capacity(D::DIM);
    for &iface in D::corner_faces(corner) {
        if conn.is_boundary_face(tree, iface) {
            continue;
        }
        info.face_neighbors += 1;
        let (ntree, code) = conn.tree_neighbor(tree, iface);
        let nface = code.face_index();
        let fcorner = D::corner_face_corner(corner, iface).unwrap_or_default();
        let fc = D::face_corner_across(iface, nface, code.orientation_index(), fcorner);
        via_face.push((ntree, D::face_corners(nface)[fc]));
    }

    let via_edge: Vec<(bool, EdgeInfo)> = D::corner_edges(corner)
        .iter()
        .filter(|&&iedge| conn.tree_edge(tree, iedge).is_some())
        .map(|&iedge| {
            let iwhich = D::edge_corners(iedge)[1] == corner;
            (iwhich, find_edge_transform(conn, tree, iedge))
        })
        .collect();

    for (ntree, ncorner) in conn.corner_trees(id) {
        if ntree == tree && ncorner == corner {
            continue;
        }
        if via_face.contains(&(ntree, ncorner)) {
            continue;
        }
        let reached_by_edge = via_edge.iter().any(|(iwhich, ei)| {
            ei.transforms.iter().any(|et| {
                et.ntree == ntree && D::edge_corners(et.nedge)[(et.nflip ^ iwhich) as usize] == ncorner
            })
        });
        if reached_by_edge {
            info.edge_omitted += 1;
            continue;
        }
        info.transforms.push(CornerTransform { ntree, ncorner });
    }
    info
}
