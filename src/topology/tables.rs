//! Static incidence tables for quadtree (2D) and octree (3D) trees.
//!
//! Numbering conventions shared by every table:
//! - corner `c` has bit 0 = x side, bit 1 = y side, bit 2 = z side;
//! - face `2 * axis + side`;
//! - edge `4 * axis + j`, where `j & 1` selects the side along the first
//!   remaining axis and `j >> 1` the side along the second one.

use static_assertions::const_assert_eq;

// ===== 2D =================================================================

pub const FACES_2D: usize = 4;
pub const CHILDREN_2D: usize = 4;

/// Corners of each face, in face-local order.
pub const FACE_CORNERS_2D: [[usize; 2]; FACES_2D] = [[0, 2], [1, 3], [0, 1], [2, 3]];

/// Opposite face on the same axis.
pub const FACE_DUAL_2D: [usize; FACES_2D] = [1, 0, 3, 2];

/// Faces touching each corner, x face first.
pub const CORNER_FACES_2D: [[usize; 2]; CHILDREN_2D] = [[0, 2], [1, 2], [0, 3], [1, 3]];

/// Position of a corner within a face's corner list, or -1.
pub const CORNER_FACE_CORNERS_2D: [[i8; FACES_2D]; CHILDREN_2D] = [
    [0, -1, 0, -1],
    [-1, 0, 1, -1],
    [1, -1, -1, 0],
    [-1, 1, -1, 1],
];

/// Parent face on which corner `k` of child `c` lies, or -1 for the
/// parent's own corner and the center.
pub const CHILD_CORNER_FACES_2D: [[i8; CHILDREN_2D]; CHILDREN_2D] = [
    [-1, 2, 0, -1],
    [2, -1, -1, 1],
    [0, -1, -1, 3],
    [-1, 1, 3, -1],
];

// ===== 3D =================================================================

pub const FACES_3D: usize = 6;
pub const CHILDREN_3D: usize = 8;
pub const EDGES_3D: usize = 12;

pub const FACE_CORNERS_3D: [[usize; 4]; FACES_3D] = [
    [0, 2, 4, 6],
    [1, 3, 5, 7],
    [0, 1, 4, 5],
    [2, 3, 6, 7],
    [0, 1, 2, 3],
    [4, 5, 6, 7],
];

pub const FACE_DUAL_3D: [usize; FACES_3D] = [1, 0, 3, 2, 5, 4];

pub const FACE_EDGES_3D: [[usize; 4]; FACES_3D] = [
    [4, 6, 8, 10],
    [5, 7, 9, 11],
    [0, 2, 8, 9],
    [1, 3, 10, 11],
    [0, 1, 4, 5],
    [2, 3, 6, 7],
];

pub const CORNER_FACES_3D: [[usize; 3]; CHILDREN_3D] = [
    [0, 2, 4],
    [1, 2, 4],
    [0, 3, 4],
    [1, 3, 4],
    [0, 2, 5],
    [1, 2, 5],
    [0, 3, 5],
    [1, 3, 5],
];

/// Edges touching each corner, ordered by edge axis.
pub const CORNER_EDGES_3D: [[usize; 3]; CHILDREN_3D] = [
    [0, 4, 8],
    [0, 5, 9],
    [1, 4, 10],
    [1, 5, 11],
    [2, 6, 8],
    [2, 7, 9],
    [3, 6, 10],
    [3, 7, 11],
];

pub const CORNER_FACE_CORNERS_3D: [[i8; FACES_3D]; CHILDREN_3D] = [
    [0, -1, 0, -1, 0, -1],
    [-1, 0, 1, -1, 1, -1],
    [1, -1, -1, 0, 2, -1],
    [-1, 1, -1, 1, 3, -1],
    [2, -1, 2, -1, -1, 0],
    [-1, 2, 3, -1, -1, 1],
    [3, -1, -1, 2, -1, 2],
    [-1, 3, -1, 3, -1, 3],
];

/// The two corners of each edge, lower corner first.
pub const EDGE_CORNERS_3D: [[usize; 2]; EDGES_3D] = [
    [0, 1],
    [2, 3],
    [4, 5],
    [6, 7],
    [0, 2],
    [1, 3],
    [4, 6],
    [5, 7],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// The two faces touching each edge.
pub const EDGE_FACES_3D: [[usize; 2]; EDGES_3D] = [
    [2, 4],
    [3, 4],
    [2, 5],
    [3, 5],
    [0, 4],
    [1, 4],
    [0, 5],
    [1, 5],
    [0, 2],
    [1, 2],
    [0, 3],
    [1, 3],
];

/// All permutations of a face's four corners that keep it a square.
pub const FACE_PERMUTATIONS: [[usize; 4]; 8] = [
    [0, 1, 2, 3],
    [0, 2, 1, 3],
    [1, 0, 3, 2],
    [1, 3, 0, 2],
    [2, 0, 3, 1],
    [2, 3, 0, 1],
    [3, 1, 2, 0],
    [3, 2, 1, 0],
];

/// Permutation index per (reference class, orientation).
pub const FACE_PERMUTATION_SETS: [[usize; 4]; 3] = [[1, 2, 5, 6], [0, 3, 4, 7], [0, 4, 3, 7]];

/// Reference class per (my face, neighbor face).
pub const FACE_PERMUTATION_REFS: [[usize; FACES_3D]; FACES_3D] = [
    [0, 1, 1, 0, 0, 1],
    [2, 0, 0, 1, 1, 0],
    [2, 0, 0, 1, 1, 0],
    [0, 2, 2, 0, 0, 1],
    [0, 2, 2, 0, 0, 1],
    [2, 0, 0, 2, 2, 0],
];

const_assert_eq!(FACES_2D, 2 * 2);
const_assert_eq!(CHILDREN_2D, 1 << 2);
const_assert_eq!(FACES_3D, 2 * 3);
const_assert_eq!(CHILDREN_3D, 1 << 3);

/// Edge whose corners are `{a, b}`, if any.
pub fn edge_between_corners(a: usize, b: usize) -> Option<usize> {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    EDGE_CORNERS_3D.iter().position(|ec| ec[0] == lo && ec[1] == hi)
}
