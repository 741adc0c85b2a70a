//! Compile-time dimension markers for quadtree and octree forests.
//!
//! Everything that differs between 2D and 3D (feature counts, incidence
//! tables, the corner permutation across a face and the face coordinate
//! frame) is reached through [`Dimension`], so the connectivity, the
//! transforms and the forest are written once.

use std::fmt::Debug;

use crate::topology::tables::*;
use crate::topology::transform::FaceTransform;

/// Static description of a forest dimension.
pub trait Dimension: Copy + Clone + Default + Debug + PartialEq + Eq + Send + Sync + 'static {
    /// Spatial dimension (2 or 3).
    const DIM: usize;
    /// Faces per tree, `2 * DIM`.
    const FACES: usize;
    /// Children per quadrant, which is also the number of tree corners.
    const CHILDREN: usize;
    /// Corners per face, which is also the number of face orientations.
    const HALF: usize;
    /// Edges per tree (0 in 2D).
    const EDGES: usize;
    /// Magic bytes opening a persisted connectivity.
    const MAGIC: [u8; 6];

    fn face_corners(face: usize) -> &'static [usize];
    fn face_dual(face: usize) -> usize;
    fn corner_faces(corner: usize) -> &'static [usize];
    /// Position of `corner` in `face_corners(face)`.
    fn corner_face_corner(corner: usize, face: usize) -> Option<usize>;
    /// Edges incident to `corner`; empty in 2D.
    fn corner_edges(corner: usize) -> &'static [usize];

    /// Corners of `edge`. Only meaningful when `EDGES > 0`.
    fn edge_corners(edge: usize) -> [usize; 2] {
        EDGE_CORNERS_3D[edge]
    }

    /// Faces touching `edge`. Only meaningful when `EDGES > 0`.
    fn edge_faces(edge: usize) -> [usize; 2] {
        EDGE_FACES_3D[edge]
    }

    /// Face-local corner `fcorner` of `iface`, seen from the neighbor's
    /// face `nface` glued with `orientation`.
    fn face_corner_across(iface: usize, nface: usize, orientation: usize, fcorner: usize)
    -> usize;

    /// Coordinate frame change across a face glued to `nface`.
    fn face_transform(iface: usize, nface: usize, orientation: usize) -> FaceTransform;
}

/// Quadtree marker.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dim2;

/// Octree marker.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dim3;

impl Dimension for Dim2 {
    const DIM: usize = 2;
    const FACES: usize = FACES_2D;
    const CHILDREN: usize = CHILDREN_2D;
    const HALF: usize = 2;
    const EDGES: usize = 0;
    const MAGIC: [u8; 6] = *b"mfor2d";

    #[inline]
    fn face_corners(face: usize) -> &'static [usize] {
        &FACE_CORNERS_2D[face]
    }
    #[inline]
    fn face_dual(face: usize) -> usize {
        FACE_DUAL_2D[face]
    }
    #[inline]
    fn corner_faces(corner: usize) -> &'static [usize] {
        &CORNER_FACES_2D[corner]
    }
    #[inline]
    fn corner_face_corner(corner: usize, face: usize) -> Option<usize> {
        usize::try_from(CORNER_FACE_CORNERS_2D[corner][face]).ok()
    }
    #[inline]
    fn corner_edges(_corner: usize) -> &'static [usize] {
        &[]
    }
    #[inline]
    fn face_corner_across(
        _iface: usize,
        _nface: usize,
        orientation: usize,
        fcorner: usize,
    ) -> usize {
        fcorner ^ orientation
    }
    fn face_transform(iface: usize, nface: usize, orientation: usize) -> FaceTransform {
        FaceTransform::quad(iface, nface, orientation)
    }
}

impl Dimension for Dim3 {
    const DIM: usize = 3;
    const FACES: usize = FACES_3D;
    const CHILDREN: usize = CHILDREN_3D;
    const HALF: usize = 4;
    const EDGES: usize = EDGES_3D;
    const MAGIC: [u8; 6] = *b"mfor3d";

    #[inline]
    fn face_corners(face: usize) -> &'static [usize] {
        &FACE_CORNERS_3D[face]
    }
    #[inline]
    fn face_dual(face: usize) -> usize {
        FACE_DUAL_3D[face]
    }
    #[inline]
    fn corner_faces(corner: usize) -> &'static [usize] {
        &CORNER_FACES_3D[corner]
    }
    #[inline]
    fn corner_face_corner(corner: usize, face: usize) -> Option<usize> {
        usize::try_from(CORNER_FACE_CORNERS_3D[corner][face]).ok()
    }
    #[inline]
    fn corner_edges(corner: usize) -> &'static [usize] {
        &CORNER_EDGES_3D[corner]
    }
    #[inline]
    fn face_corner_across(iface: usize, nface: usize, orientation: usize, fcorner: usize) -> usize {
        let set = FACE_PERMUTATION_SETS[FACE_PERMUTATION_REFS[iface][nface]][orientation];
        FACE_PERMUTATIONS[set][fcorner]
    }
    fn face_transform(iface: usize, nface: usize, orientation: usize) -> FaceTransform {
        FaceTransform::oct(iface, nface, orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners_on_faces<D: Dimension>() {
        for face in 0..D::FACES {
            assert_eq!(D::face_corners(face).len(), D::HALF);
            assert_eq!(D::face_dual(D::face_dual(face)), face);
            for (pos, &corner) in D::face_corners(face).iter().enumerate() {
                assert_eq!(D::corner_face_corner(corner, face), Some(pos));
                assert!(D::corner_faces(corner).contains(&face));
            }
        }
        for corner in 0..D::CHILDREN {
            assert_eq!(D::corner_faces(corner).len(), D::DIM);
        }
    }

    #[test]
    fn quad_tables_are_consistent() {
        corners_on_faces::<Dim2>();
        assert!(Dim2::corner_edges(3).is_empty());
    }

    #[test]
    fn oct_tables_are_consistent() {
        corners_on_faces::<Dim3>();
        for corner in 0..Dim3::CHILDREN {
            for &edge in Dim3::corner_edges(corner) {
                assert!(Dim3::edge_corners(edge).contains(&corner));
            }
        }
    }

    #[test]
    fn face_corner_across_is_a_permutation() {
        for iface in 0..Dim3::FACES {
            for nface in 0..Dim3::FACES {
                for o in 0..Dim3::HALF {
                    let mut seen = [false; 4];
                    for fc in 0..4 {
                        seen[Dim3::face_corner_across(iface, nface, o, fc)] = true;
                    }
                    assert!(seen.iter().all(|&s| s));
                }
            }
        }
        assert_eq!(Dim2::face_corner_across(0, 1, 1, 0), 1);
    }
}
