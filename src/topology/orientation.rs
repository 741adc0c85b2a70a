//! Packed feature codes stored in the connectivity tables.
//!
//! A face code packs `(neighbor face, orientation)` as
//! `face + FACES * orientation`; an edge code packs `(edge, flip)` as
//! `edge + 12 * flip`. The tables keep the packed `i8`; these views carry
//! the arithmetic.

use core::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};

use crate::topology::dimension::Dimension;
use crate::topology::tables::EDGES_3D;

/// Neighbor face and the orientation of the gluing.
///
/// Orientation lives in `[0, HALF)`: the permutation of the shared face's
/// corners as seen from the neighbor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct FaceCode {
    pub face: u8,
    pub orientation: u8,
}

impl Debug for FaceCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FaceCode")
            .field(&self.face)
            .field(&self.orientation)
            .finish()
    }
}

impl FaceCode {
    #[inline]
    pub const fn new(face: u8, orientation: u8) -> Self {
        Self { face, orientation }
    }

    /// Code a boundary face stores for itself.
    #[inline]
    pub const fn boundary(face: u8) -> Self {
        Self::new(face, 0)
    }

    #[inline]
    pub fn encode<D: Dimension>(self) -> i8 {
        debug_assert!((self.face as usize) < D::FACES && (self.orientation as usize) < D::HALF);
        (self.face as usize + D::FACES * self.orientation as usize) as i8
    }

    /// Unpack a stored code; `None` if it lies outside `[0, FACES * HALF)`.
    #[inline]
    pub fn decode<D: Dimension>(code: i8) -> Option<Self> {
        let code = usize::try_from(code).ok()?;
        (code < D::FACES * D::HALF).then(|| Self {
            face: (code % D::FACES) as u8,
            orientation: (code / D::FACES) as u8,
        })
    }

    #[inline]
    pub fn face_index(self) -> usize {
        self.face as usize
    }

    #[inline]
    pub fn orientation_index(self) -> usize {
        self.orientation as usize
    }
}

/// Neighbor edge and whether its direction is reversed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct EdgeCode {
    pub edge: u8,
    pub flip: bool,
}

impl Debug for EdgeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("EdgeCode")
            .field(&self.edge)
            .field(&self.flip)
            .finish()
    }
}

impl EdgeCode {
    /// Exclusive upper bound of a packed edge code.
    pub const LIMIT: usize = 2 * EDGES_3D;

    #[inline]
    pub const fn new(edge: u8, flip: bool) -> Self {
        Self { edge, flip }
    }

    #[inline]
    pub fn encode(self) -> i8 {
        (self.edge as usize + EDGES_3D * self.flip as usize) as i8
    }

    #[inline]
    pub fn decode(code: i8) -> Option<Self> {
        let code = usize::try_from(code).ok()?;
        (code < Self::LIMIT).then(|| Self {
            edge: (code % EDGES_3D) as u8,
            flip: code >= EDGES_3D,
        })
    }

    #[inline]
    pub fn edge_index(self) -> usize {
        self.edge as usize
    }

    /// Same edge with its flip expressed relative to `base`.
    #[inline]
    pub fn relative_to(self, base: bool) -> Self {
        Self::new(self.edge, self.flip ^ base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::dimension::{Dim2, Dim3};

    #[test]
    fn face_code_packing() {
        assert_eq!(FaceCode::new(3, 1).encode::<Dim2>(), 7);
        assert_eq!(FaceCode::decode::<Dim2>(7), Some(FaceCode::new(3, 1)));
        assert_eq!(FaceCode::new(5, 3).encode::<Dim3>(), 23);
        assert_eq!(FaceCode::decode::<Dim3>(23), Some(FaceCode::new(5, 3)));
    }

    #[test]
    fn face_code_rejects_out_of_range() {
        assert_eq!(FaceCode::decode::<Dim2>(8), None);
        assert_eq!(FaceCode::decode::<Dim2>(-1), None);
        assert_eq!(FaceCode::decode::<Dim3>(24), None);
    }

    #[test]
    fn edge_code_packing() {
        let code = EdgeCode::new(11, true);
        assert_eq!(code.encode(), 23);
        assert_eq!(EdgeCode::decode(23), Some(code));
        assert_eq!(EdgeCode::decode(24), None);
        assert_eq!(EdgeCode::decode(4), Some(EdgeCode::new(4, false)));
        assert!(!code.relative_to(true).flip);
    }
}
