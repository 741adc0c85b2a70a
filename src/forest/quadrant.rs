//! Quadrants addressed by their Morton index within a tree.

use serde::{Deserialize, Serialize};

use crate::forest::pool::BlockId;
use crate::topology::dimension::Dimension;

/// One quadrant (octant in 3D) of a tree.
///
/// `x`, `y`, `z` are integer coordinates in units of the quadrant's own
/// size, so each lies in `[0, 2^level)`; `z` is zero in 2D.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quadrant {
    pub level: u8,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    /// Handle of the payload block, if the forest carries payloads.
    pub payload: Option<BlockId>,
}

impl Quadrant {
    /// The quadrant at position `id` of the level-`level` Morton order.
    ///
    /// Bit `DIM*i + a` of `id` is bit `i` of the coordinate along axis `a`.
    pub fn from_morton<D: Dimension>(level: u8, id: u64) -> Self {
        debug_assert!((level as usize) * D::DIM <= 64);
        debug_assert!(
            level as usize * D::DIM == 64 || id < 1u64 << (D::DIM * level as usize),
            "morton index {id} out of range at level {level}"
        );
        let mut coords = [0u32; 3];
        for i in 0..level as usize {
            for (axis, c) in coords.iter_mut().enumerate().take(D::DIM) {
                *c |= (((id >> (D::DIM * i + axis)) & 1) as u32) << i;
            }
        }
        Self {
            level,
            x: coords[0],
            y: coords[1],
            z: coords[2],
            payload: None,
        }
    }

    /// Inverse of [`from_morton`](Self::from_morton).
    pub fn morton_index<D: Dimension>(&self) -> u64 {
        let coords = self.coords();
        let mut id = 0u64;
        for i in 0..self.level as usize {
            for (axis, &c) in coords.iter().enumerate().take(D::DIM) {
                id |= (((c >> i) & 1) as u64) << (D::DIM * i + axis);
            }
        }
        id
    }

    pub fn coords(&self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    /// Same level and position, ignoring the payload.
    pub fn same_position(&self, other: &Self) -> bool {
        self.level == other.level && self.coords() == other.coords()
    }
}
