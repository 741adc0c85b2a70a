//! Bit-interleaving bijection between a linear index and brick coordinates.
//!
//! Each axis needs `logx[a] = bits(extent_a - 1)` bits. Axes are ranked by
//! ascending bit width (ties keep the lower axis first). Low bits of the
//! linear index interleave every axis, like a Morton code; as the narrower
//! axes run out of bits the remaining ones keep interleaving among
//! themselves, and the widest axis takes whatever is left. The index range
//! `[0, 2^Σlogx)` therefore covers the grid without gaps per level, and
//! out-of-grid coordinates are simply skipped by callers.

use std::marker::PhantomData;

use crate::topology::dimension::Dimension;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrickIndexer<D: Dimension> {
    logx: [u32; 3],
    rankx: [usize; 3],
    _dim: PhantomData<D>,
}

/// Bits needed to write `extent - 1`.
fn bits_for(extent: usize) -> u32 {
    usize::BITS - extent.saturating_sub(1).leading_zeros()
}

impl<D: Dimension> BrickIndexer<D> {
    /// Indexer for a brick of `extents` trees per axis.
    ///
    /// # Panics
    /// If `extents` does not have one entry per dimension.
    pub fn new(extents: &[usize]) -> Self {
        assert_eq!(extents.len(), D::DIM, "one extent per axis");
        let mut logx = [0u32; 3];
        for (l, &e) in logx.iter_mut().zip(extents) {
            *l = bits_for(e);
        }
        let mut rankx = [0, 1, 2];
        rankx[..D::DIM].sort_by_key(|&a| logx[a]);
        Self {
            logx,
            rankx,
            _dim: PhantomData,
        }
    }

    /// Bit width per axis.
    pub fn logx(&self) -> &[u32] {
        &self.logx[..D::DIM]
    }

    /// Axes ordered by ascending bit width.
    pub fn rankx(&self) -> &[usize] {
        &self.rankx[..D::DIM]
    }

    /// Size of the linear index space, `2^Σlogx`.
    pub fn len(&self) -> u64 {
        1u64 << self.logx().iter().sum::<u32>()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bit slot of each axis still interleaving at `level`; `None` for
    /// axes that ran out of bits. Slots follow ascending axis order.
    fn slots(&self, level: usize) -> [Option<u32>; 3] {
        let active = &self.rankx[level..D::DIM];
        let mut slots = [None; 3];
        let mut next = 0;
        for (axis, slot) in slots.iter_mut().enumerate().take(D::DIM) {
            if active.contains(&axis) {
                *slot = Some(next);
                next += 1;
            }
        }
        slots
    }

    pub fn linear_to_coords(&self, linear: u64) -> [u64; 3] {
        let dim = D::DIM;
        let mut coords = [0u64; 3];
        let mut rest = linear;
        let mut lastlog = 0;
        for level in 0..dim - 1 {
            let logi = self.logx[self.rankx[level]] - lastlog;
            let width = (dim - level) as u32;
            let slots = self.slots(level);
            let mut part = [0u64; 3];
            for j in 0..logi {
                let base = width * j;
                let shift = (width - 1) * j;
                for (p, slot) in part.iter_mut().zip(slots) {
                    if let Some(id) = slot {
                        *p |= (rest & (1 << (base + id))) >> (shift + id);
                    }
                }
            }
            for (c, p) in coords.iter_mut().zip(part) {
                *c += p << lastlog;
            }
            lastlog += logi;
            rest >>= width * logi;
        }
        coords[self.rankx[dim - 1]] += rest << lastlog;
        coords
    }

    pub fn coords_to_linear(&self, coords: [u64; 3]) -> u64 {
        let dim = D::DIM;
        let mut lastlog = self.logx[self.rankx[dim - 2]];
        let mut linear = coords[self.rankx[dim - 1]] >> lastlog;
        for level in (0..dim - 1).rev() {
            let logi = if level == 0 {
                lastlog
            } else {
                lastlog - self.logx[self.rankx[level - 1]]
            };
            let width = (dim - level) as u32;
            let slots = self.slots(level);
            linear <<= width * logi;
            lastlog -= logi;
            for j in 0..logi {
                let shift = (width - 1) * j;
                for (c, slot) in coords.iter().zip(slots) {
                    if let Some(id) = slot {
                        linear |= ((c >> lastlog) & (1 << j)) << (shift + id);
                    }
                }
            }
        }
        linear
    }
}
