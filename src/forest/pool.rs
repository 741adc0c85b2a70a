//! Fixed-size payload blocks for quadrants.

use serde::{Deserialize, Serialize};

/// Handle of one block in a [`BlockPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Blocks of `block_size` bytes in one contiguous buffer.
///
/// Released blocks go on a free list and are handed out again last-in
/// first-out, zeroed.
#[derive(Clone, Debug)]
pub struct BlockPool {
    block_size: usize,
    data: Vec<u8>,
    occupied: Vec<bool>,
    free_list: Vec<BlockId>,
    live: usize,
}

impl BlockPool {
    /// # Panics
    /// If `block_size` is zero.
    pub fn new(block_size: usize) -> Self {
        assert!(block_size > 0, "payload blocks must be non-empty");
        Self {
            block_size,
            data: Vec::new(),
            occupied: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Blocks currently handed out.
    pub fn live(&self) -> usize {
        self.live
    }

    /// Blocks ever allocated, live or free.
    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    pub fn acquire(&mut self) -> BlockId {
        self.live += 1;
        if let Some(recycled) = self.free_list.pop() {
            let i = recycled.index();
            self.occupied[i] = true;
            self.block_mut(recycled).fill(0);
            return recycled;
        }
        let next = self.occupied.len();
        let id = BlockId(u32::try_from(next).expect("payload pool exceeds u32 blocks"));
        self.data.resize(self.data.len() + self.block_size, 0);
        self.occupied.push(true);
        id
    }

    /// Return a block to the pool.
    ///
    /// # Panics
    /// If `id` is not live.
    pub fn release(&mut self, id: BlockId) {
        let slot = &mut self.occupied[id.index()];
        assert!(*slot, "block {} released twice", id.index());
        *slot = false;
        self.live -= 1;
        self.free_list.push(id);
    }

    pub fn block(&self, id: BlockId) -> &[u8] {
        debug_assert!(self.occupied[id.index()], "block {} is not live", id.index());
        let start = id.index() * self.block_size;
        &self.data[start..start + self.block_size]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut [u8] {
        debug_assert!(self.occupied[id.index()], "block {} is not live", id.index());
        let start = id.index() * self.block_size;
        &mut self.data[start..start + self.block_size]
    }
}
