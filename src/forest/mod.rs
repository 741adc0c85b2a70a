//! A forest of quadtrees (octrees in 3D) over a coarse connectivity.
//!
//! [`Forest::new`] refines every tree uniformly, splits the global Morton
//! order across the communicator's ranks (see [`PartitionLayout`]) and
//! stores, for every tree this rank touches, the first and last owned
//! quadrant. Filling in the quadrants between them is left to later
//! algorithms; when a rank's range ends inside its last tree, that tree's
//! second quadrant is the one just past the range and is flagged as a
//! sentinel.

pub mod partition;
pub mod pool;
pub mod quadrant;

pub use partition::PartitionLayout;
pub use pool::{BlockId, BlockPool};
pub use quadrant::Quadrant;

use bytemuck::Pod;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::algs::communicator::Communicator;
use crate::mesh_error::MeshForestError;
use crate::topology::connectivity::Connectivity;
use crate::topology::dimension::Dimension;

/// Tuning knobs for the initial forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Minimum quadrants each rank should receive.
    pub quadrants_per_rank: usize,
    /// Refinement levels searched for a level that reaches the target.
    pub max_levels: u8,
    /// Bytes of payload per quadrant; zero disables the payload pool.
    pub payload_size: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            quadrants_per_rank: 15,
            max_levels: 16,
            payload_size: 0,
        }
    }
}

/// Quadrants of one tree held by this rank.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    pub quadrants: Vec<Quadrant>,
    /// The last entry of `quadrants` lies one past the owned range.
    pub sentinel: bool,
}

impl Tree {
    /// Stored quadrants without the trailing sentinel.
    pub fn owned_quadrants(&self) -> &[Quadrant] {
        if self.sentinel {
            &self.quadrants[..self.quadrants.len() - 1]
        } else {
            &self.quadrants
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quadrants.is_empty()
    }
}

/// The distributed forest as seen by one rank.
#[derive(Debug)]
pub struct Forest<'c, D: Dimension> {
    connectivity: &'c Connectivity<D>,
    rank: usize,
    size: usize,
    config: ForestConfig,
    layout: PartitionLayout,
    trees: Vec<Tree>,
    pool: Option<BlockPool>,
}

impl<'c, D: Dimension> Forest<'c, D> {
    /// Build the initial forest with zeroed payloads.
    pub fn new<C: Communicator + ?Sized>(
        connectivity: &'c Connectivity<D>,
        comm: &C,
        config: ForestConfig,
    ) -> Result<Self, MeshForestError> {
        Self::with_init(connectivity, comm, config, |_, _, _, _| {})
    }

    /// Build the initial forest, calling `init(layout, tree, quadrant,
    /// payload)` once per stored quadrant. `payload` is empty when
    /// `config.payload_size` is zero.
    pub fn with_init<C, F>(
        connectivity: &'c Connectivity<D>,
        comm: &C,
        config: ForestConfig,
        mut init: F,
    ) -> Result<Self, MeshForestError>
    where
        C: Communicator + ?Sized,
        F: FnMut(&PartitionLayout, usize, &Quadrant, &mut [u8]),
    {
        let (rank, size) = (comm.rank(), comm.size());
        let num_trees = connectivity.num_trees();
        let layout = PartitionLayout::compute::<D>(num_trees, size, rank, &config)?;

        if rank == 0 {
            info!(
                "new forest: {num_trees} trees on {size} ranks, level {} with {} quadrants ({} per tree)",
                layout.level, layout.global_quadrants, layout.tree_quadrants
            );
        }
        debug!(
            "[{rank}] first tree {} quadrant {} global {}",
            layout.first_tree, layout.first_tree_quadrant, layout.first_quadrant
        );
        debug!(
            "[{rank}] last tree {} quadrant {} global {}",
            layout.last_tree, layout.last_tree_quadrant, layout.last_quadrant
        );

        let mut forest = Self {
            connectivity,
            rank,
            size,
            config,
            layout,
            trees: vec![Tree::default(); num_trees],
            pool: (config.payload_size > 0).then(|| BlockPool::new(config.payload_size)),
        };
        let last_in_tree = layout.tree_quadrants - 1;
        for tree in layout.first_tree..=layout.last_tree {
            let Some((lo, hi)) = layout.tree_range(tree) else {
                continue;
            };
            let first = forest.make_quadrant(tree, lo, &mut init);
            trace!("[{rank}] tree {tree} first quadrant {:?}", first.coords());
            forest.trees[tree].quadrants.push(first);

            if lo == hi && hi == last_in_tree {
                continue;
            }
            let (index, sentinel) = if hi == last_in_tree {
                (hi, false)
            } else {
                (hi + 1, true)
            };
            let second = forest.make_quadrant(tree, index, &mut init);
            trace!("[{rank}] tree {tree} last quadrant {:?}", second.coords());
            let slot = &mut forest.trees[tree];
            slot.quadrants.push(second);
            slot.sentinel = sentinel;
        }
        Ok(forest)
    }

    fn make_quadrant<F>(&mut self, tree: usize, index: u64, init: &mut F) -> Quadrant
    where
        F: FnMut(&PartitionLayout, usize, &Quadrant, &mut [u8]),
    {
        let mut quad = Quadrant::from_morton::<D>(self.layout.level, index);
        match self.pool.as_mut() {
            Some(pool) => {
                let id = pool.acquire();
                quad.payload = Some(id);
                init(&self.layout, tree, &quad, pool.block_mut(id));
            }
            None => init(&self.layout, tree, &quad, &mut []),
        }
        quad
    }

    pub fn connectivity(&self) -> &'c Connectivity<D> {
        self.connectivity
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn tree(&self, tree: usize) -> &Tree {
        &self.trees[tree]
    }

    /// Indices of the trees holding at least one quadrant.
    pub fn local_trees(&self) -> impl Iterator<Item = usize> + '_ {
        self.trees
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_empty())
            .map(|(i, _)| i)
    }

    /// Payload bytes of `quad`; `None` without a payload pool.
    pub fn payload(&self, quad: &Quadrant) -> Option<&[u8]> {
        let id = quad.payload?;
        self.pool.as_ref().map(|p| p.block(id))
    }

    pub fn payload_mut(&mut self, quad: &Quadrant) -> Option<&mut [u8]> {
        let id = quad.payload?;
        self.pool.as_mut().map(|p| p.block_mut(id))
    }

    /// Read a `T` from the start of `quad`'s payload.
    ///
    /// `None` if there is no payload or it is shorter than `T`.
    pub fn payload_value<T: Pod>(&self, quad: &Quadrant) -> Option<T> {
        let bytes = self.payload(quad)?;
        let bytes = bytes.get(..std::mem::size_of::<T>())?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }

    /// Payload blocks currently in use.
    pub fn live_payloads(&self) -> usize {
        self.pool.as_ref().map_or(0, BlockPool::live)
    }

    /// Drop every quadrant of `tree` and release its payloads.
    pub fn clear_tree(&mut self, tree: usize) {
        let slot = &mut self.trees[tree];
        if let Some(pool) = self.pool.as_mut() {
            for id in slot.quadrants.iter().filter_map(|q| q.payload) {
                pool.release(id);
            }
        }
        slot.quadrants.clear();
        slot.sentinel = false;
    }
}
