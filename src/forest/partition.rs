//! The uniform initial partition of a forest's Morton order.
//!
//! Every tree is refined to the same level, giving `tree_quadrants` per
//! tree and `global_quadrants` in total. Rank `r` of `size` owns the global
//! range `[global*r/size, global*(r+1)/size)`, so ranks tile the index
//! space contiguously without any communication.

use serde::{Deserialize, Serialize};

use crate::forest::ForestConfig;
use crate::mesh_error::MeshForestError;
use crate::topology::TopIdx;
use crate::topology::dimension::Dimension;

/// Where one rank's quadrants start and stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionLayout {
    /// Uniform refinement level of every tree.
    pub level: u8,
    pub tree_quadrants: u64,
    pub global_quadrants: u64,
    /// Global index of the first owned quadrant.
    pub first_quadrant: u64,
    /// Global index of the last owned quadrant (inclusive).
    pub last_quadrant: u64,
    pub first_tree: usize,
    pub first_tree_quadrant: u64,
    pub last_tree: usize,
    pub last_tree_quadrant: u64,
}

impl PartitionLayout {
    /// Compute the layout of `rank` among `size` ranks.
    pub fn compute<D: Dimension>(
        num_trees: usize,
        size: usize,
        rank: usize,
        config: &ForestConfig,
    ) -> Result<Self, MeshForestError> {
        if num_trees == 0 {
            return Err(MeshForestError::EmptyConnectivity);
        }
        if rank >= size {
            return Err(MeshForestError::InvalidRank { rank, size });
        }

        let target = (size as u128 * config.quadrants_per_rank as u128) / num_trees as u128;
        let mut found = None;
        let mut count = 1u128;
        for level in 0..config.max_levels {
            if count >= target {
                found = Some((level, count));
                break;
            }
            count = count.saturating_mul(D::CHILDREN as u128);
        }
        let Some((level, tree_quadrants)) = found else {
            return Err(MeshForestError::NoRefinementLevel {
                max_levels: config.max_levels,
                target: config.quadrants_per_rank,
            });
        };
        if tree_quadrants > TopIdx::MAX as u128 {
            return Err(MeshForestError::TreeQuadrantOverflow {
                count: u64::try_from(tree_quadrants).unwrap_or(u64::MAX),
            });
        }

        let global = tree_quadrants * num_trees as u128;
        let first_quadrant = global * rank as u128 / size as u128;
        let end = global * (rank as u128 + 1) / size as u128;
        if end == first_quadrant {
            return Err(MeshForestError::EmptyPartition {
                rank,
                global: global as u64,
            });
        }
        let last_quadrant = end - 1;

        let layout = Self {
            level,
            tree_quadrants: tree_quadrants as u64,
            global_quadrants: global as u64,
            first_quadrant: first_quadrant as u64,
            last_quadrant: last_quadrant as u64,
            first_tree: (first_quadrant / tree_quadrants) as usize,
            first_tree_quadrant: (first_quadrant % tree_quadrants) as u64,
            last_tree: (last_quadrant / tree_quadrants) as usize,
            last_tree_quadrant: (last_quadrant % tree_quadrants) as u64,
        };
        debug_assert!(layout.first_tree <= layout.last_tree && layout.last_tree < num_trees);
        Ok(layout)
    }

    /// Number of quadrants this rank owns.
    pub fn owned_quadrants(&self) -> u64 {
        self.last_quadrant - self.first_quadrant + 1
    }

    pub fn owns_tree(&self, tree: usize) -> bool {
        (self.first_tree..=self.last_tree).contains(&tree)
    }

    /// Owned in-tree index range of `tree`, inclusive on both ends.
    pub fn tree_range(&self, tree: usize) -> Option<(u64, u64)> {
        if !self.owns_tree(tree) {
            return None;
        }
        let lo = if tree == self.first_tree {
            self.first_tree_quadrant
        } else {
            0
        };
        let hi = if tree == self.last_tree {
            self.last_tree_quadrant
        } else {
            self.tree_quadrants - 1
        };
        Some((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::dimension::{Dim2, Dim3};

    fn layout<D: Dimension>(trees: usize, size: usize, rank: usize) -> PartitionLayout {
        PartitionLayout::compute::<D>(trees, size, rank, &ForestConfig::default()).unwrap()
    }

    #[test]
    fn single_rank_single_tree() {
        // 15 quadrants wanted: 4^2 = 16 is the first level that has them
        let l = layout::<Dim2>(1, 1, 0);
        assert_eq!((l.level, l.tree_quadrants, l.global_quadrants), (2, 16, 16));
        assert_eq!((l.first_quadrant, l.last_quadrant), (0, 15));
        assert_eq!(l.tree_range(0), Some((0, 15)));
    }

    #[test]
    fn ranges_split_across_trees() {
        // 3 trees, 2 ranks: target 30/3 = 10, level 2, 48 quadrants
        let l0 = layout::<Dim2>(3, 2, 0);
        let l1 = layout::<Dim2>(3, 2, 1);
        assert_eq!((l0.first_quadrant, l0.last_quadrant), (0, 23));
        assert_eq!((l0.first_tree, l0.last_tree, l0.last_tree_quadrant), (0, 1, 7));
        assert_eq!((l1.first_tree, l1.first_tree_quadrant), (1, 8));
        assert_eq!(l1.tree_range(1), Some((8, 15)));
        assert_eq!(l1.tree_range(0), None);
        assert_eq!(l0.owned_quadrants() + l1.owned_quadrants(), 48);
    }

    #[test]
    fn many_trees_need_no_refinement() {
        let l = layout::<Dim3>(40, 2, 1);
        assert_eq!((l.level, l.tree_quadrants), (0, 1));
        assert_eq!((l.first_tree, l.last_tree), (20, 39));
    }

    #[test]
    fn level_stays_below_max_levels() {
        // 4 wanted in one tree: level 1 is needed, which max_levels 1 excludes
        let one = ForestConfig {
            quadrants_per_rank: 4,
            max_levels: 1,
            payload_size: 0,
        };
        assert!(matches!(
            PartitionLayout::compute::<Dim2>(1, 1, 0, &one),
            Err(MeshForestError::NoRefinementLevel { max_levels: 1, target: 4 })
        ));
        let two = ForestConfig {
            max_levels: 2,
            ..one
        };
        let l = PartitionLayout::compute::<Dim2>(1, 1, 0, &two).unwrap();
        assert_eq!((l.level, l.tree_quadrants), (1, 4));

        // 2D needing level 16 is out of range under the default config
        let deep = ForestConfig {
            quadrants_per_rank: 1 << 31,
            ..ForestConfig::default()
        };
        assert!(matches!(
            PartitionLayout::compute::<Dim2>(1, 1, 0, &deep),
            Err(MeshForestError::NoRefinementLevel { max_levels: 16, .. })
        ));
        let none = ForestConfig {
            max_levels: 0,
            ..ForestConfig::default()
        };
        assert!(matches!(
            PartitionLayout::compute::<Dim2>(1, 1, 0, &none),
            Err(MeshForestError::NoRefinementLevel { max_levels: 0, .. })
        ));
    }

    #[test]
    fn rejects_bad_inputs() {
        let cfg = ForestConfig::default();
        assert!(matches!(
            PartitionLayout::compute::<Dim2>(0, 1, 0, &cfg),
            Err(MeshForestError::EmptyConnectivity)
        ));
        assert!(matches!(
            PartitionLayout::compute::<Dim2>(1, 2, 2, &cfg),
            Err(MeshForestError::InvalidRank { rank: 2, size: 2 })
        ));
        let shallow = ForestConfig {
            max_levels: 1,
            ..cfg
        };
        assert!(matches!(
            PartitionLayout::compute::<Dim2>(1, 4, 0, &shallow),
            Err(MeshForestError::NoRefinementLevel { max_levels: 1, .. })
        ));
        let greedy = ForestConfig {
            quadrants_per_rank: 1 << 20,
            ..cfg
        };
        assert!(matches!(
            PartitionLayout::compute::<Dim3>(1, 4096, 0, &greedy),
            Err(MeshForestError::TreeQuadrantOverflow { .. })
        ));
        let sparse = ForestConfig {
            quadrants_per_rank: 0,
            ..cfg
        };
        assert!(matches!(
            PartitionLayout::compute::<Dim2>(1, 2, 0, &sparse),
            Err(MeshForestError::EmptyPartition { rank: 0, global: 1 })
        ));
    }
}
