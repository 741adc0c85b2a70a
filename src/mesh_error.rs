//! MeshForestError: Unified error type for mesh-forest public APIs
//!
//! Constructors, loaders and the forest partitioner report every failure
//! through this type; no partially built value is ever returned.

use thiserror::Error;

use crate::topology::validation::ConnectivityViolation;

/// Unified error type for mesh-forest operations.
#[derive(Debug, Error)]
pub enum MeshForestError {
    /// A table could not be allocated.
    #[error("allocation of {len} entries for `{table}` failed")]
    Allocation { table: &'static str, len: usize },
    /// A table's length disagrees with the counts it belongs to.
    #[error("table `{table}` has {found} entries, expected {expected}")]
    TableSizeMismatch {
        table: &'static str,
        expected: usize,
        found: usize,
    },
    /// The connectivity tables are inconsistent.
    #[error("invalid connectivity: {0}")]
    InvalidConnectivity(#[from] ConnectivityViolation),
    /// Generator arguments describe no valid geometry.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    // --- persisted format ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad magic {found:?}, expected {expected:?}")]
    BadMagic { expected: [u8; 6], found: [u8; 6] },
    #[error("unsupported format version {0}")]
    FormatVersion(u64),
    #[error("index word width {0} does not match 4")]
    IndexWidth(u64),
    #[error("header count `{field}` = {value} is not representable")]
    HeaderCount { field: &'static str, value: u64 },

    // --- forest ---
    #[error("connectivity has no trees")]
    EmptyConnectivity,
    #[error("rank {rank} out of range for communicator of size {size}")]
    InvalidRank { rank: usize, size: usize },
    #[error("no refinement level below {max_levels} gives {target} quadrants per rank")]
    NoRefinementLevel { max_levels: u8, target: usize },
    #[error("{count} quadrants per tree exceed the index range")]
    TreeQuadrantOverflow { count: u64 },
    #[error("rank {rank} receives no quadrant of {global}")]
    EmptyPartition { rank: usize, global: u64 },

    // --- reordering ---
    #[error("partition entry {value} for tree {tree} outside [0, {parts})")]
    PartitionOutOfRange { tree: usize, value: i32, parts: usize },
    #[error("partitioner error: {0}")]
    Partitioner(String),
    #[error("communication error: {0}")]
    Communication(String),
}
