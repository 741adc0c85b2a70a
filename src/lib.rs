#![cfg_attr(docsrs, feature(doc_cfg))]
//! # mesh-forest
//!
//! mesh-forest holds the coarse side of a forest-of-octrees adaptive mesh:
//! the connectivity between trees, the queries that map a tree's faces,
//! edges and corners onto its neighbors (periodic and non-manifold cases
//! included), and the initial Morton-order partition of a uniformly
//! refined forest across ranks.
//!
//! ## Features
//! - Quadtree (`Dim2`) and octree (`Dim3`) connectivities with compressed
//!   edge and corner lists, a full consistency validator and canonical
//!   meshes
//! - Face, edge and corner transform queries
//! - Structured bricks with per-axis periodicity
//! - A versioned little-endian file format
//! - The uniform initial forest partition with per-quadrant payloads
//! - Tree reordering through a pluggable graph partitioner (METIS behind
//!   `metis-support`)
//! - Pluggable communication backends (serial, in-process threads, MPI
//!   behind `mpi-support`)
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! mesh-forest = "0.1"
//! # Optional features:
//! # features = ["mpi-support", "metis-support"]
//! ```
//!
//! ```
//! use mesh_forest::prelude::*;
//!
//! let conn = brick_2d(3, 2, Periodicity { x: true, ..Default::default() })?;
//! assert!(conn.is_valid());
//! let forest = Forest::new(&conn, &NoComm, ForestConfig::default())?;
//! assert_eq!(forest.local_trees().count(), 6);
//! # Ok::<(), MeshForestError>(())
//! ```

// Re-export our major subsystems:
pub mod algs;
pub mod debug_invariants;
pub mod forest;
pub mod io;
pub mod mesh_error;
pub mod mesh_generation;
pub mod topology;

pub use debug_invariants::DebugInvariants;
pub use mesh_error::MeshForestError;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::communicator::{Communicator, NoComm, RayonComm, Wait};
    #[cfg(feature = "mpi-support")]
    pub use crate::algs::communicator::MpiComm;
    #[cfg(feature = "metis-support")]
    pub use crate::algs::metis_partition::MetisPartitioner;
    pub use crate::algs::metis_partition::TreePartitioner;
    pub use crate::algs::reorder::reorder;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::forest::{Forest, ForestConfig, PartitionLayout, Quadrant, Tree};
    pub use crate::mesh_error::MeshForestError;
    pub use crate::mesh_generation::{
        BrickIndexer, MeshGenerationOptions, Periodicity, brick, brick_2d, brick_3d,
    };
    pub use crate::topology::{
        ConnectType, Connectivity, Dim2, Dim3, Dimension, EdgeCode, FaceCode, OctConnectivity,
        QuadConnectivity, TopIdx, canonical, find_corner_transform, find_edge_transform,
        find_face_transform,
    };
}
