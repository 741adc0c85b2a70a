//! Re-export public algorithms.

pub mod communicator;
pub mod metis_partition;
pub mod reorder;
pub mod tree_graph;

pub use communicator::{Communicator, NoComm, RayonComm, Wait};
pub use metis_partition::TreePartitioner;
pub use reorder::reorder;
pub use tree_graph::{TreeGraph, build_tree_graph};
