//! Persistence for coarse connectivities.
//!
//! The binary format is always little-endian; see
//! [`connectivity_file`] for the layout.

pub mod connectivity_file;

pub use connectivity_file::{FORMAT_VERSION, HeaderWords, INDEX_WIDTH};
