//! Coarse-mesh topology: the tree connectivity and its queries.
//!
//! This module provides:
//! - per-dimension incidence tables behind the [`Dimension`] trait
//! - the [`Connectivity`] store with its compressed edge and corner lists
//! - hand-built canonical connectivities
//! - the validator and the face/edge/corner transform queries
//!
//! Most users build a connectivity through [`canonical`] or
//! [`crate::mesh_generation`] and then query it with
//! [`find_face_transform`] and [`find_corner_transform`].

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod canonical;
pub mod connectivity;
pub mod dimension;
pub mod orientation;
pub mod tables;
pub mod transform;
pub mod validation;

pub use connectivity::{
    Connectivity, ConnectivityTables, ConnectivityTablesMut, OctConnectivity, QuadConnectivity,
};
pub use dimension::{Dim2, Dim3, Dimension};
pub use orientation::{EdgeCode, FaceCode};
pub use transform::{
    CornerInfo, CornerTransform, EdgeInfo, EdgeTransform, FaceTransform, find_corner_transform,
    find_edge_transform, find_face_transform,
};
pub use validation::{ConnectivityViolation, is_valid, validate};

/// Index word for trees, vertices, edges and corners.
pub type TopIdx = i32;

/// Which shared features make two trees adjacent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectType {
    #[default]
    Face,
    Edge,
    Corner,
}

impl ConnectType {
    /// How many feature kinds the adjacency spans: 1 for faces, 2 with
    /// edges (3D), `DIM` with corners. In 2D `Edge` counts as `Face`.
    pub fn as_int<D: Dimension>(self) -> u8 {
        match self {
            ConnectType::Face => 1,
            ConnectType::Edge if D::EDGES == 0 => 1,
            ConnectType::Edge => 2,
            ConnectType::Corner => D::DIM as u8,
        }
    }
}

impl fmt::Display for ConnectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectType::Face => "FACE",
            ConnectType::Edge => "EDGE",
            ConnectType::Corner => "CORNER",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_type_names() {
        assert_eq!(ConnectType::Face.to_string(), "FACE");
        assert_eq!(ConnectType::Edge.to_string(), "EDGE");
        assert_eq!(ConnectType::Corner.to_string(), "CORNER");
        assert_eq!(ConnectType::default(), ConnectType::Face);
    }

    #[test]
    fn connect_type_ints() {
        assert_eq!(ConnectType::Face.as_int::<Dim2>(), 1);
        assert_eq!(ConnectType::Edge.as_int::<Dim2>(), 1);
        assert_eq!(ConnectType::Corner.as_int::<Dim2>(), 2);
        assert_eq!(ConnectType::Face.as_int::<Dim3>(), 1);
        assert_eq!(ConnectType::Edge.as_int::<Dim3>(), 2);
        assert_eq!(ConnectType::Corner.as_int::<Dim3>(), 3);
    }
}
