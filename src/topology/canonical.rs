//! Hand-built connectivities for common domains.
//!
//! Every constructor copies static tables through
//! [`Connectivity::from_tables`], so each result has passed validation.

use std::f64::consts::PI;

use crate::topology::connectivity::{
    ConnectivityTables, OctConnectivity, QuadConnectivity,
};

const UNIT_SQUARE_VERTICES: [f64; 12] = [0., 0., 0., 1., 0., 0., 0., 1., 0., 1., 1., 0.];

/// One tree, all faces on the boundary.
pub fn unit_square() -> QuadConnectivity {
    QuadConnectivity::from_tables(ConnectivityTables {
        vertices: &UNIT_SQUARE_VERTICES,
        tree_to_vertex: &[0, 1, 2, 3],
        tree_to_tree: &[0, 0, 0, 0],
        tree_to_face: &[0, 1, 2, 3],
        ..Default::default()
    })
    .expect("unit square tables are consistent")
}

/// One tree, opposite faces glued; all four corners share one id.
pub fn periodic() -> QuadConnectivity {
    QuadConnectivity::from_tables(ConnectivityTables {
        vertices: &UNIT_SQUARE_VERTICES,
        tree_to_vertex: &[0, 1, 2, 3],
        tree_to_tree: &[0, 0, 0, 0],
        tree_to_face: &[1, 0, 3, 2],
        tree_to_corner: &[0, 0, 0, 0],
        ctt_offset: &[0, 4],
        corner_to_tree: &[0, 0, 0, 0],
        corner_to_corner: &[0, 1, 2, 3],
        ..Default::default()
    })
    .expect("periodic square tables are consistent")
}

/// Like [`periodic`], but the y faces are glued with a reversal.
pub fn rotwrap() -> QuadConnectivity {
    QuadConnectivity::from_tables(ConnectivityTables {
        vertices: &UNIT_SQUARE_VERTICES,
        tree_to_vertex: &[0, 1, 2, 3],
        tree_to_tree: &[0, 0, 0, 0],
        tree_to_face: &[1, 0, 7, 6],
        tree_to_corner: &[0, 0, 0, 0],
        ctt_offset: &[0, 4],
        corner_to_tree: &[0, 0, 0, 0],
        corner_to_corner: &[0, 1, 2, 3],
        ..Default::default()
    })
    .expect("rotwrap tables are consistent")
}

/// Three trees meeting at one non-manifold corner.
pub fn corner() -> QuadConnectivity {
    QuadConnectivity::from_tables(ConnectivityTables {
        vertices: &[
            -1., -1., 0., //
            0., -1., 0., //
            0., 0., 1., //
            1., 0., 1., //
            1., 1., 1., //
            0., 1., 1., //
            -1., 0., 0.,
        ],
        tree_to_vertex: &[0, 1, 2, 3, 0, 2, 6, 5, 2, 3, 5, 4],
        tree_to_tree: &[1, 0, 0, 2, 1, 2, 0, 1, 1, 2, 0, 2],
        tree_to_face: &[2, 1, 2, 2, 0, 0, 0, 3, 1, 1, 3, 3],
        tree_to_corner: &[-1, -1, 0, -1, -1, 0, -1, -1, 0, -1, -1, -1],
        ctt_offset: &[0, 3],
        corner_to_tree: &[0, 1, 2],
        corner_to_corner: &[2, 1, 0],
        ..Default::default()
    })
    .expect("corner tables are consistent")
}

/// Five trees forming a Möbius band.
pub fn moebius() -> QuadConnectivity {
    let h = 0.5 * 3f64.sqrt();
    let vertices = [
        0., 0., 0., //
        0., 1., 0., //
        1., 0., 0., //
        1., 1., 0., //
        1.5, 0., h, //
        1.5, 1., h, //
        0.5, 0.5, 1.5, //
        0.5, 0.5, 2., //
        -0.5, 0., h, //
        -0.5, 1., h,
    ];
    QuadConnectivity::from_tables(ConnectivityTables {
        vertices: &vertices,
        tree_to_vertex: &[
            0, 2, 1, 3, 3, 5, 2, 4, 4, 6, 5, 7, 6, 7, 9, 8, 9, 8, 1, 0,
        ],
        tree_to_tree: &[4, 1, 0, 0, 0, 2, 1, 1, 1, 3, 2, 2, 3, 3, 2, 4, 4, 4, 3, 0],
        tree_to_face: &[7, 4, 2, 3, 5, 4, 2, 3, 5, 2, 2, 3, 0, 1, 1, 2, 0, 1, 3, 4],
        ..Default::default()
    })
    .expect("moebius tables are consistent")
}

/// Six trees around a central corner, with mixed orientations.
pub fn star() -> QuadConnectivity {
    let (r1, r2) = (1.0, 1.5);
    let mut vertices = [0.0; 13 * 3];
    for i in 0..6 {
        let a = i as f64 * PI / 3.0;
        let b = (i as f64 + 0.5) * PI / 3.0;
        vertices[(2 * i + 1) * 3] = r1 * a.cos();
        vertices[(2 * i + 1) * 3 + 1] = r1 * a.sin();
        vertices[(2 * i + 2) * 3] = r2 * b.cos();
        vertices[(2 * i + 2) * 3 + 1] = r2 * b.sin();
    }
    QuadConnectivity::from_tables(ConnectivityTables {
        vertices: &vertices,
        tree_to_vertex: &[
            0, 1, 3, 2, 0, 3, 5, 4, 5, 6, 0, 7, 8, 7, 9, 0, 9, 0, 10, 11, 12, 1, 11, 0,
        ],
        tree_to_tree: &[
            1, 0, 5, 0, 2, 1, 0, 1, 1, 2, 2, 3, 3, 2, 3, 4, 4, 5, 3, 4, 5, 0, 5, 4,
        ],
        tree_to_face: &[
            2, 1, 5, 3, 4, 1, 0, 3, 4, 1, 2, 5, 0, 7, 2, 2, 0, 7, 3, 3, 0, 6, 2, 5,
        ],
        tree_to_corner: &[
            0, -1, -1, -1, 0, -1, -1, -1, -1, -1, 0, -1, -1, -1, -1, 0, -1, 0, -1, -1, -1, -1,
            -1, 0,
        ],
        ctt_offset: &[0, 6],
        corner_to_tree: &[0, 1, 2, 3, 4, 5],
        corner_to_corner: &[0, 0, 2, 3, 1, 3],
        ..Default::default()
    })
    .expect("star tables are consistent")
}

const UNIT_CUBE_VERTICES: [f64; 24] = [
    0., 0., 0., //
    1., 0., 0., //
    0., 1., 0., //
    1., 1., 0., //
    0., 0., 1., //
    1., 0., 1., //
    0., 1., 1., //
    1., 1., 1.,
];

/// One octree, all faces on the boundary.
pub fn unit_cube() -> OctConnectivity {
    OctConnectivity::from_tables(ConnectivityTables {
        vertices: &UNIT_CUBE_VERTICES,
        tree_to_vertex: &[0, 1, 2, 3, 4, 5, 6, 7],
        tree_to_tree: &[0; 6],
        tree_to_face: &[0, 1, 2, 3, 4, 5],
        ..Default::default()
    })
    .expect("unit cube tables are consistent")
}

/// Two octrees sharing an x face.
pub fn two_cubes() -> OctConnectivity {
    let mut vertices = UNIT_CUBE_VERTICES.to_vec();
    vertices.extend_from_slice(&[
        2., 0., 0., //
        2., 1., 0., //
        2., 0., 1., //
        2., 1., 1.,
    ]);
    OctConnectivity::from_tables(ConnectivityTables {
        vertices: &vertices,
        tree_to_vertex: &[0, 1, 2, 3, 4, 5, 6, 7, 1, 8, 3, 9, 5, 10, 7, 11],
        tree_to_tree: &[0, 1, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
        tree_to_face: &[0, 0, 2, 3, 4, 5, 1, 1, 2, 3, 4, 5],
        ..Default::default()
    })
    .expect("two cubes tables are consistent")
}

/// One octree periodic in all directions: one edge id per axis and a
/// single corner id.
pub fn periodic_cube() -> OctConnectivity {
    OctConnectivity::from_tables(ConnectivityTables {
        vertices: &UNIT_CUBE_VERTICES,
        tree_to_vertex: &[0, 1, 2, 3, 4, 5, 6, 7],
        tree_to_tree: &[0; 6],
        tree_to_face: &[1, 0, 3, 2, 5, 4],
        tree_to_edge: &[0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2],
        ett_offset: &[0, 4, 8, 12],
        edge_to_tree: &[0; 12],
        edge_to_edge: &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        tree_to_corner: &[0; 8],
        ctt_offset: &[0, 8],
        corner_to_tree: &[0; 8],
        corner_to_corner: &[0, 1, 2, 3, 4, 5, 6, 7],
        ..Default::default()
    })
    .expect("periodic cube tables are consistent")
}
