use mesh_forest::mesh_generation::{BrickIndexer, Periodicity, brick, brick_2d, brick_3d};
use mesh_forest::topology::{
    Dim2, Dim3, OctConnectivity, find_corner_transform, find_edge_transform, find_face_transform,
};
use mesh_forest::MeshForestError;
use proptest::prelude::*;

fn periodicity(bits: u8) -> Periodicity {
    Periodicity {
        x: bits & 1 != 0,
        y: bits & 2 != 0,
        z: bits & 4 != 0,
    }
}

fn corner_extent(e: usize, periodic: bool) -> usize {
    if periodic { e } else { e - 1 }
}

#[test]
fn indexer_bijection_on_a_3x7_grid() {
    let ix = BrickIndexer::<Dim2>::new(&[3, 7]);
    let mut seen = vec![false; 21];
    for i in 0..ix.len() {
        let c = ix.linear_to_coords(i);
        assert_eq!(ix.coords_to_linear(c), i);
        if c[0] < 3 && c[1] < 7 {
            let slot = (c[1] * 3 + c[0]) as usize;
            assert!(!seen[slot]);
            seen[slot] = true;
        }
    }
    assert!(seen.iter().all(|&s| s));
}

proptest! {
    #[test]
    fn indexer_inverts_on_every_grid_point(x in 1usize..12, y in 1usize..12, z in 1usize..12) {
        let ix = BrickIndexer::<Dim3>::new(&[x, y, z]);
        for k in 0..z as u64 {
            for j in 0..y as u64 {
                for i in 0..x as u64 {
                    let lin = ix.coords_to_linear([i, j, k]);
                    prop_assert!(lin < ix.len());
                    prop_assert_eq!(ix.linear_to_coords(lin), [i, j, k]);
                }
            }
        }
    }

    #[test]
    fn quad_brick_counts_and_validity(m in 1usize..6, n in 1usize..6, bits in 0u8..4) {
        let p = periodicity(bits);
        let conn = brick_2d(m, n, p).unwrap();
        prop_assert!(conn.is_valid());
        prop_assert_eq!(conn.num_trees(), m * n);
        prop_assert_eq!(conn.num_vertices(), (m + 1) * (n + 1));
        prop_assert_eq!(
            conn.num_corners(),
            corner_extent(m, p.x) * corner_extent(n, p.y)
        );
    }

    #[test]
    fn oct_brick_counts_and_validity(
        m in 1usize..4, n in 1usize..4, p in 1usize..4, bits in 0u8..8,
    ) {
        let per = periodicity(bits);
        let conn = brick_3d(m, n, p, per).unwrap();
        prop_assert!(conn.is_valid());
        let (mc, nc, pc) = (
            corner_extent(m, per.x),
            corner_extent(n, per.y),
            corner_extent(p, per.z),
        );
        prop_assert_eq!(conn.num_corners(), mc * nc * pc);
        prop_assert_eq!(conn.num_edges(), m * nc * pc + mc * n * pc + mc * nc * p);
        prop_assert_eq!(conn.num_ett(), 4 * conn.num_edges());
        prop_assert_eq!(conn.num_ctt(), 8 * conn.num_corners());
    }
}

#[test]
fn brick_face_transform_crosses_the_shared_face() {
    // trees 0 = (0,0) and 1 = (1,0) share tree 0's +x face
    let conn = brick_2d(2, 1, Periodicity::none()).unwrap();
    let (tree, ft) = find_face_transform(&conn, 0, 1).unwrap();
    assert_eq!(tree, 1);
    // one cell past the +x face at level 2 is cell (0, 1) of the neighbor
    assert_eq!(ft.transform_coords([4, 1, 0], 2), [0, 1, 0]);
    assert!(find_face_transform(&conn, 0, 0).is_none());
}

#[test]
fn periodic_brick_wraps_around() {
    let conn = brick_2d(3, 1, Periodicity { x: true, y: false, z: false }).unwrap();
    let last = (0..3)
        .find(|&t| conn.vertex(conn.tree_vertex(t, 0).unwrap())[0] == 2.0)
        .unwrap();
    let (tree, _) = find_face_transform(&conn, last, 1).unwrap();
    assert_eq!(conn.vertex(conn.tree_vertex(tree, 0).unwrap())[0], 0.0);
}

#[test]
fn octree_brick_edges_and_corners() {
    let conn: OctConnectivity = brick::<Dim3>(&[2, 2, 2], Periodicity::none()).unwrap();
    // tree 0's z-parallel edge at x = y = 1 is edge 11
    let info = find_edge_transform(&conn, 0, 11);
    assert_eq!(info.face_neighbors, 2);
    assert_eq!(info.transforms.len(), 1);
    assert_eq!(info.transforms[0].ntree, 3);
    assert_eq!(info.transforms[0].nedge, 8);
    assert!(!info.transforms[0].nflip);

    let corner = find_corner_transform(&conn, 0, 7);
    assert_eq!(corner.transforms.len(), 1);
    assert_eq!((corner.transforms[0].ntree, corner.transforms[0].ncorner), (7, 0));
    assert_eq!(corner.expected_count(), 8);
}

#[test]
fn bad_extents_are_rejected() {
    assert!(matches!(
        brick_2d(0, 3, Periodicity::none()),
        Err(MeshForestError::InvalidGeometry(_))
    ));
    assert!(matches!(
        brick::<Dim2>(&[1, 2, 3], Periodicity::none()),
        Err(MeshForestError::InvalidGeometry(_))
    ));
}

#[test]
fn serde_round_trip_of_a_brick() {
    let conn = brick_3d(3, 2, 2, Periodicity { x: false, y: true, z: false }).unwrap();
    let json = serde_json::to_string(&conn).unwrap();
    let back: OctConnectivity = serde_json::from_str(&json).unwrap();
    assert!(back.structural_eq(&conn));
}
