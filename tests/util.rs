#![allow(dead_code)]
use mesh_forest::{
    algs::communicator::RayonComm,
    topology::{Connectivity, Dimension, QuadConnectivity, canonical},
};

/// Every hand-built quadtree connectivity, by name.
pub fn canonical_2d() -> Vec<(&'static str, QuadConnectivity)> {
    vec![
        ("unit_square", canonical::unit_square()),
        ("periodic", canonical::periodic()),
        ("rotwrap", canonical::rotwrap()),
        ("corner", canonical::corner()),
        ("moebius", canonical::moebius()),
        ("star", canonical::star()),
    ]
}

/// `size` in-process ranks.
pub fn rayon_ranks(size: usize) -> Vec<RayonComm> {
    (0..size).map(|r| RayonComm::new(r, size)).collect()
}

/// Assert vec is a permutation of another vec (order-agnostic).
pub fn assert_permutation<T: Ord + Copy + std::fmt::Debug>(got: &[T], want: &[T]) {
    let mut a = got.to_vec();
    a.sort_unstable();
    let mut b = want.to_vec();
    b.sort_unstable();
    assert_eq!(a, b, "not a permutation\n got={:?}\nwant={:?}", got, want);
}

/// Every `(tree, face) -> (neighbor, code)` entry, renamed through `newid`.
pub fn face_edges<D: Dimension>(
    conn: &Connectivity<D>,
    newid: &[usize],
) -> Vec<(usize, usize, usize, i8)> {
    let mut out = Vec::new();
    for t in 0..conn.num_trees() {
        for f in 0..D::FACES {
            let (nt, code) = conn.tree_neighbor(t, f);
            out.push((newid[t], f, newid[nt], code.encode::<D>()));
        }
    }
    out.sort_unstable();
    out
}
