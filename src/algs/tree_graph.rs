//! Build a CSR (compressed-sparse-row) adjacency graph of the trees.
//
// Each *tree* is a vertex. Row `i` lists, in order:
//
// * the `FACES` face neighbors from `tree_to_tree` (a boundary face lists the
//   tree itself, so every row has the same face prefix),
// * for `Edge` (3D) and `Corner` in 3D, the diagonal edge neighbors of each
//   of the 12 edges,
// * for `Corner`, the diagonal corner neighbors of each corner.
//
// Neighbors reachable through several features appear several times; the
// graph is symmetric because every transform query is.

use itertools::Itertools;

use crate::topology::dimension::Dimension;
use crate::topology::transform::{find_corner_transform, find_edge_transform};
use crate::topology::{ConnectType, Connectivity};

/// CSR triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeGraph {
    pub xadj: Vec<usize>,
    pub adjncy: Vec<usize>,
    pub vwgt: Vec<i32>, // METIS expects i32
}

impl TreeGraph {
    pub fn num_vertices(&self) -> usize {
        self.xadj.len() - 1
    }

    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjncy[self.xadj[v]..self.xadj[v + 1]]
    }

    /// Sorted, deduplicated neighbors of every vertex, without self loops.
    pub fn simplified(&self) -> Self {
        let mut xadj = Vec::with_capacity(self.xadj.len());
        let mut adjncy = Vec::with_capacity(self.adjncy.len());
        xadj.push(0);
        for v in 0..self.num_vertices() {
            adjncy.extend(
                self.neighbors(v)
                    .iter()
                    .copied()
                    .filter(|&u| u != v)
                    .sorted_unstable()
                    .dedup(),
            );
            xadj.push(adjncy.len());
        }
        Self {
            xadj,
            adjncy,
            vwgt: self.vwgt.clone(),
        }
    }
}

/// Tree adjacency through the features selected by `connect_type`.
pub fn build_tree_graph<D: Dimension>(
    conn: &Connectivity<D>,
    connect_type: ConnectType,
) -> TreeGraph {
    let n = conn.num_trees();
    let with_edges = D::EDGES > 0 && connect_type != ConnectType::Face;
    let with_corners = connect_type == ConnectType::Corner;

    let mut xadj = Vec::with_capacity(n + 1);
    let mut adjncy = Vec::with_capacity(D::FACES * n);
    xadj.push(0);
    for tree in 0..n {
        adjncy.extend(
            conn.tree_to_tree()[D::FACES * tree..D::FACES * (tree + 1)]
                .iter()
                .map(|&t| t as usize),
        );
        if with_corners {
            for corner in 0..D::CHILDREN {
                let info = find_corner_transform(conn, tree, corner);
                adjncy.extend(info.transforms.iter().map(|ct| ct.ntree));
            }
        }
        if with_edges {
            for edge in 0..D::EDGES {
                let info = find_edge_transform(conn, tree, edge);
                adjncy.extend(info.transforms.iter().map(|et| et.ntree));
            }
        }
        xadj.push(adjncy.len());
    }

    TreeGraph {
        xadj,
        adjncy,
        vwgt: vec![1; n],
    }
}
