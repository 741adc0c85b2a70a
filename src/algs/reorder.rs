//! Renumber trees so that trees sharing a part become contiguous.
//!
//! Rank 0 builds the tree graph and asks a [`TreePartitioner`] for a
//! `parts`-way split; the part vector is broadcast and every rank sorts
//! trees by `(part, old index)`. The new number of tree `t` is its position
//! in that order, which all ranks compute identically.

use itertools::Itertools;
use log::{debug, info};

use crate::algs::communicator::{Communicator, REORDER_TAG};
use crate::algs::metis_partition::TreePartitioner;
use crate::algs::tree_graph::build_tree_graph;
use crate::mesh_error::MeshForestError;
use crate::topology::dimension::Dimension;
use crate::topology::{ConnectType, Connectivity};

/// New tree numbers from a part vector: trees sorted by `(part, index)`.
pub fn newid_from_parts(part: &[i32]) -> Vec<usize> {
    let mut newid = vec![0; part.len()];
    for (new, old) in (0..part.len())
        .sorted_by_key(|&t| (part[t], t))
        .enumerate()
    {
        newid[old] = new;
    }
    newid
}

/// Reorder the trees of `conn` for locality and return the applied
/// renumbering (`newid[old] = new`).
///
/// Collective over `comm`: every rank must call it with the same
/// connectivity and `parts`. If the partitioner fails on rank 0 the other
/// ranks receive an invalid part vector and fail with
/// [`MeshForestError::PartitionOutOfRange`].
pub fn reorder<D, C, P>(
    conn: &mut Connectivity<D>,
    comm: &C,
    parts: usize,
    connect_type: ConnectType,
    partitioner: &P,
) -> Result<Vec<usize>, MeshForestError>
where
    D: Dimension,
    C: Communicator + ?Sized,
    P: TreePartitioner + ?Sized,
{
    if parts == 0 {
        return Err(MeshForestError::Partitioner("cannot split into zero parts".into()));
    }
    let n = conn.num_trees();
    let rank = comm.rank();

    let mut part = vec![0i32; n];
    let mut local_failure = None;
    if rank == 0 {
        info!("reordering {n} trees into {parts} parts by {connect_type} adjacency");
        let graph = build_tree_graph(conn, connect_type);
        match partitioner.partition(&graph, parts) {
            Ok(p) if p.len() == n => part = p,
            Ok(p) => {
                local_failure = Some(MeshForestError::TableSizeMismatch {
                    table: "partition",
                    expected: n,
                    found: p.len(),
                });
                part.fill(-1);
            }
            Err(e) => {
                local_failure = Some(e);
                part.fill(-1);
            }
        }
        for p in part.iter_mut() {
            *p = p.to_le();
        }
    }

    comm.broadcast(0, REORDER_TAG.base(), bytemuck::cast_slice_mut(&mut part))?;
    for p in part.iter_mut() {
        *p = i32::from_le(*p);
    }
    if let Some(e) = local_failure {
        return Err(e);
    }
    if let Some((tree, &value)) = part
        .iter()
        .enumerate()
        .find(|&(_, &p)| p < 0 || p as usize >= parts)
    {
        return Err(MeshForestError::PartitionOutOfRange { tree, value, parts });
    }

    let newid = newid_from_parts(&part);
    conn.permute_trees(&newid);
    debug!("[{rank}] trees renumbered");
    Ok(newid)
}
