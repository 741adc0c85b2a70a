//! Graph partitioners used to reorder trees.

use crate::algs::tree_graph::TreeGraph;
use crate::mesh_error::MeshForestError;

/// Splits a tree graph into `parts` parts.
///
/// The result holds one part id in `[0, parts)` per vertex.
pub trait TreePartitioner {
    fn partition(&self, graph: &TreeGraph, parts: usize) -> Result<Vec<i32>, MeshForestError>;
}

/// k-way partitioning through METIS.
///
/// METIS expects a simple graph, so self loops and repeated neighbors are
/// removed before the call.
#[cfg(feature = "metis-support")]
#[derive(Clone, Copy, Debug, Default)]
pub struct MetisPartitioner;

#[cfg(feature = "metis-support")]
impl TreePartitioner for MetisPartitioner {
    fn partition(&self, graph: &TreeGraph, parts: usize) -> Result<Vec<i32>, MeshForestError> {
        use metis::Idx;

        let n = graph.num_vertices();
        if parts <= 1 || n == 0 {
            return Ok(vec![0; n]);
        }
        let to_idx = |v: usize| {
            Idx::try_from(v)
                .map_err(|_| MeshForestError::Partitioner(format!("{v} exceeds METIS index range")))
        };
        let simple = graph.simplified();
        let xadj = simple.xadj.iter().map(|&v| to_idx(v)).collect::<Result<Vec<_>, _>>()?;
        let adjncy = simple
            .adjncy
            .iter()
            .map(|&v| to_idx(v))
            .collect::<Result<Vec<_>, _>>()?;
        let vwgt: Vec<Idx> = simple.vwgt.iter().map(|&w| w as Idx).collect();
        let mut part = vec![0 as Idx; n];

        metis::Graph::new(1, to_idx(parts)?, &xadj, &adjncy)
            .map_err(|e| MeshForestError::Partitioner(e.to_string()))?
            .set_vwgt(&vwgt)
            .part_kway(&mut part)
            .map_err(|e| MeshForestError::Partitioner(e.to_string()))?;
        Ok(part.into_iter().map(|p| p as i32).collect())
    }
}
