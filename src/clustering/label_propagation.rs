//! Connected components by iterative min-label propagation.
//!
//! Used by the partitioned engine. Edges are split into shards; in each round
//! every shard independently proposes `min(label(u), label(v))` for both
//! endpoints of its edges, reading only the previous round's labels. The
//! proposals are reduced by minimum and applied, then every label is
//! shortcut to its label's label. The loop stops after the first round that
//! changes nothing.
//!
//! Labels are vertex positions and only ever decrease, so each component
//! converges to its smallest position, i.e. its smallest id.

use rayon::prelude::*;
use tracing::{debug, info};

use super::types::Clustering;
use super::util::VertexIndex;
use crate::error::Result;
use crate::matching::Match;
use crate::TARGET_CLUSTERING;

/// Runs label propagation with `shards` edge shards. Returns the clustering
/// and the number of rounds performed (including the final no-op round).
pub fn connected_components_partitioned(
    matches: &[Match],
    vertex_ids: &[u64],
    shards: usize,
) -> Result<(Clustering, usize)> {
    let index = VertexIndex::new(vertex_ids);
    let edges = index.edges(matches)?;
    let (labels, rounds) = propagate(index.len(), &edges, shards);
    let clustering = Clustering::from_groups(index.group_by_label(&labels));

    info!(
        target: TARGET_CLUSTERING,
        "Label propagation: {} vertices, {} edges, {} shards -> {} clusters in {} rounds",
        index.len(),
        edges.len(),
        shards.max(1),
        clustering.len(),
        rounds
    );

    Ok((clustering, rounds))
}

pub(crate) fn propagate(
    vertices: usize,
    edges: &[(usize, usize)],
    shards: usize,
) -> (Vec<usize>, usize) {
    let mut labels: Vec<usize> = (0..vertices).collect();
    let shard_len = edges.len().div_ceil(shards.max(1)).max(1);
    let mut rounds = 0;

    loop {
        rounds += 1;

        let proposals: Vec<Vec<(usize, usize)>> = edges
            .par_chunks(shard_len)
            .map(|shard| {
                let mut local = Vec::new();
                for &(u, v) in shard {
                    let min = labels[u].min(labels[v]);
                    if labels[u] > min {
                        local.push((u, min));
                    }
                    if labels[v] > min {
                        local.push((v, min));
                    }
                }
                local
            })
            .collect();

        let mut next = labels.clone();
        for (vertex, label) in proposals.into_iter().flatten() {
            if label < next[vertex] {
                next[vertex] = label;
            }
        }

        let jumped: Vec<usize> = (0..vertices).into_par_iter().map(|v| next[next[v]]).collect();

        let changed = jumped
            .iter()
            .zip(labels.iter())
            .filter(|(new, old)| new != old)
            .count();
        debug!(target: TARGET_CLUSTERING, "Round {}: {} labels changed", rounds, changed);

        labels = jumped;
        if changed == 0 {
            break;
        }
    }

    (labels, rounds)
}
