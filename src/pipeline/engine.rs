use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::blocking::{block, check_provenance, BlockingStrategy, BucketIndex, CandidateStream};
use crate::clustering::{self, connected_components_partitioned, Clustering, ClusteringMethod};
use crate::error::{ResolutionError, Result};
use crate::matching::{match_pairs, Match, MatchStats};
use crate::record::Dataset;
use crate::similarity::SimilarityMethod;
use crate::TARGET_PIPELINE;

/// Where a run executes. Both modes produce identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Single thread, whole candidate stream in memory.
    #[default]
    Local,
    /// Dataset A sharded over `workers` threads; label propagation for
    /// clustering.
    Partitioned { workers: usize },
}

impl ExecutionMode {
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionMode::Local => "local",
            ExecutionMode::Partitioned { .. } => "partitioned",
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            ExecutionMode::Local => 1,
            ExecutionMode::Partitioned { workers } => *workers,
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Local => write!(f, "local"),
            ExecutionMode::Partitioned { workers } => write!(f, "partitioned({})", workers),
        }
    }
}

/// Runs `f` on a dedicated pool of `workers` threads.
fn on_pool<T, F>(workers: usize, f: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| {
            ResolutionError::configuration(format!("cannot start {} workers: {}", workers, e))
        })?;
    Ok(pool.install(f))
}

/// Blocks and matches A against B under `mode`.
///
/// Output is ordered by `(left_id, right_id)` in both modes.
pub fn block_and_match(
    a: &Dataset,
    b: &Dataset,
    strategy: BlockingStrategy,
    threshold: f64,
    method: SimilarityMethod,
    mode: ExecutionMode,
) -> Result<(Vec<Match>, MatchStats)> {
    match mode {
        ExecutionMode::Local => {
            let stream = block(a, b, strategy)?;
            Ok(match_pairs(stream, threshold, method))
        }
        ExecutionMode::Partitioned { workers } => {
            partitioned_block_and_match(a, b, strategy, threshold, method, workers)
        }
    }
}

fn partitioned_block_and_match(
    a: &Dataset,
    b: &Dataset,
    strategy: BlockingStrategy,
    threshold: f64,
    method: SimilarityMethod,
    workers: usize,
) -> Result<(Vec<Match>, MatchStats)> {
    if workers == 0 {
        return Err(ResolutionError::configuration("partitioned mode needs at least one worker"));
    }
    check_provenance(a, b)?;

    let index = BucketIndex::build(b.records(), strategy);
    let shard_len = a.len().div_ceil(workers).max(1);
    info!(
        target: TARGET_PIPELINE,
        "Partitioned blocking {} x {} with {} over {} shards of <= {} records",
        a.len(),
        b.len(),
        strategy,
        a.len().div_ceil(shard_len),
        shard_len
    );

    let shards: Vec<(Vec<Match>, MatchStats)> = on_pool(workers, || {
        a.records()
            .par_chunks(shard_len)
            .map(|shard| {
                let stream = CandidateStream::with_index(shard, b.records(), &index);
                match_pairs(stream, threshold, method)
            })
            .collect()
    })?;

    let mut stats = MatchStats::default();
    let mut matches = Vec::new();
    for (shard_matches, shard_stats) in shards {
        stats.candidates += shard_stats.candidates;
        stats.accepted += shard_stats.accepted;
        matches.extend(shard_matches);
    }
    matches.sort_by_key(|m| (m.left_id(), m.right_id()));

    debug!(
        target: TARGET_PIPELINE,
        "Merged shards: {} matches of {} candidates",
        stats.accepted,
        stats.candidates
    );
    Ok((matches, stats))
}

/// Clusters the match graph under `mode`.
pub fn cluster(
    matches: &[Match],
    vertex_ids: &[u64],
    method: ClusteringMethod,
    mode: ExecutionMode,
) -> Result<Clustering> {
    match (method, mode) {
        (_, ExecutionMode::Local) => clustering::cluster(matches, vertex_ids, method),
        (ClusteringMethod::ConnectedComponents, ExecutionMode::Partitioned { workers }) => {
            let (clustering, _rounds) = on_pool(workers.max(1), || {
                connected_components_partitioned(matches, vertex_ids, workers)
            })??;
            Ok(clustering)
        }
    }
}
