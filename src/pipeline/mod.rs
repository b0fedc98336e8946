//! One resolution run: blocking and matching, persistence of the match set,
//! then clustering, with an optional baseline comparison.

pub mod engine;

pub use engine::{block_and_match, cluster, ExecutionMode};

use std::time::{Duration, Instant};
use tracing::info;

use crate::blocking::BlockingStrategy;
use crate::clustering::Clustering;
use crate::config::ResolutionConfig;
use crate::error::Result;
use crate::evaluation::{confusion, ConfusionCounts};
use crate::matching::{Match, MatchStats};
use crate::persist::MatchSink;
use crate::record::{vertex_ids, Dataset};
use crate::TARGET_PIPELINE;

/// Wall-clock durations of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseTimings {
    pub blocking_matching: Duration,
    pub clustering: Duration,
    /// Blocking, matching, persistence and clustering. Excludes the baseline.
    pub total: Duration,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub mode: ExecutionMode,
    pub records: usize,
    pub matches: Vec<Match>,
    pub stats: MatchStats,
    /// `None` when clustering is disabled.
    pub clustering: Option<Clustering>,
    /// `None` when the baseline is disabled.
    pub baseline: Option<ConfusionCounts>,
    pub timings: PhaseTimings,
}

impl PipelineOutcome {
    /// |matches| / (|A| + |B|); zero for two empty datasets.
    pub fn match_rate(&self) -> f64 {
        if self.records == 0 {
            0.0
        } else {
            self.matches.len() as f64 / self.records as f64
        }
    }
}

/// Runs the pipeline on (A, B) as configured.
///
/// The match set is handed to `sink` before clustering starts. Invalid
/// configuration or input aborts the run without a partial result.
pub fn run_pipeline<S>(
    a: &Dataset,
    b: &Dataset,
    config: &ResolutionConfig,
    sink: &mut S,
) -> Result<PipelineOutcome>
where
    S: MatchSink + ?Sized,
{
    config.validate()?;
    let mode = config.execution;
    info!(
        target: TARGET_PIPELINE,
        "Resolving {} ({}) x {} ({}) [{} / {} @ {}, {}]",
        a.name(),
        a.len(),
        b.name(),
        b.len(),
        config.blocking_method,
        config.matching_method,
        config.threshold,
        mode
    );

    let start = Instant::now();
    let (matches, stats) = block_and_match(
        a,
        b,
        config.blocking_method,
        config.threshold,
        config.matching_method,
        mode,
    )?;
    let blocking_matching = start.elapsed();

    sink.write_matches(&matches)?;

    let cluster_start = Instant::now();
    let clustering = if config.cluster {
        Some(cluster(&matches, &vertex_ids(a, b), config.clustering_method, mode)?)
    } else {
        None
    };
    let clustering_time = cluster_start.elapsed();
    let total = start.elapsed();

    let baseline = if config.baseline {
        let (truth, _) = block_and_match(
            a,
            b,
            BlockingStrategy::CrossProduct,
            config.threshold,
            config.matching_method,
            mode,
        )?;
        let counts = confusion(&truth, &matches);
        info!(target: TARGET_PIPELINE, "Against baseline: {}", counts);
        Some(counts)
    } else {
        None
    };

    let outcome = PipelineOutcome {
        mode,
        records: a.len() + b.len(),
        matches,
        stats,
        clustering,
        baseline,
        timings: PhaseTimings {
            blocking_matching,
            clustering: clustering_time,
            total,
        },
    };

    info!(
        target: TARGET_PIPELINE,
        "{}: {} matches (rate {:.4}), {} clusters, blocking+matching {:.3}s, total {:.3}s",
        mode,
        outcome.matches.len(),
        outcome.match_rate(),
        outcome
            .clustering
            .as_ref()
            .map(|c| c.len().to_string())
            .unwrap_or_else(|| "no".to_string()),
        blocking_matching.as_secs_f64(),
        total.as_secs_f64()
    );

    Ok(outcome)
}
