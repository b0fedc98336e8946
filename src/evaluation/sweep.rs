use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::confusion::{confusion_from_keys, format_metric, match_keys, ConfusionCounts};
use crate::blocking::{block, BlockingStrategy};
use crate::error::{ResolutionError, Result};
use crate::matching::{match_pairs, Match, MatchKey};
use crate::record::Dataset;
use crate::similarity::SimilarityMethod;
use crate::TARGET_EVALUATION;

/// Ground truth: every A×B pair scored, no blocking.
pub fn baseline(
    a: &Dataset,
    b: &Dataset,
    threshold: f64,
    method: SimilarityMethod,
) -> Result<Vec<Match>> {
    let stream = block(a, b, BlockingStrategy::CrossProduct)?;
    let (matches, stats) = match_pairs(stream, threshold, method);
    info!(
        target: TARGET_EVALUATION,
        "Baseline {} at {}: {} matches of {} pairs",
        method,
        threshold,
        stats.accepted,
        stats.candidates
    );
    Ok(matches)
}

/// One (threshold, method, strategy) cell of a method sweep.
#[derive(Debug, Clone)]
pub struct MethodResult {
    pub threshold: f64,
    pub matching_method: SimilarityMethod,
    pub blocking_method: BlockingStrategy,
    pub candidates: usize,
    pub matches: usize,
    pub counts: ConfusionCounts,
    pub duration: Duration,
}

impl MethodResult {
    pub fn summary(&self) -> String {
        format!(
            "{} / {} @ {}: {} matches, precision={} recall={} f1={}",
            self.blocking_method,
            self.matching_method,
            self.threshold,
            self.matches,
            format_metric(self.counts.precision()),
            format_metric(self.counts.recall()),
            format_metric(self.counts.f1())
        )
    }
}

/// Runs blocking and matching for every threshold × method × strategy and
/// scores each run against the baseline of the same threshold and method.
///
/// Thresholds outside [0,1] are rejected before any work is done.
pub fn evaluate_methods(
    a: &Dataset,
    b: &Dataset,
    thresholds: &[f64],
    methods: &[SimilarityMethod],
    strategies: &[BlockingStrategy],
) -> Result<Vec<MethodResult>> {
    if let Some(bad) = thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
        return Err(ResolutionError::configuration(format!(
            "threshold {} is outside [0, 1]",
            bad
        )));
    }

    let mut baselines: HashMap<(u64, SimilarityMethod), HashSet<MatchKey>> = HashMap::new();
    let mut results = Vec::with_capacity(thresholds.len() * methods.len() * strategies.len());

    for &threshold in thresholds {
        for &method in methods {
            let truth = match baselines.entry((threshold.to_bits(), method)) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    entry.insert(match_keys(&baseline(a, b, threshold, method)?))
                }
            };
            if truth.is_empty() {
                warn!(
                    target: TARGET_EVALUATION,
                    "Empty baseline for {} at {}: recall is undefined",
                    method,
                    threshold
                );
            }

            for &strategy in strategies {
                let start = Instant::now();
                let stream = block(a, b, strategy)?;
                let (matches, stats) = match_pairs(stream, threshold, method);
                let duration = start.elapsed();

                let counts = confusion_from_keys(truth, &match_keys(&matches));
                let result = MethodResult {
                    threshold,
                    matching_method: method,
                    blocking_method: strategy,
                    candidates: stats.candidates,
                    matches: stats.accepted,
                    counts,
                    duration,
                };
                info!(target: TARGET_EVALUATION, "{}", result.summary());
                results.push(result);
            }
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawRecord;

    fn datasets() -> (Dataset, Dataset) {
        Dataset::pair(
            "a",
            vec![
                RawRecord::new("a0", "Efficient skyline computation", Some("Tan Eng Ooi"), 2001),
                RawRecord::new("a1", "Mining association rules", Some("Agrawal Srikant"), 1994),
                RawRecord::new("a2", "The R-tree revisited", None, 1990),
            ],
            "b",
            vec![
                RawRecord::new("b0", "Efficient skyline computation", Some("Tan Eng Ooi"), 2002),
                RawRecord::new("b1", "mining association rules", Some("Agrawal Srikant"), 1994),
                RawRecord::new("b2", "Spatial joins", None, 1993),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_baseline_scores_every_pair() {
        let (a, b) = datasets();
        let matches = baseline(&a, &b, 0.5, SimilarityMethod::Combined).unwrap();
        let keys: Vec<MatchKey> = matches.iter().map(Match::key).collect();
        assert_eq!(
            keys,
            vec![
                ("a0".to_string(), "b0".to_string()),
                ("a1".to_string(), "b1".to_string())
            ]
        );
    }

    #[test]
    fn test_sweep_covers_the_grid() {
        let (a, b) = datasets();
        let results = evaluate_methods(
            &a,
            &b,
            &[0.3, 0.5],
            &[SimilarityMethod::Combined, SimilarityMethod::TitleJaccard],
            &BlockingStrategy::ALL,
        )
        .unwrap();

        assert_eq!(results.len(), 2 * 2 * BlockingStrategy::ALL.len());
        for result in &results {
            assert_eq!(result.counts.candidate_len(), result.matches);
            assert_eq!(result.counts.false_positive, 0);
            if result.blocking_method == BlockingStrategy::CrossProduct {
                assert_eq!(result.counts.false_negative, 0);
                assert_eq!(result.candidates, 9);
            }
        }

        // Year blocking loses the skyline pair (2001 vs 2002).
        let year = results
            .iter()
            .find(|r| {
                r.blocking_method == BlockingStrategy::Year
                    && r.matching_method == SimilarityMethod::Combined
                    && r.threshold == 0.5
            })
            .unwrap();
        assert_eq!(year.counts.true_positive, 1);
        assert_eq!(year.counts.false_negative, 1);
        assert_eq!(year.counts.recall(), Some(0.5));
    }

    #[test]
    fn test_sweep_rejects_out_of_range_threshold() {
        let (a, b) = datasets();
        let err = evaluate_methods(
            &a,
            &b,
            &[1.5],
            &[SimilarityMethod::Combined],
            &BlockingStrategy::ALL,
        )
        .unwrap_err();
        assert!(matches!(err, ResolutionError::Configuration(_)));
    }
}
