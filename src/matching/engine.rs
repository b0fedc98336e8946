use tracing::{debug, info};

use super::types::Match;
use crate::blocking::CandidatePair;
use crate::similarity::SimilarityMethod;
use crate::TARGET_MATCHING;

/// Counters from one matching pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub candidates: usize,
    pub accepted: usize,
}

/// Scores every candidate and keeps those with `score > threshold`.
///
/// The comparison is strict: a pair scoring exactly the threshold is
/// rejected. The threshold itself is not validated here.
pub fn match_pairs<'a, I>(
    candidates: I,
    threshold: f64,
    method: SimilarityMethod,
) -> (Vec<Match>, MatchStats)
where
    I: IntoIterator<Item = CandidatePair<'a>>,
{
    let mut stats = MatchStats::default();
    let mut matches = Vec::new();

    for pair in candidates {
        stats.candidates += 1;
        let score = method.score(pair.left, pair.right);

        if score > threshold {
            debug!(
                target: TARGET_MATCHING,
                "Accepted {} / {} (score={:.4}, key={:?})",
                pair.left.external_id,
                pair.right.external_id,
                score,
                pair.key
            );
            matches.push(Match {
                left: pair.left.clone(),
                right: pair.right.clone(),
                similarity_score: score,
            });
        }
    }

    stats.accepted = matches.len();
    info!(
        target: TARGET_MATCHING,
        "{} accepted {} of {} candidate pairs (threshold {})",
        method,
        stats.accepted,
        stats.candidates,
        threshold
    );

    (matches, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocking::{block, BlockingStrategy};
    use crate::record::{Dataset, RawRecord};

    fn datasets() -> (Dataset, Dataset) {
        Dataset::pair(
            "a",
            vec![
                RawRecord::new("a0", "join ordering", None, 1999),
                RawRecord::new("a1", "Skyline queries", Some("Borzsony"), 2001),
            ],
            "b",
            vec![
                RawRecord::new("b0", "join", None, 1999),
                RawRecord::new("b1", "Skyline queries", Some("Borzsonyi"), 2001),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_threshold_is_strict() {
        let (a, b) = datasets();
        // "join ordering" vs "join": 1 shared token of 2 -> exactly 0.5
        let stream = block(&a, &b, BlockingStrategy::CrossProduct).unwrap();
        let (matches, _) = match_pairs(stream, 0.5, SimilarityMethod::Combined);
        assert!(!matches.iter().any(|m| m.key() == ("a0".into(), "b0".into())));

        let stream = block(&a, &b, BlockingStrategy::CrossProduct).unwrap();
        let (matches, _) = match_pairs(stream, 0.5 - 1e-9, SimilarityMethod::Combined);
        let hit = matches
            .iter()
            .find(|m| m.key() == ("a0".into(), "b0".into()))
            .expect("pair just above threshold must be accepted");
        assert_eq!(hit.similarity_score, 0.5);
    }

    #[test]
    fn test_stats_and_scores() {
        let (a, b) = datasets();
        let stream = block(&a, &b, BlockingStrategy::Year).unwrap();
        let (matches, stats) = match_pairs(stream, 0.7, SimilarityMethod::Combined);

        assert_eq!(stats, MatchStats { candidates: 2, accepted: 1 });
        assert_eq!(matches[0].left_id(), 1);
        assert_eq!(matches[0].right_id(), 3);
        assert!(matches[0].similarity_score > 0.7 && matches[0].similarity_score <= 1.0);
    }

    #[test]
    fn test_no_candidates_no_matches() {
        let (matches, stats) = match_pairs(Vec::new(), 0.0, SimilarityMethod::Combined);
        assert!(matches.is_empty());
        assert_eq!(stats.candidates, 0);
    }
}
