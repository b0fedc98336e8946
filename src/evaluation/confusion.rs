use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{ResolutionError, Result};
use crate::matching::{Match, MatchKey};

/// Pair-level agreement between a candidate match set and a baseline.
///
/// Both sets are compared by `(left external_id, right external_id)`, never
/// by internal id or position, so match sets from different engines or runs
/// compare cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_negative: usize,
    pub false_positive: usize,
}

impl ConfusionCounts {
    /// Size of the baseline key set (TP + FN).
    pub fn baseline_len(&self) -> usize {
        self.true_positive + self.false_negative
    }

    /// Size of the candidate key set (TP + FP).
    pub fn candidate_len(&self) -> usize {
        self.true_positive + self.false_positive
    }

    /// TP / (TP + FP), `None` when the candidate set is empty.
    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positive, self.candidate_len())
    }

    /// TP / (TP + FN), `None` when the baseline is empty.
    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positive, self.baseline_len())
    }

    /// Harmonic mean of precision and recall.
    ///
    /// `None` if either side is undefined; `Some(0.0)` when both are zero.
    pub fn f1(&self) -> Option<f64> {
        let precision = self.precision()?;
        let recall = self.recall()?;
        if precision + recall == 0.0 {
            return Some(0.0);
        }
        Some(2.0 * precision * recall / (precision + recall))
    }

    pub fn precision_checked(&self) -> Result<f64> {
        self.precision()
            .ok_or(ResolutionError::UndefinedMetric("precision (no candidate matches)"))
    }

    pub fn recall_checked(&self) -> Result<f64> {
        self.recall()
            .ok_or(ResolutionError::UndefinedMetric("recall (empty baseline)"))
    }
}

impl fmt::Display for ConfusionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP={} FN={} FP={} precision={} recall={} f1={}",
            self.true_positive,
            self.false_negative,
            self.false_positive,
            format_metric(self.precision()),
            format_metric(self.recall()),
            format_metric(self.f1())
        )
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Renders a metric with four decimals, or `undefined`.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "undefined".to_string(),
    }
}

/// Distinct composite keys of a match set.
pub fn match_keys(matches: &[Match]) -> HashSet<MatchKey> {
    matches.iter().map(Match::key).collect()
}

/// Compares `candidate` against `baseline` by composite key.
///
/// Duplicate keys within one set count once.
pub fn confusion(baseline: &[Match], candidate: &[Match]) -> ConfusionCounts {
    confusion_from_keys(&match_keys(baseline), &match_keys(candidate))
}

pub fn confusion_from_keys(
    baseline: &HashSet<MatchKey>,
    candidate: &HashSet<MatchKey>,
) -> ConfusionCounts {
    let true_positive = baseline.intersection(candidate).count();
    ConfusionCounts {
        true_positive,
        false_negative: baseline.len() - true_positive,
        false_positive: candidate.len() - true_positive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DatasetTag, Record};

    fn m(left: &str, right: &str) -> Match {
        let record = |ext: &str, id: u64, source| Record {
            id,
            external_id: ext.to_string(),
            title: "t".to_string(),
            authors: None,
            year: 2000,
            source,
        };
        Match {
            left: record(left, 0, DatasetTag::A),
            right: record(right, 1, DatasetTag::B),
            similarity_score: 0.9,
        }
    }

    #[test]
    fn test_counts_satisfy_set_sizes() {
        let baseline = vec![m("a1", "b1"), m("a2", "b2"), m("a3", "b3")];
        let candidate = vec![m("a1", "b1"), m("a3", "b3"), m("a4", "b9")];
        let counts = confusion(&baseline, &candidate);

        assert_eq!(
            counts,
            ConfusionCounts {
                true_positive: 2,
                false_negative: 1,
                false_positive: 1
            }
        );
        assert_eq!(counts.baseline_len(), baseline.len());
        assert_eq!(counts.candidate_len(), candidate.len());
        assert!((counts.precision().unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((counts.recall().unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((counts.f1().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_key_is_not_plain_concatenation() {
        // "a1"+"1b" and "a11"+"b" concatenate identically.
        let counts = confusion(&[m("a1", "1b")], &[m("a11", "b")]);
        assert_eq!(counts.true_positive, 0);
    }

    #[test]
    fn test_empty_baseline_recall_is_undefined() {
        let counts = confusion(&[], &[m("a1", "b1")]);
        assert_eq!(counts.recall(), None);
        assert_eq!(counts.f1(), None);
        assert_eq!(counts.precision(), Some(0.0));
        assert!(matches!(
            counts.recall_checked(),
            Err(ResolutionError::UndefinedMetric(_))
        ));
        assert_eq!(format_metric(counts.recall()), "undefined");
    }

    #[test]
    fn test_empty_candidate_precision_is_undefined() {
        let counts = confusion(&[m("a1", "b1")], &[]);
        assert_eq!(counts.precision(), None);
        assert_eq!(counts.recall(), Some(0.0));
        assert!(counts.precision_checked().is_err());
    }

    #[test]
    fn test_zero_precision_and_recall_gives_zero_f1() {
        let counts = confusion(&[m("a1", "b1")], &[m("a2", "b2")]);
        assert_eq!(counts.f1(), Some(0.0));
    }

    #[test]
    fn test_identical_sets() {
        let set = vec![m("a1", "b1"), m("a2", "b2")];
        let counts = confusion(&set, &set);
        assert_eq!(counts.precision(), Some(1.0));
        assert_eq!(counts.recall(), Some(1.0));
        assert_eq!(counts.f1(), Some(1.0));
    }
}
