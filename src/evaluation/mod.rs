//! Ground-truth evaluation of blocking and matching.
//!
//! The baseline is the exhaustive cross-product match set. Any other run is
//! judged against it with [`confusion`], which compares match sets by the
//! records' external identifiers.

pub mod confusion;
pub mod sweep;

pub use confusion::{confusion, confusion_from_keys, format_metric, match_keys, ConfusionCounts};
pub use sweep::{baseline, evaluate_methods, MethodResult};

use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::persist::read_matches_from_path;
use crate::TARGET_EVALUATION;

/// Compares two persisted match tables, e.g. a partitioned run against a
/// local one.
///
/// `left` plays the baseline: `true_positive` counts shared pairs,
/// `false_negative` pairs only in `left`, `false_positive` pairs only in
/// `right`.
pub fn compare_match_files(left: &Path, right: &Path) -> Result<ConfusionCounts> {
    let left_matches = read_matches_from_path(left)?;
    let right_matches = read_matches_from_path(right)?;
    let counts = confusion(&left_matches, &right_matches);

    info!(
        target: TARGET_EVALUATION,
        "Compared {} ({} rows) with {} ({} rows): {} shared, {} only left, {} only right",
        left.display(),
        left_matches.len(),
        right.display(),
        right_matches.len(),
        counts.true_positive,
        counts.false_negative,
        counts.false_positive
    );

    Ok(counts)
}
