use serde::{Deserialize, Serialize};

use crate::record::Record;

/// A candidate pair whose similarity exceeded the threshold.
///
/// Carries full copies of both records so it can be persisted and compared
/// without the source datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub left: Record,
    pub right: Record,
    pub similarity_score: f64,
}

/// Composite key of both records' external identifiers.
pub type MatchKey = (String, String);

impl Match {
    pub fn left_id(&self) -> u64 {
        self.left.id
    }

    pub fn right_id(&self) -> u64 {
        self.right.id
    }

    /// Identity used when comparing match sets across runs or engines;
    /// internal ids may differ, external ids do not.
    pub fn key(&self) -> MatchKey {
        (self.left.external_id.clone(), self.right.external_id.clone())
    }
}
