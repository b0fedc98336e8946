use std::borrow::Cow;
use tracing::{debug, info};

use super::index::BucketIndex;
use super::strategy::{BlockingKey, BlockingStrategy};
use crate::error::{ResolutionError, Result};
use crate::record::{Dataset, DatasetTag, Record};
use crate::TARGET_BLOCKING;

/// A (left from A, right from B) pair admitted by blocking.
#[derive(Debug, Clone, Copy)]
pub struct CandidatePair<'a> {
    pub left: &'a Record,
    pub right: &'a Record,
    pub key: BlockingKey,
}

impl CandidatePair<'_> {
    pub fn left_id(&self) -> u64 {
        self.left.id
    }

    pub fn right_id(&self) -> u64 {
        self.right.id
    }
}

/// Lazily yields candidate pairs, left records in input order and, for each,
/// right records in input order.
pub struct CandidateStream<'a> {
    left: &'a [Record],
    right: &'a [Record],
    index: Cow<'a, BucketIndex>,
    left_pos: usize,
    current: Vec<(usize, BlockingKey)>,
    current_pos: usize,
}

impl<'a> CandidateStream<'a> {
    /// Streams pairs for a slice of left records against a prebuilt index over
    /// `right`. Used by the partitioned engine to share one index per run.
    pub fn with_index(left: &'a [Record], right: &'a [Record], index: &'a BucketIndex) -> Self {
        Self::from_parts(left, right, Cow::Borrowed(index))
    }

    fn from_parts(left: &'a [Record], right: &'a [Record], index: Cow<'a, BucketIndex>) -> Self {
        CandidateStream {
            left,
            right,
            index,
            left_pos: 0,
            current: Vec::new(),
            current_pos: 0,
        }
    }
}

impl<'a> Iterator for CandidateStream<'a> {
    type Item = CandidatePair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_pos >= self.current.len() {
            let left = self.left.get(self.left_pos)?;
            self.current = self.index.candidates(left);
            self.current_pos = 0;
            self.left_pos += 1;
        }

        let (right_pos, key) = self.current[self.current_pos];
        self.current_pos += 1;

        let (left, right): (&'a [Record], &'a [Record]) = (self.left, self.right);
        Some(CandidatePair {
            left: &left[self.left_pos - 1],
            right: &right[right_pos],
            key,
        })
    }
}

/// Rejects anything but (A, B): candidate pairs never run from B to A.
pub(crate) fn check_provenance(left: &Dataset, right: &Dataset) -> Result<()> {
    if left.tag() != DatasetTag::A || right.tag() != DatasetTag::B {
        return Err(ResolutionError::data_shape(
            format!("{} / {}", left.name(), right.name()),
            0,
            format!(
                "blocking expects (A, B) datasets, got ({}, {})",
                left.tag(),
                right.tag()
            ),
        ));
    }
    Ok(())
}

/// Partitions the A×B pair space with `strategy`.
///
/// `left` must be dataset A and `right` dataset B. An empty dataset on either
/// side yields an empty stream.
pub fn block<'a>(
    left: &'a Dataset,
    right: &'a Dataset,
    strategy: BlockingStrategy,
) -> Result<CandidateStream<'a>> {
    check_provenance(left, right)?;

    let index = BucketIndex::build(right.records(), strategy);
    info!(
        target: TARGET_BLOCKING,
        "Blocking {} x {} records with {}",
        left.len(),
        right.len(),
        strategy
    );
    debug!(target: TARGET_BLOCKING, "{} built {} buckets", strategy, index.bucket_count());

    Ok(CandidateStream::from_parts(
        left.records(),
        right.records(),
        Cow::Owned(index),
    ))
}
