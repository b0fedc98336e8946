use std::collections::HashMap;
use std::hash::Hash;

use super::strategy::{first_letter, last_letter, BlockingKey, BlockingStrategy};
use crate::record::Record;

/// Bucket index over the right-hand (B) records.
///
/// Buckets hold positions into the indexed slice in ascending order, so
/// lookups yield candidates in input order. The index is read-only once
/// built and can be shared between workers.
#[derive(Debug, Clone)]
pub enum BucketIndex {
    CrossProduct {
        len: usize,
    },
    FirstLetter(HashMap<char, Vec<usize>>),
    FirstOrLastLetter {
        first: HashMap<char, Vec<usize>>,
        last: HashMap<char, Vec<usize>>,
    },
    Year(HashMap<i32, Vec<usize>>),
}

fn bucket_by<K, F>(records: &[Record], key: F) -> HashMap<K, Vec<usize>>
where
    K: Eq + Hash,
    F: Fn(&Record) -> Option<K>,
{
    let mut buckets: HashMap<K, Vec<usize>> = HashMap::new();
    for (pos, record) in records.iter().enumerate() {
        if let Some(k) = key(record) {
            buckets.entry(k).or_default().push(pos);
        }
    }
    buckets
}

impl BucketIndex {
    pub fn build(records: &[Record], strategy: BlockingStrategy) -> Self {
        match strategy {
            BlockingStrategy::CrossProduct => BucketIndex::CrossProduct { len: records.len() },
            BlockingStrategy::FirstLetterTitle => {
                BucketIndex::FirstLetter(bucket_by(records, first_letter))
            }
            BlockingStrategy::FirstOrLastLetterTitle => BucketIndex::FirstOrLastLetter {
                first: bucket_by(records, first_letter),
                last: bucket_by(records, last_letter),
            },
            BlockingStrategy::Year => BucketIndex::Year(bucket_by(records, |r| Some(r.year))),
        }
    }

    pub fn bucket_count(&self) -> usize {
        match self {
            BucketIndex::CrossProduct { len } => usize::from(*len > 0),
            BucketIndex::FirstLetter(buckets) => buckets.len(),
            BucketIndex::FirstOrLastLetter { first, last } => first.len() + last.len(),
            BucketIndex::Year(buckets) => buckets.len(),
        }
    }

    /// Positions of indexed records that share a bucket with `left`, ascending,
    /// each with the key that admitted it.
    pub fn candidates(&self, left: &Record) -> Vec<(usize, BlockingKey)> {
        match self {
            BucketIndex::CrossProduct { len } => {
                (0..*len).map(|pos| (pos, BlockingKey::None)).collect()
            }
            BucketIndex::FirstLetter(buckets) => match first_letter(left) {
                Some(c) => lookup(buckets, &c)
                    .iter()
                    .map(|&pos| (pos, BlockingKey::FirstLetter(c)))
                    .collect(),
                None => Vec::new(),
            },
            BucketIndex::FirstOrLastLetter { first, last } => {
                let first_char = first_letter(left);
                let last_char = last_letter(left);
                let by_first = first_char.map_or(&[][..], |c| lookup(first, &c));
                let by_last = last_char.map_or(&[][..], |c| lookup(last, &c));
                merge_either(by_first, by_last, first_char, last_char)
            }
            BucketIndex::Year(buckets) => lookup(buckets, &left.year)
                .iter()
                .map(|&pos| (pos, BlockingKey::Year(left.year)))
                .collect(),
        }
    }
}

fn lookup<'a, K: Eq + Hash>(buckets: &'a HashMap<K, Vec<usize>>, key: &K) -> &'a [usize] {
    buckets.get(key).map_or(&[][..], Vec::as_slice)
}

/// Sorted union of two ascending position lists, recording which side(s)
/// admitted each position.
fn merge_either(
    by_first: &[usize],
    by_last: &[usize],
    first_char: Option<char>,
    last_char: Option<char>,
) -> Vec<(usize, BlockingKey)> {
    let mut merged = Vec::with_capacity(by_first.len().max(by_last.len()));
    let (mut i, mut j) = (0, 0);

    while i < by_first.len() || j < by_last.len() {
        let next_first = by_first.get(i).copied();
        let next_last = by_last.get(j).copied();

        let (pos, first, last) = match (next_first, next_last) {
            (Some(f), Some(l)) if f == l => {
                i += 1;
                j += 1;
                (f, first_char, last_char)
            }
            (Some(f), Some(l)) if f < l => {
                i += 1;
                (f, first_char, None)
            }
            (Some(f), None) => {
                i += 1;
                (f, first_char, None)
            }
            (_, Some(l)) => {
                j += 1;
                (l, None, last_char)
            }
            (None, None) => break,
        };

        merged.push((pos, BlockingKey::FirstOrLastLetter { first, last }));
    }

    merged
}
