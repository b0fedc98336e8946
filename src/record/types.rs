use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ResolutionError, Result};

/// Which side of the resolution a record came from.
///
/// Candidate pairs are always (A, B); provenance never flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DatasetTag {
    A,
    B,
}

impl fmt::Display for DatasetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetTag::A => write!(f, "A"),
            DatasetTag::B => write!(f, "B"),
        }
    }
}

/// One bibliographic citation as seen by the core.
///
/// `id` is unique across both datasets and never reassigned; `external_id`
/// is the identifier carried by the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub external_id: String,
    pub title: String,
    pub authors: Option<String>,
    pub year: i32,
    pub source: DatasetTag,
}

/// A record as read from a source file, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub external_id: String,
    pub title: String,
    pub authors: Option<String>,
    pub year: i32,
}

impl RawRecord {
    pub fn new(external_id: &str, title: &str, authors: Option<&str>, year: i32) -> Self {
        RawRecord {
            external_id: external_id.to_string(),
            title: title.to_string(),
            authors: authors.map(str::to_string),
            year,
        }
    }
}

/// An ordered, id-assigned record set.
#[derive(Debug, Clone)]
pub struct Dataset {
    tag: DatasetTag,
    name: String,
    records: Vec<Record>,
}

impl Dataset {
    /// Builds a dataset, assigning ids `id_offset..id_offset + len`.
    ///
    /// Titles are mandatory: an empty or whitespace-only title is a data-shape
    /// error. Blank author fields are stored as absent.
    pub fn new(
        tag: DatasetTag,
        name: impl Into<String>,
        raw: Vec<RawRecord>,
        id_offset: u64,
    ) -> Result<Self> {
        let name = name.into();
        let mut records = Vec::with_capacity(raw.len());

        for (row, raw_record) in raw.into_iter().enumerate() {
            if raw_record.title.trim().is_empty() {
                return Err(ResolutionError::data_shape(
                    &name,
                    row + 1,
                    format!("record '{}' has an empty title", raw_record.external_id),
                ));
            }

            let authors = raw_record
                .authors
                .filter(|authors| !authors.trim().is_empty());

            records.push(Record {
                id: id_offset + row as u64,
                external_id: raw_record.external_id,
                title: raw_record.title,
                authors,
                year: raw_record.year,
                source: tag,
            });
        }

        Ok(Dataset { tag, name, records })
    }

    /// Builds the (A, B) pair with B's ids starting right after A's.
    pub fn pair(
        name_a: impl Into<String>,
        raw_a: Vec<RawRecord>,
        name_b: impl Into<String>,
        raw_b: Vec<RawRecord>,
    ) -> Result<(Dataset, Dataset)> {
        let a = Dataset::new(DatasetTag::A, name_a, raw_a, 0)?;
        let b = Dataset::new(DatasetTag::B, name_b, raw_b, a.len() as u64)?;
        Ok((a, b))
    }

    pub fn tag(&self) -> DatasetTag {
        self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.iter().map(|r| r.id)
    }

    /// Replaces the records' payload while keeping tag, name and ids.
    pub(crate) fn map_records<F>(&self, mut f: F) -> Dataset
    where
        F: FnMut(&Record) -> Record,
    {
        Dataset {
            tag: self.tag,
            name: self.name.clone(),
            records: self.records.iter().map(|r| f(r)).collect(),
        }
    }
}

/// Union of both datasets' ids: the clustering vertex set.
pub fn vertex_ids(a: &Dataset, b: &Dataset) -> Vec<u64> {
    a.ids().chain(b.ids()).collect()
}
