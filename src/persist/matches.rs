use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use super::create_file;
use crate::error::{ResolutionError, Result};
use crate::matching::Match;
use crate::record::{DatasetTag, Record};
use crate::TARGET_PERSIST;

/// Receives the accepted match set before it is clustered.
pub trait MatchSink {
    fn write_matches(&mut self, matches: &[Match]) -> Result<()>;
}

/// Discards matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MatchSink for NullSink {
    fn write_matches(&mut self, _matches: &[Match]) -> Result<()> {
        Ok(())
    }
}

impl MatchSink for Vec<Match> {
    fn write_matches(&mut self, matches: &[Match]) -> Result<()> {
        self.extend_from_slice(matches);
        Ok(())
    }
}

const MATCH_COLUMNS: [&str; 11] = [
    "left_id",
    "left_external_id",
    "left_title",
    "left_authors",
    "left_year",
    "right_id",
    "right_external_id",
    "right_title",
    "right_authors",
    "right_year",
    "similarity_score",
];

/// One line of the matched-pairs table. Field order follows `MATCH_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MatchRow {
    left_id: u64,
    left_external_id: String,
    left_title: String,
    left_authors: Option<String>,
    left_year: i32,
    right_id: u64,
    right_external_id: String,
    right_title: String,
    right_authors: Option<String>,
    right_year: i32,
    similarity_score: f64,
}

impl From<&Match> for MatchRow {
    fn from(m: &Match) -> Self {
        MatchRow {
            left_id: m.left.id,
            left_external_id: m.left.external_id.clone(),
            left_title: m.left.title.clone(),
            left_authors: m.left.authors.clone(),
            left_year: m.left.year,
            right_id: m.right.id,
            right_external_id: m.right.external_id.clone(),
            right_title: m.right.title.clone(),
            right_authors: m.right.authors.clone(),
            right_year: m.right.year,
            similarity_score: m.similarity_score,
        }
    }
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Match {
            left: Record {
                id: row.left_id,
                external_id: row.left_external_id,
                title: row.left_title,
                authors: row.left_authors,
                year: row.left_year,
                source: DatasetTag::A,
            },
            right: Record {
                id: row.right_id,
                external_id: row.right_external_id,
                title: row.right_title,
                authors: row.right_authors,
                year: row.right_year,
                source: DatasetTag::B,
            },
            similarity_score: row.similarity_score,
        }
    }
}

/// Writes the matched-pairs table as CSV.
///
/// The header is written on the first call, even for an empty match set.
pub struct CsvMatchSink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
    rows: usize,
}

impl CsvMatchSink<File> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(CsvMatchSink::new(create_file(path)?))
    }
}

impl<W: Write> CsvMatchSink<W> {
    pub fn new(writer: W) -> Self {
        CsvMatchSink {
            writer: csv::WriterBuilder::new().has_headers(false).from_writer(writer),
            header_written: false,
            rows: 0,
        }
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| ResolutionError::Io(e.into_error()))
    }
}

impl<W: Write> MatchSink for CsvMatchSink<W> {
    fn write_matches(&mut self, matches: &[Match]) -> Result<()> {
        if !self.header_written {
            self.writer.write_record(MATCH_COLUMNS)?;
            self.header_written = true;
        }
        for m in matches {
            self.writer.serialize(MatchRow::from(m))?;
        }
        self.writer.flush()?;
        self.rows += matches.len();
        info!(target: TARGET_PERSIST, "Persisted {} matches", matches.len());
        Ok(())
    }
}

/// Reads a matched-pairs table written by [`CsvMatchSink`].
pub fn read_matches<R: Read>(reader: R) -> Result<Vec<Match>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut matches = Vec::new();
    for row in csv.deserialize::<MatchRow>() {
        matches.push(Match::from(row?));
    }
    Ok(matches)
}

pub fn read_matches_from_path(path: &Path) -> Result<Vec<Match>> {
    let matches = read_matches(File::open(path)?)?;
    info!(
        target: TARGET_PERSIST,
        "Read {} matches from {}",
        matches.len(),
        path.display()
    );
    Ok(matches)
}
