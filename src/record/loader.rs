use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

use super::types::{Dataset, DatasetTag, RawRecord};
use crate::error::{ResolutionError, Result};
use crate::TARGET_PERSIST;

/// Column names and delimiter of a source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub paper_id: String,
    pub title: String,
    pub authors: String,
    pub year: String,
    pub delimiter: char,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            paper_id: "paper ID".to_string(),
            title: "paper title".to_string(),
            authors: "author names".to_string(),
            year: "year".to_string(),
            delimiter: ',',
        }
    }
}

impl ColumnMapping {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(ResolutionError::configuration(format!(
                "delimiter '{}' is not a single ASCII character",
                self.delimiter
            )))
        }
    }
}

/// Reads raw records from any delimited source.
pub fn read_raw_records<R: Read>(
    reader: R,
    dataset_name: &str,
    mapping: &ColumnMapping,
) -> Result<Vec<RawRecord>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(mapping.delimiter_byte()?)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| {
                ResolutionError::data_shape(
                    dataset_name,
                    0,
                    format!("missing required column '{}'", name),
                )
            })
    };

    let id_col = column(&mapping.paper_id)?;
    let title_col = column(&mapping.title)?;
    let authors_col = column(&mapping.authors)?;
    let year_col = column(&mapping.year)?;

    let mut records = Vec::new();
    for (i, row) in csv.records().enumerate() {
        let row = row?;
        let line = i + 1;
        let field = |idx: usize| row.get(idx).unwrap_or("");

        let year = parse_year(field(year_col)).ok_or_else(|| {
            ResolutionError::data_shape(
                dataset_name,
                line,
                format!("cannot parse year '{}'", field(year_col)),
            )
        })?;

        let authors = field(authors_col);
        records.push(RawRecord {
            external_id: field(id_col).to_string(),
            title: field(title_col).to_string(),
            authors: if authors.trim().is_empty() {
                None
            } else {
                Some(authors.to_string())
            },
            year,
        });
    }

    debug!(target: TARGET_PERSIST, "Read {} raw records from {}", records.len(), dataset_name);
    Ok(records)
}

/// Accepts plain integers and integral floats ("1999.0"), as written by
/// dataframe tools that store years in float columns.
fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    if let Ok(year) = value.parse::<i32>() {
        return Some(year);
    }
    match value.parse::<f64>() {
        Ok(year) if year.fract() == 0.0 && year.abs() < i32::MAX as f64 => Some(year as i32),
        _ => None,
    }
}

/// Loads one dataset file, assigning ids from `id_offset`.
pub fn load_dataset(
    path: &Path,
    tag: DatasetTag,
    id_offset: u64,
    mapping: &ColumnMapping,
) -> Result<Dataset> {
    let name = path.display().to_string();
    let file = std::fs::File::open(path)?;
    let raw = read_raw_records(file, &name, mapping)?;
    let dataset = Dataset::new(tag, name, raw, id_offset)?;
    info!(
        target: TARGET_PERSIST,
        "Loaded dataset {} ({}) with {} records",
        dataset.name(),
        tag,
        dataset.len()
    );
    Ok(dataset)
}

/// Loads dataset A and dataset B, with B's ids following A's.
pub fn load_dataset_pair(
    path_a: &Path,
    path_b: &Path,
    mapping: &ColumnMapping,
) -> Result<(Dataset, Dataset)> {
    let a = load_dataset(path_a, DatasetTag::A, 0, mapping)?;
    let b = load_dataset(path_b, DatasetTag::B, a.len() as u64, mapping)?;
    Ok((a, b))
}

/// Writes a dataset back out with the same column mapping.
pub fn write_dataset<W: Write>(
    writer: W,
    dataset: &Dataset,
    mapping: &ColumnMapping,
) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(mapping.delimiter_byte()?)
        .from_writer(writer);

    csv.write_record([
        mapping.paper_id.as_str(),
        mapping.title.as_str(),
        mapping.authors.as_str(),
        mapping.year.as_str(),
    ])?;

    for record in dataset.records() {
        csv.write_record([
            record.external_id.as_str(),
            record.title.as_str(),
            record.authors.as_deref().unwrap_or(""),
            record.year.to_string().as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
