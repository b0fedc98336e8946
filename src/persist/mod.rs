//! File-backed collaborators: the matched-pairs table, the cluster tables and
//! the evaluation/scalability reports. Everything is CSV.

pub mod matches;
pub mod tables;

pub use matches::{read_matches, read_matches_from_path, CsvMatchSink, MatchSink, NullSink};
pub use tables::{write_clusters, write_membership, write_method_results, write_scalability_results};

use std::fs::{self, File};
use std::path::Path;

use crate::error::Result;

/// Creates (or truncates) `path`, creating missing parent directories.
pub fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(File::create(path)?)
}
