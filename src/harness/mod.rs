//! Scalability harness.
//!
//! Each source file is expanded into perturbed variants (year shift, author
//! substitution, title substitution, in rotation). The variant list is split
//! into two halves and the pipeline runs once per (first half, second half)
//! pair and execution mode, recording timings and match rate.

pub mod perturb;

pub use perturb::{perturb_dataset, substitute_characters, Perturbation};

use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use sysinfo::System;
use tracing::{info, warn};

use crate::config::ResolutionConfig;
use crate::error::{ResolutionError, Result};
use crate::persist::{create_file, NullSink};
use crate::pipeline::{run_pipeline, ExecutionMode};
use crate::record::{load_dataset, load_dataset_pair, write_dataset, ColumnMapping, DatasetTag};
use crate::TARGET_HARNESS;

pub const DEFAULT_VARIANTS_PER_FILE: usize = 3;
pub const DEFAULT_CHANGES: usize = 4;

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub variants_per_file: usize,
    /// Characters substituted per field, or twice the year shift.
    pub changes: usize,
    pub seed: u64,
    pub out_dir: PathBuf,
    /// Every pair is run once per mode.
    pub modes: Vec<ExecutionMode>,
}

impl HarnessOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        HarnessOptions {
            variants_per_file: DEFAULT_VARIANTS_PER_FILE,
            changes: DEFAULT_CHANGES,
            seed: 0,
            out_dir: out_dir.into(),
            modes: vec![ExecutionMode::Local],
        }
    }
}

/// One pipeline run of the scalability grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalabilityRow {
    pub started_at: String,
    pub pair: String,
    pub dataset_a: String,
    pub dataset_b: String,
    pub mode: String,
    pub records: usize,
    pub matches: usize,
    pub match_rate: f64,
    pub blocking_matching_secs: f64,
    pub total_secs: f64,
}

/// Host facts logged alongside scalability results.
#[derive(Debug, Clone, Serialize)]
pub struct HostSnapshot {
    pub os: String,
    pub cpus: usize,
    pub total_memory: u64,
    pub used_memory: u64,
}

impl HostSnapshot {
    pub fn capture() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        HostSnapshot {
            os: System::long_os_version().unwrap_or_else(|| "unknown".to_string()),
            cpus: sys.cpus().len(),
            total_memory: sys.total_memory(),
            used_memory: sys.used_memory(),
        }
    }
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ResolutionError::configuration(format!("'{}' has no file name", path.display()))
        })
}

/// Variant file name: `<stem>_<tag><changes>.csv`, with a `_<round>` suffix
/// once the rotation wraps around.
pub fn variant_path(out_dir: &Path, stem: &str, index: usize, changes: usize) -> PathBuf {
    let perturbation = Perturbation::for_variant(index);
    let round = index / Perturbation::ROTATION.len();
    let name = if round == 0 {
        format!("{}_{}{}.csv", stem, perturbation.short_name(), changes)
    } else {
        format!("{}_{}{}_{}.csv", stem, perturbation.short_name(), changes, round)
    };
    out_dir.join(stem).join(name)
}

/// Writes `variants_per_file` perturbed copies of every file and returns
/// their paths, grouped by source file in input order.
///
/// Variants are keyed by file stem, so two inputs sharing a stem are
/// rejected before anything is written.
pub fn create_variants(
    files: &[PathBuf],
    options: &HarnessOptions,
    mapping: &ColumnMapping,
) -> Result<Vec<PathBuf>> {
    let mut stems = Vec::with_capacity(files.len());
    let mut seen = HashSet::new();
    for file in files {
        let stem = file_stem(file)?;
        if !seen.insert(stem.clone()) {
            return Err(ResolutionError::configuration(format!(
                "'{}' shares the name '{}' with another input; variants would collide",
                file.display(),
                stem
            )));
        }
        stems.push(stem);
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut paths = Vec::with_capacity(files.len() * options.variants_per_file);

    for (file, stem) in files.iter().zip(&stems) {
        let source = load_dataset(file, DatasetTag::A, 0, mapping)?;

        for index in 0..options.variants_per_file {
            let perturbation = Perturbation::for_variant(index);
            let variant = perturb_dataset(&source, perturbation, options.changes, &mut rng);
            let path = variant_path(&options.out_dir, stem, index, options.changes);
            write_dataset(create_file(&path)?, &variant, mapping)?;
            info!(
                target: TARGET_HARNESS,
                "Wrote {} variant of {} to {}",
                perturbation,
                file.display(),
                path.display()
            );
            paths.push(path);
        }
    }

    Ok(paths)
}

fn label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Generates variants of `files` and runs the pipeline over the cross
/// product of the two halves of the variant list, once per mode.
///
/// The baseline is skipped; clustering runs as configured.
pub fn run_scalability(
    files: &[PathBuf],
    options: &HarnessOptions,
    config: &ResolutionConfig,
) -> Result<Vec<ScalabilityRow>> {
    config.validate()?;
    if options.modes.is_empty() {
        return Err(ResolutionError::configuration("no execution modes requested"));
    }

    let host = HostSnapshot::capture();
    info!(
        target: TARGET_HARNESS,
        "Host: {}",
        serde_json::to_string(&host).unwrap_or_else(|_| format!("{:?}", host))
    );

    let variants = create_variants(files, options, &config.columns)?;
    let (left, right) = variants.split_at(variants.len() / 2);
    if left.is_empty() || right.is_empty() {
        warn!(
            target: TARGET_HARNESS,
            "{} variants cannot form two halves; nothing to run",
            variants.len()
        );
        return Ok(Vec::new());
    }

    let mut rows = Vec::with_capacity(left.len() * right.len() * options.modes.len());
    for path_a in left {
        for path_b in right {
            let (a, b) = load_dataset_pair(path_a, path_b, &config.columns)?;
            let pair = format!("{}-{}", label(path_a), label(path_b));

            for &mode in &options.modes {
                let run_config = ResolutionConfig {
                    execution: mode,
                    baseline: false,
                    ..config.clone()
                };
                let started_at = Local::now().to_rfc3339();
                let outcome = run_pipeline(&a, &b, &run_config, &mut NullSink)?;
                let row = ScalabilityRow {
                    started_at,
                    pair: pair.clone(),
                    dataset_a: path_a.display().to_string(),
                    dataset_b: path_b.display().to_string(),
                    mode: mode.to_string(),
                    records: outcome.records,
                    matches: outcome.matches.len(),
                    match_rate: outcome.match_rate(),
                    blocking_matching_secs: outcome.timings.blocking_matching.as_secs_f64(),
                    total_secs: outcome.timings.total.as_secs_f64(),
                };
                info!(
                    target: TARGET_HARNESS,
                    "{} [{}]: rate {:.4}, blocking+matching {:.3}s, total {:.3}s",
                    row.pair,
                    row.mode,
                    row.match_rate,
                    row.blocking_matching_secs,
                    row.total_secs
                );
                rows.push(row);
            }
        }
    }

    Ok(rows)
}
