//! Run configuration.
//!
//! A `ResolutionConfig` is built once (defaults, then an optional TOML file,
//! then environment overrides, then command-line flags), validated, and
//! passed by reference into every engine call. Nothing reads configuration
//! from global state.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::blocking::BlockingStrategy;
use crate::clustering::ClusteringMethod;
use crate::environment::{
    get_env_var, split_list, ENV_BLOCKING_METHOD, ENV_CLUSTERING_METHOD, ENV_MATCHING_METHOD,
    ENV_SWEEP_THRESHOLDS, ENV_THRESHOLD, ENV_WORKERS,
};
use crate::error::{ResolutionError, Result};
use crate::pipeline::ExecutionMode;
use crate::record::ColumnMapping;
use crate::similarity::SimilarityMethod;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    pub blocking_method: BlockingStrategy,
    pub matching_method: SimilarityMethod,
    pub threshold: f64,
    pub clustering_method: ClusteringMethod,
    /// Compare the run against the cross-product baseline.
    pub baseline: bool,
    pub cluster: bool,
    pub execution: ExecutionMode,
    /// Thresholds for method sweeps.
    pub sweep_thresholds: Vec<f64>,
    pub columns: ColumnMapping,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        ResolutionConfig {
            blocking_method: BlockingStrategy::Year,
            matching_method: SimilarityMethod::Combined,
            threshold: DEFAULT_THRESHOLD,
            clustering_method: ClusteringMethod::ConnectedComponents,
            baseline: false,
            cluster: true,
            execution: ExecutionMode::Local,
            sweep_thresholds: vec![0.5, 0.7],
            columns: ColumnMapping::default(),
        }
    }
}

impl ResolutionConfig {
    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| ResolutionError::configuration(format!("invalid configuration: {}", e)))
    }

    /// Defaults, overlaid with `path` when given, then with the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                debug!("Loaded configuration from {}", path.display());
                Self::from_toml(&text)?
            }
            None => Self::default(),
        };
        config.with_env()
    }

    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(get_env_var)
    }

    /// Applies `BIBLINK_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_BLOCKING_METHOD) {
            self.blocking_method = value.parse()?;
        }
        if let Some(value) = lookup(ENV_MATCHING_METHOD) {
            self.matching_method = value.parse()?;
        }
        if let Some(value) = lookup(ENV_THRESHOLD) {
            self.threshold = parse_number(ENV_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_CLUSTERING_METHOD) {
            self.clustering_method = value.parse()?;
        }
        if let Some(value) = lookup(ENV_WORKERS) {
            let workers: usize = parse_number(ENV_WORKERS, &value)?;
            self.execution = ExecutionMode::Partitioned { workers };
        }
        if let Some(value) = lookup(ENV_SWEEP_THRESHOLDS) {
            self.sweep_thresholds = split_list(&value, ',')
                .iter()
                .map(|item| parse_number(ENV_SWEEP_THRESHOLDS, item))
                .collect::<Result<_>>()?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        check_threshold(self.threshold)?;
        for &threshold in &self.sweep_thresholds {
            check_threshold(threshold)?;
        }
        if let ExecutionMode::Partitioned { workers: 0 } = self.execution {
            return Err(ResolutionError::configuration(
                "partitioned execution needs at least one worker",
            ));
        }
        self.columns.delimiter_byte()?;
        Ok(())
    }
}

fn check_threshold(threshold: f64) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ResolutionError::configuration(format!(
            "threshold {} is outside [0, 1]",
            threshold
        )))
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ResolutionError::configuration(format!("{}: cannot parse '{}'", name, value)))
}
