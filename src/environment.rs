use std::env;

/// Environment variables recognised by `ResolutionConfig::with_env`.
pub const ENV_BLOCKING_METHOD: &str = "BIBLINK_BLOCKING_METHOD";
pub const ENV_MATCHING_METHOD: &str = "BIBLINK_MATCHING_METHOD";
pub const ENV_THRESHOLD: &str = "BIBLINK_THRESHOLD";
pub const ENV_CLUSTERING_METHOD: &str = "BIBLINK_CLUSTERING_METHOD";
pub const ENV_WORKERS: &str = "BIBLINK_WORKERS";
pub const ENV_SWEEP_THRESHOLDS: &str = "BIBLINK_SWEEP_THRESHOLDS";

/// Retrieves an environment variable, treating unset and blank alike.
///
/// # Arguments
/// - `var`: The name of the environment variable.
///
/// # Returns
/// - `Some(value)` with surrounding whitespace trimmed, or `None`.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Splits a delimited value into trimmed, non-empty items.
///
/// # Arguments
/// - `value`: The raw string, e.g. `"0.5, 0.7"`.
/// - `delimiter`: The character to split by.
///
/// # Returns
/// - `Vec<String>`
pub fn split_list(value: &str, delimiter: char) -> Vec<String> {
    value
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
