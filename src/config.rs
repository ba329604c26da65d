//! Comparison parameters from a JSON config file.

use crate::models::{ComparisonParams, Metric};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read parameters from a JSON file; absent fields keep their defaults.
///
/// ```json
/// { "threshold": 90, "metric": "levenshtein" }
/// ```
pub fn load_params(path: &Path) -> Result<ComparisonParams, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    parse_params(&text)
}

/// Config file shape; the threshold is read wide so it clamps like the CLI flag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ParamsFile {
    threshold: Option<i64>,
    metric: Metric,
}

/// Parse parameters from JSON text. Thresholds are clamped to 0..=100.
pub fn parse_params(text: &str) -> Result<ComparisonParams, ConfigError> {
    let file: ParamsFile = serde_json::from_str(text)?;
    let params = ComparisonParams::default().with_metric(file.metric);
    Ok(match file.threshold {
        Some(threshold) => params.with_threshold(threshold),
        None => params,
    })
}
