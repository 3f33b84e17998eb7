//! Benchmark result records consumed from the results endpoint
//!
//! The benchmark harness publishes one JSON record per (dataset, algorithm)
//! pair. The viewer reads these to populate the lossy-comparison selector;
//! everything else about the records is external-collaborator territory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub dataset: String,
    pub algorithm: String,
    pub compression_ratio: f64,
    pub encode_time: f64,
    pub decode_time: f64,
    pub encode_mb_per_sec: f64,
    pub decode_mb_per_sec: f64,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Unix seconds, as emitted by the harness.
    #[serde(default)]
    pub timestamp: Option<f64>,
    /// Present (non-zero) only for lossy algorithms.
    #[serde(default)]
    pub rmse: Option<f64>,
    #[serde(default)]
    pub max_error: Option<f64>,
    /// Raw reconstructed blob, uploaded only for lossy algorithms.
    #[serde(default)]
    pub reconstructed_url_raw: Option<String>,
}

impl BenchmarkResult {
    /// A result supports lossy comparison only when its reconstructed blob
    /// was uploaded alongside the metrics.
    pub fn supports_comparison(&self) -> bool {
        self.reconstructed_url_raw.is_some()
    }

    /// Harness timestamp as a UTC datetime, when present and representable.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let ts = self.timestamp?;
        DateTime::from_timestamp(ts as i64, ((ts.fract()) * 1e9) as u32)
    }
}
