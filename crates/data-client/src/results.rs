//! Benchmark-results feed
//!
//! Read-only consumption of the results endpoint; the viewer only needs
//! enough of it to populate the lossy-comparison selector.

use ephys_charts_shared::{BenchmarkResult, ChartsError, Result};

/// Fetch the full array of benchmark result records.
pub async fn fetch_benchmark_results(
    http: &reqwest::Client,
    url: &str,
) -> Result<Vec<BenchmarkResult>> {
    let resp = http.get(url).send().await.map_err(|e| ChartsError::Fetch {
        message: e.to_string(),
        status: None,
    })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ChartsError::Fetch {
            message: format!("HTTP {status} fetching benchmark results"),
            status: Some(status.as_u16()),
        });
    }
    resp.json().await.map_err(|e| ChartsError::Parse {
        message: e.to_string(),
    })
}

/// Results for `dataset` that can back a lossy comparison (a reconstructed
/// blob was uploaded with the record).
pub fn comparison_candidates<'a>(
    results: &'a [BenchmarkResult],
    dataset: &str,
) -> Vec<&'a BenchmarkResult> {
    results
        .iter()
        .filter(|r| r.dataset == dataset && r.supports_comparison())
        .collect()
}
