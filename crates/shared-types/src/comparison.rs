//! Comparison state shared between the viewer and renderer

use serde::{Deserialize, Serialize};

/// How original and lossy-reconstructed series are jointly visualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    Original,
    Overlay,
    Residuals,
    SideBySide,
}

impl Default for ComparisonMode {
    fn default() -> Self {
        ComparisonMode::Original
    }
}

/// Everything needed to view a lossy algorithm's reconstruction of the
/// current dataset, taken from its benchmark result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructedInfo {
    pub algorithm: String,
    pub rmse: f64,
    pub max_error: f64,
    pub reconstructed_url: String,
    pub dataset_url: String,
    pub dataset_json_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&ComparisonMode::SideBySide).unwrap(),
            "\"side-by-side\""
        );
        assert_eq!(
            serde_json::from_str::<ComparisonMode>("\"residuals\"").unwrap(),
            ComparisonMode::Residuals
        );
    }
}
