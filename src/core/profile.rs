//! Dataset profile returned by the backend after a dataset upload.

use super::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub rows: u64,
    pub columns: u64,
    pub missing_values: u64,
    pub duplicate_rows: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
    pub top_value: Option<Value>,
    pub freq: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    #[serde(rename = "type")]
    pub kind: String,
    pub missing: u64,
    pub unique: u64,
    #[serde(default)]
    pub stats: ColumnStats,
    #[serde(default)]
    pub sample_values: Vec<Value>,
}

impl ColumnProfile {
    pub fn is_numeric(&self) -> bool {
        self.stats.mean.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub variable1: String,
    pub variable2: String,
    pub correlation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub matrix: Option<BTreeMap<String, BTreeMap<String, f64>>>,
    pub highly_correlated: Option<Vec<CorrelatedPair>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataProfile {
    pub overview: Overview,
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnProfile>,
    #[serde(default)]
    pub correlation: Correlation,
}

impl DataProfile {
    /// Share of a column's rows that are missing, as a ratio.
    pub fn missing_ratio(&self, column: &str) -> Option<f64> {
        let profile = self.columns.get(column)?;
        if self.overview.rows == 0 {
            return None;
        }
        Some(profile.missing as f64 / self.overview.rows as f64)
    }

    pub fn highly_correlated(&self) -> &[CorrelatedPair] {
        self.correlation
            .highly_correlated
            .as_deref()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetUpload {
    pub columns: Vec<String>,
    #[serde(default)]
    pub sample_data: Vec<Value>,
    pub profile: DataProfile,
}

#[async_trait]
pub trait DatasetApi: Send + Sync {
    async fn upload_dataset(&self, path: &Path) -> Result<DatasetUpload>;
}
