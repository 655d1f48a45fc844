//! Completeness report types.
//!
//! Reports are derived data: they are rebuilt on every run from the
//! reference dictionary and the dataset and never persisted by the library.

use serde::{Deserialize, Serialize};

use crate::mapping::FieldMapping;

/// Result of the dataset-level (header) completeness check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Accepted required-field to header associations.
    #[serde(rename = "available_header_map")]
    pub mapping: FieldMapping,
    /// Required fields with no matching header, in required-field order.
    pub missing_headers: Vec<String>,
    /// Dataset headers not used by any mapping, in dataset order.
    pub unexpected_headers: Vec<String>,
    /// Fraction of required fields that were mapped, in `[0, 1]`.
    pub completeness_score: f64,
}

impl CompletenessReport {
    pub fn is_complete(&self) -> bool {
        self.missing_headers.is_empty() && !self.mapping.is_empty()
    }
}

/// Missing-value counts for a column that has at least one gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing_count: usize,
    /// Percentage of records missing, rounded to two decimals.
    pub missing_percentage: f64,
}

/// Availability of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCompleteness {
    pub column: String,
    pub missing_count: usize,
    pub available_percentage: f64,
    pub missing_percentage: f64,
    /// False for a required field that has no header mapping at all.
    pub header_present: bool,
}

/// Number of records that miss exactly `missing_values` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMissingBucket {
    pub missing_values: usize,
    pub records: usize,
}

/// Result of the record-level completeness check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordCompletenessReport {
    pub total_records: usize,
    /// Every raw dataset column, in dataset order.
    pub column_completeness: Vec<ColumnCompleteness>,
    /// Raw columns with gaps, most-missing first.
    pub missing_columns: Vec<ColumnMissing>,
    /// Required fields after canonicalization, most-available first.
    ///
    /// `None` when the header mapping was empty.
    pub required_column_completeness: Option<Vec<ColumnCompleteness>>,
    /// Records grouped by how many values they miss, ascending.
    pub row_missing_distribution: Vec<RowMissingBucket>,
    pub complete_records: usize,
    pub complete_records_percentage: f64,
}

impl RecordCompletenessReport {
    pub fn incomplete_records(&self) -> usize {
        self.total_records - self.complete_records
    }
}
