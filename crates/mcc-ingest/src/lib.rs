//! Input loading for metadata completeness checks.
//!
//! # Features
//!
//! - **Dataset Loading**: CSV (configurable separator), XLS and XLSX into Polars DataFrames
//! - **Reference Dictionaries**: nested JSON, level lookup and alias extraction
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mcc_ingest::{DatasetOptions, dataset_headers, load_dataset, load_required_fields};
//!
//! let df = load_dataset(Path::new("metadata.csv"), DatasetOptions::default())?;
//! let headers = dataset_headers(&df);
//! let required = load_required_fields(Path::new("reference.json"), Some("Core Fields"))?;
//! ```

mod dataset;
mod error;
mod reference;

// === Error Types ===
pub use error::{IngestError, Result};

// === Datasets ===
pub use dataset::{DatasetFormat, DatasetOptions, dataset_headers, load_dataset};

// === Reference Dictionaries ===
pub use reference::{
    ALIASES_KEY, field_items, find_key_path, load_json, load_required_fields, select_level,
};
