use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write chart {path}: {source}")]
    ChartWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to lay out chart labels: {message}")]
    ChartLabels { message: String },
}

impl From<polars::prelude::PolarsError> for ReportError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
