//! Record-level completeness reporting.
//!
//! - **Record statistics**: per-column and per-record missing-value counts,
//!   over the raw dataset and over the canonical required-field working copy
//! - **Summaries**: plain-text record completeness summary
//! - **Charts**: stacked available/missing bar charts saved as PNG

mod chart;
mod error;
mod record;
mod summary;

pub use chart::{
    ChartRenderer, ChartStyle, Palette, RAW_CHART_TITLE, REQUIRED_CHART_TITLE, chart_file_name,
    chart_labels_svg, render_bar_chart, save_chart, write_completeness_charts,
};
pub use error::{ReportError, Result};
pub use record::{canonical_frame, record_level_completeness};
pub use summary::render_record_summary;
