//! CLI library components for the metadata completeness checker.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod prompt;
