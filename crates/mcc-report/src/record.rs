//! Record-level completeness.
//!
//! Counts missing values per column and per record. A value is missing when
//! it is null, or NaN in a floating-point column.

use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use tracing::info;

use mcc_model::{
    ColumnCompleteness, ColumnMissing, FieldMapping, RecordCompletenessReport, RowMissingBucket,
};

use crate::error::Result;

/// Builds the canonical working copy of `df`.
///
/// The result has one column per required field, in required-field order:
/// the mapped dataset column renamed to the field, or an all-null column for
/// a field without a header. Repeated field names are kept once. `df` is not
/// modified.
pub fn canonical_frame(
    df: &DataFrame,
    required: &[String],
    mapping: &FieldMapping,
) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(required.len());
    for field in required {
        if !seen.insert(field.as_str()) {
            continue;
        }
        let column = match mapping.get(field) {
            Some(header) => df.column(header)?.clone().with_name(field.as_str().into()),
            None => Column::full_null(field.as_str().into(), df.height(), &DataType::String),
        };
        columns.push(column);
    }
    Ok(DataFrame::new(columns)?)
}

/// Computes record-level completeness of `df`.
///
/// Raw column statistics always cover every dataset column. When `mapping`
/// is non-empty, required-field statistics and per-record counts use the
/// [`canonical_frame`]; otherwise per-record counts use the raw dataset.
pub fn record_level_completeness(
    df: &DataFrame,
    required: &[String],
    mapping: &FieldMapping,
) -> Result<RecordCompletenessReport> {
    let total_records = df.height();

    let raw = frame_missing_flags(df)?;
    let column_completeness: Vec<ColumnCompleteness> = raw
        .iter()
        .map(|(name, flags)| column_stats(name, flags, total_records, true))
        .collect();

    let mut missing_columns: Vec<ColumnMissing> = column_completeness
        .iter()
        .filter(|column| column.missing_count > 0)
        .map(|column| ColumnMissing {
            column: column.column.clone(),
            missing_count: column.missing_count,
            missing_percentage: round2(column.missing_percentage),
        })
        .collect();
    missing_columns.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));

    let (required_column_completeness, row_counts) = if mapping.is_empty() {
        (None, missing_per_row(&raw, total_records))
    } else {
        let working = frame_missing_flags(&canonical_frame(df, required, mapping)?)?;
        let mut stats: Vec<ColumnCompleteness> = working
            .iter()
            .map(|(name, flags)| {
                column_stats(name, flags, total_records, mapping.contains_field(name))
            })
            .collect();
        stats.sort_by(|a, b| b.available_percentage.total_cmp(&a.available_percentage));
        (Some(stats), missing_per_row(&working, total_records))
    };

    let mut distribution: BTreeMap<usize, usize> = BTreeMap::new();
    for count in &row_counts {
        *distribution.entry(*count).or_default() += 1;
    }
    let row_missing_distribution = distribution
        .into_iter()
        .map(|(missing_values, records)| RowMissingBucket {
            missing_values,
            records,
        })
        .collect();

    let complete_records = row_counts.iter().filter(|count| **count == 0).count();
    let complete_records_percentage = percentage(complete_records, total_records);

    info!(
        records = total_records,
        complete = complete_records,
        columns_with_gaps = missing_columns.len(),
        canonical = required_column_completeness.is_some(),
        "record-level completeness check complete"
    );

    Ok(RecordCompletenessReport {
        total_records,
        column_completeness,
        missing_columns,
        required_column_completeness,
        row_missing_distribution,
        complete_records,
        complete_records_percentage,
    })
}

fn frame_missing_flags(df: &DataFrame) -> Result<Vec<(String, Vec<bool>)>> {
    df.get_columns()
        .iter()
        .map(|column| {
            let flags = missing_flags(column.as_materialized_series())?;
            Ok((column.name().to_string(), flags))
        })
        .collect()
}

fn missing_flags(series: &Series) -> Result<Vec<bool>> {
    let nulls = series.is_null();
    let mut flags: Vec<bool> = (&nulls)
        .into_iter()
        .map(|value| value.unwrap_or(false))
        .collect();
    if series.dtype().is_float() {
        let nans = series.is_nan()?;
        for (flag, nan) in flags.iter_mut().zip(&nans) {
            if nan == Some(true) {
                *flag = true;
            }
        }
    }
    Ok(flags)
}

fn missing_per_row(columns: &[(String, Vec<bool>)], rows: usize) -> Vec<usize> {
    let mut counts = vec![0usize; rows];
    for (_, flags) in columns {
        for (count, missing) in counts.iter_mut().zip(flags) {
            if *missing {
                *count += 1;
            }
        }
    }
    counts
}

fn column_stats(name: &str, flags: &[bool], total: usize, header_present: bool) -> ColumnCompleteness {
    let missing_count = flags.iter().filter(|missing| **missing).count();
    let missing_percentage = percentage(missing_count, total);
    let available_percentage = if total == 0 {
        0.0
    } else {
        100.0 - missing_percentage
    };
    ColumnCompleteness {
        column: name.to_string(),
        missing_count,
        available_percentage,
        missing_percentage,
        header_present,
    }
}

/// `100 * part / total`, 0.0 when `total` is zero.
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * part as f64 / total as f64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
