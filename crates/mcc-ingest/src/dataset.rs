//! Tabular dataset loading (CSV, XLS, XLSX).

use std::collections::HashMap;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// On-disk layout of a dataset, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Spreadsheet,
}

impl DatasetFormat {
    /// Detects the format from the (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xls" | "xlsx" => Ok(Self::Spreadsheet),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Cell values read as missing, in addition to empty cells.
pub const MISSING_VALUE_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Options for [`load_dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetOptions {
    /// CSV field separator. Ignored for spreadsheets.
    pub separator: u8,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self { separator: b',' }
    }
}

/// Loads a dataset into a DataFrame.
///
/// CSV files go through the Polars reader with full-file schema inference.
/// For spreadsheets the first worksheet is read, its first row becomes the
/// header and every cell is kept as text.
///
/// In both formats empty cells and [`MISSING_VALUE_TOKENS`] become nulls,
/// blank headers become `Unnamed: <i>` and repeated headers are suffixed
/// `.1`, `.2`, ...
pub fn load_dataset(path: &Path, options: DatasetOptions) -> Result<DataFrame> {
    std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let format = DatasetFormat::from_path(path)?;
    let mut df = match format {
        DatasetFormat::Csv => read_csv(path, options.separator)?,
        DatasetFormat::Spreadsheet => read_spreadsheet(path)?,
    };
    strip_bom(&mut df)?;

    info!(
        path = %path.display(),
        format = ?format,
        rows = df.height(),
        columns = df.width(),
        "dataset loaded"
    );
    Ok(df)
}

/// Column names of `df` in order.
pub fn dataset_headers(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

fn read_csv(path: &Path, separator: u8) -> Result<DataFrame> {
    let parse_error = |e: PolarsError| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    // Header row on its own, as text, so duplicate names survive
    let header = CsvReadOptions::default()
        .with_has_header(false)
        .with_n_rows(Some(1))
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;
    let mut names = Vec::with_capacity(header.width());
    for column in header.get_columns() {
        let text = column.str().map_err(parse_error)?.get(0).map(str::to_string);
        names.push(text.filter(|name| !name.trim().is_empty()));
    }
    let headers = unique_headers(names);

    let null_values = MISSING_VALUE_TOKENS
        .iter()
        .map(|&token| PlSmallStr::from(token))
        .collect();
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .with_skip_rows(1)
        .with_raise_if_empty(false)
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_null_values(Some(NullValues::AllColumns(null_values))),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(parse_error)?
        .finish()
        .map_err(parse_error)?;

    if df.width() == 0 {
        let columns = headers
            .into_iter()
            .map(|name| Column::new_empty(name.into(), &DataType::String))
            .collect();
        return Ok(DataFrame::new(columns)?);
    }
    if df.width() != headers.len() {
        return Err(IngestError::CsvParse {
            path: path.to_path_buf(),
            message: format!(
                "header has {} fields but records have {}",
                headers.len(),
                df.width()
            ),
        });
    }
    let columns = df
        .take_columns()
        .into_iter()
        .zip(headers)
        .map(|(column, name)| column.with_name(name.into()))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn read_spreadsheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(|e| IngestError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let rows: Vec<&[Data]> = range.rows().collect();
    if rows.is_empty() {
        return Err(IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        });
    }
    debug!(path = %path.display(), rows = rows.len(), "worksheet read");
    frame_from_rows(&rows)
}

/// Builds a text DataFrame from worksheet rows; the first row is the header.
pub(crate) fn frame_from_rows(rows: &[&[Data]]) -> Result<DataFrame> {
    let Some((header_row, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };
    let headers = unique_headers(header_row.iter().map(cell_text));
    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let values: Vec<Option<String>> = body
                .iter()
                .map(|row| row.get(idx).and_then(cell_value))
                .collect();
            Column::new(name.into(), values)
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) if text.trim().is_empty() => None,
        Data::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn cell_value(cell: &Data) -> Option<String> {
    cell_text(cell).filter(|text| !is_missing_token(text))
}

pub(crate) fn is_missing_token(text: &str) -> bool {
    MISSING_VALUE_TOKENS.contains(&text)
}

/// Header names with blanks replaced and duplicates suffixed (`Age`, `Age.1`).
fn unique_headers(names: impl IntoIterator<Item = Option<String>>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let base = name.unwrap_or_else(|| format!("Unnamed: {idx}"));
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

fn strip_bom(df: &mut DataFrame) -> Result<()> {
    let Some(first) = df.get_column_names().first().map(ToString::to_string) else {
        return Ok(());
    };
    if let Some(stripped) = first.strip_prefix('\u{feff}') {
        df.rename(&first, stripped.into())?;
    }
    Ok(())
}
