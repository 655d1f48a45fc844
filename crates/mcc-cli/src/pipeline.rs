//! Check pipeline: config, reference, dataset, matching, record audit and
//! exports.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::{info, info_span};

use mcc_ingest::{DatasetOptions, dataset_headers, load_dataset, load_required_fields};
use mcc_map::{AliasDictionary, CompletenessEngine, OperatorResolver};
use mcc_model::{CompletenessReport, RecordCompletenessReport, RequiredField, field_names};
use mcc_report::{record_level_completeness, write_completeness_charts};

use crate::config::{MatchOverrides, load_config_file, resolve_match_config};

/// Reference level used when neither flag nor config file names one.
pub const DEFAULT_LEVEL: &str = "Core Fields";

/// Inputs of one `mcc check` run.
#[derive(Debug, Clone)]
pub struct CheckRequest {
    pub data: PathBuf,
    pub reference: PathBuf,
    pub level: Option<String>,
    pub separator: char,
    pub config: Option<PathBuf>,
    pub overrides: MatchOverrides,
    pub plot: bool,
    pub output_dir: PathBuf,
    pub json: Option<PathBuf>,
}

impl CheckRequest {
    pub fn new(data: impl Into<PathBuf>, reference: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            reference: reference.into(),
            level: None,
            separator: ',',
            config: None,
            overrides: MatchOverrides::default(),
            plot: false,
            output_dir: PathBuf::from("output"),
            json: None,
        }
    }
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub dataset: String,
    pub level: String,
    pub report: CompletenessReport,
    pub records: RecordCompletenessReport,
    pub charts: Vec<PathBuf>,
    pub json: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    dataset: &'a str,
    level: &'a str,
    completeness: &'a CompletenessReport,
    records: &'a RecordCompletenessReport,
}

/// Runs a full check. `operator` is only consulted when interactive
/// matching is enabled.
pub fn run_check(
    request: &CheckRequest,
    operator: &mut dyn OperatorResolver,
) -> Result<CheckOutcome> {
    let dataset = display_name(&request.data);
    let span = info_span!("check", dataset = %dataset);
    let _guard = span.enter();

    let file = request
        .config
        .as_deref()
        .map(load_config_file)
        .transpose()?;
    let level = request
        .level
        .clone()
        .or_else(|| file.as_ref().and_then(|file| file.level.clone()))
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
    let resolved = resolve_match_config(file.as_ref(), &request.overrides);

    let fields = list_fields(&request.reference, Some(&level))?;
    let required = field_names(&fields);

    if !request.separator.is_ascii() {
        bail!(
            "separator must be a single ASCII character, got {:?}",
            request.separator
        );
    }
    let options = DatasetOptions {
        separator: u8::try_from(request.separator)?,
    };
    let df = load_dataset(&request.data, options)
        .with_context(|| format!("load dataset {}", request.data.display()))?;
    let headers = dataset_headers(&df);
    info!(
        headers = headers.len(),
        required = required.len(),
        level = %level,
        "assessing completeness"
    );

    let config = resolved
        .methods
        .with_alias_dictionary(&AliasDictionary::from_fields(&fields));
    let engine =
        CompletenessEngine::with_configured_ranking(config, resolved.embedding_model.as_deref());
    let report = engine.check_with_operator(&headers, &required, operator);

    let records = record_level_completeness(&df, &required, &report.mapping)
        .context("record-level completeness")?;

    let charts = if request.plot {
        write_completeness_charts(&records, &request.output_dir)
            .with_context(|| format!("write charts to {}", request.output_dir.display()))?
    } else {
        Vec::new()
    };

    if let Some(path) = &request.json {
        write_json(
            path,
            &JsonExport {
                dataset: &dataset,
                level: &level,
                completeness: &report,
                records: &records,
            },
        )?;
    }

    Ok(CheckOutcome {
        dataset,
        level,
        report,
        records,
        charts,
        json: request.json.clone(),
    })
}

/// Required fields of `level` (default [`DEFAULT_LEVEL`]).
pub fn list_fields(reference: &Path, level: Option<&str>) -> Result<Vec<RequiredField>> {
    let level = level.unwrap_or(DEFAULT_LEVEL);
    load_required_fields(reference, Some(level))
        .with_context(|| format!("load reference {}", reference.display()))
}

fn write_json(path: &Path, export: &JsonExport<'_>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), export)
        .with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "JSON report written");
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
