//! Reference dictionary loading.
//!
//! A reference dictionary is a nested JSON document. One object somewhere in
//! it (the *level*, e.g. `"Core Fields"`) lists the required fields, each an
//! object carrying an `aliases` array:
//!
//! ```json
//! { "Imaging": { "Core Fields": {
//!     "PatientID": { "aliases": ["patient_id", "pid"] },
//!     "Modality":  { "aliases": ["modality"] }
//! } } }
//! ```

use std::path::Path;

use mcc_model::RequiredField;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};

/// Item key holding the alias list of each field.
pub const ALIASES_KEY: &str = "aliases";

/// Reads and parses a JSON file, keeping object key order.
pub fn load_json(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
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
    serde_json::from_str(&contents).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Path of object keys leading to the first occurrence of `key`.
///
/// Objects are searched depth-first in key order. Arrays are not descended
/// into.
pub fn find_key_path(value: &Value, key: &str) -> Option<Vec<String>> {
    let Value::Object(map) = value else {
        return None;
    };
    for (name, child) in map {
        if name == key {
            return Some(vec![name.clone()]);
        }
        if let Some(mut rest) = find_key_path(child, key) {
            rest.insert(0, name.clone());
            return Some(rest);
        }
    }
    None
}

/// The sub-document at `level`, or the whole document when `level` is
/// absent or not found.
pub fn select_level<'a>(value: &'a Value, level: Option<&str>) -> &'a Value {
    let Some(level) = level else {
        info!("no reference level specified, using the full dictionary");
        return value;
    };
    let Some(path) = find_key_path(value, level) else {
        warn!(level, "reference level not found, using the full dictionary");
        return value;
    };
    debug!(level, path = ?path, "reference level found");
    path.iter().fold(value, |node, key| node.get(key).unwrap_or(node))
}

/// Required fields listed in `level`, in document order.
///
/// Entries that are not objects, or whose names are blank, are skipped with
/// a warning. An entry without an `item_key` array gets an empty alias list.
pub fn field_items(level: &Value, item_key: &str) -> Result<Vec<RequiredField>> {
    let Value::Object(entries) = level else {
        return Err(IngestError::LevelNotObject {
            found: json_kind(level),
        });
    };

    let mut fields = Vec::with_capacity(entries.len());
    for (name, entry) in entries {
        let Value::Object(item) = entry else {
            warn!(field = %name, found = json_kind(entry), "reference entry is not an object, skipping");
            continue;
        };
        let aliases = match item.get(item_key) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|alias| match alias {
                    Value::String(text) => Some(text.clone()),
                    other => {
                        debug!(field = %name, alias = %other, "ignoring non-string alias");
                        None
                    }
                })
                .collect(),
            _ => {
                warn!(field = %name, item = item_key, "reference entry has no item list, using none");
                Vec::new()
            }
        };
        match RequiredField::new(name.clone(), aliases) {
            Ok(field) => fields.push(field),
            Err(error) => warn!(%error, "skipping reference entry"),
        }
    }
    Ok(fields)
}

/// Loads the required fields of `level` from the reference file at `path`.
pub fn load_required_fields(path: &Path, level: Option<&str>) -> Result<Vec<RequiredField>> {
    let document = load_json(path)?;
    let fields = field_items(select_level(&document, level), ALIASES_KEY)?;
    info!(
        path = %path.display(),
        level = level.unwrap_or("<root>"),
        fields = fields.len(),
        "reference dictionary loaded"
    );
    Ok(fields)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
