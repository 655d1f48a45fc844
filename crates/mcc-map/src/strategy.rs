//! Non-interactive header matching strategies.
//!
//! Every strategy takes the dataset headers and the required-field names and
//! returns a partial [`FieldMapping`]. Strategies are pure: the same inputs
//! always give the same mapping and inputs are never modified.

use std::collections::BTreeMap;

use rapidfuzz::fuzz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use mcc_model::{FieldMapping, FieldMatch, MatchKind, RequiredField};

use crate::utils::normalize;

/// Default acceptance threshold for fuzzy matching (0-100).
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 80.0;

/// Known alternate spellings per required field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasDictionary {
    aliases: BTreeMap<String, Vec<String>>,
}

impl AliasDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the dictionary from reference fields, one entry per field.
    pub fn from_fields(fields: &[RequiredField]) -> Self {
        let aliases = fields
            .iter()
            .map(|field| (field.name().to_string(), field.aliases().to_vec()))
            .collect();
        Self { aliases }
    }

    pub fn insert(&mut self, field: impl Into<String>, aliases: Vec<String>) {
        self.aliases.insert(field.into(), aliases);
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.aliases.get(field).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// A non-interactive matching strategy and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum MatchMethod {
    /// Field name appears verbatim among the headers.
    #[serde(alias = "strict")]
    Exact,
    /// Normalized field name is a substring of a normalized header.
    #[serde(alias = "soft")]
    NormalizedSubstring,
    /// Normalized header equals a normalized alias or the field name.
    #[serde(alias = "dictionary", alias = "alias")]
    AliasDictionary {
        #[serde(skip)]
        dictionary: Option<AliasDictionary>,
    },
    /// Best character-ratio similarity at or above `threshold`.
    Fuzzy {
        #[serde(default = "default_fuzzy_threshold", alias = "similarity_threshold")]
        threshold: f64,
    },
}

fn default_fuzzy_threshold() -> f64 {
    DEFAULT_FUZZY_THRESHOLD
}

impl MatchMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::NormalizedSubstring => "soft",
            Self::AliasDictionary { .. } => "alias",
            Self::Fuzzy { .. } => "fuzzy",
        }
    }

    /// Runs the strategy over all headers and fields.
    pub fn run(&self, headers: &[String], fields: &[String]) -> FieldMapping {
        match self {
            Self::Exact => exact_match(headers, fields),
            Self::NormalizedSubstring => substring_match(headers, fields),
            Self::AliasDictionary { dictionary } => match dictionary {
                Some(dictionary) => alias_match(headers, fields, dictionary),
                None => {
                    warn!("no alias dictionary provided, falling back to exact matching");
                    exact_match(headers, fields)
                }
            },
            Self::Fuzzy { threshold } => fuzzy_match(headers, fields, *threshold),
        }
    }
}

/// Maps each field that appears verbatim among the headers to itself.
pub fn exact_match(headers: &[String], fields: &[String]) -> FieldMapping {
    let mut mapping = FieldMapping::new();
    for field in fields {
        if headers.iter().any(|header| header == field) {
            mapping.insert_if_absent(FieldMatch {
                field: field.clone(),
                header: field.clone(),
                kind: MatchKind::Exact,
                score: None,
            });
        }
    }
    mapping
}

/// Maps a field to the first header whose normalized form contains the
/// normalized field name.
///
/// Fields that normalize to blank text are skipped, since an empty key is a
/// substring of every header.
pub fn substring_match(headers: &[String], fields: &[String]) -> FieldMapping {
    let normalized_headers: Vec<(String, &String)> = headers
        .iter()
        .map(|header| (normalize(header), header))
        .collect();
    let mut mapping = FieldMapping::new();
    for field in fields {
        let key = normalize(field);
        if key.trim().is_empty() {
            continue;
        }
        if let Some((_, header)) = normalized_headers
            .iter()
            .find(|(normalized, _)| normalized.contains(&key))
        {
            mapping.insert_if_absent(FieldMatch {
                field: field.clone(),
                header: (*header).clone(),
                kind: MatchKind::NormalizedSubstring,
                score: None,
            });
        }
    }
    mapping
}

/// Maps a field to the first header whose normalized form equals one of the
/// field's normalized aliases or its normalized name.
///
/// Fields without a dictionary entry produce no mapping.
pub fn alias_match(
    headers: &[String],
    fields: &[String],
    dictionary: &AliasDictionary,
) -> FieldMapping {
    let normalized_headers: Vec<(String, &String)> = headers
        .iter()
        .map(|header| (normalize(header), header))
        .collect();
    let mut mapping = FieldMapping::new();
    for field in fields {
        let Some(aliases) = dictionary.get(field) else {
            continue;
        };
        let mut candidates: Vec<String> = aliases.iter().map(|alias| normalize(alias)).collect();
        candidates.push(normalize(field));
        if let Some((_, header)) = normalized_headers
            .iter()
            .find(|(normalized, _)| candidates.contains(normalized))
        {
            mapping.insert_if_absent(FieldMatch {
                field: field.clone(),
                header: (*header).clone(),
                kind: MatchKind::AliasDictionary,
                score: None,
            });
        }
    }
    mapping
}

/// Maps each field to its most similar header when the similarity reaches
/// `threshold`.
///
/// Ties keep the earliest header.
pub fn fuzzy_match(headers: &[String], fields: &[String], threshold: f64) -> FieldMapping {
    let mut mapping = FieldMapping::new();
    for field in fields {
        let mut best: Option<(&String, f64)> = None;
        for header in headers {
            let score = similarity(field, header);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((header, score));
            }
        }
        if let Some((header, score)) = best
            && score >= threshold
        {
            mapping.insert_if_absent(FieldMatch {
                field: field.clone(),
                header: header.clone(),
                kind: MatchKind::Fuzzy,
                score: Some(score),
            });
        }
    }
    mapping
}

/// Symmetric character-ratio similarity on a 0-100 scale.
pub fn similarity(left: &str, right: &str) -> f64 {
    let ratio = fuzz::ratio(left.chars(), right.chars()) * 100.0;
    (ratio * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn exact_requires_verbatim_header() {
        let headers = strings(&["PatientID", "modality"]);
        let fields = strings(&["PatientID", "Modality"]);
        let mapping = exact_match(&headers, &fields);
        assert_eq!(mapping.pairs(), vec![("PatientID", "PatientID")]);
    }

    #[test]
    fn substring_ignores_case_and_punctuation() {
        let headers = strings(&["Study Date", "patient-id (hashed)"]);
        let fields = strings(&["Patient ID"]);
        let mapping = substring_match(&headers, &fields);
        assert_eq!(mapping.get("Patient ID"), Some("patient-id (hashed)"));
    }

    #[test]
    fn substring_picks_first_qualifying_header() {
        let headers = strings(&["age_years", "age_months"]);
        let fields = strings(&["Age"]);
        let mapping = substring_match(&headers, &fields);
        assert_eq!(mapping.get("Age"), Some("age_years"));
    }

    #[test]
    fn substring_skips_blank_keys() {
        let headers = strings(&["anything"]);
        let fields = strings(&["__"]);
        assert!(substring_match(&headers, &fields).is_empty());
    }

    #[test]
    fn alias_matches_field_name_and_aliases() {
        let mut dictionary = AliasDictionary::new();
        dictionary.insert("PatientID", strings(&["patient_id", "pid"]));
        dictionary.insert("Modality", strings(&[]));
        let headers = strings(&["PID", "MODALITY"]);
        let fields = strings(&["PatientID", "Modality", "Sex"]);

        let mapping = alias_match(&headers, &fields, &dictionary);

        assert_eq!(mapping.get("PatientID"), Some("PID"));
        assert_eq!(mapping.get("Modality"), Some("MODALITY"));
        assert!(!mapping.contains_field("Sex"));
    }

    #[test]
    fn alias_uses_first_header_in_header_order() {
        let mut dictionary = AliasDictionary::new();
        dictionary.insert("Sex", strings(&["gender", "sex"]));
        let headers = strings(&["SEX", "Gender"]);
        let mapping = alias_match(&headers, &strings(&["Sex"]), &dictionary);
        assert_eq!(mapping.get("Sex"), Some("SEX"));
    }

    #[test]
    fn missing_dictionary_degrades_to_exact() {
        let method = MatchMethod::AliasDictionary { dictionary: None };
        let headers = strings(&["Sex", "patient_id"]);
        let fields = strings(&["Sex", "PatientID"]);
        let mapping = method.run(&headers, &fields);
        assert_eq!(mapping.pairs(), vec![("Sex", "Sex")]);
        assert_eq!(mapping.entry("Sex").map(|entry| entry.kind), Some(MatchKind::Exact));
    }

    #[test]
    fn fuzzy_threshold_is_inclusive() {
        // Indel ratio of "abcd" vs "abce" is exactly 75.
        let headers = strings(&["abce"]);
        let fields = strings(&["abcd"]);
        assert_eq!(similarity("abcd", "abce"), 75.0);
        assert_eq!(fuzzy_match(&headers, &fields, 75.0).get("abcd"), Some("abce"));
        assert!(fuzzy_match(&headers, &fields, 76.0).is_empty());
    }

    #[test]
    fn fuzzy_prefers_best_then_earliest() {
        let headers = strings(&["Modalty", "Modality", "Modality"]);
        let mapping = fuzzy_match(&headers, &strings(&["Modality"]), 80.0);
        let entry = mapping.entry("Modality").unwrap();
        assert_eq!(entry.header, "Modality");
        assert_eq!(entry.score, Some(100.0));
    }

    #[test]
    fn fuzzy_with_no_headers_maps_nothing() {
        assert!(fuzzy_match(&[], &strings(&["Age"]), 0.0).is_empty());
    }

    #[test]
    fn method_deserializes_legacy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            methods: Vec<MatchMethod>,
        }
        let parsed: Wrapper = serde_json::from_str(
            r#"{"methods":[{"method":"strict"},{"method":"dictionary"},{"method":"fuzzy"}]}"#,
        )
        .unwrap();
        assert_eq!(
            parsed.methods,
            vec![
                MatchMethod::Exact,
                MatchMethod::AliasDictionary { dictionary: None },
                MatchMethod::Fuzzy {
                    threshold: DEFAULT_FUZZY_THRESHOLD
                },
            ]
        );
    }
}
