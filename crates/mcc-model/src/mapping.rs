//! Required-field to dataset-header mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which matching strategy produced a mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    NormalizedSubstring,
    AliasDictionary,
    Fuzzy,
    Ranked,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::NormalizedSubstring => "soft",
            Self::AliasDictionary => "alias",
            Self::Fuzzy => "fuzzy",
            Self::Ranked => "operator",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single accepted association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    /// Canonical required-field name.
    pub field: String,
    /// Dataset header, verbatim.
    pub header: String,
    /// Strategy that produced the association.
    pub kind: MatchKind,
    /// Similarity score (0-100) when the strategy produced one.
    pub score: Option<f64>,
}

/// Mapping from required field to dataset header.
///
/// Each field appears at most once. Entries keep the order in which they
/// were accepted. A header may be referenced by more than one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: Vec<FieldMatch>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the match unless the field already has one.
    ///
    /// Returns `true` when the entry was added.
    pub fn insert_if_absent(&mut self, entry: FieldMatch) -> bool {
        if self.contains_field(&entry.field) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Merges `other` into `self`, keeping existing entries on conflict.
    ///
    /// Returns the number of entries added.
    pub fn merge_first_wins(&mut self, other: FieldMapping) -> usize {
        let mut added = 0;
        for entry in other.entries {
            if self.insert_if_absent(entry) {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entry(field).map(|entry| entry.header.as_str())
    }

    pub fn entry(&self, field: &str) -> Option<&FieldMatch> {
        self.entries.iter().find(|entry| entry.field == field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.entries.iter().any(|entry| entry.field == field)
    }

    pub fn contains_header(&self, header: &str) -> bool {
        self.entries.iter().any(|entry| entry.header == header)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMatch> {
        self.entries.iter()
    }

    /// `(field, header)` pairs in acceptance order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.field.as_str(), entry.header.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required fields (in the given order) that have no entry.
    pub fn missing_fields(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|field| !self.contains_field(field))
            .cloned()
            .collect()
    }

    /// Dataset headers (in the given order) no entry points at.
    pub fn unused_headers(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .filter(|header| !self.contains_header(header))
            .cloned()
            .collect()
    }
}

impl<'a> IntoIterator for &'a FieldMapping {
    type Item = &'a FieldMatch;
    type IntoIter = std::slice::Iter<'a, FieldMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
