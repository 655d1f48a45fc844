use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A canonical field the dataset is expected to supply, with its known aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredField {
    name: String,
    #[serde(default)]
    aliases: Vec<String>,
}

impl RequiredField {
    pub fn new(name: impl Into<String>, aliases: Vec<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::BlankFieldName);
        }
        Ok(Self { name, aliases })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Alias list with the canonical name appended, as an owned copy.
    ///
    /// The stored alias list is never modified.
    pub fn match_candidates(&self) -> Vec<String> {
        let mut candidates = self.aliases.clone();
        if !candidates.iter().any(|alias| alias == &self.name) {
            candidates.push(self.name.clone());
        }
        candidates
    }
}

/// Names of the given fields, in order.
pub fn field_names(fields: &[RequiredField]) -> Vec<String> {
    fields.iter().map(|field| field.name.clone()).collect()
}
