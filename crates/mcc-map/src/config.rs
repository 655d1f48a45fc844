//! Match method configuration.

use serde::{Deserialize, Serialize};

use crate::ranking::RankingMethod;
use crate::strategy::{AliasDictionary, MatchMethod};

/// Default number of ranked candidates shown to the operator.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 4;

/// One configured strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodEntry {
    #[serde(flatten)]
    pub method: MatchMethod,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl MethodEntry {
    pub fn enabled(method: MatchMethod) -> Self {
        Self {
            method,
            enabled: true,
        }
    }

    pub fn disabled(method: MatchMethod) -> Self {
        Self {
            method,
            enabled: false,
        }
    }
}

/// Settings for operator-assisted resolution of leftover fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractiveConfig {
    pub enabled: bool,
    #[serde(alias = "ranking_method")]
    pub ranking: RankingMethod,
    pub limit: usize,
}

impl Default for InteractiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ranking: RankingMethod::Fuzzy,
            limit: DEFAULT_CANDIDATE_LIMIT,
        }
    }
}

/// Ordered strategy configuration.
///
/// Entries run in declaration order and the first entry to map a field
/// wins. Interactive resolution always runs last, over whatever is left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMethodConfig {
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
    #[serde(default)]
    pub interactive: InteractiveConfig,
}

impl Default for MatchMethodConfig {
    /// Exact, alias, soft and fuzzy in that order, with only the alias
    /// dictionary enabled.
    fn default() -> Self {
        Self {
            methods: vec![
                MethodEntry::disabled(MatchMethod::Exact),
                MethodEntry::enabled(MatchMethod::AliasDictionary { dictionary: None }),
                MethodEntry::disabled(MatchMethod::NormalizedSubstring),
                MethodEntry::disabled(MatchMethod::Fuzzy {
                    threshold: crate::strategy::DEFAULT_FUZZY_THRESHOLD,
                }),
            ],
            interactive: InteractiveConfig::default(),
        }
    }
}

impl MatchMethodConfig {
    /// Configuration with exactly the given strategies enabled, in order.
    pub fn from_methods(methods: impl IntoIterator<Item = MatchMethod>) -> Self {
        Self {
            methods: methods.into_iter().map(MethodEntry::enabled).collect(),
            interactive: InteractiveConfig::default(),
        }
    }

    #[must_use]
    pub fn with_interactive(mut self, interactive: InteractiveConfig) -> Self {
        self.interactive = interactive;
        self
    }

    /// Attaches `dictionary` to every alias entry that has none.
    #[must_use]
    pub fn with_alias_dictionary(mut self, dictionary: &AliasDictionary) -> Self {
        for entry in &mut self.methods {
            if let MatchMethod::AliasDictionary { dictionary: slot } = &mut entry.method
                && slot.is_none()
            {
                *slot = Some(dictionary.clone());
            }
        }
        self
    }

    /// Enabled strategies in priority order.
    pub fn enabled_methods(&self) -> impl Iterator<Item = &MatchMethod> {
        self.methods
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| &entry.method)
    }
}
