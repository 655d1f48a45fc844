//! Match configuration for `mcc check`.
//!
//! Precedence, lowest first: built-in default, `--config` TOML file, flags.
//!
//! ```toml
//! level = "Core Fields"
//!
//! [[methods]]
//! method = "exact"
//!
//! [[methods]]
//! method = "alias_dictionary"
//!
//! [[methods]]
//! method = "fuzzy"
//! threshold = 85
//! enabled = false
//!
//! [interactive]
//! enabled = true
//! ranking = "embedding"
//! limit = 5
//! embedding_model = "models/glove.6B.50d.txt"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use mcc_map::{
    DEFAULT_FUZZY_THRESHOLD, InteractiveConfig, MatchMethod, MatchMethodConfig, MethodEntry,
    RankingMethod,
};

/// Contents of a `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckConfigFile {
    /// Reference dictionary level.
    pub level: Option<String>,
    /// Replaces the default strategy list.
    pub methods: Option<Vec<MethodEntry>>,
    pub interactive: Option<InteractiveFileSection>,
}

/// `[interactive]` table. Keys left out keep their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractiveFileSection {
    pub enabled: Option<bool>,
    #[serde(alias = "ranking_method")]
    pub ranking: Option<RankingMethod>,
    pub limit: Option<usize>,
    pub embedding_model: Option<PathBuf>,
}

impl InteractiveFileSection {
    fn apply(&self, config: &mut InteractiveConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(ranking) = self.ranking {
            config.ranking = ranking;
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
    }
}

/// Strategy names accepted by `--method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodName {
    Exact,
    Soft,
    Alias,
    Fuzzy,
}

/// Flag values that override the file and the defaults.
#[derive(Debug, Clone, Default)]
pub struct MatchOverrides {
    /// When non-empty, exactly these strategies run, in this order.
    pub methods: Vec<MethodName>,
    pub fuzzy_threshold: Option<f64>,
    pub interactive: bool,
    pub ranking: Option<RankingMethod>,
    pub limit: Option<usize>,
    pub embedding_model: Option<PathBuf>,
}

/// Fully resolved settings for one check.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatchConfig {
    pub methods: MatchMethodConfig,
    pub embedding_model: Option<PathBuf>,
}

/// Reads a `--config` file.
pub fn load_config_file(path: &Path) -> Result<CheckConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read config file {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parse config file {}", path.display()))
}

/// Applies the file and then the flags on top of the default configuration.
pub fn resolve_match_config(
    file: Option<&CheckConfigFile>,
    overrides: &MatchOverrides,
) -> ResolvedMatchConfig {
    let mut methods = MatchMethodConfig::default();
    let mut embedding_model = None;

    if let Some(file) = file {
        if let Some(entries) = &file.methods {
            methods.methods = entries.clone();
        }
        if let Some(section) = &file.interactive {
            section.apply(&mut methods.interactive);
            embedding_model = section.embedding_model.clone();
        }
    }

    if !overrides.methods.is_empty() {
        let threshold = configured_threshold(&methods);
        methods.methods = overrides
            .methods
            .iter()
            .map(|name| MethodEntry::enabled(method_for(*name, threshold)))
            .collect();
    }
    if let Some(threshold) = overrides.fuzzy_threshold {
        for entry in &mut methods.methods {
            if let MatchMethod::Fuzzy { threshold: slot } = &mut entry.method {
                *slot = threshold;
            }
        }
    }
    if overrides.interactive {
        methods.interactive.enabled = true;
    }
    if let Some(ranking) = overrides.ranking {
        methods.interactive.ranking = ranking;
    }
    if let Some(limit) = overrides.limit {
        methods.interactive.limit = limit;
    }
    if overrides.embedding_model.is_some() {
        embedding_model.clone_from(&overrides.embedding_model);
    }

    ResolvedMatchConfig {
        methods,
        embedding_model,
    }
}

fn configured_threshold(config: &MatchMethodConfig) -> f64 {
    config
        .methods
        .iter()
        .find_map(|entry| match entry.method {
            MatchMethod::Fuzzy { threshold } => Some(threshold),
            _ => None,
        })
        .unwrap_or(DEFAULT_FUZZY_THRESHOLD)
}

fn method_for(name: MethodName, threshold: f64) -> MatchMethod {
    match name {
        MethodName::Exact => MatchMethod::Exact,
        MethodName::Soft => MatchMethod::NormalizedSubstring,
        MethodName::Alias => MatchMethod::AliasDictionary { dictionary: None },
        MethodName::Fuzzy => MatchMethod::Fuzzy { threshold },
    }
}
