//! Dataset-level completeness check.

use std::path::Path;

use tracing::{debug, info};

use mcc_model::{CompletenessReport, FieldMapping};

use crate::config::MatchMethodConfig;
use crate::ranking::{RankingProvider, SimilarityRanker, build_ranking_provider};
use crate::resolver::{OperatorResolver, resolve_with_operator};
use crate::score::compute_completeness_score;

/// Engine that reconciles dataset headers with required fields.
///
/// Strategies run in configured order and the first strategy to map a field
/// wins; later strategies never override it. When interactive resolution is
/// enabled and an [`OperatorResolver`] is supplied, the fields still missing
/// afterwards are offered to the operator against the headers no strategy
/// used.
///
/// # Example
///
/// ```ignore
/// use mcc_map::{CompletenessEngine, MatchMethodConfig};
///
/// let engine = CompletenessEngine::new(MatchMethodConfig::default());
/// let report = engine.check(&headers, &required);
/// println!("score: {:.2}", report.completeness_score);
/// ```
pub struct CompletenessEngine {
    config: MatchMethodConfig,
    ranking: Box<dyn RankingProvider>,
}

impl CompletenessEngine {
    /// Creates an engine that ranks interactive candidates by similarity.
    pub fn new(config: MatchMethodConfig) -> Self {
        Self {
            config,
            ranking: Box::new(SimilarityRanker),
        }
    }

    /// Creates an engine whose ranking provider follows
    /// `config.interactive.ranking`, loading the embedding model from
    /// `model_path` when that is requested.
    pub fn with_configured_ranking(config: MatchMethodConfig, model_path: Option<&Path>) -> Self {
        let ranking = build_ranking_provider(config.interactive.ranking, model_path);
        Self { config, ranking }
    }

    #[must_use]
    pub fn with_ranking_provider(mut self, ranking: Box<dyn RankingProvider>) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn config(&self) -> &MatchMethodConfig {
        &self.config
    }

    pub fn ranking_provider(&self) -> &dyn RankingProvider {
        self.ranking.as_ref()
    }

    /// Runs the automatic strategies only.
    pub fn check(&self, headers: &[String], required: &[String]) -> CompletenessReport {
        let mapping = self.automatic_mapping(headers, required);
        build_report(mapping, headers, required)
    }

    /// Runs the automatic strategies, then asks `resolver` about the fields
    /// that are still missing when interactive resolution is enabled.
    pub fn check_with_operator(
        &self,
        headers: &[String],
        required: &[String],
        resolver: &mut dyn OperatorResolver,
    ) -> CompletenessReport {
        let mut mapping = self.automatic_mapping(headers, required);
        let missing = mapping.missing_fields(required);
        if self.config.interactive.enabled && !missing.is_empty() {
            let unmatched = mapping.unused_headers(headers);
            let resolved = resolve_with_operator(
                self.ranking.as_ref(),
                &unmatched,
                &missing,
                self.config.interactive.limit,
                resolver,
            );
            let added = mapping.merge_first_wins(resolved);
            info!(
                added,
                ranking = self.ranking.name(),
                "interactive matching complete"
            );
        }
        build_report(mapping, headers, required)
    }

    fn automatic_mapping(&self, headers: &[String], required: &[String]) -> FieldMapping {
        let mut mapping = FieldMapping::new();
        for method in self.config.enabled_methods() {
            let found = method.run(headers, required);
            let matched = found.len();
            let added = mapping.merge_first_wins(found);
            debug!(method = method.name(), matched, added, "strategy applied");
        }
        mapping
    }
}

fn build_report(
    mapping: FieldMapping,
    headers: &[String],
    required: &[String],
) -> CompletenessReport {
    let missing_headers = mapping.missing_fields(required);
    let unexpected_headers = mapping.unused_headers(headers);
    let completeness_score = compute_completeness_score(missing_headers.len(), required.len());
    info!(
        required = required.len(),
        mapped = mapping.len(),
        missing = missing_headers.len(),
        unexpected = unexpected_headers.len(),
        score = completeness_score,
        "dataset-level completeness check complete"
    );
    CompletenessReport {
        mapping,
        missing_headers,
        unexpected_headers,
        completeness_score,
    }
}
