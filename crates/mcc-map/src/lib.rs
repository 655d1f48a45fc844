//! Header reconciliation engine.
//!
//! Maps the column headers of a dataset onto a list of required fields
//! using an ordered set of strategies (exact, normalized substring, alias
//! dictionary, fuzzy similarity) with an optional operator-assisted pass,
//! and scores how complete the result is.

pub mod config;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod resolver;
pub mod score;
pub mod strategy;
pub mod utils;

pub use config::{DEFAULT_CANDIDATE_LIMIT, InteractiveConfig, MatchMethodConfig, MethodEntry};
pub use engine::CompletenessEngine;
pub use error::MapError;
pub use ranking::{
    EmbeddingRanker, RankedCandidate, RankingMethod, RankingProvider, SimilarityRanker,
    build_ranking_provider,
};
pub use resolver::{
    OperatorDecision, OperatorResolver, parse_decision, rank_candidates, resolve_with_operator,
};
pub use score::compute_completeness_score;
pub use strategy::{
    AliasDictionary, DEFAULT_FUZZY_THRESHOLD, MatchMethod, alias_match, exact_match, fuzzy_match,
    similarity, substring_match,
};
pub use utils::normalize;
