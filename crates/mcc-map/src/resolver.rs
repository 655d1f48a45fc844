//! Operator-assisted resolution of fields the automatic strategies missed.
//!
//! Candidate computation is pure ([`rank_candidates`]). The decision for
//! each field comes from an [`OperatorResolver`] supplied by the host, so a
//! terminal prompt, a GUI or a scripted test can all drive the same loop.

use tracing::{debug, info};

use mcc_model::{FieldMapping, FieldMatch, MatchKind};

use crate::ranking::{RankedCandidate, RankingProvider};

/// Operator answer for one required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorDecision {
    /// Accept the candidate at this zero-based index.
    Select(usize),
    /// Leave the field unmapped.
    Skip,
    /// Leave this and every remaining field unmapped.
    Stop,
    /// Input that could not be interpreted; the field is skipped.
    Unrecognized(String),
}

/// Source of operator decisions.
pub trait OperatorResolver {
    fn decide(&mut self, field: &str, candidates: &[RankedCandidate]) -> OperatorDecision;

    /// Receives progress messages meant for the operator.
    fn notify(&mut self, _message: &str) {}
}

/// Ranked candidates for every field, in field order.
pub fn rank_candidates(
    provider: &dyn RankingProvider,
    headers: &[String],
    fields: &[String],
    limit: usize,
) -> Vec<(String, Vec<RankedCandidate>)> {
    fields
        .iter()
        .map(|field| (field.clone(), provider.rank(field, headers, limit)))
        .collect()
}

/// Parses typed operator input.
///
/// `x` stops, a number from 1 to `candidate_count` selects, any other number
/// (conventionally 0) skips, anything else is unrecognized.
pub fn parse_decision(input: &str, candidate_count: usize) -> OperatorDecision {
    let trimmed = input.trim().to_lowercase();
    if trimmed == "x" {
        return OperatorDecision::Stop;
    }
    if !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return match trimmed.parse::<usize>() {
            Ok(choice) if (1..=candidate_count).contains(&choice) => {
                OperatorDecision::Select(choice - 1)
            }
            _ => OperatorDecision::Skip,
        };
    }
    OperatorDecision::Unrecognized(input.trim().to_string())
}

/// Asks the operator to pick a header for each field.
///
/// Fields without any candidate are skipped without asking. A
/// [`OperatorDecision::Stop`] ends the loop and keeps what was accepted.
pub fn resolve_with_operator(
    provider: &dyn RankingProvider,
    headers: &[String],
    fields: &[String],
    limit: usize,
    resolver: &mut dyn OperatorResolver,
) -> FieldMapping {
    let mut mapping = FieldMapping::new();
    resolver.notify(&format!(
        "Using operator-assisted ranked matching ({}) for {} unmatched field(s).",
        provider.name(),
        fields.len()
    ));
    for (field, candidates) in rank_candidates(provider, headers, fields, limit) {
        if candidates.is_empty() {
            debug!(field = %field, "no candidate headers left");
            continue;
        }
        match resolver.decide(&field, &candidates) {
            OperatorDecision::Select(index) => match candidates.get(index) {
                Some(candidate) => {
                    resolver.notify(&format!("Chosen field: {}", candidate.header));
                    mapping.insert_if_absent(FieldMatch {
                        field: field.clone(),
                        header: candidate.header.clone(),
                        kind: MatchKind::Ranked,
                        score: Some(candidate.score),
                    });
                }
                None => resolver.notify(&format!("Skipping field: {field}")),
            },
            OperatorDecision::Skip => resolver.notify(&format!("Skipping field: {field}")),
            OperatorDecision::Unrecognized(input) => {
                debug!(field = %field, input = %input, "unrecognized operator input");
                resolver.notify(&format!("Input not recognized - skipping field: {field}"));
            }
            OperatorDecision::Stop => {
                info!(accepted = mapping.len(), "operator stopped interactive matching");
                resolver.notify("Stopping completeness check");
                break;
            }
        }
    }
    mapping
}
