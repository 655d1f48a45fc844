//! Candidate ranking for operator-assisted matching.
//!
//! A [`RankingProvider`] orders dataset headers by how likely they are to
//! hold a given required field. Two providers exist:
//!
//! - [`SimilarityRanker`]: character-ratio similarity, always available.
//! - [`EmbeddingRanker`]: cosine similarity of averaged word vectors loaded
//!   from a text vector file (`token v1 v2 ...` per line, the GloVe and
//!   fastText `.vec` layout).
//!
//! The embedding provider can fail to load. [`build_ranking_provider`]
//! decides the fallback once, at configuration time.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::MapError;
use crate::strategy::similarity;
use crate::utils::normalize;

/// Ranking function selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMethod {
    #[default]
    Fuzzy,
    #[serde(alias = "LM", alias = "lm")]
    Embedding,
}

/// A header proposed for a required field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub header: String,
    /// Confidence on a 0-100 scale.
    pub score: f64,
}

/// Orders dataset headers by likelihood of matching a required field.
pub trait RankingProvider {
    /// Short name used in logs and prompts.
    fn name(&self) -> &'static str;

    /// Returns at most `limit` headers, best first.
    ///
    /// Equal scores keep header order.
    fn rank(&self, field: &str, headers: &[String], limit: usize) -> Vec<RankedCandidate>;
}

/// Ranking by character-ratio similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker;

impl RankingProvider for SimilarityRanker {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn rank(&self, field: &str, headers: &[String], limit: usize) -> Vec<RankedCandidate> {
        let scored = headers
            .iter()
            .map(|header| RankedCandidate {
                header: header.clone(),
                score: similarity(field, header),
            })
            .collect();
        top_candidates(scored, limit)
    }
}

/// Ranking by cosine similarity of averaged word vectors.
#[derive(Debug, Clone)]
pub struct EmbeddingRanker {
    path: PathBuf,
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingRanker {
    /// Loads a text word-vector file.
    ///
    /// A leading `<count> <dimension>` line is skipped. Every other
    /// non-empty line must hold a token followed by exactly `dimension`
    /// floats, where `dimension` is fixed by the first vector line.
    pub fn load(path: &Path) -> Result<Self, MapError> {
        let contents = fs::read_to_string(path).map_err(|source| MapError::EmbeddingRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut vectors = HashMap::new();
        let mut dimension = 0usize;
        for (idx, line) in contents.lines().enumerate() {
            let mut parts = line.split_whitespace();
            let Some(token) = parts.next() else {
                continue;
            };
            let values: Vec<&str> = parts.collect();
            if idx == 0 && values.len() == 1 && token.parse::<usize>().is_ok() {
                continue;
            }
            let vector = values
                .iter()
                .map(|value| value.parse::<f32>())
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|err| MapError::EmbeddingFormat {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    message: err.to_string(),
                })?;
            if vector.is_empty() {
                return Err(MapError::EmbeddingFormat {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    message: format!("token '{token}' has no vector"),
                });
            }
            if dimension == 0 {
                dimension = vector.len();
            } else if vector.len() != dimension {
                return Err(MapError::EmbeddingFormat {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    message: format!("expected {dimension} values, found {}", vector.len()),
                });
            }
            vectors.insert(token.to_lowercase(), vector);
        }
        if vectors.is_empty() {
            return Err(MapError::EmptyEmbedding {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            dimension,
            vectors,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectors.len()
    }

    /// Mean vector of the label's known tokens, `None` if no token is known.
    fn embed(&self, label: &str) -> Option<Vec<f32>> {
        let mut sum = vec![0.0f32; self.dimension];
        let mut known = 0usize;
        for token in label_tokens(label) {
            if let Some(vector) = self.vectors.get(&token) {
                for (acc, value) in sum.iter_mut().zip(vector) {
                    *acc += value;
                }
                known += 1;
            }
        }
        if known == 0 {
            return None;
        }
        let scale = 1.0 / known as f32;
        sum.iter_mut().for_each(|value| *value *= scale);
        Some(sum)
    }
}

impl RankingProvider for EmbeddingRanker {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn rank(&self, field: &str, headers: &[String], limit: usize) -> Vec<RankedCandidate> {
        let target = self.embed(field);
        let scored = headers
            .iter()
            .map(|header| {
                let score = match (&target, self.embed(header)) {
                    (Some(target), Some(vector)) => f64::from(cosine_similarity(target, &vector)),
                    _ => 0.0,
                };
                RankedCandidate {
                    header: header.clone(),
                    score: 100.0 * score,
                }
            })
            .collect();
        top_candidates(scored, limit)
    }
}

/// Builds the provider for `method`.
///
/// An embedding model that cannot be loaded is reported and replaced by
/// [`SimilarityRanker`].
pub fn build_ranking_provider(
    method: RankingMethod,
    model_path: Option<&Path>,
) -> Box<dyn RankingProvider> {
    match method {
        RankingMethod::Fuzzy => Box::new(SimilarityRanker),
        RankingMethod::Embedding => {
            let loaded = model_path
                .ok_or(MapError::NoEmbeddingModel)
                .and_then(EmbeddingRanker::load);
            match loaded {
                Ok(ranker) => {
                    info!(
                        model = %ranker.path().display(),
                        vocabulary = ranker.vocabulary_size(),
                        dimension = ranker.dimension(),
                        "embedding model loaded"
                    );
                    Box::new(ranker)
                }
                Err(error) => {
                    warn!(%error, "could not load embedding model, using fuzzy ranking");
                    Box::new(SimilarityRanker)
                }
            }
        }
    }
}

/// Splits a label into lowercase word tokens, breaking camelCase runs.
fn label_tokens(label: &str) -> Vec<String> {
    let mut spaced = String::with_capacity(label.len() + 4);
    let mut prev_lower = false;
    for ch in label.chars() {
        if prev_lower && ch.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
    }
    normalize(&spaced)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Cosine similarity in `[-1, 1]`, `0.0` for zero vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    (dot / (mag_a * mag_b)).clamp(-1.0, 1.0)
}

fn top_candidates(mut scored: Vec<RankedCandidate>, limit: usize) -> Vec<RankedCandidate> {
    // sort_by is stable, so equal scores keep header order
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(limit);
    scored
}
