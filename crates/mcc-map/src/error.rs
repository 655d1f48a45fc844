//! Error types for mapping operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from mapping setup.
///
/// Matching itself never fails; these only surface while building a
/// ranking provider.
#[derive(Debug, Error)]
pub enum MapError {
    /// No embedding model path was configured.
    #[error("no embedding model configured")]
    NoEmbeddingModel,

    /// Embedding model file could not be read.
    #[error("failed to read embedding model {path}: {source}")]
    EmbeddingRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Embedding model file is malformed.
    #[error("invalid embedding model {path} at line {line}: {message}")]
    EmbeddingFormat {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Embedding model contains no vectors.
    #[error("embedding model {path} contains no vectors")]
    EmptyEmbedding { path: PathBuf },
}
