//! Error types for the taxonomy.

use thiserror::Error;

/// Result type alias for taxonomy operations.
pub type Result<T> = std::result::Result<T, TaxonomyError>;

/// Errors that can occur while loading or querying the taxonomy.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    /// The parent graph contains a cycle and the load policy rejects it.
    #[error("cyclic parent chain through {}", .0.join(" -> "))]
    CyclicParent(Vec<String>),

    /// Two records claim the same identity.
    #[error("duplicate {kind}: {id}")]
    Duplicate { kind: &'static str, id: String },

    /// The backing store could not answer a lookup.
    #[error("taxonomy store unavailable: {0}")]
    StoreUnavailable(String),

    /// Embedding validation or indexing error.
    #[error("embedding error: {0}")]
    Embedding(#[from] skillmap_embeddings::EmbeddingError),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
