//! Error types for embedding generation and vector search.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors raised while embedding a query or searching the vector store.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The hosted API needs a key and none was given.
    #[error("embedding provider not configured")]
    ProviderNotConfigured,

    /// The provider answered with an error status.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider answered, but not with a usable embedding.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// An embedding does not have the corpus dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The vector store could not answer a distance query.
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
