//! Error types for the resolution engine.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the resolution engine.
///
/// Only infrastructure failures surface here. Missing reference data,
/// localization failures and malformed zoom levels are recovered locally.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Embedding or vector store error.
    #[error("embedding error: {0}")]
    Embedding(#[from] skillmap_embeddings::EmbeddingError),

    /// Taxonomy load or lookup error.
    #[error("taxonomy error: {0}")]
    Taxonomy(#[from] skillmap_taxonomy::TaxonomyError),

    /// An external call did not answer in time.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// The localization service failed.
    #[error("localization error: {0}")]
    Localization(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RetrievalError {
    /// Whether retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        use skillmap_embeddings::EmbeddingError as E;
        use skillmap_taxonomy::TaxonomyError as T;

        match self {
            RetrievalError::Timeout { .. } | RetrievalError::Http(_) => true,
            RetrievalError::Embedding(
                E::ApiRequest(_) | E::RateLimited { .. } | E::Http(_) | E::StoreUnavailable(_),
            ) => true,
            RetrievalError::Taxonomy(T::StoreUnavailable(_)) => true,
            _ => false,
        }
    }
}
