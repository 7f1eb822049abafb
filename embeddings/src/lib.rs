//! # Embeddings
//!
//! Semantic embedding generation and nearest-neighbour search for the
//! skill/occupation resolver.
//!
//! ## Features
//!
//! - **Embedding Generation**: Convert text to dense vectors through an
//!   [`EmbeddingProvider`]
//! - **Distance Queries**: Cosine distance between embeddings
//! - **Vector Store**: "k nearest by cosine distance" per entity kind
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings System                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider ──► Embedding ──► VectorStore::nearest      │
//! │       │                                   │                     │
//! │       ▼                                   ▼                     │
//! │  OpenAI-compatible API          SimilarityIndex (per kind)     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod index;
pub mod provider;
pub mod similarity;
pub mod store;

pub use error::{EmbeddingError, Result};
pub use index::SimilarityIndex;
pub use provider::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, OpenAIProvider};
pub use similarity::{Neighbor, cosine_distance, cosine_similarity};
pub use store::{EntityKind, InMemoryVectorStore, VectorStore};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Surrogate identifier of an embedded taxonomy record.
pub type EntityId = u64;

/// Dimension of the multilingual MiniLM sentence embeddings the corpus is
/// built with.
pub const DEFAULT_DIMENSION: usize = 384;
