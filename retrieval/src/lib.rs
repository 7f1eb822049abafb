//! # Retrieval Engine
//!
//! This crate resolves free-text skill descriptions (typically Portuguese,
//! possibly misspelled) to canonical skills and occupations:
//!
//! - **Ranking**: Embed the query and find the nearest corpus records
//! - **Hierarchy**: Walk each match up its taxonomy and prune placeholders
//! - **Zoom**: Re-express each match at a requested level of generality
//! - **Labels**: Localize display labels through a shared cache
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         SkillResolver                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  query ──► SimilarityRanker ──┬──► skills (k = 6)               │
//! │                               └──► occupations (k = 3)          │
//! │                                        │                        │
//! │                                        ▼                        │
//! │                  HierarchyResolver ──► PruningPolicy            │
//! │                                        │                        │
//! │                                        ▼                        │
//! │                     LabelCache ──► zoom::project                │
//! │                                        │                        │
//! │                                        ▼                        │
//! │                                 SearchResponse                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use skillmap_retrieval::{RetrievalConfig, SkillResolver, ZoomLevel};
//!
//! let config = RetrievalConfig::load("skillmap.toml").await?;
//! let resolver = SkillResolver::from_config(config).await?;
//!
//! let response = resolver
//!     .search("manjo de solda elétrica", ZoomLevel::parse("2"))
//!     .await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod label_cache;
pub mod localizer;
pub mod ranker;
pub mod retry;
pub mod zoom;

pub use config::{
    EmbeddingConfig, HierarchyConfig, LabelCacheConfig, LocalizationConfig, RankingConfig,
    RetrievalConfig,
};
pub use engine::{
    OccupationMatch, ResolverStats, SearchResponse, SkillMatch, SkillResolver,
    SkillResolverBuilder,
};
pub use error::{Result, RetrievalError};
pub use label_cache::{IdentityLocalizer, LabelCache, LabelCacheStats, Localizer};
pub use localizer::HttpLocalizer;
pub use ranker::{ConfidenceTier, SimilarityRanker, TierThresholds, confidence_score};
pub use retry::RetryPolicy;
pub use zoom::ZoomLevel;

// Re-export from dependencies for convenience
pub use skillmap_embeddings::{EmbeddingProvider, EntityKind, VectorStore};
pub use skillmap_taxonomy::{CorpusSnapshot, CyclePolicy, HierarchyNode, TaxonomyStore};
