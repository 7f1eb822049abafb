//! The vector-store capability: "return the N closest vectors to a query".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::index::SimilarityIndex;
use crate::similarity::Neighbor;

/// The embedded entity sets a query can be issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Skill,
    Occupation,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Skill => write!(f, "skill"),
            EntityKind::Occupation => write!(f, "occupation"),
        }
    }
}

/// Trait for stores that answer nearest-neighbour queries by cosine distance.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return at most `k` records of `kind` closest to `query`, ascending by
    /// cosine distance.
    async fn nearest(&self, query: &[f32], kind: EntityKind, k: usize) -> Result<Vec<Neighbor>>;
}

/// A vector store holding one in-memory index per entity kind.
#[derive(Debug, Clone)]
pub struct InMemoryVectorStore {
    skills: SimilarityIndex,
    occupations: SimilarityIndex,
}

impl InMemoryVectorStore {
    /// Create an empty store for embeddings of `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            skills: SimilarityIndex::new(dimension),
            occupations: SimilarityIndex::new(dimension),
        }
    }

    /// The index for one entity kind.
    pub fn index(&self, kind: EntityKind) -> &SimilarityIndex {
        match kind {
            EntityKind::Skill => &self.skills,
            EntityKind::Occupation => &self.occupations,
        }
    }

    /// Mutable access to the index for one entity kind.
    pub fn index_mut(&mut self, kind: EntityKind) -> &mut SimilarityIndex {
        match kind {
            EntityKind::Skill => &mut self.skills,
            EntityKind::Occupation => &mut self.occupations,
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn nearest(&self, query: &[f32], kind: EntityKind, k: usize) -> Result<Vec<Neighbor>> {
        let neighbors = self.index(kind).nearest(query, k)?;
        debug!(%kind, k, found = neighbors.len(), "nearest-neighbour query");
        Ok(neighbors)
    }
}
