//! Similarity index for brute-force embedding lookups.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{EmbeddingError, Result};
use crate::similarity::{Neighbor, nearest_k, normalize};
use crate::{Embedding, EntityId};

/// A flat similarity index over the embeddings of one entity kind.
///
/// The corpus is static and small enough (tens of thousands of terms) that
/// an exhaustive cosine scan answers a query well within request latency.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    /// Stored embeddings, keyed by surrogate id.
    entries: HashMap<EntityId, Embedding>,

    /// Expected dimension of embeddings.
    dimension: usize,
}

impl SimilarityIndex {
    /// Create a new similarity index.
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: HashMap::new(),
            dimension,
        }
    }

    /// Expected embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add an embedding to the index, replacing any previous one for `id`.
    /// Embeddings are stored normalized.
    pub fn add(&mut self, id: EntityId, mut embedding: Embedding) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        normalize(&mut embedding);
        self.entries.insert(id, embedding);
        debug!("Added embedding to index: {id}");

        Ok(())
    }

    /// Get an embedding by id.
    pub fn get(&self, id: EntityId) -> Option<&Embedding> {
        self.entries.get(&id)
    }

    /// Check if an id exists in the index.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Get the number of entries in the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return at most `k` entries closest to `query`, ascending by cosine
    /// distance.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut query = query.to_vec();
        normalize(&mut query);

        let candidates = self
            .entries
            .iter()
            .map(|(id, embedding)| (*id, embedding.as_slice()));

        nearest_k(&query, candidates, k)
    }
}
