//! Similarity ranking: query embedding, nearest-neighbour retrieval, and
//! conversion of cosine distance into a bounded confidence score.

use std::sync::Arc;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use skillmap_embeddings::{
    Embedding, EmbeddingProvider, EmbeddingRequest, EntityKind, Neighbor, VectorStore,
};
use tracing::debug;

use crate::error::Result;
use crate::retry::RetryPolicy;

/// Convert a cosine distance into a confidence percentage in `[0, 100]`.
pub fn confidence_score(distance: f32) -> f32 {
    if distance.is_nan() {
        return 0.0;
    }
    (1.0 - distance).clamp(0.0, 1.0) * 100.0
}

/// Round a score to one decimal place for display.
pub fn round_score(score: f32) -> f32 {
    (score * 10.0).round() / 10.0
}

/// Confidence classification of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Bootstrap badge class used by the web UI.
    pub fn css_class(self) -> &'static str {
        match self {
            ConfidenceTier::High => "bg-success",
            ConfidenceTier::Medium => "bg-warning",
            ConfidenceTier::Low => "bg-danger",
        }
    }
}

/// Score boundaries between confidence tiers. Both are exclusive lower
/// bounds: a score must be strictly above `high` to be `High`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Scores above this are [`ConfidenceTier::High`].
    pub high: f32,

    /// Scores above this, up to `high`, are [`ConfidenceTier::Medium`].
    pub medium: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: 75.0,
            medium: 50.0,
        }
    }
}

impl TierThresholds {
    pub fn classify(&self, score: f32) -> ConfidenceTier {
        if score > self.high {
            ConfidenceTier::High
        } else if score > self.medium {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

/// Issues nearest-neighbour queries for free-text input.
#[derive(Clone)]
pub struct SimilarityRanker {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    retry: RetryPolicy,
}

impl SimilarityRanker {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            store,
            retry,
        }
    }

    /// Embed a query. Blank queries are not embedded and yield `None`.
    pub async fn embed_query(&self, text: &str) -> Result<Option<Embedding>> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Blank query, skipping embedding");
            return Ok(None);
        }

        let response = self
            .retry
            .run("embedding", || {
                self.provider.embed(EmbeddingRequest::new(text))
            })
            .await?;

        Ok(Some(response.embedding))
    }

    /// Return at most `k` records of `kind` closest to `query`, ascending by
    /// distance.
    pub async fn rank(&self, query: &[f32], kind: EntityKind, k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut neighbors = self
            .retry
            .run("vector store", || self.store.nearest(query, kind, k))
            .await?;

        // Stores are not trusted to honour ordering or `k`.
        neighbors.sort_by_key(|n| OrderedFloat(n.distance));
        neighbors.truncate(k);

        debug!(%kind, k, returned = neighbors.len(), "Ranked neighbours");
        Ok(neighbors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use skillmap_embeddings::{EmbeddingError, EmbeddingResponse, InMemoryVectorStore};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }

        fn default_model(&self) -> &str {
            "counting"
        }

        fn default_dimension(&self) -> usize {
            2
        }

        async fn embed(
            &self,
            _request: EmbeddingRequest,
        ) -> skillmap_embeddings::Result<EmbeddingResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EmbeddingError::InvalidResponse("model offline".to_string()));
            }
            Ok(EmbeddingResponse {
                embedding: vec![1.0, 0.0],
                model: "counting".to_string(),
                dimension: 2,
                tokens_used: None,
            })
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    /// A store that ignores `k` and returns its answers unordered.
    struct SloppyStore;

    #[async_trait]
    impl VectorStore for SloppyStore {
        async fn nearest(
            &self,
            _query: &[f32],
            _kind: EntityKind,
            _k: usize,
        ) -> skillmap_embeddings::Result<Vec<Neighbor>> {
            Ok(vec![
                Neighbor::new(1, 0.9),
                Neighbor::new(2, 0.1),
                Neighbor::new(3, 0.5),
            ])
        }
    }

    fn ranker(fail: bool, store: Arc<dyn VectorStore>) -> (SimilarityRanker, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            fail,
        });
        let ranker = SimilarityRanker::new(provider.clone(), store, RetryPolicy::no_retry(1_000));
        (ranker, provider)
    }

    #[test]
    fn test_confidence_score_bounds() {
        assert_eq!(confidence_score(0.0), 100.0);
        assert_eq!(confidence_score(1.0), 0.0);
        assert_eq!(confidence_score(2.0), 0.0);
        assert_eq!(confidence_score(-0.5), 100.0);
        assert_eq!(confidence_score(f32::NAN), 0.0);
        assert!((confidence_score(0.25) - 75.0).abs() < 1e-4);

        for step in 0..=200 {
            let score = confidence_score(step as f32 / 100.0);
            assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(87.64), 87.6);
        assert_eq!(round_score(87.66), 87.7);
    }

    #[test]
    fn test_tiers() {
        let tiers = TierThresholds::default();
        assert_eq!(tiers.classify(75.1), ConfidenceTier::High);
        assert_eq!(tiers.classify(75.0), ConfidenceTier::Medium);
        assert_eq!(tiers.classify(50.1), ConfidenceTier::Medium);
        assert_eq!(tiers.classify(50.0), ConfidenceTier::Low);
        assert_eq!(tiers.classify(0.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::Medium.css_class(), "bg-warning");
    }

    #[tokio::test]
    async fn test_blank_query_is_not_embedded() {
        let (ranker, provider) = ranker(false, Arc::new(InMemoryVectorStore::new(2)));
        assert_eq!(ranker.embed_query("   ").await.unwrap(), None);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let (ranker, _) = ranker(true, Arc::new(InMemoryVectorStore::new(2)));
        assert!(ranker.embed_query("solda").await.is_err());
    }

    #[tokio::test]
    async fn test_rank_enforces_order_and_bound() {
        let (ranker, _) = ranker(false, Arc::new(SloppyStore));
        let neighbors = ranker
            .rank(&[1.0, 0.0], EntityKind::Skill, 2)
            .await
            .unwrap();

        assert_eq!(
            neighbors.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[tokio::test]
    async fn test_empty_corpus_ranks_nothing() {
        let (ranker, _) = ranker(false, Arc::new(InMemoryVectorStore::new(2)));
        let neighbors = ranker
            .rank(&[1.0, 0.0], EntityKind::Occupation, 3)
            .await
            .unwrap();
        assert!(neighbors.is_empty());
    }
}
