//! Skill and occupation resolution engine.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use skillmap_embeddings::{EmbeddingProvider, EntityKind, Neighbor, OpenAIProvider, VectorStore};
use skillmap_taxonomy::{
    Corpus, CorpusSnapshot, HierarchyNode, HierarchyPath, HierarchyResolver, PruningPolicy,
    TaxonomyStore,
};

use crate::config::{EmbeddingConfig, RankingConfig, RetrievalConfig};
use crate::error::{Result, RetrievalError};
use crate::label_cache::{IdentityLocalizer, LabelCache, LabelCacheStats, Localizer};
use crate::localizer::HttpLocalizer;
use crate::ranker::{ConfidenceTier, SimilarityRanker, confidence_score, round_score};
use crate::retry::RetryPolicy;
use crate::zoom::{ZoomLevel, project};

/// A skill matched by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatch {
    /// The matched skill's own term, localized.
    pub micro_term: String,

    /// The term shown at the requested zoom level, localized.
    pub display_term: String,

    /// Pruned ancestor groups by URI, root first, labels localized.
    pub hierarchy: Vec<HierarchyNode>,

    /// Confidence in `[0, 100]`, one decimal.
    pub score: f32,

    /// Cosine distance to the query.
    pub distance: f32,

    /// Tier of the unrounded score.
    pub tier: ConfidenceTier,
}

/// An occupation matched by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationMatch {
    /// The matched occupation's own term, localized.
    pub micro_term: String,

    /// The term shown at the requested zoom level, localized.
    pub display_term: String,

    /// Pruned ISCO groups by code, root first, labels localized.
    pub hierarchy: Vec<HierarchyNode>,

    /// Confidence in `[0, 100]`, one decimal.
    pub score: f32,

    /// Cosine distance to the query.
    pub distance: f32,

    /// Normalized ISCO code, `"0000"` when the corpus had none.
    pub isco_code: String,
}

/// Result of a [`SkillResolver::search`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Skill matches, best first.
    pub skill_matches: Vec<SkillMatch>,

    /// Occupation matches, best first.
    pub occupation_matches: Vec<OccupationMatch>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.skill_matches.is_empty() && self.occupation_matches.is_empty()
    }
}

/// Localized labels of one match.
struct Labels {
    micro_term: String,
    display_term: String,
    hierarchy: Vec<HierarchyNode>,
}

/// Resolves free text to canonical skills and occupations.
///
/// Coordinates:
/// - Query embedding and nearest-neighbour ranking
/// - Hierarchy reconstruction and pruning
/// - Zoom projection and label localization
pub struct SkillResolver {
    /// Embeds queries and ranks corpus records.
    ranker: SimilarityRanker,

    /// Record and hierarchy lookups.
    taxonomy: Arc<dyn TaxonomyStore>,

    /// Ancestor walks.
    hierarchy: HierarchyResolver,

    /// Placeholder removal before zooming.
    pruning: PruningPolicy,

    /// Result counts and tier thresholds.
    ranking: RankingConfig,

    /// Bound on taxonomy lookups.
    retry: RetryPolicy,

    /// Shared across all requests.
    labels: Arc<LabelCache>,
}

impl SkillResolver {
    /// Create a new resolver builder.
    pub fn builder() -> SkillResolverBuilder {
        SkillResolverBuilder::new()
    }

    /// Load the corpus snapshot and wire up the configured services.
    pub async fn from_config(config: RetrievalConfig) -> Result<Self> {
        info!(
            path = %config.corpus_path.display(),
            "Initializing skill resolver"
        );

        let corpus = CorpusSnapshot::load(&config.corpus_path)
            .await?
            .into_corpus(config.embedding.dimension, config.hierarchy.cycle_policy)?;

        let provider = embedding_provider(&config.embedding)?;
        let localizer: Arc<dyn Localizer> = if config.localization.enabled {
            Arc::new(HttpLocalizer::from_config(&config.localization))
        } else {
            Arc::new(IdentityLocalizer)
        };

        let resolver = Self::builder()
            .with_config(config)
            .with_corpus(corpus)
            .with_provider(provider)
            .with_localizer(localizer)
            .build()?;

        info!("Skill resolver initialized");
        Ok(resolver)
    }

    /// Resolve `query` to its closest skills and occupations, with display
    /// terms projected to `zoom`.
    ///
    /// A blank query yields an empty response. Any embedding or retrieval
    /// failure fails the whole query. External calls are awaited one at a
    /// time.
    pub async fn search(&self, query: &str, zoom: ZoomLevel) -> Result<SearchResponse> {
        let Some(embedding) = self.ranker.embed_query(query).await? else {
            return Ok(SearchResponse::default());
        };

        debug!(%zoom, "Processing query: {query}");

        let skills = self
            .ranker
            .rank(&embedding, EntityKind::Skill, self.ranking.skill_k)
            .await?;
        let occupations = self
            .ranker
            .rank(&embedding, EntityKind::Occupation, self.ranking.occupation_k)
            .await?;

        let mut response = SearchResponse::default();
        for neighbor in &skills {
            if let Some(skill_match) = self.skill_match(neighbor, zoom).await? {
                response.skill_matches.push(skill_match);
            }
        }
        for neighbor in &occupations {
            if let Some(occupation_match) = self.occupation_match(neighbor, zoom).await? {
                response.occupation_matches.push(occupation_match);
            }
        }

        Ok(response)
    }

    async fn skill_match(&self, neighbor: &Neighbor, zoom: ZoomLevel) -> Result<Option<SkillMatch>> {
        let taxonomy = self.taxonomy.as_ref();

        let Some(skill) = self
            .retry
            .run("taxonomy", || taxonomy.skill(neighbor.id))
            .await?
        else {
            warn!(id = neighbor.id, "Ranked skill is missing from the taxonomy");
            return Ok(None);
        };

        let parent = skill.parent_uri.as_deref();
        let path = self
            .retry
            .run("taxonomy", || self.hierarchy.resolve_skill(taxonomy, parent))
            .await?;
        let path = self.pruning.prune_skill_path(path);

        let labels = self.localize(&skill.term, &path, zoom).await;
        let score = confidence_score(neighbor.distance);

        Ok(Some(SkillMatch {
            micro_term: labels.micro_term,
            display_term: labels.display_term,
            hierarchy: labels.hierarchy,
            score: round_score(score),
            distance: neighbor.distance,
            tier: self.ranking.tiers.classify(score),
        }))
    }

    async fn occupation_match(
        &self,
        neighbor: &Neighbor,
        zoom: ZoomLevel,
    ) -> Result<Option<OccupationMatch>> {
        let taxonomy = self.taxonomy.as_ref();

        let Some(occupation) = self
            .retry
            .run("taxonomy", || taxonomy.occupation(neighbor.id))
            .await?
        else {
            warn!(id = neighbor.id, "Ranked occupation is missing from the taxonomy");
            return Ok(None);
        };

        let code = occupation.isco_code.as_str();
        let path = self
            .retry
            .run("taxonomy", || self.hierarchy.resolve_isco(taxonomy, code))
            .await?;
        let path = self.pruning.prune_isco_path(path);

        let labels = self.localize(&occupation.term, &path, zoom).await;

        Ok(Some(OccupationMatch {
            micro_term: labels.micro_term,
            display_term: labels.display_term,
            hierarchy: labels.hierarchy,
            score: round_score(confidence_score(neighbor.distance)),
            distance: neighbor.distance,
            isco_code: occupation.isco_code,
        }))
    }

    /// Localize a match's leaf term and pruned path, then project the
    /// display term over the localized labels.
    async fn localize(&self, term: &str, path: &HierarchyPath, zoom: ZoomLevel) -> Labels {
        let micro_term = self.labels.localize(term).await;

        let mut hierarchy = Vec::with_capacity(path.nodes().len());
        for node in path.nodes() {
            let label = self.labels.localize(&node.label).await;
            hierarchy.push(HierarchyNode::new(node.id.as_str(), label));
        }

        let localized: Vec<&str> = hierarchy.iter().map(|node| node.label.as_str()).collect();
        let display_term = project(&micro_term, &localized, zoom);

        Labels {
            micro_term,
            display_term,
            hierarchy,
        }
    }

    /// The shared label cache.
    pub fn label_cache(&self) -> &Arc<LabelCache> {
        &self.labels
    }

    /// Get resolver statistics.
    pub async fn stats(&self) -> ResolverStats {
        ResolverStats {
            skill_k: self.ranking.skill_k,
            occupation_k: self.ranking.occupation_k,
            max_depth: self.hierarchy.max_depth(),
            label_cache: self.labels.stats().await,
        }
    }
}

fn embedding_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let mut provider = OpenAIProvider::new()
        .with_base_url(&config.base_url)
        .with_model(&config.model)
        .with_dimension(config.dimension);

    if let Some(var) = &config.api_key_env {
        let key = std::env::var(var).map_err(|_| {
            RetrievalError::Config(format!("environment variable {var} is not set"))
        })?;
        provider = provider.with_api_key(key);
    }

    Ok(Arc::new(provider))
}

/// Builder for [`SkillResolver`].
pub struct SkillResolverBuilder {
    config: RetrievalConfig,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    vectors: Option<Arc<dyn VectorStore>>,
    taxonomy: Option<Arc<dyn TaxonomyStore>>,
    localizer: Option<Arc<dyn Localizer>>,
    label_cache: Option<Arc<LabelCache>>,
}

impl SkillResolverBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: RetrievalConfig::default(),
            provider: None,
            vectors: None,
            taxonomy: None,
            localizer: None,
            label_cache: None,
        }
    }

    /// Use `config` for ranking, hierarchy, cache and retry settings.
    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the embedding provider.
    pub fn with_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the vector store.
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vectors = Some(store);
        self
    }

    /// Set the taxonomy store.
    pub fn with_taxonomy(mut self, taxonomy: Arc<dyn TaxonomyStore>) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    /// Use a loaded corpus as both taxonomy and vector store.
    pub fn with_corpus(self, corpus: Corpus) -> Self {
        self.with_taxonomy(Arc::new(corpus.taxonomy))
            .with_vector_store(Arc::new(corpus.vectors))
    }

    /// Set the localizer behind a new label cache.
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Share an existing label cache. Takes precedence over
    /// [`with_localizer`](Self::with_localizer).
    pub fn with_label_cache(mut self, cache: Arc<LabelCache>) -> Self {
        self.label_cache = Some(cache);
        self
    }

    /// Set the number of skill and occupation matches per query.
    pub fn with_k(mut self, skill_k: usize, occupation_k: usize) -> Self {
        self.config.ranking.skill_k = skill_k;
        self.config.ranking.occupation_k = occupation_k;
        self
    }

    /// Build the resolver.
    pub fn build(self) -> Result<SkillResolver> {
        let config = self.config;
        config.validate()?;

        let provider = self
            .provider
            .ok_or_else(|| RetrievalError::Config("no embedding provider".to_string()))?;
        let vectors = self
            .vectors
            .ok_or_else(|| RetrievalError::Config("no vector store".to_string()))?;
        let taxonomy = self
            .taxonomy
            .ok_or_else(|| RetrievalError::Config("no taxonomy store".to_string()))?;

        let labels = match self.label_cache {
            Some(cache) => cache,
            None => {
                let localizer = self
                    .localizer
                    .unwrap_or_else(|| Arc::new(IdentityLocalizer));
                Arc::new(LabelCache::from_config(
                    localizer,
                    &config.label_cache,
                    &config.retry,
                ))
            }
        };

        Ok(SkillResolver {
            ranker: SimilarityRanker::new(provider, vectors, config.retry.clone()),
            taxonomy,
            hierarchy: HierarchyResolver::new(config.hierarchy.max_depth),
            pruning: PruningPolicy::new(&config.hierarchy.placeholder_roots),
            ranking: config.ranking,
            retry: config.retry,
            labels,
        })
    }
}

impl Default for SkillResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverStats {
    /// Skill matches per query.
    pub skill_k: usize,

    /// Occupation matches per query.
    pub occupation_k: usize,

    /// Bound on skill hierarchy walks.
    pub max_depth: usize,

    /// Label cache statistics.
    pub label_cache: LabelCacheStats,
}
