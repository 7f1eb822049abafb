//! Configuration for the resolution engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skillmap_embeddings::DEFAULT_DIMENSION;
use skillmap_taxonomy::CyclePolicy;
use skillmap_taxonomy::hierarchy::DEFAULT_MAX_DEPTH;
use skillmap_taxonomy::prune::DEFAULT_PLACEHOLDER_ROOTS;

use crate::error::{Result, RetrievalError};
use crate::ranker::TierThresholds;
use crate::retry::RetryPolicy;

/// Configuration for the resolution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Path of the embedded corpus snapshot.
    pub corpus_path: PathBuf,

    /// Embedding provider configuration.
    pub embedding: EmbeddingConfig,

    /// Similarity ranking configuration.
    pub ranking: RankingConfig,

    /// Hierarchy resolution configuration.
    pub hierarchy: HierarchyConfig,

    /// Localization service configuration.
    pub localization: LocalizationConfig,

    /// Label cache configuration.
    pub label_cache: LabelCacheConfig,

    /// Timeout and retry policy for external calls.
    pub retry: RetryPolicy,
}

impl RetrievalConfig {
    /// Create a new configuration with default values.
    pub fn new(corpus_path: impl Into<PathBuf>) -> Self {
        Self {
            corpus_path: corpus_path.into(),
            embedding: EmbeddingConfig::default(),
            ranking: RankingConfig::default(),
            hierarchy: HierarchyConfig::default(),
            localization: LocalizationConfig::default(),
            label_cache: LabelCacheConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Parse a TOML configuration. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&content)
    }

    /// Set the embedding configuration.
    pub fn with_embedding(mut self, config: EmbeddingConfig) -> Self {
        self.embedding = config;
        self
    }

    /// Set the ranking configuration.
    pub fn with_ranking(mut self, config: RankingConfig) -> Self {
        self.ranking = config;
        self
    }

    /// Set the localization configuration.
    pub fn with_localization(mut self, config: LocalizationConfig) -> Self {
        self.localization = config;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.embedding.dimension == 0 {
            return Err(RetrievalError::Config(
                "embedding.dimension must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("high", self.ranking.tiers.high),
            ("medium", self.ranking.tiers.medium),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(RetrievalError::Config(format!(
                    "ranking.tiers.{name} ({value}) must be within [0, 100]"
                )));
            }
        }
        if self.ranking.tiers.medium > self.ranking.tiers.high {
            return Err(RetrievalError::Config(format!(
                "ranking.tiers.medium ({}) must not exceed ranking.tiers.high ({})",
                self.ranking.tiers.medium, self.ranking.tiers.high
            )));
        }
        if self.retry.timeout_ms == 0 {
            return Err(RetrievalError::Config(
                "retry.timeout_ms must be positive".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(RetrievalError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.label_cache.max_entries == 0 {
            return Err(RetrievalError::Config(
                "label_cache.max_entries must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self::new(
            dirs::data_dir()
                .unwrap_or_default()
                .join("skillmap/corpus.json"),
        )
    }
}

/// Configuration for the embedding provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible embeddings endpoint.
    pub base_url: String,

    /// Model to use for embeddings. Must be the model the corpus was built with.
    pub model: String,

    /// Dimension of the corpus embeddings.
    pub dimension: usize,

    /// Environment variable holding the API key, if the endpoint needs one.
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/v1".to_string(),
            model: "paraphrase-multilingual-MiniLM-L12-v2".to_string(),
            dimension: DEFAULT_DIMENSION,
            api_key_env: None,
        }
    }
}

/// Configuration for similarity ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of skill matches per query.
    pub skill_k: usize,

    /// Number of occupation matches per query.
    pub occupation_k: usize,

    /// Confidence tier thresholds.
    pub tiers: TierThresholds,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            skill_k: 6,
            occupation_k: 3,
            tiers: TierThresholds::default(),
        }
    }
}

/// Configuration for hierarchy resolution and pruning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Bound on parent-pointer steps when walking skill hierarchies.
    pub max_depth: usize,

    /// Root labels dropped from skill paths (case-insensitive).
    pub placeholder_roots: Vec<String>,

    /// What to do with parent cycles found at load time.
    pub cycle_policy: CyclePolicy,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            placeholder_roots: DEFAULT_PLACEHOLDER_ROOTS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            cycle_policy: CyclePolicy::default(),
        }
    }
}

/// Configuration for the localization service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Whether labels are localized at all.
    pub enabled: bool,

    /// Base URL of the translation service.
    pub base_url: String,

    /// Source language code, or `auto`.
    pub source: String,

    /// Target language code.
    pub target: String,
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:5000".to_string(),
            source: "en".to_string(),
            target: "pt".to_string(),
        }
    }
}

/// Configuration for the label cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelCacheConfig {
    /// Maximum cached labels before the oldest is evicted.
    pub max_entries: usize,

    /// Lifetime of a cached label in seconds. None keeps labels for the
    /// life of the process.
    pub ttl_secs: Option<u64>,
}

impl Default for LabelCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 50_000,
            ttl_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = RetrievalConfig::new("/tmp/corpus.json");
        assert_eq!(config.ranking.skill_k, 6);
        assert_eq!(config.ranking.occupation_k, 3);
        assert_eq!(config.hierarchy.max_depth, 6);
        assert_eq!(config.embedding.dimension, 384);
        assert!(!config.localization.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RetrievalConfig::from_toml_str(
            r#"
            corpus_path = "/srv/esco/corpus.json"

            [ranking]
            skill_k = 10

            [ranking.tiers]
            high = 80.0

            [hierarchy]
            cycle_policy = "reject"

            [retry]
            max_attempts = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.corpus_path, PathBuf::from("/srv/esco/corpus.json"));
        assert_eq!(config.ranking.skill_k, 10);
        assert_eq!(config.ranking.occupation_k, 3);
        assert_eq!(config.ranking.tiers.high, 80.0);
        assert_eq!(config.ranking.tiers.medium, 50.0);
        assert_eq!(config.hierarchy.cycle_policy, CyclePolicy::Reject);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.timeout_ms, RetryPolicy::default().timeout_ms);
    }

    #[test]
    fn test_inverted_tiers_are_rejected() {
        let err = RetrievalConfig::from_toml_str(
            r#"
            [ranking.tiers]
            high = 40.0
            medium = 60.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RetrievalError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = RetrievalConfig::from_toml_str("[retry]\ntimeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, RetrievalError::Config(msg) if msg.contains("timeout_ms")));

        let err = RetrievalConfig::from_toml_str("[retry]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, RetrievalError::Config(msg) if msg.contains("max_attempts")));
    }

    #[test]
    fn test_tiers_outside_score_range_are_rejected() {
        for tiers in ["high = 120.0", "medium = -5.0", "high = nan"] {
            let err =
                RetrievalConfig::from_toml_str(&format!("[ranking.tiers]\n{tiers}\n")).unwrap_err();
            assert!(
                matches!(err, RetrievalError::Config(ref msg) if msg.contains("[0, 100]")),
                "{tiers} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skillmap.toml");
        std::fs::write(&path, "[label_cache]\nttl_secs = 3600\n").unwrap();

        let config = RetrievalConfig::load(&path).await.unwrap();
        assert_eq!(config.label_cache.ttl_secs, Some(3600));
        assert_eq!(config.label_cache.max_entries, 50_000);
    }
}
