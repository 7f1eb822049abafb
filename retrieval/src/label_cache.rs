//! Memoized label localization.
//!
//! [`LabelCache`] sits in front of a [`Localizer`] and is shared by every
//! request through an `Arc`. A failed localization returns the original text
//! and is never cached, so a later call can still succeed.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::LabelCacheConfig;
use crate::error::Result;
use crate::retry::RetryPolicy;

/// Trait for services that translate display labels.
#[async_trait]
pub trait Localizer: Send + Sync {
    /// Get the name of this localizer.
    fn name(&self) -> &str;

    /// Translate `text`. Errors are treated as transient by the cache.
    async fn localize(&self, text: &str) -> Result<String>;
}

/// A localizer that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLocalizer;

#[async_trait]
impl Localizer for IdentityLocalizer {
    fn name(&self) -> &str {
        "identity"
    }

    async fn localize(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted_at: Instant,
}

/// Shared cache of localized labels.
///
/// Reads use `peek`, so recency is never bumped and the entry evicted at
/// capacity is the oldest insertion.
pub struct LabelCache {
    /// Cached translations, keyed by source text.
    entries: RwLock<LruCache<String, CacheEntry>>,

    /// The external translation service.
    localizer: Arc<dyn Localizer>,

    /// Lifetime of an entry, if bounded.
    ttl: Option<Duration>,

    /// Bound on a single localization call.
    policy: RetryPolicy,

    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl LabelCache {
    /// Create a cache in front of `localizer`.
    pub fn new(localizer: Arc<dyn Localizer>, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(
                NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN),
            )),
            localizer,
            ttl: None,
            policy: RetryPolicy::no_retry(RetryPolicy::default().timeout_ms),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Create a cache from configuration. Localization calls get the retry
    /// policy's timeout but are never retried.
    pub fn from_config(
        localizer: Arc<dyn Localizer>,
        config: &LabelCacheConfig,
        retry: &RetryPolicy,
    ) -> Self {
        let cache = Self::new(localizer, config.max_entries)
            .with_timeout(Duration::from_millis(retry.timeout_ms));
        match config.ttl_secs {
            Some(secs) => cache.with_ttl(Duration::from_secs(secs)),
            None => cache,
        }
    }

    /// Expire entries after `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Bound each localization call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.policy = RetryPolicy::no_retry(timeout.as_millis() as u64);
        self
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.ttl.is_none_or(|ttl| entry.inserted_at.elapsed() < ttl)
    }

    /// Localize `text`, consulting the cache first.
    ///
    /// Blank input is returned as is without calling the localizer. On
    /// failure the original text is returned and nothing is cached.
    pub async fn localize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.peek(text)
                && self.is_fresh(entry)
            {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return entry.value.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);

        // No lock is held across the external call.
        let result = self
            .policy
            .with_timeout("localization", self.localizer.localize(text))
            .await;

        match result {
            Ok(value) => {
                self.insert(text, value.clone()).await;
                value
            }
            Err(err) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    localizer = self.localizer.name(),
                    "Localization failed, using original label: {err}"
                );
                text.to_string()
            }
        }
    }

    async fn insert(&self, text: &str, value: String) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };

        let mut entries = self.entries.write().await;
        // Full and `text` is new: the oldest insertion makes room.
        if entries.len() == entries.cap().get() && !entries.contains(text) {
            debug!("Label cache full, evicting oldest entry");
        }
        entries.put(text.to_string(), entry);
    }

    /// Check if a fresh translation of `text` is cached.
    pub async fn contains(&self, text: &str) -> bool {
        self.entries
            .read()
            .await
            .peek(text)
            .is_some_and(|e| self.is_fresh(e))
    }

    /// Clear the entire cache.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        info!("Cleared label cache");
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> LabelCacheStats {
        let entries = self.entries.read().await;
        LabelCacheStats {
            entries: entries.len(),
            max_entries: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Statistics about the label cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCacheStats {
    /// Number of entries in cache.
    pub entries: usize,

    /// Maximum cache size.
    pub max_entries: usize,

    /// Lookups answered from the cache.
    pub hits: u64,

    /// Lookups that went to the localizer.
    pub misses: u64,

    /// Localizer calls that failed or timed out.
    pub failures: u64,
}
