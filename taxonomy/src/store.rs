//! Lookup interface over the corpus store.

use std::collections::HashMap;

use async_trait::async_trait;
use skillmap_embeddings::EntityId;

use crate::error::Result;
use crate::model::{Occupation, Skill, SkillGroup};

/// Read-only lookups the resolver needs from the corpus store.
///
/// Absent records are `Ok(None)`; an `Err` means the store itself failed.
#[async_trait]
pub trait TaxonomyStore: Send + Sync {
    /// Look up a skill by surrogate id.
    async fn skill(&self, id: EntityId) -> Result<Option<Skill>>;

    /// Look up a skill by concept URI.
    async fn skill_by_uri(&self, uri: &str) -> Result<Option<Skill>>;

    /// Look up a skill group by concept URI.
    async fn skill_group(&self, uri: &str) -> Result<Option<SkillGroup>>;

    /// Look up an occupation by surrogate id.
    async fn occupation(&self, id: EntityId) -> Result<Option<Occupation>>;

    /// Batched ISCO label lookup. Unknown codes are simply absent from the
    /// returned map.
    async fn lookup_isco_codes(&self, codes: &[String]) -> Result<HashMap<String, String>>;
}
