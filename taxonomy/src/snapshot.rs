//! Loading the static corpus from its serialized snapshot.
//!
//! The ingestion pipeline writes the embedded taxonomy as a single JSON
//! document. Loading it produces both the lookup [`Taxonomy`] and the
//! per-kind vector indexes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skillmap_embeddings::{Embedding, EntityId, EntityKind, InMemoryVectorStore};
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::isco;
use crate::model::{IscoGroup, Occupation, Skill, SkillGroup};
use crate::taxonomy::{CyclePolicy, Taxonomy};

/// A skill together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    #[serde(flatten)]
    pub skill: Skill,
    pub embedding: Embedding,
}

/// An occupation as written by ingestion, before code normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupationRecord {
    pub id: EntityId,
    pub term: String,
    #[serde(default)]
    pub isco_code: Option<String>,
    pub embedding: Embedding,
}

/// The serialized corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusSnapshot {
    #[serde(default)]
    pub skill_groups: Vec<SkillGroup>,
    #[serde(default)]
    pub skills: Vec<SkillRecord>,
    #[serde(default)]
    pub occupations: Vec<OccupationRecord>,
    #[serde(default)]
    pub isco_groups: Vec<IscoGroup>,
}

/// A loaded corpus: records for lookup plus vectors for search.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub taxonomy: Taxonomy,
    pub vectors: InMemoryVectorStore,
}

impl CorpusSnapshot {
    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a snapshot from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let snapshot = Self::from_json(&content)?;
        info!(
            "Read corpus snapshot from {} ({} skills, {} occupations)",
            path.display(),
            snapshot.skills.len(),
            snapshot.occupations.len()
        );
        Ok(snapshot)
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build the in-memory corpus.
    ///
    /// Every embedding must have `dimension` components. ISCO groups are
    /// applied in order (last label for a code wins) and the major groups are
    /// then overwritten with their canonical labels.
    pub fn into_corpus(self, dimension: usize, cycle_policy: CyclePolicy) -> Result<Corpus> {
        let mut taxonomy = Taxonomy::new();
        let mut vectors = InMemoryVectorStore::new(dimension);

        for group in self.skill_groups {
            taxonomy.insert_skill_group(group)?;
        }

        for record in self.skills {
            vectors
                .index_mut(EntityKind::Skill)
                .add(record.skill.id, record.embedding)?;
            taxonomy.insert_skill(record.skill)?;
        }

        for record in self.occupations {
            let code = isco::normalize_code(record.isco_code.as_deref());
            vectors
                .index_mut(EntityKind::Occupation)
                .add(record.id, record.embedding)?;
            taxonomy.insert_occupation(Occupation::new(record.id, record.term, code))?;
        }

        for group in self.isco_groups {
            taxonomy.upsert_isco_group(group);
        }
        taxonomy.apply_major_group_labels();

        taxonomy.validate(cycle_policy)?;
        taxonomy.log_summary();

        Ok(Corpus { taxonomy, vectors })
    }
}
