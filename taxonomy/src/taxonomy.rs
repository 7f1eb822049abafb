//! In-memory taxonomy, loaded once and immutable afterwards.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skillmap_embeddings::EntityId;
use tracing::{debug, info, warn};

use crate::error::{Result, TaxonomyError};
use crate::isco;
use crate::model::{IscoGroup, Occupation, Skill, SkillGroup};
use crate::store::TaxonomyStore;

/// What to do when the skill parent graph contains a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Refuse to load the corpus.
    Reject,
    /// Log the cycle and load anyway. The bounded hierarchy walk keeps
    /// resolution terminating.
    #[default]
    Warn,
}

/// The complete skill/occupation corpus held in memory.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    /// Skill groups, indexed by URI.
    skill_groups: HashMap<String, SkillGroup>,

    /// Skills, indexed by surrogate id.
    skills: HashMap<EntityId, Skill>,

    /// Index from skill URI to surrogate id.
    skill_uris: HashMap<String, EntityId>,

    /// Occupations, indexed by surrogate id.
    occupations: HashMap<EntityId, Occupation>,

    /// Occupation terms, unique across the corpus.
    occupation_terms: HashSet<String>,

    /// ISCO group labels, indexed by code.
    isco_groups: HashMap<String, String>,
}

impl Taxonomy {
    /// Create an empty taxonomy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a skill group.
    pub fn insert_skill_group(&mut self, group: SkillGroup) -> Result<()> {
        if self.skill_groups.contains_key(&group.uri) {
            return Err(TaxonomyError::Duplicate {
                kind: "skill group",
                id: group.uri,
            });
        }
        self.skill_groups.insert(group.uri.clone(), group);
        Ok(())
    }

    /// Insert a skill. Both its id and its URI must be unique.
    pub fn insert_skill(&mut self, skill: Skill) -> Result<()> {
        if self.skills.contains_key(&skill.id) {
            return Err(TaxonomyError::Duplicate {
                kind: "skill id",
                id: skill.id.to_string(),
            });
        }
        if self.skill_uris.contains_key(&skill.uri) {
            return Err(TaxonomyError::Duplicate {
                kind: "skill uri",
                id: skill.uri,
            });
        }
        self.skill_uris.insert(skill.uri.clone(), skill.id);
        self.skills.insert(skill.id, skill);
        Ok(())
    }

    /// Insert an occupation. Ids and terms must be unique.
    pub fn insert_occupation(&mut self, occupation: Occupation) -> Result<()> {
        if self.occupations.contains_key(&occupation.id) {
            return Err(TaxonomyError::Duplicate {
                kind: "occupation id",
                id: occupation.id.to_string(),
            });
        }
        if !self.occupation_terms.insert(occupation.term.clone()) {
            return Err(TaxonomyError::Duplicate {
                kind: "occupation term",
                id: occupation.term,
            });
        }
        self.occupations.insert(occupation.id, occupation);
        Ok(())
    }

    /// Insert or replace an ISCO group label. The last label for a code wins.
    pub fn upsert_isco_group(&mut self, group: IscoGroup) {
        self.isco_groups.insert(group.code, group.label);
    }

    /// Overwrite the ten major groups with their canonical English labels.
    pub fn apply_major_group_labels(&mut self) {
        for (code, label) in isco::MAJOR_GROUPS {
            self.isco_groups.insert(code.to_string(), label.to_string());
        }
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn occupation_count(&self) -> usize {
        self.occupations.len()
    }

    pub fn skill_group_count(&self) -> usize {
        self.skill_groups.len()
    }

    pub fn isco_group_count(&self) -> usize {
        self.isco_groups.len()
    }

    fn parent_of(&self, uri: &str) -> Option<&str> {
        if let Some(group) = self.skill_groups.get(uri) {
            return group.parent_uri.as_deref();
        }
        self.skill_uris
            .get(uri)
            .and_then(|id| self.skills.get(id))
            .and_then(|skill| skill.parent_uri.as_deref())
    }

    /// Find every cycle in the skill parent graph.
    ///
    /// Each cycle is reported once, as the URIs on it in parent order.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            OnChain,
            Done,
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut cycles = Vec::new();

        let starts = self
            .skill_groups
            .keys()
            .map(String::as_str)
            .chain(self.skill_uris.keys().map(String::as_str));

        for start in starts {
            let mut chain: Vec<&str> = Vec::new();
            let mut current = Some(start);

            while let Some(uri) = current {
                match marks.get(uri) {
                    Some(Mark::Done) => break,
                    Some(Mark::OnChain) => {
                        if let Some(pos) = chain.iter().position(|u| *u == uri) {
                            cycles.push(chain[pos..].iter().map(|u| (*u).to_string()).collect());
                        }
                        break;
                    }
                    None => {}
                }
                if !self.skill_groups.contains_key(uri) && !self.skill_uris.contains_key(uri) {
                    break;
                }
                marks.insert(uri, Mark::OnChain);
                chain.push(uri);
                current = self.parent_of(uri);
            }

            for uri in chain {
                marks.insert(uri, Mark::Done);
            }
        }

        cycles
    }

    /// Validate the parent graph against `policy`.
    pub fn validate(&self, policy: CyclePolicy) -> Result<()> {
        let cycles = self.find_cycles();
        if cycles.is_empty() {
            debug!("Skill parent graph is acyclic");
            return Ok(());
        }

        match policy {
            CyclePolicy::Reject => {
                let mut first = cycles.into_iter().next().unwrap_or_default();
                if let Some(head) = first.first().cloned() {
                    first.push(head);
                }
                Err(TaxonomyError::CyclicParent(first))
            }
            CyclePolicy::Warn => {
                for cycle in &cycles {
                    warn!(
                        "Skill parent graph has a cycle: {}",
                        cycle.join(" -> ")
                    );
                }
                Ok(())
            }
        }
    }

    /// Log a summary of the loaded corpus.
    pub fn log_summary(&self) {
        info!(
            skills = self.skills.len(),
            skill_groups = self.skill_groups.len(),
            occupations = self.occupations.len(),
            isco_groups = self.isco_groups.len(),
            "Taxonomy loaded"
        );
    }
}

#[async_trait]
impl TaxonomyStore for Taxonomy {
    async fn skill(&self, id: EntityId) -> Result<Option<Skill>> {
        Ok(self.skills.get(&id).cloned())
    }

    async fn skill_by_uri(&self, uri: &str) -> Result<Option<Skill>> {
        Ok(self
            .skill_uris
            .get(uri)
            .and_then(|id| self.skills.get(id))
            .cloned())
    }

    async fn skill_group(&self, uri: &str) -> Result<Option<SkillGroup>> {
        Ok(self.skill_groups.get(uri).cloned())
    }

    async fn occupation(&self, id: EntityId) -> Result<Option<Occupation>> {
        Ok(self.occupations.get(&id).cloned())
    }

    async fn lookup_isco_codes(&self, codes: &[String]) -> Result<HashMap<String, String>> {
        Ok(codes
            .iter()
            .filter_map(|code| {
                self.isco_groups
                    .get(code)
                    .map(|label| (code.clone(), label.clone()))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cyclic_taxonomy() -> Taxonomy {
        let mut taxonomy = Taxonomy::new();
        taxonomy
            .insert_skill(Skill::new(1, "skill:a", "A").with_parent("skill:b"))
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(2, "skill:b", "B").with_parent("skill:a"))
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(3, "skill:c", "C").with_parent("skill:a"))
            .unwrap();
        taxonomy
    }

    #[test]
    fn test_acyclic_graph_validates() {
        let mut taxonomy = Taxonomy::new();
        taxonomy
            .insert_skill_group(SkillGroup::new("group:root", "skills"))
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(1, "skill:a", "A").with_parent("group:root"))
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(2, "skill:b", "B").with_parent("group:missing"))
            .unwrap();

        assert!(taxonomy.find_cycles().is_empty());
        assert!(taxonomy.validate(CyclePolicy::Reject).is_ok());
    }

    #[test]
    fn test_cycle_is_reported_once() {
        let taxonomy = cyclic_taxonomy();
        let cycles = taxonomy.find_cycles();

        assert_eq!(cycles.len(), 1);
        let mut members = cycles[0].clone();
        members.sort();
        assert_eq!(members, vec!["skill:a".to_string(), "skill:b".to_string()]);
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let mut taxonomy = Taxonomy::new();
        taxonomy
            .insert_skill_group(SkillGroup::new("group:x", "X").with_parent("group:x"))
            .unwrap();
        assert_eq!(taxonomy.find_cycles(), vec![vec!["group:x".to_string()]]);
    }

    #[test]
    fn test_cycle_policy() {
        let taxonomy = cyclic_taxonomy();
        assert!(taxonomy.validate(CyclePolicy::Warn).is_ok());
        assert!(matches!(
            taxonomy.validate(CyclePolicy::Reject),
            Err(TaxonomyError::CyclicParent(_))
        ));
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.insert_skill(Skill::new(1, "skill:a", "A")).unwrap();
        assert!(taxonomy.insert_skill(Skill::new(1, "skill:z", "Z")).is_err());
        assert!(taxonomy.insert_skill(Skill::new(2, "skill:a", "A2")).is_err());

        taxonomy
            .insert_occupation(Occupation::new(1, "welder", "7212"))
            .unwrap();
        assert!(
            taxonomy
                .insert_occupation(Occupation::new(2, "welder", "7212"))
                .is_err()
        );
    }

    #[test]
    fn test_occupation_terms_are_indexed() {
        let mut taxonomy = Taxonomy::new();
        for id in 0..10_000 {
            taxonomy
                .insert_occupation(Occupation::new(id, format!("occupation {id}"), "7212"))
                .unwrap();
        }
        assert_eq!(taxonomy.occupation_count(), 10_000);

        // A record rejected for its id does not claim its term.
        assert!(
            taxonomy
                .insert_occupation(Occupation::new(7, "bookkeeper", "4311"))
                .is_err()
        );
        taxonomy
            .insert_occupation(Occupation::new(10_000, "bookkeeper", "4311"))
            .unwrap();
        assert!(
            taxonomy
                .insert_occupation(Occupation::new(10_001, "occupation 42", "7212"))
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_isco_lookup_omits_unknown_codes() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.upsert_isco_group(IscoGroup::new("72", "Metal workers"));
        taxonomy.upsert_isco_group(IscoGroup::new("72", "Metal, machinery and related"));
        taxonomy.apply_major_group_labels();

        let labels = taxonomy
            .lookup_isco_codes(&["7".to_string(), "72".to_string(), "999".to_string()])
            .await
            .unwrap();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels["7"], "Craft and related trades workers");
        assert_eq!(labels["72"], "Metal, machinery and related");
    }
}
