//! Hierarchy reconstruction from parent references.
//!
//! Two taxonomy shapes are supported:
//!
//! - **ISCO**: a fixed four-tier numeric code where every prefix names a
//!   group. Resolved with one batched label lookup.
//! - **Skills**: an arbitrary-depth parent-pointer chain mixing skill groups
//!   and skills. Resolved by walking leaf to root under a step bound, so a
//!   malformed or cyclic graph can never hang a request.
//!
//! Paths are always returned root first.

use tracing::{debug, warn};

use crate::error::Result;
use crate::isco;
use crate::model::{HierarchyNode, HierarchyPath};
use crate::store::TaxonomyStore;

/// Default bound on parent-pointer steps for skill hierarchies.
pub const DEFAULT_MAX_DEPTH: usize = 6;

/// Resolves ancestor chains against a [`TaxonomyStore`].
#[derive(Debug, Clone, Copy)]
pub struct HierarchyResolver {
    max_depth: usize,
}

impl Default for HierarchyResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl HierarchyResolver {
    /// Create a resolver that follows at most `max_depth` parent references.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Resolve the four ISCO tiers of `code`.
    ///
    /// Codes shorter than four characters yield an empty path. Tiers with no
    /// known label are rendered with the raw code, so a resolvable code always
    /// produces exactly four nodes.
    pub async fn resolve_isco<S>(&self, store: &S, code: &str) -> Result<HierarchyPath>
    where
        S: TaxonomyStore + ?Sized,
    {
        let Some(tiers) = isco::tier_codes(code) else {
            debug!("ISCO code {code:?} is too short to resolve");
            return Ok(HierarchyPath::default());
        };

        let labels = store.lookup_isco_codes(&tiers).await?;

        let nodes = tiers
            .into_iter()
            .map(|tier| {
                let label = labels.get(&tier).cloned().unwrap_or_else(|| tier.clone());
                HierarchyNode::new(tier, label)
            })
            .collect::<Vec<_>>();

        Ok(HierarchyPath::new(nodes))
    }

    /// Resolve the ancestors of a skill, given the skill's parent reference.
    ///
    /// Each reference is looked up as a skill group first, then as a skill.
    /// The walk stops at a missing reference, a dangling reference, or after
    /// `max_depth` steps.
    pub async fn resolve_skill<S>(
        &self,
        store: &S,
        parent_ref: Option<&str>,
    ) -> Result<HierarchyPath>
    where
        S: TaxonomyStore + ?Sized,
    {
        let mut nodes = Vec::new();
        let mut current = parent_ref.map(str::to_string);

        while let Some(uri) = current.take() {
            if nodes.len() >= self.max_depth {
                warn!(
                    "Skill hierarchy walk hit the depth bound of {} at {uri}",
                    self.max_depth
                );
                break;
            }

            if let Some(group) = store.skill_group(&uri).await? {
                nodes.push(HierarchyNode::new(group.uri, group.term));
                current = group.parent_uri;
            } else if let Some(skill) = store.skill_by_uri(&uri).await? {
                nodes.push(HierarchyNode::new(skill.uri, skill.term));
                current = skill.parent_uri;
            } else {
                debug!("Dangling parent reference: {uri}");
            }
        }

        nodes.reverse();
        Ok(HierarchyPath::new(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IscoGroup, Skill, SkillGroup};
    use crate::taxonomy::Taxonomy;
    use pretty_assertions::assert_eq;

    fn isco_taxonomy() -> Taxonomy {
        let mut taxonomy = Taxonomy::new();
        taxonomy.upsert_isco_group(IscoGroup::new("7", "Craft and related trades workers"));
        taxonomy.upsert_isco_group(IscoGroup::new(
            "72",
            "Metal, machinery and related trades workers",
        ));
        taxonomy.upsert_isco_group(IscoGroup::new(
            "723",
            "Machinery mechanics and repairers",
        ));
        taxonomy.upsert_isco_group(IscoGroup::new(
            "7231",
            "Motor vehicle mechanics and repairers",
        ));
        taxonomy
    }

    fn skill_taxonomy() -> Taxonomy {
        let mut taxonomy = Taxonomy::new();
        taxonomy
            .insert_skill_group(SkillGroup::new("group:s", "skills"))
            .unwrap();
        taxonomy
            .insert_skill_group(
                SkillGroup::new("group:s6", "working with machinery").with_parent("group:s"),
            )
            .unwrap();
        taxonomy
            .insert_skill_group(
                SkillGroup::new("group:s6.1", "welding and soldering").with_parent("group:s6"),
            )
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(1, "skill:weld", "weld metal").with_parent("group:s6.1"))
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(2, "skill:mig", "Soldagem MIG/MAG").with_parent("skill:weld"))
            .unwrap();
        taxonomy
    }

    #[tokio::test]
    async fn test_isco_full_path() {
        let taxonomy = isco_taxonomy();
        let path = HierarchyResolver::default()
            .resolve_isco(&taxonomy, "7231")
            .await
            .unwrap();

        assert_eq!(path.len(), 4);
        assert_eq!(path.nodes()[0].id, "7");
        assert_eq!(
            path.labels()[3],
            "Motor vehicle mechanics and repairers".to_string()
        );
    }

    #[tokio::test]
    async fn test_isco_missing_groups_fall_back_to_code() {
        let mut taxonomy = Taxonomy::new();
        taxonomy.upsert_isco_group(IscoGroup::new("7", "Craft and related trades workers"));

        let path = HierarchyResolver::default()
            .resolve_isco(&taxonomy, "7231")
            .await
            .unwrap();

        assert_eq!(
            path.labels(),
            vec![
                "Craft and related trades workers".to_string(),
                "72".to_string(),
                "723".to_string(),
                "7231".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_isco_short_code_is_empty() {
        let taxonomy = isco_taxonomy();
        let resolver = HierarchyResolver::default();
        for code in ["", "7", "72", "723"] {
            let path = resolver.resolve_isco(&taxonomy, code).await.unwrap();
            assert!(path.is_empty(), "code {code:?} should not resolve");
        }
    }

    #[tokio::test]
    async fn test_skill_path_is_root_first() {
        let taxonomy = skill_taxonomy();
        let path = HierarchyResolver::default()
            .resolve_skill(&taxonomy, Some("skill:weld"))
            .await
            .unwrap();

        assert_eq!(
            path.labels(),
            vec![
                "skills".to_string(),
                "working with machinery".to_string(),
                "welding and soldering".to_string(),
                "weld metal".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_skill_without_parent_has_empty_path() {
        let taxonomy = skill_taxonomy();
        let path = HierarchyResolver::default()
            .resolve_skill(&taxonomy, None)
            .await
            .unwrap();
        assert!(path.is_empty());
    }

    #[tokio::test]
    async fn test_dangling_reference_stops_silently() {
        let mut taxonomy = skill_taxonomy();
        taxonomy
            .insert_skill_group(SkillGroup::new("group:orphan", "orphan").with_parent("group:gone"))
            .unwrap();

        let path = HierarchyResolver::default()
            .resolve_skill(&taxonomy, Some("group:orphan"))
            .await
            .unwrap();
        assert_eq!(path.labels(), vec!["orphan".to_string()]);

        let path = HierarchyResolver::default()
            .resolve_skill(&taxonomy, Some("group:gone"))
            .await
            .unwrap();
        assert!(path.is_empty());
    }

    #[tokio::test]
    async fn test_cyclic_graph_terminates_within_bound() {
        let mut taxonomy = Taxonomy::new();
        taxonomy
            .insert_skill(Skill::new(1, "skill:a", "A").with_parent("skill:b"))
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(2, "skill:b", "B").with_parent("skill:a"))
            .unwrap();

        for bound in [1, 3, DEFAULT_MAX_DEPTH] {
            let path = HierarchyResolver::new(bound)
                .resolve_skill(&taxonomy, Some("skill:a"))
                .await
                .unwrap();
            assert_eq!(path.len(), bound);
        }
    }

    #[tokio::test]
    async fn test_groups_win_over_skills_with_the_same_uri() {
        let mut taxonomy = Taxonomy::new();
        taxonomy
            .insert_skill_group(SkillGroup::new("shared", "as group"))
            .unwrap();
        taxonomy
            .insert_skill(Skill::new(1, "shared", "as skill"))
            .unwrap();

        let path = HierarchyResolver::default()
            .resolve_skill(&taxonomy, Some("shared"))
            .await
            .unwrap();
        assert_eq!(path.labels(), vec!["as group".to_string()]);
    }
}
