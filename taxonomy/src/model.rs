//! Core taxonomy records and derived hierarchy paths.

use serde::{Deserialize, Serialize};
use skillmap_embeddings::EntityId;

/// A macro-category in the skill tree. Has no embedding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGroup {
    /// Concept URI.
    pub uri: String,

    /// Preferred label.
    pub term: String,

    /// URI of the parent group (None for a root).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uri: Option<String>,
}

impl SkillGroup {
    pub fn new(uri: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            term: term.into(),
            parent_uri: None,
        }
    }

    /// Set the parent reference.
    pub fn with_parent(mut self, parent_uri: impl Into<String>) -> Self {
        self.parent_uri = Some(parent_uri.into());
        self
    }
}

/// A canonical skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Surrogate id used by the vector store.
    pub id: EntityId,

    /// Concept URI.
    pub uri: String,

    /// Preferred label.
    pub term: String,

    /// URI of the parent, which may be a [`SkillGroup`] or another [`Skill`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uri: Option<String>,
}

impl Skill {
    pub fn new(id: EntityId, uri: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            id,
            uri: uri.into(),
            term: term.into(),
            parent_uri: None,
        }
    }

    /// Set the parent reference.
    pub fn with_parent(mut self, parent_uri: impl Into<String>) -> Self {
        self.parent_uri = Some(parent_uri.into());
        self
    }
}

/// A canonical occupation, classified by ISCO code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    /// Surrogate id used by the vector store.
    pub id: EntityId,

    /// Preferred label, unique across occupations.
    pub term: String,

    /// ISCO code; [`crate::isco::UNKNOWN_CODE`] when the source had none.
    pub isco_code: String,
}

impl Occupation {
    pub fn new(id: EntityId, term: impl Into<String>, isco_code: impl Into<String>) -> Self {
        Self {
            id,
            term: term.into(),
            isco_code: isco_code.into(),
        }
    }
}

/// One group of the ISCO classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IscoGroup {
    pub code: String,
    pub label: String,
}

impl IscoGroup {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// A labelled node of a resolved hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyNode {
    /// URI (skills) or ISCO code (occupations).
    pub id: String,

    /// Display label.
    pub label: String,
}

impl HierarchyNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// An ordered ancestor chain, root first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HierarchyPath {
    nodes: Vec<HierarchyNode>,
}

impl HierarchyPath {
    pub fn new(nodes: Vec<HierarchyNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root (most general) node.
    pub fn root(&self) -> Option<&HierarchyNode> {
        self.nodes.first()
    }

    /// Display labels, root first.
    pub fn labels(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.label.clone()).collect()
    }

    /// Remove and return the root node.
    pub fn pop_root(&mut self) -> Option<HierarchyNode> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(self.nodes.remove(0))
        }
    }
}

impl From<Vec<HierarchyNode>> for HierarchyPath {
    fn from(nodes: Vec<HierarchyNode>) -> Self {
        Self::new(nodes)
    }
}
