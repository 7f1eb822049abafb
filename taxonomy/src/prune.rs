//! Removal of hierarchy nodes too generic to be useful as display labels.

use std::collections::HashSet;

use crate::model::HierarchyPath;

/// Corpus root labels that carry no information on their own.
pub const DEFAULT_PLACEHOLDER_ROOTS: [&str; 3] =
    ["skills", "knowledge", "transversal skills and competences"];

/// Corpus-specific pruning applied to resolved paths before zooming.
#[derive(Debug, Clone)]
pub struct PruningPolicy {
    placeholder_roots: HashSet<String>,
}

impl Default for PruningPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_ROOTS)
    }
}

impl PruningPolicy {
    /// Create a policy with the given placeholder root labels (matched
    /// case-insensitively).
    pub fn new<I, S>(placeholder_roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            placeholder_roots: placeholder_roots
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Whether `label` is one of the generic corpus roots.
    pub fn is_placeholder(&self, label: &str) -> bool {
        self.placeholder_roots
            .contains(&label.trim().to_lowercase())
    }

    /// Drop the root of a skill path when it is a generic placeholder.
    pub fn prune_skill_path(&self, mut path: HierarchyPath) -> HierarchyPath {
        if path.root().is_some_and(|root| self.is_placeholder(&root.label)) {
            path.pop_root();
        }
        path
    }

    /// Drop the ISCO major group, unless it is the only node left.
    pub fn prune_isco_path(&self, mut path: HierarchyPath) -> HierarchyPath {
        if path.len() > 1 {
            path.pop_root();
        }
        path
    }
}
