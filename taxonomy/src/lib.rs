//! # Taxonomy
//!
//! The canonical skill/occupation corpus and the hierarchy walks over it.
//!
//! Skills form an arbitrary-depth parent-pointer tree that mixes
//! [`SkillGroup`] macro-categories with [`Skill`] nodes. Occupations hang off
//! the fixed four-tier ISCO classification, where every prefix of a code is
//! itself a group (`"7"` → `"72"` → `"723"` → `"7231"`).
//!
//! ```text
//!  CorpusSnapshot (JSON) ──► Taxonomy ──► TaxonomyStore
//!          │                                   │
//!          ▼                                   ▼
//!  InMemoryVectorStore               HierarchyResolver ──► prune
//! ```

pub mod error;
pub mod hierarchy;
pub mod isco;
pub mod model;
pub mod prune;
pub mod snapshot;
pub mod store;
pub mod taxonomy;

pub use error::{Result, TaxonomyError};
pub use hierarchy::{DEFAULT_MAX_DEPTH, HierarchyResolver};
pub use model::{HierarchyNode, HierarchyPath, IscoGroup, Occupation, Skill, SkillGroup};
pub use prune::PruningPolicy;
pub use snapshot::{Corpus, CorpusSnapshot};
pub use store::TaxonomyStore;
pub use taxonomy::{CyclePolicy, Taxonomy};
