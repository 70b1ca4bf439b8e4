//! Multi-surface keyword search
//!
//! Each surface has its own module: working-tree files ([`content`]), commit
//! messages and commit diffs ([`commits`]), branch diffs ([`branches`]) and
//! important filenames ([`filenames`]). The [`orchestrator`] runs them per keyword.

pub mod branches;
pub mod commits;
pub mod content;
pub mod filenames;
pub mod filters;
pub mod matcher;
pub mod orchestrator;
pub mod sources;
pub mod types;

// Re-export main types for easier access
pub use filters::{ImportantNames, InclusionPolicy};
pub use orchestrator::{Reporter, SearchOptions, Searcher, Target};
pub use sources::CandidateSource;
pub use types::{
    ChangeKind, ImportantFile, KeywordSummary, MatchMode, MatchRecord, RunSummary, SurfaceKind,
};
