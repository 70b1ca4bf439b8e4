//! In-memory [`VcsBackend`] for unit tests

use anyhow::{Result, anyhow};
use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{Commit, DiffEntry, RemoteRef, VcsBackend};

#[derive(Default)]
pub struct MemoryBackend {
    pub workdir: Option<PathBuf>,
    pub files: Vec<PathBuf>,
    pub commits: Vec<Commit>,
    /// Keyed by commit id
    pub commit_diffs: HashMap<String, Vec<DiffEntry>>,
    /// Keyed by the old (base) revision
    pub tree_diffs: HashMap<String, Vec<DiffEntry>>,
    pub refs: Vec<RemoteRef>,
    pub head: Option<String>,
    pub blobs: HashMap<String, Vec<u8>>,
    pub parent_diff_calls: Cell<usize>,
}

impl VcsBackend for MemoryBackend {
    fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn tracked_files(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.clone())
    }

    fn commits(&self) -> Result<Vec<Commit>> {
        Ok(self.commits.clone())
    }

    fn diff_against_parent(&self, commit: &Commit) -> Result<Vec<DiffEntry>> {
        self.parent_diff_calls.set(self.parent_diff_calls.get() + 1);
        self.commit_diffs
            .get(&commit.id)
            .cloned()
            .ok_or_else(|| anyhow!("no diff for commit {}", commit.id))
    }

    fn diff_trees(&self, old_rev: &str, _new_rev: &str) -> Result<Vec<DiffEntry>> {
        self.tree_diffs
            .get(old_rev)
            .cloned()
            .ok_or_else(|| anyhow!("unknown revision {old_rev}"))
    }

    fn remote_tracking_refs(&self) -> Result<Vec<RemoteRef>> {
        Ok(self.refs.clone())
    }

    fn head_revision(&self) -> Result<Option<String>> {
        Ok(self.head.clone())
    }

    fn read_blob(&self, id: &str) -> Result<Vec<u8>> {
        self.blobs
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("missing blob {id}"))
    }
}
