//! Git integration layer for pickaxe
//!
//! The scanner only needs a handful of read operations from version control.
//! They are described by the [`VcsBackend`] trait and implemented for
//! [`GitRepo`] on top of git2.

#[cfg(test)]
pub(crate) mod memory;
pub mod history;
pub mod operations;
pub mod remote;

use anyhow::{Context, Result};
use git2::Repository;
use std::path::{Path, PathBuf};

use crate::scanner::ChangeKind;

/// A commit as seen by the history walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full revision hash
    pub id: String,
    pub message: String,
}

/// One file's change within a commit or a branch comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub kind: ChangeKind,
    /// New-side path, or old-side path for deletions
    pub path: PathBuf,
    pub old_blob: Option<String>,
    pub new_blob: Option<String>,
    /// Hunk headers and origin-prefixed lines; empty for binary changes
    pub patch: String,
}

impl DiffEntry {
    /// The blob whose full content represents this change, if any
    ///
    /// Added files are represented by their new blob and deleted files by
    /// their old blob. Modified files have no single blob; their patch is used.
    pub fn content_blob(&self) -> Option<&str> {
        match self.kind {
            ChangeKind::Added => self.new_blob.as_deref(),
            ChangeKind::Deleted => self.old_blob.as_deref(),
            ChangeKind::Modified => None,
        }
    }
}

/// A remote-tracking branch and the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Short name such as `origin/main`
    pub name: String,
    pub target: String,
}

/// Read operations the scanner needs from a version-control system
pub trait VcsBackend {
    /// Working directory root, `None` for bare repositories
    fn workdir(&self) -> Option<&Path>;

    /// Files known to the index, relative to the working directory
    fn tracked_files(&self) -> Result<Vec<PathBuf>>;

    /// Full history reachable from HEAD, newest first
    fn commits(&self) -> Result<Vec<Commit>>;

    /// Changes a commit introduced relative to its primary parent
    fn diff_against_parent(&self, commit: &Commit) -> Result<Vec<DiffEntry>>;

    /// Changes between two revisions (`old_rev` is the base side)
    fn diff_trees(&self, old_rev: &str, new_rev: &str) -> Result<Vec<DiffEntry>>;

    /// Remote-tracking branches, excluding symbolic `*/HEAD` refs
    fn remote_tracking_refs(&self) -> Result<Vec<RemoteRef>>;

    /// Commit the current branch points at, `None` while unborn
    fn head_revision(&self) -> Result<Option<String>>;

    /// Raw content of a blob
    fn read_blob(&self, id: &str) -> Result<Vec<u8>>;
}

pub struct GitRepo {
    pub repo: Repository,
}

impl GitRepo {
    /// Open the repository rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)
            .with_context(|| format!("Failed to open Git repository at {}", path.display()))?;
        Ok(GitRepo { repo })
    }
}

impl VcsBackend for GitRepo {
    fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn tracked_files(&self) -> Result<Vec<PathBuf>> {
        self.get_tracked_files()
    }

    fn commits(&self) -> Result<Vec<Commit>> {
        self.walk_history()
    }

    fn diff_against_parent(&self, commit: &Commit) -> Result<Vec<DiffEntry>> {
        self.commit_diff(commit)
    }

    fn diff_trees(&self, old_rev: &str, new_rev: &str) -> Result<Vec<DiffEntry>> {
        self.tree_diff(old_rev, new_rev)
    }

    fn remote_tracking_refs(&self) -> Result<Vec<RemoteRef>> {
        self.get_remote_tracking_refs()
    }

    fn head_revision(&self) -> Result<Option<String>> {
        self.get_head_revision()
    }

    fn read_blob(&self, id: &str) -> Result<Vec<u8>> {
        self.blob_content(id)
    }
}
