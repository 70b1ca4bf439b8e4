//! Commit history and diff materialisation
//!
//! History is walked once per call in topological + time order, which for a
//! linear history is newest first. Diffs are turned into [`DiffEntry`] values
//! carrying the blob ids of both sides plus a compact patch text made of hunk
//! headers and `+`/`-`/` ` prefixed lines.

use anyhow::{Context, Result};
use git2::{Delta, Diff, ErrorCode, Oid, Patch, Sort, Tree};

use super::{Commit, DiffEntry, GitRepo};
use crate::scanner::ChangeKind;
use crate::shared::decode_lossy;

impl GitRepo {
    /// All commits reachable from HEAD, newest first
    pub fn walk_history(&self) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk().context("Failed to start history walk")?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        match revwalk.push_head() {
            Ok(()) => {}
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                tracing::debug!("HEAD is unborn; history is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e).context("Failed to walk history from HEAD"),
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            commits.push(Commit {
                id: oid.to_string(),
                message: decode_lossy(commit.message_bytes()),
            });
        }

        tracing::debug!("Walked {} commits", commits.len());
        Ok(commits)
    }

    /// Diff of a commit against its first parent (or the empty tree for roots)
    pub fn commit_diff(&self, commit: &Commit) -> Result<Vec<DiffEntry>> {
        let oid = Oid::from_str(&commit.id)
            .with_context(|| format!("Invalid commit id: {}", commit.id))?;
        let commit = self.repo.find_commit(oid)?;
        let tree = commit.tree()?;

        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .with_context(|| format!("Failed to diff commit {oid}"))?;

        Ok(collect_entries(&diff))
    }

    /// Diff between two revisions, `old_rev` being the base
    pub fn tree_diff(&self, old_rev: &str, new_rev: &str) -> Result<Vec<DiffEntry>> {
        let old_tree = self.resolve_tree(old_rev)?;
        let new_tree = self.resolve_tree(new_rev)?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .with_context(|| format!("Failed to diff {old_rev}..{new_rev}"))?;

        Ok(collect_entries(&diff))
    }

    fn resolve_tree(&self, rev: &str) -> Result<Tree<'_>> {
        let object = self
            .repo
            .revparse_single(rev)
            .with_context(|| format!("Unknown revision: {rev}"))?;
        object
            .peel_to_tree()
            .with_context(|| format!("Revision {rev} has no tree"))
    }
}

fn collect_entries(diff: &Diff<'_>) -> Vec<DiffEntry> {
    let mut entries = Vec::new();

    for (idx, delta) in diff.deltas().enumerate() {
        let kind = match delta.status() {
            Delta::Added | Delta::Untracked => ChangeKind::Added,
            Delta::Deleted => ChangeKind::Deleted,
            Delta::Modified | Delta::Renamed | Delta::Copied | Delta::Typechange => {
                ChangeKind::Modified
            }
            _ => continue,
        };

        let file = if kind == ChangeKind::Deleted {
            delta.old_file()
        } else {
            delta.new_file()
        };
        let Some(path) = file.path() else {
            continue;
        };

        let patch = match Patch::from_diff(diff, idx) {
            Ok(Some(patch)) => render_patch(&patch).unwrap_or_else(|e| {
                tracing::debug!("Unreadable patch for {}: {}", path.display(), e);
                String::new()
            }),
            Ok(None) => String::new(),
            Err(e) => {
                tracing::debug!("Failed to build patch for {}: {}", path.display(), e);
                String::new()
            }
        };

        entries.push(DiffEntry {
            kind,
            path: path.to_path_buf(),
            old_blob: blob_id(delta.old_file().id()),
            new_blob: blob_id(delta.new_file().id()),
            patch,
        });
    }

    entries
}

fn blob_id(oid: Oid) -> Option<String> {
    if oid.is_zero() {
        None
    } else {
        Some(oid.to_string())
    }
}

/// Hunk headers followed by their origin-prefixed lines, one per line
fn render_patch(patch: &Patch<'_>) -> Result<String> {
    let mut text = String::new();

    for hunk_idx in 0..patch.num_hunks() {
        let (hunk, line_count) = patch.hunk(hunk_idx)?;
        push_line(&mut text, None, hunk.header());

        for line_idx in 0..line_count {
            let line = patch.line_in_hunk(hunk_idx, line_idx)?;
            let origin = line.origin();
            if matches!(origin, '+' | '-' | ' ') {
                push_line(&mut text, Some(origin), line.content());
            }
        }
    }

    Ok(text)
}

fn push_line(text: &mut String, origin: Option<char>, content: &[u8]) {
    if let Some(origin) = origin {
        text.push(origin);
    }
    text.push_str(&decode_lossy(content));
    if !text.ends_with('\n') {
        text.push('\n');
    }
}
