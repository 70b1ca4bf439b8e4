//! Commit message and commit diff search
//!
//! Diff search keeps a dedup set keyed by `(path, line number, raw line)` for a
//! whole run. A key reported once is never reported again, whether it comes
//! back in a later commit or under another keyword. The set lives in one
//! [`DiffSearch`] value, which the orchestrator creates once per run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::filters::InclusionPolicy;
use super::matcher;
use super::types::{MatchMode, MatchRecord, SurfaceKind};
use crate::git::{Commit, DiffEntry, VcsBackend};

/// Search commit messages for `keyword`
///
/// ExactToken splits the whole message on whitespace, newlines included.
/// Records carry the trimmed message with the keyword spans marked.
pub fn search_messages(commits: &[Commit], keyword: &str, mode: MatchMode) -> Vec<MatchRecord> {
    commits
        .iter()
        .filter_map(|commit| {
            let message = commit.message.trim();
            matcher::find(message, keyword, mode).map(|spans| {
                MatchRecord::new(SurfaceKind::CommitMessage, message.to_string(), spans)
                    .with_commit(commit.id.clone())
            })
        })
        .collect()
}

/// One commit's diff against its first parent
#[derive(Debug, Clone)]
pub struct CommitDiff {
    pub commit_id: String,
    pub entries: Vec<DiffEntry>,
}

/// Materialise the diff of every commit, newest first
///
/// A commit whose diff cannot be produced is logged and left out.
pub fn load_commit_diffs(backend: &dyn VcsBackend, commits: &[Commit]) -> Vec<CommitDiff> {
    commits
        .iter()
        .filter_map(|commit| match backend.diff_against_parent(commit) {
            Ok(entries) => Some(CommitDiff {
                commit_id: commit.id.clone(),
                entries,
            }),
            Err(e) => {
                tracing::warn!("Skipping diff of commit {}: {:#}", commit.id, e);
                None
            }
        })
        .collect()
}

type DedupKey = (PathBuf, usize, String);

/// Commit diff search with a run-wide dedup set
#[derive(Debug, Default)]
pub struct DiffSearch {
    seen: HashSet<DedupKey>,
    workspace_root: Option<PathBuf>,
    policy: InclusionPolicy,
}

impl DiffSearch {
    pub fn new(workspace_root: Option<PathBuf>, policy: InclusionPolicy) -> Self {
        Self {
            seen: HashSet::new(),
            workspace_root,
            policy,
        }
    }

    /// Number of distinct keys reported so far in this run
    pub fn reported(&self) -> usize {
        self.seen.len()
    }

    /// Search every commit diff for `keyword`
    pub fn search(
        &mut self,
        diffs: &[CommitDiff],
        keyword: &str,
        mode: MatchMode,
    ) -> Vec<MatchRecord> {
        diffs
            .iter()
            .flat_map(|diff| self.search_commit(&diff.commit_id, &diff.entries, keyword, mode))
            .collect()
    }

    /// Search the entries of one commit's diff
    pub fn search_commit(
        &mut self,
        commit_id: &str,
        entries: &[DiffEntry],
        keyword: &str,
        mode: MatchMode,
    ) -> Vec<MatchRecord> {
        let entries: Vec<&DiffEntry> = entries
            .iter()
            .filter(|entry| {
                self.policy.eligible(&entry.path) && !self.is_under_workspace(&entry.path)
            })
            .collect();

        // Cheap pre-filter on the whole commit before locating lines
        if !entries.iter().any(|entry| entry.patch.contains(keyword)) {
            return Vec::new();
        }

        let mut records = Vec::new();
        for entry in entries {
            for (idx, line) in entry.patch.lines().enumerate() {
                let Some(spans) = diff_line_spans(line, keyword, mode) else {
                    continue;
                };
                let line_number = idx + 1;
                let key = (entry.path.clone(), line_number, line.to_string());
                if !self.seen.insert(key) {
                    continue;
                }
                records.push(
                    MatchRecord::new(SurfaceKind::CommitDiff, line.to_string(), spans)
                        .with_commit(commit_id)
                        .with_path(&entry.path)
                        .with_line(line_number),
                );
            }
        }

        records
    }

    fn is_under_workspace(&self, path: &Path) -> bool {
        let Some(root) = &self.workspace_root else {
            return false;
        };
        path.starts_with(root)
            || root
                .strip_prefix("/")
                .is_ok_and(|relative| path.starts_with(relative))
    }
}

/// Match a raw patch line, ignoring its leading diff marker
///
/// Spans are returned relative to the raw line.
pub(crate) fn diff_line_spans(
    line: &str,
    keyword: &str,
    mode: MatchMode,
) -> Option<Vec<std::ops::Range<usize>>> {
    let body = matcher::strip_diff_marker(line);
    let offset = line.len() - body.len();
    matcher::find(body, keyword, mode).map(|spans| {
        spans
            .into_iter()
            .map(|span| span.start + offset..span.end + offset)
            .collect()
    })
}
