//! Local tip vs. remote-tracking branch search
//!
//! For each remote-tracking ref the tree diff `ref..HEAD` is split by change
//! kind. Added and deleted files are searched in full (their new or old blob),
//! modified files through their patch. Any failure is contained to the entry
//! or ref it happened on. No dedup is applied on this surface.

use anyhow::{Context, Result, bail};

use super::commits::diff_line_spans;
use super::content::search_text;
use super::filters::InclusionPolicy;
use super::types::{MatchMode, MatchRecord, SurfaceKind};
use crate::git::{DiffEntry, RemoteRef, VcsBackend};
use crate::shared::decode_lossy;

/// Search every remote-tracking ref's diff against `local_tip`
pub fn search_branches(
    backend: &dyn VcsBackend,
    local_tip: &str,
    remote_refs: &[RemoteRef],
    keyword: &str,
    mode: MatchMode,
    policy: &InclusionPolicy,
) -> Vec<MatchRecord> {
    let mut records = Vec::new();

    for remote_ref in remote_refs {
        let entries = match backend.diff_trees(&remote_ref.target, local_tip) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skipping branch {}: {:#}", remote_ref.name, e);
                continue;
            }
        };
        tracing::trace!("{} changed files against {}", entries.len(), remote_ref.name);

        for entry in entries.iter().filter(|entry| policy.eligible(&entry.path)) {
            match search_entry(backend, &remote_ref.name, entry, keyword, mode) {
                Ok(mut found) => records.append(&mut found),
                Err(e) => {
                    tracing::debug!(
                        "Skipping {} in {}: {:#}",
                        entry.path.display(),
                        remote_ref.name,
                        e
                    );
                }
            }
        }
    }

    records
}

fn search_entry(
    backend: &dyn VcsBackend,
    branch: &str,
    entry: &DiffEntry,
    keyword: &str,
    mode: MatchMode,
) -> Result<Vec<MatchRecord>> {
    let record = |line_number: usize, line: &str, spans: Vec<std::ops::Range<usize>>| {
        MatchRecord::new(SurfaceKind::BranchDiff, line.to_string(), spans)
            .with_branch(branch, entry.kind)
            .with_path(&entry.path)
            .with_line(line_number)
    };

    let Some(blob_id) = entry.content_blob() else {
        // Modified: search the patch body
        let records = entry
            .patch
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                diff_line_spans(line, keyword, mode).map(|spans| record(idx + 1, line, spans))
            })
            .collect();
        return Ok(records);
    };

    let bytes = backend
        .read_blob(blob_id)
        .with_context(|| format!("Unreadable blob {blob_id}"))?;
    if content_inspector::inspect(&bytes).is_binary() {
        bail!("binary content");
    }

    let text = decode_lossy(&bytes);
    Ok(search_text(&text, keyword, mode)
        .map(|(line_number, line, spans)| record(line_number, line, spans))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::memory::MemoryBackend;
    use crate::scanner::ChangeKind;
    use std::path::{Path, PathBuf};

    fn entry(kind: ChangeKind, path: &str, blob: Option<&str>, patch: &str) -> DiffEntry {
        DiffEntry {
            kind,
            path: PathBuf::from(path),
            old_blob: if kind == ChangeKind::Deleted { blob.map(String::from) } else { None },
            new_blob: if kind == ChangeKind::Added { blob.map(String::from) } else { None },
            patch: patch.to_string(),
        }
    }

    fn remote(name: &str, target: &str) -> RemoteRef {
        RemoteRef {
            name: name.into(),
            target: target.into(),
        }
    }

    #[test]
    fn test_added_deleted_and_modified_entries() {
        let mut backend = MemoryBackend::default();
        backend.blobs.insert("new1".into(), b"first\nthe token\n".to_vec());
        backend.blobs.insert("old1".into(), b"token\n".to_vec());
        backend.tree_diffs.insert(
            "r1".into(),
            vec![
                entry(ChangeKind::Added, "added.txt", Some("new1"), ""),
                entry(ChangeKind::Deleted, "gone.txt", Some("old1"), ""),
                entry(ChangeKind::Modified, "mod.txt", None, "@@ -1 +1 @@\n-a\n+token b\n"),
            ],
        );

        let records = search_branches(
            &backend,
            "head",
            &[remote("origin/dev", "r1")],
            "token",
            MatchMode::ExactToken,
            &InclusionPolicy::default(),
        );

        let summary: Vec<_> = records
            .iter()
            .map(|r| (r.change.unwrap(), r.path.clone().unwrap(), r.line_number.unwrap()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (ChangeKind::Added, PathBuf::from("added.txt"), 2),
                (ChangeKind::Deleted, PathBuf::from("gone.txt"), 1),
                (ChangeKind::Modified, PathBuf::from("mod.txt"), 3),
            ]
        );
        assert!(records.iter().all(|r| r.branch.as_deref() == Some("origin/dev")));
    }

    #[test]
    fn test_failures_are_contained() {
        let mut backend = MemoryBackend::default();
        backend.blobs.insert("bin".into(), b"token\0\x01\x02".to_vec());
        backend.blobs.insert("ok".into(), b"token\n".to_vec());
        backend.tree_diffs.insert(
            "r2".into(),
            vec![
                entry(ChangeKind::Added, "missing.txt", Some("nope"), ""),
                entry(ChangeKind::Added, "binary.dat", Some("bin"), ""),
                entry(ChangeKind::Added, "fine.txt", Some("ok"), ""),
            ],
        );

        let records = search_branches(
            &backend,
            "head",
            &[remote("origin/broken", "unknown"), remote("origin/main", "r2")],
            "token",
            MatchMode::Substring,
            &InclusionPolicy::default(),
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].path.as_deref(), Some(Path::new("fine.txt")));
        assert_eq!(records[0].branch.as_deref(), Some("origin/main"));
    }

    #[test]
    fn test_inclusion_policy_applies() {
        let mut backend = MemoryBackend::default();
        backend.blobs.insert("b".into(), b"token\n".to_vec());
        backend.tree_diffs.insert(
            "r".into(),
            vec![entry(ChangeKind::Added, "logo.svg", Some("b"), "")],
        );
        let refs = [remote("origin/main", "r")];

        let policy = InclusionPolicy::new(vec![".svg".into()], false);
        let records =
            search_branches(&backend, "head", &refs, "token", MatchMode::Substring, &policy);
        assert!(records.is_empty());

        let policy = InclusionPolicy::new(vec![".svg".into()], true);
        assert_eq!(
            search_branches(&backend, "head", &refs, "token", MatchMode::Substring, &policy).len(),
            1
        );
    }

    #[test]
    fn test_repeated_lines_are_not_deduplicated() {
        let mut backend = MemoryBackend::default();
        let patch = "@@ -1 +1 @@\n+token\n";
        for base in ["a", "b"] {
            let entries = vec![entry(ChangeKind::Modified, "x.txt", None, patch)];
            backend.tree_diffs.insert(base.into(), entries);
        }

        let records = search_branches(
            &backend,
            "head",
            &[remote("origin/a", "a"), remote("origin/b", "b")],
            "token",
            MatchMode::ExactToken,
            &InclusionPolicy::default(),
        );
        assert_eq!(records.len(), 2);
    }
}
