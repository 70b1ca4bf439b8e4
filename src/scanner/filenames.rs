//! Important filename detection
//!
//! Runs once per invocation, independent of keywords. Only the base name is
//! compared, so extension exclusions never hide an important file.

use super::commits::CommitDiff;
use super::filters::ImportantNames;
use super::sources::CandidateSource;
use super::types::ImportantFile;

/// Important files among the enumerated working-tree or directory sources
pub fn check_filenames(sources: &[CandidateSource], names: &ImportantNames) -> Vec<ImportantFile> {
    if names.is_empty() {
        return Vec::new();
    }

    sources
        .iter()
        .map(CandidateSource::display_path)
        .filter(|path| names.is_important(path))
        .map(|path| ImportantFile {
            path: path.to_path_buf(),
            commit: None,
        })
        .collect()
}

/// Important files touched by any commit in history, one finding per commit
pub fn check_filenames_in_history(
    diffs: &[CommitDiff],
    names: &ImportantNames,
) -> Vec<ImportantFile> {
    if names.is_empty() {
        return Vec::new();
    }

    let found: Vec<ImportantFile> = diffs
        .iter()
        .flat_map(|diff| {
            diff.entries
                .iter()
                .filter(|entry| names.is_important(&entry.path))
                .map(|entry| ImportantFile {
                    path: entry.path.clone(),
                    commit: Some(diff.commit_id.clone()),
                })
        })
        .collect();

    tracing::debug!("{} important files found in history", found.len());
    found
}
