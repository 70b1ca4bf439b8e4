//! Candidate text sources
//!
//! A run enumerates sources once, either from the repository index or by
//! recursively walking a plain directory. The two modes never mix.

use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::git::VcsBackend;
use crate::shared::decode_lossy;

/// A file whose contents can be searched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Tracked file: `path` is relative to the working directory `root`
    WorkingTreeFile { root: PathBuf, path: PathBuf },
    /// File found by walking a directory outside version control
    StandaloneFile { path: PathBuf },
}

impl CandidateSource {
    /// Path reported in match records
    pub fn display_path(&self) -> &Path {
        match self {
            CandidateSource::WorkingTreeFile { path, .. } => path,
            CandidateSource::StandaloneFile { path } => path,
        }
    }

    /// Path used to open the file
    pub fn full_path(&self) -> PathBuf {
        match self {
            CandidateSource::WorkingTreeFile { root, path } => root.join(path),
            CandidateSource::StandaloneFile { path } => path.clone(),
        }
    }

    /// Read the file as text, dropping undecodable bytes
    pub fn read_text(&self) -> Result<String> {
        let full_path = self.full_path();
        let bytes = std::fs::read(&full_path)
            .with_context(|| format!("Failed to read file: {}", full_path.display()))?;
        Ok(decode_lossy(&bytes))
    }
}

/// Tracked files of a repository's working tree, in index order
pub fn tracked_sources(backend: &dyn VcsBackend) -> Result<Vec<CandidateSource>> {
    let root = backend
        .workdir()
        .context("Repository has no working directory")?
        .to_path_buf();

    let files = backend.tracked_files()?;
    Ok(files
        .into_iter()
        .map(|path| CandidateSource::WorkingTreeFile {
            root: root.clone(),
            path,
        })
        .collect())
}

/// Every regular file below `root`, sorted by name at each level
///
/// No ignore rules apply: hidden files and gitignored files are included.
/// Unreadable directory entries are logged and skipped.
pub fn walk_directory(root: &Path) -> Result<Vec<CandidateSource>> {
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut sources = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_file()) {
                    sources.push(CandidateSource::StandaloneFile {
                        path: entry.into_path(),
                    });
                }
            }
            Err(e) => {
                tracing::debug!("Walk error: {}", e);
            }
        }
    }

    tracing::debug!("Walked {} files under {}", sources.len(), root.display());
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walk_directory_is_recursive_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::write(root.join("z.txt"), "z").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b/nested/.env"), "SECRET=1").unwrap();

        let sources = walk_directory(root).unwrap();
        let paths: Vec<PathBuf> = sources
            .iter()
            .map(|s| s.display_path().strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b/nested/.env"),
                PathBuf::from("z.txt"),
            ]
        );
    }

    #[test]
    fn test_walk_directory_is_repeatable() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["c", "a", "b"] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }

        let first = walk_directory(temp_dir.path()).unwrap();
        let second = walk_directory(temp_dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_walk_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(walk_directory(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_read_text_drops_invalid_bytes() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("mixed.bin"), b"pass\xffword\n").unwrap();

        let source = CandidateSource::WorkingTreeFile {
            root: temp_dir.path().to_path_buf(),
            path: PathBuf::from("mixed.bin"),
        };
        assert_eq!(source.display_path(), Path::new("mixed.bin"));
        assert_eq!(source.read_text().unwrap(), "password\n");
    }
}
