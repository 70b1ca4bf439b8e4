use anyhow::{Context, Result};
use git2::{BranchType, ErrorCode, Oid};
use std::path::PathBuf;

use super::{GitRepo, RemoteRef};
use crate::shared::decode_lossy;

impl GitRepo {
    /// List files tracked by the index, in index (path) order
    pub fn get_tracked_files(&self) -> Result<Vec<PathBuf>> {
        let index = self.repo.index().context("Failed to read repository index")?;

        let mut files: Vec<PathBuf> = index
            .iter()
            .map(|entry| PathBuf::from(decode_lossy(&entry.path)))
            .collect();

        // Conflicted paths appear once per stage
        files.dedup();

        tracing::debug!("Index lists {} tracked files", files.len());
        Ok(files)
    }

    /// Commit HEAD points at, or `None` on an unborn branch
    pub fn get_head_revision(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) => Ok(head.target().map(|oid| oid.to_string())),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => Ok(None),
            Err(e) => Err(e).context("Failed to resolve HEAD"),
        }
    }

    /// Remote-tracking branches sorted by name, skipping symbolic refs like `origin/HEAD`
    pub fn get_remote_tracking_refs(&self) -> Result<Vec<RemoteRef>> {
        let mut refs = Vec::new();

        let branches = self
            .repo
            .branches(Some(BranchType::Remote))
            .context("Failed to list remote-tracking branches")?;

        for branch in branches {
            let (branch, _) = branch?;
            let Ok(Some(name)) = branch.name() else {
                continue;
            };
            if name.ends_with("/HEAD") {
                continue;
            }
            let Some(target) = branch.get().target() else {
                continue;
            };
            refs.push(RemoteRef {
                name: name.to_string(),
                target: target.to_string(),
            });
        }

        refs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(refs)
    }

    /// Raw bytes of the blob with the given id
    pub fn blob_content(&self, id: &str) -> Result<Vec<u8>> {
        let oid = Oid::from_str(id).with_context(|| format!("Invalid blob id: {id}"))?;
        let blob = self
            .repo
            .find_blob(oid)
            .with_context(|| format!("Failed to read blob {id}"))?;
        Ok(blob.content().to_vec())
    }
}
