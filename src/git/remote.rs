use anyhow::{Context, Result};
use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::TempDir;

use super::GitRepo;

/// Whether the target names a remote repository rather than a local path
pub fn is_remote_url(target: &str) -> bool {
    ["http://", "https://", "git@", "ssh://"]
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

/// Temporary directory a remote repository is cloned into
///
/// [`Workspace::close`] removes the directory and reports failure. If the
/// workspace is dropped without being closed, the directory is still removed
/// on a best-effort basis.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn acquire() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("pickaxe-")
            .tempdir()
            .context("Failed to create temporary workspace")?;
        tracing::info!("Created temporary workspace: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Delete the workspace directory
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        tracing::info!("Deleting temporary workspace: {}", path.display());
        self.dir
            .close()
            .with_context(|| format!("Failed to delete temporary workspace {}", path.display()))
    }
}

impl GitRepo {
    /// Clone `url` into `dest` and open the result
    ///
    /// The transfer is aborted once `interrupted` is set.
    pub fn clone_into(url: &str, dest: &Path, interrupted: &AtomicBool) -> Result<Self> {
        tracing::info!("Cloning {} into {}", url, dest.display());

        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(|_| !interrupted.load(Ordering::Relaxed));
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let repo = RepoBuilder::new()
            .fetch_options(fetch_options)
            .clone(url, dest)
            .with_context(|| format!("Failed to clone repository '{url}'"))?;
        Ok(GitRepo { repo })
    }
}
