//! Temporary git repositories for integration tests

#![allow(dead_code)]

use git2::{IndexAddOption, Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A real repository in a temporary directory
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        Self { temp_dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write(&self, path: &str, content: impl AsRef<[u8]>) -> &Self {
        let full_path = self.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
        self
    }

    pub fn remove(&self, path: &str) -> &Self {
        fs::remove_file(self.path().join(path)).unwrap();
        self
    }

    /// Stage every change in the working tree and commit it on HEAD
    pub fn commit(&self, message: &str) -> Oid {
        let mut index = self.repo.index().unwrap();
        index.add_all(["*"], IndexAddOption::DEFAULT, None).unwrap();
        index.update_all(["*"], None).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let signature = Signature::now("Test User", "test@example.com").unwrap();
        let parent = self.repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    /// Point `refs/remotes/<name>` at `target`
    pub fn remote_branch(&self, name: &str, target: Oid) {
        self.repo
            .reference(&format!("refs/remotes/{name}"), target, true, "test remote")
            .unwrap();
    }

    /// Symbolic `refs/remotes/<remote>/HEAD` like a fresh clone has
    pub fn remote_head(&self, remote: &str, branch: &str) {
        self.repo
            .reference_symbolic(
                &format!("refs/remotes/{remote}/HEAD"),
                &format!("refs/remotes/{remote}/{branch}"),
                true,
                "test remote head",
            )
            .unwrap();
    }
}
