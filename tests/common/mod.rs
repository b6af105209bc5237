//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Repository, Signature};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new git repository with an initial empty commit, in a temp
    /// directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let sig = Self::test_signature();
            let tree_id = repo
                .index()
                .expect("Failed to get index")
                .write_tree()
                .expect("Failed to write tree");
            let tree = repo.find_tree(tree_id).expect("Failed to find tree");
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .expect("Failed to create initial commit");
        }
        Self { dir, repo }
    }

    fn test_signature() -> Signature<'static> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file into the working tree without staging it.
    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.root().join(name), content).expect("Failed to write test file");
    }

    /// Stage a file that already exists in the working tree.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new(name))
            .expect("Failed to add file to index");
        index.write().expect("Failed to write index");
    }

    /// Write, stage, and commit a file.
    pub fn commit_file(&self, name: &str, content: &str) {
        self.write_file(name, content);
        self.stage(name);

        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let sig = Self::test_signature();
        let parent = self
            .repo
            .head()
            .expect("Failed to get HEAD")
            .peel_to_commit()
            .expect("Failed to peel HEAD to commit");
        self.repo
            .commit(Some("HEAD"), &sig, &sig, &format!("add {name}"), &tree, &[&parent])
            .expect("Failed to create commit");
    }
}
