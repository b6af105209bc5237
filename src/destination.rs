//! Commit-message write-back destinations.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

/// A writable commit-message field.
///
/// `set_text` must be invoked only from the caller's primary execution
/// context, after the backend request has completed.
pub trait MessageDestination: Send {
    fn set_text(&mut self, text: &str);
}

/// Destination backed by a commit-message file, typically the repository's
/// `.git/COMMIT_EDITMSG`.
pub struct CommitMessageFile {
    path: PathBuf,
}

impl CommitMessageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl MessageDestination for CommitMessageFile {
    fn set_text(&mut self, text: &str) {
        // The generated message is also printed by the caller, so a failed
        // write must not abort the invocation.
        if let Err(e) = fs::write(&self.path, text) {
            warn!("Failed to write commit message to {}: {e}", self.path.display());
        }
    }
}
