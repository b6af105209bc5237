//! Pending file changes and repository ownership resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use git2::Repository;
use tracing::debug;

/// Kind of a pending file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Modified => write!(f, "Modified"),
            ChangeKind::Deleted => write!(f, "Deleted"),
            ChangeKind::Renamed => write!(f, "Renamed"),
        }
    }
}

/// One file-level modification pending commit.
///
/// A snapshot taken at invocation time; ownership is resolved lazily
/// through a [`RepositoryResolver`] rather than stored on the change.
#[derive(Debug, Clone)]
pub struct Change {
    /// Absolute path of the changed file.
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Resolves the repository that owns a change.
///
/// Returns the repository's working-directory root, or `None` when the
/// change belongs to no known repository. Lookups must be quick; callers
/// resolve every change of an invocation through one resolver instance.
pub trait RepositoryResolver: Send + Sync {
    fn resolve(&self, change: &Change) -> Option<PathBuf>;
}

/// Resolver backed by `git2::Repository::discover`, with a per-directory
/// cache so repeated lookups in the same tree stay cheap.
pub struct GitRepositoryResolver {
    cache: Mutex<BTreeMap<PathBuf, Option<PathBuf>>>,
}

impl GitRepositoryResolver {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    fn discover_root(dir: &Path) -> Option<PathBuf> {
        let repo = Repository::discover(dir).ok()?;
        repo.workdir().map(Path::to_path_buf)
    }
}

impl Default for GitRepositoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryResolver for GitRepositoryResolver {
    fn resolve(&self, change: &Change) -> Option<PathBuf> {
        // Deleted files no longer exist on disk, so discovery starts from
        // the containing directory rather than the file itself.
        let dir = change.path.parent()?.to_path_buf();

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(root) = cache.get(&dir) {
            return root.clone();
        }

        let root = Self::discover_root(&dir);
        if root.is_none() {
            debug!("No repository found for {}", change.path.display());
        }
        cache.insert(dir, root.clone());
        root
    }
}
