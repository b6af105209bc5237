//! Workspace scanning: repository discovery and pending-change enumeration.

use std::path::{Path, PathBuf};

use git2::{Repository, Status, StatusOptions};
use walkdir::WalkDir;

use crate::change::{Change, ChangeKind};
use crate::error::DiffError;

/// Find repository roots at `root` and among its direct children.
pub fn discover_repositories(root: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for entry in WalkDir::new(root)
        .max_depth(2)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.file_name() == ".git"
            && let Some(parent) = entry.path().parent()
        {
            roots.push(parent.to_path_buf());
        }
    }
    roots.sort();
    roots
}

/// Enumerate pending changes (staged + unstaged + untracked) for the given
/// repository roots, as absolute paths.
pub fn collect_pending_changes(roots: &[PathBuf]) -> Result<Vec<Change>, DiffError> {
    let mut changes = Vec::new();
    for root in roots {
        let repo = Repository::open(root).map_err(|e| DiffError::OpenRepository {
            path: root.display().to_string(),
            source: e,
        })?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(DiffError::StatusFailed)?;

        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            // Untracked directory entries (e.g. nested repositories) are
            // not file changes.
            if path.ends_with('/') {
                continue;
            }
            changes.push(Change::new(root.join(path), kind_for_status(entry.status())));
        }
    }
    Ok(changes)
}

fn kind_for_status(status: Status) -> ChangeKind {
    if status.contains(Status::INDEX_NEW) || status.contains(Status::WT_NEW) {
        ChangeKind::Added
    } else if status.contains(Status::INDEX_DELETED) || status.contains(Status::WT_DELETED) {
        ChangeKind::Deleted
    } else if status.contains(Status::INDEX_RENAMED) || status.contains(Status::WT_RENAMED) {
        ChangeKind::Renamed
    } else {
        ChangeKind::Modified
    }
}

/// Keep only changes at or under one of the selected paths. An empty
/// selection keeps everything.
pub fn filter_to_selection(changes: Vec<Change>, selections: &[PathBuf]) -> Vec<Change> {
    if selections.is_empty() {
        return changes;
    }
    changes
        .into_iter()
        .filter(|change| selections.iter().any(|sel| change.path.starts_with(sel)))
        .collect()
}
