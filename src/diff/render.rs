//! Unified-diff rendering for one repository's changes using git2.

use std::path::{Path, PathBuf};

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};

use crate::change::Change;
use crate::error::DiffError;

/// A repository header line followed by the unified-diff text for that
/// repository's pending changes.
#[derive(Debug, Clone)]
pub struct DiffBlock {
    pub root: PathBuf,
    pub text: String,
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(DiffError)` for real
/// errors (corrupt HEAD, permission issues, missing objects).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, DiffError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(DiffError::HeadResolve(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(DiffError::HeadResolve)?;
    Ok(Some(tree))
}

/// Render the unified diff for one repository group.
///
/// Emits a `Repository: <root>` header line, then the staged
/// (`diff_tree_to_index`) and unstaged/untracked (`diff_index_to_workdir`)
/// patches restricted by pathspec to the group's changes. Binary files show
/// up as the diff engine's standard `Binary files ... differ` entries.
///
/// Any failure while computing or printing the diff is fatal for the whole
/// invocation and propagates as [`DiffError`]; per-file failures are not
/// skipped. Callers never pass an empty group (filtered upstream by the
/// grouper).
pub fn render_repository_diff(root: &Path, changes: &[Change]) -> Result<DiffBlock, DiffError> {
    let repo = Repository::open(root).map_err(|e| DiffError::OpenRepository {
        path: root.display().to_string(),
        source: e,
    })?;
    let head_tree = resolve_head_tree(&repo)?;

    let mut staged_opts = DiffOptions::new();
    for spec in pathspecs(root, changes) {
        staged_opts.pathspec(spec);
    }
    let staged = repo
        .diff_tree_to_index(head_tree.as_ref(), None, Some(&mut staged_opts))
        .map_err(DiffError::DiffFailed)?;

    let mut unstaged_opts = DiffOptions::new();
    unstaged_opts
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .show_untracked_content(true);
    for spec in pathspecs(root, changes) {
        unstaged_opts.pathspec(spec);
    }
    let unstaged = repo
        .diff_index_to_workdir(None, Some(&mut unstaged_opts))
        .map_err(DiffError::DiffFailed)?;

    let mut text = format!("Repository: {}\n", root.display());
    append_patch_text(&staged, &mut text)?;
    append_patch_text(&unstaged, &mut text)?;

    Ok(DiffBlock {
        root: root.to_path_buf(),
        text,
    })
}

/// Repository-relative pathspecs for the group's changes.
fn pathspecs<'a>(root: &'a Path, changes: &'a [Change]) -> impl Iterator<Item = &'a Path> {
    changes
        .iter()
        .map(move |change| change.path.strip_prefix(root).unwrap_or(&change.path))
}

/// Append unified diff text from a diff object, with `\n` line separators.
fn append_patch_text(diff: &Diff<'_>, text: &mut String) -> Result<(), DiffError> {
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        // Include the origin character for context
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
        true
    })
    .map_err(DiffError::PatchRender)
}
