//! Workspace diff assembly: grouping, per-repository rendering, aggregation.

pub mod group;
pub mod render;

pub use group::{ChangeGroups, group_by_repository};
pub use render::{DiffBlock, render_repository_diff};

use crate::change::{Change, RepositoryResolver};
use crate::error::DiffError;

/// Concatenate per-repository diff blocks into one prompt body.
///
/// Blocks are joined with a single `\n` between them, no separator after
/// the last, no trimming. Zero blocks yields the empty string, which is
/// the empty-diff condition consumed by the orchestrator.
pub fn aggregate_blocks(blocks: &[DiffBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the aggregated unified diff for the selected changes.
///
/// Groups changes by owning repository, renders one block per non-empty
/// group, and joins the blocks. Unresolvable changes are dropped by the
/// grouper; a diff failure in any repository aborts the whole build.
pub fn build_workspace_diff(
    changes: Vec<Change>,
    resolver: &dyn RepositoryResolver,
) -> Result<String, DiffError> {
    let groups = group_by_repository(changes, resolver);

    let mut blocks = Vec::with_capacity(groups.len());
    for (root, group) in &groups {
        blocks.push(render_repository_diff(root, group)?);
    }

    Ok(aggregate_blocks(&blocks))
}
