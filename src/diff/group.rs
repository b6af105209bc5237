//! Partitioning of pending changes by owning repository.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::change::{Change, RepositoryResolver};

/// Changes bucketed by repository root, in deterministic root order.
///
/// A `BTreeMap` rather than a hash map so multi-repository diff output has
/// a stable block order (lexicographic by root path).
pub type ChangeGroups = BTreeMap<PathBuf, Vec<Change>>;

/// Partition `changes` by owning repository.
///
/// Each change is resolved independently; changes that resolve to no
/// repository are dropped, never merged into another bucket. Within a
/// bucket, changes keep their relative input order. An empty input yields
/// empty groups.
pub fn group_by_repository(
    changes: Vec<Change>,
    resolver: &dyn RepositoryResolver,
) -> ChangeGroups {
    let mut groups = ChangeGroups::new();
    for change in changes {
        if let Some(root) = resolver.resolve(&change) {
            groups.entry(root).or_default().push(change);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;
    use std::path::Path;

    /// Resolver that maps paths by prefix, for tests that need no real
    /// repositories on disk.
    struct PrefixResolver {
        roots: Vec<PathBuf>,
    }

    impl RepositoryResolver for PrefixResolver {
        fn resolve(&self, change: &Change) -> Option<PathBuf> {
            self.roots
                .iter()
                .find(|root| change.path.starts_with(root))
                .cloned()
        }
    }

    fn change(path: &str) -> Change {
        Change::new(Path::new(path), ChangeKind::Modified)
    }

    #[test]
    fn test_every_resolvable_change_lands_in_exactly_one_group() {
        let resolver = PrefixResolver {
            roots: vec![PathBuf::from("/ws/a"), PathBuf::from("/ws/b")],
        };
        let changes = vec![
            change("/ws/a/src/main.rs"),
            change("/ws/b/lib.rs"),
            change("/ws/a/README.md"),
        ];

        let groups = group_by_repository(changes, &resolver);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[Path::new("/ws/a")].len(), 2);
        assert_eq!(groups[Path::new("/ws/b")].len(), 1);
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_unresolvable_changes_are_dropped() {
        let resolver = PrefixResolver {
            roots: vec![PathBuf::from("/ws/a")],
        };
        let changes = vec![change("/ws/a/src/main.rs"), change("/elsewhere/file.rs")];

        let groups = group_by_repository(changes, &resolver);

        assert_eq!(groups.len(), 1);
        assert!(
            groups
                .values()
                .flatten()
                .all(|c| c.path.starts_with("/ws/a"))
        );
    }

    #[test]
    fn test_bucket_preserves_input_order() {
        let resolver = PrefixResolver {
            roots: vec![PathBuf::from("/ws/a")],
        };
        let changes = vec![
            change("/ws/a/z.rs"),
            change("/ws/a/a.rs"),
            change("/ws/a/m.rs"),
        ];

        let groups = group_by_repository(changes, &resolver);

        let paths: Vec<_> = groups[Path::new("/ws/a")]
            .iter()
            .map(|c| c.path.clone())
            .collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/ws/a/z.rs"),
                PathBuf::from("/ws/a/a.rs"),
                PathBuf::from("/ws/a/m.rs"),
            ]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_groups() {
        let resolver = PrefixResolver { roots: vec![] };
        let groups = group_by_repository(Vec::new(), &resolver);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_all_unresolvable_yields_empty_groups() {
        let resolver = PrefixResolver { roots: vec![] };
        let changes = vec![change("/nowhere/a.rs"), change("/nowhere/b.rs")];
        let groups = group_by_repository(changes, &resolver);
        assert!(groups.is_empty());
    }
}
