//! Search scopes and scope arithmetic.
//!
//! A [`SearchScope`] restricts which files symbol lookups and text scans
//! consider. Scopes compose by intersection: the reverse search intersects
//! the remote-link annotation's use scope with whatever the caller supplied.
//!
//! ```
//! use remotelink_core::model::FileId;
//! use remotelink_core::scope::SearchScope;
//!
//! let user = SearchScope::files([FileId(1), FileId(2)]);
//! let narrowed = SearchScope::Everything.intersect_with(&user);
//! assert!(narrowed.contains(FileId(1)));
//! assert!(!narrowed.contains(FileId(3)));
//! assert!(SearchScope::empty().intersect_with(&user).is_empty());
//! ```

use std::collections::BTreeSet;

use crate::model::FileId;

/// A set of files to search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Every file the index knows, including libraries.
    #[default]
    Everything,
    /// Exactly these files.
    Files(BTreeSet<FileId>),
}

impl SearchScope {
    /// The scope that contains nothing.
    pub fn empty() -> Self {
        SearchScope::Files(BTreeSet::new())
    }

    /// A scope of the given files.
    pub fn files(files: impl IntoIterator<Item = FileId>) -> Self {
        SearchScope::Files(files.into_iter().collect())
    }

    /// Whether the scope contains no files at all.
    pub fn is_empty(&self) -> bool {
        match self {
            SearchScope::Everything => false,
            SearchScope::Files(files) => files.is_empty(),
        }
    }

    /// Whether `file` is inside this scope.
    pub fn contains(&self, file: FileId) -> bool {
        match self {
            SearchScope::Everything => true,
            SearchScope::Files(files) => files.contains(&file),
        }
    }

    /// Files common to both scopes.
    pub fn intersect_with(&self, other: &SearchScope) -> SearchScope {
        match (self, other) {
            (SearchScope::Everything, other) => other.clone(),
            (this, SearchScope::Everything) => this.clone(),
            (SearchScope::Files(a), SearchScope::Files(b)) => {
                SearchScope::Files(a.intersection(b).copied().collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everything_is_identity_for_intersection() {
        let files = SearchScope::files([FileId(1)]);
        assert_eq!(SearchScope::Everything.intersect_with(&files), files);
        assert_eq!(files.intersect_with(&SearchScope::Everything), files);
        assert_eq!(
            SearchScope::Everything.intersect_with(&SearchScope::Everything),
            SearchScope::Everything
        );
    }

    #[test]
    fn file_sets_intersect() {
        let a = SearchScope::files([FileId(1), FileId(2), FileId(3)]);
        let b = SearchScope::files([FileId(2), FileId(3), FileId(4)]);
        assert_eq!(a.intersect_with(&b), SearchScope::files([FileId(2), FileId(3)]));
    }

    #[test]
    fn empty_scope_contains_nothing() {
        let empty = SearchScope::empty();
        assert!(empty.is_empty());
        assert!(!empty.contains(FileId(0)));
        assert!(!SearchScope::Everything.is_empty());
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let a = SearchScope::files([FileId(1)]);
        let b = SearchScope::files([FileId(2)]);
        assert!(a.intersect_with(&b).is_empty());
    }
}
