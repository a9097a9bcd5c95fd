//! Reverse usage search: implementation method → remote interface declarations.
//!
//! When a host runs "find usages" on a public method of an implementation
//! class, [`process_query`] contributes one [`SyntheticReference`] per remote
//! interface method that links to it. The reference sits on the word found
//! in the interface method's name or body, so the interface declaration
//! shows up as a usage.
//!
//! ## Query Pipeline
//!
//! 1. **Gate**: private, protected or package-private targets, annotated
//!    owners, test or library owners and stale symbols produce an empty
//!    search scope.
//! 2. **Scope**: the annotation type's use scope intersected with the scope
//!    the user chose.
//! 3. **Scan**: whole-word code occurrences of the target's name.
//! 4. **Filter**: each occurrence must sit in the name or body of a
//!    same-arity method of an annotated interface whose remote class the
//!    target's owner inherits.
//!
//! A stale symbol met during filtering discards that occurrence only.

use tracing::{debug, trace};

use crate::index::{CodeIndex, TextOccurrence, UsageContext};
use crate::model::{FileId, MethodId, MethodSymbol, Span};
use crate::resolver::{has_remote_annotation, resolve_remote_class, REMOTE_ANNOTATION_FQN};
use crate::scope::SearchScope;

// ============================================================================
// Types
// ============================================================================

/// Parameters of one usage search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    /// The method whose usages are searched.
    pub method: MethodId,
    /// The scope the user restricted the search to.
    pub scope_determined_by_user: SearchScope,
}

impl SearchParameters {
    /// Search `method` everywhere.
    pub fn new(method: MethodId) -> Self {
        SearchParameters {
            method,
            scope_determined_by_user: SearchScope::Everything,
        }
    }

    /// Restrict the search to `scope`.
    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope_determined_by_user = scope;
        self
    }
}

/// A reference that exists only through the remote-link annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyntheticReference {
    /// File holding the interface method declaration.
    pub file_id: FileId,
    /// Span of the element the reference is anchored to.
    pub element_span: Span,
    /// Referenced range, relative to `element_span.start`.
    pub range_in_element: Span,
    /// The innermost interface method whose declaration holds the word.
    pub source_method: MethodId,
    /// The implementation method being referenced.
    pub target: MethodId,
}

impl SyntheticReference {
    /// Absolute byte span of the referenced range.
    pub fn span(&self) -> Span {
        Span::new(
            self.element_span.start + self.range_in_element.start,
            self.element_span.start + self.range_in_element.end,
        )
    }
}

// ============================================================================
// Query
// ============================================================================

/// Search scope for a query, after the eligibility gate and narrowing.
///
/// Empty when the target can never be reached through a remote link.
pub fn effective_search_scope(index: &dyn CodeIndex, params: &SearchParameters) -> SearchScope {
    let Some(target) = index.method(params.method) else {
        debug!(method = %params.method, "search target is stale");
        return SearchScope::empty();
    };
    if !target.visibility.is_public() {
        debug!(
            method = %target.name,
            visibility = target.visibility.as_str(),
            "search target not public"
        );
        return SearchScope::empty();
    }
    let Some(owner) = index.class(target.owning_class) else {
        debug!(method = %target.name, "search target owner is stale");
        return SearchScope::empty();
    };
    if has_remote_annotation(owner) {
        debug!(class = %owner.qualified_name, "search target owner is itself a remote interface");
        return SearchScope::empty();
    }
    let Some(file) = owner.file_id else {
        debug!(class = %owner.qualified_name, "search target owner has no source file");
        return SearchScope::empty();
    };
    if index.is_test_source(file) || index.is_library_source(file) {
        debug!(class = %owner.qualified_name, "search target owner is test or library code");
        return SearchScope::empty();
    }
    let Some(annotation_class) = index.find_class(REMOTE_ANNOTATION_FQN, &index.all_scope()) else {
        debug!("remote-link annotation type is not indexed");
        return SearchScope::empty();
    };

    index
        .use_scope(annotation_class)
        .intersect_with(&params.scope_determined_by_user)
}

/// Feed every synthetic reference for `params` to `consumer`.
///
/// The consumer returns `false` to stop the query. Returns `false` if the
/// query was stopped early.
pub fn process_query<F>(index: &dyn CodeIndex, params: &SearchParameters, mut consumer: F) -> bool
where
    F: FnMut(SyntheticReference) -> bool,
{
    let scope = effective_search_scope(index, params);
    if scope.is_empty() {
        return true;
    }
    let Some(target) = index.method(params.method) else {
        return true;
    };

    let occurrences = index.scan_text_occurrences(&target.name, &scope, UsageContext::InCode);
    debug!(
        method = %target.name,
        occurrences = occurrences.len(),
        "scanning for remote-link references"
    );

    for occurrence in &occurrences {
        let Some(reference) = link_occurrence(index, params.method, target, occurrence) else {
            continue;
        };
        if !consumer(reference) {
            debug!(method = %target.name, "search stopped by consumer");
            return false;
        }
    }
    true
}

/// Collect every synthetic reference for `params`.
pub fn find_synthetic_references(
    index: &dyn CodeIndex,
    params: &SearchParameters,
) -> Vec<SyntheticReference> {
    let mut references = Vec::new();
    process_query(index, params, |reference| {
        references.push(reference);
        true
    });
    references
}

/// Turn one text occurrence into a reference, or reject it.
fn link_occurrence(
    index: &dyn CodeIndex,
    target_id: MethodId,
    target: &MethodSymbol,
    occurrence: &TextOccurrence,
) -> Option<SyntheticReference> {
    let Some(found_id) = occurrence.element.enclosing_method() else {
        trace!(offset = occurrence.offset(), "not inside a method");
        return None;
    };
    let Some(found) = index.method(found_id) else {
        trace!(method = %found_id, "occurrence method is stale");
        return None;
    };
    if found.parameter_count != target.parameter_count {
        trace!(method = %found.name, "parameter count differs");
        return None;
    }
    let Some(interface) = index.class(found.owning_class) else {
        trace!(method = %found.name, "occurrence class is stale");
        return None;
    };
    if !interface.is_interface || !has_remote_annotation(interface) {
        trace!(class = %interface.qualified_name, "not a remote interface");
        return None;
    }
    let Some(remote_class) = resolve_remote_class(index, interface.class_id) else {
        trace!(class = %interface.qualified_name, "remote class unresolved");
        return None;
    };
    // The target may have gone stale since the scan started.
    let target_owner = index.method(target_id)?.owning_class;
    if !index.is_inheritor_or_self(target_owner, remote_class) {
        trace!(class = %interface.qualified_name, "target class does not implement remote class");
        return None;
    }

    let start = occurrence.offset_in_element;
    Some(SyntheticReference {
        file_id: occurrence.file_id,
        element_span: occurrence.element_span,
        range_in_element: Span::new(start, start + target.name.len() as u64),
        source_method: found_id,
        target: target_id,
    })
}

// ============================================================================
// Tests
// ============================================================================
