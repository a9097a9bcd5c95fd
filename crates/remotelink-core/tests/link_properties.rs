//! Behavioral tests for remote-link resolution, navigation and usage search.
//!
//! Every test runs against the sample model in `support`, loaded through the
//! snapshot format.

mod support;

use std::cell::Cell;

use remotelink_core::index::{CodeIndex, TextOccurrence, UsageContext};
use remotelink_core::matcher::find_matches;
use remotelink_core::model::{
    AttributeValue, ClassId, ClassSymbol, FileId, MethodId, MethodSymbol, SourceFile, Visibility,
};
use remotelink_core::navigation::{collect_navigation_markers_in_file, navigation_targets};
use remotelink_core::resolver::{
    resolve_remote_class, REMOTE_ANNOTATION_ATTRIBUTE, REMOTE_ANNOTATION_FQN,
};
use remotelink_core::search::{find_synthetic_references, process_query, SearchParameters};
use remotelink_core::snapshot::ModelSnapshot;
use remotelink_core::{InMemoryIndex, SearchScope};

use serde_json::json;
use support::{method, method_with, sample_index, text_at, REMOTE_TEXT};

fn class_id(index: &InMemoryIndex, name: &str) -> ClassId {
    index
        .class_by_name(name)
        .unwrap_or_else(|| panic!("class {} is indexed", name))
        .class_id
}

// ============================================================================
// Link Resolution
// ============================================================================

#[test]
fn annotated_interface_resolves_to_named_class() {
    let index = sample_index();
    let api = class_id(&index, "pkg.Api");
    assert_eq!(resolve_remote_class(&index, api), Some(class_id(&index, "pkg.Impl")));
}

#[test]
fn missing_or_non_literal_target_resolves_to_nothing() {
    let mut index = sample_index();
    let api = class_id(&index, "pkg.Api");

    index.set_annotation_attribute(
        api,
        REMOTE_ANNOTATION_FQN,
        REMOTE_ANNOTATION_ATTRIBUTE,
        AttributeValue::String("pkg.Gone".to_string()),
    );
    assert_eq!(resolve_remote_class(&index, api), None);

    index.set_annotation_attribute(
        api,
        REMOTE_ANNOTATION_FQN,
        REMOTE_ANNOTATION_ATTRIBUTE,
        AttributeValue::Expression("Names.IMPL".to_string()),
    );
    assert_eq!(resolve_remote_class(&index, api), None);
}

#[test]
fn unannotated_class_resolves_to_nothing() {
    let index = sample_index();
    assert_eq!(resolve_remote_class(&index, class_id(&index, "pkg.Impl")), None);
}

// ============================================================================
// Method Matching
// ============================================================================

#[test]
fn matching_keeps_only_public_same_arity_methods() {
    let index = sample_index();
    let api_op = method(&index, "pkg.Api", "op", 1);
    let impl_op = method(&index, "pkg.Impl", "op", 1);

    let matches = find_matches(&index, api_op, class_id(&index, "pkg.Impl"));
    assert_eq!(matches, vec![impl_op], "only the public op(int) qualifies");
}

#[test]
fn navigation_follows_the_link() {
    let index = sample_index();
    let api_op = method(&index, "pkg.Api", "op", 1);
    let impl_op = method(&index, "pkg.Impl", "op", 1);
    assert_eq!(navigation_targets(&index, api_op), vec![impl_op]);

    // ping(int) only has a protected counterpart.
    let api_ping = method(&index, "pkg.Api", "ping", 1);
    assert!(navigation_targets(&index, api_ping).is_empty());
}

#[test]
fn gutter_pass_marks_navigable_methods() {
    let index = sample_index();
    let api_file = index.file_by_path("src/pkg/Api.java").unwrap().file_id;
    let markers = collect_navigation_markers_in_file(&index, api_file);
    assert_eq!(markers.len(), 1);
    let marker = &markers[0];
    assert_eq!(
        text_at(&index, "src/pkg/Api.java", marker.span.start, marker.span.end),
        "op"
    );

    let impl_file = index.file_by_path("src/pkg/Impl.java").unwrap().file_id;
    assert!(collect_navigation_markers_in_file(&index, impl_file).is_empty());
}

// ============================================================================
// Usage Search
// ============================================================================

#[test]
fn usage_search_finds_interface_declaration() {
    let index = sample_index();
    let impl_op = method(&index, "pkg.Impl", "op", 1);
    let api_op = method(&index, "pkg.Api", "op", 1);

    let refs = find_synthetic_references(&index, &SearchParameters::new(impl_op));
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].source_method, api_op);
    assert_eq!(refs[0].target, impl_op);
    let span = refs[0].span();
    assert_eq!(text_at(&index, "src/pkg/Api.java", span.start, span.end), "op");
}

#[test]
fn call_in_default_method_body_is_a_synthetic_reference() {
    let caller = concat!(
        "package pkg;\n\n@Remote(\"pkg.Impl\")\n",
        "interface Api {\n  default void call(int a) { op(a); }\n}\n"
    );
    let implementation = "package pkg;\n\npublic class Impl {\n  public void op(int a) {}\n}\n";
    let snapshot: ModelSnapshot = serde_json::from_value(json!({
        "files": [
            {
                "path": "lib/Remote.java",
                "package": "com.intellij.driver.client",
                "origin": "library",
                "text": REMOTE_TEXT,
                "classes": [{
                    "name": "com.intellij.driver.client.Remote",
                    "methods": [{ "name": "value", "abstract": true }]
                }]
            },
            {
                "path": "src/pkg/Api.java",
                "package": "pkg",
                "text": caller,
                "classes": [{
                    "name": "pkg.Api",
                    "interface": true,
                    "annotations": [{
                        "name": "com.intellij.driver.client.Remote",
                        "attributes": { "value": { "string": "pkg.Impl" } }
                    }],
                    "methods": [{ "name": "call", "parameters": 1 }]
                }]
            },
            {
                "path": "src/pkg/Impl.java",
                "package": "pkg",
                "text": implementation,
                "classes": [{
                    "name": "pkg.Impl",
                    "methods": [{ "name": "op", "parameters": 1 }]
                }]
            }
        ]
    }))
    .unwrap();
    let index = snapshot.to_index().unwrap();
    let call = method(&index, "pkg.Api", "call", 1);
    let impl_op = method(&index, "pkg.Impl", "op", 1);

    let refs = find_synthetic_references(&index, &SearchParameters::new(impl_op));
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].source_method, call);
    let span = refs[0].span();
    assert_eq!(span.start, caller.find("op(a)").unwrap() as u64);
    assert_eq!(text_at(&index, "src/pkg/Api.java", span.start, span.end), "op");
}

#[test]
fn annotated_owner_gets_no_synthetic_references() {
    let index = sample_index();
    let api_op = method(&index, "pkg.Api", "op", 1);
    assert!(find_synthetic_references(&index, &SearchParameters::new(api_op)).is_empty());
}

#[test]
fn private_and_protected_targets_get_no_synthetic_references() {
    let index = sample_index();
    let private_op = method_with(&index, "pkg.Impl", "op", 1, Visibility::Private);
    let protected_ping = method_with(&index, "pkg.Impl", "ping", 1, Visibility::Protected);

    assert!(find_synthetic_references(&index, &SearchParameters::new(private_op)).is_empty());
    assert!(find_synthetic_references(&index, &SearchParameters::new(protected_ping)).is_empty());
}

#[test]
fn test_sources_get_no_synthetic_references() {
    let index = sample_index();
    let test_op = method(&index, "pkg.ImplTest", "op", 1);
    assert!(find_synthetic_references(&index, &SearchParameters::new(test_op)).is_empty());
}

#[test]
fn inheritors_of_the_remote_class_are_linked() {
    let index = sample_index();
    let base_api_run = method(&index, "pkg.BaseApi", "run", 1);

    for class in ["pkg.Base", "pkg.Derived"] {
        let run = method(&index, class, "run", 1);
        let refs = find_synthetic_references(&index, &SearchParameters::new(run));
        assert_eq!(refs.len(), 1, "{} inherits the remote class", class);
        assert_eq!(refs[0].source_method, base_api_run);
    }

    let other_run = method(&index, "pkg.Other", "run", 1);
    assert!(
        find_synthetic_references(&index, &SearchParameters::new(other_run)).is_empty(),
        "unrelated class must not be linked"
    );
}

#[test]
fn user_scope_limits_usage_search() {
    let index = sample_index();
    let impl_op = method(&index, "pkg.Impl", "op", 1);
    let impl_file = index.file_by_path("src/pkg/Impl.java").unwrap().file_id;
    let params = SearchParameters::new(impl_op).with_scope(SearchScope::files([impl_file]));
    assert!(find_synthetic_references(&index, &params).is_empty());
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn repeated_queries_return_identical_results() {
    let index = sample_index();
    let api_op = method(&index, "pkg.Api", "op", 1);
    let derived_run = method(&index, "pkg.Derived", "run", 1);

    let targets = navigation_targets(&index, api_op);
    let refs = find_synthetic_references(&index, &SearchParameters::new(derived_run));
    for _ in 0..5 {
        assert_eq!(navigation_targets(&index, api_op), targets);
        assert_eq!(
            find_synthetic_references(&index, &SearchParameters::new(derived_run)),
            refs
        );
    }
}

#[test]
fn annotation_edits_are_seen_immediately() {
    let mut index = sample_index();
    let api = class_id(&index, "pkg.Api");
    let api_op = method(&index, "pkg.Api", "op", 1);
    assert_eq!(navigation_targets(&index, api_op).len(), 1);

    index.set_annotation_attribute(
        api,
        REMOTE_ANNOTATION_FQN,
        REMOTE_ANNOTATION_ATTRIBUTE,
        AttributeValue::String("pkg.Other".to_string()),
    );
    assert!(navigation_targets(&index, api_op).is_empty());
}

// ============================================================================
// Staleness
// ============================================================================

/// An index whose `victim` class disappears after a number of lookups,
/// simulating an edit landing while a query is in flight.
struct VanishingIndex<'a> {
    inner: &'a InMemoryIndex,
    victim: ClassId,
    lookups_left: Cell<usize>,
}

impl<'a> VanishingIndex<'a> {
    fn new(inner: &'a InMemoryIndex, victim: ClassId, lookups: usize) -> Self {
        VanishingIndex {
            inner,
            victim,
            lookups_left: Cell::new(lookups),
        }
    }

    /// Count one lookup and report whether the victim is gone.
    fn gone(&self) -> bool {
        let left = self.lookups_left.get();
        if left == 0 {
            return true;
        }
        self.lookups_left.set(left - 1);
        false
    }

    fn hides_class(&self, class: ClassId) -> bool {
        self.gone() && class == self.victim
    }

    fn hides_method(&self, method: MethodId) -> bool {
        self.gone()
            && self
                .inner
                .method(method)
                .is_some_and(|m| m.owning_class == self.victim)
    }
}

impl CodeIndex for VanishingIndex<'_> {
    fn find_class(&self, qualified_name: &str, scope: &SearchScope) -> Option<ClassId> {
        let id = self.inner.find_class(qualified_name, scope)?;
        (!self.hides_class(id)).then_some(id)
    }

    fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        if self.hides_class(id) {
            return None;
        }
        self.inner.class(id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        if self.hides_method(id) {
            return None;
        }
        self.inner.method(id)
    }

    fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.inner.file(id)
    }

    fn all_methods(&self, class: ClassId) -> Vec<MethodId> {
        if self.hides_class(class) {
            return Vec::new();
        }
        self.inner.all_methods(class)
    }

    fn methods_in_file(&self, file: FileId) -> Vec<MethodId> {
        self.inner.methods_in_file(file)
    }

    fn is_inheritor_or_self(&self, candidate: ClassId, base: ClassId) -> bool {
        if self.hides_class(candidate) || self.hides_class(base) {
            return false;
        }
        self.inner.is_inheritor_or_self(candidate, base)
    }

    fn is_test_source(&self, file: FileId) -> bool {
        self.inner.is_test_source(file)
    }

    fn is_library_source(&self, file: FileId) -> bool {
        self.inner.is_library_source(file)
    }

    fn use_scope(&self, class: ClassId) -> SearchScope {
        if self.hides_class(class) {
            return SearchScope::empty();
        }
        self.inner.use_scope(class)
    }

    fn scan_text_occurrences(
        &self,
        word: &str,
        scope: &SearchScope,
        context: UsageContext,
    ) -> Vec<TextOccurrence> {
        self.inner.scan_text_occurrences(word, scope, context)
    }
}

#[test]
fn vanishing_remote_class_empties_navigation() {
    let index = sample_index();
    let api_op = method(&index, "pkg.Api", "op", 1);
    let full = navigation_targets(&index, api_op);
    assert_eq!(full.len(), 1);

    let impl_class = class_id(&index, "pkg.Impl");
    let mut saw_empty = false;
    for lookups in 0..64 {
        let vanishing = VanishingIndex::new(&index, impl_class, lookups);
        let targets = navigation_targets(&vanishing, api_op);
        assert!(
            targets.is_empty() || targets == full,
            "partial result after {} lookups: {:?}",
            lookups,
            targets
        );
        saw_empty |= targets.is_empty();
    }
    assert!(saw_empty);
}

#[test]
fn vanishing_remote_class_after_enumeration_empties_navigation() {
    // Leaf declares nothing, so every target is inherited from Root and stays
    // readable after Leaf itself is gone.
    let index = sample_index();
    let work = method(&index, "pkg.LeafApi", "work", 1);
    let full = navigation_targets(&index, work);
    assert_eq!(full.len(), 2);

    let leaf = class_id(&index, "pkg.Leaf");
    let mut saw_empty = false;
    for lookups in 0..64 {
        let vanishing = VanishingIndex::new(&index, leaf, lookups);
        let targets = navigation_targets(&vanishing, work);
        assert!(
            targets.is_empty() || targets == full,
            "partial result after {} lookups: {:?}",
            lookups,
            targets
        );
        saw_empty |= targets.is_empty();
    }
    assert!(saw_empty);
}

#[test]
fn vanishing_interface_empties_navigation_and_search() {
    let index = sample_index();
    let leaf_api = class_id(&index, "pkg.LeafApi");
    let work = method(&index, "pkg.LeafApi", "work", 1);
    let full = navigation_targets(&index, work);
    assert_eq!(full.len(), 2);

    let mut saw_empty = false;
    for lookups in 0..64 {
        let vanishing = VanishingIndex::new(&index, leaf_api, lookups);
        let targets = navigation_targets(&vanishing, work);
        assert!(
            targets.is_empty() || targets == full,
            "partial result after {} lookups: {:?}",
            lookups,
            targets
        );
        saw_empty |= targets.is_empty();
    }
    assert!(saw_empty);

    let api = class_id(&index, "pkg.Api");
    let impl_op = method(&index, "pkg.Impl", "op", 1);
    let params = SearchParameters::new(impl_op);
    let full_refs = find_synthetic_references(&index, &params);
    assert_eq!(full_refs.len(), 1);
    for lookups in 0..64 {
        let vanishing = VanishingIndex::new(&index, api, lookups);
        let refs = find_synthetic_references(&vanishing, &params);
        assert!(refs.is_empty() || refs == full_refs);
    }

    let gone_at_once = VanishingIndex::new(&index, api, 0);
    let api_op = method(&index, "pkg.Api", "op", 1);
    assert!(navigation_targets(&gone_at_once, api_op).is_empty());
    assert!(find_synthetic_references(&gone_at_once, &params).is_empty());
}

#[test]
fn removed_classes_make_queries_empty() {
    let mut index = sample_index();
    let api_op = method(&index, "pkg.Api", "op", 1);
    let impl_op = method(&index, "pkg.Impl", "op", 1);

    let mut without_impl = index.clone();
    without_impl.remove_class(class_id(&without_impl, "pkg.Impl"));
    assert!(navigation_targets(&without_impl, api_op).is_empty());
    assert!(find_synthetic_references(&without_impl, &SearchParameters::new(impl_op)).is_empty());

    index.remove_class(class_id(&index, "pkg.Api"));
    assert!(navigation_targets(&index, api_op).is_empty());
    assert!(find_synthetic_references(&index, &SearchParameters::new(impl_op)).is_empty());
}

// ============================================================================
// Early Stop and Concurrency
// ============================================================================

#[test]
fn consumer_stop_halts_the_query() {
    let index = sample_index();
    let impl_op = method(&index, "pkg.Impl", "op", 1);
    let mut calls = 0;
    let completed = process_query(&index, &SearchParameters::new(impl_op), |_| {
        calls += 1;
        false
    });
    assert!(!completed);
    assert_eq!(calls, 1);
}

#[test]
fn parallel_queries_agree() {
    let index = sample_index();
    let api_op = method(&index, "pkg.Api", "op", 1);
    let derived_run = method(&index, "pkg.Derived", "run", 1);
    let expected_targets = navigation_targets(&index, api_op);
    let expected_refs = find_synthetic_references(&index, &SearchParameters::new(derived_run));

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    (
                        navigation_targets(&index, api_op),
                        find_synthetic_references(&index, &SearchParameters::new(derived_run)),
                    )
                })
            })
            .collect();
        for handle in handles {
            let (targets, refs) = handle.join().unwrap();
            assert_eq!(targets, expected_targets);
            assert_eq!(refs, expected_refs);
        }
    });
}
