//! Host code index trait and text-occurrence types.
//!
//! This module defines the [`CodeIndex`] trait: the narrow surface the link
//! engine consumes from whatever owns the source model (an IDE, a language
//! server, or the [`InMemoryIndex`](crate::memory::InMemoryIndex) used by the
//! CLI and the tests).
//!
//! # Staleness
//!
//! Handles ([`ClassId`], [`MethodId`], [`FileId`]) can outlive the symbols
//! they name. Every accessor that dereferences a handle returns `Option`, and
//! `None` means "deleted or edited away since the handle was obtained". The
//! engine checks validity before every dereference and abandons only the
//! computation that hit the stale symbol.
//!
//! # Read-only Contract
//!
//! All methods take `&self`. Implementations must not block beyond their own
//! in-memory lookups; the engine issues single lookups and linear scans only.

use crate::model::{ClassId, ClassSymbol, FileId, MethodId, MethodSymbol, SourceFile, Span};
use crate::scope::SearchScope;

// ============================================================================
// Text Occurrences
// ============================================================================

/// Which lexical regions a text scan accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UsageContext {
    /// Code only (no comments, no literals).
    #[default]
    InCode,
    /// Comments only.
    InComments,
    /// String and char literals only.
    InStrings,
    /// Anywhere.
    Any,
}

/// The syntax element a text occurrence landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OccurrenceElement {
    /// The name identifier of a method declaration.
    MethodIdentifier(MethodId),
    /// Inside a method declaration but outside its name (a call in the body).
    MethodBody(MethodId),
    /// The name identifier of a class declaration.
    ClassIdentifier(ClassId),
    /// Any other code outside method declarations (field initializers,
    /// unrelated identifiers).
    Code,
}

impl OccurrenceElement {
    /// The method whose name or body holds the occurrence.
    pub fn enclosing_method(&self) -> Option<MethodId> {
        match self {
            OccurrenceElement::MethodIdentifier(id) | OccurrenceElement::MethodBody(id) => {
                Some(*id)
            }
            OccurrenceElement::ClassIdentifier(_) | OccurrenceElement::Code => None,
        }
    }
}

/// One whole-word occurrence found by [`CodeIndex::scan_text_occurrences`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOccurrence {
    /// File containing the occurrence.
    pub file_id: FileId,
    /// Element the occurrence belongs to.
    pub element: OccurrenceElement,
    /// Byte span of that element in the file.
    pub element_span: Span,
    /// Offset of the word relative to `element_span.start`.
    pub offset_in_element: u64,
}

impl TextOccurrence {
    /// Absolute byte offset of the word in the file.
    pub fn offset(&self) -> u64 {
        self.element_span.start + self.offset_in_element
    }
}

// ============================================================================
// Code Index Trait
// ============================================================================

/// Read-only view of the host's source model.
///
/// # Example Implementation
///
/// ```ignore
/// struct IdeIndex<'p> { project: &'p Project }
///
/// impl CodeIndex for IdeIndex<'_> {
///     fn find_class(&self, name: &str, scope: &SearchScope) -> Option<ClassId> {
///         self.project.facade().find_class(name, scope.into())
///     }
///     // ...
/// }
/// ```
pub trait CodeIndex {
    /// Find a class by fully-qualified name whose declaring file is in `scope`.
    fn find_class(&self, qualified_name: &str, scope: &SearchScope) -> Option<ClassId>;

    /// The scope of all project and library files.
    fn all_scope(&self) -> SearchScope {
        SearchScope::Everything
    }

    /// Look up a class. `None` if stale.
    fn class(&self, id: ClassId) -> Option<&ClassSymbol>;

    /// Look up a method. `None` if stale.
    fn method(&self, id: MethodId) -> Option<&MethodSymbol>;

    /// Look up a file. `None` if stale.
    fn file(&self, id: FileId) -> Option<&SourceFile>;

    /// All methods of a class, including inherited ones.
    ///
    /// An inherited method is hidden by a more-derived declaration with the
    /// same `(name, parameter_count)`. Same-arity overloads declared by one
    /// class are all kept. Empty if the class is stale.
    fn all_methods(&self, class: ClassId) -> Vec<MethodId>;

    /// Methods declared by classes in `file`, in declaration order.
    fn methods_in_file(&self, file: FileId) -> Vec<MethodId>;

    /// Whether `candidate` is `base` or a transitive subtype of it.
    fn is_inheritor_or_self(&self, candidate: ClassId, base: ClassId) -> bool;

    /// Whether `file` belongs to test sources.
    fn is_test_source(&self, file: FileId) -> bool;

    /// Whether `file` belongs to a library.
    fn is_library_source(&self, file: FileId) -> bool;

    /// Files from which `class` can be referenced at all.
    fn use_scope(&self, class: ClassId) -> SearchScope;

    /// Whole-word, case-sensitive occurrences of `word` in `scope`.
    ///
    /// Each occurrence is attached to the innermost method declaration that
    /// encloses it, or to the class or method name it exactly covers.
    fn scan_text_occurrences(
        &self,
        word: &str,
        scope: &SearchScope,
        context: UsageContext,
    ) -> Vec<TextOccurrence>;

    /// Owning class of a method, if both are still valid.
    fn owning_class(&self, method: MethodId) -> Option<&ClassSymbol> {
        let owner = self.method(method)?.owning_class;
        self.class(owner)
    }
}
