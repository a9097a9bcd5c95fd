//! In-memory code index.
//!
//! [`InMemoryIndex`] is a complete [`CodeIndex`] over tables held in memory:
//! - BTreeMap primary storage for deterministic iteration
//! - Hash indexes for O(1) name lookups (path → file, FQN → class)
//! - Postings lists (class → methods, file → classes)
//!
//! Supertypes are stored by name and resolved at query time, so classes may
//! be inserted in any order and a supertype that is not indexed is simply
//! ignored.
//!
//! # Edits
//!
//! [`InMemoryIndex::remove_class`], [`InMemoryIndex::remove_method`] and
//! [`InMemoryIndex::set_annotation_attribute`] model source edits between
//! queries. Removed symbols keep their IDs reserved, so any handle still held
//! by a caller becomes stale instead of aliasing a new symbol.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use thiserror::Error;
use tracing::trace;

use crate::index::{CodeIndex, OccurrenceElement, TextOccurrence, UsageContext};
use crate::model::{
    AttributeValue, ClassId, ClassSymbol, FileId, MethodId, MethodSymbol, SourceFile,
    SourceOrigin, Span, Visibility,
};
use crate::scope::SearchScope;
use crate::text::{find_word_occurrences, non_code_ranges, region_at, Region};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while building an index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A class with the same fully-qualified name is already indexed.
    #[error("duplicate class '{name}'")]
    DuplicateClass { name: String },

    /// A file with the same path is already indexed.
    #[error("duplicate file '{path}'")]
    DuplicateFile { path: String },

    /// A class refers to a file that is not indexed.
    #[error("class '{class}' refers to unknown {file}")]
    UnknownFile { class: String, file: FileId },

    /// A method refers to a class that is not indexed.
    #[error("method '{method}' refers to unknown {class}")]
    UnknownClass { method: String, class: ClassId },

    /// A declaration name could not be located in its file text.
    #[error("cannot locate '{name}' in {path}")]
    NameNotFound { name: String, path: String },

    /// An explicit name offset does not point at the name.
    #[error("offset {offset} in {path} does not point at '{name}'")]
    InvalidOffset {
        name: String,
        path: String,
        offset: u64,
    },

    /// An explicit declaration span does not cover the name or runs past
    /// the end of the file.
    #[error("declaration {span} of '{name}' in {path} does not enclose its name")]
    InvalidDeclaration {
        name: String,
        path: String,
        span: Span,
    },

    /// Snapshot was written with an incompatible schema.
    #[error("unsupported snapshot schema version {found} (expected {expected})")]
    SchemaMismatch { found: u32, expected: u32 },

    /// Snapshot JSON could not be parsed.
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot file could not be read.
    #[error("cannot read snapshot: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// InMemoryIndex
// ============================================================================

/// A code index held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    // Primary storage (BTreeMap for deterministic iteration)
    files: BTreeMap<FileId, SourceFile>,
    classes: BTreeMap<ClassId, ClassSymbol>,
    methods: BTreeMap<MethodId, MethodSymbol>,

    // Secondary indexes
    /// Map from file path to FileId.
    file_by_path: HashMap<String, FileId>,
    /// Map from fully-qualified name to ClassId.
    class_by_name: HashMap<String, ClassId>,

    // Postings lists
    /// class_id → method_ids[] (declaration order).
    methods_by_class: HashMap<ClassId, Vec<MethodId>>,
    /// file_id → class_ids[] (declaration order).
    classes_by_file: HashMap<FileId, Vec<ClassId>>,

    // ID generators
    next_file_id: u32,
    next_class_id: u32,
    next_method_id: u32,
}

impl InMemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        InMemoryIndex::default()
    }

    // ------------------------------------------------------------------------
    // ID Generation
    // ------------------------------------------------------------------------

    /// Allocate the next file ID.
    pub fn next_file_id(&mut self) -> FileId {
        let id = FileId::new(self.next_file_id);
        self.next_file_id += 1;
        id
    }

    /// Allocate the next class ID.
    pub fn next_class_id(&mut self) -> ClassId {
        let id = ClassId::new(self.next_class_id);
        self.next_class_id += 1;
        id
    }

    /// Allocate the next method ID.
    pub fn next_method_id(&mut self) -> MethodId {
        let id = MethodId::new(self.next_method_id);
        self.next_method_id += 1;
        id
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Insert a file.
    pub fn insert_file(&mut self, file: SourceFile) -> Result<(), IndexError> {
        if self.file_by_path.contains_key(&file.path) {
            return Err(IndexError::DuplicateFile { path: file.path });
        }
        self.file_by_path.insert(file.path.clone(), file.file_id);
        self.files.insert(file.file_id, file);
        Ok(())
    }

    /// Insert a class. Its file (if any) must already be indexed.
    pub fn insert_class(&mut self, class: ClassSymbol) -> Result<(), IndexError> {
        if self.class_by_name.contains_key(&class.qualified_name) {
            return Err(IndexError::DuplicateClass {
                name: class.qualified_name,
            });
        }
        if let Some(file_id) = class.file_id {
            if !self.files.contains_key(&file_id) {
                return Err(IndexError::UnknownFile {
                    class: class.qualified_name,
                    file: file_id,
                });
            }
            self.classes_by_file
                .entry(file_id)
                .or_default()
                .push(class.class_id);
        }
        self.class_by_name
            .insert(class.qualified_name.clone(), class.class_id);
        self.classes.insert(class.class_id, class);
        Ok(())
    }

    /// Insert a method. Its owning class must already be indexed.
    pub fn insert_method(&mut self, method: MethodSymbol) -> Result<(), IndexError> {
        if !self.classes.contains_key(&method.owning_class) {
            return Err(IndexError::UnknownClass {
                method: method.name,
                class: method.owning_class,
            });
        }
        self.methods_by_class
            .entry(method.owning_class)
            .or_default()
            .push(method.method_id);
        self.methods.insert(method.method_id, method);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------------

    /// Remove a class and the methods it declares.
    ///
    /// Returns `false` if the class was not indexed.
    pub fn remove_class(&mut self, id: ClassId) -> bool {
        let Some(class) = self.classes.remove(&id) else {
            return false;
        };
        self.class_by_name.remove(&class.qualified_name);
        if let Some(file_id) = class.file_id {
            if let Some(ids) = self.classes_by_file.get_mut(&file_id) {
                ids.retain(|c| *c != id);
            }
        }
        for method_id in self.methods_by_class.remove(&id).unwrap_or_default() {
            self.methods.remove(&method_id);
        }
        true
    }

    /// Remove a single method.
    ///
    /// Returns `false` if the method was not indexed.
    pub fn remove_method(&mut self, id: MethodId) -> bool {
        let Some(method) = self.methods.remove(&id) else {
            return false;
        };
        if let Some(ids) = self.methods_by_class.get_mut(&method.owning_class) {
            ids.retain(|m| *m != id);
        }
        true
    }

    /// Replace an attribute of the first annotation named `annotation` on a class.
    ///
    /// Returns `false` if the class or annotation does not exist.
    pub fn set_annotation_attribute(
        &mut self,
        class: ClassId,
        annotation: &str,
        attribute: &str,
        value: AttributeValue,
    ) -> bool {
        let Some(class) = self.classes.get_mut(&class) else {
            return false;
        };
        match class
            .annotations
            .iter_mut()
            .find(|a| a.qualified_name == annotation)
        {
            Some(ann) => {
                ann.attributes.insert(attribute.to_string(), value);
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Look up a file by path.
    pub fn file_by_path(&self, path: &str) -> Option<&SourceFile> {
        self.file_by_path.get(path).and_then(|id| self.files.get(id))
    }

    /// Look up a class by fully-qualified name, ignoring scope.
    pub fn class_by_name(&self, qualified_name: &str) -> Option<&ClassSymbol> {
        self.class_by_name
            .get(qualified_name)
            .and_then(|id| self.classes.get(id))
    }

    /// Methods declared directly by a class, in declaration order.
    pub fn declared_methods(&self, class: ClassId) -> Vec<MethodId> {
        self.methods_by_class
            .get(&class)
            .cloned()
            .unwrap_or_default()
    }

    /// Iterate over all files in ID order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.values()
    }

    /// Iterate over all classes in ID order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbol> {
        self.classes.values()
    }

    /// Iterate over all methods in ID order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSymbol> {
        self.methods.values()
    }

    /// Number of files.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of methods.
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Direct supertypes of a class that are indexed.
    fn direct_supertypes(&self, class: &ClassSymbol) -> Vec<ClassId> {
        class
            .supertypes
            .iter()
            .filter_map(|name| self.class_by_name.get(name).copied())
            .collect()
    }

    fn origin_of(&self, file: FileId) -> Option<SourceOrigin> {
        self.files.get(&file).map(|f| f.origin)
    }

    /// Classify one word occurrence by the declaration it names or sits in.
    ///
    /// An exact name hit wins. Otherwise the innermost method declaration
    /// containing the word owns it, and the returned span is that
    /// declaration's span.
    fn element_at(&self, file: FileId, span: Span) -> (OccurrenceElement, Span) {
        let mut innermost: Option<(MethodId, Span)> = None;
        for class_id in self.classes_by_file.get(&file).into_iter().flatten() {
            let Some(class) = self.classes.get(class_id) else {
                continue;
            };
            if class.name_span == Some(span) {
                return (OccurrenceElement::ClassIdentifier(*class_id), span);
            }
            for method_id in self.methods_by_class.get(class_id).into_iter().flatten() {
                let Some(method) = self.methods.get(method_id) else {
                    continue;
                };
                if method.name_span == Some(span) {
                    return (OccurrenceElement::MethodIdentifier(*method_id), span);
                }
                let Some(declaration) = method.declaration_span else {
                    continue;
                };
                let tighter = match innermost {
                    Some((_, best)) => declaration.len() < best.len(),
                    None => true,
                };
                if tighter && method.declaration_contains(span) {
                    innermost = Some((*method_id, declaration));
                }
            }
        }
        match innermost {
            Some((method_id, declaration)) => {
                (OccurrenceElement::MethodBody(method_id), declaration)
            }
            None => (OccurrenceElement::Code, span),
        }
    }
}

impl UsageContext {
    fn accepts(&self, region: Region) -> bool {
        match self {
            UsageContext::InCode => region == Region::Code,
            UsageContext::InComments => region == Region::Comment,
            UsageContext::InStrings => region == Region::Literal,
            UsageContext::Any => true,
        }
    }
}

// ============================================================================
// CodeIndex Implementation
// ============================================================================

impl CodeIndex for InMemoryIndex {
    fn find_class(&self, qualified_name: &str, scope: &SearchScope) -> Option<ClassId> {
        let id = *self.class_by_name.get(qualified_name)?;
        let class = self.classes.get(&id)?;
        match class.file_id {
            Some(file) if !scope.contains(file) => None,
            _ => Some(id),
        }
    }

    fn class(&self, id: ClassId) -> Option<&ClassSymbol> {
        self.classes.get(&id)
    }

    fn method(&self, id: MethodId) -> Option<&MethodSymbol> {
        self.methods.get(&id)
    }

    fn file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(&id)
    }

    fn all_methods(&self, class: ClassId) -> Vec<MethodId> {
        let mut result = Vec::new();
        let mut signatures: HashSet<(&str, usize)> = HashSet::new();
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut queue = VecDeque::from([class]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(symbol) = self.classes.get(&current) else {
                continue;
            };
            // Overloads within one class never hide each other.
            let declared: Vec<&MethodSymbol> = self
                .methods_by_class
                .get(&current)
                .into_iter()
                .flatten()
                .filter_map(|id| self.methods.get(id))
                .filter(|m| !signatures.contains(&(m.name.as_str(), m.parameter_count)))
                .collect();
            for method in declared {
                signatures.insert((method.name.as_str(), method.parameter_count));
                result.push(method.method_id);
            }
            queue.extend(self.direct_supertypes(symbol));
        }

        result
    }

    fn methods_in_file(&self, file: FileId) -> Vec<MethodId> {
        self.classes_by_file
            .get(&file)
            .into_iter()
            .flatten()
            .flat_map(|class| self.declared_methods(*class))
            .collect()
    }

    fn is_inheritor_or_self(&self, candidate: ClassId, base: ClassId) -> bool {
        if !self.classes.contains_key(&candidate) || !self.classes.contains_key(&base) {
            return false;
        }
        let mut visited: HashSet<ClassId> = HashSet::new();
        let mut queue = VecDeque::from([candidate]);

        while let Some(current) = queue.pop_front() {
            if current == base {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(symbol) = self.classes.get(&current) {
                queue.extend(self.direct_supertypes(symbol));
            }
        }
        false
    }

    fn is_test_source(&self, file: FileId) -> bool {
        self.origin_of(file) == Some(SourceOrigin::Test)
    }

    fn is_library_source(&self, file: FileId) -> bool {
        self.origin_of(file) == Some(SourceOrigin::Library)
    }

    fn use_scope(&self, class: ClassId) -> SearchScope {
        let Some(symbol) = self.classes.get(&class) else {
            return SearchScope::empty();
        };
        let Some(file_id) = symbol.file_id else {
            return SearchScope::Everything;
        };
        match symbol.visibility {
            Visibility::Public | Visibility::Protected => SearchScope::Everything,
            Visibility::PackagePrivate => {
                let Some(package) = self.files.get(&file_id).map(|f| f.package.as_str()) else {
                    return SearchScope::empty();
                };
                SearchScope::files(
                    self.files
                        .values()
                        .filter(|f| f.package == package)
                        .map(|f| f.file_id),
                )
            }
            Visibility::Private => SearchScope::files([file_id]),
        }
    }

    fn scan_text_occurrences(
        &self,
        word: &str,
        scope: &SearchScope,
        context: UsageContext,
    ) -> Vec<TextOccurrence> {
        let mut occurrences = Vec::new();
        for file in self.files.values() {
            if !scope.contains(file.file_id) {
                continue;
            }
            let ranges = non_code_ranges(&file.text);
            for offset in find_word_occurrences(&file.text, word) {
                let offset = offset as u64;
                if !context.accepts(region_at(&ranges, offset)) {
                    continue;
                }
                let span = Span::at(offset, word.len() as u64);
                let (element, element_span) = self.element_at(file.file_id, span);
                occurrences.push(TextOccurrence {
                    file_id: file.file_id,
                    element,
                    element_span,
                    offset_in_element: offset - element_span.start,
                });
            }
        }
        trace!(word, count = occurrences.len(), "text scan complete");
        occurrences
    }
}

// ============================================================================
// Tests
// ============================================================================
