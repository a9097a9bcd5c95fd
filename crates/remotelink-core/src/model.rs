//! Code model: the read-only symbol views consumed from a host code index.
//!
//! This module provides the symbol types the link engine reasons about:
//! - [`SourceFile`]: A source file with its package and [`SourceOrigin`]
//! - [`ClassSymbol`]: A class or interface with its annotations and supertypes
//! - [`MethodSymbol`]: A method with the attributes used for matching
//! - [`AnnotationRef`]: An annotation with its attribute values
//!
//! Symbols are addressed through small copyable handles ([`FileId`],
//! [`ClassId`], [`MethodId`]). A handle is a weak reference: looking it up in
//! a [`CodeIndex`](crate::index::CodeIndex) returns `None` once the symbol has
//! been edited away or removed, and callers must treat that as "no result".
//!
//! # Visibility Model
//!
//! [`Visibility`] follows JVM access control. Only [`Visibility::Public`]
//! members can be the externally callable side of a remote link.
//!
//! | Modifier | Variant |
//! |----------|---------|
//! | `public` | `Public` |
//! | `protected` | `Protected` |
//! | (none) | `PackagePrivate` |
//! | `private` | `Private` |

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// ID Types
// ============================================================================

/// Identifier for a source file in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file ID.
    pub fn new(id: u32) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

/// Identifier for a class or interface in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Create a new class ID.
    pub fn new(id: u32) -> Self {
        ClassId(id)
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class_{}", self.0)
    }
}

/// Identifier for a method in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MethodId(pub u32);

impl MethodId {
    /// Create a new method ID.
    pub fn new(id: u32) -> Self {
        MethodId(id)
    }
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method_{}", self.0)
    }
}

// ============================================================================
// Span
// ============================================================================

/// Byte offsets into file content.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u64,
    /// End byte offset (exclusive).
    pub end: u64,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Span of `len` bytes starting at `start`.
    pub fn at(start: u64, len: u64) -> Self {
        Span {
            start,
            end: start + len,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Where a source file comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// Production application sources.
    #[default]
    Project,
    /// Test sources.
    Test,
    /// Library (dependency) sources or binaries.
    Library,
}

/// Access control of a class or method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `public`
    #[default]
    Public,
    /// `protected`
    Protected,
    /// No modifier.
    PackagePrivate,
    /// `private`
    Private,
}

impl Visibility {
    /// Whether the member is callable from outside its package and hierarchy.
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }

    /// Stable lowercase name used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::PackagePrivate => "package_private",
            Visibility::Private => "private",
        }
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// Value of an annotation attribute as the host's source model sees it.
///
/// Only [`AttributeValue::String`] is a usable link target. A class literal
/// (`Impl.class`) or any other expression (`PREFIX + "Impl"`) reads as absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    /// A string literal, e.g. `"pkg.Impl"`.
    String(String),
    /// A class literal, e.g. `Impl.class`. Holds the source text.
    Class(String),
    /// Any other expression. Holds the source text.
    Expression(String),
}

impl AttributeValue {
    /// The literal string, if this value is a string literal.
    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::Class(_) | AttributeValue::Expression(_) => None,
        }
    }
}

/// An annotation applied to a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationRef {
    /// Fully-qualified name of the annotation type.
    pub qualified_name: String,
    /// Attribute values keyed by attribute name.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl AnnotationRef {
    /// Create an annotation without attributes.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        AnnotationRef {
            qualified_name: qualified_name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Set a string-literal attribute value.
    pub fn with_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_attribute(name, AttributeValue::String(value.into()))
    }

    /// Read an attribute as a string literal.
    ///
    /// Returns `None` when the attribute is missing or is not a string literal.
    pub fn attribute_value_as_string_literal(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)?.as_string_literal()
    }
}

// ============================================================================
// Symbol Tables
// ============================================================================

/// A source file known to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Unique identifier for this file.
    pub file_id: FileId,
    /// Workspace-relative path.
    pub path: String,
    /// Package the file declares (empty for the default package).
    pub package: String,
    /// Where the file comes from.
    pub origin: SourceOrigin,
    /// Full file text.
    pub text: String,
}

impl SourceFile {
    /// Create a new project source file.
    pub fn new(
        file_id: FileId,
        path: impl Into<String>,
        package: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        SourceFile {
            file_id,
            path: path.into(),
            package: package.into(),
            origin: SourceOrigin::Project,
            text: text.into(),
        }
    }

    /// Set the source origin.
    pub fn with_origin(mut self, origin: SourceOrigin) -> Self {
        self.origin = origin;
        self
    }
}

/// A class or interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    /// Unique identifier for this class.
    pub class_id: ClassId,
    /// Fully-qualified name, e.g. `pkg.Impl`. This is the class identity.
    pub qualified_name: String,
    /// Whether this is an interface.
    pub is_interface: bool,
    /// Access control.
    pub visibility: Visibility,
    /// Declaring file (None for classes without sources).
    pub file_id: Option<FileId>,
    /// Byte span of the class name in its declaration.
    pub name_span: Option<Span>,
    /// Fully-qualified names of direct supertypes (`extends` and `implements`).
    pub supertypes: Vec<String>,
    /// Annotations in declaration order.
    pub annotations: Vec<AnnotationRef>,
}

impl ClassSymbol {
    /// Create a new public class without file, supertypes or annotations.
    pub fn new(class_id: ClassId, qualified_name: impl Into<String>) -> Self {
        ClassSymbol {
            class_id,
            qualified_name: qualified_name.into(),
            is_interface: false,
            visibility: Visibility::Public,
            file_id: None,
            name_span: None,
            supertypes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Mark as an interface.
    pub fn interface(mut self) -> Self {
        self.is_interface = true;
        self
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set the declaring file.
    pub fn in_file(mut self, file_id: FileId) -> Self {
        self.file_id = Some(file_id);
        self
    }

    /// Set the name span.
    pub fn with_name_span(mut self, span: Span) -> Self {
        self.name_span = Some(span);
        self
    }

    /// Add a direct supertype.
    pub fn with_supertype(mut self, qualified_name: impl Into<String>) -> Self {
        self.supertypes.push(qualified_name.into());
        self
    }

    /// Add an annotation.
    pub fn with_annotation(mut self, annotation: AnnotationRef) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// The unqualified class name (`Impl` for `pkg.Impl`, `Inner` for `pkg.Outer$Inner`).
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.qualified_name)
    }

    /// First annotation with the given qualified name.
    pub fn annotation(&self, qualified_name: &str) -> Option<&AnnotationRef> {
        self.annotations
            .iter()
            .find(|a| a.qualified_name == qualified_name)
    }

    /// Whether the class carries the given annotation directly.
    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotation(qualified_name).is_some()
    }
}

/// The unqualified tail of a dotted (or `$`-nested) name.
pub fn simple_name_of(qualified_name: &str) -> &str {
    qualified_name
        .rsplit(['.', '$'])
        .next()
        .unwrap_or(qualified_name)
}

/// A method declared on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSymbol {
    /// Unique identifier for this method.
    pub method_id: MethodId,
    /// Declaring class. May be stale.
    pub owning_class: ClassId,
    /// Method name.
    pub name: String,
    /// Number of declared parameters.
    pub parameter_count: usize,
    /// Access control.
    pub visibility: Visibility,
    /// Whether the method is abstract (interface methods without a body).
    pub is_abstract: bool,
    /// Byte span of the method name in its declaration.
    pub name_span: Option<Span>,
    /// Byte span of the whole declaration, from the name through the body
    /// or the terminating `;`.
    pub declaration_span: Option<Span>,
}

impl MethodSymbol {
    /// Create a new public, concrete method.
    pub fn new(
        method_id: MethodId,
        owning_class: ClassId,
        name: impl Into<String>,
        parameter_count: usize,
    ) -> Self {
        MethodSymbol {
            method_id,
            owning_class,
            name: name.into(),
            parameter_count,
            visibility: Visibility::Public,
            is_abstract: false,
            name_span: None,
            declaration_span: None,
        }
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as abstract.
    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the name span.
    pub fn with_name_span(mut self, span: Span) -> Self {
        self.name_span = Some(span);
        self
    }

    /// Set the declaration span.
    pub fn with_declaration_span(mut self, span: Span) -> Self {
        self.declaration_span = Some(span);
        self
    }

    /// Whether `span` lies inside this method's declaration.
    pub fn declaration_contains(&self, span: Span) -> bool {
        self.declaration_span
            .is_some_and(|decl| decl.contains(&span))
    }
}

// ============================================================================
// Tests
// ============================================================================
