//! Serializable snapshots of a code model.
//!
//! A [`ModelSnapshot`] is the JSON form of a host's source model, as exported
//! by an IDE plugin or written by hand for fixtures. Loading it produces an
//! [`InMemoryIndex`].
//!
//! ## Format
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "files": [{
//!     "path": "src/pkg/Api.java",
//!     "package": "pkg",
//!     "origin": "project",
//!     "text": "@Remote(\"pkg.Impl\") interface Api { void op(int a); }",
//!     "classes": [{
//!       "name": "pkg.Api",
//!       "interface": true,
//!       "annotations": [{ "name": "com.intellij.driver.client.Remote",
//!                         "attributes": { "value": { "string": "pkg.Impl" } } }],
//!       "methods": [{ "name": "op", "parameters": 1, "abstract": true }]
//!     }]
//!   }]
//! }
//! ```
//!
//! ## Name Offsets
//!
//! `name_offset` is optional on classes and methods. When omitted, the loader
//! takes the first whole-word occurrence of the simple name in code (not in a
//! comment or literal) after the previous declaration in the same file, so
//! declarations must appear in text order.
//!
//! `declaration` is an optional `{ "start", "end" }` span on methods covering
//! the name through the body or the closing `;`. When omitted, it runs from
//! the name to the end of the body as found by brace matching. A method
//! without a findable end gets its name span as its declaration. The search
//! for the next name resumes after the declaration, so calls inside a body
//! are never taken for a later method's name.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::memory::{IndexError, InMemoryIndex};
use crate::model::{
    simple_name_of, AnnotationRef, AttributeValue, ClassSymbol, MethodSymbol, SourceFile,
    SourceOrigin, Span, Visibility,
};
use crate::resolver::{has_remote_annotation, REMOTE_ANNOTATION_FQN};
use crate::text::{declaration_end, find_code_word};

/// Schema version for snapshot files.
///
/// Increment when the snapshot format changes incompatibly.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SNAPSHOT_SCHEMA_VERSION
}

/// Root of a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// Format version.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Source files with their declarations.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// A file and the classes it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Workspace-relative path.
    pub path: String,
    /// Declared package.
    #[serde(default)]
    pub package: String,
    /// Where the file comes from.
    #[serde(default)]
    pub origin: SourceOrigin,
    /// Full file text.
    #[serde(default)]
    pub text: String,
    /// Classes declared in the file, in text order.
    #[serde(default)]
    pub classes: Vec<ClassEntry>,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    /// Fully-qualified name.
    pub name: String,
    /// Whether this is an interface.
    #[serde(default)]
    pub interface: bool,
    /// Access control.
    #[serde(default)]
    pub visibility: Visibility,
    /// Fully-qualified names of direct supertypes.
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Annotations in declaration order.
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
    /// Byte offset of the simple name in the file text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_offset: Option<u64>,
    /// Declared methods, in text order.
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
}

/// An annotation on a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// Fully-qualified annotation type name.
    pub name: String,
    /// Attribute values.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    /// Method name.
    pub name: String,
    /// Parameter count.
    #[serde(default)]
    pub parameters: usize,
    /// Access control.
    #[serde(default)]
    pub visibility: Visibility,
    /// Whether the method is abstract.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Byte offset of the name in the file text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_offset: Option<u64>,
    /// Byte span of the whole declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Span>,
}

impl ModelSnapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self, IndexError> {
        let snapshot: ModelSnapshot = serde_json::from_str(json)?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            return Err(IndexError::SchemaMismatch {
                found: snapshot.schema_version,
                expected: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Read and parse a snapshot file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Build an index from this snapshot.
    pub fn to_index(&self) -> Result<InMemoryIndex, IndexError> {
        let mut index = InMemoryIndex::new();

        for entry in &self.files {
            let file_id = index.next_file_id();
            index.insert_file(
                SourceFile::new(file_id, &entry.path, &entry.package, &entry.text)
                    .with_origin(entry.origin),
            )?;

            let mut cursor = 0usize;
            for class_entry in &entry.classes {
                let simple = simple_name_of(&class_entry.name);
                let name_span = locate(entry, simple, class_entry.name_offset, &mut cursor)?;

                let class_id = index.next_class_id();
                let mut class = ClassSymbol::new(class_id, &class_entry.name)
                    .with_visibility(class_entry.visibility)
                    .in_file(file_id)
                    .with_name_span(name_span);
                if class_entry.interface {
                    class = class.interface();
                }
                class.supertypes = class_entry.supertypes.clone();
                class.annotations = class_entry
                    .annotations
                    .iter()
                    .map(|a| AnnotationRef {
                        qualified_name: a.name.clone(),
                        attributes: a.attributes.clone(),
                    })
                    .collect();
                index.insert_class(class)?;

                for method_entry in &class_entry.methods {
                    let name_span =
                        locate(entry, &method_entry.name, method_entry.name_offset, &mut cursor)?;
                    let declaration = declaration_of(entry, method_entry, name_span)?;
                    cursor = cursor.max(declaration.end as usize);
                    let method_id = index.next_method_id();
                    let mut method = MethodSymbol::new(
                        method_id,
                        class_id,
                        &method_entry.name,
                        method_entry.parameters,
                    )
                    .with_visibility(method_entry.visibility)
                    .with_name_span(name_span)
                    .with_declaration_span(declaration);
                    if method_entry.is_abstract {
                        method = method.abstract_method();
                    }
                    index.insert_method(method)?;
                }
            }
        }

        warn_about_dangling_names(&index);
        debug!(
            files = index.file_count(),
            classes = index.class_count(),
            methods = index.method_count(),
            "snapshot loaded"
        );
        Ok(index)
    }
}

/// Warn about names that load fine but will never resolve.
fn warn_about_dangling_names(index: &InMemoryIndex) {
    let mut remote_interfaces = 0usize;
    for class in index.classes() {
        for supertype in &class.supertypes {
            if index.class_by_name(supertype).is_none() {
                debug!(
                    class = %class.qualified_name,
                    supertype = %supertype,
                    "supertype not indexed"
                );
            }
        }
        if has_remote_annotation(class) {
            remote_interfaces += 1;
        }
    }
    if remote_interfaces > 0 && index.class_by_name(REMOTE_ANNOTATION_FQN).is_none() {
        warn!(
            remote_interfaces,
            "annotation type {} is not in the snapshot; usage search will find nothing",
            REMOTE_ANNOTATION_FQN
        );
    }
}

/// Load an index straight from a snapshot file.
pub fn load_index(path: impl AsRef<Path>) -> Result<InMemoryIndex, IndexError> {
    ModelSnapshot::read(path)?.to_index()
}

/// Resolve the name span of a declaration and advance the cursor past it.
fn locate(
    entry: &FileEntry,
    name: &str,
    explicit: Option<u64>,
    cursor: &mut usize,
) -> Result<Span, IndexError> {
    let start = match explicit {
        Some(offset) => {
            let ok = usize::try_from(offset)
                .ok()
                .and_then(|o| Some(o..o.checked_add(name.len())?))
                .and_then(|range| entry.text.get(range))
                == Some(name);
            if !ok {
                return Err(IndexError::InvalidOffset {
                    name: name.to_string(),
                    path: entry.path.clone(),
                    offset,
                });
            }
            offset as usize
        }
        None => find_code_word(&entry.text, name, *cursor).ok_or_else(|| {
            IndexError::NameNotFound {
                name: name.to_string(),
                path: entry.path.clone(),
            }
        })?,
    };
    *cursor = start + name.len();
    Ok(Span::at(start as u64, name.len() as u64))
}

/// Resolve the declaration span of a method whose name is at `name_span`.
fn declaration_of(
    entry: &FileEntry,
    method: &MethodEntry,
    name_span: Span,
) -> Result<Span, IndexError> {
    match method.declaration {
        Some(span) => {
            if !span.contains(&name_span) || span.end > entry.text.len() as u64 {
                return Err(IndexError::InvalidDeclaration {
                    name: method.name.clone(),
                    path: entry.path.clone(),
                    span,
                });
            }
            Ok(span)
        }
        None => {
            let end = declaration_end(&entry.text, name_span.end as usize)
                .map_or(name_span.end, |end| end as u64);
            Ok(Span::new(name_span.start, end))
        }
    }
}
