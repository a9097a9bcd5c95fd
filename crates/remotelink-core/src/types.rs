//! Common types shared between error and output modules.
//!
//! This module contains types that are used by both the error and output modules,
//! avoiding circular dependencies.

use serde::{Deserialize, Serialize};

use crate::index::CodeIndex;
use crate::model::{ClassId, FileId, MethodId, Span};
use crate::text::byte_offset_to_position;

// ============================================================================
// Location Type
// ============================================================================

/// Location in a source file.
///
/// - `file`: Path as recorded in the index (required)
/// - `line`: 1-indexed line number (required)
/// - `col`: 1-indexed column, in characters (required)
/// - `byte_start`: Byte offset from file start (optional)
/// - `byte_end`: Byte offset end, exclusive (optional)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File path.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed).
    pub col: u32,
    /// Byte offset from file start (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<u64>,
    /// Byte offset end, exclusive (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<u64>,
}

impl Location {
    /// Create a new location without byte offsets.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// Create a location with full byte span.
    pub fn with_span(
        file: impl Into<String>,
        line: u32,
        col: u32,
        byte_start: u64,
        byte_end: u64,
    ) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: Some(byte_start),
            byte_end: Some(byte_end),
        }
    }

    /// Location of a byte span in an indexed file. `None` if the file is stale.
    pub fn from_span(index: &dyn CodeIndex, file: FileId, span: Span) -> Option<Self> {
        let source = index.file(file)?;
        let (line, col) = byte_offset_to_position(&source.text, span.start as usize);
        Some(Location::with_span(
            source.path.clone(),
            line,
            col,
            span.start,
            span.end,
        ))
    }

    /// Parse a location from "path:line:col" format.
    ///
    /// This parsing is robust against paths containing colons (e.g., Windows paths).
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.rsplitn(3, ':').collect();
        if parts.len() != 3 {
            return None;
        }
        let col: u32 = parts[0].parse().ok()?;
        let line: u32 = parts[1].parse().ok()?;
        if line == 0 || col == 0 || parts[2].is_empty() {
            return None;
        }
        Some(Location::new(parts[2], line, col))
    }

    /// Comparison key for deterministic sorting: (file, line, col).
    fn sort_key(&self) -> (&str, u32, u32) {
        (&self.file, self.line, self.col)
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

// ============================================================================
// SymbolInfo Type
// ============================================================================

/// Symbol information for JSON output.
///
/// - `id`: Symbol handle within the loaded index (required)
/// - `name`: Qualified name for classes, simple name for methods (required)
/// - `kind`: `class`, `interface` or `method` (required)
/// - `location`: Declaration name location (absent for binary classes)
/// - `container`: Owning class for methods (optional)
/// - `parameters`: Parameter count for methods (optional)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolInfo {
    /// Symbol ID.
    pub id: String,
    /// Symbol name.
    pub name: String,
    /// Symbol kind.
    pub kind: String,
    /// Declaration location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Owning class FQN (for methods).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Parameter count (for methods).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<usize>,
}

impl SymbolInfo {
    /// Describe a class. `None` if stale.
    pub fn from_class(index: &dyn CodeIndex, class: ClassId) -> Option<Self> {
        let symbol = index.class(class)?;
        let location = symbol
            .file_id
            .and_then(|file| Location::from_span(index, file, symbol.name_span?));
        Some(SymbolInfo {
            id: class.to_string(),
            name: symbol.qualified_name.clone(),
            kind: if symbol.is_interface { "interface" } else { "class" }.to_string(),
            location,
            container: None,
            parameters: None,
        })
    }

    /// Describe a method. `None` if the method or its owner is stale.
    pub fn from_method(index: &dyn CodeIndex, method: MethodId) -> Option<Self> {
        let symbol = index.method(method)?;
        let owner = index.class(symbol.owning_class)?;
        let location = owner
            .file_id
            .and_then(|file| Location::from_span(index, file, symbol.name_span?));
        Some(SymbolInfo {
            id: method.to_string(),
            name: symbol.name.clone(),
            kind: "method".to_string(),
            location,
            container: Some(owner.qualified_name.clone()),
            parameters: Some(symbol.parameter_count),
        })
    }

    /// Human-readable selector: `pkg.Impl#op/1` for methods, the FQN otherwise.
    pub fn display_name(&self) -> String {
        match (&self.container, self.parameters) {
            (Some(container), Some(parameters)) => {
                format!("{}#{}/{}", container, self.name, parameters)
            }
            _ => self.name.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
