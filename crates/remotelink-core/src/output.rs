//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Nullable vs absent:** Explicit `null` for "no value"; absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility
//!
//! Every response also renders as plain text, one line per result, through
//! its `text_lines` method.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, OutputErrorCode};
use crate::index::CodeIndex;
use crate::model::{ClassId, MethodId};
use crate::navigation::NavigationMarker;
use crate::search::SyntheticReference;

pub use crate::types::{Location, SymbolInfo};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Reference kind reported for synthetic references.
pub const REMOTE_LINK_KIND: &str = "remote_link";

fn render_location(location: Option<&Location>) -> String {
    match location {
        Some(loc) => format!("{}:{}:{}", loc.file, loc.line, loc.col),
        None => "<binary>".to_string(),
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
///
/// - `code`: Numeric error code (required)
/// - `message`: Human-readable message (required)
/// - `details`: Error-specific structured data (optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a LinkError.
    pub fn from_error(err: &LinkError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let details = match err {
            LinkError::AmbiguousSymbol { candidates, .. } => {
                let candidates_json: Vec<_> = candidates
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "id": c.id,
                            "name": c.display_name(),
                            "kind": c.kind,
                        })
                    })
                    .collect();
                Some(serde_json::json!({ "candidates": candidates_json }))
            }
            LinkError::InvalidArguments { details, .. } => details.clone(),
            LinkError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            LinkError::SymbolNotFound { query } => Some(serde_json::json!({ "query": query })),
            _ => None,
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a LinkError.
    pub fn from_error(err: &LinkError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }

    /// Text rendering.
    pub fn text_lines(&self) -> Vec<String> {
        vec![format!("error[{}]: {}", self.error.code, self.error.message)]
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for `resolve`: the remote class of an annotated class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// The annotated class.
    pub class: SymbolInfo,
    /// Class name written in the annotation (null if absent or not a string literal).
    pub annotation_value: Option<String>,
    /// The resolved remote class (null if unresolved).
    pub remote: Option<SymbolInfo>,
}

impl ResolveResponse {
    /// Build from a class and its resolution result.
    pub fn new(
        class: SymbolInfo,
        annotation_value: Option<String>,
        remote: Option<SymbolInfo>,
    ) -> Self {
        ResolveResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            class,
            annotation_value,
            remote,
        }
    }

    /// Text rendering.
    pub fn text_lines(&self) -> Vec<String> {
        match &self.remote {
            Some(remote) => vec![format!(
                "{} -> {} ({})",
                self.class.name,
                remote.name,
                render_location(remote.location.as_ref())
            )],
            None => vec![format!("{} -> unresolved", self.class.name)],
        }
    }
}

/// Response for `navigate`: implementation methods of an interface method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// The interface method.
    pub method: SymbolInfo,
    /// Navigation targets, in index enumeration order.
    pub targets: Vec<SymbolInfo>,
}

impl NavigateResponse {
    /// Build from an interface method and its targets, skipping stale targets.
    pub fn build(index: &dyn CodeIndex, method: SymbolInfo, targets: &[MethodId]) -> Self {
        NavigateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            method,
            targets: targets
                .iter()
                .filter_map(|t| SymbolInfo::from_method(index, *t))
                .collect(),
        }
    }

    /// Text rendering.
    pub fn text_lines(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|t| format!("{} {}", render_location(t.location.as_ref()), t.display_name()))
            .collect()
    }
}

/// One gutter marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerInfo {
    /// Where the marker is drawn (the method name).
    pub location: Location,
    /// The interface method carrying the marker.
    pub method: SymbolInfo,
    /// Hover text.
    pub tooltip: String,
    /// Popup title.
    pub popup_title: String,
    /// Navigation targets.
    pub targets: Vec<SymbolInfo>,
}

impl MarkerInfo {
    /// Describe a marker. `None` if its symbols went stale.
    pub fn from_marker(index: &dyn CodeIndex, marker: &NavigationMarker) -> Option<Self> {
        Some(MarkerInfo {
            location: Location::from_span(index, marker.file_id, marker.span)?,
            method: SymbolInfo::from_method(index, marker.method)?,
            tooltip: marker.tooltip.to_string(),
            popup_title: marker.popup_title.to_string(),
            targets: marker
                .targets
                .iter()
                .filter_map(|t| SymbolInfo::from_method(index, *t))
                .collect(),
        })
    }
}

/// Response for `markers`: gutter markers of one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// File path.
    pub file: String,
    /// Markers in declaration order.
    pub markers: Vec<MarkerInfo>,
}

impl MarkersResponse {
    /// Build from collected markers.
    pub fn build(
        index: &dyn CodeIndex,
        file: impl Into<String>,
        markers: &[NavigationMarker],
    ) -> Self {
        MarkersResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file: file.into(),
            markers: markers
                .iter()
                .filter_map(|m| MarkerInfo::from_marker(index, m))
                .collect(),
        }
    }

    /// Text rendering.
    pub fn text_lines(&self) -> Vec<String> {
        self.markers
            .iter()
            .map(|m| {
                let targets: Vec<String> = m.targets.iter().map(|t| t.display_name()).collect();
                format!(
                    "{} {} -> {}",
                    render_location(Some(&m.location)),
                    m.method.name,
                    targets.join(", ")
                )
            })
            .collect()
    }
}

/// A synthetic reference for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceInfo {
    /// Location of the referenced range.
    pub location: Location,
    /// Reference kind (always `remote_link`).
    pub kind: String,
    /// The interface method whose declaration holds the reference.
    pub source: SymbolInfo,
}

impl ReferenceInfo {
    /// Describe a reference. `None` if its symbols went stale.
    pub fn from_reference(index: &dyn CodeIndex, reference: &SyntheticReference) -> Option<Self> {
        Some(ReferenceInfo {
            location: Location::from_span(index, reference.file_id, reference.span())?,
            kind: REMOTE_LINK_KIND.to_string(),
            source: SymbolInfo::from_method(index, reference.source_method)?,
        })
    }
}

/// Response for `usages`: synthetic references to an implementation method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsagesResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version.
    pub schema_version: String,
    /// The searched method.
    pub target: SymbolInfo,
    /// References sorted by location.
    pub references: Vec<ReferenceInfo>,
}

impl UsagesResponse {
    /// Build from search results.
    pub fn build(
        index: &dyn CodeIndex,
        target: SymbolInfo,
        references: &[SyntheticReference],
    ) -> Self {
        let mut references: Vec<ReferenceInfo> = references
            .iter()
            .filter_map(|r| ReferenceInfo::from_reference(index, r))
            .collect();
        references.sort_by(|a, b| a.location.cmp(&b.location));
        UsagesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            target,
            references,
        }
    }

    /// Text rendering.
    pub fn text_lines(&self) -> Vec<String> {
        self.references
            .iter()
            .map(|r| {
                format!(
                    "{} {} ({})",
                    render_location(Some(&r.location)),
                    r.source.display_name(),
                    r.kind
                )
            })
            .collect()
    }
}

/// Describe a class for output, or fail with `SymbolNotFound`.
pub fn class_info(index: &dyn CodeIndex, class: ClassId) -> Result<SymbolInfo, LinkError> {
    SymbolInfo::from_class(index, class)
        .ok_or_else(|| LinkError::symbol_not_found(class.to_string()))
}

/// Describe a method for output, or fail with `SymbolNotFound`.
pub fn method_info(index: &dyn CodeIndex, method: MethodId) -> Result<SymbolInfo, LinkError> {
    SymbolInfo::from_method(index, method)
        .ok_or_else(|| LinkError::symbol_not_found(method.to_string()))
}

// ============================================================================
// Emit Helpers
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit text lines to a writer.
pub fn emit_text(lines: &[String], writer: &mut impl Write) -> io::Result<()> {
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
