//! Command implementations for `rlink`.
//!
//! Each `run_*` function answers one subcommand against a loaded index and
//! returns its response. Rendering and exit codes are handled by the binary.

use std::path::Path;

use remotelink_core::error::LinkError;
use remotelink_core::index::CodeIndex;
use remotelink_core::model::MethodId;
use remotelink_core::navigation::{collect_navigation_markers_in_file, navigation_targets};
use remotelink_core::output::{
    class_info, method_info, MarkersResponse, NavigateResponse, ResolveResponse, UsagesResponse,
};
use remotelink_core::resolver::{remote_target_name, resolve_remote_class};
use remotelink_core::search::{find_synthetic_references, SearchParameters};
use remotelink_core::snapshot::load_index;
use remotelink_core::text::position_to_byte_offset;
use remotelink_core::types::{Location, SymbolInfo};
use remotelink_core::{InMemoryIndex, Span};
use tracing::{debug, info};

use crate::filter::user_scope;

// ============================================================================
// Method Selectors
// ============================================================================

/// How a command names a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSelector {
    /// `pkg.Class#name` or `pkg.Class#name/arity`.
    Named {
        class: String,
        name: String,
        arity: Option<usize>,
    },
    /// `path:line:col` anywhere inside the method name.
    At(Location),
}

impl MethodSelector {
    /// Parse a selector argument.
    ///
    /// ```
    /// use remotelink::cli::MethodSelector;
    ///
    /// let sel = MethodSelector::parse("pkg.Impl#op/1").unwrap();
    /// assert!(matches!(sel, MethodSelector::Named { arity: Some(1), .. }));
    /// assert!(MethodSelector::parse("src/Api.java:5:8").is_ok());
    /// assert!(MethodSelector::parse("pkg.Impl").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, LinkError> {
        if let Some((class, member)) = raw.split_once('#') {
            let (name, arity) = match member.split_once('/') {
                Some((name, arity)) => {
                    let arity = arity.parse::<usize>().map_err(|_| {
                        LinkError::invalid_args_with_details(
                            format!("invalid arity '{}' in selector", arity),
                            serde_json::json!({ "selector": raw }),
                        )
                    })?;
                    (name, Some(arity))
                }
                None => (member, None),
            };
            if class.is_empty() || name.is_empty() {
                return Err(LinkError::invalid_args_with_details(
                    "method selector needs a class and a method name",
                    serde_json::json!({ "selector": raw }),
                ));
            }
            return Ok(MethodSelector::Named {
                class: class.to_string(),
                name: name.to_string(),
                arity,
            });
        }

        Location::parse(raw)
            .map(MethodSelector::At)
            .ok_or_else(|| {
                LinkError::invalid_args_with_details(
                    "expected 'pkg.Class#method[/arity]' or 'path:line:col'",
                    serde_json::json!({ "selector": raw }),
                )
            })
    }
}

/// Resolve a selector to exactly one declared method.
pub fn select_method(index: &InMemoryIndex, raw: &str) -> Result<MethodId, LinkError> {
    match MethodSelector::parse(raw)? {
        MethodSelector::Named { class, name, arity } => {
            let owner = index
                .class_by_name(&class)
                .ok_or_else(|| LinkError::symbol_not_found(raw))?;
            let candidates: Vec<MethodId> = index
                .declared_methods(owner.class_id)
                .into_iter()
                .filter(|id| {
                    index.method(*id).is_some_and(|m| {
                        m.name == name && (arity.is_none() || arity == Some(m.parameter_count))
                    })
                })
                .collect();
            single_candidate(index, raw, candidates)
        }
        MethodSelector::At(location) => {
            let file = index
                .file_by_path(&location.file)
                .ok_or_else(|| LinkError::file_not_found(location.file.clone()))?;
            let offset = position_to_byte_offset(&file.text, location.line, location.col)
                .ok_or_else(|| {
                    LinkError::invalid_args(format!(
                        "position {}:{} is outside {}",
                        location.line, location.col, location.file
                    ))
                })?;
            let cursor = Span::at(offset as u64, 0);
            let candidates: Vec<MethodId> = index
                .methods_in_file(file.file_id)
                .into_iter()
                .filter(|id| {
                    index
                        .method(*id)
                        .and_then(|m| m.name_span)
                        .is_some_and(|span| span.contains(&cursor))
                })
                .collect();
            single_candidate(index, raw, candidates)
        }
    }
}

fn single_candidate(
    index: &InMemoryIndex,
    raw: &str,
    mut candidates: Vec<MethodId>,
) -> Result<MethodId, LinkError> {
    match candidates.len() {
        0 => Err(LinkError::symbol_not_found(raw)),
        1 => Ok(candidates.remove(0)),
        _ => Err(LinkError::AmbiguousSymbol {
            query: raw.to_string(),
            candidates: candidates
                .iter()
                .filter_map(|id| SymbolInfo::from_method(index, *id))
                .collect(),
        }),
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Load the snapshot the commands run against.
pub fn load_snapshot(path: &Path) -> Result<InMemoryIndex, LinkError> {
    if !path.is_file() {
        return Err(LinkError::file_not_found(path.display().to_string()));
    }
    let index = load_index(path)?;
    info!(
        snapshot = %path.display(),
        files = index.file_count(),
        classes = index.class_count(),
        methods = index.method_count(),
        "index ready"
    );
    Ok(index)
}

/// `rlink resolve`: the remote class of an annotated class.
///
/// A class without the annotation, or whose target is not indexed, resolves
/// to `null` rather than failing.
pub fn run_resolve(index: &InMemoryIndex, class_name: &str) -> Result<ResolveResponse, LinkError> {
    let class = index
        .class_by_name(class_name)
        .ok_or_else(|| LinkError::symbol_not_found(class_name))?;
    let info = class_info(index, class.class_id)?;
    let annotation_value = remote_target_name(class).map(str::to_string);
    let remote = resolve_remote_class(index, class.class_id)
        .and_then(|remote| SymbolInfo::from_class(index, remote));
    Ok(ResolveResponse::new(info, annotation_value, remote))
}

/// `rlink navigate`: implementation methods of an interface method.
pub fn run_navigate(index: &InMemoryIndex, selector: &str) -> Result<NavigateResponse, LinkError> {
    let method = select_method(index, selector)?;
    let targets = navigation_targets(index, method);
    debug!(selector, targets = targets.len(), "navigate");
    Ok(NavigateResponse::build(index, method_info(index, method)?, &targets))
}

/// `rlink markers`: gutter markers for one file.
pub fn run_markers(index: &InMemoryIndex, path: &str) -> Result<MarkersResponse, LinkError> {
    let file = index
        .file_by_path(path)
        .ok_or_else(|| LinkError::file_not_found(path))?;
    let markers = collect_navigation_markers_in_file(index, file.file_id);
    Ok(MarkersResponse::build(index, file.path.clone(), &markers))
}

/// `rlink usages`: synthetic references to an implementation method.
///
/// `patterns` restrict the search the way a user-chosen scope would.
pub fn run_usages(
    index: &InMemoryIndex,
    selector: &str,
    patterns: &[String],
) -> Result<UsagesResponse, LinkError> {
    let method = select_method(index, selector)?;
    let scope = user_scope(patterns, index)?;
    let params = SearchParameters::new(method).with_scope(scope);
    let references = find_synthetic_references(index, &params);
    debug!(selector, references = references.len(), "usages");
    Ok(UsagesResponse::build(index, method_info(index, method)?, &references))
}
