//! Forward navigation: remote interface method → implementation methods.
//!
//! [`navigation_targets`] computes where "go to implementation" should land.
//! [`collect_navigation_marker`] wraps the same computation into the gutter
//! marker a host renders next to the interface method's name.

use tracing::debug;

use crate::index::CodeIndex;
use crate::matcher::{find_matches, is_remote_interface_method};
use crate::model::{FileId, MethodId, Span};
use crate::resolver::resolve_remote_class;

/// Tooltip shown on a navigation marker.
pub const NAVIGATION_TOOLTIP: &str = "Go to implementation";

/// Title of the popup listing several navigation targets.
pub const NAVIGATION_POPUP_TITLE: &str = "Implementations";

/// Implementation methods an interface method navigates to.
///
/// Empty unless `interface_method` is an abstract method of an interface
/// carrying the remote-link annotation whose target class resolves.
pub fn navigation_targets(index: &dyn CodeIndex, interface_method: MethodId) -> Vec<MethodId> {
    if !is_remote_interface_method(index, interface_method) {
        return Vec::new();
    }
    let Some(owner) = index.owning_class(interface_method) else {
        return Vec::new();
    };
    let Some(remote_class) = resolve_remote_class(index, owner.class_id) else {
        return Vec::new();
    };

    let targets = find_matches(index, interface_method, remote_class);
    debug!(
        method = %interface_method,
        remote = %remote_class,
        count = targets.len(),
        "navigation targets"
    );
    targets
}

/// A discoverability marker attached to an interface method's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationMarker {
    /// The interface method the marker belongs to.
    pub method: MethodId,
    /// File holding the method declaration.
    pub file_id: FileId,
    /// Span of the method name identifier.
    pub span: Span,
    /// Hover text.
    pub tooltip: &'static str,
    /// Popup title when choosing between targets.
    pub popup_title: &'static str,
    /// Navigation targets, never empty.
    pub targets: Vec<MethodId>,
}

/// Build the marker for one method, if it has any navigation target.
///
/// Methods without a name span or declaring file cannot carry a marker.
pub fn collect_navigation_marker(
    index: &dyn CodeIndex,
    method: MethodId,
) -> Option<NavigationMarker> {
    let symbol = index.method(method)?;
    let span = symbol.name_span?;
    let file_id = index.owning_class(method)?.file_id?;

    let targets = navigation_targets(index, method);
    if targets.is_empty() {
        return None;
    }
    Some(NavigationMarker {
        method,
        file_id,
        span,
        tooltip: NAVIGATION_TOOLTIP,
        popup_title: NAVIGATION_POPUP_TITLE,
        targets,
    })
}

/// Markers for every method declared in `file`, in declaration order.
pub fn collect_navigation_markers_in_file(
    index: &dyn CodeIndex,
    file: FileId,
) -> Vec<NavigationMarker> {
    index
        .methods_in_file(file)
        .into_iter()
        .filter_map(|method| collect_navigation_marker(index, method))
        .collect()
}
