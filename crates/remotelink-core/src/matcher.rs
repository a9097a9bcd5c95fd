//! Method matching between a remote interface and its implementation class.
//!
//! A candidate matches an interface method when it has the same name, the
//! same parameter count and public visibility. Parameter types are never
//! compared, so every same-name same-arity public overload is returned.

use crate::index::CodeIndex;
use crate::model::{ClassId, MethodId};
use crate::resolver::has_remote_annotation;

/// Whether `method` is an abstract method of an annotated remote interface.
///
/// False for stale methods and for methods whose owning class is stale.
pub fn is_remote_interface_method(index: &dyn CodeIndex, method: MethodId) -> bool {
    let Some(symbol) = index.method(method) else {
        return false;
    };
    let Some(owner) = index.class(symbol.owning_class) else {
        return false;
    };
    owner.is_interface && symbol.is_abstract && has_remote_annotation(owner)
}

/// Methods of `remote_class` (inherited ones included) matching `interface_method`.
///
/// Results follow the index's enumeration order. Empty when the interface
/// method is not abstract, its owner is not an interface, either symbol is
/// stale (before or after the methods are enumerated), or nothing qualifies.
pub fn find_matches(
    index: &dyn CodeIndex,
    interface_method: MethodId,
    remote_class: ClassId,
) -> Vec<MethodId> {
    let Some(method) = index.method(interface_method) else {
        return Vec::new();
    };
    let Some(owner) = index.class(method.owning_class) else {
        return Vec::new();
    };
    if !owner.is_interface || !method.is_abstract || index.class(remote_class).is_none() {
        return Vec::new();
    }

    let matches: Vec<MethodId> = index
        .all_methods(remote_class)
        .into_iter()
        .filter(|candidate| {
            index.method(*candidate).is_some_and(|c| {
                c.name == method.name
                    && c.parameter_count == method.parameter_count
                    && c.visibility.is_public()
            })
        })
        .collect();

    // Either end of the link may have gone stale during enumeration.
    if index.class(remote_class).is_none() || index.method(interface_method).is_none() {
        return Vec::new();
    }
    matches
}
