//! Remote-link resolution: annotated class → remote implementation class.
//!
//! A remote interface names its implementation with a string:
//!
//! ```java
//! @Remote("com.example.impl.ServiceImpl")
//! interface Service { ... }
//! ```
//!
//! Nothing in the compiled code connects the two, so the link is recomputed
//! from the live index on every call. Nothing is cached: an edit to the
//! annotation or a reindex is visible to the very next resolution.

use tracing::debug;

use crate::index::CodeIndex;
use crate::model::{ClassId, ClassSymbol};

/// Fully-qualified name of the remote-link annotation type.
pub const REMOTE_ANNOTATION_FQN: &str = "com.intellij.driver.client.Remote";

/// Attribute of the remote-link annotation that names the target class.
pub const REMOTE_ANNOTATION_ATTRIBUTE: &str = "value";

/// Whether a class carries the remote-link annotation directly.
pub fn has_remote_annotation(class: &ClassSymbol) -> bool {
    class.has_annotation(REMOTE_ANNOTATION_FQN)
}

/// The target class name written in the remote-link annotation.
///
/// `None` when the annotation is missing or its `value` is not a string literal.
pub fn remote_target_name(class: &ClassSymbol) -> Option<&str> {
    class
        .annotation(REMOTE_ANNOTATION_FQN)?
        .attribute_value_as_string_literal(REMOTE_ANNOTATION_ATTRIBUTE)
}

/// Resolve the remote class designated by `class`'s remote-link annotation.
///
/// The lookup searches all scopes, libraries included. Returns `None` if the
/// class is stale, carries no annotation, the `value` is not a string literal,
/// or no class of that name is indexed.
pub fn resolve_remote_class(index: &dyn CodeIndex, class: ClassId) -> Option<ClassId> {
    let symbol = index.class(class)?;
    let Some(target) = remote_target_name(symbol) else {
        debug!(class = %symbol.qualified_name, "no string-literal remote target");
        return None;
    };
    let resolved = index.find_class(target, &index.all_scope());
    if resolved.is_none() {
        debug!(class = %symbol.qualified_name, remote = target, "remote target not indexed");
    }
    resolved
}
