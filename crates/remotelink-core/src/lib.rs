//! Core engine for remotelink.
//!
//! A remote interface is tied to its implementation class only by a string
//! in an annotation. This crate recovers that link and turns it into
//! navigation targets and synthetic usage references:
//! - Annotation link resolution (`resolver`)
//! - Method matching by name, arity and visibility (`matcher`)
//! - Forward navigation and gutter markers (`navigation`)
//! - Reverse usage search (`search`)
//! - The host index trait and search scopes (`index`, `scope`)
//! - An in-memory index and its JSON snapshot format (`memory`, `snapshot`)
//! - Error types and JSON output types for CLI responses (`error`, `output`)

pub mod error;
pub mod index;
pub mod matcher;
pub mod memory;
pub mod model;
pub mod navigation;
pub mod output;
pub mod resolver;
pub mod scope;
pub mod search;
pub mod snapshot;
pub mod text;
pub mod types;

pub use index::CodeIndex;
pub use memory::InMemoryIndex;
pub use model::{ClassId, FileId, MethodId, Span};
pub use scope::SearchScope;
