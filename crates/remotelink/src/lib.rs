//! remotelink - navigation and usage search across annotation-declared remote links.
//!
//! This crate provides the `rlink` binary on top of `remotelink-core`.
//!
//! ## Modules
//!
//! - `cli` - Command implementations and method selectors
//! - `config` - `rlink.json` and flag precedence
//! - `filter` - Glob filters for the usage-search scope

pub mod cli;
pub mod config;
pub mod filter;

// Re-export core types for convenience
pub use remotelink_core::error::{LinkError, OutputErrorCode};
pub use remotelink_core::output::{ErrorInfo, ErrorResponse, Location, SymbolInfo, SCHEMA_VERSION};
pub use remotelink_core::InMemoryIndex;
