//! File filters for restricting the usage-search scope.
//!
//! Patterns come from CLI arguments after `--` or from the `scope` list in
//! `rlink.json`, and are matched against indexed file paths.
//!
//! ## Syntax
//!
//! - Patterns without `!` prefix are inclusions
//! - Patterns with `!` prefix are exclusions
//! - Standard glob syntax: `*`, `**`, `?`, `[abc]`
//!
//! ## Semantics
//!
//! 1. If no filter specified: the user scope is every file
//! 2. If only exclusions specified: start from all files, then apply exclusions
//! 3. If inclusions specified: start with matching files, then apply exclusions
//! 4. Default exclusions (build output, VCS metadata) always apply

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use remotelink_core::error::LinkError;
use remotelink_core::{InMemoryIndex, SearchScope};
use thiserror::Error;

/// Default directory exclusions that always apply.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "**/.git/**",
    "**/.gradle/**",
    "**/.idea/**",
    "**/build/**",
    "**/out/**",
    "**/target/**",
];

/// Error type for file filter operations.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Invalid glob pattern syntax.
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl From<FilterError> for LinkError {
    fn from(err: FilterError) -> Self {
        match &err {
            FilterError::InvalidPattern { pattern, .. } => LinkError::invalid_args_with_details(
                err.to_string(),
                serde_json::json!({ "pattern": pattern }),
            ),
        }
    }
}

/// Parsed file filter.
#[derive(Debug)]
pub struct FileFilterSpec {
    /// Glob set for inclusion patterns. If empty, all files are included.
    inclusions: Option<GlobSet>,
    /// Glob set for exclusion patterns (user-specified).
    exclusions: GlobSet,
    /// Glob set for default exclusions (always applied).
    default_exclusions: GlobSet,
}

impl FileFilterSpec {
    /// Parse filter patterns.
    ///
    /// Returns `Ok(None)` if no patterns are provided, meaning no restriction.
    ///
    /// # Examples
    ///
    /// ```
    /// use remotelink::filter::FileFilterSpec;
    ///
    /// let spec = FileFilterSpec::parse(&[]).unwrap();
    /// assert!(spec.is_none());
    ///
    /// let spec = FileFilterSpec::parse(&["src/**/*.java".to_string(), "!**/gen/**".to_string()])
    ///     .unwrap();
    /// assert!(spec.is_some());
    /// ```
    pub fn parse(args: &[String]) -> Result<Option<Self>, FilterError> {
        if args.is_empty() {
            return Ok(None);
        }

        let mut inclusion_patterns = Vec::new();
        let mut exclusion_patterns = Vec::new();

        for arg in args {
            if let Some(pattern) = arg.strip_prefix('!') {
                exclusion_patterns.push(pattern.to_string());
            } else {
                inclusion_patterns.push(arg.clone());
            }
        }

        let inclusions = if inclusion_patterns.is_empty() {
            None
        } else {
            Some(build_glob_set(&inclusion_patterns)?)
        };
        let exclusions = build_glob_set(&exclusion_patterns)?;
        let default_exclusions =
            build_glob_set(&DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect::<Vec<_>>())?;

        Ok(Some(FileFilterSpec {
            inclusions,
            exclusions,
            default_exclusions,
        }))
    }

    /// Check if a path passes the filter.
    ///
    /// A path matches if it is in neither the default nor the user
    /// exclusions and, when inclusions are specified, matches one of them.
    pub fn matches(&self, path: &Path) -> bool {
        if self.default_exclusions.is_match(path) {
            return false;
        }
        if self.exclusions.is_match(path) {
            return false;
        }
        match &self.inclusions {
            Some(inclusions) => inclusions.is_match(path),
            None => true,
        }
    }

    /// Check if this filter has any inclusion patterns.
    pub fn has_inclusions(&self) -> bool {
        self.inclusions.is_some()
    }

    /// Check if this filter has any user exclusion patterns.
    pub fn has_exclusions(&self) -> bool {
        !self.exclusions.is_empty()
    }

    /// The indexed files this filter admits, as a search scope.
    pub fn to_scope(&self, index: &InMemoryIndex) -> SearchScope {
        SearchScope::files(
            index
                .files()
                .filter(|file| self.matches(Path::new(&file.path)))
                .map(|file| file.file_id),
        )
    }
}

/// User search scope for optional filter patterns.
pub fn user_scope(patterns: &[String], index: &InMemoryIndex) -> Result<SearchScope, FilterError> {
    Ok(match FileFilterSpec::parse(patterns)? {
        Some(spec) => spec.to_scope(index),
        None => SearchScope::Everything,
    })
}

/// Build a GlobSet from a list of pattern strings.
fn build_glob_set(patterns: &[String]) -> Result<GlobSet, FilterError> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| FilterError::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }

    builder.build().map_err(|e| FilterError::InvalidPattern {
        pattern: "<combined>".to_string(),
        message: e.to_string(),
    })
}
