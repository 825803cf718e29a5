//! File ignore pattern handling for solgen templates.
//! This module processes .solgenignore files to exclude specific paths
//! from generation, similar to .gitignore functionality.

use crate::error::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::fs::read_to_string;
use std::path::Path;

/// Ignore file name, looked up in the template root
pub const IGNORE_FILE: &str = ".solgenignore";

/// Patterns always excluded from generation.
pub const DEFAULT_IGNORE_PATTERNS: [&str; 4] =
    [".git/**", "**/.git/**", "**/.DS_Store", IGNORE_FILE];

/// Reads the .solgenignore file of a template and builds the set of ignored paths.
///
/// # Arguments
/// * `template_dir` - Template root directory
///
/// # Returns
/// * `Result<GlobSet>` - Default patterns plus every pattern of the ignore file
///
/// # Notes
/// - A missing ignore file yields only the default patterns
/// - Blank lines and lines starting with `#` are skipped
///
/// # Example
/// ```ignore
/// # Contents of .solgenignore:
/// *.user
/// bin/**
/// ```
pub fn parse_ignore_file<P: AsRef<Path>>(template_dir: P) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORE_PATTERNS {
        builder.add(glob(pattern)?);
    }

    let ignore_path = template_dir.as_ref().join(IGNORE_FILE);
    if ignore_path.exists() {
        let contents = read_to_string(&ignore_path)?;
        for line in contents.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            builder.add(glob(line)?);
        }
    } else {
        debug!("{IGNORE_FILE} does not exist");
    }

    builder
        .build()
        .map_err(|e| Error::IgnoreError(format!("{IGNORE_FILE} loading failed: {e}")))
}

fn glob(pattern: &str) -> Result<Glob> {
    Glob::new(pattern)
        .map_err(|e| Error::IgnoreError(format!("{IGNORE_FILE} loading failed: {e}")))
}
